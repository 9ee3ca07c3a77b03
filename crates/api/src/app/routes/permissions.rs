use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde_json::json;

use libris_auth::{Action, NewPermission, PermissionFilter, Resource};
use libris_core::{DomainResult, PermissionId};

use crate::app::dto::{PermissionQuery, SetActiveRequest};
use crate::app::{errors, services::AppServices};
use crate::authz;
use crate::context::IdentityContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_permissions).post(create_permission))
        .route("/:id/active", put(set_active))
}

fn parse_filter(query: PermissionQuery) -> DomainResult<PermissionFilter> {
    Ok(PermissionFilter {
        resource: query.resource.as_deref().map(Resource::new).transpose()?,
        action: query.action.as_deref().map(str::parse::<Action>).transpose()?,
        active: query.active,
    })
}

/// GET /permissions?resource=&action=&active= - ordered by (resource, action)
pub async fn list_permissions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<IdentityContext>,
    Query(query): Query<PermissionQuery>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&identity, Resource::PERMISSIONS, Action::Read) {
        return resp;
    }
    let filter = match parse_filter(query) {
        Ok(filter) => filter,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.core.catalog.list(&filter).await {
        Ok(permissions) => Json(json!({ "permissions": permissions })).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn create_permission(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<IdentityContext>,
    Json(input): Json<NewPermission>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&identity, Resource::PERMISSIONS, Action::Create) {
        return resp;
    }

    match services.core.catalog.create(input).await {
        Ok(permission) => (
            StatusCode::CREATED,
            Json(json!({ "message": "permission created successfully", "permission": permission })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn set_active(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<IdentityContext>,
    Path(id): Path<String>,
    Json(req): Json<SetActiveRequest>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&identity, Resource::PERMISSIONS, Action::Update) {
        return resp;
    }
    let permission_id: PermissionId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.core.catalog.set_active(permission_id, req.active).await {
        Ok(permission) => Json(json!({ "message": "permission updated successfully", "permission": permission }))
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
