use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde_json::json;

use libris_auth::{Action, NewRole, Resource, RoleUpdate};
use libris_core::RoleId;

use crate::app::dto::{CreateRoleRequest, UpdateRoleRequest};
use crate::app::{errors, services::AppServices};
use crate::authz;
use crate::context::IdentityContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_roles).post(create_role))
        .route("/:id", put(update_role).delete(delete_role))
}

/// GET /roles - every role with its permission details, by name
pub async fn list_roles(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<IdentityContext>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&identity, Resource::ROLES, Action::Read) {
        return resp;
    }

    match services.core.registry.list_detailed().await {
        Ok(roles) => Json(json!({ "roles": roles })).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn create_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<IdentityContext>,
    Json(req): Json<CreateRoleRequest>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&identity, Resource::ROLES, Action::Create) {
        return resp;
    }
    let input = match NewRole::try_from(req) {
        Ok(input) => input,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.core.registry.create(input).await {
        Ok(role) => (
            StatusCode::CREATED,
            Json(json!({ "message": "role created successfully", "role": role })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<IdentityContext>,
    Path(id): Path<String>,
    Json(req): Json<UpdateRoleRequest>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&identity, Resource::ROLES, Action::Update) {
        return resp;
    }
    let role_id: RoleId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let update = match RoleUpdate::try_from(req) {
        Ok(update) => update,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.core.registry.update(role_id, update).await {
        Ok(role) => Json(json!({ "message": "role updated successfully", "role": role })).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// DELETE /roles/:id - refused for system roles and roles still assigned
pub async fn delete_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<IdentityContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&identity, Resource::ROLES, Action::Delete) {
        return resp;
    }
    let role_id: RoleId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.core.registry.delete(role_id).await {
        Ok(()) => Json(json!({ "message": "role deleted successfully" })).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
