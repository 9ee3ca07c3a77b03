use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde_json::json;

use libris_auth::{Action, Resource, UserUpdate};
use libris_core::UserId;

use crate::app::dto::{ListUsersQuery, UpdateUserRequest};
use crate::app::{errors, services::AppServices};
use crate::authz;
use crate::context::IdentityContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users))
        .route("/:id", put(update_user).delete(delete_user))
}

/// GET /users?page=&limit= - newest accounts first
pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<IdentityContext>,
    Query(query): Query<ListUsersQuery>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&identity, Resource::USERS, Action::Read) {
        return resp;
    }

    match services.core.accounts.list_users(query.page(), query.limit()).await {
        Ok(page) => Json(page).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<IdentityContext>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&identity, Resource::USERS, Action::Update) {
        return resp;
    }
    let user_id: UserId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let update = match UserUpdate::try_from(req) {
        Ok(update) => update,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.core.accounts.update_user(user_id, update).await {
        Ok(user) => Json(json!({ "message": "user updated successfully", "user": user })).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<IdentityContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&identity, Resource::USERS, Action::Delete) {
        return resp;
    }
    let user_id: UserId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.core.accounts.delete_user(user_id).await {
        Ok(()) => Json(json!({ "message": "user deleted successfully" })).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
