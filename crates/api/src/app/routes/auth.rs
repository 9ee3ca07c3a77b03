//! Session and self-service endpoints under `/auth`.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;

use libris_auth::{
    explain, has_role, Action, NewAccount, ProfileUpdate, RequiredPermission, Resource,
    SUPER_ADMIN_ROLE,
};

use crate::app::dto::{
    ChangePasswordRequest, CheckPermissionRequest, ForgotPasswordRequest, LoginRequest, RegisterRequest,
};
use crate::app::{errors, services::AppServices};
use crate::authz;
use crate::context::IdentityContext;

/// Protected `/auth` routes. Login and forgot-password are mounted on the
/// public router.
pub fn router() -> Router {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/profile", get(profile))
        .route("/auth/change-password", put(change_password))
        .route("/auth/logout", post(logout))
        .route("/auth/refresh-token", post(refresh_token))
        .route("/auth/verify-token", get(verify_token))
        .route("/auth/update-profile", put(update_profile))
        .route("/auth/check-permissions", post(check_permissions))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(req): Json<LoginRequest>,
) -> axum::response::Response {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "INVALID_INPUT",
            "email and password are required",
        );
    }

    match services.core.credentials.authenticate(&req.email, &req.password).await {
        Ok(result) => Json(json!({
            "message": "login successful",
            "token": result.token.token,
            "expiresAt": result.token.expires_at,
            "expiresIn": result.token.expires_in,
            "identity": result.user,
        }))
        .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Reset delivery is not wired up; the reply is the same for every address.
pub async fn forgot_password(Json(req): Json<ForgotPasswordRequest>) -> axum::response::Response {
    if req.email.trim().is_empty() {
        return errors::json_error(StatusCode::BAD_REQUEST, "INVALID_INPUT", "email is required");
    }

    tracing::info!("password reset requested");
    Json(json!({
        "message": "if an account with that email exists, password reset instructions have been sent",
    }))
    .into_response()
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<IdentityContext>,
    Json(req): Json<RegisterRequest>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&identity, Resource::USERS, Action::Create) {
        return resp;
    }

    let input = match NewAccount::try_from(req) {
        Ok(input) => input,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.core.accounts.register(input).await {
        Ok(user) => (
            StatusCode::CREATED,
            Json(json!({ "message": "user registered successfully", "user": user })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn profile(Extension(identity): Extension<IdentityContext>) -> axum::response::Response {
    Json(identity.identity().clone()).into_response()
}

pub async fn change_password(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<IdentityContext>,
    Json(req): Json<ChangePasswordRequest>,
) -> axum::response::Response {
    let result = services
        .core
        .credentials
        .change_secret(
            identity.user_id(),
            &req.current_password,
            &req.new_password,
            req.confirm_password.as_deref(),
        )
        .await;

    match result {
        Ok(()) => Json(json!({ "message": "password changed successfully" })).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Tokens are stateless; the client discards its copy.
pub async fn logout(Extension(identity): Extension<IdentityContext>) -> axum::response::Response {
    tracing::info!(user_id = %identity.user_id(), "logout acknowledged");
    Json(json!({ "message": "logout successful" })).into_response()
}

pub async fn refresh_token(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<IdentityContext>,
) -> axum::response::Response {
    match services.core.issuer.refresh(identity.user_id()) {
        Ok(issued) => Json(json!({
            "message": "token refreshed successfully",
            "token": issued.token,
            "expiresAt": issued.expires_at,
            "expiresIn": issued.expires_in,
        }))
        .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn verify_token(Extension(identity): Extension<IdentityContext>) -> axum::response::Response {
    let resolved = identity.identity();
    Json(json!({
        "valid": true,
        "identity": resolved,
        "permissions": resolved.permission_names(),
        "superAdmin": has_role(resolved, SUPER_ADMIN_ROLE),
    }))
    .into_response()
}

pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<IdentityContext>,
    Json(update): Json<ProfileUpdate>,
) -> axum::response::Response {
    match services.core.accounts.update_profile(identity.user_id(), update).await {
        Ok(user) => Json(json!({ "message": "profile updated successfully", "user": user })).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn check_permissions(
    Extension(identity): Extension<IdentityContext>,
    Json(req): Json<CheckPermissionRequest>,
) -> axum::response::Response {
    if req.resource.trim().is_empty() || req.action.trim().is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "INVALID_INPUT",
            "resource and action are required",
        );
    }

    let required = match RequiredPermission::parse(&req.resource, &req.action) {
        Ok(required) => required,
        Err(e) => return errors::domain_error_to_response(e),
    };

    Json(explain(identity.identity(), &required)).into_response()
}
