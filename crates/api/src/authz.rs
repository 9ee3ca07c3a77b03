//! API-side permission guard.
//!
//! Handlers call [`require`] before touching a service, so every route states
//! its (resource, action) next to its body.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use libris_auth::{guard, Action, DenialKind, GrantSummary, RequiredPermission, Resource};

use crate::app::errors;
use crate::context::IdentityContext;

/// Check that the request identity may perform `action` on `resource`.
pub fn require(
    identity: &IdentityContext,
    resource: Resource,
    action: Action,
) -> Result<(), axum::response::Response> {
    let required = RequiredPermission::new(resource, action);
    guard(Some(identity.identity()), &required).map_err(|denial| match denial.kind {
        DenialKind::Unauthorized => {
            errors::json_error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", denial.message)
        }
        DenialKind::Forbidden => {
            let user_permissions: Vec<GrantSummary> = identity
                .identity()
                .effective_permissions
                .iter()
                .map(GrantSummary::from)
                .collect();
            (
                StatusCode::FORBIDDEN,
                Json(json!({
                    "error": "FORBIDDEN",
                    "message": denial.message,
                    "requiredPermission": denial.required,
                    "userPermissions": user_permissions,
                })),
            )
                .into_response()
        }
    })
}
