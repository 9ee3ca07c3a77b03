use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use libris_core::{DomainError, UnauthorizedReason};

/// Map a domain error to its status, stable code and client-safe message.
pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Unauthorized(reason) => {
            let code = match reason {
                UnauthorizedReason::InvalidToken => "INVALID_TOKEN",
                UnauthorizedReason::TokenExpired => "TOKEN_EXPIRED",
                _ => "UNAUTHORIZED",
            };
            json_error(StatusCode::UNAUTHORIZED, code, reason.to_string())
        }
        DomainError::Forbidden(msg) => json_error(StatusCode::FORBIDDEN, "FORBIDDEN", msg),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "CONFLICT", msg),
        DomainError::InvalidInput(msg) => json_error(StatusCode::BAD_REQUEST, "INVALID_INPUT", msg),
        DomainError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "NOT_FOUND", format!("{msg} not found")),
        DomainError::Internal(msg) => {
            tracing::error!(error = %msg, "internal error");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", "internal server error")
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Parse a path id, mapping failure to a 400 response.
pub fn parse_id<T>(raw: &str) -> Result<T, axum::response::Response>
where
    T: core::str::FromStr<Err = DomainError>,
{
    raw.parse().map_err(domain_error_to_response)
}
