//! Domain error model.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Why no identity could be established.
///
/// Carried inside [`DomainError::Unauthorized`] so callers can tell an expired
/// token from a forged one. `InvalidCredentials` deliberately covers both the
/// unknown-account and the wrong-secret login failures.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnauthorizedReason {
    MissingToken,
    InvalidToken,
    TokenExpired,
    AccountNotFound,
    AccountInactive,
    InvalidCredentials,
}

impl core::fmt::Display for UnauthorizedReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            UnauthorizedReason::MissingToken => "access token is required",
            UnauthorizedReason::InvalidToken => "invalid token",
            UnauthorizedReason::TokenExpired => "token expired",
            UnauthorizedReason::AccountNotFound => "user not found or inactive",
            UnauthorizedReason::AccountInactive => "user not found or inactive",
            UnauthorizedReason::InvalidCredentials => "invalid credentials",
        };
        f.write_str(msg)
    }
}

/// Domain-level error.
///
/// Every fallible core operation returns one of these kinds. Mapping a kind to
/// a transport status is the API layer's job.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// No valid identity could be established.
    #[error("unauthorized: {0}")]
    Unauthorized(UnauthorizedReason),

    /// Identity established but the operation is not allowed.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Uniqueness or referential conflict.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Malformed or incomplete input to a management operation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The addressed record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Storage or cryptography failure. Never carries secret material.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn unauthorized(reason: UnauthorizedReason) -> Self {
        Self::Unauthorized(reason)
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Short, stable name of the error kind (safe to log).
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::Unauthorized(_) => "unauthorized",
            DomainError::Forbidden(_) => "forbidden",
            DomainError::Conflict(_) => "conflict",
            DomainError::InvalidInput(_) => "invalid_input",
            DomainError::NotFound(_) => "not_found",
            DomainError::Internal(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_failures_share_one_message() {
        let a = DomainError::unauthorized(UnauthorizedReason::InvalidCredentials);
        let b = DomainError::unauthorized(UnauthorizedReason::InvalidCredentials);
        assert_eq!(a.to_string(), b.to_string());
        assert_eq!(a.kind(), "unauthorized");
    }

    #[test]
    fn missing_and_inactive_accounts_read_the_same() {
        assert_eq!(
            UnauthorizedReason::AccountNotFound.to_string(),
            UnauthorizedReason::AccountInactive.to_string()
        );
    }
}
