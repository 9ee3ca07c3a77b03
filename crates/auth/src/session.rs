//! Stateless session tokens (HS256 JWT).
//!
//! There is no session table and no revocation list: a token is valid until
//! its own `exp`, and refreshing never invalidates an older token.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;

use libris_core::{DomainError, DomainResult, UnauthorizedReason, UserId};

use crate::claims::{validate_claims, SessionClaims, TokenValidationError};
use crate::config::AuthConfig;

/// A freshly signed token and its expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    /// Lifetime in seconds at the moment of issue.
    pub expires_in: u64,
}

/// Issues and validates session tokens with a server-held secret.
#[derive(Clone)]
pub struct SessionIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: u64,
}

impl SessionIssuer {
    pub fn new(secret: &[u8], ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl_secs,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.jwt_secret.as_bytes(), config.token_ttl_secs)
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    pub fn issue(&self, user_id: UserId) -> DomainResult<IssuedToken> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(&self, user_id: UserId, now: DateTime<Utc>) -> DomainResult<IssuedToken> {
        let ttl_ms = i64::try_from(self.ttl_secs)
            .ok()
            .and_then(|s| s.checked_mul(1000))
            .ok_or_else(|| DomainError::internal("token ttl out of range"))?;
        // Round exp up so a token is never shorter-lived than its TTL.
        let exp_ms = now.timestamp_millis().saturating_add(ttl_ms);
        let claims = SessionClaims {
            sub: user_id,
            iat: now.timestamp(),
            exp: exp_ms.div_euclid(1000) + i64::from(exp_ms.rem_euclid(1000) != 0),
        };
        let expires_at = claims
            .expires_at()
            .ok_or_else(|| DomainError::internal("token expiry out of range"))?;

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| DomainError::internal(format!("token encode: {e}")))?;

        Ok(IssuedToken {
            token,
            expires_at,
            expires_in: self.ttl_secs,
        })
    }

    /// Verify signature and expiry and return the subject.
    pub fn validate(&self, token: &str) -> DomainResult<UserId> {
        self.validate_at(token, Utc::now())
    }

    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> DomainResult<UserId> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below without leeway.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(kind = ?e.kind(), "session token rejected");
                DomainError::unauthorized(UnauthorizedReason::InvalidToken)
            })?;

        validate_claims(&claims, now).map_err(|e| match e {
            TokenValidationError::Expired => DomainError::unauthorized(UnauthorizedReason::TokenExpired),
            TokenValidationError::NotYetValid | TokenValidationError::InvalidTimeWindow => {
                tracing::debug!(error = %e, "session token time window rejected");
                DomainError::unauthorized(UnauthorizedReason::InvalidToken)
            }
        })?;

        Ok(claims.sub)
    }

    /// Re-issue for an already authenticated subject.
    pub fn refresh(&self, user_id: UserId) -> DomainResult<IssuedToken> {
        self.issue(user_id)
    }
}
