use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use libris_core::UserId;

/// Session token claims.
///
/// Times are JWT-style seconds since the epoch. `exp` is rounded up when a
/// token is issued so the token never lives shorter than its TTL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the authenticated user.
    pub sub: UserId,

    /// Issued-at.
    pub iat: i64,

    /// Expiry.
    pub exp: i64,
}

impl SessionClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,
}

/// Deterministically validate session claims against `now`.
///
/// Signature verification happens before this is called; this checks the time
/// window only, with millisecond precision and no leeway.
pub fn validate_claims(claims: &SessionClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    let now_ms = now.timestamp_millis();
    if now_ms < claims.iat.saturating_mul(1000) {
        return Err(TokenValidationError::NotYetValid);
    }
    if now_ms >= claims.exp.saturating_mul(1000) {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims_at(now: DateTime<Utc>, ttl_secs: i64) -> SessionClaims {
        SessionClaims {
            sub: UserId::new(),
            iat: now.timestamp(),
            exp: now.timestamp() + ttl_secs,
        }
    }

    #[test]
    fn valid_inside_window() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let c = claims_at(now, 60);
        assert_eq!(validate_claims(&c, now), Ok(()));
        assert_eq!(validate_claims(&c, now + Duration::seconds(59)), Ok(()));
    }

    #[test]
    fn expired_exactly_at_exp() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let c = claims_at(now, 60);
        assert_eq!(
            validate_claims(&c, now + Duration::seconds(60)),
            Err(TokenValidationError::Expired)
        );
    }

    #[test]
    fn rejects_future_and_inverted_windows() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let c = claims_at(now + Duration::seconds(30), 60);
        assert_eq!(validate_claims(&c, now), Err(TokenValidationError::NotYetValid));

        let inverted = SessionClaims { exp: c.iat, ..c };
        assert_eq!(
            validate_claims(&inverted, now),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }
}
