//! Login and secret changes.

use std::sync::{Arc, OnceLock};

use chrono::Utc;
use serde::Serialize;

use libris_core::{DomainError, DomainResult, UnauthorizedReason, UserId};

use crate::password::SecretHasher;
use crate::principal::ResolvedIdentity;
use crate::resolver::IdentityResolver;
use crate::session::{IssuedToken, SessionIssuer};
use crate::store::SharedStore;
use crate::user::validate_secret;

/// Hashed once per verifier and checked on logins that have no account.
const DECOY_SECRET: &str = "libris-decoy-secret";

/// Successful login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateResult {
    pub user: ResolvedIdentity,
    pub token: IssuedToken,
}

#[derive(Clone)]
pub struct CredentialVerifier {
    store: SharedStore,
    hasher: Arc<dyn SecretHasher>,
    issuer: SessionIssuer,
    resolver: IdentityResolver,
    decoy_digest: Arc<OnceLock<String>>,
}

impl CredentialVerifier {
    pub fn new(
        store: SharedStore,
        hasher: Arc<dyn SecretHasher>,
        issuer: SessionIssuer,
        resolver: IdentityResolver,
    ) -> Self {
        Self {
            store,
            hasher,
            issuer,
            resolver,
            decoy_digest: Arc::new(OnceLock::new()),
        }
    }

    fn decoy_digest(&self) -> DomainResult<&str> {
        if let Some(digest) = self.decoy_digest.get() {
            return Ok(digest);
        }
        let digest = self.hasher.hash(DECOY_SECRET)?;
        Ok(self.decoy_digest.get_or_init(|| digest))
    }

    /// Spend one verification on a digest that never matches, so a missing or
    /// inactive account costs the same as a wrong secret.
    fn reject_without_account(&self, secret: &str) -> DomainResult<DomainError> {
        let digest = self.decoy_digest()?;
        self.hasher.verify(secret, digest)?;
        Ok(DomainError::unauthorized(UnauthorizedReason::InvalidCredentials))
    }

    /// Verify an email/secret pair and open a session.
    ///
    /// Unknown account, inactive account and wrong secret all fail with the
    /// same `InvalidCredentials` error.
    pub async fn authenticate(&self, email: &str, secret: &str) -> DomainResult<AuthenticateResult> {
        let rejected = || DomainError::unauthorized(UnauthorizedReason::InvalidCredentials);

        let email = email.trim().to_lowercase();
        let Some(mut user) = self.store.user_by_email(&email).await? else {
            tracing::info!(outcome = "unknown_account", "login rejected");
            return Err(self.reject_without_account(secret)?);
        };
        if !user.active {
            tracing::info!(user_id = %user.id, outcome = "inactive_account", "login rejected");
            return Err(self.reject_without_account(secret)?);
        }
        if !self.hasher.verify(secret, &user.secret_hash)? {
            tracing::info!(user_id = %user.id, outcome = "bad_secret", "login rejected");
            return Err(rejected());
        }

        let now = Utc::now();
        user.last_authenticated_at = Some(now);
        user.updated_at = now;
        let user = self.store.update_user(user).await?;

        let token = self.issuer.issue(user.id)?;
        let identity = self.resolver.expand(&user).await?;
        tracing::info!(user_id = %user.id, "login succeeded");

        Ok(AuthenticateResult { user: identity, token })
    }

    /// Replace a user's secret after checking the current one.
    pub async fn change_secret(
        &self,
        user_id: UserId,
        current: &str,
        new: &str,
        confirm: Option<&str>,
    ) -> DomainResult<()> {
        if current.is_empty() || new.is_empty() {
            return Err(DomainError::invalid_input(
                "current password and new password are required",
            ));
        }
        validate_secret(new)?;
        if confirm.is_some_and(|c| c != new) {
            return Err(DomainError::invalid_input(
                "new password and confirm password do not match",
            ));
        }

        let mut user = self
            .store
            .user(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("user {user_id}")))?;
        if !self.hasher.verify(current, &user.secret_hash)? {
            return Err(DomainError::invalid_input("current password is incorrect"));
        }

        user.secret_hash = self.hasher.hash(new)?;
        user.updated_at = Utc::now();
        self.store.update_user(user).await?;
        tracing::info!(user_id = %user_id, "password changed");
        Ok(())
    }
}
