//! User accounts and their outward representation.
//!
//! [`User`] is the stored record and intentionally has no `Serialize` impl:
//! the only way a user leaves the core is as a [`UserView`], which has no hash
//! field at all.

use chrono::{DateTime, Utc};
use serde::Serialize;

use libris_core::{DomainError, DomainResult, RoleId, UserId};

use crate::roles::dedup_ids;

/// Username of the account created by bootstrap seeding.
pub const SEED_ADMIN_USERNAME: &str = "admin";

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 30;
pub const SECRET_MIN_LEN: usize = 6;

// ─────────────────────────────────────────────────────────────────────────────
// Stored record
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub secret_hash: String,
    pub full_name: String,
    pub active: bool,
    pub roles: Vec<RoleId>,
    pub last_authenticated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a new active account from already-validated parts.
    pub fn new(
        username: String,
        email: String,
        secret_hash: String,
        full_name: String,
        roles: Vec<RoleId>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserId::new(),
            username,
            email,
            secret_hash,
            full_name,
            active: true,
            roles: dedup_ids(roles),
            last_authenticated_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_roles(&mut self, roles: Vec<RoleId>, now: DateTime<Utc>) {
        self.roles = dedup_ids(roles);
        self.updated_at = now;
    }

    pub fn is_seed_admin(&self) -> bool {
        self.username == SEED_ADMIN_USERNAME
    }
}

impl core::fmt::Debug for User {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("secret_hash", &"<redacted>")
            .field("full_name", &self.full_name)
            .field("active", &self.active)
            .field("roles", &self.roles)
            .field("last_authenticated_at", &self.last_authenticated_at)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Outward view
// ─────────────────────────────────────────────────────────────────────────────

/// A user as it may be shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub active: bool,
    pub roles: Vec<RoleId>,
    pub last_authenticated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            active: user.active,
            roles: user.roles.clone(),
            last_authenticated_at: user.last_authenticated_at,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Input normalization
// ─────────────────────────────────────────────────────────────────────────────

/// Trim and lower-case an email, rejecting anything not shaped like `x@y.z`.
pub fn normalize_email(raw: &str) -> DomainResult<String> {
    let email = raw.trim().to_lowercase();
    if !looks_like_email(&email) {
        return Err(DomainError::invalid_input("please provide a valid email"));
    }
    Ok(email)
}

fn looks_like_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    // The domain part needs a dot with something on both sides of it.
    !local.is_empty()
        && domain
            .rfind('.')
            .is_some_and(|dot| dot > 0 && dot + 1 < domain.len())
}

pub fn normalize_username(raw: &str) -> DomainResult<String> {
    let username = raw.trim().to_lowercase();
    let len = username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err(DomainError::invalid_input(format!(
            "username must be between {USERNAME_MIN_LEN} and {USERNAME_MAX_LEN} characters"
        )));
    }
    Ok(username)
}

pub fn validate_secret(secret: &str) -> DomainResult<()> {
    if secret.chars().count() < SECRET_MIN_LEN {
        return Err(DomainError::invalid_input(format!(
            "password must be at least {SECRET_MIN_LEN} characters long"
        )));
    }
    Ok(())
}

pub fn normalize_full_name(raw: &str) -> DomainResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(DomainError::invalid_input("full name cannot be empty"));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> User {
        User::new(
            "reader".into(),
            "reader@example.com".into(),
            "$argon2id$secret".into(),
            "Rea Der".into(),
            vec![],
            Utc::now(),
        )
    }

    #[test]
    fn view_never_carries_the_hash() {
        let json = serde_json::to_string(&UserView::from(&sample())).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.to_lowercase().contains("hash"));
        assert!(json.contains("fullName"));
    }

    #[test]
    fn debug_redacts_the_hash() {
        let dbg = format!("{:?}", sample());
        assert!(!dbg.contains("argon2"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn email_is_lower_cased_and_shape_checked() {
        assert_eq!(normalize_email(" Admin@Example.COM ").unwrap(), "admin@example.com");
        for bad in ["", "nobody", "a@b", "a@.com", "a b@c.de", "@x.io", "x@y."] {
            assert!(normalize_email(bad).is_err(), "{bad} accepted");
        }
    }

    #[test]
    fn username_length_is_bounded() {
        assert_eq!(normalize_username(" Alice ").unwrap(), "alice");
        assert!(normalize_username("ab").is_err());
        assert!(normalize_username(&"x".repeat(31)).is_err());
        assert!(normalize_username(&"x".repeat(30)).is_ok());
    }

    #[test]
    fn short_secrets_are_rejected() {
        assert!(validate_secret("12345").is_err());
        assert!(validate_secret("123456").is_ok());
    }

    #[test]
    fn seed_admin_is_recognized_by_username() {
        let mut user = sample();
        assert!(!user.is_seed_admin());
        user.username = SEED_ADMIN_USERNAME.to_string();
        assert!(user.is_seed_admin());
    }
}
