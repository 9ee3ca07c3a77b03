//! Account management: registration, profile edits and administrative user
//! changes.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use libris_core::{DomainError, DomainResult, RoleId, UserId};

use crate::password::SecretHasher;
use crate::registry::RoleRegistry;
use crate::store::SharedStore;
use crate::user::{
    normalize_email, normalize_full_name, normalize_username, validate_secret, User, UserView,
};

/// Role assigned to registrations that name no roles.
pub const DEFAULT_ROLE: &str = "USER";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(default)]
    pub role_ids: Option<Vec<RoleId>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub role_ids: Option<Vec<RoleId>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_users: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserPage {
    pub users: Vec<UserView>,
    pub pagination: Pagination,
}

#[derive(Clone)]
pub struct AccountService {
    store: SharedStore,
    hasher: Arc<dyn SecretHasher>,
    registry: RoleRegistry,
}

impl AccountService {
    pub fn new(store: SharedStore, hasher: Arc<dyn SecretHasher>, registry: RoleRegistry) -> Self {
        Self {
            store,
            hasher,
            registry,
        }
    }

    pub async fn register(&self, input: NewAccount) -> DomainResult<UserView> {
        if [&input.username, &input.email, &input.password, &input.full_name]
            .iter()
            .any(|f| f.trim().is_empty())
        {
            return Err(DomainError::invalid_input(
                "username, email, password and full name are required",
            ));
        }
        let username = normalize_username(&input.username)?;
        let email = normalize_email(&input.email)?;
        let full_name = normalize_full_name(&input.full_name)?;
        validate_secret(&input.password)?;

        if self.store.user_by_email(&email).await?.is_some()
            || self.store.user_by_username(&username).await?.is_some()
        {
            return Err(DomainError::conflict(
                "user with this email or username already exists",
            ));
        }

        let roles = match input.role_ids {
            Some(ids) if !ids.is_empty() => self.registry.validated_roles(ids).await?,
            _ => self.default_roles().await?,
        };

        let hash = self.hasher.hash(&input.password)?;
        let user = User::new(username, email, hash, full_name, roles, Utc::now());
        let created = self.store.insert_user(user).await?;
        tracing::info!(user_id = %created.id, roles = created.roles.len(), "user registered");
        Ok(UserView::from(&created))
    }

    async fn default_roles(&self) -> DomainResult<Vec<RoleId>> {
        Ok(self
            .registry
            .by_name(DEFAULT_ROLE)
            .await?
            .filter(|r| r.active)
            .map(|r| vec![r.id])
            .unwrap_or_default())
    }

    pub async fn get(&self, user_id: UserId) -> DomainResult<UserView> {
        Ok(UserView::from(&self.load(user_id).await?))
    }

    pub async fn update_profile(&self, user_id: UserId, update: ProfileUpdate) -> DomainResult<UserView> {
        if update.full_name.is_none() && update.email.is_none() {
            return Err(DomainError::invalid_input("no valid fields to update"));
        }

        let mut user = self.load(user_id).await?;
        if let Some(name) = update.full_name {
            user.full_name = normalize_full_name(&name)?;
        }
        if let Some(email) = update.email {
            let email = normalize_email(&email)?;
            let taken = self.store.user_by_email(&email).await?;
            if taken.is_some_and(|other| other.id != user.id) {
                return Err(DomainError::conflict("email is already in use"));
            }
            user.email = email;
        }
        user.updated_at = Utc::now();

        let saved = self.store.update_user(user).await?;
        tracing::info!(user_id = %saved.id, "profile updated");
        Ok(UserView::from(&saved))
    }

    /// Administrative change of a user's roles and/or active flag.
    pub async fn update_user(&self, user_id: UserId, update: UserUpdate) -> DomainResult<UserView> {
        let mut user = self.load(user_id).await?;
        let now = Utc::now();

        if let Some(ids) = update.role_ids {
            let roles = self.registry.validated_roles(ids).await?;
            user.set_roles(roles, now);
        }
        if let Some(active) = update.is_active {
            user.active = active;
        }
        user.updated_at = now;

        let saved = self.store.update_user(user).await?;
        tracing::info!(user_id = %saved.id, active = saved.active, "user updated");
        Ok(UserView::from(&saved))
    }

    pub async fn delete_user(&self, user_id: UserId) -> DomainResult<()> {
        let user = self.load(user_id).await?;
        if user.is_seed_admin() {
            return Err(DomainError::forbidden("cannot delete the default admin user"));
        }
        self.store.delete_user(user_id).await?;
        tracing::info!(user_id = %user_id, "user deleted");
        Ok(())
    }

    /// Newest users first. `page` and `limit` start at 1.
    pub async fn list_users(&self, page: u64, limit: u64) -> DomainResult<UserPage> {
        if page < 1 || limit < 1 {
            return Err(DomainError::invalid_input("page and limit must be positive integers"));
        }
        let offset = usize::try_from((page - 1).saturating_mul(limit)).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(usize::MAX);
        let slice = self.store.list_users(offset, take).await?;

        let total_pages = slice.total.div_ceil(limit);
        Ok(UserPage {
            users: slice.users.iter().map(UserView::from).collect(),
            pagination: Pagination {
                current_page: page,
                total_pages,
                total_users: slice.total,
                has_next_page: page < total_pages,
                has_prev_page: page > 1,
            },
        })
    }

    async fn load(&self, user_id: UserId) -> DomainResult<User> {
        self.store
            .user(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("user {user_id}")))
    }
}
