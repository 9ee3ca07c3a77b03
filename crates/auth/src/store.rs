//! Persistence boundary for permissions, roles and users.

use std::sync::Arc;

use async_trait::async_trait;

use libris_core::{DomainResult, PermissionId, RoleId, UserId};

use crate::permissions::Permission;
use crate::roles::Role;
use crate::user::User;

/// One page of users plus the total count across all pages.
#[derive(Debug, Clone)]
pub struct UserSlice {
    pub users: Vec<User>,
    pub total: u64,
}

/// Storage contract the services are written against.
///
/// Implementations enforce uniqueness of permission names, role names,
/// usernames and emails (returning `Conflict`), and make each call atomic with
/// respect to its own checks. Lookups by id return `Ok(None)` when absent;
/// updates and deletes of absent records return `NotFound`.
#[async_trait]
pub trait AuthStore: Send + Sync {
    async fn insert_permission(&self, permission: Permission) -> DomainResult<Permission>;
    async fn update_permission(&self, permission: Permission) -> DomainResult<Permission>;
    async fn permission(&self, id: PermissionId) -> DomainResult<Option<Permission>>;
    async fn permission_by_name(&self, name: &str) -> DomainResult<Option<Permission>>;
    async fn list_permissions(&self) -> DomainResult<Vec<Permission>>;
    /// Every stored permission among `ids`, active or not. Unknown ids are skipped.
    async fn permissions_by_ids(&self, ids: &[PermissionId]) -> DomainResult<Vec<Permission>>;

    async fn insert_role(&self, role: Role) -> DomainResult<Role>;
    async fn update_role(&self, role: Role) -> DomainResult<Role>;
    async fn role(&self, id: RoleId) -> DomainResult<Option<Role>>;
    async fn role_by_name(&self, name: &str) -> DomainResult<Option<Role>>;
    async fn list_roles(&self) -> DomainResult<Vec<Role>>;
    async fn roles_by_ids(&self, ids: &[RoleId]) -> DomainResult<Vec<Role>>;
    /// Remove a role unless a user still references it (`Conflict`).
    async fn delete_role(&self, id: RoleId) -> DomainResult<()>;

    async fn insert_user(&self, user: User) -> DomainResult<User>;
    async fn update_user(&self, user: User) -> DomainResult<User>;
    async fn user(&self, id: UserId) -> DomainResult<Option<User>>;
    async fn user_by_email(&self, email: &str) -> DomainResult<Option<User>>;
    async fn user_by_username(&self, username: &str) -> DomainResult<Option<User>>;
    /// Newest first.
    async fn list_users(&self, offset: usize, limit: usize) -> DomainResult<UserSlice>;
    async fn count_users_with_role(&self, role_id: RoleId) -> DomainResult<u64>;
    async fn delete_user(&self, id: UserId) -> DomainResult<()>;

    fn backend_name(&self) -> &'static str;
}

pub type SharedStore = Arc<dyn AuthStore>;
