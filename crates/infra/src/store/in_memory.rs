//! In-memory implementation of the auth store.
//!
//! All three collections live behind a single `tokio::sync::RwLock`, so each
//! call observes one consistent snapshot and its uniqueness and reference
//! checks cannot interleave with another writer. Not durable: state is lost
//! on restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use libris_auth::{AuthStore, Permission, Role, User, UserSlice};
use libris_core::{DomainError, DomainResult, PermissionId, RoleId, UserId};

#[derive(Debug, Default)]
struct Collections {
    permissions: HashMap<PermissionId, Permission>,
    roles: HashMap<RoleId, Role>,
    users: HashMap<UserId, User>,
}

impl Collections {
    fn permission_name_taken(&self, name: &str, except: Option<PermissionId>) -> bool {
        self.permissions
            .values()
            .any(|p| p.name == name && Some(p.id) != except)
    }

    fn role_name_taken(&self, name: &str, except: Option<RoleId>) -> bool {
        self.roles
            .values()
            .any(|r| r.name == name && Some(r.id) != except)
    }

    fn check_user_unique(&self, user: &User) -> DomainResult<()> {
        for other in self.users.values().filter(|u| u.id != user.id) {
            if other.email == user.email {
                return Err(DomainError::conflict(format!("email '{}' already exists", user.email)));
            }
            if other.username == user.username {
                return Err(DomainError::conflict(format!(
                    "username '{}' already exists",
                    user.username
                )));
            }
        }
        Ok(())
    }
}

/// In-memory auth store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryAuthStore {
    inner: RwLock<Collections>,
}

impl InMemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthStore for InMemoryAuthStore {
    // ── permissions ──────────────────────────────────────────────────────────

    async fn insert_permission(&self, permission: Permission) -> DomainResult<Permission> {
        let mut c = self.inner.write().await;
        if c.permission_name_taken(&permission.name, None) {
            return Err(DomainError::conflict(format!(
                "permission '{}' already exists",
                permission.name
            )));
        }
        c.permissions.insert(permission.id, permission.clone());
        Ok(permission)
    }

    async fn update_permission(&self, permission: Permission) -> DomainResult<Permission> {
        let mut c = self.inner.write().await;
        if !c.permissions.contains_key(&permission.id) {
            return Err(DomainError::not_found(format!("permission {}", permission.id)));
        }
        if c.permission_name_taken(&permission.name, Some(permission.id)) {
            return Err(DomainError::conflict(format!(
                "permission '{}' already exists",
                permission.name
            )));
        }
        c.permissions.insert(permission.id, permission.clone());
        Ok(permission)
    }

    async fn permission(&self, id: PermissionId) -> DomainResult<Option<Permission>> {
        Ok(self.inner.read().await.permissions.get(&id).cloned())
    }

    async fn permission_by_name(&self, name: &str) -> DomainResult<Option<Permission>> {
        let c = self.inner.read().await;
        Ok(c.permissions.values().find(|p| p.name == name).cloned())
    }

    async fn list_permissions(&self) -> DomainResult<Vec<Permission>> {
        Ok(self.inner.read().await.permissions.values().cloned().collect())
    }

    async fn permissions_by_ids(&self, ids: &[PermissionId]) -> DomainResult<Vec<Permission>> {
        let c = self.inner.read().await;
        Ok(ids.iter().filter_map(|id| c.permissions.get(id).cloned()).collect())
    }

    // ── roles ────────────────────────────────────────────────────────────────

    async fn insert_role(&self, role: Role) -> DomainResult<Role> {
        let mut c = self.inner.write().await;
        if c.role_name_taken(&role.name, None) {
            return Err(DomainError::conflict(format!("role '{}' already exists", role.name)));
        }
        c.roles.insert(role.id, role.clone());
        Ok(role)
    }

    async fn update_role(&self, role: Role) -> DomainResult<Role> {
        let mut c = self.inner.write().await;
        if !c.roles.contains_key(&role.id) {
            return Err(DomainError::not_found(format!("role {}", role.id)));
        }
        if c.role_name_taken(&role.name, Some(role.id)) {
            return Err(DomainError::conflict(format!("role '{}' already exists", role.name)));
        }
        c.roles.insert(role.id, role.clone());
        Ok(role)
    }

    async fn role(&self, id: RoleId) -> DomainResult<Option<Role>> {
        Ok(self.inner.read().await.roles.get(&id).cloned())
    }

    async fn role_by_name(&self, name: &str) -> DomainResult<Option<Role>> {
        let c = self.inner.read().await;
        Ok(c.roles.values().find(|r| r.name == name).cloned())
    }

    async fn list_roles(&self) -> DomainResult<Vec<Role>> {
        Ok(self.inner.read().await.roles.values().cloned().collect())
    }

    async fn roles_by_ids(&self, ids: &[RoleId]) -> DomainResult<Vec<Role>> {
        let c = self.inner.read().await;
        Ok(ids.iter().filter_map(|id| c.roles.get(id).cloned()).collect())
    }

    async fn delete_role(&self, id: RoleId) -> DomainResult<()> {
        let mut c = self.inner.write().await;
        if !c.roles.contains_key(&id) {
            return Err(DomainError::not_found(format!("role {id}")));
        }
        let in_use = c.users.values().filter(|u| u.roles.contains(&id)).count();
        if in_use > 0 {
            return Err(DomainError::conflict(format!(
                "cannot delete role: {in_use} user(s) are assigned to this role"
            )));
        }
        c.roles.remove(&id);
        tracing::debug!(role_id = %id, "role removed from memory store");
        Ok(())
    }

    // ── users ────────────────────────────────────────────────────────────────

    async fn insert_user(&self, user: User) -> DomainResult<User> {
        let mut c = self.inner.write().await;
        if c.users.contains_key(&user.id) {
            return Err(DomainError::conflict(format!("user {} already exists", user.id)));
        }
        c.check_user_unique(&user)?;
        c.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, user: User) -> DomainResult<User> {
        let mut c = self.inner.write().await;
        if !c.users.contains_key(&user.id) {
            return Err(DomainError::not_found(format!("user {}", user.id)));
        }
        c.check_user_unique(&user)?;
        c.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn user(&self, id: UserId) -> DomainResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let c = self.inner.read().await;
        Ok(c.users.values().find(|u| u.email == email).cloned())
    }

    async fn user_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        let c = self.inner.read().await;
        Ok(c.users.values().find(|u| u.username == username).cloned())
    }

    async fn list_users(&self, offset: usize, limit: usize) -> DomainResult<UserSlice> {
        let c = self.inner.read().await;
        let mut all: Vec<&User> = c.users.values().collect();
        // Newest first; v7 ids break ties in creation order.
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(UserSlice {
            total: all.len() as u64,
            users: all.into_iter().skip(offset).take(limit).cloned().collect(),
        })
    }

    async fn count_users_with_role(&self, role_id: RoleId) -> DomainResult<u64> {
        let c = self.inner.read().await;
        Ok(c.users.values().filter(|u| u.roles.contains(&role_id)).count() as u64)
    }

    async fn delete_user(&self, id: UserId) -> DomainResult<()> {
        let mut c = self.inner.write().await;
        c.users
            .remove(&id)
            .ok_or_else(|| DomainError::not_found(format!("user {id}")))?;
        tracing::debug!(user_id = %id, "user removed from memory store");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use libris_auth::{Action, Resource};

    fn user(name: &str) -> User {
        User::new(
            name.to_string(),
            format!("{name}@example.com"),
            "hash".to_string(),
            name.to_string(),
            vec![],
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn permission_names_are_unique() {
        let store = InMemoryAuthStore::new();
        let now = Utc::now();
        let p = Permission::new("READ_BOOKS", Resource::BOOKS, Action::Read, "", now).unwrap();
        store.insert_permission(p).await.unwrap();

        let dup = Permission::new("read_books", Resource::BOOKS, Action::Read, "", now).unwrap();
        let err = store.insert_permission(dup).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn email_and_username_are_unique() {
        let store = InMemoryAuthStore::new();
        store.insert_user(user("alice")).await.unwrap();

        let mut same_email = user("bob");
        same_email.email = "alice@example.com".to_string();
        assert!(matches!(
            store.insert_user(same_email).await.unwrap_err(),
            DomainError::Conflict(_)
        ));

        let mut same_name = user("carol");
        same_name.username = "alice".to_string();
        assert!(matches!(
            store.insert_user(same_name).await.unwrap_err(),
            DomainError::Conflict(_)
        ));
    }

    #[tokio::test]
    async fn referenced_role_cannot_be_deleted() {
        let store = InMemoryAuthStore::new();
        let role = Role::new("READER", "Reads", vec![], false, Utc::now()).unwrap();
        store.insert_role(role.clone()).await.unwrap();

        let mut u = user("alice");
        u.roles = vec![role.id];
        store.insert_user(u).await.unwrap();

        assert!(matches!(
            store.delete_role(role.id).await.unwrap_err(),
            DomainError::Conflict(_)
        ));
        assert!(store.role(role.id).await.unwrap().is_some());
        assert_eq!(store.count_users_with_role(role.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn users_are_listed_newest_first() {
        let store = InMemoryAuthStore::new();
        let mut old = user("older");
        old.created_at = Utc::now() - Duration::hours(1);
        store.insert_user(old).await.unwrap();
        store.insert_user(user("newer")).await.unwrap();

        let page = store.list_users(0, 1).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.users.len(), 1);
        assert_eq!(page.users[0].username, "newer");

        let rest = store.list_users(1, 10).await.unwrap();
        assert_eq!(rest.users[0].username, "older");
    }

    #[tokio::test]
    async fn missing_records_report_not_found() {
        let store = InMemoryAuthStore::new();
        assert!(matches!(
            store.delete_user(UserId::new()).await.unwrap_err(),
            DomainError::NotFound(_)
        ));
        assert!(matches!(
            store.delete_role(RoleId::new()).await.unwrap_err(),
            DomainError::NotFound(_)
        ));
        assert!(matches!(
            store.update_user(user("ghost")).await.unwrap_err(),
            DomainError::NotFound(_)
        ));
    }
}
