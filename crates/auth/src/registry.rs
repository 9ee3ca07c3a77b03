use std::collections::HashMap;

use chrono::Utc;
use serde::Deserialize;

use libris_core::{DomainError, DomainResult, PermissionId, RoleId};

use crate::catalog::PermissionCatalog;
use crate::permissions::{normalize_name, Permission};
use crate::roles::{dedup_ids, Role, RoleDetails};
use crate::store::SharedStore;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRole {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub permission_ids: Vec<PermissionId>,
}

/// Partial update: only supplied fields change.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleUpdate {
    pub description: Option<String>,
    pub permission_ids: Option<Vec<PermissionId>>,
    pub active: Option<bool>,
}

/// Management surface over the role collection.
#[derive(Clone)]
pub struct RoleRegistry {
    store: SharedStore,
    catalog: PermissionCatalog,
}

impl RoleRegistry {
    pub fn new(store: SharedStore, catalog: PermissionCatalog) -> Self {
        Self { store, catalog }
    }

    pub async fn create(&self, input: NewRole) -> DomainResult<Role> {
        let name = normalize_name(&input.name, "role")?;
        let description = input.description.trim();
        if description.is_empty() {
            return Err(DomainError::invalid_input("role description is required"));
        }
        if self.store.role_by_name(&name).await?.is_some() {
            return Err(DomainError::conflict(format!("role '{name}' already exists")));
        }

        let permissions = self.validated_permissions(input.permission_ids).await?;
        let role = Role::new(&name, description, permissions, false, Utc::now())?;
        let created = self.store.insert_role(role).await?;
        tracing::info!(role = %created.name, permissions = created.permissions.len(), "role created");
        Ok(created)
    }

    /// Apply the supplied fields. A blank description is ignored, and system
    /// roles cannot be deactivated.
    pub async fn update(&self, id: RoleId, update: RoleUpdate) -> DomainResult<Role> {
        let mut role = self.get(id).await?;
        let now = Utc::now();

        if role.is_system && update.active == Some(false) {
            return Err(DomainError::forbidden("cannot deactivate system roles"));
        }
        if let Some(description) = update.description.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            role.description = description.to_string();
        }
        if let Some(ids) = update.permission_ids {
            let permissions = self.validated_permissions(ids).await?;
            role.set_permissions(permissions, now);
        }
        if let Some(active) = update.active {
            role.active = active;
        }
        role.updated_at = now;

        let saved = self.store.update_role(role).await?;
        tracing::info!(role = %saved.name, "role updated");
        Ok(saved)
    }

    /// Delete a non-system role that no user references.
    ///
    /// Checks run in order: existence, system flag, references. The store
    /// repeats the reference check under its own lock.
    pub async fn delete(&self, id: RoleId) -> DomainResult<()> {
        let role = self.get(id).await?;
        if role.is_system {
            return Err(DomainError::forbidden("cannot delete system roles"));
        }
        let in_use = self.store.count_users_with_role(id).await?;
        if in_use > 0 {
            return Err(DomainError::conflict(format!(
                "cannot delete role: {in_use} user(s) are assigned to this role"
            )));
        }
        self.store.delete_role(id).await?;
        tracing::info!(role = %role.name, "role deleted");
        Ok(())
    }

    /// All roles ordered by name.
    pub async fn list(&self) -> DomainResult<Vec<Role>> {
        let mut roles = self.store.list_roles().await?;
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }

    /// All roles ordered by name, each with its stored permissions expanded.
    ///
    /// Inactive permissions are shown too; this is a management view, not a
    /// resolution.
    pub async fn list_detailed(&self) -> DomainResult<Vec<RoleDetails>> {
        let roles = self.list().await?;
        let all_ids: Vec<PermissionId> = roles.iter().flat_map(|r| r.permissions.iter().copied()).collect();
        let by_id: HashMap<PermissionId, Permission> = self
            .store
            .permissions_by_ids(&dedup_ids(all_ids))
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok(roles
            .into_iter()
            .map(|role| {
                let permission_details = role
                    .permissions
                    .iter()
                    .filter_map(|id| by_id.get(id).cloned())
                    .collect();
                RoleDetails { role, permission_details }
            })
            .collect())
    }

    pub async fn get(&self, id: RoleId) -> DomainResult<Role> {
        self.store
            .role(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("role {id}")))
    }

    pub async fn by_name(&self, name: &str) -> DomainResult<Option<Role>> {
        let name = normalize_name(name, "role")?;
        self.store.role_by_name(&name).await
    }

    /// Active roles among `ids`; unknown and inactive ids are dropped.
    pub async fn find_by_ids(&self, ids: &[RoleId]) -> DomainResult<Vec<Role>> {
        let ids = dedup_ids(ids.to_vec());
        let found = self.store.roles_by_ids(&ids).await?;
        Ok(found.into_iter().filter(|r| r.active).collect())
    }

    /// Resolve role ids strictly: every distinct id must name an active role.
    pub async fn validated_roles(&self, ids: Vec<RoleId>) -> DomainResult<Vec<RoleId>> {
        let ids = dedup_ids(ids);
        let found = self.find_by_ids(&ids).await?;
        if found.len() < ids.len() {
            return Err(DomainError::invalid_input("some roles are invalid or inactive"));
        }
        Ok(ids)
    }

    async fn validated_permissions(&self, ids: Vec<PermissionId>) -> DomainResult<Vec<PermissionId>> {
        let ids = dedup_ids(ids);
        let found = self.catalog.find_by_ids(&ids).await?;
        if found.len() < ids.len() {
            return Err(DomainError::invalid_input("some permissions are invalid or inactive"));
        }
        Ok(ids)
    }
}
