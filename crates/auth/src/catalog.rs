use chrono::Utc;
use serde::Deserialize;

use libris_core::{DomainError, DomainResult, PermissionId};

use crate::permissions::{Action, Permission, PermissionFilter, Resource};
use crate::roles::dedup_ids;
use crate::store::SharedStore;

/// Raw input for a new permission, as received at the boundary.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPermission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub resource: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub description: String,
}

/// Management surface over the permission collection.
#[derive(Clone)]
pub struct PermissionCatalog {
    store: SharedStore,
}

impl PermissionCatalog {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn create(&self, input: NewPermission) -> DomainResult<Permission> {
        let action: Action = input.action.parse()?;
        let resource = Resource::new(&input.resource)?;
        let permission = Permission::new(&input.name, resource, action, input.description, Utc::now())?;

        if self.store.permission_by_name(&permission.name).await?.is_some() {
            return Err(DomainError::conflict(format!(
                "permission '{}' already exists",
                permission.name
            )));
        }

        let created = self.store.insert_permission(permission).await?;
        tracing::info!(permission = %created.name, "permission created");
        Ok(created)
    }

    /// Permissions matching `filter`, ordered by (resource, action).
    pub async fn list(&self, filter: &PermissionFilter) -> DomainResult<Vec<Permission>> {
        let mut all: Vec<Permission> = self
            .store
            .list_permissions()
            .await?
            .into_iter()
            .filter(|p| filter.matches(p))
            .collect();
        all.sort_by(Permission::display_order);
        Ok(all)
    }

    /// Active permissions among `ids`; unknown and inactive ids are dropped.
    ///
    /// Callers needing all-or-nothing semantics compare the result length to
    /// the number of distinct ids they asked for.
    pub async fn find_by_ids(&self, ids: &[PermissionId]) -> DomainResult<Vec<Permission>> {
        let ids = dedup_ids(ids.to_vec());
        let found = self.store.permissions_by_ids(&ids).await?;
        Ok(found.into_iter().filter(|p| p.active).collect())
    }

    pub async fn get(&self, id: PermissionId) -> DomainResult<Permission> {
        self.store
            .permission(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("permission {id}")))
    }

    /// Deactivate or reactivate a permission. Permissions are never deleted.
    pub async fn set_active(&self, id: PermissionId, active: bool) -> DomainResult<Permission> {
        let mut permission = self.get(id).await?;
        if permission.active == active {
            return Ok(permission);
        }
        permission.active = active;
        permission.updated_at = Utc::now();
        let saved = self.store.update_permission(permission).await?;
        tracing::info!(permission = %saved.name, active, "permission active flag changed");
        Ok(saved)
    }
}
