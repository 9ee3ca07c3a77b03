use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use libris_core::{DomainResult, PermissionId, RoleId};

use crate::permissions::{normalize_name, Permission};

/// Named set of permission references.
///
/// `permissions` is a non-owning relation: a role never controls the
/// lifecycle of the permissions it points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub description: String,
    pub permissions: Vec<PermissionId>,
    pub active: bool,
    pub is_system: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    pub fn new(
        name: &str,
        description: impl Into<String>,
        permissions: Vec<PermissionId>,
        is_system: bool,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Ok(Self {
            id: RoleId::new(),
            name: normalize_name(name, "role")?,
            description: description.into().trim().to_string(),
            permissions: dedup_ids(permissions),
            active: true,
            is_system,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace the permission set, keeping first-seen order.
    pub fn set_permissions(&mut self, permissions: Vec<PermissionId>, now: DateTime<Utc>) {
        self.permissions = dedup_ids(permissions);
        self.updated_at = now;
    }
}

/// Collapse duplicate ids while keeping the order callers supplied.
pub(crate) fn dedup_ids<T: Copy + Eq + std::hash::Hash>(ids: Vec<T>) -> Vec<T> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

/// A role with its permission references expanded for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleDetails {
    #[serde(flatten)]
    pub role: Role,
    pub permission_details: Vec<Permission>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_upper_cased_and_ids_deduplicated() {
        let p = PermissionId::new();
        let role = Role::new(" reader ", "Reads things", vec![p, p], false, Utc::now()).unwrap();
        assert_eq!(role.name, "READER");
        assert_eq!(role.permissions, vec![p]);
        assert!(role.active);
        assert!(!role.is_system);
    }

    #[test]
    fn blank_name_is_rejected() {
        assert!(Role::new("  ", "", vec![], false, Utc::now()).is_err());
    }

    #[test]
    fn serializes_with_camel_case_flags() {
        let role = Role::new("ADMIN", "", vec![], true, Utc::now()).unwrap();
        let json = serde_json::to_value(&role).unwrap();
        assert_eq!(json["isSystem"], serde_json::Value::Bool(true));
    }
}
