//! Idempotent bootstrap data: the permission catalog, the five system roles
//! and one default administrator.
//!
//! Every step is an upsert keyed by name, so running the seed on an already
//! seeded store changes nothing except resetting system role grants.

use chrono::Utc;
use serde::Serialize;

use libris_core::{DomainError, DomainResult, PermissionId};

use crate::password::SecretHasher;
use crate::permissions::{Action, Permission, Resource};
use crate::roles::Role;
use crate::store::SharedStore;
use crate::user::{normalize_email, User, SEED_ADMIN_USERNAME};

pub const SUPER_ADMIN_ROLE: &str = "SUPER_ADMIN";

const SEED_RESOURCES: [Resource; 4] = [
    Resource::BOOKS,
    Resource::USERS,
    Resource::ROLES,
    Resource::PERMISSIONS,
];

const SEED_ACTIONS: [Action; 5] = [
    Action::Read,
    Action::Create,
    Action::Update,
    Action::Delete,
    Action::Manage,
];

struct SystemRole {
    name: &'static str,
    description: &'static str,
    /// `None` means every permission in the catalog.
    grants: Option<&'static [&'static str]>,
}

const SYSTEM_ROLES: [SystemRole; 5] = [
    SystemRole {
        name: SUPER_ADMIN_ROLE,
        description: "Super Administrator with full system access",
        grants: None,
    },
    SystemRole {
        name: "ADMIN",
        description: "Administrator with management access",
        grants: Some(&["MANAGE_BOOKS", "READ_USERS", "UPDATE_USERS", "READ_ROLES", "READ_PERMISSIONS"]),
    },
    SystemRole {
        name: "MANAGER",
        description: "Manager with books and users management",
        grants: Some(&["MANAGE_BOOKS", "READ_USERS", "UPDATE_USERS"]),
    },
    SystemRole {
        name: "LIBRARIAN",
        description: "Librarian with books management access",
        grants: Some(&["READ_BOOKS", "CREATE_BOOKS", "UPDATE_BOOKS"]),
    },
    SystemRole {
        name: "USER",
        description: "Regular user with read-only access",
        grants: Some(&["READ_BOOKS"]),
    },
];

/// Credentials for the bootstrap administrator.
#[derive(Clone)]
pub struct DefaultAdmin {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

impl Default for DefaultAdmin {
    fn default() -> Self {
        Self {
            email: "admin@example.com".to_string(),
            password: "admin123".to_string(),
            full_name: "System Administrator".to_string(),
        }
    }
}

impl core::fmt::Debug for DefaultAdmin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DefaultAdmin")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("full_name", &self.full_name)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub permissions_created: usize,
    pub roles_created: usize,
    pub roles_updated: usize,
    pub admin_created: bool,
}

fn description_for(resource: &Resource, action: Action) -> String {
    let noun = resource.as_str().to_lowercase();
    match action {
        Action::Manage => format!("Full access to {noun}"),
        other => {
            let verb = other.as_str();
            let mut chars = verb.chars();
            let head = chars.next().map(|c| c.to_string()).unwrap_or_default();
            format!("{head}{} {noun}", chars.as_str().to_lowercase())
        }
    }
}

/// Seed permissions, system roles and the default admin.
pub async fn seed(
    store: &SharedStore,
    hasher: &dyn SecretHasher,
    admin: &DefaultAdmin,
) -> DomainResult<SeedReport> {
    let mut report = SeedReport::default();
    let now = Utc::now();

    for resource in &SEED_RESOURCES {
        for action in SEED_ACTIONS {
            let name = format!("{action}_{resource}");
            if store.permission_by_name(&name).await?.is_some() {
                continue;
            }
            let permission = Permission::new(&name, resource.clone(), action, description_for(resource, action), now)?;
            store.insert_permission(permission).await?;
            report.permissions_created += 1;
        }
    }

    let catalog = store.list_permissions().await?;
    let id_of = |name: &str| -> DomainResult<PermissionId> {
        catalog
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.id)
            .ok_or_else(|| DomainError::internal(format!("seed permission {name} missing")))
    };

    for system_role in &SYSTEM_ROLES {
        let grants: Vec<PermissionId> = match system_role.grants {
            None => catalog.iter().map(|p| p.id).collect(),
            Some(names) => names.iter().map(|n| id_of(*n)).collect::<DomainResult<_>>()?,
        };

        match store.role_by_name(system_role.name).await? {
            Some(mut role) => {
                role.description = system_role.description.to_string();
                role.is_system = true;
                role.set_permissions(grants, now);
                store.update_role(role).await?;
                report.roles_updated += 1;
            }
            None => {
                let role = Role::new(system_role.name, system_role.description, grants, true, now)?;
                store.insert_role(role).await?;
                report.roles_created += 1;
            }
        }
    }

    if store.user_by_username(SEED_ADMIN_USERNAME).await?.is_none() {
        let super_admin = store
            .role_by_name(SUPER_ADMIN_ROLE)
            .await?
            .ok_or_else(|| DomainError::internal("SUPER_ADMIN role not found"))?;
        let user = User::new(
            SEED_ADMIN_USERNAME.to_string(),
            normalize_email(&admin.email)?,
            hasher.hash(&admin.password)?,
            admin.full_name.trim().to_string(),
            vec![super_admin.id],
            now,
        );
        store.insert_user(user).await?;
        report.admin_created = true;
    }

    tracing::info!(
        permissions_created = report.permissions_created,
        roles_created = report.roles_created,
        roles_updated = report.roles_updated,
        admin_created = report.admin_created,
        "seed completed"
    );
    Ok(report)
}
