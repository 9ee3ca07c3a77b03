use serde::Serialize;

use libris_core::UserId;

use crate::authorize::decide;
use crate::permissions::{Action, Permission, Resource};
use crate::roles::Role;
use crate::user::UserView;

/// A fully resolved identity for authorization decisions.
///
/// Built fresh on every authenticated request by the identity resolver and
/// never cached across requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedIdentity {
    pub user: UserView,
    /// Active roles only; dangling or disabled references are already gone.
    pub roles: Vec<Role>,
    /// De-duplicated by permission id.
    pub effective_permissions: Vec<Permission>,
}

impl ResolvedIdentity {
    pub fn user_id(&self) -> UserId {
        self.user.id
    }

    pub fn can(&self, resource: &Resource, action: Action) -> bool {
        decide(&self.effective_permissions, resource, action)
    }

    pub fn has_role(&self, name: &str) -> bool {
        let wanted = name.trim();
        self.roles.iter().any(|r| r.name.eq_ignore_ascii_case(wanted))
    }

    /// Permission names, in resolution order.
    pub fn permission_names(&self) -> Vec<String> {
        self.effective_permissions.iter().map(|p| p.name.clone()).collect()
    }
}
