//! Token → identity resolution.
//!
//! Expansion is two explicit stages over id lookups: user → roles, then
//! roles → permissions. Both stages are tolerant: a reference that is missing
//! or points at an inactive record is dropped, never an error.

use std::collections::{HashMap, HashSet};

use libris_core::{DomainError, DomainResult, PermissionId, RoleId, UnauthorizedReason, UserId};

use crate::permissions::Permission;
use crate::principal::ResolvedIdentity;
use crate::roles::{dedup_ids, Role};
use crate::session::SessionIssuer;
use crate::store::SharedStore;
use crate::user::{User, UserView};

#[derive(Clone)]
pub struct IdentityResolver {
    store: SharedStore,
    issuer: SessionIssuer,
}

impl IdentityResolver {
    pub fn new(store: SharedStore, issuer: SessionIssuer) -> Self {
        Self { store, issuer }
    }

    /// Validate `token` and load the identity it names.
    pub async fn resolve(&self, token: &str) -> DomainResult<ResolvedIdentity> {
        let user_id = self.issuer.validate(token)?;
        self.resolve_user(user_id).await
    }

    /// Load and expand a user by id, without a token.
    pub async fn resolve_user(&self, user_id: UserId) -> DomainResult<ResolvedIdentity> {
        let user = self
            .store
            .user(user_id)
            .await?
            .ok_or(DomainError::unauthorized(UnauthorizedReason::AccountNotFound))?;
        if !user.active {
            return Err(DomainError::unauthorized(UnauthorizedReason::AccountInactive));
        }
        self.expand(&user).await
    }

    /// Expand an already-loaded user.
    pub async fn expand(&self, user: &User) -> DomainResult<ResolvedIdentity> {
        let roles = retain_active_roles(&user.roles, self.store.roles_by_ids(&user.roles).await?);

        let referenced: Vec<PermissionId> =
            dedup_ids(roles.iter().flat_map(|r| r.permissions.iter().copied()).collect());
        let permissions = self.store.permissions_by_ids(&referenced).await?;
        let effective_permissions = union_active_permissions(&roles, permissions);

        tracing::debug!(
            user_id = %user.id,
            roles = roles.len(),
            permissions = effective_permissions.len(),
            "identity resolved"
        );

        Ok(ResolvedIdentity {
            user: UserView::from(user),
            roles,
            effective_permissions,
        })
    }
}

/// Stage one: keep the user's active roles, in the order the user lists them.
fn retain_active_roles(wanted: &[RoleId], found: Vec<Role>) -> Vec<Role> {
    let mut arena: HashMap<_, Role> = found.into_iter().map(|r| (r.id, r)).collect();
    wanted
        .iter()
        .filter_map(|id| arena.remove(id))
        .filter(|r| r.active)
        .collect()
}

/// Stage two: union of every active permission reachable from `roles`, keyed by
/// permission id and sorted for display.
fn union_active_permissions(roles: &[Role], found: Vec<Permission>) -> Vec<Permission> {
    let arena: HashMap<PermissionId, Permission> = found.into_iter().map(|p| (p.id, p)).collect();
    let mut seen = HashSet::new();
    let mut effective: Vec<Permission> = roles
        .iter()
        .flat_map(|r| r.permissions.iter())
        .filter(|id| seen.insert(**id))
        .filter_map(|id| arena.get(id))
        .filter(|p| p.active)
        .cloned()
        .collect();
    effective.sort_by(Permission::display_order);
    effective
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::{Action, Resource};
    use chrono::Utc;

    fn perm(name: &str, action: Action, active: bool) -> Permission {
        let mut p = Permission::new(name, Resource::BOOKS, action, "", Utc::now()).unwrap();
        p.active = active;
        p
    }

    #[test]
    fn stage_one_drops_missing_and_inactive_roles() {
        let now = Utc::now();
        let kept = Role::new("KEPT", "", vec![], false, now).unwrap();
        let mut off = Role::new("OFF", "", vec![], false, now).unwrap();
        off.active = false;
        let dangling = RoleId::new();

        let wanted = vec![dangling, off.id, kept.id];
        let roles = retain_active_roles(&wanted, vec![kept.clone(), off]);
        assert_eq!(roles, vec![kept]);
    }

    #[test]
    fn stage_two_deduplicates_and_filters_inactive() {
        let now = Utc::now();
        let read = perm("READ_BOOKS", Action::Read, true);
        let gone = perm("DELETE_BOOKS", Action::Delete, false);
        let a = Role::new("A", "", vec![read.id, gone.id], false, now).unwrap();
        let b = Role::new("B", "", vec![read.id, PermissionId::new()], false, now).unwrap();

        let effective = union_active_permissions(&[a, b], vec![read.clone(), gone]);
        assert_eq!(effective, vec![read]);
    }
}
