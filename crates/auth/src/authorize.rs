use serde::Serialize;

use libris_core::{DomainError, UnauthorizedReason};

use crate::permissions::{Action, Permission, Resource};
use crate::principal::ResolvedIdentity;

/// Decide whether `permissions` allow `action` on `resource`.
///
/// - No IO
/// - No panics
/// - Default deny; `MANAGE` elevates the action, never the resource
pub fn decide<'a, I>(permissions: I, resource: &Resource, action: Action) -> bool
where
    I: IntoIterator<Item = &'a Permission>,
{
    permissions.into_iter().any(|p| p.grants(resource, action))
}

/// The (resource, action) pair an operation requires.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RequiredPermission {
    pub resource: Resource,
    pub action: Action,
}

impl RequiredPermission {
    pub fn new(resource: Resource, action: Action) -> Self {
        Self { resource, action }
    }

    /// Parse raw strings, normalizing case.
    pub fn parse(resource: &str, action: &str) -> Result<Self, DomainError> {
        Ok(Self {
            resource: Resource::new(resource)?,
            action: action.parse()?,
        })
    }
}

impl core::fmt::Display for RequiredPermission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.resource, self.action)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Guard
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenialKind {
    /// No identity was established.
    Unauthorized,
    /// Identity established, grant missing.
    Forbidden,
}

/// Structured reason for a rejected request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Denial {
    pub kind: DenialKind,
    pub message: String,
    pub required: RequiredPermission,
}

/// Allow or deny `required` for an optional identity.
pub fn guard(identity: Option<&ResolvedIdentity>, required: &RequiredPermission) -> Result<(), Denial> {
    let Some(identity) = identity else {
        return Err(Denial {
            kind: DenialKind::Unauthorized,
            message: "authentication required".to_string(),
            required: required.clone(),
        });
    };

    if identity.can(&required.resource, required.action) {
        Ok(())
    } else {
        tracing::debug!(user_id = %identity.user_id(), required = %required, "permission denied");
        Err(Denial {
            kind: DenialKind::Forbidden,
            message: format!("insufficient permissions: requires {required}"),
            required: required.clone(),
        })
    }
}

impl From<Denial> for DomainError {
    fn from(denial: Denial) -> Self {
        match denial.kind {
            DenialKind::Unauthorized => DomainError::unauthorized(UnauthorizedReason::MissingToken),
            DenialKind::Forbidden => DomainError::forbidden(denial.message),
        }
    }
}

/// Whether the identity holds an active role called `name` (case-insensitive).
pub fn has_role(identity: &ResolvedIdentity, name: &str) -> bool {
    identity.has_role(name)
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation
// ─────────────────────────────────────────────────────────────────────────────

/// One effective grant, flattened for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrantSummary {
    pub name: String,
    pub resource: Resource,
    pub action: Action,
}

impl From<&Permission> for GrantSummary {
    fn from(p: &Permission) -> Self {
        Self {
            name: p.name.clone(),
            resource: p.resource.clone(),
            action: p.action,
        }
    }
}

/// Detailed explanation of an authorization decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationExplanation {
    pub has_permission: bool,
    pub resource: Resource,
    pub action: Action,

    /// Name of the permission that satisfied the request, if any. An exact
    /// match is preferred over a `MANAGE` grant.
    pub granted_by: Option<String>,

    pub roles: Vec<String>,
    pub user_permissions: Vec<GrantSummary>,

    /// If denied, this explains what was missing.
    pub denial_reason: Option<DenialReason>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DenialReason {
    pub kind: DenialKind,
    pub message: String,
    pub suggestions: Vec<String>,
}

/// Explain why a request would be allowed or denied for `identity`.
pub fn explain(identity: &ResolvedIdentity, required: &RequiredPermission) -> AuthorizationExplanation {
    let perms = &identity.effective_permissions;
    let exact = perms
        .iter()
        .find(|p| p.resource == required.resource && p.action == required.action);
    let manage = perms
        .iter()
        .find(|p| p.resource == required.resource && p.action == Action::Manage);
    let granted_by = exact.or(manage).map(|p| p.name.clone());

    let denial_reason = if granted_by.is_some() {
        None
    } else {
        let mut suggestions = vec![
            format!("Assign a role that grants {required}"),
            format!(
                "Assign a role that grants {}:{} (implies every action)",
                required.resource,
                Action::Manage
            ),
        ];
        if perms.iter().all(|p| p.resource != required.resource) {
            suggestions.push(format!(
                "No current permission touches resource {}",
                required.resource
            ));
        }
        Some(DenialReason {
            kind: DenialKind::Forbidden,
            message: format!("missing required permission {required}"),
            suggestions,
        })
    };

    AuthorizationExplanation {
        has_permission: granted_by.is_some(),
        resource: required.resource.clone(),
        action: required.action,
        granted_by,
        roles: identity.roles.iter().map(|r| r.name.clone()).collect(),
        user_permissions: perms.iter().map(GrantSummary::from).collect(),
        denial_reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::Role;
    use crate::user::{User, UserView};
    use chrono::Utc;
    use proptest::prelude::*;

    fn perm(resource: &Resource, action: Action) -> Permission {
        let name = format!("{action}_{resource}");
        Permission::new(&name, resource.clone(), action, "", Utc::now()).unwrap()
    }

    fn identity(perms: Vec<Permission>) -> ResolvedIdentity {
        let user = User::new(
            "reader".into(),
            "reader@example.com".into(),
            "x".into(),
            "Reader".into(),
            vec![],
            Utc::now(),
        );
        let role = Role::new("READER", "", perms.iter().map(|p| p.id).collect(), false, Utc::now())
            .unwrap();
        ResolvedIdentity {
            user: UserView::from(&user),
            roles: vec![role],
            effective_permissions: perms,
        }
    }

    #[test]
    fn exact_match_allows_only_that_action() {
        let perms = vec![perm(&Resource::BOOKS, Action::Read)];
        assert!(decide(&perms, &Resource::BOOKS, Action::Read));
        assert!(!decide(&perms, &Resource::BOOKS, Action::Delete));
        assert!(!decide(&perms, &Resource::USERS, Action::Read));
    }

    #[test]
    fn empty_set_denies() {
        assert!(!decide(&Vec::<Permission>::new(), &Resource::BOOKS, Action::Read));
    }

    #[test]
    fn parse_normalizes_case_and_rejects_unknown_actions() {
        let r = RequiredPermission::parse("books", "read").unwrap();
        assert_eq!(r, RequiredPermission::new(Resource::BOOKS, Action::Read));
        assert_eq!(r.to_string(), "BOOKS:READ");
        assert!(RequiredPermission::parse("books", "publish").is_err());
    }

    #[test]
    fn guard_without_identity_is_unauthorized() {
        let req = RequiredPermission::new(Resource::BOOKS, Action::Read);
        let denial = guard(None, &req).unwrap_err();
        assert_eq!(denial.kind, DenialKind::Unauthorized);
        assert!(matches!(DomainError::from(denial), DomainError::Unauthorized(_)));
    }

    #[test]
    fn guard_with_missing_grant_is_forbidden() {
        let id = identity(vec![perm(&Resource::BOOKS, Action::Read)]);
        assert!(guard(Some(&id), &RequiredPermission::new(Resource::BOOKS, Action::Read)).is_ok());

        let denial = guard(Some(&id), &RequiredPermission::new(Resource::ROLES, Action::Read)).unwrap_err();
        assert_eq!(denial.kind, DenialKind::Forbidden);
        assert!(matches!(DomainError::from(denial), DomainError::Forbidden(_)));
    }

    #[test]
    fn explain_prefers_exact_match_over_manage() {
        let id = identity(vec![
            perm(&Resource::BOOKS, Action::Manage),
            perm(&Resource::BOOKS, Action::Read),
        ]);
        let e = explain(&id, &RequiredPermission::new(Resource::BOOKS, Action::Read));
        assert!(e.has_permission);
        assert_eq!(e.granted_by.as_deref(), Some("READ_BOOKS"));
        assert!(e.denial_reason.is_none());

        let e = explain(&id, &RequiredPermission::new(Resource::BOOKS, Action::Delete));
        assert_eq!(e.granted_by.as_deref(), Some("MANAGE_BOOKS"));
    }

    #[test]
    fn explain_denial_carries_suggestions() {
        let id = identity(vec![perm(&Resource::BOOKS, Action::Read)]);
        let e = explain(&id, &RequiredPermission::new(Resource::USERS, Action::Update));
        assert!(!e.has_permission);
        assert_eq!(e.roles, vec!["READER".to_string()]);
        let reason = e.denial_reason.unwrap();
        assert_eq!(reason.kind, DenialKind::Forbidden);
        assert_eq!(reason.suggestions.len(), 3);
    }

    #[test]
    fn has_role_ignores_case() {
        let id = identity(vec![]);
        assert!(has_role(&id, "reader"));
        assert!(!has_role(&id, "ADMIN"));
    }

    fn arb_action() -> impl Strategy<Value = Action> {
        prop::sample::select(Action::ALL.to_vec())
    }

    fn arb_resource() -> impl Strategy<Value = Resource> {
        prop::sample::select(vec![
            Resource::BOOKS,
            Resource::USERS,
            Resource::ROLES,
            Resource::PERMISSIONS,
        ])
    }

    fn arb_permissions() -> impl Strategy<Value = Vec<Permission>> {
        prop::collection::vec((arb_resource(), arb_action()), 0..12)
            .prop_map(|pairs| pairs.iter().map(|(r, a)| perm(r, *a)).collect())
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 256, .. ProptestConfig::default() })]

        #[test]
        fn decide_is_deterministic(perms in arb_permissions(), r in arb_resource(), a in arb_action()) {
            prop_assert_eq!(decide(&perms, &r, a), decide(&perms, &r, a));
        }

        #[test]
        fn manage_grants_every_action(mut perms in arb_permissions(), r in arb_resource(), a in arb_action()) {
            perms.push(perm(&r, Action::Manage));
            prop_assert!(decide(&perms, &r, a));
        }

        #[test]
        fn no_matching_resource_always_denies(perms in arb_permissions(), r in arb_resource(), a in arb_action()) {
            let others: Vec<Permission> = perms.into_iter().filter(|p| p.resource != r).collect();
            prop_assert!(!decide(&others, &r, a));
        }

        #[test]
        fn decide_matches_explain(perms in arb_permissions(), r in arb_resource(), a in arb_action()) {
            let id = identity(perms);
            let e = explain(&id, &RequiredPermission::new(r.clone(), a));
            prop_assert_eq!(e.has_permission, decide(&id.effective_permissions, &r, a));
        }
    }
}
