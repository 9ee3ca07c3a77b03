use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use libris_core::{DomainError, DomainResult, PermissionId};

/// Operation kind on a resource.
///
/// The set is closed: anything else is rejected when parsed at the boundary.
/// `Manage` is the blanket grant implying every other action on the same
/// resource.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    Manage,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Create,
        Action::Read,
        Action::Update,
        Action::Delete,
        Action::Manage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "CREATE",
            Action::Read => "READ",
            Action::Update => "UPDATE",
            Action::Delete => "DELETE",
            Action::Manage => "MANAGE",
        }
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Action {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CREATE" => Ok(Action::Create),
            "READ" => Ok(Action::Read),
            "UPDATE" => Ok(Action::Update),
            "DELETE" => Ok(Action::Delete),
            "MANAGE" => Ok(Action::Manage),
            other => Err(DomainError::invalid_input(format!(
                "action '{other}' must be one of CREATE, READ, UPDATE, DELETE, MANAGE"
            ))),
        }
    }
}

impl TryFrom<String> for Action {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Coarse-grained protected category (e.g. "BOOKS").
///
/// Always stored trimmed and upper-cased, so comparisons never need to
/// normalize again.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Resource(Cow<'static, str>);

impl Resource {
    pub const BOOKS: Resource = Resource(Cow::Borrowed("BOOKS"));
    pub const USERS: Resource = Resource(Cow::Borrowed("USERS"));
    pub const ROLES: Resource = Resource(Cow::Borrowed("ROLES"));
    pub const PERMISSIONS: Resource = Resource(Cow::Borrowed("PERMISSIONS"));

    pub fn new(name: impl AsRef<str>) -> DomainResult<Self> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(DomainError::invalid_input("resource cannot be empty"));
        }
        Ok(Self(Cow::Owned(trimmed.to_uppercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Resource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Resource {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Resource {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Resource::new(raw).map_err(serde::de::Error::custom)
    }
}

/// Trim and upper-case a catalog name (permission or role).
pub fn normalize_name(raw: &str, what: &str) -> DomainResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::invalid_input(format!("{what} name cannot be empty")));
    }
    Ok(trimmed.to_uppercase())
}

/// Capability atom: one (resource, action) grant with a unique name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: PermissionId,
    pub name: String,
    pub description: String,
    pub resource: Resource,
    pub action: Action,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Permission {
    pub fn new(
        name: &str,
        resource: Resource,
        action: Action,
        description: impl Into<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Ok(Self {
            id: PermissionId::new(),
            name: normalize_name(name, "permission")?,
            description: description.into().trim().to_string(),
            resource,
            action,
            active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Whether this single permission satisfies `(resource, action)`.
    ///
    /// Matches exactly, or through `MANAGE` on the same resource. Never
    /// widens the resource.
    pub fn grants(&self, resource: &Resource, action: Action) -> bool {
        self.resource == *resource && (self.action == action || self.action == Action::Manage)
    }

    /// Stable display ordering: (resource, action), then name.
    pub fn display_order(a: &Permission, b: &Permission) -> core::cmp::Ordering {
        (&a.resource, a.action, &a.name).cmp(&(&b.resource, b.action, &b.name))
    }
}

/// Optional narrowing for catalog listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PermissionFilter {
    pub resource: Option<Resource>,
    pub action: Option<Action>,
    pub active: Option<bool>,
}

impl PermissionFilter {
    pub fn matches(&self, permission: &Permission) -> bool {
        self.resource.as_ref().is_none_or(|r| *r == permission.resource)
            && self.action.is_none_or(|a| a == permission.action)
            && self.active.is_none_or(|a| a == permission.active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_parses_case_insensitively() {
        assert_eq!(" read ".parse::<Action>().unwrap(), Action::Read);
        assert_eq!("Manage".parse::<Action>().unwrap(), Action::Manage);
    }

    #[test]
    fn unknown_action_is_invalid_input() {
        let err = "PUBLISH".parse::<Action>().unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn action_serializes_upper_case_and_accepts_lower_case() {
        assert_eq!(serde_json::to_string(&Action::Delete).unwrap(), "\"DELETE\"");
        let parsed: Action = serde_json::from_str("\"update\"").unwrap();
        assert_eq!(parsed, Action::Update);
    }

    #[test]
    fn resource_is_normalized_and_equal_to_constant() {
        assert_eq!(Resource::new(" books ").unwrap(), Resource::BOOKS);
        assert!(Resource::new("   ").is_err());
    }

    #[test]
    fn resource_deserialization_normalizes() {
        let r: Resource = serde_json::from_str("\"roles\"").unwrap();
        assert_eq!(r, Resource::ROLES);
    }

    #[test]
    fn manage_grants_every_action_on_its_resource_only() {
        let p = Permission::new("manage_books", Resource::BOOKS, Action::Manage, "", Utc::now())
            .unwrap();
        assert_eq!(p.name, "MANAGE_BOOKS");
        for action in Action::ALL {
            assert!(p.grants(&Resource::BOOKS, action));
            assert!(!p.grants(&Resource::USERS, action));
        }
    }

    #[test]
    fn filter_matches_on_every_supplied_field() {
        let p = Permission::new("READ_BOOKS", Resource::BOOKS, Action::Read, "", Utc::now())
            .unwrap();
        assert!(PermissionFilter::default().matches(&p));
        let by_resource = PermissionFilter {
            resource: Some(Resource::BOOKS),
            ..Default::default()
        };
        assert!(by_resource.matches(&p));
        let wrong_action = PermissionFilter {
            action: Some(Action::Delete),
            ..Default::default()
        };
        assert!(!wrong_action.matches(&p));
        let inactive_only = PermissionFilter {
            active: Some(false),
            ..Default::default()
        };
        assert!(!inactive_only.matches(&p));
    }
}
