//! Request DTOs.
//!
//! Text fields default to empty so that a missing field reaches the service
//! layer and comes back as `INVALID_INPUT` instead of an extractor rejection.
//! Id lists arrive as strings for the same reason and are parsed here.

use core::str::FromStr;

use serde::Deserialize;

use libris_auth::{NewAccount, NewRole, RoleUpdate, UserUpdate};
use libris_core::{DomainError, DomainResult};

fn parse_ids<T>(raw: Vec<String>) -> DomainResult<Vec<T>>
where
    T: FromStr<Err = DomainError>,
{
    raw.iter().map(|id| id.parse()).collect()
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub role_ids: Option<Vec<String>>,
}

impl TryFrom<RegisterRequest> for NewAccount {
    type Error = DomainError;

    fn try_from(req: RegisterRequest) -> DomainResult<Self> {
        Ok(NewAccount {
            username: req.username,
            email: req.email,
            password: req.password,
            full_name: req.full_name,
            role_ids: req.role_ids.map(parse_ids).transpose()?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub role_ids: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

impl TryFrom<UpdateUserRequest> for UserUpdate {
    type Error = DomainError;

    fn try_from(req: UpdateUserRequest) -> DomainResult<Self> {
        Ok(UserUpdate {
            role_ids: req.role_ids.map(parse_ids).transpose()?,
            is_active: req.is_active,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub permission_ids: Vec<String>,
}

impl TryFrom<CreateRoleRequest> for NewRole {
    type Error = DomainError;

    fn try_from(req: CreateRoleRequest) -> DomainResult<Self> {
        Ok(NewRole {
            name: req.name,
            description: req.description,
            permission_ids: parse_ids(req.permission_ids)?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    pub description: Option<String>,
    pub permission_ids: Option<Vec<String>>,
    pub active: Option<bool>,
}

impl TryFrom<UpdateRoleRequest> for RoleUpdate {
    type Error = DomainError;

    fn try_from(req: UpdateRoleRequest) -> DomainResult<Self> {
        Ok(RoleUpdate {
            description: req.description,
            permission_ids: req.permission_ids.map(parse_ids).transpose()?,
            active: req.active,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
    pub confirm_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckPermissionRequest {
    #[serde(default)]
    pub resource: String,
    #[serde(default)]
    pub action: String,
}

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl ListUsersQuery {
    pub const DEFAULT_LIMIT: u64 = 10;

    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1)
    }

    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT)
    }
}

/// Raw permission filter; parsed into `PermissionFilter` by the handler.
#[derive(Debug, Default, Deserialize)]
pub struct PermissionQuery {
    pub resource: Option<String>,
    pub action: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_permission_id_is_invalid_input() {
        let req = CreateRoleRequest {
            name: "CURATOR".into(),
            description: "Curates".into(),
            permission_ids: vec!["not-a-uuid".into()],
        };
        let err = NewRole::try_from(req).unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
    }

    #[test]
    fn missing_role_fields_deserialize_to_empty() {
        let req: CreateRoleRequest = serde_json::from_str(r#"{"name":"X2"}"#).unwrap();
        let role = NewRole::try_from(req).unwrap();
        assert_eq!(role.description, "");
        assert!(role.permission_ids.is_empty());
    }

    #[test]
    fn absent_role_ids_stay_absent() {
        let req: UpdateUserRequest = serde_json::from_str(r#"{"isActive":false}"#).unwrap();
        let update = UserUpdate::try_from(req).unwrap();
        assert!(update.role_ids.is_none());
        assert_eq!(update.is_active, Some(false));
    }
}
