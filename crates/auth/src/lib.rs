//! `libris-auth`: the RBAC authorization core.
//!
//! Data model, session tokens, identity resolution and the access decision.
//! This crate is decoupled from HTTP; storage is reached only through
//! [`AuthStore`].

pub mod accounts;
pub mod authorize;
pub mod catalog;
pub mod claims;
pub mod config;
pub mod credentials;
pub mod password;
pub mod permissions;
pub mod principal;
pub mod registry;
pub mod resolver;
pub mod roles;
pub mod seed;
pub mod service;
pub mod session;
pub mod store;
pub mod user;

pub use accounts::{AccountService, NewAccount, Pagination, ProfileUpdate, UserPage, UserUpdate};
pub use authorize::{
    decide, explain, guard, has_role, AuthorizationExplanation, Denial, DenialKind, DenialReason,
    GrantSummary, RequiredPermission,
};
pub use catalog::{NewPermission, PermissionCatalog};
pub use claims::{validate_claims, SessionClaims, TokenValidationError};
pub use config::AuthConfig;
pub use credentials::{AuthenticateResult, CredentialVerifier};
pub use password::{Argon2Hasher, SecretHasher};
pub use permissions::{Action, Permission, PermissionFilter, Resource};
pub use principal::ResolvedIdentity;
pub use registry::{NewRole, RoleRegistry, RoleUpdate};
pub use resolver::IdentityResolver;
pub use roles::{Role, RoleDetails};
pub use seed::{seed, DefaultAdmin, SeedReport, SUPER_ADMIN_ROLE};
pub use service::AuthCore;
pub use session::{IssuedToken, SessionIssuer};
pub use store::{AuthStore, SharedStore, UserSlice};
pub use user::{User, UserView};
