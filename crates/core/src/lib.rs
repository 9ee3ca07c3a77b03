//! `libris-core`: identifiers and the error taxonomy shared by every crate.
//!
//! This crate contains no IO and no policy; it only names things.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult, UnauthorizedReason};
pub use id::{PermissionId, RoleId, UserId};
