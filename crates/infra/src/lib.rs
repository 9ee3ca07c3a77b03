//! Infrastructure layer: storage backends for the authorization core.

pub mod store;

pub use store::InMemoryAuthStore;
