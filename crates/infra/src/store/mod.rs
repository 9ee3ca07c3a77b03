//! Storage backends implementing [`libris_auth::AuthStore`].

pub mod in_memory;

pub use in_memory::InMemoryAuthStore;
