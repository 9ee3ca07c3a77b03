use std::sync::Arc;

use libris_core::DomainResult;

use crate::accounts::AccountService;
use crate::catalog::PermissionCatalog;
use crate::config::AuthConfig;
use crate::credentials::CredentialVerifier;
use crate::password::SecretHasher;
use crate::registry::RoleRegistry;
use crate::resolver::IdentityResolver;
use crate::seed::{seed, DefaultAdmin, SeedReport};
use crate::session::SessionIssuer;
use crate::store::SharedStore;

/// Every authorization-core service wired over one store.
#[derive(Clone)]
pub struct AuthCore {
    pub store: SharedStore,
    pub hasher: Arc<dyn SecretHasher>,
    pub catalog: PermissionCatalog,
    pub registry: RoleRegistry,
    pub issuer: SessionIssuer,
    pub resolver: IdentityResolver,
    pub credentials: CredentialVerifier,
    pub accounts: AccountService,
}

impl AuthCore {
    pub fn new(store: SharedStore, hasher: Arc<dyn SecretHasher>, config: &AuthConfig) -> Self {
        let issuer = SessionIssuer::from_config(config);
        let catalog = PermissionCatalog::new(store.clone());
        let registry = RoleRegistry::new(store.clone(), catalog.clone());
        let resolver = IdentityResolver::new(store.clone(), issuer.clone());
        let credentials =
            CredentialVerifier::new(store.clone(), hasher.clone(), issuer.clone(), resolver.clone());
        let accounts = AccountService::new(store.clone(), hasher.clone(), registry.clone());

        Self {
            store,
            hasher,
            catalog,
            registry,
            issuer,
            resolver,
            credentials,
            accounts,
        }
    }

    /// Run bootstrap seeding against this core's store.
    pub async fn seed(&self, admin: &DefaultAdmin) -> DomainResult<SeedReport> {
        seed(&self.store, self.hasher.as_ref(), admin).await
    }
}
