use std::sync::Arc;

use anyhow::Context;

use libris_auth::{Argon2Hasher, AuthCore, SharedStore};
use libris_infra::InMemoryAuthStore;

use crate::config::ApiConfig;

/// Services shared by every handler.
#[derive(Clone)]
pub struct AppServices {
    pub core: AuthCore,
}

/// Wire the store and auth core, then seed the bootstrap catalog.
pub async fn build_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    let store: SharedStore = Arc::new(InMemoryAuthStore::new());
    let hasher = Arc::new(Argon2Hasher::from_config(&config.auth).context("build secret hasher")?);

    let core = AuthCore::new(store, hasher, &config.auth);
    let report = core
        .seed(&config.admin)
        .await
        .context("seed bootstrap permissions, roles and admin")?;

    tracing::info!(
        backend = core.store.backend_name(),
        permissions_created = report.permissions_created,
        roles_created = report.roles_created,
        roles_updated = report.roles_updated,
        admin_created = report.admin_created,
        "auth core ready"
    );

    Ok(AppServices { core })
}
