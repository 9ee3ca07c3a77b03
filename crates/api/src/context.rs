use std::sync::Arc;

use libris_auth::ResolvedIdentity;
use libris_core::UserId;

/// Identity context for a request.
///
/// Inserted by the auth middleware after resolution; present on every
/// protected route.
#[derive(Debug, Clone)]
pub struct IdentityContext(Arc<ResolvedIdentity>);

impl IdentityContext {
    pub fn new(identity: ResolvedIdentity) -> Self {
        Self(Arc::new(identity))
    }

    pub fn identity(&self) -> &ResolvedIdentity {
        &self.0
    }

    pub fn user_id(&self) -> UserId {
        self.0.user_id()
    }
}
