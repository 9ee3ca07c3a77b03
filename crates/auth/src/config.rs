//! Authentication configuration.

/// Default session lifetime: 24 hours.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 86_400;

/// Configuration for token signing and secret hashing.
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret used to sign and verify session tokens.
    pub jwt_secret: String,
    /// Session token lifetime in seconds.
    pub token_ttl_secs: u64,
    /// Optional pepper prepended to secrets before hashing/verification.
    pub pepper: Option<String>,
    /// Argon2 memory cost in KiB.
    pub hash_memory_kib: u32,
    /// Argon2 iteration count.
    pub hash_iterations: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            pepper: None,
            hash_memory_kib: argon2::Params::DEFAULT_M_COST,
            hash_iterations: argon2::Params::DEFAULT_T_COST,
        }
    }
}

impl core::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("pepper", &self.pepper.as_ref().map(|_| "<redacted>"))
            .field("hash_memory_kib", &self.hash_memory_kib)
            .field("hash_iterations", &self.hash_iterations)
            .finish()
    }
}
