use std::net::SocketAddr;

use anyhow::{ensure, Context, Result};

use libris_auth::{AuthConfig, DefaultAdmin};

pub const DEV_JWT_SECRET: &str = "dev-secret";

/// API configuration sourced from environment variables.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub auth: AuthConfig,
    pub admin: DefaultAdmin,
}

impl ApiConfig {
    /// Defaults everywhere except the signing secret.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            auth: AuthConfig {
                jwt_secret: jwt_secret.into(),
                ..AuthConfig::default()
            },
            admin: DefaultAdmin::default(),
        }
    }

    pub fn from_env() -> Result<Self> {
        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });
        let mut config = Self::new(jwt_secret);

        if let Ok(bind) = std::env::var("LIBRIS_BIND") {
            config.bind_addr = bind.parse().with_context(|| format!("parse LIBRIS_BIND: {bind}"))?;
        }
        if let Ok(ttl) = std::env::var("JWT_EXPIRES_IN_SECS") {
            config.auth.token_ttl_secs = parse_token_ttl(&ttl)?;
        }
        if let Ok(kib) = std::env::var("LIBRIS_HASH_MEMORY_KIB") {
            config.auth.hash_memory_kib = kib
                .parse()
                .with_context(|| format!("parse LIBRIS_HASH_MEMORY_KIB: {kib}"))?;
        }
        if let Ok(iterations) = std::env::var("LIBRIS_HASH_ITERATIONS") {
            config.auth.hash_iterations = iterations
                .parse()
                .with_context(|| format!("parse LIBRIS_HASH_ITERATIONS: {iterations}"))?;
        }
        config.auth.pepper = std::env::var("LIBRIS_PASSWORD_PEPPER").ok().filter(|p| !p.is_empty());

        if let Ok(email) = std::env::var("LIBRIS_ADMIN_EMAIL") {
            config.admin.email = email;
        }
        if let Ok(password) = std::env::var("LIBRIS_ADMIN_PASSWORD") {
            config.admin.password = password;
        } else {
            tracing::warn!("LIBRIS_ADMIN_PASSWORD not set; seeding admin with the default password");
        }

        Ok(config)
    }
}

/// Token lifetime in whole seconds; at least one.
fn parse_token_ttl(raw: &str) -> Result<u64> {
    let ttl: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("parse JWT_EXPIRES_IN_SECS: {raw}"))?;
    ensure!(ttl >= 1, "JWT_EXPIRES_IN_SECS must be at least 1, got {ttl}");
    Ok(ttl)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_ttl_accepts_positive_seconds() {
        assert_eq!(parse_token_ttl("1").unwrap(), 1);
        assert_eq!(parse_token_ttl(" 86400 ").unwrap(), 86_400);
    }

    #[test]
    fn token_ttl_rejects_zero_and_garbage() {
        let err = parse_token_ttl("0").unwrap_err();
        assert!(err.to_string().contains("at least 1"));
        assert!(parse_token_ttl("-5").is_err());
        assert!(parse_token_ttl("soon").is_err());
    }
}
