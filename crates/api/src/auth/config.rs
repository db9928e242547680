// Authentication configuration loaded from environment variables.
// Decision: AUTH_ prefix for all auth config
// Decision: Default to "none" mode for local development
// Decision: JWT mode without AUTH_JWT_SECRET refuses to start

use anyhow::{bail, Result};
use std::time::Duration;

/// Authentication mode
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// No authentication required; a fixed dev organizer is used
    #[default]
    None,
    /// Organizer requests carry an HS256 bearer token
    Jwt,
}

impl AuthMode {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "jwt" => AuthMode::Jwt,
            _ => AuthMode::None,
        }
    }
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret shared with the identity provider that issues tokens
    pub secret: String,
    /// Lifetime of tokens issued by this server (tests and dev tooling)
    pub access_token_lifetime: Duration,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            access_token_lifetime: Duration::from_secs(60 * 60), // 1 hour
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub mode: AuthMode,
    pub jwt: JwtConfig,
}

impl AuthConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Load configuration through a variable lookup
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mode = var("AUTH_MODE")
            .map(|s| AuthMode::from_str(&s))
            .unwrap_or_default();

        let secret = match (var("AUTH_JWT_SECRET").filter(|s| !s.trim().is_empty()), &mode) {
            (Some(secret), _) => secret,
            (None, AuthMode::None) => {
                // Random secret for dev mode; nothing verifies it
                use rand::Rng;
                let bytes: [u8; 32] = rand::thread_rng().gen();
                hex::encode(bytes)
            }
            (None, AuthMode::Jwt) => bail!("AUTH_MODE=jwt requires AUTH_JWT_SECRET"),
        };

        let access_token_lifetime = var("AUTH_JWT_ACCESS_TOKEN_LIFETIME")
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(60 * 60));

        Ok(Self {
            mode,
            jwt: JwtConfig {
                secret,
                access_token_lifetime,
            },
        })
    }

    /// JWT mode with an explicit secret
    pub fn jwt(secret: impl Into<String>) -> Self {
        Self {
            mode: AuthMode::Jwt,
            jwt: JwtConfig {
                secret: secret.into(),
                ..JwtConfig::default()
            },
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.mode != AuthMode::None
    }
}
