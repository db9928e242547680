// Server configuration loaded from environment variables
// Decision: Every setting is optional; an empty environment runs a dev server

use anyhow::{Context, Result};
use axum::http::HeaderValue;

use crate::auth::AuthConfig;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:9300";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Postgres URL; absent means in-memory dev mode
    pub database_url: Option<String>,
    pub bind_address: String,
    /// Prefix for all API routes, e.g. "/api" (health stays unprefixed)
    pub api_prefix: String,
    /// Only needed when the UI is served from a different origin
    pub cors_origins: Vec<HeaderValue>,
    pub auth: AuthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            api_prefix: String::new(),
            cors_origins: Vec::new(),
            auth: AuthConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_string());

        let api_prefix = std::env::var("API_PREFIX").unwrap_or_default();

        // Example: CORS_ALLOWED_ORIGINS="https://app.example.com,https://admin.example.com"
        let cors_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .ok()
            .map(|s| parse_origins(&s))
            .unwrap_or_default();

        let auth = AuthConfig::from_env().context("Invalid authentication configuration")?;

        Ok(Self {
            database_url,
            bind_address,
            api_prefix,
            cors_origins,
            auth,
        })
    }
}

fn parse_origins(raw: &str) -> Vec<HeaderValue> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect()
}
