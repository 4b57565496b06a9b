//! Application configuration loaded from environment variables.
//!
//! The portal holds no storage of its own; everything it needs is the
//! location of the managed backend and the two API keys it uses against it.

use std::env;

/// Name of the cookie carrying the opaque portal session id.
pub const SESSION_COOKIE: &str = "hie_session";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the managed backend (identity service + row store)
    pub backend_url: String,
    /// Service-role key used by privileged server-side operations
    pub service_role_key: String,
    /// Anonymous key used for user-scoped auth calls (sign-in, sign-up)
    pub anon_key: String,
    /// Frontend URL for CORS and post-auth navigation
    pub frontend_url: String,
    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// For local development the keys can be set in a `.env` file. The
    /// service-role key must never be exposed to browser code.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            backend_url: env::var("BACKEND_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .map_err(|_| ConfigError::Missing("BACKEND_URL"))?,
            service_role_key: env::var("SERVICE_ROLE_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("SERVICE_ROLE_KEY"))?,
            anon_key: env::var("ANON_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("ANON_KEY"))?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:9".to_string(),
            service_role_key: "test_service_role_key".to_string(),
            anon_key: "test_anon_key".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
