//! Application configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! `servilog.toml`, then `SERVILOG__SECTION__KEY` environment variables. The
//! plain variables used by older deployments (`PORT`, `DATABASE_URL`,
//! `JWT_KEY`, `FRONTEND_URL`, `EMAIL_USER`, `EMAIL_PASS`) win over all of them.

use config::{Config, ConfigError, Environment, File};
use mailer::MailConfig;
use maintenance::MaintenanceConfig;
use serde::Deserialize;
use std::collections::HashMap;

use crate::rate_limit::RateLimitConfig;

/// Relay used when only the legacy mail credentials are given
const LEGACY_SMTP_HOST: &str = "smtp.gmail.com";

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub mail: MailConfig,
    pub maintenance: MaintenanceConfig,
    pub rate_limit: RateLimitConfig,
    pub log: LogConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Web client origin; used for CORS and verification links
    pub frontend_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            frontend_url: "http://localhost:5173".to_string(),
        }
    }
}

impl ServerConfig {
    /// Socket address to bind
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/servilog".to_string(),
            max_connections: 10,
        }
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // connection strings carry credentials
        let url = match self.url.split_once('@') {
            Some((_, host)) => format!("***@{}", host),
            None => self.url.clone(),
        };
        f.debug_struct("DatabaseConfig")
            .field("url", &url)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

/// Token configuration
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret; must be set
    pub jwt_key: String,
    pub token_ttl_minutes: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_key: String::new(),
            token_ttl_minutes: 60,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_key", &if self.jwt_key.is_empty() { "" } else { "***" })
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .finish()
    }
}

/// Log output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Settings {
    /// Load from `servilog.toml` and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_sources(Some("servilog"), std::env::vars().collect())
    }

    /// Load from an optional config file (without extension) and the given
    /// environment variables
    pub fn from_sources(
        file: Option<&str>,
        env: HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let legacy = |key: &str| env.get(key).filter(|v| !v.is_empty()).cloned();

        let mut builder = Config::builder();
        if legacy("EMAIL_USER").is_some() {
            builder = builder.set_default("mail.smtp_host", LEGACY_SMTP_HOST)?;
        }
        if let Some(name) = file {
            builder = builder.add_source(File::with_name(name).required(false));
        }

        builder
            .add_source(
                Environment::with_prefix("SERVILOG")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(env.clone())),
            )
            .set_override_option("server.port", legacy("PORT"))?
            .set_override_option("server.frontend_url", legacy("FRONTEND_URL"))?
            .set_override_option("database.url", legacy("DATABASE_URL"))?
            .set_override_option("auth.jwt_key", legacy("JWT_KEY"))?
            .set_override_option("mail.username", legacy("EMAIL_USER"))?
            .set_override_option("mail.password", legacy("EMAIL_PASS"))?
            .build()?
            .try_deserialize()
    }
}
