//! Server settings loaded via OrthoConfig.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use access_engine::outbound::persistence::PoolConfig;
use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_IDENTITY_TIMEOUT_SECS: u64 = 10;
const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";

/// Configuration for the access engine server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ACCESS")]
pub struct AccessSettings {
    /// PostgreSQL connection string for the directory tables.
    pub database_url: Option<String>,
    /// Base URL of the identity provider. Without it, identity metadata is
    /// never available.
    pub identity_url: Option<String>,
    /// Service key sent to the identity provider admin API.
    pub identity_service_key: Option<String>,
    /// Identity provider request timeout in seconds.
    pub identity_timeout_secs: Option<u64>,
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// File holding the session cookie key material.
    pub session_key_file: Option<PathBuf>,
    /// Mark session cookies `Secure`.
    #[ortho_config(default = true)]
    pub cookie_secure: bool,
    /// Upper bound on pooled database connections.
    pub pool_max_size: Option<u32>,
}

impl AccessSettings {
    /// Database URL, which has no default.
    pub fn database_url(&self) -> io::Result<&str> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| io::Error::other("ACCESS_DATABASE_URL must be set"))
    }

    /// Parsed identity provider base URL, if configured.
    pub fn identity_url(&self) -> io::Result<Option<Url>> {
        self.identity_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .map(|raw| {
                Url::parse(raw)
                    .map_err(|error| io::Error::other(format!("invalid identity URL: {error}")))
            })
            .transpose()
    }

    pub fn identity_service_key(&self) -> &str {
        self.identity_service_key.as_deref().unwrap_or_default()
    }

    pub fn identity_timeout(&self) -> Duration {
        Duration::from_secs(
            self.identity_timeout_secs
                .unwrap_or(DEFAULT_IDENTITY_TIMEOUT_SECS),
        )
    }

    /// Parsed bind address, falling back to all interfaces on port 8080.
    pub fn bind_addr(&self) -> io::Result<SocketAddr> {
        self.bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
            .map_err(|error| io::Error::other(format!("invalid bind address: {error}")))
    }

    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    /// Pool configuration for the database URL.
    pub fn pool_config(&self) -> io::Result<PoolConfig> {
        Ok(PoolConfig::new(self.database_url()?)
            .with_max_size(self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)))
    }
}
