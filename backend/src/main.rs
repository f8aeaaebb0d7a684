//! Access engine entry point: loads settings, wires the Diesel and identity
//! adapters into the engine, and serves the access endpoints.

mod server;

use std::io;
use std::path::Path;
use std::sync::Arc;

use actix_web::cookie::Key;
use actix_web::web;
use ortho_config::OrthoConfig as _;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use access_engine::domain::AccessEngine;
use access_engine::domain::ports::{FixtureIdentityProvider, IdentityProvider};
use access_engine::inbound::http::health::HealthState;
use access_engine::inbound::http::state::HttpState;
use access_engine::outbound::identity::HttpIdentityProvider;
use access_engine::outbound::persistence::{DbPool, diesel_ports};

use server::{AccessSettings, ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AccessSettings::load_from_iter(std::env::args_os())
        .map_err(|e| io::Error::other(format!("failed to load settings: {e}")))?;

    let pool = DbPool::new(settings.pool_config()?)
        .await
        .map_err(|e| io::Error::other(e.to_string()))?;
    let identity = build_identity_provider(&settings)?;
    let engine = AccessEngine::new(diesel_ports(pool, identity));

    let key = load_session_key(&settings.session_key_file())?;
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(
        health_state.clone(),
        ServerConfig {
            key,
            cookie_secure: settings.cookie_secure,
            bind_addr: settings.bind_addr()?,
            http_state: HttpState::from(&engine),
        },
    )?;
    info!(bind_addr = %settings.bind_addr()?, "access engine listening");

    let outcome = server.await;
    health_state.mark_unhealthy();
    let pending = engine.backfill().pending();
    if pending > 0 {
        info!(pending, "draining backfill writes");
    }
    engine.backfill().settle().await;
    outcome
}

fn build_identity_provider(settings: &AccessSettings) -> io::Result<Arc<dyn IdentityProvider>> {
    match settings.identity_url()? {
        Some(base_url) => {
            let provider = HttpIdentityProvider::new(
                base_url,
                settings.identity_service_key(),
                settings.identity_timeout(),
            )
            .map_err(|e| io::Error::other(format!("failed to build identity client: {e}")))?;
            Ok(Arc::new(provider))
        }
        None => {
            warn!("no identity provider configured; identity metadata is unavailable");
            Ok(Arc::new(FixtureIdentityProvider))
        }
    }
}

fn load_session_key(path: &Path) -> io::Result<Key> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(e) => {
            let allow_dev = std::env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %path.display(), error = %e, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(io::Error::other(format!(
                    "failed to read session key at {}: {e}",
                    path.display()
                )))
            }
        }
    }
}
