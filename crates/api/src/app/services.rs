use std::sync::Arc;

use anyhow::Context;

use jobboard_auth::{Hs256TokenService, PasswordHasher};
use jobboard_infra::{InMemoryStore, PgStore, RoleResolver, Store, run_bootstrap};

use crate::config::ApiConfig;

/// Shared application services injected into every handler.
pub struct AppServices {
    pub store: Arc<dyn Store>,
    pub roles: RoleResolver,
    pub tokens: Arc<Hs256TokenService>,
    pub passwords: PasswordHasher,
}

impl AppServices {
    pub fn new(store: Arc<dyn Store>, config: &ApiConfig) -> Self {
        Self {
            store,
            roles: RoleResolver::new(),
            tokens: Arc::new(Hs256TokenService::new(
                config.jwt_secret.as_bytes(),
                config.jwt_ttl,
            )),
            passwords: PasswordHasher::new(),
        }
    }
}

/// Build services and run the bootstrap routine.
///
/// Postgres backs the store when `database_url` is set; otherwise data lives
/// in memory for the lifetime of the process.
pub async fn build_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => Arc::new(
            PgStore::connect(url)
                .await
                .context("failed to connect to Postgres")?,
        ),
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store");
            Arc::new(InMemoryStore::new())
        }
    };
    run_bootstrap(&*store);
    Ok(AppServices::new(store, config))
}
