use std::sync::Arc;

use time::Duration;
use tracing::info;

use crate::{
    auth::{
        password::{Argon2Hasher, CredentialHasher},
        AuthService,
    },
    config::AppConfig,
    db, seed,
    store::{FallbackStore, MemoryStore, PgStore, SessionStore, TeammateStore, UserStore},
    teammates::DirectoryService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth: AuthService,
    pub directory: DirectoryService,
    /// Whether a database backs the stores (with memory as fallback).
    pub database_connected: bool,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2Hasher);

        // Memory is always seeded: it is either the only store or the fallback.
        let memory = MemoryStore::new();
        seed::seed_directory(&memory).await?;

        match db::connect(&config).await {
            Some(db) => {
                let store = Arc::new(FallbackStore::new(PgStore::new(db), memory));
                seed::seed_directory(store.as_ref()).await?;
                info!("stores: postgres with in-memory fallback");
                Ok(Self::from_parts(config, store.clone(), store.clone(), store, hasher, true))
            }
            None => {
                let store = Arc::new(memory);
                let state =
                    Self::from_parts(config, store.clone(), store.clone(), store, hasher, false);
                seed::seed_dev_user(&state.auth).await?;
                info!("stores: in-memory only");
                Ok(state)
            }
        }
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        teammates: Arc<dyn TeammateStore>,
        hasher: Arc<dyn CredentialHasher>,
        database_connected: bool,
    ) -> Self {
        let ttl = Duration::hours(config.session.ttl_hours);
        Self {
            auth: AuthService::new(users, sessions, hasher, ttl),
            directory: DirectoryService::new(teammates),
            config,
            database_connected,
        }
    }

    /// Memory-backed state with the sample directory and a cheap hasher.
    #[cfg(test)]
    pub async fn fake() -> Self {
        use crate::{auth::password::tests::FakeHasher, config::SessionConfig};

        let config = Arc::new(AppConfig {
            database_url: None,
            db_connect_timeout_secs: 1,
            session: SessionConfig { ttl_hours: 24 },
        });
        let store = Arc::new(MemoryStore::new());
        seed::seed_directory(store.as_ref())
            .await
            .expect("seed memory store");
        Self::from_parts(
            config,
            store.clone(),
            store.clone(),
            store,
            Arc::new(FakeHasher),
            false,
        )
    }
}
