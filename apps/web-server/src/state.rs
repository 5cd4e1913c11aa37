//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{PasswordService, PostRepository, RateLimiter, SessionStore, UserRepository};
use quill_core::{AccountService, PostService, SessionService};
use quill_infra::{Argon2PasswordService, InMemoryDatabase, InMemoryRateLimiter};

#[cfg(feature = "postgres")]
use migration::{Migrator, MigratorTrait};
#[cfg(feature = "postgres")]
use quill_infra::database::{
    PostgresPostRepository, PostgresSessionStore, PostgresUserRepository, connect,
};

use crate::config::{AppConfig, SessionConfig};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub posts: PostService,
    pub sessions: SessionService,
    pub limiter: Arc<dyn RateLimiter>,
    pub session_config: SessionConfig,
}

/// The three stores every service is built over.
struct Stores {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
    sessions: Arc<dyn SessionStore>,
}

impl Stores {
    fn in_memory(db: &InMemoryDatabase) -> Self {
        Self {
            users: Arc::new(db.users()),
            posts: Arc::new(db.posts()),
            sessions: Arc::new(db.sessions()),
        }
    }
}

/// Failure to assemble the state at startup.
#[derive(Debug, thiserror::Error)]
#[error("startup failed: {0}")]
pub struct StartupError(pub String);

impl AppState {
    /// Build the application state, connecting to the database when one is
    /// configured and falling back to the in-memory store otherwise.
    pub async fn new(config: &AppConfig) -> Result<Self, StartupError> {
        let passwords: Arc<dyn PasswordService> = Arc::new(
            Argon2PasswordService::new(&config.password)
                .map_err(|e| StartupError(e.to_string()))?,
        );
        let limiter: Arc<dyn RateLimiter> =
            Arc::new(InMemoryRateLimiter::new(config.rate_limit.clone()));

        let stores = Self::stores(config).await?;

        tracing::info!("Application state initialized");

        Ok(Self::assemble(
            stores,
            passwords,
            limiter,
            config.session.clone(),
        ))
    }

    /// State over a fresh in-memory database.
    pub fn in_memory(
        db: &InMemoryDatabase,
        passwords: Arc<dyn PasswordService>,
        limiter: Arc<dyn RateLimiter>,
        session_config: SessionConfig,
    ) -> Self {
        Self::assemble(Stores::in_memory(db), passwords, limiter, session_config)
    }

    fn assemble(
        stores: Stores,
        passwords: Arc<dyn PasswordService>,
        limiter: Arc<dyn RateLimiter>,
        session_config: SessionConfig,
    ) -> Self {
        Self {
            accounts: AccountService::new(stores.users.clone(), passwords),
            posts: PostService::new(stores.posts, stores.users),
            sessions: SessionService::new(stores.sessions, session_config.ttl),
            limiter,
            session_config,
        }
    }

    #[cfg(feature = "postgres")]
    async fn stores(config: &AppConfig) -> Result<Stores, StartupError> {
        let Some(db_config) = config.database.as_ref() else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Ok(Stores::in_memory(&InMemoryDatabase::new()));
        };

        let db = Arc::new(
            connect(db_config)
                .await
                .map_err(|e| StartupError(format!("database connection: {e}")))?,
        );

        if config.auto_migrate {
            Migrator::up(&*db, None)
                .await
                .map_err(|e| StartupError(format!("migrations: {e}")))?;
            tracing::info!("Migrations applied");
        }

        Ok(Stores {
            users: Arc::new(PostgresUserRepository::new(Arc::clone(&db))),
            posts: Arc::new(PostgresPostRepository::new(Arc::clone(&db))),
            sessions: Arc::new(PostgresSessionStore::new(db)),
        })
    }

    #[cfg(not(feature = "postgres"))]
    async fn stores(_config: &AppConfig) -> Result<Stores, StartupError> {
        tracing::info!("Running without postgres feature - using in-memory store");
        Ok(Stores::in_memory(&InMemoryDatabase::new()))
    }
}
