//! Shared request state: the configured car store.
//!
//! Store calls are blocking (SQLite, std mutexes), so every request runs its
//! store work on the blocking thread pool.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use carrater_core::db::open_db;
use carrater_core::{
    sample_catalog, seed_catalog, CarRepository, MemoryCarRepository, RatingResult,
    RatingService, SqliteCarRepository,
};
use log::info;
use rusqlite::Connection;

use crate::config::{Config, StoreKind};
use crate::error::AppError;

/// Idle SQLite connections kept for reuse between requests.
const MAX_IDLE_CONNECTIONS: usize = 8;

pub enum StoreBackend {
    Sqlite {
        path: PathBuf,
        idle: Mutex<Vec<Connection>>,
    },
    Memory(MemoryCarRepository),
}

impl StoreBackend {
    pub fn sqlite(path: impl Into<PathBuf>) -> Self {
        Self::Sqlite {
            path: path.into(),
            idle: Mutex::new(Vec::new()),
        }
    }

    pub fn memory(repo: MemoryCarRepository) -> Self {
        Self::Memory(repo)
    }

    fn run<T>(
        &self,
        op: impl FnOnce(&dyn CarRepository) -> RatingResult<T>,
    ) -> Result<T, AppError> {
        match self {
            Self::Sqlite { path, idle } => {
                let conn = match idle.lock().ok().and_then(|mut pool| pool.pop()) {
                    Some(conn) => conn,
                    None => open_db(path)?,
                };

                let result = op(&SqliteCarRepository::new(&conn));

                if let Ok(mut pool) = idle.lock() {
                    if pool.len() < MAX_IDLE_CONNECTIONS {
                        pool.push(conn);
                    }
                }
                Ok(result?)
            }
            Self::Memory(repo) => Ok(op(repo)?),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    backend: Arc<StoreBackend>,
}

impl AppState {
    pub fn new(backend: StoreBackend) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Builds the configured store, verifies it opens, and seeds it if asked.
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        let backend = match config.store {
            StoreKind::Sqlite => StoreBackend::sqlite(config.db_path.clone()),
            StoreKind::Memory => StoreBackend::memory(MemoryCarRepository::new()),
        };
        let state = Self::new(backend);

        if config.seed {
            state
                .with_repo(|repo| Ok(seed_catalog(repo, &sample_catalog())?))
                .await?;
        }

        let catalog_size = state.with_repo(|repo| Ok(repo.count_cars()?)).await?;
        info!(
            "event=store_ready module=server status=ok store={} catalog_size={catalog_size}",
            config.store
        );

        Ok(state)
    }

    /// Runs `op` against the store on the blocking pool.
    pub async fn with_repo<T, F>(&self, op: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn CarRepository) -> RatingResult<T> + Send + 'static,
    {
        let backend = Arc::clone(&self.backend);
        tokio::task::spawn_blocking(move || backend.run(op)).await?
    }

    /// Runs `op` against a rating service over the store on the blocking pool.
    pub async fn with_service<T, F>(&self, op: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce(&RatingService<&dyn CarRepository>) -> RatingResult<T> + Send + 'static,
    {
        self.with_repo(move |repo| op(&RatingService::new(repo)))
            .await
    }
}
