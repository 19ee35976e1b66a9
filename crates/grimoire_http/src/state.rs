//! Shared server state.
//!
//! # Invariants
//! - One store connection per process, guarded by a mutex.
//! - Store work never runs on the async executor threads.

use crate::error::{ApiError, ApiResult};
use grimoire_core::db::{open_db_in_memory, DbResult};
use grimoire_core::{
    HouseService, ServiceError, ServiceResult, SpellService, SqliteHouseRepository,
    SqliteSpellRepository,
};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct AppState {
    conn: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Wraps an already migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// State over a fresh in-memory store.
    pub fn in_memory() -> DbResult<Self> {
        open_db_in_memory().map(Self::new)
    }

    /// Runs `f` against the spell service on the blocking pool.
    pub async fn spells<T, F>(&self, f: F) -> ApiResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&SpellService<SqliteSpellRepository<'_>>) -> ServiceResult<T> + Send + 'static,
    {
        self.with_conn(move |conn| {
            let repo = SqliteSpellRepository::try_new(conn).map_err(ServiceError::Store)?;
            f(&SpellService::new(repo))
        })
        .await
    }

    /// Runs `f` against the house service on the blocking pool.
    pub async fn houses<T, F>(&self, f: F) -> ApiResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&HouseService<SqliteHouseRepository<'_>>) -> ServiceResult<T> + Send + 'static,
    {
        self.with_conn(move |conn| {
            let repo = SqliteHouseRepository::try_new(conn).map_err(ServiceError::Store)?;
            f(&HouseService::new(repo))
        })
        .await
    }

    async fn with_conn<T, F>(&self, f: F) -> ApiResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> ServiceResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| ApiError::Internal("store lock poisoned".to_string()))?;
            f(&guard).map_err(ApiError::from)
        })
        .await?
    }
}
