//! Shared handler state.

use crate::error::{ApiError, ApiResult};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// State shared by all handlers: one migrated SQLite connection.
///
/// SQLite serializes writers anyway; the mutex only keeps the `!Sync`
/// connection usable from many tasks.
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Wraps a connection returned by `mpk_core::db::open_db*`.
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
        }
    }

    /// Runs blocking storage work on the blocking thread pool.
    pub async fn with_connection<T, F>(&self, work: F) -> ApiResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> ApiResult<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let mut conn = db
                .lock()
                .map_err(|_| ApiError::Internal("database lock poisoned".to_string()))?;
            work(&mut *conn)
        })
        .await
        .map_err(|err| ApiError::Internal(format!("storage task failed: {err}")))?
    }
}
