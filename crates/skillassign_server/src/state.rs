use std::path::PathBuf;
use std::sync::Arc;

use rusqlite::Connection;
use skillassign_core::db::open_db;
use skillassign_core::{AppConfig, ProjectLocks};

use crate::error::ApiError;

/// Shared server state.
#[derive(Debug)]
pub struct AppState {
    pub db_path: PathBuf,
    pub config: AppConfig,
    pub locks: ProjectLocks,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            db_path: config.server.db_path.clone(),
            config,
            locks: ProjectLocks::new(),
        }
    }
}

/// Runs `work` on the blocking pool with a freshly opened connection.
pub(crate) async fn with_connection<T, F>(state: &Arc<AppState>, work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Connection, &AppState) -> Result<T, ApiError> + Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || {
        let conn = open_db(&state.db_path)?;
        work(&conn, &state)
    })
    .await
    .map_err(|err| ApiError::internal(format!("blocking task failed: {err}")))?
}
