// ==========================================
// Altar Rota - application state
// ==========================================
// Wires one shared connection into repositories, config and APIs.
// Used by the CLI and by integration tests.
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::{AssignmentApi, CandidateApi, RotationApi};
use crate::config::ConfigManager;
use crate::db::{default_db_path, init_schema, open_sqlite_connection};
use crate::engine::{PeriodLockRegistry, RotationRepositories};

pub struct AppState {
    /// Database file path (":memory:" for in-memory state)
    pub db_path: String,

    pub config: Arc<ConfigManager>,
    pub repos: RotationRepositories,

    pub rotation_api: Arc<RotationApi<ConfigManager>>,
    pub assignment_api: Arc<AssignmentApi<ConfigManager>>,
    pub candidate_api: Arc<CandidateApi>,
}

impl AppState {
    /// Open (and bootstrap) the database at `db_path`
    ///
    /// # Returns
    /// - Err(String): the database could not be opened or migrated
    pub fn new(db_path: &str) -> Result<Self, String> {
        tracing::info!(db_path, "initialising AppState");

        let conn = open_sqlite_connection(db_path).map_err(|e| format!("cannot open database: {}", e))?;
        Self::from_connection(conn, db_path)
    }

    /// Build the state over an already opened connection
    pub fn from_connection(conn: Connection, db_path: &str) -> Result<Self, String> {
        init_schema(&conn).map_err(|e| format!("cannot initialise schema: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // repositories + config
        // ==========================================
        let repos = RotationRepositories::from_connection(conn.clone());
        let config = Arc::new(
            ConfigManager::from_connection(conn).map_err(|e| format!("cannot create ConfigManager: {}", e))?,
        );

        // ==========================================
        // APIs
        // ==========================================
        let locks = Arc::new(PeriodLockRegistry::new());
        let rotation_api = Arc::new(RotationApi::new(repos.clone(), config.clone(), locks));
        let assignment_api = Arc::new(AssignmentApi::new(repos.assignment_repo.clone(), config.clone()));
        let candidate_api = Arc::new(CandidateApi::new(
            repos.candidate_repo.clone(),
            repos.location_repo.clone(),
            repos.override_repo.clone(),
            repos.assignment_repo.clone(),
        ));

        tracing::info!("AppState ready");

        Ok(Self {
            db_path: db_path.to_string(),
            config,
            repos,
            rotation_api,
            assignment_api,
            candidate_api,
        })
    }
}

/// Database path: `ALTAR_ROTA_DB` when set, otherwise the user data dir
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var("ALTAR_ROTA_DB") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    default_db_path().to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
    }

    #[test]
    fn test_in_memory_state() {
        let conn = Connection::open_in_memory().unwrap();
        let state = AppState::from_connection(conn, ":memory:").unwrap();

        assert_eq!(state.db_path, ":memory:");
        assert!(state.candidate_api.list().unwrap().is_empty());
        assert!(state.rotation_api.list_periods().unwrap().is_empty());
    }
}
