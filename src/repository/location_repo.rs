// ==========================================
// Altar Rota - location repository
// ==========================================

use crate::domain::location::Location;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_mapping::location_at;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct LocationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl LocationRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Register a location (duplicate name -> UniqueConstraintViolation)
    pub fn create(&self, location: &Location) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO location (name) VALUES (?1)",
            params![location.as_str()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// All locations ordered by name
    pub fn list_all(&self) -> RepositoryResult<Vec<Location>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT name FROM location ORDER BY name")?;
        let locations = stmt
            .query_map([], |row| location_at(row, 0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(locations)
    }

    /// Delete a location; availability entries referencing it cascade,
    /// events referencing it block the delete (ForeignKeyViolation)
    pub fn delete(&self, location: &Location) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM location WHERE name = ?1",
            params![location.as_str()],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Location", location));
        }
        Ok(())
    }
}
