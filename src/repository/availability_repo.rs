// ==========================================
// Altar Rota - availability override repository
// ==========================================
// Tables: availability_override (+ _weekday, _location)
// At most one override per (candidate, period).
// ==========================================

use crate::domain::candidate::{Availability, AvailabilityOverride};
use crate::domain::types::{CandidateId, PeriodId};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_mapping::{location_at, now, weekday_at};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct AvailabilityOverrideRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AvailabilityOverrideRepository {
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

    /// Create or replace the override for (candidate, period)
    ///
    /// The stored sets are replaced wholesale, never merged.
    pub fn upsert(
        &self,
        candidate_id: CandidateId,
        period_id: PeriodId,
        availability: &Availability,
    ) -> RepositoryResult<AvailabilityOverride> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO availability_override (candidate_id, period_id, created_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(candidate_id, period_id) DO NOTHING",
            params![candidate_id, period_id, now()],
        )?;
        let override_id: i64 = tx.query_row(
            "SELECT override_id FROM availability_override WHERE candidate_id = ?1 AND period_id = ?2",
            params![candidate_id, period_id],
            |row| row.get(0),
        )?;

        tx.execute(
            "DELETE FROM availability_override_weekday WHERE override_id = ?1",
            params![override_id],
        )?;
        tx.execute(
            "DELETE FROM availability_override_location WHERE override_id = ?1",
            params![override_id],
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO availability_override_weekday (override_id, weekday) VALUES (?1, ?2)",
            )?;
            for day in &availability.weekdays {
                stmt.execute(params![override_id, day.as_str()])?;
            }
            let mut stmt = tx.prepare(
                "INSERT INTO availability_override_location (override_id, location) VALUES (?1, ?2)",
            )?;
            for location in &availability.locations {
                stmt.execute(params![override_id, location.as_str()])?;
            }
        }

        let stored = load_override(&tx, candidate_id, period_id)?
            .ok_or_else(|| RepositoryError::not_found("AvailabilityOverride", override_id))?;
        tx.commit()?;
        Ok(stored)
    }

    pub fn find(
        &self,
        candidate_id: CandidateId,
        period_id: PeriodId,
    ) -> RepositoryResult<Option<AvailabilityOverride>> {
        let conn = self.get_conn()?;
        load_override(&conn, candidate_id, period_id)
    }

    /// All overrides of a period, ordered by candidate
    pub fn list_by_period(&self, period_id: PeriodId) -> RepositoryResult<Vec<AvailabilityOverride>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT candidate_id FROM availability_override WHERE period_id = ?1 ORDER BY candidate_id",
        )?;
        let candidate_ids = stmt
            .query_map(params![period_id], |row| row.get::<_, i64>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut overrides = Vec::with_capacity(candidate_ids.len());
        for candidate_id in candidate_ids {
            if let Some(o) = load_override(&conn, candidate_id, period_id)? {
                overrides.push(o);
            }
        }
        Ok(overrides)
    }

    pub fn delete(&self, candidate_id: CandidateId, period_id: PeriodId) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM availability_override WHERE candidate_id = ?1 AND period_id = ?2",
            params![candidate_id, period_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found(
                "AvailabilityOverride",
                format!("{}/{}", candidate_id, period_id),
            ));
        }
        Ok(())
    }
}

fn load_override(
    conn: &Connection,
    candidate_id: CandidateId,
    period_id: PeriodId,
) -> RepositoryResult<Option<AvailabilityOverride>> {
    let header = conn
        .query_row(
            "SELECT override_id, created_at FROM availability_override
             WHERE candidate_id = ?1 AND period_id = ?2",
            params![candidate_id, period_id],
            |row| Ok((row.get::<_, i64>(0)?, row.get(1)?)),
        )
        .optional()?;

    let (override_id, created_at) = match header {
        Some(h) => h,
        None => return Ok(None),
    };

    let mut availability = Availability::default();

    let mut stmt =
        conn.prepare("SELECT weekday FROM availability_override_weekday WHERE override_id = ?1")?;
    for day in stmt.query_map(params![override_id], |row| weekday_at(row, 0))? {
        availability.weekdays.insert(day?);
    }

    let mut stmt =
        conn.prepare("SELECT location FROM availability_override_location WHERE override_id = ?1")?;
    for location in stmt.query_map(params![override_id], |row| location_at(row, 0))? {
        availability.locations.insert(location?);
    }

    Ok(Some(AvailabilityOverride {
        override_id,
        candidate_id,
        period_id,
        availability,
        created_at,
    }))
}
