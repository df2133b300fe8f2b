// ==========================================
// Altar Rota - candidate repository
// ==========================================
// Tables: candidate, candidate_weekday, candidate_location
// The engine only touches assignment_count, through
// AssignmentRepository::commit_run.
// ==========================================

use crate::domain::candidate::{Availability, Candidate, NewCandidate};
use crate::domain::types::CandidateId;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_mapping::{count_at, location_at, now, weekday_at};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

const CANDIDATE_COLUMNS: &str = "candidate_id, display_name, primary_role, secondary_role,
     assignment_count, created_at, updated_at";

pub struct CandidateRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CandidateRepository {
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

    /// Create a candidate with its default availability
    ///
    /// # Errors
    /// - ValidationError: empty display name
    /// - ForeignKeyViolation: a location is not registered
    pub fn create(&self, payload: &NewCandidate) -> RepositoryResult<Candidate> {
        payload.validate()?;

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let ts = now();

        tx.execute(
            "INSERT INTO candidate (display_name, primary_role, secondary_role, assignment_count, created_at, updated_at)
             VALUES (?1, ?2, ?3, 0, ?4, ?4)",
            params![
                payload.display_name.trim(),
                payload.primary_role,
                payload.secondary_role,
                ts
            ],
        )?;
        let candidate_id = tx.last_insert_rowid();
        write_availability(&tx, candidate_id, &payload.availability)?;

        let candidate = load_candidate(&tx, candidate_id)?
            .ok_or_else(|| RepositoryError::not_found("Candidate", candidate_id))?;
        tx.commit()?;
        Ok(candidate)
    }

    pub fn find_by_id(&self, candidate_id: CandidateId) -> RepositoryResult<Option<Candidate>> {
        let conn = self.get_conn()?;
        load_candidate(&conn, candidate_id)
    }

    /// All candidates ordered by id
    pub fn list_all(&self) -> RepositoryResult<Vec<Candidate>> {
        let conn = self.get_conn()?;

        let mut availability_by_id: HashMap<CandidateId, Availability> = HashMap::new();
        {
            let mut stmt = conn.prepare("SELECT candidate_id, weekday FROM candidate_weekday")?;
            let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, weekday_at(row, 1)?)))?;
            for row in rows {
                let (id, day) = row?;
                availability_by_id.entry(id).or_default().weekdays.insert(day);
            }
        }
        {
            let mut stmt = conn.prepare("SELECT candidate_id, location FROM candidate_location")?;
            let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, location_at(row, 1)?)))?;
            for row in rows {
                let (id, location) = row?;
                availability_by_id.entry(id).or_default().locations.insert(location);
            }
        }

        let sql = format!("SELECT {} FROM candidate ORDER BY candidate_id", CANDIDATE_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let mut candidates = stmt
            .query_map([], map_candidate)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for candidate in &mut candidates {
            if let Some(availability) = availability_by_id.remove(&candidate.candidate_id) {
                candidate.availability = availability;
            }
        }
        Ok(candidates)
    }

    pub fn count_all(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM candidate", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Replace name, role flags and default availability
    ///
    /// The cumulative counter is left untouched.
    pub fn update(
        &self,
        candidate_id: CandidateId,
        payload: &NewCandidate,
    ) -> RepositoryResult<Candidate> {
        payload.validate()?;

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let affected = tx.execute(
            "UPDATE candidate
             SET display_name = ?2, primary_role = ?3, secondary_role = ?4, updated_at = ?5
             WHERE candidate_id = ?1",
            params![
                candidate_id,
                payload.display_name.trim(),
                payload.primary_role,
                payload.secondary_role,
                now()
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Candidate", candidate_id));
        }

        tx.execute("DELETE FROM candidate_weekday WHERE candidate_id = ?1", params![candidate_id])?;
        tx.execute("DELETE FROM candidate_location WHERE candidate_id = ?1", params![candidate_id])?;
        write_availability(&tx, candidate_id, &payload.availability)?;

        let candidate = load_candidate(&tx, candidate_id)?
            .ok_or_else(|| RepositoryError::not_found("Candidate", candidate_id))?;
        tx.commit()?;
        Ok(candidate)
    }

    /// Delete a candidate (assignments, overrides and history cascade)
    pub fn delete(&self, candidate_id: CandidateId) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM candidate WHERE candidate_id = ?1", params![candidate_id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Candidate", candidate_id));
        }
        Ok(())
    }

    /// Reset one candidate's cumulative counter to zero
    pub fn reset_assignment_count(&self, candidate_id: CandidateId) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE candidate SET assignment_count = 0, updated_at = ?2 WHERE candidate_id = ?1",
            params![candidate_id, now()],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Candidate", candidate_id));
        }
        Ok(())
    }

    /// Reset every counter; returns the number of candidates touched
    pub fn reset_all_assignment_counts(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE candidate SET assignment_count = 0, updated_at = ?1",
            params![now()],
        )?;
        Ok(affected)
    }
}

// ==========================================
// helpers (usable inside a transaction)
// ==========================================

fn map_candidate(row: &rusqlite::Row<'_>) -> rusqlite::Result<Candidate> {
    Ok(Candidate {
        candidate_id: row.get(0)?,
        display_name: row.get(1)?,
        primary_role: row.get(2)?,
        secondary_role: row.get(3)?,
        availability: Availability::default(),
        assignment_count: count_at(row, 4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn load_candidate(conn: &Connection, candidate_id: CandidateId) -> RepositoryResult<Option<Candidate>> {
    let sql = format!("SELECT {} FROM candidate WHERE candidate_id = ?1", CANDIDATE_COLUMNS);
    let candidate = conn
        .query_row(&sql, params![candidate_id], map_candidate)
        .optional()?;

    match candidate {
        Some(mut candidate) => {
            candidate.availability = load_availability(conn, candidate_id)?;
            Ok(Some(candidate))
        }
        None => Ok(None),
    }
}

fn load_availability(conn: &Connection, candidate_id: CandidateId) -> RepositoryResult<Availability> {
    let mut availability = Availability::default();

    let mut stmt = conn.prepare("SELECT weekday FROM candidate_weekday WHERE candidate_id = ?1")?;
    for day in stmt.query_map(params![candidate_id], |row| weekday_at(row, 0))? {
        availability.weekdays.insert(day?);
    }

    let mut stmt = conn.prepare("SELECT location FROM candidate_location WHERE candidate_id = ?1")?;
    for location in stmt.query_map(params![candidate_id], |row| location_at(row, 0))? {
        availability.locations.insert(location?);
    }

    Ok(availability)
}

fn write_availability(
    conn: &Connection,
    candidate_id: CandidateId,
    availability: &Availability,
) -> RepositoryResult<()> {
    let mut stmt =
        conn.prepare("INSERT INTO candidate_weekday (candidate_id, weekday) VALUES (?1, ?2)")?;
    for day in &availability.weekdays {
        stmt.execute(params![candidate_id, day.as_str()])?;
    }

    let mut stmt =
        conn.prepare("INSERT INTO candidate_location (candidate_id, location) VALUES (?1, ?2)")?;
    for location in &availability.locations {
        stmt.execute(params![candidate_id, location.as_str()])?;
    }
    Ok(())
}
