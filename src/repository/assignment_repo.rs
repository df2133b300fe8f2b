// ==========================================
// Altar Rota - assignment repository
// ==========================================
// Tables: generation_run, assignment, service_record
// commit_run is the only write path of the generation engine and runs
// in one IMMEDIATE transaction: run audit row, assignments, service
// records and counter increments become visible together or not at all.
// The daily limit is re-checked inside that transaction, so runs over
// overlapping periods cannot push a candidate past it.
// ==========================================

use crate::domain::assignment::{
    Assignment, AssignmentDetail, GenerationRunRecord, ServiceRecord, ServiceTotal,
};
use crate::domain::location::Location;
use crate::domain::types::{AssignmentId, AssignmentStatus, CandidateId, EventId, PeriodId};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_mapping::{count_at, location_at, now, status_at};
use chrono::{NaiveDate, NaiveTime};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, instrument};

const ASSIGNMENT_COLUMNS: &str =
    "assignment_id, event_id, candidate_id, status, run_id, created_at, updated_at";

// ==========================================
// CommitBatch - input of commit_run
// ==========================================

/// One assignment to persist, with the event data copied into the
/// service record
#[derive(Debug, Clone)]
pub struct PendingAssignment {
    pub event_id: EventId,
    pub candidate_id: CandidateId,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct CommitBatch {
    pub run_id: String,
    pub period_id: PeriodId,
    pub rules_json: String,
    pub events_count: u32,
    pub alerts_count: u32,
    pub daily_limit: u32,
    pub assignments: Vec<PendingAssignment>,       // chronological order
    pub counter_increments: Vec<(CandidateId, u32)>, // workload deltas
}

// ==========================================
// AssignmentRepository
// ==========================================
pub struct AssignmentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AssignmentRepository {
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

    // ==========================================
    // generation commit
    // ==========================================

    /// Persist a whole generation run atomically
    ///
    /// # Returns
    /// - assignment ids, in the same order as `batch.assignments`
    ///
    /// # Errors
    /// - DailyLimitExceeded: a candidate would exceed `batch.daily_limit`
    ///   on some date, counting assignments committed by any run
    ///
    /// Any failure rolls the transaction back; nothing from the batch
    /// remains visible.
    #[instrument(skip(self, batch), fields(run_id = %batch.run_id, period_id = batch.period_id))]
    pub fn commit_run(&self, batch: &CommitBatch) -> RepositoryResult<Vec<AssignmentId>> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        let ts = now();

        tx.execute(
            "INSERT INTO generation_run
                (run_id, period_id, rules_json, events_count, assignments_count, alerts_count, committed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                batch.run_id,
                batch.period_id,
                batch.rules_json,
                batch.events_count,
                batch.assignments.len() as i64,
                batch.alerts_count,
                ts
            ],
        )?;

        let mut ids = Vec::with_capacity(batch.assignments.len());
        {
            let mut insert_assignment = tx.prepare(
                "INSERT INTO assignment (event_id, candidate_id, status, run_id, created_at, updated_at)
                 VALUES (?1, ?2, 'ACTIVE', ?3, ?4, ?4)",
            )?;
            let mut insert_record = tx.prepare(
                "INSERT INTO service_record
                    (candidate_id, period_id, assignment_id, run_id, service_date, service_time, location, recorded_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;

            for pending in &batch.assignments {
                let assignment_id = insert_assignment.insert(params![
                    pending.event_id,
                    pending.candidate_id,
                    batch.run_id,
                    ts
                ])?;
                insert_record.execute(params![
                    pending.candidate_id,
                    batch.period_id,
                    assignment_id,
                    batch.run_id,
                    pending.date,
                    pending.time,
                    pending.location.as_str(),
                    ts
                ])?;
                ids.push(assignment_id);
            }

            let touched: BTreeSet<(CandidateId, NaiveDate)> =
                batch.assignments.iter().map(|p| (p.candidate_id, p.date)).collect();
            for (candidate_id, date) in touched {
                if count_active_on_date(&tx, candidate_id, date, None)? > batch.daily_limit {
                    return Err(RepositoryError::DailyLimitExceeded {
                        candidate_id,
                        date,
                        limit: batch.daily_limit,
                    });
                }
            }

            let mut bump = tx.prepare(
                "UPDATE candidate
                 SET assignment_count = assignment_count + ?2, updated_at = ?3
                 WHERE candidate_id = ?1",
            )?;
            for (candidate_id, delta) in &batch.counter_increments {
                if *delta == 0 {
                    continue;
                }
                let affected = bump.execute(params![candidate_id, delta, ts])?;
                if affected == 0 {
                    return Err(RepositoryError::not_found("Candidate", candidate_id));
                }
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        debug!(assignments = ids.len(), "generation run committed");
        Ok(ids)
    }

    pub fn find_run(&self, run_id: &str) -> RepositoryResult<Option<GenerationRunRecord>> {
        let conn = self.get_conn()?;
        let run = conn
            .query_row(
                "SELECT run_id, period_id, rules_json, events_count, assignments_count, alerts_count, committed_at
                 FROM generation_run WHERE run_id = ?1",
                params![run_id],
                |row| {
                    Ok(GenerationRunRecord {
                        run_id: row.get(0)?,
                        period_id: row.get(1)?,
                        rules_json: row.get(2)?,
                        events_count: count_at(row, 3)?,
                        assignments_count: count_at(row, 4)?,
                        alerts_count: count_at(row, 5)?,
                        committed_at: row.get(6)?,
                    })
                },
            )
            .optional()?;
        Ok(run)
    }

    // ==========================================
    // queries
    // ==========================================

    pub fn find_by_id(&self, assignment_id: AssignmentId) -> RepositoryResult<Option<Assignment>> {
        let conn = self.get_conn()?;
        load_assignment(&conn, assignment_id)
    }

    /// Roster of a period, ordered by (date, time, location, assignment id)
    pub fn list_by_period(
        &self,
        period_id: PeriodId,
        include_cancelled: bool,
    ) -> RepositoryResult<Vec<AssignmentDetail>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT a.assignment_id, a.event_id, e.period_id, a.candidate_id, c.display_name,
                    e.event_date, e.event_time, e.location, a.status, a.run_id
             FROM assignment a
             JOIN period_event e ON e.event_id = a.event_id
             JOIN candidate c ON c.candidate_id = a.candidate_id
             WHERE e.period_id = ?1 AND (?2 OR a.status = 'ACTIVE')
             ORDER BY e.event_date, e.event_time, e.location, a.assignment_id",
        )?;

        let rows = stmt
            .query_map(params![period_id, include_cancelled], |row| {
                Ok(AssignmentDetail {
                    assignment_id: row.get(0)?,
                    event_id: row.get(1)?,
                    period_id: row.get(2)?,
                    candidate_id: row.get(3)?,
                    candidate_name: row.get(4)?,
                    date: row.get(5)?,
                    time: row.get(6)?,
                    location: location_at(row, 7)?,
                    status: status_at(row, 8)?,
                    run_id: row.get(9)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// All assignments of an event (any status)
    pub fn list_by_event(&self, event_id: EventId) -> RepositoryResult<Vec<Assignment>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM assignment WHERE event_id = ?1 ORDER BY assignment_id",
            ASSIGNMENT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![event_id], map_assignment)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Active assignments per (candidate, date) for dates in [from, to]
    pub fn active_daily_counts(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<HashMap<(CandidateId, NaiveDate), u32>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT a.candidate_id, e.event_date, COUNT(*)
             FROM assignment a
             JOIN period_event e ON e.event_id = a.event_id
             WHERE a.status = 'ACTIVE' AND e.event_date BETWEEN ?1 AND ?2
             GROUP BY a.candidate_id, e.event_date",
        )?;

        let mut counts = HashMap::new();
        let rows = stmt.query_map(params![from, to], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, NaiveDate>(1)?, count_at(row, 2)?))
        })?;
        for row in rows {
            let (candidate_id, date, count) = row?;
            counts.insert((candidate_id, date), count);
        }
        Ok(counts)
    }

    /// Active assignments of a candidate on a date, optionally ignoring one
    pub fn count_active_on_date(
        &self,
        candidate_id: CandidateId,
        date: NaiveDate,
        excluding: Option<AssignmentId>,
    ) -> RepositoryResult<u32> {
        let conn = self.get_conn()?;
        count_active_on_date(&conn, candidate_id, date, excluding)
    }

    // ==========================================
    // manual edits
    // ==========================================

    /// Move an active assignment to another candidate
    ///
    /// Checked in one transaction:
    /// - the assignment exists and is active
    /// - the new candidate does not already serve the same event
    /// - the new candidate stays within `daily_limit` on that date
    ///   (the edited assignment itself is not counted)
    pub fn reassign(
        &self,
        assignment_id: AssignmentId,
        new_candidate_id: CandidateId,
        daily_limit: u32,
    ) -> RepositoryResult<Assignment> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current = load_assignment(&tx, assignment_id)?
            .ok_or_else(|| RepositoryError::not_found("Assignment", assignment_id))?;
        if current.status == AssignmentStatus::Cancelled {
            return Err(RepositoryError::BusinessRuleViolation(format!(
                "assignment {} is cancelled",
                assignment_id
            )));
        }
        if current.candidate_id == new_candidate_id {
            tx.commit()?;
            return Ok(current);
        }

        let candidate_exists: bool = tx
            .query_row(
                "SELECT 1 FROM candidate WHERE candidate_id = ?1",
                params![new_candidate_id],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        if !candidate_exists {
            return Err(RepositoryError::not_found("Candidate", new_candidate_id));
        }

        let already_serving: i64 = tx.query_row(
            "SELECT COUNT(*) FROM assignment
             WHERE event_id = ?1 AND candidate_id = ?2 AND status = 'ACTIVE'",
            params![current.event_id, new_candidate_id],
            |row| row.get(0),
        )?;
        if already_serving > 0 {
            return Err(RepositoryError::BusinessRuleViolation(format!(
                "candidate {} already serves event {}",
                new_candidate_id, current.event_id
            )));
        }

        let date: NaiveDate = tx.query_row(
            "SELECT event_date FROM period_event WHERE event_id = ?1",
            params![current.event_id],
            |row| row.get(0),
        )?;
        let same_day = count_active_on_date(&tx, new_candidate_id, date, Some(assignment_id))?;
        if same_day >= daily_limit {
            return Err(RepositoryError::DailyLimitExceeded {
                candidate_id: new_candidate_id,
                date,
                limit: daily_limit,
            });
        }

        tx.execute(
            "UPDATE assignment SET candidate_id = ?2, updated_at = ?3 WHERE assignment_id = ?1",
            params![assignment_id, new_candidate_id, now()],
        )?;
        let updated = load_assignment(&tx, assignment_id)?
            .ok_or_else(|| RepositoryError::not_found("Assignment", assignment_id))?;
        tx.commit()?;
        Ok(updated)
    }

    /// Soft-cancel an assignment
    pub fn cancel(&self, assignment_id: AssignmentId) -> RepositoryResult<Assignment> {
        let conn = self.get_conn()?;
        let current = load_assignment(&conn, assignment_id)?
            .ok_or_else(|| RepositoryError::not_found("Assignment", assignment_id))?;
        if current.status == AssignmentStatus::Cancelled {
            return Err(RepositoryError::BusinessRuleViolation(format!(
                "assignment {} is already cancelled",
                assignment_id
            )));
        }

        conn.execute(
            "UPDATE assignment SET status = 'CANCELLED', updated_at = ?2 WHERE assignment_id = ?1",
            params![assignment_id, now()],
        )?;
        load_assignment(&conn, assignment_id)?
            .ok_or_else(|| RepositoryError::not_found("Assignment", assignment_id))
    }

    // ==========================================
    // service history
    // ==========================================

    /// Services per candidate in a period, most active first
    pub fn service_totals(&self, period_id: PeriodId) -> RepositoryResult<Vec<ServiceTotal>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT s.candidate_id, c.display_name, COUNT(*) AS services
             FROM service_record s
             JOIN candidate c ON c.candidate_id = s.candidate_id
             WHERE s.period_id = ?1
             GROUP BY s.candidate_id, c.display_name
             ORDER BY services DESC, c.display_name, s.candidate_id",
        )?;
        let totals = stmt
            .query_map(params![period_id], |row| {
                Ok(ServiceTotal {
                    candidate_id: row.get(0)?,
                    display_name: row.get(1)?,
                    services: count_at(row, 2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(totals)
    }

    pub fn count_services(&self, period_id: PeriodId, candidate_id: CandidateId) -> RepositoryResult<u32> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM service_record WHERE period_id = ?1 AND candidate_id = ?2",
            params![period_id, candidate_id],
            |row| count_at(row, 0),
        )?;
        Ok(count)
    }

    /// Service records of a period in chronological order
    pub fn list_service_records(&self, period_id: PeriodId) -> RepositoryResult<Vec<ServiceRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT record_id, candidate_id, period_id, assignment_id, run_id,
                    service_date, service_time, location, recorded_at
             FROM service_record WHERE period_id = ?1
             ORDER BY service_date, service_time, location, record_id",
        )?;
        let records = stmt
            .query_map(params![period_id], |row| {
                Ok(ServiceRecord {
                    record_id: row.get(0)?,
                    candidate_id: row.get(1)?,
                    period_id: row.get(2)?,
                    assignment_id: row.get(3)?,
                    run_id: row.get(4)?,
                    date: row.get(5)?,
                    time: row.get(6)?,
                    location: location_at(row, 7)?,
                    recorded_at: row.get(8)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }
}

// ==========================================
// helpers
// ==========================================

fn map_assignment(row: &rusqlite::Row<'_>) -> rusqlite::Result<Assignment> {
    Ok(Assignment {
        assignment_id: row.get(0)?,
        event_id: row.get(1)?,
        candidate_id: row.get(2)?,
        status: status_at(row, 3)?,
        run_id: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn load_assignment(conn: &Connection, assignment_id: AssignmentId) -> RepositoryResult<Option<Assignment>> {
    let sql = format!("SELECT {} FROM assignment WHERE assignment_id = ?1", ASSIGNMENT_COLUMNS);
    let assignment = conn
        .query_row(&sql, params![assignment_id], map_assignment)
        .optional()?;
    Ok(assignment)
}

fn count_active_on_date(
    conn: &Connection,
    candidate_id: CandidateId,
    date: NaiveDate,
    excluding: Option<AssignmentId>,
) -> RepositoryResult<u32> {
    let count = conn.query_row(
        "SELECT COUNT(*)
         FROM assignment a
         JOIN period_event e ON e.event_id = a.event_id
         WHERE a.candidate_id = ?1 AND e.event_date = ?2 AND a.status = 'ACTIVE'
           AND (?3 IS NULL OR a.assignment_id <> ?3)",
        params![candidate_id, date, excluding],
        |row| count_at(row, 0),
    )?;
    Ok(count)
}
