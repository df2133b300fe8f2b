// ==========================================
// Altar Rota - period / event repository
// ==========================================
// Tables: period, period_event
// The weekday column does not exist; it is always derived from the date.
// ==========================================

use crate::domain::period::{Event, EventDraft, HeadcountDefaults, NewPeriod, Period};
use crate::domain::types::{EventId, PeriodId};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_mapping::{count_at, location_at, now};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

const EVENT_COLUMNS: &str = "event_id, period_id, event_date, event_time, location,
     required_headcount, created_at, updated_at";

pub struct PeriodRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PeriodRepository {
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

    /// Create a period and its events in one transaction
    ///
    /// # Arguments
    /// - payload: period header and event drafts
    /// - defaults: headcount for drafts without an explicit value
    ///
    /// # Returns
    /// - the stored period and its events in chronological order
    pub fn create(
        &self,
        payload: &NewPeriod,
        defaults: &HeadcountDefaults,
    ) -> RepositoryResult<(Period, Vec<Event>)> {
        payload.validate()?;

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let ts = now();

        tx.execute(
            "INSERT INTO period (name, start_date, end_date, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![payload.name.trim(), payload.start_date, payload.end_date, ts],
        )?;
        let period_id = tx.last_insert_rowid();

        for draft in &payload.events {
            insert_event(&tx, period_id, draft, defaults)?;
        }

        let period = load_period(&tx, period_id)?
            .ok_or_else(|| RepositoryError::not_found("Period", period_id))?;
        let events = load_events(&tx, period_id)?;
        tx.commit()?;

        Ok((period, events))
    }

    pub fn find_by_id(&self, period_id: PeriodId) -> RepositoryResult<Option<Period>> {
        let conn = self.get_conn()?;
        load_period(&conn, period_id)
    }

    /// All periods, most recent start first
    pub fn list_all(&self) -> RepositoryResult<Vec<Period>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT period_id, name, start_date, end_date, created_at
             FROM period ORDER BY start_date DESC, period_id DESC",
        )?;
        let periods = stmt
            .query_map([], map_period)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(periods)
    }

    /// Add one event to an existing period
    pub fn add_event(
        &self,
        period_id: PeriodId,
        draft: &EventDraft,
        defaults: &HeadcountDefaults,
    ) -> RepositoryResult<Event> {
        let conn = self.get_conn()?;
        let period = load_period(&conn, period_id)?
            .ok_or_else(|| RepositoryError::not_found("Period", period_id))?;
        ensure_in_period(&period, draft)?;

        let event_id = insert_event(&conn, period_id, draft, defaults)?;
        load_event(&conn, event_id)?.ok_or_else(|| RepositoryError::not_found("Event", event_id))
    }

    /// Explicit edit of an event's date, time, location or headcount
    pub fn update_event(
        &self,
        event_id: EventId,
        draft: &EventDraft,
        defaults: &HeadcountDefaults,
    ) -> RepositoryResult<Event> {
        let conn = self.get_conn()?;
        let existing = load_event(&conn, event_id)?
            .ok_or_else(|| RepositoryError::not_found("Event", event_id))?;
        let period = load_period(&conn, existing.period_id)?
            .ok_or_else(|| RepositoryError::not_found("Period", existing.period_id))?;
        ensure_in_period(&period, draft)?;

        let headcount = draft.resolved_headcount(defaults)?;
        conn.execute(
            "UPDATE period_event
             SET event_date = ?2, event_time = ?3, location = ?4, required_headcount = ?5, updated_at = ?6
             WHERE event_id = ?1",
            params![
                event_id,
                draft.date,
                draft.time,
                draft.location.as_str(),
                headcount,
                now()
            ],
        )?;

        load_event(&conn, event_id)?.ok_or_else(|| RepositoryError::not_found("Event", event_id))
    }

    /// Delete an event (its assignments cascade)
    pub fn delete_event(&self, event_id: EventId) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM period_event WHERE event_id = ?1", params![event_id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Event", event_id));
        }
        Ok(())
    }

    pub fn find_event(&self, event_id: EventId) -> RepositoryResult<Option<Event>> {
        let conn = self.get_conn()?;
        load_event(&conn, event_id)
    }

    /// Events of a period ordered by (date, time, location, id)
    pub fn list_events(&self, period_id: PeriodId) -> RepositoryResult<Vec<Event>> {
        let conn = self.get_conn()?;
        load_events(&conn, period_id)
    }
}

// ==========================================
// helpers
// ==========================================

fn ensure_in_period(period: &Period, draft: &EventDraft) -> RepositoryResult<()> {
    if !period.contains(draft.date) {
        return Err(RepositoryError::ValidationError(format!(
            "event date {} is outside period {} ({}..{})",
            draft.date, period.period_id, period.start_date, period.end_date
        )));
    }
    Ok(())
}

fn insert_event(
    conn: &Connection,
    period_id: PeriodId,
    draft: &EventDraft,
    defaults: &HeadcountDefaults,
) -> RepositoryResult<EventId> {
    let headcount = draft.resolved_headcount(defaults)?;
    let ts = now();
    conn.execute(
        "INSERT INTO period_event
            (period_id, event_date, event_time, location, required_headcount, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        params![
            period_id,
            draft.date,
            draft.time,
            draft.location.as_str(),
            headcount,
            ts
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn map_period(row: &rusqlite::Row<'_>) -> rusqlite::Result<Period> {
    Ok(Period {
        period_id: row.get(0)?,
        name: row.get(1)?,
        start_date: row.get(2)?,
        end_date: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn map_event(row: &rusqlite::Row<'_>) -> rusqlite::Result<Event> {
    Ok(Event {
        event_id: row.get(0)?,
        period_id: row.get(1)?,
        date: row.get(2)?,
        time: row.get(3)?,
        location: location_at(row, 4)?,
        required_headcount: count_at(row, 5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn load_period(conn: &Connection, period_id: PeriodId) -> RepositoryResult<Option<Period>> {
    let period = conn
        .query_row(
            "SELECT period_id, name, start_date, end_date, created_at FROM period WHERE period_id = ?1",
            params![period_id],
            map_period,
        )
        .optional()?;
    Ok(period)
}

fn load_event(conn: &Connection, event_id: EventId) -> RepositoryResult<Option<Event>> {
    let sql = format!("SELECT {} FROM period_event WHERE event_id = ?1", EVENT_COLUMNS);
    let event = conn.query_row(&sql, params![event_id], map_event).optional()?;
    Ok(event)
}

fn load_events(conn: &Connection, period_id: PeriodId) -> RepositoryResult<Vec<Event>> {
    let sql = format!(
        "SELECT {} FROM period_event WHERE period_id = ?1
         ORDER BY event_date, event_time, location, event_id",
        EVENT_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let events = stmt
        .query_map(params![period_id], map_event)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(events)
}
