// ==========================================
// Test helpers
// ==========================================
// Temporary databases with the real schema, plus small builders for
// locations, candidates and periods.
// ==========================================
#![allow(dead_code)]

use altar_rota::app::AppState;
use altar_rota::db::{init_schema, open_sqlite_connection};
use altar_rota::domain::{
    Availability, Candidate, Event, EventDraft, Location, NewCandidate, NewPeriod, Period, Weekday,
};
use chrono::{NaiveDate, NaiveTime};
use rusqlite::params;
use std::error::Error;
use tempfile::NamedTempFile;

/// Create a temporary database file with the schema applied
///
/// # Returns
/// - NamedTempFile: keep alive for the duration of the test
/// - String: database file path
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    altar_rota::logging::init_test();

    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().ok_or("non UTF-8 temp path")?.to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// AppState over a fresh temporary database
pub fn create_test_state() -> (NamedTempFile, AppState) {
    let (temp_file, db_path) = create_test_db().unwrap();
    let state = AppState::new(&db_path).unwrap();
    (temp_file, state)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn location(name: &str) -> Location {
    Location::new(name).unwrap()
}

pub fn add_locations(state: &AppState, names: &[&str]) {
    for name in names {
        state.candidate_api.add_location(name).unwrap();
    }
}

pub fn add_candidate(
    state: &AppState,
    name: &str,
    primary: bool,
    secondary: bool,
    weekdays: &[Weekday],
    locations: &[&str],
) -> Candidate {
    state
        .candidate_api
        .register(&NewCandidate {
            display_name: name.to_string(),
            primary_role: primary,
            secondary_role: secondary,
            availability: Availability::new(weekdays.iter().copied(), locations.iter().map(|l| location(l))),
        })
        .unwrap()
}

/// Overwrite a candidate's cumulative counter directly
pub fn set_assignment_count(db_path: &str, candidate_id: i64, count: u32) {
    let conn = open_sqlite_connection(db_path).unwrap();
    conn.execute(
        "UPDATE candidate SET assignment_count = ?1 WHERE candidate_id = ?2",
        params![count, candidate_id],
    )
    .unwrap();
}

pub fn draft(date: NaiveDate, time: NaiveTime, location_name: &str, headcount: Option<u32>) -> EventDraft {
    EventDraft {
        date,
        time,
        location: location(location_name),
        required_headcount: headcount,
    }
}

pub async fn add_period(
    state: &AppState,
    start: NaiveDate,
    end: NaiveDate,
    events: Vec<EventDraft>,
) -> (Period, Vec<Event>) {
    state
        .rotation_api
        .create_period(&NewPeriod {
            name: format!("Period {}", start),
            start_date: start,
            end_date: end,
            events,
        })
        .await
        .unwrap()
}

/// Row count of a table (audit / atomicity checks)
pub fn count_rows(db_path: &str, table: &str) -> i64 {
    let conn = open_sqlite_connection(db_path).unwrap();
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
        .unwrap()
}
