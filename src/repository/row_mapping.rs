// ==========================================
// Altar Rota - row mapping helpers
// ==========================================
// Dates/times are bound through rusqlite's chrono support
// (TEXT, "%Y-%m-%d" / "%H:%M:%S"). Domain value types are
// validated on the way out so bad rows surface as errors.
// ==========================================

use crate::domain::location::Location;
use crate::domain::types::{AssignmentStatus, Weekday};
use chrono::{NaiveDateTime, Utc};
use rusqlite::types::Type;
use rusqlite::Row;

pub(crate) fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

pub(crate) fn location_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Location> {
    let raw: String = row.get(idx)?;
    Location::new(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn weekday_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Weekday> {
    let raw: String = row.get(idx)?;
    raw.parse::<Weekday>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn status_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<AssignmentStatus> {
    let raw: String = row.get(idx)?;
    raw.parse::<AssignmentStatus>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into())
    })
}

/// Non-negative INTEGER column as u32
pub(crate) fn count_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<u32> {
    let raw: i64 = row.get(idx)?;
    u32::try_from(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(e)))
}
