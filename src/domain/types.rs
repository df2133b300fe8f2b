// ==========================================
// Altar Rota - domain value types
// ==========================================

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub type CandidateId = i64;
pub type PeriodId = i64;
pub type EventId = i64;
pub type AssignmentId = i64;

// ==========================================
// DomainError
// ==========================================
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid weekday: {0}")]
    InvalidWeekday(String),

    #[error("invalid location: {0}")]
    InvalidLocation(String),

    #[error("invalid period: {0}")]
    InvalidPeriod(String),

    #[error("invalid event: {0}")]
    InvalidEvent(String),

    #[error("invalid candidate: {0}")]
    InvalidCandidate(String),
}

// ==========================================
// Weekday
// ==========================================
// Always derived from a calendar date; never stored on an event.
// Serialized as SCREAMING_SNAKE_CASE (same as the database CHECK).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn from_date(date: NaiveDate) -> Self {
        match date.weekday() {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }

    pub fn is_weekend(self) -> bool {
        matches!(self, Weekday::Saturday | Weekday::Sunday)
    }

    /// Database/wire representation
    pub fn as_str(self) -> &'static str {
        match self {
            Weekday::Monday => "MONDAY",
            Weekday::Tuesday => "TUESDAY",
            Weekday::Wednesday => "WEDNESDAY",
            Weekday::Thursday => "THURSDAY",
            Weekday::Friday => "FRIDAY",
            Weekday::Saturday => "SATURDAY",
            Weekday::Sunday => "SUNDAY",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the canonical form plus English and Portuguese names and
/// abbreviations ("Tue", "Terça", "ter", "sábado", "segunda-feira").
impl FromStr for Weekday {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| match c {
                'á' | 'à' | 'â' | 'ã' => 'a',
                'é' | 'ê' => 'e',
                'í' => 'i',
                'ó' | 'ô' => 'o',
                'ú' => 'u',
                'ç' => 'c',
                other => other,
            })
            .collect();
        let key = normalized.strip_suffix("-feira").unwrap_or(&normalized);

        let day = match key {
            "monday" | "mon" | "segunda" | "seg" => Weekday::Monday,
            "tuesday" | "tue" | "terca" | "ter" => Weekday::Tuesday,
            "wednesday" | "wed" | "quarta" | "qua" => Weekday::Wednesday,
            "thursday" | "thu" | "quinta" | "qui" => Weekday::Thursday,
            "friday" | "fri" | "sexta" | "sex" => Weekday::Friday,
            "saturday" | "sat" | "sabado" | "sab" => Weekday::Saturday,
            "sunday" | "sun" | "domingo" | "dom" => Weekday::Sunday,
            _ => return Err(DomainError::InvalidWeekday(s.to_string())),
        };
        Ok(day)
    }
}

// ==========================================
// Tier - selection priority partition
// ==========================================
// Order: Primary < Secondary < Other (lower = higher precedence)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    Primary,
    Secondary,
    Other,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Primary => write!(f, "PRIMARY"),
            Tier::Secondary => write!(f, "SECONDARY"),
            Tier::Other => write!(f, "OTHER"),
        }
    }
}

// ==========================================
// AssignmentStatus
// ==========================================
// Cancellation is a soft status change, never a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentStatus {
    Active,
    Cancelled,
}

impl AssignmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AssignmentStatus::Active => "ACTIVE",
            AssignmentStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssignmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(AssignmentStatus::Active),
            "CANCELLED" => Ok(AssignmentStatus::Cancelled),
            other => Err(format!("unknown assignment status: {}", other)),
        }
    }
}

// ==========================================
// AlertSeverity
// ==========================================
// Order: Warning < Critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertSeverity {
    Warning,  // tier fallback, event still staffed
    Critical, // event understaffed
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertSeverity::Warning => write!(f, "WARNING"),
            AlertSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

// ==========================================
// RunState - generation run lifecycle
// ==========================================
// Planning -> Staffing(n) -> Committing -> Completed | Failed
// Completed and Failed are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    Planning,
    Staffing { event_index: usize },
    Committing,
    Completed,
    Failed,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Completed | RunState::Failed)
    }

    /// Whether `self -> next` is a legal transition
    pub fn can_transition_to(self, next: RunState) -> bool {
        use RunState::*;

        match (self, next) {
            (Completed, _) | (Failed, _) => false,
            (_, Failed) => true,
            (Planning, Staffing { event_index: 0 }) => true,
            (Planning, Committing) => true,
            (Staffing { event_index: a }, Staffing { event_index: b }) => b == a + 1,
            (Staffing { .. }, Committing) => true,
            (Committing, Completed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Planning => write!(f, "PLANNING"),
            RunState::Staffing { event_index } => write!(f, "STAFFING({})", event_index),
            RunState::Committing => write!(f, "COMMITTING"),
            RunState::Completed => write!(f, "COMPLETED"),
            RunState::Failed => write!(f, "FAILED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_from_date() {
        // 2025-03-04 is a Tuesday
        let date = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        assert_eq!(Weekday::from_date(date), Weekday::Tuesday);

        let sunday = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(Weekday::from_date(sunday), Weekday::Sunday);
        assert!(Weekday::from_date(sunday).is_weekend());
    }

    #[test]
    fn test_weekday_parse_aliases() {
        assert_eq!("TUESDAY".parse::<Weekday>().unwrap(), Weekday::Tuesday);
        assert_eq!("Terça".parse::<Weekday>().unwrap(), Weekday::Tuesday);
        assert_eq!("ter".parse::<Weekday>().unwrap(), Weekday::Tuesday);
        assert_eq!("Sábado".parse::<Weekday>().unwrap(), Weekday::Saturday);
        assert_eq!("segunda-feira".parse::<Weekday>().unwrap(), Weekday::Monday);
        assert_eq!(" sun ".parse::<Weekday>().unwrap(), Weekday::Sunday);
        assert!("funday".parse::<Weekday>().is_err());
    }

    #[test]
    fn test_weekday_roundtrip_as_str() {
        for day in Weekday::ALL {
            assert_eq!(day.as_str().parse::<Weekday>().unwrap(), day);
        }
    }

    #[test]
    fn test_run_state_transitions() {
        use RunState::*;

        assert!(Planning.can_transition_to(Staffing { event_index: 0 }));
        assert!(Staffing { event_index: 0 }.can_transition_to(Staffing { event_index: 1 }));
        assert!(!Staffing { event_index: 0 }.can_transition_to(Staffing { event_index: 2 }));
        assert!(Staffing { event_index: 3 }.can_transition_to(Committing));
        assert!(Committing.can_transition_to(Completed));
        assert!(Committing.can_transition_to(Failed));
        assert!(!Completed.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Planning));
        assert!(!Planning.can_transition_to(Completed));
    }
}
