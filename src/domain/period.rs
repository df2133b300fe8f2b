// ==========================================
// Altar Rota - Period / Event domain model
// ==========================================

use crate::domain::location::Location;
use crate::domain::types::{DomainError, EventId, PeriodId, Weekday};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

// ==========================================
// HeadcountDefaults
// ==========================================
/// Headcount used when an event is created without an explicit value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadcountDefaults {
    pub weekday: u32, // Monday..Friday
    pub weekend: u32, // Saturday, Sunday
}

impl Default for HeadcountDefaults {
    fn default() -> Self {
        Self { weekday: 3, weekend: 4 }
    }
}

impl HeadcountDefaults {
    pub fn for_date(&self, date: NaiveDate) -> u32 {
        if Weekday::from_date(date).is_weekend() {
            self.weekend
        } else {
            self.weekday
        }
    }
}

// ==========================================
// Period - scheduling horizon
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Period {
    pub period_id: PeriodId,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: NaiveDateTime,
}

impl Period {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

// ==========================================
// Event - one service slot
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub event_id: EventId,
    pub period_id: PeriodId,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: Location,
    pub required_headcount: u32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Event {
    /// Weekday, always recomputed from the date
    pub fn weekday(&self) -> Weekday {
        Weekday::from_date(self.date)
    }

    /// Chronological key: (date, time, location, id)
    pub fn chronological_key(&self) -> (NaiveDate, NaiveTime, &str, EventId) {
        (self.date, self.time, self.location.as_str(), self.event_id)
    }
}

// ==========================================
// EventDraft - event creation/edit payload
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDraft {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: Location,
    pub required_headcount: Option<u32>, // None -> HeadcountDefaults
}

impl EventDraft {
    pub fn resolved_headcount(&self, defaults: &HeadcountDefaults) -> Result<u32, DomainError> {
        match self.required_headcount {
            Some(0) => Err(DomainError::InvalidEvent(format!(
                "required headcount must be positive ({} {})",
                self.date, self.time
            ))),
            Some(n) => Ok(n),
            None => Ok(defaults.for_date(self.date)),
        }
    }
}

// ==========================================
// NewPeriod - period with its initial events
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPeriod {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub events: Vec<EventDraft>,
}

impl NewPeriod {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidPeriod("name is empty".to_string()));
        }
        if self.end_date < self.start_date {
            return Err(DomainError::InvalidPeriod(format!(
                "end date {} is before start date {}",
                self.end_date, self.start_date
            )));
        }
        for draft in &self.events {
            if draft.date < self.start_date || draft.date > self.end_date {
                return Err(DomainError::InvalidEvent(format!(
                    "event date {} is outside the period {}..{}",
                    draft.date, self.start_date, self.end_date
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn draft(date: NaiveDate, headcount: Option<u32>) -> EventDraft {
        EventDraft {
            date,
            time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            location: Location::new("Matriz").unwrap(),
            required_headcount: headcount,
        }
    }

    #[test]
    fn test_default_headcount_weekday_vs_weekend() {
        let defaults = HeadcountDefaults::default();

        // 2025-03-05 Wednesday, 2025-03-08 Saturday
        assert_eq!(draft(d(2025, 3, 5), None).resolved_headcount(&defaults).unwrap(), 3);
        assert_eq!(draft(d(2025, 3, 8), None).resolved_headcount(&defaults).unwrap(), 4);
        assert_eq!(draft(d(2025, 3, 8), Some(2)).resolved_headcount(&defaults).unwrap(), 2);
    }

    #[test]
    fn test_zero_headcount_rejected() {
        let defaults = HeadcountDefaults::default();
        assert!(draft(d(2025, 3, 5), Some(0)).resolved_headcount(&defaults).is_err());
    }

    #[test]
    fn test_new_period_validate() {
        let mut period = NewPeriod {
            name: "March".to_string(),
            start_date: d(2025, 3, 1),
            end_date: d(2025, 3, 31),
            events: vec![draft(d(2025, 3, 9), None)],
        };
        assert!(period.validate().is_ok());

        period.events.push(draft(d(2025, 4, 1), None));
        assert!(period.validate().is_err());

        period.events.pop();
        period.end_date = d(2025, 2, 28);
        assert!(period.validate().is_err());
    }
}
