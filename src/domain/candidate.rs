// ==========================================
// Altar Rota - Candidate domain model
// ==========================================
// Availability sets are typed (Weekday enum, Location newtype);
// persistence stores them in child tables.
// ==========================================

use crate::domain::location::Location;
use crate::domain::types::{CandidateId, DomainError, PeriodId, Tier, Weekday};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const MAX_NAME_LEN: usize = 100;

// ==========================================
// Availability - weekday/location sets
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub weekdays: BTreeSet<Weekday>,   // available weekdays
    pub locations: BTreeSet<Location>, // available locations
}

impl Availability {
    pub fn new(
        weekdays: impl IntoIterator<Item = Weekday>,
        locations: impl IntoIterator<Item = Location>,
    ) -> Self {
        Self {
            weekdays: weekdays.into_iter().collect(),
            locations: locations.into_iter().collect(),
        }
    }

    /// Parse loosely-typed input (e.g. an imported spreadsheet row)
    ///
    /// Weekday names may be English or Portuguese; any invalid entry
    /// rejects the whole set.
    pub fn parse<W, L>(weekdays: &[W], locations: &[L]) -> Result<Self, DomainError>
    where
        W: AsRef<str>,
        L: AsRef<str>,
    {
        let weekdays = weekdays
            .iter()
            .map(|w| w.as_ref().parse::<Weekday>())
            .collect::<Result<BTreeSet<_>, _>>()?;
        let locations = locations
            .iter()
            .map(Location::new)
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self { weekdays, locations })
    }

    /// Both the weekday and the location are in the sets
    pub fn covers(&self, weekday: Weekday, location: &Location) -> bool {
        self.weekdays.contains(&weekday) && self.locations.contains(location)
    }
}

// ==========================================
// Candidate - volunteer
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub candidate_id: CandidateId,
    pub display_name: String,
    pub primary_role: bool,          // eligible for the primary tier
    pub secondary_role: bool,        // secondary tier unless primary_role is also set
    pub availability: Availability,  // default availability
    pub assignment_count: u32,       // durable cumulative counter
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Candidate {
    /// Selection tier; primary wins when both flags are set
    pub fn tier(&self) -> Tier {
        tier_for(self.primary_role, self.secondary_role)
    }
}

pub(crate) fn tier_for(primary_role: bool, secondary_role: bool) -> Tier {
    if primary_role {
        Tier::Primary
    } else if secondary_role {
        Tier::Secondary
    } else {
        Tier::Other
    }
}

// ==========================================
// NewCandidate - create/update payload
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCandidate {
    pub display_name: String,
    pub primary_role: bool,
    pub secondary_role: bool,
    pub availability: Availability,
}

impl NewCandidate {
    pub fn validate(&self) -> Result<(), DomainError> {
        let name = self.display_name.trim();
        if name.is_empty() {
            return Err(DomainError::InvalidCandidate("display name is empty".to_string()));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(DomainError::InvalidCandidate(format!(
                "display name longer than {} characters",
                MAX_NAME_LEN
            )));
        }
        Ok(())
    }
}

// ==========================================
// AvailabilityOverride - period-scoped replacement
// ==========================================
// At most one per (candidate, period). When present it replaces the
// candidate's defaults entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityOverride {
    pub override_id: i64,
    pub candidate_id: CandidateId,
    pub period_id: PeriodId,
    pub availability: Availability,
    pub created_at: NaiveDateTime,
}
