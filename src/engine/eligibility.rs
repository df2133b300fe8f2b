// ==========================================
// Altar Rota - Eligibility Filter
// ==========================================
// Input: event + candidate pool + resolved availability + daily ledger
// Output: eligible candidates in pool order (not yet priority-sorted)
// An empty result is a valid outcome, not an error.
// ==========================================

use crate::domain::candidate::Candidate;
use crate::domain::period::Event;
use crate::domain::types::CandidateId;
use crate::engine::availability::AvailabilityResolver;
use crate::engine::error::EngineResult;
use crate::engine::workload::DailyLedger;
use std::collections::HashSet;
use tracing::instrument;

// ==========================================
// EligibilityFilter
// ==========================================
// Pure: reads only its arguments, writes nothing.
#[derive(Debug, Clone, Copy)]
pub struct EligibilityFilter {
    daily_limit: u32,
}

impl EligibilityFilter {
    pub fn new(daily_limit: u32) -> Self {
        Self { daily_limit }
    }

    /// Candidates eligible for `event`
    ///
    /// A candidate is eligible iff
    /// 1) the event's weekday is in its effective weekday set
    /// 2) the event's location is in its effective location set
    /// 3) its active assignments on the event date are below the daily limit
    /// 4) it does not already serve this event
    ///
    /// # Arguments
    /// - event: event being staffed
    /// - pool: every candidate, in stable order
    /// - resolver: availability snapshot for the event's period
    /// - ledger: persisted + in-run active assignments per date
    /// - already_serving: candidates with an active assignment on this event
    #[instrument(skip_all, fields(event_id = event.event_id, date = %event.date))]
    pub fn filter<'a>(
        &self,
        event: &Event,
        pool: &'a [Candidate],
        resolver: &AvailabilityResolver,
        ledger: &DailyLedger,
        already_serving: &HashSet<CandidateId>,
    ) -> EngineResult<Vec<&'a Candidate>> {
        let weekday = event.weekday();
        let mut eligible = Vec::new();

        for candidate in pool {
            if already_serving.contains(&candidate.candidate_id) {
                continue;
            }
            let availability = resolver.resolve(candidate.candidate_id, event.period_id)?;
            if !availability.covers(weekday, &event.location) {
                continue;
            }
            if ledger.count(candidate.candidate_id, event.date) >= self.daily_limit {
                continue;
            }
            eligible.push(candidate);
        }

        Ok(eligible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::candidate::{Availability, AvailabilityOverride};
    use crate::domain::location::Location;
    use crate::domain::types::Weekday;
    use chrono::{NaiveDate, NaiveTime};
    use std::collections::HashMap;

    const PERIOD: i64 = 7;

    fn ts() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    fn candidate(id: i64, weekdays: &[Weekday], locations: &[&str]) -> Candidate {
        Candidate {
            candidate_id: id,
            display_name: format!("C{}", id),
            primary_role: false,
            secondary_role: false,
            availability: Availability::new(
                weekdays.iter().copied(),
                locations.iter().map(|l| Location::new(l).unwrap()),
            ),
            assignment_count: 0,
            created_at: ts(),
            updated_at: ts(),
        }
    }

    fn event(date: NaiveDate, location: &str) -> Event {
        Event {
            event_id: 1,
            period_id: PERIOD,
            date,
            time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            location: Location::new(location).unwrap(),
            required_headcount: 2,
            created_at: ts(),
            updated_at: ts(),
        }
    }

    // 2025-03-04 is a Tuesday
    fn tuesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()
    }

    #[test]
    fn test_weekday_and_location_must_match() {
        let pool = vec![
            candidate(1, &[Weekday::Tuesday], &["Matriz"]),
            candidate(2, &[Weekday::Sunday], &["Matriz"]),
            candidate(3, &[Weekday::Tuesday], &["Capela"]),
        ];
        let resolver = AvailabilityResolver::new(&pool, Vec::new());
        let filter = EligibilityFilter::new(2);

        let eligible = filter
            .filter(&event(tuesday(), "Matriz"), &pool, &resolver, &DailyLedger::default(), &HashSet::new())
            .unwrap();

        let ids: Vec<i64> = eligible.iter().map(|c| c.candidate_id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn test_override_excluding_tuesday_makes_candidate_ineligible() {
        let pool = vec![candidate(1, &[Weekday::Tuesday, Weekday::Sunday], &["Matriz"])];
        let override_row = AvailabilityOverride {
            override_id: 1,
            candidate_id: 1,
            period_id: PERIOD,
            availability: Availability::new([Weekday::Sunday], [Location::new("Matriz").unwrap()]),
            created_at: ts(),
        };
        let resolver = AvailabilityResolver::new(&pool, vec![override_row]);

        let eligible = EligibilityFilter::new(2)
            .filter(&event(tuesday(), "Matriz"), &pool, &resolver, &DailyLedger::default(), &HashSet::new())
            .unwrap();
        assert!(eligible.is_empty());
    }

    #[test]
    fn test_daily_limit_counts_ledger() {
        let pool = vec![
            candidate(1, &[Weekday::Tuesday], &["Matriz"]),
            candidate(2, &[Weekday::Tuesday], &["Matriz"]),
        ];
        let resolver = AvailabilityResolver::new(&pool, Vec::new());
        let ledger = DailyLedger::new(HashMap::from([((1, tuesday()), 1)]));

        let with_limit_1 = EligibilityFilter::new(1)
            .filter(&event(tuesday(), "Matriz"), &pool, &resolver, &ledger, &HashSet::new())
            .unwrap();
        assert_eq!(with_limit_1.len(), 1);
        assert_eq!(with_limit_1[0].candidate_id, 2);

        let with_limit_2 = EligibilityFilter::new(2)
            .filter(&event(tuesday(), "Matriz"), &pool, &resolver, &ledger, &HashSet::new())
            .unwrap();
        assert_eq!(with_limit_2.len(), 2);
    }

    #[test]
    fn test_already_serving_excluded() {
        let pool = vec![
            candidate(1, &[Weekday::Tuesday], &["Matriz"]),
            candidate(2, &[Weekday::Tuesday], &["Matriz"]),
        ];
        let resolver = AvailabilityResolver::new(&pool, Vec::new());

        let eligible = EligibilityFilter::new(2)
            .filter(&event(tuesday(), "Matriz"), &pool, &resolver, &DailyLedger::default(), &HashSet::from([1]))
            .unwrap();
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].candidate_id, 2);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let pool = vec![
            candidate(3, &[Weekday::Tuesday], &["Matriz"]),
            candidate(1, &[Weekday::Tuesday], &["Matriz"]),
            candidate(2, &[Weekday::Monday], &["Matriz"]),
        ];
        let resolver = AvailabilityResolver::new(&pool, Vec::new());
        let filter = EligibilityFilter::new(2);
        let ledger = DailyLedger::default();
        let ev = event(tuesday(), "Matriz");

        let first: Vec<i64> = filter
            .filter(&ev, &pool, &resolver, &ledger, &HashSet::new())
            .unwrap()
            .iter()
            .map(|c| c.candidate_id)
            .collect();
        let second: Vec<i64> = filter
            .filter(&ev, &pool, &resolver, &ledger, &HashSet::new())
            .unwrap()
            .iter()
            .map(|c| c.candidate_id)
            .collect();

        // pool order preserved, no priority sorting
        assert_eq!(first, vec![3, 1]);
        assert_eq!(first, second);
    }
}
