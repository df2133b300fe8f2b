// ==========================================
// Altar Rota - Availability Resolver
// ==========================================
// Input: candidate id, period id
// Output: effective weekday set + location set
// Rule: a period override replaces the defaults, never merged
// ==========================================

use crate::domain::candidate::{Availability, AvailabilityOverride, Candidate};
use crate::domain::types::{CandidateId, PeriodId};
use crate::engine::error::{EngineError, EngineResult};
use std::collections::HashMap;

/// Snapshot taken at Planning; lookups never touch storage
#[derive(Debug, Clone, Default)]
pub struct AvailabilityResolver {
    defaults: HashMap<CandidateId, Availability>,
    overrides: HashMap<(CandidateId, PeriodId), Availability>,
}

impl AvailabilityResolver {
    pub fn new(candidates: &[Candidate], overrides: impl IntoIterator<Item = AvailabilityOverride>) -> Self {
        let defaults = candidates
            .iter()
            .map(|c| (c.candidate_id, c.availability.clone()))
            .collect();
        let overrides = overrides
            .into_iter()
            .map(|o| ((o.candidate_id, o.period_id), o.availability))
            .collect();

        Self { defaults, overrides }
    }

    /// Effective availability of a candidate within a period
    ///
    /// # Errors
    /// - NotFound: unknown candidate
    pub fn resolve(&self, candidate_id: CandidateId, period_id: PeriodId) -> EngineResult<&Availability> {
        let defaults = self
            .defaults
            .get(&candidate_id)
            .ok_or_else(|| EngineError::not_found("Candidate", candidate_id))?;

        Ok(self
            .overrides
            .get(&(candidate_id, period_id))
            .unwrap_or(defaults))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::location::Location;
    use crate::domain::types::Weekday;
    use chrono::NaiveDate;

    fn candidate(id: CandidateId, weekdays: &[Weekday], locations: &[&str]) -> Candidate {
        let ts = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
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
            created_at: ts,
            updated_at: ts,
        }
    }

    fn override_for(candidate_id: CandidateId, period_id: PeriodId, weekdays: &[Weekday]) -> AvailabilityOverride {
        AvailabilityOverride {
            override_id: 1,
            candidate_id,
            period_id,
            availability: Availability::new(weekdays.iter().copied(), [Location::new("Capela").unwrap()]),
            created_at: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_defaults_without_override() {
        let pool = vec![candidate(1, &[Weekday::Sunday], &["Matriz"])];
        let resolver = AvailabilityResolver::new(&pool, Vec::new());

        let availability = resolver.resolve(1, 10).unwrap();
        assert!(availability.weekdays.contains(&Weekday::Sunday));
    }

    #[test]
    fn test_override_replaces_without_merging() {
        let pool = vec![candidate(1, &[Weekday::Sunday, Weekday::Tuesday], &["Matriz"])];
        let resolver = AvailabilityResolver::new(&pool, vec![override_for(1, 10, &[Weekday::Saturday])]);

        let availability = resolver.resolve(1, 10).unwrap();
        assert_eq!(availability.weekdays.len(), 1);
        assert!(availability.weekdays.contains(&Weekday::Saturday));
        assert!(!availability.locations.contains("Matriz"));

        // other periods keep the defaults
        let other = resolver.resolve(1, 11).unwrap();
        assert!(other.weekdays.contains(&Weekday::Tuesday));
    }

    #[test]
    fn test_unknown_candidate_is_not_found() {
        let resolver = AvailabilityResolver::new(&[], Vec::new());
        assert!(matches!(resolver.resolve(99, 1), Err(EngineError::NotFound { .. })));
    }
}
