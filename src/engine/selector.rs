// ==========================================
// Altar Rota - Tiered Selector
// ==========================================
// Input: eligible candidates + running workload + SlotDemand
// Output: ordered slate (len <= open slots) + StaffingOutcome
// Deterministic single pass, no backtracking.
// Tier precedence: primary > secondary > other
// ==========================================

use crate::config::RotationRules;
use crate::domain::alert::{DegradationReason, StaffingOutcome};
use crate::domain::candidate::Candidate;
use crate::domain::period::Event;
use crate::domain::types::{CandidateId, Tier};
use crate::engine::workload::WorkloadBalancer;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, instrument};

/// One slate entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedCandidate {
    pub candidate_id: CandidateId,
    pub display_name: String,
    pub tier: Tier,
    pub workload_before: u32, // running count when selected
}

/// Slate for one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub slate: Vec<SelectedCandidate>,
    pub outcome: StaffingOutcome,
}

impl Selection {
    pub fn candidate_ids(&self) -> Vec<CandidateId> {
        self.slate.iter().map(|s| s.candidate_id).collect()
    }
}

/// What one event still needs
///
/// `serving` and `serving_primary` count candidates already actively
/// assigned to the event; a fresh event has both at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotDemand {
    pub headcount: u32,
    pub serving: u32,
    pub serving_primary: u32,
}

impl SlotDemand {
    pub fn fresh(headcount: u32) -> Self {
        Self {
            headcount,
            serving: 0,
            serving_primary: 0,
        }
    }

    pub fn open_slots(&self) -> u32 {
        self.headcount.saturating_sub(self.serving)
    }

    /// Primaries still to reserve once current servers are counted
    pub fn missing_primary(&self, minimum_primary: u32) -> u32 {
        minimum_primary.saturating_sub(self.serving_primary)
    }
}

/// Staffing decision for one event of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventStaffing {
    pub event: Event,
    pub slate: Vec<SelectedCandidate>,
    pub outcome: StaffingOutcome,
}

// ==========================================
// TieredSelector
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct TieredSelector {
    minimum_primary: u32,
    prioritize_roles: bool,
}

impl TieredSelector {
    pub fn new(minimum_primary: u32, prioritize_roles: bool) -> Self {
        Self {
            minimum_primary,
            prioritize_roles,
        }
    }

    pub fn from_rules(rules: &RotationRules) -> Self {
        Self::new(rules.minimum_primary, rules.prioritize_roles)
    }

    /// Select the slate for one event
    ///
    /// 1) partition into primary / secondary / other
    /// 2) sort each tier by ascending running count (stable)
    /// 3) enough primaries: reserve `minimum_primary`, fill from secondary
    ///    then other, surplus primaries last
    /// 4) some primaries: take all of them, fill from secondary then other
    /// 5) no primary: secondary first, then other
    /// 6) neither: other only
    /// 7) slate shorter than the open slots -> Unfulfilled
    ///
    /// Current servers fill slots and count towards `minimum_primary`;
    /// only the rest is selected here.
    /// With `prioritize_roles = false` the primaries are still reserved,
    /// the rest is filled by ascending count regardless of tier.
    /// An empty eligible list yields Unfulfilled without a tier reason.
    #[instrument(skip(self, eligible, workload), fields(eligible_count = eligible.len(), headcount = demand.headcount, serving = demand.serving))]
    pub fn select(
        &self,
        eligible: &[&Candidate],
        demand: SlotDemand,
        workload: &WorkloadBalancer,
    ) -> Selection {
        let need = demand.open_slots() as usize;
        let minimum = demand.missing_primary(self.minimum_primary) as usize;

        // ===== 1) partition, 2) order each tier =====
        let mut primary: Vec<&Candidate> = Vec::new();
        let mut secondary: Vec<&Candidate> = Vec::new();
        let mut other: Vec<&Candidate> = Vec::new();
        for &candidate in eligible {
            match candidate.tier() {
                Tier::Primary => primary.push(candidate),
                Tier::Secondary => secondary.push(candidate),
                Tier::Other => other.push(candidate),
            }
        }
        workload.order(&mut primary);
        workload.order(&mut secondary);
        workload.order(&mut other);

        let mut primary: VecDeque<&Candidate> = primary.into();
        let mut slate: Vec<&Candidate> = Vec::with_capacity(need);

        // ===== 3)..6) tier policy =====
        let degradation = if eligible.is_empty() || primary.len() >= minimum {
            None
        } else if !primary.is_empty() {
            Some(DegradationReason::InsufficientPrimary {
                required: self.minimum_primary,
                available: demand.serving_primary + primary.len() as u32,
            })
        } else if !secondary.is_empty() {
            Some(DegradationReason::NoPrimary)
        } else {
            Some(DegradationReason::NoPrimaryOrSecondary)
        };

        // reserved primaries (all of them when short of the minimum)
        let reserved = minimum.min(primary.len()).min(need);
        slate.extend(primary.drain(..reserved));

        if self.prioritize_roles {
            fill(&mut slate, need, secondary);
            fill(&mut slate, need, other);
            fill(&mut slate, need, primary);
        } else {
            let mut rest: Vec<&Candidate> = eligible
                .iter()
                .copied()
                .filter(|c| !slate.iter().any(|s| s.candidate_id == c.candidate_id))
                .collect();
            workload.order(&mut rest);
            fill(&mut slate, need, rest);
        }

        // ===== 7) outcome =====
        let assigned = demand.serving + slate.len() as u32;
        let outcome = if slate.len() < need {
            StaffingOutcome::Unfulfilled {
                degradation,
                required: demand.headcount,
                assigned,
            }
        } else {
            match degradation {
                Some(reason) => StaffingOutcome::DegradedFulfilled { reason },
                None => StaffingOutcome::Fulfilled,
            }
        };

        debug!(assigned, required = demand.headcount, ?outcome, "slate selected");

        Selection {
            slate: slate
                .into_iter()
                .map(|c| SelectedCandidate {
                    candidate_id: c.candidate_id,
                    display_name: c.display_name.clone(),
                    tier: c.tier(),
                    workload_before: workload.count(c.candidate_id),
                })
                .collect(),
            outcome,
        }
    }
}

fn fill<'a>(slate: &mut Vec<&'a Candidate>, need: usize, source: impl IntoIterator<Item = &'a Candidate>) {
    for candidate in source {
        if slate.len() >= need {
            break;
        }
        slate.push(candidate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::candidate::Availability;
    use chrono::NaiveDate;

    fn candidate(id: i64, primary: bool, secondary: bool, count: u32) -> Candidate {
        let ts = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        Candidate {
            candidate_id: id,
            display_name: format!("C{}", id),
            primary_role: primary,
            secondary_role: secondary,
            availability: Availability::default(),
            assignment_count: count,
            created_at: ts,
            updated_at: ts,
        }
    }

    fn ids(selection: &Selection) -> Vec<i64> {
        selection.candidate_ids()
    }

    #[test]
    fn test_primary_reserved_despite_higher_count() {
        // A(primary, 2), B(secondary, 0), C(other, 0), headcount 2
        let pool = vec![
            candidate(1, true, false, 2),
            candidate(2, false, true, 0),
            candidate(3, false, false, 0),
        ];
        let eligible: Vec<&Candidate> = pool.iter().collect();
        let workload = WorkloadBalancer::from_candidates(&pool);

        let selection = TieredSelector::new(1, true).select(&eligible, SlotDemand::fresh(2), &workload);

        assert_eq!(ids(&selection), vec![1, 2]);
        assert_eq!(selection.outcome, StaffingOutcome::Fulfilled);
    }

    #[test]
    fn test_ascending_count_within_tier() {
        let pool = vec![
            candidate(1, true, false, 5),
            candidate(2, true, false, 1),
            candidate(3, false, true, 4),
            candidate(4, false, true, 2),
        ];
        let eligible: Vec<&Candidate> = pool.iter().collect();
        let workload = WorkloadBalancer::from_candidates(&pool);

        let selection = TieredSelector::new(1, true).select(&eligible, SlotDemand::fresh(3), &workload);

        assert_eq!(ids(&selection), vec![2, 4, 3]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let pool = vec![
            candidate(9, false, false, 0),
            candidate(4, false, false, 0),
            candidate(7, false, false, 0),
        ];
        let eligible: Vec<&Candidate> = pool.iter().collect();
        let workload = WorkloadBalancer::from_candidates(&pool);

        let selection = TieredSelector::new(0, true).select(&eligible, SlotDemand::fresh(2), &workload);
        assert_eq!(ids(&selection), vec![9, 4]);
    }

    #[test]
    fn test_insufficient_primary() {
        let pool = vec![
            candidate(1, true, false, 0),
            candidate(2, false, true, 0),
            candidate(3, false, false, 0),
        ];
        let eligible: Vec<&Candidate> = pool.iter().collect();
        let workload = WorkloadBalancer::from_candidates(&pool);

        let selection = TieredSelector::new(2, true).select(&eligible, SlotDemand::fresh(3), &workload);

        assert_eq!(ids(&selection), vec![1, 2, 3]);
        assert_eq!(
            selection.outcome,
            StaffingOutcome::DegradedFulfilled {
                reason: DegradationReason::InsufficientPrimary { required: 2, available: 1 }
            }
        );
    }

    #[test]
    fn test_no_primary_falls_back_to_secondary() {
        let pool = vec![candidate(1, false, false, 0), candidate(2, false, true, 3)];
        let eligible: Vec<&Candidate> = pool.iter().collect();
        let workload = WorkloadBalancer::from_candidates(&pool);

        let selection = TieredSelector::new(1, true).select(&eligible, SlotDemand::fresh(2), &workload);

        assert_eq!(ids(&selection), vec![2, 1]);
        assert_eq!(
            selection.outcome,
            StaffingOutcome::DegradedFulfilled { reason: DegradationReason::NoPrimary }
        );
    }

    #[test]
    fn test_other_only_and_shortfall() {
        let pool = vec![candidate(1, false, false, 0)];
        let eligible: Vec<&Candidate> = pool.iter().collect();
        let workload = WorkloadBalancer::from_candidates(&pool);

        let selection = TieredSelector::new(1, true).select(&eligible, SlotDemand::fresh(3), &workload);

        assert_eq!(ids(&selection), vec![1]);
        assert_eq!(
            selection.outcome,
            StaffingOutcome::Unfulfilled {
                degradation: Some(DegradationReason::NoPrimaryOrSecondary),
                required: 3,
                assigned: 1,
            }
        );
    }

    #[test]
    fn test_empty_eligible_has_no_tier_reason() {
        let workload = WorkloadBalancer::default();
        let selection = TieredSelector::new(1, true).select(&[], SlotDemand::fresh(2), &workload);

        assert!(selection.slate.is_empty());
        assert_eq!(
            selection.outcome,
            StaffingOutcome::Unfulfilled { degradation: None, required: 2, assigned: 0 }
        );
    }

    #[test]
    fn test_surplus_primaries_used_last() {
        let pool = vec![
            candidate(1, true, false, 0),
            candidate(2, true, false, 1),
            candidate(3, false, false, 9),
        ];
        let eligible: Vec<&Candidate> = pool.iter().collect();
        let workload = WorkloadBalancer::from_candidates(&pool);

        let selection = TieredSelector::new(1, true).select(&eligible, SlotDemand::fresh(3), &workload);
        assert_eq!(ids(&selection), vec![1, 3, 2]);
        assert_eq!(selection.outcome, StaffingOutcome::Fulfilled);
    }

    #[test]
    fn test_without_role_priority_fills_by_count() {
        let pool = vec![
            candidate(1, true, false, 3),
            candidate(2, false, true, 2),
            candidate(3, false, false, 0),
        ];
        let eligible: Vec<&Candidate> = pool.iter().collect();
        let workload = WorkloadBalancer::from_candidates(&pool);

        let selection = TieredSelector::new(1, false).select(&eligible, SlotDemand::fresh(2), &workload);
        assert_eq!(ids(&selection), vec![1, 3]);
    }

    #[test]
    fn test_slate_never_exceeds_headcount_nor_repeats() {
        let pool: Vec<Candidate> = (1..=8)
            .map(|i| candidate(i, i % 3 == 0, i % 2 == 0, (i % 4) as u32))
            .collect();
        let eligible: Vec<&Candidate> = pool.iter().collect();
        let workload = WorkloadBalancer::from_candidates(&pool);

        for headcount in 1..=10 {
            for prioritize in [true, false] {
                let selection = TieredSelector::new(2, prioritize).select(&eligible, SlotDemand::fresh(headcount), &workload);
                let mut seen = ids(&selection);
                assert!(seen.len() <= headcount as usize);
                seen.sort();
                seen.dedup();
                assert_eq!(seen.len(), selection.slate.len());
            }
        }
    }

    #[test]
    fn test_serving_primary_counts_towards_minimum() {
        // one primary already serves, one slot left
        let pool = vec![candidate(2, false, true, 0), candidate(3, false, false, 0)];
        let eligible: Vec<&Candidate> = pool.iter().collect();
        let workload = WorkloadBalancer::from_candidates(&pool);
        let demand = SlotDemand { headcount: 2, serving: 1, serving_primary: 1 };

        let selection = TieredSelector::new(1, true).select(&eligible, demand, &workload);

        assert_eq!(ids(&selection), vec![2]);
        assert_eq!(selection.outcome, StaffingOutcome::Fulfilled);
    }

    #[test]
    fn test_serving_primaries_partially_cover_minimum() {
        let pool = vec![
            candidate(1, true, false, 4),
            candidate(2, true, false, 5),
            candidate(3, false, true, 0),
        ];
        let eligible: Vec<&Candidate> = pool.iter().collect();
        let workload = WorkloadBalancer::from_candidates(&pool);
        let demand = SlotDemand { headcount: 4, serving: 2, serving_primary: 1 };

        let selection = TieredSelector::new(2, true).select(&eligible, demand, &workload);

        // one more primary reserved, then secondary
        assert_eq!(ids(&selection), vec![1, 3]);
        assert_eq!(selection.outcome, StaffingOutcome::Fulfilled);
    }

    #[test]
    fn test_top_up_shortfall_reports_full_headcount() {
        let pool = vec![candidate(1, false, false, 0)];
        let eligible: Vec<&Candidate> = pool.iter().collect();
        let workload = WorkloadBalancer::from_candidates(&pool);
        let demand = SlotDemand { headcount: 4, serving: 1, serving_primary: 1 };

        let selection = TieredSelector::new(2, true).select(&eligible, demand, &workload);

        assert_eq!(ids(&selection), vec![1]);
        assert_eq!(
            selection.outcome,
            StaffingOutcome::Unfulfilled {
                degradation: Some(DegradationReason::NoPrimaryOrSecondary),
                required: 4,
                assigned: 2,
            }
        );
    }
}
