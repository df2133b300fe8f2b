// ==========================================
// Altar Rota - Workload Balancer / daily ledger
// ==========================================
// Run-scoped, in-memory. Seeded from durable state at Planning and
// updated after every event so later events see earlier selections.
// Deltas become durable increments at commit.
// ==========================================

use crate::domain::candidate::Candidate;
use crate::domain::types::CandidateId;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

// ==========================================
// WorkloadBalancer
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct WorkloadBalancer {
    counts: HashMap<CandidateId, u32>,
    deltas: BTreeMap<CandidateId, u32>,
}

impl WorkloadBalancer {
    /// Seed from an explicit (candidate, count) map
    pub fn new(seed: impl IntoIterator<Item = (CandidateId, u32)>) -> Self {
        Self {
            counts: seed.into_iter().collect(),
            deltas: BTreeMap::new(),
        }
    }

    /// Seed from the candidates' durable cumulative counters
    pub fn from_candidates(candidates: &[Candidate]) -> Self {
        Self::new(candidates.iter().map(|c| (c.candidate_id, c.assignment_count)))
    }

    /// Current running count (unknown candidates count as 0)
    pub fn count(&self, candidate_id: CandidateId) -> u32 {
        self.counts.get(&candidate_id).copied().unwrap_or(0)
    }

    /// Stable ascending sort by running count
    ///
    /// Equal counts keep their input order.
    pub fn order(&self, candidates: &mut [&Candidate]) {
        candidates.sort_by_key(|c| self.count(c.candidate_id));
    }

    /// Record one finalized event slate
    pub fn record_selection(&mut self, selected: impl IntoIterator<Item = CandidateId>) {
        for candidate_id in selected {
            *self.counts.entry(candidate_id).or_insert(0) += 1;
            *self.deltas.entry(candidate_id).or_insert(0) += 1;
        }
    }

    /// Increments accumulated during this run, ordered by candidate id
    pub fn deltas(&self) -> Vec<(CandidateId, u32)> {
        self.deltas.iter().map(|(id, d)| (*id, *d)).collect()
    }
}

// ==========================================
// DailyLedger - active assignments per (candidate, date)
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct DailyLedger {
    counts: HashMap<(CandidateId, NaiveDate), u32>,
}

impl DailyLedger {
    /// Seed from persisted active assignments
    pub fn new(persisted: HashMap<(CandidateId, NaiveDate), u32>) -> Self {
        Self { counts: persisted }
    }

    pub fn count(&self, candidate_id: CandidateId, date: NaiveDate) -> u32 {
        self.counts.get(&(candidate_id, date)).copied().unwrap_or(0)
    }

    pub fn record(&mut self, candidate_id: CandidateId, date: NaiveDate) {
        *self.counts.entry((candidate_id, date)).or_insert(0) += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_selection_updates_counts_and_deltas() {
        let mut balancer = WorkloadBalancer::new([(1, 5), (2, 0)]);

        balancer.record_selection([2, 3]);
        balancer.record_selection([2]);

        assert_eq!(balancer.count(1), 5);
        assert_eq!(balancer.count(2), 2);
        assert_eq!(balancer.count(3), 1);
        assert_eq!(balancer.deltas(), vec![(2, 2), (3, 1)]);
    }

    #[test]
    fn test_daily_ledger() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        let mut ledger = DailyLedger::new(HashMap::from([((1, date), 1)]));

        ledger.record(1, date);
        ledger.record(2, date);

        assert_eq!(ledger.count(1, date), 2);
        assert_eq!(ledger.count(2, date), 1);
        assert_eq!(ledger.count(3, date), 0);
    }
}
