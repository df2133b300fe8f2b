// ==========================================
// Altar Rota - Assignment Committer
// ==========================================
// The only transactional boundary of a run. Slates + workload deltas
// become one CommitBatch; the repository applies it atomically.
// ==========================================

use crate::config::RotationRules;
use crate::domain::assignment::CreatedAssignment;
use crate::domain::types::AssignmentId;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::run_control::GenerationRun;
use crate::engine::selector::EventStaffing;
use crate::engine::workload::WorkloadBalancer;
use crate::repository::{AssignmentRepository, CommitBatch, PendingAssignment};
use std::sync::Arc;
use tracing::{error, info, instrument};

pub struct AssignmentCommitter {
    assignment_repo: Arc<AssignmentRepository>,
}

impl AssignmentCommitter {
    pub fn new(assignment_repo: Arc<AssignmentRepository>) -> Self {
        Self { assignment_repo }
    }

    /// Flatten the run into a CommitBatch (chronological order kept)
    pub fn build_batch(
        run: &GenerationRun,
        rules: &RotationRules,
        staffing: &[EventStaffing],
        workload: &WorkloadBalancer,
        alerts_count: usize,
    ) -> CommitBatch {
        let assignments = staffing
            .iter()
            .flat_map(|s| {
                s.slate.iter().map(move |selected| PendingAssignment {
                    event_id: s.event.event_id,
                    candidate_id: selected.candidate_id,
                    date: s.event.date,
                    time: s.event.time,
                    location: s.event.location.clone(),
                })
            })
            .collect();

        CommitBatch {
            run_id: run.run_id().to_string(),
            period_id: run.period_id(),
            rules_json: rules.to_json(),
            events_count: staffing.len() as u32,
            alerts_count: alerts_count as u32,
            daily_limit: rules.daily_limit,
            assignments,
            counter_increments: workload.deltas(),
        }
    }

    /// Apply the batch; any failure leaves no trace
    ///
    /// # Returns
    /// created assignments, in batch order
    #[instrument(skip(self, batch, staffing), fields(run_id = %batch.run_id, assignments = batch.assignments.len()))]
    pub fn commit(
        &self,
        batch: &CommitBatch,
        staffing: &[EventStaffing],
    ) -> EngineResult<Vec<CreatedAssignment>> {
        let ids: Vec<AssignmentId> = self.assignment_repo.commit_run(batch).map_err(|e| {
            error!(error = %e, "commit failed, run rolled back");
            EngineError::Persistence(e)
        })?;

        let created: Vec<CreatedAssignment> = staffing
            .iter()
            .flat_map(|s| {
                s.slate.iter().map(move |selected| (s, selected))
            })
            .zip(ids)
            .map(|((s, selected), assignment_id)| CreatedAssignment {
                assignment_id,
                candidate_id: selected.candidate_id,
                candidate_name: selected.display_name.clone(),
                event_id: s.event.event_id,
                date: s.event.date,
                time: s.event.time,
                location: s.event.location.clone(),
            })
            .collect();

        info!(created = created.len(), "assignments committed");
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::alert::StaffingOutcome;
    use crate::domain::location::Location;
    use crate::domain::period::Event;
    use crate::domain::types::Tier;
    use crate::engine::selector::SelectedCandidate;
    use chrono::{NaiveDate, NaiveTime};

    fn staffing(event_id: i64, candidate_ids: &[i64]) -> EventStaffing {
        let ts = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        EventStaffing {
            event: Event {
                event_id,
                period_id: 1,
                date: NaiveDate::from_ymd_opt(2025, 3, 9).unwrap(),
                time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                location: Location::new("Matriz").unwrap(),
                required_headcount: 2,
                created_at: ts,
                updated_at: ts,
            },
            slate: candidate_ids
                .iter()
                .map(|id| SelectedCandidate {
                    candidate_id: *id,
                    display_name: format!("C{}", id),
                    tier: Tier::Other,
                    workload_before: 0,
                })
                .collect(),
            outcome: StaffingOutcome::Fulfilled,
        }
    }

    #[test]
    fn test_build_batch_flattens_in_order() {
        let run = GenerationRun::new(1);
        let mut workload = WorkloadBalancer::new([(1, 0), (2, 0)]);
        workload.record_selection([1, 2]);
        workload.record_selection([1]);

        let batch = AssignmentCommitter::build_batch(
            &run,
            &RotationRules::default(),
            &[staffing(10, &[1, 2]), staffing(11, &[1])],
            &workload,
            3,
        );

        let pairs: Vec<(i64, i64)> = batch
            .assignments
            .iter()
            .map(|a| (a.event_id, a.candidate_id))
            .collect();
        assert_eq!(pairs, vec![(10, 1), (10, 2), (11, 1)]);
        assert_eq!(batch.counter_increments, vec![(1, 2), (2, 1)]);
        assert_eq!(batch.events_count, 2);
        assert_eq!(batch.alerts_count, 3);
        assert_eq!(batch.run_id, run.run_id());
    }
}
