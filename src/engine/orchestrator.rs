// ==========================================
// Altar Rota - generation orchestrator
// ==========================================
// Planning -> Staffing(n) -> Committing -> Completed | Failed
// Events are staffed strictly in chronological order; each one sees
// the workload and daily counts left by the previous ones.
// ==========================================

use crate::config::RotationRules;
use crate::domain::alert::{Alert, StaffingOutcome};
use crate::domain::assignment::CreatedAssignment;
use crate::domain::candidate::Candidate;
use crate::domain::period::Event;
use crate::domain::types::{CandidateId, EventId, PeriodId, RunState, Tier};
use crate::engine::alerts::AlertAggregator;
use crate::engine::availability::AvailabilityResolver;
use crate::engine::committer::AssignmentCommitter;
use crate::engine::eligibility::EligibilityFilter;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::repositories::RotationRepositories;
use crate::engine::run_control::{GenerationRun, PeriodLockRegistry, RunCancellation};
use crate::engine::selector::{EventStaffing, SlotDemand, TieredSelector};
use crate::engine::workload::{DailyLedger, WorkloadBalancer};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument};

// ==========================================
// Request / result types
// ==========================================

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub period_id: PeriodId,
    pub event_ids: Option<Vec<EventId>>, // None = every event of the period
    pub rules: RotationRules,
}

impl GenerationRequest {
    pub fn for_period(period_id: PeriodId, rules: RotationRules) -> Self {
        Self {
            period_id,
            event_ids: None,
            rules,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub run_id: String,
    pub period_id: PeriodId,
    pub assignments: Vec<CreatedAssignment>,
    pub assignments_count: usize,
    pub alerts: Vec<Alert>,
    pub staffing: Vec<EventStaffing>,
}

/// Same shape as a run, nothing persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewOutcome {
    pub period_id: PeriodId,
    pub alerts: Vec<Alert>,
    pub staffing: Vec<EventStaffing>,
}

/// Snapshot taken at Planning; the run never re-reads durable state
struct RunPlan {
    candidates: Vec<Candidate>,
    events: Vec<Event>,
    resolver: AvailabilityResolver,
    ledger: DailyLedger,
    workload: WorkloadBalancer,
    serving: HashMap<EventId, HashSet<CandidateId>>,
}

// ==========================================
// RotationOrchestrator
// ==========================================

pub struct RotationOrchestrator {
    repos: RotationRepositories,
    locks: Arc<PeriodLockRegistry>,
    committer: AssignmentCommitter,
}

impl RotationOrchestrator {
    pub fn new(repos: RotationRepositories, locks: Arc<PeriodLockRegistry>) -> Self {
        Self {
            committer: AssignmentCommitter::new(repos.assignment_repo.clone()),
            repos,
            locks,
        }
    }

    /// Run a full generation and commit it atomically
    ///
    /// Same-period runs wait for each other; the lock is held until
    /// the commit finished or the run failed.
    ///
    /// # Errors
    /// - Validation: rules out of bounds
    /// - NotFound: unknown period or event id
    /// - Infeasible: no candidate registered at all
    /// - Cancelled: cancellation observed before committing
    /// - Persistence: commit failed, nothing written
    #[instrument(skip(self, request, cancel), fields(period_id = request.period_id))]
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        cancel: &RunCancellation,
    ) -> EngineResult<GenerationOutcome> {
        request.rules.validate()?;

        let _guard = self.locks.acquire(request.period_id).await;
        let mut run = GenerationRun::new(request.period_id);
        info!(
            run_id = run.run_id(),
            minimum_primary = request.rules.minimum_primary,
            daily_limit = request.rules.daily_limit,
            prioritize_roles = request.rules.prioritize_roles,
            "generation run started"
        );

        match self.execute(&mut run, request, cancel) {
            Ok(outcome) => {
                info!(
                    run_id = %outcome.run_id,
                    assignments = outcome.assignments_count,
                    alerts = outcome.alerts.len(),
                    "generation run completed"
                );
                Ok(outcome)
            }
            Err(e) => {
                run.fail(&e);
                Err(e)
            }
        }
    }

    /// Planning + Staffing only; no lock, no writes
    #[instrument(skip(self, request), fields(period_id = request.period_id))]
    pub fn preview(&self, request: &GenerationRequest) -> EngineResult<PreviewOutcome> {
        request.rules.validate()?;

        let mut run = GenerationRun::new(request.period_id);
        let mut plan = self.plan(request)?;
        let (staffing, alerts) = self.staff(&mut run, &request.rules, &mut plan, &RunCancellation::new())?;

        debug!(events = staffing.len(), alerts = alerts.len(), "preview finished");
        Ok(PreviewOutcome {
            period_id: request.period_id,
            alerts: alerts.into_alerts(),
            staffing,
        })
    }

    fn execute(
        &self,
        run: &mut GenerationRun,
        request: &GenerationRequest,
        cancel: &RunCancellation,
    ) -> EngineResult<GenerationOutcome> {
        // ==========================================
        // Planning
        // ==========================================
        let mut plan = self.plan(request)?;

        // ==========================================
        // Staffing
        // ==========================================
        let (staffing, alerts) = self.staff(run, &request.rules, &mut plan, cancel)?;

        // ==========================================
        // Committing
        // ==========================================
        cancel.check()?;
        run.transition(RunState::Committing)?;

        let batch = AssignmentCommitter::build_batch(run, &request.rules, &staffing, &plan.workload, alerts.len());
        let assignments = self.committer.commit(&batch, &staffing)?;

        run.transition(RunState::Completed)?;

        Ok(GenerationOutcome {
            run_id: run.run_id().to_string(),
            period_id: run.period_id(),
            assignments_count: assignments.len(),
            assignments,
            alerts: alerts.into_alerts(),
            staffing,
        })
    }

    fn plan(&self, request: &GenerationRequest) -> EngineResult<RunPlan> {
        let period_id = request.period_id;
        self.repos
            .period_repo
            .find_by_id(period_id)?
            .ok_or_else(|| EngineError::not_found("Period", period_id))?;

        let candidates = self.repos.candidate_repo.list_all()?;
        if candidates.is_empty() {
            return Err(EngineError::Infeasible("no candidates registered".to_string()));
        }

        let mut events = self.repos.period_repo.list_events(period_id)?;
        if let Some(wanted) = &request.event_ids {
            let known: HashSet<EventId> = events.iter().map(|e| e.event_id).collect();
            if let Some(missing) = wanted.iter().find(|id| !known.contains(id)) {
                return Err(EngineError::not_found("Event", missing));
            }
            let wanted: HashSet<EventId> = wanted.iter().copied().collect();
            events.retain(|e| wanted.contains(&e.event_id));
        }
        events.sort_by(|a, b| a.chronological_key().cmp(&b.chronological_key()));

        if let Some(event) = events.iter().find(|e| e.required_headcount == 0) {
            return Err(EngineError::Validation(format!(
                "event {} has a required headcount of 0",
                event.event_id
            )));
        }

        let overrides = self.repos.override_repo.list_by_period(period_id)?;
        let resolver = AvailabilityResolver::new(&candidates, overrides);

        // persisted active assignments over the run's date span, any period
        let ledger = match (events.first(), events.last()) {
            (Some(first), Some(last)) => {
                DailyLedger::new(self.repos.assignment_repo.active_daily_counts(first.date, last.date)?)
            }
            _ => DailyLedger::default(),
        };

        let mut serving = HashMap::new();
        for event in &events {
            let active: HashSet<CandidateId> = self
                .repos
                .assignment_repo
                .list_by_event(event.event_id)?
                .into_iter()
                .filter(|a| a.is_active())
                .map(|a| a.candidate_id)
                .collect();
            if !active.is_empty() {
                serving.insert(event.event_id, active);
            }
        }

        info!(
            candidates = candidates.len(),
            events = events.len(),
            already_staffed = serving.len(),
            "planning finished"
        );

        Ok(RunPlan {
            workload: WorkloadBalancer::from_candidates(&candidates),
            candidates,
            events,
            resolver,
            ledger,
            serving,
        })
    }

    fn staff(
        &self,
        run: &mut GenerationRun,
        rules: &RotationRules,
        plan: &mut RunPlan,
        cancel: &RunCancellation,
    ) -> EngineResult<(Vec<EventStaffing>, AlertAggregator)> {
        let filter = EligibilityFilter::new(rules.daily_limit);
        let selector = TieredSelector::from_rules(rules);
        let mut aggregator = AlertAggregator::new();
        let mut staffing = Vec::with_capacity(plan.events.len());
        let nobody = HashSet::new();

        for (index, event) in plan.events.iter().enumerate() {
            cancel.check()?;
            run.transition(RunState::Staffing { event_index: index })?;

            // re-runs only top up what is still missing
            let serving = plan.serving.get(&event.event_id).unwrap_or(&nobody);
            let demand = SlotDemand {
                headcount: event.required_headcount,
                serving: serving.len() as u32,
                serving_primary: plan
                    .candidates
                    .iter()
                    .filter(|c| serving.contains(&c.candidate_id) && c.tier() == Tier::Primary)
                    .count() as u32,
            };
            if demand.open_slots() == 0 {
                debug!(event_id = event.event_id, "already fully staffed");
                staffing.push(EventStaffing {
                    event: event.clone(),
                    slate: Vec::new(),
                    outcome: StaffingOutcome::Fulfilled,
                });
                continue;
            }

            let eligible = filter.filter(event, &plan.candidates, &plan.resolver, &plan.ledger, serving)?;
            let selection = selector.select(&eligible, demand, &plan.workload);

            for candidate_id in selection.candidate_ids() {
                plan.ledger.record(candidate_id, event.date);
            }
            plan.workload.record_selection(selection.candidate_ids());
            aggregator.record(event, &selection.outcome);

            debug!(
                event_id = event.event_id,
                date = %event.date,
                location = %event.location,
                eligible = eligible.len(),
                serving = demand.serving,
                assigned = selection.slate.len(),
                open_slots = demand.open_slots(),
                "event staffed"
            );

            staffing.push(EventStaffing {
                event: event.clone(),
                slate: selection.slate,
                outcome: selection.outcome,
            });
        }

        Ok((staffing, aggregator))
    }
}
