// ==========================================
// Altar Rota - rotation engine
// ==========================================
// Business rules only; every SQL statement lives in repository/.
// Per-event shortfalls are reported as alerts, never as errors.
// ==========================================

pub mod alerts;
pub mod availability;
pub mod committer;
pub mod eligibility;
pub mod error;
pub mod orchestrator;
pub mod repositories;
pub mod run_control;
pub mod selector;
pub mod workload;

pub use alerts::AlertAggregator;
pub use availability::AvailabilityResolver;
pub use committer::AssignmentCommitter;
pub use eligibility::EligibilityFilter;
pub use error::{EngineError, EngineResult};
pub use orchestrator::{GenerationOutcome, GenerationRequest, PreviewOutcome, RotationOrchestrator};
pub use repositories::RotationRepositories;
pub use run_control::{GenerationRun, PeriodGuard, PeriodLockRegistry, RunCancellation};
pub use selector::{EventStaffing, SelectedCandidate, Selection, SlotDemand, TieredSelector};
pub use workload::{DailyLedger, WorkloadBalancer};
