// ==========================================
// Altar Rota - domain layer
// ==========================================
// Entities and value types only.
// No data access and no engine logic here.
// ==========================================

pub mod alert;
pub mod assignment;
pub mod candidate;
pub mod location;
pub mod period;
pub mod types;

pub use alert::{Alert, AlertKind, DegradationReason, StaffingOutcome};
pub use assignment::{
    Assignment, AssignmentDetail, CreatedAssignment, GenerationRunRecord, ServiceRecord,
    ServiceTotal,
};
pub use candidate::{Availability, AvailabilityOverride, Candidate, NewCandidate};
pub use location::Location;
pub use period::{Event, EventDraft, HeadcountDefaults, NewPeriod, Period};
pub use types::{
    AlertSeverity, AssignmentId, AssignmentStatus, CandidateId, DomainError, EventId, PeriodId,
    RunState, Tier, Weekday,
};
