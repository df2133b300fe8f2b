// ==========================================
// Altar Rota - data repository layer
// ==========================================
// No business decisions here beyond integrity checks.
// All queries are parameterised.
// ==========================================

pub mod assignment_repo;
pub mod availability_repo;
pub mod candidate_repo;
pub mod error;
pub mod location_repo;
pub mod period_repo;
mod row_mapping;

pub use assignment_repo::{AssignmentRepository, CommitBatch, PendingAssignment};
pub use availability_repo::AvailabilityOverrideRepository;
pub use candidate_repo::CandidateRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use location_repo::LocationRepository;
pub use period_repo::PeriodRepository;
