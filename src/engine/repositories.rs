// ==========================================
// Altar Rota - engine repository bundle
// ==========================================
// Everything the orchestrator reads or writes, in one argument.
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::repository::{
    AssignmentRepository, AvailabilityOverrideRepository, CandidateRepository, LocationRepository,
    PeriodRepository,
};

/// Repositories used by a generation run
///
/// All of them share one connection when built with `from_connection`,
/// so the commit transaction sees what planning read.
#[derive(Clone)]
pub struct RotationRepositories {
    pub location_repo: Arc<LocationRepository>,
    pub candidate_repo: Arc<CandidateRepository>,
    pub period_repo: Arc<PeriodRepository>,
    pub override_repo: Arc<AvailabilityOverrideRepository>,
    pub assignment_repo: Arc<AssignmentRepository>,
}

impl RotationRepositories {
    pub fn new(
        location_repo: Arc<LocationRepository>,
        candidate_repo: Arc<CandidateRepository>,
        period_repo: Arc<PeriodRepository>,
        override_repo: Arc<AvailabilityOverrideRepository>,
        assignment_repo: Arc<AssignmentRepository>,
    ) -> Self {
        Self {
            location_repo,
            candidate_repo,
            period_repo,
            override_repo,
            assignment_repo,
        }
    }

    /// Build every repository over one shared connection
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self::new(
            Arc::new(LocationRepository::from_connection(conn.clone())),
            Arc::new(CandidateRepository::from_connection(conn.clone())),
            Arc::new(PeriodRepository::from_connection(conn.clone())),
            Arc::new(AvailabilityOverrideRepository::from_connection(conn.clone())),
            Arc::new(AssignmentRepository::from_connection(conn)),
        )
    }
}
