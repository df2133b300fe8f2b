// ==========================================
// Altar Rota - candidate API
// ==========================================
// Registry, per-period availability overrides, counters and totals.
// ==========================================

use std::sync::Arc;

use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::assignment::ServiceTotal;
use crate::domain::candidate::{Availability, AvailabilityOverride, Candidate, NewCandidate};
use crate::domain::location::Location;
use crate::domain::types::{CandidateId, PeriodId};
use crate::repository::{
    AssignmentRepository, AvailabilityOverrideRepository, CandidateRepository, LocationRepository,
};

pub struct CandidateApi {
    candidate_repo: Arc<CandidateRepository>,
    location_repo: Arc<LocationRepository>,
    override_repo: Arc<AvailabilityOverrideRepository>,
    assignment_repo: Arc<AssignmentRepository>,
}

impl CandidateApi {
    pub fn new(
        candidate_repo: Arc<CandidateRepository>,
        location_repo: Arc<LocationRepository>,
        override_repo: Arc<AvailabilityOverrideRepository>,
        assignment_repo: Arc<AssignmentRepository>,
    ) -> Self {
        Self {
            candidate_repo,
            location_repo,
            override_repo,
            assignment_repo,
        }
    }

    // ==========================================
    // registry
    // ==========================================

    pub fn add_location(&self, name: &str) -> ApiResult<Location> {
        let location = Location::new(name).map_err(|e| ApiError::InvalidInput(e.to_string()))?;
        self.location_repo.create(&location)?;
        Ok(location)
    }

    pub fn list_locations(&self) -> ApiResult<Vec<Location>> {
        Ok(self.location_repo.list_all()?)
    }

    pub fn register(&self, payload: &NewCandidate) -> ApiResult<Candidate> {
        payload
            .validate()
            .map_err(|e| ApiError::InvalidInput(e.to_string()))?;
        let candidate = self.candidate_repo.create(payload)?;
        info!(candidate_id = candidate.candidate_id, "candidate registered");
        Ok(candidate)
    }

    pub fn list(&self) -> ApiResult<Vec<Candidate>> {
        Ok(self.candidate_repo.list_all()?)
    }

    pub fn get(&self, candidate_id: CandidateId) -> ApiResult<Candidate> {
        self.candidate_repo
            .find_by_id(candidate_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Candidate(id={})", candidate_id)))
    }

    // ==========================================
    // counters
    // ==========================================

    pub fn reset_count(&self, candidate_id: CandidateId) -> ApiResult<()> {
        self.candidate_repo.reset_assignment_count(candidate_id)?;
        info!(candidate_id, "assignment count reset");
        Ok(())
    }

    /// # Returns
    /// number of candidates reset
    pub fn reset_all_counts(&self) -> ApiResult<usize> {
        let reset = self.candidate_repo.reset_all_assignment_counts()?;
        info!(reset, "all assignment counts reset");
        Ok(reset)
    }

    /// Services per candidate within a period, from the service history
    pub fn service_totals(&self, period_id: PeriodId) -> ApiResult<Vec<ServiceTotal>> {
        Ok(self.assignment_repo.service_totals(period_id)?)
    }

    pub fn count_services(&self, period_id: PeriodId, candidate_id: CandidateId) -> ApiResult<u32> {
        Ok(self.assignment_repo.count_services(period_id, candidate_id)?)
    }

    // ==========================================
    // per-period availability
    // ==========================================

    /// Replace the candidate's availability for one period
    pub fn set_override(
        &self,
        candidate_id: CandidateId,
        period_id: PeriodId,
        availability: &Availability,
    ) -> ApiResult<AvailabilityOverride> {
        Ok(self.override_repo.upsert(candidate_id, period_id, availability)?)
    }

    /// Back to the default availability for that period
    pub fn clear_override(&self, candidate_id: CandidateId, period_id: PeriodId) -> ApiResult<()> {
        Ok(self.override_repo.delete(candidate_id, period_id)?)
    }
}
