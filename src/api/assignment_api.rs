// ==========================================
// Altar Rota - assignment API
// ==========================================
// Manual edits after a run: reassignment, cancellation, roster queries.
// Edits never touch cumulative counters or the service history.
// ==========================================

use std::sync::Arc;

use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::api::rotation_api::config_error;
use crate::config::{RotationConfigReader, MAX_DAILY_LIMIT};
use crate::domain::assignment::{Assignment, AssignmentDetail};
use crate::domain::types::{AssignmentId, CandidateId, PeriodId};
use crate::repository::AssignmentRepository;

pub struct AssignmentApi<C>
where
    C: RotationConfigReader,
{
    assignment_repo: Arc<AssignmentRepository>,
    config: Arc<C>,
}

impl<C> AssignmentApi<C>
where
    C: RotationConfigReader,
{
    pub fn new(assignment_repo: Arc<AssignmentRepository>, config: Arc<C>) -> Self {
        Self {
            assignment_repo,
            config,
        }
    }

    /// Hand an active assignment to another candidate
    ///
    /// # Arguments
    /// - daily_limit: None = configured default
    ///
    /// # Errors
    /// - DailyLimitExceeded: the new candidate is already full that day
    /// - BusinessRuleViolation: already serving the event, or cancelled
    pub async fn reassign(
        &self,
        assignment_id: AssignmentId,
        new_candidate_id: CandidateId,
        daily_limit: Option<u32>,
    ) -> ApiResult<Assignment> {
        let limit = match daily_limit {
            Some(limit) => limit,
            None => self
                .config
                .get_default_daily_limit()
                .await
                .map_err(config_error)?
                .clamp(1, MAX_DAILY_LIMIT),
        };
        if limit == 0 || limit > MAX_DAILY_LIMIT {
            return Err(ApiError::InvalidInput(format!(
                "daily_limit must be between 1 and {}, got {}",
                MAX_DAILY_LIMIT, limit
            )));
        }

        let updated = self
            .assignment_repo
            .reassign(assignment_id, new_candidate_id, limit)?;
        info!(assignment_id, new_candidate_id, "assignment reassigned");
        Ok(updated)
    }

    /// Soft-cancel; frees the candidate's daily slot
    pub fn cancel(&self, assignment_id: AssignmentId) -> ApiResult<Assignment> {
        let cancelled = self.assignment_repo.cancel(assignment_id)?;
        info!(assignment_id, "assignment cancelled");
        Ok(cancelled)
    }

    pub fn list_period(&self, period_id: PeriodId, include_cancelled: bool) -> ApiResult<Vec<AssignmentDetail>> {
        Ok(self.assignment_repo.list_by_period(period_id, include_cancelled)?)
    }
}
