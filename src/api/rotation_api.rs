// ==========================================
// Altar Rota - rotation API
// ==========================================
// Entry point for callers: periods, generation runs, previews.
// Rule parameters default to the stored configuration.
// ==========================================

use std::sync::Arc;

use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::config::{load_headcount_defaults, load_rules, RotationConfigReader, RotationRules};
use crate::domain::period::{Event, EventDraft, NewPeriod, Period};
use crate::domain::types::{EventId, PeriodId};
use crate::engine::{
    GenerationOutcome, GenerationRequest, PeriodLockRegistry, PreviewOutcome, RotationOrchestrator,
    RotationRepositories, RunCancellation,
};

pub struct RotationApi<C>
where
    C: RotationConfigReader,
{
    repos: RotationRepositories,
    config: Arc<C>,
    orchestrator: RotationOrchestrator,
}

impl<C> RotationApi<C>
where
    C: RotationConfigReader,
{
    pub fn new(repos: RotationRepositories, config: Arc<C>, locks: Arc<PeriodLockRegistry>) -> Self {
        Self {
            orchestrator: RotationOrchestrator::new(repos.clone(), locks),
            repos,
            config,
        }
    }

    // ==========================================
    // periods
    // ==========================================

    /// Create a period and its events in one transaction
    ///
    /// Events without a headcount get the configured weekday/weekend default.
    pub async fn create_period(&self, payload: &NewPeriod) -> ApiResult<(Period, Vec<Event>)> {
        let defaults = load_headcount_defaults(self.config.as_ref())
            .await
            .map_err(config_error)?;
        let created = self.repos.period_repo.create(payload, &defaults)?;
        info!(period_id = created.0.period_id, events = created.1.len(), "period created");
        Ok(created)
    }

    pub async fn add_event(&self, period_id: PeriodId, draft: &EventDraft) -> ApiResult<Event> {
        let defaults = load_headcount_defaults(self.config.as_ref())
            .await
            .map_err(config_error)?;
        Ok(self.repos.period_repo.add_event(period_id, draft, &defaults)?)
    }

    pub fn list_periods(&self) -> ApiResult<Vec<Period>> {
        Ok(self.repos.period_repo.list_all()?)
    }

    pub fn list_events(&self, period_id: PeriodId) -> ApiResult<Vec<Event>> {
        Ok(self.repos.period_repo.list_events(period_id)?)
    }

    // ==========================================
    // generation
    // ==========================================

    /// Generate and commit assignments for a period
    ///
    /// # Arguments
    /// - period_id: period to staff
    /// - event_ids: restrict the run to these events (None = all)
    /// - rules: explicit rule parameters (None = stored defaults)
    pub async fn generate(
        &self,
        period_id: PeriodId,
        event_ids: Option<Vec<EventId>>,
        rules: Option<RotationRules>,
    ) -> ApiResult<GenerationOutcome> {
        self.generate_with_cancellation(period_id, event_ids, rules, &RunCancellation::new())
            .await
    }

    /// Same as `generate`, abortable through `cancel` until commit starts
    pub async fn generate_with_cancellation(
        &self,
        period_id: PeriodId,
        event_ids: Option<Vec<EventId>>,
        rules: Option<RotationRules>,
        cancel: &RunCancellation,
    ) -> ApiResult<GenerationOutcome> {
        let request = self.request(period_id, event_ids, rules).await?;
        Ok(self.orchestrator.generate(&request, cancel).await?)
    }

    /// Dry run: slates and alerts without any write
    pub async fn preview(
        &self,
        period_id: PeriodId,
        event_ids: Option<Vec<EventId>>,
        rules: Option<RotationRules>,
    ) -> ApiResult<PreviewOutcome> {
        let request = self.request(period_id, event_ids, rules).await?;
        Ok(self.orchestrator.preview(&request)?)
    }

    async fn request(
        &self,
        period_id: PeriodId,
        event_ids: Option<Vec<EventId>>,
        rules: Option<RotationRules>,
    ) -> ApiResult<GenerationRequest> {
        let rules = match rules {
            Some(rules) => rules,
            None => load_rules(self.config.as_ref()).await.map_err(config_error)?,
        };
        Ok(GenerationRequest {
            period_id,
            event_ids,
            rules,
        })
    }
}

pub(crate) fn config_error(err: Box<dyn std::error::Error + Send + Sync>) -> ApiError {
    ApiError::InternalError(format!("configuration unavailable: {}", err))
}
