// ==========================================
// Altar Rota - Alert Aggregator
// ==========================================
// Turns per-event StaffingOutcomes into localised, advisory alerts.
// Never aborts a run.
// ==========================================

use crate::domain::alert::{Alert, AlertKind, DegradationReason, StaffingOutcome};
use crate::domain::period::Event;
use crate::domain::types::AlertSeverity;
use crate::i18n;
use tracing::warn;

#[derive(Debug, Clone, Default)]
pub struct AlertAggregator {
    alerts: Vec<Alert>,
}

impl AlertAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the alerts implied by one event's outcome
    ///
    /// - tier fallback -> one Warning (kind from the DegradationReason)
    /// - headcount not reached -> one Critical Shortfall
    ///
    /// # Returns
    /// number of alerts added
    pub fn record(&mut self, event: &Event, outcome: &StaffingOutcome) -> usize {
        let before = self.alerts.len();

        if let Some(reason) = outcome.degradation() {
            let (required, available) = match reason {
                DegradationReason::InsufficientPrimary { required, available } => (required, available),
                _ => (0, 0),
            };
            self.push(event, AlertKind::from(reason), required, available);
        }

        if let StaffingOutcome::Unfulfilled { required, assigned, .. } = *outcome {
            self.push(event, AlertKind::Shortfall, required, assigned);
        }

        self.alerts.len() - before
    }

    fn push(&mut self, event: &Event, kind: AlertKind, required: u32, available: u32) {
        let date = event.date.to_string();
        let time = event.time.format("%H:%M").to_string();
        let required = required.to_string();
        let available = available.to_string();
        let message = i18n::t_with_args(
            kind.message_key(),
            &[
                ("location", event.location.as_str()),
                ("date", &date),
                ("time", &time),
                ("required", &required),
                ("available", &available),
            ],
        );

        warn!(event_id = event.event_id, kind = ?kind, "{}", message);

        self.alerts.push(Alert {
            event_id: event.event_id,
            date: event.date,
            time: event.time,
            location: event.location.clone(),
            kind,
            severity: kind.severity(),
            message,
        });
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    pub fn critical_count(&self) -> usize {
        self.alerts
            .iter()
            .filter(|a| a.severity == AlertSeverity::Critical)
            .count()
    }

    pub fn into_alerts(self) -> Vec<Alert> {
        self.alerts
    }
}
