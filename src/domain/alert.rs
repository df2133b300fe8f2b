// ==========================================
// Altar Rota - Alert / StaffingOutcome
// ==========================================
// Alerts are advisory and never persisted. StaffingOutcome is the
// machine-checkable form of the tier fallback taken for one event.
// ==========================================

use crate::domain::location::Location;
use crate::domain::types::{AlertSeverity, EventId};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

// ==========================================
// DegradationReason - which tier fallback applied
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DegradationReason {
    /// Some primary-role candidates, fewer than the minimum
    InsufficientPrimary { required: u32, available: u32 },
    /// No primary-role candidate, secondary ones used
    NoPrimary,
    /// Neither primary- nor secondary-role candidates
    NoPrimaryOrSecondary,
}

// ==========================================
// StaffingOutcome - per-event result
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaffingOutcome {
    /// Headcount reached, role policy satisfied
    Fulfilled,
    /// Headcount reached through a tier fallback
    DegradedFulfilled { reason: DegradationReason },
    /// Headcount not reached
    Unfulfilled {
        degradation: Option<DegradationReason>,
        required: u32,
        assigned: u32,
    },
}

impl StaffingOutcome {
    pub fn is_fully_staffed(&self) -> bool {
        !matches!(self, StaffingOutcome::Unfulfilled { .. })
    }

    pub fn degradation(&self) -> Option<DegradationReason> {
        match self {
            StaffingOutcome::Fulfilled => None,
            StaffingOutcome::DegradedFulfilled { reason } => Some(*reason),
            StaffingOutcome::Unfulfilled { degradation, .. } => *degradation,
        }
    }
}

// ==========================================
// AlertKind
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    InsufficientPrimary,
    NoPrimary,
    NoPrimaryOrSecondary,
    Shortfall,
}

impl AlertKind {
    pub fn severity(self) -> AlertSeverity {
        match self {
            AlertKind::Shortfall => AlertSeverity::Critical,
            _ => AlertSeverity::Warning,
        }
    }

    /// i18n key of the message template
    pub fn message_key(self) -> &'static str {
        match self {
            AlertKind::InsufficientPrimary => "alert.insufficient_primary",
            AlertKind::NoPrimary => "alert.no_primary",
            AlertKind::NoPrimaryOrSecondary => "alert.no_primary_or_secondary",
            AlertKind::Shortfall => "alert.shortfall",
        }
    }
}

impl From<DegradationReason> for AlertKind {
    fn from(reason: DegradationReason) -> Self {
        match reason {
            DegradationReason::InsufficientPrimary { .. } => AlertKind::InsufficientPrimary,
            DegradationReason::NoPrimary => AlertKind::NoPrimary,
            DegradationReason::NoPrimaryOrSecondary => AlertKind::NoPrimaryOrSecondary,
        }
    }
}

// ==========================================
// Alert
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub event_id: EventId,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: Location,
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub message: String, // localised
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_helpers() {
        assert!(StaffingOutcome::Fulfilled.is_fully_staffed());
        assert_eq!(StaffingOutcome::Fulfilled.degradation(), None);

        let degraded = StaffingOutcome::DegradedFulfilled {
            reason: DegradationReason::NoPrimary,
        };
        assert!(degraded.is_fully_staffed());
        assert_eq!(degraded.degradation(), Some(DegradationReason::NoPrimary));

        let short = StaffingOutcome::Unfulfilled {
            degradation: None,
            required: 3,
            assigned: 1,
        };
        assert!(!short.is_fully_staffed());
    }

    #[test]
    fn test_alert_kind_severity() {
        assert_eq!(AlertKind::Shortfall.severity(), AlertSeverity::Critical);
        assert_eq!(AlertKind::NoPrimary.severity(), AlertSeverity::Warning);
        assert_eq!(
            AlertKind::from(DegradationReason::InsufficientPrimary { required: 2, available: 1 }),
            AlertKind::InsufficientPrimary
        );
    }
}
