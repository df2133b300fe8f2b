// ==========================================
// Altar Rota - Assignment / ServiceRecord domain model
// ==========================================

use crate::domain::location::Location;
use crate::domain::types::{AssignmentId, AssignmentStatus, CandidateId, EventId, PeriodId};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

// ==========================================
// Assignment - event <-> candidate link
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub assignment_id: AssignmentId,
    pub event_id: EventId,
    pub candidate_id: CandidateId,
    pub status: AssignmentStatus,
    pub run_id: Option<String>, // None for manual assignments
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Assignment {
    pub fn is_active(&self) -> bool {
        self.status == AssignmentStatus::Active
    }
}

// ==========================================
// AssignmentDetail - assignment joined with event/candidate
// ==========================================
// Read model for listing a period's roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentDetail {
    pub assignment_id: AssignmentId,
    pub event_id: EventId,
    pub period_id: PeriodId,
    pub candidate_id: CandidateId,
    pub candidate_name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: Location,
    pub status: AssignmentStatus,
    pub run_id: Option<String>,
}

// ==========================================
// CreatedAssignment - generation output row
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedAssignment {
    pub assignment_id: AssignmentId,
    pub candidate_id: CandidateId,
    pub candidate_name: String,
    pub event_id: EventId,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: Location,
}

// ==========================================
// ServiceRecord - append-only service history
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub record_id: i64,
    pub candidate_id: CandidateId,
    pub period_id: PeriodId,
    pub assignment_id: Option<AssignmentId>,
    pub run_id: Option<String>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: Location,
    pub recorded_at: NaiveDateTime,
}

/// Per-period service count for one candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceTotal {
    pub candidate_id: CandidateId,
    pub display_name: String,
    pub services: u32,
}

// ==========================================
// GenerationRunRecord - run audit row
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRunRecord {
    pub run_id: String,
    pub period_id: PeriodId,
    pub rules_json: String,
    pub events_count: u32,
    pub assignments_count: u32,
    pub alerts_count: u32,
    pub committed_at: NaiveDateTime,
}
