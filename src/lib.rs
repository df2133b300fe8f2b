// ==========================================
// Altar Rota - core library
// ==========================================
// Rotation engine for altar-server scheduling: fair, role-aware
// assignment of candidates to the events of a period.
// Stack: Rust + SQLite (rusqlite)
// ==========================================

// localisation (alert messages)
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// modules
// ==========================================

// domain - entities and value types
pub mod domain;

// repository - data access
pub mod repository;

// engine - business rules
pub mod engine;

// config - rule parameters
pub mod config;

// database bootstrap (PRAGMAs, schema)
pub mod db;

pub mod logging;

pub mod i18n;

// api - caller façade
pub mod api;

// app - shared state
pub mod app;

// ==========================================
// re-exports
// ==========================================

pub use domain::types::{AlertSeverity, AssignmentStatus, RunState, Tier, Weekday};

pub use domain::{
    Alert, AlertKind, Assignment, Availability, Candidate, CreatedAssignment, DegradationReason, Event,
    EventDraft, Location, NewCandidate, NewPeriod, Period, StaffingOutcome,
};

pub use engine::{
    EngineError, GenerationOutcome, GenerationRequest, PreviewOutcome, RotationOrchestrator, RunCancellation,
};

pub use api::{ApiError, AssignmentApi, CandidateApi, RotationApi};

pub use config::RotationRules;

// ==========================================
// constants
// ==========================================

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const APP_NAME: &str = "Altar Rota";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
