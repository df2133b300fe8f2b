// ==========================================
// Altar Rota - API layer
// ==========================================
// Thin façade over repositories and the engine for callers (CLI, tests).
// ==========================================

pub mod assignment_api;
pub mod candidate_api;
pub mod error;
pub mod rotation_api;

pub use assignment_api::AssignmentApi;
pub use candidate_api::CandidateApi;
pub use error::{ApiError, ApiResult};
pub use rotation_api::RotationApi;
