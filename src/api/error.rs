// ==========================================
// Altar Rota - API error type
// ==========================================
// Converts repository / engine failures into caller-facing messages.
// Every message names the offending entity or rule.
// ==========================================

use crate::domain::types::CandidateId;
use crate::engine::error::EngineError;
use crate::repository::error::RepositoryError;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // input / business rules
    // ==========================================
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("business rule violated: {0}")]
    BusinessRuleViolation(String),

    #[error("daily limit reached: candidate {candidate_id} already serves {limit} time(s) on {date}")]
    DailyLimitExceeded {
        candidate_id: CandidateId,
        date: NaiveDate,
        limit: u32,
    },

    #[error("generation impossible: {0}")]
    Infeasible(String),

    #[error("generation cancelled, nothing was written")]
    Cancelled,

    // ==========================================
    // data access
    // ==========================================
    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("database transaction failed: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // generic
    // ==========================================
    #[error("internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => ApiError::NotFound(format!("{}(id={})", entity, id)),
            RepositoryError::LockError(msg) => ApiError::DatabaseError(format!("connection lock: {}", msg)),
            RepositoryError::DatabaseTransactionError(msg) => ApiError::DatabaseTransactionError(msg),
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("duplicate record: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("unknown reference: {}", msg))
            }
            RepositoryError::BusinessRuleViolation(msg) => ApiError::BusinessRuleViolation(msg),
            RepositoryError::DailyLimitExceeded { candidate_id, date, limit } => {
                ApiError::DailyLimitExceeded { candidate_id, date, limit }
            }
            RepositoryError::ValidationError(msg) => ApiError::InvalidInput(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("field {}: {}", field, message))
            }
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::NotFound { entity, id } => ApiError::NotFound(format!("{}(id={})", entity, id)),
            EngineError::Validation(msg) => ApiError::InvalidInput(msg),
            EngineError::Infeasible(msg) => ApiError::Infeasible(msg),
            EngineError::Persistence(inner) => match inner {
                RepositoryError::DatabaseTransactionError(msg) => ApiError::DatabaseTransactionError(msg),
                other => ApiError::DatabaseTransactionError(other.to_string()),
            },
            EngineError::Cancelled => ApiError::Cancelled,
            EngineError::InvalidTransition { from, to } => {
                ApiError::InternalError(format!("run state {} -> {}", from, to))
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
