// ==========================================
// Altar Rota - engine error type
// ==========================================
// A per-event shortfall is never an error; it is an Alert.
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("invalid rule parameters: {0}")]
    Validation(String),

    #[error("infeasible run: {0}")]
    Infeasible(String),

    #[error("persistence failed, run rolled back: {0}")]
    Persistence(#[source] RepositoryError),

    #[error("run cancelled before commit")]
    Cancelled,

    #[error("illegal run state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
}

impl EngineError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        EngineError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }
}

impl From<RepositoryError> for EngineError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => EngineError::NotFound { entity, id },
            other => EngineError::Persistence(other),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
