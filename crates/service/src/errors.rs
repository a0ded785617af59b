use thiserror::Error;

use crate::storage::StoreError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("already exists: {0}")]
    AlreadyExists(String),
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("corrupt state: {0}")]
    CorruptState(String),
}

impl ServiceError {
    /// Failures that are not caused by the client request.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Persistence(_) | Self::CorruptState(_))
    }
}

impl From<models::errors::ModelError> for ServiceError {
    fn from(e: models::errors::ModelError) -> Self {
        match e {
            models::errors::ModelError::Validation(msg) => Self::Validation(msg),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(key) => Self::NotFound(key),
            StoreError::AlreadyExists(key) => Self::AlreadyExists(key),
            e @ StoreError::CorruptState { .. } => Self::CorruptState(e.to_string()),
            e => Self::Persistence(e.to_string()),
        }
    }
}
