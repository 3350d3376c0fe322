use bota_domain::DomainError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Gig not found: {0}")]
    GigNotFound(Uuid),
    #[error("Musician not found: {0}")]
    MusicianNotFound(Uuid),
    #[error("Assignment not found: {0}")]
    AssignmentNotFound(Uuid),
    #[error("Pot movement not found: {0}")]
    MovementNotFound(Uuid),
    #[error("Advance payment not found: {0}")]
    AdvanceNotFound(Uuid),
    #[error("Forecast item not found: {0}")]
    ForecastItemNotFound(Uuid),
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
