use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid spend amount: {0} (must be greater than zero)")]
    InvalidAmount(Decimal),
    #[error("Brand not found: {0}")]
    BrandNotFound(Uuid),
    #[error("Campaign not found: {0}")]
    CampaignNotFound(Uuid),
    #[error("Dayparting schedule not found for campaign {0}")]
    ScheduleNotFound(Uuid),
    #[error("Concurrency conflict: {0}")]
    ConcurrencyConflict(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Conflicts are the only errors worth retrying: the caller re-reads and tries again.
    pub fn is_conflict(&self) -> bool {
        matches!(self, CoreError::ConcurrencyConflict(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CoreError::BrandNotFound(_)
                | CoreError::CampaignNotFound(_)
                | CoreError::ScheduleNotFound(_)
        )
    }
}
