use chrono::NaiveDate;
use thiserror::Error;

use shared_models::auth::AccessDenied;
use shared_models::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AvailabilityError {
    #[error("Start time must be before end time")]
    EmptyOrInvertedRange,

    #[error("Cannot set availability for a past date: {0}")]
    PastDate(NaiveDate),

    #[error("Invalid date range: {from} is after {to}")]
    InvalidRange { from: NaiveDate, to: NaiveDate },

    #[error("Slot length must be between 1 minute and 24 hours, got {0} minutes")]
    InvalidSlotLength(i64),

    #[error("Availability window not found")]
    NotFound,

    #[error("Unauthorized: {0}")]
    Unauthorized(#[from] AccessDenied),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<AvailabilityError> for AppError {
    fn from(err: AvailabilityError) -> Self {
        match err {
            AvailabilityError::EmptyOrInvertedRange
            | AvailabilityError::PastDate(_)
            | AvailabilityError::InvalidRange { .. }
            | AvailabilityError::InvalidSlotLength(_) => AppError::ValidationError(err.to_string()),
            AvailabilityError::NotFound => AppError::NotFound(err.to_string()),
            AvailabilityError::Unauthorized(denied) => AppError::from(denied),
            AvailabilityError::Database(msg) => AppError::Database(msg),
        }
    }
}
