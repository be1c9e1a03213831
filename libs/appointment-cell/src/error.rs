use chrono::NaiveDateTime;
use thiserror::Error;
use uuid::Uuid;

use doctor_cell::AvailabilityError;
use shared_models::auth::AccessDenied;
use shared_models::error::AppError;

use crate::models::AppointmentStatus;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Doctor {doctor_id} already has a booked appointment at {start}")]
    Conflict { doctor_id: Uuid, start: NaiveDateTime },

    #[error("Cannot change appointment status from {from} to {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Appointment is already {0}")]
    InvalidState(AppointmentStatus),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(#[from] AccessDenied),

    #[error(transparent)]
    Availability(#[from] AvailabilityError),

    #[error("No treatment recorded for this appointment")]
    TreatmentNotFound,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound | AppointmentError::TreatmentNotFound => {
                AppError::NotFound(err.to_string())
            }
            AppointmentError::Conflict { .. }
            | AppointmentError::InvalidTransition { .. }
            | AppointmentError::InvalidState(_) => AppError::Conflict(err.to_string()),
            AppointmentError::Validation(msg) => AppError::ValidationError(msg),
            AppointmentError::Unauthorized(denied) => AppError::from(denied),
            AppointmentError::Availability(inner) => AppError::from(inner),
            AppointmentError::Database(msg) => AppError::Database(msg),
        }
    }
}
