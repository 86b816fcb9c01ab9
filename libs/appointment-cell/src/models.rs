use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_database::StoreError;
use shared_models::appointment::AppointmentStatus;
use shared_models::error::AppError;

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppointmentError {
    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Appointment slot not available")]
    SlotUnavailable,

    #[error("Could not save appointment: {0}")]
    PersistenceError(String),

    #[error("Appointment not found")]
    NotFound,

    #[error("Appointment belongs to someone else")]
    Forbidden,

    #[error("Invalid condition '{0}', expected 'past' or 'upcoming'")]
    InvalidCondition(String),

    #[error("Invalid appointment time: {0}")]
    InvalidTime(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppointmentError {
    /// Classifies a failed write: a uniqueness conflict means someone else
    /// took the slot first.
    pub fn from_write(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(_) => AppointmentError::SlotUnavailable,
            StoreError::Rejected(msg) => AppointmentError::PersistenceError(msg),
            other => AppointmentError::Internal(other.to_string()),
        }
    }
}

impl From<StoreError> for AppointmentError {
    fn from(err: StoreError) -> Self {
        AppointmentError::Internal(err.to_string())
    }
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        let message = err.to_string();
        match err {
            AppointmentError::DoctorNotFound => AppError::BadRequest(message),
            AppointmentError::SlotUnavailable => AppError::Conflict(message),
            AppointmentError::PersistenceError(_) => AppError::Database(message),
            AppointmentError::NotFound => AppError::NotFound(message),
            AppointmentError::Forbidden => AppError::Forbidden(message),
            AppointmentError::InvalidCondition(_) => AppError::ValidationError(message),
            AppointmentError::InvalidTime(_) => AppError::BadRequest(message),
            AppointmentError::Internal(_) => AppError::Internal(message),
        }
    }
}

// ==============================================================================
// VERDICTS AND FILTERS
// ==============================================================================

/// Outcome of checking a requested slot against the doctor's free windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotVerdict {
    Accepted,
    DoctorNotFound,
    SlotUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentCondition {
    Past,
    Upcoming,
}

impl AppointmentCondition {
    /// `None`, an empty string and the literal `"null"` all mean "no filter".
    pub fn parse(raw: Option<&str>) -> Result<Option<Self>, AppointmentError> {
        let Some(value) = present(raw) else {
            return Ok(None);
        };

        match value.to_ascii_lowercase().as_str() {
            "past" => Ok(Some(AppointmentCondition::Past)),
            "upcoming" => Ok(Some(AppointmentCondition::Upcoming)),
            _ => Err(AppointmentError::InvalidCondition(value.to_string())),
        }
    }

    pub fn status(&self) -> AppointmentStatus {
        match self {
            AppointmentCondition::Past => AppointmentStatus::Completed,
            AppointmentCondition::Upcoming => AppointmentStatus::Upcoming,
        }
    }
}

/// Treats blank values and the literal `"null"` sent by some clients as absent.
pub fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty() && !value.eq_ignore_ascii_case("null"))
}

// ==============================================================================
// REQUESTS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: i64,
    pub appointment_time: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub doctor_id: i64,
    pub appointment_time: NaiveDateTime,
    /// Keeps the current status when omitted.
    #[serde(default)]
    pub status: Option<AppointmentStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeStatusRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotCheck {
    pub doctor_id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
}
