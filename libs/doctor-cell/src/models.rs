use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_database::StoreError;
use shared_models::directory::{Doctor, TimeWindow, TimeWindowError};
use shared_models::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDoctorRequest {
    pub name: String,
    pub specialty: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub available_times: Vec<String>,
}

/// Full replacement of a doctor's profile. The password is only changed
/// when one is supplied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateDoctorRequest {
    pub name: String,
    pub specialty: String,
    pub email: String,
    pub phone: String,
    pub available_times: Vec<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DoctorFilterQuery {
    pub name: Option<String>,
    pub specialty: Option<String>,
    pub time: Option<String>,
}

/// Half of the day a doctor offers at least one window in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPeriod {
    Am,
    Pm,
}

impl DayPeriod {
    /// AM when a window starts before noon, PM when one starts at or after it.
    pub fn matches(&self, doctor: &Doctor) -> bool {
        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN);
        doctor.available_times.iter().any(|window| match self {
            DayPeriod::Am => window.start() < noon,
            DayPeriod::Pm => window.start() >= noon,
        })
    }
}

impl FromStr for DayPeriod {
    type Err = DoctorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "AM" => Ok(DayPeriod::Am),
            "PM" => Ok(DayPeriod::Pm),
            other => Err(DoctorError::InvalidPeriod(other.to_string())),
        }
    }
}

pub fn parse_windows(raw: &[String]) -> Result<Vec<TimeWindow>, DoctorError> {
    raw.iter()
        .map(|w| w.parse().map_err(|e: TimeWindowError| DoctorError::InvalidWindow(e.to_string())))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("A doctor with email {0} already exists")]
    EmailTaken(String),

    #[error("{0}")]
    InvalidWindow(String),

    #[error("Invalid time period '{0}', expected AM or PM")]
    InvalidPeriod(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for DoctorError {
    fn from(err: StoreError) -> Self {
        DoctorError::Internal(err.to_string())
    }
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        let message = err.to_string();
        match err {
            DoctorError::NotFound => AppError::NotFound(message),
            DoctorError::EmailTaken(_) => AppError::Conflict(message),
            DoctorError::InvalidWindow(_) | DoctorError::InvalidPeriod(_) => AppError::ValidationError(message),
            DoctorError::Internal(_) => AppError::Internal(message),
        }
    }
}
