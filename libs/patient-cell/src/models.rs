use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_database::StoreError;
use shared_models::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePatientRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatientError {
    #[error("Patient with email id or phone no already exist")]
    AlreadyRegistered,

    #[error("Patient not found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for PatientError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(_) => PatientError::AlreadyRegistered,
            other => PatientError::Internal(other.to_string()),
        }
    }
}

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        let message = err.to_string();
        match err {
            PatientError::AlreadyRegistered => AppError::Conflict(message),
            PatientError::NotFound => AppError::NotFound(message),
            PatientError::Internal(_) => AppError::Internal(message),
        }
    }
}
