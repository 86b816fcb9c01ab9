use std::sync::Arc;

use tracing::{debug, info, warn};

use shared_database::{Directory, Registry};
use shared_models::auth::AuthenticatedUser;
use shared_models::directory::{NewPatient, Patient};
use shared_utils::password::hash_password;
use shared_utils::AppState;

use crate::models::{CreatePatientRequest, PatientError};

pub struct PatientService {
    directory: Arc<dyn Directory>,
    registry: Arc<dyn Registry>,
}

impl PatientService {
    pub fn new(state: &AppState) -> Self {
        Self {
            directory: state.directory.clone(),
            registry: state.registry.clone(),
        }
    }

    /// Registers a patient unless the email or the phone number is already
    /// on file.
    pub async fn register(&self, request: CreatePatientRequest) -> Result<Patient, PatientError> {
        debug!("Registering patient {}", request.email);

        if self.directory
            .find_patient_by_email_or_phone(&request.email, &request.phone)
            .await?
            .is_some()
        {
            warn!("Patient {} / {} already registered", request.email, request.phone);
            return Err(PatientError::AlreadyRegistered);
        }

        let password_hash = hash_password(&request.password)
            .map_err(|e| PatientError::Internal(e.to_string()))?;

        let patient = self.registry
            .insert_patient(NewPatient {
                name: request.name,
                email: request.email,
                phone: request.phone,
                address: request.address,
                password_hash,
            })
            .await?;

        info!("Registered patient {}", patient.id);
        Ok(patient)
    }

    pub async fn me(&self, user: &AuthenticatedUser) -> Result<Patient, PatientError> {
        self.directory
            .find_patient_by_email(&user.subject)
            .await?
            .ok_or(PatientError::NotFound)
    }
}
