use std::sync::Arc;

use tracing::{debug, info, warn};

use appointment_cell::models::present;
use shared_database::{Directory, Registry, StoreError};
use shared_models::directory::{Doctor, NewDoctor};
use shared_utils::password::hash_password;
use shared_utils::AppState;

use crate::models::{
    parse_windows, CreateDoctorRequest, DayPeriod, DoctorError, DoctorFilterQuery, UpdateDoctorRequest,
};

pub struct DoctorService {
    directory: Arc<dyn Directory>,
    registry: Arc<dyn Registry>,
}

impl DoctorService {
    pub fn new(state: &AppState) -> Self {
        Self {
            directory: state.directory.clone(),
            registry: state.registry.clone(),
        }
    }

    fn hash(password: &str) -> Result<String, DoctorError> {
        hash_password(password).map_err(|e| DoctorError::Internal(e.to_string()))
    }

    fn classify_write(err: StoreError, email: &str) -> DoctorError {
        match err {
            StoreError::Conflict(_) => DoctorError::EmailTaken(email.to_string()),
            other => DoctorError::Internal(other.to_string()),
        }
    }

    pub async fn register(&self, request: CreateDoctorRequest) -> Result<Doctor, DoctorError> {
        debug!("Registering doctor {}", request.email);

        if self.directory.find_doctor_by_email(&request.email).await?.is_some() {
            warn!("Doctor email {} already registered", request.email);
            return Err(DoctorError::EmailTaken(request.email));
        }

        let available_times = parse_windows(&request.available_times)?;
        let record = NewDoctor {
            name: request.name,
            specialty: request.specialty,
            password_hash: Self::hash(&request.password)?,
            phone: request.phone,
            available_times,
            email: request.email,
        };

        let email = record.email.clone();
        let doctor = self.registry
            .insert_doctor(record)
            .await
            .map_err(|e| Self::classify_write(e, &email))?;

        info!("Registered doctor {} ({})", doctor.id, doctor.email);
        Ok(doctor)
    }

    pub async fn update(&self, doctor_id: i64, request: UpdateDoctorRequest) -> Result<Doctor, DoctorError> {
        let existing = self.directory
            .find_doctor_by_id(doctor_id)
            .await?
            .ok_or(DoctorError::NotFound)?;

        if request.email != existing.email {
            if let Some(other) = self.directory.find_doctor_by_email(&request.email).await? {
                if other.id != doctor_id {
                    return Err(DoctorError::EmailTaken(request.email));
                }
            }
        }

        let password_hash = match request.password.as_deref() {
            Some(password) => Self::hash(password)?,
            None => existing.password_hash,
        };

        let changed = Doctor {
            id: doctor_id,
            name: request.name,
            specialty: request.specialty,
            email: request.email,
            password_hash,
            phone: request.phone,
            available_times: parse_windows(&request.available_times)?,
        };

        let doctor = self.registry
            .update_doctor(&changed)
            .await
            .map_err(|e| Self::classify_write(e, &changed.email))?;

        info!("Updated doctor {}", doctor.id);
        Ok(doctor)
    }

    /// Removes the doctor together with every appointment booked with them.
    pub async fn delete(&self, doctor_id: i64) -> Result<(), DoctorError> {
        if self.directory.find_doctor_by_id(doctor_id).await?.is_none() {
            return Err(DoctorError::NotFound);
        }

        self.registry.delete_doctor(doctor_id).await?;

        info!("Deleted doctor {} and their appointments", doctor_id);
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<Doctor>, DoctorError> {
        Ok(self.registry.list_doctors().await?)
    }

    pub async fn filter(&self, query: &DoctorFilterQuery) -> Result<Vec<Doctor>, DoctorError> {
        let period = present(query.time.as_deref())
            .map(str::parse::<DayPeriod>)
            .transpose()?;

        let doctors = self.registry
            .search_doctors(present(query.name.as_deref()), present(query.specialty.as_deref()))
            .await?;

        Ok(match period {
            Some(period) => doctors.into_iter().filter(|d| period.matches(d)).collect(),
            None => doctors,
        })
    }
}
