use async_trait::async_trait;

use shared_models::directory::{Admin, Doctor, NewDoctor, NewPatient, Patient};

use crate::error::StoreError;

/// Identity lookups for doctors, patients and admins.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn find_doctor_by_id(&self, id: i64) -> Result<Option<Doctor>, StoreError>;

    async fn find_doctor_by_email(&self, email: &str) -> Result<Option<Doctor>, StoreError>;

    async fn find_patient_by_email(&self, email: &str) -> Result<Option<Patient>, StoreError>;

    /// First patient whose email or phone matches either value.
    async fn find_patient_by_email_or_phone(
        &self,
        email: &str,
        phone: &str,
    ) -> Result<Option<Patient>, StoreError>;

    async fn find_admin_by_username(&self, username: &str) -> Result<Option<Admin>, StoreError>;
}

/// Writes and listings over directory records, used by the management
/// surfaces rather than by the scheduling core.
#[async_trait]
pub trait Registry: Send + Sync {
    async fn insert_doctor(&self, doctor: NewDoctor) -> Result<Doctor, StoreError>;

    async fn update_doctor(&self, doctor: &Doctor) -> Result<Doctor, StoreError>;

    /// Removes the doctor and every appointment booked with them as one
    /// unit: either both go or neither does.
    async fn delete_doctor(&self, id: i64) -> Result<(), StoreError>;

    async fn list_doctors(&self) -> Result<Vec<Doctor>, StoreError>;

    /// Doctors whose name contains `name` and whose specialty equals
    /// `specialty`, both case-insensitively. `None` skips that criterion.
    async fn search_doctors(
        &self,
        name: Option<&str>,
        specialty: Option<&str>,
    ) -> Result<Vec<Doctor>, StoreError>;

    async fn insert_patient(&self, patient: NewPatient) -> Result<Patient, StoreError>;
}
