use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use shared_models::appointment::{
    Appointment, AppointmentDetails, AppointmentStatus, NewAppointment,
};

use crate::error::StoreError;

/// Appointment persistence. Implementations must reject a second
/// appointment for the same doctor and timestamp with
/// [`StoreError::Conflict`].
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn save(&self, appointment: NewAppointment) -> Result<Appointment, StoreError>;

    /// Overwrites doctor, time and status of an existing row.
    async fn update(&self, appointment: &Appointment) -> Result<Appointment, StoreError>;

    async fn update_status(&self, id: i64, status: AppointmentStatus) -> Result<(), StoreError>;

    async fn delete(&self, id: i64) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Appointment>, StoreError>;

    /// Appointments of a doctor with `start <= appointment_time <= end`.
    async fn find_by_doctor_and_time_range(
        &self,
        doctor_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Appointment>, StoreError>;

    async fn find_by_doctor_date_time(
        &self,
        doctor_id: i64,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<Option<Appointment>, StoreError>;

    async fn find_by_patient_id(&self, patient_id: i64) -> Result<Vec<AppointmentDetails>, StoreError>;

    /// Ordered by appointment time, earliest first.
    async fn find_by_patient_id_and_status(
        &self,
        patient_id: i64,
        status: AppointmentStatus,
    ) -> Result<Vec<AppointmentDetails>, StoreError>;

    /// Doctor-name substring match (case-insensitive) over one patient's
    /// appointments, optionally narrowed to a status.
    async fn filter_by_doctor_name_and_patient(
        &self,
        doctor_name: &str,
        patient_id: i64,
        status: Option<AppointmentStatus>,
    ) -> Result<Vec<AppointmentDetails>, StoreError>;

    /// A doctor's appointments in a time range, optionally narrowed to
    /// patients whose name contains `patient_name` (case-insensitive).
    async fn find_doctor_schedule(
        &self,
        doctor_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
        patient_name: Option<&str>,
    ) -> Result<Vec<AppointmentDetails>, StoreError>;
}
