use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use shared_models::appointment::{
    Appointment, AppointmentDetails, AppointmentStatus, NewAppointment,
};

use crate::appointments::AppointmentStore;
use crate::error::StoreError;
use crate::supabase::{contains_filter, return_representation, SupabaseClient};

/// Embeds the doctor and patient columns the details projection needs.
const DETAILS_SELECT: &str = "select=id,doctor_id,patient_id,appointment_time,status,\
doctor:doctors!inner(name),patient:patients!inner(name,email,phone,address)";

#[derive(Debug, Deserialize)]
struct DoctorSummary {
    name: String,
}

#[derive(Debug, Deserialize)]
struct PatientSummary {
    name: String,
    email: String,
    phone: String,
    address: String,
}

#[derive(Debug, Deserialize)]
struct AppointmentRow {
    id: i64,
    doctor_id: i64,
    patient_id: i64,
    appointment_time: NaiveDateTime,
    status: AppointmentStatus,
    doctor: DoctorSummary,
    patient: PatientSummary,
}

impl From<AppointmentRow> for AppointmentDetails {
    fn from(row: AppointmentRow) -> Self {
        AppointmentDetails {
            id: row.id,
            doctor_id: row.doctor_id,
            doctor_name: row.doctor.name,
            patient_id: row.patient_id,
            patient_name: row.patient.name,
            patient_email: row.patient.email,
            patient_phone: row.patient.phone,
            patient_address: row.patient.address,
            appointment_time: row.appointment_time,
            status: row.status,
        }
    }
}

fn timestamp(value: NaiveDateTime) -> String {
    value.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// Appointment store over the `appointments` table. The table carries a
/// unique index on `(doctor_id, appointment_time)`.
pub struct SupabaseAppointmentStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseAppointmentStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    async fn details(&self, filters: &[String]) -> Result<Vec<AppointmentDetails>, StoreError> {
        let path = format!(
            "/rest/v1/appointments?{}&{}&order=appointment_time.asc",
            DETAILS_SELECT,
            filters.join("&")
        );
        let rows: Vec<AppointmentRow> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(rows.into_iter().map(AppointmentDetails::from).collect())
    }
}

#[async_trait]
impl AppointmentStore for SupabaseAppointmentStore {
    async fn save(&self, appointment: NewAppointment) -> Result<Appointment, StoreError> {
        let body = json!({
            "doctor_id": appointment.doctor_id(),
            "patient_id": appointment.patient_id(),
            "appointment_time": timestamp(appointment.appointment_time()),
            "status": appointment.status().code(),
        });

        let rows: Vec<Appointment> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/appointments",
            Some(body),
            Some(return_representation()),
        ).await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("appointment insert returned no rows".to_string()))
    }

    async fn update(&self, appointment: &Appointment) -> Result<Appointment, StoreError> {
        let body = json!({
            "doctor_id": appointment.doctor_id,
            "appointment_time": timestamp(appointment.appointment_time),
            "status": appointment.status.code(),
        });

        let rows: Vec<Appointment> = self.supabase.request_with_headers(
            Method::PATCH,
            &format!("/rest/v1/appointments?id=eq.{}", appointment.id),
            Some(body),
            Some(return_representation()),
        ).await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Rejected(format!("appointment {} no longer exists", appointment.id)))
    }

    async fn update_status(&self, id: i64, status: AppointmentStatus) -> Result<(), StoreError> {
        self.supabase.execute(
            Method::PATCH,
            &format!("/rest/v1/appointments?id=eq.{}", id),
            Some(json!({ "status": status.code() })),
        ).await
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.supabase.execute(Method::DELETE, &format!("/rest/v1/appointments?id=eq.{}", id), None).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Appointment>, StoreError> {
        let rows: Vec<Appointment> = self.supabase.request(
            Method::GET,
            &format!("/rest/v1/appointments?id=eq.{}&limit=1", id),
            None,
        ).await?;
        Ok(rows.into_iter().next())
    }

    async fn find_by_doctor_and_time_range(
        &self,
        doctor_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Appointment>, StoreError> {
        debug!("Fetching appointments for doctor {} between {} and {}", doctor_id, start, end);

        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&appointment_time=gte.{}&appointment_time=lte.{}&order=appointment_time.asc",
            doctor_id,
            timestamp(start),
            timestamp(end)
        );
        self.supabase.request(Method::GET, &path, None).await
    }

    async fn find_by_doctor_date_time(
        &self,
        doctor_id: i64,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<Option<Appointment>, StoreError> {
        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&appointment_time=eq.{}&limit=1",
            doctor_id,
            timestamp(date.and_time(time))
        );
        let rows: Vec<Appointment> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(rows.into_iter().next())
    }

    async fn find_by_patient_id(&self, patient_id: i64) -> Result<Vec<AppointmentDetails>, StoreError> {
        self.details(&[format!("patient_id=eq.{}", patient_id)]).await
    }

    async fn find_by_patient_id_and_status(
        &self,
        patient_id: i64,
        status: AppointmentStatus,
    ) -> Result<Vec<AppointmentDetails>, StoreError> {
        self.details(&[
            format!("patient_id=eq.{}", patient_id),
            format!("status=eq.{}", status.code()),
        ]).await
    }

    async fn filter_by_doctor_name_and_patient(
        &self,
        doctor_name: &str,
        patient_id: i64,
        status: Option<AppointmentStatus>,
    ) -> Result<Vec<AppointmentDetails>, StoreError> {
        let mut filters = vec![
            format!("patient_id=eq.{}", patient_id),
            format!("doctor.name={}", contains_filter(doctor_name)),
        ];
        if let Some(status) = status {
            filters.push(format!("status=eq.{}", status.code()));
        }
        self.details(&filters).await
    }

    async fn find_doctor_schedule(
        &self,
        doctor_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
        patient_name: Option<&str>,
    ) -> Result<Vec<AppointmentDetails>, StoreError> {
        let mut filters = vec![
            format!("doctor_id=eq.{}", doctor_id),
            format!("appointment_time=gte.{}", timestamp(start)),
            format!("appointment_time=lte.{}", timestamp(end)),
        ];
        if let Some(name) = patient_name {
            filters.push(format!("patient.name={}", contains_filter(name)));
        }
        self.details(&filters).await
    }
}
