use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use urlencoding::encode;

use shared_models::directory::{Admin, Doctor, NewDoctor, NewPatient, Patient};

use crate::directory::{Directory, Registry};
use crate::error::StoreError;
use crate::supabase::{contains_filter, equals_filter, return_representation, SupabaseClient};

/// Directory and registry backed by the `doctors`, `patients` and `admins`
/// tables.
pub struct SupabaseDirectory {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseDirectory {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    async fn first<T>(&self, path: &str) -> Result<Option<T>, StoreError>
    where T: DeserializeOwned {
        let rows: Vec<T> = self.supabase.request(Method::GET, path, None).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_one<T>(&self, path: &str, body: serde_json::Value) -> Result<T, StoreError>
    where T: DeserializeOwned {
        let rows: Vec<T> = self.supabase.request_with_headers(
            Method::POST,
            path,
            Some(body),
            Some(return_representation()),
        ).await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode(format!("insert into {} returned no rows", path)))
    }
}

fn doctor_body(
    name: &str,
    specialty: &str,
    email: &str,
    password_hash: &str,
    phone: &str,
    available_times: &[shared_models::directory::TimeWindow],
) -> serde_json::Value {
    json!({
        "name": name,
        "specialty": specialty,
        "email": email,
        "password_hash": password_hash,
        "phone": phone,
        "available_times": available_times.iter().map(|w| w.to_string()).collect::<Vec<_>>(),
    })
}

#[async_trait]
impl Directory for SupabaseDirectory {
    async fn find_doctor_by_id(&self, id: i64) -> Result<Option<Doctor>, StoreError> {
        debug!("Looking up doctor {}", id);
        self.first(&format!("/rest/v1/doctors?id=eq.{}&limit=1", id)).await
    }

    async fn find_doctor_by_email(&self, email: &str) -> Result<Option<Doctor>, StoreError> {
        self.first(&format!("/rest/v1/doctors?email=eq.{}&limit=1", encode(email))).await
    }

    async fn find_patient_by_email(&self, email: &str) -> Result<Option<Patient>, StoreError> {
        self.first(&format!("/rest/v1/patients?email=eq.{}&limit=1", encode(email))).await
    }

    async fn find_patient_by_email_or_phone(
        &self,
        email: &str,
        phone: &str,
    ) -> Result<Option<Patient>, StoreError> {
        let path = format!(
            "/rest/v1/patients?or=(email.eq.\"{}\",phone.eq.\"{}\")&limit=1",
            encode(email),
            encode(phone)
        );
        self.first(&path).await
    }

    async fn find_admin_by_username(&self, username: &str) -> Result<Option<Admin>, StoreError> {
        self.first(&format!("/rest/v1/admins?username=eq.{}&limit=1", encode(username))).await
    }
}

#[async_trait]
impl Registry for SupabaseDirectory {
    async fn insert_doctor(&self, doctor: NewDoctor) -> Result<Doctor, StoreError> {
        let body = doctor_body(
            &doctor.name,
            &doctor.specialty,
            &doctor.email,
            &doctor.password_hash,
            &doctor.phone,
            &doctor.available_times,
        );
        self.insert_one("/rest/v1/doctors", body).await
    }

    async fn update_doctor(&self, doctor: &Doctor) -> Result<Doctor, StoreError> {
        let body = doctor_body(
            &doctor.name,
            &doctor.specialty,
            &doctor.email,
            &doctor.password_hash,
            &doctor.phone,
            &doctor.available_times,
        );

        let rows: Vec<Doctor> = self.supabase.request_with_headers(
            Method::PATCH,
            &format!("/rest/v1/doctors?id=eq.{}", doctor.id),
            Some(body),
            Some(return_representation()),
        ).await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Rejected(format!("doctor {} no longer exists", doctor.id)))
    }

    async fn delete_doctor(&self, id: i64) -> Result<(), StoreError> {
        // `delete_doctor(doctor_id)` deletes appointments and the doctor row in one transaction.
        self.supabase.execute(
            Method::POST,
            "/rest/v1/rpc/delete_doctor",
            Some(json!({ "doctor_id": id })),
        ).await
    }

    async fn list_doctors(&self) -> Result<Vec<Doctor>, StoreError> {
        self.supabase.request(Method::GET, "/rest/v1/doctors?order=id.asc", None).await
    }

    async fn search_doctors(
        &self,
        name: Option<&str>,
        specialty: Option<&str>,
    ) -> Result<Vec<Doctor>, StoreError> {
        let mut query_parts = vec!["order=id.asc".to_string()];

        if let Some(name) = name {
            query_parts.push(format!("name={}", contains_filter(name)));
        }
        if let Some(specialty) = specialty {
            query_parts.push(format!("specialty={}", equals_filter(specialty)));
        }

        let path = format!("/rest/v1/doctors?{}", query_parts.join("&"));
        self.supabase.request(Method::GET, &path, None).await
    }

    async fn insert_patient(&self, patient: NewPatient) -> Result<Patient, StoreError> {
        let body = json!({
            "name": patient.name,
            "email": patient.email,
            "phone": patient.phone,
            "address": patient.address,
            "password_hash": patient.password_hash,
        });
        self.insert_one("/rest/v1/patients", body).await
    }
}
