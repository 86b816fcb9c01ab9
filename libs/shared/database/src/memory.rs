use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tokio::sync::Mutex;

use shared_models::appointment::{
    Appointment, AppointmentDetails, AppointmentStatus, NewAppointment,
};
use shared_models::directory::{Admin, Doctor, NewDoctor, NewPatient, Patient};

use crate::appointments::AppointmentStore;
use crate::directory::{Directory, Registry};
use crate::error::StoreError;

#[derive(Debug, Default)]
struct Tables {
    doctors: BTreeMap<i64, Doctor>,
    patients: BTreeMap<i64, Patient>,
    admins: BTreeMap<i64, Admin>,
    appointments: BTreeMap<i64, Appointment>,
    next_id: i64,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn slot_taken(&self, doctor_id: i64, time: NaiveDateTime, except: Option<i64>) -> bool {
        self.appointments.values().any(|a| {
            a.doctor_id == doctor_id && a.appointment_time == time && Some(a.id) != except
        })
    }

    fn details(&self, appointment: &Appointment) -> Option<AppointmentDetails> {
        let doctor = self.doctors.get(&appointment.doctor_id)?;
        let patient = self.patients.get(&appointment.patient_id)?;

        Some(AppointmentDetails {
            id: appointment.id,
            doctor_id: doctor.id,
            doctor_name: doctor.name.clone(),
            patient_id: patient.id,
            patient_name: patient.name.clone(),
            patient_email: patient.email.clone(),
            patient_phone: patient.phone.clone(),
            patient_address: patient.address.clone(),
            appointment_time: appointment.appointment_time,
            status: appointment.status,
        })
    }

    fn select<F>(&self, predicate: F) -> Vec<AppointmentDetails>
    where F: Fn(&AppointmentDetails) -> bool {
        let mut rows: Vec<AppointmentDetails> = self.appointments
            .values()
            .filter_map(|a| self.details(a))
            .filter(|d| predicate(d))
            .collect();
        rows.sort_by_key(|d| (d.appointment_time, d.id));
        rows
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Process-local clinic database honouring the same uniqueness rules as the
/// Postgres schema. Used for development runs and tests.
#[derive(Debug, Default)]
pub struct InMemoryClinic {
    tables: Mutex<Tables>,
}

impl InMemoryClinic {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_admin(&self, username: &str, password_hash: &str) -> Result<Admin, StoreError> {
        let mut tables = self.tables.lock().await;

        if tables.admins.values().any(|a| a.username == username) {
            return Err(StoreError::Conflict(format!("admin {} already exists", username)));
        }

        let admin = Admin {
            id: tables.allocate_id(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        tables.admins.insert(admin.id, admin.clone());
        Ok(admin)
    }

    pub async fn delete_patient(&self, id: i64) {
        self.tables.lock().await.patients.remove(&id);
    }

    pub async fn appointment_count(&self) -> usize {
        self.tables.lock().await.appointments.len()
    }
}

#[async_trait]
impl Directory for InMemoryClinic {
    async fn find_doctor_by_id(&self, id: i64) -> Result<Option<Doctor>, StoreError> {
        Ok(self.tables.lock().await.doctors.get(&id).cloned())
    }

    async fn find_doctor_by_email(&self, email: &str) -> Result<Option<Doctor>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.doctors.values().find(|d| d.email == email).cloned())
    }

    async fn find_patient_by_email(&self, email: &str) -> Result<Option<Patient>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.patients.values().find(|p| p.email == email).cloned())
    }

    async fn find_patient_by_email_or_phone(
        &self,
        email: &str,
        phone: &str,
    ) -> Result<Option<Patient>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.patients
            .values()
            .find(|p| p.email == email || p.phone == phone)
            .cloned())
    }

    async fn find_admin_by_username(&self, username: &str) -> Result<Option<Admin>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.admins.values().find(|a| a.username == username).cloned())
    }
}

#[async_trait]
impl Registry for InMemoryClinic {
    async fn insert_doctor(&self, doctor: NewDoctor) -> Result<Doctor, StoreError> {
        let mut tables = self.tables.lock().await;

        if tables.doctors.values().any(|d| d.email == doctor.email) {
            return Err(StoreError::Conflict(format!("doctor email {} already exists", doctor.email)));
        }

        let record = Doctor {
            id: tables.allocate_id(),
            name: doctor.name,
            specialty: doctor.specialty,
            email: doctor.email,
            password_hash: doctor.password_hash,
            phone: doctor.phone,
            available_times: doctor.available_times,
        };
        tables.doctors.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_doctor(&self, doctor: &Doctor) -> Result<Doctor, StoreError> {
        let mut tables = self.tables.lock().await;

        if tables.doctors.values().any(|d| d.email == doctor.email && d.id != doctor.id) {
            return Err(StoreError::Conflict(format!("doctor email {} already exists", doctor.email)));
        }

        match tables.doctors.get_mut(&doctor.id) {
            Some(existing) => {
                *existing = doctor.clone();
                Ok(doctor.clone())
            }
            None => Err(StoreError::Rejected(format!("doctor {} no longer exists", doctor.id))),
        }
    }

    async fn delete_doctor(&self, id: i64) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;

        tables.appointments.retain(|_, a| a.doctor_id != id);
        tables.doctors.remove(&id);
        Ok(())
    }

    async fn list_doctors(&self) -> Result<Vec<Doctor>, StoreError> {
        Ok(self.tables.lock().await.doctors.values().cloned().collect())
    }

    async fn search_doctors(
        &self,
        name: Option<&str>,
        specialty: Option<&str>,
    ) -> Result<Vec<Doctor>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.doctors
            .values()
            .filter(|d| name.map_or(true, |n| contains_ignore_case(&d.name, n)))
            .filter(|d| specialty.map_or(true, |s| d.specialty.eq_ignore_ascii_case(s)))
            .cloned()
            .collect())
    }

    async fn insert_patient(&self, patient: NewPatient) -> Result<Patient, StoreError> {
        let mut tables = self.tables.lock().await;

        if tables.patients.values().any(|p| p.email == patient.email) {
            return Err(StoreError::Conflict(format!("patient email {} already exists", patient.email)));
        }

        let record = Patient {
            id: tables.allocate_id(),
            name: patient.name,
            email: patient.email,
            phone: patient.phone,
            address: patient.address,
            password_hash: patient.password_hash,
        };
        tables.patients.insert(record.id, record.clone());
        Ok(record)
    }
}

#[async_trait]
impl AppointmentStore for InMemoryClinic {
    async fn save(&self, appointment: NewAppointment) -> Result<Appointment, StoreError> {
        let mut tables = self.tables.lock().await;

        if !tables.doctors.contains_key(&appointment.doctor_id()) {
            return Err(StoreError::Rejected(format!("doctor {} does not exist", appointment.doctor_id())));
        }
        if !tables.patients.contains_key(&appointment.patient_id()) {
            return Err(StoreError::Rejected(format!("patient {} does not exist", appointment.patient_id())));
        }
        if tables.slot_taken(appointment.doctor_id(), appointment.appointment_time(), None) {
            return Err(StoreError::Conflict(format!(
                "doctor {} already has an appointment at {}",
                appointment.doctor_id(),
                appointment.appointment_time()
            )));
        }

        let id = tables.allocate_id();
        let record = appointment.into_appointment(id);
        tables.appointments.insert(id, record.clone());
        Ok(record)
    }

    async fn update(&self, appointment: &Appointment) -> Result<Appointment, StoreError> {
        let mut tables = self.tables.lock().await;

        if !tables.doctors.contains_key(&appointment.doctor_id) {
            return Err(StoreError::Rejected(format!("doctor {} does not exist", appointment.doctor_id)));
        }
        if tables.slot_taken(appointment.doctor_id, appointment.appointment_time, Some(appointment.id)) {
            return Err(StoreError::Conflict(format!(
                "doctor {} already has an appointment at {}",
                appointment.doctor_id, appointment.appointment_time
            )));
        }

        match tables.appointments.get_mut(&appointment.id) {
            Some(existing) => {
                existing.doctor_id = appointment.doctor_id;
                existing.appointment_time = appointment.appointment_time;
                existing.status = appointment.status;
                Ok(existing.clone())
            }
            None => Err(StoreError::Rejected(format!("appointment {} no longer exists", appointment.id))),
        }
    }

    async fn update_status(&self, id: i64, status: AppointmentStatus) -> Result<(), StoreError> {
        if let Some(existing) = self.tables.lock().await.appointments.get_mut(&id) {
            existing.status = status;
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.tables.lock().await.appointments.remove(&id);
        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Appointment>, StoreError> {
        Ok(self.tables.lock().await.appointments.get(&id).cloned())
    }

    async fn find_by_doctor_and_time_range(
        &self,
        doctor_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Appointment>, StoreError> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<Appointment> = tables.appointments
            .values()
            .filter(|a| a.doctor_id == doctor_id)
            .filter(|a| a.appointment_time >= start && a.appointment_time <= end)
            .cloned()
            .collect();
        rows.sort_by_key(|a| a.appointment_time);
        Ok(rows)
    }

    async fn find_by_doctor_date_time(
        &self,
        doctor_id: i64,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<Option<Appointment>, StoreError> {
        let at = date.and_time(time);
        let tables = self.tables.lock().await;
        Ok(tables.appointments
            .values()
            .find(|a| a.doctor_id == doctor_id && a.appointment_time == at)
            .cloned())
    }

    async fn find_by_patient_id(&self, patient_id: i64) -> Result<Vec<AppointmentDetails>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.select(|d| d.patient_id == patient_id))
    }

    async fn find_by_patient_id_and_status(
        &self,
        patient_id: i64,
        status: AppointmentStatus,
    ) -> Result<Vec<AppointmentDetails>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.select(|d| d.patient_id == patient_id && d.status == status))
    }

    async fn filter_by_doctor_name_and_patient(
        &self,
        doctor_name: &str,
        patient_id: i64,
        status: Option<AppointmentStatus>,
    ) -> Result<Vec<AppointmentDetails>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.select(|d| {
            d.patient_id == patient_id
                && contains_ignore_case(&d.doctor_name, doctor_name)
                && status.map_or(true, |s| d.status == s)
        }))
    }

    async fn find_doctor_schedule(
        &self,
        doctor_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
        patient_name: Option<&str>,
    ) -> Result<Vec<AppointmentDetails>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.select(|d| {
            d.doctor_id == doctor_id
                && d.appointment_time >= start
                && d.appointment_time <= end
                && patient_name.map_or(true, |n| contains_ignore_case(&d.patient_name, n))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doctor(email: &str) -> NewDoctor {
        NewDoctor {
            name: "Dr. Grey".to_string(),
            specialty: "Surgery".to_string(),
            email: email.to_string(),
            password_hash: String::new(),
            phone: "5550000000".to_string(),
            available_times: vec!["09:00-10:00".parse().unwrap()],
        }
    }

    fn patient(email: &str, phone: &str) -> NewPatient {
        NewPatient {
            name: "Pat".to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            address: "1 Main St".to_string(),
            password_hash: String::new(),
        }
    }

    fn at(raw: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M").unwrap()
    }

    #[tokio::test]
    async fn rejects_a_second_appointment_in_the_same_slot() {
        let clinic = InMemoryClinic::new();
        let d = clinic.insert_doctor(doctor("grey@clinic.test")).await.unwrap();
        let p = clinic.insert_patient(patient("pat@clinic.test", "1")).await.unwrap();
        let now = at("2030-01-01 00:00");

        let first = NewAppointment::scheduled(d.id, p.id, at("2030-06-10 09:00"), now).unwrap();
        clinic.save(first.clone()).await.unwrap();

        let err = clinic.save(first).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(clinic.appointment_count().await, 1);
    }

    #[tokio::test]
    async fn deleting_a_doctor_takes_only_their_appointments_with_them() {
        let clinic = InMemoryClinic::new();
        let grey = clinic.insert_doctor(doctor("grey@clinic.test")).await.unwrap();
        let yang = clinic.insert_doctor(doctor("yang@clinic.test")).await.unwrap();
        let p = clinic.insert_patient(patient("pat@clinic.test", "1")).await.unwrap();
        let now = at("2030-01-01 00:00");

        for d in [&grey, &yang] {
            let slot = NewAppointment::scheduled(d.id, p.id, at("2030-06-10 09:00"), now).unwrap();
            clinic.save(slot).await.unwrap();
        }

        clinic.delete_doctor(grey.id).await.unwrap();

        assert!(clinic.find_doctor_by_id(grey.id).await.unwrap().is_none());
        assert_eq!(clinic.appointment_count().await, 1);
        assert_eq!(clinic.find_by_patient_id(p.id).await.unwrap()[0].doctor_id, yang.id);
    }

    #[tokio::test]
    async fn enforces_unique_doctor_email() {
        let clinic = InMemoryClinic::new();
        clinic.insert_doctor(doctor("grey@clinic.test")).await.unwrap();

        let err = clinic.insert_doctor(doctor("grey@clinic.test")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn email_or_phone_lookup_matches_either_field() {
        let clinic = InMemoryClinic::new();
        clinic.insert_patient(patient("pat@clinic.test", "555")).await.unwrap();

        assert!(clinic.find_patient_by_email_or_phone("other@clinic.test", "555").await.unwrap().is_some());
        assert!(clinic.find_patient_by_email_or_phone("pat@clinic.test", "000").await.unwrap().is_some());
        assert!(clinic.find_patient_by_email_or_phone("other@clinic.test", "000").await.unwrap().is_none());
    }
}
