use std::sync::Arc;

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{debug, info, warn};

use shared_database::{AppointmentStore, Directory};
use shared_models::appointment::{Appointment, AppointmentDetails, AppointmentStatus, NewAppointment};
use shared_utils::AppState;

use crate::models::{
    present, AppointmentError, BookAppointmentRequest, SlotVerdict, UpdateAppointmentRequest,
};
use crate::services::availability::{day_bounds, AvailabilityService};

pub struct AppointmentBookingService {
    directory: Arc<dyn Directory>,
    appointments: Arc<dyn AppointmentStore>,
    availability: AvailabilityService,
}

impl AppointmentBookingService {
    pub fn new(state: &AppState) -> Self {
        Self::with_stores(state.directory.clone(), state.appointments.clone())
    }

    pub fn with_stores(directory: Arc<dyn Directory>, appointments: Arc<dyn AppointmentStore>) -> Self {
        Self {
            availability: AvailabilityService::with_stores(directory.clone(), appointments.clone()),
            directory,
            appointments,
        }
    }

    /// Read-only check of a requested slot. The time must equal the start of
    /// a free window, and no appointment may already sit at that exact
    /// doctor, date and time.
    pub async fn validate_slot(
        &self,
        doctor_id: i64,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<SlotVerdict, AppointmentError> {
        let Some(doctor) = self.directory.find_doctor_by_id(doctor_id).await? else {
            return Ok(SlotVerdict::DoctorNotFound);
        };

        let free = self.availability.free_windows(&doctor, date).await?;
        if !free.iter().any(|window| window.start() == time) {
            debug!("{} {} is not a free window start for doctor {}", date, time, doctor_id);
            return Ok(SlotVerdict::SlotUnavailable);
        }

        if self.appointments
            .find_by_doctor_date_time(doctor_id, date, time)
            .await?
            .is_some()
        {
            debug!("Doctor {} already booked at {} {}", doctor_id, date, time);
            return Ok(SlotVerdict::SlotUnavailable);
        }

        Ok(SlotVerdict::Accepted)
    }

    async fn require_accepted(&self, doctor_id: i64, at: NaiveDateTime) -> Result<(), AppointmentError> {
        match self.validate_slot(doctor_id, at.date(), at.time()).await? {
            SlotVerdict::Accepted => Ok(()),
            SlotVerdict::DoctorNotFound => {
                warn!("Rejected booking: doctor {} does not exist", doctor_id);
                Err(AppointmentError::DoctorNotFound)
            }
            SlotVerdict::SlotUnavailable => {
                warn!("Rejected booking: doctor {} is not free at {}", doctor_id, at);
                Err(AppointmentError::SlotUnavailable)
            }
        }
    }

    pub async fn book(
        &self,
        patient_id: i64,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        self.book_at(patient_id, request, Local::now().naive_local()).await
    }

    pub async fn book_at(
        &self,
        patient_id: i64,
        request: BookAppointmentRequest,
        now: NaiveDateTime,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = NewAppointment::scheduled(
            request.doctor_id,
            patient_id,
            request.appointment_time,
            now,
        ).map_err(|e| AppointmentError::InvalidTime(e.to_string()))?;

        self.require_accepted(request.doctor_id, request.appointment_time).await?;

        let saved = self.appointments
            .save(appointment)
            .await
            .map_err(AppointmentError::from_write)?;

        info!(
            "Booked appointment {} for patient {} with doctor {} at {}",
            saved.id, patient_id, saved.doctor_id, saved.appointment_time
        );
        Ok(saved)
    }

    async fn owned_by_patient(&self, appointment_id: i64, patient_id: i64) -> Result<Appointment, AppointmentError> {
        let existing = self.appointments
            .find_by_id(appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound)?;

        if existing.patient_id != patient_id {
            warn!("Patient {} tried to modify appointment {} of patient {}", patient_id, appointment_id, existing.patient_id);
            return Err(AppointmentError::Forbidden);
        }

        Ok(existing)
    }

    pub async fn update(
        &self,
        appointment_id: i64,
        request: UpdateAppointmentRequest,
        requesting_patient_id: i64,
    ) -> Result<Appointment, AppointmentError> {
        self.update_at(appointment_id, request, requesting_patient_id, Local::now().naive_local()).await
    }

    /// Moves an appointment to a new doctor, time and status. The patient
    /// never changes.
    pub async fn update_at(
        &self,
        appointment_id: i64,
        request: UpdateAppointmentRequest,
        requesting_patient_id: i64,
        now: NaiveDateTime,
    ) -> Result<Appointment, AppointmentError> {
        let existing = self.owned_by_patient(appointment_id, requesting_patient_id).await?;

        if request.appointment_time <= now {
            return Err(AppointmentError::InvalidTime(format!(
                "appointment time {} is not in the future",
                request.appointment_time
            )));
        }

        self.require_accepted(request.doctor_id, request.appointment_time).await?;

        let changed = Appointment {
            id: existing.id,
            doctor_id: request.doctor_id,
            patient_id: existing.patient_id,
            appointment_time: request.appointment_time,
            status: request.status.unwrap_or(existing.status),
        };

        let saved = self.appointments
            .update(&changed)
            .await
            .map_err(AppointmentError::from_write)?;

        info!("Updated appointment {} to doctor {} at {}", saved.id, saved.doctor_id, saved.appointment_time);
        Ok(saved)
    }

    /// Permanently removes the appointment.
    pub async fn cancel(&self, appointment_id: i64, requesting_patient_id: i64) -> Result<(), AppointmentError> {
        self.owned_by_patient(appointment_id, requesting_patient_id).await?;

        self.appointments
            .delete(appointment_id)
            .await
            .map_err(AppointmentError::from_write)?;

        info!("Cancelled appointment {}", appointment_id);
        Ok(())
    }

    pub async fn change_status(
        &self,
        appointment_id: i64,
        status: AppointmentStatus,
        doctor_id: i64,
    ) -> Result<(), AppointmentError> {
        let existing = self.appointments
            .find_by_id(appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound)?;

        if existing.doctor_id != doctor_id {
            warn!("Doctor {} tried to change appointment {} of doctor {}", doctor_id, appointment_id, existing.doctor_id);
            return Err(AppointmentError::Forbidden);
        }

        self.appointments
            .update_status(appointment_id, status)
            .await
            .map_err(AppointmentError::from_write)?;

        info!("Appointment {} is now {}", appointment_id, status);
        Ok(())
    }

    /// A doctor's appointments on one day, optionally narrowed by patient name.
    pub async fn doctor_schedule(
        &self,
        doctor_id: i64,
        date: NaiveDate,
        patient_name: Option<&str>,
    ) -> Result<Vec<AppointmentDetails>, AppointmentError> {
        let (start, end) = day_bounds(date);
        let rows = self.appointments
            .find_doctor_schedule(doctor_id, start, end, present(patient_name))
            .await?;
        Ok(rows)
    }
}
