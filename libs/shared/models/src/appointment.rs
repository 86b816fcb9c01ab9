use std::fmt;

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stored as `0` (upcoming) or `1` (completed / past).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum AppointmentStatus {
    Upcoming,
    Completed,
}

impl AppointmentStatus {
    pub fn code(&self) -> i32 {
        match self {
            AppointmentStatus::Upcoming => 0,
            AppointmentStatus::Completed => 1,
        }
    }
}

impl TryFrom<i32> for AppointmentStatus {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(AppointmentStatus::Upcoming),
            1 => Ok(AppointmentStatus::Completed),
            other => Err(format!("appointment status must be 0 or 1, got {}", other)),
        }
    }
}

impl From<AppointmentStatus> for i32 {
    fn from(status: AppointmentStatus) -> Self {
        status.code()
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Upcoming => write!(f, "upcoming"),
            AppointmentStatus::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("appointment time {0} is not in the future")]
pub struct PastAppointmentError(pub NaiveDateTime);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub doctor_id: i64,
    pub patient_id: i64,
    pub appointment_time: NaiveDateTime,
    pub status: AppointmentStatus,
}

impl Appointment {
    /// Start of the slot this appointment occupies, at minute precision.
    pub fn slot_start(&self) -> NaiveTime {
        minute_precision(self.appointment_time.time())
    }
}

/// An appointment that has not been persisted yet.
///
/// The only way to build one is [`NewAppointment::scheduled`], which truncates
/// the timestamp to the minute and refuses it unless strictly after `now`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
    doctor_id: i64,
    patient_id: i64,
    appointment_time: NaiveDateTime,
    status: AppointmentStatus,
}

impl NewAppointment {
    pub fn scheduled(
        doctor_id: i64,
        patient_id: i64,
        appointment_time: NaiveDateTime,
        now: NaiveDateTime,
    ) -> Result<Self, PastAppointmentError> {
        let appointment_time = appointment_time
            .date()
            .and_time(minute_precision(appointment_time.time()));

        if appointment_time <= now {
            return Err(PastAppointmentError(appointment_time));
        }

        Ok(Self {
            doctor_id,
            patient_id,
            appointment_time,
            status: AppointmentStatus::Upcoming,
        })
    }

    pub fn doctor_id(&self) -> i64 {
        self.doctor_id
    }

    pub fn patient_id(&self) -> i64 {
        self.patient_id
    }

    pub fn appointment_time(&self) -> NaiveDateTime {
        self.appointment_time
    }

    pub fn status(&self) -> AppointmentStatus {
        self.status
    }

    pub fn into_appointment(self, id: i64) -> Appointment {
        Appointment {
            id,
            doctor_id: self.doctor_id,
            patient_id: self.patient_id,
            appointment_time: self.appointment_time,
            status: self.status,
        }
    }
}

/// Read projection joining an appointment with its doctor and patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentDetails {
    pub id: i64,
    pub doctor_id: i64,
    pub doctor_name: String,
    pub patient_id: i64,
    pub patient_name: String,
    pub patient_email: String,
    pub patient_phone: String,
    pub patient_address: String,
    pub appointment_time: NaiveDateTime,
    pub status: AppointmentStatus,
}

pub fn minute_precision(time: NaiveTime) -> NaiveTime {
    time.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time)
}
