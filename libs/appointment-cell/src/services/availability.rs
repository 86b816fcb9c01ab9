use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

use shared_database::{AppointmentStore, Directory};
use shared_models::directory::{Doctor, TimeWindow};
use shared_utils::AppState;

use crate::models::AppointmentError;

/// First and last representable instants of `date`.
pub fn day_bounds(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = date.and_time(NaiveTime::MIN);
    let end = date
        .and_hms_micro_opt(23, 59, 59, 999_999)
        .unwrap_or(start);
    (start, end)
}

/// Computes which of a doctor's declared windows are still free on a date.
///
/// A window is an atomic slot keyed by its start time: it drops out as soon
/// as any appointment that day starts at that minute, regardless of how the
/// appointment's duration would overlap other windows.
pub struct AvailabilityService {
    directory: Arc<dyn Directory>,
    appointments: Arc<dyn AppointmentStore>,
}

impl AvailabilityService {
    pub fn new(state: &AppState) -> Self {
        Self::with_stores(state.directory.clone(), state.appointments.clone())
    }

    pub fn with_stores(directory: Arc<dyn Directory>, appointments: Arc<dyn AppointmentStore>) -> Self {
        Self { directory, appointments }
    }

    /// Free windows in the doctor's declared order. An unknown doctor has
    /// no availability rather than an error.
    pub async fn availability(&self, doctor_id: i64, date: NaiveDate) -> Result<Vec<TimeWindow>, AppointmentError> {
        match self.directory.find_doctor_by_id(doctor_id).await? {
            Some(doctor) => self.free_windows(&doctor, date).await,
            None => {
                debug!("Doctor {} not found, no availability", doctor_id);
                Ok(Vec::new())
            }
        }
    }

    pub async fn free_windows(&self, doctor: &Doctor, date: NaiveDate) -> Result<Vec<TimeWindow>, AppointmentError> {
        let (start, end) = day_bounds(date);
        let booked: HashSet<NaiveTime> = self.appointments
            .find_by_doctor_and_time_range(doctor.id, start, end)
            .await?
            .iter()
            .map(|appointment| appointment.slot_start())
            .collect();

        let free: Vec<TimeWindow> = doctor.available_times
            .iter()
            .filter(|window| !booked.contains(&window.start()))
            .copied()
            .collect();

        debug!(
            "Doctor {} on {}: {} of {} windows free",
            doctor.id,
            date,
            free.len(),
            doctor.available_times.len()
        );
        Ok(free)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_bounds_cover_the_whole_day() {
        let date = NaiveDate::from_ymd_opt(2030, 6, 10).unwrap();
        let (start, end) = day_bounds(date);

        assert_eq!(start.to_string(), "2030-06-10 00:00:00");
        assert_eq!(end.date(), date);
        assert!(end > date.and_hms_opt(23, 59, 59).unwrap());
    }
}
