use std::sync::Arc;

use tracing::debug;

use shared_database::AppointmentStore;
use shared_models::appointment::AppointmentDetails;
use shared_utils::AppState;

use crate::models::{present, AppointmentCondition, AppointmentError};

/// Patient-scoped appointment listing by condition and doctor name.
pub struct AppointmentQueryService {
    appointments: Arc<dyn AppointmentStore>,
}

impl AppointmentQueryService {
    pub fn new(state: &AppState) -> Self {
        Self::with_store(state.appointments.clone())
    }

    pub fn with_store(appointments: Arc<dyn AppointmentStore>) -> Self {
        Self { appointments }
    }

    /// `patient_id` always comes from the authenticated subject.
    pub async fn filter(
        &self,
        patient_id: i64,
        condition: Option<&str>,
        doctor_name: Option<&str>,
    ) -> Result<Vec<AppointmentDetails>, AppointmentError> {
        let status = AppointmentCondition::parse(condition)?.map(|c| c.status());
        let doctor_name = present(doctor_name);
        debug!("Filtering appointments of patient {} (status {:?}, doctor {:?})", patient_id, status, doctor_name);

        let rows = match (status, doctor_name) {
            (None, None) => self.appointments.find_by_patient_id(patient_id).await?,
            (Some(status), None) => {
                self.appointments.find_by_patient_id_and_status(patient_id, status).await?
            }
            (status, Some(name)) => {
                self.appointments.filter_by_doctor_name_and_patient(name, patient_id, status).await?
            }
        };

        Ok(rows)
    }
}
