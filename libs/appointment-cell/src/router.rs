use std::sync::Arc;

use axum::{
    Router,
    routing::{get, patch, post, put},
    middleware,
};

use auth_cell::middleware::{require_doctor, require_patient};
use shared_utils::AppState;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppState>) -> Router {
    let patient_routes = Router::new()
        .route("/", post(handlers::book_appointment))
        .route("/validate", get(handlers::check_slot))
        .route("/filter", get(handlers::filter_appointments))
        .route("/{appointment_id}", put(handlers::update_appointment).delete(handlers::cancel_appointment))
        .layer(middleware::from_fn_with_state(state.clone(), require_patient));

    let doctor_routes = Router::new()
        .route("/schedule", get(handlers::doctor_schedule))
        .route("/{appointment_id}/status", patch(handlers::change_status))
        .layer(middleware::from_fn_with_state(state.clone(), require_doctor));

    Router::new()
        .merge(patient_routes)
        .merge(doctor_routes)
        .with_state(state)
}
