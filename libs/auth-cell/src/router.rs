use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use shared_utils::AppState;

use crate::handlers;

pub fn auth_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/admin/login", post(handlers::admin_login))
        .route("/doctor/login", post(handlers::doctor_login))
        .route("/patient/login", post(handlers::patient_login))
        .route("/validate/{role}", get(handlers::validate_token))
        .with_state(state)
}
