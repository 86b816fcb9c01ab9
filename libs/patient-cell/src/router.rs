use std::sync::Arc;
use axum::{middleware, routing::{get, post}, Router};

use auth_cell::middleware::require_patient;
use shared_utils::AppState;

use crate::handlers::*;

pub fn patient_routes(state: Arc<AppState>) -> Router {
    let protected_routes = Router::new()
        .route("/me", get(get_patient_profile))
        .layer(middleware::from_fn_with_state(state.clone(), require_patient));

    Router::new()
        .route("/", post(create_patient))
        .merge(protected_routes)
        .with_state(state)
}
