use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
    middleware,
};

use auth_cell::middleware::{require_admin, require_authenticated};
use shared_utils::AppState;

use crate::handlers;

pub fn doctor_routes(state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        .route("/", get(handlers::list_doctors))
        .route("/filter", get(handlers::filter_doctors));

    let authenticated_routes = Router::new()
        .route("/{doctor_id}/availability/{date}", get(handlers::get_availability))
        .layer(middleware::from_fn_with_state(state.clone(), require_authenticated));

    let admin_routes = Router::new()
        .route("/", post(handlers::create_doctor))
        .route("/{doctor_id}", put(handlers::update_doctor).delete(handlers::delete_doctor))
        .layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .merge(admin_routes)
        .with_state(state)
}
