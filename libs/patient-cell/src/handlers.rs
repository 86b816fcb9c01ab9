use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use shared_models::auth::AuthenticatedUser;
use shared_models::error::AppError;
use shared_utils::AppState;

use crate::models::CreatePatientRequest;
use crate::services::PatientService;

#[axum::debug_handler]
pub async fn create_patient(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreatePatientRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let patient = PatientService::new(&state).register(request).await?;

    Ok((StatusCode::CREATED, Json(json!({
        "message": "Signup successful",
        "patient": patient
    }))))
}

#[axum::debug_handler]
pub async fn get_patient_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Value>, AppError> {
    let patient = PatientService::new(&state).me(&user).await?;

    Ok(Json(json!({ "patient": patient })))
}
