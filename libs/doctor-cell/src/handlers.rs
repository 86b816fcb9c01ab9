use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde_json::{json, Value};

use appointment_cell::services::AvailabilityService;
use shared_models::error::AppError;
use shared_utils::AppState;

use crate::models::{CreateDoctorRequest, DoctorFilterQuery, UpdateDoctorRequest};
use crate::services::DoctorService;

// ==============================================================================
// PUBLIC HANDLERS (NO AUTHENTICATION REQUIRED)
// ==============================================================================

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    let doctors = DoctorService::new(&state).list().await?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

#[axum::debug_handler]
pub async fn filter_doctors(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DoctorFilterQuery>,
) -> Result<Json<Value>, AppError> {
    let doctors = DoctorService::new(&state).filter(&query).await?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

// ==============================================================================
// AUTHENTICATED HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    Path((doctor_id, date)): Path<(i64, NaiveDate)>,
) -> Result<Json<Value>, AppError> {
    let windows = AvailabilityService::new(&state).availability(doctor_id, date).await?;

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "date": date,
        "available_times": windows
    })))
}

// ==============================================================================
// ADMIN HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_doctor(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateDoctorRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let doctor = DoctorService::new(&state).register(request).await?;

    Ok((StatusCode::CREATED, Json(json!({
        "message": "Doctor added to db",
        "doctor": doctor
    }))))
}

#[axum::debug_handler]
pub async fn update_doctor(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<i64>,
    Json(request): Json<UpdateDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    let doctor = DoctorService::new(&state).update(doctor_id, request).await?;

    Ok(Json(json!({
        "message": "Doctor updated",
        "doctor": doctor
    })))
}

#[axum::debug_handler]
pub async fn delete_doctor(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    DoctorService::new(&state).delete(doctor_id).await?;

    Ok(Json(json!({ "message": "Doctor deleted successfully" })))
}
