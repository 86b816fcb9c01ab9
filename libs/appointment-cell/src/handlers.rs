use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use shared_models::auth::AuthenticatedUser;
use shared_models::error::AppError;
use shared_utils::AppState;

use crate::models::{
    BookAppointmentRequest, ChangeStatusRequest, SlotCheck, UpdateAppointmentRequest,
};
use crate::services::{AppointmentBookingService, AppointmentQueryService};

#[derive(Debug, Deserialize)]
pub struct FilterQuery {
    pub condition: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    pub date: NaiveDate,
    pub patient_name: Option<String>,
}

// ==============================================================================
// PATIENT HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let appointment = booking_service.book(user.id, request).await?;

    Ok((StatusCode::CREATED, Json(json!({
        "message": "Appointment booked successfully",
        "appointment": appointment
    }))))
}

#[axum::debug_handler]
pub async fn check_slot(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SlotCheck>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let verdict = booking_service.validate_slot(query.doctor_id, query.date, query.time).await?;

    Ok(Json(json!({ "verdict": verdict })))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<i64>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let appointment = booking_service.update(appointment_id, request, user.id).await?;

    Ok(Json(json!({
        "message": "Appointment updated successfully",
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<i64>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    booking_service.cancel(appointment_id, user.id).await?;

    Ok(Json(json!({ "message": "Appointment cancelled successfully" })))
}

#[axum::debug_handler]
pub async fn filter_appointments(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FilterQuery>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Value>, AppError> {
    let query_service = AppointmentQueryService::new(&state);

    let appointments = query_service
        .filter(user.id, query.condition.as_deref(), query.name.as_deref())
        .await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

// ==============================================================================
// DOCTOR HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn doctor_schedule(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ScheduleQuery>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let appointments = booking_service
        .doctor_schedule(user.id, query.date, query.patient_name.as_deref())
        .await?;

    Ok(Json(json!({
        "appointments": appointments,
        "date": query.date,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn change_status(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<i64>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<ChangeStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    booking_service.change_status(appointment_id, request.status, user.id).await?;

    Ok(Json(json!({ "message": "Status updated successfully" })))
}
