use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use tracing::debug;

use shared_models::auth::{Role, TokenResponse};
use shared_models::error::AppError;
use shared_utils::AppState;

use crate::models::{AdminLoginRequest, LoginRequest, LoginResponse};
use crate::services::{AuthorizationGate, LoginService};

#[axum::debug_handler]
pub async fn admin_login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AdminLoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = LoginService::new(&state).admin_login(&request).await?;
    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn doctor_login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = LoginService::new(&state).doctor_login(&request).await?;
    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn patient_login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = LoginService::new(&state).patient_login(&request).await?;
    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn validate_token(
    State(state): State<Arc<AppState>>,
    Path(role): Path<String>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<TokenResponse>, AppError> {
    let role: Role = role.parse().map_err(AppError::BadRequest)?;
    debug!("Validating token for role {}", role);

    let user = AuthorizationGate::new(&state).authorize(auth.token(), role).await?;

    Ok(Json(TokenResponse {
        valid: true,
        subject: user.subject,
        role: user.role,
    }))
}
