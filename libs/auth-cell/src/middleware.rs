use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use shared_models::auth::Role;
use shared_models::error::AppError;
use shared_utils::extractor::bearer_token;
use shared_utils::AppState;

use crate::services::AuthorizationGate;

async fn guard(
    state: &AppState,
    required: Option<Role>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())?.to_string();
    let gate = AuthorizationGate::new(state);

    let user = match required {
        Some(role) => gate.authorize(&token, role).await?,
        None => gate.authenticate(&token).await?,
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    guard(&state, Some(Role::Admin), request, next).await
}

pub async fn require_doctor(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    guard(&state, Some(Role::Doctor), request, next).await
}

pub async fn require_patient(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    guard(&state, Some(Role::Patient), request, next).await
}

/// Any valid token whose subject still exists.
pub async fn require_authenticated(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    guard(&state, None, request, next).await
}
