// src/handlers/auth.rs

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::{
    error::AppError,
    models::user::{LoginRequest, RegisterRequest},
    session::Session,
};

/// Creates an account on the backend and logs straight in.
///
/// Returns 201 Created with the token and the user profile.
pub async fn register(
    State(session): State<Arc<Session>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let auth = session.register(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "token": auth.access_token,
            "type": auth.token_type,
            "user": auth.user,
        })),
    ))
}

/// Authenticates against the backend and switches to that user's scope.
pub async fn login(
    State(session): State<Arc<Session>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let auth = session.login(payload).await?;

    Ok(Json(json!({
        "token": auth.access_token,
        "type": auth.token_type,
        "user": auth.user,
    })))
}

/// Forgets the token and drops back to the anonymous scope.
pub async fn logout(State(session): State<Arc<Session>>) -> impl IntoResponse {
    session.logout().await;
    StatusCode::NO_CONTENT
}

/// Current identity, 401 when anonymous.
pub async fn me(State(session): State<Arc<Session>>) -> Result<impl IntoResponse, AppError> {
    let user = session
        .current_user()
        .await
        .ok_or(AppError::AuthError("Not logged in".to_string()))?;

    Ok(Json(user))
}
