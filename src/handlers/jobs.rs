// src/handlers/jobs.rs

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use validator::Validate;

use crate::{
    error::AppError,
    models::job::{GenerateEssayRequest, GenerateQuizRequest, NewTrackedJob},
    session::Session,
};

/// Tracked jobs, most recently registered first.
pub async fn list_jobs(State(session): State<Arc<Session>>) -> impl IntoResponse {
    Json(session.tracker().tracked_jobs().await)
}

/// Tracks a job that was dispatched by some other path.
pub async fn register_job(
    State(session): State<Arc<Session>>,
    Json(payload): Json<NewTrackedJob>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let job = session.register_job(payload).await?;
    Ok((StatusCode::ACCEPTED, Json(job)))
}

/// Starts a quiz generation on the backend and tracks it.
pub async fn generate_quiz(
    State(session): State<Arc<Session>>,
    Json(payload): Json<GenerateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let job = session.generate_quiz(payload).await?;
    Ok((StatusCode::ACCEPTED, Json(job)))
}

/// Starts an essay Q&A generation on the backend and tracks it.
pub async fn generate_essay(
    State(session): State<Arc<Session>>,
    Json(payload): Json<GenerateEssayRequest>,
) -> Result<impl IntoResponse, AppError> {
    let job = session.generate_essay(payload).await?;
    Ok((StatusCode::ACCEPTED, Json(job)))
}
