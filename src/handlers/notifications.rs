// src/handlers/notifications.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{error::AppError, models::notification::NewNotification, session::Session};

/// Lists notifications (newest first) with the unread count.
pub async fn list_notifications(State(session): State<Arc<Session>>) -> impl IntoResponse {
    Json(session.notifications().await)
}

/// Adds a notification on behalf of the UI.
pub async fn add_notification(
    State(session): State<Arc<Session>>,
    Json(payload): Json<NewNotification>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let notification = session.add_notification(payload).await;
    Ok((StatusCode::CREATED, Json(notification)))
}

pub async fn mark_as_read(
    State(session): State<Arc<Session>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if !session.mark_as_read(&id).await {
        return Err(AppError::NotFound(format!("Notification '{}' not found", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn mark_all_as_read(State(session): State<Arc<Session>>) -> impl IntoResponse {
    session.mark_all_as_read().await;
    StatusCode::NO_CONTENT
}

pub async fn delete_notification(
    State(session): State<Arc<Session>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if !session.remove_notification(&id).await {
        return Err(AppError::NotFound(format!("Notification '{}' not found", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_notifications(State(session): State<Arc<Session>>) -> impl IntoResponse {
    session.clear_notifications().await;
    StatusCode::NO_CONTENT
}
