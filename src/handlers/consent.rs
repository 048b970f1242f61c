// src/handlers/consent.rs

use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};

use crate::{models::consent::ConsentUpdate, session::Session};

/// Current choice plus the derived banner / script-gating flags.
pub async fn get_consent(State(session): State<Arc<Session>>) -> impl IntoResponse {
    Json(session.consent().await)
}

pub async fn accept_all(State(session): State<Arc<Session>>) -> impl IntoResponse {
    session.accept_all_cookies().await;
    Json(session.consent().await)
}

pub async fn reject_non_essential(State(session): State<Arc<Session>>) -> impl IntoResponse {
    session.reject_non_essential_cookies().await;
    Json(session.consent().await)
}

/// Omitted flags reset to `false`; they do not keep their previous value.
pub async fn update_consent(
    State(session): State<Arc<Session>>,
    Json(payload): Json<ConsentUpdate>,
) -> impl IntoResponse {
    session.update_consent(payload).await;
    Json(session.consent().await)
}
