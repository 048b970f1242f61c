// src/utils/identity.rs

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::session::Session;

/// Axum Middleware: requires a logged-in identity.
///
/// Injects the current `UserProfile` into the request extensions.
/// Returns 401 Unauthorized while the session is anonymous.
pub async fn identity_middleware(
    State(session): State<Arc<Session>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    match session.current_user().await {
        Some(user) => {
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        None => Err(StatusCode::UNAUTHORIZED),
    }
}
