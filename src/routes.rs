// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{delete, get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, consent, jobs, notifications, quiz},
    state::AppState,
    utils::identity::identity_middleware,
};

/// Origins of the Quiz Hub and Progrezz dev servers.
const FRONTEND_ORIGINS: [&str; 4] = [
    "http://localhost:3000",
    "http://127.0.0.1:3000",
    "http://localhost:3002",
    "http://127.0.0.1:3002",
];

/// Assembles the local companion API.
///
/// * Merges all sub-routers (auth, notifications, jobs, consent, quiz).
/// * Notification and job routes require a logged-in identity.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = FRONTEND_ORIGINS
        .iter()
        .map(|origin| HeaderValue::from_static(origin))
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me));

    let notification_routes = Router::new()
        .route(
            "/",
            get(notifications::list_notifications)
                .post(notifications::add_notification)
                .delete(notifications::clear_notifications),
        )
        .route("/read-all", post(notifications::mark_all_as_read))
        .route("/{id}/read", post(notifications::mark_as_read))
        .route("/{id}", delete(notifications::delete_notification))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            identity_middleware,
        ));

    let job_routes = Router::new()
        .route("/", get(jobs::list_jobs).post(jobs::register_job))
        .route("/quiz", post(jobs::generate_quiz))
        .route("/essay", post(jobs::generate_essay))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            identity_middleware,
        ));

    let consent_routes = Router::new()
        .route("/", get(consent::get_consent).put(consent::update_consent))
        .route("/accept-all", post(consent::accept_all))
        .route("/reject-non-essential", post(consent::reject_non_essential));

    let quiz_routes = Router::new().route("/score", post(quiz::score_attempt));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/notifications", notification_routes)
        .nest("/api/jobs", job_routes)
        .nest("/api/consent", consent_routes)
        .nest("/api/quiz", quiz_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
