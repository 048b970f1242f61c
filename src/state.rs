use std::sync::Arc;

use axum::extract::FromRef;

use crate::session::Session;

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Session>,
}

impl FromRef<AppState> for Arc<Session> {
    fn from_ref(state: &AppState) -> Self {
        state.session.clone()
    }
}
