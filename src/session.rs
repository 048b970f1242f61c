// src/session.rs

//! Composition root for one browser profile.
//!
//! Owns the authenticated identity and everything scoped to it. Login and
//! logout are the init/teardown boundary: the user scope is swapped in one
//! write-locked step, then the poller is started or stopped to match.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock, broadcast};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        consent::{ConsentPreferences, ConsentResponse, ConsentUpdate},
        job::{GenerateEssayRequest, GenerateQuizRequest, JobType, NewTrackedJob, TrackedJob},
        notification::{AppNotification, NewNotification, NotificationListResponse},
        user::{AuthSession, LoginRequest, RegisterRequest, UserProfile},
    },
    services::{
        backend::BackendApi,
        cache::{CacheInvalidator, CacheScope},
        job_tracker::JobTracker,
    },
    store::{
        KEY_PREFIX,
        consent::ConsentStore,
        kv::{KeyValueStore, load_json, remove_key, save_json},
        scope::UserScope,
    },
};

pub fn auth_key() -> String {
    format!("{}:auth", KEY_PREFIX)
}

pub struct Session {
    kv: Arc<dyn KeyValueStore>,
    backend: Arc<dyn BackendApi>,
    auth: RwLock<Option<AuthSession>>,
    scope: Arc<RwLock<UserScope>>,
    consent: Mutex<ConsentStore>,
    tracker: JobTracker,
}

impl Session {
    /// Builds an anonymous session. Call [`Session::restore`] to pick up a persisted login.
    pub fn new(
        kv: Arc<dyn KeyValueStore>,
        backend: Arc<dyn BackendApi>,
        poll_interval: Duration,
    ) -> Self {
        let scope = Arc::new(RwLock::new(UserScope::anonymous(kv.clone())));
        let tracker = JobTracker::new(
            scope.clone(),
            backend.clone(),
            CacheInvalidator::default(),
            poll_interval,
        );

        let mut consent = ConsentStore::new(kv.clone());
        consent.load();

        Self {
            kv,
            backend,
            auth: RwLock::new(None),
            scope,
            consent: Mutex::new(consent),
            tracker,
        }
    }

    pub fn tracker(&self) -> &JobTracker {
        &self.tracker
    }

    pub fn subscribe_invalidations(&self) -> broadcast::Receiver<CacheScope> {
        self.tracker.cache().subscribe()
    }

    /// Restores the persisted login, if any, and resumes polling its pending jobs.
    pub async fn restore(&self) -> Option<UserProfile> {
        let auth: AuthSession = load_json(self.kv.as_ref(), &auth_key())?;
        let user = auth.user.clone();
        tracing::info!("Restoring session for user {}", user.id);
        self.install(Some(auth)).await;
        Some(user)
    }

    pub async fn current_user(&self) -> Option<UserProfile> {
        self.auth.read().await.as_ref().map(|a| a.user.clone())
    }

    /// Authenticates against the backend. Failures propagate untouched.
    pub async fn login(&self, req: LoginRequest) -> Result<AuthSession, AppError> {
        req.validate()?;
        let auth = self.backend.login(&req).await?;
        save_json(self.kv.as_ref(), &auth_key(), &auth);
        self.install(Some(auth.clone())).await;
        Ok(auth)
    }

    /// Creates the account, then logs in with the same credentials.
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthSession, AppError> {
        req.validate()?;
        let profile = self.backend.register(&req).await?;
        tracing::info!("Registered user {} ({})", profile.username, profile.id);
        self.login(LoginRequest {
            username: req.username,
            password: req.password,
        })
        .await
    }

    pub async fn logout(&self) {
        remove_key(self.kv.as_ref(), &auth_key());
        self.install(None).await;
    }

    /// Swaps token, identity and user scope while holding the scope write lock,
    /// then starts or stops the poller to match the new scope.
    async fn install(&self, auth: Option<AuthSession>) {
        let user_id = auth.as_ref().map(|a| a.user.id);
        {
            let mut scope = self.scope.write().await;
            self.backend
                .set_token(auth.as_ref().map(|a| a.access_token.clone()));
            *self.auth.write().await = auth;
            tracing::info!("Switching identity {:?} -> {:?}", scope.user_id(), user_id);
            scope.switch_to(self.kv.clone(), user_id);
        }
        self.tracker.sync_polling().await;
    }

    // ---- notifications ----

    pub async fn notifications(&self) -> NotificationListResponse {
        let scope = self.scope.read().await;
        NotificationListResponse {
            notifications: scope.notifications.list().to_vec(),
            unread_count: scope.notifications.unread_count(),
        }
    }

    pub async fn unread_count(&self) -> usize {
        self.scope.read().await.notifications.unread_count()
    }

    pub async fn add_notification(&self, payload: NewNotification) -> AppNotification {
        self.scope.write().await.notifications.add(payload)
    }

    pub async fn mark_as_read(&self, id: &str) -> bool {
        self.scope.write().await.notifications.mark_as_read(id)
    }

    pub async fn mark_all_as_read(&self) {
        self.scope.write().await.notifications.mark_all_as_read();
    }

    pub async fn remove_notification(&self, id: &str) -> bool {
        self.scope.write().await.notifications.remove(id)
    }

    pub async fn clear_notifications(&self) {
        self.scope.write().await.notifications.clear_all();
    }

    // ---- jobs ----

    pub async fn register_job(&self, job: NewTrackedJob) -> Result<TrackedJob, AppError> {
        let job = job.into_tracked();
        self.tracker.register_job(job.clone()).await?;
        Ok(job)
    }

    async fn require_identity(&self) -> Result<(), AppError> {
        match self.scope.read().await.user_id() {
            Some(_) => Ok(()),
            None => Err(AppError::AuthError("Login required to track jobs".to_string())),
        }
    }

    /// Dispatches a quiz generation and tracks the returned job.
    pub async fn generate_quiz(&self, req: GenerateQuizRequest) -> Result<TrackedJob, AppError> {
        req.validate()?;
        self.require_identity().await?;
        let dispatched = self.backend.dispatch_quiz(&req).await?;
        self.register_job(NewTrackedJob {
            job_id: dispatched.job_id,
            project_id: req.project_id,
            content_id: req.content_id,
            content_name: req.content_name,
            job_type: JobType::Quiz,
        })
        .await
    }

    /// Dispatches an essay Q&A generation and tracks the returned job.
    pub async fn generate_essay(&self, req: GenerateEssayRequest) -> Result<TrackedJob, AppError> {
        req.validate()?;
        self.require_identity().await?;
        let dispatched = self.backend.dispatch_essay(&req).await?;
        self.register_job(NewTrackedJob {
            job_id: dispatched.job_id,
            project_id: req.project_id,
            content_id: req.content_id,
            content_name: req.content_name,
            job_type: JobType::Essay,
        })
        .await
    }

    // ---- consent ----

    pub async fn consent(&self) -> ConsentResponse {
        self.consent.lock().await.snapshot()
    }

    pub async fn accept_all_cookies(&self) -> ConsentPreferences {
        self.consent.lock().await.accept_all()
    }

    pub async fn reject_non_essential_cookies(&self) -> ConsentPreferences {
        self.consent.lock().await.reject_non_essential()
    }

    pub async fn update_consent(&self, update: ConsentUpdate) -> ConsentPreferences {
        self.consent.lock().await.update(update)
    }
}
