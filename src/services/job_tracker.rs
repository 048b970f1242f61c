// src/services/job_tracker.rs

//! Background reconciliation of pending generation jobs.
//!
//! Jobs are polled together on a fixed period while at least one is tracked.
//! A terminal status removes the job; completions become notifications and
//! cache-invalidation signals, failures are dropped silently.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

use crate::{
    error::AppError,
    models::{
        job::{JobResult, JobStatus, JobType, TrackedJob},
        notification::{AppNotification, NewNotification, NotificationType},
    },
    services::{backend::BackendApi, cache::CacheInvalidator},
    store::scope::UserScope,
};

/// What one poll tick changed.
#[derive(Debug, Default)]
pub struct PollOutcome {
    pub completed: Vec<String>,
    pub failed: Vec<String>,
    pub notifications: Vec<AppNotification>,
}

impl PollOutcome {
    pub fn is_empty(&self) -> bool {
        self.completed.is_empty() && self.failed.is_empty()
    }
}

/// Tracks the current identity's pending jobs and owns the poll loop.
///
/// Cloning is cheap; clones share the same scope, poller and channel.
#[derive(Clone)]
pub struct JobTracker {
    scope: Arc<RwLock<UserScope>>,
    backend: Arc<dyn BackendApi>,
    cache: CacheInvalidator,
    poll_interval: Duration,
    /// At most one poll task per tracker; `None` while idle.
    poller: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl JobTracker {
    pub fn new(
        scope: Arc<RwLock<UserScope>>,
        backend: Arc<dyn BackendApi>,
        cache: CacheInvalidator,
        poll_interval: Duration,
    ) -> Self {
        Self {
            scope,
            backend,
            cache,
            poll_interval,
            poller: Arc::new(Mutex::new(None)),
        }
    }

    pub fn cache(&self) -> &CacheInvalidator {
        &self.cache
    }

    /// Starts tracking `job`. Re-registering an id replaces the entry and moves it to the front.
    ///
    /// Fails with `AuthError` while the scope is anonymous.
    pub async fn register_job(&self, job: TrackedJob) -> Result<(), AppError> {
        {
            let mut scope = self.scope.write().await;
            if scope.user_id().is_none() {
                return Err(AppError::AuthError("Login required to track jobs".to_string()));
            }
            info!(
                "Tracking {:?} job {} for content {} (project {})",
                job.job_type, job.job_id, job.content_id, job.project_id
            );
            scope.jobs.register(job);
        }
        self.ensure_polling().await;
        Ok(())
    }

    pub async fn tracked_jobs(&self) -> Vec<TrackedJob> {
        self.scope.read().await.jobs.jobs().to_vec()
    }

    pub async fn tracked_count(&self) -> usize {
        self.scope.read().await.jobs.len()
    }

    pub async fn is_polling(&self) -> bool {
        self.poller
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Starts the poll task if jobs are tracked and no task is running.
    pub async fn ensure_polling(&self) {
        let mut poller = self.poller.lock().await;
        if poller.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }
        if self.scope.read().await.jobs.is_empty() {
            *poller = None;
            return;
        }
        debug!("Starting job poller (every {:?})", self.poll_interval);
        *poller = Some(self.spawn_poller());
    }

    /// Stops the poll task. An in-flight tick is abandoned, not awaited.
    pub async fn stop_polling(&self) {
        if let Some(handle) = self.poller.lock().await.take() {
            debug!("Stopping job poller");
            handle.abort();
        }
    }

    /// Starts or stops the poll task to match the tracked list after an identity switch.
    pub async fn sync_polling(&self) {
        if self.scope.read().await.jobs.is_empty() {
            self.stop_polling().await;
        } else {
            self.ensure_polling().await;
        }
    }

    fn spawn_poller(&self) -> JoinHandle<()> {
        let tracker = self.clone();
        tokio::spawn(async move {
            let period = tracker.poll_interval;
            let mut timer = interval_at(Instant::now() + period, period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                timer.tick().await;

                if let Err(e) = tracker.poll_once().await {
                    warn!("Job poll failed, batch discarded: {}", e);
                }

                // Exit decision is taken under the poller lock so a concurrent
                // registration either sees this task alive or finds the slot empty.
                let mut poller = tracker.poller.lock().await;
                if tracker.scope.read().await.jobs.is_empty() {
                    debug!("No tracked jobs left, job poller going idle");
                    *poller = None;
                    break;
                }
            }
        })
    }

    /// Runs one reconciliation tick.
    ///
    /// All statuses are requested concurrently. If any request fails the whole
    /// batch is discarded and the error returned; every job stays tracked.
    /// Results are also discarded if the identity changed while requests were in flight.
    pub async fn poll_once(&self) -> Result<PollOutcome, AppError> {
        let (generation, snapshot) = {
            let scope = self.scope.read().await;
            (scope.generation(), scope.jobs.jobs().to_vec())
        };

        if snapshot.is_empty() {
            debug!("No tracked jobs, skipping poll tick");
            return Ok(PollOutcome::default());
        }

        debug!("Polling {} tracked job(s)", snapshot.len());
        let statuses = try_join_all(
            snapshot
                .iter()
                .map(|job| self.backend.job_status(&job.job_id)),
        )
        .await?;

        let mut completed: Vec<(TrackedJob, JobResult)> = Vec::new();
        let mut failed: Vec<TrackedJob> = Vec::new();
        for (job, response) in snapshot.into_iter().zip(statuses) {
            if !response.status.is_terminal() {
                continue;
            }
            match response.status {
                JobStatus::Completed => completed.push((job, response.result.unwrap_or_default())),
                _ => failed.push(job),
            }
        }

        if completed.is_empty() && failed.is_empty() {
            return Ok(PollOutcome::default());
        }

        let mut scope = self.scope.write().await;
        if scope.generation() != generation {
            debug!("Identity changed during poll tick, discarding results");
            return Ok(PollOutcome::default());
        }

        let finished: HashSet<String> = completed
            .iter()
            .map(|(job, _)| job.job_id.clone())
            .chain(failed.iter().map(|job| job.job_id.clone()))
            .collect();
        scope.jobs.remove_all(&finished);

        let mut notifications = Vec::new();
        for (job, result) in &completed {
            if let Some(payload) = completion_notification(job, result) {
                notifications.push(scope.notifications.add(payload));
            }
        }
        drop(scope);

        for (job, _) in &completed {
            info!("Job {} completed", job.job_id);
            self.cache.invalidate_completed_job(job);
        }
        for job in &failed {
            info!("Job {} failed", job.job_id);
        }

        Ok(PollOutcome {
            completed: completed.into_iter().map(|(job, _)| job.job_id).collect(),
            failed: failed.into_iter().map(|job| job.job_id).collect(),
            notifications,
        })
    }
}

/// Builds the "ready" notification for a completed job.
///
/// Returns `None` when the result carries no id matching the job's type.
pub fn completion_notification(job: &TrackedJob, result: &JobResult) -> Option<NewNotification> {
    let (notification_type, title, noun, href) = match job.job_type {
        JobType::Quiz => {
            let quiz_id = result.quiz_id?;
            (NotificationType::Quiz, "Quiz ready", "quiz", format!("/quizzes/{}", quiz_id))
        }
        JobType::Essay => {
            let essay_id = result.essay_id?;
            (
                NotificationType::Essay,
                "Essay questions ready",
                "essay questions",
                format!("/essays/{}", essay_id),
            )
        }
    };

    let description = match result.topic.as_deref().filter(|t| !t.trim().is_empty()) {
        Some(topic) => format!(
            "Your {} on \"{}\" from {} is ready.",
            noun, topic, job.content_name
        ),
        None => format!("Your {} from {} is ready.", noun, job.content_name),
    };

    Some(
        NewNotification::new(notification_type, title, description)
            .with_href(href)
            .with_meta("jobId", job.job_id.clone())
            .with_meta("contentId", job.content_id)
            .with_meta("projectId", job.project_id),
    )
}
