// src/services/cache.rs

use serde::Serialize;
use tokio::sync::broadcast;

use crate::models::job::TrackedJob;

/// Logical cache entries the front ends hold for a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum CacheScope {
    /// The generated-content record a job was started from.
    GeneratedContent { project_id: i64, content_id: i64 },
    ProjectSummary { project_id: i64 },
    ProjectContents { project_id: i64 },
}

impl CacheScope {
    /// Scopes made stale by a completed generation job.
    pub fn for_completed_job(job: &TrackedJob) -> [CacheScope; 3] {
        [
            CacheScope::GeneratedContent {
                project_id: job.project_id,
                content_id: job.content_id,
            },
            CacheScope::ProjectSummary {
                project_id: job.project_id,
            },
            CacheScope::ProjectContents {
                project_id: job.project_id,
            },
        ]
    }
}

/// Fan-out of cache-invalidation signals to any number of listeners.
#[derive(Debug, Clone)]
pub struct CacheInvalidator {
    tx: broadcast::Sender<CacheScope>,
}

impl CacheInvalidator {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheScope> {
        self.tx.subscribe()
    }

    /// Having no listeners is fine; the signal is simply dropped.
    pub fn invalidate(&self, scope: CacheScope) {
        tracing::debug!("Invalidating cache scope {:?}", scope);
        let _ = self.tx.send(scope);
    }

    pub fn invalidate_completed_job(&self, job: &TrackedJob) {
        for scope in CacheScope::for_completed_job(job) {
            self.invalidate(scope);
        }
    }
}

impl Default for CacheInvalidator {
    fn default() -> Self {
        Self::new(64)
    }
}
