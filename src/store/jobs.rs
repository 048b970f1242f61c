// src/store/jobs.rs

use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    models::job::TrackedJob,
    store::{
        KEY_PREFIX,
        kv::{KeyValueStore, load_json, save_json},
    },
};

/// Maximum number of in-flight jobs tracked per user.
pub const JOB_HISTORY_CAP: usize = 25;

pub fn tracked_jobs_key(user_id: i64) -> String {
    format!("{}:tracked-jobs:{}", KEY_PREFIX, user_id)
}

/// Persisted list of pending generation jobs, most recently registered first.
pub struct JobList {
    kv: Arc<dyn KeyValueStore>,
    key: Option<String>,
    jobs: Vec<TrackedJob>,
}

impl JobList {
    pub fn anonymous(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            key: None,
            jobs: Vec::new(),
        }
    }

    /// Loads `user_id`'s pending jobs so polling resumes after a restart.
    pub fn hydrate(kv: Arc<dyn KeyValueStore>, user_id: i64) -> Self {
        let key = tracked_jobs_key(user_id);
        let mut jobs: Vec<TrackedJob> = load_json(kv.as_ref(), &key).unwrap_or_default();
        let mut seen = HashSet::new();
        jobs.retain(|job| seen.insert(job.job_id.clone()));
        jobs.truncate(JOB_HISTORY_CAP);
        Self {
            kv,
            key: Some(key),
            jobs,
        }
    }

    pub fn jobs(&self) -> &[TrackedJob] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn contains(&self, job_id: &str) -> bool {
        self.jobs.iter().any(|job| job.job_id == job_id)
    }

    /// Inserts at the front, replacing any entry with the same id, then trims to the cap.
    pub fn register(&mut self, job: TrackedJob) {
        self.jobs.retain(|existing| existing.job_id != job.job_id);
        self.jobs.insert(0, job);
        self.jobs.truncate(JOB_HISTORY_CAP);
        self.persist();
    }

    /// Drops every job in `job_ids` in one update. Returns how many were removed.
    pub fn remove_all(&mut self, job_ids: &HashSet<String>) -> usize {
        let before = self.jobs.len();
        self.jobs.retain(|job| !job_ids.contains(&job.job_id));
        let removed = before - self.jobs.len();
        if removed > 0 {
            self.persist();
        }
        removed
    }

    fn persist(&self) {
        if let Some(key) = &self.key {
            save_json(self.kv.as_ref(), key, &self.jobs);
        }
    }
}
