// src/store/scope.rs

use std::sync::Arc;

use crate::store::{jobs::JobList, kv::KeyValueStore, notifications::NotificationStore};

/// Everything owned by the current identity.
///
/// Notifications and tracked jobs are swapped together, under one lock, so
/// no reader ever sees one user's jobs next to another user's notifications.
pub struct UserScope {
    user_id: Option<i64>,
    /// Bumped on every identity switch. Work started against an older
    /// generation is discarded instead of applied.
    generation: u64,
    pub notifications: NotificationStore,
    pub jobs: JobList,
}

impl UserScope {
    pub fn anonymous(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            user_id: None,
            generation: 0,
            notifications: NotificationStore::anonymous(kv.clone()),
            jobs: JobList::anonymous(kv),
        }
    }

    pub fn user_id(&self) -> Option<i64> {
        self.user_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Discards in-memory state and re-hydrates from `user_id`'s persisted slice.
    pub fn switch_to(&mut self, kv: Arc<dyn KeyValueStore>, user_id: Option<i64>) {
        let (notifications, jobs) = match user_id {
            Some(id) => (
                NotificationStore::hydrate(kv.clone(), id),
                JobList::hydrate(kv, id),
            ),
            None => (
                NotificationStore::anonymous(kv.clone()),
                JobList::anonymous(kv),
            ),
        };

        self.user_id = user_id;
        self.generation += 1;
        self.notifications = notifications;
        self.jobs = jobs;
    }
}
