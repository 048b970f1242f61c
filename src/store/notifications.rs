// src/store/notifications.rs

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    models::notification::{AppNotification, NewNotification, NotificationType},
    store::{
        KEY_PREFIX,
        kv::{KeyValueStore, load_json, remove_key, save_json},
    },
};

/// Maximum number of notifications kept per user, newest first.
pub const NOTIFICATION_HISTORY_CAP: usize = 30;

pub fn notifications_key(user_id: i64) -> String {
    format!("{}:notifications:{}", KEY_PREFIX, user_id)
}

impl NewNotification {
    pub fn new(
        notification_type: NotificationType,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: description.into(),
            notification_type,
            created_at: None,
            read: false,
            href: None,
            meta: BTreeMap::new(),
        }
    }

    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    pub fn with_meta(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.meta.insert(key.to_string(), value.into());
        self
    }
}

/// Capped, ordered notification list of one identity.
///
/// Every mutation is written through to the identity's blob. The anonymous
/// store has no key and is never persisted.
pub struct NotificationStore {
    kv: Arc<dyn KeyValueStore>,
    key: Option<String>,
    items: Vec<AppNotification>,
}

impl NotificationStore {
    pub fn anonymous(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            key: None,
            items: Vec::new(),
        }
    }

    /// Loads `user_id`'s persisted notifications, or starts empty.
    pub fn hydrate(kv: Arc<dyn KeyValueStore>, user_id: i64) -> Self {
        let key = notifications_key(user_id);
        let mut items: Vec<AppNotification> = load_json(kv.as_ref(), &key).unwrap_or_default();
        items.truncate(NOTIFICATION_HISTORY_CAP);
        Self {
            kv,
            key: Some(key),
            items,
        }
    }

    /// Notifications, newest first.
    pub fn list(&self) -> &[AppNotification] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.read).count()
    }

    /// Prepends a notification and evicts the oldest beyond the cap.
    ///
    /// A caller-supplied id that already exists replaces the older entry.
    pub fn add(&mut self, payload: NewNotification) -> AppNotification {
        let notification = AppNotification {
            id: payload.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            title: payload.title,
            description: payload.description,
            notification_type: payload.notification_type,
            created_at: payload.created_at.unwrap_or_else(Utc::now),
            read: payload.read,
            href: payload.href,
            meta: payload.meta,
        };

        self.items.retain(|n| n.id != notification.id);
        self.items.insert(0, notification.clone());
        self.items.truncate(NOTIFICATION_HISTORY_CAP);
        self.persist();

        notification
    }

    /// Returns `false` when no notification has that id.
    pub fn mark_as_read(&mut self, id: &str) -> bool {
        let Some(notification) = self.items.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        notification.read = true;
        self.persist();
        true
    }

    pub fn mark_all_as_read(&mut self) {
        for notification in &mut self.items {
            notification.read = true;
        }
        self.persist();
    }

    /// Returns `false` when no notification has that id.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        if self.items.len() == before {
            return false;
        }
        self.persist();
        true
    }

    pub fn clear_all(&mut self) {
        self.items.clear();
        if let Some(key) = &self.key {
            remove_key(self.kv.as_ref(), key);
        }
    }

    fn persist(&self) {
        if let Some(key) = &self.key {
            save_json(self.kv.as_ref(), key, &self.items);
        }
    }
}
