// tests/store_tests.rs

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use studyhub::models::consent::{ConsentPreferences, ConsentUpdate};
use studyhub::models::job::{JobType, TrackedJob};
use studyhub::models::notification::{NewNotification, NotificationType};
use studyhub::store::consent::{ConsentStore, consent_key};
use studyhub::store::jobs::{JOB_HISTORY_CAP, JobList, tracked_jobs_key};
use studyhub::store::notifications::{
    NOTIFICATION_HISTORY_CAP, NotificationStore, notifications_key,
};
use studyhub::store::scope::UserScope;
use studyhub::store::{FileStore, KeyValueStore, MemoryStore};

fn memory() -> Arc<dyn KeyValueStore> {
    Arc::new(MemoryStore::new())
}

fn info(title: &str) -> NewNotification {
    NewNotification::new(NotificationType::Info, title, "body")
}

fn job(job_id: &str, content_name: &str) -> TrackedJob {
    TrackedJob {
        job_id: job_id.to_string(),
        project_id: 7,
        content_id: 11,
        content_name: content_name.to_string(),
        job_type: JobType::Quiz,
        created_at: Utc::now(),
    }
}

#[test]
fn add_notification_fills_defaults_and_prepends() {
    let mut store = NotificationStore::hydrate(memory(), 1);

    let first = store.add(info("first"));
    let second = store.add(info("second"));

    assert!(!first.id.is_empty());
    assert_ne!(first.id, second.id);
    assert!(!first.read);
    assert_eq!(store.list()[0].title, "second");
    assert_eq!(store.list()[1].title, "first");
    assert_eq!(store.unread_count(), 2);
}

#[test]
fn caller_supplied_id_is_kept() {
    let mut store = NotificationStore::hydrate(memory(), 1);
    let mut payload = info("custom");
    payload.id = Some("job-42".to_string());

    let added = store.add(payload);
    assert_eq!(added.id, "job-42");
    assert!(store.mark_as_read("job-42"));
}

#[test]
fn thirty_first_notification_evicts_the_oldest() {
    let mut store = NotificationStore::hydrate(memory(), 1);
    for i in 0..=NOTIFICATION_HISTORY_CAP {
        store.add(info(&format!("n{}", i)));
    }

    assert_eq!(store.len(), NOTIFICATION_HISTORY_CAP);
    assert_eq!(store.list()[0].title, format!("n{}", NOTIFICATION_HISTORY_CAP));
    assert!(store.list().iter().all(|n| n.title != "n0"));
}

#[test]
fn read_state_transitions() {
    let mut store = NotificationStore::hydrate(memory(), 1);
    let a = store.add(info("a"));
    store.add(info("b"));

    assert!(store.mark_as_read(&a.id));
    assert_eq!(store.unread_count(), 1);
    assert!(!store.mark_as_read("missing"));

    store.mark_all_as_read();
    assert_eq!(store.unread_count(), 0);

    assert!(store.remove(&a.id));
    assert!(!store.remove(&a.id));
    assert_eq!(store.len(), 1);

    store.clear_all();
    assert!(store.is_empty());
}

#[test]
fn notifications_persist_per_user() {
    let kv = memory();
    {
        let mut store = NotificationStore::hydrate(kv.clone(), 1);
        store.add(info("for user 1"));
    }

    let reloaded = NotificationStore::hydrate(kv.clone(), 1);
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded.list()[0].title, "for user 1");

    let other = NotificationStore::hydrate(kv.clone(), 2);
    assert!(other.is_empty());
    assert!(kv.get(&notifications_key(2)).unwrap().is_none());
}

#[test]
fn anonymous_store_is_never_persisted() {
    let kv = Arc::new(MemoryStore::new());
    let mut store = NotificationStore::anonymous(kv.clone());
    store.add(info("ghost"));

    assert_eq!(store.len(), 1);
    assert!(kv.get(&notifications_key(0)).unwrap().is_none());
}

#[test]
fn corrupt_blob_resets_to_empty() {
    let kv = memory();
    kv.set(&notifications_key(1), "{not json").unwrap();
    kv.set(&tracked_jobs_key(1), "[1, 2").unwrap();
    kv.set(&consent_key(), "\"yes\"").unwrap();

    assert!(NotificationStore::hydrate(kv.clone(), 1).is_empty());
    assert!(JobList::hydrate(kv.clone(), 1).is_empty());

    let mut consent = ConsentStore::new(kv.clone());
    consent.load();
    assert!(consent.preferences().is_none());
    assert!(consent.banner_visible());
}

#[test]
fn re_registering_a_job_replaces_and_moves_it_first() {
    let mut jobs = JobList::hydrate(memory(), 1);
    jobs.register(job("a", "Chapter 1"));
    jobs.register(job("b", "Chapter 2"));
    jobs.register(job("a", "Chapter 1 (renamed)"));

    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs.jobs()[0].job_id, "a");
    assert_eq!(jobs.jobs()[0].content_name, "Chapter 1 (renamed)");
    assert_eq!(jobs.jobs()[1].job_id, "b");
}

#[test]
fn job_list_is_capped_on_insert() {
    let mut jobs = JobList::hydrate(memory(), 1);
    for i in 0..(JOB_HISTORY_CAP + 3) {
        jobs.register(job(&format!("job-{}", i), "c"));
    }

    assert_eq!(jobs.len(), JOB_HISTORY_CAP);
    assert!(!jobs.contains("job-0"));
    assert!(!jobs.contains("job-2"));
    assert!(jobs.contains("job-3"));
}

#[test]
fn remove_all_drops_matching_ids_and_persists() {
    let kv = memory();
    let mut jobs = JobList::hydrate(kv.clone(), 1);
    jobs.register(job("a", "c"));
    jobs.register(job("b", "c"));
    jobs.register(job("c", "c"));

    let finished: HashSet<String> = ["a".to_string(), "c".to_string()].into();
    assert_eq!(jobs.remove_all(&finished), 2);

    let reloaded = JobList::hydrate(kv, 1);
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded.jobs()[0].job_id, "b");
}

#[test]
fn consent_banner_visibility() {
    let kv = memory();
    let mut consent = ConsentStore::new(kv.clone());

    // Not loaded yet: banner hidden
    assert!(!consent.banner_visible());

    consent.load();
    assert!(consent.banner_visible());
    assert!(!consent.analytics_enabled());

    consent.accept_all();
    assert!(!consent.banner_visible());
    assert!(consent.analytics_enabled());
    assert!(consent.marketing_enabled());

    let mut reloaded = ConsentStore::new(kv);
    reloaded.load();
    assert!(!reloaded.banner_visible());
    assert!(reloaded.analytics_enabled());
}

#[test]
fn update_consent_merges_onto_defaults_not_previous_value() {
    let mut consent = ConsentStore::new(memory());
    consent.load();
    consent.accept_all();

    let updated = consent.update(ConsentUpdate {
        analytics: Some(true),
        marketing: None,
    });

    assert_eq!(
        updated,
        ConsentPreferences {
            necessary: true,
            analytics: true,
            marketing: false,
        }
    );
}

#[test]
fn reject_non_essential_keeps_necessary() {
    let mut consent = ConsentStore::new(memory());
    consent.load();

    let prefs = consent.reject_non_essential();
    assert!(prefs.necessary);
    assert!(!prefs.analytics);
    assert!(!prefs.marketing);
    assert!(!consent.banner_visible());
}

#[test]
fn persisted_consent_cannot_disable_necessary() {
    let kv = memory();
    kv.set(
        &consent_key(),
        r#"{"necessary": false, "analytics": true, "marketing": false}"#,
    )
    .unwrap();

    let mut consent = ConsentStore::new(kv);
    consent.load();
    let prefs = consent.preferences().unwrap();
    assert!(prefs.necessary);
    assert!(prefs.analytics);
}

#[test]
fn switching_scope_never_leaks_previous_user() {
    let kv = memory();
    let mut scope = UserScope::anonymous(kv.clone());

    scope.switch_to(kv.clone(), Some(1));
    scope.notifications.add(info("alice only"));
    scope.jobs.register(job("alice-job", "c"));
    let generation = scope.generation();

    scope.switch_to(kv.clone(), Some(2));
    assert_eq!(scope.user_id(), Some(2));
    assert!(scope.generation() > generation);
    assert!(scope.notifications.is_empty());
    assert!(scope.jobs.is_empty());
    scope.notifications.add(info("bob only"));

    scope.switch_to(kv.clone(), Some(1));
    assert_eq!(scope.notifications.len(), 1);
    assert_eq!(scope.notifications.list()[0].title, "alice only");
    assert!(scope.jobs.contains("alice-job"));

    scope.switch_to(kv, None);
    assert!(scope.notifications.is_empty());
    assert!(scope.jobs.is_empty());
}

#[test]
fn file_store_round_trips_and_handles_missing_keys() {
    let dir = tempfile::tempdir().unwrap();
    let kv = FileStore::open(dir.path().join("state")).unwrap();

    assert!(kv.get("studyhub:notifications:1").unwrap().is_none());

    kv.set("studyhub:notifications:1", "[]").unwrap();
    assert_eq!(kv.get("studyhub:notifications:1").unwrap().as_deref(), Some("[]"));

    kv.remove("studyhub:notifications:1").unwrap();
    kv.remove("studyhub:notifications:1").unwrap();
    assert!(kv.get("studyhub:notifications:1").unwrap().is_none());
}

#[test]
fn file_store_backs_notification_store() {
    let dir = tempfile::tempdir().unwrap();
    let kv: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(dir.path()).unwrap());

    {
        let mut store = NotificationStore::hydrate(kv.clone(), 5);
        store.add(info("on disk"));
    }

    let reloaded = NotificationStore::hydrate(kv, 5);
    assert_eq!(reloaded.list()[0].title, "on disk");
}
