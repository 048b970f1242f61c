// src/store/mod.rs

pub mod consent;
pub mod jobs;
pub mod kv;
pub mod notifications;
pub mod scope;

pub use kv::{FileStore, KeyValueStore, MemoryStore};

/// Prefix shared by every persisted key.
pub const KEY_PREFIX: &str = "studyhub";
