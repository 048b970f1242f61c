// src/services/mod.rs

pub mod backend;
pub mod cache;
pub mod job_tracker;
