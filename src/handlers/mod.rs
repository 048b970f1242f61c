// src/handlers/mod.rs

pub mod auth;
pub mod consent;
pub mod jobs;
pub mod notifications;
pub mod quiz;
