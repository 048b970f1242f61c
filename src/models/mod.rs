// src/models/mod.rs

pub mod consent;
pub mod job;
pub mod notification;
pub mod question;
pub mod user;
