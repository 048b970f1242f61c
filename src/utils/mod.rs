// src/utils/mod.rs

pub mod answer_key;
pub mod identity;
