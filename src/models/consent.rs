// src/models/consent.rs

use serde::{Deserialize, Serialize};

/// Cookie consent record persisted once per browser.
///
/// `necessary` is always `true`; it is kept in the record so the persisted
/// shape matches what the front ends read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentPreferences {
    #[serde(default = "always_true")]
    pub necessary: bool,
    #[serde(default)]
    pub analytics: bool,
    #[serde(default)]
    pub marketing: bool,
}

fn always_true() -> bool {
    true
}

impl Default for ConsentPreferences {
    /// Baseline that `updateConsent` merges onto: only necessary cookies.
    fn default() -> Self {
        Self {
            necessary: true,
            analytics: false,
            marketing: false,
        }
    }
}

/// DTO for a partial consent update. Omitted flags reset to `false`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ConsentUpdate {
    pub analytics: Option<bool>,
    pub marketing: Option<bool>,
}

/// Consent state as exposed to the UI.
#[derive(Debug, Serialize)]
pub struct ConsentResponse {
    pub preferences: Option<ConsentPreferences>,
    pub banner_visible: bool,
    pub analytics_enabled: bool,
    pub marketing_enabled: bool,
}
