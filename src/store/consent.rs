// src/store/consent.rs

use std::sync::Arc;

use crate::{
    models::consent::{ConsentPreferences, ConsentResponse, ConsentUpdate},
    store::{
        KEY_PREFIX,
        kv::{KeyValueStore, load_json, save_json},
    },
};

/// Browser-wide key; consent survives logins and logouts.
pub fn consent_key() -> String {
    format!("{}:cookie-consent", KEY_PREFIX)
}

/// Cookie consent flags gating the analytics and marketing scripts.
pub struct ConsentStore {
    kv: Arc<dyn KeyValueStore>,
    consent: Option<ConsentPreferences>,
    loaded: bool,
}

impl ConsentStore {
    /// An unloaded store. The banner stays hidden until [`ConsentStore::load`] runs.
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            consent: None,
            loaded: false,
        }
    }

    /// Reads the persisted record. A corrupt record counts as "no choice yet".
    pub fn load(&mut self) {
        self.consent = load_json::<ConsentPreferences>(self.kv.as_ref(), &consent_key()).map(
            |mut preferences| {
                preferences.necessary = true;
                preferences
            },
        );
        self.loaded = true;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn preferences(&self) -> Option<ConsentPreferences> {
        self.consent
    }

    pub fn banner_visible(&self) -> bool {
        self.is_loaded() && self.consent.is_none()
    }

    pub fn analytics_enabled(&self) -> bool {
        self.consent.is_some_and(|c| c.analytics)
    }

    pub fn marketing_enabled(&self) -> bool {
        self.consent.is_some_and(|c| c.marketing)
    }

    pub fn accept_all(&mut self) -> ConsentPreferences {
        self.save(ConsentPreferences {
            necessary: true,
            analytics: true,
            marketing: true,
        })
    }

    pub fn reject_non_essential(&mut self) -> ConsentPreferences {
        self.save(ConsentPreferences::default())
    }

    /// Applies `update` onto the default baseline, not onto the previous choice:
    /// a flag left out of `update` goes back to `false`.
    pub fn update(&mut self, update: ConsentUpdate) -> ConsentPreferences {
        let baseline = ConsentPreferences::default();
        self.save(ConsentPreferences {
            necessary: true,
            analytics: update.analytics.unwrap_or(baseline.analytics),
            marketing: update.marketing.unwrap_or(baseline.marketing),
        })
    }

    pub fn snapshot(&self) -> ConsentResponse {
        ConsentResponse {
            preferences: self.consent,
            banner_visible: self.banner_visible(),
            analytics_enabled: self.analytics_enabled(),
            marketing_enabled: self.marketing_enabled(),
        }
    }

    fn save(&mut self, preferences: ConsentPreferences) -> ConsentPreferences {
        save_json(self.kv.as_ref(), &consent_key(), &preferences);
        self.consent = Some(preferences);
        self.loaded = true;
        preferences
    }
}
