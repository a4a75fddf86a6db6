//! Preference store — the persisted `enabled` flag and master volume.

use serde::{Deserialize, Serialize};

use crate::storage::KeyValueStore;

/// Storage keys and defaults for the preference store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreferenceConfig {
    /// Key holding `"true"` / `"false"`.
    pub enabled_key: String,
    /// Key holding the volume as a decimal string.
    pub volume_key: String,
    pub default_enabled: bool,
    pub default_volume: f64,
}

impl Default for PreferenceConfig {
    fn default() -> Self {
        Self {
            enabled_key: "soundsEnabled".to_string(),
            volume_key: "soundVolume".to_string(),
            default_enabled: true,
            default_volume: 0.3,
        }
    }
}

/// Clamp a volume into `[0, 1]`. NaN maps to silence.
pub fn clamp_volume(volume: f64) -> f64 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

/// Holds `enabled` and `volume`, persisting both on every mutation.
///
/// Persistence is best-effort: a failed write is logged and the
/// in-memory value still changes for the session.
pub struct Preferences {
    config: PreferenceConfig,
    store: Box<dyn KeyValueStore>,
    enabled: bool,
    volume: f64,
}

impl Preferences {
    /// Load preferences from `store` using the default keys.
    pub fn load(store: impl KeyValueStore + 'static) -> Self {
        Self::with_config(store, PreferenceConfig::default())
    }

    pub fn with_config(store: impl KeyValueStore + 'static, config: PreferenceConfig) -> Self {
        let mut prefs = Preferences {
            enabled: config.default_enabled,
            volume: clamp_volume(config.default_volume),
            config,
            store: Box::new(store),
        };
        prefs.reload();
        prefs
    }

    /// Re-read both values from storage, falling back to the defaults.
    pub fn reload(&mut self) {
        self.enabled = match self.store.get(&self.config.enabled_key) {
            // Anything but the literal "false" counts as enabled.
            Some(v) => v != "false",
            None => self.config.default_enabled,
        };

        self.volume = match self.store.get(&self.config.volume_key) {
            Some(v) => match v.trim().parse::<f64>() {
                Ok(vol) if !vol.is_nan() => clamp_volume(vol),
                _ => {
                    tracing::warn!(key = %self.config.volume_key, value = %v, "ignoring unparsable volume");
                    clamp_volume(self.config.default_volume)
                }
            },
            None => clamp_volume(self.config.default_volume),
        };
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.persist(&self.config.enabled_key, if enabled { "true" } else { "false" });
    }

    /// Store `volume` clamped to `[0, 1]`.
    pub fn set_volume(&mut self, volume: f64) {
        self.volume = clamp_volume(volume);
        self.persist(&self.config.volume_key, &self.volume.to_string());
    }

    /// Flip `enabled` and return the new value.
    pub fn toggle_enabled(&mut self) -> bool {
        self.set_enabled(!self.enabled);
        self.enabled
    }

    fn persist(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            tracing::warn!(key, error = %e, "preference not persisted");
        }
    }
}

impl std::fmt::Debug for Preferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preferences")
            .field("enabled", &self.enabled)
            .field("volume", &self.volume)
            .finish_non_exhaustive()
    }
}
