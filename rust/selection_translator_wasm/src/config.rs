// Runtime settings for the content script.
// Every field has a default so the host page can pass a partial object (or nothing).

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid settings object: {0}")]
    Object(String),
    #[error("{field} must be {expected}")]
    Invalid {
        field: &'static str,
        expected: &'static str,
    },
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub endpoint: String,
    pub debounce_ms: u64,
    pub min_chars: usize,
    pub max_chars: usize,
    pub cache_capacity: usize,
    pub min_request_interval_ms: u64,
    pub rate_limit_cooldown_ms: u64,
    pub scroll_settle_ms: u64,
    pub outside_click_delay_ms: u64,
    pub default_target_lang: String,
    pub detect_target_lang: String,
    pub detect_max_chars: usize,
    pub original_preview_chars: usize,
    pub speech: SpeechSettings,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            debounce_ms: 300,
            min_chars: 2,
            max_chars: 500,
            cache_capacity: 100,
            min_request_interval_ms: 1000,
            rate_limit_cooldown_ms: 2000,
            scroll_settle_ms: 100,
            outside_click_delay_ms: 100,
            default_target_lang: "uz".to_string(),
            detect_target_lang: "en".to_string(),
            detect_max_chars: 100,
            original_preview_chars: 50,
            speech: SpeechSettings::default(),
        }
    }
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            rate: 0.9,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.cache_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "cacheCapacity",
                expected: "greater than zero",
            });
        }
        if self.min_chars > self.max_chars {
            return Err(ConfigError::Invalid {
                field: "minChars",
                expected: "not greater than maxChars",
            });
        }
        if self.default_target_lang.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "defaultTargetLang",
                expected: "a non-empty language code",
            });
        }
        Ok(self)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn min_request_interval(&self) -> Duration {
        Duration::from_millis(self.min_request_interval_ms)
    }

    pub fn rate_limit_cooldown(&self) -> Duration {
        Duration::from_millis(self.rate_limit_cooldown_ms)
    }

    pub fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.scroll_settle_ms)
    }

    pub fn outside_click_delay(&self) -> Duration {
        Duration::from_millis(self.outside_click_delay_ms)
    }
}

#[cfg(target_arch = "wasm32")]
impl Settings {
    pub fn from_js(value: wasm_bindgen::JsValue) -> Result<Self, ConfigError> {
        if value.is_undefined() || value.is_null() {
            return Ok(Self::default());
        }
        let settings: Settings = serde_wasm_bindgen::from_value(value)
            .map_err(|e| ConfigError::Object(e.to_string()))?;
        settings.validate()
    }
}
