use crate::host::PreferenceStore;

pub const TARGET_LANG_KEY: &str = "targetLang";

/// The user's target language, stored under `targetLang`.
pub struct Preferences<S> {
    store: S,
    default_target: String,
}

impl<S: PreferenceStore> Preferences<S> {
    pub fn new(store: S, default_target: impl Into<String>) -> Self {
        Self {
            store,
            default_target: default_target.into(),
        }
    }

    pub fn target_lang(&self) -> String {
        self.store
            .get(TARGET_LANG_KEY)
            .filter(|lang| !lang.trim().is_empty())
            .unwrap_or_else(|| self.default_target.clone())
    }

    pub fn set_target_lang(&self, lang: &str) -> Result<(), String> {
        let lang = lang.trim();
        if lang.is_empty() {
            return Err("target language must not be empty".to_string());
        }
        self.store.set(TARGET_LANG_KEY, lang)
    }

    /// Writes the default once, on first load. Returns the language in effect.
    pub fn ensure_default(&self) -> String {
        if let Some(existing) = self.store.get(TARGET_LANG_KEY) {
            if !existing.trim().is_empty() {
                return existing;
            }
        }
        if let Err(e) = self.store.set(TARGET_LANG_KEY, &self.default_target) {
            log::warn!("could not store default target language: {}", e);
        }
        self.default_target.clone()
    }
}
