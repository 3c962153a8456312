use crate::config::SpeechSettings;
use crate::host::SpeechEngine;

const FALLBACK_LOCALE: &str = "en-US";

#[derive(Clone, Debug, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub locale: &'static str,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

/// Maps a short language code to the locale tag handed to the synthesizer.
pub fn locale_for(lang: &str) -> &'static str {
    match lang {
        "uz" => "uz-UZ",
        "en" => "en-US",
        "ru" => "ru-RU",
        "tr" => "tr-TR",
        "ar" => "ar-SA",
        "fr" => "fr-FR",
        "auto" => "en-US",
        _ => FALLBACK_LOCALE,
    }
}

/// Stops whatever is playing and reads `text` aloud.
/// Returns false when the host has no speech synthesis.
pub fn speak<S: SpeechEngine>(
    engine: &S,
    text: &str,
    lang: &str,
    settings: &SpeechSettings,
) -> bool {
    if !engine.is_available() {
        log::warn!("speech synthesis is not supported on this page");
        return false;
    }

    engine.cancel();
    let utterance = Utterance {
        text: text.to_string(),
        locale: locale_for(lang),
        rate: settings.rate,
        pitch: settings.pitch,
        volume: settings.volume,
    };
    log::debug!("speaking {} chars as {}", text.chars().count(), utterance.locale);
    engine.speak(&utterance);
    true
}
