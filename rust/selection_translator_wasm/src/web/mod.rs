// Browser bindings: web-sys implementations of the host seams and the
// exported entry points the extension's content script calls.

mod dom;
mod listeners;

use crate::config::Settings;
use crate::error::TransportError;
use crate::host::{HttpResponse, HttpTransport, Platform, PreferenceStore, SpeechEngine, Timer};
use crate::preferences::Preferences;
use crate::speech::Utterance;
use std::sync::Once;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Request, RequestInit, RequestMode, Response, SpeechSynthesis, SpeechSynthesisUtterance, Storage,
};

pub use dom::WebPage;

fn not_running() -> JsValue {
    JsValue::from_str("translator is not running")
}

static LOGGER: Once = Once::new();

fn js_error(value: JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

pub struct WebHttp;

impl HttpTransport for WebHttp {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let window = web_sys::window().ok_or_else(|| TransportError("no window".to_string()))?;

        let mut opts = RequestInit::new();
        opts.method("GET");
        opts.mode(RequestMode::Cors);
        let request = Request::new_with_str_and_init(url, &opts)
            .map_err(|e| TransportError(js_error(e)))?;

        let value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| TransportError(js_error(e)))?;
        let response: Response = value
            .dyn_into()
            .map_err(|e| TransportError(js_error(e)))?;

        let status = response.status();
        let text_promise = response.text().map_err(|e| TransportError(js_error(e)))?;
        let text = JsFuture::from(text_promise)
            .await
            .map_err(|e| TransportError(js_error(e)))?
            .as_string()
            .unwrap_or_default();

        Ok(HttpResponse { status, text })
    }
}

pub struct WebTimer;

impl Timer for WebTimer {
    fn now(&self) -> Duration {
        Duration::from_millis(js_sys::Date::now() as u64)
    }

    async fn sleep(&self, duration: Duration) {
        let ms = duration.as_millis().min(i32::MAX as u128) as i32;
        let promise = js_sys::Promise::new(&mut |resolve, _reject| {
            let scheduled = web_sys::window().map(|window| {
                window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
            });
            if !matches!(scheduled, Some(Ok(_))) {
                let _ = resolve.call0(&JsValue::NULL);
            }
        });
        let _ = JsFuture::from(promise).await;
    }
}

pub struct LocalStore;

fn local_storage() -> Option<Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

impl PreferenceStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        local_storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        local_storage()
            .ok_or_else(|| "localStorage is not available".to_string())?
            .set_item(key, value)
            .map_err(js_error)
    }
}

pub struct WebSpeech;

fn synthesizer() -> Option<SpeechSynthesis> {
    let window = web_sys::window()?;
    // The getter does not fail when the property is missing, so probe first.
    if !js_sys::Reflect::has(&window, &JsValue::from_str("speechSynthesis")).unwrap_or(false) {
        return None;
    }
    window.speech_synthesis().ok()
}

impl SpeechEngine for WebSpeech {
    fn is_available(&self) -> bool {
        synthesizer().is_some()
    }

    fn cancel(&self) {
        if let Some(synth) = synthesizer() {
            synth.cancel();
        }
    }

    fn speak(&self, utterance: &Utterance) {
        let Some(synth) = synthesizer() else {
            return;
        };
        let speech = match SpeechSynthesisUtterance::new_with_text(&utterance.text) {
            Ok(speech) => speech,
            Err(e) => {
                log::warn!("could not create utterance: {}", js_error(e));
                return;
            }
        };
        speech.set_lang(utterance.locale);
        speech.set_rate(utterance.rate);
        speech.set_pitch(utterance.pitch);
        speech.set_volume(utterance.volume);
        synth.speak(&speech);
    }
}

pub struct WebPlatform;

impl Platform for WebPlatform {
    type Http = WebHttp;
    type Timer = WebTimer;
    type Store = LocalStore;
    type Speech = WebSpeech;
    type Page = WebPage;
}

fn init_logging() {
    LOGGER.call_once(|| {
        console_error_panic_hook::set_once();
        wasm_logger::init(wasm_logger::Config::default());
    });
}

/// Installs the selection translator on the current page.
/// `config` is an optional, possibly partial, settings object.
#[wasm_bindgen]
pub fn start(config: JsValue) -> Result<(), JsValue> {
    init_logging();
    let settings = Settings::from_js(config).unwrap_or_else(|e| {
        log::error!("{}; using default settings", e);
        Settings::default()
    });
    listeners::install(settings)
}

/// Removes listeners and the tooltip, and drops the instance.
#[wasm_bindgen]
pub fn stop() {
    listeners::uninstall();
}

/// Translates through the running instance, sharing its cache and limits.
/// Resolves to `undefined` when another translation is in flight.
#[wasm_bindgen]
pub async fn translate_text(text: String, target_lang: String) -> Result<JsValue, JsValue> {
    let component = listeners::component().ok_or_else(not_running)?;
    let translated = component
        .translator()
        .translate_for_display(&text, &target_lang)
        .await;
    Ok(translated.map(JsValue::from).unwrap_or(JsValue::UNDEFINED))
}

#[wasm_bindgen]
pub async fn detect_language(text: String) -> Result<String, JsValue> {
    let component = listeners::component().ok_or_else(not_running)?;
    Ok(component.translator().detect_language(&text).await)
}

#[wasm_bindgen]
pub fn speak(text: &str, lang: &str) -> bool {
    match listeners::component() {
        Some(component) => component.speak(text, lang),
        None => false,
    }
}

#[wasm_bindgen]
pub fn set_target_language(lang: &str) -> Result<(), JsValue> {
    let result = match listeners::component() {
        Some(component) => component.preferences().set_target_lang(lang),
        None => Preferences::new(LocalStore, Settings::default().default_target_lang)
            .set_target_lang(lang),
    };
    result.map_err(|e| JsValue::from_str(&e))
}
