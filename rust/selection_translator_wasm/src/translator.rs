// Translation requests: one in flight at a time, cached, spaced out.

use crate::cache::TranslationCache;
use crate::config::Settings;
use crate::error::{display_text, TranslateError, NOT_FOUND_MESSAGE};
use crate::google::{parse_response, GoogleService};
use crate::host::{HttpTransport, Timer};
use crate::utils::truncate_chars;
use std::cell::{Cell, RefCell};
use std::time::Duration;

const TOO_MANY_REQUESTS: u16 = 429;

/// Holds the busy flag for the lifetime of one request, on every exit path.
struct InFlight<'a>(&'a Cell<bool>);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            return None;
        }
        Some(Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

pub struct Translator<H, T> {
    http: H,
    timer: T,
    google: GoogleService,
    cache: RefCell<TranslationCache>,
    busy: Cell<bool>,
    last_request: Cell<Option<Duration>>,
    min_interval: Duration,
    cooldown: Duration,
    detect_target: String,
    detect_max_chars: usize,
}

impl<H: HttpTransport, T: Timer> Translator<H, T> {
    pub fn new(http: H, timer: T, settings: &Settings) -> Self {
        Self {
            http,
            timer,
            google: GoogleService::new(settings.endpoint.clone()),
            cache: RefCell::new(TranslationCache::new(settings.cache_capacity)),
            busy: Cell::new(false),
            last_request: Cell::new(None),
            min_interval: settings.min_request_interval(),
            cooldown: settings.rate_limit_cooldown(),
            detect_target: settings.detect_target_lang.clone(),
            detect_max_chars: settings.detect_max_chars,
        }
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    pub fn cached_len(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn clear_cache(&self) {
        self.cache.borrow_mut().clear();
    }

    /// Translates `text` into `target_lang`.
    ///
    /// Returns `None` without touching the network when another translation
    /// is still in flight; the caller drops the request.
    pub async fn translate(
        &self,
        text: &str,
        target_lang: &str,
    ) -> Option<Result<String, TranslateError>> {
        let _guard = InFlight::acquire(&self.busy)?;

        let cached = self
            .cache
            .borrow()
            .get(text, target_lang)
            .map(str::to_string);
        if let Some(hit) = cached {
            log::debug!("cache hit for {:?} -> {}", text, target_lang);
            return Some(Ok(hit));
        }

        self.wait_for_slot().await;
        self.last_request.set(Some(self.timer.now()));

        let result = self.fetch(text, target_lang).await;
        if let Err(e) = &result {
            match e {
                TranslateError::RateLimited => {
                    log::warn!("translation limit reached, cooling down")
                }
                _ => log::error!("translation failed: {}", e),
            }
        }
        Some(result)
    }

    /// `translate` mapped to what the tooltip shows.
    pub async fn translate_for_display(&self, text: &str, target_lang: &str) -> Option<String> {
        self.translate(text, target_lang).await.map(display_text)
    }

    /// Best-effort source language of `text`; falls back to the detection
    /// target ("en") on any failure.
    pub async fn detect_language(&self, text: &str) -> String {
        let sample = truncate_chars(text, self.detect_max_chars);
        let url = self.google.request_url(sample, &self.detect_target);
        let detected = match self.http.get(&url).await {
            Ok(response) => parse_response(&response.text)
                .ok()
                .and_then(|parsed| parsed.detected_language),
            Err(e) => {
                log::debug!("language detection failed: {}", e);
                None
            }
        };
        detected.unwrap_or_else(|| self.detect_target.clone())
    }

    async fn wait_for_slot(&self) {
        let Some(last) = self.last_request.get() else {
            return;
        };
        let elapsed = self.timer.now().saturating_sub(last);
        if elapsed < self.min_interval {
            let wait = self.min_interval - elapsed;
            log::debug!("rate limiting: waiting {}ms", wait.as_millis());
            self.timer.sleep(wait).await;
        }
    }

    async fn fetch(&self, text: &str, target_lang: &str) -> Result<String, TranslateError> {
        let url = self.google.request_url(text, target_lang);
        let response = self.http.get(&url).await?;

        if response.status == TOO_MANY_REQUESTS {
            self.timer.sleep(self.cooldown).await;
            return Err(TranslateError::RateLimited);
        }
        if !response.ok() {
            return Err(TranslateError::Http(response.status));
        }

        let parsed = parse_response(&response.text).map_err(TranslateError::Parse)?;
        match parsed.translated {
            Some(translated) => {
                self.cache
                    .borrow_mut()
                    .insert(text, target_lang, translated.clone());
                Ok(translated)
            }
            None => Ok(NOT_FOUND_MESSAGE.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{TransportError, FAILED_MESSAGE, RATE_LIMITED_MESSAGE};
    use crate::testing::{gtx_body, ok, status, FakeHttp, FakeTimer};
    use futures::executor::block_on;
    use futures::task::noop_waker_ref;
    use std::future::Future;
    use std::task::{Context, Poll};

    fn translator(http: &FakeHttp, timer: &FakeTimer) -> Translator<FakeHttp, FakeTimer> {
        Translator::new(http.clone(), timer.clone(), &Settings::default())
    }

    #[test]
    fn translates_and_caches() {
        let http = FakeHttp::replying("salom");
        let timer = FakeTimer::new();
        let t = translator(&http, &timer);

        assert_eq!(block_on(t.translate("hello", "uz")), Some(Ok("salom".to_string())));
        assert_eq!(block_on(t.translate("hello", "uz")), Some(Ok("salom".to_string())));
        assert_eq!(http.requests().len(), 1);
        assert!(http.requests()[0].ends_with("&tl=uz&dt=t&q=hello"));

        // Same text, other language: separate entry.
        block_on(t.translate("hello", "ru"));
        assert_eq!(http.requests().len(), 2);
        assert!(!t.is_busy());
    }

    #[test]
    fn evicted_entries_are_fetched_again() {
        let http = FakeHttp::replying("x");
        let timer = FakeTimer::new();
        let settings = Settings {
            cache_capacity: 2,
            ..Settings::default()
        };
        let t = Translator::new(http.clone(), timer.clone(), &settings);

        for text in ["aa", "bb", "cc"] {
            block_on(t.translate(text, "uz"));
            assert!(t.cached_len() <= 2);
        }
        assert_eq!(http.requests().len(), 3);

        block_on(t.translate("cc", "uz"));
        assert_eq!(http.requests().len(), 3);

        block_on(t.translate("aa", "uz"));
        assert_eq!(http.requests().len(), 4);
    }

    #[test]
    fn spaces_out_requests() {
        let http = FakeHttp::replying("x");
        let timer = FakeTimer::new();
        let t = translator(&http, &timer);

        block_on(t.translate("first", "uz"));
        assert!(timer.sleeps().is_empty());

        timer.advance(Duration::from_millis(300));
        block_on(t.translate("second", "uz"));
        assert_eq!(timer.sleeps(), vec![Duration::from_millis(700)]);
        assert!(timer.now() >= Duration::from_millis(1000));

        timer.advance(Duration::from_millis(1500));
        block_on(t.translate("third", "uz"));
        assert_eq!(timer.sleeps().len(), 1);
    }

    #[test]
    fn drops_calls_while_busy() {
        let http = FakeHttp::replying("salom");
        let timer = FakeTimer::new();
        let t = translator(&http, &timer);
        http.stall();

        let mut first = Box::pin(t.translate("hello", "uz"));
        let mut cx = Context::from_waker(noop_waker_ref());
        assert!(first.as_mut().poll(&mut cx).is_pending());
        assert!(t.is_busy());

        assert_eq!(block_on(t.translate("world", "uz")), None);
        assert_eq!(http.requests().len(), 1);

        // Abandoning the stuck request still releases the flag.
        drop(first);
        assert!(!t.is_busy());
    }

    #[test]
    fn stays_busy_while_waiting_for_slot() {
        let http = FakeHttp::replying("salom");
        let timer = FakeTimer::new();
        let t = translator(&http, &timer);
        block_on(t.translate("hello", "uz"));
        timer.hold();
        timer.advance(Duration::from_millis(300));

        let mut waiting = Box::pin(t.translate("world", "uz"));
        let mut cx = Context::from_waker(noop_waker_ref());
        assert!(waiting.as_mut().poll(&mut cx).is_pending());
        assert_eq!(timer.sleeps(), vec![Duration::from_millis(700)]);
        assert!(t.is_busy());

        assert_eq!(block_on(t.translate("again", "uz")), None);
        assert_eq!(http.requests().len(), 1);

        timer.advance(Duration::from_millis(700));
        assert_eq!(
            waiting.as_mut().poll(&mut cx),
            Poll::Ready(Some(Ok("salom".to_string())))
        );
        assert_eq!(http.requests().len(), 2);
        assert!(!t.is_busy());
    }

    #[test]
    fn rate_limited_response_cools_down() {
        let http = FakeHttp::new(|_| status(429));
        let timer = FakeTimer::new();
        let t = translator(&http, &timer);

        let result = block_on(t.translate("hello", "uz"));
        assert_eq!(result, Some(Err(TranslateError::RateLimited)));
        assert_eq!(timer.sleeps(), vec![Duration::from_millis(2000)]);
        assert!(!t.is_busy());
        assert_eq!(t.cached_len(), 0);
        assert_eq!(
            block_on(t.translate_for_display("hello", "uz")).as_deref(),
            Some(RATE_LIMITED_MESSAGE)
        );
    }

    #[test]
    fn failures_map_to_tags() {
        let http = FakeHttp::new(|_| status(503));
        let timer = FakeTimer::new();
        let t = translator(&http, &timer);
        assert_eq!(block_on(t.translate("hello", "uz")), Some(Err(TranslateError::Http(503))));

        http.set_handler(|_| Err(TransportError("Failed to fetch".into())));
        assert_eq!(
            block_on(t.translate("hello", "uz")),
            Some(Err(TranslateError::Network("Failed to fetch".into())))
        );

        http.set_handler(|_| ok("<!doctype html>".into()));
        assert!(matches!(
            block_on(t.translate("hello", "uz")),
            Some(Err(TranslateError::Parse(_)))
        ));
        assert_eq!(
            block_on(t.translate_for_display("hello", "uz")).as_deref(),
            Some(FAILED_MESSAGE)
        );
        assert!(!t.is_busy());
    }

    #[test]
    fn empty_payload_yields_sentinel_without_caching() {
        let http = FakeHttp::new(|_| ok("[[],null,\"en\"]".into()));
        let timer = FakeTimer::new();
        let t = translator(&http, &timer);
        assert_eq!(
            block_on(t.translate("hello", "uz")),
            Some(Ok(NOT_FOUND_MESSAGE.to_string()))
        );
        assert_eq!(t.cached_len(), 0);
    }

    #[test]
    fn detects_language_from_truncated_sample() {
        let http = FakeHttp::new(|_| ok(gtx_body("hello", "bonjour", "fr")));
        let timer = FakeTimer::new();
        let t = translator(&http, &timer);

        let long = "b".repeat(150);
        assert_eq!(block_on(t.detect_language(&long)), "fr");
        let url = &http.requests()[0];
        assert!(url.contains("&tl=en&"));
        assert!(url.ends_with(&format!("q={}", "b".repeat(100))));
    }

    #[test]
    fn detection_falls_back_to_english() {
        let http = FakeHttp::new(|_| Err(TransportError("offline".into())));
        let timer = FakeTimer::new();
        let t = translator(&http, &timer);
        assert_eq!(block_on(t.detect_language("bonjour")), "en");

        http.set_handler(|_| status(500));
        assert_eq!(block_on(t.detect_language("bonjour")), "en");
    }
}
