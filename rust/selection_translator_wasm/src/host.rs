// Seams between the translator and whatever page hosts it.
// The wasm build implements these with web-sys (see `web`); tests use in-memory fakes.

#![allow(async_fn_in_trait)]

use crate::error::TransportError;
use crate::speech::Utterance;
use crate::tooltip::{TooltipView, Viewport};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub text: String,
}

impl HttpResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait HttpTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

/// Monotonic clock plus a non-blocking sleep on the page event loop.
pub trait Timer {
    fn now(&self) -> Duration;
    async fn sleep(&self, duration: Duration);
}

impl<T: Timer> Timer for &T {
    fn now(&self) -> Duration {
        (**self).now()
    }

    async fn sleep(&self, duration: Duration) {
        (**self).sleep(duration).await
    }
}

/// Page-local key/value storage.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), String>;
}

pub trait SpeechEngine {
    fn is_available(&self) -> bool;
    fn cancel(&self);
    fn speak(&self, utterance: &Utterance);
}

/// The DOM as far as the tooltip is concerned.
pub trait Page {
    type Handle;

    fn viewport(&self) -> Viewport;
    fn has_active_selection(&self) -> bool;
    fn mount_tooltip(&self, view: &TooltipView) -> Result<Self::Handle, String>;
    fn unmount_tooltip(&self, handle: Self::Handle);
}

/// Bundles the host implementations one component instance runs against.
pub trait Platform {
    type Http: HttpTransport;
    type Timer: Timer;
    type Store: PreferenceStore;
    type Speech: SpeechEngine;
    type Page: Page;
}
