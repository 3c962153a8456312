// In-memory hosts for unit tests.

use crate::error::TransportError;
use crate::host::{
    HttpResponse, HttpTransport, Page, PreferenceStore, Platform, SpeechEngine, Timer,
};
use crate::speech::Utterance;
use crate::tooltip::{TooltipView, Viewport};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::task::Poll;
use std::time::Duration;

/// gtx-shaped response body.
pub fn gtx_body(translated: &str, source: &str, detected: &str) -> String {
    serde_json::json!([[[translated, source, null, null, 10]], null, detected]).to_string()
}

pub fn ok(body: String) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse { status: 200, text: body })
}

pub fn status(code: u16) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse {
        status: code,
        text: String::new(),
    })
}

type Handler = dyn Fn(&str) -> Result<HttpResponse, TransportError>;

#[derive(Clone)]
pub struct FakeHttp {
    handler: Rc<RefCell<Rc<Handler>>>,
    requests: Rc<RefCell<Vec<String>>>,
    stalled: Rc<Cell<bool>>,
}

impl FakeHttp {
    pub fn new(handler: impl Fn(&str) -> Result<HttpResponse, TransportError> + 'static) -> Self {
        let handler: Rc<Handler> = Rc::new(handler);
        Self {
            handler: Rc::new(RefCell::new(handler)),
            requests: Rc::default(),
            stalled: Rc::default(),
        }
    }

    /// Always answers with `translated`, detected as English.
    pub fn replying(translated: &str) -> Self {
        let translated = translated.to_string();
        Self::new(move |_| ok(gtx_body(&translated, "", "en")))
    }

    pub fn set_handler(
        &self,
        handler: impl Fn(&str) -> Result<HttpResponse, TransportError> + 'static,
    ) {
        let handler: Rc<Handler> = Rc::new(handler);
        *self.handler.borrow_mut() = handler;
    }

    /// Requests made from now on never complete.
    pub fn stall(&self) {
        self.stalled.set(true);
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl HttpTransport for FakeHttp {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        self.requests.borrow_mut().push(url.to_string());
        if self.stalled.get() {
            futures::future::pending::<()>().await;
        }
        let handler = self.handler.borrow().clone();
        handler(url)
    }
}

/// Virtual clock: sleeping advances time instantly and is recorded.
/// After `hold()` the clock only moves through `advance`, and sleeps stay
/// pending until their deadline passes.
#[derive(Clone, Default)]
pub struct FakeTimer {
    now: Rc<Cell<Duration>>,
    sleeps: Rc<RefCell<Vec<Duration>>>,
    held: Rc<Cell<bool>>,
}

impl FakeTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hold(&self) {
        self.held.set(true);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }
}

impl Timer for FakeTimer {
    fn now(&self) -> Duration {
        self.now.get()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
        if !self.held.get() {
            self.advance(duration);
            return;
        }
        let deadline = self.now() + duration;
        futures::future::poll_fn(|_| {
            if self.now() >= deadline {
                Poll::Ready(())
            } else {
                Poll::Pending
            }
        })
        .await;
    }
}

#[derive(Clone, Default)]
pub struct FakeStore {
    values: Rc<RefCell<HashMap<String, String>>>,
    writes: Rc<Cell<usize>>,
}

impl FakeStore {
    pub fn with(key: &str, value: &str) -> Self {
        let store = Self::default();
        store.values.borrow_mut().insert(key.into(), value.into());
        store
    }

    pub fn writes(&self) -> usize {
        self.writes.get()
    }
}

impl PreferenceStore for FakeStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        self.writes.set(self.writes.get() + 1);
        self.values.borrow_mut().insert(key.into(), value.into());
        Ok(())
    }
}

#[derive(Clone)]
pub struct FakeSpeech {
    available: bool,
    cancels: Rc<Cell<usize>>,
    spoken: Rc<RefCell<Vec<Utterance>>>,
}

impl FakeSpeech {
    pub fn new(available: bool) -> Self {
        Self {
            available,
            cancels: Rc::default(),
            spoken: Rc::default(),
        }
    }

    pub fn cancels(&self) -> usize {
        self.cancels.get()
    }

    pub fn spoken(&self) -> Vec<Utterance> {
        self.spoken.borrow().clone()
    }
}

impl SpeechEngine for FakeSpeech {
    fn is_available(&self) -> bool {
        self.available
    }

    fn cancel(&self) {
        self.cancels.set(self.cancels.get() + 1);
    }

    fn speak(&self, utterance: &Utterance) {
        self.spoken.borrow_mut().push(utterance.clone());
    }
}

/// Tracks mounted tooltips by id so tests can count what is on the "page".
#[derive(Clone)]
pub struct FakePage {
    viewport: Viewport,
    selection_active: Rc<Cell<bool>>,
    mounted: Rc<RefCell<Vec<(u32, TooltipView)>>>,
    next_id: Rc<Cell<u32>>,
    fail_mount: Rc<Cell<bool>>,
}

impl FakePage {
    pub fn new() -> Self {
        Self {
            viewport: Viewport {
                width: 1280.0,
                height: 720.0,
            },
            selection_active: Rc::default(),
            mounted: Rc::default(),
            next_id: Rc::default(),
            fail_mount: Rc::default(),
        }
    }

    pub fn set_selection_active(&self, active: bool) {
        self.selection_active.set(active);
    }

    /// The next mount fails without touching the page.
    pub fn fail_next_mount(&self) {
        self.fail_mount.set(true);
    }

    pub fn tooltips(&self) -> Vec<TooltipView> {
        self.mounted.borrow().iter().map(|(_, view)| view.clone()).collect()
    }
}

impl Page for FakePage {
    type Handle = u32;

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn has_active_selection(&self) -> bool {
        self.selection_active.get()
    }

    fn mount_tooltip(&self, view: &TooltipView) -> Result<u32, String> {
        if self.fail_mount.replace(false) {
            return Err("stylesheet rejected".into());
        }
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.mounted.borrow_mut().push((id, view.clone()));
        Ok(id)
    }

    fn unmount_tooltip(&self, handle: u32) {
        self.mounted.borrow_mut().retain(|(id, _)| *id != handle);
    }
}

pub struct FakePlatform;

impl Platform for FakePlatform {
    type Http = FakeHttp;
    type Timer = FakeTimer;
    type Store = FakeStore;
    type Speech = FakeSpeech;
    type Page = FakePage;
}
