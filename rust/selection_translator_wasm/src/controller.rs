// The selection translator component: one instance per injected page.
// All state lives here and is only touched from the page's event loop.

use crate::config::Settings;
use crate::host::{Page, Platform, SpeechEngine, Timer};
use crate::preferences::Preferences;
use crate::selection::{debounce, SelectionSnapshot};
use crate::speech::speak;
use crate::tooltip::{Position, TooltipAction, TooltipView};
use crate::translator::Translator;
use futures::stream::{Stream, StreamExt};
use std::cell::{Cell, RefCell};

type Handle<P> = <<P as Platform>::Page as Page>::Handle;

pub enum TooltipState<H> {
    Hidden,
    Visible { handle: H, view: TooltipView },
}

pub struct SelectionTranslator<P: Platform> {
    settings: Settings,
    translator: Translator<P::Http, P::Timer>,
    preferences: Preferences<P::Store>,
    speech: P::Speech,
    page: P::Page,
    tooltip: RefCell<TooltipState<Handle<P>>>,
    scroll_generation: Cell<u64>,
    closed: Cell<bool>,
}

impl<P: Platform> SelectionTranslator<P> {
    pub fn new(
        settings: Settings,
        http: P::Http,
        timer: P::Timer,
        store: P::Store,
        speech: P::Speech,
        page: P::Page,
    ) -> Self {
        let translator = Translator::new(http, timer, &settings);
        let preferences = Preferences::new(store, settings.default_target_lang.clone());
        Self {
            settings,
            translator,
            preferences,
            speech,
            page,
            tooltip: RefCell::new(TooltipState::Hidden),
            scroll_generation: Cell::new(0),
            closed: Cell::new(false),
        }
    }

    pub fn translator(&self) -> &Translator<P::Http, P::Timer> {
        &self.translator
    }

    pub fn preferences(&self) -> &Preferences<P::Store> {
        &self.preferences
    }

    /// First-load hook: stores the default language if none is set yet.
    pub fn on_load(&self) -> String {
        let lang = self.preferences.ensure_default();
        log::info!("selection translator loaded, target language: {}", lang);
        lang
    }

    /// Consumes selection events until the source ends. Bursts are coalesced
    /// by the debounce window; a selection that settles while a translation
    /// is still in flight is dropped by the translator's busy guard.
    pub async fn run<S>(&self, events: S)
    where
        S: Stream<Item = SelectionSnapshot> + Unpin,
    {
        debounce(events, self.settings.debounce(), self.translator.timer())
            .for_each_concurrent(None, |snapshot| async move {
                self.handle_selection(snapshot).await;
            })
            .await;
    }

    /// Returns true when a tooltip was shown for this selection.
    pub async fn handle_selection(&self, snapshot: SelectionSnapshot) -> bool {
        if self.is_closed() {
            return false;
        }
        let text = match snapshot.accept(&self.settings) {
            Ok(text) => text,
            Err(reason) => {
                log::trace!("ignoring selection: {:?}", reason);
                return false;
            }
        };

        let target_lang = self.preferences.target_lang();
        let Some(translated) = self.translator.translate_for_display(text, &target_lang).await
        else {
            log::debug!("translation already in flight, selection dropped");
            return false;
        };

        if translated == text || self.is_closed() {
            return false;
        }
        self.show_tooltip(translated, text.to_string(), snapshot.rect.anchor());
        true
    }

    /// Replaces any visible tooltip with a new one anchored at `anchor`.
    pub fn show_tooltip(&self, translated: String, original: String, anchor: (f64, f64)) {
        if self.is_closed() {
            return;
        }
        self.hide_tooltip();

        let position = Position::clamped(anchor, self.page.viewport());
        let view = TooltipView::new(
            translated,
            original,
            position,
            self.settings.original_preview_chars,
        );
        match self.page.mount_tooltip(&view) {
            Ok(handle) => *self.tooltip.borrow_mut() = TooltipState::Visible { handle, view },
            Err(e) => log::error!("could not render tooltip: {}", e),
        }
    }

    /// Returns true if a tooltip was removed.
    pub fn hide_tooltip(&self) -> bool {
        let previous = std::mem::replace(&mut *self.tooltip.borrow_mut(), TooltipState::Hidden);
        match previous {
            TooltipState::Visible { handle, .. } => {
                self.page.unmount_tooltip(handle);
                true
            }
            TooltipState::Hidden => false,
        }
    }

    pub fn is_tooltip_visible(&self) -> bool {
        matches!(*self.tooltip.borrow(), TooltipState::Visible { .. })
    }

    pub fn current_view(&self) -> Option<TooltipView> {
        match &*self.tooltip.borrow() {
            TooltipState::Visible { view, .. } => Some(view.clone()),
            TooltipState::Hidden => None,
        }
    }

    pub fn stop_speech(&self) {
        if self.speech.is_available() {
            self.speech.cancel();
        }
    }

    pub fn on_escape(&self) {
        self.stop_speech();
        self.hide_tooltip();
    }

    /// Hides the tooltip once scrolling has settled. A newer scroll event
    /// restarts the wait.
    pub async fn on_scroll(&self) {
        if !self.is_tooltip_visible() {
            return;
        }
        let generation = self.scroll_generation.get().wrapping_add(1);
        self.scroll_generation.set(generation);

        self.translator.timer().sleep(self.settings.scroll_settle()).await;

        if self.scroll_generation.get() == generation {
            self.hide_tooltip();
        }
    }

    /// Mousedown anywhere on the page. Outside the tooltip it hides the
    /// tooltip, unless a selection is still active once the click settles.
    pub async fn on_pointer_down(&self, inside_tooltip: bool) {
        if inside_tooltip || !self.is_tooltip_visible() {
            return;
        }
        self.translator
            .timer()
            .sleep(self.settings.outside_click_delay())
            .await;
        if !self.page.has_active_selection() {
            self.hide_tooltip();
        }
    }

    pub async fn handle_action(&self, action: TooltipAction) {
        match action {
            TooltipAction::Close => {
                self.stop_speech();
                self.hide_tooltip();
            }
            TooltipAction::PlayOriginal => {
                let Some(view) = self.current_view() else {
                    return;
                };
                let lang = self.translator.detect_language(&view.original).await;
                speak(&self.speech, &view.original, &lang, &self.settings.speech);
            }
            TooltipAction::PlayTranslation => {
                let Some(view) = self.current_view() else {
                    return;
                };
                let lang = self.preferences.target_lang();
                speak(&self.speech, &view.translated, &lang, &self.settings.speech);
            }
        }
    }

    pub fn speak(&self, text: &str, lang: &str) -> bool {
        speak(&self.speech, text, lang, &self.settings.speech)
    }

    /// Returns true when the instance was torn down. A page entering the
    /// back/forward cache keeps its listeners and resumes on restore.
    pub fn on_page_hide(&self, persisted: bool) -> bool {
        if persisted {
            self.stop_speech();
            self.hide_tooltip();
            return false;
        }
        self.teardown();
        true
    }

    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    /// Page unload: drop everything the instance put on the page. Selections
    /// still pending or in flight are discarded.
    pub fn teardown(&self) {
        self.closed.set(true);
        self.stop_speech();
        self.hide_tooltip();
        self.translator.clear_cache();
        log::debug!("selection translator torn down");
    }
}
