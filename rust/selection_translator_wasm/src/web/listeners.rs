// Document listeners and the per-page instance they drive.

use super::{LocalStore, WebHttp, WebPage, WebPlatform, WebSpeech, WebTimer};
use crate::config::Settings;
use crate::controller::SelectionTranslator;
use crate::selection::{SelectionOrigin, SelectionSnapshot};
use crate::tooltip::{SelectionRect, TooltipAction, ACTION_ATTR, TOOLTIP_CLASS};
use futures::channel::mpsc::{self, UnboundedSender};
use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    Element, Event, EventTarget, HtmlElement, KeyboardEvent, PageTransitionEvent, Window,
};

type Component = SelectionTranslator<WebPlatform>;

thread_local! {
    static INSTANCE: RefCell<Option<Installed>> = const { RefCell::new(None) };
}

/// Removes itself from its target when dropped.
struct Listener {
    target: EventTarget,
    kind: &'static str,
    capture: bool,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach(
        target: &EventTarget,
        kind: &'static str,
        capture: bool,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);
        target.add_event_listener_with_callback_and_bool(
            kind,
            callback.as_ref().unchecked_ref(),
            capture,
        )?;
        Ok(Self {
            target: target.clone(),
            kind,
            capture,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self.target.remove_event_listener_with_callback_and_bool(
            self.kind,
            self.callback.as_ref().unchecked_ref(),
            self.capture,
        );
    }
}

struct Installed {
    component: Rc<Component>,
    // Dropping the sender ends the selection loop.
    _selections: UnboundedSender<SelectionSnapshot>,
    _listeners: Vec<Listener>,
}

pub(super) fn component() -> Option<Rc<Component>> {
    INSTANCE.with(|slot| slot.borrow().as_ref().map(|i| i.component.clone()))
}

fn spawn_with<F, Fut>(component: &Rc<Component>, f: F)
where
    F: FnOnce(Rc<Component>) -> Fut,
    Fut: Future<Output = ()> + 'static,
{
    spawn_local(f(component.clone()));
}

fn element_of(event: &Event) -> Option<Element> {
    event.target()?.dyn_into::<Element>().ok()
}

fn inside_tooltip(element: &Element) -> bool {
    matches!(element.closest(&format!(".{}", TOOLTIP_CLASS)), Ok(Some(_)))
}

fn origin_of(event: &Event) -> SelectionOrigin {
    let Some(element) = element_of(event) else {
        return SelectionOrigin::default();
    };
    let tag = element.tag_name();
    SelectionOrigin {
        inside_tooltip: inside_tooltip(&element),
        editable: element
            .dyn_ref::<HtmlElement>()
            .map(HtmlElement::is_content_editable)
            .unwrap_or(false),
        form_field: tag.eq_ignore_ascii_case("input") || tag.eq_ignore_ascii_case("textarea"),
    }
}

fn capture_selection(window: &Window, event: &Event) -> Option<SelectionSnapshot> {
    let selection = window.get_selection().ok().flatten()?;
    let text = String::from(selection.to_string());
    let rect = if selection.range_count() > 0 {
        selection
            .get_range_at(0)
            .ok()
            .map(|range| {
                let bounds = range.get_bounding_client_rect();
                SelectionRect {
                    left: bounds.left(),
                    width: bounds.width(),
                    bottom: bounds.bottom(),
                }
            })
            .unwrap_or_default()
    } else {
        SelectionRect::default()
    };
    Some(SelectionSnapshot {
        text,
        rect,
        origin: origin_of(event),
    })
}

fn action_of(event: &Event) -> Option<TooltipAction> {
    let element = element_of(event)?;
    let button = element
        .closest(&format!(".{} [{}]", TOOLTIP_CLASS, ACTION_ATTR))
        .ok()
        .flatten()?;
    TooltipAction::parse(&button.get_attribute(ACTION_ATTR)?)
}

pub(super) fn install(settings: Settings) -> Result<(), JsValue> {
    // A second start() replaces the first instance.
    uninstall();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let component = Rc::new(Component::new(
        settings,
        WebHttp,
        WebTimer,
        LocalStore,
        WebSpeech,
        WebPage::new(window.clone(), document.clone()),
    ));

    let (tx, rx) = mpsc::unbounded::<SelectionSnapshot>();
    let doc_target: &EventTarget = document.as_ref();
    let mut listeners = Vec::new();

    let selections = tx.clone();
    let win = window.clone();
    listeners.push(Listener::attach(doc_target, "mouseup", false, move |event| {
        if let Some(snapshot) = capture_selection(&win, &event) {
            let _ = selections.unbounded_send(snapshot);
        }
    })?);

    let c = component.clone();
    listeners.push(Listener::attach(doc_target, "keydown", false, move |event| {
        let escape = event
            .dyn_ref::<KeyboardEvent>()
            .map(|key| key.key() == "Escape")
            .unwrap_or(false);
        if escape {
            c.on_escape();
        }
    })?);

    let c = component.clone();
    listeners.push(Listener::attach(doc_target, "scroll", true, move |_| {
        spawn_with(&c, |c| async move { c.on_scroll().await });
    })?);

    let c = component.clone();
    listeners.push(Listener::attach(doc_target, "mousedown", false, move |event| {
        let inside = element_of(&event).map(|el| inside_tooltip(&el)).unwrap_or(false);
        spawn_with(&c, |c| async move { c.on_pointer_down(inside).await });
    })?);

    let c = component.clone();
    listeners.push(Listener::attach(doc_target, "click", false, move |event| {
        if let Some(action) = action_of(&event) {
            event.stop_propagation();
            spawn_with(&c, |c| async move { c.handle_action(action).await });
        }
    })?);

    if document.ready_state() == "loading" {
        let c = component.clone();
        listeners.push(Listener::attach(doc_target, "DOMContentLoaded", false, move |_| {
            announce(c.on_load());
        })?);
    } else {
        announce(component.on_load());
    }

    // Uninstalling drops this very closure, so leave the handler first.
    let c = component.clone();
    listeners.push(Listener::attach(window.as_ref(), "pagehide", false, move |event| {
        let persisted = event
            .dyn_ref::<PageTransitionEvent>()
            .map(PageTransitionEvent::persisted)
            .unwrap_or(false);
        if c.on_page_hide(persisted) {
            spawn_local(async { uninstall() });
        }
    })?);

    spawn_with(&component, |c| async move { c.run(rx).await });

    INSTANCE.with(|slot| {
        *slot.borrow_mut() = Some(Installed {
            component,
            _selections: tx,
            _listeners: listeners,
        });
    });
    Ok(())
}

pub(super) fn uninstall() {
    let previous = INSTANCE.with(|slot| slot.borrow_mut().take());
    if let Some(installed) = previous {
        installed.component.teardown();
    }
}

fn announce(lang: String) {
    web_sys::console::info_1(&JsValue::from_str(&format!(
        "Selection translator loaded, language: {}",
        lang
    )));
}
