// Tooltip DOM: one fixed-position overlay plus one shared stylesheet.

use crate::host::Page;
use crate::tooltip::{TooltipAction, TooltipView, Viewport, ACTION_ATTR, STYLE_ID, TOOLTIP_CLASS};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlElement, Window};

const STYLESHEET: &str = r#"
@keyframes fadeIn {
  from { opacity: 0; transform: translateY(-5px); }
  to { opacity: 1; transform: translateY(0); }
}
.translation-tooltip:hover {
  box-shadow: 0 12px 40px rgba(0, 0, 0, 0.4);
  transition: all 0.2s ease;
}
.translation-tooltip button[data-translation-action] {
  border: none;
  color: #fff;
  cursor: pointer;
  border-radius: 50%;
  width: 32px;
  height: 32px;
  display: flex;
  align-items: center;
  justify-content: center;
  transition: all 0.2s ease;
  padding: 0;
  background: rgba(255, 255, 255, 0.1);
}
.translation-tooltip button[data-translation-action]:hover {
  background: rgba(255, 255, 255, 0.2);
  transform: scale(1.1);
}
.translation-tooltip button[data-translation-action="play-translation"] {
  background: rgba(76, 175, 80, 0.3);
}
.translation-tooltip button[data-translation-action="play-translation"]:hover {
  background: rgba(76, 175, 80, 0.5);
}
.translation-tooltip button[data-translation-action="close"] {
  width: 28px;
  height: 28px;
}
.translation-tooltip button[data-translation-action="close"]:hover {
  background: rgba(244, 67, 54, 0.3);
}
"#;

const SPEAKER_ICON: &str = r#"<svg width="16" height="16" viewBox="0 0 24 24" fill="none" xmlns="http://www.w3.org/2000/svg"><path d="M3 9v6h4l5 5V4L7 9H3zm13.5 3c0-1.77-1.02-3.29-2.5-4.03v8.05c1.48-.73 2.5-2.25 2.5-4.02zM14 3.23v2.06c2.89.86 5 3.54 5 6.71s-2.11 5.85-5 6.71v2.06c4.01-.91 7-4.49 7-8.77s-2.99-7.86-7-8.77z" fill="currentColor"/></svg>"#;
const PLAY_ICON: &str = r#"<svg width="16" height="16" viewBox="0 0 24 24" fill="none" xmlns="http://www.w3.org/2000/svg"><path d="M12 2C6.48 2 2 6.48 2 12s4.48 10 10 10 10-4.48 10-10S17.52 2 12 2zm-2 14.5v-9l6 4.5-6 4.5z" fill="currentColor"/><path d="M15.5 12L9.5 8v8l6-4z" fill="currentColor" opacity="0.3"/></svg>"#;
const CLOSE_ICON: &str = r#"<svg width="14" height="14" viewBox="0 0 24 24" fill="none" xmlns="http://www.w3.org/2000/svg"><path d="M19 6.41L17.59 5 12 10.59 6.41 5 5 6.41 10.59 12 5 17.59 6.41 19 12 13.41 17.59 19 19 17.59 13.41 12z" fill="currentColor"/></svg>"#;

fn icon(action: TooltipAction) -> &'static str {
    match action {
        TooltipAction::PlayOriginal => SPEAKER_ICON,
        TooltipAction::PlayTranslation => PLAY_ICON,
        TooltipAction::Close => CLOSE_ICON,
    }
}

fn set_styles(el: &HtmlElement, styles: &[(&str, &str)]) -> Result<(), JsValue> {
    let style = el.style();
    for (name, value) in styles {
        style.set_property(name, value)?;
    }
    Ok(())
}

pub struct WebPage {
    window: Window,
    document: Document,
}

impl WebPage {
    pub fn new(window: Window, document: Document) -> Self {
        Self { window, document }
    }

    fn element(&self, tag: &str) -> Result<HtmlElement, JsValue> {
        self.document
            .create_element(tag)?
            .dyn_into::<HtmlElement>()
            .map_err(JsValue::from)
    }

    fn ensure_stylesheet(&self) -> Result<(), JsValue> {
        if self.document.get_element_by_id(STYLE_ID).is_some() {
            return Ok(());
        }
        let style = self.document.create_element("style")?;
        style.set_id(STYLE_ID);
        style.set_text_content(Some(STYLESHEET));
        match self.document.head() {
            Some(head) => head.append_child(&style)?,
            None => self
                .document
                .body()
                .ok_or_else(|| JsValue::from_str("document has no body"))?
                .append_child(&style)?,
        };
        Ok(())
    }

    fn build(&self, view: &TooltipView) -> Result<HtmlElement, JsValue> {
        let tooltip = self.element("div")?;
        tooltip.set_class_name(TOOLTIP_CLASS);
        let left = format!("{}px", view.position.left);
        let top = format!("{}px", view.position.top);
        set_styles(
            &tooltip,
            &[
                ("position", "fixed"),
                ("left", left.as_str()),
                ("top", top.as_str()),
                ("background", "linear-gradient(135deg, #2c3e50, #34495e)"),
                ("color", "#ecf0f1"),
                ("padding", "12px 16px"),
                ("border-radius", "10px"),
                ("z-index", "2147483647"),
                ("font-size", "14px"),
                ("font-family", "system-ui, sans-serif"),
                ("max-width", "250px"),
                ("box-shadow", "0 8px 32px rgba(0, 0, 0, 0.3)"),
                ("backdrop-filter", "blur(10px)"),
                ("display", "flex"),
                ("flex-direction", "column"),
                ("gap", "12px"),
                ("pointer-events", "auto"),
                ("cursor", "default"),
                ("line-height", "1.4"),
                ("word-wrap", "break-word"),
                ("animation", "fadeIn 0.2s ease-out"),
            ],
        )?;

        let text_container = self.element("div")?;
        set_styles(&text_container, &[("flex", "1")])?;

        let translated = self.element("div")?;
        translated.set_text_content(Some(&view.translated));
        set_styles(&translated, &[("font-weight", "500"), ("margin-bottom", "4px")])?;

        let original = self.element("div")?;
        original.set_text_content(Some(&view.original_line));
        set_styles(
            &original,
            &[("font-size", "12px"), ("opacity", "0.7"), ("font-style", "italic")],
        )?;

        text_container.append_child(&translated)?;
        text_container.append_child(&original)?;

        let buttons = self.element("div")?;
        set_styles(
            &buttons,
            &[
                ("display", "flex"),
                ("flex-direction", "row"),
                ("gap", "8px"),
                ("justify-content", "center"),
                ("align-items", "center"),
                ("margin-top", "4px"),
            ],
        )?;
        for action in TooltipAction::ALL {
            let button = self.element("button")?;
            button.set_attribute("type", "button")?;
            button.set_attribute(ACTION_ATTR, action.as_str())?;
            button.set_title(action.title());
            button.set_inner_html(icon(action));
            buttons.append_child(&button)?;
        }

        tooltip.append_child(&text_container)?;
        tooltip.append_child(&buttons)?;
        Ok(tooltip)
    }
}

impl Page for WebPage {
    type Handle = HtmlElement;

    fn viewport(&self) -> Viewport {
        let dimension = |value: Result<JsValue, JsValue>| {
            value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
        };
        Viewport {
            width: dimension(self.window.inner_width()),
            height: dimension(self.window.inner_height()),
        }
    }

    fn has_active_selection(&self) -> bool {
        match self.window.get_selection() {
            Ok(Some(selection)) => {
                selection.range_count() > 0
                    && !String::from(selection.to_string()).trim().is_empty()
            }
            _ => false,
        }
    }

    fn mount_tooltip(&self, view: &TooltipView) -> Result<HtmlElement, String> {
        let mount = || -> Result<HtmlElement, JsValue> {
            // Nothing touches the page until every fallible step has passed.
            self.ensure_stylesheet()?;
            let tooltip = self.build(view)?;
            self.document
                .body()
                .ok_or_else(|| JsValue::from_str("document has no body"))?
                .append_child(&tooltip)?;
            Ok(tooltip)
        };
        mount().map_err(|e| e.as_string().unwrap_or_else(|| format!("{:?}", e)))
    }

    fn unmount_tooltip(&self, handle: HtmlElement) {
        handle.remove();
    }
}
