// What the tooltip shows and where, independent of the DOM.

use crate::utils::truncate_chars;

pub const TOOLTIP_CLASS: &str = "translation-tooltip";
pub const STYLE_ID: &str = "tooltip-style";
pub const ACTION_ATTR: &str = "data-translation-action";

const OFFSET: f64 = 10.0;
const RESERVED_WIDTH: f64 = 270.0;
const RESERVED_HEIGHT: f64 = 100.0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SelectionRect {
    pub left: f64,
    pub width: f64,
    pub bottom: f64,
}

impl SelectionRect {
    /// Horizontal centre, bottom edge.
    pub fn anchor(&self) -> (f64, f64) {
        (self.left + self.width / 2.0, self.bottom)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position {
    pub left: f64,
    pub top: f64,
}

impl Position {
    /// Offsets the anchor slightly and keeps the tooltip inside the viewport.
    pub fn clamped(anchor: (f64, f64), viewport: Viewport) -> Self {
        let (x, y) = anchor;
        Self {
            left: (x + OFFSET).min(viewport.width - RESERVED_WIDTH),
            top: (y + OFFSET).min(viewport.height - RESERVED_HEIGHT),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TooltipView {
    pub translated: String,
    pub original: String,
    /// Quoted, possibly truncated, source line under the translation.
    pub original_line: String,
    pub position: Position,
}

impl TooltipView {
    pub fn new(
        translated: String,
        original: String,
        position: Position,
        preview_chars: usize,
    ) -> Self {
        let original_line = quote_preview(&original, preview_chars);
        Self {
            translated,
            original,
            original_line,
            position,
        }
    }
}

pub fn quote_preview(text: &str, max_chars: usize) -> String {
    let ellipsis = if text.chars().count() > max_chars { "..." } else { "" };
    format!("\"{}{}\"", truncate_chars(text, max_chars), ellipsis)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TooltipAction {
    PlayOriginal,
    PlayTranslation,
    Close,
}

impl TooltipAction {
    pub const ALL: [TooltipAction; 3] = [
        TooltipAction::PlayOriginal,
        TooltipAction::PlayTranslation,
        TooltipAction::Close,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TooltipAction::PlayOriginal => "play-original",
            TooltipAction::PlayTranslation => "play-translation",
            TooltipAction::Close => "close",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.as_str() == s)
    }

    pub fn title(&self) -> &'static str {
        match self {
            TooltipAction::PlayOriginal => "Read the original text aloud",
            TooltipAction::PlayTranslation => "Read the translation aloud",
            TooltipAction::Close => "Close",
        }
    }
}
