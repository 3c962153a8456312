// Selection events: what we capture from the page, which ones we act on,
// and the quiet-period coalescing in front of the handler.

use crate::config::Settings;
use crate::host::Timer;
use crate::tooltip::SelectionRect;
use futures::future::{self, Either};
use futures::stream::{self, Stream, StreamExt};
use futures::pin_mut;
use std::time::Duration;

/// Where the pointer-up that ended the selection happened.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SelectionOrigin {
    pub inside_tooltip: bool,
    pub editable: bool,
    /// INPUT or TEXTAREA.
    pub form_field: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectionSnapshot {
    pub text: String,
    pub rect: SelectionRect,
    pub origin: SelectionOrigin,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    Empty,
    TooShort,
    TooLong,
    InsideTooltip,
    Editable,
    FormField,
}

impl SelectionSnapshot {
    /// The trimmed text worth translating, or why the selection is ignored.
    pub fn accept(&self, settings: &Settings) -> Result<&str, Rejection> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(Rejection::Empty);
        }
        if self.origin.inside_tooltip {
            return Err(Rejection::InsideTooltip);
        }
        if self.origin.form_field {
            return Err(Rejection::FormField);
        }
        if self.origin.editable {
            return Err(Rejection::Editable);
        }
        let len = text.chars().count();
        if len < settings.min_chars {
            return Err(Rejection::TooShort);
        }
        if len > settings.max_chars {
            return Err(Rejection::TooLong);
        }
        Ok(text)
    }
}

/// Emits an item only once `quiet` has passed without a newer one arriving.
/// A burst collapses to its last item. When the source ends, any pending item
/// is emitted right away.
pub fn debounce<S, T>(events: S, quiet: Duration, timer: T) -> impl Stream<Item = S::Item>
where
    S: Stream + Unpin,
    T: Timer,
{
    stream::unfold((events.fuse(), timer), move |(mut events, timer)| async move {
        let mut latest = events.next().await?;
        loop {
            let settled = {
                let sleep = timer.sleep(quiet);
                pin_mut!(sleep);
                match future::select(events.next(), sleep).await {
                    Either::Left((Some(newer), _)) => {
                        latest = newer;
                        false
                    }
                    Either::Left((None, _)) | Either::Right(_) => true,
                }
            };
            if settled {
                return Some((latest, (events, timer)));
            }
        }
    })
}
