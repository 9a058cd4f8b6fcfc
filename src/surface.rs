//! Presentation surface
//!
//! Visibility toggle, input buffer, typing indicator and scroll anchor for
//! one widget. It consumes transcript and exchange state but is never
//! consulted by them: closing the widget does not touch an exchange in flight.

use crate::state_machine::ExchangeState;
use crate::suggestions::visible_suggestions;
use crate::transcript::{Message, MessageId, Transcript};
use serde::Serialize;

/// Whether the widget is currently shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Open,
    #[default]
    Closed,
}

/// Per-widget presentation state
#[derive(Debug, Default)]
pub struct Surface {
    visibility: Visibility,
    greeted: bool,
    draft: String,
    scroll_anchor: Option<MessageId>,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_open(&self) -> bool {
        self.visibility == Visibility::Open
    }

    /// Show the widget. Returns `true` when the caller must append the
    /// greeting: first Closed→Open while the transcript is still empty.
    pub fn open(&mut self, transcript_empty: bool) -> bool {
        if self.is_open() {
            return false;
        }
        self.visibility = Visibility::Open;

        let needs_greeting = transcript_empty && !self.greeted;
        if needs_greeting {
            self.greeted = true;
        }
        needs_greeting
    }

    pub fn close(&mut self) {
        self.visibility = Visibility::Closed;
    }

    /// Flip visibility; same greeting contract as `open`
    pub fn toggle(&mut self, transcript_empty: bool) -> bool {
        if self.is_open() {
            self.close();
            false
        } else {
            self.open(transcript_empty)
        }
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn clear_draft(&mut self) {
        self.draft.clear();
    }

    /// Follow the newest entry
    pub fn scroll_to(&mut self, id: MessageId) {
        self.scroll_anchor = Some(id);
    }

    /// Build the render snapshot for the current state
    pub fn view(&self, state: ExchangeState, transcript: &Transcript) -> WidgetView {
        WidgetView {
            visibility: self.visibility,
            state,
            typing: state.is_pending(),
            input_enabled: !state.is_pending(),
            draft: self.draft.clone(),
            messages: transcript.all().to_vec(),
            suggestions: visible_suggestions(transcript.size()).to_vec(),
            scroll_anchor: self.scroll_anchor,
        }
    }
}

/// Everything a renderer needs to paint the widget
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetView {
    pub visibility: Visibility,
    pub state: ExchangeState,
    /// Typing indicator shown
    pub typing: bool,
    /// Submit control enabled
    pub input_enabled: bool,
    pub draft: String,
    pub messages: Vec<Message>,
    pub suggestions: Vec<&'static str>,
    pub scroll_anchor: Option<MessageId>,
}
