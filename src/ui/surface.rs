//! The display contract the chat core writes to, and the retained view model
//! the terminal front end draws from.

use crate::core::message::Sender;
use crate::core::session::{SessionEntry, SessionId};

pub const BUSY_INDICATOR_TEXT: &str = "AI is thinking...";

/// Operations the chat core needs from whatever is showing the conversation.
///
/// Implementations must treat `show_busy_indicator` and `hide_busy_indicator`
/// as idempotent: there is a single indicator slot, never a stack.
pub trait UiSurface {
    /// Remove every rendered message.
    fn clear(&mut self);
    fn append_message_view(&mut self, sender: Sender, content: &str, is_image: bool);
    fn scroll_to_end(&mut self);
    fn set_session_list(&mut self, entries: &[SessionEntry], active: SessionId);
    fn show_busy_indicator(&mut self);
    fn hide_busy_indicator(&mut self);
    fn set_session_panel_expanded(&mut self, expanded: bool);
    fn clear_input(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewRole {
    User,
    Ai,
    /// Front-end text that is shown once and never stored in a session.
    Notice,
}

impl From<Sender> for ViewRole {
    fn from(sender: Sender) -> Self {
        match sender {
            Sender::User => ViewRole::User,
            Sender::Ai => ViewRole::Ai,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub role: ViewRole,
    pub content: String,
    pub is_image: bool,
}

/// Everything the terminal renderer needs for one frame.
#[derive(Debug, Default)]
pub struct ChatView {
    pub messages: Vec<MessageView>,
    pub sessions: Vec<SessionEntry>,
    pub active: Option<SessionId>,
    pub busy: bool,
    pub panel_expanded: bool,
    pub input: String,
    pub status: Option<String>,
    /// Lines scrolled up from the bottom of the transcript.
    pub scroll_offset: u16,
}

impl ChatView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_notice(&mut self, text: impl Into<String>) {
        self.messages.push(MessageView {
            role: ViewRole::Notice,
            content: text.into(),
            is_image: false,
        });
        self.scroll_to_end();
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub fn take_input(&mut self) -> String {
        std::mem::take(&mut self.input)
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    /// Position of the active session in the list, starting at 1.
    pub fn active_position(&self) -> Option<usize> {
        let active = self.active?;
        self.sessions
            .iter()
            .position(|entry| entry.id == active)
            .map(|index| index + 1)
    }
}

impl UiSurface for ChatView {
    fn clear(&mut self) {
        self.messages.clear();
        self.busy = false;
        self.scroll_offset = 0;
    }

    fn append_message_view(&mut self, sender: Sender, content: &str, is_image: bool) {
        self.messages.push(MessageView {
            role: sender.into(),
            content: content.to_string(),
            is_image,
        });
    }

    fn scroll_to_end(&mut self) {
        self.scroll_offset = 0;
    }

    fn set_session_list(&mut self, entries: &[SessionEntry], active: SessionId) {
        self.sessions = entries.to_vec();
        self.active = Some(active);
    }

    fn show_busy_indicator(&mut self) {
        self.busy = true;
    }

    fn hide_busy_indicator(&mut self) {
        self.busy = false;
    }

    fn set_session_panel_expanded(&mut self, expanded: bool) {
        self.panel_expanded = expanded;
    }

    fn clear_input(&mut self) {
        self.input.clear();
    }
}
