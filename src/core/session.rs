//! Chat session storage.
//!
//! The store owns every chat thread created during the process lifetime.
//! Sessions are never removed, and identifiers come from a monotonic counter,
//! so iterating the map in key order is the same as iterating in creation
//! order.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::core::message::Message;

pub const WELCOME_MESSAGE: &str =
    "Hello! Type your message or use \"/image [prompt]\" to generate an image.";

const PREVIEW_CHARS: usize = 30;

/// Opaque handle for a chat session. Displays as `chat-<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SessionId(u64);

impl SessionId {
    /// Position in the issuing sequence, starting at 1.
    pub fn ordinal(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chat-{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: SessionId,
    messages: Vec<Message>,
}

impl Session {
    fn new(id: SessionId) -> Self {
        Self {
            id,
            messages: vec![Message::ai(WELCOME_MESSAGE)],
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Sidebar label: the first non-welcome message, or `New Chat <n>`.
    pub fn preview(&self) -> String {
        match self.messages.get(1) {
            Some(first) => {
                let mut preview: String = first.content.chars().take(PREVIEW_CHARS).collect();
                preview.push_str("...");
                preview
            }
            None => format!("New Chat {}", self.id.ordinal()),
        }
    }
}

/// A row of the session list, in creation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEntry {
    pub id: SessionId,
    pub preview: String,
}

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: BTreeMap<SessionId, Session>,
    counter: u64,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh id and seeds the history with the welcome message.
    pub fn create_session(&mut self) -> SessionId {
        self.counter += 1;
        let id = SessionId(self.counter);
        self.sessions.insert(id, Session::new(id));
        id
    }

    /// Appends to an existing session. Unknown ids are ignored; the session
    /// is not created.
    ///
    /// Returns whether the message was stored.
    pub fn append_message(&mut self, id: SessionId, message: Message) -> bool {
        match self.sessions.get_mut(&id) {
            Some(session) => {
                session.messages.push(message);
                true
            }
            None => false,
        }
    }

    pub fn history(&self, id: SessionId) -> &[Message] {
        self.sessions
            .get(&id)
            .map(Session::messages)
            .unwrap_or_default()
    }

    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn list_sessions(&self) -> Vec<SessionEntry> {
        self.sessions
            .values()
            .map(|session| SessionEntry {
                id: session.id,
                preview: session.preview(),
            })
            .collect()
    }
}
