//! Active-session bookkeeping on top of [`SessionStore`].
//!
//! The controller is the only writer to the UI surface. It is shared between
//! the front end and in-flight submissions as
//! `Arc<tokio::sync::Mutex<SessionController<_>>>`, and the lock is never held
//! across a network await.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::core::message::Message;
use crate::core::session::{SessionEntry, SessionId, SessionStore};
use crate::ui::surface::UiSurface;

pub type SharedController<U> = Arc<Mutex<SessionController<U>>>;

pub struct SessionController<U> {
    store: SessionStore,
    active: SessionId,
    ui: U,
    panel_expanded: bool,
    in_flight: HashMap<SessionId, usize>,
    gates: HashMap<SessionId, Arc<Mutex<()>>>,
}

impl<U: UiSurface> SessionController<U> {
    /// Builds fresh state with exactly one session, already active and drawn.
    pub fn new(ui: U) -> Self {
        let mut store = SessionStore::new();
        let active = store.create_session();
        let mut controller = Self {
            store,
            active,
            ui,
            panel_expanded: false,
            in_flight: HashMap::new(),
            gates: HashMap::new(),
        };
        controller.render_active();
        controller.refresh_session_list();
        controller
    }

    pub fn into_shared(self) -> SharedController<U> {
        Arc::new(Mutex::new(self))
    }

    pub fn active_id(&self) -> SessionId {
        self.active
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn history(&self, id: SessionId) -> &[Message] {
        self.store.history(id)
    }

    pub fn active_history(&self) -> &[Message] {
        self.store.history(self.active)
    }

    pub fn sessions(&self) -> Vec<SessionEntry> {
        self.store.list_sessions()
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut U {
        &mut self.ui
    }

    pub fn is_panel_expanded(&self) -> bool {
        self.panel_expanded
    }

    /// The "new chat" action: create a session and make it active.
    pub fn new_session(&mut self) -> SessionId {
        let id = self.store.create_session();
        debug!(session = %id, "created chat session");
        self.switch_to(id);
        id
    }

    /// Makes `id` the active session and redraws.
    ///
    /// Returns `false` without side effects when `id` is already active or is
    /// not a known session.
    pub fn switch_to(&mut self, id: SessionId) -> bool {
        if id == self.active {
            return false;
        }
        if !self.store.contains(id) {
            debug!(session = %id, "ignoring switch to unknown session");
            return false;
        }

        self.active = id;
        self.render_active();
        self.refresh_session_list();
        if self.panel_expanded {
            self.set_panel_expanded(false);
        }
        true
    }

    pub fn toggle_session_panel(&mut self) -> bool {
        let expanded = !self.panel_expanded;
        self.set_panel_expanded(expanded);
        expanded
    }

    /// Appends to `id`'s history, drawing the message only when `id` is the
    /// session on screen.
    pub fn append_message(&mut self, id: SessionId, message: Message) {
        let preview_before = self.store.get(id).map(|session| session.preview());
        let (sender, is_image) = (message.sender, message.is_image);
        let content = message.content.clone();

        if !self.store.append_message(id, message) {
            debug!(session = %id, "dropping message for unknown session");
            return;
        }

        if id == self.active {
            self.ui.append_message_view(sender, &content, is_image);
            self.ui.scroll_to_end();
        }

        let preview_after = self.store.get(id).map(|session| session.preview());
        if preview_before != preview_after {
            self.refresh_session_list();
        }
    }

    /// Marks a turn for `id` as in flight, showing the indicator if `id` is on
    /// screen.
    pub fn begin_busy(&mut self, id: SessionId) {
        *self.in_flight.entry(id).or_insert(0) += 1;
        if id == self.active {
            self.ui.show_busy_indicator();
            self.ui.scroll_to_end();
        }
    }

    pub fn end_busy(&mut self, id: SessionId) {
        let remaining = match self.in_flight.get_mut(&id) {
            Some(count) => {
                *count = count.saturating_sub(1);
                *count
            }
            None => 0,
        };
        if remaining == 0 {
            self.in_flight.remove(&id);
            if id == self.active {
                self.ui.hide_busy_indicator();
            }
        }
    }

    pub fn is_busy(&self, id: SessionId) -> bool {
        self.in_flight.get(&id).is_some_and(|count| *count > 0)
    }

    /// Gate that serialises submissions targeting the same session.
    pub fn submission_gate(&mut self, id: SessionId) -> Arc<Mutex<()>> {
        Arc::clone(self.gates.entry(id).or_default())
    }

    pub fn clear_input(&mut self) {
        self.ui.clear_input();
    }

    fn render_active(&mut self) {
        self.ui.clear();
        for message in self.store.history(self.active) {
            self.ui
                .append_message_view(message.sender, &message.content, message.is_image);
        }
        if self.is_busy(self.active) {
            self.ui.show_busy_indicator();
        }
        self.ui.scroll_to_end();
    }

    fn refresh_session_list(&mut self) {
        let entries = self.store.list_sessions();
        self.ui.set_session_list(&entries, self.active);
    }

    fn set_panel_expanded(&mut self, expanded: bool) {
        self.panel_expanded = expanded;
        self.ui.set_session_panel_expanded(expanded);
    }
}
