#[cfg(test)]
use std::collections::VecDeque;
#[cfg(test)]
use std::sync::Mutex;

#[cfg(test)]
use async_trait::async_trait;

#[cfg(test)]
use crate::api::{Capability, GenerationError, GenerationService};
#[cfg(test)]
use crate::core::message::Sender;
#[cfg(test)]
use crate::core::session::{SessionEntry, SessionId};
#[cfg(test)]
use crate::ui::surface::UiSurface;

#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    Clear,
    Append(Sender, String, bool),
    ScrollToEnd,
    SessionList(SessionId),
    ShowBusy,
    HideBusy,
    Panel(bool),
    ClearInput,
}

/// A [`UiSurface`] that keeps the current screen state and every call made
/// against it.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub events: Vec<SurfaceEvent>,
    pub rendered: Vec<(Sender, String, bool)>,
    pub entries: Vec<SessionEntry>,
    pub active: Option<SessionId>,
    pub busy: bool,
    pub panel_expanded: bool,
}

#[cfg(test)]
impl RecordingSurface {
    pub fn rendered_contents(&self) -> Vec<&str> {
        self.rendered
            .iter()
            .map(|(_, content, _)| content.as_str())
            .collect()
    }

    pub fn count(&self, event: &SurfaceEvent) -> usize {
        self.events.iter().filter(|seen| *seen == event).count()
    }
}

#[cfg(test)]
impl UiSurface for RecordingSurface {
    fn clear(&mut self) {
        self.events.push(SurfaceEvent::Clear);
        self.rendered.clear();
        self.busy = false;
    }

    fn append_message_view(&mut self, sender: Sender, content: &str, is_image: bool) {
        self.events
            .push(SurfaceEvent::Append(sender, content.to_string(), is_image));
        self.rendered.push((sender, content.to_string(), is_image));
    }

    fn scroll_to_end(&mut self) {
        self.events.push(SurfaceEvent::ScrollToEnd);
    }

    fn set_session_list(&mut self, entries: &[SessionEntry], active: SessionId) {
        self.events.push(SurfaceEvent::SessionList(active));
        self.entries = entries.to_vec();
        self.active = Some(active);
    }

    fn show_busy_indicator(&mut self) {
        self.events.push(SurfaceEvent::ShowBusy);
        self.busy = true;
    }

    fn hide_busy_indicator(&mut self) {
        self.events.push(SurfaceEvent::HideBusy);
        self.busy = false;
    }

    fn set_session_panel_expanded(&mut self, expanded: bool) {
        self.events.push(SurfaceEvent::Panel(expanded));
        self.panel_expanded = expanded;
    }

    fn clear_input(&mut self) {
        self.events.push(SurfaceEvent::ClearInput);
    }
}

/// A [`GenerationService`] that replays queued results and records prompts.
#[cfg(test)]
#[derive(Default)]
pub struct ScriptedGenerator {
    text: Mutex<VecDeque<Result<String, GenerationError>>>,
    image: Mutex<VecDeque<Result<String, GenerationError>>>,
    pub text_prompts: Mutex<Vec<String>>,
    pub image_prompts: Mutex<Vec<String>>,
}

#[cfg(test)]
impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(self, result: Result<&str, GenerationError>) -> Self {
        self.text
            .lock()
            .unwrap()
            .push_back(result.map(str::to_string));
        self
    }

    pub fn with_image(self, result: Result<&str, GenerationError>) -> Self {
        self.image
            .lock()
            .unwrap()
            .push_back(result.map(str::to_string));
        self
    }

    pub fn request_count(&self) -> usize {
        self.text_prompts.lock().unwrap().len() + self.image_prompts.lock().unwrap().len()
    }
}

#[cfg(test)]
#[async_trait]
impl GenerationService for ScriptedGenerator {
    async fn generate_text(&self, prompt: &str) -> Result<String, GenerationError> {
        self.text_prompts.lock().unwrap().push(prompt.to_string());
        self.text
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(transport_failure(Capability::Text, "no scripted reply")))
    }

    async fn generate_image(&self, prompt: &str) -> Result<String, GenerationError> {
        self.image_prompts.lock().unwrap().push(prompt.to_string());
        self.image
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(transport_failure(Capability::Image, "no scripted reply")))
    }
}

#[cfg(test)]
pub fn transport_failure(capability: Capability, reason: &str) -> GenerationError {
    GenerationError::Transport {
        capability,
        reason: reason.to_string(),
    }
}
