//! TUI-less "say" command

use std::error::Error;
use std::sync::Arc;

use crate::api::GenerationService;
use crate::core::controller::SessionController;
use crate::core::dispatch::{Dispatcher, SubmitOutcome};
use crate::core::message::Message;
use crate::ui::surface::ChatView;

/// Runs one submission in a fresh chat and renders what came back.
///
/// Plain output is every reply posted after the prompt, one per line; JSON
/// output is the full session history.
pub async fn run_say(
    service: Arc<dyn GenerationService>,
    prompt: &str,
    json: bool,
) -> Result<(SubmitOutcome, String), Box<dyn Error>> {
    let controller = SessionController::new(ChatView::new()).into_shared();
    let dispatcher = Dispatcher::new(Arc::clone(&controller), service);

    let outcome = dispatcher.submit(prompt).await;

    let controller = controller.lock().await;
    let history = controller.active_history();
    let output = if json {
        serde_json::to_string_pretty(history)?
    } else {
        render_replies(history)
    };
    Ok((outcome, output))
}

fn render_replies(history: &[Message]) -> String {
    let Some(prompt_index) = history.iter().position(Message::is_user) else {
        return String::new();
    };
    history[prompt_index + 1..]
        .iter()
        .map(|message| message.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
