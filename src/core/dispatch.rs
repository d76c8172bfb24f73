//! Turning one submitted line into session messages.
//!
//! A submission runs `parse -> (text | image) -> append`. The target session
//! is captured when the line is submitted, so replies that arrive after the
//! user has switched chats still land in the chat they were asked from.
//! Submissions to the same session queue behind each other; submissions to
//! different sessions run independently.

use std::any::Any;
use std::error::Error;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use tracing::{debug, warn};

use crate::api::{describe_image, GenerationError, GenerationService};
use crate::core::controller::{SessionController, SharedController};
use crate::core::message::Message;
use crate::core::session::SessionId;
use crate::ui::surface::UiSurface;

pub const IMAGE_COMMAND: &str = "/image";
pub const EMPTY_IMAGE_PROMPT_MESSAGE: &str =
    "Please provide a prompt for the image after \"/image\".";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedInput<'a> {
    Empty,
    Text(&'a str),
    /// Image request; the prompt may be empty.
    Image(&'a str),
}

/// Classifies a raw input line. The `/image` prefix is case-sensitive and
/// must be followed by a space, so `/imagefoo` is ordinary text.
pub fn parse_input(raw: &str) -> ParsedInput<'_> {
    let input = raw.trim();
    if input.is_empty() {
        return ParsedInput::Empty;
    }
    if let Some(rest) = input
        .strip_prefix(IMAGE_COMMAND)
        .and_then(|rest| rest.strip_prefix(' '))
    {
        return ParsedInput::Image(rest.trim());
    }
    // "/image " trims down to the bare command.
    if input == IMAGE_COMMAND {
        return ParsedInput::Image("");
    }
    ParsedInput::Text(input)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input; nothing happened.
    Ignored,
    /// `/image` without a prompt; guidance was posted, no request made.
    Rejected,
    Answered,
    /// A failure message was posted instead of an answer.
    Failed,
}

/// Failures that escape the per-step handling and reach the last-resort
/// handler.
#[derive(Debug)]
pub enum DispatchError {
    Generation(GenerationError),
    Panicked(String),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Generation(err) => write!(f, "{err}"),
            DispatchError::Panicked(message) => write!(f, "{message}"),
        }
    }
}

impl Error for DispatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DispatchError::Generation(err) => Some(err),
            DispatchError::Panicked(_) => None,
        }
    }
}

impl From<GenerationError> for DispatchError {
    fn from(err: GenerationError) -> Self {
        DispatchError::Generation(err)
    }
}

/// One submission's hold on its session's busy indicator.
struct Turn {
    target: SessionId,
    busy: bool,
}

impl Turn {
    fn start<U: UiSurface>(
        controller: &mut SessionController<U>,
        target: SessionId,
        input: &str,
    ) -> Self {
        controller.append_message(target, Message::user(input));
        controller.begin_busy(target);
        Self { target, busy: true }
    }

    /// Releases the busy indicator. Safe to call more than once.
    fn finish<U: UiSurface>(&mut self, controller: &mut SessionController<U>) {
        if self.busy {
            self.busy = false;
            controller.end_busy(self.target);
        }
    }
}

pub struct Dispatcher<U> {
    controller: SharedController<U>,
    service: Arc<dyn GenerationService>,
}

impl<U> Clone for Dispatcher<U> {
    fn clone(&self) -> Self {
        Self {
            controller: Arc::clone(&self.controller),
            service: Arc::clone(&self.service),
        }
    }
}

impl<U: UiSurface + Send + 'static> Dispatcher<U> {
    pub fn new(controller: SharedController<U>, service: Arc<dyn GenerationService>) -> Self {
        Self {
            controller,
            service,
        }
    }

    pub fn controller(&self) -> &SharedController<U> {
        &self.controller
    }

    /// Runs one submission against the active session.
    ///
    /// The target is captured and the input cleared before anything is
    /// awaited. Never fails: every error ends up as an AI message in the
    /// target session, and the busy indicator is always released.
    pub async fn submit(&self, raw: &str) -> SubmitOutcome {
        if parse_input(raw) == ParsedInput::Empty {
            return SubmitOutcome::Ignored;
        }
        let target = {
            let mut controller = self.controller.lock().await;
            controller.clear_input();
            controller.active_id()
        };
        self.submit_to(target, raw).await
    }

    /// Runs one submission against `target`, chosen by the caller when the
    /// line was entered. Leaves the input surface alone.
    pub async fn submit_to(&self, target: SessionId, raw: &str) -> SubmitOutcome {
        let parsed = parse_input(raw);
        if parsed == ParsedInput::Empty {
            return SubmitOutcome::Ignored;
        }
        let input = raw.trim();

        let gate = self.controller.lock().await.submission_gate(target);
        let _queued = gate.lock().await;

        debug!(session = %target, ?parsed, "dispatching submission");
        let mut turn = {
            let mut controller = self.controller.lock().await;
            Turn::start(&mut controller, target, input)
        };

        let result = AssertUnwindSafe(self.run_turn(&mut turn, parsed))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                Err(DispatchError::Panicked(panic_message(panic.as_ref())))
            });

        match result {
            Ok(outcome) => {
                debug!(session = %target, ?outcome, "submission finished");
                outcome
            }
            Err(err) => {
                warn!(session = %target, error = %err, "submission failed");
                let mut controller = self.controller.lock().await;
                turn.finish(&mut controller);
                controller.append_message(
                    target,
                    Message::ai(format!("An error occurred: {err}")),
                );
                SubmitOutcome::Failed
            }
        }
    }

    async fn run_turn(
        &self,
        turn: &mut Turn,
        parsed: ParsedInput<'_>,
    ) -> Result<SubmitOutcome, DispatchError> {
        match parsed {
            ParsedInput::Empty => Ok(SubmitOutcome::Ignored),
            ParsedInput::Text(prompt) => {
                let reply = self.service.generate_text(prompt).await;
                self.settle(turn, reply.map(Message::ai)).await
            }
            ParsedInput::Image("") => {
                let mut controller = self.controller.lock().await;
                turn.finish(&mut controller);
                controller
                    .append_message(turn.target, Message::ai(EMPTY_IMAGE_PROMPT_MESSAGE));
                Ok(SubmitOutcome::Rejected)
            }
            ParsedInput::Image(prompt) => {
                let narration = describe_image(self.service.as_ref(), prompt).await;
                self.controller
                    .lock()
                    .await
                    .append_message(turn.target, Message::ai(narration));

                let image = self.service.generate_image(prompt).await;
                self.settle(turn, image.map(Message::ai_image)).await
            }
        }
    }

    /// Posts the result of the final request of a turn and releases the
    /// indicator. Remote failures are posted as messages; anything else is
    /// escalated.
    async fn settle(
        &self,
        turn: &mut Turn,
        result: Result<Message, GenerationError>,
    ) -> Result<SubmitOutcome, DispatchError> {
        let (message, outcome) = match result {
            Ok(message) => (message, SubmitOutcome::Answered),
            Err(err) if err.is_remote() => {
                warn!(
                    session = %turn.target,
                    capability = %err.capability(),
                    error = %err,
                    "generation request failed"
                );
                (Message::ai(err.to_string()), SubmitOutcome::Failed)
            }
            Err(err) => return Err(err.into()),
        };

        let mut controller = self.controller.lock().await;
        turn.finish(&mut controller);
        controller.append_message(turn.target, message);
        Ok(outcome)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unexpected internal failure".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{image_narration_prompt, Capability};
    use crate::core::session::WELCOME_MESSAGE;
    use crate::utils::test_utils::{
        transport_failure, RecordingSurface, ScriptedGenerator, SurfaceEvent,
    };
    use async_trait::async_trait;
    use tokio::sync::Notify;

    fn dispatcher_with(
        generator: Arc<dyn GenerationService>,
    ) -> Dispatcher<RecordingSurface> {
        let controller = SessionController::new(RecordingSurface::default()).into_shared();
        Dispatcher::new(controller, generator)
    }

    fn position(events: &[SurfaceEvent], wanted: &SurfaceEvent) -> usize {
        events
            .iter()
            .position(|event| event == wanted)
            .unwrap_or_else(|| panic!("missing event {wanted:?} in {events:?}"))
    }

    /// Holds every text reply until released.
    struct GatedGenerator {
        started: Notify,
        release: Notify,
        reply: &'static str,
    }

    impl GatedGenerator {
        fn new(reply: &'static str) -> Arc<Self> {
            Arc::new(Self {
                started: Notify::new(),
                release: Notify::new(),
                reply,
            })
        }
    }

    #[async_trait]
    impl GenerationService for GatedGenerator {
        async fn generate_text(&self, _prompt: &str) -> Result<String, GenerationError> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(self.reply.to_string())
        }

        async fn generate_image(&self, _prompt: &str) -> Result<String, GenerationError> {
            Err(transport_failure(Capability::Image, "not scripted"))
        }
    }

    struct PanickingGenerator;

    #[async_trait]
    impl GenerationService for PanickingGenerator {
        async fn generate_text(&self, _prompt: &str) -> Result<String, GenerationError> {
            panic!("generator exploded");
        }

        async fn generate_image(&self, _prompt: &str) -> Result<String, GenerationError> {
            panic!("generator exploded");
        }
    }

    #[test]
    fn parse_input_recognises_only_the_exact_image_prefix() {
        assert_eq!(parse_input("   \t "), ParsedInput::Empty);
        assert_eq!(parse_input("  Hi  "), ParsedInput::Text("Hi"));
        assert_eq!(parse_input("/image  a cat "), ParsedInput::Image("a cat"));
        assert_eq!(parse_input("/image "), ParsedInput::Image(""));
        assert_eq!(parse_input("/imagefoo bar"), ParsedInput::Text("/imagefoo bar"));
        assert_eq!(parse_input("/Image cat"), ParsedInput::Text("/Image cat"));
    }

    #[tokio::test]
    async fn blank_input_changes_nothing() {
        let generator = Arc::new(ScriptedGenerator::new());
        let dispatcher = dispatcher_with(generator.clone());
        dispatcher.controller().lock().await.ui_mut().events.clear();

        for blank in ["", "   ", "\n\t"] {
            assert_eq!(dispatcher.submit(blank).await, SubmitOutcome::Ignored);
        }

        let controller = dispatcher.controller().lock().await;
        assert_eq!(controller.active_history().len(), 1);
        assert!(controller.ui().events.is_empty());
        assert_eq!(generator.request_count(), 0);
    }

    #[tokio::test]
    async fn plain_text_gets_a_single_ai_reply() {
        let generator = Arc::new(ScriptedGenerator::new().with_text(Ok("Hello")));
        let dispatcher = dispatcher_with(generator.clone());

        assert_eq!(dispatcher.submit("Hi").await, SubmitOutcome::Answered);

        let controller = dispatcher.controller().lock().await;
        assert_eq!(
            controller.active_history(),
            &[
                Message::ai(WELCOME_MESSAGE),
                Message::user("Hi"),
                Message::ai("Hello"),
            ]
        );
        assert_eq!(generator.text_prompts.lock().unwrap().as_slice(), &["Hi"]);
        assert!(!controller.ui().busy);
        assert_eq!(controller.ui().count(&SurfaceEvent::ClearInput), 1);
    }

    #[tokio::test]
    async fn submit_to_uses_the_given_session_and_keeps_the_input() {
        let generator = Arc::new(ScriptedGenerator::new().with_text(Ok("Hello")));
        let dispatcher = dispatcher_with(generator);
        let first = dispatcher.controller().lock().await.active_id();
        let second = dispatcher.controller().lock().await.new_session();
        dispatcher.controller().lock().await.ui_mut().events.clear();

        assert_eq!(
            dispatcher.submit_to(first, "Hi").await,
            SubmitOutcome::Answered
        );

        let controller = dispatcher.controller().lock().await;
        assert_eq!(controller.active_id(), second);
        assert_eq!(controller.history(first).len(), 3);
        assert_eq!(controller.history(second).len(), 1);
        assert_eq!(controller.ui().count(&SurfaceEvent::ClearInput), 0);
        assert!(controller.ui().rendered_contents().iter().all(|c| *c != "Hello"));
    }

    #[tokio::test]
    async fn image_command_posts_narration_then_image() {
        let generator = Arc::new(
            ScriptedGenerator::new()
                .with_text(Ok("A cat."))
                .with_image(Ok("https://img/x.png")),
        );
        let dispatcher = dispatcher_with(generator.clone());

        assert_eq!(dispatcher.submit("/image cat").await, SubmitOutcome::Answered);

        let controller = dispatcher.controller().lock().await;
        assert_eq!(
            &controller.active_history()[1..],
            &[
                Message::user("/image cat"),
                Message::ai("A cat."),
                Message::ai_image("https://img/x.png"),
            ]
        );
        assert_eq!(
            generator.text_prompts.lock().unwrap().as_slice(),
            &[image_narration_prompt("cat")]
        );
        assert_eq!(generator.image_prompts.lock().unwrap().as_slice(), &["cat"]);

        let events = &controller.ui().events;
        let shown = position(events, &SurfaceEvent::ShowBusy);
        let narration = position(
            events,
            &SurfaceEvent::Append(crate::core::message::Sender::Ai, "A cat.".into(), false),
        );
        let hidden = position(events, &SurfaceEvent::HideBusy);
        assert!(shown < narration && narration < hidden);
        assert!(!controller.ui().busy);
    }

    #[tokio::test]
    async fn image_without_prompt_only_posts_guidance() {
        let generator = Arc::new(ScriptedGenerator::new());
        let dispatcher = dispatcher_with(generator.clone());

        assert_eq!(dispatcher.submit("/image ").await, SubmitOutcome::Rejected);

        let controller = dispatcher.controller().lock().await;
        let history = controller.active_history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[2], Message::ai(EMPTY_IMAGE_PROMPT_MESSAGE));
        assert_eq!(
            history.iter().filter(|message| !message.is_user()).count(),
            2
        );
        assert_eq!(generator.request_count(), 0);
        assert!(!controller.ui().busy);
    }

    #[tokio::test]
    async fn image_prefix_without_space_is_plain_text() {
        let generator = Arc::new(ScriptedGenerator::new().with_text(Ok("ok")));
        let dispatcher = dispatcher_with(generator.clone());

        dispatcher.submit("/imagefoo bar").await;

        assert_eq!(
            generator.text_prompts.lock().unwrap().as_slice(),
            &["/imagefoo bar"]
        );
        assert!(generator.image_prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn transport_failure_posts_one_error_and_clears_busy() {
        let generator = Arc::new(
            ScriptedGenerator::new()
                .with_text(Err(transport_failure(Capability::Text, "connection reset"))),
        );
        let dispatcher = dispatcher_with(generator);

        assert_eq!(dispatcher.submit("Hi").await, SubmitOutcome::Failed);

        let controller = dispatcher.controller().lock().await;
        let history = controller.active_history();
        assert_eq!(history.len(), 3);
        assert_eq!(
            history[2],
            Message::ai("Network error during text generation: connection reset")
        );
        assert!(!controller.ui().busy);
        assert_eq!(controller.ui().count(&SurfaceEvent::HideBusy), 1);
    }

    #[tokio::test]
    async fn narration_failure_does_not_stop_the_image_request() {
        let generator = Arc::new(
            ScriptedGenerator::new()
                .with_text(Err(transport_failure(Capability::Text, "down")))
                .with_image(Ok("https://img/fox.png")),
        );
        let dispatcher = dispatcher_with(generator);

        assert_eq!(dispatcher.submit("/image fox").await, SubmitOutcome::Answered);

        let controller = dispatcher.controller().lock().await;
        assert_eq!(
            &controller.active_history()[2..],
            &[
                Message::ai("Okay, I'm generating an image for \"fox\"."),
                Message::ai_image("https://img/fox.png"),
            ]
        );
    }

    #[tokio::test]
    async fn image_status_failure_is_reported_in_the_chat() {
        let generator = Arc::new(
            ScriptedGenerator::new()
                .with_text(Ok("Painting now."))
                .with_image(Err(GenerationError::Status {
                    capability: Capability::Image,
                    status: 500,
                    reason: "Internal Server Error".to_string(),
                    body: None,
                })),
        );
        let dispatcher = dispatcher_with(generator);

        assert_eq!(dispatcher.submit("/image fox").await, SubmitOutcome::Failed);

        let controller = dispatcher.controller().lock().await;
        assert_eq!(
            controller.active_history().last(),
            Some(&Message::ai("Error generating image: 500 Internal Server Error"))
        );
        assert!(!controller.ui().busy);
    }

    #[tokio::test]
    async fn local_errors_reach_the_last_resort_handler() {
        let generator = Arc::new(ScriptedGenerator::new().with_text(Err(
            GenerationError::Endpoint {
                capability: Capability::Text,
                endpoint: "nowhere".to_string(),
                reason: "relative URL without a base".to_string(),
            },
        )));
        let dispatcher = dispatcher_with(generator);

        assert_eq!(dispatcher.submit("Hi").await, SubmitOutcome::Failed);

        let controller = dispatcher.controller().lock().await;
        assert_eq!(
            controller.active_history().last(),
            Some(&Message::ai(
                "An error occurred: Invalid text endpoint nowhere: relative URL without a base"
            ))
        );
        assert!(!controller.ui().busy);
    }

    #[tokio::test]
    async fn panics_inside_a_turn_are_contained() {
        let dispatcher = dispatcher_with(Arc::new(PanickingGenerator));

        assert_eq!(dispatcher.submit("Hi").await, SubmitOutcome::Failed);

        let controller = dispatcher.controller().lock().await;
        assert_eq!(
            controller.active_history().last(),
            Some(&Message::ai("An error occurred: generator exploded"))
        );
        assert!(!controller.ui().busy);
    }

    #[tokio::test]
    async fn late_replies_land_in_the_session_they_were_asked_from() {
        let generator = GatedGenerator::new("late answer");
        let dispatcher = dispatcher_with(generator.clone());

        let task = {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move { dispatcher.submit("first question").await })
        };
        generator.started.notified().await;

        let (first, second) = {
            let mut controller = dispatcher.controller().lock().await;
            let first = controller.active_id();
            assert!(controller.ui().busy);
            let second = controller.new_session();
            assert!(!controller.ui().busy);
            (first, second)
        };

        generator.release.notify_one();
        assert_eq!(task.await.expect("submit task"), SubmitOutcome::Answered);

        let controller = dispatcher.controller().lock().await;
        assert_eq!(controller.active_id(), second);
        assert_eq!(
            controller.history(first),
            &[
                Message::ai(WELCOME_MESSAGE),
                Message::user("first question"),
                Message::ai("late answer"),
            ]
        );
        assert_eq!(controller.history(second), &[Message::ai(WELCOME_MESSAGE)]);
        assert_eq!(controller.ui().rendered_contents(), vec![WELCOME_MESSAGE]);
        assert!(!controller.ui().busy);
        assert!(!controller.is_busy(first));
    }

    #[tokio::test]
    async fn submissions_to_one_session_do_not_interleave() {
        let generator = GatedGenerator::new("done");
        let dispatcher = dispatcher_with(generator.clone());

        let first = {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move { dispatcher.submit("one").await })
        };
        generator.started.notified().await;

        let second = {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move { dispatcher.submit("two").await })
        };
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
        assert_eq!(
            dispatcher.controller().lock().await.active_history().len(),
            2
        );

        generator.release.notify_one();
        first.await.expect("first submit");
        generator.started.notified().await;
        generator.release.notify_one();
        second.await.expect("second submit");

        let controller = dispatcher.controller().lock().await;
        let contents: Vec<_> = controller
            .active_history()
            .iter()
            .map(|message| message.content.as_str())
            .collect();
        assert_eq!(contents, vec![WELCOME_MESSAGE, "one", "done", "two", "done"]);
    }
}
