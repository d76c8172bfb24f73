//! Terminal event loop.
//!
//! Keys are applied to the shared controller under its lock; submitted lines
//! are handed to the [`Dispatcher`] on their own task so the loop keeps
//! drawing while requests are in flight.

mod lifecycle;

pub use lifecycle::{restore_terminal, setup_terminal, ChatTerminal};

use std::{error::Error, time::Duration};

use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::commands::{process_input, switch_to_position, CommandResult};
use crate::core::controller::SessionController;
use crate::core::dispatch::{Dispatcher, SubmitOutcome};
use crate::core::session::SessionId;
use crate::ui::renderer::ui;
use crate::ui::surface::ChatView;
use crate::ui::theme::Theme;

const FRAME_DURATION: Duration = Duration::from_millis(1000 / 60);
const SCROLL_STEP: u16 = 5;

pub enum UiEvent {
    Crossterm(Event),
}

#[derive(Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    Exit,
    /// A line for the dispatcher, with the session that was active when it
    /// was entered.
    Submit { target: SessionId, line: String },
}

fn spawn_event_reader(event_tx: mpsc::UnboundedSender<UiEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => continue,
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

/// Applies one key press to the controller.
pub fn handle_key(controller: &mut SessionController<ChatView>, key: KeyEvent) -> KeyOutcome {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    match key.code {
        KeyCode::Esc => KeyOutcome::Exit,
        KeyCode::Char('c') if ctrl => KeyOutcome::Exit,
        KeyCode::Char('n') if ctrl => {
            let id = controller.new_session();
            controller.ui_mut().set_status(format!("Started {id}"));
            KeyOutcome::Continue
        }
        KeyCode::Char(digit @ '1'..='9') if alt => {
            let position = digit as usize - '0' as usize;
            switch_to_position(controller, position);
            KeyOutcome::Continue
        }
        KeyCode::Tab => {
            controller.toggle_session_panel();
            KeyOutcome::Continue
        }
        KeyCode::PageUp => {
            controller.ui_mut().scroll_up(SCROLL_STEP);
            KeyOutcome::Continue
        }
        KeyCode::PageDown => {
            controller.ui_mut().scroll_down(SCROLL_STEP);
            KeyOutcome::Continue
        }
        KeyCode::Backspace => {
            controller.ui_mut().input.pop();
            KeyOutcome::Continue
        }
        KeyCode::Enter => submit_line(controller),
        KeyCode::Char(c) if !ctrl && !alt => {
            controller.ui_mut().input.push(c);
            KeyOutcome::Continue
        }
        _ => KeyOutcome::Continue,
    }
}

fn submit_line(controller: &mut SessionController<ChatView>) -> KeyOutcome {
    // Blank lines leave the input box untouched.
    if controller.ui().input.trim().is_empty() {
        return KeyOutcome::Continue;
    }
    controller.ui_mut().status = None;
    let line = controller.ui_mut().take_input();
    match process_input(controller, &line) {
        CommandResult::Continue => KeyOutcome::Continue,
        CommandResult::Exit => KeyOutcome::Exit,
        CommandResult::ProcessAsMessage(line) => KeyOutcome::Submit {
            target: controller.active_id(),
            line,
        },
    }
}

/// Runs a submission on its own task so the loop keeps drawing.
pub fn spawn_submit(
    dispatcher: &Dispatcher<ChatView>,
    target: SessionId,
    line: String,
) -> JoinHandle<SubmitOutcome> {
    let dispatcher = dispatcher.clone();
    tokio::spawn(async move { dispatcher.submit_to(target, &line).await })
}

pub async fn run_chat(
    dispatcher: Dispatcher<ChatView>,
    theme: Theme,
) -> Result<(), Box<dyn Error>> {
    let mut terminal = setup_terminal()?;

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<UiEvent>();
    let event_reader = spawn_event_reader(event_tx);

    let result = event_loop(&mut terminal, &dispatcher, &theme, &mut event_rx).await;

    event_reader.abort();
    restore_terminal(&mut terminal)?;
    info!("chat session ended");
    result
}

async fn event_loop(
    terminal: &mut ChatTerminal,
    dispatcher: &Dispatcher<ChatView>,
    theme: &Theme,
    event_rx: &mut mpsc::UnboundedReceiver<UiEvent>,
) -> Result<(), Box<dyn Error>> {
    loop {
        {
            let controller = dispatcher.controller().lock().await;
            terminal.draw(|f| ui(f, controller.ui(), theme))?;
        }

        tokio::select! {
            Some(UiEvent::Crossterm(ev)) = event_rx.recv() => {
                let outcome = {
                    let mut controller = dispatcher.controller().lock().await;
                    apply_event(&mut controller, ev)
                };
                match outcome {
                    KeyOutcome::Continue => {}
                    KeyOutcome::Exit => return Ok(()),
                    KeyOutcome::Submit { target, line } => {
                        debug!(session = %target, "submitting line from the input box");
                        spawn_submit(dispatcher, target, line);
                    }
                }
            }
            _ = tokio::time::sleep(FRAME_DURATION) => {}
        }
    }
}

fn apply_event(controller: &mut SessionController<ChatView>, ev: Event) -> KeyOutcome {
    match ev {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(controller, key),
        Event::Paste(text) => {
            controller.ui_mut().input.push_str(&text);
            KeyOutcome::Continue
        }
        _ => KeyOutcome::Continue,
    }
}
