//! Front-end slash commands.
//!
//! These are resolved before a line reaches the dispatch pipeline. Anything
//! that is not a known command, including `/image ...`, is handed back as a
//! message to submit.

mod registry;

pub use registry::{all_commands, CommandInvocation};

use crate::core::controller::SessionController;
use crate::ui::surface::ChatView;

#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    Continue,
    Exit,
    ProcessAsMessage(String),
}

pub const KEY_HELP: &[(&str, &str)] = &[
    ("Enter", "Send the message"),
    ("Ctrl+N", "New chat"),
    ("Tab", "Show or hide the chat list"),
    ("Alt+1..9", "Switch to chat n"),
    ("PgUp/PgDn", "Scroll the conversation"),
    ("Ctrl+C / Esc", "Quit"),
];

pub fn process_input(controller: &mut SessionController<ChatView>, input: &str) -> CommandResult {
    let trimmed = input.trim();

    let Some(rest) = trimmed.strip_prefix('/') else {
        return CommandResult::ProcessAsMessage(input.to_string());
    };

    let mut parts = rest.splitn(2, ' ');
    let command_name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return CommandResult::ProcessAsMessage(input.to_string()),
    };
    let args = parts.next().unwrap_or("").trim();

    match registry::find_command(command_name) {
        Some(command) => {
            let invocation = CommandInvocation { args };
            (command.handler)(controller, invocation)
        }
        None => CommandResult::ProcessAsMessage(input.to_string()),
    }
}

/// Switches to the chat at `position` in the list (starting at 1).
pub fn switch_to_position(controller: &mut SessionController<ChatView>, position: usize) -> bool {
    let sessions = controller.sessions();
    let Some(entry) = position.checked_sub(1).and_then(|index| sessions.get(index)) else {
        controller
            .ui_mut()
            .set_status(format!("No chat #{position} (there are {})", sessions.len()));
        return false;
    };
    let id = entry.id;
    if controller.switch_to(id) {
        controller.ui_mut().set_status(format!("Switched to chat #{position}"));
    }
    true
}

fn handle_help(
    controller: &mut SessionController<ChatView>,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    let mut help = String::from("Commands:\n");
    help.push_str("  /image <prompt>  Generate an image\n");
    for command in all_commands() {
        help.push_str(&format!("  {:<16} {}\n", command.usage, command.help));
    }
    help.push_str("Keys:\n");
    for (keys, description) in KEY_HELP {
        help.push_str(&format!("  {keys:<16} {description}\n"));
    }
    controller.ui_mut().push_notice(help.trim_end());
    CommandResult::Continue
}

fn handle_new(
    controller: &mut SessionController<ChatView>,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    let id = controller.new_session();
    controller.ui_mut().set_status(format!("Started {id}"));
    CommandResult::Continue
}

fn handle_chats(
    controller: &mut SessionController<ChatView>,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    controller.toggle_session_panel();
    CommandResult::Continue
}

fn handle_switch(
    controller: &mut SessionController<ChatView>,
    invocation: CommandInvocation<'_>,
) -> CommandResult {
    match invocation.args.parse::<usize>() {
        Ok(position) => {
            switch_to_position(controller, position);
        }
        Err(_) => controller.ui_mut().set_status("Usage: /switch <n>"),
    }
    CommandResult::Continue
}

fn handle_quit(
    _controller: &mut SessionController<ChatView>,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    CommandResult::Exit
}
