use super::CommandResult;
use crate::core::controller::SessionController;
use crate::ui::surface::ChatView;

pub type CommandHandler =
    fn(&mut SessionController<ChatView>, CommandInvocation<'_>) -> CommandResult;

pub struct Command {
    pub name: &'static str,
    pub usage: &'static str,
    pub help: &'static str,
    pub handler: CommandHandler,
}

#[derive(Clone, Copy)]
pub struct CommandInvocation<'a> {
    pub args: &'a str,
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands()
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}

const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        usage: "/help",
        help: "Show available commands and key bindings.",
        handler: super::handle_help,
    },
    Command {
        name: "new",
        usage: "/new",
        help: "Start a new chat and switch to it.",
        handler: super::handle_new,
    },
    Command {
        name: "chats",
        usage: "/chats",
        help: "Show or hide the chat list.",
        handler: super::handle_chats,
    },
    Command {
        name: "switch",
        usage: "/switch <n>",
        help: "Switch to the n-th chat in the list.",
        handler: super::handle_switch,
    },
    Command {
        name: "quit",
        usage: "/quit",
        help: "Leave chatterbox.",
        handler: super::handle_quit,
    },
];
