//! Slash-command parsing for the chat loop.
//!
//! Anything that does not start with `/` (or names no known command) is
//! treated as a chat message.

use crate::core::app::ChatApp;

pub enum CommandResult {
    Continue,
    ProcessAsMessage(String),
    EndSession,
    Logout,
    Quit,
}

const HELP_TEXT: &str = "\
Commands:
  /end     End this session and get a summary
  /logout  Log out and clear your saved login
  /log     Toggle transcript logging (or /log <file> to set the file)
  /quit    Leave without ending the session
Saying goodbye also ends the session.";

pub fn process_input(app: &mut ChatApp, input: &str) -> CommandResult {
    let trimmed = input.trim();

    if !trimmed.starts_with('/') {
        return CommandResult::ProcessAsMessage(input.to_string());
    }

    let mut parts = trimmed[1..].splitn(2, ' ');
    let command_name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return CommandResult::ProcessAsMessage(input.to_string()),
    };
    let args = parts.next().unwrap_or("").trim();

    match command_name {
        "help" => {
            app.controller.note(HELP_TEXT);
            CommandResult::Continue
        }
        "end" => CommandResult::EndSession,
        "logout" => CommandResult::Logout,
        "quit" => CommandResult::Quit,
        "log" => {
            let result = if args.is_empty() {
                app.log.toggle()
            } else {
                app.log.set_log_file(args.to_string())
            };
            match result {
                Ok(message) => app.controller.note(message),
                Err(err) => app.controller.note(format!("Log error: {}", err)),
            }
            CommandResult::Continue
        }
        _ => CommandResult::ProcessAsMessage(input.to_string()),
    }
}
