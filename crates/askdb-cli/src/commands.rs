//! Slash command handling

/// Result of executing a slash command
pub enum CommandResult {
    /// Display a message to the user
    Message(String),
    /// Show the conversation so far
    History,
    /// Exit the application
    Exit,
    /// Unknown command
    Unknown(String),
}

/// Execute a slash command
pub fn execute_command(input: &str) -> CommandResult {
    let trimmed = input.trim();
    let command = trimmed.split_whitespace().next().unwrap_or("");

    match command {
        "/help" | "/h" | "/?" => CommandResult::Message(help_message()),
        "/history" => CommandResult::History,
        "/quit" | "/exit" | "/q" => CommandResult::Exit,
        _ => CommandResult::Unknown(command.to_string()),
    }
}

/// Check if input is a slash command
pub fn is_command(input: &str) -> bool {
    input.trim().starts_with('/')
}

fn help_message() -> String {
    r#"Available commands:
  /help, /h, /?    Show this help message
  /history         Replay the conversation so far
  /quit, /exit, /q Exit askdb

Anything else is sent to the assistant as a question about the
Chinook database."#
        .to_string()
}
