//! Slash commands available in the chat loop.

use std::io::Write;

use console::style;

#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    Help,
    /// Show the session bound to this conversation.
    Status,
    Clear,
    Exit,
    Unknown(String),
}

/// Parse user input as a slash command. `None` means a plain message.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let cmd = trimmed
        .split_whitespace()
        .next()
        .unwrap_or(trimmed)
        .to_lowercase();

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/status" | "/s" => Some(ChatCommand::Status),
        "/clear" | "/cls" => Some(ChatCommand::Clear),
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        _ => Some(ChatCommand::Unknown(cmd)),
    }
}

pub fn write_help(out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "  {}", style("Available commands:").bold())?;
    writeln!(out)?;
    for (name, help) in [
        ("/help", "Show this help message"),
        ("/status", "Show the session behind this conversation"),
        ("/clear", "Clear the screen"),
        ("/exit", "End the conversation"),
    ] {
        writeln!(out, "  {:<10}{}", style(name).cyan(), help)?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "  {}",
        style("Messages sent in quick succession are answered once, after the last one.").dim()
    )?;
    writeln!(out)
}
