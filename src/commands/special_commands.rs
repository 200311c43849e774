//! Special commands parser for interactive chat mode
//!
//! Special commands act on the selection or the session instead of being
//! sent to the assistant. They are prefixed with `/` and are
//! case-insensitive.

use colored::Colorize;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Ask the assistant for a routine using the current selection
    GenerateRoutine,

    /// Show the selected products
    ShowSelection,

    /// Toggle a product by id
    Toggle(u64),

    /// Remove a product by id
    Remove(u64),

    /// Clear every selected product
    ClearSelection,

    /// Forget the conversation so far
    ResetConversation,

    /// Show relay and transcript status
    ShowStatus,

    /// Display help information
    Help,

    /// Exit the session
    Exit,

    /// Not a special command; send to the assistant
    None,
}

/// Parse user input into a special command
///
/// # Errors
///
/// Returns `CommandError` for unknown commands or bad arguments
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    match lower.as_str() {
        "/routine" | "/generate" => Ok(SpecialCommand::GenerateRoutine),
        "/selected" | "/selection" => Ok(SpecialCommand::ShowSelection),
        "/clear" => Ok(SpecialCommand::ClearSelection),
        "/reset" => Ok(SpecialCommand::ResetConversation),
        "/status" => Ok(SpecialCommand::ShowStatus),
        "/help" | "/?" => Ok(SpecialCommand::Help),

        "/toggle" => Err(CommandError::MissingArgument {
            command: "/toggle".to_string(),
            usage: "/toggle <product_id>".to_string(),
        }),
        input if input.starts_with("/toggle ") => {
            parse_id("/toggle", &input[8..]).map(SpecialCommand::Toggle)
        }

        "/remove" => Err(CommandError::MissingArgument {
            command: "/remove".to_string(),
            usage: "/remove <product_id>".to_string(),
        }),
        input if input.starts_with("/remove ") => {
            parse_id("/remove", &input[8..]).map(SpecialCommand::Remove)
        }

        "exit" | "quit" | "/exit" | "/quit" => Ok(SpecialCommand::Exit),

        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

fn parse_id(command: &str, arg: &str) -> Result<u64, CommandError> {
    let arg = arg.trim();
    arg.parse().map_err(|_| CommandError::UnsupportedArgument {
        command: command.to_string(),
        arg: arg.to_string(),
    })
}

/// Print the interactive help text
pub fn print_help() {
    println!("{}", "Routine assistant commands".bold());
    println!();
    println!("  {:<18} Generate a routine from the selected products", "/routine".cyan());
    println!("  {:<18} Show the selected products", "/selected".cyan());
    println!("  {:<18} Select or unselect a product", "/toggle <id>".cyan());
    println!("  {:<18} Remove a product from the selection", "/remove <id>".cyan());
    println!("  {:<18} Remove every selected product", "/clear".cyan());
    println!("  {:<18} Start a new conversation", "/reset".cyan());
    println!("  {:<18} Show relay and conversation status", "/status".cyan());
    println!("  {:<18} Show this help", "/help".cyan());
    println!("  {:<18} Leave the session", "/exit".cyan());
    println!();
    println!("Anything else is sent to the assistant as a question.");
    println!();
}
