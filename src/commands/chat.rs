//! Interactive chat mode handler.
//!
//! Builds a [`ChatSession`] against the configured relay and runs a
//! readline-based loop. Plain input goes to the assistant; `/` commands act
//! on the selection or the session.

use super::special_commands::{parse_special_command, print_help, SpecialCommand};
use super::{catalog_source, chat_session, open_selection_store};
use crate::catalog::CatalogSource;
use crate::chat::{ChatSession, Role};
use crate::config::Config;
use crate::error::{Result, RoutineError};
use crate::selection::{
    clear_all_selected_products, load_selected_products, remove_selected_product,
    render_selected_list, toggle_product_selection, SelectionSet, SelectionStore, ToggleOutcome,
};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Start interactive chat mode
///
/// # Arguments
///
/// * `config` - Global configuration (consumed)
///
/// # Errors
///
/// Returns an error if the store, relay client, or terminal cannot be set up
pub async fn run_chat(config: Config) -> Result<()> {
    tracing::info!("Starting interactive chat mode");

    let catalog = catalog_source(&config);
    let store = open_selection_store(&config)?;
    let mut selection = load_selected_products(&store);
    let session = chat_session(&config)?;

    let mut rl = DefaultEditor::new()?;

    print_welcome_banner(&config, &selection);

    loop {
        let prompt = format!("{} ", "routine>".magenta().bold());
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                rl.add_history_entry(trimmed)?;

                let command = match parse_special_command(trimmed) {
                    Ok(command) => command,
                    Err(e) => {
                        println!("{}", e.to_string().red());
                        continue;
                    }
                };

                match command {
                    SpecialCommand::GenerateRoutine => {
                        if selection.is_empty() {
                            println!(
                                "{}",
                                "Select at least one product before generating a routine."
                                    .yellow()
                            );
                            continue;
                        }
                        println!("{}", "Thinking...".dimmed());
                        let reply = session.request_routine(&selection).await;
                        print_reply(&session, reply.is_ok()).await;
                    }
                    SpecialCommand::ShowSelection => {
                        println!("{}", render_selected_list(&selection));
                    }
                    SpecialCommand::Toggle(_)
                    | SpecialCommand::Remove(_)
                    | SpecialCommand::ClearSelection => {
                        let line = edit_selection(&command, &catalog, &store, &mut selection).await;
                        println!("{}", line);
                    }
                    SpecialCommand::ResetConversation => {
                        session.reset().await;
                        println!("{}", "Started a new conversation.".green());
                    }
                    SpecialCommand::ShowStatus => {
                        let transcript = session.transcript().await;
                        println!("Relay:     {}", config.client.relay_url.cyan());
                        println!("Selected:  {}", selection.len());
                        println!(
                            "Messages:  {} from you, {} from the assistant",
                            transcript.count_role(Role::User),
                            transcript.count_role(Role::Assistant)
                        );
                    }
                    SpecialCommand::Help => print_help(),
                    SpecialCommand::Exit => break,
                    SpecialCommand::None => {
                        println!("{}", "Thinking...".dimmed());
                        let reply = session.submit(trimmed).await;
                        print_reply(&session, reply.is_ok()).await;
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(e) => {
                tracing::error!("Readline failed: {}", e);
                return Err(e.into());
            }
        }
    }

    Ok(())
}

/// Generate a routine for the persisted selection and print it
///
/// # Errors
///
/// Returns an error if nothing is selected or the relay call fails
pub async fn run_routine(config: Config) -> Result<()> {
    let store = open_selection_store(&config)?;
    let selection = load_selected_products(&store);

    if selection.is_empty() {
        return Err(RoutineError::Selection(
            "no products selected; use `routine-builder select toggle <ID>` first".to_string(),
        )
        .into());
    }

    tracing::info!("Generating routine for {} products", selection.len());
    let session = chat_session(&config)?;

    match session.request_routine(&selection).await {
        Ok(routine) => {
            println!("{}", routine);
            Ok(())
        }
        Err(e) => {
            let transcript = session.transcript().await;
            if let Some(entry) = transcript.entries().last() {
                eprintln!("{}", entry.message.content.red());
            }
            Err(e)
        }
    }
}

/// Apply a selection-editing command and describe the result
///
/// Catalog and store failures are reported in the returned line, so a bad
/// write never ends the chat loop.
async fn edit_selection(
    command: &SpecialCommand,
    catalog: &dyn CatalogSource,
    store: &dyn SelectionStore,
    selection: &mut SelectionSet,
) -> String {
    match *command {
        SpecialCommand::Toggle(id) => {
            match toggle_product_selection(catalog, selection, store, id).await {
                Ok(ToggleOutcome::Added(p)) => format!("Selected {}", p.name).green().to_string(),
                Ok(ToggleOutcome::Removed(p)) => {
                    format!("Unselected {}", p.name).yellow().to_string()
                }
                Ok(ToggleOutcome::NotFound) => {
                    format!("No product with id {}", id).red().to_string()
                }
                Err(e) => format!("Toggle failed: {}", e).red().to_string(),
            }
        }
        SpecialCommand::Remove(id) => match remove_selected_product(store, selection, id) {
            Ok(Some(p)) => format!("Removed {}", p.name).yellow().to_string(),
            Ok(None) => format!("Product {} was not selected.", id),
            Err(e) => format!("Remove failed: {}", e).red().to_string(),
        },
        SpecialCommand::ClearSelection => match clear_all_selected_products(store, selection) {
            Ok(()) => "Cleared all selected products.".green().to_string(),
            Err(e) => format!("Clear failed: {}", e).red().to_string(),
        },
        _ => String::new(),
    }
}

async fn print_reply(session: &ChatSession, ok: bool) {
    let transcript = session.transcript().await;
    let Some(entry) = transcript.entries().last() else {
        return;
    };

    println!();
    if ok {
        println!("{}", entry.message.content);
    } else {
        println!("{}", entry.message.content.red());
    }
    println!();
}

fn print_welcome_banner(config: &Config, selection: &SelectionSet) {
    println!();
    println!("{}", "Routine assistant".bold());
    println!("Relay: {}", config.client.relay_url.cyan());
    println!("{} product(s) selected.", selection.len());
    println!(
        "Type {} to build a routine, {} for commands.",
        "/routine".cyan(),
        "/help".cyan()
    );
    println!();
}
