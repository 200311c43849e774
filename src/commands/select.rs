//! Selection management commands

use super::{catalog_source, open_selection_store};
use crate::cli::SelectCommand;
use crate::config::Config;
use crate::error::Result;
use crate::selection::{
    clear_all_selected_products, load_selected_products, remove_selected_product,
    render_selected_list, toggle_product_selection, ToggleOutcome,
};
use colored::Colorize;

/// Handle selection commands
///
/// # Errors
///
/// Returns an error if the catalog or store cannot be accessed
pub async fn handle_select(config: &Config, command: SelectCommand) -> Result<()> {
    let store = open_selection_store(config)?;
    let mut selection = load_selected_products(&store);

    match command {
        SelectCommand::Toggle { id } => {
            let catalog = catalog_source(config);
            match toggle_product_selection(&catalog, &mut selection, &store, id).await? {
                ToggleOutcome::Added(product) => {
                    println!("{}", format!("Selected {}", product.name).green());
                }
                ToggleOutcome::Removed(product) => {
                    println!("{}", format!("Unselected {}", product.name).yellow());
                }
                ToggleOutcome::NotFound => {
                    println!("{}", format!("No product with id {}", id).red());
                }
            }
        }
        SelectCommand::Remove { id } => match remove_selected_product(&store, &mut selection, id)? {
            Some(product) => println!("{}", format!("Removed {}", product.name).yellow()),
            None => println!("Product {} was not selected.", id),
        },
        SelectCommand::Clear => {
            clear_all_selected_products(&store, &mut selection)?;
            println!("{}", "Cleared all selected products.".green());
        }
        SelectCommand::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&selection)?);
            } else {
                println!("{}", "Selected products:".bold());
                println!("{}", render_selected_list(&selection));
            }
        }
    }

    Ok(())
}
