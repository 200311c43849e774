//! Catalog browsing commands

use super::{catalog_source, open_selection_store};
use crate::catalog::{self, display_products, CatalogSource};
use crate::config::Config;
use crate::error::Result;
use crate::selection::load_selected_products;
use colored::Colorize;

/// List products, optionally filtered to one category
///
/// # Arguments
///
/// * `config` - Global configuration
/// * `category` - Exact category to filter by
/// * `json` - Print JSON instead of a table
///
/// # Errors
///
/// Returns an error if the catalog or selection store cannot be read
pub async fn list_products(config: &Config, category: Option<&str>, json: bool) -> Result<()> {
    let products = catalog_source(config).load_products().await?;

    let shown: Vec<&catalog::Product> = match category {
        Some(category) => catalog::filter_by_category(&products, category),
        None => products.iter().collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    if shown.is_empty() {
        match category {
            Some(category) => {
                println!(
                    "{}",
                    format!("No products in category '{}'.", category).yellow()
                );
                if let Some(suggestion) = catalog::suggest_category(&products, category) {
                    println!("Did you mean {}?", suggestion.cyan());
                }
            }
            None => println!("{}", "The catalog is empty.".yellow()),
        }
        return Ok(());
    }

    let store = open_selection_store(config)?;
    let selection = load_selected_products(&store);

    display_products(shown.iter().copied(), &selection).printstd();
    println!();
    println!(
        "{} selected. Use {} to add or remove a product.",
        selection.len(),
        "routine-builder select toggle <ID>".cyan()
    );
    Ok(())
}

/// List the categories present in the catalog
///
/// # Errors
///
/// Returns an error if the catalog cannot be read
pub async fn list_categories(config: &Config) -> Result<()> {
    let products = catalog_source(config).load_products().await?;
    let categories = catalog::categories(&products);

    if categories.is_empty() {
        println!("{}", "The catalog is empty.".yellow());
        return Ok(());
    }

    for category in categories {
        let count = catalog::filter_by_category(&products, &category).len();
        println!("{} ({})", category.bold(), count);
    }
    Ok(())
}
