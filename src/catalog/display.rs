//! Terminal rendering of product cards

use super::Product;
use crate::selection::SelectionSet;
use prettytable::{format, row, Table};

/// Marker shown in the first column of selected products
pub const SELECTED_MARKER: &str = "[x]";
/// Marker shown in the first column of unselected products
pub const UNSELECTED_MARKER: &str = "[ ]";

const MAX_DESCRIPTION_CHARS: usize = 60;

/// Render products as a table, marking those present in `selection`
///
/// Pure function: assumes well-formed input and never fails.
pub fn display_products<'a, I>(products: I, selection: &SelectionSet) -> Table
where
    I: IntoIterator<Item = &'a Product>,
{
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.set_titles(row!["", "ID", "Name", "Brand", "Description"]);

    for product in products {
        let marker = if selection.contains(product.id) {
            SELECTED_MARKER
        } else {
            UNSELECTED_MARKER
        };
        table.add_row(row![
            marker,
            product.id,
            product.name,
            product.brand,
            truncate(&product.description, MAX_DESCRIPTION_CHARS)
        ]);
    }

    table
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}
