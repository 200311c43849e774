//! Selection set management
//!
//! The selection set is the user's in-progress subset of the catalog. It is
//! an explicitly owned container: callers hold a [`SelectionSet`] and pass it
//! to the operations below alongside a [`SelectionStore`] that persists it.

use crate::catalog::{find_by_id, CatalogSource, Product};
use crate::error::Result;
use serde::{Deserialize, Serialize};

pub mod store;

pub use store::{MemorySelectionStore, SelectionStore, SledSelectionStore, SELECTION_KEY};

/// Hint shown when nothing is selected
pub const EMPTY_SELECTION_HINT: &str =
    "No products selected yet. Select products from the catalog to add them.";

/// Ordered collection of products, unique by id
///
/// Serializes as a plain JSON array of products.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionSet {
    products: Vec<Product>,
}

impl SelectionSet {
    /// Create an empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a selection from products, keeping the first occurrence of each id
    pub fn from_products(products: impl IntoIterator<Item = Product>) -> Self {
        let mut set = Self::new();
        for product in products {
            if !set.contains(product.id) {
                set.products.push(product);
            }
        }
        set
    }

    /// Add `product` if absent, remove it if present
    ///
    /// # Returns
    ///
    /// `true` if the product is selected after the call
    pub fn toggle(&mut self, product: Product) -> bool {
        if let Some(index) = self.position(product.id) {
            self.products.remove(index);
            false
        } else {
            self.products.push(product);
            true
        }
    }

    /// Remove the product with `id`; a no-op if it is not selected
    ///
    /// # Returns
    ///
    /// The removed product, if any
    pub fn remove(&mut self, id: u64) -> Option<Product> {
        self.position(id).map(|index| self.products.remove(index))
    }

    /// Remove every product
    pub fn clear(&mut self) {
        self.products.clear();
    }

    /// Whether a product with `id` is selected
    pub fn contains(&self, id: u64) -> bool {
        self.position(id).is_some()
    }

    /// Selected products in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    /// Selected products as a slice
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Number of selected products
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether nothing is selected
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    fn position(&self, id: u64) -> Option<usize> {
        self.products.iter().position(|p| p.id == id)
    }
}

/// Result of [`toggle_product_selection`]
#[derive(Debug, Clone, PartialEq)]
pub enum ToggleOutcome {
    /// The product was added to the selection
    Added(Product),
    /// The product was removed from the selection
    Removed(Product),
    /// No product with the requested id exists in the catalog
    NotFound,
}

/// Persist `selection` to `store` as a JSON array
///
/// # Errors
///
/// Returns an error if serialization or the store write fails
pub fn save_selected_products(store: &dyn SelectionStore, selection: &SelectionSet) -> Result<()> {
    let json = serde_json::to_string(selection)?;
    store.save_raw(&json)?;
    tracing::debug!("Saved {} selected products", selection.len());
    Ok(())
}

/// Load the persisted selection
///
/// Fails soft: an empty slot, unreadable storage, or malformed data all
/// yield an empty selection. The latter two are logged.
pub fn load_selected_products(store: &dyn SelectionStore) -> SelectionSet {
    let raw = match store.load_raw() {
        Ok(Some(raw)) => raw,
        Ok(None) => return SelectionSet::new(),
        Err(e) => {
            tracing::warn!("Failed to read saved selection, starting empty: {}", e);
            return SelectionSet::new();
        }
    };

    match serde_json::from_str::<Vec<Product>>(&raw) {
        Ok(products) => SelectionSet::from_products(products),
        Err(e) => {
            tracing::warn!("Saved selection is malformed, starting empty: {}", e);
            SelectionSet::new()
        }
    }
}

/// Clear `selection` and the persisted slot
///
/// # Errors
///
/// Returns an error if the store cannot be cleared
pub fn clear_all_selected_products(
    store: &dyn SelectionStore,
    selection: &mut SelectionSet,
) -> Result<()> {
    selection.clear();
    store.clear()?;
    tracing::info!("Cleared all selected products");
    Ok(())
}

/// Toggle the product with `id`, looking it up in a freshly loaded catalog
///
/// Unknown ids leave the selection and store untouched. Otherwise the
/// updated selection is persisted.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded or the store write fails
pub async fn toggle_product_selection(
    catalog: &dyn CatalogSource,
    selection: &mut SelectionSet,
    store: &dyn SelectionStore,
    id: u64,
) -> Result<ToggleOutcome> {
    let products = catalog.load_products().await?;
    let Some(product) = find_by_id(&products, id).cloned() else {
        tracing::debug!("Toggle ignored, product {} not in catalog", id);
        return Ok(ToggleOutcome::NotFound);
    };

    let outcome = if selection.toggle(product.clone()) {
        ToggleOutcome::Added(product)
    } else {
        ToggleOutcome::Removed(product)
    };

    save_selected_products(store, selection)?;
    Ok(outcome)
}

/// Remove the product with `id` from `selection` and persist the result
///
/// # Returns
///
/// The removed product, or `None` if it was not selected (nothing is written)
///
/// # Errors
///
/// Returns an error if the store write fails
pub fn remove_selected_product(
    store: &dyn SelectionStore,
    selection: &mut SelectionSet,
    id: u64,
) -> Result<Option<Product>> {
    let removed = selection.remove(id);
    if removed.is_some() {
        save_selected_products(store, selection)?;
    }
    Ok(removed)
}

/// Render the selection as a bulleted list, or the empty-state hint
pub fn render_selected_list(selection: &SelectionSet) -> String {
    if selection.is_empty() {
        return EMPTY_SELECTION_HINT.to_string();
    }

    selection
        .iter()
        .map(|p| format!("  - [{}] {} ({})", p.id, p.name, p.brand))
        .collect::<Vec<_>>()
        .join("\n")
}
