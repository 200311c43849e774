//! Product catalog
//!
//! The catalog is a static, read-only JSON document of the shape
//! `{ "products": [Product, ...] }`. Sources are re-read on every call so
//! edits to the file are visible on the next interaction.

use crate::error::{Result, RoutineError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

pub mod display;

pub use display::display_products;

/// Minimum Jaro-Winkler similarity for a category suggestion
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// A purchasable item in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product identifier
    pub id: u64,
    /// Display name
    pub name: String,
    /// Brand or product line
    pub brand: String,
    /// Category used for filtering (e.g. "cleanser", "moisturizer")
    pub category: String,
    /// Long-form description shown on hover / in detail views
    pub description: String,
    /// Product image URL
    pub image: String,
}

/// On-disk catalog document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    /// All products in the catalog
    pub products: Vec<Product>,
}

/// A source of catalog data
///
/// Implementations return the full product list every call; callers are
/// expected to filter or look up from the returned list.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Load every product in the catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read or parsed. No retry
    /// is attempted.
    async fn load_products(&self) -> Result<Vec<Product>>;
}

/// Catalog backed by a JSON file on disk
#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    /// Create a catalog source reading from `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for FileCatalog {
    async fn load_products(&self) -> Result<Vec<Product>> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            RoutineError::Catalog(format!(
                "Failed to read catalog {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let catalog: CatalogFile = serde_json::from_str(&contents).map_err(|e| {
            RoutineError::Catalog(format!(
                "Failed to parse catalog {}: {}",
                self.path.display(),
                e
            ))
        })?;

        tracing::debug!(
            "Loaded {} products from {}",
            catalog.products.len(),
            self.path.display()
        );

        Ok(catalog.products)
    }
}

/// In-memory catalog, used by tests and embedders that already hold the data
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    products: Vec<Product>,
}

impl StaticCatalog {
    /// Create a catalog over a fixed product list
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn load_products(&self) -> Result<Vec<Product>> {
        Ok(self.products.clone())
    }
}

/// Products whose category exactly matches `category`
pub fn filter_by_category<'a>(products: &'a [Product], category: &str) -> Vec<&'a Product> {
    products.iter().filter(|p| p.category == category).collect()
}

/// Sorted, de-duplicated category names
pub fn categories(products: &[Product]) -> Vec<String> {
    products
        .iter()
        .map(|p| p.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Look up a product by id
pub fn find_by_id(products: &[Product], id: u64) -> Option<&Product> {
    products.iter().find(|p| p.id == id)
}

/// Closest known category to `input`, if any is similar enough
///
/// Matching is case-insensitive. Returns `None` when `input` already names a
/// category exactly.
pub fn suggest_category(products: &[Product], input: &str) -> Option<String> {
    let needle = input.to_lowercase();

    categories(products)
        .into_iter()
        .filter(|c| *c != input)
        .map(|c| {
            let score = strsim::jaro_winkler(&needle, &c.to_lowercase());
            (c, score)
        })
        .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(c, _)| c)
}
