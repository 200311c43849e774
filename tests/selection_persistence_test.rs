//! Selection persistence tests
//!
//! Exercise the selection operations against a sled store in a temporary
//! directory and the bundled catalog file.

use routine_builder::catalog::FileCatalog;
use routine_builder::selection::{
    clear_all_selected_products, load_selected_products, remove_selected_product,
    render_selected_list, save_selected_products, toggle_product_selection, SelectionSet,
    SelectionStore, SledSelectionStore, ToggleOutcome, EMPTY_SELECTION_HINT,
};
use tempfile::TempDir;

mod common;
use common::temp_catalog_file;

fn bundled_catalog() -> FileCatalog {
    FileCatalog::new(concat!(env!("CARGO_MANIFEST_DIR"), "/data/products.json"))
}

fn single_product_catalog(id: u64, name: &str) -> String {
    serde_json::json!({
        "products": [{
            "id": id,
            "name": name,
            "brand": "B",
            "category": "c",
            "description": "d",
            "image": "i"
        }]
    })
    .to_string()
}

fn open_store() -> (TempDir, SledSelectionStore) {
    let dir = TempDir::new().expect("tempdir");
    let store = SledSelectionStore::open(dir.path().join("selection.db")).expect("open store");
    (dir, store)
}

#[tokio::test]
async fn test_toggle_persists_and_reloads() {
    let (_dir, store) = open_store();
    let catalog = bundled_catalog();
    let mut selection = load_selected_products(&store);
    assert!(selection.is_empty());

    let outcome = toggle_product_selection(&catalog, &mut selection, &store, 1)
        .await
        .unwrap();
    assert!(matches!(outcome, ToggleOutcome::Added(ref p) if p.id == 1));
    toggle_product_selection(&catalog, &mut selection, &store, 4)
        .await
        .unwrap();

    let reloaded = load_selected_products(&store);
    assert_eq!(reloaded, selection);
    let ids: Vec<u64> = reloaded.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 4]);
}

#[tokio::test]
async fn test_toggle_twice_leaves_store_empty_array() {
    let (_dir, store) = open_store();
    let catalog = bundled_catalog();
    let mut selection = SelectionSet::new();

    toggle_product_selection(&catalog, &mut selection, &store, 2)
        .await
        .unwrap();
    let outcome = toggle_product_selection(&catalog, &mut selection, &store, 2)
        .await
        .unwrap();

    assert!(matches!(outcome, ToggleOutcome::Removed(ref p) if p.id == 2));
    assert!(selection.is_empty());
    assert_eq!(store.load_raw().unwrap().as_deref(), Some("[]"));
}

#[tokio::test]
async fn test_unknown_id_does_not_write() {
    let (_dir, store) = open_store();
    let catalog = bundled_catalog();
    let mut selection = SelectionSet::new();

    let outcome = toggle_product_selection(&catalog, &mut selection, &store, 999)
        .await
        .unwrap();

    assert_eq!(outcome, ToggleOutcome::NotFound);
    assert!(store.load_raw().unwrap().is_none());
}

#[tokio::test]
async fn test_toggle_sees_catalog_edits() {
    let (_catalog_dir, catalog_path) = temp_catalog_file(&single_product_catalog(1, "Old"));
    let catalog = FileCatalog::new(&catalog_path);
    let (_dir, store) = open_store();
    let mut selection = SelectionSet::new();

    // Product 2 only exists after the file changes.
    let before = toggle_product_selection(&catalog, &mut selection, &store, 2)
        .await
        .unwrap();
    assert_eq!(before, ToggleOutcome::NotFound);

    std::fs::write(&catalog_path, single_product_catalog(2, "New")).unwrap();

    let after = toggle_product_selection(&catalog, &mut selection, &store, 2)
        .await
        .unwrap();
    assert!(matches!(after, ToggleOutcome::Added(ref p) if p.name == "New"));
}

#[tokio::test]
async fn test_remove_and_clear_update_store() {
    let (_dir, store) = open_store();
    let catalog = bundled_catalog();
    let mut selection = SelectionSet::new();
    for id in [1, 3, 5] {
        toggle_product_selection(&catalog, &mut selection, &store, id)
            .await
            .unwrap();
    }

    let removed = remove_selected_product(&store, &mut selection, 3).unwrap();
    assert_eq!(removed.map(|p| p.id), Some(3));
    assert_eq!(load_selected_products(&store).len(), 2);

    assert!(remove_selected_product(&store, &mut selection, 3)
        .unwrap()
        .is_none());

    clear_all_selected_products(&store, &mut selection).unwrap();
    assert!(selection.is_empty());
    assert!(store.load_raw().unwrap().is_none());
    assert_eq!(render_selected_list(&load_selected_products(&store)), EMPTY_SELECTION_HINT);
}

#[test]
fn test_malformed_slot_loads_empty() {
    let (_dir, store) = open_store();
    store.save_raw("{ definitely not a product list").unwrap();

    let selection = load_selected_products(&store);
    assert!(selection.is_empty());

    // The next save overwrites the malformed value.
    save_selected_products(&store, &selection).unwrap();
    assert_eq!(store.load_raw().unwrap().as_deref(), Some("[]"));
}
