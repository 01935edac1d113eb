//! Integration tests for cart persistence across sessions.
//!
//! Each "session" is a fresh `CartStore` opened over the same storage file.

#![allow(clippy::unwrap_used)]

use std::path::Path;
use std::sync::Arc;

use rocketshoes_cart::{
    CartStore, DEFAULT_STORAGE_KEY, FileStore, PersistentStore, UpdateProductAmount,
};
use rocketshoes_core::ProductId;
use rocketshoes_integration_tests::{RecordingNotifier, StubCatalog};
use testresult::TestResult;

fn catalog() -> Arc<StubCatalog> {
    Arc::new(StubCatalog::with_stock(&[(1, 5), (2, 5), (3, 5)]))
}

fn session(path: &Path, catalog: Arc<StubCatalog>) -> CartStore {
    CartStore::open(
        catalog,
        Arc::new(FileStore::new(path)),
        Arc::new(RecordingNotifier::new()),
        DEFAULT_STORAGE_KEY,
    )
}

#[tokio::test]
async fn test_cart_survives_new_session() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("storage.json");
    let catalog = catalog();

    let mut first = session(&path, catalog.clone());
    first.add_product(ProductId::new(3)).await?;
    first.add_product(ProductId::new(1)).await?;
    first.add_product(ProductId::new(2)).await?;
    first
        .update_product_amount(UpdateProductAmount {
            product_id: ProductId::new(1),
            amount: 4,
        })
        .await?;
    first.remove_product(ProductId::new(2))?;
    let expected = first.cart().clone();
    drop(first);

    let second = session(&path, catalog);

    assert_eq!(second.cart(), &expected);
    let ids: Vec<_> = second.cart().items().iter().map(|i| i.id.as_u64()).collect();
    assert_eq!(ids, vec![3, 1]);

    Ok(())
}

#[tokio::test]
async fn test_sessions_continue_where_the_last_left_off() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("storage.json");
    let catalog = catalog();

    for _ in 0..3 {
        let mut store = session(&path, catalog.clone());
        store.add_product(ProductId::new(2)).await?;
    }

    let store = session(&path, catalog);
    assert_eq!(store.cart().get(ProductId::new(2)).unwrap().amount, 3);

    Ok(())
}

#[tokio::test]
async fn test_corrupt_snapshot_starts_empty_and_is_replaced() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("storage.json");
    let files = FileStore::new(&path);
    files.save(DEFAULT_STORAGE_KEY, r#"[{"id":1,"amount":0}]"#)?;
    files.save("@RocketShoes:theme", "dark")?;

    let mut store = session(&path, catalog());
    assert!(store.cart().is_empty());

    store.add_product(ProductId::new(1)).await?;
    drop(store);

    let reopened = session(&path, catalog());
    assert_eq!(reopened.cart().len(), 1);
    assert_eq!(files.load("@RocketShoes:theme")?.as_deref(), Some("dark"));

    Ok(())
}

#[tokio::test]
async fn test_unreadable_storage_file_is_replaced_on_first_change() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("storage.json");
    std::fs::write(&path, "<html>not a store</html>")?;

    let mut store = session(&path, catalog());
    assert!(store.cart().is_empty());

    store.add_product(ProductId::new(1)).await?;
    drop(store);

    let reopened = session(&path, catalog());
    assert_eq!(reopened.cart().get(ProductId::new(1)).unwrap().amount, 1);
    assert!(dir.path().join("storage.json.corrupt").exists());

    Ok(())
}

#[tokio::test]
async fn test_rejected_operation_leaves_file_untouched() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("storage.json");
    let catalog = Arc::new(StubCatalog::with_stock(&[(1, 1)]));

    let mut store = session(&path, catalog.clone());
    store.add_product(ProductId::new(1)).await?;
    let saved_at = FileStore::new(&path).updated_at(DEFAULT_STORAGE_KEY)?;

    assert!(store.add_product(ProductId::new(1)).await.is_err());
    assert!(store.remove_product(ProductId::new(9)).is_err());

    assert_eq!(
        FileStore::new(&path).updated_at(DEFAULT_STORAGE_KEY)?,
        saved_at
    );

    Ok(())
}
