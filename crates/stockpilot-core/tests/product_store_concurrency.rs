//! Multi-connection tests for SqliteProductStore.
//!
//! Two stores opened on the same file-backed DB stand in for two server
//! processes; stock adjustments from both must all land.

use std::sync::Arc;
use std::thread;

use stockpilot_core::{
    Inventory, InventoryError, ProductDraft, ProductStore, SqliteProductStore,
};
use tempfile::NamedTempFile;

#[test]
fn test_concurrent_restocks_from_two_connections_all_apply() {
    let tmp = NamedTempFile::new().unwrap();
    let store1 = SqliteProductStore::open(tmp.path()).unwrap();
    let product = store1
        .insert_product(ProductDraft::new("Widget", 3.0).with_stock(0, 10))
        .unwrap();
    let store2 = SqliteProductStore::open(tmp.path()).unwrap();

    let inv1 = Arc::new(Inventory::new(store1));
    let inv2 = Arc::new(Inventory::new(store2));

    let mut handles = Vec::new();
    for i in 0..8 {
        let inv = if i % 2 == 0 { inv1.clone() } else { inv2.clone() };
        let id = product.id.clone();
        handles.push(thread::spawn(move || {
            for _ in 0..25 {
                inv.restock(&id, 1).unwrap();
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(inv1.get(&product.id).unwrap().stock_level, 200);
}

#[test]
fn test_underflow_never_goes_negative_under_contention() {
    let tmp = NamedTempFile::new().unwrap();
    let store1 = SqliteProductStore::open(tmp.path()).unwrap();
    let product = store1
        .insert_product(ProductDraft::new("Widget", 3.0).with_stock(10, 1))
        .unwrap();
    let store2 = SqliteProductStore::open(tmp.path()).unwrap();

    let stores = [Arc::new(store1), Arc::new(store2)];
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let s = stores[i % 2].clone();
            let id = product.id.clone();
            thread::spawn(move || {
                let mut ok = 0;
                for _ in 0..5 {
                    match s.adjust_stock(&id, -1) {
                        Ok(_) => ok += 1,
                        Err(InventoryError::StockUnderflow { .. }) => {}
                        Err(e) => panic!("unexpected error: {e}"),
                    }
                }
                ok
            })
        })
        .collect();

    let taken: i32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(taken, 10, "exactly the available units are taken");
    let left = stores[0].get_product(&product.id).unwrap().unwrap();
    assert_eq!(left.stock_level, 0);
}

#[test]
fn test_reopen_preserves_documents() {
    let tmp = NamedTempFile::new().unwrap();
    let id = {
        let store = SqliteProductStore::open(tmp.path()).unwrap();
        store
            .insert_product(
                ProductDraft::new("Trail Shoes", 89.0)
                    .with_category("Sports")
                    .with_discount(20.0)
                    .with_stock(6, 2),
            )
            .unwrap()
            .id
    };

    let store = SqliteProductStore::open(tmp.path()).unwrap();
    let p = store.get_product(&id).unwrap().unwrap();
    assert_eq!(p.name, "Trail Shoes");
    assert_eq!(p.discount_percentage, 20.0);
    assert_eq!(p.category, "Sports");
    assert!((p.effective_price() - 71.2).abs() < 1e-9);
}
