//! Product data-access layer.

mod schema;
mod sqlite;

pub use schema::PRODUCTS_SCHEMA;
pub use sqlite::SqliteProductStore;

use crate::error::InventoryResult;
use crate::model::{MediaEdit, Product, ProductDraft, ProductId, ProductPatch};

/// Result of [`ProductStore::adjust_stock`], read inside the same transaction
/// as the write.
#[derive(Debug, Clone, PartialEq)]
pub struct StockChange {
    pub previous_level: u32,
    pub product: Product,
}

/// Persistence for product records.
///
/// Implementations own the id space: `insert_product` assigns the id and
/// every other call addresses a product by it.
pub trait ProductStore: Send + Sync {
    /// All products, sorted by name ascending.
    fn list_products(&self) -> InventoryResult<Vec<Product>>;

    fn get_product(&self, id: &ProductId) -> InventoryResult<Option<Product>>;

    /// Store a new product; placeholder media is filled in when none is given.
    fn insert_product(&self, draft: ProductDraft) -> InventoryResult<Product>;

    fn update_product_stock(&self, id: &ProductId, new_level: u32) -> InventoryResult<()>;

    /// Atomically add `delta` to the stock level.
    fn adjust_stock(&self, id: &ProductId, delta: i64) -> InventoryResult<StockChange>;

    fn update_product(&self, id: &ProductId, patch: ProductPatch) -> InventoryResult<Product>;

    /// Apply `edit` to the media list as currently stored.
    fn edit_media(&self, id: &ProductId, edit: &MediaEdit) -> InventoryResult<Product>;

    fn delete_product(&self, id: &ProductId) -> InventoryResult<()>;
}
