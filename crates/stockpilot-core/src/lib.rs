//! StockPilot core: product records, the product store, and inventory operations.
//!
//! ```no_run
//! use stockpilot_core::{Inventory, ProductDraft, SqliteProductStore};
//!
//! # fn example() -> anyhow::Result<()> {
//! let inventory = Inventory::new(SqliteProductStore::open("stockpilot.db".as_ref())?);
//! let kettle = inventory.add(ProductDraft::new("Kettle", 29.0).with_stock(3, 5))?;
//! inventory.restock(&kettle.id, 12)?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod inventory;
pub mod model;
pub mod reports;
pub mod store;

pub use error::{InventoryError, InventoryResult};
pub use inventory::{Inventory, ProductQuery, RestockReceipt, SortKey, SortOrder};
pub use model::{
    parse_media_list, MediaEdit, MediaUrl, Product, ProductDraft, ProductId, ProductPatch,
    KNOWN_CATEGORIES,
};
pub use reports::{dashboard, inventory_report, CategorySummary, Dashboard, InventoryReport};
pub use store::{ProductStore, SqliteProductStore, StockChange};
