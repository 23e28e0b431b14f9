use anyhow::Context;
use stockpilot_core::{Inventory, SqliteProductStore};

use super::args::GlobalArgs;

mod dispatch;
pub mod media;
pub mod product;
pub mod reports;
pub mod serve;

pub use dispatch::dispatch;

pub(crate) fn open_inventory(global: &GlobalArgs) -> anyhow::Result<Inventory<SqliteProductStore>> {
    let store = SqliteProductStore::open(&global.db)
        .with_context(|| format!("failed to open product database {}", global.db.display()))?;
    Ok(Inventory::new(store))
}
