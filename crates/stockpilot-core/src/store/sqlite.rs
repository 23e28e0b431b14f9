//! SQLite-backed product collection.
//!
//! Each product is a JSON document in `products.doc`; reads go through the
//! lenient coercion in `model::document`. Stock writes use `json_set` so an
//! update touches only the stock field, and read-modify-write paths run in
//! `BEGIN IMMEDIATE` transactions so concurrent connections cannot lose
//! updates.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use tracing::{debug, error, warn};

use super::schema::PRODUCTS_SCHEMA;
use super::{ProductStore, StockChange};
use crate::error::{InventoryError, InventoryResult};
use crate::model::{
    from_document, to_document, MediaEdit, Product, ProductDraft, ProductId, ProductPatch,
};

#[derive(Clone)]
pub struct SqliteProductStore {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for SqliteProductStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteProductStore").finish_non_exhaustive()
    }
}

impl SqliteProductStore {
    /// Open a file-backed store.
    pub fn open(path: &Path) -> InventoryResult<Self> {
        let conn = Connection::open(path).map_err(|e| {
            error!(path = %path.display(), error = %e, "failed to open product database");
            InventoryError::from(e)
        })?;
        Self::from_connection(conn)
    }

    /// Create an in-memory store (for testing).
    pub fn memory() -> InventoryResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> InventoryResult<Self> {
        Self::init_connection(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn init_connection(conn: &Connection) -> InventoryResult<()> {
        // WAL mode for file-backed DBs (no-op for in-memory)
        let _ = conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()));
        conn.busy_timeout(std::time::Duration::from_millis(5000))?;
        conn.execute_batch(PRODUCTS_SCHEMA)?;
        Ok(())
    }

    fn lock(&self) -> InventoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| InventoryError::Database("connection lock poisoned".to_string()))
    }

    /// Number of stored documents, including ones that fail coercion.
    pub fn count(&self) -> InventoryResult<usize> {
        let conn = self.lock()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM products", [], |r| r.get(0))?;
        Ok(n as usize)
    }

    fn load(conn: &Connection, id: &ProductId) -> InventoryResult<Option<Product>> {
        let doc: Option<String> = conn
            .query_row(
                "SELECT doc FROM products WHERE id = ?1",
                [id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        doc.map(|raw| parse_doc(id, &raw)).transpose()
    }

    fn write(conn: &Connection, product: &Product, now: &str) -> InventoryResult<usize> {
        let doc = to_document(product).to_string();
        Ok(conn.execute(
            "UPDATE products SET name = ?2, doc = ?3, updated_at = ?4 WHERE id = ?1",
            params![product.id.as_str(), product.name, doc, now],
        )?)
    }
}

fn parse_doc(id: &ProductId, raw: &str) -> InventoryResult<Product> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| InventoryError::CorruptDocument {
            id: id.to_string(),
            field: "document".to_string(),
            reason: e.to_string(),
        })?;
    from_document(id, &value)
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Log a failed store call with its operation name, then hand the error back.
fn logged<T>(op: &'static str, id: Option<&ProductId>, result: InventoryResult<T>) -> InventoryResult<T> {
    if let Err(e) = &result {
        match e {
            InventoryError::NotFound { .. } | InventoryError::StockUnderflow { .. } => {
                debug!(op, product_id = ?id.map(ProductId::as_str), error = %e, "store call rejected");
            }
            _ => {
                error!(op, product_id = ?id.map(ProductId::as_str), error = %e, "store call failed");
            }
        }
    }
    result
}

fn not_found(id: &ProductId) -> InventoryError {
    InventoryError::NotFound { id: id.to_string() }
}

impl ProductStore for SqliteProductStore {
    fn list_products(&self) -> InventoryResult<Vec<Product>> {
        let result = (|| -> InventoryResult<Vec<Product>> {
            let conn = self.lock()?;
            let mut stmt = conn.prepare("SELECT id, doc FROM products ORDER BY name ASC, id ASC")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;

            let mut out = Vec::new();
            for row in rows {
                let (raw_id, doc) = row?;
                let parsed = ProductId::parse(&raw_id).and_then(|id| parse_doc(&id, &doc));
                match parsed {
                    Ok(product) => out.push(product),
                    // One unreadable document must not hide the rest of the inventory.
                    Err(e) => warn!(product_id = %raw_id, error = %e, "skipping unreadable product"),
                }
            }
            Ok(out)
        })();
        logged("list_products", None, result)
    }

    fn get_product(&self, id: &ProductId) -> InventoryResult<Option<Product>> {
        let result = self.lock().and_then(|conn| Self::load(&conn, id));
        logged("get_product", Some(id), result)
    }

    fn insert_product(&self, draft: ProductDraft) -> InventoryResult<Product> {
        let result = (|| -> InventoryResult<Product> {
            draft.check()?;
            let product = Product::from_draft(ProductId::generate(), draft.with_placeholder_media());
            let doc = to_document(&product).to_string();
            let ts = now();

            let conn = self.lock()?;
            conn.execute(
                "INSERT INTO products (id, name, doc, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4)",
                params![product.id.as_str(), product.name, doc, ts],
            )?;
            debug!(product_id = %product.id, name = %product.name, "product inserted");
            Ok(product)
        })();
        logged("insert_product", None, result)
    }

    fn update_product_stock(&self, id: &ProductId, new_level: u32) -> InventoryResult<()> {
        let result = (|| -> InventoryResult<()> {
            let conn = self.lock()?;
            let changed = conn.execute(
                "UPDATE products SET doc = json_set(doc, '$.stockLevel', ?2), updated_at = ?3 WHERE id = ?1",
                params![id.as_str(), new_level, now()],
            )?;
            if changed == 0 {
                return Err(not_found(id));
            }
            Ok(())
        })();
        logged("update_product_stock", Some(id), result)
    }

    fn adjust_stock(&self, id: &ProductId, delta: i64) -> InventoryResult<StockChange> {
        let result = (|| -> InventoryResult<StockChange> {
            let mut conn = self.lock()?;
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let mut product = Self::load(&tx, id)?.ok_or_else(|| not_found(id))?;
            let current = product.stock_level;
            let next = i64::from(current) + delta;
            if next < 0 {
                return Err(InventoryError::StockUnderflow {
                    id: id.to_string(),
                    current,
                    delta,
                });
            }
            let next = u32::try_from(next).map_err(|_| {
                InventoryError::invalid("stockLevel", format!("{next} exceeds the maximum stock level"))
            })?;

            tx.execute(
                "UPDATE products SET doc = json_set(doc, '$.stockLevel', ?2), updated_at = ?3 WHERE id = ?1",
                params![id.as_str(), next, now()],
            )?;
            tx.commit()?;
            product.stock_level = next;
            Ok(StockChange {
                previous_level: current,
                product,
            })
        })();
        logged("adjust_stock", Some(id), result)
    }

    fn update_product(&self, id: &ProductId, patch: ProductPatch) -> InventoryResult<Product> {
        let result = (|| -> InventoryResult<Product> {
            patch.check()?;
            let mut conn = self.lock()?;
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let mut product = Self::load(&tx, id)?.ok_or_else(|| not_found(id))?;
            patch.apply(&mut product);
            Self::write(&tx, &product, &now())?;
            tx.commit()?;
            Ok(product)
        })();
        logged("update_product", Some(id), result)
    }

    fn edit_media(&self, id: &ProductId, edit: &MediaEdit) -> InventoryResult<Product> {
        let result = (|| -> InventoryResult<Product> {
            let mut conn = self.lock()?;
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let mut product = Self::load(&tx, id)?.ok_or_else(|| not_found(id))?;
            edit.apply(&mut product.media_urls);
            Self::write(&tx, &product, &now())?;
            tx.commit()?;
            Ok(product)
        })();
        logged("edit_media", Some(id), result)
    }

    fn delete_product(&self, id: &ProductId) -> InventoryResult<()> {
        let result = (|| -> InventoryResult<()> {
            let conn = self.lock()?;
            let removed = conn.execute("DELETE FROM products WHERE id = ?1", [id.as_str()])?;
            if removed == 0 {
                return Err(not_found(id));
            }
            Ok(())
        })();
        logged("delete_product", Some(id), result)
    }
}
