/// Product collection: one JSON document per row, keyed by product id.
///
/// `name` is duplicated out of the document so listing can sort in SQL.
pub const PRODUCTS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    doc TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_products_name ON products(name);
"#;
