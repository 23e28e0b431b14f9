//! Error types for inventory operations.

/// Inventory errors.
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    /// No product with this id.
    #[error("product not found: {id}")]
    NotFound { id: String },

    /// Id is not a 24-character hex object id.
    #[error("invalid product id: {id}")]
    InvalidId { id: String },

    /// A product field violates a storage invariant.
    #[error("invalid product field {field}: {reason}")]
    InvalidProduct { field: String, reason: String },

    /// Restock quantity must be positive.
    #[error("quantity must be greater than zero (got {quantity})")]
    InvalidQuantity { quantity: i64 },

    /// Stock adjustment would take the level below zero.
    #[error("stock underflow for {id}: level {current}, delta {delta}")]
    StockUnderflow { id: String, current: u32, delta: i64 },

    /// Stored document cannot be coerced into a product.
    #[error("corrupt product document {id}: {field} - {reason}")]
    CorruptDocument {
        id: String,
        field: String,
        reason: String,
    },

    /// Media URL is neither a remote http(s) URL nor an inline data URL.
    #[error("invalid media url: {reason}")]
    InvalidMedia { reason: String },

    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(String),
}

impl InventoryError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidProduct {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => 1,
            Self::InvalidId { .. }
            | Self::InvalidProduct { .. }
            | Self::InvalidQuantity { .. }
            | Self::InvalidMedia { .. } => 2,
            Self::StockUnderflow { .. } => 3,
            Self::CorruptDocument { .. } | Self::Database(_) => 4,
        }
    }

    /// Whether the caller supplied bad input (as opposed to a storage failure).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidId { .. }
                | Self::InvalidProduct { .. }
                | Self::InvalidQuantity { .. }
                | Self::InvalidMedia { .. }
        )
    }
}

impl From<rusqlite::Error> for InventoryError {
    fn from(e: rusqlite::Error) -> Self {
        InventoryError::Database(e.to_string())
    }
}

/// Result type for inventory operations.
pub type InventoryResult<T> = Result<T, InventoryError>;
