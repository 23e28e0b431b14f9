//! Inventory operations on top of a [`ProductStore`].

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{InventoryError, InventoryResult};
use crate::model::{MediaEdit, Product, ProductDraft, ProductId, ProductPatch};
use crate::store::ProductStore;

/// Column a product listing is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    Name,
    Category,
    Description,
    Price,
    Discount,
    Stock,
    Reorder,
}

impl FromStr for SortKey {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "category" => Ok(Self::Category),
            "description" => Ok(Self::Description),
            "price" => Ok(Self::Price),
            "discount" | "discountpercentage" => Ok(Self::Discount),
            "stock" | "stocklevel" => Ok(Self::Stock),
            "reorder" | "reorderpoint" => Ok(Self::Reorder),
            other => Err(InventoryError::invalid("sort", format!("unknown sort key '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl FromStr for SortOrder {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            other => Err(InventoryError::invalid("order", format!("unknown sort order '{other}'"))),
        }
    }
}

/// Search and ordering for a product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductQuery {
    /// Case-insensitive substring matched against name, category and description.
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort: SortKey,
    #[serde(default)]
    pub order: SortOrder,
}

impl ProductQuery {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Default::default()
        }
    }

    pub fn sorted_by(mut self, sort: SortKey, order: SortOrder) -> Self {
        self.sort = sort;
        self.order = order;
        self
    }

    pub fn matches(&self, product: &Product) -> bool {
        let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
            return true;
        };
        let term = term.to_lowercase();
        [&product.name, &product.category, &product.description]
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }

    /// Filter and order `products` in place.
    pub fn apply(&self, products: &mut Vec<Product>) {
        products.retain(|p| self.matches(p));
        products.sort_by(|a, b| {
            let primary = compare_by(self.sort, a, b);
            let primary = match self.order {
                SortOrder::Ascending => primary,
                SortOrder::Descending => primary.reverse(),
            };
            primary
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.id.cmp(&b.id))
        });
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn compare_by(key: SortKey, a: &Product, b: &Product) -> Ordering {
    match key {
        SortKey::Name => compare_text(&a.name, &b.name),
        SortKey::Category => compare_text(&a.category, &b.category),
        SortKey::Description => compare_text(&a.description, &b.description),
        SortKey::Price => a.price.total_cmp(&b.price),
        SortKey::Discount => a.discount_percentage.total_cmp(&b.discount_percentage),
        SortKey::Stock => a.stock_level.cmp(&b.stock_level),
        SortKey::Reorder => a.reorder_point.cmp(&b.reorder_point),
    }
}

/// Outcome of a simulated restock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestockReceipt {
    pub product_id: ProductId,
    pub name: String,
    pub added: u32,
    pub previous_level: u32,
    pub new_level: u32,
    pub still_low: bool,
}

/// Product operations used by the API and the CLI.
#[derive(Debug, Clone)]
pub struct Inventory<S> {
    store: S,
}

impl<S: ProductStore> Inventory<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn all(&self) -> InventoryResult<Vec<Product>> {
        self.store.list_products()
    }

    pub fn products(&self, query: &ProductQuery) -> InventoryResult<Vec<Product>> {
        let mut products = self.store.list_products()?;
        query.apply(&mut products);
        Ok(products)
    }

    pub fn get(&self, id: &ProductId) -> InventoryResult<Product> {
        self.store
            .get_product(id)?
            .ok_or_else(|| InventoryError::NotFound { id: id.to_string() })
    }

    pub fn add(&self, draft: ProductDraft) -> InventoryResult<Product> {
        let product = self.store.insert_product(draft)?;
        info!(product_id = %product.id, name = %product.name, "product added");
        Ok(product)
    }

    pub fn update(&self, id: &ProductId, patch: ProductPatch) -> InventoryResult<Product> {
        let product = self.store.update_product(id, patch)?;
        info!(product_id = %id, "product updated");
        Ok(product)
    }

    pub fn set_stock(&self, id: &ProductId, new_level: u32) -> InventoryResult<()> {
        self.store.update_product_stock(id, new_level)?;
        info!(product_id = %id, stock_level = new_level, "stock level set");
        Ok(())
    }

    pub fn delete(&self, id: &ProductId) -> InventoryResult<()> {
        self.store.delete_product(id)?;
        info!(product_id = %id, "product deleted");
        Ok(())
    }

    /// Add `quantity` units to a product's stock.
    pub fn restock(&self, id: &ProductId, quantity: i64) -> InventoryResult<RestockReceipt> {
        if quantity <= 0 {
            return Err(InventoryError::InvalidQuantity { quantity });
        }
        let added = u32::try_from(quantity).map_err(|_| InventoryError::InvalidQuantity { quantity })?;

        let change = self.store.adjust_stock(id, quantity)?;
        let product = change.product;
        info!(
            product_id = %id,
            added,
            previous_level = change.previous_level,
            new_level = product.stock_level,
            "product restocked"
        );
        Ok(RestockReceipt {
            product_id: id.clone(),
            still_low: product.is_low_stock(),
            name: product.name,
            added,
            previous_level: change.previous_level,
            new_level: product.stock_level,
        })
    }

    /// Change a product's media list without overwriting concurrent edits.
    pub fn edit_media(&self, id: &ProductId, edit: &MediaEdit) -> InventoryResult<Product> {
        let product = self.store.edit_media(id, edit)?;
        info!(product_id = %id, media = product.media_urls.len(), "product media edited");
        Ok(product)
    }

    /// Products at or below their reorder point, in listing order.
    pub fn low_stock(&self) -> InventoryResult<Vec<Product>> {
        let mut products = self.store.list_products()?;
        products.retain(Product::is_low_stock);
        ProductQuery::default().apply(&mut products);
        Ok(products)
    }
}
