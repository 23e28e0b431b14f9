//! Snapshot views over a product list: the dashboard and the category report.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{round_cents, Product};

/// Low-stock rows shown before the dashboard links out to the full list.
pub const LOW_STOCK_PREVIEW: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowStockItem {
    pub id: String,
    pub name: String,
    pub stock_level: u32,
    pub reorder_point: u32,
}

impl From<&Product> for LowStockItem {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id.to_string(),
            name: p.name.clone(),
            stock_level: p.stock_level,
            reorder_point: p.reorder_point,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub total_products: usize,
    pub total_stock_units: u64,
    pub low_stock_count: usize,
    pub low_stock_preview: Vec<LowStockItem>,
    /// More low-stock items exist than the preview shows.
    pub more_low_stock: bool,
}

pub fn dashboard(products: &[Product]) -> Dashboard {
    let low: Vec<&Product> = products.iter().filter(|p| p.is_low_stock()).collect();
    Dashboard {
        total_products: products.len(),
        total_stock_units: total_stock(products),
        low_stock_count: low.len(),
        low_stock_preview: low
            .iter()
            .take(LOW_STOCK_PREVIEW)
            .map(|p| LowStockItem::from(*p))
            .collect(),
        more_low_stock: low.len() > LOW_STOCK_PREVIEW,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub name: String,
    pub product_count: usize,
    pub stock_units: u64,
    /// Share of all products, rounded to whole percent.
    pub share_percent: u32,
    pub stock_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryReport {
    pub total_products: usize,
    pub total_stock_units: u64,
    pub category_count: usize,
    pub total_stock_value: f64,
    /// Ordered by stock units descending, then name.
    pub categories: Vec<CategorySummary>,
}

pub fn inventory_report(products: &[Product]) -> InventoryReport {
    #[derive(Default)]
    struct Acc {
        count: usize,
        stock: u64,
        value: f64,
    }

    let mut by_category: BTreeMap<&str, Acc> = BTreeMap::new();
    for p in products {
        let acc = by_category.entry(p.category.as_str()).or_default();
        acc.count += 1;
        acc.stock += u64::from(p.stock_level);
        acc.value += p.stock_value();
    }

    let total = products.len();
    let mut categories: Vec<CategorySummary> = by_category
        .into_iter()
        .map(|(name, acc)| CategorySummary {
            name: name.to_string(),
            product_count: acc.count,
            stock_units: acc.stock,
            share_percent: share(acc.count, total),
            stock_value: round_cents(acc.value),
        })
        .collect();
    categories.sort_by(|a, b| {
        b.stock_units
            .cmp(&a.stock_units)
            .then_with(|| a.name.cmp(&b.name))
    });

    InventoryReport {
        total_products: total,
        total_stock_units: total_stock(products),
        category_count: categories.len(),
        total_stock_value: round_cents(products.iter().map(Product::stock_value).sum()),
        categories,
    }
}

fn total_stock(products: &[Product]) -> u64 {
    products.iter().map(|p| u64::from(p.stock_level)).sum()
}

fn share(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as u32
}
