//! Product records and the draft/patch shapes used to create and edit them.

mod document;
mod id;
mod media;

pub use document::{from_document, to_document};
pub use id::ProductId;
pub use media::{parse_media_list, MediaEdit, MediaUrl};

use serde::{Deserialize, Serialize, Serializer};

use crate::error::{InventoryError, InventoryResult};

/// Categories offered by the product form.
pub const KNOWN_CATEGORIES: &[&str] = &[
    "Electronics",
    "Clothing",
    "Books",
    "Home Goods",
    "Groceries",
    "Toys",
    "Sports",
    "Beauty",
    "Automotive",
    "Garden",
    "Other",
];

const PLACEHOLDER_BASE: &str = "https://placehold.co/100x100.png?text=";

/// A sellable item with its stock bookkeeping.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub discount_percentage: f64,
    pub stock_level: u32,
    pub reorder_point: u32,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub media_urls: Vec<MediaUrl>,
}

impl Product {
    pub fn from_draft(id: ProductId, draft: ProductDraft) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            price: draft.price,
            discount_percentage: draft.discount_percentage,
            stock_level: draft.stock_level,
            reorder_point: draft.reorder_point,
            category: draft.category,
            media_urls: draft.media_urls,
        }
    }

    /// At or below the reorder point.
    pub fn is_low_stock(&self) -> bool {
        self.stock_level <= self.reorder_point
    }

    /// Unit price after discount.
    pub fn effective_price(&self) -> f64 {
        self.price * (1.0 - self.discount_percentage / 100.0)
    }

    /// Value of the units on hand at the discounted price.
    pub fn stock_value(&self) -> f64 {
        self.effective_price() * f64::from(self.stock_level)
    }

    /// First media URL, the one list views show as the thumbnail.
    pub fn image_url(&self) -> Option<&MediaUrl> {
        self.media_urls.first()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProductWire<'a> {
    id: &'a ProductId,
    name: &'a str,
    description: &'a str,
    price: f64,
    discount_percentage: f64,
    effective_price: f64,
    stock_level: u32,
    reorder_point: u32,
    low_stock: bool,
    category: &'a str,
    media_urls: &'a [MediaUrl],
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<&'a MediaUrl>,
}

impl Serialize for Product {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ProductWire {
            id: &self.id,
            name: &self.name,
            description: &self.description,
            price: self.price,
            discount_percentage: self.discount_percentage,
            effective_price: round_cents(self.effective_price()),
            stock_level: self.stock_level,
            reorder_point: self.reorder_point,
            low_stock: self.is_low_stock(),
            category: &self.category,
            media_urls: &self.media_urls,
            image_url: self.image_url(),
        }
        .serialize(serializer)
    }
}

pub(crate) fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Everything needed to create a product; the id is assigned on insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub discount_percentage: f64,
    #[serde(default)]
    pub stock_level: u32,
    #[serde(default)]
    pub reorder_point: u32,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub media_urls: Vec<MediaUrl>,
}

impl ProductDraft {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            price,
            discount_percentage: 0.0,
            stock_level: 0,
            reorder_point: 0,
            category: String::new(),
            media_urls: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_stock(mut self, stock_level: u32, reorder_point: u32) -> Self {
        self.stock_level = stock_level;
        self.reorder_point = reorder_point;
        self
    }

    pub fn with_discount(mut self, discount_percentage: f64) -> Self {
        self.discount_percentage = discount_percentage;
        self
    }

    pub fn with_media(mut self, media: MediaUrl) -> Self {
        self.media_urls.push(media);
        self
    }

    /// Enforce the invariants the store relies on.
    pub fn check(&self) -> InventoryResult<()> {
        check_name(&self.name)?;
        check_price(self.price)?;
        check_discount(self.discount_percentage)?;
        Ok(())
    }

    /// Products without media get a one-letter placeholder image.
    pub fn with_placeholder_media(mut self) -> Self {
        if self.media_urls.is_empty() {
            let initial: String = self.name.trim().chars().take(1).collect();
            let raw = format!("{PLACEHOLDER_BASE}{}", urlencode_initial(&initial));
            if let Ok(url) = MediaUrl::parse(&raw) {
                self.media_urls.push(url);
            }
        }
        self
    }
}

fn urlencode_initial(initial: &str) -> String {
    url::form_urlencoded::byte_serialize(initial.as_bytes()).collect()
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_level: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reorder_point: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_urls: Option<Vec<MediaUrl>>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn check(&self) -> InventoryResult<()> {
        if let Some(name) = &self.name {
            check_name(name)?;
        }
        if let Some(price) = self.price {
            check_price(price)?;
        }
        if let Some(discount) = self.discount_percentage {
            check_discount(discount)?;
        }
        Ok(())
    }

    pub fn apply(self, product: &mut Product) {
        if let Some(v) = self.name {
            product.name = v;
        }
        if let Some(v) = self.description {
            product.description = v;
        }
        if let Some(v) = self.price {
            product.price = v;
        }
        if let Some(v) = self.discount_percentage {
            product.discount_percentage = v;
        }
        if let Some(v) = self.stock_level {
            product.stock_level = v;
        }
        if let Some(v) = self.reorder_point {
            product.reorder_point = v;
        }
        if let Some(v) = self.category {
            product.category = v;
        }
        if let Some(v) = self.media_urls {
            product.media_urls = v;
        }
    }
}

fn check_name(name: &str) -> InventoryResult<()> {
    if name.trim().is_empty() {
        return Err(InventoryError::invalid("name", "must not be empty"));
    }
    Ok(())
}

fn check_price(price: f64) -> InventoryResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(InventoryError::invalid(
            "price",
            format!("must be a finite non-negative number (got {price})"),
        ));
    }
    Ok(())
}

fn check_discount(discount: f64) -> InventoryResult<()> {
    if !discount.is_finite() || !(0.0..=100.0).contains(&discount) {
        return Err(InventoryError::invalid(
            "discountPercentage",
            format!("must be within 0..=100 (got {discount})"),
        ));
    }
    Ok(())
}
