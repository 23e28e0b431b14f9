//! Document <-> model coercion.
//!
//! Stored documents carry every product field except the id, which is the
//! collection key. Reads are lenient: numbers may arrive as strings, legacy
//! `imageUrl` / `imageUrls` fields fold into `mediaUrls`, and optional fields
//! fall back to their defaults. Only a missing name or an unreadable price
//! makes a document unusable.

use serde_json::{json, Map, Value};
use tracing::warn;

use super::{parse_media_list, MediaUrl, Product, ProductId};
use crate::error::{InventoryError, InventoryResult};

pub fn to_document(product: &Product) -> Value {
    json!({
        "name": product.name,
        "description": product.description,
        "price": product.price,
        "discountPercentage": product.discount_percentage,
        "stockLevel": product.stock_level,
        "reorderPoint": product.reorder_point,
        "category": product.category,
        "mediaUrls": product
            .media_urls
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>(),
    })
}

pub fn from_document(id: &ProductId, doc: &Value) -> InventoryResult<Product> {
    let obj = doc.as_object().ok_or_else(|| corrupt(id, "document", "not an object"))?;

    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| corrupt(id, "name", "missing"))?;

    let price = obj
        .get("price")
        .and_then(coerce_f64)
        .filter(|p| p.is_finite())
        .ok_or_else(|| corrupt(id, "price", "missing or not numeric"))?;

    let discount_percentage = obj
        .get("discountPercentage")
        .and_then(coerce_f64)
        .filter(|d| d.is_finite())
        .map(|d| d.clamp(0.0, 100.0))
        .unwrap_or(0.0);

    Ok(Product {
        id: id.clone(),
        name,
        description: string_field(obj, "description"),
        price,
        discount_percentage,
        stock_level: count_field(id, obj, "stockLevel"),
        reorder_point: count_field(id, obj, "reorderPoint"),
        category: string_field(obj, "category"),
        media_urls: media_field(id, obj),
    })
}

fn corrupt(id: &ProductId, field: &str, reason: &str) -> InventoryError {
    InventoryError::CorruptDocument {
        id: id.to_string(),
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn coerce_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> String {
    match obj.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Stock counts: truncated toward zero, clamped into `0..=u32::MAX`.
fn count_field(id: &ProductId, obj: &Map<String, Value>, key: &str) -> u32 {
    let Some(raw) = obj.get(key) else {
        return 0;
    };
    match coerce_f64(raw) {
        Some(v) if v.is_finite() => {
            if v < 0.0 {
                warn!(product_id = %id, field = key, value = v, "negative count clamped to zero");
            }
            v.trunc().clamp(0.0, f64::from(u32::MAX)) as u32
        }
        _ => {
            warn!(product_id = %id, field = key, "non-numeric count treated as zero");
            0
        }
    }
}

fn media_field(id: &ProductId, obj: &Map<String, Value>) -> Vec<MediaUrl> {
    let mut out = Vec::new();
    let mut push = |raw: &str| match MediaUrl::parse(raw) {
        Ok(url) => {
            if !out.contains(&url) {
                out.push(url);
            }
        }
        Err(e) => warn!(product_id = %id, error = %e, "dropping unreadable media url"),
    };

    if let Some(Value::Array(items)) = obj.get("mediaUrls") {
        for item in items.iter().filter_map(Value::as_str) {
            push(item);
        }
    }
    if let Some(Value::String(s)) = obj.get("imageUrl") {
        if !s.trim().is_empty() {
            push(s);
        }
    }
    if let Some(Value::String(s)) = obj.get("imageUrls") {
        match parse_media_list(s) {
            Ok(list) => list.iter().for_each(|u| push(&u.to_string())),
            Err(_) => s.split(',').for_each(|part| push(part)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProductDraft;

    fn id() -> ProductId {
        ProductId::parse("65a1b2c3d4e5f60718293a4b").unwrap()
    }

    #[test]
    fn test_document_roundtrip() {
        let draft = ProductDraft::new("Desk Lamp", 24.99)
            .with_description("LED lamp with dimmer")
            .with_category("Home Goods")
            .with_stock(12, 3)
            .with_discount(15.0)
            .with_placeholder_media();
        let product = Product::from_draft(id(), draft);
        let doc = to_document(&product);
        assert!(doc.get("id").is_none());
        assert_eq!(from_document(&id(), &doc).unwrap(), product);
    }

    #[test]
    fn test_coerces_string_numbers() {
        let doc = json!({
            "name": "Cable",
            "price": "9.50",
            "stockLevel": "12",
            "reorderPoint": 2.9,
        });
        let p = from_document(&id(), &doc).unwrap();
        assert_eq!(p.price, 9.5);
        assert_eq!(p.stock_level, 12);
        assert_eq!(p.reorder_point, 2);
        assert_eq!(p.discount_percentage, 0.0);
        assert_eq!(p.description, "");
    }

    #[test]
    fn test_negative_stock_clamped() {
        let doc = json!({"name": "Cable", "price": 1, "stockLevel": -4});
        assert_eq!(from_document(&id(), &doc).unwrap().stock_level, 0);
    }

    #[test]
    fn test_legacy_image_fields_merge() {
        let doc = json!({
            "name": "Poster",
            "price": 5,
            "imageUrl": "https://img.example.com/a.png",
            "imageUrls": "https://img.example.com/a.png, https://img.example.com/b.png,notaurl",
        });
        let p = from_document(&id(), &doc).unwrap();
        let urls: Vec<String> = p.media_urls.iter().map(ToString::to_string).collect();
        assert_eq!(
            urls,
            vec!["https://img.example.com/a.png", "https://img.example.com/b.png"]
        );
    }

    #[test]
    fn test_missing_name_is_corrupt() {
        let err = from_document(&id(), &json!({"price": 1})).unwrap_err();
        assert!(
            matches!(err, InventoryError::CorruptDocument { ref field, .. } if field == "name")
        );
    }

    #[test]
    fn test_unreadable_price_is_corrupt() {
        let err = from_document(&id(), &json!({"name": "x", "price": "cheap"})).unwrap_err();
        assert!(
            matches!(err, InventoryError::CorruptDocument { ref field, .. } if field == "price")
        );
    }
}
