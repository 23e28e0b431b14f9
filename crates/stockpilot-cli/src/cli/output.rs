//! Text and JSON rendering for command results.

use serde::Serialize;
use stockpilot_core::{Dashboard, InventoryReport, Product, RestockReceipt};
use stockpilot_media::{UploadCredentials, UploadedMedia};

use super::args::OutputFormat;

/// Print `value` as pretty JSON, or as the text `render` produces.
pub fn emit<T: Serialize>(
    format: OutputFormat,
    value: &T,
    render: impl FnOnce(&T) -> String,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => {
            let text = render(value);
            if !text.is_empty() {
                println!("{text}");
            }
        }
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

pub fn product_table(products: &[Product]) -> String {
    if products.is_empty() {
        return "no products".to_string();
    }
    let mut lines = vec![format!(
        "{:<24}  {:<28}  {:>9}  {:>6}  {:>7}  {}",
        "ID", "NAME", "PRICE", "STOCK", "REORDER", "CATEGORY"
    )];
    for p in products {
        let flag = if p.is_low_stock() { " (low)" } else { "" };
        lines.push(format!(
            "{:<24}  {:<28}  {:>9.2}  {:>6}  {:>7}  {}{}",
            p.id,
            truncate(&p.name, 28),
            p.effective_price(),
            p.stock_level,
            p.reorder_point,
            p.category,
            flag
        ));
    }
    lines.join("\n")
}

pub fn product_detail(p: &Product) -> String {
    let mut lines = vec![
        format!("id:          {}", p.id),
        format!(
            "created:     {}",
            p.id.timestamp().format("%Y-%m-%d %H:%M:%S UTC")
        ),
        format!("name:        {}", p.name),
        format!("category:    {}", p.category),
        format!("description: {}", p.description),
        format!(
            "price:       {:.2} ({}% off → {:.2})",
            p.price,
            p.discount_percentage,
            p.effective_price()
        ),
        format!(
            "stock:       {} (reorder at {}){}",
            p.stock_level,
            p.reorder_point,
            if p.is_low_stock() { " LOW" } else { "" }
        ),
    ];
    for (i, m) in p.media_urls.iter().enumerate() {
        let kind = if m.is_video() { "video" } else { "image" };
        let shown = if m.is_inline() {
            format!("<inline {} payload>", m.extension())
        } else {
            m.to_string()
        };
        lines.push(format!("media[{i}]:    {kind} {shown}"));
    }
    lines.join("\n")
}

pub fn receipt(r: &RestockReceipt) -> String {
    let mut line = format!(
        "restocked {} ({}): {} + {} = {}",
        r.name, r.product_id, r.previous_level, r.added, r.new_level
    );
    if r.still_low {
        line.push_str(" (still at or below reorder point)");
    }
    line
}

pub fn dashboard(d: &Dashboard) -> String {
    let mut lines = vec![
        format!("products:     {}", d.total_products),
        format!("stock units:  {}", d.total_stock_units),
        format!("low stock:    {}", d.low_stock_count),
    ];
    for item in &d.low_stock_preview {
        lines.push(format!(
            "  {:<28} {:>6} / {:<6} {}",
            truncate(&item.name, 28),
            item.stock_level,
            item.reorder_point,
            item.id
        ));
    }
    if d.more_low_stock {
        lines.push("  … run `stockpilot low-stock` for the full list".to_string());
    }
    lines.join("\n")
}

pub fn report(r: &InventoryReport) -> String {
    let mut lines = vec![
        format!(
            "{} products, {} units, {} categories, stock value {:.2}",
            r.total_products, r.total_stock_units, r.category_count, r.total_stock_value
        ),
        format!(
            "{:<16}  {:>8}  {:>8}  {:>6}  {:>12}",
            "CATEGORY", "PRODUCTS", "UNITS", "SHARE", "VALUE"
        ),
    ];
    for c in &r.categories {
        let name = if c.name.is_empty() { "(none)" } else { &c.name };
        lines.push(format!(
            "{:<16}  {:>8}  {:>8}  {:>5}%  {:>12.2}",
            name, c.product_count, c.stock_units, c.share_percent, c.stock_value
        ));
    }
    lines.join("\n")
}

pub fn credentials(c: &UploadCredentials) -> String {
    [
        format!("upload url:  {}", c.upload_url),
        format!("auth token:  {}", c.auth_token),
        format!("file name:   {}", c.final_file_name),
        format!("public url:  {}", c.public_url()),
    ]
    .join("\n")
}

pub fn uploaded(u: &UploadedMedia) -> String {
    u.public_url.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockpilot_core::{MediaUrl, ProductDraft, ProductId};

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
        assert_eq!(truncate("ééééééé", 3), "éé…");
    }

    #[test]
    fn test_table_marks_low_stock() {
        let p = Product::from_draft(
            ProductId::generate(),
            ProductDraft::new("Bolt", 1.5).with_stock(1, 4),
        );
        let table = product_table(&[p]);
        assert!(table.starts_with("ID"));
        assert!(table.contains("Bolt"));
        assert!(table.ends_with("(low)"));
        assert_eq!(product_table(&[]), "no products");
    }

    #[test]
    fn test_detail_labels_media_and_creation() {
        let id = ProductId::parse("65a1b2c3d4e5f60718293a4b").unwrap();
        let draft = ProductDraft::new("Clip", 2.0)
            .with_media(MediaUrl::parse("https://v.example.com/clip.mp4").unwrap())
            .with_media(MediaUrl::parse("data:image/png;base64,AAAA").unwrap());
        let detail = product_detail(&Product::from_draft(id, draft));
        assert!(detail.contains("created:     2024-01-12"));
        assert!(detail.contains("media[0]:    video https://v.example.com/clip.mp4"));
        assert!(detail.contains("media[1]:    image <inline png payload>"));
    }
}
