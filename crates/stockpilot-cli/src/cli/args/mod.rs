use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod media;
pub mod product;
pub use media::*;
pub use product::*;

#[derive(Parser, Debug)]
#[command(
    name = "stockpilot",
    version,
    about = "Inventory management: products, stock levels, restocks and category reports"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(clap::Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Product database file
    #[arg(
        long,
        global = true,
        env = "STOCKPILOT_DB_PATH",
        default_value = "stockpilot.db"
    )]
    pub db: PathBuf,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Emit log lines as JSON
    #[arg(
        long,
        global = true,
        env = "STOCKPILOT_LOG_JSON",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API
    Serve(ServeArgs),
    /// Add, inspect, edit and remove products
    Product(ProductArgs),
    /// Add units to a product's stock
    Restock(RestockArgs),
    /// Products at or below their reorder point
    LowStock,
    /// Totals and the low-stock preview
    Dashboard,
    /// Stock per category
    Report,
    /// Known product categories
    Categories,
    /// Object-storage uploads
    Media(MediaArgs),
    Version,
}

#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Listen address
    #[arg(long, env = "STOCKPILOT_BIND", default_value = "127.0.0.1:8080")]
    pub bind: String,

    /// Request body cap in bytes
    #[arg(long, env = "STOCKPILOT_MAX_BODY_BYTES")]
    pub max_body_bytes: Option<usize>,

    /// Upload inline media to object storage before saving products
    #[arg(
        long,
        env = "STOCKPILOT_OFFLOAD_INLINE_MEDIA",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub offload_inline_media: bool,
}

#[derive(clap::Args, Debug)]
pub struct RestockArgs {
    /// Product id
    pub id: String,

    /// Units to add; must be positive
    #[arg(allow_hyphen_values = true)]
    pub quantity: i64,
}
