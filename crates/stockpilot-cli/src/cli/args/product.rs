use clap::{Args, Subcommand};

#[derive(Args, Debug)]
pub struct ProductArgs {
    #[command(subcommand)]
    pub cmd: ProductSub,
}

#[derive(Subcommand, Debug)]
pub enum ProductSub {
    /// List products, optionally filtered and sorted
    List(ListArgs),
    /// Show one product
    Show(IdArg),
    /// Add a product
    Add(AddArgs),
    /// Change some fields of a product
    Update(UpdateArgs),
    /// Delete a product
    Delete(IdArg),
    /// Overwrite the stock level
    SetStock(SetStockArgs),
}

#[derive(Args, Debug)]
pub struct IdArg {
    pub id: String,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Case-insensitive match on name, category or description
    #[arg(long, short = 'q')]
    pub search: Option<String>,

    /// name, category, description, price, discount, stock or reorder
    #[arg(long, default_value = "name")]
    pub sort: String,

    /// asc or desc
    #[arg(long, default_value = "asc")]
    pub order: String,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub price: f64,

    #[arg(long, default_value = "")]
    pub description: String,

    #[arg(long, default_value = "")]
    pub category: String,

    /// Discount percentage, 0 to 100
    #[arg(long, default_value_t = 0.0)]
    pub discount: f64,

    #[arg(long, default_value_t = 0)]
    pub stock: u32,

    /// Low-stock threshold
    #[arg(long, default_value_t = 0)]
    pub reorder: u32,

    /// Image or video URL (http(s) or data:); repeatable
    #[arg(long = "media")]
    pub media: Vec<String>,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub price: Option<f64>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub discount: Option<f64>,

    #[arg(long)]
    pub stock: Option<u32>,

    #[arg(long)]
    pub reorder: Option<u32>,

    /// Replaces the whole media list; repeatable
    #[arg(long = "media")]
    pub media: Vec<String>,
}

#[derive(Args, Debug)]
pub struct SetStockArgs {
    pub id: String,
    pub level: u32,
}
