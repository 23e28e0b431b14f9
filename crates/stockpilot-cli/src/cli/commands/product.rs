use stockpilot_core::{
    InventoryError, MediaUrl, ProductDraft, ProductId, ProductPatch, ProductQuery,
};

use super::open_inventory;
use crate::cli::args::{AddArgs, GlobalArgs, ListArgs, ProductSub, RestockArgs, UpdateArgs};
use crate::cli::output::{self, emit};
use crate::exit_codes::EXIT_SUCCESS;

pub fn run(cmd: ProductSub, global: &GlobalArgs) -> anyhow::Result<i32> {
    match cmd {
        ProductSub::List(args) => list(args, global),
        ProductSub::Show(args) => {
            let inventory = open_inventory(global)?;
            let product = inventory.get(&ProductId::parse(&args.id)?)?;
            emit(global.format, &product, output::product_detail)?;
            Ok(EXIT_SUCCESS)
        }
        ProductSub::Add(args) => add(args, global),
        ProductSub::Update(args) => update(args, global),
        ProductSub::Delete(args) => {
            let inventory = open_inventory(global)?;
            let id = ProductId::parse(&args.id)?;
            inventory.delete(&id)?;
            emit(global.format, &serde_json::json!({ "deleted": id }), |_| {
                format!("deleted {id}")
            })?;
            Ok(EXIT_SUCCESS)
        }
        ProductSub::SetStock(args) => {
            let inventory = open_inventory(global)?;
            let id = ProductId::parse(&args.id)?;
            inventory.set_stock(&id, args.level)?;
            let product = inventory.get(&id)?;
            emit(global.format, &product, output::product_detail)?;
            Ok(EXIT_SUCCESS)
        }
    }
}

fn parse_media(raw: &[String]) -> Result<Vec<MediaUrl>, InventoryError> {
    raw.iter().map(|m| MediaUrl::parse(m)).collect()
}

fn list(args: ListArgs, global: &GlobalArgs) -> anyhow::Result<i32> {
    let query = ProductQuery {
        search: args.search,
        sort: args.sort.parse()?,
        order: args.order.parse()?,
    };
    let products = open_inventory(global)?.products(&query)?;
    emit(global.format, &products, |p| output::product_table(p))?;
    Ok(EXIT_SUCCESS)
}

fn add(args: AddArgs, global: &GlobalArgs) -> anyhow::Result<i32> {
    let draft = ProductDraft {
        name: args.name,
        description: args.description,
        price: args.price,
        discount_percentage: args.discount,
        stock_level: args.stock,
        reorder_point: args.reorder,
        category: args.category,
        media_urls: parse_media(&args.media)?,
    };
    let product = open_inventory(global)?.add(draft)?;
    emit(global.format, &product, output::product_detail)?;
    Ok(EXIT_SUCCESS)
}

fn update(args: UpdateArgs, global: &GlobalArgs) -> anyhow::Result<i32> {
    let id = ProductId::parse(&args.id)?;
    let patch = ProductPatch {
        name: args.name,
        description: args.description,
        price: args.price,
        discount_percentage: args.discount,
        stock_level: args.stock,
        reorder_point: args.reorder,
        category: args.category,
        media_urls: if args.media.is_empty() {
            None
        } else {
            Some(parse_media(&args.media)?)
        },
    };
    if patch.is_empty() {
        return Err(InventoryError::InvalidProduct {
            field: "update".to_string(),
            reason: "no fields given".to_string(),
        }
        .into());
    }
    let product = open_inventory(global)?.update(&id, patch)?;
    emit(global.format, &product, output::product_detail)?;
    Ok(EXIT_SUCCESS)
}

pub fn restock(args: RestockArgs, global: &GlobalArgs) -> anyhow::Result<i32> {
    let id = ProductId::parse(&args.id)?;
    let receipt = open_inventory(global)?.restock(&id, args.quantity)?;
    emit(global.format, &receipt, output::receipt)?;
    Ok(EXIT_SUCCESS)
}
