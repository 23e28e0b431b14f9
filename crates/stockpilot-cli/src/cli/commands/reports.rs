use stockpilot_core::KNOWN_CATEGORIES;

use super::open_inventory;
use crate::cli::args::GlobalArgs;
use crate::cli::output::{self, emit};
use crate::exit_codes::EXIT_SUCCESS;

pub fn low_stock(global: &GlobalArgs) -> anyhow::Result<i32> {
    let products = open_inventory(global)?.low_stock()?;
    emit(global.format, &products, |p| output::product_table(p))?;
    Ok(EXIT_SUCCESS)
}

pub fn dashboard(global: &GlobalArgs) -> anyhow::Result<i32> {
    let products = open_inventory(global)?.all()?;
    let snapshot = stockpilot_core::dashboard(&products);
    emit(global.format, &snapshot, output::dashboard)?;
    Ok(EXIT_SUCCESS)
}

pub fn report(global: &GlobalArgs) -> anyhow::Result<i32> {
    let products = open_inventory(global)?.all()?;
    let report = stockpilot_core::inventory_report(&products);
    emit(global.format, &report, output::report)?;
    Ok(EXIT_SUCCESS)
}

pub fn categories(global: &GlobalArgs) -> anyhow::Result<i32> {
    emit(global.format, &KNOWN_CATEGORIES, |c| c.join("\n"))?;
    Ok(EXIT_SUCCESS)
}
