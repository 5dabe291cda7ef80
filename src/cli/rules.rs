use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::{Result, WonbookError};
use crate::fmt::won;
use crate::store;

pub fn set(pattern: &str, category: &str) -> Result<()> {
    let conn = open_db()?;
    let cat = store::category_by_name(&conn, category)?
        .ok_or_else(|| WonbookError::UnknownCategory(category.to_string()))?;

    let affected = store::apply_merchant_rule(&conn, pattern, cat.id)?;
    println!("Saved rule: '{pattern}' \u{2192} {category} ({affected} existing transactions updated)");
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = open_db()?;
    let rules = store::list_merchant_rules(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["Pattern", "Category"]);
    for rule in rules {
        table.add_row(vec![Cell::new(rule.merchant_pattern), Cell::new(rule.category_name)]);
    }
    println!("Merchant rules\n{table}");
    Ok(())
}

pub fn delete(pattern: &str) -> Result<()> {
    let conn = open_db()?;
    store::delete_merchant_rule(&conn, pattern)?;
    println!("Deleted rule: '{pattern}'");
    Ok(())
}

pub fn uncategorized() -> Result<()> {
    let conn = open_db()?;
    let merchants = store::uncategorized_merchants(&conn)?;
    if merchants.is_empty() {
        println!("Every merchant is covered by a rule.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Merchant", "Business type", "Count", "Total"]);
    for m in merchants {
        table.add_row(vec![
            Cell::new(m.merchant),
            Cell::new(m.business_type.unwrap_or_default()),
            Cell::new(m.tx_count),
            Cell::new(won(m.total)),
        ]);
    }
    println!("Merchants without a rule\n{table}");
    Ok(())
}
