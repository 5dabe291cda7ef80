use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::{Result, WonbookError};
use crate::fmt::won;
use crate::store;
use crate::store::TransactionFilter;

pub fn list(
    year: Option<i32>,
    month: Option<u32>,
    category: Option<&str>,
    tag: Option<&str>,
    search: Option<&str>,
) -> Result<()> {
    let conn = open_db()?;

    let category_id = match category {
        Some(name) => Some(
            store::category_by_name(&conn, name)?
                .ok_or_else(|| WonbookError::UnknownCategory(name.to_string()))?
                .id,
        ),
        None => None,
    };
    let tag_id = match tag {
        Some(name) => Some(
            store::tag_by_name(&conn, name)?
                .ok_or_else(|| WonbookError::UnknownTag(name.to_string()))?
                .id,
        ),
        None => None,
    };

    let filter = TransactionFilter {
        year,
        month,
        category_id,
        tag_id,
        search: search.map(str::to_string),
    };
    let rows = store::list_transactions(&conn, &filter)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Merchant", "Type", "Amount", "Category", "Tags", "Memo"]);
    let count = rows.len();
    let mut total = 0i64;
    for tx in rows {
        total += tx.billed_amount;
        let tags = tx
            .tags
            .iter()
            .map(|t| t.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            Cell::new(tx.id),
            Cell::new(&tx.date),
            Cell::new(&tx.merchant),
            Cell::new(if tx.is_overseas { "overseas" } else { "domestic" }),
            Cell::new(won(tx.billed_amount)),
            Cell::new(tx.category_name.unwrap_or_default()),
            Cell::new(tags),
            Cell::new(tx.memo.unwrap_or_default()),
        ]);
    }
    println!("{table}");
    println!("{count} transactions, total {}", won(total));
    Ok(())
}

pub fn set_category(id: i64, category: &str, save_rule: bool) -> Result<()> {
    let conn = open_db()?;
    let cat = store::category_by_name(&conn, category)?
        .ok_or_else(|| WonbookError::UnknownCategory(category.to_string()))?;

    store::update_transaction_category(&conn, id, Some(cat.id))?;
    println!("Transaction {id} \u{2192} {category}");

    if save_rule {
        let merchant = store::transaction_merchant(&conn, id)?;
        store::set_merchant_rule(&conn, &merchant, cat.id)?;
        println!("Saved rule: '{merchant}' \u{2192} {category}");
    }
    Ok(())
}

pub fn memo(id: i64, content: Option<&str>) -> Result<()> {
    let conn = open_db()?;
    let content = content.unwrap_or("");
    store::set_memo(&conn, id, content)?;
    if content.trim().is_empty() {
        println!("Cleared memo on transaction {id}");
    } else {
        println!("Set memo on transaction {id}");
    }
    Ok(())
}

pub fn tag(id: i64, name: &str) -> Result<()> {
    let conn = open_db()?;
    let tag_id = store::create_tag(&conn, name)?;
    store::add_tag_to_transaction(&conn, id, tag_id)?;
    println!("Tagged transaction {id} with '{name}'");
    Ok(())
}

pub fn untag(id: i64, name: &str) -> Result<()> {
    let conn = open_db()?;
    let tag = store::tag_by_name(&conn, name)?
        .ok_or_else(|| WonbookError::UnknownTag(name.to_string()))?;
    store::remove_tag_from_transaction(&conn, id, tag.id)?;
    println!("Removed tag '{name}' from transaction {id}");
    Ok(())
}

pub fn delete(id: i64) -> Result<()> {
    let conn = open_db()?;
    store::delete_transaction(&conn, id)?;
    println!("Deleted transaction {id}");
    Ok(())
}
