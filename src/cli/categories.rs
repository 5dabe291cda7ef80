use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::Result;
use crate::store;

pub fn add(name: &str, color: &str) -> Result<()> {
    let conn = open_db()?;
    store::create_category(&conn, name, color)?;
    println!("Added category: {name}");
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = open_db()?;
    let categories = store::list_categories(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Color"]);
    for cat in categories {
        table.add_row(vec![Cell::new(cat.id), Cell::new(cat.name), Cell::new(cat.color)]);
    }
    println!("Categories\n{table}");
    Ok(())
}

pub fn update(id: i64, name: Option<&str>, color: Option<&str>) -> Result<()> {
    let conn = open_db()?;
    store::update_category(&conn, id, name, color)?;
    println!("Updated category {id}");
    Ok(())
}

pub fn delete(id: i64) -> Result<()> {
    let conn = open_db()?;
    store::delete_category(&conn, id)?;
    println!("Deleted category {id} (its transactions are now unclassified)");
    Ok(())
}
