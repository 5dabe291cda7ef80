use crate::cli::open_db;
use crate::error::Result;
use crate::settings;
use crate::store;

pub fn run() -> Result<()> {
    let conn = open_db()?;
    let db_path = settings::db_path();

    let txns: i64 = conn.query_row("SELECT count(*) FROM transactions", [], |r| r.get(0))?;
    let categories: i64 = conn.query_row("SELECT count(*) FROM categories", [], |r| r.get(0))?;
    let tags: i64 = conn.query_row("SELECT count(*) FROM tags", [], |r| r.get(0))?;
    let rules: i64 = conn.query_row("SELECT count(*) FROM merchant_category_rules", [], |r| r.get(0))?;

    println!("Database: {}", db_path.display());
    if let Some(profile) = settings::load_settings().profile {
        println!("Profile: {profile}");
    }
    println!("{txns} transactions, {categories} categories, {tags} tags, {rules} rules");

    let months = store::months_in_data(&conn)?;
    if months.is_empty() {
        println!("No imported months yet.");
    } else {
        let listing = months
            .iter()
            .map(|(y, m)| format!("{y}-{m:02}"))
            .collect::<Vec<_>>()
            .join(", ");
        println!("Months with data: {listing}");
    }
    Ok(())
}
