use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::Result;
use crate::store;

fn render(tags: &[crate::models::Tag]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Color"]);
    for tag in tags {
        table.add_row(vec![
            Cell::new(tag.id),
            Cell::new(&tag.name),
            Cell::new(&tag.color),
        ]);
    }
    table.to_string()
}

pub fn list() -> Result<()> {
    let conn = open_db()?;
    let tags = store::list_tags(&conn)?;
    println!("Tags\n{}", render(&tags));
    Ok(())
}

pub fn search(query: &str) -> Result<()> {
    let conn = open_db()?;
    let tags = store::search_tags(&conn, query)?;
    if tags.is_empty() {
        println!("No tags matching '{query}'");
    } else {
        println!("{}", render(&tags));
    }
    Ok(())
}
