use std::path::PathBuf;

use crate::cli::open_db;
use crate::error::Result;
use crate::importer::import_file;

pub fn run(file: &str) -> Result<()> {
    let conn = open_db()?;
    let result = import_file(&conn, &PathBuf::from(file))?;

    if result.deleted > 0 {
        println!(
            "{} imported ({} replaced from earlier imports)",
            result.imported, result.deleted
        );
    } else {
        println!("{} imported", result.imported);
    }
    Ok(())
}
