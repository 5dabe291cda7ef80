use chrono::Datelike;
use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{open_db, parse_year_month};
use crate::error::Result;
use crate::fmt::won;
use crate::reports;

fn current_year() -> i32 {
    chrono::Local::now().year()
}

fn current_month() -> u32 {
    chrono::Local::now().month()
}

pub fn monthly(year: Option<i32>, month: Option<u32>) -> Result<()> {
    let conn = open_db()?;
    let year = year.unwrap_or_else(current_year);
    let month = month.unwrap_or_else(current_month);
    let summary = reports::monthly_summary(&conn, year, month)?;
    println!("{}", format_category_summary(&format!("{year}-{month:02}"), &summary));
    Ok(())
}

pub fn yearly(year: Option<i32>) -> Result<()> {
    let conn = open_db()?;
    let year = year.unwrap_or_else(current_year);
    let summary = reports::yearly_summary(&conn, year)?;
    println!("{}", format_yearly(year, &summary));
    Ok(())
}

pub fn tags(year: Option<i32>, month: Option<u32>) -> Result<()> {
    let conn = open_db()?;
    let summary = reports::tag_summary(&conn, year, month)?;
    println!("{}", format_tags(&summary));
    Ok(())
}

pub fn range(from: &str, to: &str) -> Result<()> {
    let conn = open_db()?;
    let start = parse_year_month(from)?;
    let end = parse_year_month(to)?;
    let summary = reports::range_summary(&conn, start, end)?;
    println!("{}", format_category_summary(&format!("{from} \u{2192} {to}"), &summary));
    Ok(())
}

// ---------------------------------------------------------------------------
// Pure formatting functions (report data → String)
// ---------------------------------------------------------------------------

pub fn format_category_summary(period: &str, summary: &[reports::CategorySummary]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Category", "Count", "Total"]);
    let mut total = 0i64;
    for item in summary {
        total += item.total;
        let name = item.name.clone().unwrap_or_else(|| "미분류".to_string());
        table.add_row(vec![
            Cell::new(name),
            Cell::new(item.count),
            Cell::new(won(item.total)),
        ]);
    }
    format!(
        "{} {}\n{table}\n{} {}",
        "Spending by category".bold(),
        period,
        "Total".bold(),
        won(total)
    )
}

pub fn format_yearly(year: i32, summary: &[reports::MonthlyTotal]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Month", "Total"]);
    let mut total = 0i64;
    for item in summary {
        total += item.total;
        table.add_row(vec![
            Cell::new(format!("{year}-{:02}", item.month)),
            Cell::new(won(item.total)),
        ]);
    }
    format!(
        "{} {year}\n{table}\n{} {}",
        "Monthly totals".bold(),
        "Total".bold(),
        won(total)
    )
}

pub fn format_tags(summary: &[reports::TagSummary]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Tag", "Count", "Total"]);
    for item in summary {
        table.add_row(vec![
            Cell::new(&item.name),
            Cell::new(item.count),
            Cell::new(won(item.total)),
        ]);
    }
    format!("{}\n{table}", "Spending by tag".bold())
}
