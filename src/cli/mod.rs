pub mod categories;
pub mod import;
pub mod init;
pub mod report;
pub mod rules;
pub mod status;
pub mod tags;
pub mod transactions;

use clap::{Parser, Subcommand};
use rusqlite::Connection;

use crate::db;
use crate::error::Result;
use crate::settings;

/// Open the active profile's database, creating the schema when missing.
pub(crate) fn open_db() -> Result<Connection> {
    let conn = db::get_connection(&settings::db_path())?;
    db::init_db(&conn)?;
    Ok(conn)
}

/// Parse a `YYYY-MM` argument into (year, month).
pub(crate) fn parse_year_month(value: &str) -> Result<(i32, u32)> {
    let parts: Vec<&str> = value.split('-').collect();
    if parts.len() == 2 {
        if let (Ok(year), Ok(month)) = (parts[0].parse(), parts[1].parse()) {
            if (1..=12).contains(&month) {
                return Ok((year, month));
            }
        }
    }
    Err(crate::error::WonbookError::Other(format!(
        "Invalid month: {value} (expected YYYY-MM)"
    )))
}

#[derive(Parser)]
#[command(name = "wonbook", about = "Personal card-statement tracker for Korean card issuer exports.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up wonbook: choose a data directory and initialize the database.
    Init {
        /// Path for wonbook data (default: ~/Documents/wonbook)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Profile name; each profile gets its own database file
        #[arg(long)]
        profile: Option<String>,
    },
    /// Import a statement file (.xlsx, .xls, or .csv), replacing the months it covers.
    Import {
        /// Path to the statement file
        file: String,
    },
    /// Browse and annotate transactions.
    Transactions {
        #[command(subcommand)]
        command: TransactionsCommands,
    },
    /// Manage spending categories.
    Categories {
        #[command(subcommand)]
        command: CategoriesCommands,
    },
    /// Manage tags.
    Tags {
        #[command(subcommand)]
        command: TagsCommands,
    },
    /// Manage merchant-to-category rules.
    Rules {
        #[command(subcommand)]
        command: RulesCommands,
    },
    /// Spending reports.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Show the active database and summary statistics.
    Status,
    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum TransactionsCommands {
    /// List transactions, optionally filtered.
    List {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
        /// Filter by category name
        #[arg(long)]
        category: Option<String>,
        /// Filter by tag name
        #[arg(long)]
        tag: Option<String>,
        /// Substring match on merchant or business type
        #[arg(long)]
        search: Option<String>,
    },
    /// Assign a category to one transaction.
    SetCategory {
        /// Transaction ID (shown in `wonbook transactions list`)
        id: i64,
        /// Category name
        #[arg(long)]
        category: String,
        /// Also save a merchant rule so future imports classify this merchant
        #[arg(long = "save-rule")]
        save_rule: bool,
    },
    /// Set (or clear, when omitted) a transaction's memo.
    Memo {
        id: i64,
        content: Option<String>,
    },
    /// Attach a tag, creating it if needed.
    Tag { id: i64, name: String },
    /// Detach a tag.
    Untag { id: i64, name: String },
    /// Delete a transaction.
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub enum CategoriesCommands {
    /// Add a category.
    Add {
        name: String,
        /// Display color (hex)
        #[arg(long, default_value = "#6366f1")]
        color: String,
    },
    /// List categories.
    List,
    /// Update a category's name and/or color.
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete a category; its transactions become unclassified.
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub enum TagsCommands {
    /// List all tags.
    List,
    /// Search tags by name fragment.
    Search { query: String },
}

#[derive(Subcommand)]
pub enum RulesCommands {
    /// Save a merchant rule and apply it to existing transactions.
    Set {
        /// Merchant substring pattern
        pattern: String,
        /// Category name to assign
        #[arg(long)]
        category: String,
    },
    /// List merchant rules.
    List,
    /// Delete a merchant rule.
    Delete {
        /// Merchant substring pattern
        pattern: String,
    },
    /// Show merchants not covered by any rule.
    Uncategorized,
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Category breakdown for one month.
    Monthly {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
    },
    /// Month-by-month totals across a year.
    Yearly {
        #[arg(long)]
        year: Option<i32>,
    },
    /// Spending grouped by tag.
    Tags {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
    },
    /// Category breakdown over an inclusive month range.
    Range {
        /// Start month: YYYY-MM
        #[arg(long)]
        from: String,
        /// End month: YYYY-MM
        #[arg(long)]
        to: String,
    },
}
