use thiserror::Error;

pub type Result<T> = std::result::Result<T, WonbookError>;

#[derive(Debug, Error)]
pub enum WonbookError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported file format: {0} (expected .xlsx, .xls, or .csv)")]
    UnsupportedFormat(String),

    #[error("Could not open workbook: {0}")]
    Workbook(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Unknown tag: {0}")]
    UnknownTag(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}
