use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    color TEXT DEFAULT '#6366f1',
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY,
    date TEXT NOT NULL,
    receipt_date TEXT,
    merchant TEXT NOT NULL,
    business_type TEXT,
    country TEXT,
    local_amount REAL,
    currency TEXT,
    usd_amount REAL,
    exchange_rate REAL,
    krw_amount INTEGER NOT NULL,
    fee INTEGER DEFAULT 0,
    billed_amount INTEGER NOT NULL,
    category_id INTEGER,
    card_number TEXT,
    is_overseas INTEGER DEFAULT 0,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (category_id) REFERENCES categories(id)
);

CREATE TABLE IF NOT EXISTS memos (
    id INTEGER PRIMARY KEY,
    transaction_id INTEGER NOT NULL UNIQUE,
    content TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (transaction_id) REFERENCES transactions(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS tags (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    color TEXT DEFAULT '#10b981'
);

CREATE TABLE IF NOT EXISTS transaction_tags (
    transaction_id INTEGER,
    tag_id INTEGER,
    PRIMARY KEY (transaction_id, tag_id),
    FOREIGN KEY (transaction_id) REFERENCES transactions(id) ON DELETE CASCADE,
    FOREIGN KEY (tag_id) REFERENCES tags(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS merchant_category_rules (
    id INTEGER PRIMARY KEY,
    merchant_pattern TEXT NOT NULL UNIQUE,
    category_id INTEGER NOT NULL,
    FOREIGN KEY (category_id) REFERENCES categories(id)
);
";

// (name, color)
const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("소프트웨어/구독", "#8b5cf6"),
    ("광고", "#f59e0b"),
    ("쇼핑", "#ec4899"),
    ("식비", "#10b981"),
    ("교통", "#3b82f6"),
    ("통신", "#6366f1"),
    ("기타", "#64748b"),
];

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;

    let count: i64 = conn.query_row("SELECT count(*) FROM categories", [], |row| row.get(0))?;
    if count == 0 {
        for (name, color) in DEFAULT_CATEGORIES {
            conn.execute(
                "INSERT INTO categories (name, color) VALUES (?1, ?2)",
                rusqlite::params![name, color],
            )?;
        }
    }
    Ok(())
}
