use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

use crate::error::{Result, WonbookError};
use crate::models::{CanonicalTransaction, Category, MerchantRule, Tag, TransactionRow};

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

pub fn insert_transaction(conn: &Connection, tx: &CanonicalTransaction) -> Result<i64> {
    conn.execute(
        "INSERT INTO transactions \
         (date, receipt_date, merchant, business_type, country, local_amount, currency, \
          usd_amount, exchange_rate, krw_amount, fee, billed_amount, category_id, is_overseas) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        rusqlite::params![
            tx.date,
            tx.receipt_date,
            tx.merchant,
            tx.business_type,
            tx.country,
            tx.local_amount,
            tx.currency,
            tx.usd_amount,
            tx.exchange_rate,
            tx.krw_amount,
            tx.fee,
            tx.billed_amount,
            tx.category_id,
            tx.is_overseas,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Delete every transaction whose date falls in `(year, month)`. Returns the
/// number of rows removed. Monthly reimports call this before inserting.
pub fn delete_transactions_for_month(conn: &Connection, year: i32, month: u32) -> Result<usize> {
    let month_str = format!("{year:04}{month:02}");
    let deleted = conn.execute(
        "DELETE FROM transactions WHERE substr(date, 1, 6) = ?1",
        [&month_str],
    )?;
    Ok(deleted)
}

/// Distinct (year, month) pairs present in the data, newest first.
pub fn months_in_data(conn: &Connection) -> Result<Vec<(i32, u32)>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT substr(date, 1, 4), substr(date, 5, 2) FROM transactions \
         ORDER BY 1 DESC, 2 DESC",
    )?;
    let months = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .filter_map(|r| r.ok())
        .filter_map(|(y, m)| Some((y.parse().ok()?, m.parse().ok()?)))
        .collect();
    Ok(months)
}

#[derive(Debug, Default, Clone)]
pub struct TransactionFilter {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub category_id: Option<i64>,
    pub tag_id: Option<i64>,
    pub search: Option<String>,
}

pub fn list_transactions(conn: &Connection, filter: &TransactionFilter) -> Result<Vec<TransactionRow>> {
    let mut sql = String::from(
        "SELECT t.id, t.date, t.merchant, t.business_type, t.billed_amount, t.is_overseas, \
                t.category_id, c.name, c.color, m.content \
         FROM transactions t \
         LEFT JOIN categories c ON t.category_id = c.id \
         LEFT JOIN memos m ON t.id = m.transaction_id \
         WHERE 1=1",
    );
    let mut params: Vec<Value> = Vec::new();

    if let Some(year) = filter.year {
        sql.push_str(&format!(" AND substr(t.date, 1, 4) = ?{}", params.len() + 1));
        params.push(Value::Text(format!("{year:04}")));
    }
    if let Some(month) = filter.month {
        sql.push_str(&format!(" AND substr(t.date, 5, 2) = ?{}", params.len() + 1));
        params.push(Value::Text(format!("{month:02}")));
    }
    if let Some(category_id) = filter.category_id {
        sql.push_str(&format!(" AND t.category_id = ?{}", params.len() + 1));
        params.push(Value::Integer(category_id));
    }
    if let Some(tag_id) = filter.tag_id {
        sql.push_str(&format!(
            " AND t.id IN (SELECT transaction_id FROM transaction_tags WHERE tag_id = ?{})",
            params.len() + 1
        ));
        params.push(Value::Integer(tag_id));
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{search}%");
        sql.push_str(&format!(
            " AND (t.merchant LIKE ?{n} OR t.business_type LIKE ?{n})",
            n = params.len() + 1
        ));
        params.push(Value::Text(pattern));
    }
    sql.push_str(" ORDER BY t.date DESC, t.id DESC");

    let mut stmt = conn.prepare(&sql)?;
    let mut rows: Vec<TransactionRow> = stmt
        .query_map(params_from_iter(params), |row| {
            Ok(TransactionRow {
                id: row.get(0)?,
                date: row.get(1)?,
                merchant: row.get(2)?,
                business_type: row.get(3)?,
                billed_amount: row.get(4)?,
                is_overseas: row.get(5)?,
                category_id: row.get(6)?,
                category_name: row.get(7)?,
                category_color: row.get(8)?,
                memo: row.get(9)?,
                tags: Vec::new(),
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    for tx in &mut rows {
        tx.tags = tags_for_transaction(conn, tx.id)?;
    }
    Ok(rows)
}

pub fn update_transaction_category(
    conn: &Connection,
    tx_id: i64,
    category_id: Option<i64>,
) -> Result<()> {
    let updated = conn.execute(
        "UPDATE transactions SET category_id = ?1 WHERE id = ?2",
        rusqlite::params![category_id, tx_id],
    )?;
    if updated == 0 {
        return Err(WonbookError::Other(format!("No transaction with ID {tx_id}")));
    }
    Ok(())
}

pub fn transaction_merchant(conn: &Connection, tx_id: i64) -> Result<String> {
    conn.query_row(
        "SELECT merchant FROM transactions WHERE id = ?1",
        [tx_id],
        |row| row.get(0),
    )
    .map_err(|_| WonbookError::Other(format!("No transaction with ID {tx_id}")))
}

pub fn delete_transaction(conn: &Connection, tx_id: i64) -> Result<()> {
    let deleted = conn.execute("DELETE FROM transactions WHERE id = ?1", [tx_id])?;
    if deleted == 0 {
        return Err(WonbookError::Other(format!("No transaction with ID {tx_id}")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Memos
// ---------------------------------------------------------------------------

/// Upsert the one memo a transaction carries; blank content removes it.
pub fn set_memo(conn: &Connection, tx_id: i64, content: &str) -> Result<()> {
    let content = content.trim();
    if content.is_empty() {
        conn.execute("DELETE FROM memos WHERE transaction_id = ?1", [tx_id])?;
    } else {
        conn.execute(
            "INSERT INTO memos (transaction_id, content) VALUES (?1, ?2) \
             ON CONFLICT(transaction_id) DO UPDATE SET \
                 content = excluded.content, \
                 updated_at = datetime('now')",
            rusqlite::params![tx_id, content],
        )?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

pub fn list_tags(conn: &Connection) -> Result<Vec<Tag>> {
    let mut stmt = conn.prepare("SELECT id, name, color FROM tags ORDER BY name")?;
    let tags = stmt
        .query_map([], |row| {
            Ok(Tag {
                id: row.get(0)?,
                name: row.get(1)?,
                color: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(tags)
}

/// Create a tag, or return the existing tag's id when the name is taken.
pub fn create_tag(conn: &Connection, name: &str) -> Result<i64> {
    let name = name.trim();
    if name.is_empty() {
        return Err(WonbookError::Other("Tag name is required".into()));
    }
    conn.execute(
        "INSERT INTO tags (name) VALUES (?1) ON CONFLICT(name) DO NOTHING",
        [name],
    )?;
    let id = conn.query_row("SELECT id FROM tags WHERE name = ?1", [name], |row| row.get(0))?;
    Ok(id)
}

pub fn tag_by_name(conn: &Connection, name: &str) -> Result<Option<Tag>> {
    let mut stmt = conn.prepare("SELECT id, name, color FROM tags WHERE name = ?1")?;
    let mut rows = stmt.query_map([name.trim()], |row| {
        Ok(Tag {
            id: row.get(0)?,
            name: row.get(1)?,
            color: row.get(2)?,
        })
    })?;
    Ok(rows.next().transpose()?)
}

pub fn add_tag_to_transaction(conn: &Connection, tx_id: i64, tag_id: i64) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO transaction_tags (transaction_id, tag_id) VALUES (?1, ?2)",
        rusqlite::params![tx_id, tag_id],
    )?;
    Ok(())
}

pub fn remove_tag_from_transaction(conn: &Connection, tx_id: i64, tag_id: i64) -> Result<()> {
    conn.execute(
        "DELETE FROM transaction_tags WHERE transaction_id = ?1 AND tag_id = ?2",
        rusqlite::params![tx_id, tag_id],
    )?;
    Ok(())
}

pub fn tags_for_transaction(conn: &Connection, tx_id: i64) -> Result<Vec<Tag>> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.name, t.color FROM tags t \
         JOIN transaction_tags tt ON t.id = tt.tag_id \
         WHERE tt.transaction_id = ?1 ORDER BY t.name",
    )?;
    let tags = stmt
        .query_map([tx_id], |row| {
            Ok(Tag {
                id: row.get(0)?,
                name: row.get(1)?,
                color: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(tags)
}

pub fn search_tags(conn: &Connection, query: &str) -> Result<Vec<Tag>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, color FROM tags WHERE name LIKE ?1 ORDER BY name LIMIT 10",
    )?;
    let tags = stmt
        .query_map([format!("%{query}%")], |row| {
            Ok(Tag {
                id: row.get(0)?,
                name: row.get(1)?,
                color: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(tags)
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

pub fn list_categories(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare("SELECT id, name, color FROM categories ORDER BY name")?;
    let categories = stmt
        .query_map([], |row| {
            Ok(Category {
                id: row.get(0)?,
                name: row.get(1)?,
                color: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(categories)
}

pub fn category_by_name(conn: &Connection, name: &str) -> Result<Option<Category>> {
    let mut stmt = conn.prepare("SELECT id, name, color FROM categories WHERE name = ?1")?;
    let mut rows = stmt.query_map([name], |row| {
        Ok(Category {
            id: row.get(0)?,
            name: row.get(1)?,
            color: row.get(2)?,
        })
    })?;
    Ok(rows.next().transpose()?)
}

pub fn create_category(conn: &Connection, name: &str, color: &str) -> Result<i64> {
    let name = name.trim();
    if name.is_empty() {
        return Err(WonbookError::Other("Category name is required".into()));
    }
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM categories WHERE name = ?1)",
        [name],
        |row| row.get(0),
    )?;
    if exists {
        return Err(WonbookError::Other(format!("Category already exists: {name}")));
    }
    conn.execute(
        "INSERT INTO categories (name, color) VALUES (?1, ?2)",
        rusqlite::params![name, color],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_category(
    conn: &Connection,
    id: i64,
    name: Option<&str>,
    color: Option<&str>,
) -> Result<()> {
    if let Some(name) = name {
        let updated = conn.execute(
            "UPDATE categories SET name = ?1 WHERE id = ?2",
            rusqlite::params![name, id],
        )?;
        if updated == 0 {
            return Err(WonbookError::Other(format!("Category not found: id {id}")));
        }
    }
    if let Some(color) = color {
        let updated = conn.execute(
            "UPDATE categories SET color = ?1 WHERE id = ?2",
            rusqlite::params![color, id],
        )?;
        if updated == 0 {
            return Err(WonbookError::Other(format!("Category not found: id {id}")));
        }
    }
    Ok(())
}

/// Delete a category. Its transactions become unclassified and its merchant
/// rules are removed; transactions themselves are never cascaded.
pub fn delete_category(conn: &Connection, id: i64) -> Result<()> {
    conn.execute(
        "UPDATE transactions SET category_id = NULL WHERE category_id = ?1",
        [id],
    )?;
    conn.execute("DELETE FROM merchant_category_rules WHERE category_id = ?1", [id])?;
    let deleted = conn.execute("DELETE FROM categories WHERE id = ?1", [id])?;
    if deleted == 0 {
        return Err(WonbookError::Other(format!("Category not found: id {id}")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Merchant rules
// ---------------------------------------------------------------------------

/// Longest-pattern-wins substring lookup, the ingestion pipeline's
/// auto-categorization hook.
pub fn category_for_merchant(conn: &Connection, merchant: &str) -> Result<Option<Category>> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.name, c.color FROM merchant_category_rules mcr \
         JOIN categories c ON mcr.category_id = c.id \
         WHERE ?1 LIKE '%' || mcr.merchant_pattern || '%' \
         ORDER BY LENGTH(mcr.merchant_pattern) DESC \
         LIMIT 1",
    )?;
    let mut rows = stmt.query_map([merchant], |row| {
        Ok(Category {
            id: row.get(0)?,
            name: row.get(1)?,
            color: row.get(2)?,
        })
    })?;
    Ok(rows.next().transpose()?)
}

pub fn set_merchant_rule(conn: &Connection, pattern: &str, category_id: i64) -> Result<()> {
    conn.execute(
        "INSERT INTO merchant_category_rules (merchant_pattern, category_id) VALUES (?1, ?2) \
         ON CONFLICT(merchant_pattern) DO UPDATE SET category_id = excluded.category_id",
        rusqlite::params![pattern, category_id],
    )?;
    Ok(())
}

/// Upsert a rule and recategorize every existing transaction whose merchant
/// matches the pattern. Returns the number of transactions updated.
pub fn apply_merchant_rule(conn: &Connection, pattern: &str, category_id: i64) -> Result<usize> {
    set_merchant_rule(conn, pattern, category_id)?;
    let affected = conn.execute(
        "UPDATE transactions SET category_id = ?1 WHERE merchant LIKE '%' || ?2 || '%'",
        rusqlite::params![category_id, pattern],
    )?;
    Ok(affected)
}

pub fn delete_merchant_rule(conn: &Connection, pattern: &str) -> Result<()> {
    let deleted = conn.execute(
        "DELETE FROM merchant_category_rules WHERE merchant_pattern = ?1",
        [pattern],
    )?;
    if deleted == 0 {
        return Err(WonbookError::Other(format!("No rule for pattern: {pattern}")));
    }
    Ok(())
}

pub fn list_merchant_rules(conn: &Connection) -> Result<Vec<MerchantRule>> {
    let mut stmt = conn.prepare(
        "SELECT mcr.id, mcr.merchant_pattern, mcr.category_id, c.name \
         FROM merchant_category_rules mcr \
         JOIN categories c ON mcr.category_id = c.id \
         ORDER BY mcr.merchant_pattern",
    )?;
    let rules = stmt
        .query_map([], |row| {
            Ok(MerchantRule {
                id: row.get(0)?,
                merchant_pattern: row.get(1)?,
                category_id: row.get(2)?,
                category_name: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rules)
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct MerchantSummary {
    pub merchant: String,
    pub business_type: Option<String>,
    pub tx_count: i64,
    pub total: i64,
}

/// Merchants with no matching rule, i.e. the user's classification backlog.
pub fn uncategorized_merchants(conn: &Connection) -> Result<Vec<MerchantSummary>> {
    let mut stmt = conn.prepare(
        "SELECT t.merchant, MAX(t.business_type), COUNT(*), SUM(t.billed_amount) \
         FROM transactions t \
         WHERE NOT EXISTS ( \
             SELECT 1 FROM merchant_category_rules mcr \
             WHERE t.merchant LIKE '%' || mcr.merchant_pattern || '%' \
         ) \
         GROUP BY t.merchant \
         ORDER BY t.merchant",
    )?;
    let merchants = stmt
        .query_map([], |row| {
            Ok(MerchantSummary {
                merchant: row.get(0)?,
                business_type: row.get(1)?,
                tx_count: row.get(2)?,
                total: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(merchants)
}
