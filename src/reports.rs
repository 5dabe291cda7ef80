use rusqlite::Connection;

use crate::error::Result;

// ---------------------------------------------------------------------------
// Category summaries
// ---------------------------------------------------------------------------

/// Per-category spending for a period. `category_id`/`name` are None for the
/// unclassified bucket.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct CategorySummary {
    pub category_id: Option<i64>,
    pub name: Option<String>,
    pub color: Option<String>,
    pub count: i64,
    pub total: i64,
}

fn category_summary_between(conn: &Connection, start: &str, end: &str) -> Result<Vec<CategorySummary>> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.name, c.color, COUNT(t.id), SUM(t.billed_amount) \
         FROM transactions t \
         LEFT JOIN categories c ON t.category_id = c.id \
         WHERE substr(t.date, 1, 6) >= ?1 AND substr(t.date, 1, 6) <= ?2 \
         GROUP BY c.id \
         ORDER BY 5 DESC",
    )?;
    let rows = stmt
        .query_map([start, end], |row| {
            Ok(CategorySummary {
                category_id: row.get(0)?,
                name: row.get(1)?,
                color: row.get(2)?,
                count: row.get(3)?,
                total: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn monthly_summary(conn: &Connection, year: i32, month: u32) -> Result<Vec<CategorySummary>> {
    let ym = format!("{year:04}{month:02}");
    category_summary_between(conn, &ym, &ym)
}

/// Inclusive (year, month)..(year, month) category breakdown for the
/// dashboard period view.
pub fn range_summary(
    conn: &Connection,
    start: (i32, u32),
    end: (i32, u32),
) -> Result<Vec<CategorySummary>> {
    let start = format!("{:04}{:02}", start.0, start.1);
    let end = format!("{:04}{:02}", end.0, end.1);
    category_summary_between(conn, &start, &end)
}

// ---------------------------------------------------------------------------
// Yearly trend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MonthlyTotal {
    pub month: u32,
    pub total: i64,
}

/// Month-by-month totals across one year, in calendar order. Months with no
/// transactions are absent.
pub fn yearly_summary(conn: &Connection, year: i32) -> Result<Vec<MonthlyTotal>> {
    let mut stmt = conn.prepare(
        "SELECT substr(date, 5, 2), SUM(billed_amount) FROM transactions \
         WHERE substr(date, 1, 4) = ?1 \
         GROUP BY 1 ORDER BY 1",
    )?;
    let rows = stmt
        .query_map([format!("{year:04}")], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?
        .filter_map(|r| r.ok())
        .filter_map(|(m, total)| Some(MonthlyTotal { month: m.parse().ok()?, total }))
        .collect();
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Tag summary
// ---------------------------------------------------------------------------

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct TagSummary {
    pub tag_id: i64,
    pub name: String,
    pub color: String,
    pub count: i64,
    pub total: i64,
}

pub fn tag_summary(
    conn: &Connection,
    year: Option<i32>,
    month: Option<u32>,
) -> Result<Vec<TagSummary>> {
    let mut sql = String::from(
        "SELECT tg.id, tg.name, tg.color, COUNT(DISTINCT t.id), SUM(t.billed_amount) \
         FROM transaction_tags tt \
         JOIN tags tg ON tt.tag_id = tg.id \
         JOIN transactions t ON tt.transaction_id = t.id \
         WHERE 1=1",
    );
    let mut params: Vec<String> = Vec::new();
    if let Some(year) = year {
        sql.push_str(&format!(" AND substr(t.date, 1, 4) = ?{}", params.len() + 1));
        params.push(format!("{year:04}"));
    }
    if let Some(month) = month {
        sql.push_str(&format!(" AND substr(t.date, 5, 2) = ?{}", params.len() + 1));
        params.push(format!("{month:02}"));
    }
    sql.push_str(" GROUP BY tg.id ORDER BY 5 DESC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(params), |row| {
            Ok(TagSummary {
                tag_id: row.get(0)?,
                name: row.get(1)?,
                color: row.get(2)?,
                count: row.get(3)?,
                total: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}
