use std::collections::HashMap;

use rusqlite::Connection;

use crate::classify::is_installment_sheet;
use crate::columns::{
    build_column_map, find_header_row, Field, DOMESTIC_COLUMN_RULES, DOMESTIC_HEADER_KEYWORDS,
    OVERSEAS_COLUMN_RULES, OVERSEAS_HEADER_KEYWORDS,
};
use crate::error::Result;
use crate::models::CanonicalTransaction;
use crate::normalize::{clean_amount, parse_date};
use crate::sheet::{Cell, Sheet};
use crate::store;

fn cell<'a>(row: &'a [Cell], map: &HashMap<Field, usize>, field: Field) -> Option<&'a Cell> {
    map.get(&field).and_then(|&idx| row.get(idx))
}

fn text(row: &[Cell], map: &HashMap<Field, usize>, field: Field) -> Option<String> {
    cell(row, map, field).and_then(|c| c.text())
}

fn amount(row: &[Cell], map: &HashMap<Field, usize>, field: Field) -> Option<f64> {
    cell(row, map, field).map(clean_amount)
}

/// Parse a 일시불/할부 sheet into canonical transactions.
///
/// Installment sheets bill the 원금 (principal) column; lump-sum sheets bill
/// 이용금액. A row is kept when its date parses, its merchant is non-empty,
/// and the billed amount is non-zero. Negative amounts are cancellations
/// and are kept.
pub fn parse_domestic_sheet(conn: &Connection, sheet: &Sheet) -> Result<Vec<CanonicalTransaction>> {
    let mut transactions = Vec::new();
    let is_installment = is_installment_sheet(&sheet.rows) || sheet.name.contains("할부");

    let Some(header_row) = find_header_row(&sheet.rows, DOMESTIC_HEADER_KEYWORDS) else {
        println!("  No domestic header row found; skipping sheet");
        return Ok(transactions);
    };
    let map = build_column_map(&sheet.rows[header_row], DOMESTIC_COLUMN_RULES);

    for row in sheet.rows.iter().skip(header_row + 1) {
        // Blank and 합계 rows have no parseable date.
        let Some(date) = cell(row, &map, Field::Date).and_then(parse_date) else {
            continue;
        };

        let raw_amount = if is_installment && map.contains_key(&Field::Principal) {
            amount(row, &map, Field::Principal)
        } else {
            amount(row, &map, Field::Amount)
        };
        let billed = raw_amount.unwrap_or(0.0) as i64;

        let merchant = text(row, &map, Field::Merchant).unwrap_or_default();
        let business_type = text(row, &map, Field::BusinessType);

        if merchant.is_empty() || billed == 0 {
            continue;
        }

        let mut tx = CanonicalTransaction::domestic(date, merchant, business_type, billed);
        tx.category_id = store::category_for_merchant(conn, &tx.merchant)?.map(|c| c.id);
        transactions.push(tx);
    }

    Ok(transactions)
}

/// Parse a 해외이용 sheet into canonical transactions.
///
/// The billed amount is always the 원화 (won-converted) column, never the
/// issuer's 청구금액 column. Overseas rows must bill strictly positive:
/// refunds on overseas charges are dropped.
pub fn parse_overseas_sheet(conn: &Connection, sheet: &Sheet) -> Result<Vec<CanonicalTransaction>> {
    let mut transactions = Vec::new();

    let Some(header_row) = find_header_row(&sheet.rows, OVERSEAS_HEADER_KEYWORDS) else {
        println!("  No overseas header row found; skipping sheet");
        return Ok(transactions);
    };
    let map = build_column_map(&sheet.rows[header_row], OVERSEAS_COLUMN_RULES);

    for row in sheet.rows.iter().skip(header_row + 1) {
        let Some(date) = cell(row, &map, Field::Date).and_then(parse_date) else {
            continue;
        };

        let merchant = text(row, &map, Field::Merchant).unwrap_or_default();
        let krw_amount = amount(row, &map, Field::KrwAmount).unwrap_or(0.0) as i64;
        let fee = amount(row, &map, Field::Fee).unwrap_or(0.0) as i64;

        if merchant.is_empty() || krw_amount <= 0 {
            continue;
        }

        let mut tx = CanonicalTransaction {
            date,
            receipt_date: cell(row, &map, Field::ReceiptDate).and_then(parse_date),
            merchant,
            business_type: text(row, &map, Field::BusinessType),
            country: text(row, &map, Field::Country),
            local_amount: amount(row, &map, Field::LocalAmount),
            currency: text(row, &map, Field::Currency).or_else(|| Some("USD".to_string())),
            usd_amount: amount(row, &map, Field::UsdAmount),
            exchange_rate: amount(row, &map, Field::ExchangeRate),
            krw_amount,
            fee,
            billed_amount: krw_amount,
            is_overseas: true,
            category_id: None,
        };
        tx.category_id = store::category_for_merchant(conn, &tx.merchant)?.map(|c| c.id);
        transactions.push(tx);
    }

    Ok(transactions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|s| Cell::Text(s.to_string())).collect()
    }

    fn domestic_sheet(name: &str, rows: Vec<Vec<Cell>>) -> Sheet {
        Sheet {
            name: name.to_string(),
            rows,
        }
    }

    #[test]
    fn test_lump_sum_uses_usage_amount() {
        let (_dir, conn) = test_db();
        let sheet = domestic_sheet(
            "일시불",
            vec![
                row(&["이용일", "가맹점", "이용금액"]),
                row(&["20251105", "GS25 편의점", "-3500"]),
            ],
        );
        let txs = parse_domestic_sheet(&conn, &sheet).unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].date, "20251105");
        assert_eq!(txs[0].merchant, "GS25 편의점");
        assert_eq!(txs[0].billed_amount, -3500);
        assert_eq!(txs[0].krw_amount, -3500);
        assert_eq!(txs[0].currency.as_deref(), Some("KRW"));
        assert!(!txs[0].is_overseas);
    }

    #[test]
    fn test_installment_selects_principal_over_amount() {
        let (_dir, conn) = test_db();
        let sheet = domestic_sheet(
            "할부",
            vec![
                row(&["이용일", "가맹점", "원금", "이용금액", "할부개월"]),
                row(&["20251110", "쿠팡", "50000", "150000", "3"]),
            ],
        );
        let txs = parse_domestic_sheet(&conn, &sheet).unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].billed_amount, 50000, "installment must bill the principal column");
    }

    #[test]
    fn test_installment_marker_in_rows_without_sheet_name() {
        let (_dir, conn) = test_db();
        let sheet = domestic_sheet(
            "Sheet2",
            vec![
                row(&["할부 이용내역"]),
                row(&["이용일", "가맹점", "원금", "이용금액"]),
                row(&["20251110", "쿠팡", "50000", "150000"]),
            ],
        );
        let txs = parse_domestic_sheet(&conn, &sheet).unwrap();
        assert_eq!(txs[0].billed_amount, 50000);
    }

    #[test]
    fn test_installment_without_principal_column_falls_back() {
        let (_dir, conn) = test_db();
        let sheet = domestic_sheet(
            "할부",
            vec![
                row(&["이용일", "가맹점", "이용금액"]),
                row(&["20251110", "쿠팡", "150000"]),
            ],
        );
        let txs = parse_domestic_sheet(&conn, &sheet).unwrap();
        assert_eq!(txs[0].billed_amount, 150000);
    }

    #[test]
    fn test_rows_without_merchant_or_amount_dropped() {
        let (_dir, conn) = test_db();
        let sheet = domestic_sheet(
            "일시불",
            vec![
                row(&["이용일", "가맹점", "이용금액"]),
                row(&["20251105", "", "9000"]),
                row(&["20251106", "GS25", "0"]),
                row(&["20251107", "GS25", "-5000"]),
            ],
        );
        let txs = parse_domestic_sheet(&conn, &sheet).unwrap();
        assert_eq!(txs.len(), 1, "empty merchant and zero amount are dropped");
        assert_eq!(txs[0].billed_amount, -5000, "domestic refunds are kept");
    }

    #[test]
    fn test_summary_rows_skipped_by_date() {
        let (_dir, conn) = test_db();
        let sheet = domestic_sheet(
            "일시불",
            vec![
                row(&["이용일", "가맹점", "이용금액"]),
                row(&["20251105", "GS25", "3500"]),
                row(&["합계", "", "3500"]),
                row(&[]),
            ],
        );
        let txs = parse_domestic_sheet(&conn, &sheet).unwrap();
        assert_eq!(txs.len(), 1);
    }

    #[test]
    fn test_missing_header_yields_no_rows() {
        let (_dir, conn) = test_db();
        let sheet = domestic_sheet("일시불", vec![row(&["아무 내용"]), row(&["합계", "3500"])]);
        let txs = parse_domestic_sheet(&conn, &sheet).unwrap();
        assert!(txs.is_empty());
    }

    #[test]
    fn test_domestic_auto_categorization() {
        let (_dir, conn) = test_db();
        let cat_id = store::create_category(&conn, "편의점", "#10b981").unwrap();
        store::set_merchant_rule(&conn, "GS25", cat_id).unwrap();

        let sheet = domestic_sheet(
            "일시불",
            vec![
                row(&["이용일", "가맹점", "이용금액"]),
                row(&["20251105", "GS25 편의점 강남점", "3500"]),
                row(&["20251106", "스타벅스", "6100"]),
            ],
        );
        let txs = parse_domestic_sheet(&conn, &sheet).unwrap();
        assert_eq!(txs[0].category_id, Some(cat_id));
        assert_eq!(txs[1].category_id, None, "unmatched merchants stay unclassified");
    }

    fn overseas_sheet(rows: Vec<Vec<Cell>>) -> Sheet {
        Sheet {
            name: "해외이용".to_string(),
            rows,
        }
    }

    const OVERSEAS_HEADER: &[&str] = &[
        "이용일", "접수일", "가맹점", "업종", "국가", "현지화폐금액", "화폐",
        "접수금액(US$)", "환율", "원화환산금액", "수수료", "청구금액",
    ];

    #[test]
    fn test_overseas_bills_won_converted_amount() {
        let (_dir, conn) = test_db();
        let sheet = overseas_sheet(vec![
            row(OVERSEAS_HEADER),
            row(&[
                "2025-10-02", "2025-10-04", "AWS", "전산", "US", "12.50", "USD",
                "12.50", "1,433.20", "17,915", "350", "18,265",
            ]),
        ]);
        let txs = parse_overseas_sheet(&conn, &sheet).unwrap();
        assert_eq!(txs.len(), 1);
        let tx = &txs[0];
        assert_eq!(tx.date, "20251002");
        assert_eq!(tx.receipt_date.as_deref(), Some("20251004"));
        assert_eq!(tx.krw_amount, 17915);
        assert_eq!(tx.fee, 350);
        assert_eq!(
            tx.billed_amount, 17915,
            "overseas rows bill the won-converted amount, not the issuer's billed column"
        );
        assert_eq!(tx.country.as_deref(), Some("US"));
        assert_eq!(tx.local_amount, Some(12.5));
        assert_eq!(tx.exchange_rate, Some(1433.2));
        assert!(tx.is_overseas);
    }

    #[test]
    fn test_overseas_requires_strictly_positive_amount() {
        let (_dir, conn) = test_db();
        let sheet = overseas_sheet(vec![
            row(OVERSEAS_HEADER),
            row(&["2025-10-02", "", "AWS", "", "US", "", "USD", "", "", "0", "0", "0"]),
            row(&["2025-10-03", "", "AWS", "", "US", "", "USD", "", "", "-5000", "0", "-5000"]),
        ]);
        let txs = parse_overseas_sheet(&conn, &sheet).unwrap();
        assert!(txs.is_empty(), "zero and refund rows are dropped on overseas sheets");
    }

    #[test]
    fn test_overseas_currency_defaults_to_usd() {
        let (_dir, conn) = test_db();
        let sheet = overseas_sheet(vec![
            row(&["이용일", "가맹점", "원화환산금액"]),
            row(&["20251002", "AWS", "17915"]),
        ]);
        let txs = parse_overseas_sheet(&conn, &sheet).unwrap();
        assert_eq!(txs[0].currency.as_deref(), Some("USD"));
        assert!(txs[0].receipt_date.is_none());
        assert!(txs[0].country.is_none());
    }
}
