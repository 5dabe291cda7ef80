use std::collections::BTreeMap;
use std::path::Path;

use rusqlite::Connection;

use crate::classify::{classify_sheet, SheetKind};
use crate::convert::{parse_domestic_sheet, parse_overseas_sheet};
use crate::error::{Result, WonbookError};
use crate::models::CanonicalTransaction;
use crate::sheet::{load_csv, load_workbook, Sheet};
use crate::store;

#[derive(Debug)]
pub struct ImportResult {
    /// Rows actually persisted; insert failures are logged and skipped.
    pub imported: usize,
    /// Previously stored rows removed by month replacement.
    pub deleted: usize,
}

/// Import a statement file: parse, then replace every touched `(year, month)`
/// with the freshly parsed rows. The file must exist and carry a supported
/// extension before any store mutation happens.
pub fn import_file(conn: &Connection, path: &Path) -> Result<ImportResult> {
    if !path.exists() {
        return Err(WonbookError::FileNotFound(path.display().to_string()));
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let transactions = match ext.as_str() {
        "xlsx" | "xls" => collect_workbook(conn, &load_workbook(path)?)?,
        "csv" => collect_csv(conn, &load_csv(path)?)?,
        _ => return Err(WonbookError::UnsupportedFormat(path.display().to_string())),
    };

    persist(conn, &transactions)
}

/// Classify and parse every sheet of a workbook. Only domestic sheets are
/// imported; overseas, summary, and unrecognized sheets are skipped with a
/// note.
pub fn collect_workbook(conn: &Connection, sheets: &[Sheet]) -> Result<Vec<CanonicalTransaction>> {
    let mut all = Vec::new();
    for sheet in sheets {
        println!("Parsing sheet: {}", sheet.name);
        let kind = classify_sheet(&sheet.name, &sheet.rows);
        match kind {
            SheetKind::Domestic => {
                let txs = parse_domestic_sheet(conn, sheet)?;
                println!("  {} domestic transactions parsed", txs.len());
                all.extend(txs);
            }
            SheetKind::Overseas => {
                println!("  skipped (overseas sheets are excluded from import)");
            }
            SheetKind::Summary | SheetKind::Unknown => {
                println!("  skipped ({} sheet)", kind.label());
            }
        }
    }
    Ok(all)
}

/// A CSV file is one implicit sheet: classify it once, then parse with the
/// matching converter. Anything but domestic/overseas yields nothing.
pub fn collect_csv(conn: &Connection, sheet: &Sheet) -> Result<Vec<CanonicalTransaction>> {
    match classify_sheet(&sheet.name, &sheet.rows) {
        SheetKind::Overseas => parse_overseas_sheet(conn, sheet),
        SheetKind::Domestic => parse_domestic_sheet(conn, sheet),
        SheetKind::Summary | SheetKind::Unknown => Ok(Vec::new()),
    }
}

/// Partition by `(year, month)` and replace each touched month: delete the
/// month's existing rows, insert the new ones, all inside one transaction
/// per month so a crash can't leave a month emptied but not repopulated.
pub fn persist(conn: &Connection, transactions: &[CanonicalTransaction]) -> Result<ImportResult> {
    let mut by_month: BTreeMap<(i32, u32), Vec<&CanonicalTransaction>> = BTreeMap::new();
    for tx in transactions {
        if let Some(ym) = tx.year_month() {
            by_month.entry(ym).or_default().push(tx);
        }
    }

    let mut imported = 0usize;
    let mut deleted = 0usize;
    for ((year, month), month_txs) in &by_month {
        let sql_tx = conn.unchecked_transaction()?;
        let removed = store::delete_transactions_for_month(&sql_tx, *year, *month)?;
        if removed > 0 {
            println!("Replacing {removed} existing transactions for {year}-{month:02}");
        }
        deleted += removed;
        for tx in month_txs {
            match store::insert_transaction(&sql_tx, tx) {
                Ok(_) => imported += 1,
                Err(e) => eprintln!("Failed to save transaction ({} {}): {e}", tx.date, tx.merchant),
            }
        }
        sql_tx.commit()?;
    }

    Ok(ImportResult { imported, deleted })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};
    use crate::sheet::Cell;
    use crate::store::TransactionFilter;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|s| Cell::Text(s.to_string())).collect()
    }

    fn write_domestic_csv(dir: &Path, name: &str, rows: &[(&str, &str, &str)]) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut content = String::from("국내이용내역,,\n이용일,가맹점,이용금액\n");
        for (date, merchant, amount) in rows {
            content.push_str(&format!("{date},{merchant},{amount}\n"));
        }
        std::fs::write(&path, &content).unwrap();
        path
    }

    #[test]
    fn test_import_csv_end_to_end() {
        let (dir, conn) = test_db();
        let path = write_domestic_csv(dir.path(), "stmt.csv", &[("20251105", "GS25 편의점", "-3500")]);

        let result = import_file(&conn, &path).unwrap();
        assert_eq!(result.imported, 1);
        assert_eq!(result.deleted, 0);

        let rows = store::list_transactions(&conn, &TransactionFilter::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, "20251105");
        assert_eq!(rows[0].merchant, "GS25 편의점");
        assert_eq!(rows[0].billed_amount, -3500);
        assert!(!rows[0].is_overseas);
    }

    #[test]
    fn test_import_missing_file() {
        let (dir, conn) = test_db();
        let err = import_file(&conn, &dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, WonbookError::FileNotFound(_)));
    }

    #[test]
    fn test_import_unsupported_extension_mutates_nothing() {
        let (dir, conn) = test_db();
        let path = dir.path().join("stmt.pdf");
        std::fs::write(&path, "not a statement").unwrap();
        let err = import_file(&conn, &path).unwrap_err();
        assert!(matches!(err, WonbookError::UnsupportedFormat(_)));
        let rows = store::list_transactions(&conn, &TransactionFilter::default()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_reimport_replaces_month() {
        let (dir, conn) = test_db();
        let first = write_domestic_csv(
            dir.path(),
            "first.csv",
            &[("20251105", "GS25", "3500"), ("20251106", "스타벅스", "6100")],
        );
        import_file(&conn, &first).unwrap();

        let second = write_domestic_csv(dir.path(), "second.csv", &[("20251107", "쿠팡", "29000")]);
        let result = import_file(&conn, &second).unwrap();
        assert_eq!(result.deleted, 2);
        assert_eq!(result.imported, 1);

        let rows = store::list_transactions(&conn, &TransactionFilter::default()).unwrap();
        assert_eq!(rows.len(), 1, "second import fully replaces the month");
        assert_eq!(rows[0].merchant, "쿠팡");
    }

    #[test]
    fn test_reimport_leaves_other_months_alone() {
        let (dir, conn) = test_db();
        let october = write_domestic_csv(dir.path(), "oct.csv", &[("20251003", "다이소", "8000")]);
        import_file(&conn, &october).unwrap();

        let november = write_domestic_csv(dir.path(), "nov.csv", &[("20251105", "GS25", "3500")]);
        let result = import_file(&conn, &november).unwrap();
        assert_eq!(result.deleted, 0);

        let rows = store::list_transactions(&conn, &TransactionFilter::default()).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_import_spanning_two_months() {
        let (dir, conn) = test_db();
        let path = write_domestic_csv(
            dir.path(),
            "span.csv",
            &[("20251030", "택시", "12000"), ("20251102", "버스", "1500")],
        );
        let result = import_file(&conn, &path).unwrap();
        assert_eq!(result.imported, 2);
        assert_eq!(store::months_in_data(&conn).unwrap(), vec![(2025, 11), (2025, 10)]);
    }

    #[test]
    fn test_workbook_skips_overseas_sheets() {
        let (_dir, conn) = test_db();
        let sheets = vec![
            Sheet {
                name: "해외이용".into(),
                rows: vec![
                    row(&["이용일", "접수일", "가맹점", "원화환산금액"]),
                    row(&["20251102", "20251104", "AWS", "17915"]),
                ],
            },
            Sheet {
                name: "일시불".into(),
                rows: vec![
                    row(&["이용일", "가맹점", "이용금액"]),
                    row(&["20251105", "GS25", "3500"]),
                ],
            },
        ];
        let txs = collect_workbook(&conn, &sheets).unwrap();
        assert_eq!(txs.len(), 1, "only the domestic sheet contributes rows");
        assert_eq!(txs[0].merchant, "GS25");

        let result = persist(&conn, &txs).unwrap();
        assert_eq!(result.imported, 1);
    }

    #[test]
    fn test_workbook_skips_summary_and_unknown_sheets() {
        let (_dir, conn) = test_db();
        let sheets = vec![
            Sheet {
                name: "청구요약".into(),
                rows: vec![row(&["결제예정 금액", "123,456"])],
            },
            Sheet {
                name: "Sheet3".into(),
                rows: vec![row(&["기타 안내"])],
            },
        ];
        let txs = collect_workbook(&conn, &sheets).unwrap();
        assert!(txs.is_empty());
    }

    #[test]
    fn test_csv_classified_overseas_uses_overseas_converter() {
        let (dir, conn) = test_db();
        let path = dir.path().join("overseas.csv");
        std::fs::write(
            &path,
            "해외이용내역,,,\n이용일,접수일,가맹점,원화환산금액\n20251102,20251104,AWS,17915\n",
        )
        .unwrap();
        let result = import_file(&conn, &path).unwrap();
        assert_eq!(result.imported, 1);
        let rows = store::list_transactions(&conn, &TransactionFilter::default()).unwrap();
        assert!(rows[0].is_overseas);
        assert_eq!(rows[0].billed_amount, 17915);
    }

    #[test]
    fn test_csv_classified_unknown_imports_nothing() {
        let (dir, conn) = test_db();
        let path = dir.path().join("odd.csv");
        std::fs::write(&path, "아무 관련 없는 내용,\n1,2\n").unwrap();
        let result = import_file(&conn, &path).unwrap();
        assert_eq!(result.imported, 0);
    }

    #[test]
    fn test_row_persist_failure_skips_and_continues() {
        let (_dir, conn) = test_db();
        let good = CanonicalTransaction::domestic("20251105".into(), "GS25".into(), None, 3500);
        let mut bad = CanonicalTransaction::domestic("20251106".into(), "깨진행".into(), None, 100);
        bad.category_id = Some(99999); // FK violation

        let result = persist(&conn, &[bad, good]).unwrap();
        assert_eq!(result.imported, 1, "count reflects only persisted rows");
        let rows = store::list_transactions(&conn, &TransactionFilter::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].merchant, "GS25");
    }

    #[test]
    fn test_auto_categorization_survives_to_store() {
        let (dir, conn) = test_db();
        let cat = store::create_category(&conn, "편의점", "#10b981").unwrap();
        store::set_merchant_rule(&conn, "GS25", cat).unwrap();

        let path = write_domestic_csv(dir.path(), "stmt.csv", &[("20251105", "GS25 편의점 강남점", "3500")]);
        import_file(&conn, &path).unwrap();

        let rows = store::list_transactions(&conn, &TransactionFilter::default()).unwrap();
        assert_eq!(rows[0].category_id, Some(cat));
        assert_eq!(rows[0].category_name.as_deref(), Some("편의점"));
    }
}
