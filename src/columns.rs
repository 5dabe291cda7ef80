use std::collections::HashMap;

use crate::sheet::{row_text, Cell};

/// Rows scanned when locating a header row.
pub const HEADER_SCAN_ROWS: usize = 20;

/// Keywords that identify a domestic sheet's header row.
pub const DOMESTIC_HEADER_KEYWORDS: &[&str] = &["이용일", "가맹점", "이용금액", "원금"];
/// Keywords that identify an overseas sheet's header row.
pub const OVERSEAS_HEADER_KEYWORDS: &[&str] = &["이용일", "가맹점", "접수일"];

/// Index of the first row (within the scan window) whose concatenated cell
/// text contains any of `keywords`. None means no header; the caller skips
/// the sheet.
pub fn find_header_row(rows: &[Vec<Cell>], keywords: &[&str]) -> Option<usize> {
    rows.iter().take(HEADER_SCAN_ROWS).position(|row| {
        let blob = row_text(row);
        keywords.iter().any(|kw| blob.contains(kw))
    })
}

/// Canonical transaction fields a header cell can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Date,
    ReceiptDate,
    Merchant,
    BusinessType,
    Principal,
    Amount,
    InstallmentMonths,
    Country,
    LocalAmount,
    Currency,
    UsdAmount,
    ExchangeRate,
    KrwAmount,
    Fee,
    BilledAmount,
}

/// How a header label is recognized. Comparison uppercases the cell so
/// `USD`/`usd` match; Korean labels are unaffected.
#[derive(Debug, Clone, Copy)]
pub enum LabelMatch {
    Contains(&'static str),
    /// Whole-cell match, for labels that also occur inside compound labels.
    Exact(&'static str),
    /// Every listed marker must occur in the same cell.
    ContainsAll(&'static [&'static str]),
    ContainsAny(&'static [&'static str]),
}

impl LabelMatch {
    fn matches(&self, header: &str) -> bool {
        let upper = header.to_uppercase();
        match self {
            Self::Contains(label) => upper.contains(label),
            Self::Exact(label) => upper == *label,
            Self::ContainsAll(labels) => labels.iter().all(|l| upper.contains(l)),
            Self::ContainsAny(labels) => labels.iter().any(|l| upper.contains(l)),
        }
    }
}

pub struct ColumnRule {
    pub field: Field,
    pub label: LabelMatch,
}

const fn rule(field: Field, label: LabelMatch) -> ColumnRule {
    ColumnRule { field, label }
}

/// Ordered label→field rules for domestic (일시불/할부) headers. 원금 is an
/// exact match so compound labels like 할부원금 don't claim the principal
/// column.
pub const DOMESTIC_COLUMN_RULES: &[ColumnRule] = &[
    rule(Field::Date, LabelMatch::Contains("이용일")),
    rule(Field::Merchant, LabelMatch::Contains("가맹점")),
    rule(Field::BusinessType, LabelMatch::Contains("업종")),
    rule(Field::Principal, LabelMatch::Exact("원금")),
    rule(Field::Amount, LabelMatch::Contains("이용금액")),
    rule(Field::InstallmentMonths, LabelMatch::ContainsAll(&["할부", "개월"])),
];

/// Ordered label→field rules for overseas headers.
pub const OVERSEAS_COLUMN_RULES: &[ColumnRule] = &[
    rule(Field::Date, LabelMatch::Contains("이용일")),
    rule(Field::ReceiptDate, LabelMatch::Contains("접수일")),
    rule(Field::Merchant, LabelMatch::Contains("가맹점")),
    rule(Field::BusinessType, LabelMatch::Contains("업종")),
    rule(Field::Country, LabelMatch::Contains("국가")),
    rule(Field::LocalAmount, LabelMatch::ContainsAll(&["현지", "금액"])),
    rule(Field::Currency, LabelMatch::ContainsAny(&["화폐", "USD"])),
    rule(Field::UsdAmount, LabelMatch::ContainsAny(&["접수금액", "US$"])),
    rule(Field::ExchangeRate, LabelMatch::Contains("환율")),
    rule(Field::KrwAmount, LabelMatch::Contains("원화")),
    rule(Field::Fee, LabelMatch::Contains("수수료")),
    rule(Field::BilledAmount, LabelMatch::Contains("청구")),
];

/// Map canonical fields to column indices by walking the header left to
/// right. Per cell, the first rule whose label matches and whose field is
/// still unmapped claims the column, so a duplicate label later in the row
/// never overwrites an earlier one.
pub fn build_column_map(header: &[Cell], rules: &[ColumnRule]) -> HashMap<Field, usize> {
    let mut map = HashMap::new();
    for (idx, cell) in header.iter().enumerate() {
        let Some(text) = cell.text() else { continue };
        for rule in rules {
            if map.contains_key(&rule.field) {
                continue;
            }
            if rule.label.matches(&text) {
                map.insert(rule.field, idx);
                break;
            }
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|s| Cell::Text(s.to_string())).collect()
    }

    #[test]
    fn test_find_header_row_first_match() {
        let rows = vec![
            row(&["삼성카드 이용대금명세서"]),
            row(&[""]),
            row(&["이용일", "가맹점", "이용금액"]),
            row(&["20251105", "GS25", "3500"]),
        ];
        assert_eq!(find_header_row(&rows, DOMESTIC_HEADER_KEYWORDS), Some(2));
    }

    #[test]
    fn test_find_header_row_any_keyword_suffices() {
        let rows = vec![row(&["원금", "수수료"])];
        assert_eq!(find_header_row(&rows, DOMESTIC_HEADER_KEYWORDS), Some(0));
    }

    #[test]
    fn test_find_header_row_none() {
        let rows = vec![row(&["합계"]), row(&["기타"])];
        assert_eq!(find_header_row(&rows, DOMESTIC_HEADER_KEYWORDS), None);
    }

    #[test]
    fn test_find_header_row_respects_scan_window() {
        let mut rows: Vec<Vec<Cell>> = (0..HEADER_SCAN_ROWS).map(|_| row(&["x"])).collect();
        rows.push(row(&["이용일"]));
        assert_eq!(find_header_row(&rows, DOMESTIC_HEADER_KEYWORDS), None);
    }

    #[test]
    fn test_domestic_map_full_header() {
        let header = row(&["이용일자", "가맹점명", "업종", "원금", "이용금액", "할부개월"]);
        let map = build_column_map(&header, DOMESTIC_COLUMN_RULES);
        assert_eq!(map.get(&Field::Date), Some(&0));
        assert_eq!(map.get(&Field::Merchant), Some(&1));
        assert_eq!(map.get(&Field::BusinessType), Some(&2));
        assert_eq!(map.get(&Field::Principal), Some(&3));
        assert_eq!(map.get(&Field::Amount), Some(&4));
        assert_eq!(map.get(&Field::InstallmentMonths), Some(&5));
    }

    #[test]
    fn test_principal_requires_exact_label() {
        // 할부원금 is a compound label, not the principal column.
        let header = row(&["이용일", "가맹점", "할부원금"]);
        let map = build_column_map(&header, DOMESTIC_COLUMN_RULES);
        assert_eq!(map.get(&Field::Principal), None);
    }

    #[test]
    fn test_installment_months_needs_both_markers() {
        let header = row(&["할부", "개월수"]);
        let map = build_column_map(&header, DOMESTIC_COLUMN_RULES);
        assert_eq!(map.get(&Field::InstallmentMonths), None);

        let header = row(&["할부개월수"]);
        let map = build_column_map(&header, DOMESTIC_COLUMN_RULES);
        assert_eq!(map.get(&Field::InstallmentMonths), Some(&0));
    }

    #[test]
    fn test_first_occurrence_wins_on_duplicate_labels() {
        let header = row(&["이용일", "이용일(현지)"]);
        let map = build_column_map(&header, DOMESTIC_COLUMN_RULES);
        assert_eq!(map.get(&Field::Date), Some(&0));
    }

    #[test]
    fn test_overseas_map_full_header() {
        let header = row(&[
            "이용일", "접수일", "가맹점", "업종", "국가", "현지화폐금액", "화폐",
            "접수금액(US$)", "환율", "원화환산금액", "수수료", "청구금액",
        ]);
        let map = build_column_map(&header, OVERSEAS_COLUMN_RULES);
        assert_eq!(map.get(&Field::Date), Some(&0));
        assert_eq!(map.get(&Field::ReceiptDate), Some(&1));
        assert_eq!(map.get(&Field::Merchant), Some(&2));
        assert_eq!(map.get(&Field::Country), Some(&4));
        assert_eq!(map.get(&Field::KrwAmount), Some(&9));
        assert_eq!(map.get(&Field::Fee), Some(&10));
        assert_eq!(map.get(&Field::BilledAmount), Some(&11));
    }

    #[test]
    fn test_overseas_usd_label_is_case_insensitive() {
        let header = row(&["이용일", "가맹점", "usd"]);
        let map = build_column_map(&header, OVERSEAS_COLUMN_RULES);
        assert_eq!(map.get(&Field::Currency), Some(&2));
    }

    #[test]
    fn test_cell_claimed_by_later_rule_when_field_taken() {
        // Second 현지금액-style cell falls through LocalAmount (taken) and
        // matches nothing else rather than stealing another field.
        let header = row(&["현지금액", "현지이용금액"]);
        let map = build_column_map(&header, OVERSEAS_COLUMN_RULES);
        assert_eq!(map.get(&Field::LocalAmount), Some(&0));
        assert_eq!(map.len(), 1);
    }
}
