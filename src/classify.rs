use crate::sheet::{row_text, Cell};

/// What a statement sheet contains, decided before any parsing. Only
/// `Domestic` sheets are imported from workbooks; the CSV path also accepts
/// `Overseas`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetKind {
    Overseas,
    Domestic,
    Summary,
    Unknown,
}

impl SheetKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Overseas => "overseas",
            Self::Domestic => "domestic",
            Self::Summary => "summary",
            Self::Unknown => "unknown",
        }
    }
}

/// Rows scanned for classification keywords when the sheet name decides
/// nothing.
const CLASSIFY_SCAN_ROWS: usize = 10;
/// Rows scanned for the installment marker.
const INSTALLMENT_SCAN_ROWS: usize = 5;

/// Classify a sheet by its name first, then by keywords in its leading rows.
/// First match wins; issuer labels are matched as exact substrings.
pub fn classify_sheet(name: &str, rows: &[Vec<Cell>]) -> SheetKind {
    if name.contains("해외") {
        return SheetKind::Overseas;
    }
    if name.contains("일시불") || name.contains("할부") {
        return SheetKind::Domestic;
    }
    if name.contains("청구요약") || name.contains("요약") {
        return SheetKind::Summary;
    }

    for row in rows.iter().take(CLASSIFY_SCAN_ROWS) {
        let blob = row_text(row);
        if blob.contains("해외이용") || blob.contains("해외매출") {
            return SheetKind::Overseas;
        }
        if blob.contains("국내이용") || blob.contains("국내매출") || blob.contains("일시불") {
            return SheetKind::Domestic;
        }
        if blob.contains("청구요약") || blob.contains("결제예정") {
            return SheetKind::Summary;
        }
    }
    SheetKind::Unknown
}

/// Whether a domestic sheet is the installment variant. Decided separately
/// from `classify_sheet` because a sheet named 일시불/할부 is already
/// `Domestic` by name, and the amount-column choice still depends on this.
pub fn is_installment_sheet(rows: &[Vec<Cell>]) -> bool {
    rows.iter()
        .take(INSTALLMENT_SCAN_ROWS)
        .any(|row| row_text(row).contains("할부"))
}
