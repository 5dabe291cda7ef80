#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub color: String,
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub color: String,
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct MerchantRule {
    pub id: i64,
    pub merchant_pattern: String,
    pub category_id: i64,
    pub category_name: String,
}

/// Normalized record produced by the ingestion pipeline, independent of the
/// source sheet layout. Only emitted when `date` parsed, `merchant` is
/// non-empty, and `billed_amount` is non-zero (strictly positive for
/// overseas rows).
#[derive(Debug, Clone)]
pub struct CanonicalTransaction {
    /// 8-digit YYYYMMDD usage date.
    pub date: String,
    /// Overseas sheets only.
    pub receipt_date: Option<String>,
    pub merchant: String,
    pub business_type: Option<String>,
    pub country: Option<String>,
    pub local_amount: Option<f64>,
    pub currency: Option<String>,
    pub usd_amount: Option<f64>,
    pub exchange_rate: Option<f64>,
    /// Won-equivalent amount; equals `billed_amount` for domestic rows.
    pub krw_amount: i64,
    pub fee: i64,
    /// Final signed amount charged. Negative = cancellation/refund.
    pub billed_amount: i64,
    pub is_overseas: bool,
    pub category_id: Option<i64>,
}

impl CanonicalTransaction {
    /// A domestic row: billed and won amounts are the same figure, all
    /// overseas-only fields stay empty.
    pub fn domestic(
        date: String,
        merchant: String,
        business_type: Option<String>,
        amount: i64,
    ) -> Self {
        Self {
            date,
            receipt_date: None,
            merchant,
            business_type,
            country: None,
            local_amount: None,
            currency: Some("KRW".to_string()),
            usd_amount: None,
            exchange_rate: None,
            krw_amount: amount,
            fee: 0,
            billed_amount: amount,
            is_overseas: false,
            category_id: None,
        }
    }

    pub fn year_month(&self) -> Option<(i32, u32)> {
        if self.date.len() < 6 {
            return None;
        }
        let year = self.date[0..4].parse().ok()?;
        let month = self.date[4..6].parse().ok()?;
        Some((year, month))
    }
}

/// A persisted transaction as listed back to the user, joined with its
/// category, memo, and tags.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    pub merchant: String,
    pub business_type: Option<String>,
    pub billed_amount: i64,
    pub is_overseas: bool,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub category_color: Option<String>,
    pub memo: Option<String>,
    pub tags: Vec<Tag>,
}
