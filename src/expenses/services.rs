use std::collections::BTreeMap;

use super::repo_types::Expense;

/// Analytics: total amount per category. Categories without records are absent.
pub fn summarize_by_category<'a>(
    records: impl IntoIterator<Item = &'a Expense>,
) -> BTreeMap<String, f64> {
    let mut summary = BTreeMap::new();
    for e in records {
        *summary.entry(e.category.clone()).or_insert(0.0) += e.amount;
    }
    summary
}

/// Largest accepted magnitude. Keeps every per-category total finite.
pub const MAX_AMOUNT: f64 = 1e12;

/// `None` for NaN, infinities and magnitudes above `MAX_AMOUNT`.
pub fn checked_amount(value: f64) -> Option<f64> {
    (value.is_finite() && value.abs() <= MAX_AMOUNT).then_some(value)
}

/// Parses a client-supplied amount string.
pub fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().and_then(checked_amount)
}
