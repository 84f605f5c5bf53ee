use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

/// Stored expense record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expense {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub amount: f64,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<OffsetDateTime>,
}

/// Validated fields for a new record. Carries no owner; the ledger takes
/// that from the authenticated caller.
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub amount: f64,
    pub category: String,
    pub description: Option<String>,
    pub date: Option<String>,
}

/// Validated partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct ExpensePatch {
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
}

impl Expense {
    pub(crate) fn apply(&mut self, patch: ExpensePatch, now: OffsetDateTime) {
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(date) = patch.date {
            self.date = Some(date);
        }
        self.updated_at = Some(now);
    }
}
