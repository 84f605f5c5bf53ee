use std::{collections::BTreeMap, sync::Arc};

use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    repo_types::{Expense, ExpensePatch, NewExpense},
    services::summarize_by_category,
};

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("expense not found")]
    NotFound,
}

/// Expense Ledger. Every lookup matches on both record id and owner, so a
/// record owned by someone else behaves exactly like a missing one.
#[derive(Clone, Default)]
pub struct ExpenseLedger {
    records: Arc<RwLock<Vec<Expense>>>,
}

impl ExpenseLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, owner_id: Uuid, fields: NewExpense) -> Expense {
        let expense = Expense {
            id: Uuid::new_v4(),
            owner_id,
            amount: fields.amount,
            category: fields.category,
            description: fields.description,
            date: fields.date,
            created_at: OffsetDateTime::now_utc(),
            updated_at: None,
        };
        self.records.write().await.push(expense.clone());
        expense
    }

    /// Insertion order.
    pub async fn list_by_owner(&self, owner_id: Uuid) -> Vec<Expense> {
        self.records
            .read()
            .await
            .iter()
            .filter(|e| e.owner_id == owner_id)
            .cloned()
            .collect()
    }

    pub async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        patch: ExpensePatch,
    ) -> Result<Expense, LedgerError> {
        let mut records = self.records.write().await;
        let expense = records
            .iter_mut()
            .find(|e| e.id == id && e.owner_id == owner_id)
            .ok_or(LedgerError::NotFound)?;
        expense.apply(patch, OffsetDateTime::now_utc());
        Ok(expense.clone())
    }

    /// Returns whether a record was removed.
    pub async fn delete(&self, owner_id: Uuid, id: Uuid) -> bool {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|e| !(e.id == id && e.owner_id == owner_id));
        records.len() != before
    }

    pub async fn aggregate_by_category(&self, owner_id: Uuid) -> BTreeMap<String, f64> {
        let records = self.records.read().await;
        summarize_by_category(records.iter().filter(|e| e.owner_id == owner_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_expense(amount: f64, category: &str) -> NewExpense {
        NewExpense {
            amount,
            category: category.into(),
            description: Some("lunch".into()),
            date: Some("2024-05-01".into()),
        }
    }

    #[tokio::test]
    async fn create_sets_owner_and_timestamps() {
        let ledger = ExpenseLedger::new();
        let owner = Uuid::new_v4();
        let expense = ledger.create(owner, new_expense(12.5, "food")).await;

        assert_eq!(expense.owner_id, owner);
        assert_eq!(expense.amount, 12.5);
        assert!(expense.updated_at.is_none());
        assert_eq!(ledger.list_by_owner(owner).await, vec![expense]);
    }

    #[tokio::test]
    async fn list_preserves_insertion_order() {
        let ledger = ExpenseLedger::new();
        let owner = Uuid::new_v4();
        let first = ledger.create(owner, new_expense(1.0, "a")).await;
        let second = ledger.create(owner, new_expense(2.0, "b")).await;
        let third = ledger.create(owner, new_expense(3.0, "c")).await;

        let ids: Vec<Uuid> = ledger.list_by_owner(owner).await.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![first.id, second.id, third.id]);
    }

    #[tokio::test]
    async fn other_owners_cannot_see_or_touch_records() {
        let ledger = ExpenseLedger::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let expense = ledger.create(alice, new_expense(10.0, "food")).await;

        assert!(ledger.list_by_owner(bob).await.is_empty());
        assert!(matches!(
            ledger
                .update(bob, expense.id, ExpensePatch { amount: Some(0.0), ..Default::default() })
                .await,
            Err(LedgerError::NotFound)
        ));
        assert!(!ledger.delete(bob, expense.id).await);

        assert_eq!(ledger.list_by_owner(alice).await, vec![expense]);
    }

    #[tokio::test]
    async fn update_merges_only_supplied_fields() {
        let ledger = ExpenseLedger::new();
        let owner = Uuid::new_v4();
        let original = ledger.create(owner, new_expense(10.0, "food")).await;

        let updated = ledger
            .update(
                owner,
                original.id,
                ExpensePatch {
                    category: Some("new".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.category, "new");
        assert!(updated.updated_at.is_some());
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.owner_id, original.owner_id);
        assert_eq!(updated.amount, original.amount);
        assert_eq!(updated.description, original.description);
        assert_eq!(updated.date, original.date);
        assert_eq!(updated.created_at, original.created_at);
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let ledger = ExpenseLedger::new();
        let result = ledger
            .update(Uuid::new_v4(), Uuid::new_v4(), ExpensePatch::default())
            .await;
        assert!(matches!(result, Err(LedgerError::NotFound)));
    }

    #[tokio::test]
    async fn delete_removes_only_the_target() {
        let ledger = ExpenseLedger::new();
        let owner = Uuid::new_v4();
        let gone = ledger.create(owner, new_expense(1.0, "a")).await;
        let kept = ledger.create(owner, new_expense(2.0, "b")).await;

        assert!(ledger.delete(owner, gone.id).await);
        assert!(!ledger.delete(owner, gone.id).await);
        assert_eq!(ledger.list_by_owner(owner).await, vec![kept]);
    }

    #[tokio::test]
    async fn aggregate_is_scoped_to_owner() {
        let ledger = ExpenseLedger::new();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        ledger.create(owner, new_expense(10.0, "food")).await;
        ledger.create(owner, new_expense(5.0, "food")).await;
        ledger.create(owner, new_expense(100.0, "rent")).await;
        ledger.create(other, new_expense(7.0, "food")).await;
        ledger.create(other, new_expense(3.0, "travel")).await;

        let summary = ledger.aggregate_by_category(owner).await;
        let expected: BTreeMap<String, f64> =
            [("food".to_string(), 15.0), ("rent".to_string(), 100.0)].into();
        assert_eq!(summary, expected);
    }

    #[tokio::test]
    async fn concurrent_creates_are_all_visible() {
        let ledger = ExpenseLedger::new();
        let owner = Uuid::new_v4();

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let ledger = ledger.clone();
                tokio::spawn(async move { ledger.create(owner, new_expense(i as f64, "x")).await })
            })
            .collect();
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(ledger.list_by_owner(owner).await.len(), 32);
        assert_eq!(ledger.aggregate_by_category(owner).await["x"], 496.0);
    }
}
