//! In-memory repository implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use spendtrack_core::auth::UserId;
use spendtrack_core::expense::{sort_newest_first, Expense};
use spendtrack_core::storage::{ExpenseRepository, RepositoryError, Result};

/// Expenses kept in a `HashMap` behind `Arc<RwLock<_>>`. Data is lost when
/// the last clone is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    expenses: Arc<RwLock<HashMap<Uuid, Expense>>>,
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExpenseRepository for InMemoryRepository {
    async fn create_expense(&self, expense: &Expense) -> Result<()> {
        let mut expenses = self.expenses.write().await;
        if expenses.contains_key(&expense.id) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Expense",
                id: expense.id.to_string(),
            });
        }
        expenses.insert(expense.id, expense.clone());
        Ok(())
    }

    async fn list_expenses_by_user(&self, user_id: &UserId) -> Result<Vec<Expense>> {
        let expenses = self.expenses.read().await;
        let mut owned: Vec<Expense> = expenses
            .values()
            .filter(|e| e.is_owned_by(user_id))
            .cloned()
            .collect();
        sort_newest_first(&mut owned);
        Ok(owned)
    }

    async fn get_expense(&self, id: Uuid) -> Result<Option<Expense>> {
        Ok(self.expenses.read().await.get(&id).cloned())
    }

    async fn update_receipt_url(&self, id: Uuid, receipt_url: &str) -> Result<()> {
        let mut expenses = self.expenses.write().await;
        let expense = expenses
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::expense_not_found(id))?;
        expense.receipt_url = Some(receipt_url.to_string());
        Ok(())
    }

    async fn update_expense(&self, expense: &Expense) -> Result<()> {
        let mut expenses = self.expenses.write().await;
        let stored = expenses
            .get_mut(&expense.id)
            .ok_or_else(|| RepositoryError::expense_not_found(expense.id))?;
        stored.amount = expense.amount;
        stored.category = expense.category.clone();
        stored.description = expense.description.clone();
        Ok(())
    }

    async fn delete_expense(&self, id: Uuid) -> Result<()> {
        self.expenses
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::expense_not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_crud_round() {
        let repo = InMemoryRepository::new();
        let mut expense = Expense::new(UserId::new("u1"), 9.99, "books");
        repo.create_expense(&expense).await.unwrap();

        assert!(matches!(
            repo.create_expense(&expense).await,
            Err(RepositoryError::AlreadyExists { .. })
        ));

        expense.category = "education".to_string();
        repo.update_expense(&expense).await.unwrap();
        repo.update_receipt_url(expense.id, "http://x/y.pdf").await.unwrap();

        let stored = repo.get_expense(expense.id).await.unwrap().unwrap();
        assert_eq!(stored.category, "education");
        assert_eq!(stored.receipt_url.as_deref(), Some("http://x/y.pdf"));

        repo.delete_expense(expense.id).await.unwrap();
        assert_eq!(
            repo.delete_expense(expense.id).await,
            Err(RepositoryError::expense_not_found(expense.id))
        );
    }

    #[tokio::test]
    async fn test_list_filters_and_orders() {
        let repo = InMemoryRepository::new();
        let now = Utc::now();
        let a = Expense::new(UserId::new("u1"), 1.0, "a").with_timestamp(now - Duration::hours(1));
        let b = Expense::new(UserId::new("u1"), 2.0, "b").with_timestamp(now);
        let c = Expense::new(UserId::new("u2"), 3.0, "c");
        for e in [&a, &b, &c] {
            repo.create_expense(e).await.unwrap();
        }

        let listed = repo.list_expenses_by_user(&UserId::new("u1")).await.unwrap();
        assert_eq!(listed.iter().map(|e| e.id).collect::<Vec<_>>(), vec![b.id, a.id]);
    }
}
