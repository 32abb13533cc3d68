use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::UserId;
use crate::expense::Expense;

use super::Result;

/// Persistence for expense records.
///
/// Implemented by the SQLite (local) and DynamoDB (cloud) backends, plus an
/// in-memory store used in tests.
#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    /// Stores a new expense. Fails with `AlreadyExists` on a duplicate id.
    async fn create_expense(&self, expense: &Expense) -> Result<()>;

    /// Lists all expenses of a user, newest first.
    async fn list_expenses_by_user(&self, user_id: &UserId) -> Result<Vec<Expense>>;

    /// Gets an expense by its ID.
    async fn get_expense(&self, id: Uuid) -> Result<Option<Expense>>;

    /// Sets the receipt URL of an existing expense.
    async fn update_receipt_url(&self, id: Uuid, receipt_url: &str) -> Result<()>;

    /// Replaces the stored amount, category and description.
    async fn update_expense(&self, expense: &Expense) -> Result<()>;

    /// Deletes an expense. Fails with `NotFound` if it does not exist.
    async fn delete_expense(&self, id: Uuid) -> Result<()>;
}
