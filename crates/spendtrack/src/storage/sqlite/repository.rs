//! SQLite repository implementation.
//!
//! Implements `ExpenseRepository` from `spendtrack_core::storage` using SQLite.

use async_trait::async_trait;
use rusqlite::params;
use tokio_rusqlite::Connection;
use uuid::Uuid;

use spendtrack_core::auth::UserId;
use spendtrack_core::expense::{sort_newest_first, Expense};
use spendtrack_core::storage::{ExpenseRepository, RepositoryError, Result};

use super::conversions::{format_datetime, row_to_expense};
use super::error::map_tokio_rusqlite_error;
use super::schema;

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

/// Fails with `QueryReturnedNoRows` when a write touched nothing.
fn require_row(rows: usize) -> tokio_rusqlite::Result<()> {
    if rows == 0 {
        Err(wrap_err(rusqlite::Error::QueryReturnedNoRows))
    } else {
        Ok(())
    }
}

/// SQLite-based expense storage used in local mode.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Creates a new repository with a file-based database.
    ///
    /// The database file will be created if it doesn't exist.
    /// Schema tables are created automatically.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Creates a new repository with an in-memory database.
    ///
    /// Useful for testing - data is lost when the connection is dropped.
    #[cfg(test)]
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.execute_batch(schema::CREATE_TABLES).map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }
}

#[async_trait]
impl ExpenseRepository for SqliteRepository {
    async fn create_expense(&self, expense: &Expense) -> Result<()> {
        let id = expense.id.to_string();
        let user_id = expense.user_id.to_string();
        let amount = expense.amount;
        let category = expense.category.clone();
        let description = expense.description.clone();
        let timestamp = format_datetime(&expense.timestamp);
        let receipt_url = expense.receipt_url.clone();
        let expense_id = expense.id.to_string();

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_EXPENSE,
                    params![
                        id,
                        user_id,
                        amount,
                        category,
                        description,
                        timestamp,
                        receipt_url
                    ],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, expense_id))
    }

    async fn list_expenses_by_user(&self, user_id: &UserId) -> Result<Vec<Expense>> {
        let user_id_str = user_id.to_string();

        let mut expenses = self
            .conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_EXPENSES_BY_USER)
                    .map_err(wrap_err)?;
                let rows = stmt
                    .query_map([&user_id_str], row_to_expense)
                    .map_err(wrap_err)?;

                let mut expenses = Vec::new();
                for row_result in rows {
                    expenses.push(row_result.map_err(wrap_err)?);
                }
                Ok(expenses)
            })
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        // Same tie-breaking as the other backends.
        sort_newest_first(&mut expenses);
        Ok(expenses)
    }

    async fn get_expense(&self, id: Uuid) -> Result<Option<Expense>> {
        let id_str = id.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_EXPENSE_BY_ID).map_err(wrap_err)?;
                match stmt.query_row([&id_str], row_to_expense) {
                    Ok(expense) => Ok(Some(expense)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, id.to_string()))
    }

    async fn update_receipt_url(&self, id: Uuid, receipt_url: &str) -> Result<()> {
        let id_str = id.to_string();
        let receipt_url = receipt_url.to_string();

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(schema::UPDATE_RECEIPT_URL, params![id_str, receipt_url])
                    .map_err(wrap_err)?;
                require_row(rows)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, id.to_string()))
    }

    async fn update_expense(&self, expense: &Expense) -> Result<()> {
        let id = expense.id.to_string();
        let amount = expense.amount;
        let category = expense.category.clone();
        let description = expense.description.clone();
        let expense_id = expense.id.to_string();

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(
                        schema::UPDATE_EXPENSE,
                        params![id, amount, category, description],
                    )
                    .map_err(wrap_err)?;
                require_row(rows)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, expense_id))
    }

    async fn delete_expense(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(schema::DELETE_EXPENSE, [&id_str])
                    .map_err(wrap_err)?;
                require_row(rows)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, id.to_string()))
    }
}
