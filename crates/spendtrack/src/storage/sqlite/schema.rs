//! SQLite schema definitions and SQL query constants.
//!
//! This module contains all SQL statements used by the SQLite repository,
//! following the Functional Core pattern - pure data, no I/O.

/// SQL statement to create all tables.
pub const CREATE_TABLES: &str = r#"
-- Expenses table
CREATE TABLE IF NOT EXISTS expenses (
    expense_id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    amount REAL NOT NULL CHECK (amount > 0),
    category TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    timestamp TEXT NOT NULL,
    receipt_url TEXT
);

-- Listing is always per user, newest first
CREATE INDEX IF NOT EXISTS idx_expenses_user_timestamp ON expenses(user_id, timestamp DESC);
"#;

pub const INSERT_EXPENSE: &str = r#"
INSERT INTO expenses (expense_id, user_id, amount, category, description, timestamp, receipt_url)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
"#;

pub const SELECT_EXPENSE_BY_ID: &str = r#"
SELECT expense_id, user_id, amount, category, description, timestamp, receipt_url
FROM expenses
WHERE expense_id = ?1
"#;

pub const SELECT_EXPENSES_BY_USER: &str = r#"
SELECT expense_id, user_id, amount, category, description, timestamp, receipt_url
FROM expenses
WHERE user_id = ?1
ORDER BY timestamp DESC
"#;

pub const UPDATE_EXPENSE: &str = r#"
UPDATE expenses
SET amount = ?2, category = ?3, description = ?4
WHERE expense_id = ?1
"#;

pub const UPDATE_RECEIPT_URL: &str = r#"
UPDATE expenses
SET receipt_url = ?2
WHERE expense_id = ?1
"#;

pub const DELETE_EXPENSE: &str = r#"
DELETE FROM expenses
WHERE expense_id = ?1
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tables_is_valid_sql() {
        assert!(CREATE_TABLES.contains("CREATE TABLE IF NOT EXISTS expenses"));
        assert!(CREATE_TABLES.contains("idx_expenses_user_timestamp"));
    }

    #[test]
    fn test_queries_contain_expected_keywords() {
        assert!(INSERT_EXPENSE.contains("INSERT"));
        assert!(SELECT_EXPENSE_BY_ID.contains("WHERE expense_id"));
        assert!(SELECT_EXPENSES_BY_USER.contains("ORDER BY timestamp DESC"));
        assert!(UPDATE_EXPENSE.contains("UPDATE"));
        assert!(UPDATE_RECEIPT_URL.contains("receipt_url = ?2"));
        assert!(DELETE_EXPENSE.contains("DELETE"));
    }
}
