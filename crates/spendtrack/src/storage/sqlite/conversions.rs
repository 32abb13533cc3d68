//! SQLite row conversion functions.
//!
//! Pure functions for converting between SQLite rows and domain types.
//! These are testable in isolation without database access.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Row;
use spendtrack_core::auth::UserId;
use spendtrack_core::expense::Expense;
use uuid::Uuid;

/// Convert a SQLite row to an Expense.
///
/// Expected columns: expense_id, user_id, amount, category, description,
/// timestamp, receipt_url
pub fn row_to_expense(row: &Row) -> rusqlite::Result<Expense> {
    let id: String = row.get(0)?;
    let user_id: String = row.get(1)?;
    let amount: f64 = row.get(2)?;
    let category: String = row.get(3)?;
    let description: Option<String> = row.get(4)?;
    let timestamp: String = row.get(5)?;
    let receipt_url: Option<String> = row.get(6)?;

    Ok(Expense {
        id: parse_uuid(&id)?,
        user_id: UserId::new(user_id),
        amount,
        category,
        description: description.unwrap_or_default(),
        timestamp: parse_datetime(&timestamp)?,
        receipt_url,
    })
}

/// Parse a UUID from string.
fn parse_uuid(s: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Parse a datetime from RFC 3339 string.
fn parse_datetime(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// Format a DateTime for SQLite storage.
///
/// Fixed-width microsecond precision keeps text ordering equal to time
/// ordering.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}
