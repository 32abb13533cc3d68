//! DynamoDB attribute conversion functions.
//!
//! Pure functions for converting between DynamoDB AttributeValue maps and
//! expenses. These are testable in isolation without DynamoDB access.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use spendtrack_core::auth::UserId;
use spendtrack_core::expense::Expense;
use spendtrack_core::storage::RepositoryError;
use uuid::Uuid;

/// Partition key of the expenses table.
pub const EXPENSE_ID: &str = "expense_id";
/// Partition key of the per-user index.
pub const USER_ID: &str = "user_id";

pub type Item = HashMap<String, AttributeValue>;

/// Formats an amount as a DynamoDB number with two decimals.
pub fn amount_value(amount: f64) -> AttributeValue {
    AttributeValue::N(format!("{amount:.2}"))
}

/// Convert an Expense to a DynamoDB item.
///
/// `receipt_url` is only written when present so a missing receipt stays
/// absent instead of becoming an empty string.
pub fn expense_to_item(expense: &Expense) -> Item {
    let mut item = HashMap::new();

    item.insert(
        EXPENSE_ID.to_string(),
        AttributeValue::S(expense.id.to_string()),
    );
    item.insert(
        USER_ID.to_string(),
        AttributeValue::S(expense.user_id.to_string()),
    );
    item.insert("amount".to_string(), amount_value(expense.amount));
    item.insert(
        "category".to_string(),
        AttributeValue::S(expense.category.clone()),
    );
    item.insert(
        "description".to_string(),
        AttributeValue::S(expense.description.clone()),
    );
    item.insert(
        "timestamp".to_string(),
        AttributeValue::S(expense.timestamp.to_rfc3339()),
    );
    if let Some(url) = &expense.receipt_url {
        item.insert("receipt_url".to_string(), AttributeValue::S(url.clone()));
    }

    item
}

/// Convert a DynamoDB item to an Expense.
pub fn item_to_expense(item: &Item) -> Result<Expense, RepositoryError> {
    Ok(Expense {
        id: get_uuid(item, EXPENSE_ID)?,
        user_id: UserId::new(get_string(item, USER_ID)?),
        amount: get_amount(item, "amount")?,
        category: get_string(item, "category")?,
        description: get_optional_string(item, "description").unwrap_or_default(),
        timestamp: get_datetime(item, "timestamp")?,
        receipt_url: get_optional_string(item, "receipt_url").filter(|url| !url.is_empty()),
    })
}

/// Key map addressing a single expense.
pub fn expense_key(id: Uuid) -> Item {
    HashMap::from([(EXPENSE_ID.to_string(), AttributeValue::S(id.to_string()))])
}

fn get_string(item: &Item, key: &str) -> Result<String, RepositoryError> {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
        .ok_or_else(|| RepositoryError::InvalidData(format!("Missing or invalid field: {key}")))
}

fn get_optional_string(item: &Item, key: &str) -> Option<String> {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
}

fn get_uuid(item: &Item, key: &str) -> Result<Uuid, RepositoryError> {
    let s = get_string(item, key)?;
    Uuid::parse_str(&s)
        .map_err(|e| RepositoryError::InvalidData(format!("Invalid UUID {key}: {e}")))
}

/// Amounts written by older clients may be strings instead of numbers.
fn get_amount(item: &Item, key: &str) -> Result<f64, RepositoryError> {
    let raw = match item.get(key) {
        Some(AttributeValue::N(n)) => n.as_str(),
        Some(AttributeValue::S(s)) => s.as_str(),
        _ => {
            return Err(RepositoryError::InvalidData(format!(
                "Missing or invalid field: {key}"
            )))
        }
    };
    raw.trim()
        .parse::<f64>()
        .map_err(|e| RepositoryError::InvalidData(format!("Invalid number {key}: {e}")))
}

fn get_datetime(item: &Item, key: &str) -> Result<DateTime<Utc>, RepositoryError> {
    let s = get_string(item, key)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::InvalidData(format!("Invalid datetime {key}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_expense() -> Expense {
        Expense::new(UserId::new("cognito-sub-1"), 42.5, "groceries")
            .with_id(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440003").unwrap())
            .with_description("weekly shop")
            .with_timestamp(
                DateTime::parse_from_rfc3339("2024-01-15T10:30:00Z")
                    .unwrap()
                    .with_timezone(&Utc),
            )
    }

    #[test]
    fn test_expense_item_layout() {
        let item = expense_to_item(&sample_expense());

        assert_eq!(
            item.get("expense_id").unwrap().as_s().unwrap(),
            "550e8400-e29b-41d4-a716-446655440003"
        );
        assert_eq!(item.get("user_id").unwrap().as_s().unwrap(), "cognito-sub-1");
        assert_eq!(item.get("amount").unwrap().as_n().unwrap(), "42.50");
        assert!(!item.contains_key("receipt_url"));
    }

    #[test]
    fn test_expense_round_trip() {
        let expense = sample_expense().with_receipt_url("https://b.s3.us-east-1.amazonaws.com/k");
        let parsed = item_to_expense(&expense_to_item(&expense)).unwrap();
        assert_eq!(parsed, expense);
    }

    #[test]
    fn test_amount_stored_as_string_is_accepted() {
        let mut item = expense_to_item(&sample_expense());
        item.insert("amount".to_string(), AttributeValue::S("7.25".to_string()));

        assert_eq!(item_to_expense(&item).unwrap().amount, 7.25);
    }

    #[test]
    fn test_missing_description_defaults_to_empty() {
        let mut item = expense_to_item(&sample_expense());
        item.remove("description");

        assert_eq!(item_to_expense(&item).unwrap().description, "");
    }

    #[test]
    fn test_invalid_items_are_rejected() {
        let mut item = expense_to_item(&sample_expense());
        item.insert("amount".to_string(), AttributeValue::N("abc".to_string()));
        assert!(matches!(
            item_to_expense(&item),
            Err(RepositoryError::InvalidData(_))
        ));

        let mut item = expense_to_item(&sample_expense());
        item.remove("category");
        assert!(matches!(
            item_to_expense(&item),
            Err(RepositoryError::InvalidData(_))
        ));
    }

    #[test]
    fn test_expense_key() {
        let key = expense_key(Uuid::nil());
        assert_eq!(key.len(), 1);
        assert_eq!(
            key.get("expense_id").unwrap().as_s().unwrap(),
            &Uuid::nil().to_string()
        );
    }
}
