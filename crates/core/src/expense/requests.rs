//! Request payloads for expense operations.

use serde::{Deserialize, Serialize};

use super::operations::{round_amount, validate_expense};
use super::{Expense, ExpenseError};
use crate::auth::UserId;
use crate::serde::{deserialize_optional_amount, deserialize_optional_string};

/// Request payload for creating an expense.
///
/// `receipt_url` is set when the receipt was uploaded before the expense
/// was created.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateExpenseRequest {
    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub receipt_url: Option<String>,
}

impl CreateExpenseRequest {
    pub fn new(amount: f64, category: impl Into<String>) -> Self {
        Self {
            amount: Some(amount),
            category: Some(category.into()),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_receipt_url(mut self, url: impl Into<String>) -> Self {
        self.receipt_url = Some(url.into());
        self
    }

    /// Validates the request and builds a new expense owned by `user_id`.
    pub fn into_expense(self, user_id: UserId) -> Result<Expense, ExpenseError> {
        let (Some(amount), Some(category)) = (self.amount, self.category) else {
            return Err(ExpenseError::MissingRequiredFields);
        };

        let mut expense = Expense::new(user_id, round_amount(amount), category.trim())
            .with_description(self.description.unwrap_or_default());
        expense.receipt_url = self.receipt_url;

        validate_expense(&expense)?;
        Ok(expense)
    }
}

/// Request payload for a partial expense update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateExpenseRequest {
    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub category: Option<String>,
    /// Unlike the other fields an empty string is meaningful: it clears the
    /// description.
    #[serde(default)]
    pub description: Option<String>,
}

impl UpdateExpenseRequest {
    /// Returns true if the request would change nothing.
    pub fn is_empty(&self) -> bool {
        self.amount.is_none() && self.category.is_none() && self.description.is_none()
    }

    /// Applies the update and validates the result.
    ///
    /// The expense is left untouched when validation fails.
    pub fn apply_to(self, expense: &mut Expense) -> Result<(), ExpenseError> {
        let mut updated = expense.clone();
        if let Some(amount) = self.amount {
            updated.amount = round_amount(amount);
        }
        if let Some(category) = self.category {
            updated.category = category.trim().to_string();
        }
        if let Some(description) = self.description {
            updated.description = description;
        }

        validate_expense(&updated)?;
        *expense = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_expense_rounds_and_trims() {
        let expense = CreateExpenseRequest::new(12.346, "  food ")
            .with_description("lunch")
            .into_expense(UserId::new("u1"))
            .unwrap();

        assert_eq!(expense.amount, 12.35);
        assert_eq!(expense.category, "food");
        assert_eq!(expense.description, "lunch");
        assert_eq!(expense.user_id, UserId::new("u1"));
        assert_eq!(expense.receipt_url, None);
    }

    #[test]
    fn test_into_expense_keeps_receipt_url() {
        let expense = CreateExpenseRequest::new(5.0, "travel")
            .with_receipt_url("http://localhost:8000/mock-files/u1/r.png")
            .into_expense(UserId::new("u1"))
            .unwrap();

        assert_eq!(
            expense.receipt_url.as_deref(),
            Some("http://localhost:8000/mock-files/u1/r.png")
        );
    }

    #[test]
    fn test_into_expense_requires_amount_and_category() {
        let missing_amount = CreateExpenseRequest {
            category: Some("food".to_string()),
            ..Default::default()
        };
        assert_eq!(
            missing_amount.into_expense(UserId::new("u")),
            Err(ExpenseError::MissingRequiredFields)
        );

        let missing_category = CreateExpenseRequest {
            amount: Some(3.0),
            ..Default::default()
        };
        assert_eq!(
            missing_category.into_expense(UserId::new("u")),
            Err(ExpenseError::MissingRequiredFields)
        );
    }

    #[test]
    fn test_into_expense_rejects_negative_amount() {
        let result = CreateExpenseRequest::new(-1.0, "food").into_expense(UserId::new("u"));
        assert_eq!(result, Err(ExpenseError::NonPositiveAmount));
    }

    #[test]
    fn test_create_request_from_json_with_string_amount() {
        let req: CreateExpenseRequest =
            serde_json::from_str(r#"{"amount": "19.90", "category": "books", "description": ""}"#)
                .unwrap();
        assert_eq!(req.amount, Some(19.9));
        assert_eq!(req.category.as_deref(), Some("books"));
        assert_eq!(req.description, None);
    }

    #[test]
    fn test_update_applies_fields() {
        let mut expense = Expense::new(UserId::new("u"), 10.0, "food").with_description("old");
        let update = UpdateExpenseRequest {
            amount: Some(20.004),
            category: Some("travel".to_string()),
            description: Some(String::new()),
        };

        update.apply_to(&mut expense).unwrap();

        assert_eq!(expense.amount, 20.0);
        assert_eq!(expense.category, "travel");
        assert_eq!(expense.description, "");
    }

    #[test]
    fn test_update_leaves_expense_untouched_on_error() {
        let mut expense = Expense::new(UserId::new("u"), 10.0, "food");
        let before = expense.clone();
        let update = UpdateExpenseRequest {
            amount: Some(-3.0),
            category: Some("travel".to_string()),
            description: None,
        };

        assert_eq!(
            update.apply_to(&mut expense),
            Err(ExpenseError::NonPositiveAmount)
        );
        assert_eq!(expense, before);
    }

    #[test]
    fn test_update_is_empty() {
        assert!(UpdateExpenseRequest::default().is_empty());
        let update = UpdateExpenseRequest {
            description: Some("x".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
