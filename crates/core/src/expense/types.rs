use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::UserId;

/// A single spending record owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    #[serde(rename = "expense_id")]
    pub id: Uuid,
    pub user_id: UserId,
    /// Amount in the user's currency, always rounded to two decimals.
    pub amount: f64,
    pub category: String,
    #[serde(default)]
    pub description: String,
    /// When the expense was recorded.
    pub timestamp: DateTime<Utc>,
    /// Public URL of the attached receipt, if any.
    #[serde(default)]
    pub receipt_url: Option<String>,
}

impl Expense {
    /// Creates a new expense stamped with the current time.
    pub fn new(user_id: UserId, amount: f64, category: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            amount,
            category: category.into(),
            description: String::new(),
            timestamp: Utc::now(),
            receipt_url: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_receipt_url(mut self, url: impl Into<String>) -> Self {
        self.receipt_url = Some(url.into());
        self
    }

    /// Sets a specific ID (useful for testing).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Sets a specific timestamp (useful for testing).
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Returns true if the expense belongs to the given user.
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }
}
