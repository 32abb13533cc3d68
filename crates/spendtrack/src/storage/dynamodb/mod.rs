//! DynamoDB storage backend implementation.
//!
//! This module provides a DynamoDB-based implementation of `ExpenseRepository`
//! using `aws-sdk-dynamodb`. Items are keyed by `expense_id`; listing uses
//! the `user_id` global secondary index when one is configured.

mod conversions;
mod error;
mod repository;

pub use repository::DynamoDbRepository;
