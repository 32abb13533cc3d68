//! DynamoDB repository implementation.
//!
//! Implements `ExpenseRepository` from `spendtrack_core::storage` using DynamoDB.

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use uuid::Uuid;

use spendtrack_core::auth::UserId;
use spendtrack_core::expense::{sort_newest_first, Expense};
use spendtrack_core::storage::{ExpenseRepository, Result};

use super::conversions::{amount_value, expense_key, expense_to_item, item_to_expense, Item};
use super::error::{
    map_delete_item_error, map_get_item_error, map_put_item_error, map_query_error,
    map_scan_error, map_update_item_error,
};

/// DynamoDB-based expense repository.
///
/// The table is keyed by `expense_id`. When `user_index` names a global
/// secondary index on `user_id`, listing queries it; otherwise it falls back
/// to a filtered scan.
pub struct DynamoDbRepository {
    client: Client,
    table_name: String,
    user_index: Option<String>,
}

impl DynamoDbRepository {
    pub fn new(client: Client, table_name: impl Into<String>, user_index: Option<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
            user_index,
        }
    }

    /// Builds the client from a loaded SDK config, optionally pointing it at
    /// a custom endpoint such as DynamoDB Local.
    pub fn from_sdk_config(
        sdk_config: &aws_config::SdkConfig,
        endpoint_url: Option<&str>,
        table_name: impl Into<String>,
        user_index: Option<String>,
    ) -> Self {
        let mut builder = aws_sdk_dynamodb::config::Builder::from(sdk_config);
        if let Some(url) = endpoint_url {
            builder = builder.endpoint_url(url);
        }
        Self::new(Client::from_conf(builder.build()), table_name, user_index)
    }

    /// Get the table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn query_user_index(&self, index: &str, user_id: &UserId) -> Result<Vec<Item>> {
        let mut items = Vec::new();
        let mut start_key = None;

        loop {
            let page = self
                .client
                .query()
                .table_name(&self.table_name)
                .index_name(index)
                .key_condition_expression("user_id = :uid")
                .expression_attribute_values(":uid", AttributeValue::S(user_id.to_string()))
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .map_err(map_query_error)?;

            items.extend(page.items.unwrap_or_default());
            start_key = page.last_evaluated_key;
            if start_key.is_none() {
                return Ok(items);
            }
        }
    }

    async fn scan_for_user(&self, user_id: &UserId) -> Result<Vec<Item>> {
        let mut items = Vec::new();
        let mut start_key = None;

        loop {
            let page = self
                .client
                .scan()
                .table_name(&self.table_name)
                .filter_expression("user_id = :uid")
                .expression_attribute_values(":uid", AttributeValue::S(user_id.to_string()))
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .map_err(map_scan_error)?;

            items.extend(page.items.unwrap_or_default());
            start_key = page.last_evaluated_key;
            if start_key.is_none() {
                return Ok(items);
            }
        }
    }
}

#[async_trait]
impl ExpenseRepository for DynamoDbRepository {
    async fn create_expense(&self, expense: &Expense) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(expense_to_item(expense)))
            .condition_expression("attribute_not_exists(expense_id)")
            .send()
            .await
            .map_err(|e| map_put_item_error(e, expense.id.to_string()))?;

        tracing::debug!(expense_id = %expense.id, table = %self.table_name, "Stored expense");
        Ok(())
    }

    async fn list_expenses_by_user(&self, user_id: &UserId) -> Result<Vec<Expense>> {
        let items = match &self.user_index {
            Some(index) => self.query_user_index(index, user_id).await?,
            None => self.scan_for_user(user_id).await?,
        };

        let mut expenses = items
            .iter()
            .map(item_to_expense)
            .collect::<Result<Vec<_>>>()?;
        sort_newest_first(&mut expenses);
        Ok(expenses)
    }

    async fn get_expense(&self, id: Uuid) -> Result<Option<Expense>> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(expense_key(id)))
            .send()
            .await
            .map_err(map_get_item_error)?;

        result.item.as_ref().map(item_to_expense).transpose()
    }

    async fn update_receipt_url(&self, id: Uuid, receipt_url: &str) -> Result<()> {
        self.client
            .update_item()
            .table_name(&self.table_name)
            .set_key(Some(expense_key(id)))
            .update_expression("SET receipt_url = :url")
            .condition_expression("attribute_exists(expense_id)")
            .expression_attribute_values(":url", AttributeValue::S(receipt_url.to_string()))
            .send()
            .await
            .map_err(|e| map_update_item_error(e, id))?;

        Ok(())
    }

    async fn update_expense(&self, expense: &Expense) -> Result<()> {
        self.client
            .update_item()
            .table_name(&self.table_name)
            .set_key(Some(expense_key(expense.id)))
            .update_expression("SET #amount = :amount, #category = :category, #description = :description")
            .expression_attribute_names("#amount", "amount")
            .expression_attribute_names("#category", "category")
            .expression_attribute_names("#description", "description")
            .condition_expression("attribute_exists(expense_id)")
            .expression_attribute_values(":amount", amount_value(expense.amount))
            .expression_attribute_values(":category", AttributeValue::S(expense.category.clone()))
            .expression_attribute_values(
                ":description",
                AttributeValue::S(expense.description.clone()),
            )
            .send()
            .await
            .map_err(|e| map_update_item_error(e, expense.id))?;

        Ok(())
    }

    async fn delete_expense(&self, id: Uuid) -> Result<()> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(expense_key(id)))
            .condition_expression("attribute_exists(expense_id)")
            .send()
            .await
            .map_err(|e| map_delete_item_error(e, id))?;

        Ok(())
    }
}
