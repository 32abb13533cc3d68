//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to `RepositoryError` from `spendtrack_core::storage`.

use std::fmt::Debug;

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::query::QueryError;
use aws_sdk_dynamodb::operation::scan::ScanError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use spendtrack_core::storage::RepositoryError;

const THROTTLED: &str = "Throughput exceeded, please retry";
const TABLE_NOT_FOUND: &str = "Table not found";
const INTERNAL: &str = "DynamoDB internal server error";

/// Errors that never reached the service become `ConnectionFailed`.
fn connection_error<E, R>(err: &SdkError<E, R>) -> Option<RepositoryError> {
    match err {
        SdkError::DispatchFailure(e) => Some(RepositoryError::ConnectionFailed(format!(
            "DynamoDB unreachable: {e:?}"
        ))),
        SdkError::TimeoutError(_) => Some(RepositoryError::ConnectionFailed(
            "DynamoDB request timed out".to_string(),
        )),
        _ => None,
    }
}

/// Map a GetItem SDK error to RepositoryError.
pub fn map_get_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<GetItemError, R>,
) -> RepositoryError {
    if let Some(e) = connection_error(&err) {
        return e;
    }
    match err.into_service_error() {
        GetItemError::ResourceNotFoundException(_) => {
            RepositoryError::QueryFailed(TABLE_NOT_FOUND.to_string())
        }
        GetItemError::ProvisionedThroughputExceededException(_)
        | GetItemError::RequestLimitExceeded(_) => {
            RepositoryError::QueryFailed(THROTTLED.to_string())
        }
        GetItemError::InternalServerError(_) => RepositoryError::QueryFailed(INTERNAL.to_string()),
        err => RepositoryError::QueryFailed(format!("GetItem failed: {err:?}")),
    }
}

/// Map a PutItem SDK error. A failed `attribute_not_exists` condition means
/// the id is taken.
pub fn map_put_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<PutItemError, R>,
    id: impl Into<String>,
) -> RepositoryError {
    if let Some(e) = connection_error(&err) {
        return e;
    }
    match err.into_service_error() {
        PutItemError::ConditionalCheckFailedException(_) => RepositoryError::AlreadyExists {
            entity_type: "Expense",
            id: id.into(),
        },
        PutItemError::ResourceNotFoundException(_) => {
            RepositoryError::QueryFailed(TABLE_NOT_FOUND.to_string())
        }
        PutItemError::ProvisionedThroughputExceededException(_)
        | PutItemError::RequestLimitExceeded(_) => {
            RepositoryError::QueryFailed(THROTTLED.to_string())
        }
        PutItemError::InternalServerError(_) => RepositoryError::QueryFailed(INTERNAL.to_string()),
        err => RepositoryError::QueryFailed(format!("PutItem failed: {err:?}")),
    }
}

/// Map an UpdateItem SDK error. A failed `attribute_exists` condition means
/// the expense is gone.
pub fn map_update_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<UpdateItemError, R>,
    id: impl ToString,
) -> RepositoryError {
    if let Some(e) = connection_error(&err) {
        return e;
    }
    match err.into_service_error() {
        UpdateItemError::ConditionalCheckFailedException(_) => {
            RepositoryError::expense_not_found(id)
        }
        UpdateItemError::ResourceNotFoundException(_) => {
            RepositoryError::QueryFailed(TABLE_NOT_FOUND.to_string())
        }
        UpdateItemError::ProvisionedThroughputExceededException(_)
        | UpdateItemError::RequestLimitExceeded(_) => {
            RepositoryError::QueryFailed(THROTTLED.to_string())
        }
        UpdateItemError::InternalServerError(_) => {
            RepositoryError::QueryFailed(INTERNAL.to_string())
        }
        err => RepositoryError::QueryFailed(format!("UpdateItem failed: {err:?}")),
    }
}

/// Map a DeleteItem SDK error to RepositoryError.
pub fn map_delete_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DeleteItemError, R>,
    id: impl ToString,
) -> RepositoryError {
    if let Some(e) = connection_error(&err) {
        return e;
    }
    match err.into_service_error() {
        DeleteItemError::ConditionalCheckFailedException(_) => {
            RepositoryError::expense_not_found(id)
        }
        DeleteItemError::ResourceNotFoundException(_) => {
            RepositoryError::QueryFailed(TABLE_NOT_FOUND.to_string())
        }
        DeleteItemError::ProvisionedThroughputExceededException(_)
        | DeleteItemError::RequestLimitExceeded(_) => {
            RepositoryError::QueryFailed(THROTTLED.to_string())
        }
        DeleteItemError::InternalServerError(_) => {
            RepositoryError::QueryFailed(INTERNAL.to_string())
        }
        err => RepositoryError::QueryFailed(format!("DeleteItem failed: {err:?}")),
    }
}

/// Map a Query SDK error to RepositoryError.
pub fn map_query_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<QueryError, R>,
) -> RepositoryError {
    if let Some(e) = connection_error(&err) {
        return e;
    }
    match err.into_service_error() {
        QueryError::ResourceNotFoundException(_) => {
            RepositoryError::QueryFailed("Table or index not found".to_string())
        }
        QueryError::ProvisionedThroughputExceededException(_)
        | QueryError::RequestLimitExceeded(_) => {
            RepositoryError::QueryFailed(THROTTLED.to_string())
        }
        QueryError::InternalServerError(_) => RepositoryError::QueryFailed(INTERNAL.to_string()),
        err => RepositoryError::QueryFailed(format!("Query failed: {err:?}")),
    }
}

/// Map a Scan SDK error to RepositoryError.
pub fn map_scan_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<ScanError, R>,
) -> RepositoryError {
    if let Some(e) = connection_error(&err) {
        return e;
    }
    match err.into_service_error() {
        ScanError::ResourceNotFoundException(_) => {
            RepositoryError::QueryFailed(TABLE_NOT_FOUND.to_string())
        }
        ScanError::ProvisionedThroughputExceededException(_)
        | ScanError::RequestLimitExceeded(_) => {
            RepositoryError::QueryFailed(THROTTLED.to_string())
        }
        ScanError::InternalServerError(_) => RepositoryError::QueryFailed(INTERNAL.to_string()),
        err => RepositoryError::QueryFailed(format!("Scan failed: {err:?}")),
    }
}
