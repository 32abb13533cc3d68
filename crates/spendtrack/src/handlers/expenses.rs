//! Expense CRUD handlers.
//!
//! Every route acts on the caller's own expenses. An expense owned by
//! someone else is reported as missing, never as forbidden.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use spendtrack_auth::CurrentUser;
use spendtrack_core::api::SuccessResponse;
use spendtrack_core::auth::UserId;
use spendtrack_core::expense::{CreateExpenseRequest, Expense, UpdateExpenseRequest};
use spendtrack_core::storage::RepositoryError;

use crate::handlers::error::{AppError, HttpError};
use crate::state::AppState;

/// Payload of the list endpoint.
#[derive(Debug, Serialize)]
pub struct ExpenseList {
    pub expenses: Vec<Expense>,
    pub count: usize,
}

/// Loads an expense the caller owns.
///
/// Unparseable ids, missing expenses and other users' expenses all come
/// back as `NotFound`.
pub(crate) async fn load_owned_expense(
    state: &AppState,
    user_id: &UserId,
    raw_id: &str,
) -> Result<Expense, AppError> {
    let id = Uuid::parse_str(raw_id.trim())
        .map_err(|_| RepositoryError::expense_not_found(raw_id))?;

    match state.expenses.get_expense(id).await? {
        Some(expense) if expense.is_owned_by(user_id) => Ok(expense),
        Some(_) => {
            tracing::warn!(%user_id, expense_id = %id, "Access to another user's expense");
            Err(RepositoryError::expense_not_found(id).into())
        }
        None => Err(RepositoryError::expense_not_found(id).into()),
    }
}

/// POST /api/expenses/
pub async fn create_expense(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    payload: Result<Json<CreateExpenseRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SuccessResponse<Expense>>), AppError> {
    let Json(request) = payload?;
    let expense = request.into_expense(user.user_id.clone())?;

    state.expenses.create_expense(&expense).await?;

    tracing::info!(
        user_id = %user.user_id,
        expense_id = %expense.id,
        amount = expense.amount,
        category = %expense.category,
        "Expense added"
    );

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::with_data("Expense created", expense)),
    ))
}

/// GET /api/expenses/list/
pub async fn list_expenses(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<SuccessResponse<ExpenseList>>, AppError> {
    let expenses = state.expenses.list_expenses_by_user(&user.user_id).await?;

    tracing::debug!(user_id = %user.user_id, count = expenses.len(), "Retrieved expenses");

    let count = expenses.len();
    Ok(Json(SuccessResponse::with_data(
        "Expenses retrieved",
        ExpenseList { expenses, count },
    )))
}

/// GET /api/expenses/{id}/
pub async fn get_expense(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse<Expense>>, AppError> {
    let expense = load_owned_expense(&state, &user.user_id, &id).await?;
    Ok(Json(SuccessResponse::with_data("Expense retrieved", expense)))
}

/// PUT /api/expenses/{id}/
pub async fn update_expense(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateExpenseRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse<Expense>>, AppError> {
    let Json(update) = payload?;
    if update.is_empty() {
        return Err(HttpError::bad_request("No fields to update").into());
    }

    let mut expense = load_owned_expense(&state, &user.user_id, &id).await?;
    update.apply_to(&mut expense)?;
    state.expenses.update_expense(&expense).await?;

    tracing::info!(user_id = %user.user_id, expense_id = %expense.id, "Expense updated");

    Ok(Json(SuccessResponse::with_data("Expense updated", expense)))
}

/// DELETE /api/expenses/{id}/
pub async fn delete_expense(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse<()>>, AppError> {
    let expense = load_owned_expense(&state, &user.user_id, &id).await?;
    state.expenses.delete_expense(expense.id).await?;

    tracing::info!(user_id = %user.user_id, expense_id = %expense.id, "Expense deleted");

    Ok(Json(SuccessResponse::message("Expense deleted")))
}
