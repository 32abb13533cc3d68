//! Pure validation and ordering rules for expenses.

use super::{Expense, ExpenseError};

/// Largest amount storable as DECIMAL(10, 2).
pub const MAX_AMOUNT: f64 = 99_999_999.99;
pub const MAX_CATEGORY_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// Rounds to two decimal places, half away from zero.
pub fn round_amount(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Checks that an amount is a finite, positive value within range.
pub fn validate_amount(amount: f64) -> Result<(), ExpenseError> {
    if !amount.is_finite() {
        return Err(ExpenseError::NonFiniteAmount);
    }
    if round_amount(amount) <= 0.0 {
        return Err(ExpenseError::NonPositiveAmount);
    }
    if amount > MAX_AMOUNT {
        return Err(ExpenseError::AmountTooLarge);
    }
    Ok(())
}

pub fn validate_category(category: &str) -> Result<(), ExpenseError> {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        return Err(ExpenseError::EmptyCategory);
    }
    if trimmed.chars().count() > MAX_CATEGORY_LEN {
        return Err(ExpenseError::CategoryTooLong);
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), ExpenseError> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ExpenseError::DescriptionTooLong);
    }
    Ok(())
}

/// Validates every user-editable field of an expense.
pub fn validate_expense(expense: &Expense) -> Result<(), ExpenseError> {
    validate_amount(expense.amount)?;
    validate_category(&expense.category)?;
    validate_description(&expense.description)
}

/// Orders expenses newest first. Ties are broken by id so the order is stable
/// across backends.
pub fn sort_newest_first(expenses: &mut [Expense]) {
    expenses.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.id.cmp(&b.id)));
}
