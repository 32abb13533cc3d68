mod error;
mod operations;
mod requests;
mod types;

pub use error::ExpenseError;
pub use operations::{
    round_amount, sort_newest_first, validate_amount, validate_category, validate_description,
    validate_expense, MAX_AMOUNT, MAX_CATEGORY_LEN, MAX_DESCRIPTION_LEN,
};
pub use requests::{CreateExpenseRequest, UpdateExpenseRequest};
pub use types::Expense;
