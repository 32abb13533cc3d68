use thiserror::Error;

/// Errors raised while validating expense input.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExpenseError {
    #[error("Amount and category required")]
    MissingRequiredFields,
    #[error("Amount must be a positive number")]
    NonPositiveAmount,
    #[error("Amount is not a finite number")]
    NonFiniteAmount,
    #[error("Amount too large (max 99999999.99)")]
    AmountTooLarge,
    #[error("Category cannot be empty")]
    EmptyCategory,
    #[error("Category too long (max 100 characters)")]
    CategoryTooLong,
    #[error("Description too long (max 1000 characters)")]
    DescriptionTooLong,
}

impl ExpenseError {
    /// Name of the request field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingRequiredFields => "amount",
            Self::NonPositiveAmount | Self::NonFiniteAmount | Self::AmountTooLarge => "amount",
            Self::EmptyCategory | Self::CategoryTooLong => "category",
            Self::DescriptionTooLong => "description",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expense_error_display() {
        assert_eq!(
            ExpenseError::MissingRequiredFields.to_string(),
            "Amount and category required"
        );
        assert_eq!(
            ExpenseError::CategoryTooLong.to_string(),
            "Category too long (max 100 characters)"
        );
    }

    #[test]
    fn test_expense_error_field() {
        assert_eq!(ExpenseError::NonPositiveAmount.field(), "amount");
        assert_eq!(ExpenseError::EmptyCategory.field(), "category");
        assert_eq!(ExpenseError::DescriptionTooLong.field(), "description");
    }
}
