pub mod error;
pub mod expenses;
pub mod health;
pub mod receipts;

pub use error::AppError;
