//! In-memory expense storage for tests and throwaway demos.

mod repository;

pub use repository::InMemoryRepository;
