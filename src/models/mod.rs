//! Data models for the Shelfmark catalog

pub mod book;
pub mod book_instance;

// Re-export commonly used types
pub use book::BookSummary;
pub use book_instance::{BookInstance, CopyCandidate, CopyStatus};
