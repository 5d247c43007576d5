//! Repository layer for database operations
//!
//! The store is specified as a pair of traits so the controllers can be
//! exercised against mocks; the Postgres implementations live alongside.

pub mod book_instances;
pub mod books;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{BookInstance, BookSummary},
};

/// Field set written by the form paths
///
/// The book reference and the status stay as submitted text: a malformed
/// reference or an out-of-enumeration status must fail at the store, not
/// earlier (the validation pipeline deliberately does not check them).
#[derive(Debug, Clone, PartialEq)]
pub struct CopyWrite {
    pub book: String,
    pub imprint: String,
    pub status: String,
    pub due_back: DateTime<Utc>,
}

/// Store operations on copy records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookInstanceStore: Send + Sync {
    /// All copies in natural order, book reference resolved to its title
    async fn find_all(&self) -> AppResult<Vec<BookInstance>>;

    /// One populated copy, or None when absent
    async fn find_by_id(&self, id: i32) -> AppResult<Option<BookInstance>>;

    /// Persist a new copy; the store assigns the id
    async fn insert(&self, write: &CopyWrite) -> AppResult<BookInstance>;

    /// Full-field replace of an existing copy, keeping its identity;
    /// None when no record carries the id
    async fn replace_by_id(&self, id: i32, write: &CopyWrite) -> AppResult<Option<BookInstance>>;

    /// Delete a copy; false when no record carried the id
    async fn delete_by_id(&self, id: i32) -> AppResult<bool>;
}

/// Store operations on the book collaborator
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    /// id + title projection of every book, for the form's selection control
    async fn find_all_summaries(&self) -> AppResult<Vec<BookSummary>>;
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub book_instances: book_instances::BookInstancesRepository,
    pub books: books::BooksRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            book_instances: book_instances::BookInstancesRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            pool,
        }
    }
}
