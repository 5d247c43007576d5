//! Catalog service: store orchestration for the copy controllers

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{BookInstance, BookSummary, CopyCandidate, CopyStatus},
    repository::{BookInstanceStore, BookStore, CopyWrite},
    services::Clock,
};

#[derive(Clone)]
pub struct CatalogService {
    instances: Arc<dyn BookInstanceStore>,
    books: Arc<dyn BookStore>,
    clock: Arc<dyn Clock>,
}

impl CatalogService {
    pub fn new(
        instances: Arc<dyn BookInstanceStore>,
        books: Arc<dyn BookStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            instances,
            books,
            clock,
        }
    }

    /// All copies, populated, in the store's natural order
    pub async fn list_copies(&self) -> AppResult<Vec<BookInstance>> {
        self.instances.find_all().await
    }

    /// One populated copy; absence is a NotFound, not a query failure
    pub async fn copy_detail(&self, id: i32) -> AppResult<BookInstance> {
        self.instances
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Book copy not found".to_string()))
    }

    /// Books for the form's selection control
    pub async fn book_choices(&self) -> AppResult<Vec<BookSummary>> {
        self.books.find_all_summaries().await
    }

    /// Persist a validated candidate as a new copy
    pub async fn create_copy(&self, candidate: &CopyCandidate) -> AppResult<BookInstance> {
        let write = self.write_from(candidate);
        self.instances.insert(&write).await
    }

    /// Book list and existing copy for the update form, fetched together
    pub async fn copy_for_update(&self, id: i32) -> AppResult<(Vec<BookSummary>, BookInstance)> {
        let (books, copy) = tokio::try_join!(
            self.books.find_all_summaries(),
            self.instances.find_by_id(id),
        )?;

        let copy = copy.ok_or_else(|| AppError::NotFound("Book instance not found".to_string()))?;
        Ok((books, copy))
    }

    /// Replace an existing copy's mutable fields, keeping its identity
    ///
    /// An id with no record behind it (for instance after a racing delete)
    /// fails distinguishably instead of minting a new record.
    pub async fn update_copy(&self, id: i32, candidate: &CopyCandidate) -> AppResult<BookInstance> {
        let write = self.write_from(candidate);
        self.instances
            .replace_by_id(id, &write)
            .await?
            .ok_or_else(|| AppError::NotFound("Book instance not found".to_string()))
    }

    /// Populated copy for the delete confirmation page, None when gone
    pub async fn copy_for_delete(&self, id: i32) -> AppResult<Option<BookInstance>> {
        self.instances.find_by_id(id).await
    }

    /// Delete a copy; false when it was already gone
    pub async fn delete_copy(&self, id: i32) -> AppResult<bool> {
        self.instances.delete_by_id(id).await
    }

    /// Fill in the creation-time defaults the form may leave unspecified
    fn write_from(&self, candidate: &CopyCandidate) -> CopyWrite {
        let status = if candidate.status.is_empty() {
            CopyStatus::default().to_string()
        } else {
            candidate.status.clone()
        };

        CopyWrite {
            book: candidate.book.clone(),
            imprint: candidate.imprint.clone(),
            status,
            due_back: candidate.due_back.unwrap_or_else(|| self.clock.now()),
        }
    }
}
