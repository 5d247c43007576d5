//! Book instances repository for database operations

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{book_instance::CopyStatus, BookInstance},
    repository::{BookInstanceStore, CopyWrite},
};

#[derive(Clone)]
pub struct BookInstancesRepository {
    pool: Pool<Postgres>,
}

impl BookInstancesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// The book reference arrives as form text; a value that is not an id
    /// is a store-level failure, same as a bad cast in a document store.
    fn book_ref(write: &CopyWrite) -> AppResult<i32> {
        write
            .book
            .parse()
            .map_err(|_| AppError::BadValue(format!("'{}' is not a book id", write.book)))
    }

    fn row_to_copy(row: &sqlx::postgres::PgRow) -> AppResult<BookInstance> {
        let status: String = row.get("status");
        Ok(BookInstance {
            id: row.get("id"),
            book_id: row.get("book_id"),
            imprint: row.get("imprint"),
            // The CHECK constraint keeps stored values inside the enumeration
            status: CopyStatus::from_str(&status).map_err(AppError::BadValue)?,
            due_back: row.get("due_back"),
            book_title: row.try_get("book_title").ok(),
        })
    }
}

#[async_trait]
impl BookInstanceStore for BookInstancesRepository {
    async fn find_all(&self) -> AppResult<Vec<BookInstance>> {
        let rows = sqlx::query(
            r#"
            SELECT bi.id, bi.book_id, bi.imprint, bi.status, bi.due_back,
                   b.title AS book_title
            FROM book_instances bi
            LEFT JOIN books b ON b.id = bi.book_id
            ORDER BY bi.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_copy).collect()
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<BookInstance>> {
        let row = sqlx::query(
            r#"
            SELECT bi.id, bi.book_id, bi.imprint, bi.status, bi.due_back,
                   b.title AS book_title
            FROM book_instances bi
            LEFT JOIN books b ON b.id = bi.book_id
            WHERE bi.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_copy).transpose()
    }

    async fn insert(&self, write: &CopyWrite) -> AppResult<BookInstance> {
        let book_id = Self::book_ref(write)?;

        // An out-of-enumeration status trips the CHECK constraint here and
        // surfaces as a database error, never as a validation failure.
        let row = sqlx::query(
            r#"
            INSERT INTO book_instances (book_id, imprint, status, due_back)
            VALUES ($1, $2, $3, $4)
            RETURNING id, book_id, imprint, status, due_back
            "#,
        )
        .bind(book_id)
        .bind(&write.imprint)
        .bind(&write.status)
        .bind(write.due_back)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_copy(&row)
    }

    async fn replace_by_id(&self, id: i32, write: &CopyWrite) -> AppResult<Option<BookInstance>> {
        let book_id = Self::book_ref(write)?;

        let row = sqlx::query(
            r#"
            UPDATE book_instances
            SET book_id = $2, imprint = $3, status = $4, due_back = $5
            WHERE id = $1
            RETURNING id, book_id, imprint, status, due_back
            "#,
        )
        .bind(id)
        .bind(book_id)
        .bind(&write.imprint)
        .bind(&write.status)
        .bind(write.due_back)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_copy).transpose()
    }

    async fn delete_by_id(&self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM book_instances WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
