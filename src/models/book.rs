//! Book model (read-only collaborator)
//!
//! The copy form only needs enough of a book to fill its selection control,
//! so this module carries the id + title projection and nothing else.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Book projection used to populate the form's selection control and the
/// populated list/detail pages.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BookSummary {
    pub id: i32,
    pub title: String,
}
