//! Book instance (physical copy) model and related types

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Loan status of a copy
///
/// The store enforces this enumeration with a CHECK constraint, so a write
/// carrying any other value fails at the database rather than here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CopyStatus {
    Available,
    Maintenance,
    Loaned,
    Reserved,
}

impl CopyStatus {
    /// Every status the form's selection control offers
    pub const ALL: [CopyStatus; 4] = [
        CopyStatus::Available,
        CopyStatus::Maintenance,
        CopyStatus::Loaned,
        CopyStatus::Reserved,
    ];
}

impl Default for CopyStatus {
    fn default() -> Self {
        CopyStatus::Maintenance
    }
}

impl fmt::Display for CopyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CopyStatus::Available => "Available",
            CopyStatus::Maintenance => "Maintenance",
            CopyStatus::Loaned => "Loaned",
            CopyStatus::Reserved => "Reserved",
        };
        write!(f, "{}", label)
    }
}

impl FromStr for CopyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Available" => Ok(CopyStatus::Available),
            "Maintenance" => Ok(CopyStatus::Maintenance),
            "Loaned" => Ok(CopyStatus::Loaned),
            "Reserved" => Ok(CopyStatus::Reserved),
            other => Err(format!("unknown copy status '{}'", other)),
        }
    }
}

/// A stored copy record, optionally populated with its book's title
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookInstance {
    pub id: i32,
    pub book_id: i32,
    pub imprint: String,
    pub status: CopyStatus,
    pub due_back: DateTime<Utc>,
    /// Resolved from the `book_id` reference when fetched populated
    #[serde(default)]
    pub book_title: Option<String>,
}

impl BookInstance {
    /// Canonical detail-page path for a copy id
    pub fn url(&self) -> String {
        copy_url(self.id)
    }

    /// Medium-style date for display, e.g. "Jun 1, 2025"
    pub fn due_back_formatted(&self) -> String {
        format_date_medium(&self.due_back)
    }

    /// ISO-8601 date for pre-filling the edit form's date input
    pub fn due_back_iso(&self) -> String {
        format_date_iso(&self.due_back)
    }
}

/// Canonical detail-page path built from a copy id
pub fn copy_url(id: i32) -> String {
    format!("/catalog/bookinstance/{}", id)
}

/// Medium-style date string ("Jun 1, 2025")
pub fn format_date_medium(date: &DateTime<Utc>) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// ISO-8601 date string ("2025-06-01")
pub fn format_date_iso(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// In-memory candidate built from sanitized form values
///
/// The reference fields stay as submitted text: a malformed book id or an
/// out-of-enumeration status must travel all the way to the store and fail
/// there, not here. `id` is set only on the update path so the store never
/// mints a fresh identity for an existing record.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CopyCandidate {
    pub id: Option<i32>,
    pub book: String,
    pub imprint: String,
    pub status: String,
    pub due_back: Option<DateTime<Utc>>,
}

impl CopyCandidate {
    /// ISO date for re-filling the form's date input, empty when unset
    pub fn due_back_iso(&self) -> String {
        self.due_back.as_ref().map(format_date_iso).unwrap_or_default()
    }
}
