//! Business logic services

pub mod catalog;

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::repository::{BookInstanceStore, BookStore, Repository};

/// Time source for creation-time defaults
///
/// Injected rather than read ambiently so tests can pin "now".
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository) -> Self {
        Self::with_stores(
            Arc::new(repository.book_instances.clone()),
            Arc::new(repository.books.clone()),
            Arc::new(SystemClock),
        )
    }

    /// Wire the services over explicit store and clock implementations
    pub fn with_stores(
        instances: Arc<dyn BookInstanceStore>,
        books: Arc<dyn BookStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            catalog: catalog::CatalogService::new(instances, books, clock),
        }
    }
}
