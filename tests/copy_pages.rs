//! End-to-end tests for the copy pages, driven through the router with an
//! in-memory store and a pinned clock.

use std::collections::BTreeMap;
use std::sync::{
    atomic::{AtomicI32, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{DateTime, TimeZone, Utc};
use tower::ServiceExt;

use shelfmark_server::{
    config::AppConfig,
    error::{AppError, AppResult},
    models::{BookInstance, BookSummary, CopyStatus},
    repository::{BookInstanceStore, BookStore, CopyWrite},
    services::{Clock, Services},
    views::LiquidRenderer,
    web, AppState,
};

fn frozen_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap()
}

struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        frozen_now()
    }
}

/// In-memory stand-in for the Postgres store. Writes go through the same
/// checks the schema enforces: the reference must be an id and the status
/// must sit inside the enumeration.
struct MemoryStore {
    books: Vec<BookSummary>,
    rows: Mutex<BTreeMap<i32, BookInstance>>,
    next_id: AtomicI32,
}

impl MemoryStore {
    fn new(books: Vec<BookSummary>) -> Self {
        Self {
            books,
            rows: Mutex::new(BTreeMap::new()),
            next_id: AtomicI32::new(1),
        }
    }

    fn seed(&self, copy: BookInstance) {
        let next = copy.id + 1;
        self.rows.lock().unwrap().insert(copy.id, copy);
        self.next_id.fetch_max(next, Ordering::SeqCst);
    }

    fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn get(&self, id: i32) -> Option<BookInstance> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    fn title_of(&self, book_id: i32) -> Option<String> {
        self.books
            .iter()
            .find(|b| b.id == book_id)
            .map(|b| b.title.clone())
    }

    fn checked(&self, id: i32, write: &CopyWrite) -> AppResult<BookInstance> {
        let book_id: i32 = write
            .book
            .parse()
            .map_err(|_| AppError::BadValue(format!("'{}' is not a book id", write.book)))?;
        let status: CopyStatus = write
            .status
            .parse()
            .map_err(AppError::BadValue)?;

        Ok(BookInstance {
            id,
            book_id,
            imprint: write.imprint.clone(),
            status,
            due_back: write.due_back,
            book_title: None,
        })
    }
}

#[async_trait]
impl BookInstanceStore for MemoryStore {
    async fn find_all(&self) -> AppResult<Vec<BookInstance>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .values()
            .map(|c| BookInstance {
                book_title: self.title_of(c.book_id),
                ..c.clone()
            })
            .collect())
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<BookInstance>> {
        Ok(self.get(id).map(|c| BookInstance {
            book_title: self.title_of(c.book_id),
            ..c
        }))
    }

    async fn insert(&self, write: &CopyWrite) -> AppResult<BookInstance> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let copy = self.checked(id, write)?;
        self.rows.lock().unwrap().insert(id, copy.clone());
        Ok(copy)
    }

    async fn replace_by_id(&self, id: i32, write: &CopyWrite) -> AppResult<Option<BookInstance>> {
        let copy = self.checked(id, write)?;
        let mut rows = self.rows.lock().unwrap();
        if !rows.contains_key(&id) {
            return Ok(None);
        }
        rows.insert(id, copy.clone());
        Ok(Some(copy))
    }

    async fn delete_by_id(&self, id: i32) -> AppResult<bool> {
        Ok(self.rows.lock().unwrap().remove(&id).is_some())
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn find_all_summaries(&self) -> AppResult<Vec<BookSummary>> {
        Ok(self.books.clone())
    }
}

fn harness() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new(vec![
        BookSummary {
            id: 2,
            title: "A Wizard of Earthsea".to_string(),
        },
        BookSummary {
            id: 7,
            title: "The Left Hand of Darkness".to_string(),
        },
    ]));

    let services = Services::with_stores(store.clone(), store.clone(), Arc::new(FixedClock));
    let state = AppState {
        config: Arc::new(AppConfig::default()),
        services: Arc::new(services),
        renderer: Arc::new(LiquidRenderer::load("templates").expect("templates parse")),
    };

    (web::router(state), store)
}

fn seeded_copy(id: i32) -> BookInstance {
    BookInstance {
        id,
        book_id: 7,
        imprint: "Ace Books, 1969".to_string(),
        status: CopyStatus::Loaned,
        due_back: Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap(),
        book_title: None,
    }
}

async fn get(app: &Router, uri: &str) -> axum::http::Response<Body> {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_form(app: &Router, uri: &str, body: &str) -> axum::http::Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn body_text(response: axum::http::Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &axum::http::Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect carries a Location header")
        .to_str()
        .unwrap()
}

#[tokio::test]
async fn index_redirects_to_the_copy_list() {
    let (app, _) = harness();
    let response = get(&app, "/").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/catalog/bookinstances");
}

#[tokio::test]
async fn list_renders_every_copy_with_its_book_title() {
    let (app, store) = harness();
    store.seed(seeded_copy(1));

    let response = get(&app, "/catalog/bookinstances").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Book Instance List"));
    assert!(html.contains("The Left Hand of Darkness"));
    assert!(html.contains("Ace Books, 1969"));
    assert!(html.contains("Loaned"));
}

#[tokio::test]
async fn empty_list_renders_the_placeholder() {
    let (app, _) = harness();
    let html = body_text(get(&app, "/catalog/bookinstances").await).await;
    assert!(html.contains("There are no book copies in this library."));
}

#[tokio::test]
async fn detail_renders_the_populated_copy() {
    let (app, store) = harness();
    store.seed(seeded_copy(3));

    let response = get(&app, "/catalog/bookinstance/3").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Copy: The Left Hand of Darkness"));
    assert!(html.contains("Jan 10, 2024"));
}

#[tokio::test]
async fn detail_of_a_missing_copy_is_a_404() {
    let (app, _) = harness();
    let response = get(&app, "/catalog/bookinstance/99").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_form_offers_every_book() {
    let (app, _) = harness();
    let response = get(&app, "/catalog/bookinstance/create").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Create BookInstance"));
    assert!(html.contains("A Wizard of Earthsea"));
    assert!(html.contains("The Left Hand of Darkness"));
    assert!(html.contains("Maintenance"));
}

#[tokio::test]
async fn valid_create_persists_one_record_and_redirects_to_it() {
    let (app, store) = harness();

    let response = post_form(
        &app,
        "/catalog/bookinstance/create",
        "book=%20%207%20%20&imprint=First%20Ed.&status=Available&due_back=",
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/catalog/bookinstance/1");

    assert_eq!(store.count(), 1);
    let stored = store.get(1).unwrap();
    assert_eq!(stored.book_id, 7);
    assert_eq!(stored.imprint, "First Ed.");
    assert_eq!(stored.status, CopyStatus::Available);
    // Empty due_back defaults to the creation time
    assert_eq!(stored.due_back, frozen_now());
}

#[tokio::test]
async fn create_without_status_defaults_to_maintenance() {
    let (app, store) = harness();

    let response = post_form(
        &app,
        "/catalog/bookinstance/create",
        "book=2&imprint=X&status=&due_back=2024-01-01",
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let stored = store.get(1).unwrap();
    assert_eq!(stored.status, CopyStatus::Maintenance);
    assert_eq!(
        stored.due_back,
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    );
}

#[tokio::test]
async fn create_with_an_empty_book_persists_nothing_and_rerenders() {
    let (app, store) = harness();

    let response = post_form(
        &app,
        "/catalog/bookinstance/create",
        "book=&imprint=X&status=Loaned&due_back=2024-01-01",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.count(), 0);

    let html = body_text(response).await;
    assert!(html.contains("Book must be specified"));
    // Submitted values survive the re-render
    assert!(html.contains("value=\"X\""));
    assert!(html.contains("value=\"2024-01-01\""));
}

#[tokio::test]
async fn create_with_a_bad_date_persists_nothing_and_rerenders() {
    let (app, store) = harness();

    let response = post_form(
        &app,
        "/catalog/bookinstance/create",
        "book=7&imprint=X&status=Loaned&due_back=not-a-date",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.count(), 0);
    assert!(body_text(response).await.contains("Invalid date"));
}

#[tokio::test]
async fn create_collects_every_error_at_once() {
    let (app, store) = harness();

    let response = post_form(
        &app,
        "/catalog/bookinstance/create",
        "book=&imprint=&status=&due_back=nope",
    )
    .await;

    assert_eq!(store.count(), 0);
    let html = body_text(response).await;
    assert!(html.contains("Book must be specified"));
    assert!(html.contains("Imprint must be specified"));
    assert!(html.contains("Invalid date"));
}

#[tokio::test]
async fn update_form_is_prefilled_from_the_stored_copy() {
    let (app, store) = harness();
    store.seed(seeded_copy(5));

    let response = get(&app, "/catalog/bookinstance/5/update").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Update Book Instance"));
    assert!(html.contains("value=\"Ace Books, 1969\""));
    assert!(html.contains("value=\"2024-01-10\""));
    assert!(html.contains("value=\"7\" selected"));
}

#[tokio::test]
async fn update_form_for_a_missing_copy_is_a_404() {
    let (app, _) = harness();
    let response = get(&app, "/catalog/bookinstance/99/update").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn valid_update_replaces_the_fields_and_keeps_the_id() {
    let (app, store) = harness();
    store.seed(seeded_copy(42));

    let response = post_form(
        &app,
        "/catalog/bookinstance/42/update",
        "book=2&imprint=Rev.&status=Reserved&due_back=2025-06-01",
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/catalog/bookinstance/42");

    assert_eq!(store.count(), 1);
    let stored = store.get(42).unwrap();
    assert_eq!(stored.id, 42);
    assert_eq!(stored.book_id, 2);
    assert_eq!(stored.imprint, "Rev.");
    assert_eq!(stored.status, CopyStatus::Reserved);
    assert_eq!(
        stored.due_back,
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    );
}

#[tokio::test]
async fn update_of_a_missing_id_fails_without_creating_anything() {
    let (app, store) = harness();

    let response = post_form(
        &app,
        "/catalog/bookinstance/99/update",
        "book=2&imprint=Rev.&status=Reserved&due_back=2025-06-01",
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(store.count(), 0);
}

#[tokio::test]
async fn invalid_update_rerenders_with_a_fresh_book_list() {
    let (app, store) = harness();
    store.seed(seeded_copy(5));

    let response = post_form(
        &app,
        "/catalog/bookinstance/5/update",
        "book=2&imprint=&status=Reserved&due_back=",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Imprint must be specified"));
    // The failure branch re-fetches the selection list
    assert!(html.contains("A Wizard of Earthsea"));
    assert!(html.contains("value=\"2\" selected"));

    // And nothing changed in the store
    assert_eq!(store.get(5).unwrap().imprint, "Ace Books, 1969");
}

#[tokio::test]
async fn delete_confirmation_renders_without_mutating_the_store() {
    let (app, store) = harness();
    store.seed(seeded_copy(8));

    let response = get(&app, "/catalog/bookinstance/8/delete").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.count(), 1);

    let html = body_text(response).await;
    assert!(html.contains("Delete Book Instance"));
    assert!(html.contains("name=\"bookinstanceid\" value=\"8\""));
}

#[tokio::test]
async fn delete_confirmation_for_a_missing_copy_redirects_to_the_list() {
    let (app, store) = harness();

    let response = get(&app, "/catalog/bookinstance/99/delete").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/catalog/bookinstances");
    assert_eq!(store.count(), 0);
}

#[tokio::test]
async fn delete_post_removes_the_copy_and_redirects() {
    let (app, store) = harness();
    store.seed(seeded_copy(8));

    let response = post_form(&app, "/catalog/bookinstance/delete", "bookinstanceid=8").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/catalog/bookinstances");
    assert_eq!(store.count(), 0);
}

#[tokio::test]
async fn delete_post_of_a_missing_copy_still_redirects() {
    let (app, _) = harness();

    let response = post_form(&app, "/catalog/bookinstance/delete", "bookinstanceid=99").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/catalog/bookinstances");
}

#[tokio::test]
async fn out_of_enumeration_status_fails_at_the_store_not_as_validation() {
    let (app, store) = harness();

    let response = post_form(
        &app,
        "/catalog/bookinstance/create",
        "book=7&imprint=X&status=Lost&due_back=",
    )
    .await;

    // The pipeline lets the status through; the store's enumeration check
    // rejects the write as a generic failure.
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(store.count(), 0);
}
