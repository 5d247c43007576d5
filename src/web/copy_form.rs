//! Copy create/update form workflow
//!
//! Two entry points per HTTP verb. GET renders the form (blank or
//! pre-filled); POST runs the validation pipeline and either re-renders the
//! form with the sanitized candidate and the collected errors, or persists
//! and redirects to the record's detail page. The failure branch always
//! re-fetches the book list so it never renders stale context.

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    models::{BookInstance, BookSummary, CopyCandidate, CopyStatus},
    validation::{self, FieldBag, FieldError, COPY_FORM_RULES},
    AppState,
};

/// Raw URL-encoded form fields; missing fields count as empty
#[derive(Debug, Deserialize)]
pub struct CopyForm {
    #[serde(default)]
    pub book: String,
    #[serde(default)]
    pub imprint: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub due_back: String,
}

impl CopyForm {
    fn into_bag(self) -> FieldBag {
        IndexMap::from([
            ("book", self.book),
            ("imprint", self.imprint),
            ("status", self.status),
            ("due_back", self.due_back),
        ])
    }
}

/// Build the in-memory candidate from the sanitized bag, whatever the
/// validation outcome
fn candidate_from(fields: &FieldBag, id: Option<i32>) -> CopyCandidate {
    CopyCandidate {
        id,
        book: fields.get("book").cloned().unwrap_or_default(),
        imprint: fields.get("imprint").cloned().unwrap_or_default(),
        status: fields.get("status").cloned().unwrap_or_default(),
        due_back: fields
            .get("due_back")
            .and_then(|v| validation::parse_iso_date(v)),
    }
}

fn form_context(
    title: &str,
    books: &[BookSummary],
    selected_book: Option<i32>,
    instance: Value,
    errors: &[FieldError],
) -> Value {
    json!({
        "title": title,
        "book_list": books,
        "selected_book": selected_book,
        "bookinstance": instance,
        "status_options": CopyStatus::ALL.map(|s| s.to_string()),
        "errors": errors.iter().map(|e| e.message).collect::<Vec<_>>(),
    })
}

fn candidate_fields(candidate: &CopyCandidate) -> Value {
    json!({
        "imprint": candidate.imprint,
        "status": candidate.status,
        "due_back_iso": candidate.due_back_iso(),
    })
}

fn stored_fields(copy: &BookInstance) -> Value {
    json!({
        "imprint": copy.imprint,
        "status": copy.status.to_string(),
        "due_back_iso": copy.due_back_iso(),
    })
}

/// GET /catalog/bookinstance/create
pub async fn copy_create_get(State(state): State<AppState>) -> AppResult<Html<String>> {
    let books = state.services.catalog.book_choices().await?;

    let context = form_context(
        "Create BookInstance",
        &books,
        None,
        candidate_fields(&CopyCandidate::default()),
        &[],
    );

    let body = state.renderer.render("bookinstance_form", &context)?;
    Ok(Html(body))
}

/// POST /catalog/bookinstance/create
pub async fn copy_create_post(
    State(state): State<AppState>,
    Form(form): Form<CopyForm>,
) -> AppResult<Response> {
    let mut fields = form.into_bag();
    let errors = validation::run(COPY_FORM_RULES, &mut fields);
    let candidate = candidate_from(&fields, None);

    if !errors.is_empty() {
        let books = state.services.catalog.book_choices().await?;
        let context = form_context(
            "Create BookInstance",
            &books,
            candidate.book.parse().ok(),
            candidate_fields(&candidate),
            &errors,
        );
        let body = state.renderer.render("bookinstance_form", &context)?;
        return Ok(Html(body).into_response());
    }

    let created = state.services.catalog.create_copy(&candidate).await?;
    Ok(Redirect::to(&created.url()).into_response())
}

/// GET /catalog/bookinstance/:id/update
pub async fn copy_update_get(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Html<String>> {
    let (books, copy) = state.services.catalog.copy_for_update(id).await?;

    let context = form_context(
        "Update Book Instance",
        &books,
        Some(copy.book_id),
        stored_fields(&copy),
        &[],
    );

    let body = state.renderer.render("bookinstance_form", &context)?;
    Ok(Html(body))
}

/// POST /catalog/bookinstance/:id/update
pub async fn copy_update_post(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(form): Form<CopyForm>,
) -> AppResult<Response> {
    let mut fields = form.into_bag();
    let errors = validation::run(COPY_FORM_RULES, &mut fields);
    // Carrying the original id keeps the store from minting a new identity
    let candidate = candidate_from(&fields, Some(id));

    if !errors.is_empty() {
        let books = state.services.catalog.book_choices().await?;
        let context = form_context(
            "Update Book Instance",
            &books,
            candidate.book.parse().ok(),
            candidate_fields(&candidate),
            &errors,
        );
        let body = state.renderer.render("bookinstance_form", &context)?;
        return Ok(Html(body).into_response());
    }

    let updated = state.services.catalog.update_copy(id, &candidate).await?;
    Ok(Redirect::to(&updated.url()).into_response())
}
