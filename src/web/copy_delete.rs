//! Copy delete flow: confirmation page, then execution

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::AppResult,
    web::{copy_context, COPY_LIST_PATH},
    AppState,
};

/// Delete POST body; the confirmation page passes the target id explicitly
#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    #[serde(default)]
    pub bookinstanceid: String,
}

/// GET /catalog/bookinstance/:id/delete
///
/// Deleting an already-gone copy is a benign no-op, so an absent id goes
/// back to the list instead of a 404. Never mutates the store.
pub async fn copy_delete_get(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Response> {
    let copy = match state.services.catalog.copy_for_delete(id).await? {
        Some(copy) => copy,
        None => return Ok(Redirect::to(COPY_LIST_PATH).into_response()),
    };

    let context = json!({
        "title": "Delete Book Instance",
        "bookinstance": copy_context(&copy),
    });

    let body = state.renderer.render("bookinstance_delete", &context)?;
    Ok(Html(body).into_response())
}

/// POST /catalog/bookinstance/delete
///
/// Redirects to the list whether or not the target still existed.
pub async fn copy_delete_post(
    State(state): State<AppState>,
    Form(form): Form<DeleteForm>,
) -> AppResult<Redirect> {
    if let Ok(id) = form.bookinstanceid.parse::<i32>() {
        state.services.catalog.delete_copy(id).await?;
    }

    Ok(Redirect::to(COPY_LIST_PATH))
}
