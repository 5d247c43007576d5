//! Copy list and detail pages

use axum::{
    extract::{Path, State},
    response::Html,
};
use serde_json::json;

use crate::{error::AppResult, web::copy_context, AppState};

/// GET /catalog/bookinstances
pub async fn copy_list(State(state): State<AppState>) -> AppResult<Html<String>> {
    let copies = state.services.catalog.list_copies().await?;

    let context = json!({
        "title": "Book Instance List",
        "bookinstance_list": copies.iter().map(copy_context).collect::<Vec<_>>(),
    });

    let body = state.renderer.render("bookinstance_list", &context)?;
    Ok(Html(body))
}

/// GET /catalog/bookinstance/:id
pub async fn copy_detail(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Html<String>> {
    let copy = state.services.catalog.copy_detail(id).await?;

    let title = match &copy.book_title {
        Some(book_title) => format!("Copy: {}", book_title),
        None => "Copy".to_string(),
    };
    let context = json!({
        "title": title,
        "bookinstance": copy_context(&copy),
    });

    let body = state.renderer.render("bookinstance_detail", &context)?;
    Ok(Html(body))
}
