//! HTML page handlers (the copy controllers) and the application router

pub mod copies;
pub mod copy_delete;
pub mod copy_form;

use axum::{
    http::{header, HeaderValue},
    response::Redirect,
    routing::get,
    Router,
};
use serde_json::json;
use tower_http::{
    compression::CompressionLayer, services::ServeDir, set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::{models::BookInstance, AppState};

/// Path of the copy list, the destination of every "go back" redirect
pub const COPY_LIST_PATH: &str = "/catalog/bookinstances";

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    let static_dir = state.config.templates.static_dir.clone();

    let catalog = Router::new()
        .route("/", get(index))
        .route("/bookinstances", get(copies::copy_list))
        .route(
            "/bookinstance/create",
            get(copy_form::copy_create_get).post(copy_form::copy_create_post),
        )
        .route(
            "/bookinstance/delete",
            axum::routing::post(copy_delete::copy_delete_post),
        )
        .route("/bookinstance/:id", get(copies::copy_detail))
        .route(
            "/bookinstance/:id/update",
            get(copy_form::copy_update_get).post(copy_form::copy_update_post),
        )
        .route("/bookinstance/:id/delete", get(copy_delete::copy_delete_get))
        .with_state(state);

    Router::new()
        .route("/", get(index))
        .nest("/catalog", catalog)
        .nest_service("/public", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
}

/// The site has one section, so the index goes straight to the copy list
async fn index() -> Redirect {
    Redirect::to(COPY_LIST_PATH)
}

/// Plain key/value view of a copy with its derived display values, computed
/// at render time
pub(crate) fn copy_context(copy: &BookInstance) -> serde_json::Value {
    json!({
        "id": copy.id,
        "url": copy.url(),
        "book_id": copy.book_id,
        "book_title": copy.book_title,
        "imprint": copy.imprint,
        "status": copy.status.to_string(),
        "due_back_formatted": copy.due_back_formatted(),
        "due_back_iso": copy.due_back_iso(),
    })
}
