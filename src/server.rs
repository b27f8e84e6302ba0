//! Local preview server.
//!
//! Serves one layout read-only: its JSON, the print document for all pages,
//! and a PNG rendering per page. Intended for checking a template in a real
//! browser or print dialog without the admin app.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::get;
use canvas::binding::DataMap;
use canvas::doc::LayoutDefinition;
use canvas::preview;
use canvas::print::{self, PrintOptions};
use canvas::raster::{self, RasterError};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

/// Largest scale accepted for PNG previews.
pub const MAX_PREVIEW_SCALE: f64 = 8.0;

#[derive(Clone)]
pub struct PreviewState {
    pub layout: Arc<LayoutDefinition>,
    pub data: Arc<DataMap>,
    pub title: String,
}

impl PreviewState {
    #[must_use]
    pub fn new(layout: LayoutDefinition, data: DataMap, title: &str) -> Self {
        Self { layout: Arc::new(layout), data: Arc::new(data), title: title.to_owned() }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PngQuery {
    pub scale: Option<f64>,
}

pub fn app(state: PreviewState) -> Router {
    Router::new()
        .route("/layout", get(layout))
        .route("/preview", get(preview_html))
        .route("/preview/{page}/png", get(preview_png))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `GET /layout`: the layout document as JSON.
pub async fn layout(State(state): State<PreviewState>) -> Json<LayoutDefinition> {
    Json((*state.layout).clone())
}

/// `GET /preview`: print document for every page, without the auto-print hook.
pub async fn preview_html(State(state): State<PreviewState>) -> Html<String> {
    let options = PrintOptions { title: state.title.clone(), auto_print: false };
    Html(print::document(&state.layout, &state.data, &options))
}

/// `GET /preview/{page}/png`: one page rasterized. `page` is a page name or
/// a zero-based index.
pub async fn preview_png(
    State(state): State<PreviewState>,
    Path(page): Path<String>,
    Query(query): Query<PngQuery>,
) -> Result<Response, StatusCode> {
    let Some(page) = resolve_page(&state.layout, &page).and_then(|i| state.layout.pages.get(i)) else {
        return Err(StatusCode::NOT_FOUND);
    };
    let scale = query.scale.unwrap_or(1.0);
    if !(scale.is_finite() && scale > 0.0 && scale <= MAX_PREVIEW_SCALE) {
        return Err(StatusCode::BAD_REQUEST);
    }

    let scene = preview::render(page, &state.layout.card_size, &state.data, scale);
    match raster::export_png(&scene) {
        Ok(bytes) => Ok(([(CONTENT_TYPE, "image/png")], bytes).into_response()),
        Err(e) => {
            tracing::warn!(page = %page.name, scale, error = %e, "preview rasterization failed");
            Err(raster_error_to_status(&e))
        }
    }
}

pub async fn healthz() -> &'static str {
    "ok"
}

/// Find a page by name, falling back to a numeric index.
#[must_use]
pub fn resolve_page(layout: &LayoutDefinition, key: &str) -> Option<usize> {
    layout
        .page_index(key)
        .or_else(|| key.parse::<usize>().ok().filter(|i| *i < layout.pages.len()))
}

fn raster_error_to_status(error: &RasterError) -> StatusCode {
    match error {
        RasterError::EmptyScene { .. } | RasterError::TooLarge { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        RasterError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
#[path = "server_test.rs"]
mod tests;
