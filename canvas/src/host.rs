//! Browser glue: 2D context lookup and the print window sink.
//!
//! Everything here talks to `web_sys` directly and is only meaningful inside
//! a browser; the rest of the crate stays testable on native targets.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, BlobPropertyBag, CanvasRenderingContext2d, HtmlCanvasElement, Url};

use crate::doc::LayoutError;
use crate::media::MediaError;

/// Errors surfaced to the host page.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// `window.open` returned nothing; the user must allow popups.
    #[error("the print window was blocked; allow popups for this site and try again")]
    PopupBlocked,
    /// No browser window is available (e.g. running in a worker).
    #[error("no browser window available")]
    NoWindow,
    /// An upload was attempted without an IMAGE element selected.
    #[error("select an image element before uploading")]
    NoImageSelected,
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Media(#[from] MediaError),
    #[error("browser call failed: {0}")]
    Js(String),
}

impl From<JsValue> for HostError {
    fn from(value: JsValue) -> Self {
        Self::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

/// Fetch the 2D rendering context of a canvas element.
///
/// # Errors
///
/// Returns `Err` if the browser refuses to create a 2D context.
pub fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    let Some(ctx) = canvas.get_context("2d")? else {
        return Err(JsValue::from_str("2d context unavailable"));
    };
    ctx.dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| JsValue::from_str("context is not a CanvasRenderingContext2d"))
}

/// Open a standalone HTML document in a new browser window.
///
/// # Errors
///
/// Returns [`HostError::PopupBlocked`] when the browser blocks the window.
pub fn open_print_window(html: &str) -> Result<(), HostError> {
    let window = web_sys::window().ok_or(HostError::NoWindow)?;

    let parts = js_sys::Array::of1(&JsValue::from_str(html));
    let bag = BlobPropertyBag::new();
    bag.set_type("text/html");
    let blob = Blob::new_with_str_sequence_and_options(&parts, &bag)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    match window.open_with_url_and_target(&url, "_blank")? {
        Some(_) => Ok(()),
        None => {
            Url::revoke_object_url(&url)?;
            Err(HostError::PopupBlocked)
        }
    }
}
