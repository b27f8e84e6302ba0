//! Read-only preview rendering at an arbitrary scale.
//!
//! The preview draws a page exactly like the editor canvas minus the editing
//! chrome (no grid, rulers or handles) and with bindings resolved against a
//! data map, so the same layout can be shown with sample or real member data.

#[cfg(test)]
#[path = "preview_test.rs"]
mod preview_test;

use crate::binding::DataMap;
use crate::doc::{CardPage, CardSize, LayoutDefinition};
use crate::render::{self, Scene, TextMode, Transform};

/// Render one page scaled uniformly from 1:1 layout coordinates.
///
/// Non-positive or non-finite scales fall back to 1:1.
#[must_use]
pub fn render(page: &CardPage, card_size: &CardSize, data: &DataMap, scale: f64) -> Scene {
    let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
    Scene {
        width: card_size.width * scale,
        height: card_size.height * scale,
        ops: render::page_ops(page, card_size, Transform::scale(scale), TextMode::Resolved(data)),
    }
}

/// Render every page of a layout in display order.
#[must_use]
pub fn render_all(layout: &LayoutDefinition, data: &DataMap, scale: f64) -> Vec<(String, Scene)> {
    layout
        .pages
        .iter()
        .map(|page| (page.name.clone(), render(page, &layout.card_size, data, scale)))
        .collect()
}
