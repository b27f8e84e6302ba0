//! Painting: replays a `Scene` onto a browser 2D context.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! It receives a finished display list and produces pixels; it never looks at
//! the document or mutates any application state.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.
//! The top-level caller ([`crate::engine::Engine::render`]) handles the result.

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use crate::camera::Rect;
use crate::doc::{ObjectFit, TextAlign};
use crate::render::{DrawOp, Scene, Stroke};

/// Dash pattern for dashed outlines, in pixels.
const DASH_PX: f64 = 4.0;

/// Draw the full scene.
///
/// `viewport_w` and `viewport_h` are in CSS pixels. `dpr` is the device pixel ratio.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context state).
pub fn paint(
    ctx: &CanvasRenderingContext2d,
    scene: &Scene,
    viewport_w: f64,
    viewport_h: f64,
    dpr: f64,
) -> Result<(), JsValue> {
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, viewport_w, viewport_h);
    for op in &scene.ops {
        paint_op(ctx, op)?;
    }
    Ok(())
}

fn paint_op(ctx: &CanvasRenderingContext2d, op: &DrawOp) -> Result<(), JsValue> {
    match op {
        DrawOp::FillRect { rect, color } => {
            ctx.set_fill_style_str(color);
            ctx.fill_rect(rect.x, rect.y, rect.width, rect.height);
        }
        DrawOp::StrokeRect { rect, stroke, dashed } => {
            ctx.save();
            apply_stroke(ctx, stroke);
            if *dashed {
                ctx.set_line_dash(&dash_array())?;
            }
            ctx.stroke_rect(rect.x, rect.y, rect.width, rect.height);
            ctx.restore();
        }
        DrawOp::RoundRect { rect, radius, fill, stroke } => {
            round_rect_path(ctx, rect, *radius);
            fill_and_stroke(ctx, fill.as_deref(), stroke.as_ref());
        }
        DrawOp::Ellipse { rect, fill, stroke } => {
            ctx.begin_path();
            ctx.ellipse(
                rect.x + rect.width * 0.5,
                rect.y + rect.height * 0.5,
                (rect.width * 0.5).max(0.0),
                (rect.height * 0.5).max(0.0),
                0.0,
                0.0,
                2.0 * PI,
            )?;
            fill_and_stroke(ctx, fill.as_deref(), stroke.as_ref());
        }
        DrawOp::Line { from, to, stroke } => {
            apply_stroke(ctx, stroke);
            ctx.begin_path();
            ctx.move_to(from.x, from.y);
            ctx.line_to(to.x, to.y);
            ctx.stroke();
        }
        DrawOp::Text { rect, text, font, color, align } => {
            ctx.save();
            ctx.set_font(&font.css());
            ctx.set_fill_style_str(color);
            ctx.set_text_baseline("middle");
            let (x, css_align) = match align {
                TextAlign::Left => (rect.x, "left"),
                TextAlign::Center => (rect.x + rect.width * 0.5, "center"),
                TextAlign::Right => (rect.right(), "right"),
            };
            ctx.set_text_align(css_align);
            ctx.fill_text(text, x, rect.y + rect.height * 0.5)?;
            ctx.restore();
        }
        DrawOp::Image { rect, source, fit } => paint_image(ctx, rect, source, *fit)?,
    }
    Ok(())
}

fn dash_array() -> JsValue {
    let arr = js_sys::Array::new();
    arr.push(&JsValue::from_f64(DASH_PX));
    arr.push(&JsValue::from_f64(DASH_PX));
    arr.into()
}

fn apply_stroke(ctx: &CanvasRenderingContext2d, stroke: &Stroke) {
    ctx.set_stroke_style_str(&stroke.color);
    ctx.set_line_width(stroke.width);
}

fn fill_and_stroke(ctx: &CanvasRenderingContext2d, fill: Option<&str>, stroke: Option<&Stroke>) {
    if let Some(fill) = fill {
        ctx.set_fill_style_str(fill);
        ctx.fill();
    }
    if let Some(stroke) = stroke {
        apply_stroke(ctx, stroke);
        ctx.stroke();
    }
}

fn round_rect_path(ctx: &CanvasRenderingContext2d, rect: &Rect, radius: f64) {
    let r = radius.min(rect.width * 0.5).min(rect.height * 0.5).max(0.0);
    let (x, y, w, h) = (rect.x, rect.y, rect.width, rect.height);
    ctx.begin_path();
    ctx.move_to(x + r, y);
    ctx.line_to(x + w - r, y);
    ctx.quadratic_curve_to(x + w, y, x + w, y + r);
    ctx.line_to(x + w, y + h - r);
    ctx.quadratic_curve_to(x + w, y + h, x + w - r, y + h);
    ctx.line_to(x + r, y + h);
    ctx.quadratic_curve_to(x, y + h, x, y + h - r);
    ctx.line_to(x, y + r);
    ctx.quadratic_curve_to(x, y, x + r, y);
    ctx.close_path();
}

/// Draw a data-URI image fitted into `rect`. Images that have not finished
/// decoding are skipped; the next redraw picks them up.
fn paint_image(ctx: &CanvasRenderingContext2d, rect: &Rect, source: &str, fit: ObjectFit) -> Result<(), JsValue> {
    let img = HtmlImageElement::new()?;
    img.set_src(source);
    if !img.complete() || img.natural_width() == 0 {
        return Ok(());
    }
    let target = crate::raster::fit_rect(
        *rect,
        f64::from(img.natural_width()),
        f64::from(img.natural_height()),
        fit,
    );
    ctx.save();
    ctx.begin_path();
    ctx.rect(rect.x, rect.y, rect.width, rect.height);
    ctx.clip();
    ctx.draw_image_with_html_image_element_and_dw_and_dh(&img, target.x, target.y, target.width, target.height)?;
    ctx.restore();
    Ok(())
}
