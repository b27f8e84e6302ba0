//! Software rasterization of a `Scene` into an RGBA image, and PNG export.
//!
//! Covers the same ops the browser painter does. Shapes are filled by testing
//! pixel centers (no anti-aliasing); text is greeked into one bar per glyph
//! since there is no font engine here; embedded images are decoded and fitted.

#[cfg(test)]
#[path = "raster_test.rs"]
mod raster_test;

use std::io::Cursor;
use std::ops::Range;

use image::{ImageFormat, Rgba, RgbaImage};

use crate::camera::{Point, Rect};
use crate::consts::GLYPH_ADVANCE_RATIO;
use crate::doc::{ObjectFit, TextAlign};
use crate::media::{self, MediaError};
use crate::render::{DrawOp, Scene, Stroke};

/// Upper bound on either output dimension, in pixels.
pub const MAX_RASTER_PX: u32 = 8192;

/// Fill used when an embedded image cannot be decoded.
const BROKEN_IMAGE_FILL: Rgba<u8> = Rgba([243, 244, 246, 255]);

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("scene has no drawable area ({width}x{height})")]
    EmptyScene { width: f64, height: f64 },
    #[error("scene is too large to rasterize ({width}x{height})")]
    TooLarge { width: f64, height: f64 },
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Where an image of `img_w`×`img_h` lands inside `rect` for a given fit.
///
/// The result may overflow `rect` for `Cover`; callers clip to `rect`.
#[must_use]
pub fn fit_rect(rect: Rect, img_w: f64, img_h: f64, fit: ObjectFit) -> Rect {
    if img_w <= 0.0 || img_h <= 0.0 || fit == ObjectFit::Fill {
        return rect;
    }
    let sx = rect.width / img_w;
    let sy = rect.height / img_h;
    let scale = match fit {
        ObjectFit::Contain => sx.min(sy),
        ObjectFit::Cover => sx.max(sy),
        ObjectFit::Fill => return rect,
    };
    let (w, h) = (img_w * scale, img_h * scale);
    Rect::new(rect.x + (rect.width - w) * 0.5, rect.y + (rect.height - h) * 0.5, w, h)
}

/// Parse the CSS colors layouts use: `#rgb`, `#rgba`, `#rrggbb`,
/// `#rrggbbaa`, `rgb()`, `rgba()`, `transparent`, `white` and `black`.
#[must_use]
pub fn parse_color(css: &str) -> Option<Rgba<u8>> {
    let css = css.trim();
    if let Some(hex) = css.strip_prefix('#') {
        return parse_hex(hex);
    }
    let lower = css.to_ascii_lowercase();
    match lower.as_str() {
        "transparent" => return Some(Rgba([0, 0, 0, 0])),
        "white" => return Some(Rgba([255, 255, 255, 255])),
        "black" => return Some(Rgba([0, 0, 0, 255])),
        _ => {}
    }
    let inner = lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))?
        .strip_suffix(')')?;
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let mut rgba = [0u8, 0, 0, 255];
    for (slot, part) in rgba.iter_mut().zip(&parts[..3]) {
        let Ok(value) = part.parse::<f64>() else {
            return None;
        };
        *slot = channel(value);
    }
    if let Some(alpha) = parts.get(3) {
        let Ok(alpha) = alpha.parse::<f64>() else {
            return None;
        };
        rgba[3] = channel(alpha * 255.0);
    }
    Some(Rgba(rgba))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

fn parse_hex(hex: &str) -> Option<Rgba<u8>> {
    if !hex.is_ascii() {
        return None;
    }
    let (width, repeat) = match hex.len() {
        3 | 4 => (1, 17),
        6 | 8 => (2, 1),
        _ => return None,
    };
    let mut rgba = [0u8, 0, 0, 255];
    for (i, slot) in rgba.iter_mut().take(hex.len() / width).enumerate() {
        let Ok(value) = u8::from_str_radix(&hex[i * width..(i + 1) * width], 16) else {
            return None;
        };
        *slot = value * repeat;
    }
    Some(Rgba(rgba))
}

/// Rasterize a scene onto a transparent surface of the scene's size.
///
/// # Errors
///
/// Returns [`RasterError::EmptyScene`] for a zero or non-finite surface and
/// [`RasterError::TooLarge`] past [`MAX_RASTER_PX`] on either side.
pub fn rasterize(scene: &Scene) -> Result<RgbaImage, RasterError> {
    let (width, height) = surface_size(scene)?;
    let mut surface = Surface { img: RgbaImage::new(width, height) };
    for op in &scene.ops {
        surface.draw(op);
    }
    Ok(surface.img)
}

/// Rasterize a scene and encode it as PNG bytes.
///
/// # Errors
///
/// Propagates [`rasterize`] errors and PNG encoder failures.
pub fn export_png(scene: &Scene) -> Result<Vec<u8>, RasterError> {
    let img = rasterize(scene)?;
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn surface_size(scene: &Scene) -> Result<(u32, u32), RasterError> {
    let (width, height) = (scene.width, scene.height);
    if !(width.is_finite() && height.is_finite()) || width < 1.0 || height < 1.0 {
        return Err(RasterError::EmptyScene { width, height });
    }
    let limit = f64::from(MAX_RASTER_PX);
    if width.ceil() > limit || height.ceil() > limit {
        return Err(RasterError::TooLarge { width, height });
    }
    Ok((width.ceil() as u32, height.ceil() as u32))
}

struct Surface {
    img: RgbaImage,
}

impl Surface {
    fn draw(&mut self, op: &DrawOp) {
        match op {
            DrawOp::FillRect { rect, color } => {
                if let Some(c) = parse_color(color) {
                    let r = *rect;
                    self.fill(r, c, |p| in_rect(r, p));
                }
            }
            DrawOp::StrokeRect { rect, stroke, dashed } => {
                let (r, dashed) = (*rect, *dashed);
                self.stroke(r, stroke, |p, hw| {
                    in_rect(inset(r, -hw), p) && !in_rect(inset(r, hw), p) && (!dashed || dash_on(p))
                });
            }
            DrawOp::RoundRect { rect, radius, fill, stroke } => {
                let (r, rad) = (*rect, *radius);
                if let Some(c) = fill.as_deref().and_then(parse_color) {
                    self.fill(r, c, |p| in_round_rect(r, rad, p));
                }
                if let Some(s) = stroke {
                    self.stroke(r, s, |p, hw| {
                        in_round_rect(inset(r, -hw), rad + hw, p) && !in_round_rect(inset(r, hw), (rad - hw).max(0.0), p)
                    });
                }
            }
            DrawOp::Ellipse { rect, fill, stroke } => {
                let r = *rect;
                if let Some(c) = fill.as_deref().and_then(parse_color) {
                    self.fill(r, c, |p| in_ellipse(r, 0.0, p));
                }
                if let Some(s) = stroke {
                    self.stroke(r, s, |p, hw| in_ellipse(r, hw, p) && !in_ellipse(r, -hw, p));
                }
            }
            DrawOp::Line { from, to, stroke } => {
                let (a, b) = (*from, *to);
                let bounds = Rect::new(a.x.min(b.x), a.y.min(b.y), (a.x - b.x).abs(), (a.y - b.y).abs());
                self.stroke(bounds, stroke, |p, hw| segment_distance(p, a, b) <= hw.max(0.5));
            }
            DrawOp::Text { rect, text, font, color, align } => {
                if let Some(c) = parse_color(color) {
                    self.greek_text(*rect, text, font.size, c, *align);
                }
            }
            DrawOp::Image { rect, source, fit } => self.image(*rect, source, *fit),
        }
    }

    fn span(lo: f64, hi: f64, max: u32) -> Range<u32> {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let clamp = |v: f64| v.clamp(0.0, f64::from(max)) as u32;
        clamp(lo.floor())..clamp(hi.ceil())
    }

    fn fill(&mut self, bounds: Rect, color: Rgba<u8>, inside: impl Fn(Point) -> bool) {
        if color[3] == 0 {
            return;
        }
        let (w, h) = self.img.dimensions();
        for y in Self::span(bounds.y, bounds.bottom(), h) {
            for x in Self::span(bounds.x, bounds.right(), w) {
                if inside(Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5)) {
                    self.blend(x, y, color);
                }
            }
        }
    }

    /// Fill the band selected by `inside(point, half_width)` around `bounds`.
    fn stroke(&mut self, bounds: Rect, stroke: &Stroke, inside: impl Fn(Point, f64) -> bool) {
        let Some(color) = parse_color(&stroke.color) else {
            return;
        };
        let hw = (stroke.width * 0.5).max(0.5);
        self.fill(inset(bounds, -hw), color, |p| inside(p, hw));
    }

    fn blend(&mut self, x: u32, y: u32, src: Rgba<u8>) {
        let dst = self.img.get_pixel_mut(x, y);
        let sa = f64::from(src[3]) / 255.0;
        let da = f64::from(dst[3]) / 255.0;
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            return;
        }
        for i in 0..3 {
            let s = f64::from(src[i]) * sa;
            let d = f64::from(dst[i]) * da * (1.0 - sa);
            dst[i] = channel((s + d) / out_a);
        }
        dst[3] = channel(out_a * 255.0);
    }

    /// One bar per non-space glyph, positioned like the painter would lay the
    /// text out, clipped to the text box.
    fn greek_text(&mut self, rect: Rect, text: &str, size: f64, color: Rgba<u8>, align: TextAlign) {
        if size <= 0.0 {
            return;
        }
        let advance = size * GLYPH_ADVANCE_RATIO;
        #[allow(clippy::cast_precision_loss)]
        let run = text.chars().count() as f64 * advance;
        let start = match align {
            TextAlign::Left => rect.x,
            TextAlign::Center => rect.x + (rect.width - run) * 0.5,
            TextAlign::Right => rect.right() - run,
        };
        let bar_h = size * 0.5;
        let bar_y = rect.y + (rect.height - bar_h) * 0.5;
        let mut x = start;
        for ch in text.chars() {
            if !ch.is_whitespace() {
                let bar = Rect::new(x + advance * 0.1, bar_y, advance * 0.8, bar_h);
                self.fill(bar, color, |p| in_rect(bar, p) && in_rect(rect, p));
            }
            x += advance;
        }
    }

    fn image(&mut self, rect: Rect, source: &str, fit: ObjectFit) {
        let Ok(pixels) = decode_image(source) else {
            self.fill(rect, BROKEN_IMAGE_FILL, |p| in_rect(rect, p));
            return;
        };
        let (iw, ih) = pixels.dimensions();
        let target = fit_rect(rect, f64::from(iw), f64::from(ih), fit);
        if target.width <= 0.0 || target.height <= 0.0 {
            return;
        }
        let (w, h) = self.img.dimensions();
        for y in Self::span(rect.y.max(target.y), rect.bottom().min(target.bottom()), h) {
            for x in Self::span(rect.x.max(target.x), rect.right().min(target.right()), w) {
                let u = (f64::from(x) + 0.5 - target.x) / target.width;
                let v = (f64::from(y) + 0.5 - target.y) / target.height;
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let (sx, sy) = (
                    ((u * f64::from(iw)) as u32).min(iw - 1),
                    ((v * f64::from(ih)) as u32).min(ih - 1),
                );
                let px = *pixels.get_pixel(sx, sy);
                self.blend(x, y, px);
            }
        }
    }
}

fn decode_image(source: &str) -> Result<RgbaImage, MediaError> {
    let uri = media::decode_data_uri(source)?;
    Ok(image::load_from_memory(&uri.bytes)?.to_rgba8())
}

fn inset(r: Rect, d: f64) -> Rect {
    Rect::new(r.x + d, r.y + d, r.width - 2.0 * d, r.height - 2.0 * d)
}

fn in_rect(r: Rect, p: Point) -> bool {
    p.x >= r.x && p.x < r.right() && p.y >= r.y && p.y < r.bottom()
}

fn in_round_rect(r: Rect, radius: f64, p: Point) -> bool {
    if r.width <= 0.0 || r.height <= 0.0 || !in_rect(r, p) {
        return false;
    }
    let rad = radius.min(r.width * 0.5).min(r.height * 0.5).max(0.0);
    let cx = p.x.clamp(r.x + rad, r.right() - rad);
    let cy = p.y.clamp(r.y + rad, r.bottom() - rad);
    (p.x - cx).powi(2) + (p.y - cy).powi(2) <= rad * rad
}

/// Inside the ellipse inscribed in `r`, grown by `grow` on each radius.
fn in_ellipse(r: Rect, grow: f64, p: Point) -> bool {
    let rx = r.width * 0.5 + grow;
    let ry = r.height * 0.5 + grow;
    if rx <= 0.0 || ry <= 0.0 {
        return false;
    }
    let c = r.center();
    ((p.x - c.x) / rx).powi(2) + ((p.y - c.y) / ry).powi(2) <= 1.0
}

fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len2 = dx * dx + dy * dy;
    let t = if len2 == 0.0 { 0.0 } else { (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0) };
    let (qx, qy) = (a.x + t * dx, a.y + t * dy);
    ((p.x - qx).powi(2) + (p.y - qy).powi(2)).sqrt()
}

#[allow(clippy::cast_possible_truncation)]
fn dash_on(p: Point) -> bool {
    const DASH: f64 = 4.0;
    ((p.x + p.y) / DASH).floor() as i64 % 2 == 0
}
