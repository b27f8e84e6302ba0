//! Rendering: turns a layout page into a `Scene` display list.
//!
//! Every renderer in the crate goes through here. The editor canvas calls
//! [`draw`] (zoom, grid, rulers, selection chrome, unresolved bindings); the
//! read-only preview calls [`page_ops`] with resolved data; the PNG exporter
//! rasterizes the resulting ops. Only [`crate::paint`] and [`crate::raster`]
//! turn ops into pixels.
//!
//! Element drawing is a type-driven stub per kind: it shows what a field is
//! and roughly how it sits on the card, not a pixel-exact rendition.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::sync::Arc;

use crate::binding::{self, DataMap};
use crate::camera::{Camera, Point, Rect};
use crate::consts::{CARD_CORNER_RADIUS, GRID_SPACING, RULER_THICKNESS_PX, RULER_TICK_SPACING};
use crate::doc::{CardElement, CardPage, CardSize, CodeProps, ElementContent, ImageProps, LayoutDefinition, ObjectFit, ShapeProps, TableProps, TextAlign, TextProps};
use crate::engine::EngineCore;
use crate::hit::ResizeAnchor;
use crate::input::UiState;
use crate::media;
use crate::pattern::{self, QR_MODULES};

/// Selection outline and handle color.
const SELECTION_COLOR: &str = "#2563EB";
/// Resize handle side length in screen pixels.
const HANDLE_SIZE_PX: f64 = 8.0;
/// Grid line color.
const GRID_COLOR: &str = "rgba(0, 0, 0, 0.06)";
/// Ruler band and tick colors.
const RULER_BG: &str = "#F3F4F6";
const RULER_FG: &str = "#6B7280";
/// Card outline color.
const CARD_BORDER: &str = "#D1D5DB";

/// Font attributes for a text op, already scaled.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub size: f64,
    pub weight: String,
    pub family: String,
}

impl Font {
    /// CSS font shorthand.
    #[must_use]
    pub fn css(&self) -> String {
        format!("{} {:.2}px {}", self.weight, self.size, self.family)
    }
}

/// A stroke color and width.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub color: String,
    pub width: f64,
}

/// One drawing primitive, in output pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillRect { rect: Rect, color: String },
    StrokeRect { rect: Rect, stroke: Stroke, dashed: bool },
    RoundRect { rect: Rect, radius: f64, fill: Option<String>, stroke: Option<Stroke> },
    Ellipse { rect: Rect, fill: Option<String>, stroke: Option<Stroke> },
    Line { from: Point, to: Point, stroke: Stroke },
    /// Single line of text, vertically centered in `rect`, aligned horizontally.
    Text { rect: Rect, text: String, font: Font, color: String, align: TextAlign },
    /// Embedded image drawn from a data URI.
    Image { rect: Rect, source: String, fit: ObjectFit },
}

/// A display list plus the pixel size of the surface it was built for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub ops: Vec<DrawOp>,
}

/// How element text is produced.
#[derive(Debug, Clone, Copy)]
pub enum TextMode<'a> {
    /// Editor view: literal text or `{BINDING}` names.
    Design,
    /// Preview/print: bindings resolved against a data map.
    Resolved(&'a DataMap),
}

/// Uniform scale followed by a translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: f64,
    pub dx: f64,
    pub dy: f64,
}

impl Transform {
    #[must_use]
    pub fn scale(scale: f64) -> Self {
        Self { scale, dx: 0.0, dy: 0.0 }
    }

    #[must_use]
    pub fn from_camera(camera: &Camera) -> Self {
        Self { scale: camera.zoom, dx: camera.pan_x, dy: camera.pan_y }
    }

    #[must_use]
    pub fn rect(&self, r: Rect) -> Rect {
        Rect::new(r.x * self.scale + self.dx, r.y * self.scale + self.dy, r.width * self.scale, r.height * self.scale)
    }

    #[must_use]
    pub fn point(&self, p: Point) -> Point {
        Point::new(p.x * self.scale + self.dx, p.y * self.scale + self.dy)
    }
}

fn font(size: f64, weight: &str, family: &str) -> Font {
    Font { size, weight: weight.to_owned(), family: family.to_owned() }
}

fn stroke(color: &str, width: f64) -> Stroke {
    Stroke { color: color.to_owned(), width }
}

fn label(ops: &mut Vec<DrawOp>, rect: Rect, text: &str, size: f64, color: &str) {
    ops.push(DrawOp::Text {
        rect,
        text: text.to_owned(),
        font: font(size, "bold", "sans-serif"),
        color: color.to_owned(),
        align: TextAlign::Center,
    });
}

// =============================================================
// Page / element drawing (shared by every renderer)
// =============================================================

/// Background and elements of one page, in z-order.
#[must_use]
pub fn page_ops(page: &CardPage, card: &CardSize, xf: Transform, mode: TextMode<'_>) -> Vec<DrawOp> {
    let card_rect = xf.rect(Rect::new(0.0, 0.0, card.width, card.height));
    let mut ops = vec![DrawOp::RoundRect {
        rect: card_rect,
        radius: CARD_CORNER_RADIUS * xf.scale,
        fill: Some(page.background_color.clone()),
        stroke: Some(stroke(CARD_BORDER, 1.0)),
    }];
    for element in &page.elements {
        element_ops(&mut ops, element, xf, mode);
    }
    ops
}

/// Append the draw ops for one element.
pub fn element_ops(ops: &mut Vec<DrawOp>, element: &CardElement, xf: Transform, mode: TextMode<'_>) {
    let rect = xf.rect(element.bounds());
    match &element.content {
        ElementContent::Text(props) => {
            let text = match mode {
                TextMode::Design => props.design_label(),
                TextMode::Resolved(data) => binding::resolve_text(props, data),
            };
            // Auto-sized text is boxed around what is drawn, not the design label.
            let rect = xf.rect(element.bounds_for_label(&text));
            text_ops(ops, rect, props, text, xf.scale);
        }
        ElementContent::Image(props) => image_ops(ops, rect, props, xf.scale),
        ElementContent::QrCode(props) => qr_ops(ops, rect, props, mode),
        ElementContent::Barcode(props) => barcode_ops(ops, rect, props, mode),
        ElementContent::Shape(props) => shape_ops(ops, rect, props, xf.scale),
        ElementContent::Table(props) => table_ops(ops, rect, props, xf.scale),
        ElementContent::Unknown { kind, .. } => {
            ops.push(DrawOp::StrokeRect { rect, stroke: stroke("#9CA3AF", 1.0), dashed: true });
            label(ops, rect, kind, (11.0 * xf.scale).max(6.0), "#6B7280");
        }
    }
}

fn text_ops(ops: &mut Vec<DrawOp>, rect: Rect, props: &TextProps, text: String, scale: f64) {
    ops.push(DrawOp::Text {
        rect,
        text,
        font: font(props.font_size() * scale, props.font_weight(), props.font_family()),
        color: props.color().to_owned(),
        align: props.align(),
    });
}

fn image_ops(ops: &mut Vec<DrawOp>, rect: Rect, props: &ImageProps, scale: f64) {
    let source = props.source.as_deref().unwrap_or("");
    if media::is_data_uri(source) {
        ops.push(DrawOp::Image { rect, source: source.to_owned(), fit: props.fit() });
        return;
    }
    let radius = props.border_radius.unwrap_or(4.0) * scale;
    let size = (rect.height * 0.25).clamp(6.0, 14.0 * scale.max(1.0));
    match media::source_label(source) {
        Some(text) => {
            ops.push(DrawOp::RoundRect {
                rect,
                radius,
                fill: Some("#EEF2FF".to_owned()),
                stroke: Some(stroke("#A5B4FC", 1.0)),
            });
            label(ops, rect, text, size, "#4F46E5");
        }
        None => {
            ops.push(DrawOp::RoundRect {
                rect,
                radius,
                fill: Some("#F3F4F6".to_owned()),
                stroke: Some(stroke("#D1D5DB", 1.0)),
            });
            label(ops, rect, "IMAGE", size, "#9CA3AF");
        }
    }
}

fn code_value(props: &CodeProps, mode: TextMode<'_>) -> String {
    match mode {
        TextMode::Design => props
            .binding
            .clone()
            .or_else(|| props.value.clone())
            .unwrap_or_default(),
        TextMode::Resolved(data) => binding::resolve_code(props, data),
    }
}

#[allow(clippy::cast_precision_loss)]
fn qr_ops(ops: &mut Vec<DrawOp>, rect: Rect, props: &CodeProps, mode: TextMode<'_>) {
    ops.push(DrawOp::FillRect { rect, color: props.background_color().to_owned() });
    let side = rect.width.min(rect.height);
    let module = side / QR_MODULES as f64;
    let ox = rect.x + (rect.width - side) * 0.5;
    let oy = rect.y + (rect.height - side) * 0.5;
    for (row, col) in pattern::qr_modules(&code_value(props, mode)) {
        ops.push(DrawOp::FillRect {
            rect: Rect::new(ox + col as f64 * module, oy + row as f64 * module, module, module),
            color: props.color().to_owned(),
        });
    }
}

fn barcode_ops(ops: &mut Vec<DrawOp>, rect: Rect, props: &CodeProps, mode: TextMode<'_>) {
    ops.push(DrawOp::FillRect { rect, color: props.background_color().to_owned() });
    let bars = pattern::barcode_bars(&code_value(props, mode));
    let total: f64 = bars.iter().map(|w| f64::from(*w)).sum();
    let unit = rect.width / total;
    let mut x = rect.x;
    for (i, width) in bars.iter().enumerate() {
        let w = f64::from(*width) * unit;
        if i % 2 == 0 {
            ops.push(DrawOp::FillRect {
                rect: Rect::new(x, rect.y, w, rect.height),
                color: props.color().to_owned(),
            });
        }
        x += w;
    }
}

fn shape_ops(ops: &mut Vec<DrawOp>, rect: Rect, props: &ShapeProps, scale: f64) {
    let fill = Some(props.fill_color().to_owned());
    let border = props.border_width();
    let outline = (border > 0.0).then(|| stroke(props.border_color(), border * scale));
    if props.is_circle() {
        ops.push(DrawOp::Ellipse { rect, fill, stroke: outline });
    } else {
        ops.push(DrawOp::RoundRect {
            rect,
            radius: props.border_radius.unwrap_or(0.0) * scale,
            fill,
            stroke: outline,
        });
    }
}

#[allow(clippy::cast_precision_loss)]
fn table_ops(ops: &mut Vec<DrawOp>, rect: Rect, props: &TableProps, scale: f64) {
    let rows = props.rows() as usize;
    let cols = props.columns() as usize;
    let cell_w = rect.width / cols as f64;
    let cell_h = rect.height / rows as f64;
    let line = stroke(props.border_color(), 1.0);

    if props.show_header() {
        ops.push(DrawOp::FillRect {
            rect: Rect::new(rect.x, rect.y, rect.width, cell_h),
            color: props.header_background().to_owned(),
        });
    }
    ops.push(DrawOp::StrokeRect { rect, stroke: line.clone(), dashed: false });
    for r in 1..rows {
        let y = rect.y + r as f64 * cell_h;
        ops.push(DrawOp::Line { from: Point::new(rect.x, y), to: Point::new(rect.right(), y), stroke: line.clone() });
    }
    for c in 1..cols {
        let x = rect.x + c as f64 * cell_w;
        ops.push(DrawOp::Line { from: Point::new(x, rect.y), to: Point::new(x, rect.bottom()), stroke: line.clone() });
    }

    let size = props.font_size.unwrap_or(10.0) * scale;
    for r in 0..rows {
        for c in 0..cols {
            let text = props.cell(r, c);
            if text.is_empty() {
                continue;
            }
            let weight = if r == 0 && props.show_header() { "bold" } else { "normal" };
            ops.push(DrawOp::Text {
                rect: Rect::new(rect.x + c as f64 * cell_w + 2.0, rect.y + r as f64 * cell_h, cell_w - 4.0, cell_h),
                text: text.to_owned(),
                font: font(size, weight, "Arial, sans-serif"),
                color: "#111827".to_owned(),
                align: TextAlign::Left,
            });
        }
    }
}

// =============================================================
// Editor canvas
// =============================================================

/// Build the editor scene for the active page: card, grid, elements, rulers
/// and selection chrome. Element text shows unresolved bindings.
#[must_use]
pub fn draw(layout: &LayoutDefinition, ui: &UiState, camera: &Camera) -> Scene {
    let card = &layout.card_size;
    let xf = Transform::from_camera(camera);
    let card_rect = xf.rect(Rect::new(0.0, 0.0, card.width, card.height));
    let mut scene = Scene {
        width: card_rect.right() + camera.pan_x.max(0.0),
        height: card_rect.bottom() + camera.pan_y.max(0.0),
        ops: Vec::new(),
    };

    let Some(page) = layout.page(ui.selected_page_index) else {
        scene.ops.push(DrawOp::StrokeRect { rect: card_rect, stroke: stroke(CARD_BORDER, 1.0), dashed: true });
        label(&mut scene.ops, card_rect, "No page data", 14.0, RULER_FG);
        return scene;
    };

    scene.ops.push(DrawOp::RoundRect {
        rect: card_rect,
        radius: CARD_CORNER_RADIUS * xf.scale,
        fill: Some(page.background_color.clone()),
        stroke: Some(stroke(CARD_BORDER, 1.0)),
    });
    if ui.show_grid {
        grid_ops(&mut scene.ops, card, xf);
    }
    for element in &page.elements {
        element_ops(&mut scene.ops, element, xf, TextMode::Design);
    }
    if page.elements.is_empty() {
        label(&mut scene.ops, card_rect, "No elements", 12.0, RULER_FG);
    }
    if ui.show_rulers {
        ruler_ops(&mut scene.ops, card, xf);
    }
    if let Some(selected) = ui.selected_element_id.as_deref().and_then(|id| page.element(id)) {
        selection_ops(&mut scene.ops, xf.rect(selected.bounds()));
    }
    scene
}

fn grid_ops(ops: &mut Vec<DrawOp>, card: &CardSize, xf: Transform) {
    let line = stroke(GRID_COLOR, 1.0);
    let mut x = GRID_SPACING;
    while x < card.width {
        ops.push(DrawOp::Line {
            from: xf.point(Point::new(x, 0.0)),
            to: xf.point(Point::new(x, card.height)),
            stroke: line.clone(),
        });
        x += GRID_SPACING;
    }
    let mut y = GRID_SPACING;
    while y < card.height {
        ops.push(DrawOp::Line {
            from: xf.point(Point::new(0.0, y)),
            to: xf.point(Point::new(card.width, y)),
            stroke: line.clone(),
        });
        y += GRID_SPACING;
    }
}

fn ruler_ops(ops: &mut Vec<DrawOp>, card: &CardSize, xf: Transform) {
    let t = RULER_THICKNESS_PX;
    let top = Rect::new(xf.dx, xf.dy - t, card.width * xf.scale, t);
    let left = Rect::new(xf.dx - t, xf.dy, t, card.height * xf.scale);
    ops.push(DrawOp::FillRect { rect: top, color: RULER_BG.to_owned() });
    ops.push(DrawOp::FillRect { rect: left, color: RULER_BG.to_owned() });

    let tick = stroke(RULER_FG, 1.0);
    let mut u = 0.0;
    while u <= card.width {
        let x = xf.dx + u * xf.scale;
        ops.push(DrawOp::Line { from: Point::new(x, top.y + t * 0.5), to: Point::new(x, top.bottom()), stroke: tick.clone() });
        ops.push(DrawOp::Text {
            rect: Rect::new(x + 2.0, top.y, 28.0, t * 0.5),
            text: format!("{u:.0}"),
            font: font(8.0, "normal", "sans-serif"),
            color: RULER_FG.to_owned(),
            align: TextAlign::Left,
        });
        u += RULER_TICK_SPACING;
    }
    let mut v = 0.0;
    while v <= card.height {
        let y = xf.dy + v * xf.scale;
        ops.push(DrawOp::Line { from: Point::new(left.x + t * 0.5, y), to: Point::new(left.right(), y), stroke: tick.clone() });
        v += RULER_TICK_SPACING;
    }
}

fn selection_ops(ops: &mut Vec<DrawOp>, rect: Rect) {
    ops.push(DrawOp::StrokeRect { rect, stroke: stroke(SELECTION_COLOR, 1.0), dashed: false });
    let half = HANDLE_SIZE_PX * 0.5;
    for anchor in ResizeAnchor::ALL {
        let c = anchor.position(&rect);
        let handle = Rect::new(c.x - half, c.y - half, HANDLE_SIZE_PX, HANDLE_SIZE_PX);
        ops.push(DrawOp::FillRect { rect: handle, color: "#FFFFFF".to_owned() });
        ops.push(DrawOp::StrokeRect { rect: handle, stroke: stroke(SELECTION_COLOR, 1.0), dashed: false });
    }
}

// =============================================================
// Redraw tracking
// =============================================================

#[derive(Debug, Clone, PartialEq)]
struct ViewKey {
    selected: Option<String>,
    page: usize,
    grid: bool,
    rulers: bool,
    camera: Camera,
}

impl ViewKey {
    fn of(core: &EngineCore) -> Self {
        Self {
            selected: core.ui.selected_element_id.clone(),
            page: core.ui.selected_page_index,
            grid: core.ui.show_grid,
            rulers: core.ui.show_rulers,
            camera: core.camera,
        }
    }
}

/// Rebuilds the editor scene only when the layout `Arc` or the view changes.
#[derive(Debug, Default)]
pub struct RenderCache {
    layout: Option<Arc<LayoutDefinition>>,
    view: Option<ViewKey>,
    scene: Scene,
}

impl RenderCache {
    /// Return the new scene if a redraw is needed, `None` if nothing changed.
    pub fn refresh(&mut self, core: &EngineCore) -> Option<&Scene> {
        let view = ViewKey::of(core);
        let same_layout = self.layout.as_ref().is_some_and(|l| Arc::ptr_eq(l, core.layout()));
        if same_layout && self.view.as_ref() == Some(&view) {
            return None;
        }
        self.scene = draw(core.layout(), &core.ui, &core.camera);
        self.layout = Some(Arc::clone(core.layout()));
        self.view = Some(view);
        Some(&self.scene)
    }

    /// Force the next `refresh` to redraw.
    pub fn invalidate(&mut self) {
        self.layout = None;
    }

    /// The most recently built scene.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }
}
