//! Shared numeric constants for the canvas crate.

// ── Schema ──────────────────────────────────────────────────────

/// Current layout document schema version.
pub const LAYOUT_VERSION: i64 = 1;

/// Name of the mandatory first card side.
pub const FRONT_PAGE: &str = "front";

/// Name of the optional second card side.
pub const BACK_PAGE: &str = "back";

/// Default page background color.
pub const DEFAULT_BACKGROUND: &str = "#FFFFFF";

/// Width/height given to non-text elements created without explicit size.
pub const DEFAULT_ELEMENT_SIZE: f64 = 100.0;

// ── Geometry ────────────────────────────────────────────────────

/// Smallest width or height a resize gesture may produce, in layout units.
pub const MIN_ELEMENT_SIZE: f64 = 20.0;

/// Margin kept between a dragged element's origin and the far card edges.
///
/// Independent of the element's own size because TEXT elements may have none.
pub const DRAG_EDGE_MARGIN: f64 = 50.0;

/// Screen-space hit slop in pixels for resize handles.
pub const HANDLE_RADIUS_PX: f64 = 6.0;

/// Arrow-key nudge distance in layout units (Shift multiplies by 10).
pub const NUDGE_STEP: f64 = 1.0;

// ── Zoom ────────────────────────────────────────────────────────

/// Lower zoom bound.
pub const ZOOM_MIN: f64 = 0.25;

/// Upper zoom bound.
pub const ZOOM_MAX: f64 = 3.0;

/// Multiplicative zoom step per zoom action.
pub const ZOOM_STEP: f64 = 1.2;

// ── Overlays ────────────────────────────────────────────────────

/// Grid line spacing in layout units.
pub const GRID_SPACING: f64 = 20.0;

/// Ruler tick spacing in layout units.
pub const RULER_TICK_SPACING: f64 = 50.0;

/// Ruler band thickness in screen pixels.
pub const RULER_THICKNESS_PX: f64 = 16.0;

// ── Text metrics ────────────────────────────────────────────────

/// Font size used when a text element does not specify one.
pub const DEFAULT_FONT_SIZE: f64 = 14.0;

/// Average glyph advance as a fraction of the font size.
pub const GLYPH_ADVANCE_RATIO: f64 = 0.6;

/// Line box height as a multiple of the font size.
pub const LINE_HEIGHT_RATIO: f64 = 1.4;

// ── Print ───────────────────────────────────────────────────────

/// ISO/IEC 7810 ID-1 card width in millimetres.
pub const PRINT_CARD_WIDTH_MM: f64 = 85.6;

/// ISO/IEC 7810 ID-1 card height in millimetres.
pub const PRINT_CARD_HEIGHT_MM: f64 = 53.98;

/// Largest `left` percentage an element may be placed at in print output.
pub const PRINT_MAX_LEFT_PCT: f64 = 90.0;

/// Largest `top` percentage an element may be placed at in print output.
pub const PRINT_MAX_TOP_PCT: f64 = 85.0;

/// Corner radius of the card outline, in layout units.
pub const CARD_CORNER_RADIUS: f64 = 12.0;
