//! Document model: card layouts, pages, elements and their typed properties.
//!
//! This module defines the serializable layout document handed to and from the
//! template API (`LayoutDefinition`, `CardPage`, `CardElement`), the typed
//! per-type property structs that replace the open-ended `props` bag, and the
//! pure mutation operations the editor uses.
//!
//! Every mutation takes `&self`, works on a deep copy, and returns a new
//! `LayoutDefinition`. Callers replace their reference wholesale; nothing in
//! this module mutates a layout in place.
//!
//! Unrecognized keys at every level are kept in `extra` maps so that a
//! load → edit → save cycle never drops data the editor does not understand.
//! A known key that arrived as an explicit `null` is parked in the same map
//! while its typed field stays unset, and whole numbers are written without a
//! fractional part, so untouched documents keep their exact bytes.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::camera::Rect;
use crate::consts::{
    BACK_PAGE, DEFAULT_BACKGROUND, DEFAULT_ELEMENT_SIZE, DEFAULT_FONT_SIZE, FRONT_PAGE, GLYPH_ADVANCE_RATIO,
    LAYOUT_VERSION, LINE_HEIGHT_RATIO,
};

/// Errors produced while parsing, validating or editing a layout.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// The JSON document could not be parsed or produced.
    #[error("layout json error: {0}")]
    Json(#[from] serde_json::Error),
    /// A page index does not exist.
    #[error("page index {index} out of range ({len} pages)")]
    PageOutOfRange { index: usize, len: usize },
    /// No element with this id exists on the page.
    #[error("element not found: {0}")]
    ElementNotFound(String),
    /// An element with this id already exists on the page.
    #[error("duplicate element id: {0}")]
    DuplicateElementId(String),
    /// The layout already has a back page.
    #[error("layout already has a back page")]
    BackPageExists,
    /// There is no removable back page.
    #[error("layout has no removable back page")]
    NoBackPage,
    /// The layout has no pages at all.
    #[error("layout has no pages")]
    NoPages,
    /// A replacement element carries a different type than the stored one.
    #[error("element {id} is {stored}, cannot become {requested}")]
    ElementKindChanged { id: String, stored: String, requested: String },
    /// The first page is not named `front`.
    #[error("first page must be named \"front\", found {0:?}")]
    FrontPageRequired(String),
    /// A card-size preset key is not recognized.
    #[error("unknown card size preset: {0}")]
    UnknownPreset(String),
}

// =============================================================
// Layout
// =============================================================

/// Card dimensions in layout units (pixels at 1:1 scale).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSize {
    #[serde(serialize_with = "number")]
    pub width: f64,
    #[serde(serialize_with = "number")]
    pub height: f64,
    /// Keys this editor does not interpret (`unit`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CardSize {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height, extra: Map::new() }
    }
}

impl Default for CardSize {
    fn default() -> Self {
        Self::new(340.0, 214.0)
    }
}

/// Root document for one card template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDefinition {
    /// Schema version.
    #[serde(default = "default_version")]
    pub version: i64,
    /// Logical card dimensions.
    #[serde(default)]
    pub card_size: CardSize,
    /// Card sides in display order.
    #[serde(default)]
    pub pages: Vec<CardPage>,
    /// Keys this editor does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_version() -> i64 {
    LAYOUT_VERSION
}

/// One side of a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPage {
    /// Page identifier (`front`, `back`, or arbitrary).
    #[serde(default)]
    pub name: String,
    /// Background fill as a CSS color string.
    #[serde(default = "default_background")]
    pub background_color: String,
    /// Elements in z-order; later elements are drawn on top.
    #[serde(default)]
    pub elements: Vec<CardElement>,
    /// Keys this editor does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_background() -> String {
    DEFAULT_BACKGROUND.to_owned()
}

impl CardPage {
    /// An empty page with the default background.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            background_color: default_background(),
            elements: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Look up an element by id.
    #[must_use]
    pub fn element(&self, id: &str) -> Option<&CardElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Position of an element in the z-order.
    #[must_use]
    pub fn element_index(&self, id: &str) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }
}

/// Direction of a z-order change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZMove {
    /// One step toward the top.
    Forward,
    /// One step toward the bottom.
    Backward,
    /// To the very top.
    ToFront,
    /// To the very bottom.
    ToBack,
}

impl LayoutDefinition {
    /// An empty layout with a single blank front page.
    #[must_use]
    pub fn blank(card_size: CardSize) -> Self {
        Self {
            version: LAYOUT_VERSION,
            card_size,
            pages: vec![CardPage::new(FRONT_PAGE)],
            extra: Map::new(),
        }
    }

    /// Parse a layout from JSON. Missing `pages`/`elements` become empty lists.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Json`] if the text is not a layout document.
    pub fn from_json(text: &str) -> Result<Self, LayoutError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse a layout from an already-decoded JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Json`] if the value is not a layout document.
    pub fn from_value(value: Value) -> Result<Self, LayoutError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Compact JSON encoding.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Json`] if encoding fails.
    pub fn to_json(&self) -> Result<String, LayoutError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Indented JSON encoding.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Json`] if encoding fails.
    pub fn to_json_pretty(&self) -> Result<String, LayoutError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Look up a page by index.
    #[must_use]
    pub fn page(&self, index: usize) -> Option<&CardPage> {
        self.pages.get(index)
    }

    /// Look up a page by name.
    #[must_use]
    pub fn page_index(&self, name: &str) -> Option<usize> {
        self.pages.iter().position(|p| p.name == name)
    }

    /// Whether a page named `back` exists.
    #[must_use]
    pub fn has_back_page(&self) -> bool {
        self.page_index(BACK_PAGE).is_some()
    }

    /// "Add back side" is only offered when no back page exists.
    #[must_use]
    pub fn can_add_back_page(&self) -> bool {
        !self.has_back_page()
    }

    /// "Remove back side" is only offered when more than one page exists.
    #[must_use]
    pub fn can_remove_back_page(&self) -> bool {
        self.pages.len() > 1 && self.has_back_page()
    }

    /// Check structural invariants without changing anything.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant: no pages, first page not named
    /// `front`, or a duplicate element id within a page.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let Some(first) = self.pages.first() else {
            return Err(LayoutError::NoPages);
        };
        if first.name != FRONT_PAGE {
            return Err(LayoutError::FrontPageRequired(first.name.clone()));
        }
        for page in &self.pages {
            let mut seen = std::collections::HashSet::new();
            for element in &page.elements {
                if !seen.insert(element.id.as_str()) {
                    return Err(LayoutError::DuplicateElementId(element.id.clone()));
                }
            }
        }
        Ok(())
    }

    fn check_page(&self, index: usize) -> Result<(), LayoutError> {
        if index < self.pages.len() {
            Ok(())
        } else {
            Err(LayoutError::PageOutOfRange { index, len: self.pages.len() })
        }
    }

    /// Append an element on top of the page's z-order.
    ///
    /// # Errors
    ///
    /// Fails if the page does not exist or the id is already taken.
    pub fn with_element_added(&self, page_index: usize, element: CardElement) -> Result<Self, LayoutError> {
        self.check_page(page_index)?;
        if self.pages[page_index].element(&element.id).is_some() {
            return Err(LayoutError::DuplicateElementId(element.id));
        }
        let mut next = self.clone();
        next.pages[page_index].elements.push(element);
        Ok(next)
    }

    /// Replace the element with the same id, keeping its z-position. The
    /// element type is fixed at creation.
    ///
    /// # Errors
    ///
    /// Fails if the page or element does not exist, or with
    /// [`LayoutError::ElementKindChanged`] if the replacement has another type.
    pub fn with_element_replaced(&self, page_index: usize, element: CardElement) -> Result<Self, LayoutError> {
        self.check_page(page_index)?;
        let page = &self.pages[page_index];
        let Some(pos) = page.element_index(&element.id) else {
            return Err(LayoutError::ElementNotFound(element.id));
        };
        let stored = page.elements[pos].kind_name();
        if stored != element.kind_name() {
            return Err(LayoutError::ElementKindChanged {
                id: element.id.clone(),
                stored: stored.to_owned(),
                requested: element.kind_name().to_owned(),
            });
        }
        let mut next = self.clone();
        next.pages[page_index].elements[pos] = element;
        Ok(next)
    }

    /// Remove exactly one element, returning the new layout and the removed element.
    ///
    /// # Errors
    ///
    /// Fails if the page or element does not exist.
    pub fn with_element_removed(&self, page_index: usize, id: &str) -> Result<(Self, CardElement), LayoutError> {
        self.check_page(page_index)?;
        let Some(pos) = self.pages[page_index].element_index(id) else {
            return Err(LayoutError::ElementNotFound(id.to_owned()));
        };
        let mut next = self.clone();
        let removed = next.pages[page_index].elements.remove(pos);
        Ok((next, removed))
    }

    /// Move an element within the page's z-order.
    ///
    /// # Errors
    ///
    /// Fails if the page or element does not exist.
    pub fn with_element_restacked(&self, page_index: usize, id: &str, how: ZMove) -> Result<Self, LayoutError> {
        self.check_page(page_index)?;
        let Some(pos) = self.pages[page_index].element_index(id) else {
            return Err(LayoutError::ElementNotFound(id.to_owned()));
        };
        let mut next = self.clone();
        let elements = &mut next.pages[page_index].elements;
        let last = elements.len() - 1;
        let target = match how {
            ZMove::Forward => (pos + 1).min(last),
            ZMove::Backward => pos.saturating_sub(1),
            ZMove::ToFront => last,
            ZMove::ToBack => 0,
        };
        let element = elements.remove(pos);
        elements.insert(target, element);
        Ok(next)
    }

    /// Append an empty `back` page.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::BackPageExists`] if one is already present.
    pub fn with_back_page(&self) -> Result<Self, LayoutError> {
        if self.has_back_page() {
            return Err(LayoutError::BackPageExists);
        }
        let mut next = self.clone();
        next.pages.push(CardPage::new(BACK_PAGE));
        Ok(next)
    }

    /// Remove the `back` page.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::NoBackPage`] unless a back page exists alongside another page.
    pub fn without_back_page(&self) -> Result<Self, LayoutError> {
        if !self.can_remove_back_page() {
            return Err(LayoutError::NoBackPage);
        }
        let mut next = self.clone();
        next.pages.retain(|p| p.name != BACK_PAGE);
        Ok(next)
    }

    /// Change a page's background color.
    ///
    /// # Errors
    ///
    /// Fails if the page does not exist.
    pub fn with_page_background(&self, page_index: usize, color: &str) -> Result<Self, LayoutError> {
        self.check_page(page_index)?;
        let mut next = self.clone();
        color.clone_into(&mut next.pages[page_index].background_color);
        Ok(next)
    }
}

// =============================================================
// Elements
// =============================================================

/// The closed set of element types the editor knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ElementKind {
    Text,
    Image,
    #[serde(rename = "QRCODE")]
    QrCode,
    Barcode,
    Shape,
    Table,
}

impl ElementKind {
    /// Every known kind, in toolbox order.
    pub const ALL: [Self; 6] = [Self::Text, Self::Image, Self::QrCode, Self::Barcode, Self::Shape, Self::Table];

    /// Wire name (`TEXT`, `QRCODE`, ...).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Image => "IMAGE",
            Self::QrCode => "QRCODE",
            Self::Barcode => "BARCODE",
            Self::Shape => "SHAPE",
            Self::Table => "TABLE",
        }
    }

    /// Parse a wire name. Returns `None` for types this editor does not know.
    #[must_use]
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Properties of a TEXT element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", serialize_with = "optional_number")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_aspect_ratio: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TextProps {
    /// Effective font size.
    #[must_use]
    pub fn font_size(&self) -> f64 {
        self.font_size.filter(|s| *s > 0.0).unwrap_or(DEFAULT_FONT_SIZE)
    }

    /// Effective text color.
    #[must_use]
    pub fn color(&self) -> &str {
        self.color.as_deref().unwrap_or("#000000")
    }

    /// Effective font weight.
    #[must_use]
    pub fn font_weight(&self) -> &str {
        self.font_weight.as_deref().unwrap_or("normal")
    }

    /// Effective font family.
    #[must_use]
    pub fn font_family(&self) -> &str {
        self.font_family.as_deref().unwrap_or("Arial, sans-serif")
    }

    /// Parsed alignment; unknown values fall back to left.
    #[must_use]
    pub fn align(&self) -> TextAlign {
        match self.text_align.as_deref() {
            Some("center") => TextAlign::Center,
            Some("right") => TextAlign::Right,
            _ => TextAlign::Left,
        }
    }

    /// What the editor shows before bindings are resolved: literal text,
    /// else the binding name in braces, else a generic label.
    #[must_use]
    pub fn design_label(&self) -> String {
        if let Some(text) = self.text.as_deref().filter(|t| !t.is_empty()) {
            return text.to_owned();
        }
        if let Some(binding) = self.binding.as_deref().filter(|b| !b.is_empty()) {
            return format!("{{{binding}}}");
        }
        "Text".to_owned()
    }
}

/// Properties of an IMAGE element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageProps {
    /// Symbolic source name (e.g. `COMPANY_LOGO`) or an embedded data URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_fit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", serialize_with = "optional_number")]
    pub border_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_aspect_ratio: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// How an image is fitted into its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectFit {
    #[default]
    Contain,
    Cover,
    Fill,
}

impl ObjectFit {
    /// CSS keyword.
    #[must_use]
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Contain => "contain",
            Self::Cover => "cover",
            Self::Fill => "fill",
        }
    }
}

impl ImageProps {
    /// Parsed object-fit; unknown values fall back to contain.
    #[must_use]
    pub fn fit(&self) -> ObjectFit {
        match self.object_fit.as_deref() {
            Some("cover") => ObjectFit::Cover,
            Some("fill") => ObjectFit::Fill,
            _ => ObjectFit::Contain,
        }
    }
}

/// Properties of a QRCODE or BARCODE element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<String>,
    /// Literal encoded value when no binding applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_aspect_ratio: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CodeProps {
    #[must_use]
    pub fn color(&self) -> &str {
        self.color.as_deref().unwrap_or("#000000")
    }

    #[must_use]
    pub fn background_color(&self) -> &str {
        self.background_color.as_deref().unwrap_or("#FFFFFF")
    }
}

/// Properties of a SHAPE element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeProps {
    /// `rectangle` (default) or `circle`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", serialize_with = "optional_number")]
    pub border_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", serialize_with = "optional_number")]
    pub border_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_aspect_ratio: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ShapeProps {
    #[must_use]
    pub fn is_circle(&self) -> bool {
        self.shape.as_deref() == Some("circle")
    }

    #[must_use]
    pub fn fill_color(&self) -> &str {
        self.fill_color.as_deref().unwrap_or("transparent")
    }

    #[must_use]
    pub fn border_color(&self) -> &str {
        self.border_color.as_deref().unwrap_or("#000000")
    }

    #[must_use]
    pub fn border_width(&self) -> f64 {
        self.border_width.unwrap_or(1.0).max(0.0)
    }
}

/// Properties of a TABLE element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_header: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", serialize_with = "optional_number")]
    pub font_size: Option<f64>,
    /// Optional cell text, row-major.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cells: Option<Vec<Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_aspect_ratio: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TableProps {
    #[must_use]
    pub fn rows(&self) -> u32 {
        self.rows.unwrap_or(3).max(1)
    }

    #[must_use]
    pub fn columns(&self) -> u32 {
        self.columns.unwrap_or(2).max(1)
    }

    #[must_use]
    pub fn show_header(&self) -> bool {
        self.show_header.unwrap_or(true)
    }

    #[must_use]
    pub fn border_color(&self) -> &str {
        self.border_color.as_deref().unwrap_or("#9CA3AF")
    }

    #[must_use]
    pub fn header_background(&self) -> &str {
        self.header_background.as_deref().unwrap_or("#F3F4F6")
    }

    /// Text of one cell, empty when absent.
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.cells
            .as_ref()
            .and_then(|rows| rows.get(row))
            .and_then(|r| r.get(column))
            .map_or("", String::as_str)
    }
}

/// Type-tagged element properties.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementContent {
    Text(TextProps),
    Image(ImageProps),
    QrCode(CodeProps),
    Barcode(CodeProps),
    Shape(ShapeProps),
    Table(TableProps),
    /// A type this editor does not know, or known props it could not read.
    /// Kept verbatim so it round-trips untouched.
    Unknown { kind: String, props: Value },
}

impl ElementContent {
    /// Starter props for a freshly added element.
    #[must_use]
    pub fn default_for(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Text => Self::Text(TextProps {
                text: Some("New text".to_owned()),
                font_size: Some(DEFAULT_FONT_SIZE),
                color: Some("#000000".to_owned()),
                ..TextProps::default()
            }),
            ElementKind::Image => Self::Image(ImageProps {
                object_fit: Some("contain".to_owned()),
                ..ImageProps::default()
            }),
            ElementKind::QrCode => Self::QrCode(CodeProps {
                binding: Some("QR_URL".to_owned()),
                lock_aspect_ratio: Some(true),
                ..CodeProps::default()
            }),
            ElementKind::Barcode => Self::Barcode(CodeProps {
                binding: Some("CARD_NUMBER".to_owned()),
                ..CodeProps::default()
            }),
            ElementKind::Shape => Self::Shape(ShapeProps {
                shape: Some("rectangle".to_owned()),
                fill_color: Some("#E5E7EB".to_owned()),
                border_color: Some("#9CA3AF".to_owned()),
                border_width: Some(1.0),
                ..ShapeProps::default()
            }),
            ElementKind::Table => Self::Table(TableProps {
                rows: Some(3),
                columns: Some(2),
                show_header: Some(true),
                ..TableProps::default()
            }),
        }
    }

    /// Known kind, or `None` for the unknown variant.
    #[must_use]
    pub fn kind(&self) -> Option<ElementKind> {
        match self {
            Self::Text(_) => Some(ElementKind::Text),
            Self::Image(_) => Some(ElementKind::Image),
            Self::QrCode(_) => Some(ElementKind::QrCode),
            Self::Barcode(_) => Some(ElementKind::Barcode),
            Self::Shape(_) => Some(ElementKind::Shape),
            Self::Table(_) => Some(ElementKind::Table),
            Self::Unknown { .. } => None,
        }
    }

    /// Wire type name, including unknown ones.
    #[must_use]
    pub fn kind_name(&self) -> &str {
        match self {
            Self::Unknown { kind, .. } => kind,
            other => other.kind().map_or("", ElementKind::as_str),
        }
    }

    /// Whether resizes keep the aspect ratio captured at gesture start.
    #[must_use]
    pub fn lock_aspect_ratio(&self) -> bool {
        let flag = match self {
            Self::Text(p) => p.lock_aspect_ratio,
            Self::Image(p) => p.lock_aspect_ratio,
            Self::QrCode(p) | Self::Barcode(p) => p.lock_aspect_ratio,
            Self::Shape(p) => p.lock_aspect_ratio,
            Self::Table(p) => p.lock_aspect_ratio,
            Self::Unknown { props, .. } => props.get("lockAspectRatio").and_then(Value::as_bool),
        };
        flag.unwrap_or(false)
    }

    fn from_wire(kind: String, props: Value) -> Self {
        let props = if props.is_null() { Value::Object(Map::new()) } else { props };
        let parsed = match ElementKind::from_wire(&kind) {
            Some(ElementKind::Text) => read_props(&props, |p: &mut TextProps| &mut p.extra).map(Self::Text),
            Some(ElementKind::Image) => read_props(&props, |p: &mut ImageProps| &mut p.extra).map(Self::Image),
            Some(ElementKind::QrCode) => read_props(&props, |p: &mut CodeProps| &mut p.extra).map(Self::QrCode),
            Some(ElementKind::Barcode) => read_props(&props, |p: &mut CodeProps| &mut p.extra).map(Self::Barcode),
            Some(ElementKind::Shape) => read_props(&props, |p: &mut ShapeProps| &mut p.extra).map(Self::Shape),
            Some(ElementKind::Table) => read_props(&props, |p: &mut TableProps| &mut p.extra).map(Self::Table),
            None => return Self::Unknown { kind, props },
        };
        match parsed {
            Ok(content) => content,
            Err(_) => Self::Unknown { kind, props },
        }
    }

    fn to_wire(&self) -> Result<(String, Value), serde_json::Error> {
        let props = match self {
            Self::Text(p) => write_props(p, |p| &mut p.extra)?,
            Self::Image(p) => write_props(p, |p| &mut p.extra)?,
            Self::QrCode(p) | Self::Barcode(p) => write_props(p, |p| &mut p.extra)?,
            Self::Shape(p) => write_props(p, |p| &mut p.extra)?,
            Self::Table(p) => write_props(p, |p| &mut p.extra)?,
            Self::Unknown { props, .. } => props.clone(),
        };
        Ok((self.kind_name().to_owned(), props))
    }
}

/// Decode a props object. Keys sent as `null` skip the typed fields and land
/// in `extra`, so they are written back as `null`.
fn read_props<P, F>(props: &Value, extra: F) -> Result<P, serde_json::Error>
where
    P: serde::de::DeserializeOwned,
    F: FnOnce(&mut P) -> &mut Map<String, Value>,
{
    let Value::Object(map) = props else {
        return serde_json::from_value(props.clone());
    };
    let (nulls, present): (Map<String, Value>, Map<String, Value>) =
        map.iter().map(|(k, v)| (k.clone(), v.clone())).partition(|(_, v)| v.is_null());
    let mut parsed: P = serde_json::from_value(Value::Object(present))?;
    extra(&mut parsed).extend(nulls);
    Ok(parsed)
}

/// Encode a props struct. A parked `null` is only written while the typed
/// field it stands for is still unset.
fn write_props<P, F>(props: &P, extra: F) -> Result<Value, serde_json::Error>
where
    P: Serialize + Clone,
    F: FnOnce(&mut P) -> &mut Map<String, Value>,
{
    let mut typed = props.clone();
    let parked = extra(&mut typed);
    let nulls: Vec<String> = parked.iter().filter(|(_, v)| v.is_null()).map(|(k, _)| k.clone()).collect();
    parked.retain(|_, v| !v.is_null());
    let mut value = serde_json::to_value(&typed)?;
    if let Value::Object(map) = &mut value {
        for key in nulls {
            map.entry(key).or_insert(Value::Null);
        }
    }
    Ok(value)
}

/// A positioned visual unit on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireElement", into = "WireElement")]
pub struct CardElement {
    /// Unique within its page; the selection key.
    pub id: String,
    /// Left edge in layout units.
    pub x: f64,
    /// Top edge in layout units.
    pub y: f64,
    /// Explicit width; TEXT may leave it unset.
    pub width: Option<f64>,
    /// Explicit height; TEXT may leave it unset.
    pub height: Option<f64>,
    /// Type tag and typed props.
    pub content: ElementContent,
    /// Element-level keys this editor does not interpret.
    pub extra: Map<String, Value>,
}

/// On-the-wire shape of an element, before typing the props bag.
#[allow(clippy::option_option)]
#[derive(Clone, Serialize, Deserialize)]
struct WireElement {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, serialize_with = "number")]
    x: f64,
    #[serde(default, serialize_with = "number")]
    y: f64,
    /// Outer `None` is an absent key, inner `None` an explicit `null`.
    #[serde(default, deserialize_with = "present", serialize_with = "nullable_number", skip_serializing_if = "Option::is_none")]
    width: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present", serialize_with = "nullable_number", skip_serializing_if = "Option::is_none")]
    height: Option<Option<f64>>,
    #[serde(default)]
    props: Value,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TryFrom<WireElement> for CardElement {
    type Error = serde_json::Error;

    fn try_from(wire: WireElement) -> Result<Self, Self::Error> {
        let mut extra = wire.extra;
        let width = park_null(&mut extra, "width", wire.width);
        let height = park_null(&mut extra, "height", wire.height);
        Ok(Self {
            id: wire.id,
            x: wire.x,
            y: wire.y,
            width,
            height,
            content: ElementContent::from_wire(wire.kind, wire.props),
            extra,
        })
    }
}

impl From<CardElement> for WireElement {
    fn from(element: CardElement) -> Self {
        // Typed props always encode; a failure here would mean a non-finite
        // float, which the wire format cannot carry anyway.
        let (kind, props) = match element.content.to_wire() {
            Ok(pair) => pair,
            Err(_) => (element.content.kind_name().to_owned(), Value::Object(Map::new())),
        };
        let mut extra = element.extra;
        let width = unpark_null(&mut extra, "width", element.width);
        let height = unpark_null(&mut extra, "height", element.height);
        Self { id: element.id, kind, x: element.x, y: element.y, width, height, props, extra }
    }
}

#[allow(clippy::option_option)]
fn park_null(extra: &mut Map<String, Value>, key: &str, wire: Option<Option<f64>>) -> Option<f64> {
    if wire == Some(None) {
        extra.insert(key.to_owned(), Value::Null);
    }
    wire.flatten()
}

#[allow(clippy::option_option)]
fn unpark_null(extra: &mut Map<String, Value>, key: &str, value: Option<f64>) -> Option<Option<f64>> {
    let parked = extra.remove(key).is_some_and(|v| v.is_null());
    match value {
        Some(v) => Some(Some(v)),
        None if parked => Some(None),
        None => None,
    }
}

// =============================================================
// Number encoding
// =============================================================

/// Largest integer an IEEE double holds exactly.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Whole values are written as integers (`340`, not `340.0`), matching what
/// the admin backend sends.
fn write_number<S: Serializer>(value: f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER {
        #[allow(clippy::cast_possible_truncation)]
        let whole = value as i64;
        serializer.serialize_i64(whole)
    } else {
        serializer.serialize_f64(value)
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    write_number(*value, serializer)
}

#[allow(clippy::ref_option)]
fn optional_number<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => write_number(*v, serializer),
        None => serializer.serialize_none(),
    }
}

#[allow(clippy::ref_option, clippy::option_option)]
fn nullable_number<S: Serializer>(value: &Option<Option<f64>>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(Some(v)) => write_number(*v, serializer),
        _ => serializer.serialize_none(),
    }
}

/// Distinguishes a present `null` from an absent key.
#[allow(clippy::option_option)]
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl CardElement {
    /// A new element with the given geometry. Non-text kinds get the default
    /// size when none is supplied.
    #[must_use]
    pub fn new(id: impl Into<String>, content: ElementContent, x: f64, y: f64) -> Self {
        let (width, height) = if matches!(content, ElementContent::Text(_)) {
            (None, None)
        } else {
            (Some(DEFAULT_ELEMENT_SIZE), Some(DEFAULT_ELEMENT_SIZE))
        };
        Self { id: id.into(), x, y, width, height, content, extra: Map::new() }
    }

    /// Builder-style explicit size.
    #[must_use]
    pub fn sized(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Wire type name.
    #[must_use]
    pub fn kind_name(&self) -> &str {
        self.content.kind_name()
    }

    /// Whether resizes keep the starting aspect ratio.
    #[must_use]
    pub fn lock_aspect_ratio(&self) -> bool {
        self.content.lock_aspect_ratio()
    }

    /// Effective size: explicit values, the default for boxed kinds, or an
    /// estimate from the design label for auto-sized text.
    #[must_use]
    pub fn resolved_size(&self) -> (f64, f64) {
        match &self.content {
            ElementContent::Text(props) => self.size_for_label(&props.design_label()),
            _ => (
                self.width.unwrap_or(DEFAULT_ELEMENT_SIZE),
                self.height.unwrap_or(DEFAULT_ELEMENT_SIZE),
            ),
        }
    }

    /// Size when `label` is the text actually drawn. Explicit values win;
    /// auto-sized text is estimated from `label` at its font size.
    #[must_use]
    pub fn size_for_label(&self, label: &str) -> (f64, f64) {
        let font_size = match &self.content {
            ElementContent::Text(props) => props.font_size(),
            _ => return self.resolved_size(),
        };
        let (ew, eh) = estimate_text_size(label, font_size);
        (self.width.unwrap_or(ew), self.height.unwrap_or(eh))
    }

    /// Bounding box in layout units.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        let (w, h) = self.resolved_size();
        Rect::new(self.x, self.y, w, h)
    }

    /// Bounding box when `label` is the text actually drawn.
    #[must_use]
    pub fn bounds_for_label(&self, label: &str) -> Rect {
        let (w, h) = self.size_for_label(label);
        Rect::new(self.x, self.y, w, h)
    }

    /// A copy moved to a new origin.
    #[must_use]
    pub fn with_position(&self, x: f64, y: f64) -> Self {
        Self { x, y, ..self.clone() }
    }

    /// A copy with a new origin and explicit size.
    #[must_use]
    pub fn with_geometry(&self, rect: Rect) -> Self {
        Self {
            x: rect.x,
            y: rect.y,
            width: Some(rect.width),
            height: Some(rect.height),
            ..self.clone()
        }
    }

    /// A copy with replaced props. Layout edits reject content of another
    /// type; see [`LayoutDefinition::with_element_replaced`].
    #[must_use]
    pub fn with_content(&self, content: ElementContent) -> Self {
        Self { content, ..self.clone() }
    }
}

/// Rough single-line text box for a label at the given font size.
#[must_use]
pub fn estimate_text_size(label: &str, font_size: f64) -> (f64, f64) {
    #[allow(clippy::cast_precision_loss)]
    let chars = label.chars().count().max(1) as f64;
    (chars * font_size * GLYPH_ADVANCE_RATIO, font_size * LINE_HEIGHT_RATIO)
}
