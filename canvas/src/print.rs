//! Print/export document generation.
//!
//! Produces a standalone HTML document (inline CSS, one `.card` block per page)
//! sized to the physical ID-1 card (85.6mm × 53.98mm) regardless of the logical
//! `cardSize`. Element positions and sizes are expressed as percentages of the
//! card, so the layout scales to the physical page; left/top are clamped to
//! keep editor-placed elements from bleeding off the card.

#[cfg(test)]
#[path = "print_test.rs"]
mod print_test;

use crate::binding::{self, DataMap};
use crate::consts::{PRINT_CARD_HEIGHT_MM, PRINT_CARD_WIDTH_MM, PRINT_MAX_LEFT_PCT, PRINT_MAX_TOP_PCT};
use crate::doc::{CardElement, CardPage, CardSize, CodeProps, ElementContent, ImageProps, LayoutDefinition, ShapeProps, TableProps, TextAlign, TextProps};
use crate::media;
use crate::pattern::{self, QR_MODULES};

/// Knobs for the generated document.
#[derive(Debug, Clone)]
pub struct PrintOptions {
    /// Document title.
    pub title: String,
    /// Open the print dialog as soon as the document loads.
    pub auto_print: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self { title: "Card preview".to_owned(), auto_print: false }
    }
}

/// Escape text for HTML content and double-quoted attributes.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Percentage box of an element on the card, with the print safety clamp applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Map an element's layout box to card percentages.
#[must_use]
pub fn percent_box(element: &CardElement, card: &CardSize) -> PercentBox {
    let (w, h) = element.resolved_size();
    PercentBox {
        left: (element.x / card.width * 100.0).clamp(0.0, PRINT_MAX_LEFT_PCT),
        top: (element.y / card.height * 100.0).clamp(0.0, PRINT_MAX_TOP_PCT),
        width: w / card.width * 100.0,
        height: h / card.height * 100.0,
    }
}

/// Layout units to millimetres on the printed card.
fn mm_per_unit(card: &CardSize) -> f64 {
    PRINT_CARD_WIDTH_MM / card.width
}

/// The full standalone print document for every page of the layout.
#[must_use]
pub fn document(layout: &LayoutDefinition, data: &DataMap, options: &PrintOptions) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(&options.title)));
    html.push_str("<style>\n");
    html.push_str(&stylesheet());
    html.push_str("</style>\n</head>\n<body>\n");
    for page in &layout.pages {
        html.push_str(&card_html(page, &layout.card_size, data));
    }
    if options.auto_print {
        html.push_str("<script>window.addEventListener('load', function () { window.print(); });</script>\n");
    }
    html.push_str("</body>\n</html>\n");
    html
}

fn stylesheet() -> String {
    let (w, h) = (PRINT_CARD_WIDTH_MM, PRINT_CARD_HEIGHT_MM);
    format!(
        "@page {{ size: {w}mm {h}mm; margin: 0; }}\n\
         html, body {{ margin: 0; padding: 0; }}\n\
         .card {{ position: relative; width: {w}mm; height: {h}mm; overflow: hidden; border-radius: 3mm; \
         page-break-after: always; break-after: page; -webkit-print-color-adjust: exact; print-color-adjust: exact; }}\n\
         .card:last-child {{ page-break-after: auto; break-after: auto; }}\n\
         .el {{ position: absolute; box-sizing: border-box; }}\n\
         .text {{ white-space: nowrap; overflow: hidden; line-height: 1.2; }}\n\
         .placeholder {{ display: flex; align-items: center; justify-content: center; font: bold 2mm sans-serif; \
         color: #4F46E5; background: #EEF2FF; border: 0.2mm solid #A5B4FC; }}\n\
         .unknown {{ border: 0.2mm dashed #9CA3AF; color: #6B7280; font: 2mm sans-serif; \
         display: flex; align-items: center; justify-content: center; }}\n\
         table.el {{ border-collapse: collapse; table-layout: fixed; }}\n\
         table.el td, table.el th {{ border: 0.2mm solid; padding: 0 0.5mm; overflow: hidden; white-space: nowrap; }}\n"
    )
}

/// One `.card` block for a page.
#[must_use]
pub fn card_html(page: &CardPage, card: &CardSize, data: &DataMap) -> String {
    let mut html = format!(
        "<div class=\"card\" data-page=\"{}\" style=\"background-color: {}\">\n",
        escape_html(&page.name),
        escape_html(&page.background_color)
    );
    for element in &page.elements {
        html.push_str(&element_html(element, card, data));
        html.push('\n');
    }
    html.push_str("</div>\n");
    html
}

fn box_style(b: PercentBox, sized: bool) -> String {
    if sized {
        format!(
            "left: {:.3}%; top: {:.3}%; width: {:.3}%; height: {:.3}%;",
            b.left, b.top, b.width, b.height
        )
    } else {
        format!("left: {:.3}%; top: {:.3}%;", b.left, b.top)
    }
}

/// HTML for one element.
#[must_use]
pub fn element_html(element: &CardElement, card: &CardSize, data: &DataMap) -> String {
    let b = percent_box(element, card);
    let mm = mm_per_unit(card);
    match &element.content {
        ElementContent::Text(props) => text_html(element, props, b, mm, data),
        ElementContent::Image(props) => image_html(props, b, mm),
        ElementContent::QrCode(props) => qr_html(props, b, data),
        ElementContent::Barcode(props) => barcode_html(props, b, data),
        ElementContent::Shape(props) => shape_html(props, b, mm),
        ElementContent::Table(props) => table_html(props, b, mm),
        ElementContent::Unknown { kind, .. } => format!(
            "<div class=\"el unknown\" style=\"{}\">{}</div>",
            box_style(b, true),
            escape_html(kind)
        ),
    }
}

fn text_html(element: &CardElement, props: &TextProps, b: PercentBox, mm: f64, data: &DataMap) -> String {
    let align = match props.align() {
        TextAlign::Left => "left",
        TextAlign::Center => "center",
        TextAlign::Right => "right",
    };
    let sized = element.width.is_some() && element.height.is_some();
    let style = format!(
        "{} font-size: {:.3}mm; font-weight: {}; font-family: {}; color: {}; text-align: {align};",
        box_style(b, sized),
        props.font_size() * mm,
        props.font_weight(),
        props.font_family(),
        props.color(),
    );
    format!(
        "<div class=\"el text\" style=\"{}\">{}</div>",
        escape_html(&style),
        escape_html(&binding::resolve_text(props, data))
    )
}

fn image_html(props: &ImageProps, b: PercentBox, mm: f64) -> String {
    let source = props.source.as_deref().unwrap_or("");
    let radius = props.border_radius.unwrap_or(0.0) * mm;
    if media::is_data_uri(source) {
        let style = format!("{} object-fit: {}; border-radius: {radius:.3}mm;", box_style(b, true), props.fit().as_css());
        return format!("<img class=\"el\" alt=\"\" src=\"{}\" style=\"{}\">", escape_html(source), escape_html(&style));
    }
    let text = media::source_label(source).unwrap_or("IMAGE");
    format!(
        "<div class=\"el placeholder\" style=\"{} border-radius: {radius:.3}mm;\">{}</div>",
        box_style(b, true),
        escape_html(text)
    )
}

#[allow(clippy::cast_precision_loss)]
fn qr_html(props: &CodeProps, b: PercentBox, data: &DataMap) -> String {
    let value = binding::resolve_code(props, data);
    let mut svg = format!(
        "<svg class=\"el\" style=\"{}\" viewBox=\"0 0 {n} {n}\" preserveAspectRatio=\"xMidYMid meet\" shape-rendering=\"crispEdges\">\
         <rect width=\"{n}\" height=\"{n}\" fill=\"{}\"/>",
        box_style(b, true),
        escape_html(props.background_color()),
        n = QR_MODULES,
    );
    for (row, col) in pattern::qr_modules(&value) {
        svg.push_str(&format!("<rect x=\"{col}\" y=\"{row}\" width=\"1\" height=\"1\" fill=\"{}\"/>", escape_html(props.color())));
    }
    svg.push_str("</svg>");
    svg
}

fn barcode_html(props: &CodeProps, b: PercentBox, data: &DataMap) -> String {
    let value = binding::resolve_code(props, data);
    let bars = pattern::barcode_bars(&value);
    let total: u32 = bars.iter().map(|w| u32::from(*w)).sum();
    let mut svg = format!(
        "<svg class=\"el\" style=\"{}\" viewBox=\"0 0 {total} 10\" preserveAspectRatio=\"none\" shape-rendering=\"crispEdges\">\
         <rect width=\"{total}\" height=\"10\" fill=\"{}\"/>",
        box_style(b, true),
        escape_html(props.background_color()),
    );
    let mut x = 0u32;
    for (i, width) in bars.iter().enumerate() {
        if i % 2 == 0 {
            svg.push_str(&format!("<rect x=\"{x}\" y=\"0\" width=\"{width}\" height=\"10\" fill=\"{}\"/>", escape_html(props.color())));
        }
        x += u32::from(*width);
    }
    svg.push_str("</svg>");
    svg
}

fn shape_html(props: &ShapeProps, b: PercentBox, mm: f64) -> String {
    let radius = if props.is_circle() {
        "50%".to_owned()
    } else {
        format!("{:.3}mm", props.border_radius.unwrap_or(0.0) * mm)
    };
    let style = format!(
        "{} background-color: {}; border: {:.3}mm solid {}; border-radius: {radius};",
        box_style(b, true),
        props.fill_color(),
        props.border_width() * mm,
        props.border_color(),
    );
    format!("<div class=\"el\" style=\"{}\"></div>", escape_html(&style))
}

fn table_html(props: &TableProps, b: PercentBox, mm: f64) -> String {
    let style = format!(
        "{} font-size: {:.3}mm; border-color: {};",
        box_style(b, true),
        props.font_size.unwrap_or(10.0) * mm,
        props.border_color(),
    );
    let mut html = format!("<table class=\"el\" style=\"{}\">", escape_html(&style));
    for row in 0..props.rows() as usize {
        html.push_str("<tr>");
        let header = row == 0 && props.show_header();
        for col in 0..props.columns() as usize {
            let cell = escape_html(props.cell(row, col));
            if header {
                html.push_str(&format!(
                    "<th style=\"background-color: {}; border-color: {}\">{cell}</th>",
                    escape_html(props.header_background()),
                    escape_html(props.border_color())
                ));
            } else {
                html.push_str(&format!("<td style=\"border-color: {}\">{cell}</td>", escape_html(props.border_color())));
            }
        }
        html.push_str("</tr>");
    }
    html.push_str("</table>");
    html
}
