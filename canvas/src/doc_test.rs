#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;

// =============================================================
// Helpers
// =============================================================

fn shape(id: &str, x: f64, y: f64) -> CardElement {
    CardElement::new(id, ElementContent::default_for(ElementKind::Shape), x, y)
}

fn text(id: &str, literal: &str) -> CardElement {
    let content = ElementContent::Text(TextProps { text: Some(literal.to_owned()), ..TextProps::default() });
    CardElement::new(id, content, 0.0, 0.0)
}

fn layout_with(ids: &[&str]) -> LayoutDefinition {
    let mut layout = LayoutDefinition::blank(CardSize::default());
    for id in ids {
        layout = layout.with_element_added(0, shape(id, 0.0, 0.0)).unwrap();
    }
    layout
}

fn ids(layout: &LayoutDefinition, page: usize) -> Vec<&str> {
    layout.pages[page].elements.iter().map(|e| e.id.as_str()).collect()
}

const SAMPLE: &str = r##"{
  "version": 1,
  "cardSize": {"width": 340, "height": 214},
  "theme": {"accent": "#0EA5E9"},
  "pages": [
    {
      "name": "front",
      "backgroundColor": "#F8FAFC",
      "printBleed": 2,
      "elements": [
        {"id": "member_name", "type": "TEXT", "x": 20, "y": 96,
         "props": {"binding": "MEMBER_FULL_NAME", "fontSize": 16, "fontWeight": "bold", "letterSpacing": 0.5}},
        {"id": "logo", "type": "IMAGE", "x": 20, "y": 16, "width": 85, "height": 40,
         "props": {"source": "COMPANY_LOGO", "objectFit": "contain", "lockAspectRatio": true}},
        {"id": "seal", "type": "HOLOGRAM", "x": 250, "y": 150, "width": 60, "height": 40,
         "props": {"foil": "silver", "angle": 45}, "locked": true},
        {"id": "qr", "type": "QRCODE", "x": 220, "y": 16, "width": 100, "height": 100,
         "props": {"binding": "QR_URL"}}
      ]
    }
  ]
}"##;

// =============================================================
// Serialization
// =============================================================

#[test]
fn parse_sample_layout() {
    let layout = LayoutDefinition::from_json(SAMPLE).unwrap();
    assert_eq!(layout.version, 1);
    assert_eq!(layout.card_size, CardSize::new(340.0, 214.0));
    assert_eq!(layout.pages.len(), 1);
    let page = &layout.pages[0];
    assert_eq!(page.background_color, "#F8FAFC");
    assert_eq!(ids(&layout, 0), vec!["member_name", "logo", "seal", "qr"]);
    assert!(matches!(page.elements[0].content, ElementContent::Text(_)));
    assert!(matches!(page.elements[1].content, ElementContent::Image(_)));
    assert!(matches!(page.elements[3].content, ElementContent::QrCode(_)));
}

#[test]
fn round_trip_is_byte_identical() {
    let layout = LayoutDefinition::from_json(SAMPLE).unwrap();
    let first = layout.to_json().unwrap();
    let second = LayoutDefinition::from_json(&first).unwrap().to_json().unwrap();
    assert_eq!(first, second);
}

#[test]
fn pretty_round_trip_is_byte_identical() {
    let layout = LayoutDefinition::from_json(SAMPLE).unwrap();
    let first = layout.to_json_pretty().unwrap();
    let second = LayoutDefinition::from_json(&first).unwrap().to_json_pretty().unwrap();
    assert_eq!(first, second);
}

/// Shaped like a stored backend document: whole numbers without a fraction,
/// explicit nulls, and extra keys inside `cardSize`.
const BACKEND: &str = r##"{"version":1,"cardSize":{"width":340,"height":214,"unit":"px"},"pages":[{"name":"front","backgroundColor":"#FFFFFF","elements":[{"id":"member_name","type":"TEXT","x":20,"y":96,"width":null,"props":{"binding":"MEMBER_FULL_NAME","color":null,"fontSize":16,"text":null}},{"id":"logo","type":"IMAGE","x":20.5,"y":16,"width":85,"height":40,"props":{"borderRadius":null,"objectFit":"contain","source":"COMPANY_LOGO"},"locked":true}]}],"theme":"gold"}"##;

#[test]
fn backend_document_round_trips_byte_identical() {
    let layout = LayoutDefinition::from_json(BACKEND).unwrap();
    assert_eq!(layout.to_json().unwrap(), BACKEND);
}

#[test]
fn card_size_keeps_unknown_keys() {
    let layout = LayoutDefinition::from_json(BACKEND).unwrap();
    assert_eq!(layout.card_size.width, 340.0);
    assert_eq!(layout.card_size.extra["unit"], json!("px"));
    let value: Value = serde_json::from_str(&layout.to_json().unwrap()).unwrap();
    assert_eq!(value["cardSize"], json!({"width": 340, "height": 214, "unit": "px"}));
}

#[test]
fn whole_numbers_are_written_without_fraction() {
    let layout = layout_with(&["a"]);
    let moved = layout.pages[0].elements[0].with_position(12.0, 7.25);
    let json = layout.with_element_replaced(0, moved).unwrap().to_json().unwrap();
    assert!(json.contains(r#""x":12,"y":7.25,"width":100,"height":100"#), "{json}");
    assert!(json.contains(r#""cardSize":{"width":340,"height":214}"#), "{json}");
}

#[test]
fn explicit_null_props_are_kept_while_unset() {
    let json = r#"{"pages":[{"name":"front","elements":[
        {"id":"t","type":"TEXT","x":0,"y":0,"props":{"text":"Hi","binding":null}}
    ]}]}"#;
    let layout = LayoutDefinition::from_json(json).unwrap();
    let element = &layout.pages[0].elements[0];
    let ElementContent::Text(props) = &element.content else {
        panic!("expected text content, got {:?}", element.content);
    };
    assert_eq!(props.binding, None);
    let value: Value = serde_json::from_str(&layout.to_json().unwrap()).unwrap();
    assert_eq!(value["pages"][0]["elements"][0]["props"], json!({"binding": null, "text": "Hi"}));

    let bound = TextProps { binding: Some("PLAN_NAME".into()), ..props.clone() };
    let edited = layout.with_element_replaced(0, element.with_content(ElementContent::Text(bound))).unwrap();
    let out = edited.to_json().unwrap();
    assert_eq!(out.matches("\"binding\"").count(), 1, "{out}");
    let value: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["pages"][0]["elements"][0]["props"]["binding"], json!("PLAN_NAME"));
}

#[test]
fn explicit_null_size_is_kept_until_resized() {
    let layout = LayoutDefinition::from_json(BACKEND).unwrap();
    let name = layout.pages[0].element("member_name").unwrap();
    assert_eq!(name.width, None);
    let value: Value = serde_json::from_str(&layout.to_json().unwrap()).unwrap();
    let element = &value["pages"][0]["elements"][0];
    assert_eq!(element["width"], Value::Null);
    assert!(element.get("height").is_none());

    let resized = name.with_geometry(Rect::new(20.0, 96.0, 150.0, 22.0));
    let out = layout.with_element_replaced(0, resized).unwrap().to_json().unwrap();
    assert!(out.contains(r#""x":20,"y":96,"width":150,"height":22,"props""#), "{out}");
}

#[test]
fn unknown_keys_survive_round_trip() {
    let layout = LayoutDefinition::from_json(SAMPLE).unwrap();
    let value: Value = serde_json::from_str(&layout.to_json().unwrap()).unwrap();
    assert_eq!(value["theme"], json!({"accent": "#0EA5E9"}));
    assert_eq!(value["pages"][0]["printBleed"], json!(2));
    assert_eq!(value["pages"][0]["elements"][0]["props"]["letterSpacing"], json!(0.5));
    assert_eq!(value["pages"][0]["elements"][2]["locked"], json!(true));
}

#[test]
fn unknown_element_type_is_preserved_verbatim() {
    let layout = LayoutDefinition::from_json(SAMPLE).unwrap();
    let seal = layout.pages[0].element("seal").unwrap();
    match &seal.content {
        ElementContent::Unknown { kind, props } => {
            assert_eq!(kind, "HOLOGRAM");
            assert_eq!(props, &json!({"foil": "silver", "angle": 45}));
        }
        other => panic!("expected unknown content, got {other:?}"),
    }
    let value: Value = serde_json::from_str(&layout.to_json().unwrap()).unwrap();
    assert_eq!(value["pages"][0]["elements"][2]["type"], json!("HOLOGRAM"));
    assert_eq!(value["pages"][0]["elements"][2]["props"], json!({"foil": "silver", "angle": 45}));
}

#[test]
fn unreadable_known_props_degrade_to_unknown() {
    let json = r#"{"pages":[{"name":"front","elements":[
        {"id":"t","type":"TEXT","x":0,"y":0,"props":{"fontSize":"huge"}}
    ]}]}"#;
    let layout = LayoutDefinition::from_json(json).unwrap();
    let element = &layout.pages[0].elements[0];
    assert!(matches!(&element.content, ElementContent::Unknown { kind, .. } if kind == "TEXT"));
    assert_eq!(element.kind_name(), "TEXT");
    let value: Value = serde_json::from_str(&layout.to_json().unwrap()).unwrap();
    assert_eq!(value["pages"][0]["elements"][0]["props"]["fontSize"], json!("huge"));
}

#[test]
fn missing_pages_and_elements_default_to_empty() {
    let layout = LayoutDefinition::from_json(r#"{"cardSize":{"width":300,"height":189}}"#).unwrap();
    assert!(layout.pages.is_empty());
    assert_eq!(layout.version, LAYOUT_VERSION);

    let layout = LayoutDefinition::from_json(r#"{"pages":[{"name":"front"}]}"#).unwrap();
    assert!(layout.pages[0].elements.is_empty());
    assert_eq!(layout.pages[0].background_color, "#FFFFFF");
    assert_eq!(layout.card_size, CardSize::default());
}

#[test]
fn missing_props_become_defaults() {
    let layout =
        LayoutDefinition::from_json(r#"{"pages":[{"name":"front","elements":[{"id":"s","type":"SHAPE","x":1,"y":2}]}]}"#)
            .unwrap();
    assert!(matches!(layout.pages[0].elements[0].content, ElementContent::Shape(_)));
}

#[test]
fn text_without_size_omits_width_and_height() {
    let layout = LayoutDefinition::blank(CardSize::default()).with_element_added(0, text("t", "Hi")).unwrap();
    let value: Value = serde_json::from_str(&layout.to_json().unwrap()).unwrap();
    let element = &value["pages"][0]["elements"][0];
    assert!(element.get("width").is_none());
    assert!(element.get("height").is_none());
    assert_eq!(element["type"], json!("TEXT"));
}

#[test]
fn invalid_json_is_an_error() {
    assert!(matches!(LayoutDefinition::from_json("{not json"), Err(LayoutError::Json(_))));
}

#[test]
fn from_value_matches_from_json() {
    let value: Value = serde_json::from_str(SAMPLE).unwrap();
    assert_eq!(LayoutDefinition::from_value(value).unwrap(), LayoutDefinition::from_json(SAMPLE).unwrap());
}

// =============================================================
// Element mutations
// =============================================================

#[test]
fn add_appends_on_top() {
    let layout = layout_with(&["a", "b"]);
    assert_eq!(ids(&layout, 0), vec!["a", "b"]);
}

#[test]
fn add_does_not_touch_original() {
    let before = layout_with(&["a"]);
    let after = before.with_element_added(0, shape("b", 0.0, 0.0)).unwrap();
    assert_eq!(ids(&before, 0), vec!["a"]);
    assert_eq!(ids(&after, 0), vec!["a", "b"]);
}

#[test]
fn add_rejects_duplicate_id() {
    let layout = layout_with(&["a"]);
    assert!(matches!(
        layout.with_element_added(0, shape("a", 5.0, 5.0)),
        Err(LayoutError::DuplicateElementId(id)) if id == "a"
    ));
}

#[test]
fn add_rejects_missing_page() {
    let layout = layout_with(&[]);
    assert!(matches!(
        layout.with_element_added(3, shape("a", 0.0, 0.0)),
        Err(LayoutError::PageOutOfRange { index: 3, len: 1 })
    ));
}

#[test]
fn replace_keeps_z_position() {
    let layout = layout_with(&["a", "b", "c"]);
    let moved = layout.pages[0].elements[1].with_position(40.0, 50.0);
    let next = layout.with_element_replaced(0, moved).unwrap();
    assert_eq!(ids(&next, 0), vec!["a", "b", "c"]);
    let b = next.pages[0].element("b").unwrap();
    assert_eq!((b.x, b.y), (40.0, 50.0));
}

#[test]
fn replace_missing_element_fails() {
    let layout = layout_with(&["a"]);
    assert!(matches!(
        layout.with_element_replaced(0, shape("zzz", 0.0, 0.0)),
        Err(LayoutError::ElementNotFound(_))
    ));
}

#[test]
fn replace_rejects_type_change() {
    let layout = layout_with(&["a"]);
    let as_text = layout.pages[0].elements[0].with_content(ElementContent::default_for(ElementKind::Text));
    assert!(matches!(
        layout.with_element_replaced(0, as_text),
        Err(LayoutError::ElementKindChanged { id, stored, requested })
            if id == "a" && stored == "SHAPE" && requested == "TEXT"
    ));
    assert_eq!(layout.pages[0].elements[0].kind_name(), "SHAPE");
}

#[test]
fn replace_keeps_unknown_type_with_same_tag() {
    let layout = LayoutDefinition::from_json(SAMPLE).unwrap();
    let seal = layout.pages[0].element("seal").unwrap().with_position(1.0, 2.0);
    let next = layout.with_element_replaced(0, seal).unwrap();
    assert_eq!(next.pages[0].element("seal").unwrap().kind_name(), "HOLOGRAM");
}

#[test]
fn remove_deletes_exactly_one() {
    let layout = layout_with(&["a", "b", "c"]);
    let (next, removed) = layout.with_element_removed(0, "b").unwrap();
    assert_eq!(removed.id, "b");
    assert_eq!(ids(&next, 0), vec!["a", "c"]);
    assert_eq!(next.pages[0].elements.len(), layout.pages[0].elements.len() - 1);
}

#[test]
fn remove_missing_element_fails() {
    let layout = layout_with(&["a"]);
    assert!(matches!(layout.with_element_removed(0, "nope"), Err(LayoutError::ElementNotFound(_))));
}

#[test]
fn restack_forward_and_backward() {
    let layout = layout_with(&["a", "b", "c"]);
    let next = layout.with_element_restacked(0, "a", ZMove::Forward).unwrap();
    assert_eq!(ids(&next, 0), vec!["b", "a", "c"]);
    let next = layout.with_element_restacked(0, "c", ZMove::Backward).unwrap();
    assert_eq!(ids(&next, 0), vec!["a", "c", "b"]);
}

#[test]
fn restack_to_front_and_back() {
    let layout = layout_with(&["a", "b", "c"]);
    let next = layout.with_element_restacked(0, "a", ZMove::ToFront).unwrap();
    assert_eq!(ids(&next, 0), vec!["b", "c", "a"]);
    let next = layout.with_element_restacked(0, "c", ZMove::ToBack).unwrap();
    assert_eq!(ids(&next, 0), vec!["c", "a", "b"]);
}

#[test]
fn restack_at_the_ends_is_a_no_op() {
    let layout = layout_with(&["a", "b"]);
    let next = layout.with_element_restacked(0, "b", ZMove::Forward).unwrap();
    assert_eq!(ids(&next, 0), vec!["a", "b"]);
    let next = layout.with_element_restacked(0, "a", ZMove::Backward).unwrap();
    assert_eq!(ids(&next, 0), vec!["a", "b"]);
}

// =============================================================
// Pages
// =============================================================

#[test]
fn add_back_page() {
    let layout = layout_with(&[]);
    assert!(layout.can_add_back_page());
    let next = layout.with_back_page().unwrap();
    assert_eq!(next.pages.len(), 2);
    assert_eq!(next.pages[1].name, "back");
    assert!(next.pages[1].elements.is_empty());
    assert!(!next.can_add_back_page());
}

#[test]
fn add_back_page_twice_fails() {
    let layout = layout_with(&[]).with_back_page().unwrap();
    assert!(matches!(layout.with_back_page(), Err(LayoutError::BackPageExists)));
}

#[test]
fn remove_back_page() {
    let layout = layout_with(&[]).with_back_page().unwrap();
    assert!(layout.can_remove_back_page());
    let next = layout.without_back_page().unwrap();
    assert_eq!(next.pages.len(), 1);
    assert_eq!(next.pages[0].name, "front");
}

#[test]
fn front_page_is_never_removed() {
    let layout = layout_with(&[]);
    assert!(!layout.can_remove_back_page());
    assert!(matches!(layout.without_back_page(), Err(LayoutError::NoBackPage)));
}

#[test]
fn page_background() {
    let layout = layout_with(&[]).with_page_background(0, "#112233").unwrap();
    assert_eq!(layout.pages[0].background_color, "#112233");
    assert!(layout.with_page_background(1, "#000").is_err());
}

// =============================================================
// Validation
// =============================================================

#[test]
fn validate_accepts_blank_layout() {
    assert!(LayoutDefinition::blank(CardSize::default()).validate().is_ok());
}

#[test]
fn validate_rejects_no_pages() {
    let layout = LayoutDefinition::from_json("{}").unwrap();
    assert!(matches!(layout.validate(), Err(LayoutError::NoPages)));
}

#[test]
fn validate_requires_front_first() {
    let layout = LayoutDefinition::from_json(r#"{"pages":[{"name":"back"}]}"#).unwrap();
    assert!(matches!(layout.validate(), Err(LayoutError::FrontPageRequired(name)) if name == "back"));
}

#[test]
fn validate_rejects_duplicate_ids() {
    let json = r#"{"pages":[{"name":"front","elements":[
        {"id":"x","type":"SHAPE","x":0,"y":0},
        {"id":"x","type":"TEXT","x":0,"y":0}
    ]}]}"#;
    let layout = LayoutDefinition::from_json(json).unwrap();
    assert!(matches!(layout.validate(), Err(LayoutError::DuplicateElementId(id)) if id == "x"));
}

#[test]
fn same_id_on_different_pages_is_fine() {
    let layout = layout_with(&["a"]).with_back_page().unwrap().with_element_added(1, shape("a", 0.0, 0.0)).unwrap();
    assert!(layout.validate().is_ok());
}

// =============================================================
// Element model
// =============================================================

#[test]
fn element_kind_wire_names() {
    for kind in ElementKind::ALL {
        assert_eq!(ElementKind::from_wire(kind.as_str()), Some(kind));
    }
    assert_eq!(ElementKind::QrCode.as_str(), "QRCODE");
    assert_eq!(ElementKind::from_wire("text"), None);
}

#[test]
fn new_element_default_sizes() {
    let t = text("t", "hello");
    assert_eq!((t.width, t.height), (None, None));
    let s = shape("s", 0.0, 0.0);
    assert_eq!((s.width, s.height), (Some(100.0), Some(100.0)));
}

#[test]
fn missing_size_on_boxed_kind_resolves_to_default() {
    let json = r#"{"pages":[{"name":"front","elements":[{"id":"i","type":"IMAGE","x":0,"y":0,"props":{}}]}]}"#;
    let layout = LayoutDefinition::from_json(json).unwrap();
    assert_eq!(layout.pages[0].elements[0].resolved_size(), (100.0, 100.0));
}

#[test]
fn text_size_is_estimated_from_label() {
    let t = text("t", "abcde");
    let (w, h) = t.resolved_size();
    assert!((w - 5.0 * 14.0 * 0.6).abs() < 1e-9);
    assert!((h - 14.0 * 1.4).abs() < 1e-9);
}

#[test]
fn explicit_text_size_wins() {
    let t = text("t", "abcde").sized(200.0, 30.0);
    assert_eq!(t.resolved_size(), (200.0, 30.0));
}

#[test]
fn with_geometry_sets_explicit_size() {
    let t = text("t", "abc").with_geometry(Rect::new(1.0, 2.0, 30.0, 40.0));
    assert_eq!((t.x, t.y, t.width, t.height), (1.0, 2.0, Some(30.0), Some(40.0)));
}

#[test]
fn design_label_fallbacks() {
    let literal = TextProps { text: Some("Hello".into()), binding: Some("PLAN_NAME".into()), ..TextProps::default() };
    assert_eq!(literal.design_label(), "Hello");
    let bound = TextProps { binding: Some("PLAN_NAME".into()), ..TextProps::default() };
    assert_eq!(bound.design_label(), "{PLAN_NAME}");
    assert_eq!(TextProps::default().design_label(), "Text");
}

#[test]
fn lock_aspect_ratio_flag() {
    let layout = LayoutDefinition::from_json(SAMPLE).unwrap();
    assert!(layout.pages[0].element("logo").unwrap().lock_aspect_ratio());
    assert!(!layout.pages[0].element("member_name").unwrap().lock_aspect_ratio());
    assert!(ElementContent::default_for(ElementKind::QrCode).lock_aspect_ratio());
}

#[test]
fn props_accessor_defaults() {
    let t = TextProps::default();
    assert_eq!(t.font_size(), 14.0);
    assert_eq!(t.align(), TextAlign::Left);
    let t = TextProps { text_align: Some("center".into()), font_size: Some(-3.0), ..TextProps::default() };
    assert_eq!(t.align(), TextAlign::Center);
    assert_eq!(t.font_size(), 14.0);

    assert_eq!(ImageProps::default().fit(), ObjectFit::Contain);
    let cover = ImageProps { object_fit: Some("cover".into()), ..ImageProps::default() };
    assert_eq!(cover.fit().as_css(), "cover");

    let table = TableProps { rows: Some(0), ..TableProps::default() };
    assert_eq!(table.rows(), 1);
    assert_eq!(table.columns(), 2);
    assert!(table.show_header());
    assert_eq!(table.cell(5, 5), "");
}
