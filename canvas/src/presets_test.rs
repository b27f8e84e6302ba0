#![allow(clippy::float_cmp)]

use super::*;
use crate::doc::ElementContent;

#[test]
fn preset_sizes() {
    assert_eq!(CardSizePreset::Standard.size(), CardSize::new(340.0, 214.0));
    assert_eq!(CardSizePreset::Large.size(), CardSize::new(428.0, 270.0));
    assert_eq!(CardSizePreset::Compact.size(), CardSize::new(300.0, 189.0));
    assert_eq!(CardSizePreset::Portrait.size(), CardSize::new(214.0, 340.0));
}

#[test]
fn standard_is_default() {
    assert_eq!(CardSizePreset::default(), CardSizePreset::Standard);
    assert_eq!(CardSizePreset::default().size(), CardSize::default());
}

#[test]
fn parse_is_case_insensitive() {
    assert_eq!("large".parse::<CardSizePreset>().unwrap(), CardSizePreset::Large);
    assert_eq!(" Portrait ".parse::<CardSizePreset>().unwrap(), CardSizePreset::Portrait);
    for preset in CardSizePreset::ALL {
        assert_eq!(preset.to_string().parse::<CardSizePreset>().unwrap(), preset);
    }
}

#[test]
fn unknown_preset_is_an_error() {
    assert!(matches!("JUMBO".parse::<CardSizePreset>(), Err(LayoutError::UnknownPreset(k)) if k == "JUMBO"));
}

#[test]
fn default_layout_has_front_and_back() {
    let layout = create_default_layout(CardSizePreset::Standard);
    assert_eq!(layout.pages.len(), 2);
    assert_eq!(layout.pages[0].name, "front");
    assert_eq!(layout.pages[1].name, "back");
    assert!(layout.validate().is_ok());
}

#[test]
fn default_front_elements() {
    let layout = create_default_layout(CardSizePreset::Standard);
    let ids: Vec<&str> = layout.pages[0].elements.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["logo", "member_name", "plan_name", "card_number", "qr_code"]);

    let logo = layout.pages[0].element("logo").unwrap();
    assert!(matches!(&logo.content, ElementContent::Image(p) if p.source.as_deref() == Some("COMPANY_LOGO")));
    let name = layout.pages[0].element("member_name").unwrap();
    assert!(matches!(&name.content, ElementContent::Text(p) if p.binding.as_deref() == Some("MEMBER_FULL_NAME")));
    let qr = layout.pages[0].element("qr_code").unwrap();
    assert!(matches!(&qr.content, ElementContent::QrCode(p) if p.binding.as_deref() == Some("QR_URL")));
    assert_eq!(qr.width, qr.height);
}

#[test]
fn default_back_elements() {
    let layout = create_default_layout(CardSizePreset::Standard);
    let bindings: Vec<Option<String>> = layout.pages[1]
        .elements
        .iter()
        .map(|e| match &e.content {
            ElementContent::Text(p) => p.binding.clone(),
            _ => None,
        })
        .collect();
    assert_eq!(bindings, vec![Some("HOTLINE".to_owned()), Some("EMERGENCY_CONTACT".to_owned())]);
}

#[test]
fn default_elements_fit_every_preset() {
    for preset in CardSizePreset::ALL {
        let layout = create_default_layout(preset);
        assert_eq!(layout.card_size, preset.size());
        for page in &layout.pages {
            for element in &page.elements {
                let b = element.bounds();
                assert!(b.x >= 0.0 && b.y >= 0.0, "{preset}: {} starts off-card", element.id);
                assert!(b.right() <= layout.card_size.width, "{preset}: {} overflows right", element.id);
                assert!(b.bottom() <= layout.card_size.height, "{preset}: {} overflows bottom", element.id);
            }
        }
    }
}
