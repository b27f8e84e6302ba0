//! Card-size presets and the starter layout seeded from them.

#[cfg(test)]
#[path = "presets_test.rs"]
mod presets_test;

use std::fmt;
use std::str::FromStr;

use serde_json::Map;

use crate::consts::{BACK_PAGE, FRONT_PAGE, LAYOUT_VERSION};
use crate::doc::{CardElement, CardPage, CardSize, CodeProps, ElementContent, ImageProps, LayoutDefinition, LayoutError, TextProps};

/// Named card dimensions offered at template creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CardSizePreset {
    /// ISO/IEC 7810 ID-1 at 4 units per millimetre.
    #[default]
    Standard,
    Large,
    Compact,
    Portrait,
}

impl CardSizePreset {
    pub const ALL: [Self; 4] = [Self::Standard, Self::Large, Self::Compact, Self::Portrait];

    /// Preset key as stored by the template API.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Standard => "STANDARD",
            Self::Large => "LARGE",
            Self::Compact => "COMPACT",
            Self::Portrait => "PORTRAIT",
        }
    }

    #[must_use]
    pub fn size(self) -> CardSize {
        match self {
            Self::Standard => CardSize::new(340.0, 214.0),
            Self::Large => CardSize::new(428.0, 270.0),
            Self::Compact => CardSize::new(300.0, 189.0),
            Self::Portrait => CardSize::new(214.0, 340.0),
        }
    }
}

impl fmt::Display for CardSizePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for CardSizePreset {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LayoutError::UnknownPreset(s.to_owned()))
    }
}

fn bound_text(binding: &str, font_size: f64, weight: Option<&str>) -> ElementContent {
    ElementContent::Text(TextProps {
        binding: Some(binding.to_owned()),
        font_size: Some(font_size),
        font_weight: weight.map(str::to_owned),
        color: Some("#1F2937".to_owned()),
        ..TextProps::default()
    })
}

/// Starter layout: logo, member name, plan, card number and QR on the front;
/// hotline and emergency contact on the back.
#[must_use]
pub fn create_default_layout(preset: CardSizePreset) -> LayoutDefinition {
    let size = preset.size();
    let (w, h) = (size.width, size.height);
    let margin = (w.min(h) * 0.075).round();
    let qr = (w.min(h) * 0.37).round();

    let front = CardPage {
        elements: vec![
            CardElement::new(
                "logo",
                ElementContent::Image(ImageProps {
                    source: Some("COMPANY_LOGO".to_owned()),
                    object_fit: Some("contain".to_owned()),
                    lock_aspect_ratio: Some(true),
                    ..ImageProps::default()
                }),
                margin,
                margin,
            )
            .sized((w * 0.25).round(), (h * 0.19).round()),
            CardElement::new("member_name", bound_text("MEMBER_FULL_NAME", 16.0, Some("bold")), margin, (h * 0.45).round()),
            CardElement::new("plan_name", bound_text("PLAN_NAME", 12.0, None), margin, (h * 0.45).round() + 26.0),
            CardElement::new("card_number", bound_text("CARD_NUMBER", 14.0, None), margin, h - margin - 24.0),
            CardElement::new(
                "qr_code",
                ElementContent::QrCode(CodeProps {
                    binding: Some("QR_URL".to_owned()),
                    lock_aspect_ratio: Some(true),
                    ..CodeProps::default()
                }),
                w - margin - qr,
                margin,
            )
            .sized(qr, qr),
        ],
        ..CardPage::new(FRONT_PAGE)
    };

    let back = CardPage {
        elements: vec![
            CardElement::new("hotline", bound_text("HOTLINE", 14.0, Some("bold")), margin, margin + 4.0),
            CardElement::new("emergency_contact", bound_text("EMERGENCY_CONTACT", 12.0, None), margin, margin + 34.0),
        ],
        ..CardPage::new(BACK_PAGE)
    };

    LayoutDefinition {
        version: LAYOUT_VERSION,
        card_size: size,
        pages: vec![front, back],
        extra: Map::new(),
    }
}
