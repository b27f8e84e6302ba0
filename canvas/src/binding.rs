//! Data bindings: the symbolic member/plan fields a card element can show.
//!
//! Elements reference a binding by key (`props.binding`). At render time the
//! key is looked up in a caller-supplied [`DataMap`] holding either real member
//! data or the sample set from [`sample_data`].

#[cfg(test)]
#[path = "binding_test.rs"]
mod binding_test;

use std::collections::BTreeMap;

use crate::doc::{CodeProps, TextProps};

/// Field values keyed by binding name.
pub type DataMap = BTreeMap<String, String>;

/// Text shown when an element has neither data, literal text nor a binding.
pub const PLACEHOLDER_TEXT: &str = "Text";

/// The closed set of bindable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataBinding {
    MemberFullName,
    MemberId,
    CardNumber,
    PlanName,
    PolicyNumber,
    InsurerName,
    EmployerName,
    DateOfBirth,
    ExpiryDate,
    NetworkName,
    QrUrl,
    Hotline,
    EmergencyContact,
}

impl DataBinding {
    /// Every binding, in picker order.
    pub const ALL: [Self; 13] = [
        Self::MemberFullName,
        Self::MemberId,
        Self::CardNumber,
        Self::PlanName,
        Self::PolicyNumber,
        Self::InsurerName,
        Self::EmployerName,
        Self::DateOfBirth,
        Self::ExpiryDate,
        Self::NetworkName,
        Self::QrUrl,
        Self::Hotline,
        Self::EmergencyContact,
    ];

    /// Key stored in `props.binding` and used in data maps.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::MemberFullName => "MEMBER_FULL_NAME",
            Self::MemberId => "MEMBER_ID",
            Self::CardNumber => "CARD_NUMBER",
            Self::PlanName => "PLAN_NAME",
            Self::PolicyNumber => "POLICY_NUMBER",
            Self::InsurerName => "INSURER_NAME",
            Self::EmployerName => "EMPLOYER_NAME",
            Self::DateOfBirth => "DATE_OF_BIRTH",
            Self::ExpiryDate => "EXPIRY_DATE",
            Self::NetworkName => "NETWORK_NAME",
            Self::QrUrl => "QR_URL",
            Self::Hotline => "HOTLINE",
            Self::EmergencyContact => "EMERGENCY_CONTACT",
        }
    }

    /// Human label for pickers.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::MemberFullName => "Member full name",
            Self::MemberId => "Member ID",
            Self::CardNumber => "Card number",
            Self::PlanName => "Plan name",
            Self::PolicyNumber => "Policy number",
            Self::InsurerName => "Insurer name",
            Self::EmployerName => "Employer name",
            Self::DateOfBirth => "Date of birth",
            Self::ExpiryDate => "Expiry date",
            Self::NetworkName => "Network name",
            Self::QrUrl => "QR URL",
            Self::Hotline => "Hotline",
            Self::EmergencyContact => "Emergency contact",
        }
    }

    /// Value used in previews when no real member data is supplied.
    #[must_use]
    pub fn sample(self) -> &'static str {
        match self {
            Self::MemberFullName => "Ahmed Ali Mohammed",
            Self::MemberId => "MBR-000123",
            Self::CardNumber => "1234 5678 9012 3456",
            Self::PlanName => "Gold Family Plan",
            Self::PolicyNumber => "POL-2024-0042",
            Self::InsurerName => "Example Health Insurance",
            Self::EmployerName => "Acme Trading LLC",
            Self::DateOfBirth => "1985-04-12",
            Self::ExpiryDate => "2026-12-31",
            Self::NetworkName => "Network A",
            Self::QrUrl => "https://members.example.com/card/MBR-000123",
            Self::Hotline => "800-123-4567",
            Self::EmergencyContact => "Emergency: 999",
        }
    }

    /// Look up a binding by key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.key() == key)
    }
}

/// The full sample data set.
#[must_use]
pub fn sample_data() -> DataMap {
    DataBinding::ALL
        .into_iter()
        .map(|b| (b.key().to_owned(), b.sample().to_owned()))
        .collect()
}

/// Resolve the text a TEXT element displays.
///
/// Order: data value for the binding → literal text → binding name → placeholder.
#[must_use]
pub fn resolve_text(props: &TextProps, data: &DataMap) -> String {
    resolve(props.binding.as_deref(), props.text.as_deref(), data)
}

/// Resolve the value a QR code or barcode encodes.
#[must_use]
pub fn resolve_code(props: &CodeProps, data: &DataMap) -> String {
    resolve(props.binding.as_deref(), props.value.as_deref(), data)
}

fn resolve(binding: Option<&str>, literal: Option<&str>, data: &DataMap) -> String {
    let binding = binding.filter(|b| !b.is_empty());
    if let Some(value) = binding.and_then(|b| data.get(b)) {
        return value.clone();
    }
    if let Some(text) = literal.filter(|t| !t.is_empty()) {
        return text.to_owned();
    }
    binding.unwrap_or(PLACEHOLDER_TEXT).to_owned()
}
