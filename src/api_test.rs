#![allow(clippy::float_cmp)]

use super::*;
use canvas::presets::{CardSizePreset, create_default_layout};
use serde_json::json;

fn stored_template() -> serde_json::Value {
    json!({
        "id": 12,
        "planId": 7,
        "name": "Gold members",
        "description": "Front and back",
        "cardSizeKey": "STANDARD",
        "isDefault": true,
        "createdAt": "2026-01-04T09:30:00Z",
        "updatedBy": { "id": 3, "name": "admin" },
        "layoutDefinition": {
            "version": 1,
            "cardSize": { "width": 340, "height": 214 },
            "theme": "gold",
            "pages": [
                { "name": "front", "backgroundColor": "#FFFFFF", "elements": [] },
                { "name": "back", "backgroundColor": "#F3F4F6", "elements": [] }
            ]
        }
    })
}

// --- paths ---

#[test]
fn paths_follow_plan_resource_layout() {
    assert_eq!(templates_path(7), "/api/plans/7/card-templates");
    assert_eq!(template_path(7, 12), "/api/plans/7/card-templates/12");
    assert_eq!(set_default_path(7, 12), "/api/plans/7/card-templates/12/set-default");
}

// --- payloads ---

#[test]
fn create_payload_is_camel_case_and_skips_absent_fields() {
    let payload = CardTemplatePayload {
        name: "Silver".into(),
        description: None,
        card_size_key: Some("LARGE".into()),
        is_default: false,
        layout_definition: create_default_layout(CardSizePreset::Large),
    };
    let value = serde_json::to_value(&payload).unwrap();
    assert_eq!(value["name"], "Silver");
    assert_eq!(value["cardSizeKey"], "LARGE");
    assert_eq!(value["isDefault"], false);
    assert!(value.get("description").is_none());
    assert_eq!(value["layoutDefinition"]["cardSize"]["width"], 428.0);
    assert_eq!(value["layoutDefinition"]["pages"][1]["name"], "back");
}

#[test]
fn update_payload_sends_only_present_fields() {
    let payload = CardTemplateUpdatePayload { name: Some("Renamed".into()), ..Default::default() };
    assert_eq!(serde_json::to_value(&payload).unwrap(), json!({ "name": "Renamed" }));
    assert_eq!(serde_json::to_value(CardTemplateUpdatePayload::default()).unwrap(), json!({}));
}

// --- responses ---

#[test]
fn template_parses_and_keeps_unmodelled_fields() {
    let template: CardTemplate = parse_body(&stored_template().to_string()).unwrap();
    assert_eq!(template.id, 12);
    assert_eq!(template.plan_id, 7);
    assert!(template.is_default);
    assert_eq!(template.page_count(), 2);
    assert!(template.is_double_sided());
    assert_eq!(template.extra["createdAt"], "2026-01-04T09:30:00Z");
    assert_eq!(template.layout_definition.extra["theme"], "gold");

    let back = serde_json::to_value(&template).unwrap();
    assert_eq!(back, stored_template());
}

#[test]
fn template_without_layout_gets_blank_front_page() {
    let template: CardTemplate = parse_body(r#"{"id":1,"planId":2,"name":"Empty"}"#).unwrap();
    assert_eq!(template.page_count(), 1);
    assert!(!template.is_double_sided());
    assert!(!template.is_default);
}

#[test]
fn template_list_parses() {
    let body = json!([stored_template(), stored_template()]).to_string();
    let list: Vec<CardTemplate> = parse_body(&body).unwrap();
    assert_eq!(list.len(), 2);
}

#[test]
fn parse_body_reports_shape_errors() {
    let err = parse_body::<CardTemplate>(r#"{"id":"x"}"#).unwrap_err();
    assert!(matches!(err, ApiError::Parse(_)));
    assert!(err.to_string().starts_with("API response parse failed"));
}

// --- errors ---

#[test]
fn not_found_is_specific_for_single_template() {
    let err = ApiError::from_status(404, String::new(), 7, Some(12));
    assert!(matches!(err, ApiError::NotFound { plan_id: 7, template_id: 12 }));
    assert_eq!(err.to_string(), "template 12 not found for plan 7");
}

#[test]
fn other_statuses_keep_body() {
    let err = ApiError::from_status(404, "no plan".into(), 7, None);
    assert!(matches!(err, ApiError::Status { status: 404, ref body } if body == "no plan"));
    let err = ApiError::from_status(500, "boom".into(), 7, Some(1));
    assert_eq!(err.to_string(), "API response error: status 500");
}

// --- client ---

#[test]
fn client_builds_from_config() {
    let client = TemplateClient::new(&ApiConfig::default()).unwrap();
    assert_eq!(client.base_url(), "http://127.0.0.1:8080");
}

#[tokio::test]
async fn unreachable_backend_is_request_error() {
    let config = ApiConfig {
        base_url: "http://127.0.0.1:9".into(),
        timeouts: crate::config::ApiTimeouts { request_secs: 2, connect_secs: 1 },
        ..ApiConfig::default()
    };
    let client = TemplateClient::new(&config).unwrap();
    let err = client.list(1).await.unwrap_err();
    assert!(matches!(err, ApiError::Request(_)), "unexpected error: {err}");
}
