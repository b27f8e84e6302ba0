//! Plan card-template REST client.
//!
//! The admin backend owns template storage; this module only consumes it.
//! Templates carry the layout document verbatim, and any response fields this
//! client does not model are kept so a load/save cycle never drops them.

use std::time::Duration;

use canvas::consts::BACK_PAGE;
use canvas::doc::{CardSize, LayoutDefinition};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::ApiConfig;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by template API operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The request never produced a response.
    #[error("API request failed: {0}")]
    Request(String),

    /// The backend answered with a non-success status.
    #[error("API response error: status {status}")]
    Status { status: u16, body: String },

    /// The response body was not the expected JSON shape.
    #[error("API response parse failed: {0}")]
    Parse(String),

    /// No template with this id exists for the plan.
    #[error("template {template_id} not found for plan {plan_id}")]
    NotFound { plan_id: i64, template_id: i64 },
}

impl ApiError {
    /// Map a status/body pair to the most specific error.
    #[must_use]
    pub fn from_status(status: u16, body: String, plan_id: i64, template_id: Option<i64>) -> Self {
        match (status, template_id) {
            (404, Some(template_id)) => Self::NotFound { plan_id, template_id },
            _ => Self::Status { status, body },
        }
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

/// Body for creating a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardTemplatePayload {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_size_key: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    pub layout_definition: LayoutDefinition,
}

/// Body for a partial template update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardTemplateUpdatePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_size_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_definition: Option<LayoutDefinition>,
}

/// A stored template as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardTemplate {
    pub id: i64,
    pub plan_id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_size_key: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default = "blank_layout")]
    pub layout_definition: LayoutDefinition,
    /// Fields this client does not model (timestamps, audit columns, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn blank_layout() -> LayoutDefinition {
    LayoutDefinition::blank(CardSize::default())
}

impl CardTemplate {
    /// Number of card sides in the stored layout.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.layout_definition.pages.len()
    }

    /// Whether the stored layout has a back side.
    #[must_use]
    pub fn is_double_sided(&self) -> bool {
        self.layout_definition.page_index(BACK_PAGE).is_some()
    }
}

#[must_use]
pub fn templates_path(plan_id: i64) -> String {
    format!("/api/plans/{plan_id}/card-templates")
}

#[must_use]
pub fn template_path(plan_id: i64, template_id: i64) -> String {
    format!("/api/plans/{plan_id}/card-templates/{template_id}")
}

#[must_use]
pub fn set_default_path(plan_id: i64, template_id: i64) -> String {
    format!("/api/plans/{plan_id}/card-templates/{template_id}/set-default")
}

/// Parse a JSON response body into `T`.
pub fn parse_body<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::Parse(e.to_string()))
}

// =============================================================================
// STORE
// =============================================================================

/// Template persistence as seen by the editor. Implemented over HTTP by
/// [`TemplateClient`]; tests substitute an in-memory store.
#[async_trait::async_trait]
pub trait TemplateStore: Send + Sync {
    async fn list(&self, plan_id: i64) -> Result<Vec<CardTemplate>, ApiError>;

    async fn get(&self, plan_id: i64, template_id: i64) -> Result<CardTemplate, ApiError>;

    async fn create(&self, plan_id: i64, payload: &CardTemplatePayload) -> Result<CardTemplate, ApiError>;

    async fn update(
        &self,
        plan_id: i64,
        template_id: i64,
        payload: &CardTemplateUpdatePayload,
    ) -> Result<CardTemplate, ApiError>;

    async fn delete(&self, plan_id: i64, template_id: i64) -> Result<(), ApiError>;

    async fn set_default(&self, plan_id: i64, template_id: i64) -> Result<(), ApiError>;
}

/// HTTP implementation of [`TemplateStore`].
pub struct TemplateClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl TemplateClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.base_url.clone(), token: config.token.clone() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one request and return the raw body of a successful response.
    async fn send<B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        plan_id: i64,
        template_id: Option<i64>,
    ) -> Result<String, ApiError> {
        let url = format!("{}{path}", self.base_url);
        let mut request = self.http.request(method.clone(), &url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(%method, %url, error = %e, "template API request failed");
            ApiError::Request(e.to_string())
        })?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| ApiError::Request(e.to_string()))?;
        if !(200..300).contains(&status) {
            tracing::warn!(%method, %url, status, "template API returned error status");
            return Err(ApiError::from_status(status, text, plan_id, template_id));
        }
        tracing::debug!(%method, %url, status, bytes = text.len(), "template API response");
        Ok(text)
    }
}

#[async_trait::async_trait]
impl TemplateStore for TemplateClient {
    async fn list(&self, plan_id: i64) -> Result<Vec<CardTemplate>, ApiError> {
        let text = self.send::<Value>(Method::GET, &templates_path(plan_id), None, plan_id, None).await?;
        parse_body(&text)
    }

    async fn get(&self, plan_id: i64, template_id: i64) -> Result<CardTemplate, ApiError> {
        let path = template_path(plan_id, template_id);
        let text = self.send::<Value>(Method::GET, &path, None, plan_id, Some(template_id)).await?;
        parse_body(&text)
    }

    async fn create(&self, plan_id: i64, payload: &CardTemplatePayload) -> Result<CardTemplate, ApiError> {
        let text = self.send(Method::POST, &templates_path(plan_id), Some(payload), plan_id, None).await?;
        parse_body(&text)
    }

    async fn update(
        &self,
        plan_id: i64,
        template_id: i64,
        payload: &CardTemplateUpdatePayload,
    ) -> Result<CardTemplate, ApiError> {
        let path = template_path(plan_id, template_id);
        let text = self.send(Method::PUT, &path, Some(payload), plan_id, Some(template_id)).await?;
        parse_body(&text)
    }

    async fn delete(&self, plan_id: i64, template_id: i64) -> Result<(), ApiError> {
        let path = template_path(plan_id, template_id);
        self.send::<Value>(Method::DELETE, &path, None, plan_id, Some(template_id)).await?;
        Ok(())
    }

    async fn set_default(&self, plan_id: i64, template_id: i64) -> Result<(), ApiError> {
        let path = set_default_path(plan_id, template_id);
        self.send::<Value>(Method::POST, &path, None, plan_id, Some(template_id)).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
