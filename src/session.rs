//! Editor session: one template being edited, plus its persistence handoff.
//!
//! SYSTEM CONTEXT
//! ==============
//! The canvas engine owns the working layout behind an `Arc` that is replaced
//! on every edit. The session remembers the `Arc` it last saved (or loaded);
//! the template is dirty exactly when the engine's layout is no longer that
//! same allocation. Saving is create-or-update against the template store and
//! never touches the working copy, so a failed save can simply be retried.

use std::sync::Arc;

use canvas::doc::LayoutDefinition;
use canvas::engine::EngineCore;
use canvas::presets::{CardSizePreset, create_default_layout};

use crate::api::{ApiError, CardTemplate, CardTemplatePayload, CardTemplateUpdatePayload, TemplateStore};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("template has not been saved yet")]
    Unsaved,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Template fields edited outside the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateMeta {
    pub name: String,
    pub description: Option<String>,
    pub card_size_key: Option<String>,
    pub is_default: bool,
}

pub struct EditorSession {
    store: Arc<dyn TemplateStore>,
    plan_id: i64,
    template_id: Option<i64>,
    meta: TemplateMeta,
    meta_dirty: bool,
    core: EngineCore,
    saved: Arc<LayoutDefinition>,
    last_error: Option<String>,
}

impl EditorSession {
    /// Start an unsaved template seeded with the starter layout for `preset`.
    pub fn create(store: Arc<dyn TemplateStore>, plan_id: i64, name: &str, preset: CardSizePreset) -> Self {
        let core = EngineCore::new(create_default_layout(preset));
        let saved = Arc::clone(core.layout());
        Self {
            store,
            plan_id,
            template_id: None,
            meta: TemplateMeta {
                name: name.to_owned(),
                description: None,
                card_size_key: Some(preset.key().to_owned()),
                is_default: false,
            },
            meta_dirty: false,
            core,
            saved,
            last_error: None,
        }
    }

    /// Load a stored template for editing.
    pub async fn open(store: Arc<dyn TemplateStore>, plan_id: i64, template_id: i64) -> Result<Self, SessionError> {
        let template = store.get(plan_id, template_id).await.inspect_err(|e| {
            tracing::error!(plan_id, template_id, error = %e, "failed to load card template");
        })?;
        tracing::info!(plan_id, template_id, pages = template.page_count(), "card template loaded");
        Ok(Self::from_template(store, template))
    }

    fn from_template(store: Arc<dyn TemplateStore>, template: CardTemplate) -> Self {
        let core = EngineCore::new(template.layout_definition);
        let saved = Arc::clone(core.layout());
        Self {
            store,
            plan_id: template.plan_id,
            template_id: Some(template.id),
            meta: TemplateMeta {
                name: template.name,
                description: template.description,
                card_size_key: template.card_size_key,
                is_default: template.is_default,
            },
            meta_dirty: false,
            core,
            saved,
            last_error: None,
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn plan_id(&self) -> i64 {
        self.plan_id
    }

    #[must_use]
    pub fn template_id(&self) -> Option<i64> {
        self.template_id
    }

    #[must_use]
    pub fn meta(&self) -> &TemplateMeta {
        &self.meta
    }

    #[must_use]
    pub fn core(&self) -> &EngineCore {
        &self.core
    }

    /// Mutable engine access; every edit it performs replaces the layout `Arc`.
    pub fn core_mut(&mut self) -> &mut EngineCore {
        &mut self.core
    }

    #[must_use]
    pub fn layout(&self) -> &Arc<LayoutDefinition> {
        self.core.layout()
    }

    /// Unsaved changes exist: never persisted, metadata edited, or the layout
    /// replaced since the last load/save.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.template_id.is_none() || self.meta_dirty || !Arc::ptr_eq(self.core.layout(), &self.saved)
    }

    /// Message from the most recent failed operation, cleared by the next success.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // --- Metadata ---

    pub fn rename(&mut self, name: &str) {
        if self.meta.name != name {
            self.meta.name = name.to_owned();
            self.meta_dirty = true;
        }
    }

    pub fn set_description(&mut self, description: Option<&str>) {
        let next = description.map(str::to_owned);
        if self.meta.description != next {
            self.meta.description = next;
            self.meta_dirty = true;
        }
    }

    /// Replace the working layout wholesale, e.g. from an imported file.
    pub fn replace_layout(&mut self, layout: LayoutDefinition) {
        self.core.load_layout(layout);
    }

    // --- Persistence ---

    /// Create or update the template from the working copy.
    ///
    /// On failure the working copy and dirty state are left exactly as they
    /// were and the error is kept in [`EditorSession::last_error`].
    pub async fn save(&mut self) -> Result<CardTemplate, SessionError> {
        let snapshot = Arc::clone(self.core.layout());
        if let Err(e) = snapshot.validate() {
            tracing::warn!(plan_id = self.plan_id, error = %e, "saving layout with structural problems");
        }

        let result = match self.template_id {
            None => {
                let payload = CardTemplatePayload {
                    name: self.meta.name.clone(),
                    description: self.meta.description.clone(),
                    card_size_key: self.meta.card_size_key.clone(),
                    is_default: self.meta.is_default,
                    layout_definition: (*snapshot).clone(),
                };
                self.store.create(self.plan_id, &payload).await
            }
            Some(template_id) => {
                let payload = CardTemplateUpdatePayload {
                    name: Some(self.meta.name.clone()),
                    description: self.meta.description.clone(),
                    card_size_key: self.meta.card_size_key.clone(),
                    is_default: None,
                    layout_definition: Some((*snapshot).clone()),
                };
                self.store.update(self.plan_id, template_id, &payload).await
            }
        };

        match result {
            Ok(template) => {
                tracing::info!(plan_id = self.plan_id, template_id = template.id, "card template saved");
                self.template_id = Some(template.id);
                self.saved = snapshot;
                self.meta_dirty = false;
                self.last_error = None;
                Ok(template)
            }
            Err(e) => {
                tracing::error!(plan_id = self.plan_id, template_id = ?self.template_id, error = %e, "card template save failed");
                self.last_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Make this template the plan's default.
    pub async fn set_default(&mut self) -> Result<(), SessionError> {
        let template_id = self.template_id.ok_or(SessionError::Unsaved)?;
        match self.store.set_default(self.plan_id, template_id).await {
            Ok(()) => {
                tracing::info!(plan_id = self.plan_id, template_id, "default card template changed");
                self.meta.is_default = true;
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                tracing::error!(plan_id = self.plan_id, template_id, error = %e, "set default failed");
                self.last_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Delete the stored template. The session keeps its working copy and
    /// becomes unsaved, so saving again recreates the template.
    pub async fn delete(&mut self) -> Result<(), SessionError> {
        let template_id = self.template_id.ok_or(SessionError::Unsaved)?;
        match self.store.delete(self.plan_id, template_id).await {
            Ok(()) => {
                tracing::info!(plan_id = self.plan_id, template_id, "card template deleted");
                self.template_id = None;
                self.meta.is_default = false;
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                tracing::error!(plan_id = self.plan_id, template_id, error = %e, "card template delete failed");
                self.last_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
