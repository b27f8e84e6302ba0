use std::sync::Arc;

use wasm_bindgen::JsValue;
use web_sys::HtmlCanvasElement;

use crate::camera::{Camera, Point, Rect};
use crate::consts::{BACK_PAGE, DRAG_EDGE_MARGIN, MIN_ELEMENT_SIZE, NUDGE_STEP};
use crate::doc::{CardElement, CardPage, CardSize, ElementContent, ElementKind, LayoutDefinition, LayoutError, ZMove};
use crate::hit::{self, HitPart, ResizeAnchor};
use crate::host::{self, HostError};
use crate::input::{Button, InputState, Key, Modifiers, UiState, WheelDelta};
use crate::render::RenderCache;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Where freshly added elements are placed.
const NEW_ELEMENT_ORIGIN: f64 = 20.0;

/// Offset applied to duplicated elements so the copy is visible.
const DUPLICATE_OFFSET: f64 = 10.0;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ElementCreated { page_index: usize, element: CardElement },
    ElementUpdated { page_index: usize, element: CardElement },
    ElementDeleted { page_index: usize, id: String },
    /// The host must ask the user to confirm deleting this element.
    ConfirmDeleteRequested { id: String },
    PageAdded { index: usize },
    PageRemoved { name: String },
    PageSelected(usize),
    SelectionChanged(Option<String>),
    SetCursor(String),
    RenderNeeded,
}

/// Core editor state: all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
/// The layout is held behind an `Arc` that is replaced on every edit; hosts
/// compare identities with [`Arc::ptr_eq`] to decide whether to redraw or
/// mark the template dirty.
pub struct EngineCore {
    layout: Arc<LayoutDefinition>,
    pub camera: Camera,
    pub ui: UiState,
    pub input: InputState,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new(LayoutDefinition::blank(CardSize::default()))
    }
}

impl EngineCore {
    #[must_use]
    pub fn new(layout: LayoutDefinition) -> Self {
        Self {
            layout: Arc::new(layout),
            camera: Camera::default(),
            ui: UiState::default(),
            input: InputState::Idle,
        }
    }

    // --- Data inputs ---

    /// Replace the working layout with a freshly loaded one, resetting selection
    /// and any gesture in progress.
    pub fn load_layout(&mut self, layout: LayoutDefinition) {
        self.layout = Arc::new(layout);
        self.ui.selected_element_id = None;
        self.ui.pending_delete = None;
        self.input = InputState::Idle;
        self.clamp_page_index();
    }

    fn replace(&mut self, next: LayoutDefinition) {
        self.layout = Arc::new(next);
        self.clamp_page_index();
    }

    fn clamp_page_index(&mut self) {
        let max = self.layout.pages.len().saturating_sub(1);
        if self.ui.selected_page_index > max {
            self.ui.selected_page_index = max;
            self.ui.selected_element_id = None;
        }
    }

    // --- Queries ---

    /// The current working layout.
    #[must_use]
    pub fn layout(&self) -> &Arc<LayoutDefinition> {
        &self.layout
    }

    /// Index of the page being edited.
    #[must_use]
    pub fn page_index(&self) -> usize {
        self.ui.selected_page_index
    }

    /// The page being edited, or `None` when the layout has no page data.
    #[must_use]
    pub fn current_page(&self) -> Option<&CardPage> {
        self.layout.page(self.ui.selected_page_index)
    }

    /// The currently selected element id, if any.
    #[must_use]
    pub fn selection(&self) -> Option<&str> {
        self.ui.selected_element_id.as_deref()
    }

    /// The currently selected element, if it still exists on the active page.
    #[must_use]
    pub fn selected_element(&self) -> Option<&CardElement> {
        let id = self.selection()?;
        self.current_page()?.element(id)
    }

    /// Look up an element on the active page.
    #[must_use]
    pub fn element(&self, id: &str) -> Option<&CardElement> {
        self.current_page()?.element(id)
    }

    /// The current camera state.
    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    // --- Selection and pages ---

    /// Select an element on the active page, or clear the selection.
    pub fn select(&mut self, id: Option<&str>) -> Vec<Action> {
        let next = id.filter(|id| self.element(id).is_some()).map(str::to_owned);
        if next == self.ui.selected_element_id {
            return Vec::new();
        }
        self.ui.selected_element_id.clone_from(&next);
        vec![Action::SelectionChanged(next), Action::RenderNeeded]
    }

    /// Switch the active page. Out-of-range indices are clamped.
    pub fn select_page(&mut self, index: usize) -> Vec<Action> {
        let index = index.min(self.layout.pages.len().saturating_sub(1));
        self.input = InputState::Idle;
        self.ui.pending_delete = None;
        let had_selection = self.ui.selected_element_id.take().is_some();
        let mut actions = Vec::new();
        if had_selection {
            actions.push(Action::SelectionChanged(None));
        }
        if index != self.ui.selected_page_index {
            self.ui.selected_page_index = index;
            actions.push(Action::PageSelected(index));
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Add an empty `back` page and switch to it.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::BackPageExists`] if the layout already has one.
    pub fn add_back_page(&mut self) -> Result<Vec<Action>, LayoutError> {
        let next = self.layout.with_back_page()?;
        self.replace(next);
        let index = self.layout.page_index(BACK_PAGE).unwrap_or(0);
        let mut actions = vec![Action::PageAdded { index }];
        actions.extend(self.select_page(index));
        Ok(actions)
    }

    /// Remove the `back` page and return to the first page.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::NoBackPage`] unless a back page exists alongside another page.
    pub fn remove_back_page(&mut self) -> Result<Vec<Action>, LayoutError> {
        let next = self.layout.without_back_page()?;
        self.replace(next);
        let mut actions = vec![Action::PageRemoved { name: BACK_PAGE.to_owned() }];
        actions.extend(self.select_page(0));
        Ok(actions)
    }

    /// Change the active page's background color.
    ///
    /// # Errors
    ///
    /// Fails if the layout has no page data.
    pub fn set_page_background(&mut self, color: &str) -> Result<Vec<Action>, LayoutError> {
        let next = self.layout.with_page_background(self.ui.selected_page_index, color)?;
        self.replace(next);
        Ok(vec![Action::RenderNeeded])
    }

    // --- Element CRUD ---

    fn unique_id(&self, kind: ElementKind, now_ms: u64) -> String {
        let mut stamp = now_ms;
        loop {
            let id = format!("{}_{stamp}", kind.as_str());
            if self.element(&id).is_none() {
                return id;
            }
            stamp += 1;
        }
    }

    /// Add a new element of `kind` with default props to the active page and select it.
    ///
    /// The id is `{TYPE}_{now_ms}`, bumped until unique within the page.
    ///
    /// # Errors
    ///
    /// Fails if the layout has no page data.
    pub fn add_element(&mut self, kind: ElementKind, now_ms: u64) -> Result<Vec<Action>, LayoutError> {
        let id = self.unique_id(kind, now_ms);
        let element = CardElement::new(id, ElementContent::default_for(kind), NEW_ELEMENT_ORIGIN, NEW_ELEMENT_ORIGIN);
        self.insert_element(element)
    }

    /// Add a copy of an element, offset slightly, and select the copy.
    ///
    /// # Errors
    ///
    /// Fails if the element does not exist on the active page.
    pub fn duplicate_element(&mut self, id: &str, now_ms: u64) -> Result<Vec<Action>, LayoutError> {
        let Some(source) = self.element(id) else {
            return Err(LayoutError::ElementNotFound(id.to_owned()));
        };
        let kind = source.content.kind().unwrap_or(ElementKind::Shape);
        let mut copy = source.with_position(source.x + DUPLICATE_OFFSET, source.y + DUPLICATE_OFFSET);
        copy.id = self.unique_id(kind, now_ms);
        self.insert_element(copy)
    }

    fn insert_element(&mut self, element: CardElement) -> Result<Vec<Action>, LayoutError> {
        let page_index = self.ui.selected_page_index;
        let next = self.layout.with_element_added(page_index, element.clone())?;
        self.replace(next);
        let mut actions = vec![Action::ElementCreated { page_index, element: element.clone() }];
        actions.extend(self.select(Some(&element.id)));
        Ok(actions)
    }

    /// Replace an element on the active page wholesale (property panel edits).
    ///
    /// # Errors
    ///
    /// Fails if the element does not exist on the active page, or with
    /// [`LayoutError::ElementKindChanged`] if the replacement has another type.
    pub fn update_element(&mut self, element: CardElement) -> Result<Vec<Action>, LayoutError> {
        let page_index = self.ui.selected_page_index;
        let next = self.layout.with_element_replaced(page_index, element.clone())?;
        self.replace(next);
        Ok(vec![Action::ElementUpdated { page_index, element }, Action::RenderNeeded])
    }

    /// Move an element in the z-order of the active page.
    ///
    /// # Errors
    ///
    /// Fails if the element does not exist on the active page.
    pub fn restack_element(&mut self, id: &str, how: ZMove) -> Result<Vec<Action>, LayoutError> {
        let next = self.layout.with_element_restacked(self.ui.selected_page_index, id, how)?;
        self.replace(next);
        Ok(vec![Action::RenderNeeded])
    }

    /// Ask for confirmation before deleting an element. Nothing is removed yet.
    ///
    /// # Errors
    ///
    /// Fails if the element does not exist on the active page.
    pub fn request_delete(&mut self, id: &str) -> Result<Vec<Action>, LayoutError> {
        if self.element(id).is_none() {
            return Err(LayoutError::ElementNotFound(id.to_owned()));
        }
        self.ui.pending_delete = Some(id.to_owned());
        Ok(vec![Action::ConfirmDeleteRequested { id: id.to_owned() }])
    }

    /// Drop a pending delete request.
    pub fn cancel_delete(&mut self) -> Vec<Action> {
        self.ui.pending_delete = None;
        Vec::new()
    }

    /// Perform the pending delete, if any.
    ///
    /// # Errors
    ///
    /// Fails if the pending element vanished from the active page meanwhile.
    pub fn confirm_delete(&mut self) -> Result<Vec<Action>, LayoutError> {
        let Some(id) = self.ui.pending_delete.take() else {
            return Ok(Vec::new());
        };
        let page_index = self.ui.selected_page_index;
        let (next, removed) = self.layout.with_element_removed(page_index, &id)?;
        self.replace(next);
        if self.input.active_id() == Some(removed.id.as_str()) {
            self.input = InputState::Idle;
        }
        let mut actions = vec![Action::ElementDeleted { page_index, id: removed.id.clone() }];
        if self.ui.selected_element_id.as_deref() == Some(removed.id.as_str()) {
            self.ui.selected_element_id = None;
            actions.push(Action::SelectionChanged(None));
        }
        actions.push(Action::RenderNeeded);
        Ok(actions)
    }

    // --- View ---

    pub fn zoom_in(&mut self) -> Vec<Action> {
        self.camera.zoom_in();
        vec![Action::RenderNeeded]
    }

    pub fn zoom_out(&mut self) -> Vec<Action> {
        self.camera.zoom_out();
        vec![Action::RenderNeeded]
    }

    pub fn zoom_reset(&mut self) -> Vec<Action> {
        self.camera.zoom_reset();
        vec![Action::RenderNeeded]
    }

    pub fn toggle_grid(&mut self) -> Vec<Action> {
        self.ui.show_grid = !self.ui.show_grid;
        vec![Action::RenderNeeded]
    }

    pub fn toggle_rulers(&mut self) -> Vec<Action> {
        self.ui.show_rulers = !self.ui.show_rulers;
        vec![Action::RenderNeeded]
    }

    // --- Input events ---

    /// Start a drag, a resize, or change the selection.
    ///
    /// Ignored while another gesture is active or for non-primary buttons.
    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        if button != Button::Primary || self.input != InputState::Idle {
            return Vec::new();
        }
        let world = self.camera.screen_to_world(screen_pt);
        let hit = match self.current_page() {
            Some(page) => hit::hit_test(world, page, &self.camera, self.selection()),
            None => None,
        };

        let Some(hit) = hit else {
            return self.select(None);
        };
        let Some(element) = self.element(&hit.element_id) else {
            return Vec::new();
        };
        let bounds = element.bounds();

        match hit.part {
            HitPart::ResizeHandle(anchor) => {
                let aspect = if bounds.height > 0.0 { bounds.width / bounds.height } else { 1.0 };
                self.input = InputState::Resizing {
                    id: hit.element_id,
                    anchor,
                    start_screen: screen_pt,
                    orig: bounds,
                    orig_size: (element.width, element.height),
                    aspect,
                };
                vec![Action::SetCursor(anchor.cursor().to_owned())]
            }
            HitPart::Body => {
                let local = self.local_screen(screen_pt);
                let zoom = self.camera.zoom;
                let offset = Point::new(local.x - element.x * zoom, local.y - element.y * zoom);
                let (orig_x, orig_y) = (element.x, element.y);
                let mut actions = self.select(Some(&hit.element_id));
                self.input = InputState::Dragging { id: hit.element_id, offset, orig_x, orig_y };
                actions.push(Action::SetCursor("move".to_owned()));
                actions
            }
        }
    }

    /// Advance the active gesture, emitting the updated element.
    pub fn on_pointer_move(&mut self, screen_pt: Point, _modifiers: Modifiers) -> Vec<Action> {
        let (id, rect) = match &self.input {
            InputState::Idle => return Vec::new(),
            InputState::Dragging { id, offset, .. } => {
                let local = self.local_screen(screen_pt);
                let zoom = self.camera.zoom;
                let x = (local.x - offset.x) / zoom;
                let y = (local.y - offset.y) / zoom;
                let (x, y) = clamp_to_card(x, y, &self.layout.card_size);
                (id.clone(), Geometry::Position(x, y))
            }
            InputState::Resizing { id, anchor, start_screen, orig, aspect, .. } => {
                let dx = self.camera.screen_dist_to_world(screen_pt.x - start_screen.x);
                let dy = self.camera.screen_dist_to_world(screen_pt.y - start_screen.y);
                let lock = self.element(id).is_some_and(CardElement::lock_aspect_ratio);
                (id.clone(), Geometry::Rect(resize_rect(*orig, *anchor, dx, dy, lock, *aspect)))
            }
        };

        let Some(element) = self.element(&id) else {
            self.input = InputState::Idle;
            return Vec::new();
        };
        let updated = match rect {
            Geometry::Position(x, y) => element.with_position(x, y),
            Geometry::Rect(r) => element.with_geometry(r),
        };
        self.update_element(updated).unwrap_or_default()
    }

    /// Finish the active gesture.
    pub fn on_pointer_up(&mut self, _screen_pt: Point, _button: Button, _modifiers: Modifiers) -> Vec<Action> {
        if self.input == InputState::Idle {
            return Vec::new();
        }
        self.input = InputState::Idle;
        vec![Action::SetCursor("default".to_owned())]
    }

    /// Ctrl/Cmd + wheel zooms; plain wheel is left to the host for scrolling.
    pub fn on_wheel(&mut self, _screen_pt: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        if !(modifiers.ctrl || modifiers.meta) || delta.dy == 0.0 {
            return Vec::new();
        }
        if delta.dy < 0.0 { self.zoom_in() } else { self.zoom_out() }
    }

    /// Keyboard handling. Keys never delete elements; deletion always goes
    /// through [`EngineCore::request_delete`].
    pub fn on_key_down(&mut self, key: Key, modifiers: Modifiers) -> Vec<Action> {
        let step = if modifiers.shift { NUDGE_STEP * 10.0 } else { NUDGE_STEP };
        let (dx, dy) = match key.0.as_str() {
            "Escape" => {
                self.ui.pending_delete = None;
                let mut actions = self.cancel_gesture();
                actions.extend(self.select(None));
                return actions;
            }
            "ArrowLeft" => (-step, 0.0),
            "ArrowRight" => (step, 0.0),
            "ArrowUp" => (0.0, -step),
            "ArrowDown" => (0.0, step),
            _ => return Vec::new(),
        };
        if self.input != InputState::Idle {
            return Vec::new();
        }
        let Some(element) = self.selected_element() else {
            return Vec::new();
        };
        let (x, y) = clamp_to_card(element.x + dx, element.y + dy, &self.layout.card_size);
        let moved = element.with_position(x, y);
        self.update_element(moved).unwrap_or_default()
    }

    /// Abandon the active gesture, putting the element back where it started.
    fn cancel_gesture(&mut self) -> Vec<Action> {
        let (id, x, y, size) = match std::mem::take(&mut self.input) {
            InputState::Idle => return Vec::new(),
            InputState::Dragging { id, orig_x, orig_y, .. } => (id, orig_x, orig_y, None),
            InputState::Resizing { id, orig, orig_size, .. } => (id, orig.x, orig.y, Some(orig_size)),
        };
        let mut actions = vec![Action::SetCursor("default".to_owned())];
        let Some(current) = self.element(&id) else {
            return actions;
        };
        let mut restored = current.with_position(x, y);
        if let Some((width, height)) = size {
            restored.width = width;
            restored.height = height;
        }
        if restored != *current {
            actions.extend(self.update_element(restored).unwrap_or_default());
        }
        actions
    }

    /// Pointer position relative to the card's top-left corner, in screen pixels.
    fn local_screen(&self, screen_pt: Point) -> Point {
        Point::new(screen_pt.x - self.camera.pan_x, screen_pt.y - self.camera.pan_y)
    }
}

enum Geometry {
    Position(f64, f64),
    Rect(Rect),
}

/// Clamp a dragged origin to `[0, card − 50]` on both axes.
#[must_use]
pub fn clamp_to_card(x: f64, y: f64, card: &CardSize) -> (f64, f64) {
    let max_x = (card.width - DRAG_EDGE_MARGIN).max(0.0);
    let max_y = (card.height - DRAG_EDGE_MARGIN).max(0.0);
    (x.clamp(0.0, max_x), y.clamp(0.0, max_y))
}

/// Apply a resize delta (layout units) for one handle.
///
/// Left/top handles keep the opposite edge fixed. Both dimensions are at least
/// [`MIN_ELEMENT_SIZE`]. With `lock`, the result keeps `aspect` (width/height):
/// height follows width, except for the n/s handles where width follows height.
#[must_use]
pub fn resize_rect(orig: Rect, anchor: ResizeAnchor, dx: f64, dy: f64, lock: bool, aspect: f64) -> Rect {
    let mut w = orig.width;
    let mut h = orig.height;
    if anchor.moves_right() {
        w = orig.width + dx;
    }
    if anchor.moves_left() {
        w = orig.width - dx;
    }
    if anchor.moves_bottom() {
        h = orig.height + dy;
    }
    if anchor.moves_top() {
        h = orig.height - dy;
    }

    if lock && aspect.is_finite() && aspect > 0.0 {
        if anchor.is_vertical_edge() {
            h = h.max(MIN_ELEMENT_SIZE).max(MIN_ELEMENT_SIZE / aspect);
            w = h * aspect;
        } else {
            w = w.max(MIN_ELEMENT_SIZE).max(MIN_ELEMENT_SIZE * aspect);
            h = w / aspect;
        }
    } else {
        w = w.max(MIN_ELEMENT_SIZE);
        h = h.max(MIN_ELEMENT_SIZE);
    }

    let x = if anchor.moves_left() { orig.right() - w } else { orig.x };
    let y = if anchor.moves_top() { orig.bottom() - h } else { orig.y };
    Rect::new(x, y, w, h)
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    cache: RenderCache,
    pub core: EngineCore,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub dpr: f64,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement, layout: LayoutDefinition) -> Self {
        Self {
            canvas,
            cache: RenderCache::default(),
            core: EngineCore::new(layout),
            viewport_width: 0.0,
            viewport_height: 0.0,
            dpr: 1.0,
        }
    }

    /// Update viewport dimensions and device pixel ratio, resizing the backing store.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.viewport_width = width_css;
        self.viewport_height = height_css;
        self.dpr = dpr;
        self.canvas.set_width((width_css * dpr).round().max(0.0) as u32);
        self.canvas.set_height((height_css * dpr).round().max(0.0) as u32);
        self.cache.invalidate();
    }

    /// Add an element stamped with the browser clock.
    ///
    /// # Errors
    ///
    /// Fails if the layout has no page data.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn add_element(&mut self, kind: ElementKind) -> Result<Vec<Action>, LayoutError> {
        let now_ms = js_sys::Date::now() as u64;
        self.core.add_element(kind, now_ms)
    }

    /// Read an uploaded image into the selected IMAGE element as a data URI.
    ///
    /// # Errors
    ///
    /// Fails if nothing suitable is selected or the bytes are not an image.
    pub fn set_image_upload(&mut self, bytes: &[u8]) -> Result<Vec<Action>, HostError> {
        let Some(element) = self.core.selected_element() else {
            return Err(HostError::NoImageSelected);
        };
        let ElementContent::Image(props) = &element.content else {
            return Err(HostError::NoImageSelected);
        };
        let mut props = props.clone();
        props.source = Some(crate::media::image_data_uri(bytes)?);
        let updated = element.with_content(ElementContent::Image(props));
        Ok(self.core.update_element(updated)?)
    }

    /// Draw the current state to the canvas if anything changed since the last frame.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the 2D context is unavailable or a draw call fails.
    pub fn render(&mut self) -> Result<(), JsValue> {
        let Some(scene) = self.cache.refresh(&self.core) else {
            return Ok(());
        };
        let ctx = host::context_2d(&self.canvas)?;
        crate::paint::paint(&ctx, scene, self.viewport_width, self.viewport_height, self.dpr)
    }

    /// Open the print document for the whole layout in a new window.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::PopupBlocked`] when the browser refuses the window.
    pub fn open_print_window(&self, data: &crate::binding::DataMap) -> Result<(), HostError> {
        let options = crate::print::PrintOptions { auto_print: true, ..crate::print::PrintOptions::default() };
        let html = crate::print::document(self.core.layout(), data, &options);
        host::open_print_window(&html)
    }
}
