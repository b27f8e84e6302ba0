//! Input model: modifier keys, mouse buttons, editor UI state and the gesture
//! state machine.
//!
//! `UiState` is the session-only editor state the renderer reads (selection,
//! active page, overlay toggles). `InputState` is the active gesture tracked
//! between pointer-down and pointer-up, carrying the snapshot needed to
//! compute each move from the gesture start rather than incrementally.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::{Point, Rect};
use crate::hit::ResizeAnchor;

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the browser (e.g. `"Escape"`, `"ArrowLeft"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.to_owned())
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Session-only editor state visible to the renderer.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone)]
pub struct UiState {
    /// Id of the selected element on the active page, if any.
    pub selected_element_id: Option<String>,
    /// Index of the page being edited.
    pub selected_page_index: usize,
    /// Draw the 20-unit grid.
    pub show_grid: bool,
    /// Draw the top and left rulers.
    pub show_rulers: bool,
    /// Element awaiting delete confirmation.
    pub pending_delete: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            selected_element_id: None,
            selected_page_index: 0,
            show_grid: true,
            show_rulers: true,
            pending_delete: None,
        }
    }
}

/// Internal state for the input state machine.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The user is moving an element across the card.
    Dragging {
        /// Id of the element being dragged.
        id: String,
        /// Pointer position minus the element origin, both in screen pixels.
        offset: Point,
        /// Element x at the start of the drag.
        orig_x: f64,
        /// Element y at the start of the drag.
        orig_y: f64,
    },
    /// The user is resizing an element by dragging one of its eight handles.
    Resizing {
        /// Id of the element being resized.
        id: String,
        /// Which corner/edge handle is being dragged.
        anchor: ResizeAnchor,
        /// Screen-space pointer position at the start of the resize.
        start_screen: Point,
        /// Element bounds at the start of the resize.
        orig: Rect,
        /// Stored width and height at the start, unset for auto-sized text.
        orig_size: (Option<f64>, Option<f64>),
        /// Width / height at the start of the resize.
        aspect: f64,
    },
}

impl InputState {
    /// Id of the element the active gesture is manipulating.
    #[must_use]
    pub fn active_id(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Dragging { id, .. } | Self::Resizing { id, .. } => Some(id),
        }
    }
}
