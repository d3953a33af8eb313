//! Pointer and keyboard interaction over a live document.
//!
//! An [`InteractionSession`] turns raw input into selection, drag,
//! aspect-aware corner resize and layer reordering. It holds only gesture
//! state; the document it edits is passed to every call.
//!
//! ```text
//!            down on handle                  down on element
//!   Resizing ◄───────────── Idle ──────────────────────► Dragging
//!      │                     ▲                               │
//!      └──── up / leave ─────┴────────── up / leave ─────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{EditorConfig, Preferences};
use crate::document::Document;
use crate::event::{InputEvent, Key, KeyEvent, PointerEvent, PointerPhase};
use crate::geometry::{hit_test, hit_test_handle, Handle, Point, Rect, Size, MIN_ELEMENT_SIZE};

/// Current gesture kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    /// No gesture in progress.
    Idle,
    /// Moving the selected element.
    Dragging,
    /// Resizing the selected image from a corner.
    Resizing,
}

/// Geometry captured when a resize gesture starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResizeAnchor {
    /// Width at gesture start.
    pub width: f32,
    /// Height at gesture start.
    pub height: f32,
    /// `width / height` at gesture start, held for the whole gesture.
    pub aspect_ratio: f32,
}

impl ResizeAnchor {
    /// Capture the anchor for an element of the given size.
    #[must_use]
    pub fn capture(size: Size) -> Self {
        Self {
            width: size.w,
            height: size.h,
            aspect_ratio: size.aspect_ratio(),
        }
    }
}

/// What the host should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionResponse {
    /// Nothing changed.
    Ignored,
    /// Document or gesture state changed; redraw.
    Changed,
    /// Escape with nothing selected; close any open overlay.
    DismissOverlay,
}

impl InteractionResponse {
    fn changed_if(changed: bool) -> Self {
        if changed {
            Self::Changed
        } else {
            Self::Ignored
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Idle,
    Dragging { offset: Point },
    Resizing { handle: Handle, anchor: ResizeAnchor },
}

/// Gesture state for one editing surface.
#[derive(Debug, Clone)]
pub struct InteractionSession {
    gesture: Gesture,
    aspect_locked: bool,
    nudge_step: f32,
    nudge_step_large: f32,
}

impl Default for InteractionSession {
    fn default() -> Self {
        Self::new(true)
    }
}

impl InteractionSession {
    /// Create an idle session with default nudge steps.
    #[must_use]
    pub fn new(aspect_locked: bool) -> Self {
        let config = EditorConfig::default();
        Self {
            gesture: Gesture::Idle,
            aspect_locked,
            nudge_step: config.nudge_step,
            nudge_step_large: config.nudge_step_large,
        }
    }

    /// Create an idle session from configuration and stored preferences.
    #[must_use]
    pub fn from_config(config: &EditorConfig, preferences: &Preferences) -> Self {
        Self {
            gesture: Gesture::Idle,
            aspect_locked: preferences.aspect_ratio_locked,
            nudge_step: config.nudge_step,
            nudge_step_large: config.nudge_step_large,
        }
    }

    /// Current gesture kind.
    #[must_use]
    pub fn mode(&self) -> InteractionMode {
        match self.gesture {
            Gesture::Idle => InteractionMode::Idle,
            Gesture::Dragging { .. } => InteractionMode::Dragging,
            Gesture::Resizing { .. } => InteractionMode::Resizing,
        }
    }

    /// Handle being dragged during a resize.
    #[must_use]
    pub fn active_handle(&self) -> Option<Handle> {
        match self.gesture {
            Gesture::Resizing { handle, .. } => Some(handle),
            _ => None,
        }
    }

    /// Pointer offset from the element origin during a drag.
    #[must_use]
    pub fn drag_offset(&self) -> Option<Point> {
        match self.gesture {
            Gesture::Dragging { offset } => Some(offset),
            _ => None,
        }
    }

    /// Geometry captured at the start of the current resize.
    #[must_use]
    pub fn resize_anchor(&self) -> Option<ResizeAnchor> {
        match self.gesture {
            Gesture::Resizing { anchor, .. } => Some(anchor),
            _ => None,
        }
    }

    /// Whether resizes keep the starting aspect ratio.
    #[must_use]
    pub fn aspect_locked(&self) -> bool {
        self.aspect_locked
    }

    /// Toggle aspect-ratio locking. Takes effect on the next move event.
    pub fn set_aspect_locked(&mut self, locked: bool) {
        self.aspect_locked = locked;
    }

    /// Abandon any gesture in progress.
    pub fn reset(&mut self) {
        self.gesture = Gesture::Idle;
    }

    /// Apply one input event to `doc`.
    pub fn handle(&mut self, doc: &mut Document, event: &InputEvent) -> InteractionResponse {
        match event {
            InputEvent::Pointer(pointer) => self.handle_pointer(doc, pointer),
            InputEvent::Key(key) => self.handle_key(doc, key),
        }
    }

    /// Apply a pointer event to `doc`.
    pub fn handle_pointer(
        &mut self,
        doc: &mut Document,
        event: &PointerEvent,
    ) -> InteractionResponse {
        let point = event.point();
        match event.phase {
            PointerPhase::Down => self.pointer_down(doc, point),
            PointerPhase::Move => self.pointer_move(doc, point),
            PointerPhase::Up | PointerPhase::Leave => {
                let was_active = self.gesture != Gesture::Idle;
                if was_active {
                    tracing::debug!("Gesture ended ({:?})", self.mode());
                }
                self.reset();
                InteractionResponse::changed_if(was_active)
            }
        }
    }

    fn pointer_down(&mut self, doc: &mut Document, point: Point) -> InteractionResponse {
        let store = doc.elements_mut();

        if let Some(selected) = store.selected() {
            if let Some(handle) = hit_test_handle(point, selected) {
                let anchor = ResizeAnchor::capture(selected.size);
                tracing::debug!(
                    "Resize started from {handle} at {}x{}",
                    anchor.width,
                    anchor.height
                );
                self.gesture = Gesture::Resizing { handle, anchor };
                return InteractionResponse::Changed;
            }
        }

        let Some(index) = hit_test(point, store.as_slice()) else {
            self.reset();
            let had_selection = store.selection().is_some();
            if had_selection {
                store.select(None);
            }
            return InteractionResponse::changed_if(had_selection);
        };

        store.select(Some(index));
        store.bring_to_front(index);
        let Some(element) = store.selected() else {
            return InteractionResponse::Changed;
        };
        let offset = point - element.position;
        tracing::debug!("Drag started on element {index}");
        self.gesture = Gesture::Dragging { offset };
        InteractionResponse::Changed
    }

    fn pointer_move(&mut self, doc: &mut Document, point: Point) -> InteractionResponse {
        let store = doc.elements_mut();
        let Some(index) = store.selection() else {
            return InteractionResponse::Ignored;
        };

        match self.gesture {
            Gesture::Idle => InteractionResponse::Ignored,
            Gesture::Dragging { offset } => {
                let changed = store.update(index, |element| element.position = point - offset);
                InteractionResponse::changed_if(changed)
            }
            Gesture::Resizing { handle, anchor } => {
                let Some(element) = store.get(index) else {
                    return InteractionResponse::Ignored;
                };
                if !element.is_image() {
                    return InteractionResponse::Ignored;
                }
                let Some(next) =
                    compute_resize(handle, point, element.bounds(), anchor, self.aspect_locked)
                else {
                    return InteractionResponse::Ignored;
                };
                let changed = store.update(index, |element| {
                    element.position = next.origin;
                    element.size = next.size;
                });
                InteractionResponse::changed_if(changed)
            }
        }
    }

    /// Apply a key press to `doc`.
    pub fn handle_key(&mut self, doc: &mut Document, event: &KeyEvent) -> InteractionResponse {
        let store = doc.elements_mut();
        let Some(index) = store.selection() else {
            return if event.key == Key::Escape {
                InteractionResponse::DismissOverlay
            } else {
                InteractionResponse::Ignored
            };
        };

        let mods = event.modifiers;
        match event.key {
            Key::Escape => {
                self.reset();
                store.select(None);
                InteractionResponse::Changed
            }
            Key::Delete | Key::Backspace => {
                self.reset();
                InteractionResponse::changed_if(store.remove(index))
            }
            Key::PageUp | Key::ArrowUp if event.key == Key::PageUp || mods.ctrl => {
                let raised = index + 1 < store.len() && store.move_element(index, index + 1);
                InteractionResponse::changed_if(raised)
            }
            Key::PageDown | Key::ArrowDown if event.key == Key::PageDown || mods.ctrl => {
                let lowered = index > 0 && store.move_element(index, index - 1);
                InteractionResponse::changed_if(lowered)
            }
            Key::Character(']' | '}') if mods.shift => {
                let raised = index + 1 < store.len() && store.move_element(index, index + 1);
                InteractionResponse::changed_if(raised)
            }
            Key::Character('[' | '{') if mods.shift => {
                let lowered = index > 0 && store.move_element(index, index - 1);
                InteractionResponse::changed_if(lowered)
            }
            Key::ArrowUp | Key::ArrowDown | Key::ArrowLeft | Key::ArrowRight => {
                let step = if mods.shift {
                    self.nudge_step_large
                } else {
                    self.nudge_step
                };
                let delta = match event.key {
                    Key::ArrowUp => Point::new(0.0, -step),
                    Key::ArrowDown => Point::new(0.0, step),
                    Key::ArrowLeft => Point::new(-step, 0.0),
                    _ => Point::new(step, 0.0),
                };
                let moved =
                    store.update(index, |element| element.position = element.position + delta);
                InteractionResponse::changed_if(moved)
            }
            _ => InteractionResponse::Ignored,
        }
    }

    /// Cursor name to show with the pointer hovering at `point`.
    ///
    /// `"<handle>-resize"` over a handle of the selected image, `"move"`
    /// while anything is selected, `"default"` otherwise.
    #[must_use]
    pub fn cursor_hint(&self, doc: &Document, point: Point) -> &'static str {
        if let Some(handle) = self.active_handle() {
            return handle.cursor();
        }
        let Some(selected) = doc.elements().selected() else {
            return "default";
        };
        match hit_test_handle(point, selected) {
            Some(handle) => handle.cursor(),
            None => "move",
        }
    }
}

/// Compute the bounds produced by dragging `handle` to `pointer`.
///
/// The corner opposite `handle` stays fixed. With `aspect_locked`, the axis
/// that moved further from the anchor size wins and the other is derived
/// from the anchor ratio; ties go to height. Returns `None` when either
/// resulting dimension is not above [`MIN_ELEMENT_SIZE`].
#[must_use]
pub fn compute_resize(
    handle: Handle,
    pointer: Point,
    bounds: Rect,
    anchor: ResizeAnchor,
    aspect_locked: bool,
) -> Option<Rect> {
    let Rect { origin, size } = bounds;
    let (mut w, mut h) = match handle {
        Handle::SouthEast => (pointer.x - origin.x, pointer.y - origin.y),
        Handle::SouthWest => (origin.x + size.w - pointer.x, pointer.y - origin.y),
        Handle::NorthEast => (pointer.x - origin.x, origin.y + size.h - pointer.y),
        Handle::NorthWest => (origin.x + size.w - pointer.x, origin.y + size.h - pointer.y),
    };

    if aspect_locked {
        if (w - anchor.width).abs() > (h - anchor.height).abs() {
            h = w / anchor.aspect_ratio;
        } else {
            w = h * anchor.aspect_ratio;
        }
    }

    if !(w > MIN_ELEMENT_SIZE && h > MIN_ELEMENT_SIZE) {
        return None;
    }

    let x = match handle {
        Handle::NorthWest | Handle::SouthWest => origin.x + size.w - w,
        Handle::NorthEast | Handle::SouthEast => origin.x,
    };
    let y = match handle {
        Handle::NorthWest | Handle::NorthEast => origin.y + size.h - h,
        Handle::SouthWest | Handle::SouthEast => origin.y,
    };
    Some(Rect::new(Point::new(x, y), Size::new(w, h)))
}
