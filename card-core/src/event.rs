//! Input events for card interaction.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Button pressed.
    Down,
    /// Pointer moved.
    Move,
    /// Button released.
    Up,
    /// Pointer left the surface.
    Leave,
}

/// A pointer event in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Phase of this pointer event.
    pub phase: PointerPhase,
    /// X position in surface coordinates.
    pub x: f32,
    /// Y position in surface coordinates.
    pub y: f32,
}

impl PointerEvent {
    /// Create a new pointer event.
    #[must_use]
    pub fn new(phase: PointerPhase, x: f32, y: f32) -> Self {
        Self { phase, x, y }
    }

    /// Button pressed at `(x, y)`.
    #[must_use]
    pub fn down(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Down, x, y)
    }

    /// Pointer moved to `(x, y)`.
    #[must_use]
    pub fn moved(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Move, x, y)
    }

    /// Button released at `(x, y)`.
    #[must_use]
    pub fn up(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Up, x, y)
    }

    /// Pointer left the surface.
    #[must_use]
    pub fn leave() -> Self {
        Self::new(PointerPhase::Leave, 0.0, 0.0)
    }

    /// Event position.
    #[must_use]
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Keys the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    /// Up arrow.
    ArrowUp,
    /// Down arrow.
    ArrowDown,
    /// Left arrow.
    ArrowLeft,
    /// Right arrow.
    ArrowRight,
    /// Forward delete.
    Delete,
    /// Backspace.
    Backspace,
    /// Escape.
    Escape,
    /// Page up.
    PageUp,
    /// Page down.
    PageDown,
    /// Any printable character, as produced with the active modifiers.
    Character(char),
}

impl Key {
    /// Parse a DOM-style key name (`"ArrowUp"`, `"Esc"`, `"]"`, …).
    ///
    /// Returns `None` for names that are neither a known key nor a single
    /// character.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let key = match name {
            "ArrowUp" | "Up" => Key::ArrowUp,
            "ArrowDown" | "Down" => Key::ArrowDown,
            "ArrowLeft" | "Left" => Key::ArrowLeft,
            "ArrowRight" | "Right" => Key::ArrowRight,
            "Delete" | "Del" => Key::Delete,
            "Backspace" => Key::Backspace,
            "Escape" | "Esc" => Key::Escape,
            "PageUp" => Key::PageUp,
            "PageDown" => Key::PageDown,
            _ => {
                let mut chars = name.chars();
                let c = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                Key::Character(c)
            }
        };
        Some(key)
    }
}

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct KeyModifiers {
    /// Shift key pressed.
    pub shift: bool,
    /// Control key pressed.
    pub ctrl: bool,
    /// Alt/Option key pressed.
    pub alt: bool,
    /// Meta/Command key pressed.
    pub meta: bool,
}

impl KeyModifiers {
    /// Only Shift held.
    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Only Control held.
    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
        alt: false,
        meta: false,
    };
}

/// A key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// The pressed key.
    pub key: Key,
    /// Active modifier keys.
    #[serde(default)]
    pub modifiers: KeyModifiers,
}

impl KeyEvent {
    /// A key press with no modifiers.
    #[must_use]
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: KeyModifiers::default(),
        }
    }

    /// A key press with the given modifiers.
    #[must_use]
    pub fn with_modifiers(key: Key, modifiers: KeyModifiers) -> Self {
        Self { key, modifiers }
    }
}

/// All input events the editor can receive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum InputEvent {
    /// Pointer (mouse or primary touch) event.
    Pointer(PointerEvent),

    /// Keyboard event.
    Key(KeyEvent),
}

impl From<PointerEvent> for InputEvent {
    fn from(event: PointerEvent) -> Self {
        InputEvent::Pointer(event)
    }
}

impl From<KeyEvent> for InputEvent {
    fn from(event: KeyEvent) -> Self {
        InputEvent::Key(event)
    }
}
