//! Card elements - the building blocks of a document.

use serde::{Deserialize, Serialize};

use crate::config::TextSettings;
use crate::geometry::{Point, Rect, Size, UNMEASURED_HEIGHT, UNMEASURED_WIDTH};
use crate::resource::Bitmap;

/// Content and styling of a text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    /// The literal text.
    pub text: String,
    /// Fill color as hex.
    pub color: String,
    /// Font size in pixels.
    pub font_size: u32,
    /// Font family name.
    pub font_family: String,
}

impl TextContent {
    /// Create text content with explicit styling.
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        color: impl Into<String>,
        font_size: u32,
        font_family: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            color: color.into(),
            font_size,
            font_family: font_family.into(),
        }
    }

    /// Create text content styled with the given settings.
    #[must_use]
    pub fn styled(text: impl Into<String>, settings: &TextSettings) -> Self {
        Self::new(
            text,
            settings.color.clone(),
            settings.font_size,
            settings.font_family.clone(),
        )
    }
}

/// The payload of an element.
///
/// `R` is how an image resource is held: a loaded [`Bitmap`] for a live
/// document, a locator `String` for a dehydrated record.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind<R> {
    /// A text label. Its size comes from text metrics.
    Text(TextContent),

    /// A bitmap image. Its size is user-adjustable.
    Image {
        /// The image resource.
        resource: R,
        /// Optional display label.
        name: Option<String>,
    },
}

/// An element placed on the card surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Element<R = Bitmap> {
    /// Top-left corner in surface coordinates.
    pub position: Point,
    /// Width and height.
    pub size: Size,
    /// Rotation in degrees, clockwise about the element centre.
    pub rotation: f32,
    /// Element content.
    pub kind: ElementKind<R>,
}

/// A dehydrated element holding an image locator instead of a bitmap.
pub type ElementRecord = Element<String>;

impl<R> Element<R> {
    /// Create a text element. Its size stays zero until measured.
    #[must_use]
    pub fn text(content: TextContent, position: Point) -> Self {
        Self {
            position,
            size: Size::default(),
            rotation: 0.0,
            kind: ElementKind::Text(content),
        }
    }

    /// Create an image element.
    #[must_use]
    pub fn image(resource: R, name: Option<String>, position: Point, size: Size) -> Self {
        Self {
            position,
            size,
            rotation: 0.0,
            kind: ElementKind::Image { resource, name },
        }
    }

    /// Set the rotation in degrees.
    #[must_use]
    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    /// Whether this is an image element.
    #[must_use]
    pub fn is_image(&self) -> bool {
        matches!(self.kind, ElementKind::Image { .. })
    }

    /// The text content, if this is a text element.
    #[must_use]
    pub fn as_text(&self) -> Option<&TextContent> {
        match &self.kind {
            ElementKind::Text(content) => Some(content),
            ElementKind::Image { .. } => None,
        }
    }

    /// The image name, if this is a named image element.
    #[must_use]
    pub fn image_name(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Image { name, .. } => name.as_deref(),
            ElementKind::Text(_) => None,
        }
    }

    /// Exact bounds `[position, position + size]`.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.position, self.size)
    }

    /// Bounds used for pointer hit-testing.
    ///
    /// A zero dimension (text not yet measured) is replaced by a fixed
    /// fallback extent so the element stays selectable.
    #[must_use]
    pub fn hit_bounds(&self) -> Rect {
        let w = if self.size.w > 0.0 {
            self.size.w
        } else {
            UNMEASURED_WIDTH
        };
        let h = if self.size.h > 0.0 {
            self.size.h
        } else {
            UNMEASURED_HEIGHT
        };
        Rect::new(self.position, Size::new(w, h))
    }

    /// Convert the image resource representation, keeping geometry.
    pub fn map_resource<S>(&self, f: impl FnOnce(&R) -> S) -> Element<S> {
        let kind = match &self.kind {
            ElementKind::Text(content) => ElementKind::Text(content.clone()),
            ElementKind::Image { resource, name } => ElementKind::Image {
                resource: f(resource),
                name: name.clone(),
            },
        };
        Element {
            position: self.position,
            size: self.size,
            rotation: self.rotation,
            kind,
        }
    }
}

impl Element<Bitmap> {
    /// Dehydrate into a record that refers to the image by locator.
    #[must_use]
    pub fn to_record(&self) -> ElementRecord {
        self.map_resource(|bitmap| bitmap.locator().to_string())
    }
}
