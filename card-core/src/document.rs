//! The live card document and its dehydrated record form.

use crate::config::TextSettings;
use crate::element::{Element, ElementKind, ElementRecord, TextContent};
use crate::error::{CardError, CardResult};
use crate::geometry::{Point, Size};
use crate::resource::Bitmap;
use crate::store::ElementStore;

/// Background color of a fresh document.
pub const DEFAULT_BACKGROUND: &str = "#ffffff";

/// Name given to an image renamed to blank.
const FALLBACK_IMAGE_NAME: &str = "Image";

/// Average glyph advance as a fraction of the font size.
const APPROX_ADVANCE: f32 = 0.6;

/// Line height as a multiple of the font size.
const LINE_HEIGHT: f32 = 1.2;

/// Measures rendered text.
///
/// Text element sizes are derived from metrics, never set by the user. The
/// host supplies whatever measurement its rendering surface provides.
pub trait TextMeasure: Send + Sync {
    /// Width and height of `content` when drawn.
    fn measure(&self, content: &TextContent) -> Size;
}

/// Font-agnostic text metrics for hosts without a font engine.
///
/// Width assumes every glyph advances `0.6 ×` the font size; height is one
/// line at `1.2 ×` the font size.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxTextMeasure;

impl TextMeasure for ApproxTextMeasure {
    #[allow(clippy::cast_precision_loss)] // Font sizes and string lengths are small
    fn measure(&self, content: &TextContent) -> Size {
        let font_size = content.font_size as f32;
        let chars = content.text.chars().count() as f32;
        Size::new(chars * font_size * APPROX_ADVANCE, font_size * LINE_HEIGHT)
    }
}

/// A dehydrated document: image resources are referenced by locator.
#[derive(Debug, Clone, PartialEq)]
pub struct CardRecord {
    /// Background color as hex.
    pub background_color: String,
    /// Locator of the background image, if any.
    pub background_image: Option<String>,
    /// Elements bottom to top.
    pub elements: Vec<ElementRecord>,
}

impl Default for CardRecord {
    fn default() -> Self {
        Self {
            background_color: DEFAULT_BACKGROUND.to_string(),
            background_image: None,
            elements: Vec::new(),
        }
    }
}

/// The hydrated document being edited or rendered.
#[derive(Debug)]
pub struct Document {
    /// Background color as hex.
    pub background_color: String,
    /// Background image drawn over the color.
    pub background_image: Option<Bitmap>,
    elements: ElementStore,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty white document.
    #[must_use]
    pub fn new() -> Self {
        Self {
            background_color: DEFAULT_BACKGROUND.to_string(),
            background_image: None,
            elements: ElementStore::new(),
        }
    }

    /// Assemble a document from already-loaded parts.
    #[must_use]
    pub fn from_parts(
        background_color: impl Into<String>,
        background_image: Option<Bitmap>,
        elements: Vec<Element>,
    ) -> Self {
        Self {
            background_color: background_color.into(),
            background_image,
            elements: ElementStore::from_elements(elements),
        }
    }

    /// The element stack.
    #[must_use]
    pub fn elements(&self) -> &ElementStore {
        &self.elements
    }

    /// The element stack, mutably.
    pub fn elements_mut(&mut self) -> &mut ElementStore {
        &mut self.elements
    }

    /// Add a text element anchored at the canvas centre.
    ///
    /// The text is trimmed; blank text adds nothing and returns `None`.
    pub fn add_text(&mut self, text: &str, style: &TextSettings, canvas: Size) -> Option<usize> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let position = Point::new(canvas.w / 2.0, canvas.h / 2.0);
        let index = self
            .elements
            .add(Element::text(TextContent::styled(text, style), position));
        tracing::debug!("Added text element {index}");
        Some(index)
    }

    /// Add an image element centred on the canvas.
    ///
    /// The image keeps its aspect ratio and is scaled down so its longer
    /// side is at most `max_extent`. It is named `Image N`, where N counts
    /// the images in the document including this one.
    pub fn add_image(&mut self, bitmap: Bitmap, canvas: Size, max_extent: f32) -> usize {
        let size = fit_within(bitmap_size(&bitmap), max_extent);
        let position = Point::new(canvas.w / 2.0 - size.w / 2.0, canvas.h / 2.0 - size.h / 2.0);
        let ordinal = self.elements.iter().filter(|e| e.is_image()).count() + 1;
        let name = format!("Image {ordinal}");

        let index = self
            .elements
            .add(Element::image(bitmap, Some(name), position, size));
        tracing::debug!("Added image element {index} at {}x{}", size.w, size.h);
        index
    }

    /// Replace the content and styling of a text element.
    ///
    /// The element's size is reset so it is measured again.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range or not a text element.
    pub fn update_text(
        &mut self,
        index: usize,
        text: &str,
        color: &str,
        font_size: u32,
    ) -> CardResult<()> {
        self.check_kind(index, false)?;
        self.elements.update(index, |element| {
            if let ElementKind::Text(content) = &mut element.kind {
                content.text = text.to_string();
                content.color = color.to_string();
                content.font_size = font_size;
            }
            element.size = Size::default();
        });
        Ok(())
    }

    /// Rename an image element.
    ///
    /// The name is trimmed; a blank name becomes `Image`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range or not an image element.
    pub fn rename_image(&mut self, index: usize, name: &str) -> CardResult<()> {
        self.check_kind(index, true)?;
        let trimmed = name.trim();
        let name = if trimmed.is_empty() {
            FALLBACK_IMAGE_NAME
        } else {
            trimmed
        };
        self.elements.update(index, |element| {
            if let ElementKind::Image { name: slot, .. } = &mut element.kind {
                *slot = Some(name.to_string());
            }
        });
        Ok(())
    }

    /// Clear back to an empty white document.
    pub fn reset(&mut self) {
        self.background_color = DEFAULT_BACKGROUND.to_string();
        self.background_image = None;
        self.elements.clear();
    }

    /// Size every text element from `measure`.
    pub fn layout_text(&mut self, measure: &dyn TextMeasure) {
        self.elements.update_all(|element| {
            if let ElementKind::Text(content) = &element.kind {
                element.size = measure.measure(content);
            }
        });
    }

    /// Convert to a record that refers to images by locator.
    #[must_use]
    pub fn dehydrate(&self) -> CardRecord {
        CardRecord {
            background_color: self.background_color.clone(),
            background_image: self
                .background_image
                .as_ref()
                .map(|bitmap| bitmap.locator().to_string()),
            elements: self.elements.iter().map(Element::to_record).collect(),
        }
    }

    fn check_kind(&self, index: usize, want_image: bool) -> CardResult<()> {
        let element = self.elements.get(index).ok_or(CardError::IndexOutOfRange {
            index,
            len: self.elements.len(),
        })?;
        match (want_image, element.is_image()) {
            (true, false) => Err(CardError::NotImage(index)),
            (false, true) => Err(CardError::NotText(index)),
            _ => Ok(()),
        }
    }
}

#[allow(clippy::cast_precision_loss)] // Bitmap dimensions fit in f32
fn bitmap_size(bitmap: &Bitmap) -> Size {
    Size::new(bitmap.width() as f32, bitmap.height() as f32)
}

fn fit_within(size: Size, max_extent: f32) -> Size {
    if size.w > size.h && size.w > max_extent {
        Size::new(max_extent, size.h / size.w * max_extent)
    } else if size.h > max_extent {
        Size::new(size.w / size.h * max_extent, max_extent)
    } else {
        size
    }
}
