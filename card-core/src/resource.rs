//! Loaded bitmap handles.

use std::sync::Arc;

/// Longest locator prefix shown in debug output.
const DEBUG_LOCATOR_LEN: usize = 48;

/// A decoded RGBA8 bitmap together with the locator it was loaded from.
///
/// Cloning is cheap: the locator and pixels are shared. The locator is what
/// a dehydrated document stores in place of the pixels.
#[derive(Clone)]
pub struct Bitmap {
    locator: Arc<str>,
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
}

impl Bitmap {
    /// Wrap decoded pixels.
    ///
    /// `pixels` holds `width * height` RGBA8 samples.
    #[must_use]
    pub fn new(locator: impl Into<String>, width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            locator: Arc::from(locator.into()),
            width,
            height,
            pixels: Arc::from(pixels),
        }
    }

    /// Where the bitmap came from: a URL, a path or a data URI.
    #[must_use]
    pub fn locator(&self) -> &str {
        &self.locator
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// RGBA8 pixel data.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

impl PartialEq for Bitmap {
    fn eq(&self, other: &Self) -> bool {
        self.locator == other.locator
            && self.width == other.width
            && self.height == other.height
            && (Arc::ptr_eq(&self.pixels, &other.pixels) || self.pixels == other.pixels)
    }
}

// Data URI locators can be megabytes long.
impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let locator = match self.locator.char_indices().nth(DEBUG_LOCATOR_LEN) {
            Some((cut, _)) => format!("{}…", &self.locator[..cut]),
            None => self.locator.to_string(),
        };
        f.debug_struct("Bitmap")
            .field("locator", &locator)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pixels_len", &self.pixels.len())
            .finish()
    }
}
