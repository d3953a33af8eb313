//! Card export to SVG and PNG.
//!
//! Builds an SVG for a [`Document`] and rasterizes it with
//! resvg/tiny-skia. Bitmaps are embedded as PNG data URIs so the SVG is
//! self-contained.

use std::fmt::Write;
use std::sync::Arc;

use card_core::codec::escape_xml;
use card_core::{Document, EditorConfig, Element, ElementKind};

use crate::batch::CardSurface;
use crate::error::{RenderError, RenderResult};
use crate::image::{encode_png, to_data_uri};

/// Configuration for card export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportConfig {
    /// Card width in surface units.
    pub width: f32,
    /// Card height in surface units.
    pub height: f32,
    /// Scale factor (e.g. 2.0 for retina).
    pub scale: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self::from_editor(&EditorConfig::default())
    }
}

impl ExportConfig {
    /// Export at the editor's canvas size, unscaled.
    #[must_use]
    pub fn from_editor(config: &EditorConfig) -> Self {
        Self {
            width: config.canvas_width,
            height: config.canvas_height,
            scale: 1.0,
        }
    }

    /// Set the scale factor.
    #[must_use]
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }
}

/// Renders documents to SVG and PNG.
pub struct CardExporter {
    config: ExportConfig,
    fontdb: Arc<usvg::fontdb::Database>,
}

impl std::fmt::Debug for CardExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardExporter")
            .field("config", &self.config)
            .field("fonts", &self.fontdb.len())
            .finish()
    }
}

impl CardExporter {
    /// Create an exporter, loading the system fonts once.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        let mut fontdb = usvg::fontdb::Database::new();
        fontdb.load_system_fonts();
        tracing::debug!("Loaded {} font faces for export", fontdb.len());
        Self {
            config,
            fontdb: Arc::new(fontdb),
        }
    }

    /// Create an exporter with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ExportConfig::default())
    }

    /// The export configuration.
    #[must_use]
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Export the document to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    pub fn render_to_png(&self, doc: &Document) -> RenderResult<Vec<u8>> {
        let svg_string = self.render_to_svg(doc)?;
        let pixmap = self.rasterize_svg(&svg_string)?;

        pixmap
            .encode_png()
            .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))
    }

    /// Export the document to an SVG string.
    ///
    /// Elements are drawn bottom to top over the background color and
    /// background image. The background image covers the card, cropped to
    /// keep its aspect ratio.
    ///
    /// # Errors
    ///
    /// Returns an error if an embedded bitmap cannot be encoded.
    pub fn render_to_svg(&self, doc: &Document) -> RenderResult<String> {
        let (out_w, out_h) = self.output_dimensions();
        let ExportConfig { width, height, .. } = self.config;

        let mut svg = String::with_capacity(4096);
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{out_w}\" height=\"{out_h}\" viewBox=\"0 0 {width} {height}\">",
        );

        let _ = write!(
            svg,
            "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
            escape_xml(&doc.background_color),
        );

        if let Some(background) = &doc.background_image {
            let href = to_data_uri(&encode_png(background)?);
            let _ = write!(
                svg,
                "<image x=\"0\" y=\"0\" width=\"{width}\" height=\"{height}\" preserveAspectRatio=\"xMidYMid slice\" href=\"{href}\"/>",
            );
        }

        for element in doc.elements().iter() {
            render_element_svg(&mut svg, element)?;
        }

        svg.push_str("</svg>");
        Ok(svg)
    }

    /// Output dimensions (width, height) in pixels.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn output_dimensions(&self) -> (u32, u32) {
        let out_w = (self.config.width * self.config.scale).round() as u32;
        let out_h = (self.config.height * self.config.scale).round() as u32;
        (out_w.max(1), out_h.max(1))
    }

    /// Rasterize an SVG string to a tiny-skia Pixmap.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn rasterize_svg(&self, svg_string: &str) -> RenderResult<tiny_skia::Pixmap> {
        let mut opt = usvg::Options::default();
        opt.fontdb = Arc::clone(&self.fontdb);
        let tree = usvg::Tree::from_str(svg_string, &opt)
            .map_err(|e| RenderError::Export(format!("SVG parsing failed: {e}")))?;

        let px_w = tree.size().width().round() as u32;
        let px_h = tree.size().height().round() as u32;

        let mut pixmap = tiny_skia::Pixmap::new(px_w.max(1), px_h.max(1))
            .ok_or_else(|| RenderError::Export("Failed to create pixmap".to_string()))?;

        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        Ok(pixmap)
    }
}

impl CardSurface for CardExporter {
    fn capture(&self, doc: &Document) -> RenderResult<Vec<u8>> {
        self.render_to_png(doc)
    }
}

/// Render a single element to SVG.
fn render_element_svg(svg: &mut String, element: &Element) -> RenderResult<()> {
    let bounds = element.bounds();
    let (x, y) = (bounds.origin.x, bounds.origin.y);

    let rotated = element.rotation != 0.0;
    if rotated {
        let cx = x + bounds.size.w / 2.0;
        let cy = y + bounds.size.h / 2.0;
        let _ = write!(svg, "<g transform=\"rotate({} {cx} {cy})\">", element.rotation);
    }

    match &element.kind {
        ElementKind::Text(content) => {
            let font_size = content.font_size;
            #[allow(clippy::cast_precision_loss)]
            let baseline = y + font_size as f32;
            let _ = write!(
                svg,
                "<text x=\"{x}\" y=\"{baseline}\" font-size=\"{font_size}\" fill=\"{}\" font-family=\"{}\">{}</text>",
                escape_xml(&content.color),
                escape_xml(&content.font_family),
                escape_xml(&content.text),
            );
        }

        ElementKind::Image { resource, .. } => {
            let href = to_data_uri(&encode_png(resource)?);
            let _ = write!(
                svg,
                "<image x=\"{x}\" y=\"{y}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"none\" href=\"{href}\"/>",
                bounds.size.w, bounds.size.h,
            );
        }
    }

    if rotated {
        svg.push_str("</g>");
    }
    Ok(())
}
