//! The `cards` XML interchange format.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <cards>
//!   <card>
//!     <background color="#ffffff" image="bg.png"/>
//!     <elements>
//!       <image x="10" y="10" width="50" height="50" name="Logo" src="logo.png"/>
//!       <text x="10" y="20" color="#000000" fontSize="16" fontFamily="Arial">Hello</text>
//!     </elements>
//!   </card>
//! </cards>
//! ```
//!
//! Children of `elements` are written bottom to top and read back in
//! document order, so z-order survives a round trip. Positions and image
//! sizes are rounded to integers on the way out.

use std::fmt::Write;

use crate::config::EditorConfig;
use crate::document::{CardRecord, Document};
use crate::element::{ElementKind, ElementRecord, TextContent};
use crate::error::ImportError;
use crate::geometry::{Point, Size};

/// Size given to an image whose `width`/`height` are missing.
const DEFAULT_IMAGE_SIZE: f32 = 100.0;

const INDENT: &str = "  ";

/// Serialize records to a `cards` document.
#[must_use]
pub fn encode(records: &[CardRecord]) -> String {
    let mut xml = String::with_capacity(256 + records.len() * 512);
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<cards>\n");
    for record in records {
        encode_card(&mut xml, record);
    }
    xml.push_str("</cards>\n");
    xml
}

/// Serialize a single live document as a one-card `cards` document.
#[must_use]
pub fn encode_document(doc: &Document) -> String {
    encode(&[doc.dehydrate()])
}

fn encode_card(xml: &mut String, record: &CardRecord) {
    let _ = writeln!(xml, "{INDENT}<card>");

    let _ = write!(
        xml,
        "{INDENT}{INDENT}<background color=\"{}\"",
        escape_xml(&record.background_color)
    );
    if let Some(image) = &record.background_image {
        let _ = write!(xml, " image=\"{}\"", escape_xml(image));
    }
    xml.push_str("/>\n");

    if record.elements.is_empty() {
        let _ = writeln!(xml, "{INDENT}{INDENT}<elements/>");
    } else {
        let _ = writeln!(xml, "{INDENT}{INDENT}<elements>");
        for element in &record.elements {
            encode_element(xml, element);
        }
        let _ = writeln!(xml, "{INDENT}{INDENT}</elements>");
    }

    let _ = writeln!(xml, "{INDENT}</card>");
}

fn encode_element(xml: &mut String, element: &ElementRecord) {
    let x = round(element.position.x);
    let y = round(element.position.y);
    let _ = write!(xml, "{INDENT}{INDENT}{INDENT}");

    match &element.kind {
        ElementKind::Text(content) => {
            let _ = write!(
                xml,
                "<text x=\"{x}\" y=\"{y}\" color=\"{}\" fontSize=\"{}\" fontFamily=\"{}\"",
                escape_xml(&content.color),
                content.font_size,
                escape_xml(&content.font_family),
            );
            write_rotation(xml, element.rotation);
            let _ = writeln!(xml, ">{}</text>", escape_xml(&content.text));
        }
        ElementKind::Image { resource, name } => {
            let _ = write!(
                xml,
                "<image x=\"{x}\" y=\"{y}\" width=\"{}\" height=\"{}\"",
                round(element.size.w),
                round(element.size.h),
            );
            if let Some(name) = name {
                let _ = write!(xml, " name=\"{}\"", escape_xml(name));
            }
            let _ = write!(xml, " src=\"{}\"", escape_xml(resource));
            write_rotation(xml, element.rotation);
            xml.push_str("/>\n");
        }
    }
}

fn write_rotation(xml: &mut String, rotation: f32) {
    if rotation != 0.0 {
        let _ = write!(xml, " rotation=\"{rotation}\"");
    }
}

#[allow(clippy::cast_possible_truncation)] // Surface coordinates are far below i64 range
fn round(value: f32) -> i64 {
    value.round() as i64
}

/// Parse a `cards` document into records.
///
/// Every `card` element anywhere in the document becomes one record.
/// Missing attributes take the defaults from `config`: position at the
/// canvas centre, images 100 × 100, text styled with `config.text`.
/// Non-numeric attributes count as missing, and so do zero sizes and
/// font sizes. A zero position is kept. `image` elements without a
/// `src` are skipped.
///
/// # Errors
///
/// Returns [`ImportError::Malformed`] if the input is not well-formed XML
/// and [`ImportError::NoCards`] if it contains no `card` element.
pub fn decode(xml: &str, config: &EditorConfig) -> Result<Vec<CardRecord>, ImportError> {
    let tree = roxmltree::Document::parse(xml).map_err(|e| ImportError::Malformed(e.to_string()))?;

    let records: Vec<CardRecord> = tree
        .descendants()
        .filter(|node| node.has_tag_name("card"))
        .map(|card| decode_card(card, config))
        .collect();

    if records.is_empty() {
        return Err(ImportError::NoCards);
    }

    tracing::debug!("Decoded {} cards", records.len());
    Ok(records)
}

fn decode_card(card: roxmltree::Node<'_, '_>, config: &EditorConfig) -> CardRecord {
    let mut record = CardRecord::default();

    if let Some(background) = first_descendant(card, "background") {
        if let Some(color) = non_empty_attr(background, "color") {
            record.background_color = color.to_string();
        }
        record.background_image = non_empty_attr(background, "image").map(str::to_string);
    }

    if let Some(container) = first_descendant(card, "elements") {
        record.elements = container
            .children()
            .filter(roxmltree::Node::is_element)
            .filter_map(|node| decode_element(node, config))
            .collect();
    }

    record
}

fn decode_element(node: roxmltree::Node<'_, '_>, config: &EditorConfig) -> Option<ElementRecord> {
    let canvas = config.canvas_size();
    let position = Point::new(
        number_attr(node, "x").unwrap_or(canvas.w / 2.0),
        number_attr(node, "y").unwrap_or(canvas.h / 2.0),
    );
    let rotation = number_attr(node, "rotation").unwrap_or(0.0);

    let element = match node.tag_name().name() {
        "text" => {
            let defaults = &config.text;
            let content = TextContent::new(
                text_content(node),
                non_empty_attr(node, "color").unwrap_or(defaults.color.as_str()),
                font_size_attr(node).unwrap_or(defaults.font_size),
                non_empty_attr(node, "fontFamily").unwrap_or(defaults.font_family.as_str()),
            );
            ElementRecord::text(content, position)
        }
        "image" => {
            let Some(src) = non_empty_attr(node, "src") else {
                tracing::debug!("Skipping image element without src");
                return None;
            };
            let size = Size::new(
                extent_attr(node, "width").unwrap_or(DEFAULT_IMAGE_SIZE),
                extent_attr(node, "height").unwrap_or(DEFAULT_IMAGE_SIZE),
            );
            let name = node.attribute("name").map(str::to_string);
            ElementRecord::image(src.to_string(), name, position, size)
        }
        _ => return None,
    };

    Some(element.with_rotation(rotation))
}

fn first_descendant<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
    tag: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    node.descendants().find(|n| n.has_tag_name(tag))
}

fn non_empty_attr<'a>(node: roxmltree::Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attribute(name).filter(|value| !value.is_empty())
}

/// A finite numeric attribute. Zero is a real value here.
fn number_attr(node: roxmltree::Node<'_, '_>, name: &str) -> Option<f32> {
    node.attribute(name)
        .and_then(|value| value.trim().parse::<f32>().ok())
        .filter(|value| value.is_finite())
}

/// A numeric attribute where zero counts as missing.
fn extent_attr(node: roxmltree::Node<'_, '_>, name: &str) -> Option<f32> {
    number_attr(node, name).filter(|value| *value != 0.0)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Checked positive and finite
fn font_size_attr(node: roxmltree::Node<'_, '_>) -> Option<u32> {
    extent_attr(node, "fontSize")
        .map(f32::round)
        .filter(|size| *size >= 1.0)
        .map(|size| size as u32)
}

fn text_content(node: roxmltree::Node<'_, '_>) -> String {
    node.descendants()
        .filter(roxmltree::Node::is_text)
        .filter_map(|n| n.text())
        .collect()
}

/// Escape the five XML special characters.
#[must_use]
pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
