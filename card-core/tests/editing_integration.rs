//! Integration tests for editing a card through the public API.
//!
//! Drives a document with pointer and keyboard events, then checks that the
//! result survives the interchange format.

use std::sync::{Arc, Mutex};

use card_core::codec;
use card_core::{
    ApproxTextMeasure, Bitmap, Document, EditorConfig, Element, InputEvent, InteractionMode,
    InteractionResponse, InteractionSession, Key, KeyEvent, KeyModifiers, Point, PointerEvent,
    Size, StoreChange, TextSettings,
};

const CANVAS: Size = Size::new(800.0, 600.0);

fn bitmap(locator: &str, w: u32, h: u32) -> Bitmap {
    Bitmap::new(locator, w, h, vec![255; (w * h * 4) as usize])
}

fn send(
    session: &mut InteractionSession,
    doc: &mut Document,
    event: impl Into<InputEvent>,
) -> InteractionResponse {
    session.handle(doc, &event.into())
}

// ==========================================================================
// Gesture sequences
// ==========================================================================

#[test]
fn test_select_drag_resize_sequence() {
    let mut doc = Document::new();
    let image = doc.add_image(bitmap("photo.png", 400, 200), CANVAS, 200.0);
    let element = doc.elements().get(image).expect("image");
    assert_eq!(element.size, Size::new(200.0, 100.0));
    assert_eq!(element.position, Point::new(300.0, 250.0));

    let mut session = InteractionSession::new(true);

    // Grab the middle of the image and drag it to the top-left area.
    send(&mut session, &mut doc, PointerEvent::down(400.0, 300.0));
    assert_eq!(session.mode(), InteractionMode::Dragging);
    send(&mut session, &mut doc, PointerEvent::moved(200.0, 150.0));
    send(&mut session, &mut doc, PointerEvent::up(200.0, 150.0));
    let moved = doc.elements().get(0).expect("image");
    assert_eq!(moved.position, Point::new(100.0, 100.0));

    // Grab the south-east handle and pull it out.
    send(&mut session, &mut doc, PointerEvent::down(300.0, 200.0));
    assert_eq!(session.mode(), InteractionMode::Resizing);
    send(&mut session, &mut doc, PointerEvent::moved(400.0, 220.0));
    send(&mut session, &mut doc, PointerEvent::up(400.0, 220.0));

    let resized = doc.elements().get(0).expect("image");
    assert_eq!(resized.position, Point::new(100.0, 100.0));
    assert!((resized.size.w - 300.0).abs() < 1e-4);
    assert!((resized.size.h - 150.0).abs() < 1e-4);
    assert_eq!(session.mode(), InteractionMode::Idle);
}

#[test]
fn test_clicking_lower_element_brings_it_to_front() {
    let mut doc = Document::new();
    doc.add_image(bitmap("a.png", 100, 100), CANVAS, 200.0);
    doc.add_text("Caption", &TextSettings::default(), CANVAS);
    doc.layout_text(&ApproxTextMeasure);

    let mut session = InteractionSession::default();
    // The image covers 350..450 x 250..350; the text starts at the canvas centre.
    send(&mut session, &mut doc, PointerEvent::down(360.0, 310.0));
    send(&mut session, &mut doc, PointerEvent::up(360.0, 310.0));

    assert_eq!(doc.elements().selection(), Some(1));
    assert!(doc.elements().selected().is_some_and(Element::is_image));
}

#[test]
fn test_keyboard_edits_notify_listeners() {
    let mut doc = Document::new();
    doc.add_text("One", &TextSettings::default(), CANVAS);
    doc.add_text("Two", &TextSettings::default(), CANVAS);

    let changes = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&changes);
    doc.elements_mut()
        .subscribe(move |change| sink.lock().expect("lock").push(*change));

    let mut session = InteractionSession::default();
    doc.elements_mut().select(Some(1));
    send(
        &mut session,
        &mut doc,
        KeyEvent::with_modifiers(Key::PageDown, KeyModifiers::default()),
    );
    send(&mut session, &mut doc, KeyEvent::new(Key::Delete));

    assert_eq!(doc.elements().len(), 1);
    assert_eq!(
        *changes.lock().expect("lock"),
        vec![
            StoreChange::Selected(Some(1)),
            StoreChange::Moved { from: 1, to: 0 },
            StoreChange::Removed(0),
        ]
    );
}

// ==========================================================================
// Interchange round trip
// ==========================================================================

#[test]
fn test_edited_document_round_trips() {
    let mut doc = Document::new();
    doc.background_color = "#eeeeee".to_string();
    let image = doc.add_image(bitmap("https://example.com/a.png", 300, 150), CANVAS, 200.0);
    doc.rename_image(image, "Banner").expect("rename");
    let text = doc
        .add_text("Hello <world>", &TextSettings::default(), CANVAS)
        .expect("text");
    doc.update_text(text, "Hello & goodbye", "#ff00ff", 30).expect("update");

    let xml = codec::encode_document(&doc);
    let records = codec::decode(&xml, &EditorConfig::default()).expect("decode");
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record.background_color, "#eeeeee");
    assert_eq!(record.elements.len(), 2);
    assert_eq!(record.elements[0].image_name(), Some("Banner"));
    assert_eq!(record.elements[0].size, Size::new(200.0, 100.0));

    let content = record.elements[1].as_text().expect("text");
    assert_eq!(content.text, "Hello & goodbye");
    assert_eq!(content.color, "#ff00ff");
    assert_eq!(content.font_size, 30);
    assert_eq!(record.elements[1].position, Point::new(400.0, 300.0));
}

#[test]
fn test_many_cards_keep_their_order() {
    let records: Vec<_> = (1..=5)
        .map(|i| {
            let mut doc = Document::new();
            doc.add_text(&format!("Card {i}"), &TextSettings::default(), CANVAS);
            doc.dehydrate()
        })
        .collect();

    let decoded =
        codec::decode(&codec::encode(&records), &EditorConfig::default()).expect("decode");
    let labels: Vec<_> = decoded
        .iter()
        .filter_map(|r| r.elements.first().and_then(|e| e.as_text()).map(|t| t.text.clone()))
        .collect();
    assert_eq!(labels, vec!["Card 1", "Card 2", "Card 3", "Card 4", "Card 5"]);
}
