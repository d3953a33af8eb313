//! End-to-end tests for the cardsmith commands on real files.

use std::fs;
use std::path::Path;

use card_cli::commands::{self, PrefsUpdate};
use card_core::{EditorConfig, Preferences};

/// 1x1 red PNG.
const RED_PIXEL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

fn write_deck(dir: &Path) -> std::path::PathBuf {
    let xml = format!(
        r##"<?xml version="1.0"?>
<cards>
  <card>
    <background color="#fafafa"/>
    <elements>
      <image x="100" y="100" width="100" height="50" src="{RED_PIXEL}"/>
      <text x="10" y="20" color="#000000" fontSize="16">Front</text>
    </elements>
  </card>
  <card>
    <background color="#202020"/>
    <elements>
      <image x="5" y="5" width="40" height="40" src="missing/nowhere.png"/>
      <text x="10" y="20" color="#ffffff" fontSize="16">Back</text>
    </elements>
  </card>
</cards>"##
    );
    let path = dir.join("deck.xml");
    fs::write(&path, xml).expect("write deck");
    path
}

#[tokio::test]
async fn test_render_writes_one_png_per_card() {
    let dir = tempfile::tempdir().expect("tempdir");
    let deck = write_deck(dir.path());
    let out = dir.path().join("out");
    let config = EditorConfig {
        canvas_width: 160.0,
        canvas_height: 120.0,
        ..EditorConfig::default()
    };

    let summary = commands::render(&deck, &out, 1.0, &config)
        .await
        .expect("render");

    assert_eq!(summary.exported, 2);
    assert!(summary.skipped.is_empty());
    for name in ["card_1.png", "card_2.png"] {
        let png = fs::read(out.join(name)).expect("png written");
        assert_eq!(&png[0..4], &[137, 80, 78, 71]);
    }
}

#[tokio::test]
async fn test_normalize_drops_unloadable_images() {
    let dir = tempfile::tempdir().expect("tempdir");
    let deck = write_deck(dir.path());

    let xml = commands::normalize(&deck, &EditorConfig::default())
        .await
        .expect("normalize");

    assert_eq!(xml.matches("<card>").count(), 2);
    assert!(xml.contains(RED_PIXEL));
    assert!(!xml.contains("missing/nowhere.png"));
    assert!(xml.contains(">Back</text>"));
}

#[tokio::test]
async fn test_replay_drags_image() {
    let dir = tempfile::tempdir().expect("tempdir");
    let deck = write_deck(dir.path());
    let events = dir.path().join("events.json");
    fs::write(
        &events,
        r#"[
            {"type": "Pointer", "data": {"phase": "down", "x": 150, "y": 125}},
            {"type": "Pointer", "data": {"phase": "move", "x": 170, "y": 145}},
            {"type": "Pointer", "data": {"phase": "up", "x": 170, "y": 145}},
            {"type": "Key", "data": {"key": "ArrowRight", "modifiers": {"shift": true}}}
        ]"#,
    )
    .expect("write events");

    let xml = commands::replay(
        &deck,
        &events,
        0,
        &EditorConfig::default(),
        &Preferences::default(),
    )
    .await
    .expect("replay");

    assert!(xml.contains("<image x=\"130\" y=\"120\" width=\"100\" height=\"50\""));
    let text_at = xml.find(">Front</text>").expect("text kept");
    let image_at = xml.find("<image x=\"130\"").expect("image moved");
    assert!(text_at < image_at, "clicked image is brought to front");
}

#[tokio::test]
async fn test_replay_rejects_missing_card() {
    let dir = tempfile::tempdir().expect("tempdir");
    let deck = write_deck(dir.path());
    let events = dir.path().join("events.json");
    fs::write(&events, "[]").expect("write events");

    let result = commands::replay(
        &deck,
        &events,
        5,
        &EditorConfig::default(),
        &Preferences::default(),
    )
    .await;
    assert!(result.is_err());
}

#[test]
fn test_prefs_toggle_is_persisted() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("prefs.json");

    let shown = commands::prefs(&path, PrefsUpdate::default()).expect("read defaults");
    assert_eq!(shown, Preferences::default());
    assert!(!path.exists());

    let update = PrefsUpdate {
        aspect_lock: Some(false),
        grid: Some(true),
        ..PrefsUpdate::default()
    };
    commands::prefs(&path, update).expect("toggle");

    let stored = Preferences::load(&path).expect("load");
    assert!(!stored.aspect_ratio_locked);
    assert!(stored.show_grid);
    assert!(!stored.show_frames);
}
