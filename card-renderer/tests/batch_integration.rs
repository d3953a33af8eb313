//! Integration tests for importing, navigating and exporting card batches.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use card_core::{Document, EditorConfig, ElementKind};
use card_renderer::{
    ArchiveWriter, BatchController, CardExporter, CardSurface, ExportConfig, ExportError,
    LoadResult, RenderError, RenderResult, ResourceFetcher, ResourceLoadError, ResourceLoader,
    ResourceSource,
};
use url::Url;

/// 1x1 red PNG.
const RED_PIXEL_PNG_BASE64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

fn red_pixel_png() -> Vec<u8> {
    base64::engine::general_purpose::STANDARD
        .decode(RED_PIXEL_PNG_BASE64)
        .expect("fixture decodes")
}

/// Serves known URLs; URLs under `/slow/` never answer.
struct TestFetcher {
    urls: HashMap<String, Vec<u8>>,
}

#[async_trait]
impl ResourceFetcher for TestFetcher {
    async fn fetch_url(&self, url: &Url) -> LoadResult<Vec<u8>> {
        if url.path().starts_with("/slow/") {
            return std::future::pending().await;
        }
        self.urls
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| ResourceLoadError::Network(format!("{url} returned 404 Not Found")))
    }

    async fn read_path(&self, _path: &Path) -> LoadResult<Vec<u8>> {
        Err(ResourceLoadError::Io(std::io::Error::from(
            std::io::ErrorKind::NotFound,
        )))
    }
}

fn controller() -> BatchController {
    let fetcher = TestFetcher {
        urls: HashMap::from([
            ("https://cards.test/a.png".to_string(), red_pixel_png()),
            ("https://cards.test/b.png".to_string(), red_pixel_png()),
        ]),
    };
    let loader =
        ResourceLoader::with_fetcher(Arc::new(fetcher)).with_timeout(Duration::from_millis(100));
    BatchController::new(loader, EditorConfig::default())
}

fn card(background: &str, text: &str) -> String {
    format!(
        r##"<card>
    <background color="{background}"/>
    <elements>
      <text x="10" y="20" color="#000000" fontSize="16">{text}</text>
      <image x="30" y="40" width="50" height="50" src="https://cards.test/a.png"/>
    </elements>
  </card>"##
    )
}

fn cards(cards: &[String]) -> String {
    format!("<cards>{}</cards>", cards.concat())
}

/// Records what it captured; fails on red backgrounds.
#[derive(Default)]
struct RecordingSurface {
    captured: std::sync::Mutex<Vec<String>>,
}

impl CardSurface for RecordingSurface {
    fn capture(&self, doc: &Document) -> RenderResult<Vec<u8>> {
        if doc.background_color == "#ff0000" {
            return Err(RenderError::Export("red is not allowed".to_string()));
        }
        self.captured
            .lock()
            .expect("lock")
            .push(doc.background_color.clone());
        Ok(doc.background_color.as_bytes().to_vec())
    }
}

#[derive(Default)]
struct MemoryArchive {
    entries: Vec<(String, Vec<u8>)>,
    finished: bool,
    fail_finish: bool,
}

impl ArchiveWriter for MemoryArchive {
    fn add_entry(&mut self, name: &str, data: &[u8]) -> std::io::Result<()> {
        self.entries.push((name.to_string(), data.to_vec()));
        Ok(())
    }

    fn finish(&mut self) -> std::io::Result<()> {
        if self.fail_finish {
            return Err(std::io::Error::other("disk full"));
        }
        self.finished = true;
        Ok(())
    }
}

#[tokio::test]
async fn test_two_card_import() {
    let mut batch = controller();
    batch
        .import_xml(&cards(&[card("#ffffff", "One"), card("#eeeeee", "Two")]))
        .await
        .expect("import");

    assert_eq!(batch.len(), 2);
    assert_eq!(batch.cursor(), 0);
    assert!(batch.is_batch());

    let doc = batch.document();
    assert_eq!(doc.elements().len(), 2);
    let text = doc.elements().get(0).expect("text");
    assert_eq!(text.as_text().map(|t| t.font_size), Some(16));
    let image = doc.elements().get(1).expect("image");
    match &image.kind {
        ElementKind::Image { resource, .. } => {
            assert_eq!(resource.locator(), "https://cards.test/a.png");
            assert_eq!(resource.width(), 1);
        }
        ElementKind::Text(_) => panic!("expected image"),
    }
}

#[tokio::test]
async fn test_go_to_out_of_range_is_noop() {
    let mut batch = controller();
    batch
        .import_xml(&cards(&[
            card("#111111", "One"),
            card("#222222", "Two"),
            card("#333333", "Three"),
        ]))
        .await
        .expect("import");
    assert!(batch.go_to(1).await);

    assert!(!batch.go_to(5).await);
    assert_eq!(batch.cursor(), 1);
    assert_eq!(batch.document().background_color, "#222222");
    assert_eq!(batch.document().elements().len(), 2);
}

#[tokio::test]
async fn test_edits_survive_navigation() {
    let mut batch = controller();
    batch
        .import_xml(&cards(&[card("#111111", "One"), card("#222222", "Two")]))
        .await
        .expect("import");

    assert!(batch.document_mut().elements_mut().remove(0));
    assert!(batch.go_to(1).await);
    assert!(batch.go_to(0).await);

    let doc = batch.document();
    assert_eq!(doc.elements().len(), 1);
    assert!(doc.elements().get(0).expect("image").is_image());
}

#[tokio::test]
async fn test_stalled_image_times_out_and_rest_hydrates() {
    let xml = r##"<cards><card>
        <background color="#abcdef" image="https://cards.test/slow/bg.png"/>
        <elements>
          <image x="10" y="10" width="40" height="40" src="https://cards.test/slow/a.png"/>
          <text x="10" y="20">Still here</text>
          <image x="60" y="60" width="40" height="40" src="https://cards.test/b.png"/>
        </elements>
    </card></cards>"##;

    let mut batch = controller();
    batch.import_xml(xml).await.expect("import");

    let doc = batch.document();
    assert_eq!(doc.background_color, "#abcdef");
    assert!(doc.background_image.is_none());
    assert_eq!(doc.elements().len(), 2);
    assert_eq!(
        doc.elements().get(0).and_then(|e| e.as_text()).map(|t| t.text.as_str()),
        Some("Still here")
    );
    assert!(doc.elements().get(1).expect("image").is_image());
}

#[tokio::test]
async fn test_direct_timeout_error() {
    let fetcher = TestFetcher {
        urls: HashMap::new(),
    };
    let loader =
        ResourceLoader::with_fetcher(Arc::new(fetcher)).with_timeout(Duration::from_millis(50));
    let result = loader
        .load(ResourceSource::Url("https://cards.test/slow/x.png".to_string()))
        .await;
    assert!(matches!(result, Err(ResourceLoadError::Timeout(_))));
}

#[tokio::test]
async fn test_export_all_skips_failures_and_keeps_cursor() {
    let mut batch = controller();
    batch
        .import_xml(&cards(&[
            card("#111111", "One"),
            card("#ff0000", "Red"),
            card("#333333", "Three"),
        ]))
        .await
        .expect("import");
    assert!(batch.go_to(2).await);
    batch.document_mut().background_color = "#444444".to_string();

    let surface = RecordingSurface::default();
    let mut archive = MemoryArchive::default();
    let summary = batch
        .export_all(&surface, &mut archive)
        .await
        .expect("export");

    assert_eq!(summary.exported, 2);
    assert_eq!(summary.skipped, vec![1]);
    assert!(archive.finished);
    let names: Vec<&str> = archive.entries.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["card_1.png", "card_3.png"]);
    assert_eq!(
        *surface.captured.lock().expect("lock"),
        vec!["#111111", "#444444"]
    );

    assert_eq!(batch.cursor(), 2);
    assert_eq!(batch.document().background_color, "#444444");
    assert_eq!(batch.records()[2].background_color, "#444444");
}

#[tokio::test]
async fn test_export_empty_batch_fails() {
    let mut batch = controller();
    let mut archive = MemoryArchive::default();
    let result = batch
        .export_all(&RecordingSurface::default(), &mut archive)
        .await;
    assert!(matches!(result, Err(ExportError::EmptyBatch)));
    assert!(archive.entries.is_empty());
}

#[tokio::test]
async fn test_archive_failure_keeps_live_document() {
    let mut batch = controller();
    batch
        .import_xml(&cards(&[card("#111111", "One"), card("#222222", "Two")]))
        .await
        .expect("import");

    let mut archive = MemoryArchive {
        fail_finish: true,
        ..MemoryArchive::default()
    };
    let result = batch
        .export_all(&RecordingSurface::default(), &mut archive)
        .await;
    assert!(matches!(result, Err(ExportError::Archive(_))));
    assert_eq!(batch.cursor(), 0);
    assert_eq!(batch.document().background_color, "#111111");
    assert_eq!(batch.document().elements().len(), 2);
}

#[tokio::test]
async fn test_export_with_card_exporter_writes_pngs() {
    let mut batch = controller();
    batch
        .import_xml(&cards(&[card("#111111", "One"), card("#222222", "Two")]))
        .await
        .expect("import");

    let exporter = CardExporter::new(ExportConfig {
        width: 120.0,
        height: 80.0,
        scale: 1.0,
    });
    let mut archive = MemoryArchive::default();
    let summary = batch
        .export_all(&exporter, &mut archive)
        .await
        .expect("export");

    assert_eq!(summary.exported, 2);
    for (_, png) in &archive.entries {
        assert_eq!(&png[0..4], &[137, 80, 78, 71]);
    }
}

#[tokio::test]
async fn test_xml_export_round_trips_batch() {
    let mut batch = controller();
    batch
        .import_xml(&cards(&[card("#111111", "One"), card("#222222", "Two")]))
        .await
        .expect("import");
    batch
        .add_image(ResourceSource::Bytes(red_pixel_png()))
        .await
        .expect("add image");

    let xml = batch.export_xml();
    let mut again = controller();
    again.import_xml(&xml).await.expect("re-import");

    assert_eq!(again.len(), 2);
    assert_eq!(again.document().elements().len(), 3);
    assert_eq!(again.records()[1].background_color, "#222222");
}
