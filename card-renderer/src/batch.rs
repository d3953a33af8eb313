//! Batch control over a sequence of cards.
//!
//! The controller keeps every card dehydrated (image locators only) except
//! the one under the cursor, which is hydrated into a live [`Document`].
//! Moving the cursor saves the live document back into the sequence first.

use card_core::codec;
use card_core::{
    ApproxTextMeasure, CardRecord, Document, EditorConfig, Element, ElementKind, ImportError,
    TextMeasure,
};

use crate::error::{ExportError, ExportResult, LoadResult, RenderResult};
use crate::loader::{ResourceLoader, ResourceSource};

/// Something that can turn a document into PNG bytes.
pub trait CardSurface: Send + Sync {
    /// Render `doc` and return the encoded PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if the card cannot be rendered.
    fn capture(&self, doc: &Document) -> RenderResult<Vec<u8>>;
}

/// Destination for the PNGs of a batch export.
pub trait ArchiveWriter: Send {
    /// Store one named entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be written.
    fn add_entry(&mut self, name: &str, data: &[u8]) -> std::io::Result<()>;

    /// Complete the archive once every entry has been added.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive cannot be completed.
    fn finish(&mut self) -> std::io::Result<()>;
}

/// Outcome of a batch export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Number of cards written to the archive.
    pub exported: usize,
    /// Indices of cards that failed to render.
    pub skipped: Vec<usize>,
}

/// Archive entry name for the card at `index`.
#[must_use]
pub fn entry_name(index: usize) -> String {
    format!("card_{}.png", index + 1)
}

/// Load every resource a record refers to.
///
/// Resources that fail to load are logged and left out: a missing
/// background image leaves just the color, a missing element image drops
/// that element. Text elements are sized with `measure`.
pub async fn hydrate_record(
    record: &CardRecord,
    loader: &ResourceLoader,
    measure: &dyn TextMeasure,
) -> Document {
    let background_image = match &record.background_image {
        Some(locator) => match loader.load_locator(locator).await {
            Ok(bitmap) => Some(bitmap),
            Err(e) => {
                tracing::warn!("Omitting background image {}: {e}", preview(locator));
                None
            }
        },
        None => None,
    };

    let mut elements: Vec<Element> = Vec::with_capacity(record.elements.len());
    for element in &record.elements {
        match &element.kind {
            ElementKind::Text(content) => elements.push(Element {
                position: element.position,
                size: element.size,
                rotation: element.rotation,
                kind: ElementKind::Text(content.clone()),
            }),
            ElementKind::Image { resource, .. } => match loader.load_locator(resource).await {
                Ok(bitmap) => elements.push(element.map_resource(|_| bitmap)),
                Err(e) => tracing::warn!("Omitting image {}: {e}", preview(resource)),
            },
        }
    }

    let mut doc = Document::from_parts(record.background_color.clone(), background_image, elements);
    doc.layout_text(measure);
    doc
}

/// Shorten data URIs for log output.
fn preview(locator: &str) -> &str {
    const MAX: usize = 64;
    match locator.char_indices().nth(MAX) {
        Some((end, _)) => &locator[..end],
        None => locator,
    }
}

/// Owns the card sequence, the cursor and the live document.
pub struct BatchController {
    records: Vec<CardRecord>,
    cursor: usize,
    document: Document,
    loader: ResourceLoader,
    config: EditorConfig,
    measure: Box<dyn TextMeasure>,
}

impl std::fmt::Debug for BatchController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchController")
            .field("records", &self.records.len())
            .field("cursor", &self.cursor)
            .field("document", &self.document)
            .field("loader", &self.loader)
            .finish_non_exhaustive()
    }
}

impl BatchController {
    /// Create a controller with an empty live document and no batch.
    #[must_use]
    pub fn new(loader: ResourceLoader, config: EditorConfig) -> Self {
        Self {
            records: Vec::new(),
            cursor: 0,
            document: Document::new(),
            loader,
            config,
            measure: Box::new(ApproxTextMeasure),
        }
    }

    /// Use a different text measurer for hydrated documents.
    #[must_use]
    pub fn with_measure(mut self, measure: Box<dyn TextMeasure>) -> Self {
        self.measure = measure;
        self
    }

    /// Number of cards in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the batch holds no cards.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Index of the live card.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether a batch has been imported.
    #[must_use]
    pub fn is_batch(&self) -> bool {
        !self.records.is_empty()
    }

    /// The live document.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The live document, mutably.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// The dehydrated sequence. The entry at the cursor is stale until
    /// [`save_current`](Self::save_current) runs.
    #[must_use]
    pub fn records(&self) -> &[CardRecord] {
        &self.records
    }

    /// The editor configuration.
    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Replace the batch with `records` and hydrate the first card.
    pub async fn import_many(&mut self, records: Vec<CardRecord>) {
        self.records = records;
        self.cursor = 0;
        self.document = match self.records.first() {
            Some(record) => hydrate_record(record, &self.loader, self.measure.as_ref()).await,
            None => Document::new(),
        };
        tracing::info!("Imported {} cards", self.records.len());
    }

    /// Decode an XML document and import its cards.
    ///
    /// # Errors
    ///
    /// Returns an error if the XML is malformed or has no cards. The
    /// current batch and live document are left as they were.
    pub async fn import_xml(&mut self, xml: &str) -> Result<(), ImportError> {
        let records = codec::decode(xml, &self.config)?;
        self.import_many(records).await;
        Ok(())
    }

    /// Write the live document back into the sequence at the cursor.
    pub fn save_current(&mut self) {
        if let Some(slot) = self.records.get_mut(self.cursor) {
            *slot = self.document.dehydrate();
        }
    }

    /// Move to the card at `index`.
    ///
    /// Returns `false` and changes nothing if `index` is out of range.
    pub async fn go_to(&mut self, index: usize) -> bool {
        if index >= self.records.len() {
            tracing::debug!("Ignoring go_to({index}) on batch of {}", self.records.len());
            return false;
        }

        self.save_current();
        self.document =
            hydrate_record(&self.records[index], &self.loader, self.measure.as_ref()).await;
        self.cursor = index;
        tracing::debug!("Moved to card {index}");
        true
    }

    /// Move to the next card, if any.
    pub async fn next(&mut self) -> bool {
        self.go_to(self.cursor + 1).await
    }

    /// Move to the previous card, if any.
    pub async fn previous(&mut self) -> bool {
        match self.cursor.checked_sub(1) {
            Some(index) => self.go_to(index).await,
            None => false,
        }
    }

    /// Load an image and add it to the live document.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be loaded.
    pub async fn add_image(&mut self, source: ResourceSource) -> LoadResult<usize> {
        let bitmap = self.loader.load(source).await?;
        Ok(self.document.add_image(
            bitmap,
            self.config.canvas_size(),
            self.config.max_image_extent,
        ))
    }

    /// Load an image and use it as the live document's background.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be loaded; the background is
    /// left unchanged.
    pub async fn set_background_image(&mut self, source: ResourceSource) -> LoadResult<()> {
        let bitmap = self.loader.load(source).await?;
        self.document.background_image = Some(bitmap);
        Ok(())
    }

    /// Render every card into `archive` as `card_1.png`, `card_2.png`, ...
    ///
    /// Cards are rendered one after another. A card that fails to render is
    /// logged and skipped. The live document stays the one under the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::EmptyBatch`] if there are no cards and
    /// [`ExportError::Archive`] if the archive cannot be written.
    pub async fn export_all(
        &mut self,
        surface: &dyn CardSurface,
        archive: &mut dyn ArchiveWriter,
    ) -> ExportResult<ExportSummary> {
        if self.records.is_empty() {
            return Err(ExportError::EmptyBatch);
        }

        self.save_current();
        let mut summary = ExportSummary::default();

        for (index, record) in self.records.iter().enumerate() {
            let png = if index == self.cursor {
                surface.capture(&self.document)
            } else {
                let doc = hydrate_record(record, &self.loader, self.measure.as_ref()).await;
                surface.capture(&doc)
            };

            match png {
                Ok(bytes) => {
                    archive
                        .add_entry(&entry_name(index), &bytes)
                        .map_err(|e| ExportError::Archive(e.to_string()))?;
                    summary.exported += 1;
                }
                Err(e) => {
                    tracing::warn!("Skipping card {}: {e}", index + 1);
                    summary.skipped.push(index);
                }
            }
        }

        archive
            .finish()
            .map_err(|e| ExportError::Archive(e.to_string()))?;

        tracing::info!(
            "Exported {} of {} cards",
            summary.exported,
            self.records.len()
        );
        Ok(summary)
    }

    /// Encode every card, including unsaved edits to the live one.
    pub fn export_xml(&mut self) -> String {
        if self.records.is_empty() {
            return self.export_current_xml();
        }
        self.save_current();
        codec::encode(&self.records)
    }

    /// Encode only the live document as a single card.
    #[must_use]
    pub fn export_current_xml(&self) -> String {
        codec::encode_document(&self.document)
    }

    /// Drop the batch and clear the live document.
    pub fn reset(&mut self) {
        self.records.clear();
        self.cursor = 0;
        self.document.reset();
        tracing::debug!("Batch reset");
    }
}
