//! Subcommand implementations.
//!
//! Each command builds its own [`BatchController`] so the loader timeout and
//! canvas size come from the active configuration.

use std::path::Path;

use anyhow::Context;
use card_core::{EditorConfig, InputEvent, InteractionResponse, InteractionSession, Preferences};
use card_renderer::{BatchController, CardExporter, ExportConfig, ExportSummary, ResourceLoader};

use crate::archive::DirectoryArchive;

/// Requested preference changes. `None` leaves a toggle as it is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrefsUpdate {
    /// New grid visibility.
    pub grid: Option<bool>,
    /// New frame guide visibility.
    pub frames: Option<bool>,
    /// New aspect-lock default.
    pub aspect_lock: Option<bool>,
}

async fn load_batch(input: &Path, config: &EditorConfig) -> anyhow::Result<BatchController> {
    let xml = tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let mut batch = BatchController::new(ResourceLoader::from_config(config), config.clone());
    batch
        .import_xml(&xml)
        .await
        .with_context(|| format!("Failed to import {}", input.display()))?;
    Ok(batch)
}

/// Render every card in `input` into `out_dir`.
///
/// # Errors
///
/// Returns an error if the input cannot be imported or the output
/// directory cannot be written.
pub async fn render(
    input: &Path,
    out_dir: &Path,
    scale: f32,
    config: &EditorConfig,
) -> anyhow::Result<ExportSummary> {
    let mut batch = load_batch(input, config).await?;
    let exporter = CardExporter::new(ExportConfig::from_editor(config).with_scale(scale));
    let mut archive = DirectoryArchive::create(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let summary = batch.export_all(&exporter, &mut archive).await?;
    tracing::info!(
        "Rendered {} cards into {}",
        summary.exported,
        out_dir.display()
    );
    Ok(summary)
}

/// Load every card in `input` and encode the batch again.
///
/// Images that fail to load are dropped from the output.
///
/// # Errors
///
/// Returns an error if the input cannot be imported.
pub async fn normalize(input: &Path, config: &EditorConfig) -> anyhow::Result<String> {
    let mut batch = load_batch(input, config).await?;
    for index in 1..batch.len() {
        batch.go_to(index).await;
    }
    Ok(batch.export_xml())
}

/// Apply the events in `events` to card `card` of `input` and return the
/// edited batch.
///
/// # Errors
///
/// Returns an error if either file cannot be read, the events are not
/// valid JSON or `card` is out of range.
pub async fn replay(
    input: &Path,
    events: &Path,
    card: usize,
    config: &EditorConfig,
    preferences: &Preferences,
) -> anyhow::Result<String> {
    let json = tokio::fs::read_to_string(events)
        .await
        .with_context(|| format!("Failed to read {}", events.display()))?;
    let events: Vec<InputEvent> =
        serde_json::from_str(&json).context("Failed to parse input events")?;

    let mut batch = load_batch(input, config).await?;
    if !batch.go_to(card).await {
        anyhow::bail!("Card {card} out of range (batch has {})", batch.len());
    }

    let mut session = InteractionSession::from_config(config, preferences);
    let mut changed = 0usize;
    for event in &events {
        match session.handle(batch.document_mut(), event) {
            InteractionResponse::Changed => changed += 1,
            InteractionResponse::DismissOverlay | InteractionResponse::Ignored => {}
        }
    }
    tracing::info!("Applied {} events, {changed} changed card {card}", events.len());

    Ok(batch.export_xml())
}

/// Apply `update` to the preferences stored at `path`.
///
/// The file is only written when a toggle actually changes.
///
/// # Errors
///
/// Returns an error if the preferences cannot be read or written.
pub fn prefs(path: &Path, update: PrefsUpdate) -> anyhow::Result<Preferences> {
    let current = Preferences::load(path)
        .with_context(|| format!("Failed to load preferences {}", path.display()))?;

    let updated = Preferences {
        show_grid: update.grid.unwrap_or(current.show_grid),
        show_frames: update.frames.unwrap_or(current.show_frames),
        aspect_ratio_locked: update.aspect_lock.unwrap_or(current.aspect_ratio_locked),
    };

    if updated != current {
        updated
            .save(path)
            .with_context(|| format!("Failed to save preferences {}", path.display()))?;
        tracing::debug!("Saved preferences to {}", path.display());
    }
    Ok(updated)
}
