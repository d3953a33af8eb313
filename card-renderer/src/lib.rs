//! # Card Renderer
//!
//! Turns dehydrated cards into live documents and live documents into
//! pixels.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐   hydrate   ┌──────────────┐   capture   ┌─────────────┐
//! │ CardRecord   │ ──────────► │ Document     │ ──────────► │ PNG bytes   │
//! │ (locators)   │  Resource-  │ (bitmaps)    │  Card-      │ (archive    │
//! │              │  Loader     │              │  Exporter   │  entries)   │
//! └──────────────┘             └──────────────┘             └─────────────┘
//!         ▲                            │
//!         └──────── dehydrate ─────────┘
//! ```
//!
//! [`BatchController`] owns the sequence of records and the single live
//! document.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod batch;
pub mod error;
pub mod export;
pub mod image;
pub mod loader;

pub use batch::{
    entry_name, hydrate_record, ArchiveWriter, BatchController, CardSurface, ExportSummary,
};
pub use error::{
    ExportError, ExportResult, LoadResult, RenderError, RenderResult, ResourceLoadError,
};
pub use export::{CardExporter, ExportConfig};
pub use loader::{
    HttpFetcher, ResourceFetcher, ResourceLoader, ResourceSource, DEFAULT_LOAD_TIMEOUT,
};
