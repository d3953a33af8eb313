//! # Card Core
//!
//! Document model and editing logic for composing cards: a background plus
//! an ordered stack of text and image elements.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 card-core                   │
//! ├─────────────────────────────────────────────┤
//! │  Interaction      │  Codec                  │
//! │  - Drag / resize  │  - cards XML encode     │
//! │  - Keyboard       │  - cards XML decode     │
//! ├─────────────────────────────────────────────┤
//! │  Document         │  Element Store          │
//! │  - Background     │  - Z-ordered stack      │
//! │  - Dehydration    │  - Selection, listeners │
//! ├─────────────────────────────────────────────┤
//! │  Geometry & hit-testing (pure functions)    │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod codec;
pub mod config;
pub mod document;
pub mod element;
pub mod error;
pub mod event;
pub mod geometry;
pub mod interaction;
pub mod resource;
pub mod store;

pub use config::{EditorConfig, Preferences, TextSettings};
pub use document::{ApproxTextMeasure, CardRecord, Document, TextMeasure};
pub use element::{Element, ElementKind, ElementRecord, TextContent};
pub use error::{CardError, CardResult, ConfigError, ImportError};
pub use event::{InputEvent, Key, KeyEvent, KeyModifiers, PointerEvent, PointerPhase};
pub use geometry::{Handle, Point, Rect, Size};
pub use interaction::{InteractionMode, InteractionResponse, InteractionSession, ResizeAnchor};
pub use resource::Bitmap;
pub use store::{ElementStore, ListenerId, StoreChange};

/// Card core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
