//! # Cardsmith CLI
//!
//! Command-line access to the card pipeline: render a `cards` file to PNGs,
//! normalize it through a load/save cycle, replay recorded input events
//! against a card, and manage persisted preferences.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod archive;
pub mod commands;

pub use archive::DirectoryArchive;

use std::path::PathBuf;

use card_core::EditorConfig;
use clap::{Parser, Subcommand};

/// Default preferences file, relative to the working directory.
pub const DEFAULT_PREFS_PATH: &str = "cardsmith-prefs.json";

/// Command-line arguments for cardsmith.
#[derive(Debug, Clone, Parser)]
#[command(name = "cardsmith")]
#[command(about = "Render and edit cards interchange files")]
#[command(version)]
pub struct CliArgs {
    /// Editor configuration file (JSON)
    #[arg(long, global = true, env = "CARDSMITH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Preferences file (JSON)
    #[arg(long, global = true, env = "CARDSMITH_PREFS", default_value = DEFAULT_PREFS_PATH)]
    pub prefs: PathBuf,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Render every card to `card_N.png` in a directory
    Render {
        /// Input cards file
        input: PathBuf,

        /// Output directory
        #[arg(long, default_value = "cards")]
        out_dir: PathBuf,

        /// Output scale factor
        #[arg(long, default_value_t = 1.0)]
        scale: f32,
    },

    /// Load every card and write it back out
    Normalize {
        /// Input cards file
        input: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Apply recorded pointer and key events to one card
    Replay {
        /// Input cards file
        input: PathBuf,

        /// JSON array of input events
        #[arg(long)]
        events: PathBuf,

        /// Zero-based card index
        #[arg(long, default_value_t = 0)]
        card: usize,

        /// Output file (stdout when omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Show or change persisted preferences
    Prefs {
        /// Draw the alignment grid
        #[arg(long)]
        grid: Option<bool>,

        /// Draw the print frame guides
        #[arg(long)]
        frames: Option<bool>,

        /// Keep the aspect ratio while resizing images
        #[arg(long)]
        aspect_lock: Option<bool>,
    },
}

impl CliArgs {
    /// Load the editor configuration, or defaults when none is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or parsed.
    pub fn editor_config(&self) -> anyhow::Result<EditorConfig> {
        match &self.config {
            Some(path) => EditorConfig::load(path).map_err(|e| {
                anyhow::anyhow!("Failed to load config {}: {e}", path.display())
            }),
            None => Ok(EditorConfig::default()),
        }
    }
}
