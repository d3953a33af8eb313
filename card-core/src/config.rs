//! Editor configuration and persisted user preferences.
//!
//! Both are plain JSON documents. Missing fields fall back to defaults so
//! older files keep loading.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geometry::Size;

/// Default canvas width in pixels.
const DEFAULT_CANVAS_WIDTH: f32 = 800.0;

/// Default canvas height in pixels.
const DEFAULT_CANVAS_HEIGHT: f32 = 600.0;

/// Styling applied to newly added text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextSettings {
    /// Fill color as hex.
    pub color: String,
    /// Font size in pixels.
    pub font_size: u32,
    /// Font family name.
    pub font_family: String,
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            color: "#000000".to_string(),
            font_size: 24,
            font_family: "Arial".to_string(),
        }
    }
}

/// Static editor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Canvas width in pixels.
    pub canvas_width: f32,
    /// Canvas height in pixels.
    pub canvas_height: f32,
    /// Arrow-key nudge distance.
    pub nudge_step: f32,
    /// Arrow-key nudge distance with Shift held.
    pub nudge_step_large: f32,
    /// Longest side of a newly inserted image.
    pub max_image_extent: f32,
    /// Seconds before an image load is abandoned.
    pub load_timeout_secs: u64,
    /// Defaults for new and imported text.
    pub text: TextSettings,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
            nudge_step: 1.0,
            nudge_step_large: 10.0,
            max_image_extent: 200.0,
            load_timeout_secs: 30,
            text: TextSettings::default(),
        }
    }
}

impl EditorConfig {
    /// Canvas dimensions.
    #[must_use]
    pub fn canvas_size(&self) -> Size {
        Size::new(self.canvas_width, self.canvas_height)
    }

    /// Image load timeout.
    #[must_use]
    pub fn load_timeout(&self) -> Duration {
        Duration::from_secs(self.load_timeout_secs)
    }

    /// Parse a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }
}

/// User toggles that survive restarts.
///
/// Read once at startup and written back whenever one is toggled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Draw the alignment grid.
    pub show_grid: bool,
    /// Draw the print frame guides.
    pub show_frames: bool,
    /// Keep the aspect ratio while resizing images.
    pub aspect_ratio_locked: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            show_grid: false,
            show_frames: false,
            aspect_ratio_locked: true,
        }
    }
}

impl Preferences {
    /// Load preferences, falling back to defaults when the file is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No preferences at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write preferences to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EditorConfig::default();
        assert_eq!(config.canvas_size(), Size::new(800.0, 600.0));
        assert_eq!(config.load_timeout(), Duration::from_secs(30));
        assert_eq!(config.text.font_size, 24);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config =
            EditorConfig::from_json(r##"{"canvas_width": 1200, "text": {"color": "#336699"}}"##)
                .expect("parse");
        assert!((config.canvas_width - 1200.0).abs() < f32::EPSILON);
        assert!((config.canvas_height - 600.0).abs() < f32::EPSILON);
        assert_eq!(config.text.color, "#336699");
        assert_eq!(config.text.font_family, "Arial");
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let result = EditorConfig::from_json("{not json");
        assert!(matches!(result, Err(ConfigError::Serialization(_))));
    }

    #[test]
    fn test_preferences_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let prefs = Preferences::load(dir.path().join("prefs.json")).expect("load");
        assert_eq!(prefs, Preferences::default());
        assert!(prefs.aspect_ratio_locked);
    }

    #[test]
    fn test_preferences_save_and_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("prefs.json");

        let prefs = Preferences {
            show_grid: true,
            show_frames: false,
            aspect_ratio_locked: false,
        };
        prefs.save(&path).expect("save");

        let loaded = Preferences::load(&path).expect("load");
        assert_eq!(loaded, prefs);
    }

    #[test]
    fn test_config_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"load_timeout_secs": 5}"#).expect("write");

        let config = EditorConfig::load(&path).expect("load");
        assert_eq!(config.load_timeout(), Duration::from_secs(5));
    }
}
