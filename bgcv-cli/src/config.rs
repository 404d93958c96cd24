//! Configuration handling for the bgcv CLI
//!
//! Supports loading configuration from bgcv.toml files with CLI argument overrides.

use anyhow::{Context, Result};
use bgcv_core::{Margin, ViewerConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::CliError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub viewer: ViewerSection,
    #[serde(default)]
    pub export: ExportSection,
    #[serde(default)]
    pub render: RenderSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerSection {
    /// Drawing width in pixels
    #[serde(default = "default_width")]
    pub width: f64,

    /// Height of tracks that do not set their own
    #[serde(default = "default_track_height")]
    pub track_height: f64,

    /// Allowed zoom factors
    #[serde(default = "default_zoom_extent")]
    pub zoom_extent: [f64; 2],

    /// Genomic interval shown at identity zoom; fitted to the data when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<[f64; 2]>,

    #[serde(default)]
    pub margin: Margin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSection {
    /// Write a generator/timestamp comment into SVG output
    #[serde(default)]
    pub provenance: bool,

    /// Device pixels per CSS pixel for PNG output
    #[serde(default = "default_png_scale")]
    pub png_scale: f32,

    /// Blank border around PNG output
    #[serde(default = "default_png_margin")]
    pub png_margin: f64,

    /// Extra CSS appended to the built-in stylesheet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stylesheet: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSection {
    /// Show every annotation label, not only those set to always show
    #[serde(default)]
    pub show_all_annotation_labels: bool,

    #[serde(default = "default_true")]
    pub show_track_labels: bool,

    /// Estimated glyph advance as a fraction of the font size, used for label metrics
    #[serde(default = "default_char_advance")]
    pub char_advance: f64,
}

// Default value functions
fn default_width() -> f64 { 1000.0 }
fn default_track_height() -> f64 { 30.0 }
fn default_zoom_extent() -> [f64; 2] { [1.0, 100.0] }
fn default_png_scale() -> f32 { 2.0 }
fn default_png_margin() -> f64 { 10.0 }
fn default_true() -> bool { true }
fn default_char_advance() -> f64 { 0.6 }

impl Default for ViewerSection {
    fn default() -> Self {
        Self {
            width: default_width(),
            track_height: default_track_height(),
            zoom_extent: default_zoom_extent(),
            domain: None,
            margin: Margin::default(),
        }
    }
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            provenance: false,
            png_scale: default_png_scale(),
            png_margin: default_png_margin(),
            stylesheet: None,
        }
    }
}

impl Default for RenderSection {
    fn default() -> Self {
        Self {
            show_all_annotation_labels: false,
            show_track_labels: true,
            char_advance: default_char_advance(),
        }
    }
}

impl ViewerSection {
    /// Viewer configuration mounted on `container`, showing `domain`.
    pub fn to_viewer_config(&self, container: &str, domain: [f64; 2], show_track_labels: bool) -> ViewerConfig {
        let mut config = ViewerConfig::new(container)
            .with_width(self.width)
            .with_margin(self.margin)
            .with_track_height(self.track_height)
            .with_zoom_extent(self.zoom_extent[0], self.zoom_extent[1])
            .with_domain(domain[0], domain[1]);
        config.show_track_labels = show_track_labels;
        config
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                // Try to find bgcv.toml in current directory
                let default_path = PathBuf::from("bgcv.toml");
                if default_path.exists() {
                    log::info!("Loading configuration from: bgcv.toml");
                    Self::load_from_file(&default_path)?
                } else {
                    log::debug!("Using default configuration");
                    Self::default()
                }
            }
        };

        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::config(format!("failed to read configuration file {}: {}", path.display(), e))
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            CliError::config(format!("failed to parse configuration file {}: {}", path.display(), e))
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;

        Ok(())
    }

    /// Generate example configuration file content
    pub fn example_toml() -> Result<String> {
        toml::to_string_pretty(&Self::default()).context("Failed to serialize default configuration")
    }
}
