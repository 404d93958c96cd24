//! Viewer configuration
//!
//! Every field has a serde default so partial configurations (from TOML or JSON) resolve
//! to a complete one. `margin`, `width` and `height` are owned by the engine after
//! construction; everything else is fixed for the lifetime of a viewer.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ViewerError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self { top: 20.0, right: 20.0, bottom: 30.0, left: 60.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Selector of the mount point, resolved through the host.
    #[serde(default = "default_container")]
    pub container: String,

    /// Explicit width in pixels. `None` makes the viewer follow its container.
    #[serde(default)]
    pub width: Option<f64>,

    /// Derived from the tracks; any configured value is overwritten on layout.
    #[serde(default, skip_deserializing)]
    pub height: f64,

    #[serde(default)]
    pub margin: Margin,

    /// Default height of tracks that do not specify one
    #[serde(default = "default_track_height")]
    pub track_height: f64,

    /// Genomic interval mapped onto the chart width at identity zoom
    #[serde(default = "default_domain")]
    pub domain: [f64; 2],

    /// Allowed zoom scale factors
    #[serde(default = "default_zoom_extent")]
    pub zoom_extent: [f64; 2],

    #[serde(default = "default_true")]
    pub show_track_labels: bool,
}

fn default_container() -> String { "#track-viewer".to_string() }
fn default_track_height() -> f64 { 30.0 }
fn default_domain() -> [f64; 2] { [0.0, 1000.0] }
fn default_zoom_extent() -> [f64; 2] { [1.0, 100.0] }
fn default_true() -> bool { true }

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            container: default_container(),
            width: None,
            height: 0.0,
            margin: Margin::default(),
            track_height: default_track_height(),
            domain: default_domain(),
            zoom_extent: default_zoom_extent(),
            show_track_labels: true,
        }
    }
}

impl ViewerConfig {
    pub fn new<S: Into<String>>(container: S) -> Self {
        Self { container: container.into(), ..Self::default() }
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_domain(mut self, min: f64, max: f64) -> Self {
        self.domain = [min, max];
        self
    }

    pub fn with_margin(mut self, margin: Margin) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_track_height(mut self, track_height: f64) -> Self {
        self.track_height = track_height;
        self
    }

    pub fn with_zoom_extent(mut self, min: f64, max: f64) -> Self {
        self.zoom_extent = [min, max];
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_domain(self.domain)?;
        let [zmin, zmax] = self.zoom_extent;
        if !(zmin > 0.0 && zmin <= zmax) || !zmax.is_finite() {
            return Err(ViewerError::config(format!(
                "zoom extent must satisfy 0 < min <= max, got [{}, {}]",
                zmin, zmax
            )));
        }
        if !(self.track_height > 0.0) {
            return Err(ViewerError::config(format!(
                "track height must be positive, got {}",
                self.track_height
            )));
        }
        if let Some(width) = self.width {
            if !(width > self.margin.left + self.margin.right) {
                return Err(ViewerError::config(format!(
                    "width {} leaves no room for the chart between margins",
                    width
                )));
            }
        }
        Ok(())
    }
}

pub(crate) fn validate_domain(domain: [f64; 2]) -> Result<()> {
    let [min, max] = domain;
    if !(min.is_finite() && max.is_finite() && min < max) {
        return Err(ViewerError::invalid_domain(min, max));
    }
    Ok(())
}
