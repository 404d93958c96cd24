//! Host environment abstraction
//!
//! The viewer never touches a document directly. Whatever embeds it (a browser bridge,
//! a test harness, the CLI) implements [`Host`] to resolve the mount point, report its
//! size, measure text, and manage the resize observer.

use std::collections::HashMap;
use std::fmt;

/// Content box of the container element, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContainerBox {
    pub width: f64,
    pub height: f64,
}

impl ContainerBox {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Text metrics could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsUnavailable;

impl fmt::Display for MetricsUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "text metrics unavailable")
    }
}

impl std::error::Error for MetricsUnavailable {}

pub trait Host {
    /// Resolve a container selector to its current box.
    fn container(&self, selector: &str) -> Option<ContainerBox>;

    /// Width in pixels of `text` rendered at `font_size`.
    fn text_width(&self, _text: &str, _font_size: f64) -> Result<f64, MetricsUnavailable> {
        Err(MetricsUnavailable)
    }

    fn observe_resize(&mut self, _selector: &str) {}

    fn disconnect_resize(&mut self, _selector: &str) {}
}

/// In-memory host for tests and command-line rendering.
#[derive(Debug, Clone, Default)]
pub struct HeadlessHost {
    containers: HashMap<String, ContainerBox>,
    /// Advance width per character as a fraction of font size; `None` means no metrics.
    char_advance: Option<f64>,
    observed: Vec<String>,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_container<S: Into<String>>(mut self, selector: S, width: f64, height: f64) -> Self {
        self.containers.insert(selector.into(), ContainerBox::new(width, height));
        self
    }

    /// Enable approximate text metrics using a fixed advance per character.
    pub fn with_char_advance(mut self, advance: f64) -> Self {
        self.char_advance = Some(advance);
        self
    }

    pub fn set_container_box(&mut self, selector: &str, container: ContainerBox) {
        self.containers.insert(selector.to_string(), container);
    }

    pub fn is_observing(&self, selector: &str) -> bool {
        self.observed.iter().any(|s| s == selector)
    }
}

impl Host for HeadlessHost {
    fn container(&self, selector: &str) -> Option<ContainerBox> {
        self.containers.get(selector).copied()
    }

    fn text_width(&self, text: &str, font_size: f64) -> Result<f64, MetricsUnavailable> {
        let advance = self.char_advance.ok_or(MetricsUnavailable)?;
        Ok(text.chars().count() as f64 * advance * font_size)
    }

    fn observe_resize(&mut self, selector: &str) {
        if !self.is_observing(selector) {
            self.observed.push(selector.to_string());
        }
    }

    fn disconnect_resize(&mut self, selector: &str) {
        self.observed.retain(|s| s != selector);
    }
}

impl<H: Host + ?Sized> Host for Box<H> {
    fn container(&self, selector: &str) -> Option<ContainerBox> {
        (**self).container(selector)
    }

    fn text_width(&self, text: &str, font_size: f64) -> Result<f64, MetricsUnavailable> {
        (**self).text_width(text, font_size)
    }

    fn observe_resize(&mut self, selector: &str) {
        (**self).observe_resize(selector)
    }

    fn disconnect_resize(&mut self, selector: &str) {
        (**self).disconnect_resize(selector)
    }
}
