//! BGC Track Viewer core library
//!
//! Data model, layout, zoom and the retained-scene track viewer engine, plus the
//! antiSMASH record adapter.

pub mod error;
pub mod types;
pub mod config;
pub mod host;
pub mod scale;
pub mod layout;
pub mod zoom;
pub mod geometry;
pub mod scene;
pub mod style;
pub mod reconcile;
pub mod labels;
pub mod resize;
pub mod menu;
pub mod viewer;
pub mod antismash;

// Re-export commonly used types and functions
pub use config::{Margin, ViewerConfig};
pub use error::{Result, ViewerError};
pub use host::{ContainerBox, HeadlessHost, Host, MetricsUnavailable};
pub use menu::{MenuAction, MenuItem};
pub use scene::{Layer, Node, NodeId, Scene, Shape, Style};
pub use style::{default_stylesheet, Stylesheet};
pub use types::{
    Annotation, AnnotationType, Direction, DrawingPrimitive, LabelPosition, LabelVisibility, PrimitiveType, Track,
    TrackViewerData,
};
pub use viewer::{AnnotationEvent, Tooltip, TrackViewer, ViewState, ViewerCallbacks};
pub use zoom::{Cursor, PointerEvent, ZoomTransform};

/// Version information for the core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
