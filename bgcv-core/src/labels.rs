//! Annotation label placement and visibility.

use crate::geometry::{AnnotationGeometry, Bounds};
use crate::host::Host;
use crate::layout::LABEL_FONT_SIZE;
use crate::scene::Baseline;
use crate::types::{Annotation, LabelPosition, LabelVisibility};

/// Vertical gap between a shape and an `above` label
pub const LABEL_GAP: f64 = 4.0;
/// Padding of the hover background around the text box
pub const LABEL_BG_PADDING: f64 = 2.0;

/// Whether a label with the given policy is shown.
pub fn label_visible(policy: LabelVisibility, hovered: bool, show_all: bool) -> bool {
    match policy {
        LabelVisibility::Always => true,
        LabelVisibility::Never => false,
        LabelVisibility::Hover => hovered || show_all,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelPlacement {
    pub x: f64,
    pub y: f64,
    pub baseline: Baseline,
}

/// Where the label sits, in chart coordinates. `track_y` is the track's vertical offset.
pub fn place_label(annotation: &Annotation, geometry: &AnnotationGeometry, track_y: f64) -> LabelPlacement {
    let (ax, ay) = geometry.anchor;
    match annotation.label_position {
        LabelPosition::Above => LabelPlacement {
            x: ax,
            y: track_y + geometry.bounds.y - LABEL_GAP,
            baseline: Baseline::Alphabetic,
        },
        LabelPosition::Center => LabelPlacement { x: ax, y: track_y + ay, baseline: Baseline::Middle },
    }
}

/// Background rectangle behind a centered label, from the measured text box.
///
/// Returns `None` when the host cannot measure the text; the label is then drawn
/// without a background.
pub fn label_background<H: Host + ?Sized>(host: &H, text: &str, placement: &LabelPlacement) -> Option<Bounds> {
    let width = host.text_width(text, LABEL_FONT_SIZE).ok()?;
    let top = match placement.baseline {
        Baseline::Alphabetic => placement.y - LABEL_FONT_SIZE * 0.8,
        Baseline::Middle => placement.y - LABEL_FONT_SIZE / 2.0,
        Baseline::Hanging => placement.y,
    };
    Some(Bounds::new(
        placement.x - width / 2.0 - LABEL_BG_PADDING,
        top - LABEL_BG_PADDING,
        width + 2.0 * LABEL_BG_PADDING,
        LABEL_FONT_SIZE + 2.0 * LABEL_BG_PADDING,
    ))
}
