//! Vertical track stacking and left-margin sizing.

use std::collections::HashMap;

use crate::config::Margin;
use crate::host::Host;
use crate::types::Track;

/// Font size of track and annotation labels, in pixels
pub const LABEL_FONT_SIZE: f64 = 12.0;
/// Width estimate per character when the host has no text metrics
pub const FALLBACK_CHAR_WIDTH: f64 = 8.0;
/// Space between the longest track label and the chart
pub const TRACK_LABEL_PADDING: f64 = 20.0;
/// Margin changes at or below this many pixels are ignored
pub const MARGIN_HYSTERESIS: f64 = 5.0;
/// Left margin while the track label column is hidden
pub const COLLAPSED_MARGIN_LEFT: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TrackSlot {
    pub id: String,
    pub y: f64,
    pub height: f64,
}

/// Vertical placement of every track, in stacking order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackLayout {
    slots: Vec<TrackSlot>,
    index: HashMap<String, usize>,
    content_height: f64,
}

impl TrackLayout {
    pub fn compute(tracks: &[Track], default_height: f64) -> Self {
        let mut slots = Vec::with_capacity(tracks.len());
        let mut index = HashMap::with_capacity(tracks.len());
        let mut y = 0.0;
        for track in tracks {
            let height = track.resolved_height(default_height);
            index.insert(track.id.clone(), slots.len());
            slots.push(TrackSlot { id: track.id.clone(), y, height });
            y += height;
        }
        Self { slots, index, content_height: y }
    }

    pub fn slots(&self) -> &[TrackSlot] {
        &self.slots
    }

    pub fn slot(&self, id: &str) -> Option<&TrackSlot> {
        self.index.get(id).map(|&i| &self.slots[i])
    }

    pub fn offset(&self, id: &str) -> Option<f64> {
        self.slot(id).map(|s| s.y)
    }

    pub fn content_height(&self) -> f64 {
        self.content_height
    }

    /// Overall drawing height including vertical margins.
    pub fn total_height(&self, margin: &Margin) -> f64 {
        self.content_height + margin.top + margin.bottom
    }
}

/// Width of a label as the host measures it, or the per-character estimate.
pub fn label_width<H: Host + ?Sized>(host: &H, text: &str) -> f64 {
    match host.text_width(text, LABEL_FONT_SIZE) {
        Ok(width) => width,
        Err(_) => text.chars().count() as f64 * FALLBACK_CHAR_WIDTH,
    }
}

/// Left margin needed to fit the longest track label, never below `floor`.
pub fn required_left_margin<H: Host + ?Sized>(tracks: &[Track], host: &H, floor: f64) -> f64 {
    let longest = tracks
        .iter()
        .filter(|t| !t.label.is_empty())
        .map(|t| label_width(host, &t.label))
        .fold(0.0f64, f64::max);
    if longest == 0.0 {
        return floor;
    }
    (longest + TRACK_LABEL_PADDING).max(floor)
}

/// Returns the new margin when it differs enough from the current one to be worth applying.
pub fn apply_hysteresis(current: f64, target: f64) -> Option<f64> {
    if (target - current).abs() > MARGIN_HYSTERESIS {
        Some(target)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HeadlessHost;

    #[test]
    fn test_stacking_with_default_height() {
        let tracks = vec![Track::new("t1", "").with_height(20.0), Track::new("t2", "")];
        let layout = TrackLayout::compute(&tracks, 30.0);
        assert_eq!(layout.offset("t1"), Some(0.0));
        assert_eq!(layout.offset("t2"), Some(20.0));
        assert_eq!(layout.content_height(), 50.0);
        assert_eq!(layout.total_height(&Margin::default()), 100.0);
        assert_eq!(layout.offset("t3"), None);
    }

    #[test]
    fn test_slot_lookup_by_id() {
        let tracks: Vec<Track> = (0..50).map(|i| Track::new(format!("t{}", i), "")).collect();
        let layout = TrackLayout::compute(&tracks, 10.0);
        let slot = layout.slot("t37").unwrap();
        assert_eq!(slot.id, "t37");
        assert_eq!(slot.y, 370.0);
        assert_eq!(layout.slots()[37], *slot);
        assert!(layout.slot("t50").is_none());
    }

    #[test]
    fn test_margin_fallback_estimate() {
        let tracks = vec![Track::new("a", "Short"), Track::new("b", "Biosynthetic genes")];
        let host = HeadlessHost::new();
        // 18 chars * 8px + 20px padding
        assert_eq!(required_left_margin(&tracks, &host, 60.0), 164.0);
        // never below the configured floor
        let tiny = vec![Track::new("a", "x")];
        assert_eq!(required_left_margin(&tiny, &host, 60.0), 60.0);
    }

    #[test]
    fn test_margin_with_metrics() {
        let tracks = vec![Track::new("a", "abcdefghij")];
        let host = HeadlessHost::new().with_char_advance(0.5);
        // 10 chars * 6px + 20
        assert_eq!(required_left_margin(&tracks, &host, 10.0), 80.0);
    }

    #[test]
    fn test_hysteresis() {
        assert_eq!(apply_hysteresis(60.0, 64.0), None);
        assert_eq!(apply_hysteresis(60.0, 65.0), None);
        assert_eq!(apply_hysteresis(60.0, 65.5), Some(65.5));
        assert_eq!(apply_hysteresis(100.0, 10.0), Some(10.0));
    }
}
