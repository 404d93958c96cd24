use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{Result, ViewerError};

/// Genomic coordinate along the shared axis.
pub type GenomicPos = f64;

/// A horizontal lane in the diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl Track {
    pub fn new<S: Into<String>, L: Into<String>>(id: S, label: L) -> Self {
        Self { id: id.into(), label: label.into(), height: None }
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    /// Height of this track, falling back to the configured default.
    pub fn resolved_height(&self, default_height: f64) -> f64 {
        self.height.unwrap_or(default_height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnnotationType {
    Arrow,
    Box,
    Circle,
    Triangle,
    Pin,
    /// Any type string this engine does not know; drawn as a box.
    #[serde(other)]
    Unknown,
}

impl AnnotationType {
    /// Point features are anchored at a single x position rather than spanning an extent.
    pub fn is_point(self) -> bool {
        matches!(self, AnnotationType::Circle | AnnotationType::Triangle | AnnotationType::Pin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AnnotationType::Arrow => "arrow",
            AnnotationType::Box | AnnotationType::Unknown => "box",
            AnnotationType::Circle => "circle",
            AnnotationType::Triangle => "triangle",
            AnnotationType::Pin => "pin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelPosition {
    #[default]
    Above,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelVisibility {
    #[default]
    Hover,
    Always,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
}

/// A genomic interval or point feature drawn on a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: String,
    pub track_id: String,
    #[serde(rename = "type")]
    pub kind: AnnotationType,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub label_position: LabelPosition,
    #[serde(default)]
    pub show_label: LabelVisibility,
    pub start: GenomicPos,
    pub end: GenomicPos,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_fraction: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, rename = "corner_radius", alias = "cornerRadius", skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
}

impl Annotation {
    pub fn new<S: Into<String>, T: Into<String>>(
        id: S,
        track_id: T,
        kind: AnnotationType,
        start: GenomicPos,
        end: GenomicPos,
    ) -> Self {
        Self {
            id: id.into(),
            track_id: track_id.into(),
            kind,
            classes: Vec::new(),
            label: String::new(),
            label_position: LabelPosition::default(),
            show_label: LabelVisibility::default(),
            start,
            end,
            fy: None,
            height_fraction: None,
            direction: None,
            fill: None,
            stroke: None,
            opacity: None,
            corner_radius: None,
            tooltip: None,
        }
    }

    pub fn with_label<S: Into<String>>(mut self, label: S) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_show_label(mut self, show_label: LabelVisibility) -> Self {
        self.show_label = show_label;
        self
    }

    pub fn with_label_position(mut self, position: LabelPosition) -> Self {
        self.label_position = position;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn with_tooltip<S: Into<String>>(mut self, tooltip: S) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn with_fill<S: Into<String>>(mut self, fill: S) -> Self {
        self.fill = Some(fill.into());
        self
    }

    pub fn fy(&self) -> f64 {
        self.fy.unwrap_or(0.5)
    }

    pub fn height_fraction(&self) -> f64 {
        self.height_fraction.unwrap_or(0.5)
    }

    pub fn length(&self) -> GenomicPos {
        self.end - self.start
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrimitiveType {
    HorizontalLine,
    Background,
    /// Unrecognized primitive types are kept in the snapshot but never drawn.
    #[serde(other)]
    Unknown,
}

/// A non-interactive decorative draw command drawn beneath a track's annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingPrimitive {
    pub id: String,
    pub track_id: String,
    #[serde(rename = "type")]
    pub kind: PrimitiveType,
    #[serde(default)]
    pub class: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<GenomicPos>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<GenomicPos>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl DrawingPrimitive {
    pub fn new<S: Into<String>, T: Into<String>>(id: S, track_id: T, kind: PrimitiveType) -> Self {
        Self {
            id: id.into(),
            track_id: track_id.into(),
            kind,
            class: String::new(),
            start: None,
            end: None,
            fy: None,
            stroke: None,
            fill: None,
            opacity: None,
        }
    }

    pub fn horizontal_line<S: Into<String>, T: Into<String>>(id: S, track_id: T) -> Self {
        Self::new(id, track_id, PrimitiveType::HorizontalLine)
    }

    pub fn background<S: Into<String>, T: Into<String>>(id: S, track_id: T) -> Self {
        Self::new(id, track_id, PrimitiveType::Background)
    }

    pub fn with_extent(mut self, start: GenomicPos, end: GenomicPos) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    pub fn fy(&self) -> f64 {
        self.fy.unwrap_or(0.5)
    }
}

/// The complete, replaceable snapshot handed to the viewer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackViewerData {
    #[serde(default)]
    pub tracks: Vec<Track>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub primitives: Vec<DrawingPrimitive>,
}

impl TrackViewerData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn track(&self, id: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn has_track(&self, id: &str) -> bool {
        self.track(id).is_some()
    }

    pub fn annotation(&self, id: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    /// Checks that track, annotation and primitive ids are each unique.
    pub fn validate(&self) -> Result<()> {
        if let Some(id) = first_duplicate(self.tracks.iter().map(|t| t.id.as_str())) {
            return Err(ViewerError::duplicate_track(id));
        }
        if let Some(id) = first_duplicate(self.annotations.iter().map(|a| a.id.as_str())) {
            return Err(ViewerError::duplicate_element(id));
        }
        if let Some(id) = first_duplicate(self.primitives.iter().map(|p| p.id.as_str())) {
            return Err(ViewerError::duplicate_element(id));
        }
        Ok(())
    }

    /// Removes a track together with every annotation and primitive placed on it.
    pub fn remove_track(&mut self, id: &str) -> Option<Track> {
        let index = self.tracks.iter().position(|t| t.id == id)?;
        let track = self.tracks.remove(index);
        self.annotations.retain(|a| a.track_id != id);
        self.primitives.retain(|p| p.track_id != id);
        Some(track)
    }

    /// Drops annotations and primitives whose track no longer exists.
    /// Returns the number of elements removed.
    pub fn prune_orphans(&mut self) -> usize {
        let track_ids: HashSet<&str> = self.tracks.iter().map(|t| t.id.as_str()).collect();
        let before = self.annotations.len() + self.primitives.len();
        self.annotations.retain(|a| track_ids.contains(a.track_id.as_str()));
        self.primitives.retain(|p| track_ids.contains(p.track_id.as_str()));
        before - (self.annotations.len() + self.primitives.len())
    }
}

fn first_duplicate<'a>(ids: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut seen = HashSet::new();
    ids.into_iter().find(|id| !seen.insert(*id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TrackViewerData {
        TrackViewerData {
            tracks: vec![Track::new("genes", "Genes"), Track::new("domains", "Domains")],
            annotations: vec![
                Annotation::new("g1", "genes", AnnotationType::Arrow, 10.0, 30.0),
                Annotation::new("d1", "domains", AnnotationType::Box, 12.0, 20.0),
            ],
            primitives: vec![DrawingPrimitive::horizontal_line("base", "genes")],
        }
    }

    #[test]
    fn test_parse_web_payload() {
        let json = r##"{
            "tracks": [{"id": "t1", "label": "CDS", "height": 40}],
            "annotations": [{
                "id": "a1", "trackId": "t1", "type": "arrow", "classes": ["gene"],
                "label": "nrps1", "labelPosition": "center", "showLabel": "always",
                "start": 100, "end": 900, "direction": "right", "heightFraction": 0.6,
                "corner_radius": 2, "fill": "#ff0000"
            }],
            "primitives": [{"id": "p1", "trackId": "t1", "type": "horizontal-line", "class": "baseline"}]
        }"##;
        let data = TrackViewerData::from_json(json).unwrap();
        let a = &data.annotations[0];
        assert_eq!(a.kind, AnnotationType::Arrow);
        assert_eq!(a.label_position, LabelPosition::Center);
        assert_eq!(a.show_label, LabelVisibility::Always);
        assert_eq!(a.direction, Some(Direction::Right));
        assert_eq!(a.corner_radius, Some(2.0));
        assert_eq!(a.height_fraction(), 0.6);
        assert_eq!(a.fy(), 0.5);
        assert_eq!(data.primitives[0].kind, PrimitiveType::HorizontalLine);
        assert_eq!(data.tracks[0].height, Some(40.0));
    }

    #[test]
    fn test_unknown_types_degrade() {
        let json = r#"{
            "tracks": [{"id": "t1", "label": "x"}],
            "annotations": [{"id": "a", "trackId": "t1", "type": "hexagon", "start": 1, "end": 2}],
            "primitives": [{"id": "p", "trackId": "t1", "type": "squiggle"}]
        }"#;
        let data = TrackViewerData::from_json(json).unwrap();
        assert_eq!(data.annotations[0].kind, AnnotationType::Unknown);
        assert_eq!(data.annotations[0].kind.as_str(), "box");
        assert_eq!(data.primitives[0].kind, PrimitiveType::Unknown);
    }

    #[test]
    fn test_remove_track_cascades() {
        let mut data = sample();
        let removed = data.remove_track("genes").unwrap();
        assert_eq!(removed.id, "genes");
        assert!(data.annotations.iter().all(|a| a.track_id != "genes"));
        assert!(data.primitives.is_empty());
        assert_eq!(data.annotations.len(), 1);
        assert!(data.remove_track("genes").is_none());
    }

    #[test]
    fn test_validate_duplicate_tracks() {
        let mut data = sample();
        assert!(data.validate().is_ok());
        data.tracks.push(Track::new("genes", "Again"));
        assert_eq!(data.validate(), Err(ViewerError::duplicate_track("genes")));
    }

    #[test]
    fn test_validate_duplicate_elements() {
        let mut data = sample();
        data.annotations.push(Annotation::new("g1", "domains", AnnotationType::Box, 1.0, 2.0));
        assert_eq!(data.validate(), Err(ViewerError::duplicate_element("g1")));

        let mut data = sample();
        data.primitives.push(DrawingPrimitive::background("base", "domains"));
        assert_eq!(data.validate(), Err(ViewerError::duplicate_element("base")));

        // annotations and primitives are keyed separately
        let mut data = sample();
        data.primitives.push(DrawingPrimitive::background("g1", "genes"));
        assert!(data.validate().is_ok());
    }

    #[test]
    fn test_prune_orphans() {
        let mut data = sample();
        data.annotations.push(Annotation::new("lost", "nowhere", AnnotationType::Pin, 5.0, 5.0));
        assert_eq!(data.prune_orphans(), 1);
        assert!(data.annotation("lost").is_none());
    }

    #[test]
    fn test_serialize_roundtrip_keeps_field_names() {
        let data = sample();
        let json = serde_json::to_string(&data).unwrap();
        assert!(json.contains("\"trackId\""));
        assert!(json.contains("\"type\":\"horizontal-line\""));
        let back = TrackViewerData::from_json(&json).unwrap();
        assert_eq!(back, data);
    }
}
