//! Shape builders for annotations and primitives.
//!
//! All coordinates are in track-local pixels: x from the current (zoomed) scale, y from
//! the top of the track.

use crate::scale::LinearScale;
use crate::types::{Annotation, AnnotationType, Direction, DrawingPrimitive, PrimitiveType};

/// Narrowest drawable extent
pub const MIN_SHAPE_WIDTH: f64 = 1.0;
pub const ARROW_HEAD_MAX: f64 = 8.0;
pub const HEXAGON_INDENT_MAX: f64 = 4.0;
pub const PIN_HEAD_RADIUS: f64 = 3.0;
/// Triangle base as a fraction of its height
pub const TRIANGLE_BASE_RATIO: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self { x: self.x + dx, y: self.y + dy, ..*self }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeGeometry {
    Rect { bounds: Bounds, rx: f64 },
    Path { d: String },
    Circle { cx: f64, cy: f64, r: f64 },
    Pin { x: f64, y1: f64, y2: f64, head_r: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationGeometry {
    pub shape: ShapeGeometry,
    pub bounds: Bounds,
    /// Point the label anchors to: the feature point, or the center of an extent.
    pub anchor: (f64, f64),
}

/// Vertical anchor of an element inside its track.
pub fn anchor_y(fy: f64, track_height: f64) -> f64 {
    track_height - fy * track_height
}

pub fn annotation_geometry(annotation: &Annotation, scale: &LinearScale, track_height: f64) -> AnnotationGeometry {
    let x0 = scale.apply(annotation.start);
    let x1 = scale.apply(annotation.end);
    let ay = anchor_y(annotation.fy(), track_height);
    let h = annotation.height_fraction() * track_height;

    if annotation.kind.is_point() {
        let cx = (x0 + x1) / 2.0;
        return point_geometry(annotation.kind, cx, ay, h);
    }

    let width = (x1 - x0).max(MIN_SHAPE_WIDTH);
    let bounds = Bounds::new(x0, ay - h / 2.0, width, h);
    let shape = match annotation.kind {
        AnnotationType::Arrow => ShapeGeometry::Path { d: arrow_path(&bounds, annotation.direction) },
        _ => ShapeGeometry::Rect { bounds, rx: annotation.corner_radius.unwrap_or(0.0).max(0.0) },
    };
    AnnotationGeometry { shape, bounds, anchor: (bounds.center_x(), ay) }
}

fn point_geometry(kind: AnnotationType, cx: f64, ay: f64, h: f64) -> AnnotationGeometry {
    match kind {
        AnnotationType::Circle => {
            let r = h / 2.0;
            AnnotationGeometry {
                shape: ShapeGeometry::Circle { cx, cy: ay, r },
                bounds: Bounds::new(cx - r, ay - r, 2.0 * r, 2.0 * r),
                anchor: (cx, ay),
            }
        }
        AnnotationType::Triangle => {
            let half = TRIANGLE_BASE_RATIO * h / 2.0;
            let d = format!(
                "M{},{}L{},{}L{},{}Z",
                fmt_num(cx),
                fmt_num(ay),
                fmt_num(cx + half),
                fmt_num(ay + h),
                fmt_num(cx - half),
                fmt_num(ay + h)
            );
            AnnotationGeometry {
                shape: ShapeGeometry::Path { d },
                bounds: Bounds::new(cx - half, ay, 2.0 * half, h),
                anchor: (cx, ay),
            }
        }
        _ => {
            let top = ay - h;
            AnnotationGeometry {
                shape: ShapeGeometry::Pin { x: cx, y1: ay, y2: top, head_r: PIN_HEAD_RADIUS },
                bounds: Bounds::new(
                    cx - PIN_HEAD_RADIUS,
                    top - PIN_HEAD_RADIUS,
                    2.0 * PIN_HEAD_RADIUS,
                    h + PIN_HEAD_RADIUS,
                ),
                anchor: (cx, ay),
            }
        }
    }
}

/// Outline of an arrow body. Without a direction the shape is a symmetric hexagon.
pub fn arrow_path(b: &Bounds, direction: Option<Direction>) -> String {
    let (x, y, w, h) = (b.x, b.y, b.width, b.height);
    let mid = y + h / 2.0;
    let points: Vec<(f64, f64)> = match direction {
        Some(Direction::Right) => {
            let head = arrow_head(w, h);
            vec![(x, y), (x + w - head, y), (x + w, mid), (x + w - head, y + h), (x, y + h)]
        }
        Some(Direction::Left) => {
            let head = arrow_head(w, h);
            vec![(x + head, y), (x + w, y), (x + w, y + h), (x + head, y + h), (x, mid)]
        }
        None => {
            let indent = (0.1 * w).min(0.3 * h).min(HEXAGON_INDENT_MAX);
            vec![
                (x + indent, y),
                (x + w - indent, y),
                (x + w, mid),
                (x + w - indent, y + h),
                (x + indent, y + h),
                (x, mid),
            ]
        }
    };
    polygon_path(&points)
}

pub fn arrow_head(width: f64, height: f64) -> f64 {
    (0.2 * width).min(0.5 * height).min(ARROW_HEAD_MAX)
}

fn polygon_path(points: &[(f64, f64)]) -> String {
    let mut d = String::new();
    for (i, (px, py)) in points.iter().enumerate() {
        d.push(if i == 0 { 'M' } else { 'L' });
        d.push_str(&fmt_num(*px));
        d.push(',');
        d.push_str(&fmt_num(*py));
    }
    d.push('Z');
    d
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrimitiveGeometry {
    Line { x1: f64, x2: f64, y: f64 },
    Rect(Bounds),
}

/// Geometry of a primitive, or `None` for types that are not drawn.
///
/// Missing `start`/`end` extend to the edges of the scale's pixel range.
pub fn primitive_geometry(
    primitive: &DrawingPrimitive,
    scale: &LinearScale,
    track_height: f64,
) -> Option<PrimitiveGeometry> {
    let (r0, r1) = scale.range();
    let x1 = primitive.start.map(|s| scale.apply(s)).unwrap_or(r0);
    let x2 = primitive.end.map(|e| scale.apply(e)).unwrap_or(r1);
    match primitive.kind {
        PrimitiveType::HorizontalLine => {
            let y = anchor_y(primitive.fy(), track_height).round() + 0.5;
            Some(PrimitiveGeometry::Line { x1, x2, y })
        }
        PrimitiveType::Background => {
            let (lo, hi) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
            Some(PrimitiveGeometry::Rect(Bounds::new(lo, 0.0, hi - lo, track_height)))
        }
        PrimitiveType::Unknown => None,
    }
}

/// Compact, deterministic number formatting for coordinates.
pub fn fmt_num(v: f64) -> String {
    let s = format!("{:.2}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scale() -> LinearScale {
        LinearScale::new((0.0, 100.0), (0.0, 200.0))
    }

    #[test]
    fn test_box_width_and_anchor() {
        let a = Annotation::new("a", "t", AnnotationType::Box, 10.0, 30.0);
        let g = annotation_geometry(&a, &scale(), 30.0);
        assert_eq!(g.bounds.width, 40.0);
        assert_eq!(g.bounds.x, 20.0);
        // anchor 15, height 15
        assert_eq!(g.bounds.y, 7.5);
        assert_eq!(g.bounds.height, 15.0);
        assert_eq!(g.anchor, (40.0, 15.0));
    }

    #[test]
    fn test_zero_length_box_is_visible() {
        let a = Annotation::new("a", "t", AnnotationType::Box, 50.0, 50.0);
        let g = annotation_geometry(&a, &scale(), 30.0);
        assert_eq!(g.bounds.width, MIN_SHAPE_WIDTH);
    }

    #[test]
    fn test_arrow_head_limits() {
        assert_eq!(arrow_head(100.0, 40.0), 8.0);
        assert_eq!(arrow_head(10.0, 40.0), 2.0);
        assert_eq!(arrow_head(100.0, 6.0), 3.0);
    }

    #[test]
    fn test_arrow_paths() {
        let b = Bounds::new(0.0, 0.0, 100.0, 20.0);
        assert_eq!(arrow_path(&b, Some(Direction::Right)), "M0,0L92,0L100,10L92,20L0,20Z");
        assert_eq!(arrow_path(&b, Some(Direction::Left)), "M8,0L100,0L100,20L8,20L0,10Z");
        assert_eq!(arrow_path(&b, None), "M4,0L96,0L100,10L96,20L4,20L0,10Z");
    }

    #[test]
    fn test_point_shapes() {
        let circle = Annotation::new("c", "t", AnnotationType::Circle, 40.0, 60.0);
        let g = annotation_geometry(&circle, &scale(), 20.0);
        assert_eq!(g.shape, ShapeGeometry::Circle { cx: 100.0, cy: 10.0, r: 5.0 });

        let tri = Annotation::new("x", "t", AnnotationType::Triangle, 50.0, 50.0);
        let g = annotation_geometry(&tri, &scale(), 20.0);
        assert_eq!(g.shape, ShapeGeometry::Path { d: "M100,10L104,20L96,20Z".into() });

        let pin = Annotation::new("p", "t", AnnotationType::Pin, 50.0, 50.0);
        let g = annotation_geometry(&pin, &scale(), 20.0);
        assert_eq!(g.shape, ShapeGeometry::Pin { x: 100.0, y1: 10.0, y2: 0.0, head_r: 3.0 });
        assert!(g.bounds.contains(100.0, -2.0));
    }

    #[test]
    fn test_unknown_type_draws_as_box() {
        let a = Annotation::new("a", "t", AnnotationType::Unknown, 0.0, 10.0);
        let g = annotation_geometry(&a, &scale(), 30.0);
        assert!(matches!(g.shape, ShapeGeometry::Rect { .. }));
    }

    #[test]
    fn test_primitive_extends_to_range() {
        let line = DrawingPrimitive::horizontal_line("p", "t");
        let g = primitive_geometry(&line, &scale(), 25.0).unwrap();
        assert_eq!(g, PrimitiveGeometry::Line { x1: 0.0, x2: 200.0, y: 13.5 });

        let bg = DrawingPrimitive::background("b", "t").with_extent(25.0, 75.0);
        let g = primitive_geometry(&bg, &scale(), 25.0).unwrap();
        assert_eq!(g, PrimitiveGeometry::Rect(Bounds::new(50.0, 0.0, 100.0, 25.0)));

        let unknown = DrawingPrimitive::new("u", "t", PrimitiveType::Unknown);
        assert!(primitive_geometry(&unknown, &scale(), 25.0).is_none());
    }

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(12.0), "12");
        assert_eq!(fmt_num(12.346), "12.35");
        assert_eq!(fmt_num(-0.001), "0");
        assert_eq!(fmt_num(0.5), "0.5");
    }
}
