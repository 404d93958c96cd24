//! Zoom/pan controller
//!
//! Maintains a one-dimensional affine transform (translate `x`, scale `k`) over the chart's
//! pixel space. The transform is always clamped to the configured scale extent and
//! constrained so the content never pans off the chart. Pointer input is classified into
//! drags (pan) and wheel / ctrl gestures (zoom). Animated transitions are stepped by
//! [`ZoomController::tick`], so the controller is independent of any wall clock.

use std::time::Duration;

use crate::scale::LinearScale;

/// Length of `zoom_to` and `reset_zoom` animations
pub const ZOOM_TRANSITION: Duration = Duration::from_millis(750);

/// Wheel delta to log2 scale factor, as used by d3-zoom
const WHEEL_FACTOR: f64 = 0.002;
const CTRL_WHEEL_MULTIPLIER: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomTransform {
    pub k: f64,
    pub x: f64,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ZoomTransform {
    pub const IDENTITY: ZoomTransform = ZoomTransform { k: 1.0, x: 0.0 };

    pub fn new(k: f64, x: f64) -> Self {
        Self { k, x }
    }

    pub fn apply_x(&self, px: f64) -> f64 {
        px * self.k + self.x
    }

    pub fn invert_x(&self, px: f64) -> f64 {
        (px - self.x) / self.k
    }

    /// Shift by `dx` in untransformed units.
    pub fn translate(&self, dx: f64) -> Self {
        Self { k: self.k, x: self.x + self.k * dx }
    }

    /// A copy of `base` whose domain shows what this transform brings into view.
    pub fn rescale_x(&self, base: &LinearScale) -> LinearScale {
        let (r0, r1) = base.range();
        let domain = (base.invert(self.invert_x(r0)), base.invert(self.invert_x(r1)));
        LinearScale::new(domain, base.range())
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

/// Keep the viewport `extent` inside `translate_extent` (the d3-zoom default constraint).
pub fn constrain(t: ZoomTransform, extent: (f64, f64), translate_extent: (f64, f64)) -> ZoomTransform {
    let dx0 = t.invert_x(extent.0) - translate_extent.0;
    let dx1 = t.invert_x(extent.1) - translate_extent.1;
    let dx = if dx1 > dx0 {
        (dx0 + dx1) / 2.0
    } else {
        let low = dx0.min(0.0);
        if low != 0.0 { low } else { dx1.max(0.0) }
    };
    t.translate(dx)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Grab,
    Grabbing,
}

impl Cursor {
    pub fn as_css(self) -> &'static str {
        match self {
            Cursor::Grab => "grab",
            Cursor::Grabbing => "grabbing",
        }
    }
}

/// Pointer input over the chart. `x` is in chart coordinates (left margin removed).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { x: f64, y: f64, button: u16, ctrl: bool },
    Move { x: f64, y: f64 },
    Up { x: f64, y: f64 },
    Wheel { x: f64, y: f64, delta_y: f64, ctrl: bool },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragState {
    last_x: f64,
    moved: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Transition {
    from: ZoomTransform,
    to: ZoomTransform,
    duration: Duration,
    elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct ZoomController {
    transform: ZoomTransform,
    scale_extent: [f64; 2],
    extent: (f64, f64),
    drag: Option<DragState>,
    transition: Option<Transition>,
    cursor: Cursor,
    suppress_click: bool,
}

impl ZoomController {
    pub fn new(scale_extent: [f64; 2], width: f64) -> Self {
        Self {
            transform: ZoomTransform::IDENTITY,
            scale_extent,
            extent: (0.0, width),
            drag: None,
            transition: None,
            cursor: Cursor::Grab,
            suppress_click: false,
        }
    }

    pub fn transform(&self) -> ZoomTransform {
        self.transform
    }

    pub fn scale_extent(&self) -> [f64; 2] {
        self.scale_extent
    }

    pub fn extent(&self) -> (f64, f64) {
        self.extent
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn in_transition(&self) -> bool {
        self.transition.is_some()
    }

    /// Update the chart width; the current transform is re-constrained to it.
    pub fn set_width(&mut self, width: f64) -> bool {
        self.extent = (0.0, width);
        let constrained = self.constrained(self.transform);
        self.replace(constrained)
    }

    /// Jump to a transform immediately, cancelling any running transition.
    pub fn set_transform(&mut self, t: ZoomTransform) -> bool {
        self.transition = None;
        let constrained = self.constrained(t);
        self.replace(constrained)
    }

    /// Animate from the current transform to `target` over `duration`.
    pub fn transition_to(&mut self, target: ZoomTransform, duration: Duration) {
        let to = self.constrained(target);
        // an empty extent has no visible window to interpolate
        if duration.is_zero() || self.extent.1 - self.extent.0 <= 0.0 {
            self.set_transform(to);
            return;
        }
        self.transition = Some(Transition {
            from: self.transform,
            to,
            duration,
            elapsed: Duration::ZERO,
        });
    }

    /// Transform that maps `[start, end]` of the base scale onto the full chart width.
    pub fn transform_for_interval(&self, base: &LinearScale, start: f64, end: f64) -> ZoomTransform {
        let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
        let width = self.extent.1 - self.extent.0;
        let x0 = base.apply(lo);
        let x1 = base.apply(hi);
        let span = (x1 - x0).max(f64::EPSILON);
        let k = self.clamp_scale(width / span);
        let center = (x0 + x1) / 2.0;
        self.constrained(ZoomTransform::new(k, self.extent.0 + width / 2.0 - center * k))
    }

    /// Advance any running transition. Returns true when the transform changed.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let Some(mut transition) = self.transition else {
            return false;
        };
        transition.elapsed += dt;
        let next = if transition.elapsed >= transition.duration {
            self.transition = None;
            transition.to
        } else {
            let t = transition.elapsed.as_secs_f64() / transition.duration.as_secs_f64();
            self.transition = Some(transition);
            self.interpolate(transition.from, transition.to, ease_cubic_in_out(t))
        };
        self.replace(next)
    }

    /// Route a pointer event. Returns true when the transform changed.
    pub fn handle(&mut self, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Down { x, button, ctrl, .. } => {
                // only an unmodified primary press starts a pan
                if button != 0 || ctrl {
                    return false;
                }
                self.transition = None;
                self.drag = Some(DragState { last_x: x, moved: false });
                self.cursor = Cursor::Grabbing;
                false
            }
            PointerEvent::Move { x, .. } => {
                let Some(drag) = self.drag.as_mut() else {
                    return false;
                };
                let dx = x - drag.last_x;
                drag.last_x = x;
                if dx == 0.0 {
                    return false;
                }
                drag.moved = true;
                let panned = ZoomTransform::new(self.transform.k, self.transform.x + dx);
                let constrained = self.constrained(panned);
                self.replace(constrained)
            }
            PointerEvent::Up { .. } => {
                if let Some(drag) = self.drag.take() {
                    self.suppress_click = drag.moved;
                    self.cursor = Cursor::Grab;
                }
                false
            }
            PointerEvent::Wheel { x, delta_y, ctrl, .. } => {
                let multiplier = if ctrl { CTRL_WHEEL_MULTIPLIER } else { 1.0 };
                let factor = 2f64.powf(-delta_y * WHEEL_FACTOR * multiplier);
                self.transition = None;
                self.scale_at(x, self.transform.k * factor)
            }
        }
    }

    /// Whether the click that follows the last mouseup should be ignored (it ended a pan).
    pub fn take_click_suppression(&mut self) -> bool {
        std::mem::take(&mut self.suppress_click)
    }

    fn scale_at(&mut self, px: f64, k: f64) -> bool {
        let k = self.clamp_scale(k);
        let anchor = self.transform.invert_x(px);
        let scaled = ZoomTransform::new(k, px - anchor * k);
        let constrained = self.constrained(scaled);
        self.replace(constrained)
    }

    fn clamp_scale(&self, k: f64) -> f64 {
        k.clamp(self.scale_extent[0], self.scale_extent[1])
    }

    fn constrained(&self, t: ZoomTransform) -> ZoomTransform {
        let t = ZoomTransform::new(self.clamp_scale(t.k), t.x);
        constrain(t, self.extent, self.extent)
    }

    fn replace(&mut self, t: ZoomTransform) -> bool {
        if t == self.transform {
            return false;
        }
        self.transform = t;
        true
    }

    /// Interpolates the visible window: center linearly, width geometrically.
    fn interpolate(&self, from: ZoomTransform, to: ZoomTransform, t: f64) -> ZoomTransform {
        let (e0, e1) = self.extent;
        let width = e1 - e0;
        if width <= 0.0 {
            return to;
        }
        let center = |z: &ZoomTransform| (z.invert_x(e0) + z.invert_x(e1)) / 2.0;
        let c = center(&from) + (center(&to) - center(&from)) * t;
        let w0 = width / from.k;
        let w1 = width / to.k;
        let w = w0 * (w1 / w0).powf(t);
        let k = width / w;
        ZoomTransform::new(k, e0 + width / 2.0 - c * k)
    }
}

fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_rescale_identity() {
        let base = LinearScale::new((0.0, 100.0), (0.0, 200.0));
        let rescaled = ZoomTransform::IDENTITY.rescale_x(&base);
        assert_eq!(rescaled.domain(), (0.0, 100.0));
    }

    #[test]
    fn test_rescale_zoomed() {
        let base = LinearScale::new((0.0, 100.0), (0.0, 200.0));
        let t = ZoomTransform::new(2.0, -100.0);
        let rescaled = t.rescale_x(&base);
        let (d0, d1) = rescaled.domain();
        assert!(approx(d0, 25.0) && approx(d1, 75.0));
    }

    #[test]
    fn test_constrain_keeps_content_in_view() {
        let t = constrain(ZoomTransform::new(2.0, 50.0), (0.0, 200.0), (0.0, 200.0));
        assert_eq!(t.x, 0.0);
        let t = constrain(ZoomTransform::new(2.0, -500.0), (0.0, 200.0), (0.0, 200.0));
        assert_eq!(t.x, -200.0);
        let t = constrain(ZoomTransform::new(2.0, -50.0), (0.0, 200.0), (0.0, 200.0));
        assert_eq!(t.x, -50.0);
    }

    #[test]
    fn test_interval_transform() {
        let base = LinearScale::new((0.0, 100.0), (0.0, 200.0));
        let zoom = ZoomController::new([1.0, 100.0], 200.0);
        let t = zoom.transform_for_interval(&base, 25.0, 75.0);
        assert!(approx(t.k, 2.0));
        assert!(approx(t.x, -100.0));
    }

    #[test]
    fn test_interval_clamped_to_extent() {
        let base = LinearScale::new((0.0, 100.0), (0.0, 200.0));
        let zoom = ZoomController::new([1.0, 4.0], 200.0);
        let t = zoom.transform_for_interval(&base, 50.0, 51.0);
        assert_eq!(t.k, 4.0);
    }

    #[test]
    fn test_transition_reaches_target() {
        let base = LinearScale::new((0.0, 100.0), (0.0, 200.0));
        let mut zoom = ZoomController::new([1.0, 100.0], 200.0);
        let target = zoom.transform_for_interval(&base, 25.0, 75.0);
        zoom.transition_to(target, ZOOM_TRANSITION);
        assert!(zoom.in_transition());
        assert!(zoom.tick(Duration::from_millis(300)));
        let mid = zoom.transform();
        assert!(mid.k > 1.0 && mid.k < 2.0);
        zoom.tick(Duration::from_millis(450));
        assert!(!zoom.in_transition());
        assert_eq!(zoom.transform(), target);
        assert!(!zoom.tick(Duration::from_millis(10)));
    }

    #[test]
    fn test_transition_with_empty_extent_stays_finite() {
        let base = LinearScale::new((0.0, 100.0), (0.0, 0.0));
        let mut zoom = ZoomController::new([1.0, 100.0], 0.0);
        let target = zoom.transform_for_interval(&base, 10.0, 20.0);
        zoom.transition_to(target, ZOOM_TRANSITION);
        assert!(!zoom.in_transition());
        for _ in 0..4 {
            zoom.tick(Duration::from_millis(300));
            let t = zoom.transform();
            assert!(t.k.is_finite() && t.x.is_finite());
        }
    }

    #[test]
    fn test_transition_survives_width_collapse() {
        let base = LinearScale::new((0.0, 100.0), (0.0, 200.0));
        let mut zoom = ZoomController::new([1.0, 100.0], 200.0);
        let target = zoom.transform_for_interval(&base, 25.0, 75.0);
        zoom.transition_to(target, ZOOM_TRANSITION);
        zoom.set_width(0.0);
        for _ in 0..4 {
            zoom.tick(Duration::from_millis(300));
            let t = zoom.transform();
            assert!(t.k.is_finite() && t.x.is_finite());
        }
    }

    #[test]
    fn test_drag_pans_and_suppresses_click() {
        let mut zoom = ZoomController::new([1.0, 100.0], 200.0);
        zoom.set_transform(ZoomTransform::new(2.0, -100.0));
        zoom.handle(PointerEvent::Down { x: 100.0, y: 5.0, button: 0, ctrl: false });
        assert!(zoom.is_dragging());
        assert_eq!(zoom.cursor(), Cursor::Grabbing);
        assert!(zoom.handle(PointerEvent::Move { x: 130.0, y: 5.0 }));
        assert_eq!(zoom.transform().x, -70.0);
        zoom.handle(PointerEvent::Up { x: 130.0, y: 5.0 });
        assert!(!zoom.is_dragging());
        assert_eq!(zoom.cursor(), Cursor::Grab);
        assert!(zoom.take_click_suppression());
        assert!(!zoom.take_click_suppression());
    }

    #[test]
    fn test_ctrl_press_does_not_drag() {
        let mut zoom = ZoomController::new([1.0, 100.0], 200.0);
        zoom.handle(PointerEvent::Down { x: 10.0, y: 0.0, button: 0, ctrl: true });
        assert!(!zoom.is_dragging());
        zoom.handle(PointerEvent::Down { x: 10.0, y: 0.0, button: 2, ctrl: false });
        assert!(!zoom.is_dragging());
        assert_eq!(zoom.cursor(), Cursor::Grab);
    }

    #[test]
    fn test_wheel_zooms_at_pointer() {
        let mut zoom = ZoomController::new([1.0, 100.0], 200.0);
        assert!(zoom.handle(PointerEvent::Wheel { x: 50.0, y: 0.0, delta_y: -500.0, ctrl: false }));
        let t = zoom.transform();
        assert!(approx(t.k, 2.0));
        // the point under the pointer stays put
        assert!(approx(t.invert_x(50.0), 50.0));
        assert!(!zoom.is_dragging());
    }

    #[test]
    fn test_wheel_clamped() {
        let mut zoom = ZoomController::new([1.0, 8.0], 200.0);
        zoom.handle(PointerEvent::Wheel { x: 0.0, y: 0.0, delta_y: -100_000.0, ctrl: true });
        assert_eq!(zoom.transform().k, 8.0);
        zoom.handle(PointerEvent::Wheel { x: 0.0, y: 0.0, delta_y: 100_000.0, ctrl: false });
        assert_eq!(zoom.transform(), ZoomTransform::IDENTITY);
    }
}
