use bgcv_core::layout::TrackLayout;
use bgcv_core::scale::LinearScale;
use bgcv_core::zoom::ZoomController;
use bgcv_core::{PointerEvent, Track};
use proptest::prelude::*;

fn wheel() -> impl Strategy<Value = PointerEvent> {
    (0.0f64..500.0, -2000.0f64..2000.0, any::<bool>())
        .prop_map(|(x, delta_y, ctrl)| PointerEvent::Wheel { x, y: 0.0, delta_y, ctrl })
}

proptest! {
    #[test]
    fn zoom_scale_stays_in_extent(events in prop::collection::vec(wheel(), 1..40)) {
        let mut zoom = ZoomController::new([1.0, 50.0], 500.0);
        for event in events {
            zoom.handle(event);
            let t = zoom.transform();
            prop_assert!(t.k >= 1.0 && t.k <= 50.0);
            // the chart never shows anything outside the base range
            prop_assert!(t.x <= 1e-9);
            prop_assert!(t.x + 500.0 * t.k >= 500.0 - 1e-6);
        }
    }

    #[test]
    fn interval_zoom_is_clamped(start in 0.0f64..1000.0, len in 0.0f64..1000.0) {
        let zoom = ZoomController::new([1.0, 20.0], 400.0);
        let base = LinearScale::new((0.0, 1000.0), (0.0, 400.0));
        let t = zoom.transform_for_interval(&base, start, start + len);
        prop_assert!(t.k >= 1.0 && t.k <= 20.0);
    }

    #[test]
    fn layout_offsets_sum_heights(heights in prop::collection::vec(prop::option::of(1.0f64..200.0), 0..20)) {
        let tracks: Vec<Track> = heights
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let t = Track::new(format!("t{}", i), "");
                match h {
                    Some(h) => t.with_height(*h),
                    None => t,
                }
            })
            .collect();
        let layout = TrackLayout::compute(&tracks, 30.0);
        let mut expected = 0.0;
        for (i, h) in heights.iter().enumerate() {
            prop_assert_eq!(layout.offset(&format!("t{}", i)), Some(expected));
            expected += h.unwrap_or(30.0);
        }
        prop_assert!((layout.content_height() - expected).abs() < 1e-9);
    }
}
