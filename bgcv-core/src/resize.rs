//! Debounced container resize handling.

use std::time::Duration;

use crate::host::ContainerBox;

pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(100);
/// Responsive width never goes below this many pixels
pub const MIN_RESPONSIVE_WIDTH: f64 = 600.0;

/// Single-slot cancellable task queue. Scheduling replaces whatever is pending.
#[derive(Debug, Clone)]
pub struct DebounceSlot<T> {
    delay: Duration,
    pending: Option<(T, Duration)>,
}

impl<T> DebounceSlot<T> {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    pub fn schedule(&mut self, value: T) {
        self.pending = Some((value, self.delay));
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(v, _)| v)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Advance time; yields the pending value once its delay has elapsed.
    pub fn poll(&mut self, elapsed: Duration) -> Option<T> {
        let (_, remaining) = self.pending.as_mut()?;
        *remaining = remaining.saturating_sub(elapsed);
        if remaining.is_zero() {
            self.pending.take().map(|(v, _)| v)
        } else {
            None
        }
    }
}

impl<T> Default for DebounceSlot<T> {
    fn default() -> Self {
        Self::new(RESIZE_DEBOUNCE)
    }
}

pub fn responsive_width(container: &ContainerBox) -> f64 {
    container.width.max(MIN_RESPONSIVE_WIDTH)
}
