//! Drag gesture to knob value mapping.
//!
//! Turns raw pointer/touch motion into a bounded, quantized knob position.
//! Modeled as an explicit `Idle -> Dragging` state machine so the
//! out-of-range drop rule is a transition guard, testable without real
//! pointer events.
//!
//! Values are quantized to hundredths. A computed value outside `[0, limit]`
//! is rejected outright rather than clamped: the knob hits a stop and waits
//! for motion that brings the value back in range, so re-entering range never
//! causes a jump.

/// Default sensitivity: value units per pixel of vertical motion.
pub const DEFAULT_SENSITIVITY: f64 = 0.01;

/// Default upper bound of the value range.
pub const DEFAULT_LIMIT: f64 = 1.0;

fn round_hundredths(n: f64) -> f64 {
    (n * 100.0).round() / 100.0
}

/// Gesture state: which drag mode is active, if any.
#[derive(Debug, Clone, Copy, PartialEq)]
enum DragState {
    Idle,
    /// Pointer drag: updates arrive as signed vertical deltas.
    Pointer { value: f64 },
    /// Touch drag: updates arrive as absolute Y positions.
    Touch { value: f64, last_y: f64 },
}

/// Maps one logical drag at a time onto a knob value.
///
/// `begin_*` brackets a drag together with [`DragGesture::end`]; a new begin
/// implicitly discards any unfinished gesture. All methods run synchronously
/// on the caller's thread.
#[derive(Debug, Clone)]
pub struct DragGesture {
    sensitivity: f64,
    limit: f64,
    state: DragState,
}

impl Default for DragGesture {
    fn default() -> Self {
        Self::new(DEFAULT_SENSITIVITY, DEFAULT_LIMIT)
    }
}

impl DragGesture {
    pub fn new(sensitivity: f64, limit: f64) -> Self {
        Self {
            sensitivity,
            limit,
            state: DragState::Idle,
        }
    }

    /// Start a pointer drag from the knob's current committed value.
    pub fn begin_pointer(&mut self, value: f64) {
        self.state = DragState::Pointer { value };
    }

    /// Start a touch drag from the knob's current committed value and the
    /// initial touch Y position.
    pub fn begin_touch(&mut self, value: f64, y: f64) {
        self.state = DragState::Touch { value, last_y: y };
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.state != DragState::Idle
    }

    /// Feed a signed vertical pointer delta (positive = downward).
    ///
    /// Returns the newly committed value, or `None` when the motion is a
    /// no-op (zero delta, out-of-range result, or no active pointer drag).
    pub fn pointer_move(&mut self, delta_y: f64) -> Option<f64> {
        let DragState::Pointer { value } = &mut self.state else {
            return None;
        };
        if delta_y == 0.0 {
            return None;
        }
        // Upward motion increases the value
        let change = delta_y * self.sensitivity * -1.0;
        let next = round_hundredths(*value + change);
        if next >= 0.0 && next <= self.limit {
            *value = next;
            Some(next)
        } else {
            None
        }
    }

    /// Feed an absolute touch Y position.
    ///
    /// Applies the pointer formula to the delta from the last touch position,
    /// then halves the result before the range check. The halving makes touch
    /// deliberately less sensitive per unit motion than pointer drags; it is
    /// long-standing product behavior and must not be normalized away.
    pub fn touch_move(&mut self, y: f64) -> Option<f64> {
        let DragState::Touch { value, last_y } = &mut self.state else {
            return None;
        };
        let change = (y - *last_y) * self.sensitivity * -1.0;
        let next = round_hundredths(*value + change) / 2.0;
        // The last position advances even when the value is rejected
        *last_y = y;
        if next >= 0.0 && next <= self.limit {
            *value = next;
            Some(next)
        } else {
            None
        }
    }

    /// Finish the drag. Idempotent; the only cancellation point.
    pub fn end(&mut self) {
        self.state = DragState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_upward_motion_increases_value() {
        let mut g = DragGesture::default();
        g.begin_pointer(0.5);
        // 10px up at 0.01/px => +0.1
        assert_eq!(g.pointer_move(-10.0), Some(0.6));
        assert_eq!(g.pointer_move(-10.0), Some(0.7));
    }

    #[test]
    fn test_downward_motion_decreases_value() {
        let mut g = DragGesture::default();
        g.begin_pointer(0.5);
        assert_eq!(g.pointer_move(20.0), Some(0.3));
    }

    #[test]
    fn test_zero_delta_is_noop() {
        let mut g = DragGesture::default();
        g.begin_pointer(0.5);
        assert_eq!(g.pointer_move(0.0), None);
    }

    #[test]
    fn test_out_of_range_is_dropped_not_clamped() {
        let mut g = DragGesture::default();
        g.begin_pointer(0.95);
        // +0.1 would land at 1.05 > limit: rejected, value stays at 0.95
        assert_eq!(g.pointer_move(-10.0), None);
        // A smaller move from the unchanged value still works
        assert_eq!(g.pointer_move(-5.0), Some(1.0));
    }

    #[test]
    fn test_below_zero_is_dropped() {
        let mut g = DragGesture::default();
        g.begin_pointer(0.03);
        assert_eq!(g.pointer_move(10.0), None);
        assert_eq!(g.pointer_move(3.0), Some(0.0));
    }

    #[test]
    fn test_update_observes_previous_commit() {
        let mut g = DragGesture::default();
        g.begin_pointer(0.0);
        let a = g.pointer_move(-7.0).unwrap();
        let b = g.pointer_move(-3.0).unwrap();
        assert_eq!(a, 0.07);
        assert_eq!(b, 0.1);
    }

    #[test]
    fn test_move_without_begin_is_noop() {
        let mut g = DragGesture::default();
        assert_eq!(g.pointer_move(-10.0), None);
        assert_eq!(g.touch_move(100.0), None);
    }

    #[test]
    fn test_end_is_idempotent() {
        let mut g = DragGesture::default();
        g.begin_pointer(0.5);
        g.end();
        g.end();
        assert!(!g.is_dragging());
        assert_eq!(g.pointer_move(-10.0), None);
    }

    #[test]
    fn test_new_begin_discards_prior_gesture() {
        let mut g = DragGesture::default();
        g.begin_pointer(0.9);
        g.begin_pointer(0.1);
        assert_eq!(g.pointer_move(-10.0), Some(0.2));
    }

    #[test]
    fn test_touch_halves_quantized_result() {
        let mut g = DragGesture::default();
        g.begin_touch(0.5, 200.0);
        // 20px up: quantize(0.5 + 0.2) / 2 = 0.35
        assert_eq!(g.touch_move(180.0), Some(0.35));
    }

    #[test]
    fn test_touch_tracks_last_position() {
        let mut g = DragGesture::default();
        g.begin_touch(0.0, 100.0);
        assert_eq!(g.touch_move(80.0), Some(0.1));
        // Delta is measured from the previous position, not the origin
        assert_eq!(g.touch_move(60.0), Some(0.15));
    }

    #[test]
    fn test_touch_rejection_still_advances_position() {
        let mut g = DragGesture::default();
        g.begin_touch(0.05, 100.0);
        // 20px down: quantize(0.05 - 0.2) / 2 = -0.075: rejected
        assert_eq!(g.touch_move(120.0), None);
        // Next delta is relative to y=120, not y=100
        assert_eq!(g.touch_move(100.0), Some(0.125));
    }

    proptest! {
        #[test]
        fn pointer_values_quantized_and_bounded(
            start in 0.0f64..=1.0,
            deltas in proptest::collection::vec(-50.0f64..=50.0, 1..40),
        ) {
            let mut g = DragGesture::default();
            g.begin_pointer(round_hundredths(start));
            for dy in deltas {
                if let Some(v) = g.pointer_move(dy) {
                    // Multiple of 0.01 within float tolerance
                    let scaled = v * 100.0;
                    prop_assert!((scaled - scaled.round()).abs() < 1e-9);
                    prop_assert!((0.0..=DEFAULT_LIMIT).contains(&v));
                }
            }
        }
    }
}
