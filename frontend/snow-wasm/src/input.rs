//! Pointer position and velocity derived from raw move/leave samples.

use crate::constants::*;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

impl PointerState {
    pub const OFFSCREEN: Self = Self {
        x: POINTER_OFFSCREEN,
        y: POINTER_OFFSCREEN,
        vx: 0.0,
        vy: 0.0,
    };

    pub fn speed(&self) -> f32 {
        (self.vx * self.vx + self.vy * self.vy).sqrt()
    }
}

#[derive(Clone, Debug)]
pub struct PointerTracker {
    state: PointerState,
    last_x: f32,
    last_y: f32,
    last_sample_ms: f64,
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerTracker {
    pub fn new() -> Self {
        Self {
            state: PointerState::OFFSCREEN,
            last_x: 0.0,
            last_y: 0.0,
            last_sample_ms: 0.0,
        }
    }

    pub fn state(&self) -> PointerState {
        self.state
    }

    /// Velocity is normalised to a 16 ms frame so fast and slow event
    /// streams push particles equally hard.
    pub fn on_move(&mut self, x: f32, y: f32, time_ms: f64) {
        let dt = (time_ms - self.last_sample_ms).max(POINTER_MIN_DT_MS) as f32;
        self.state = PointerState {
            x,
            y,
            vx: (x - self.last_x) / dt * POINTER_FRAME_MS,
            vy: (y - self.last_y) / dt * POINTER_FRAME_MS,
        };
        self.last_x = x;
        self.last_y = y;
        self.last_sample_ms = time_ms;
    }

    pub fn on_leave(&mut self) {
        self.state = PointerState::OFFSCREEN;
    }

    /// Called once per frame whether or not new samples arrived.
    pub fn decay(&mut self) {
        self.state.vx *= POINTER_DECAY;
        self.state.vy *= POINTER_DECAY;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn velocity_is_normalised_to_a_frame() {
        let mut tracker = PointerTracker::new();
        tracker.on_move(100.0, 100.0, 1000.0);
        tracker.on_move(110.0, 95.0, 1032.0);

        let state = tracker.state();
        assert_eq!((state.x, state.y), (110.0, 95.0));
        assert!((state.vx - 5.0).abs() < 1e-6);
        assert!((state.vy + 2.5).abs() < 1e-6);
    }

    #[test]
    fn elapsed_time_is_floored_at_one_millisecond() {
        let mut tracker = PointerTracker::new();
        tracker.on_move(0.0, 0.0, 500.0);
        tracker.on_move(2.0, 0.0, 500.0);
        assert!((tracker.state().vx - 32.0).abs() < 1e-6);
    }

    #[test]
    fn leave_parks_the_pointer_far_away() {
        let mut tracker = PointerTracker::new();
        tracker.on_move(40.0, 40.0, 16.0);
        tracker.on_leave();
        assert_eq!(tracker.state(), PointerState::OFFSCREEN);
    }

    #[test]
    fn velocity_decays_geometrically() {
        let mut tracker = PointerTracker::new();
        tracker.on_move(0.0, 0.0, 100.0);
        tracker.on_move(16.0, 0.0, 116.0);
        for _ in 0..10 {
            tracker.decay();
        }
        let expected = 16.0 * 0.95f32.powi(10);
        assert!((tracker.state().vx - expected).abs() < 1e-4);
        assert_eq!(tracker.state().x, 16.0);
    }
}
