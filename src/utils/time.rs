#[cfg(not(target_arch = "wasm32"))]
pub use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
pub use web_time::{Duration, Instant};

/// Longest step handed to the animation runtime after a stall (tab switch, debugger pause).
pub const MAX_FRAME_STEP: Duration = Duration::from_millis(100);

/// Frame clock for driving [`AvatarScene::render_frame`](crate::stage::AvatarScene::render_frame).
///
/// `tick` measures wall time but clamps the step to `max_step`, so a long
/// stall does not fast-forward physics in a single update.
#[derive(Debug, Clone)]
pub struct FrameClock {
    started: Instant,
    last_tick: Instant,
    max_step: Duration,
    /// Clamped step of the last tick
    pub step: Duration,
    pub frames: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    #[must_use]
    pub fn starting_at(now: Instant) -> Self {
        Self {
            started: now,
            last_tick: now,
            max_step: MAX_FRAME_STEP,
            step: Duration::ZERO,
            frames: 0,
        }
    }

    #[must_use]
    pub fn with_max_step(mut self, max_step: Duration) -> Self {
        self.max_step = max_step;
        self
    }

    /// Advances to `now` and returns the clamped step in seconds.
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        self.step = now.saturating_duration_since(self.last_tick).min(self.max_step);
        self.last_tick = now;
        self.frames += 1;
        self.step.as_secs_f32()
    }

    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// Unclamped wall time since the clock started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.last_tick.saturating_duration_since(self.started)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stall_is_clamped() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);

        let dt = clock.tick_at(start + Duration::from_millis(16));
        assert!((dt - 0.016).abs() < 1e-6);

        let dt = clock.tick_at(start + Duration::from_secs(5));
        assert!((dt - 0.1).abs() < 1e-6);
        assert_eq!(clock.elapsed(), Duration::from_secs(5));
        assert_eq!(clock.frames, 2);
    }
}
