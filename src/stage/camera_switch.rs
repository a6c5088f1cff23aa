//! Camera Switch State Machine
//!
//! Toggles between the orbit and the scripted camera on a double activation of the surface.
//!
//! The comparison is deliberately kept as the product shipped it: an interval *longer* than the
//! threshold records the activation and waits; an interval within the threshold clears the
//! record and toggles. The very first activation therefore only arms the gesture.

use crate::utils::time::{Duration, Instant};

/// Maximum gap between the two activations of a double activation.
pub const DOUBLE_ACTIVATION_THRESHOLD: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CameraState {
    #[default]
    OrbitActive,
    ScriptedActive,
}

impl CameraState {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            CameraState::OrbitActive => CameraState::ScriptedActive,
            CameraState::ScriptedActive => CameraState::OrbitActive,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CameraSwitch {
    state: CameraState,
    /// `None` stands for "never", i.e. an infinitely old activation.
    last_activation: Option<Instant>,
    threshold: Duration,
}

impl Default for CameraSwitch {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraSwitch {
    #[must_use]
    pub fn new() -> Self {
        Self::with_threshold(DOUBLE_ACTIVATION_THRESHOLD)
    }

    #[must_use]
    pub fn with_threshold(threshold: Duration) -> Self {
        Self {
            state: CameraState::OrbitActive,
            last_activation: None,
            threshold,
        }
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> CameraState {
        self.state
    }

    /// Feeds one pointer activation. Returns the new state when it toggled.
    pub fn on_activation(&mut self, now: Instant) -> Option<CameraState> {
        let within_threshold = self
            .last_activation
            .is_some_and(|last| now.saturating_duration_since(last) <= self.threshold);

        if !within_threshold {
            self.last_activation = Some(now);
            return None;
        }

        self.last_activation = None;
        self.state = self.state.toggled();
        log::debug!("Camera switched to {:?}", self.state);
        Some(self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn third_activation_only_arms_again() {
        let t0 = Instant::now();
        let mut switch = CameraSwitch::new();
        assert_eq!(switch.on_activation(t0), None);
        assert_eq!(
            switch.on_activation(t0 + Duration::from_millis(100)),
            Some(CameraState::ScriptedActive)
        );
        // record was cleared by the toggle
        assert_eq!(switch.on_activation(t0 + Duration::from_millis(200)), None);
        assert_eq!(
            switch.on_activation(t0 + Duration::from_millis(700)),
            Some(CameraState::OrbitActive)
        );
    }

    #[test]
    fn exactly_at_threshold_toggles() {
        let t0 = Instant::now();
        let mut switch = CameraSwitch::new();
        switch.on_activation(t0);
        assert!(switch.on_activation(t0 + DOUBLE_ACTIVATION_THRESHOLD).is_some());
    }
}
