use std::f32::consts::PI;

use glam::{Vec2, Vec3};

use crate::config::OrbitCameraSettings;
use crate::scene::Transform;

const EPS: f32 = 0.0001;

/// Pointer input gathered since the last frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrbitInput {
    /// Rotate drag, in pixels.
    pub drag: Vec2,
    /// Pan drag, in pixels.
    pub pan: Vec2,
    /// Wheel delta; positive zooms in.
    pub wheel: f32,
}

impl OrbitInput {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.drag == Vec2::ZERO && self.pan == Vec2::ZERO && self.wheel == 0.0
    }
}

/// Arc-rotate rig around a target.
///
/// `alpha` is the longitudinal angle around +Y, `beta` the latitudinal angle from +Y.
/// Input accumulates into inertial offsets that decay by `inertia` per 60 Hz frame.
pub struct OrbitControls {
    pub target: Vec3,
    pub alpha: f32,
    pub beta: f32,
    pub radius: f32,

    pub inertia: f32,
    pub panning_inertia: f32,
    pub angular_sensibility: Vec2,
    pub panning_sensibility: f32,
    pub panning_axis: Vec3,
    pub wheel_precision: f32,

    pub lower_radius_limit: f32,
    pub upper_radius_limit: f32,
    pub lower_alpha_limit: f32,
    pub upper_alpha_limit: f32,
    pub lower_beta_limit: f32,
    pub upper_beta_limit: f32,

    inertial_alpha: f32,
    inertial_beta: f32,
    inertial_radius: f32,
    inertial_panning: Vec2,
}

impl OrbitControls {
    /// Places the rig so the camera sits at `settings.position` looking at `settings.target`.
    #[must_use]
    pub fn from_settings(settings: &OrbitCameraSettings) -> Self {
        let offset = settings.position - settings.target;
        let radius = offset.length().max(EPS);
        let beta = (offset.y / radius).clamp(-1.0, 1.0).acos();
        let alpha = offset.z.atan2(offset.x);

        let mut controls = Self {
            target: settings.target,
            alpha,
            beta,
            radius,

            inertia: settings.inertia.clamp(0.0, 1.0),
            panning_inertia: settings.panning_inertia.clamp(0.0, 1.0),
            angular_sensibility: Vec2::new(
                settings.angular_sensibility_x.max(EPS),
                settings.angular_sensibility_y.max(EPS),
            ),
            panning_sensibility: settings.panning_sensibility.max(EPS),
            panning_axis: settings.panning_axis,
            wheel_precision: settings.wheel_precision.max(EPS),

            lower_radius_limit: settings.lower_radius_limit,
            upper_radius_limit: settings.upper_radius_limit.max(settings.lower_radius_limit),
            lower_alpha_limit: settings.lower_alpha_limit,
            upper_alpha_limit: settings.upper_alpha_limit.max(settings.lower_alpha_limit),
            lower_beta_limit: settings.lower_beta_limit,
            upper_beta_limit: settings.upper_beta_limit.max(settings.lower_beta_limit),

            inertial_alpha: 0.0,
            inertial_beta: 0.0,
            inertial_radius: 0.0,
            inertial_panning: Vec2::ZERO,
        };
        controls.clamp_limits();
        controls
    }

    /// Accumulates one frame of pointer input.
    pub fn feed(&mut self, input: &OrbitInput) {
        self.inertial_alpha -= input.drag.x / self.angular_sensibility.x;
        self.inertial_beta -= input.drag.y / self.angular_sensibility.y;
        self.inertial_radius += input.wheel / self.wheel_precision;
        self.inertial_panning += Vec2::new(-input.pan.x, input.pan.y) / self.panning_sensibility;
    }

    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.inertial_alpha != 0.0
            || self.inertial_beta != 0.0
            || self.inertial_radius != 0.0
            || self.inertial_panning != Vec2::ZERO
    }

    /// Applies inertial offsets and writes the camera transform.
    pub fn update(&mut self, transform: &mut Transform, dt: f32) {
        let frames = dt * 60.0;
        let retention = self.inertia.powf(frames);
        let pan_retention = self.panning_inertia.powf(frames);

        self.alpha += self.inertial_alpha;
        self.beta += self.inertial_beta;
        self.radius -= self.inertial_radius;

        if self.inertial_panning != Vec2::ZERO {
            let (right, up) = self.view_axes();
            let delta = right * self.inertial_panning.x * self.panning_axis.x
                + up * self.inertial_panning.y * self.panning_axis.y;
            self.target += delta * self.radius;
        }

        self.inertial_alpha = decay(self.inertial_alpha, retention);
        self.inertial_beta = decay(self.inertial_beta, retention);
        self.inertial_radius = decay(self.inertial_radius, retention);
        self.inertial_panning = Vec2::new(
            decay(self.inertial_panning.x, pan_retention),
            decay(self.inertial_panning.y, pan_retention),
        );

        self.clamp_limits();
        self.apply(transform);
    }

    /// Writes the current rig pose without consuming input.
    pub fn apply(&self, transform: &mut Transform) {
        transform.position = self.position();
        transform.look_at(self.target, Vec3::Y);
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        let (sin_beta, cos_beta) = self.beta.sin_cos();
        let (sin_alpha, cos_alpha) = self.alpha.sin_cos();
        self.target
            + Vec3::new(
                self.radius * cos_alpha * sin_beta,
                self.radius * cos_beta,
                self.radius * sin_alpha * sin_beta,
            )
    }

    fn view_axes(&self) -> (Vec3, Vec3) {
        let forward = (self.target - self.position()).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward).normalize_or_zero();
        (right, up)
    }

    fn clamp_limits(&mut self) {
        self.alpha = self.alpha.clamp(self.lower_alpha_limit, self.upper_alpha_limit);
        self.beta = self
            .beta
            .clamp(self.lower_beta_limit, self.upper_beta_limit)
            .clamp(EPS, PI - EPS);
        self.radius = self.radius.clamp(self.lower_radius_limit, self.upper_radius_limit);
    }
}

fn decay(value: f32, retention: f32) -> f32 {
    let next = value * retention;
    if next.abs() < EPS { 0.0 } else { next }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_configured_position() {
        let settings = OrbitCameraSettings::default();
        let controls = OrbitControls::from_settings(&settings);
        assert!((controls.position() - settings.position).length() < 1e-3);
    }

    #[test]
    fn radius_respects_limits() {
        let settings = OrbitCameraSettings::default();
        let mut controls = OrbitControls::from_settings(&settings);
        let mut transform = Transform::new();
        controls.feed(&OrbitInput { wheel: 1.0e6, ..OrbitInput::default() });
        controls.update(&mut transform, 1.0 / 60.0);
        assert_eq!(controls.radius, settings.lower_radius_limit);
    }

    #[test]
    fn inertia_decays_to_rest() {
        let mut controls = OrbitControls::from_settings(&OrbitCameraSettings::default());
        let mut transform = Transform::new();
        controls.feed(&OrbitInput { drag: Vec2::new(200.0, 0.0), ..OrbitInput::default() });
        let start = controls.alpha;
        for _ in 0..200 {
            controls.update(&mut transform, 1.0 / 60.0);
        }
        assert!(!controls.is_moving());
        assert!(controls.alpha < start);
    }
}
