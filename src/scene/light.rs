use glam::Vec3;
use uuid::Uuid;

use crate::config::{DirectionalLightSettings, ShadowFrustumSettings};

/// The stage's single directional light.
///
/// The light is not part of the node hierarchy: its `position` only places the shadow
/// frustum, and is rewritten every frame by the light-follow hook.
#[derive(Debug, Clone)]
pub struct DirectionalLight {
    pub uuid: Uuid,
    pub name: String,
    pub intensity: f32,
    /// Always normalised.
    direction: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub position: Vec3,
    pub enabled: bool,
    pub frustum: ShadowFrustumSettings,
}

impl DirectionalLight {
    #[must_use]
    pub fn new(name: &str, direction: Vec3) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.to_string(),
            intensity: 1.0,
            direction: normalize_direction(direction),
            diffuse: Vec3::ONE,
            specular: Vec3::ONE,
            position: Vec3::ZERO,
            enabled: true,
            frustum: ShadowFrustumSettings::default(),
        }
    }

    #[must_use]
    pub fn from_settings(name: &str, settings: &DirectionalLightSettings) -> Self {
        let mut light = Self::new(name, settings.direction);
        light.intensity = settings.intensity;
        light.diffuse = settings.color;
        light.specular = settings.color;
        light.enabled = settings.enabled;
        light.frustum = settings.frustum;
        light
    }

    #[inline]
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Vec3) {
        self.direction = normalize_direction(direction);
    }

    /// Sets diffuse and specular together.
    pub fn set_color(&mut self, color: Vec3) {
        self.diffuse = color;
        self.specular = color;
    }
}

// a zero vector keeps the light pointing straight down
fn normalize_direction(direction: Vec3) -> Vec3 {
    let n = direction.normalize_or_zero();
    if n == Vec3::ZERO { Vec3::NEG_Y } else { n }
}
