//! Scene settings record.
//!
//! Every section carries `#[serde(default)]`, so a document only needs the fields it
//! overrides. Defaults reproduce the stock avatar scene.

use std::f32::consts::PI;

use glam::{Vec3, Vec4};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::ConstructionError;

/// Animation name → ordered clip-file references composing that animation.
///
/// Iteration follows document order; re-inserting a name keeps its slot.
pub type MotionTable = IndexMap<String, Vec<String>>;

/// Shadow quality tier. Each tier maps to a shadow-map resolution and a filtering quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadowQuality {
    Low,
    #[default]
    Medium,
    High,
}

impl ShadowQuality {
    /// Shadow map edge length in texels.
    #[must_use]
    pub fn map_size(self) -> u32 {
        match self {
            ShadowQuality::Low => 512,
            ShadowQuality::Medium => 1024,
            ShadowQuality::High => 2048,
        }
    }

    /// Parses a UI string; anything unrecognised is treated as medium.
    #[must_use]
    pub fn parse_lenient(s: &str) -> Self {
        match s {
            "low" => ShadowQuality::Low,
            "high" => ShadowQuality::High,
            _ => ShadowQuality::Medium,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub name: String,
    pub bio: String,
    pub avatar: String,
    /// Skinned model document reference.
    pub path: String,
    pub scale: Vec3,
    pub position: Vec3,
    /// Euler angles in radians.
    pub rotation: Vec3,
    pub visible: bool,
    pub enabled: bool,
    pub pickable: bool,
    pub motion: MotionTable,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            name: "八重神子".to_string(),
            bio: "能够与你相识，是神子我的幸运".to_string(),
            avatar: "/assets/bachongshenzi/bcsz.jpg".to_string(),
            path: "/assets/bachongshenzi/model.json".to_string(),
            scale: Vec3::ONE,
            position: Vec3::ZERO,
            rotation: Vec3::new(0.0, -0.2, 0.0),
            visible: true,
            enabled: true,
            pickable: false,
            motion: [
                ("idle".to_string(), vec!["/assets/motions/idle_face.json".to_string(), "/assets/motions/idle_body.json".to_string()]),
                ("dance".to_string(), vec!["/assets/motions/idle_body.json".to_string()]),
                ("walk".to_string(), vec!["/assets/motions/walk.json".to_string()]),
            ]
            .into_iter()
            .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundSettings {
    /// Candidate background images; the first one is shown at build time.
    pub image: Vec<String>,
    pub size: String,
    pub position: String,
    pub repeat: String,
}

impl Default for BackgroundSettings {
    fn default() -> Self {
        Self {
            image: vec![
                "/assets/bg/bg.jpg".to_string(),
                "/assets/bg/genshin.jpg".to_string(),
                "/assets/bg/liyue.jpg".to_string(),
                "/assets/bg/night.jpg".to_string(),
            ],
            size: "cover".to_string(),
            position: "center".to_string(),
            repeat: "no-repeat".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorSettings {
    /// Transparent by default so the surface background shows through.
    pub clear_color: Vec4,
    pub ambient_color: Vec3,
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self {
            clear_color: Vec4::ZERO,
            ambient_color: Vec3::splat(0.5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceSettings {
    pub auto_clear: bool,
    pub auto_clear_depth_and_stencil: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootSettings {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for RootSettings {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 10.0),
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

/// The motion-driven camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptedCameraSettings {
    pub position: Vec3,
    pub near: f32,
    pub far: f32,
    pub speed: f32,
}

impl Default for ScriptedCameraSettings {
    fn default() -> Self {
        Self {
            position: Vec3::new(8.0, 15.0, 0.0),
            near: 1.0,
            far: 300.0,
            speed: 4.0,
        }
    }
}

/// The free arc-rotate camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitCameraSettings {
    pub position: Vec3,
    pub target: Vec3,
    pub near: f32,
    pub far: f32,
    pub speed: f32,
    pub inertia: f32,
    pub lower_radius_limit: f32,
    pub upper_radius_limit: f32,
    pub lower_alpha_limit: f32,
    pub upper_alpha_limit: f32,
    pub lower_beta_limit: f32,
    pub upper_beta_limit: f32,
    pub panning_sensibility: f32,
    pub panning_inertia: f32,
    pub panning_axis: Vec3,
    pub wheel_precision: f32,
    pub zoom_to_mouse_location: bool,
    pub angular_sensibility_x: f32,
    pub angular_sensibility_y: f32,
}

impl Default for OrbitCameraSettings {
    fn default() -> Self {
        Self {
            position: Vec3::new(8.0, 15.0, 0.0),
            target: Vec3::new(0.0, 10.0, 1.0),
            near: 0.1,
            far: 1000.0,
            speed: 4.0,
            inertia: 0.8,
            lower_radius_limit: 5.0,
            upper_radius_limit: 100.0,
            lower_alpha_limit: -PI,
            upper_alpha_limit: PI,
            lower_beta_limit: 0.1,
            upper_beta_limit: PI - 0.1,
            panning_sensibility: 2000.0,
            panning_inertia: 0.8,
            panning_axis: Vec3::new(1.0, 1.0, 0.0),
            wheel_precision: 100.0,
            zoom_to_mouse_location: true,
            angular_sensibility_x: 2000.0,
            angular_sensibility_y: 2000.0,
        }
    }
}

/// Orthographic shadow frustum of the directional light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowFrustumSettings {
    pub auto_calc_shadow_z_bounds: bool,
    pub auto_update_extends: bool,
    pub shadow_max_z: f32,
    pub shadow_min_z: f32,
    pub ortho_top: f32,
    pub ortho_bottom: f32,
    pub ortho_left: f32,
    pub ortho_right: f32,
    pub shadow_ortho_scale: f32,
}

impl Default for ShadowFrustumSettings {
    fn default() -> Self {
        Self {
            auto_calc_shadow_z_bounds: false,
            auto_update_extends: false,
            shadow_max_z: 20.0,
            shadow_min_z: -20.0,
            ortho_top: 18.0,
            ortho_bottom: -3.0,
            ortho_left: -10.0,
            ortho_right: 10.0,
            shadow_ortho_scale: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionalLightSettings {
    pub intensity: f32,
    pub direction: Vec3,
    pub color: Vec3,
    pub enabled: bool,
    #[serde(flatten)]
    pub frustum: ShadowFrustumSettings,
}

impl Default for DirectionalLightSettings {
    fn default() -> Self {
        Self {
            intensity: 2.1,
            direction: Vec3::new(0.5, -1.0, 1.0),
            color: Vec3::ONE,
            enabled: true,
            frustum: ShadowFrustumSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowGeneratorSettings {
    /// Map size used for the generator created at build time.
    pub size: u32,
    pub transparency_shadow: bool,
    pub use_percentage_closer_filtering: bool,
    pub quality: ShadowQuality,
    pub force_back_faces_only: bool,
    pub frustum_edge_falloff: f32,
}

impl Default for ShadowGeneratorSettings {
    fn default() -> Self {
        Self {
            size: 512,
            transparency_shadow: true,
            use_percentage_closer_filtering: true,
            quality: ShadowQuality::Medium,
            force_back_faces_only: false,
            frustum_edge_falloff: 0.1,
        }
    }
}

/// Post-processing pipeline attached to both cameras.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub samples: u32,
    pub bloom_enabled: bool,
    pub chromatic_aberration_enabled: bool,
    pub fxaa_enabled: bool,
    pub image_processing_enabled: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            samples: 2,
            bloom_enabled: true,
            chromatic_aberration_enabled: false,
            fxaa_enabled: true,
            image_processing_enabled: false,
        }
    }
}

/// Which skeletal reference point the directional light tracks every frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightFollowSettings {
    pub bone: String,
    /// Subtracted from the bone's world height.
    pub vertical_offset: f32,
}

impl Default for LightFollowSettings {
    fn default() -> Self {
        Self {
            bone: "センター".to_string(),
            vertical_offset: 10.0,
        }
    }
}

/// Immutable-at-load-time description of a scene.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfiguration {
    pub model: ModelSettings,
    pub background: BackgroundSettings,
    pub color: ColorSettings,
    pub performance: PerformanceSettings,
    pub root: RootSettings,
    pub scripted_camera: ScriptedCameraSettings,
    pub orbit_camera: OrbitCameraSettings,
    pub directional_light: DirectionalLightSettings,
    pub shadow_generator: ShadowGeneratorSettings,
    pub pipeline: PipelineSettings,
    pub light_follow: LightFollowSettings,
}

impl SceneConfiguration {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Animation names in configuration order.
    pub fn animation_names(&self) -> impl Iterator<Item = &str> {
        self.model.motion.keys().map(String::as_str)
    }

    /// Checks the invariants the loader relies on.
    pub fn validate(&self) -> Result<(), ConstructionError> {
        if self.model.path.trim().is_empty() {
            return Err(ConstructionError::InvalidConfiguration(
                "model path is empty".to_string(),
            ));
        }
        for (name, files) in &self.model.motion {
            if name.is_empty() {
                return Err(ConstructionError::InvalidConfiguration(
                    "animation name is empty".to_string(),
                ));
            }
            if files.is_empty() {
                return Err(ConstructionError::InvalidConfiguration(format!(
                    "animation \"{name}\" has no clip files"
                )));
            }
        }
        Ok(())
    }
}
