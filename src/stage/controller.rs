//! Live Parameter Controller
//!
//! Applies caller-supplied lighting, model and background state to a built stage. Every field
//! group of a [`SceneUpdate`] is optional; a missing group, or a target that cannot be resolved,
//! is a silent no-op logged at `debug`.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::ShadowQuality;
use crate::scene::{NodeHandle, NodeRole, ShadowGenerator};
use crate::stage::graph::Stage;

const SHADOW_FRUSTUM_EDGE_FALLOFF: f32 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightingState {
    pub intensity: f32,
    pub direction: Vec3,
    pub color: Vec3,
    /// Grey level applied to all three ambient channels.
    pub ambient: f32,
    pub shadow_enabled: bool,
    pub shadow_quality: ShadowQuality,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelTransformState {
    pub position: Vec3,
    /// Euler angles in radians.
    pub rotation: Vec3,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BackgroundState {
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneUpdate {
    pub lighting: Option<LightingState>,
    pub model: Option<ModelTransformState>,
    pub background: Option<BackgroundState>,
}

impl SceneUpdate {
    /// The state the scene-control panel restores on "reset".
    #[must_use]
    pub fn reset_defaults() -> Self {
        Self {
            lighting: Some(LightingState {
                intensity: 2.1,
                direction: Vec3::new(0.5, -1.0, 1.0),
                color: Vec3::ONE,
                ambient: 0.5,
                shadow_enabled: false,
                shadow_quality: ShadowQuality::Medium,
            }),
            model: Some(ModelTransformState {
                position: Vec3::ZERO,
                rotation: Vec3::new(0.0, -0.2, 0.0),
            }),
            background: Some(BackgroundState {
                image: Some("/assets/bg/bg.jpg".to_string()),
            }),
        }
    }
}

impl Stage {
    /// Applies background, then lighting, then the model transform.
    pub fn update_scene(&mut self, update: &SceneUpdate) {
        if let Some(background) = &update.background {
            self.update_background(background);
        }
        if let Some(lighting) = &update.lighting {
            self.update_lighting(lighting);
        }
        if let Some(model) = &update.model {
            self.update_model_transform(model);
        }
    }

    pub fn update_lighting(&mut self, state: &LightingState) {
        let Some(light) = self.light_mut() else {
            log::debug!("No directional light, lighting update skipped");
            return;
        };
        light.intensity = state.intensity;
        light.set_direction(state.direction);
        light.set_color(state.color);
        self.scene.ambient_color = Vec3::splat(state.ambient);

        let current = self.handles.shadow_generator.take();
        self.handles.shadow_generator = match (state.shadow_enabled, current) {
            (true, None) => Some(self.create_shadow_generator(state.shadow_quality)),
            (true, Some(generator)) if generator.quality != state.shadow_quality => {
                log::debug!(
                    "Shadow quality {:?} -> {:?}, recreating generator",
                    generator.quality,
                    state.shadow_quality
                );
                generator.dispose();
                Some(self.create_shadow_generator(state.shadow_quality))
            }
            (true, Some(generator)) => Some(generator),
            (false, Some(generator)) => {
                generator.dispose();
                self.set_ground_receives_shadows(false);
                None
            }
            (false, None) => None,
        };
    }

    /// Creates a generator at the tier's map size, re-applies the configured light frustum,
    /// registers every non-ground mesh as a caster and the ground as receiver.
    fn create_shadow_generator(&mut self, quality: ShadowQuality) -> ShadowGenerator {
        let light_key = self.handles.light;
        let frustum = self.config().directional_light.frustum;
        let transparency = self.config().shadow_generator.transparency_shadow;

        let mut generator = ShadowGenerator::new(light_key, quality.map_size(), quality, self.tracker());
        generator.use_percentage_closer_filtering = true;
        generator.force_back_faces_only = true;
        generator.frustum_edge_falloff = SHADOW_FRUSTUM_EDGE_FALLOFF;
        generator.transparency_shadow = transparency;

        if let Some(light) = self.light_mut() {
            light.frustum = frustum;
        }

        let casters: Vec<NodeHandle> = self
            .scene
            .mesh_nodes()
            .filter(|(_, node)| !matches!(node.role, NodeRole::Ground | NodeRole::Background))
            .map(|(handle, _)| handle)
            .collect();
        for caster in casters {
            generator.add_shadow_caster(&self.scene, caster, false);
        }
        self.set_ground_receives_shadows(true);

        log::info!(
            "Shadow generator created ({:?}, {}px, {} casters)",
            quality,
            generator.map_size,
            generator.caster_count()
        );
        generator
    }

    fn set_ground_receives_shadows(&mut self, receive: bool) {
        if let Some(ground) = self.scene.get_mesh_mut(self.handles.ground) {
            ground.receive_shadows = receive;
        }
    }

    pub fn update_model_transform(&mut self, state: &ModelTransformState) {
        let Some(model) = self.resolve_model() else {
            log::debug!("No model in scene, transform update skipped");
            return;
        };
        if let Some(node) = self.scene.get_node_mut(model) {
            node.transform.position = state.position;
            node.transform
                .set_rotation_euler(state.rotation.x, state.rotation.y, state.rotation.z);
        }
    }

    /// Cached model handle, else the node carrying the model tag.
    fn resolve_model(&self) -> Option<NodeHandle> {
        self.handles
            .model
            .as_ref()
            .map(|m| m.root)
            .filter(|&root| self.scene.contains(root))
            .or_else(|| self.handles.model_tag.and_then(|tag| self.scene.find_by_tag(tag)))
    }

    pub fn update_background(&mut self, state: &BackgroundState) {
        if self.is_disposed() {
            log::debug!("Stage disposed, background update skipped");
            return;
        }
        match state.image.as_deref() {
            Some(image) if !image.is_empty() => self.surface().set_background_image(image),
            _ => log::debug!("No background image supplied, background update skipped"),
        }
    }
}
