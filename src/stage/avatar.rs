//! The built avatar scene.
//!
//! [`AvatarScene`] owns the stage graph and the animation registry and is driven from a single
//! context: the host calls [`AvatarScene::render_frame`] once per frame and forwards pointer
//! and control-panel events.

use glam::Vec3;

use crate::animation::AnimationRegistry;
use crate::resources::GpuResourceTracker;
use crate::scene::{NodeHandle, Scene};
use crate::stage::camera_switch::{CameraState, CameraSwitch};
use crate::stage::controller::{BackgroundState, LightingState, ModelTransformState, SceneUpdate};
use crate::stage::graph::{SceneHandles, Stage};
use crate::stage::orbit::OrbitInput;
use crate::stage::reply::AnimationPlayer;
use crate::stage::surface::RenderSurface;
use crate::utils::time::Instant;

/// Bone the directional light tracks, and how far below it the light sits.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LightFollow {
    pub bone: NodeHandle,
    pub vertical_offset: f32,
}

pub struct AvatarScene {
    stage: Stage,
    registry: AnimationRegistry,
    camera_switch: CameraSwitch,
    pending_input: OrbitInput,
    light_follow: Option<LightFollow>,
    frozen: bool,
    frames: u64,
    disposed: bool,
}

impl AvatarScene {
    pub(crate) fn new(stage: Stage, registry: AnimationRegistry, light_follow: Option<LightFollow>) -> Self {
        Self {
            stage,
            registry,
            camera_switch: CameraSwitch::new(),
            pending_input: OrbitInput::default(),
            light_follow,
            frozen: false,
            frames: 0,
            disposed: false,
        }
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Plays `name` from the start. Returns `false` (and changes nothing) when it cannot.
    pub fn play_animation(&mut self, name: &str) -> bool {
        match self.registry.play(name) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("{e}");
                false
            }
        }
    }

    #[must_use]
    pub fn has_animation(&self, name: &str) -> bool {
        self.registry.has(name)
    }

    /// Loaded animation names in configuration order.
    #[must_use]
    pub fn available_animations(&self) -> Vec<String> {
        self.registry.list_available()
    }

    #[must_use]
    pub fn active_animation(&self) -> Option<&str> {
        self.registry.active_name()
    }

    // ========================================================================
    // Live parameters
    // ========================================================================

    /// Live updates are ignored once the scene is disposed.
    pub fn update_scene(&mut self, update: &SceneUpdate) {
        if !self.disposed {
            self.stage.update_scene(update);
        }
    }

    pub fn update_lighting(&mut self, state: &LightingState) {
        if !self.disposed {
            self.stage.update_lighting(state);
        }
    }

    pub fn update_model_transform(&mut self, state: &ModelTransformState) {
        if !self.disposed {
            self.stage.update_model_transform(state);
        }
    }

    pub fn update_background(&mut self, state: &BackgroundState) {
        if !self.disposed {
            self.stage.update_background(state);
        }
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Feeds a pointer activation on the surface at the current time.
    pub fn on_pointer_activation(&mut self) -> Option<CameraState> {
        self.on_pointer_activation_at(Instant::now())
    }

    /// Feeds a pointer activation at `now`. A double activation swaps the active camera.
    pub fn on_pointer_activation_at(&mut self, now: Instant) -> Option<CameraState> {
        let state = self.camera_switch.on_activation(now)?;
        let handles = &self.stage.handles;
        self.stage.scene.active_camera = Some(match state {
            CameraState::OrbitActive => handles.orbit_camera,
            CameraState::ScriptedActive => handles.scripted_camera,
        });
        Some(state)
    }

    /// Queues drag, pan and wheel input for the orbit camera.
    pub fn orbit_input(&mut self, input: OrbitInput) {
        self.pending_input.drag += input.drag;
        self.pending_input.pan += input.pan;
        self.pending_input.wheel += input.wheel;
    }

    #[must_use]
    pub fn camera_state(&self) -> CameraState {
        self.camera_switch.state()
    }

    #[must_use]
    pub fn active_camera(&self) -> Option<NodeHandle> {
        self.stage.scene.active_camera
    }

    // ========================================================================
    // Frame loop
    // ========================================================================

    /// Advances animation, camera and light by `dt` seconds and updates world matrices.
    ///
    /// The first frame also runs the one-shot freeze pass and hides the loading overlay.
    pub fn render_frame(&mut self, dt: f32) {
        if self.disposed {
            return;
        }

        self.registry.update(dt, &mut self.stage.scene);

        let input = std::mem::take(&mut self.pending_input);
        if self.camera_switch.state() == CameraState::OrbitActive {
            let stage = &mut self.stage;
            if !input.is_empty() {
                stage.orbit.feed(&input);
            }
            if let Some(node) = stage.scene.get_node_mut(stage.handles.orbit_camera) {
                stage.orbit.update(&mut node.transform, dt);
            }
        }

        self.stage.scene.update_matrix_world();
        self.follow_light();

        self.frames += 1;
        if !self.frozen {
            self.stage.scene.freeze_active_meshes();
            self.stage.surface().hide_loading_ui();
            self.frozen = true;
            log::info!("Scene frozen after first frame");
        }
    }

    fn follow_light(&mut self) {
        let Some(follow) = self.light_follow else {
            return;
        };
        let Some(bone) = self.stage.scene.get_node(follow.bone) else {
            return;
        };
        let position = bone.transform.world_position() - Vec3::new(0.0, follow.vertical_offset, 0.0);
        if let Some(light) = self.stage.light_mut() {
            light.position = position;
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.stage.scene
    }

    #[inline]
    #[must_use]
    pub fn handles(&self) -> &SceneHandles {
        &self.stage.handles
    }

    #[inline]
    #[must_use]
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    #[inline]
    #[must_use]
    pub fn surface(&self) -> &RenderSurface {
        self.stage.surface()
    }

    #[inline]
    #[must_use]
    pub fn registry(&self) -> &AnimationRegistry {
        &self.registry
    }

    #[inline]
    #[must_use]
    pub fn tracker(&self) -> &GpuResourceTracker {
        self.stage.tracker()
    }

    #[inline]
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    #[inline]
    #[must_use]
    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    /// Releases every allocation the scene holds. Calling it again does nothing.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.registry.dispose();
        self.stage.dispose();
        self.light_follow = None;
        self.disposed = true;
        log::info!(
            "Disposed scene on surface '{}' ({} live allocations)",
            self.stage.surface().label(),
            self.stage.tracker().live_count()
        );
    }

    #[inline]
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl AnimationPlayer for AvatarScene {
    fn play_animation(&mut self, name: &str) -> bool {
        AvatarScene::play_animation(self, name)
    }

    fn has_animation(&self, name: &str) -> bool {
        AvatarScene::has_animation(self, name)
    }

    fn available_animations(&self) -> Vec<String> {
        AvatarScene::available_animations(self)
    }
}
