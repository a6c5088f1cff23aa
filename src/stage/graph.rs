//! Static stage graph.
//!
//! Everything the scene needs before any asset arrives: root transform, both cameras, the
//! directional light with its shadow generator, the shadow-only ground and the post-processing
//! record. [`SceneHandles`] keeps direct references to the nodes the controllers touch.

use glam::Vec3;

use crate::assets::ModelInstance;
use crate::config::SceneConfiguration;
use crate::resources::{GpuResourceKind, GpuResourceTracker};
use crate::scene::{
    Camera, CameraKind, DirectionalLight, LightKey, Material, Mesh, Node, NodeHandle, NodeRole,
    NodeTag, RenderPipeline, Scene, ShadowGenerator, Transform,
};
use crate::stage::orbit::OrbitControls;
use crate::stage::surface::{BackgroundStyle, RenderSurface};

const CAMERA_FOV_DEGREES: f32 = 45.0;
const GROUND_EXTENT: f32 = 100.0;
const GROUND_ALPHA: f32 = 0.4;
// 2x2 grid, 32-byte vertices
const GROUND_BYTES: u64 = 4 * 32;

/// Direct references into the stage graph.
#[derive(Debug)]
pub struct SceneHandles {
    pub root: NodeHandle,
    pub ground: NodeHandle,
    pub orbit_camera: NodeHandle,
    pub scripted_camera: NodeHandle,
    pub light: LightKey,
    /// Present while shadows are enabled.
    pub shadow_generator: Option<ShadowGenerator>,
    /// Present once the model has been wired.
    pub model: Option<ModelInstance>,
    /// Stable identity of the model root, for lookups when the cached handle is stale.
    pub model_tag: Option<NodeTag>,
}

/// The assembled scene graph together with the surface it renders into.
pub struct Stage {
    pub scene: Scene,
    pub handles: SceneHandles,
    pub(crate) orbit: OrbitControls,
    surface: RenderSurface,
    /// What the surface showed before assembly; put back on dispose.
    previous_background: Option<BackgroundStyle>,
    config: SceneConfiguration,
    tracker: GpuResourceTracker,
    disposed: bool,
}

impl Stage {
    /// Builds the static part of the scene from `config`.
    #[must_use]
    pub fn assemble(config: &SceneConfiguration, surface: &RenderSurface, tracker: &GpuResourceTracker) -> Self {
        let mut scene = Scene::new();
        scene.clear_color = config.color.clear_color;
        scene.ambient_color = config.color.ambient_color;
        scene.auto_clear = config.performance.auto_clear;
        scene.auto_clear_depth_and_stencil = config.performance.auto_clear_depth_and_stencil;

        let previous_background = surface.apply_background(&config.background);

        // ---- root ----
        let mut root = Node::new("root").with_role(NodeRole::Root);
        root.transform = Transform::from_euler(config.root.position, config.root.rotation, config.root.scale);
        let root = scene.add_node(root);

        // ---- cameras ----
        let (width, height) = surface.size();

        let scripted = &config.scripted_camera;
        let mut camera = Camera::new_perspective(CameraKind::Scripted, CAMERA_FOV_DEGREES, scripted.near, scripted.far);
        camera.speed = scripted.speed;
        camera.set_aspect(width, height);
        let mut transform = Transform::new();
        transform.position = scripted.position;
        let scripted_camera = scene.add_camera_to_parent(camera, transform, root);

        let orbit_settings = &config.orbit_camera;
        let orbit = OrbitControls::from_settings(orbit_settings);
        let mut camera = Camera::new_perspective(CameraKind::Orbit, CAMERA_FOV_DEGREES, orbit_settings.near, orbit_settings.far);
        camera.speed = orbit_settings.speed;
        camera.set_aspect(width, height);
        let mut transform = Transform::new();
        orbit.apply(&mut transform);
        let orbit_camera = scene.add_camera_to_parent(camera, transform, root);

        scene.active_camera = Some(orbit_camera);

        // ---- light & shadows ----
        let light = scene.add_light(DirectionalLight::from_settings("DirectionalLight", &config.directional_light));

        let settings = &config.shadow_generator;
        let mut generator = ShadowGenerator::new(light, settings.size, settings.quality, tracker);
        generator.transparency_shadow = settings.transparency_shadow;
        generator.use_percentage_closer_filtering = settings.use_percentage_closer_filtering;
        generator.force_back_faces_only = settings.force_back_faces_only;
        generator.frustum_edge_falloff = settings.frustum_edge_falloff;

        // ---- ground ----
        let mut ground = Mesh::new("ground", Material::shadow_only(GROUND_ALPHA))
            .with_allocation(tracker.allocate(GpuResourceKind::GroundPlane, "ground", GROUND_BYTES));
        ground.receive_shadows = true;
        let ground = scene.add_mesh_to_parent(ground, root, NodeRole::Ground);
        if let Some(node) = scene.get_node_mut(ground) {
            node.transform.scale = Vec3::new(GROUND_EXTENT, 1.0, GROUND_EXTENT);
            node.pickable = false;
        }

        scene.pipeline = Some(RenderPipeline::from_settings(
            "defaultPipeline",
            &config.pipeline,
            vec![scripted_camera, orbit_camera],
        ));

        log::info!(
            "Assembled stage on surface '{}' ({}x{}, {}px shadow map)",
            surface.label(),
            width,
            height,
            settings.size
        );

        Self {
            scene,
            handles: SceneHandles {
                root,
                ground,
                orbit_camera,
                scripted_camera,
                light,
                shadow_generator: Some(generator),
                model: None,
                model_tag: None,
            },
            orbit,
            surface: surface.clone(),
            previous_background: Some(previous_background),
            config: config.clone(),
            tracker: tracker.clone(),
            disposed: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn surface(&self) -> &RenderSurface {
        &self.surface
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &SceneConfiguration {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn tracker(&self) -> &GpuResourceTracker {
        &self.tracker
    }

    #[must_use]
    pub fn light(&self) -> Option<&DirectionalLight> {
        self.scene.lights.get(self.handles.light)
    }

    pub fn light_mut(&mut self) -> Option<&mut DirectionalLight> {
        self.scene.lights.get_mut(self.handles.light)
    }

    #[inline]
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Releases the shadow map, the model and every scene component, and restores the
    /// surface background. Idempotent.
    pub fn dispose(&mut self) {
        if let Some(generator) = self.handles.shadow_generator.take() {
            generator.dispose();
        }
        self.handles.model = None;
        self.handles.model_tag = None;
        if self.scene.node_count() > 0 {
            log::debug!("Clearing stage graph ({} nodes)", self.scene.node_count());
            self.scene.clear();
        }
        if let Some(background) = self.previous_background.take() {
            self.surface.set_background(background);
        }
        self.surface.hide_loading_ui();
        self.disposed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assembles_rig_under_root() {
        let tracker = GpuResourceTracker::new();
        let surface = RenderSurface::new("test", 1280, 720);
        let stage = Stage::assemble(&SceneConfiguration::default(), &surface, &tracker);
        let h = &stage.handles;

        for node in [h.ground, h.orbit_camera, h.scripted_camera] {
            assert_eq!(stage.scene.get_node(node).and_then(Node::parent), Some(h.root));
        }
        assert_eq!(stage.scene.active_camera, Some(h.orbit_camera));
        assert!(stage.scene.get_mesh(h.ground).is_some_and(|m| m.receive_shadows));
        assert_eq!(tracker.live_of(GpuResourceKind::ShadowMap), 1);
        assert_eq!(tracker.live_of(GpuResourceKind::GroundPlane), 1);
        assert_eq!(
            surface.background().image.as_deref(),
            Some("/assets/bg/bg.jpg")
        );
    }

    #[test]
    fn dispose_twice() {
        let tracker = GpuResourceTracker::new();
        let surface = RenderSurface::new("test", 640, 480);
        let mut stage = Stage::assemble(&SceneConfiguration::default(), &surface, &tracker);
        stage.dispose();
        assert_eq!(tracker.live_count(), 0);
        stage.dispose();
        assert_eq!(tracker.live_count(), 0);
        assert_eq!(stage.scene.node_count(), 0);
        assert!(stage.is_disposed());
    }

    #[test]
    fn dispose_restores_surface_background() {
        let tracker = GpuResourceTracker::new();
        let surface = RenderSurface::new("test", 640, 480);
        surface.set_background_image("/assets/bg/page.jpg");
        let before = surface.background();

        let mut stage = Stage::assemble(&SceneConfiguration::default(), &surface, &tracker);
        assert_eq!(surface.background().image.as_deref(), Some("/assets/bg/bg.jpg"));

        stage.dispose();
        assert_eq!(surface.background(), before);
        stage.update_background(&crate::stage::BackgroundState {
            image: Some("/assets/bg/night.jpg".to_string()),
        });
        assert_eq!(surface.background(), before);
    }
}
