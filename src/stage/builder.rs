//! Scene Assembler
//!
//! [`SceneBuilder::build`] assembles the static stage, awaits the concurrent resource load and
//! wires the results into the graph. Wiring happens strictly after the join; a failed or
//! cancelled build disposes everything it allocated before returning.

use crate::animation::{AnimationRegistry, KinematicPhysics, PhysicsBackend};
use crate::assets::{AssetReaderVariant, LoadStatusBoard, LoadedResources, ResourceLoader};
use crate::config::SceneConfiguration;
use crate::errors::{ConstructionError, Result};
use crate::resources::GpuResourceTracker;
use crate::stage::avatar::{AvatarScene, LightFollow};
use crate::stage::graph::Stage;
use crate::stage::surface::RenderSurface;

pub struct SceneBuilder {
    config: SceneConfiguration,
    reader: AssetReaderVariant,
    physics: Box<dyn PhysicsBackend>,
    tracker: GpuResourceTracker,
    board: LoadStatusBoard,
}

impl SceneBuilder {
    #[must_use]
    pub fn new(config: SceneConfiguration, reader: impl Into<AssetReaderVariant>) -> Self {
        Self {
            config,
            reader: reader.into(),
            physics: Box::new(KinematicPhysics::new()),
            tracker: GpuResourceTracker::new(),
            board: LoadStatusBoard::new(),
        }
    }

    #[must_use]
    pub fn with_physics(mut self, physics: impl PhysicsBackend + 'static) -> Self {
        self.physics = Box::new(physics);
        self
    }

    /// Shares an existing tracker, e.g. one tracker per device across several scenes.
    #[must_use]
    pub fn with_tracker(mut self, tracker: GpuResourceTracker) -> Self {
        self.tracker = tracker;
        self
    }

    #[must_use]
    pub fn tracker(&self) -> &GpuResourceTracker {
        &self.tracker
    }

    #[must_use]
    pub fn board(&self) -> &LoadStatusBoard {
        &self.board
    }

    /// Receives the aggregated loading status text after every progress change.
    #[must_use]
    pub fn status(&self) -> flume::Receiver<String> {
        self.board.subscribe()
    }

    /// Builds the scene into `surface`.
    ///
    /// Fails with [`ConstructionError::Cancelled`] if the surface is torn down before wiring.
    pub async fn build(self, surface: &RenderSurface) -> Result<AvatarScene> {
        self.config.validate()?;
        if surface.is_torn_down() {
            return Err(ConstructionError::Cancelled);
        }

        let Self {
            config,
            reader,
            physics,
            tracker,
            board,
        } = self;

        surface.show_loading_ui();
        let overlay = surface.clone();
        board.set_listener(move |text| overlay.set_loading_text(text));

        let mut stage = Stage::assemble(&config, surface, &tracker);

        let loader = ResourceLoader::new(reader, tracker.clone(), board.clone());
        let loaded = loader.load(&config, physics, surface.id()).await;
        board.clear_listener();

        let resources = match loaded {
            Ok(resources) => resources,
            Err(e) => {
                log::error!("Scene build failed: {e}");
                stage.dispose();
                return Err(e);
            }
        };

        if surface.is_torn_down() {
            log::warn!("Surface '{}' torn down during load, discarding results", surface.label());
            drop(resources);
            stage.dispose();
            return Err(ConstructionError::Cancelled);
        }

        let scene = wire(stage, resources, &config);
        log::info!(
            "Scene built: {} animation(s), {} live allocations",
            scene.available_animations().len(),
            tracker.live_count()
        );
        Ok(scene)
    }
}

/// Parents the model under the root and hooks it into shadows, animation and light follow.
fn wire(mut stage: Stage, resources: LoadedResources, config: &SceneConfiguration) -> AvatarScene {
    let LoadedResources { runtime, clips, model } = resources;
    let model = model.instantiate(&mut stage.scene, stage.handles.root);

    for &mesh in &model.meshes {
        if let Some(mesh) = stage.scene.get_mesh_mut(mesh) {
            mesh.receive_shadows = true;
        }
    }
    if let Some(generator) = stage.handles.shadow_generator.as_mut() {
        generator.add_shadow_caster(&stage.scene, model.root, true);
    }

    let settings = &config.model;
    if let Some(root) = stage.scene.get_node_mut(model.root) {
        root.transform.position = settings.position;
        root.transform.scale = settings.scale;
        root.transform
            .set_rotation_euler(settings.rotation.x, settings.rotation.y, settings.rotation.z);
        root.visible = settings.visible;
        root.enabled = settings.enabled;
        root.pickable = settings.pickable;
    }
    for &mesh in &model.meshes {
        if let Some(node) = stage.scene.get_node_mut(mesh) {
            node.pickable = settings.pickable;
        }
    }

    let mut registry = AnimationRegistry::new(runtime, clips, &stage.scene, model.skeleton, model.root);
    match registry.select_default() {
        Some(name) => log::info!("Default animation '{name}'"),
        None => log::warn!("No animation loaded, model stays in rest pose"),
    }

    let follow = &config.light_follow;
    let light_follow = stage
        .scene
        .skins
        .get(model.skeleton)
        .and_then(|skeleton| skeleton.bone_node(&follow.bone))
        .map(|bone| LightFollow {
            bone,
            vertical_offset: follow.vertical_offset,
        });
    if light_follow.is_none() {
        log::warn!("Light follow bone '{}' not found, light stays fixed", follow.bone);
    }

    stage.handles.model_tag = Some(model.tag);
    stage.handles.model = Some(model);

    AvatarScene::new(stage, registry, light_follow)
}
