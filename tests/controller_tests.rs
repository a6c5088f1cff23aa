//! Live Parameter Controller Tests
//!
//! Tests for:
//! - Lighting updates and shadow generator lifecycle
//! - Model transform updates via cached handle and tag lookup
//! - Background updates
//! - Combined scene updates and reset defaults

mod common;

use glam::Vec3;

use avatar_stage::config::{SceneConfiguration, ShadowQuality};
use avatar_stage::resources::{GpuResourceKind, GpuResourceTracker};
use avatar_stage::scene::{Material, Mesh, NodeRole};
use avatar_stage::stage::{BackgroundState, LightingState, ModelTransformState, SceneUpdate, Stage};
use avatar_stage::{AvatarScene, RenderSurface, SceneBuilder};

use common::*;

fn lighting(shadow_enabled: bool, shadow_quality: ShadowQuality) -> LightingState {
    LightingState {
        intensity: 1.5,
        direction: Vec3::new(0.0, -2.0, 0.0),
        color: Vec3::new(1.0, 0.9, 0.8),
        ambient: 0.3,
        shadow_enabled,
        shadow_quality,
    }
}

async fn built() -> AvatarScene {
    init_logger();
    let surface = RenderSurface::new("controller", 1280, 720);
    SceneBuilder::new(idle_dance_config(), reader())
        .build(&surface)
        .await
        .unwrap()
}

fn bare_stage(tracker: &GpuResourceTracker) -> Stage {
    let surface = RenderSurface::new("bare", 640, 480);
    Stage::assemble(&SceneConfiguration::default(), &surface, tracker)
}

// ============================================================================
// Lighting
// ============================================================================

#[test]
fn lighting_sets_light_and_ambient() {
    let tracker = GpuResourceTracker::new();
    let mut stage = bare_stage(&tracker);
    stage.update_lighting(&lighting(true, ShadowQuality::Medium));

    let light = stage.light().unwrap();
    assert_eq!(light.intensity, 1.5);
    assert_eq!(light.direction(), Vec3::NEG_Y);
    assert_eq!(light.diffuse, Vec3::new(1.0, 0.9, 0.8));
    assert_eq!(light.specular, light.diffuse);
    assert_eq!(stage.scene.ambient_color, Vec3::splat(0.3));
}

#[tokio::test]
async fn lighting_update_is_idempotent() {
    let mut scene = built().await;
    let state = lighting(true, ShadowQuality::High);

    scene.update_lighting(&state);
    let generator = scene.handles().shadow_generator.as_ref().unwrap();
    let casters = generator.caster_count();
    let allocation = generator.allocation().id();
    assert_eq!(generator.map_size, 2048);
    assert!(generator.use_percentage_closer_filtering);
    assert!(generator.force_back_faces_only);
    assert_eq!(generator.frustum_edge_falloff, 0.1);

    scene.update_lighting(&state);
    let generator = scene.handles().shadow_generator.as_ref().unwrap();
    assert_eq!(generator.caster_count(), casters);
    assert_eq!(generator.allocation().id(), allocation);
    assert_eq!(scene.tracker().live_of(GpuResourceKind::ShadowMap), 1);
}

#[tokio::test]
async fn recreated_generator_registers_meshes_but_not_ground() {
    let mut scene = built().await;
    scene.update_lighting(&lighting(true, ShadowQuality::Low));

    let handles = scene.handles();
    let generator = handles.shadow_generator.as_ref().unwrap();
    assert_eq!(generator.quality, ShadowQuality::Low);
    assert_eq!(generator.map_size, 512);
    for &mesh in &handles.model.as_ref().unwrap().meshes {
        assert!(generator.is_caster(mesh));
    }
    assert!(!generator.is_caster(handles.ground));
    assert!(scene.scene().get_mesh(handles.ground).unwrap().receive_shadows);
}

#[test]
fn background_role_is_never_a_caster() {
    let tracker = GpuResourceTracker::new();
    let mut stage = bare_stage(&tracker);
    let root = stage.handles.root;
    let backdrop = stage
        .scene
        .add_mesh_to_parent(Mesh::new("backdrop", Material::standard()), root, NodeRole::Background);
    let prop = stage
        .scene
        .add_mesh_to_parent(Mesh::new("ground", Material::standard()), root, NodeRole::Generic);

    stage.update_lighting(&lighting(false, ShadowQuality::Medium));
    stage.update_lighting(&lighting(true, ShadowQuality::Medium));

    let generator = stage.handles.shadow_generator.as_ref().unwrap();
    assert!(!generator.is_caster(backdrop));
    // roles decide, not names
    assert!(generator.is_caster(prop));
}

#[tokio::test]
async fn shadow_toggle_leaves_nothing_allocated() {
    let mut scene = built().await;
    let ground = scene.handles().ground;

    scene.update_lighting(&lighting(false, ShadowQuality::Medium));
    scene.update_lighting(&lighting(true, ShadowQuality::Medium));
    assert!(scene.handles().shadow_generator.is_some());
    assert!(scene.scene().get_mesh(ground).unwrap().receive_shadows);

    scene.update_lighting(&lighting(false, ShadowQuality::Medium));
    assert!(scene.handles().shadow_generator.is_none());
    assert_eq!(scene.tracker().live_of(GpuResourceKind::ShadowMap), 0);
    assert!(!scene.scene().get_mesh(ground).unwrap().receive_shadows);
}

#[test]
fn quality_change_replaces_generator() {
    let tracker = GpuResourceTracker::new();
    let mut stage = bare_stage(&tracker);
    let initial = stage.handles.shadow_generator.as_ref().unwrap().allocation().id();

    stage.update_lighting(&lighting(true, ShadowQuality::High));
    let generator = stage.handles.shadow_generator.as_ref().unwrap();
    assert_ne!(generator.allocation().id(), initial);
    assert_eq!(tracker.live_of(GpuResourceKind::ShadowMap), 1);
    assert_eq!(tracker.live_bytes() - 4 * 32, 2048 * 2048 * 4);
}

// ============================================================================
// Model transform
// ============================================================================

#[tokio::test]
async fn model_transform_written_to_model_root() {
    let mut scene = built().await;
    scene.update_model_transform(&ModelTransformState {
        position: Vec3::new(1.0, 2.0, 3.0),
        rotation: Vec3::new(0.0, 0.5, 0.0),
    });

    let root = scene.handles().model.as_ref().unwrap().root;
    let transform = &scene.scene().get_node(root).unwrap().transform;
    assert_eq!(transform.position, Vec3::new(1.0, 2.0, 3.0));
    assert!((transform.rotation_euler().y - 0.5).abs() < 1e-5);
}

#[test]
fn model_transform_without_model_is_noop() {
    let tracker = GpuResourceTracker::new();
    let mut stage = bare_stage(&tracker);
    let before = stage.scene.node_count();
    stage.update_model_transform(&ModelTransformState {
        position: Vec3::ONE,
        rotation: Vec3::ZERO,
    });
    assert_eq!(stage.scene.node_count(), before);
}

// ============================================================================
// Background & combined updates
// ============================================================================

#[tokio::test]
async fn background_update_requires_image() {
    let mut scene = built().await;
    scene.update_background(&BackgroundState { image: None });
    assert_eq!(scene.surface().background().image.as_deref(), Some("/assets/bg/bg.jpg"));

    scene.update_background(&BackgroundState {
        image: Some("/assets/bg/night.jpg".to_string()),
    });
    assert_eq!(scene.surface().background().image.as_deref(), Some("/assets/bg/night.jpg"));
}

#[tokio::test]
async fn reset_defaults_round_trip() {
    let mut scene = built().await;
    scene.update_scene(&SceneUpdate {
        lighting: Some(lighting(true, ShadowQuality::High)),
        model: Some(ModelTransformState {
            position: Vec3::new(0.0, 5.0, 0.0),
            rotation: Vec3::ZERO,
        }),
        background: Some(BackgroundState {
            image: Some("/assets/bg/liyue.jpg".to_string()),
        }),
    });

    scene.update_scene(&SceneUpdate::reset_defaults());

    let light = scene.stage().light().unwrap();
    assert_eq!(light.intensity, 2.1);
    assert!(scene.handles().shadow_generator.is_none());
    assert_eq!(scene.scene().ambient_color, Vec3::splat(0.5));
    let root = scene.handles().model.as_ref().unwrap().root;
    assert_eq!(scene.scene().get_node(root).unwrap().transform.position, Vec3::ZERO);
    assert_eq!(scene.surface().background().image.as_deref(), Some("/assets/bg/bg.jpg"));
}

#[test]
fn partial_update_deserialises() {
    let update: SceneUpdate = serde_json::from_str(
        r#"{"lighting": {"intensity": 1.0, "direction": [0, -1, 0], "color": [1, 1, 1],
            "ambient": 0.2, "shadow_enabled": true, "shadow_quality": "low"}}"#,
    )
    .unwrap();
    assert!(update.model.is_none());
    assert!(update.background.is_none());
    assert_eq!(update.lighting.unwrap().shadow_quality, ShadowQuality::Low);
}
