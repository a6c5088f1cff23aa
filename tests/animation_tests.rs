//! Animation System Tests
//!
//! Tests for:
//! - KeyframeTrack sampling (linear, step, clamping)
//! - Binding clips to a model by bone and morph name
//! - AnimationRegistry: ordering, play errors, loop policies, dispose

use std::sync::Arc;

use glam::{Quat, Vec3};
use uuid::Uuid;

use avatar_stage::animation::{
    AnimationClip, AnimationRegistry, AnimationRuntime, Binder, InterpolationMode, KeyframeTrack,
    KinematicPhysics, LoadedClip, LoopPolicy, PhysicsStats, TargetPath,
};
use avatar_stage::assets::{LoadedModel, ModelInstance, MotionSource, SkinnedModel, compose_clip};
use avatar_stage::errors::PlaybackError;
use avatar_stage::resources::{GpuResourceKind, GpuResourceTracker};
use avatar_stage::scene::{Node, Scene};

const MODEL: &str = r#"{
    "name": "rig",
    "bones": [{"name": "hips", "position": [0, 1, 0]}, {"name": "spine", "parent": 0}],
    "meshes": [{"name": "face", "morphs": ["smile"]}, {"name": "body"}]
}"#;

fn motion(json: &str) -> MotionSource {
    MotionSource::from_slice(json.as_bytes()).unwrap()
}

fn hips_motion(last_frame: u32) -> MotionSource {
    motion(&format!(
        r#"{{"bones": [{{"bone": "hips", "keyframes": [{{"frame": 0}}, {{"frame": {last_frame}, "position": [0, 3, 0]}}]}}]}}"#
    ))
}

fn smile_motion() -> MotionSource {
    motion(r#"{"morphs": [{"morph": "smile", "keyframes": [{"frame": 0, "weight": 0}, {"frame": 30, "weight": 1}]}]}"#)
}

struct Rig {
    scene: Scene,
    model: ModelInstance,
    tracker: GpuResourceTracker,
}

fn rig() -> Rig {
    let tracker = GpuResourceTracker::new();
    let mut scene = Scene::new();
    let root = scene.add_node(Node::new("root"));
    let loaded = LoadedModel {
        model: SkinnedModel::from_slice(MODEL.as_bytes()).unwrap(),
        allocation: tracker.allocate(GpuResourceKind::ModelBuffers, "rig", 128),
    };
    let model = loaded.instantiate(&mut scene, root);
    Rig { scene, model, tracker }
}

fn loaded(tracker: &GpuResourceTracker, clip: AnimationClip) -> LoadedClip {
    LoadedClip {
        allocation: tracker.allocate(GpuResourceKind::ClipEvaluator, clip.name.clone(), 64),
        clip: Arc::new(clip),
    }
}

fn registry(rig: &Rig, clips: &[(&str, AnimationClip)]) -> (AnimationRegistry, PhysicsStats) {
    let physics = KinematicPhysics::new();
    let stats = physics.stats();
    let runtime = AnimationRuntime::new(
        Box::new(physics),
        Uuid::new_v4(),
        rig.tracker.allocate(GpuResourceKind::RuntimeInstance, "runtime", 256),
    );
    let clips = clips
        .iter()
        .map(|(name, clip)| (name.to_string(), loaded(&rig.tracker, clip.clone())))
        .collect();
    let registry = AnimationRegistry::new(runtime, clips, &rig.scene, rig.model.skeleton, rig.model.root);
    (registry, stats)
}

// ============================================================================
// KeyframeTrack
// ============================================================================

#[test]
fn linear_track_interpolates_and_clamps() {
    let track = KeyframeTrack::new(vec![0.0, 1.0], vec![0.0f32, 10.0], InterpolationMode::Linear);
    assert_eq!(track.sample(0.25), Some(2.5));
    assert_eq!(track.sample(-1.0), Some(0.0));
    assert_eq!(track.sample(5.0), Some(10.0));
}

#[test]
fn step_track_holds_previous_key() {
    let track = KeyframeTrack::new(
        vec![0.0, 1.0],
        vec![Vec3::ZERO, Vec3::ONE],
        InterpolationMode::Step,
    );
    assert_eq!(track.sample(0.99), Some(Vec3::ZERO));
    assert_eq!(track.sample(1.0), Some(Vec3::ONE));
}

#[test]
fn empty_track_samples_nothing() {
    let track: KeyframeTrack<Quat> = KeyframeTrack::new(Vec::new(), Vec::new(), InterpolationMode::Linear);
    assert!(track.is_empty());
    assert_eq!(track.sample(0.0), None);
}

// ============================================================================
// Binding
// ============================================================================

#[test]
fn binder_resolves_bones_and_morphs_by_name() {
    let rig = rig();
    let ghost = motion(r#"{"bones": [{"bone": "tail", "keyframes": [{"frame": 0}, {"frame": 10}]}]}"#);
    let clip = compose_clip("mixed", &[hips_motion(30), smile_motion(), ghost]);

    let bindings = Binder::bind(&rig.scene, rig.model.skeleton, rig.model.root, &clip);

    // hips translation + rotation, smile on the face mesh; tail has no bone
    assert_eq!(bindings.len(), 3);
    let morph = bindings.iter().find(|b| b.target == TargetPath::MorphWeight).unwrap();
    assert_eq!(morph.node, rig.model.meshes[0]);
    let hips = bindings.iter().find(|b| b.target == TargetPath::Translation).unwrap();
    assert_eq!(hips.rest.map(|(p, _)| p), Some(Vec3::Y));
}

// ============================================================================
// AnimationRegistry
// ============================================================================

#[test]
fn registry_lists_in_given_order() {
    let rig = rig();
    let (registry, _) = registry(
        &rig,
        &[
            ("wave", compose_clip("wave", &[hips_motion(30)])),
            ("idle", compose_clip("idle", &[smile_motion()])),
        ],
    );
    assert_eq!(registry.list_available(), ["wave", "idle"]);
    assert_eq!(registry.default_name(), Some("idle"));
    assert_eq!(registry.loop_policy("idle"), Some(LoopPolicy::LoopWithPhysicsReset));
    assert_eq!(registry.loop_policy("wave"), Some(LoopPolicy::PlayOnce));
    assert_eq!(registry.active_name(), None);
}

#[test]
fn unknown_play_leaves_active_unchanged() {
    let rig = rig();
    let (mut registry, _) = registry(&rig, &[("idle", compose_clip("idle", &[hips_motion(30)]))]);
    registry.play("idle").unwrap();

    assert_eq!(
        registry.play("walk"),
        Err(PlaybackError::UnknownAnimation("walk".to_string()))
    );
    assert_eq!(registry.active_name(), Some("idle"));
}

#[test]
fn default_registry_is_uninitialized() {
    let mut registry = AnimationRegistry::default();
    assert!(!registry.is_initialized());
    assert_eq!(registry.play("idle"), Err(PlaybackError::Uninitialized));
    assert_eq!(registry.select_default(), None);
}

#[test]
fn play_restarts_from_zero() {
    let mut rig = rig();
    let (mut registry, _) = registry(&rig, &[("idle", compose_clip("idle", &[hips_motion(30)]))]);
    registry.play("idle").unwrap();
    registry.update(0.5, &mut rig.scene);
    assert_eq!(registry.runtime().unwrap().current_time(), 0.5);

    registry.play("idle").unwrap();
    assert_eq!(registry.runtime().unwrap().current_time(), 0.0);
}

#[test]
fn plain_loop_rewinds_without_physics_reset() {
    let mut rig = rig();
    let (mut registry, stats) = registry(&rig, &[("idle", compose_clip("idle", &[hips_motion(30)]))]);
    registry.set_loop_policy("idle", LoopPolicy::LoopPlain).unwrap();
    registry.select_default();

    registry.update(0.75, &mut rig.scene);
    registry.update(0.75, &mut rig.scene);

    let runtime = registry.runtime().unwrap();
    assert!(runtime.is_playing());
    assert_eq!(runtime.current_time(), 0.0);
    assert_eq!(stats.reset_count(), 0);
}

#[test]
fn play_once_holds_last_pose() {
    let mut rig = rig();
    let (mut registry, stats) = registry(
        &rig,
        &[
            ("idle", compose_clip("idle", &[smile_motion()])),
            ("jump", compose_clip("jump", &[hips_motion(15)])),
        ],
    );
    registry.play("jump").unwrap();
    registry.update(0.4, &mut rig.scene);
    registry.update(0.4, &mut rig.scene);

    assert!(!registry.runtime().unwrap().is_playing());
    assert_eq!(stats.reset_count(), 0);
    let hips = rig.scene.skins[rig.model.skeleton].bone_node("hips").unwrap();
    // rest (0, 1, 0) plus the final offset
    assert_eq!(rig.scene.get_node(hips).unwrap().transform.position, Vec3::new(0.0, 4.0, 0.0));
}

#[test]
fn dispose_releases_clips_and_runtime() {
    let rig = rig();
    let (mut registry, _) = registry(
        &rig,
        &[
            ("idle", compose_clip("idle", &[smile_motion()])),
            ("wave", compose_clip("wave", &[hips_motion(30)])),
        ],
    );
    assert_eq!(rig.tracker.live_of(GpuResourceKind::ClipEvaluator), 2);

    registry.dispose();
    registry.dispose();
    assert_eq!(rig.tracker.live_of(GpuResourceKind::ClipEvaluator), 0);
    assert_eq!(rig.tracker.live_of(GpuResourceKind::RuntimeInstance), 0);
    assert!(registry.is_empty());
    assert_eq!(registry.play("idle"), Err(PlaybackError::Uninitialized));
}
