//! Asset Tests
//!
//! Tests for:
//! - Asset readers (memory and filesystem) and byte progress
//! - The concurrent resource loader: ordering, progress lines, failure cleanup
//! - Scene configuration documents

mod common;

use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use avatar_stage::animation::KinematicPhysics;
use avatar_stage::assets::{
    AssetReader, AssetReaderVariant, FileAssetReader, LoadStatusBoard, MODEL_TASK, ResourceLoader,
    TaskState,
};
use avatar_stage::config::{SceneConfiguration, SystemConfig};
use avatar_stage::errors::{AssetError, ConstructionError};
use avatar_stage::resources::{GpuResourceKind, GpuResourceTracker};
use avatar_stage::MemoryAssetReader;

use common::*;

fn loader(reader: Arc<MemoryAssetReader>, tracker: &GpuResourceTracker) -> ResourceLoader {
    ResourceLoader::new(reader.into(), tracker.clone(), LoadStatusBoard::new())
}

// ============================================================================
// Readers
// ============================================================================

#[tokio::test]
async fn memory_reader_reports_chunks() {
    let reader = MemoryAssetReader::new().with_chunk_size(4);
    reader.insert_text("/a/b.json", "0123456789");

    let seen = Mutex::new(Vec::new());
    let progress = |loaded: u64, total: u64| seen.lock().push((loaded, total));
    let bytes = reader.read_bytes_with_progress("a/b.json", &progress).await.unwrap();

    assert_eq!(bytes, b"0123456789");
    assert_eq!(*seen.lock(), [(4, 10), (8, 10), (10, 10)]);
}

#[tokio::test]
async fn memory_reader_missing_is_not_found() {
    let reader = MemoryAssetReader::new();
    let err = reader.read_bytes("/nothing.json").await.unwrap_err();
    assert!(matches!(err, AssetError::NotFound(p) if p == "/nothing.json"));
}

#[tokio::test]
async fn file_reader_resolves_site_absolute_paths() {
    let root = std::env::temp_dir().join(format!("avatar-stage-{}", Uuid::new_v4().simple()));
    tokio::fs::create_dir_all(root.join("assets")).await.unwrap();
    tokio::fs::write(root.join("assets/model.json"), MODEL_DOC).await.unwrap();

    let reader = FileAssetReader::new(&root);
    let bytes = reader.read_bytes("/assets/model.json").await.unwrap();
    assert_eq!(bytes, MODEL_DOC.as_bytes());

    let err = reader.read_bytes("/assets/missing.json").await.unwrap_err();
    assert!(matches!(err, AssetError::NotFound(_)));

    tokio::fs::remove_dir_all(&root).await.unwrap();
}

#[test]
fn network_sources_are_rejected() {
    let err = AssetReaderVariant::from_source("https://cdn.example.com/assets").err().unwrap();
    assert!(matches!(err, AssetError::InvalidData(_)));
}

// ============================================================================
// Resource loader
// ============================================================================

#[tokio::test]
async fn clips_keep_configuration_order() {
    init_logger();
    let tracker = GpuResourceTracker::new();
    // dance is listed first but has the larger source
    let config = config(&[("dance", &[DANCE]), ("blink", &[IDLE_FACE]), ("idle", &[IDLE_FACE, IDLE_BODY])]);

    let resources = loader(reader(), &tracker)
        .load(&config, Box::new(KinematicPhysics::new()), Uuid::new_v4())
        .await
        .unwrap();

    let names: Vec<&str> = resources.clips.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, ["dance", "blink", "idle"]);
    assert_eq!(resources.clips[0].1.clip.duration, 2.0);
    // face blink + centre translation/rotation
    assert_eq!(resources.clips[2].1.clip.tracks.len(), 3);
    assert_eq!(resources.model.model.bones.len(), 3);

    assert_eq!(tracker.live_of(GpuResourceKind::ClipEvaluator), 3);
    assert_eq!(tracker.live_of(GpuResourceKind::ModelBuffers), 1);
    assert_eq!(tracker.live_of(GpuResourceKind::RuntimeInstance), 1);

    drop(resources);
    assert_eq!(tracker.live_count(), 0);
}

#[tokio::test]
async fn progress_has_one_line_per_task() {
    let tracker = GpuResourceTracker::new();
    let loader = loader(reader(), &tracker);
    let status = loader.board().subscribe();

    let _resources = loader
        .load(&idle_dance_config(), Box::new(KinematicPhysics::new()), Uuid::new_v4())
        .await
        .unwrap();

    let tasks = loader.board().tasks();
    let names: Vec<&str> = tasks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["idle", "dance", MODEL_TASK]);
    assert!(tasks.iter().all(|t| t.state == TaskState::Done));

    // idle aggregates both of its files
    let idle_total = (IDLE_FACE_DOC.len() + IDLE_BODY_DOC.len()) as u64;
    assert_eq!(tasks[0].total, idle_total);
    assert_eq!(
        loader.board().text().lines().next(),
        Some(format!("Loading idle... {idle_total}/{idle_total} (100%)").as_str())
    );

    let last = status.try_iter().last().unwrap();
    assert_eq!(last.lines().count(), 3);
    assert!((loader.board().overall_fraction() - 1.0).abs() < 1e-6);
}

#[tokio::test]
async fn malformed_model_fails_with_task_identity() {
    let tracker = GpuResourceTracker::new();
    let reader = reader();
    reader.insert_text(MODEL, r#"{"name": "broken", "meshes": []}"#);
    let loader = loader(reader, &tracker);

    let err = loader
        .load(&idle_dance_config(), Box::new(KinematicPhysics::new()), Uuid::new_v4())
        .await
        .unwrap_err();

    match err {
        ConstructionError::Load { task, source } => {
            assert_eq!(task, MODEL_TASK);
            assert!(matches!(source, AssetError::InvalidData(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
    let model = loader.board().tasks().pop().unwrap();
    assert_eq!(model.state, TaskState::Failed);
    assert!(loader.board().text().ends_with("Loading model... failed"));
    assert_eq!(tracker.live_count(), 0);
}

#[tokio::test]
async fn malformed_motion_fails_load() {
    let tracker = GpuResourceTracker::new();
    let reader = reader();
    reader.insert_text(DANCE, "{ not json");

    let err = loader(reader, &tracker)
        .load(&idle_dance_config(), Box::new(KinematicPhysics::new()), Uuid::new_v4())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ConstructionError::Load { ref task, source: AssetError::Json(_) } if task == "dance"
    ));
    assert_eq!(tracker.live_count(), 0);
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn configuration_document_keeps_motion_order() {
    let config = SceneConfiguration::from_json(
        r#"{
            "model": {
                "path": "/assets/m.json",
                "motion": {"wave": ["/w.json"], "idle": ["/i1.json", "/i2.json"], "bow": ["/b.json"]}
            },
            "shadow_generator": {"quality": "high"}
        }"#,
    )
    .unwrap();

    assert_eq!(config.animation_names().collect::<Vec<_>>(), ["wave", "idle", "bow"]);
    assert_eq!(config.shadow_generator.quality.map_size(), 2048);
    // untouched sections keep their defaults
    assert_eq!(config.light_follow.bone, "センター");
    assert_eq!(config.directional_light.intensity, 2.1);
    assert!(config.validate().is_ok());
}

#[test]
fn configuration_rejects_empty_motion_list() {
    let config = SceneConfiguration::from_json(r#"{"model": {"motion": {"idle": []}}}"#).unwrap();
    assert!(matches!(config.validate(), Err(ConstructionError::InvalidConfiguration(_))));
}

#[test]
fn character_document_drives_scene() {
    let system = SystemConfig::from_json(
        r#"{"character": {"name": "Miko", "model": "/assets/miko/model.json",
             "motion": {"idle": {"file_path": ["/assets/motions/idle_face.json"], "trigger_condition": "always"}}}}"#,
    )
    .unwrap();
    let config = SceneConfiguration::default().with_character(&system.character);

    assert_eq!(config.model.path, MODEL);
    assert_eq!(config.model.motion.get("idle").unwrap(), &vec![IDLE_FACE.to_string()]);
    assert_eq!(config.background.image, ["/assets/bg/bg.jpg"]);
}
