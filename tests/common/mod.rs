//! Shared fixtures: a small skinned model, three motion files and a matching configuration.

#![allow(dead_code)]

use std::sync::Arc;

use avatar_stage::config::SceneConfiguration;
use avatar_stage::MemoryAssetReader;

pub const MODEL: &str = "/assets/miko/model.json";
pub const IDLE_FACE: &str = "/assets/motions/idle_face.json";
pub const IDLE_BODY: &str = "/assets/motions/idle_body.json";
pub const DANCE: &str = "/assets/motions/dance.json";

pub const MODEL_DOC: &str = r#"{
    "name": "miko",
    "bones": [
        {"name": "センター", "position": [0, 10, 0]},
        {"name": "上半身", "parent": 0, "position": [0, 2, 0]},
        {"name": "頭", "parent": 1, "position": [0, 3, 0]}
    ],
    "meshes": [
        {"name": "body", "morphs": ["まばたき"], "vertex_count": 1200},
        {"name": "hair", "vertex_count": 800}
    ]
}"#;

/// One second of blinking.
pub const IDLE_FACE_DOC: &str = r#"{
    "name": "idle_face",
    "morphs": [
        {"morph": "まばたき", "keyframes": [{"frame": 0, "weight": 0.0}, {"frame": 30, "weight": 1.0}]}
    ]
}"#;

/// One second of swaying.
pub const IDLE_BODY_DOC: &str = r#"{
    "name": "idle_body",
    "bones": [
        {"bone": "センター", "keyframes": [
            {"frame": 0, "position": [0, 0, 0]},
            {"frame": 15, "position": [0, 1, 0]},
            {"frame": 30, "position": [0, 0, 0]}
        ]}
    ]
}"#;

/// Two seconds of turning the upper body.
pub const DANCE_DOC: &str = r#"{
    "name": "dance",
    "bones": [
        {"bone": "上半身", "keyframes": [
            {"frame": 0},
            {"frame": 60, "rotation": [0, 0.70710677, 0, 0.70710677]}
        ]}
    ]
}"#;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn reader() -> Arc<MemoryAssetReader> {
    let reader = MemoryAssetReader::new().with_chunk_size(64);
    reader.insert_text(MODEL, MODEL_DOC);
    reader.insert_text(IDLE_FACE, IDLE_FACE_DOC);
    reader.insert_text(IDLE_BODY, IDLE_BODY_DOC);
    reader.insert_text(DANCE, DANCE_DOC);
    Arc::new(reader)
}

/// `motions` in order, each `(name, files)`.
pub fn config(motions: &[(&str, &[&str])]) -> SceneConfiguration {
    let mut config = SceneConfiguration::default();
    config.model.path = MODEL.to_string();
    config.model.motion = motions
        .iter()
        .map(|(name, files)| (name.to_string(), files.iter().map(ToString::to_string).collect::<Vec<_>>()))
        .collect();
    config
}

/// `{"idle": [face, body], "dance": [dance]}`
pub fn idle_dance_config() -> SceneConfiguration {
    config(&[("idle", &[IDLE_FACE, IDLE_BODY]), ("dance", &[DANCE])])
}
