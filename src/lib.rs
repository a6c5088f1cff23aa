#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod animation;
pub mod assets;
pub mod config;
pub mod errors;
pub mod resources;
pub mod scene;
pub mod stage;
pub mod utils;

pub use animation::{AnimationClip, AnimationRegistry, AnimationRuntime, KinematicPhysics, LoopPolicy, PhysicsBackend};
pub use assets::{AssetReader, AssetReaderVariant, LoadStatusBoard, MemoryAssetReader};
#[cfg(not(target_arch = "wasm32"))]
pub use assets::FileAssetReader;
pub use config::{CharacterConfig, SceneConfiguration, ShadowQuality};
pub use errors::{AssetError, ConstructionError, PhysicsError, PlaybackError};
pub use resources::GpuResourceTracker;
pub use scene::{Node, NodeRole, Scene};
pub use stage::{
    AvatarScene, CameraState, LightingState, ModelTransformState, RenderSurface, SceneBuilder,
    SceneUpdate, apply_reply_motion,
};
