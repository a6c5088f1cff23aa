//! Asset IO, decoding and the concurrent resource loader.

pub mod io;
pub mod loader;
pub mod model;
pub mod motion;
pub mod progress;

#[cfg(not(target_arch = "wasm32"))]
pub use io::FileAssetReader;
pub use io::{AssetReader, AssetReaderVariant, MemoryAssetReader, Progress};
pub use loader::{LoadedResources, MODEL_TASK, ResourceLoader};
pub use model::{BoneDef, LoadedModel, MeshDef, ModelInstance, SkinnedModel};
pub use motion::{BoneKeyframe, BoneMotion, MorphKeyframe, MorphMotion, MotionSource, compose_clip};
pub use progress::{LoadStatusBoard, LoadTask, TaskState};
