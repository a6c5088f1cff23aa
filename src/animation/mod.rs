mod values;
pub mod action;
pub mod binder;
pub mod binding;
pub mod clip;
pub mod physics;
pub mod registry;
pub mod runtime;
pub mod tracks;

pub use action::AnimationAction;
pub use binder::Binder;
pub use binding::{PropertyBinding, TargetPath};
pub use clip::{AnimationClip, Track, TrackData, TrackMeta};
pub use physics::{KinematicPhysics, PhysicsBackend, PhysicsStats};
pub use registry::{AnimationRegistry, IDLE, LoadedClip, LoopPolicy};
pub use runtime::{AnimationRuntime, RuntimeEvent};
pub use tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
pub use values::Interpolatable;
