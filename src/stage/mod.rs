//! 舞台层 (stage layer)
//!
//! - [`SceneBuilder`]: async assembly of an [`AvatarScene`] into a [`RenderSurface`]
//! - [`AvatarScene`]: frame loop, playback, live updates and teardown
//! - [`controller`]: lighting, shadow, model and background updates
//! - [`camera_switch`]: double-activation camera toggle
//! - [`orbit`]: arc-rotate camera rig
//! - [`reply`]: motion fallback used by chat replies

pub mod avatar;
pub mod builder;
pub mod camera_switch;
pub mod controller;
pub mod graph;
pub mod orbit;
pub mod reply;
pub mod surface;

pub use avatar::AvatarScene;
pub use builder::SceneBuilder;
pub use camera_switch::{CameraState, CameraSwitch, DOUBLE_ACTIVATION_THRESHOLD};
pub use controller::{BackgroundState, LightingState, ModelTransformState, SceneUpdate};
pub use graph::{SceneHandles, Stage};
pub use orbit::{OrbitControls, OrbitInput};
pub use reply::{AnimationPlayer, apply_reply_motion};
pub use surface::{BackgroundStyle, LoadingOverlay, RenderSurface};
