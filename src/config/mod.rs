//! Scene Configuration
//!
//! [`SceneConfiguration`] is an explicit value handed to
//! [`SceneBuilder`](crate::stage::SceneBuilder); there is no process-wide settings object.
//! Two scenes built from different configurations never observe each other.
//!
//! - [`settings`]: the settings record and its defaults
//! - [`character`]: conversion from the shared character document

pub mod character;
pub mod settings;

pub use character::{CharacterConfig, CharacterMotion, SystemConfig};
pub use settings::{
    BackgroundSettings, ColorSettings, DirectionalLightSettings, LightFollowSettings,
    ModelSettings, MotionTable, OrbitCameraSettings, PerformanceSettings, PipelineSettings,
    RootSettings, SceneConfiguration, ScriptedCameraSettings, ShadowFrustumSettings,
    ShadowGeneratorSettings, ShadowQuality,
};
