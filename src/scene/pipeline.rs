use crate::config::PipelineSettings;
use crate::scene::NodeHandle;

/// Post-processing chain applied to a set of cameras.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPipeline {
    pub name: String,
    pub samples: u32,
    pub bloom_enabled: bool,
    pub chromatic_aberration_enabled: bool,
    pub fxaa_enabled: bool,
    pub image_processing_enabled: bool,
    pub cameras: Vec<NodeHandle>,
}

impl RenderPipeline {
    #[must_use]
    pub fn from_settings(name: &str, settings: &PipelineSettings, cameras: Vec<NodeHandle>) -> Self {
        Self {
            name: name.to_string(),
            samples: settings.samples.max(1),
            bloom_enabled: settings.bloom_enabled,
            chromatic_aberration_enabled: settings.chromatic_aberration_enabled,
            fxaa_enabled: settings.fxaa_enabled,
            image_processing_enabled: settings.image_processing_enabled,
            cameras,
        }
    }
}
