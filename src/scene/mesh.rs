use crate::resources::GpuAllocation;
use crate::scene::SkeletonKey;

/// Material flavour. The stage only needs two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialKind {
    Standard,
    /// Invisible except for the shadows it receives.
    ShadowOnly,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub kind: MaterialKind,
    pub alpha: f32,
    /// A frozen material skips uniform re-upload and dirty tracking.
    pub frozen: bool,
}

impl Material {
    #[must_use]
    pub fn standard() -> Self {
        Self { kind: MaterialKind::Standard, alpha: 1.0, frozen: false }
    }

    #[must_use]
    pub fn shadow_only(alpha: f32) -> Self {
        Self { kind: MaterialKind::ShadowOnly, alpha, frozen: false }
    }
}

/// Renderable instance attached to a node.
#[derive(Debug)]
pub struct Mesh {
    pub name: String,
    pub material: Material,
    pub receive_shadows: bool,

    /// Morph target names and current weights, index-aligned.
    pub morph_targets: Vec<String>,
    pub morph_weights: Vec<f32>,

    pub skeleton: Option<SkeletonKey>,

    /// Device memory backing this mesh, released when the mesh is dropped.
    pub(crate) allocation: Option<GpuAllocation>,
}

impl Mesh {
    #[must_use]
    pub fn new(name: &str, material: Material) -> Self {
        Self {
            name: name.to_string(),
            material,
            receive_shadows: false,
            morph_targets: Vec::new(),
            morph_weights: Vec::new(),
            skeleton: None,
            allocation: None,
        }
    }

    #[must_use]
    pub fn with_allocation(mut self, allocation: GpuAllocation) -> Self {
        self.allocation = Some(allocation);
        self
    }

    #[must_use]
    pub fn with_morph_targets(mut self, targets: Vec<String>) -> Self {
        self.morph_weights = vec![0.0; targets.len()];
        self.morph_targets = targets;
        self
    }

    /// Sets the weight of a named morph target. Unknown names are ignored.
    pub fn set_morph_weight(&mut self, target: &str, weight: f32) -> bool {
        match self.morph_targets.iter().position(|t| t == target) {
            Some(i) => {
                self.morph_weights[i] = weight;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn morph_weight(&self, target: &str) -> Option<f32> {
        let i = self.morph_targets.iter().position(|t| t == target)?;
        self.morph_weights.get(i).copied()
    }
}
