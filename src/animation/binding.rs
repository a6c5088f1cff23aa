use glam::{Quat, Vec3};

use crate::scene::NodeHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetPath {
    Translation,
    Rotation,
    MorphWeight,
}

/// Resolved link from a clip track to the scene.
#[derive(Debug, Clone)]
pub struct PropertyBinding {
    pub track_index: usize,
    pub node: NodeHandle,
    pub target: TargetPath,
    /// Bone rest pose; animated values are offsets from it.
    pub rest: Option<(Vec3, Quat)>,
}
