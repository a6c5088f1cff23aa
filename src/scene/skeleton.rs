use glam::{Quat, Vec3};
use rustc_hash::FxHashMap;
use uuid::Uuid;

use crate::scene::NodeHandle;

/// Bone nodes of one skinned model.
///
/// Bones are ordinary scene nodes; the skeleton only indexes them by name and remembers the
/// rest pose that animated offsets are applied on top of.
#[derive(Debug, Clone)]
pub struct Skeleton {
    pub id: Uuid,
    pub name: String,

    pub bones: Vec<NodeHandle>,
    pub(crate) rest_positions: Vec<Vec3>,
    pub(crate) rest_rotations: Vec<Quat>,

    by_name: FxHashMap<String, usize>,
}

impl Skeleton {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            bones: Vec::new(),
            rest_positions: Vec::new(),
            rest_rotations: Vec::new(),
            by_name: FxHashMap::default(),
        }
    }

    /// Registers a bone. A repeated name keeps the first bone.
    pub fn push_bone(&mut self, name: &str, node: NodeHandle, rest_position: Vec3, rest_rotation: Quat) {
        let index = self.bones.len();
        self.bones.push(node);
        self.rest_positions.push(rest_position);
        self.rest_rotations.push(rest_rotation);
        self.by_name.entry(name.to_string()).or_insert(index);
    }

    #[must_use]
    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    #[must_use]
    pub fn bone_node(&self, name: &str) -> Option<NodeHandle> {
        self.bone_index(name).map(|i| self.bones[i])
    }

    #[must_use]
    pub fn rest_pose(&self, index: usize) -> Option<(Vec3, Quat)> {
        Some((*self.rest_positions.get(index)?, *self.rest_rotations.get(index)?))
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }
}
