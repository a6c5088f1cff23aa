use std::fmt;

use glam::Affine3A;
use uuid::Uuid;

use crate::scene::transform::Transform;
use crate::scene::{CameraKey, MeshKey, NodeHandle};

/// What a node stands for in the avatar stage.
///
/// Shadow registration and model lookups go through the role, never through node names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeRole {
    #[default]
    Generic,
    /// The rig root every other stage object hangs from.
    Root,
    Ground,
    Background,
    /// Top node of a loaded skinned model.
    Model,
    /// A renderable sub-mesh of a model.
    ModelMesh,
    Bone,
    Camera,
}

/// Stable identifier assigned at build time, used to re-acquire a node
/// when a cached handle is no longer valid.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeTag(Uuid);

impl NodeTag {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeTag {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NodeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeTag({})", self.0.simple())
    }
}

/// A scene node.
///
/// # Hierarchy
///
/// - `parent`: optional handle to the parent node (None for root nodes)
/// - `children`: child node handles, in attach order
///
/// Components (mesh, camera) live in the scene's slot maps; the node only keeps their keys.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,

    // === Hierarchy ===
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,

    pub transform: Transform,

    // === State ===
    pub visible: bool,
    pub enabled: bool,
    pub pickable: bool,

    pub role: NodeRole,
    pub tag: Option<NodeTag>,

    // === Components ===
    pub(crate) mesh: Option<MeshKey>,
    pub(crate) camera: Option<CameraKey>,
}

impl Node {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parent: None,
            children: Vec::new(),
            transform: Transform::new(),
            visible: true,
            enabled: true,
            pickable: true,
            role: NodeRole::Generic,
            tag: None,
            mesh: None,
            camera: None,
        }
    }

    #[must_use]
    pub fn with_role(mut self, role: NodeRole) -> Self {
        self.role = role;
        self
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn mesh(&self) -> Option<MeshKey> {
        self.mesh
    }

    #[inline]
    #[must_use]
    pub fn camera(&self) -> Option<CameraKey> {
        self.camera
    }

    /// World transformation matrix, refreshed by the transform system each frame.
    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.transform.world_matrix
    }
}
