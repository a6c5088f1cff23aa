use std::sync::atomic::{AtomicU32, Ordering};

use bitflags::bitflags;
use glam::{Vec3, Vec4};
use slotmap::SlotMap;

use crate::scene::camera::Camera;
use crate::scene::light::DirectionalLight;
use crate::scene::mesh::Mesh;
use crate::scene::node::{Node, NodeRole, NodeTag};
use crate::scene::pipeline::RenderPipeline;
use crate::scene::skeleton::Skeleton;
use crate::scene::transform::Transform;
use crate::scene::transform_system;
use crate::scene::{CameraKey, LightKey, MeshKey, NodeHandle, SkeletonKey};

bitflags! {
    /// Render-loop shortcuts switched on once the stage stops changing structurally.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct SceneOptimizations: u32 {
        const FROZEN_MATERIALS           = 1 << 0;
        const SKIP_POINTER_MOVE_PICKING  = 1 << 1;
        const SKIP_POINTER_DOWN_PICKING  = 1 << 2;
        const SKIP_POINTER_UP_PICKING    = 1 << 3;
        const SKIP_FRUSTUM_CLIPPING      = 1 << 4;
        const BLOCK_MATERIAL_DIRTY       = 1 << 5;

        const FREEZE_PASS = Self::FROZEN_MATERIALS.bits()
            | Self::SKIP_POINTER_MOVE_PICKING.bits()
            | Self::SKIP_POINTER_DOWN_PICKING.bits()
            | Self::SKIP_POINTER_UP_PICKING.bits()
            | Self::SKIP_FRUSTUM_CLIPPING.bits()
            | Self::BLOCK_MATERIAL_DIRTY.bits();
    }
}

static NEXT_SCENE_ID: AtomicU32 = AtomicU32::new(1);

/// 场景图结构
///
/// Pure data: the node hierarchy plus component pools. Everything here is mutated from a single
/// execution context; nothing is shared across threads.
pub struct Scene {
    pub id: u32,

    pub(crate) nodes: SlotMap<NodeHandle, Node>,
    pub root_nodes: Vec<NodeHandle>,

    // ==== 组件池 ====
    pub meshes: SlotMap<MeshKey, Mesh>,
    pub cameras: SlotMap<CameraKey, Camera>,
    pub lights: SlotMap<LightKey, DirectionalLight>,
    pub skins: SlotMap<SkeletonKey, Skeleton>,

    // ==== 全局设置 ====
    pub ambient_color: Vec3,
    pub clear_color: Vec4,
    pub auto_clear: bool,
    pub auto_clear_depth_and_stencil: bool,
    pub pipeline: Option<RenderPipeline>,

    pub active_camera: Option<NodeHandle>,

    optimizations: SceneOptimizations,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed),

            nodes: SlotMap::with_key(),
            root_nodes: Vec::new(),
            meshes: SlotMap::with_key(),
            cameras: SlotMap::with_key(),
            lights: SlotMap::with_key(),
            skins: SlotMap::with_key(),

            ambient_color: Vec3::ZERO,
            clear_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            auto_clear: true,
            auto_clear_depth_and_stencil: true,
            pipeline: None,

            active_camera: None,

            optimizations: SceneOptimizations::empty(),
        }
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    /// Adds a node at the root level.
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let handle = self.nodes.insert(node);
        self.root_nodes.push(handle);
        handle
    }

    pub fn add_to_parent(&mut self, mut child: Node, parent: NodeHandle) -> NodeHandle {
        if !self.nodes.contains_key(parent) {
            log::warn!("Parent of '{}' not found, adding at root", child.name);
            return self.add_node(child);
        }
        child.parent = Some(parent);
        let handle = self.nodes.insert(child);
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(handle);
        }
        handle
    }

    /// Re-parents `child` under `parent`.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) {
        if child == parent {
            log::warn!("Cannot attach node to itself!");
            return;
        }
        if !self.nodes.contains_key(child) || !self.nodes.contains_key(parent) {
            log::error!("Node not found during attach!");
            return;
        }
        if self.is_ancestor(child, parent) {
            log::warn!("Cannot attach a node under its own descendant");
            return;
        }

        self.detach_from_parent(child);

        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
            c.transform.mark_dirty();
        }
    }

    fn detach_from_parent(&mut self, child: NodeHandle) {
        let old_parent = self.nodes.get(child).and_then(|n| n.parent);
        if let Some(p) = old_parent {
            if let Some(n) = self.nodes.get_mut(p)
                && let Some(i) = n.children.iter().position(|&x| x == child)
            {
                n.children.remove(i);
            }
        } else if let Some(i) = self.root_nodes.iter().position(|&x| x == child) {
            self.root_nodes.remove(i);
        }
    }

    fn is_ancestor(&self, ancestor: NodeHandle, node: NodeHandle) -> bool {
        let mut current = self.nodes.get(node).and_then(|n| n.parent);
        while let Some(h) = current {
            if h == ancestor {
                return true;
            }
            current = self.nodes.get(h).and_then(|n| n.parent);
        }
        false
    }

    /// Removes a node and its whole subtree, dropping attached components.
    ///
    /// Meshes own their device allocations, so removal releases them.
    pub fn remove_node(&mut self, handle: NodeHandle) {
        if !self.nodes.contains_key(handle) {
            return;
        }
        self.detach_from_parent(handle);

        let mut subtree = vec![handle];
        subtree.extend(self.descendants(handle));

        for h in subtree {
            let Some(node) = self.nodes.remove(h) else {
                continue;
            };
            if let Some(mesh) = node.mesh {
                self.meshes.remove(mesh);
            }
            if let Some(camera) = node.camera {
                self.cameras.remove(camera);
            }
            if self.active_camera == Some(h) {
                self.active_camera = None;
            }
        }
    }

    /// Drops every node and component.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root_nodes.clear();
        self.meshes.clear();
        self.cameras.clear();
        self.lights.clear();
        self.skins.clear();
        self.pipeline = None;
        self.active_camera = None;
    }

    #[inline]
    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    #[inline]
    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.nodes.contains_key(handle)
    }

    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeHandle, &Node)> {
        self.nodes.iter()
    }

    /// All nodes below `handle`, depth first, excluding `handle` itself.
    #[must_use]
    pub fn descendants(&self, handle: NodeHandle) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeHandle> = match self.nodes.get(handle) {
            Some(n) => n.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(h) = stack.pop() {
            if let Some(n) = self.nodes.get(h) {
                out.push(h);
                stack.extend(n.children.iter().rev().copied());
            }
        }
        out
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    #[must_use]
    pub fn find_by_tag(&self, tag: NodeTag) -> Option<NodeHandle> {
        self.nodes
            .iter()
            .find_map(|(h, n)| (n.tag == Some(tag)).then_some(h))
    }

    pub fn find_by_role(&self, role: NodeRole) -> impl Iterator<Item = NodeHandle> + '_ {
        self.nodes
            .iter()
            .filter_map(move |(h, n)| (n.role == role).then_some(h))
    }

    /// Nodes carrying a mesh component.
    pub fn mesh_nodes(&self) -> impl Iterator<Item = (NodeHandle, &Node)> {
        self.nodes.iter().filter(|(_, n)| n.mesh.is_some())
    }

    // ========================================================================
    // Components
    // ========================================================================

    pub fn add_mesh_to_parent(&mut self, mesh: Mesh, parent: NodeHandle, role: NodeRole) -> NodeHandle {
        let mut node = Node::new(&mesh.name).with_role(role);
        node.mesh = Some(self.meshes.insert(mesh));
        self.add_to_parent(node, parent)
    }

    pub fn add_camera_to_parent(&mut self, camera: Camera, transform: Transform, parent: NodeHandle) -> NodeHandle {
        let mut node = Node::new(&camera.name).with_role(NodeRole::Camera);
        node.transform = transform;
        node.camera = Some(self.cameras.insert(camera));
        self.add_to_parent(node, parent)
    }

    pub fn add_light(&mut self, light: DirectionalLight) -> LightKey {
        self.lights.insert(light)
    }

    #[must_use]
    pub fn get_mesh(&self, node: NodeHandle) -> Option<&Mesh> {
        let key = self.nodes.get(node)?.mesh?;
        self.meshes.get(key)
    }

    pub fn get_mesh_mut(&mut self, node: NodeHandle) -> Option<&mut Mesh> {
        let key = self.nodes.get(node)?.mesh?;
        self.meshes.get_mut(key)
    }

    #[must_use]
    pub fn get_camera(&self, node: NodeHandle) -> Option<&Camera> {
        let key = self.nodes.get(node)?.camera?;
        self.cameras.get(key)
    }

    // ========================================================================
    // 矩阵更新
    // ========================================================================

    /// Updates world matrices of the whole scene. Called once per frame before drawing.
    pub fn update_matrix_world(&mut self) {
        transform_system::update_hierarchy_iterative(
            &mut self.nodes,
            &mut self.cameras,
            &self.root_nodes,
        );
    }

    // ========================================================================
    // Optimisation
    // ========================================================================

    /// Bakes every mesh node's local matrix, freezes materials, disables picking and frustum
    /// clipping. Parent motion still reaches frozen nodes.
    pub fn freeze_active_meshes(&mut self) {
        for node in self.nodes.values_mut() {
            if node.mesh.is_some() {
                node.transform.freeze();
                node.pickable = false;
            }
        }
        for mesh in self.meshes.values_mut() {
            mesh.material.frozen = true;
        }
        self.optimizations |= SceneOptimizations::FREEZE_PASS;
    }

    #[inline]
    #[must_use]
    pub fn optimizations(&self) -> SceneOptimizations {
        self.optimizations
    }
}
