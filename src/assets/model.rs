//! Skinned model documents.
//!
//! A model is a JSON document listing bones (parent by index, rest pose) and sub-meshes with
//! their morph target names. Decoding validates the hierarchy; instancing turns the model into
//! scene nodes under a given parent.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::errors::AssetError;
use crate::resources::GpuAllocation;
use crate::scene::{Material, Mesh, Node, NodeHandle, NodeRole, NodeTag, Scene, Skeleton, SkeletonKey};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneDef {
    pub name: String,
    #[serde(default)]
    pub parent: Option<usize>,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default = "identity")]
    pub rotation: Quat,
}

fn identity() -> Quat {
    Quat::IDENTITY
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshDef {
    pub name: String,
    #[serde(default)]
    pub morphs: Vec<String>,
    #[serde(default)]
    pub vertex_count: u32,
}

/// Decoded skinned model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinnedModel {
    pub name: String,
    #[serde(default)]
    pub bones: Vec<BoneDef>,
    #[serde(default)]
    pub meshes: Vec<MeshDef>,
}

impl SkinnedModel {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AssetError> {
        let model: SkinnedModel = serde_json::from_slice(bytes)?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<(), AssetError> {
        if self.meshes.is_empty() {
            return Err(AssetError::InvalidData(format!("model '{}' has no meshes", self.name)));
        }
        for (i, bone) in self.bones.iter().enumerate() {
            if let Some(p) = bone.parent
                && (p >= self.bones.len() || p == i)
            {
                return Err(AssetError::InvalidData(format!(
                    "bone '{}' has invalid parent index {p}",
                    bone.name
                )));
            }
        }
        Ok(())
    }

    /// Estimated device footprint of the model's buffers.
    #[must_use]
    pub fn gpu_bytes(&self) -> u64 {
        const VERTEX_STRIDE: u64 = 64;
        const BONE_MATRIX: u64 = 64;
        let vertices: u64 = self.meshes.iter().map(|m| u64::from(m.vertex_count)).sum();
        vertices * VERTEX_STRIDE + self.bones.len() as u64 * BONE_MATRIX
    }
}

/// A decoded model together with its device buffers.
#[derive(Debug)]
pub struct LoadedModel {
    pub model: SkinnedModel,
    pub allocation: GpuAllocation,
}

/// Scene-side view of an instanced model.
#[derive(Debug)]
pub struct ModelInstance {
    pub root: NodeHandle,
    pub tag: NodeTag,
    pub skeleton: SkeletonKey,
    pub meshes: Vec<NodeHandle>,
    pub(crate) allocation: GpuAllocation,
}

impl ModelInstance {
    #[must_use]
    pub fn allocation(&self) -> &GpuAllocation {
        &self.allocation
    }
}

impl LoadedModel {
    /// Creates the model's nodes under `parent`: a tagged model root, one node per bone and one
    /// mesh node per sub-mesh.
    pub fn instantiate(self, scene: &mut Scene, parent: NodeHandle) -> ModelInstance {
        let model = self.model;
        let tag = NodeTag::new();

        let mut root_node = Node::new(&model.name).with_role(NodeRole::Model);
        root_node.tag = Some(tag);
        let root = scene.add_to_parent(root_node, parent);

        let mut skeleton = Skeleton::new(&model.name);
        let mut bone_nodes = Vec::with_capacity(model.bones.len());
        for bone in &model.bones {
            let mut node = Node::new(&bone.name).with_role(NodeRole::Bone);
            node.transform.position = bone.position;
            node.transform.rotation = bone.rotation;
            node.pickable = false;
            let handle = scene.add_to_parent(node, root);
            skeleton.push_bone(&bone.name, handle, bone.position, bone.rotation);
            bone_nodes.push(handle);
        }
        for (i, bone) in model.bones.iter().enumerate() {
            if let Some(p) = bone.parent {
                scene.attach(bone_nodes[i], bone_nodes[p]);
            }
        }
        let skeleton = scene.skins.insert(skeleton);

        let meshes = model
            .meshes
            .iter()
            .map(|def| {
                let mut mesh = Mesh::new(&def.name, Material::standard())
                    .with_morph_targets(def.morphs.clone());
                mesh.skeleton = Some(skeleton);
                scene.add_mesh_to_parent(mesh, root, NodeRole::ModelMesh)
            })
            .collect();

        log::info!(
            "Instanced model '{}' ({} bones, {} meshes)",
            model.name,
            model.bones.len(),
            model.meshes.len()
        );

        ModelInstance {
            root,
            tag,
            skeleton,
            meshes,
            allocation: self.allocation,
        }
    }
}
