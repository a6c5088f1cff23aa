//! 场景图系统模块
//!
//! - Node: scene node with hierarchy, role and tag
//! - Transform: TRS component with freeze support
//! - Scene: container and component pools
//! - Camera / DirectionalLight / ShadowGenerator: stage components
//! - transform_system: decoupled world-matrix propagation

pub mod camera;
pub mod light;
pub mod mesh;
pub mod node;
pub mod pipeline;
pub mod scene;
pub mod shadow;
pub mod skeleton;
pub mod transform;
pub mod transform_system;

pub use camera::{Camera, CameraKind};
pub use light::DirectionalLight;
pub use mesh::{Material, MaterialKind, Mesh};
pub use node::{Node, NodeRole, NodeTag};
pub use pipeline::RenderPipeline;
pub use scene::{Scene, SceneOptimizations};
pub use shadow::ShadowGenerator;
pub use skeleton::Skeleton;
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
    pub struct MeshKey;
    pub struct CameraKey;
    pub struct LightKey;
    pub struct SkeletonKey;
}
