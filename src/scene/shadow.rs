use rustc_hash::FxHashSet;

use crate::config::ShadowQuality;
use crate::resources::{GpuAllocation, GpuResourceKind, GpuResourceTracker};
use crate::scene::{LightKey, NodeHandle, Scene};

/// Shadow map generator bound to a directional light.
///
/// Casters are a set: registering the same node twice is a no-op. The shadow map's device
/// memory is owned by the generator and released when it is dropped or disposed.
#[derive(Debug)]
pub struct ShadowGenerator {
    pub light: LightKey,
    pub map_size: u32,
    pub quality: ShadowQuality,
    pub use_percentage_closer_filtering: bool,
    pub transparency_shadow: bool,
    pub force_back_faces_only: bool,
    pub frustum_edge_falloff: f32,

    casters: FxHashSet<NodeHandle>,
    allocation: GpuAllocation,
}

impl ShadowGenerator {
    #[must_use]
    pub fn new(
        light: LightKey,
        map_size: u32,
        quality: ShadowQuality,
        tracker: &GpuResourceTracker,
    ) -> Self {
        // one 32-bit depth texel per map cell
        let bytes = u64::from(map_size) * u64::from(map_size) * 4;
        let allocation = tracker.allocate(
            GpuResourceKind::ShadowMap,
            format!("ShadowMap_{map_size}"),
            bytes,
        );

        Self {
            light,
            map_size,
            quality,
            use_percentage_closer_filtering: false,
            transparency_shadow: false,
            force_back_faces_only: false,
            frustum_edge_falloff: 0.0,
            casters: FxHashSet::default(),
            allocation,
        }
    }

    /// Registers `node` as a caster, and with `include_descendants` its whole subtree.
    pub fn add_shadow_caster(&mut self, scene: &Scene, node: NodeHandle, include_descendants: bool) {
        if scene.get_node(node).is_none() {
            return;
        }
        self.casters.insert(node);
        if include_descendants {
            self.casters.extend(scene.descendants(node));
        }
    }

    pub fn remove_shadow_caster(&mut self, node: NodeHandle) {
        self.casters.remove(&node);
    }

    #[must_use]
    pub fn is_caster(&self, node: NodeHandle) -> bool {
        self.casters.contains(&node)
    }

    #[must_use]
    pub fn caster_count(&self) -> usize {
        self.casters.len()
    }

    pub fn casters(&self) -> impl Iterator<Item = NodeHandle> + '_ {
        self.casters.iter().copied()
    }

    #[must_use]
    pub fn allocation(&self) -> &GpuAllocation {
        &self.allocation
    }

    /// Releases the shadow map. Equivalent to dropping the generator.
    pub fn dispose(self) {
        log::debug!("Disposing {}px shadow generator", self.map_size);
    }
}
