use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::animation::binder::Binder;
use crate::animation::binding::PropertyBinding;
use crate::animation::clip::AnimationClip;
use crate::animation::runtime::{AnimationRuntime, RuntimeEvent};
use crate::errors::PlaybackError;
use crate::resources::GpuAllocation;
use crate::scene::{NodeHandle, Scene, SkeletonKey};

/// The preferred default animation name.
pub const IDLE: &str = "idle";

/// What happens when a clip plays to its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoopPolicy {
    /// Rewind, resume, and reset physics so simulated parts start the loop at rest.
    LoopWithPhysicsReset,
    /// Rewind and resume.
    LoopPlain,
    /// Stay paused on the last frame.
    #[default]
    PlayOnce,
}

/// A decoded clip together with its evaluator allocation.
#[derive(Debug)]
pub struct LoadedClip {
    pub clip: Arc<AnimationClip>,
    pub allocation: GpuAllocation,
}

#[derive(Debug)]
struct ClipEntry {
    name: String,
    clip: Arc<AnimationClip>,
    bindings: Vec<PropertyBinding>,
    loop_policy: LoopPolicy,
    _allocation: GpuAllocation,
}

/// Name → clip mapping plus the single active animation.
///
/// The mapping is fixed at construction. A default-constructed or disposed registry is
/// uninitialised: every `play` fails with [`PlaybackError::Uninitialized`].
#[derive(Debug, Default)]
pub struct AnimationRegistry {
    entries: Vec<ClipEntry>,
    index: FxHashMap<String, usize>,
    default_index: Option<usize>,
    active: Option<usize>,
    runtime: Option<AnimationRuntime>,
}

impl AnimationRegistry {
    /// Builds the registry, binding each clip to the model by bone and morph name.
    ///
    /// `clips` must be in configuration order. The default clip ("idle", else the first) gets
    /// [`LoopPolicy::LoopWithPhysicsReset`]; every other clip plays once.
    #[must_use]
    pub fn new(
        runtime: AnimationRuntime,
        clips: Vec<(String, LoadedClip)>,
        scene: &Scene,
        skeleton: SkeletonKey,
        model_root: NodeHandle,
    ) -> Self {
        let mut entries = Vec::with_capacity(clips.len());
        let mut index = FxHashMap::default();

        for (name, loaded) in clips {
            if index.contains_key(&name) {
                log::warn!("Duplicate animation '{name}' ignored");
                continue;
            }
            let bindings = Binder::bind(scene, skeleton, model_root, &loaded.clip);
            index.insert(name.clone(), entries.len());
            entries.push(ClipEntry {
                name,
                clip: loaded.clip,
                bindings,
                loop_policy: LoopPolicy::PlayOnce,
                _allocation: loaded.allocation,
            });
        }

        let default_index = index.get(IDLE).copied().or((!entries.is_empty()).then_some(0));
        if let Some(i) = default_index {
            entries[i].loop_policy = LoopPolicy::LoopWithPhysicsReset;
        }

        Self {
            entries,
            index,
            default_index,
            active: None,
            runtime: Some(runtime),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.runtime.is_some()
    }

    /// Names in configuration order.
    #[must_use]
    pub fn list_available(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<AnimationClip>> {
        self.index.get(name).map(|&i| &self.entries[i].clip)
    }

    #[must_use]
    pub fn active_name(&self) -> Option<&str> {
        self.active.map(|i| self.entries[i].name.as_str())
    }

    /// The automatically selected animation, if any clip was loaded.
    #[must_use]
    pub fn default_name(&self) -> Option<&str> {
        self.default_index.map(|i| self.entries[i].name.as_str())
    }

    #[must_use]
    pub fn loop_policy(&self, name: &str) -> Option<LoopPolicy> {
        self.index.get(name).map(|&i| self.entries[i].loop_policy)
    }

    pub fn set_loop_policy(&mut self, name: &str, policy: LoopPolicy) -> Result<(), PlaybackError> {
        let &i = self
            .index
            .get(name)
            .ok_or_else(|| PlaybackError::UnknownAnimation(name.to_string()))?;
        self.entries[i].loop_policy = policy;
        Ok(())
    }

    /// Makes `name` the active animation, evaluated from time zero, and resumes playback.
    ///
    /// Nothing changes on failure.
    pub fn play(&mut self, name: &str) -> Result<(), PlaybackError> {
        let runtime = self.runtime.as_mut().ok_or(PlaybackError::Uninitialized)?;
        let &i = self
            .index
            .get(name)
            .ok_or_else(|| PlaybackError::UnknownAnimation(name.to_string()))?;

        let entry = &self.entries[i];
        runtime.set_animation(Arc::clone(&entry.clip), entry.bindings.clone());
        runtime.play();
        self.active = Some(i);
        log::info!("Playing animation '{name}'");
        Ok(())
    }

    /// Plays the default animation. Returns its name, or `None` when nothing is loaded.
    pub fn select_default(&mut self) -> Option<String> {
        let name = self.default_name()?.to_string();
        self.play(&name).ok()?;
        Some(name)
    }

    /// Advances the runtime, applies the active clip's loop policy, and poses the scene.
    pub fn update(&mut self, dt: f32, scene: &mut Scene) {
        let Some(runtime) = self.runtime.as_mut() else {
            return;
        };

        if let Some(RuntimeEvent::Paused { time, duration }) = runtime.update(dt)
            && let Some(active) = self.active
            && duration > 0.0
            && time == duration
        {
            match self.entries[active].loop_policy {
                LoopPolicy::LoopWithPhysicsReset => {
                    runtime.seek(0.0);
                    runtime.play();
                    runtime.reset_physics();
                }
                LoopPolicy::LoopPlain => {
                    runtime.seek(0.0);
                    runtime.play();
                }
                LoopPolicy::PlayOnce => {}
            }
        }

        runtime.apply(scene);
    }

    #[must_use]
    pub fn runtime(&self) -> Option<&AnimationRuntime> {
        self.runtime.as_ref()
    }

    pub fn runtime_mut(&mut self) -> Option<&mut AnimationRuntime> {
        self.runtime.as_mut()
    }

    /// Drops every clip and the runtime, releasing their allocations. Idempotent.
    pub fn dispose(&mut self) {
        if self.runtime.is_none() && self.entries.is_empty() {
            return;
        }
        log::debug!("Disposing animation registry ({} clips)", self.entries.len());
        self.active = None;
        self.default_index = None;
        self.index.clear();
        self.entries.clear();
        self.runtime = None;
    }
}
