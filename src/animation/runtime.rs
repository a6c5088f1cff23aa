use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::animation::action::AnimationAction;
use crate::animation::binding::PropertyBinding;
use crate::animation::clip::AnimationClip;
use crate::animation::physics::PhysicsBackend;
use crate::resources::GpuAllocation;
use crate::scene::Scene;

/// Notifications raised by [`AnimationRuntime::update`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RuntimeEvent {
    /// Playback stopped on its own at `time`.
    Paused { time: f32, duration: f32 },
}

/// Physics-capable evaluator bound to one render surface.
///
/// Evaluates a single clip at a time and owns the physics backend.
pub struct AnimationRuntime {
    surface: Uuid,
    physics: Box<dyn PhysicsBackend>,
    action: Option<AnimationAction>,
    allocation: GpuAllocation,
}

impl fmt::Debug for AnimationRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationRuntime")
            .field("surface", &self.surface)
            .field("physics", &self.physics.name())
            .field("clip", &self.current_clip_name())
            .field("allocation", &self.allocation)
            .finish()
    }
}

impl AnimationRuntime {
    #[must_use]
    pub fn new(physics: Box<dyn PhysicsBackend>, surface: Uuid, allocation: GpuAllocation) -> Self {
        Self {
            surface,
            physics,
            action: None,
            allocation,
        }
    }

    #[inline]
    #[must_use]
    pub fn surface_id(&self) -> Uuid {
        self.surface
    }

    /// Switches evaluation to `clip`, rewound to time zero and paused.
    pub fn set_animation(&mut self, clip: Arc<AnimationClip>, bindings: Vec<PropertyBinding>) {
        self.action = Some(AnimationAction::new(clip, bindings));
    }

    pub fn play(&mut self) {
        if let Some(action) = &mut self.action {
            action.paused = false;
        }
    }

    pub fn pause(&mut self) {
        if let Some(action) = &mut self.action {
            action.paused = true;
        }
    }

    pub fn seek(&mut self, time: f32) {
        if let Some(action) = &mut self.action {
            action.seek(time);
        }
    }

    #[must_use]
    pub fn current_time(&self) -> f32 {
        self.action.as_ref().map_or(0.0, |a| a.time)
    }

    #[must_use]
    pub fn duration(&self) -> f32 {
        self.action.as_ref().map_or(0.0, |a| a.clip().duration)
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.action.as_ref().is_some_and(|a| !a.paused)
    }

    #[must_use]
    pub fn current_clip_name(&self) -> Option<&str> {
        self.action.as_ref().map(|a| a.clip().name.as_str())
    }

    /// Advances playback and the physics backend.
    pub fn update(&mut self, dt: f32) -> Option<RuntimeEvent> {
        self.physics.step(dt);
        let action = self.action.as_mut()?;
        action.update(dt).then(|| RuntimeEvent::Paused {
            time: action.time,
            duration: action.clip().duration,
        })
    }

    /// Writes the current pose of the active clip into the scene.
    pub fn apply(&mut self, scene: &mut Scene) {
        if let Some(action) = &mut self.action {
            action.apply(scene);
        }
    }

    pub fn reset_physics(&mut self) {
        log::debug!("Resetting {} physics state", self.physics.name());
        self.physics.reset_all();
    }
}
