use std::sync::Arc;

use glam::{Quat, Vec3};

use crate::animation::binding::{PropertyBinding, TargetPath};
use crate::animation::clip::{AnimationClip, TrackData};
use crate::animation::tracks::KeyframeCursor;
use crate::scene::Scene;

/// Playback state of one clip against one set of bindings.
///
/// Time is clamped to `[0, duration]`; reaching either end pauses the action. Looping is the
/// registry's decision, not the action's.
#[derive(Debug, Clone)]
pub struct AnimationAction {
    clip: Arc<AnimationClip>,

    pub time: f32,
    pub time_scale: f32,
    pub paused: bool,
    pub enabled: bool,

    pub bindings: Vec<PropertyBinding>,

    pub(crate) track_cursors: Vec<KeyframeCursor>,
}

impl AnimationAction {
    #[must_use]
    pub fn new(clip: Arc<AnimationClip>, bindings: Vec<PropertyBinding>) -> Self {
        let track_count = clip.tracks.len();
        Self {
            clip,
            time: 0.0,
            time_scale: 1.0,
            paused: true,
            enabled: true,
            bindings,
            track_cursors: vec![KeyframeCursor::default(); track_count],
        }
    }

    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    /// Advances time. Returns true when this call reached the end and paused.
    pub fn update(&mut self, dt: f32) -> bool {
        if self.paused || !self.enabled {
            return false;
        }

        let duration = self.clip.duration;
        self.time += dt * self.time_scale;

        if self.time >= duration {
            self.time = duration;
            self.paused = true;
            return true;
        }
        if self.time < 0.0 {
            self.time = 0.0;
            self.paused = true;
            return true;
        }
        false
    }

    pub fn seek(&mut self, time: f32) {
        self.time = time.clamp(0.0, self.clip.duration);
    }

    /// Writes the sampled pose into the scene.
    pub fn apply(&mut self, scene: &mut Scene) {
        if !self.enabled {
            return;
        }
        let time = self.time;

        for binding in &self.bindings {
            let Some(track) = self.clip.tracks.get(binding.track_index) else {
                continue;
            };
            let Some(cursor) = self.track_cursors.get_mut(binding.track_index) else {
                continue;
            };
            let (rest_position, rest_rotation) = binding.rest.unwrap_or((Vec3::ZERO, Quat::IDENTITY));

            match (&track.data, binding.target) {
                (TrackData::Vector3(t), TargetPath::Translation) => {
                    if let Some(value) = t.sample_with_cursor(time, cursor)
                        && let Some(node) = scene.get_node_mut(binding.node)
                    {
                        node.transform.position = rest_position + value;
                    }
                }
                (TrackData::Quaternion(t), TargetPath::Rotation) => {
                    if let Some(value) = t.sample_with_cursor(time, cursor)
                        && let Some(node) = scene.get_node_mut(binding.node)
                    {
                        node.transform.rotation = (rest_rotation * value).normalize();
                    }
                }
                (TrackData::Scalar(t), TargetPath::MorphWeight) => {
                    if let Some(weight) = t.sample_with_cursor(time, cursor)
                        && let Some(mesh) = scene.get_mesh_mut(binding.node)
                    {
                        mesh.set_morph_weight(&track.meta.target_name, weight);
                    }
                }
                _ => {}
            }
        }
    }
}
