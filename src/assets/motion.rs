//! Motion documents and clip composition.
//!
//! One named animation may be authored as several files (e.g. face and body separately).
//! Each file decodes to a [`MotionSource`]; [`compose_clip`] merges them into one
//! [`AnimationClip`]. Sources that animate the same bone or morph have their keyframes merged.

use glam::{Quat, Vec3};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::animation::{
    AnimationClip, InterpolationMode, KeyframeTrack, TargetPath, Track, TrackData, TrackMeta,
};
use crate::errors::AssetError;

const DEFAULT_FRAME_RATE: f32 = 30.0;

fn default_frame_rate() -> f32 {
    DEFAULT_FRAME_RATE
}

fn identity() -> Quat {
    Quat::IDENTITY
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    #[default]
    Linear,
    Step,
}

impl From<Interpolation> for InterpolationMode {
    fn from(value: Interpolation) -> Self {
        match value {
            Interpolation::Linear => InterpolationMode::Linear,
            Interpolation::Step => InterpolationMode::Step,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoneKeyframe {
    pub frame: u32,
    /// Offset from the bone's rest position.
    #[serde(default)]
    pub position: Vec3,
    /// Rotation applied on top of the rest rotation.
    #[serde(default = "identity")]
    pub rotation: Quat,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MorphKeyframe {
    pub frame: u32,
    pub weight: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneMotion {
    pub bone: String,
    pub keyframes: SmallVec<[BoneKeyframe; 8]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MorphMotion {
    pub morph: String,
    pub keyframes: SmallVec<[MorphKeyframe; 8]>,
}

/// One decoded motion file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionSource {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f32,
    #[serde(default)]
    pub interpolation: Interpolation,
    #[serde(default)]
    pub bones: Vec<BoneMotion>,
    #[serde(default)]
    pub morphs: Vec<MorphMotion>,
}

impl MotionSource {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AssetError> {
        let source: MotionSource = serde_json::from_slice(bytes)?;
        if !(source.frame_rate.is_finite() && source.frame_rate > 0.0) {
            return Err(AssetError::InvalidData(format!(
                "motion '{}' has invalid frame rate {}",
                source.name, source.frame_rate
            )));
        }
        Ok(source)
    }

    #[must_use]
    pub fn last_frame(&self) -> u32 {
        let bones = self.bones.iter().flat_map(|b| b.keyframes.iter().map(|k| k.frame));
        let morphs = self.morphs.iter().flat_map(|m| m.keyframes.iter().map(|k| k.frame));
        bones.chain(morphs).max().unwrap_or(0)
    }

    fn seconds(&self, frame: u32) -> f32 {
        frame as f32 / self.frame_rate
    }
}

/// Keys gathered for one bone or morph across every source.
struct KeyBucket<'a, T> {
    target: &'a str,
    mode: InterpolationMode,
    keys: Vec<(f32, T)>,
}

type BoneKey = (Vec3, Quat);

/// Appends `keys` to the bucket for `target`, creating it at the end of `buckets`.
fn collect_keys<'a, T>(
    buckets: &mut Vec<KeyBucket<'a, T>>,
    slots: &mut FxHashMap<&'a str, usize>,
    target: &'a str,
    mode: InterpolationMode,
    keys: impl Iterator<Item = (f32, T)>,
) {
    let slot = *slots.entry(target).or_insert_with(|| {
        buckets.push(KeyBucket {
            target,
            mode,
            keys: Vec::new(),
        });
        buckets.len() - 1
    });
    let bucket = &mut buckets[slot];
    bucket.mode = mode;
    bucket.keys.extend(keys);
}

/// Sorts by time; of several keys at the same time the last one collected survives.
fn merge_keys<T>(mut keys: Vec<(f32, T)>) -> (Vec<f32>, Vec<T>) {
    keys.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut merged: Vec<(f32, T)> = Vec::with_capacity(keys.len());
    for (time, value) in keys {
        match merged.last_mut() {
            Some(last) if last.0 == time => last.1 = value,
            _ => merged.push((time, value)),
        }
    }
    merged.into_iter().unzip()
}

/// Merges `sources` into one clip named `name`.
///
/// Keyframes for the same bone or morph are merged across sources and sorted by time; where two
/// sources key the same instant, the later source wins. Tracks keep first-appearance order and
/// use the interpolation of the last source that touched them.
#[must_use]
pub fn compose_clip(name: &str, sources: &[MotionSource]) -> AnimationClip {
    let mut bone_slots = FxHashMap::default();
    let mut morph_slots = FxHashMap::default();
    let mut bones: Vec<KeyBucket<'_, BoneKey>> = Vec::new();
    let mut morphs: Vec<KeyBucket<'_, f32>> = Vec::new();

    for source in sources {
        let mode = InterpolationMode::from(source.interpolation);
        for motion in source.bones.iter().filter(|m| !m.keyframes.is_empty()) {
            let keys = motion
                .keyframes
                .iter()
                .map(|k| (source.seconds(k.frame), (k.position, k.rotation.normalize())));
            collect_keys(&mut bones, &mut bone_slots, &motion.bone, mode, keys);
        }
        for motion in source.morphs.iter().filter(|m| !m.keyframes.is_empty()) {
            let keys = motion.keyframes.iter().map(|k| (source.seconds(k.frame), k.weight));
            collect_keys(&mut morphs, &mut morph_slots, &motion.morph, mode, keys);
        }
    }

    let mut tracks = Vec::with_capacity(bones.len() * 2 + morphs.len());
    for bucket in bones {
        let (times, values) = merge_keys(bucket.keys);
        let (positions, rotations): (Vec<Vec3>, Vec<Quat>) = values.into_iter().unzip();
        tracks.push(Track {
            meta: TrackMeta {
                target_name: bucket.target.to_string(),
                target: TargetPath::Translation,
            },
            data: TrackData::Vector3(KeyframeTrack::new(times.clone(), positions, bucket.mode)),
        });
        tracks.push(Track {
            meta: TrackMeta {
                target_name: bucket.target.to_string(),
                target: TargetPath::Rotation,
            },
            data: TrackData::Quaternion(KeyframeTrack::new(times, rotations, bucket.mode)),
        });
    }
    for bucket in morphs {
        let (times, weights) = merge_keys(bucket.keys);
        tracks.push(Track {
            meta: TrackMeta {
                target_name: bucket.target.to_string(),
                target: TargetPath::MorphWeight,
            },
            data: TrackData::Scalar(KeyframeTrack::new(times, weights, bucket.mode)),
        });
    }

    AnimationClip::new(name.to_string(), tracks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(json: &str) -> MotionSource {
        MotionSource::from_slice(json.as_bytes()).unwrap()
    }

    fn vector_track(clip: &AnimationClip, index: usize) -> &KeyframeTrack<Vec3> {
        match &clip.tracks[index].data {
            TrackData::Vector3(track) => track,
            _ => panic!("track {index} is not a translation track"),
        }
    }

    #[test]
    fn later_source_wins_per_bone() {
        let body = source(
            r#"{"bones":[{"bone":"arm","keyframes":[{"frame":0},{"frame":60,"position":[1,0,0]}]},
                         {"bone":"leg","keyframes":[{"frame":0},{"frame":30}]}]}"#,
        );
        let face = source(
            r#"{"frame_rate":60,"bones":[{"bone":"arm","keyframes":[{"frame":0,"position":[0,2,0]},{"frame":30}]}],
                "morphs":[{"morph":"smile","keyframes":[{"frame":0,"weight":0},{"frame":120,"weight":1}]}]}"#,
        );

        let clip = compose_clip("idle", &[body, face]);
        // arm (2) + leg (2) + smile (1)
        assert_eq!(clip.tracks.len(), 5);
        assert_eq!(clip.tracks[0].meta.target_name, "arm");

        // both files key the arm at t = 0; the face file is later
        let arm = vector_track(&clip, 0);
        assert_eq!(arm.times, [0.0, 0.5, 2.0]);
        assert_eq!(arm.values, [Vec3::new(0.0, 2.0, 0.0), Vec3::ZERO, Vec3::X]);
        // smile ends at 120 / 60 fps
        assert_eq!(clip.duration, 2.0);
    }

    #[test]
    fn disjoint_keys_on_one_bone_are_merged() {
        let first = source(r#"{"bones":[{"bone":"arm","keyframes":[{"frame":0},{"frame":30}]}]}"#);
        let second = source(
            r#"{"bones":[{"bone":"arm","keyframes":[{"frame":60,"position":[0,1,0]},{"frame":90}]}],
                "morphs":[{"morph":"blink","keyframes":[{"frame":45,"weight":1}]}]}"#,
        );
        let third = source(r#"{"morphs":[{"morph":"blink","keyframes":[{"frame":0,"weight":0}]}]}"#);

        let clip = compose_clip("wave", &[first, second, third]);

        assert_eq!(clip.tracks.len(), 3);
        assert_eq!(vector_track(&clip, 0).times, [0.0, 1.0, 2.0, 3.0]);
        assert_eq!(vector_track(&clip, 0).sample(1.5), Some(Vec3::new(0.0, 0.5, 0.0)));
        match &clip.tracks[2].data {
            TrackData::Scalar(blink) => {
                assert_eq!(blink.times, [0.0, 1.5]);
                assert_eq!(blink.values, [0.0, 1.0]);
            }
            _ => panic!("blink should be a morph track"),
        }
        assert_eq!(clip.duration, 3.0);
    }

    #[test]
    fn rejects_zero_frame_rate() {
        let err = MotionSource::from_slice(br#"{"frame_rate":0}"#).unwrap_err();
        assert!(matches!(err, AssetError::InvalidData(_)));
    }
}
