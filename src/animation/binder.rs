use crate::animation::binding::{PropertyBinding, TargetPath};
use crate::animation::clip::AnimationClip;
use crate::scene::{NodeHandle, Scene, SkeletonKey};

pub struct Binder;

impl Binder {
    /// Resolves every track of `clip` against one model, by name.
    ///
    /// Transform tracks bind to the skeleton bone of the same name. Morph tracks bind to every
    /// mesh under `model_root` that declares the target. Unmatched tracks are skipped.
    #[must_use]
    pub fn bind(
        scene: &Scene,
        skeleton: SkeletonKey,
        model_root: NodeHandle,
        clip: &AnimationClip,
    ) -> Vec<PropertyBinding> {
        let mut bindings = Vec::with_capacity(clip.tracks.len());
        let skeleton = scene.skins.get(skeleton);
        let model_meshes: Vec<NodeHandle> = scene
            .descendants(model_root)
            .into_iter()
            .filter(|&h| scene.get_mesh(h).is_some())
            .collect();

        let mut skipped = 0usize;
        for (track_index, track) in clip.tracks.iter().enumerate() {
            let name = &track.meta.target_name;
            match track.meta.target {
                TargetPath::Translation | TargetPath::Rotation => {
                    let Some(skeleton) = skeleton else {
                        skipped += 1;
                        continue;
                    };
                    match skeleton.bone_index(name) {
                        Some(bone) => bindings.push(PropertyBinding {
                            track_index,
                            node: skeleton.bones[bone],
                            target: track.meta.target,
                            rest: skeleton.rest_pose(bone),
                        }),
                        None => skipped += 1,
                    }
                }
                TargetPath::MorphWeight => {
                    let before = bindings.len();
                    for &mesh_node in &model_meshes {
                        let declares = scene
                            .get_mesh(mesh_node)
                            .is_some_and(|m| m.morph_targets.iter().any(|t| t == name));
                        if declares {
                            bindings.push(PropertyBinding {
                                track_index,
                                node: mesh_node,
                                target: TargetPath::MorphWeight,
                                rest: None,
                            });
                        }
                    }
                    if bindings.len() == before {
                        skipped += 1;
                    }
                }
            }
        }

        if skipped > 0 {
            log::debug!("Clip '{}': {skipped} track(s) have no target in the model", clip.name);
        }
        bindings
    }
}
