use glam::{Affine3A, EulerRot, Mat3, Quat, Vec3};

/// Transform component.
///
/// Position, rotation and scale (TRS) plus cached matrices and dirty tracking.
/// A frozen transform keeps its cached local matrix and ignores TRS edits until thawed;
/// its world matrix still follows the parent.
#[derive(Debug, Clone)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,

    pub(crate) local_matrix: Affine3A,
    pub(crate) world_matrix: Affine3A,

    last_position: Vec3,
    last_rotation: Quat,
    last_scale: Vec3,
    force_update: bool,
    frozen: bool,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,

            local_matrix: Affine3A::IDENTITY,
            world_matrix: Affine3A::IDENTITY,

            last_position: Vec3::ZERO,
            last_rotation: Quat::IDENTITY,
            last_scale: Vec3::ONE,
            force_update: true,
            frozen: false,
        }
    }

    /// Builds a transform from a position, Euler rotation (radians, yaw-pitch-roll) and scale.
    #[must_use]
    pub fn from_euler(position: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        let mut t = Self::new();
        t.position = position;
        t.set_rotation_euler(rotation.x, rotation.y, rotation.z);
        t.scale = scale;
        t
    }

    /// Recomputes the local matrix if TRS changed since the last call.
    /// Returns whether it changed.
    pub fn update_local_matrix(&mut self) -> bool {
        if self.frozen {
            return std::mem::take(&mut self.force_update);
        }

        let changed = self.position != self.last_position
            || self.rotation != self.last_rotation
            || self.scale != self.last_scale
            || self.force_update;

        if changed {
            self.local_matrix =
                Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.position);

            self.last_position = self.position;
            self.last_rotation = self.rotation;
            self.last_scale = self.scale;
            self.force_update = false;
        }

        changed
    }

    /// Sets rotation from per-axis angles in radians, applied yaw (y), pitch (x), roll (z).
    pub fn set_rotation_euler(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = Quat::from_euler(EulerRot::YXZ, y, x, z);
    }

    /// Inverse of [`set_rotation_euler`](Self::set_rotation_euler), as `(x, y, z)`.
    #[must_use]
    pub fn rotation_euler(&self) -> Vec3 {
        let (y, x, z) = self.rotation.to_euler(EulerRot::YXZ);
        Vec3::new(x, y, z)
    }

    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> &Affine3A {
        &self.local_matrix
    }

    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.world_matrix
    }

    #[inline]
    #[must_use]
    pub fn world_position(&self) -> Vec3 {
        self.world_matrix.translation.into()
    }

    pub fn set_world_matrix(&mut self, mat: Affine3A) {
        self.world_matrix = mat;
    }

    /// Points -Z at `target`, expressed in the parent's space.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let forward = (target - self.position).normalize_or_zero();

        if forward.cross(up).length_squared() < 1e-4 {
            return;
        }

        let right = forward.cross(up).normalize();
        let new_up = right.cross(forward).normalize();

        let rot_mat = Mat3::from_cols(right, new_up, -forward);
        self.rotation = Quat::from_mat3(&rot_mat);
    }

    /// Stops local matrix recomputation; the current TRS is baked in.
    pub fn freeze(&mut self) {
        // a pending change must still reach the world matrix on the next pass
        self.force_update = self.update_local_matrix();
        self.frozen = true;
    }

    pub fn unfreeze(&mut self) {
        self.frozen = false;
        self.force_update = true;
    }

    #[inline]
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn mark_dirty(&mut self) {
        self.force_update = true;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
