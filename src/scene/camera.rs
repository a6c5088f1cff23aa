use std::borrow::Cow;

use glam::{Affine3A, Mat4, Vec3};
use uuid::Uuid;

/// Which of the two stage viewpoints a camera is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraKind {
    /// Free arc-rotate camera driven by pointer input.
    Orbit,
    /// Camera whose path is authored alongside the motions.
    Scripted,
}

#[derive(Debug, Clone)]
pub struct Camera {
    pub uuid: Uuid,
    pub name: Cow<'static, str>,
    pub kind: CameraKind,

    // === 投影属性 ===
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// Movement speed used by the camera's own input handling.
    pub speed: f32,

    pub(crate) world_matrix: Affine3A,
    pub(crate) view_matrix: Mat4,
    pub(crate) projection_matrix: Mat4,
}

impl Camera {
    /// Perspective camera; `fov` in degrees.
    #[must_use]
    pub fn new_perspective(kind: CameraKind, fov: f32, near: f32, far: f32) -> Self {
        let mut cam = Self {
            uuid: Uuid::new_v4(),
            name: Cow::Borrowed(match kind {
                CameraKind::Orbit => "OrbitCamera",
                CameraKind::Scripted => "ScriptedCamera",
            }),
            kind,
            fov: fov.to_radians(),
            aspect: 16.0 / 9.0,
            near,
            far,
            speed: 1.0,

            world_matrix: Affine3A::IDENTITY,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
        };
        cam.update_projection_matrix();
        cam
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection_matrix = Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far);
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if height == 0 {
            return;
        }
        #[allow(clippy::cast_precision_loss)]
        {
            self.aspect = width as f32 / height as f32;
        }
        self.update_projection_matrix();
    }

    pub(crate) fn update_view(&mut self, world_transform: &Affine3A) {
        self.world_matrix = *world_transform;
        self.view_matrix = Mat4::from(*world_transform).inverse();
    }

    #[inline]
    #[must_use]
    pub fn world_position(&self) -> Vec3 {
        self.world_matrix.translation.into()
    }

    #[inline]
    #[must_use]
    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    #[must_use]
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix
    }
}
