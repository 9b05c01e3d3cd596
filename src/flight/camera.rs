//! # Camera Rig
//!
//! The camera transform written by the flight session and read by the
//! renderer. Orientation is a quaternion; the camera looks down its local
//! `-Z` axis with `+Y` up (right-handed, like `glam`'s `look_at_rh`).

use glam::{Mat4, Quat, Vec3};

/// Degenerate cross products below this squared length fall back to a fixed axis.
pub const DEGENERATE_EPSILON: f32 = 1e-6;

/// Camera transform with projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub position: Vec3,
    pub rotation: Quat,
    /// Orbit/look-at point that travels with the camera, if one is tracked.
    pub target: Option<Vec3>,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::looking_at(Vec3::new(0.0, 40.0, 120.0), Vec3::ZERO)
    }
}

impl CameraRig {
    /// Camera at `position` looking at `target`, which it then tracks.
    #[must_use]
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            rotation: orientation_towards(target - position),
            target: Some(target),
            fov: 60.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 5000.0,
        }
    }

    /// Camera with an explicit orientation and no tracked target.
    #[must_use]
    pub fn with_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            rotation,
            target: None,
            ..Self::looking_at(position, position + Vec3::NEG_Z)
        }
    }

    /// Unit look direction.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        (self.rotation * Vec3::NEG_Z).normalize_or_zero()
    }

    /// Moves the camera, and its tracked target, by `delta`.
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
        if let Some(target) = self.target.as_mut() {
            *target += delta;
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position).inverse()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Rotation that points the camera's `-Z` axis along `direction`, keeping `+Y` up.
///
/// A zero direction yields the identity. Straight up or down uses `+Z` as the
/// up hint instead.
#[must_use]
pub fn orientation_towards(direction: Vec3) -> Quat {
    let dir = direction.normalize_or_zero();
    if dir == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    let up = if dir.cross(Vec3::Y).length_squared() < DEGENERATE_EPSILON {
        Vec3::Z
    } else {
        Vec3::Y
    };
    Quat::from_mat4(&Mat4::look_to_rh(Vec3::ZERO, dir, up).inverse()).normalize()
}
