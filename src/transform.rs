//! Session-wide shape transform and its application to the active shape.

use nalgebra::{Matrix4, Rotation3, Vector2, Vector3};

/// Object mutations the per-frame apply step needs from a renderable shape.
pub(crate) trait ShapeHandle {
    /// Euler angles in radians, composed as X then Y then Z.
    fn set_rotation(&mut self, x: f32, y: f32, z: f32);
    fn set_scale(&mut self, scale: f32);
    fn set_wireframe(&mut self, wireframe: bool);
    fn set_position(&mut self, x: f32, y: f32);
}

/// Accumulated rotation, scale, translation and display mode.
///
/// Shared by every shape: switching the active shape keeps all fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TransformState {
    /// Rotation about the X axis in radians, driven by vertical drags
    pub(crate) vertical_angle: f32,
    /// Rotation about the Y axis in radians, driven by horizontal drags
    pub(crate) horizontal_angle: f32,
    /// Uniform scale; not clamped, zero and negative values are reachable
    pub(crate) scale: f32,
    /// Offset in the XY plane
    pub(crate) position: Vector2<f32>,
    pub(crate) wireframe: bool,
}

impl TransformState {
    pub(crate) fn new() -> Self {
        Self {
            vertical_angle: 0.0,
            horizontal_angle: 0.0,
            scale: 1.0,
            position: Vector2::zeros(),
            wireframe: false,
        }
    }

    pub(crate) fn toggle_wireframe(&mut self) {
        self.wireframe = !self.wireframe;
    }

    /// Push the whole state onto a shape. Runs every frame.
    pub(crate) fn apply_to(&self, shape: &mut impl ShapeHandle) {
        shape.set_rotation(self.vertical_angle, self.horizontal_angle, 0.0);
        shape.set_scale(self.scale);
        shape.set_position(self.position.x, self.position.y);
        shape.set_wireframe(self.wireframe);
    }
}

impl Default for TransformState {
    fn default() -> Self {
        Self::new()
    }
}

/// Rotation matrix for Euler angles applied in X, Y, Z order.
pub(crate) fn euler_xyz(x: f32, y: f32, z: f32) -> Rotation3<f32> {
    Rotation3::from_axis_angle(&Vector3::x_axis(), x)
        * Rotation3::from_axis_angle(&Vector3::y_axis(), y)
        * Rotation3::from_axis_angle(&Vector3::z_axis(), z)
}

/// Model matrix: translate * rotate * scale
pub(crate) fn model_matrix(
    rotation: &Rotation3<f32>,
    scale: f32,
    position: Vector3<f32>,
) -> Matrix4<f32> {
    Matrix4::new_translation(&position) * rotation.to_homogeneous() * Matrix4::new_scaling(scale)
}
