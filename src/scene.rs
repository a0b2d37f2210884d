//! The rendered scene: every predefined shape, of which only members are drawn and hit-tested.

use nalgebra::{Matrix4, Rotation3, Vector3};

use crate::selection::SceneMembership;
use crate::shapes::{Mesh, ShapeKind};
use crate::transform::{ShapeHandle, euler_xyz, model_matrix};

/// One shape with its own copy of the transform last applied to it.
#[derive(Debug, Clone)]
pub(crate) struct ShapeInstance {
    pub(crate) kind: ShapeKind,
    pub(crate) mesh: Mesh,
    rotation: Rotation3<f32>,
    scale: f32,
    position: Vector3<f32>,
    wireframe: bool,
}

impl ShapeInstance {
    pub(crate) fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            mesh: kind.mesh(),
            rotation: Rotation3::identity(),
            scale: 1.0,
            position: Vector3::zeros(),
            wireframe: false,
        }
    }

    pub(crate) fn model_matrix(&self) -> Matrix4<f32> {
        model_matrix(&self.rotation, self.scale, self.position)
    }

    /// Rotates normals with the shape; a negative scale mirrors them.
    pub(crate) fn normal_matrix(&self) -> Matrix4<f32> {
        self.rotation.to_homogeneous() * self.scale.signum()
    }

    pub(crate) fn wireframe(&self) -> bool {
        self.wireframe
    }
}

impl ShapeHandle for ShapeInstance {
    fn set_rotation(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = euler_xyz(x, y, z);
    }

    fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }

    fn set_wireframe(&mut self, wireframe: bool) {
        self.wireframe = wireframe;
    }

    fn set_position(&mut self, x: f32, y: f32) {
        self.position.x = x;
        self.position.y = y;
    }
}

/// Fixed set of shapes plus the subset currently in the scene.
#[derive(Debug, Clone)]
pub(crate) struct Scene {
    shapes: Vec<ShapeInstance>,
    members: Vec<ShapeKind>,
}

impl Scene {
    pub(crate) fn new(kinds: &[ShapeKind]) -> Self {
        Self {
            shapes: kinds.iter().map(|&kind| ShapeInstance::new(kind)).collect(),
            members: Vec::new(),
        }
    }

    pub(crate) fn shape(&self, kind: ShapeKind) -> Option<&ShapeInstance> {
        self.shapes.iter().find(|shape| shape.kind == kind)
    }

    pub(crate) fn shape_mut(&mut self, kind: ShapeKind) -> Option<&mut ShapeInstance> {
        self.shapes.iter_mut().find(|shape| shape.kind == kind)
    }

    /// Shapes currently in the scene, in insertion order
    pub(crate) fn members(&self) -> impl Iterator<Item = &ShapeInstance> {
        self.members.iter().filter_map(|&kind| self.shape(kind))
    }
}

impl SceneMembership<ShapeKind> for Scene {
    fn add(&mut self, object: ShapeKind) {
        if !self.members.contains(&object) {
            self.members.push(object);
        }
    }

    fn remove(&mut self, object: ShapeKind) {
        self.members.retain(|&member| member != object);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::SelectionRegistry;
    use crate::transform::TransformState;

    #[test]
    fn only_the_active_shape_is_a_member() {
        let mut scene = Scene::new(&ShapeKind::ALL);
        let mut registry = SelectionRegistry::from(ShapeKind::ALL);
        registry.activate_initial(&mut scene);

        for _ in 0..ShapeKind::ALL.len() + 2 {
            let active = registry.advance(&mut scene);
            let members: Vec<ShapeKind> = scene.members().map(|shape| shape.kind).collect();
            assert_eq!(members, vec![active]);
        }
    }

    #[test]
    fn switching_shapes_keeps_the_transform() {
        let mut scene = Scene::new(&ShapeKind::ALL);
        let mut registry = SelectionRegistry::from(ShapeKind::ALL);
        registry.activate_initial(&mut scene);

        let mut state = TransformState::new();
        state.vertical_angle = 0.7;
        state.scale = -0.5;
        state.position.x = 1.25;
        state.toggle_wireframe();
        let before = state;

        let first = registry.active();
        state.apply_to(scene.shape_mut(first).unwrap());
        let next = registry.advance(&mut scene);
        state.apply_to(scene.shape_mut(next).unwrap());

        assert_eq!(state, before);
        let first_model = scene.shape(first).unwrap().model_matrix();
        let next_shape = scene.shape(next).unwrap();
        assert!((next_shape.model_matrix() - first_model).norm() < 1e-6);
        assert!(next_shape.wireframe());
    }

    #[test]
    fn membership_ignores_duplicates() {
        let mut scene = Scene::new(&ShapeKind::ALL);
        scene.add(ShapeKind::Sphere);
        scene.add(ShapeKind::Sphere);
        assert_eq!(scene.members().count(), 1);
        scene.remove(ShapeKind::Sphere);
        assert_eq!(scene.members().count(), 0);
    }
}
