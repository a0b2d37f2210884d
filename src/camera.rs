use nalgebra::{Matrix4, Point3, Vector3};

use crate::config::ViewerConfig;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Camera {
    pub(crate) eye: Point3<f32>,
    pub(crate) target: Point3<f32>,
    pub(crate) up: Vector3<f32>,
}

impl Camera {
    /// Camera on the +Z axis looking at the origin
    pub(crate) fn looking_at_origin(distance: f32) -> Self {
        Self {
            eye: Point3::new(0.0, 0.0, distance),
            target: Point3::origin(),
            up: Vector3::y(),
        }
    }

    pub(crate) fn build_view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.eye, &self.target, &self.up)
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Projection {
    pub(crate) aspect: f32,
    /// Vertical field of view in degrees
    pub(crate) fovy: f32,
    pub(crate) znear: f32,
    pub(crate) zfar: f32,
}

impl Projection {
    pub(crate) fn new(config: &ViewerConfig, width: f32, height: f32) -> Self {
        let mut projection = Self {
            aspect: 1.0,
            fovy: config.fovy,
            znear: config.znear,
            zfar: config.zfar,
        };
        projection.resize(width, height);
        projection
    }

    pub(crate) fn resize(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    pub(crate) fn build_projection_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_perspective(self.aspect, self.fovy.to_radians(), self.znear, self.zfar)
    }
}

/// Combined projection * view matrix
pub(crate) fn view_projection(camera: &Camera, projection: &Projection) -> Matrix4<f32> {
    projection.build_projection_matrix() * camera.build_view_matrix()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_projects_to_viewport_centre() {
        let config = ViewerConfig::default();
        let camera = Camera::looking_at_origin(config.camera_distance);
        let projection = Projection::new(&config, 800.0, 600.0);

        let clip = view_projection(&camera, &projection).transform_point(&Point3::origin());

        assert!(clip.x.abs() < 1e-6);
        assert!(clip.y.abs() < 1e-6);
        assert!(clip.z > -1.0 && clip.z < 1.0);
    }

    #[test]
    fn degenerate_resize_keeps_aspect() {
        let mut projection = Projection::new(&ViewerConfig::default(), 800.0, 400.0);
        projection.resize(0.0, 100.0);
        assert_eq!(projection.aspect, 2.0);
    }
}
