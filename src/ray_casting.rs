//! Ray casting for mouse-based shape picking.
//!
//! This module provides CPU-based ray casting to detect whether the mouse
//! cursor is over a shape in the scene. Each shape is tested with a cheap
//! bounding box check first and then triangle by triangle in world space.

use nalgebra::{Matrix4, Point2, Point3, Vector3, Vector4};

use crate::camera::{Camera, Projection, view_projection};
use crate::scene::{Scene, ShapeInstance};
use crate::shapes::ShapeKind;

/// 3D ray for intersection testing
#[derive(Debug, Clone)]
pub(crate) struct Ray {
    /// Ray origin point in 3D space
    pub(crate) origin: Point3<f32>,
    /// Ray direction vector (normalized)
    pub(crate) direction: Vector3<f32>,
}

/// Axis-aligned bounding box in 3D space
#[derive(Debug, Clone)]
pub(crate) struct AABB {
    pub(crate) min: Point3<f32>,
    pub(crate) max: Point3<f32>,
}

impl AABB {
    /// World-space box enclosing a local-space box after `model` is applied
    pub(crate) fn transformed(min: Point3<f32>, max: Point3<f32>, model: &Matrix4<f32>) -> Self {
        let mut world_min = Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY);
        let mut world_max = Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY);
        for corner in 0..8 {
            let local = Point3::new(
                if corner & 1 == 0 { min.x } else { max.x },
                if corner & 2 == 0 { min.y } else { max.y },
                if corner & 4 == 0 { min.z } else { max.z },
            );
            let world = model.transform_point(&local);
            world_min = world_min.inf(&world);
            world_max = world_max.sup(&world);
        }
        Self {
            min: world_min,
            max: world_max,
        }
    }
}

/// A ray/shape intersection
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Hit {
    pub(crate) shape: ShapeKind,
    /// Distance along the ray to the closest intersected triangle
    pub(crate) distance: f32,
}

/// Calculate the ray from the camera through a point in normalized device coordinates.
///
/// Returns `None` when the view-projection matrix cannot be inverted.
pub(crate) fn calculate_mouse_ray(
    ndc: Point2<f32>,
    camera: &Camera,
    projection: &Projection,
) -> Option<Ray> {
    let inv_view_proj = view_projection(camera, projection).try_inverse()?;

    let ray_start_world = inv_view_proj * Vector4::new(ndc.x, ndc.y, -1.0, 1.0);
    let ray_end_world = inv_view_proj * Vector4::new(ndc.x, ndc.y, 1.0, 1.0);

    // Convert from homogeneous coordinates
    let ray_start = Point3::from_homogeneous(ray_start_world)?;
    let ray_end = Point3::from_homogeneous(ray_end_world)?;

    let direction = (ray_end - ray_start).try_normalize(f32::EPSILON)?;

    Some(Ray {
        origin: ray_start,
        direction,
    })
}

/// Test ray intersection with 3D axis-aligned bounding box using the slab method
///
/// Returns Some(distance) if the ray intersects the box, None otherwise.
pub(crate) fn ray_aabb_intersection(ray: &Ray, aabb: &AABB) -> Option<f32> {
    let inv_dir = Vector3::new(
        1.0 / ray.direction.x,
        1.0 / ray.direction.y,
        1.0 / ray.direction.z,
    );

    let t1 = (aabb.min.x - ray.origin.x) * inv_dir.x;
    let t2 = (aabb.max.x - ray.origin.x) * inv_dir.x;
    let t3 = (aabb.min.y - ray.origin.y) * inv_dir.y;
    let t4 = (aabb.max.y - ray.origin.y) * inv_dir.y;
    let t5 = (aabb.min.z - ray.origin.z) * inv_dir.z;
    let t6 = (aabb.max.z - ray.origin.z) * inv_dir.z;

    // tmin = where the ray enters the box, tmax = where it exits
    let tmin = t1.min(t2).max(t3.min(t4)).max(t5.min(t6));
    let tmax = t1.max(t2).min(t3.max(t4)).min(t5.max(t6));

    if tmax < 0.0 || tmin > tmax {
        None
    } else {
        Some(if tmin >= 0.0 { tmin } else { tmax })
    }
}

/// Test ray intersection with a triangle using the Möller-Trumbore algorithm.
///
/// Both faces count, matching the double-sided rendering.
pub(crate) fn ray_triangle_intersection(
    ray: &Ray,
    v0: Point3<f32>,
    v1: Point3<f32>,
    v2: Point3<f32>,
) -> Option<f32> {
    const EPSILON: f32 = 1e-8;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = ray.direction.cross(&edge2);
    let a = edge1.dot(&h);

    // Parallel to the triangle plane, or the triangle is degenerate
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;

    let u = f * s.dot(&h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(&edge1);
    let v = f * ray.direction.dot(&q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(&q);
    (t > EPSILON).then_some(t)
}

/// Closest intersection of the ray with one shape's transformed mesh
fn ray_shape_intersection(ray: &Ray, shape: &ShapeInstance) -> Option<f32> {
    let model = shape.model_matrix();
    let (min, max) = shape.mesh.bounds();
    ray_aabb_intersection(ray, &AABB::transformed(min, max, &model))?;

    shape
        .mesh
        .triangles()
        .filter_map(|[v0, v1, v2]| {
            ray_triangle_intersection(
                ray,
                model.transform_point(&v0),
                model.transform_point(&v1),
                model.transform_point(&v2),
            )
        })
        .min_by(f32::total_cmp)
}

/// Intersect the ray with every shape currently in the scene, nearest first.
pub(crate) fn intersect(ray: &Ray, scene: &Scene) -> Vec<Hit> {
    let mut hits: Vec<Hit> = scene
        .members()
        .filter_map(|shape| {
            ray_shape_intersection(ray, shape).map(|distance| Hit {
                shape: shape.kind,
                distance,
            })
        })
        .collect();
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

/// Whether the pointer at `ndc` is over any shape in the scene.
pub(crate) fn pointer_hits_scene(
    ndc: Point2<f32>,
    camera: &Camera,
    projection: &Projection,
    scene: &Scene,
) -> bool {
    let Some(ray) = calculate_mouse_ray(ndc, camera, projection) else {
        log::warn!("view-projection matrix is not invertible, treating press as a miss");
        return false;
    };
    match intersect(&ray, scene).first() {
        Some(nearest) => {
            log::debug!("pointer over {} at distance {:.3}", nearest.shape, nearest.distance);
            true
        }
        None => {
            log::debug!("hit test at ({:.3}, {:.3}) missed", ndc.x, ndc.y);
            false
        }
    }
}
