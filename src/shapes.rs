//! Predefined shape geometry.
//!
//! Every shape is generated on the CPU as an indexed triangle mesh centred at
//! the origin. The same mesh feeds the GPU buffers and the CPU ray casting.

use std::collections::BTreeSet;
use std::f32::consts::{PI, TAU};

use nalgebra::{Point3, Vector3};

use crate::teapot;

/// The shapes the viewer cycles through, in cycling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ShapeKind {
    Triangle,
    Torus,
    Sphere,
    Icosahedron,
    Teapot,
    Box,
    Cone,
}

impl ShapeKind {
    pub(crate) const ALL: [ShapeKind; 7] = [
        ShapeKind::Triangle,
        ShapeKind::Torus,
        ShapeKind::Sphere,
        ShapeKind::Icosahedron,
        ShapeKind::Teapot,
        ShapeKind::Box,
        ShapeKind::Cone,
    ];

    pub(crate) fn mesh(self) -> Mesh {
        match self {
            ShapeKind::Triangle => Mesh::triangle(),
            ShapeKind::Torus => Mesh::torus(1.0, 0.4, 16, 100),
            ShapeKind::Sphere => Mesh::sphere(1.0, 64, 64),
            ShapeKind::Icosahedron => Mesh::icosahedron(1.0),
            ShapeKind::Teapot => Mesh::teapot(1.0, 10),
            ShapeKind::Box => Mesh::cuboid(1.0, 1.0, 1.0),
            ShapeKind::Cone => Mesh::cone(1.0, 1.0, 32),
        }
    }
}

impl std::fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShapeKind::Triangle => write!(f, "Triangle"),
            ShapeKind::Torus => write!(f, "Torus"),
            ShapeKind::Sphere => write!(f, "Sphere"),
            ShapeKind::Icosahedron => write!(f, "Icosahedron"),
            ShapeKind::Teapot => write!(f, "Teapot"),
            ShapeKind::Box => write!(f, "Box"),
            ShapeKind::Cone => write!(f, "Cone"),
        }
    }
}

/// GPU vertex layout: position followed by normal.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct Vertex {
    pub(crate) position: [f32; 3],
    pub(crate) normal: [f32; 3],
}

/// Indexed triangle mesh.
#[derive(Debug, Clone, Default)]
pub(crate) struct Mesh {
    pub(crate) vertices: Vec<Vertex>,
    /// Triangle list, three indices per face
    pub(crate) indices: Vec<u32>,
}

impl Mesh {
    fn push_vertex(&mut self, position: Point3<f32>, normal: Vector3<f32>) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(Vertex {
            position: position.into(),
            normal: normal.into(),
        });
        index
    }

    fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Push a triangle with its own three vertices sharing the face normal.
    fn push_flat_triangle(&mut self, a: Point3<f32>, b: Point3<f32>, c: Point3<f32>) {
        let normal = (b - a).cross(&(c - a)).normalize();
        let ia = self.push_vertex(a, normal);
        let ib = self.push_vertex(b, normal);
        let ic = self.push_vertex(c, normal);
        self.push_triangle(ia, ib, ic);
    }

    pub(crate) fn triangle() -> Self {
        let mut mesh = Self::default();
        mesh.push_flat_triangle(
            Point3::new(0.0, 1.5, 0.0),
            Point3::new(-1.0, 0.5, 0.0),
            Point3::new(1.0, -0.5, 0.0),
        );
        mesh
    }

    /// Ring torus lying in the XY plane.
    pub(crate) fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Self {
        let mut mesh = Self::default();

        for j in 0..=radial_segments {
            let v = j as f32 / radial_segments as f32 * TAU;
            for i in 0..=tubular_segments {
                let u = i as f32 / tubular_segments as f32 * TAU;
                let position = Point3::new(
                    (radius + tube * v.cos()) * u.cos(),
                    (radius + tube * v.cos()) * u.sin(),
                    tube * v.sin(),
                );
                let center = Point3::new(radius * u.cos(), radius * u.sin(), 0.0);
                mesh.push_vertex(position, (position - center).normalize());
            }
        }

        let row = tubular_segments + 1;
        for j in 1..=radial_segments {
            for i in 1..=tubular_segments {
                let a = row * j + i - 1;
                let b = row * (j - 1) + i - 1;
                let c = row * (j - 1) + i;
                let d = row * j + i;
                mesh.push_triangle(a, b, d);
                mesh.push_triangle(b, c, d);
            }
        }

        mesh
    }

    /// UV sphere; the degenerate triangles at the poles are skipped.
    pub(crate) fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let mut mesh = Self::default();

        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;
            for ix in 0..=width_segments {
                let u = ix as f32 / width_segments as f32;
                let position = Point3::new(
                    -radius * (u * TAU).cos() * (v * PI).sin(),
                    radius * (v * PI).cos(),
                    radius * (u * TAU).sin() * (v * PI).sin(),
                );
                mesh.push_vertex(position, position.coords.normalize());
            }
        }

        let row = width_segments + 1;
        for iy in 0..height_segments {
            for ix in 0..width_segments {
                let a = iy * row + ix + 1;
                let b = iy * row + ix;
                let c = (iy + 1) * row + ix;
                let d = (iy + 1) * row + ix + 1;
                if iy != 0 {
                    mesh.push_triangle(a, b, d);
                }
                if iy != height_segments - 1 {
                    mesh.push_triangle(b, c, d);
                }
            }
        }

        mesh
    }

    /// Flat-shaded regular icosahedron with vertices on a sphere of `radius`.
    pub(crate) fn icosahedron(radius: f32) -> Self {
        let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
        #[rustfmt::skip]
        let corners = [
            [-1.0, t, 0.0], [1.0, t, 0.0], [-1.0, -t, 0.0], [1.0, -t, 0.0],
            [0.0, -1.0, t], [0.0, 1.0, t], [0.0, -1.0, -t], [0.0, 1.0, -t],
            [t, 0.0, -1.0], [t, 0.0, 1.0], [-t, 0.0, -1.0], [-t, 0.0, 1.0],
        ];
        #[rustfmt::skip]
        const FACES: [[usize; 3]; 20] = [
            [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
            [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
            [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
            [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
        ];

        let points: Vec<Point3<f32>> = corners
            .iter()
            .map(|&[x, y, z]| Point3::from(Vector3::new(x, y, z).normalize() * radius))
            .collect();

        let mut mesh = Self::default();
        for [a, b, c] in FACES {
            mesh.push_flat_triangle(points[a], points[b], points[c]);
        }
        mesh
    }

    /// Utah teapot tessellated into a `segments` x `segments` grid per Bezier patch.
    pub(crate) fn teapot(size: f32, segments: u32) -> Self {
        let mut mesh = Self::default();
        let step = 1.0 / segments as f32;
        let stride = segments + 1;

        for patch in teapot::patches(size) {
            let base = mesh.vertices.len() as u32;
            for j in 0..=segments {
                let v = j as f32 * step;
                for i in 0..=segments {
                    let u = i as f32 * step;
                    let mut normal = teapot::tangent_normal(&patch, u, v);
                    if normal.norm() < 1e-6 {
                        // Collapsed edge at the knob and base centre: sample just inside it
                        let inset = step * 0.01;
                        normal = teapot::tangent_normal(
                            &patch,
                            u.clamp(inset, 1.0 - inset),
                            v.clamp(inset, 1.0 - inset),
                        );
                    }
                    let normal = normal.try_normalize(1e-12).unwrap_or_else(Vector3::y);
                    mesh.push_vertex(teapot::evaluate(&patch, u, v), normal);
                }
            }

            for j in 0..segments {
                for i in 0..segments {
                    let a = base + j * stride + i;
                    let b = a + 1;
                    let c = a + stride;
                    let d = c + 1;
                    mesh.push_triangle(a, b, c);
                    mesh.push_triangle(b, d, c);
                }
            }
        }

        mesh
    }

    /// Axis-aligned box with one quad per face.
    pub(crate) fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let half = Vector3::new(width, height, depth) * 0.5;
        let mut mesh = Self::default();

        // (normal, u, v) with u and v spanning the face
        let faces: [(Vector3<f32>, Vector3<f32>, Vector3<f32>); 6] = [
            (Vector3::x(), Vector3::z(), Vector3::y()),
            (-Vector3::x(), Vector3::y(), Vector3::z()),
            (Vector3::y(), Vector3::x(), Vector3::z()),
            (-Vector3::y(), Vector3::z(), Vector3::x()),
            (Vector3::z(), Vector3::y(), Vector3::x()),
            (-Vector3::z(), Vector3::x(), Vector3::y()),
        ];

        for (normal, u, v) in faces {
            let u = u * u.cross(&v).dot(&normal).signum();
            let center = normal.component_mul(&half);
            let du = u.component_mul(&half);
            let dv = v.component_mul(&half);
            let corners = [
                center - du - dv,
                center + du - dv,
                center + du + dv,
                center - du + dv,
            ];
            let base = mesh.vertices.len() as u32;
            for corner in corners {
                mesh.push_vertex(Point3::from(corner), normal);
            }
            mesh.push_triangle(base, base + 1, base + 2);
            mesh.push_triangle(base, base + 2, base + 3);
        }

        mesh
    }

    /// Cone with its apex on +Y and a closed base.
    pub(crate) fn cone(radius: f32, height: f32, radial_segments: u32) -> Self {
        let mut mesh = Self::default();
        let half_height = height * 0.5;
        let slope = radius / height;

        for i in 0..radial_segments {
            let theta0 = i as f32 / radial_segments as f32 * TAU;
            let theta1 = (i + 1) as f32 / radial_segments as f32 * TAU;
            let theta_mid = (theta0 + theta1) * 0.5;

            let side_normal =
                |theta: f32| Vector3::new(theta.sin(), slope, theta.cos()).normalize();
            let ring = |theta: f32| {
                Point3::new(radius * theta.sin(), -half_height, radius * theta.cos())
            };

            let apex = mesh.push_vertex(Point3::new(0.0, half_height, 0.0), side_normal(theta_mid));
            let b0 = mesh.push_vertex(ring(theta0), side_normal(theta0));
            let b1 = mesh.push_vertex(ring(theta1), side_normal(theta1));
            mesh.push_triangle(apex, b0, b1);

            let down = -Vector3::y();
            let center = mesh.push_vertex(Point3::new(0.0, -half_height, 0.0), down);
            let c0 = mesh.push_vertex(ring(theta0), down);
            let c1 = mesh.push_vertex(ring(theta1), down);
            mesh.push_triangle(center, c1, c0);
        }

        mesh
    }

    #[cfg(test)]
    pub(crate) fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Triangles as triples of local-space points
    pub(crate) fn triangles(&self) -> impl Iterator<Item = [Point3<f32>; 3]> + '_ {
        self.indices.chunks_exact(3).map(|face| {
            [
                Point3::from(self.vertices[face[0] as usize].position),
                Point3::from(self.vertices[face[1] as usize].position),
                Point3::from(self.vertices[face[2] as usize].position),
            ]
        })
    }

    /// Local-space bounding box as (min, max).
    pub(crate) fn bounds(&self) -> (Point3<f32>, Point3<f32>) {
        let mut min = Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY);
        let mut max = Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY);
        for vertex in &self.vertices {
            let p = Point3::from(vertex.position);
            min = min.inf(&p);
            max = max.sup(&p);
        }
        (min, max)
    }

    /// Unique triangle edges as a line list, for wireframe drawing.
    ///
    /// Vertices that share a position but not a normal are merged so seams
    /// in flat-shaded meshes do not double up.
    pub(crate) fn edge_indices(&self) -> Vec<u32> {
        let key = |index: u32| {
            let [x, y, z] = self.vertices[index as usize].position;
            (x.to_bits(), y.to_bits(), z.to_bits())
        };
        let mut canonical = std::collections::HashMap::new();
        let mut representative = |index: u32| *canonical.entry(key(index)).or_insert(index);

        let mut edges = BTreeSet::new();
        for face in self.indices.chunks_exact(3) {
            let [a, b, c] = [
                representative(face[0]),
                representative(face[1]),
                representative(face[2]),
            ];
            for (from, to) in [(a, b), (b, c), (c, a)] {
                if from != to {
                    edges.insert((from.min(to), from.max(to)));
                }
            }
        }

        edges.into_iter().flat_map(|(from, to)| [from, to]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_well_formed(kind: ShapeKind) {
        let mesh = kind.mesh();
        assert!(!mesh.vertices.is_empty(), "{kind} has no vertices");
        assert_eq!(mesh.indices.len() % 3, 0, "{kind} has a partial triangle");
        assert!(
            mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()),
            "{kind} indexes past its vertices"
        );
        for vertex in &mesh.vertices {
            let length = Vector3::from(vertex.normal).norm();
            assert!((length - 1.0).abs() < 1e-3, "{kind} has a non-unit normal");
        }
    }

    #[test]
    fn every_shape_is_well_formed() {
        for kind in ShapeKind::ALL {
            assert_well_formed(kind);
        }
    }

    #[test]
    fn triangle_matches_its_corners() {
        let mesh = Mesh::triangle();
        assert_eq!(mesh.triangle_count(), 1);
        let (min, max) = mesh.bounds();
        assert_eq!(min, Point3::new(-1.0, -0.5, 0.0));
        assert_eq!(max, Point3::new(1.0, 1.5, 0.0));
    }

    #[test]
    fn face_counts_match_segment_counts() {
        assert_eq!(Mesh::torus(1.0, 0.4, 16, 100).triangle_count(), 2 * 16 * 100);
        // Pole rows contribute one triangle per segment instead of two.
        assert_eq!(Mesh::sphere(1.0, 64, 64).triangle_count(), 2 * 64 * 64 - 2 * 64);
        assert_eq!(Mesh::icosahedron(1.0).triangle_count(), 20);
        assert_eq!(Mesh::cuboid(1.0, 1.0, 1.0).triangle_count(), 12);
        assert_eq!(Mesh::cone(1.0, 1.0, 32).triangle_count(), 64);
        assert_eq!(Mesh::teapot(1.0, 10).triangle_count(), 32 * 10 * 10 * 2);
    }

    #[test]
    fn teapot_spans_unit_height_with_handle_and_spout() {
        let (min, max) = Mesh::teapot(1.0, 6).bounds();
        assert!((max.y - 1.0).abs() < 1e-4);
        assert!((min.y + 1.0).abs() < 1e-4);
        // Handle edge sits at x = -3 in the control data
        assert!((min.x + 3.0 / 1.575).abs() < 1e-4);
        assert!(max.x > -min.x, "spout should reach further than the handle");
        assert!((min.z + max.z).abs() < 1e-4, "teapot is symmetric front to back");
    }

    #[test]
    fn teapot_normals_follow_triangle_winding() {
        let mesh = Mesh::teapot(1.0, 8);
        let mut agreeing = 0;
        let mut total = 0;
        for (face, [a, b, c]) in mesh.triangles().enumerate() {
            let winding = (b - a).cross(&(c - a));
            if winding.norm() < 1e-8 {
                continue;
            }
            let normal = Vector3::from(mesh.vertices[mesh.indices[face * 3] as usize].normal);
            total += 1;
            if winding.dot(&normal) > 0.0 {
                agreeing += 1;
            }
        }
        assert!(agreeing * 100 >= total * 95, "{agreeing} of {total} faces agree");
    }

    #[test]
    fn box_faces_wind_outwards() {
        let mesh = Mesh::cuboid(1.0, 2.0, 3.0);
        for (face, [a, b, c]) in mesh.triangles().enumerate() {
            let winding = (b - a).cross(&(c - a));
            let normal = Vector3::from(mesh.vertices[mesh.indices[face * 3] as usize].normal);
            assert!(winding.dot(&normal) > 0.0);
        }
        let (min, max) = mesh.bounds();
        assert_eq!(min, Point3::new(-0.5, -1.0, -1.5));
        assert_eq!(max, Point3::new(0.5, 1.0, 1.5));
    }

    #[test]
    fn sphere_and_torus_stay_within_their_radius() {
        let (min, max) = Mesh::sphere(1.0, 16, 16).bounds();
        assert!(min.coords.min() >= -1.0 - 1e-5);
        assert!(max.coords.max() <= 1.0 + 1e-5);

        let (min, max) = Mesh::torus(1.0, 0.4, 8, 24).bounds();
        assert!((max.x - 1.4).abs() < 1e-5);
        assert!((min.z + 0.4).abs() < 1e-2);
    }

    #[test]
    fn icosahedron_edges_are_shared() {
        // A closed icosahedron has 30 unique edges even though every face is flat shaded.
        assert_eq!(Mesh::icosahedron(1.0).edge_indices().len(), 30 * 2);
        assert_eq!(Mesh::triangle().edge_indices().len(), 3 * 2);
        assert_eq!(Mesh::cuboid(1.0, 1.0, 1.0).edge_indices().len(), 18 * 2);
    }
}
