//! Utah teapot control data.
//!
//! Ten bicubic Bezier patches describe one quadrant of the rim, body, lid and
//! bottom, and one half of the handle and spout. Mirroring fills in the rest,
//! giving 32 patches. The data is Z-up with the base at z = 0 and the lid knob
//! at z = 3.15.

use nalgebra::{Point3, Vector3};

/// Height of the teapot in control-data units
const HEIGHT: f32 = 3.15;

/// Patches mirrored into all four quadrants; the rest only across the XZ plane.
const QUADRANT_PATCHES: usize = 6;

#[rustfmt::skip]
const PATCHES: [[usize; 16]; 10] = [
    // rim
    [102, 103, 104, 105, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
    // body
    [12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27],
    [24, 25, 26, 27, 29, 30, 31, 32, 33, 34, 35, 36, 37, 38, 39, 40],
    // lid
    [96, 96, 96, 96, 97, 98, 99, 100, 101, 101, 101, 101, 0, 1, 2, 3],
    [0, 1, 2, 3, 106, 107, 108, 109, 110, 111, 112, 113, 114, 115, 116, 117],
    // bottom
    [118, 118, 118, 118, 124, 122, 119, 121, 123, 126, 125, 120, 40, 39, 38, 37],
    // handle
    [41, 42, 43, 44, 45, 46, 47, 48, 49, 50, 51, 52, 53, 54, 55, 56],
    [53, 54, 55, 56, 57, 58, 59, 60, 61, 62, 63, 64, 28, 65, 66, 67],
    // spout
    [68, 69, 70, 71, 72, 73, 74, 75, 76, 77, 78, 79, 80, 81, 82, 83],
    [80, 81, 82, 83, 84, 85, 86, 87, 88, 89, 90, 91, 92, 93, 94, 95],
];

#[rustfmt::skip]
const CONTROL_POINTS: [[f32; 3]; 127] = [
    [0.2, 0.0, 2.7], [0.2, -0.112, 2.7], [0.112, -0.2, 2.7], [0.0, -0.2, 2.7],
    [1.3375, 0.0, 2.53125], [1.3375, -0.749, 2.53125], [0.749, -1.3375, 2.53125], [0.0, -1.3375, 2.53125],
    [1.4375, 0.0, 2.53125], [1.4375, -0.805, 2.53125], [0.805, -1.4375, 2.53125], [0.0, -1.4375, 2.53125],
    [1.5, 0.0, 2.4], [1.5, -0.84, 2.4], [0.84, -1.5, 2.4], [0.0, -1.5, 2.4],
    [1.75, 0.0, 1.875], [1.75, -0.98, 1.875], [0.98, -1.75, 1.875], [0.0, -1.75, 1.875],
    [2.0, 0.0, 1.35], [2.0, -1.12, 1.35], [1.12, -2.0, 1.35], [0.0, -2.0, 1.35],
    [2.0, 0.0, 0.9], [2.0, -1.12, 0.9], [1.12, -2.0, 0.9], [0.0, -2.0, 0.9],
    [-2.0, 0.0, 0.9],
    [2.0, 0.0, 0.45], [2.0, -1.12, 0.45], [1.12, -2.0, 0.45], [0.0, -2.0, 0.45],
    [1.5, 0.0, 0.225], [1.5, -0.84, 0.225], [0.84, -1.5, 0.225], [0.0, -1.5, 0.225],
    [1.5, 0.0, 0.15], [1.5, -0.84, 0.15], [0.84, -1.5, 0.15], [0.0, -1.5, 0.15],
    [-1.6, 0.0, 2.025], [-1.6, -0.3, 2.025], [-1.5, -0.3, 2.25], [-1.5, 0.0, 2.25],
    [-2.3, 0.0, 2.025], [-2.3, -0.3, 2.025], [-2.5, -0.3, 2.25], [-2.5, 0.0, 2.25],
    [-2.7, 0.0, 2.025], [-2.7, -0.3, 2.025], [-3.0, -0.3, 2.25], [-3.0, 0.0, 2.25],
    [-2.7, 0.0, 1.8], [-2.7, -0.3, 1.8], [-3.0, -0.3, 1.8], [-3.0, 0.0, 1.8],
    [-2.7, 0.0, 1.575], [-2.7, -0.3, 1.575], [-3.0, -0.3, 1.35], [-3.0, 0.0, 1.35],
    [-2.5, 0.0, 1.125], [-2.5, -0.3, 1.125], [-2.65, -0.3, 0.9375], [-2.65, 0.0, 0.9375],
    [-2.0, -0.3, 0.9], [-1.9, -0.3, 0.6], [-1.9, 0.0, 0.6],
    [1.7, 0.0, 1.425], [1.7, -0.66, 1.425], [1.7, -0.66, 0.6], [1.7, 0.0, 0.6],
    [2.6, 0.0, 1.425], [2.6, -0.66, 1.425], [3.1, -0.66, 0.825], [3.1, 0.0, 0.825],
    [2.3, 0.0, 2.1], [2.3, -0.25, 2.1], [2.4, -0.25, 2.025], [2.4, 0.0, 2.025],
    [2.7, 0.0, 2.4], [2.7, -0.25, 2.4], [3.3, -0.25, 2.4], [3.3, 0.0, 2.4],
    [2.8, 0.0, 2.475], [2.8, -0.25, 2.475], [3.525, -0.25, 2.49375], [3.525, 0.0, 2.49375],
    [2.9, 0.0, 2.475], [2.9, -0.15, 2.475], [3.45, -0.15, 2.5125], [3.45, 0.0, 2.5125],
    [2.8, 0.0, 2.4], [2.8, -0.15, 2.4], [3.2, -0.15, 2.4], [3.2, 0.0, 2.4],
    [0.0, 0.0, 3.15], [0.8, 0.0, 3.15], [0.8, -0.45, 3.15], [0.45, -0.8, 3.15],
    [0.0, -0.8, 3.15], [0.0, 0.0, 2.85],
    [1.4, 0.0, 2.4], [1.4, -0.784, 2.4], [0.784, -1.4, 2.4], [0.0, -1.4, 2.4],
    [0.4, 0.0, 2.55], [0.4, -0.224, 2.55], [0.224, -0.4, 2.55], [0.0, -0.4, 2.55],
    [1.3, 0.0, 2.55], [1.3, -0.728, 2.55], [0.728, -1.3, 2.55], [0.0, -1.3, 2.55],
    [1.3, 0.0, 2.4], [1.3, -0.728, 2.4], [0.728, -1.3, 2.4], [0.0, -1.3, 2.4],
    [0.0, 0.0, 0.0], [1.425, -0.798, 0.0], [1.5, 0.0, 0.075], [1.425, 0.0, 0.0],
    [0.798, -1.425, 0.0], [0.0, -1.5, 0.075], [0.0, -1.425, 0.0], [1.5, -0.84, 0.075],
    [0.84, -1.5, 0.075],
];

/// 4x4 control grid; rows advance along v, columns along u.
pub(crate) type Patch = [[Point3<f32>; 4]; 4];

/// Every teapot patch, Y-up and centred so the height spans `-size..=size`.
///
/// Mirrored copies reverse their columns when an odd number of axes flip so
/// all patches keep the same orientation.
pub(crate) fn patches(size: f32) -> Vec<Patch> {
    let half_height = HEIGHT * 0.5;
    let scale = size / half_height;

    let mut patches = Vec::with_capacity(32);
    for (i, indices) in PATCHES.iter().enumerate() {
        let mirrors: &[(f32, f32)] = if i < QUADRANT_PATCHES {
            &[(1.0, 1.0), (1.0, -1.0), (-1.0, 1.0), (-1.0, -1.0)]
        } else {
            &[(1.0, 1.0), (1.0, -1.0)]
        };

        for &(sx, sy) in mirrors {
            let reversed = sx * sy < 0.0;
            let mut patch = [[Point3::origin(); 4]; 4];
            for (row, points) in patch.iter_mut().enumerate() {
                for (col, point) in points.iter_mut().enumerate() {
                    let source = if reversed { 3 - col } else { col };
                    let [x, y, z] = CONTROL_POINTS[indices[row * 4 + source]];
                    // Z-up to Y-up; adding 0.0 folds -0.0 so mirrored seams match bitwise
                    *point = Point3::new(
                        x * sx * scale + 0.0,
                        (z - half_height) * scale,
                        -y * sy * scale + 0.0,
                    );
                }
            }
            patches.push(patch);
        }
    }
    patches
}

fn bernstein(t: f32) -> [f32; 4] {
    let s = 1.0 - t;
    [s * s * s, 3.0 * t * s * s, 3.0 * t * t * s, t * t * t]
}

fn bernstein_derivative(t: f32) -> [f32; 4] {
    let s = 1.0 - t;
    [
        -3.0 * s * s,
        3.0 * s * s - 6.0 * t * s,
        6.0 * t * s - 3.0 * t * t,
        3.0 * t * t,
    ]
}

fn blend(patch: &Patch, bu: [f32; 4], bv: [f32; 4]) -> Vector3<f32> {
    let mut sum = Vector3::zeros();
    for (row, points) in patch.iter().enumerate() {
        for (col, point) in points.iter().enumerate() {
            sum += point.coords * (bv[row] * bu[col]);
        }
    }
    sum
}

/// Surface point at `(u, v)`.
pub(crate) fn evaluate(patch: &Patch, u: f32, v: f32) -> Point3<f32> {
    Point3::from(blend(patch, bernstein(u), bernstein(v)))
}

/// Unnormalized `dP/du x dP/dv` at `(u, v)`; zero where a patch edge collapses to a point.
pub(crate) fn tangent_normal(patch: &Patch, u: f32, v: f32) -> Vector3<f32> {
    let du = blend(patch, bernstein_derivative(u), bernstein(v));
    let dv = blend(patch, bernstein(u), bernstein_derivative(v));
    du.cross(&dv)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirroring_yields_thirty_two_patches() {
        assert_eq!(patches(1.0).len(), 32);
    }

    #[test]
    fn patch_corners_interpolate_control_points() {
        for patch in patches(1.0) {
            assert_eq!(evaluate(&patch, 0.0, 0.0), patch[0][0]);
            assert!((evaluate(&patch, 1.0, 1.0) - patch[3][3]).norm() < 1e-6);
        }
    }

    #[test]
    fn lid_knob_collapses_to_a_point() {
        let lid = patches(1.0)[3 * 4];
        assert!(tangent_normal(&lid, 0.5, 0.0).norm() < 1e-6);
        assert!(tangent_normal(&lid, 0.5, 0.1).norm() > 1e-6);
        assert!((lid[0][0].y - 1.0).abs() < 1e-6);
    }
}
