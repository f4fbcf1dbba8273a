//! 4x4 homogeneous matrices
//!
//! Row-vector convention: points are transformed as `p * M`, so the
//! translation lives in the last row and composition reads left to right.

use super::Vector3;
use bytemuck::{Pod, Zeroable};
use std::ops::Mul;

/// Row-major 4x4 homogeneous transform
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Matrix4 {
    /// Rows of the matrix
    pub m: [[f64; 4]; 4],
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix4 {
    /// Identity
    pub const IDENTITY: Self = Self {
        m: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Build from explicit rows
    pub const fn from_rows(m: [[f64; 4]; 4]) -> Self {
        Self { m }
    }

    /// Rotation matrix from `(pitch, yaw, roll)` in degrees
    ///
    /// Rows 0..3 are the local forward (X), right (Y) and up (Z) axes; row 3
    /// holds `origin`. The last column is fixed to `(0, 0, 0, 1)`.
    pub fn from_rotation(rotation: Vector3, origin: Vector3) -> Self {
        let (sp, cp) = rotation.x.to_radians().sin_cos();
        let (sy, cy) = rotation.y.to_radians().sin_cos();
        let (sr, cr) = rotation.z.to_radians().sin_cos();

        Self::from_rows([
            [cp * cy, cp * sy, sp, 0.0],
            [sr * sp * cy - cr * sy, sr * sp * sy + cr * cy, -sr * cp, 0.0],
            [-(cr * sp * cy + sr * sy), cy * sr - cr * sp * sy, cr * cp, 0.0],
            [origin.x, origin.y, origin.z, 1.0],
        ])
    }

    /// First three components of `row`
    #[inline]
    pub fn axis(&self, row: usize) -> Vector3 {
        let r = self.m[row];
        Vector3::new(r[0], r[1], r[2])
    }

    /// Translation stored in the last row
    #[inline]
    pub fn translation(&self) -> Vector3 {
        self.axis(3)
    }

    /// Transform a point (`w = 1`)
    pub fn transform_point(&self, p: Vector3) -> Vector3 {
        let m = &self.m;
        Vector3::new(
            p.x * m[0][0] + p.y * m[1][0] + p.z * m[2][0] + m[3][0],
            p.x * m[0][1] + p.y * m[1][1] + p.z * m[2][1] + m[3][1],
            p.x * m[0][2] + p.y * m[1][2] + p.z * m[2][2] + m[3][2],
        )
    }
}

impl Mul for Matrix4 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let mut out = [[0.0; 4]; 4];

        for (i, row) in out.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.m[i][k] * rhs.m[k][j]).sum();
            }
        }

        Self::from_rows(out)
    }
}
