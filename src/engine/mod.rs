//! Unreal Engine structure layouts
//!
//! Fixed-layout mirrors of the target's in-memory structures. Every type
//! here is `Pod`, so it can be read straight out of remote memory and a
//! failed read degrades to the all-zero value.

pub mod world;

use crate::math::{Matrix4, Quat, Vector3};
use bytemuck::{Pod, Zeroable};

/// `FTransform` (double precision, 16-byte aligned vectors)
///
/// The padding fields reproduce the target's alignment so the struct can be
/// read in one piece and indexed inside remote arrays.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Transform {
    /// Rotation relative to the parent frame
    pub rotation: Quat,
    /// Translation relative to the parent frame
    pub translation: Vector3,
    _pad0: [u8; 8],
    /// Per-axis scale
    pub scale: Vector3,
    _pad1: [u8; 8],
}

impl Transform {
    /// No rotation, no translation, unit scale
    pub const IDENTITY: Self = Self::new(
        Quat::IDENTITY,
        Vector3::ZERO,
        Vector3::new(1.0, 1.0, 1.0),
    );

    /// Construct from components
    pub const fn new(rotation: Quat, translation: Vector3, scale: Vector3) -> Self {
        Self {
            rotation,
            translation,
            _pad0: [0; 8],
            scale,
            _pad1: [0; 8],
        }
    }

    /// Identity rotation and unit scale at `translation`
    pub const fn from_translation(translation: Vector3) -> Self {
        Self::new(Quat::IDENTITY, translation, Vector3::new(1.0, 1.0, 1.0))
    }

    /// Homogeneous matrix: quaternion rotation scaled per axis, translation
    /// in the last row
    pub fn to_matrix_with_scale(&self) -> Matrix4 {
        let Quat { x, y, z, w } = self.rotation;
        let s = self.scale;
        let t = self.translation;

        let (x2, y2, z2) = (x + x, y + y, z + z);
        let (xx2, yy2, zz2) = (x * x2, y * y2, z * z2);
        let (yz2, wx2) = (y * z2, w * x2);
        let (xy2, wz2) = (x * y2, w * z2);
        let (xz2, wy2) = (x * z2, w * y2);

        Matrix4::from_rows([
            [
                (1.0 - (yy2 + zz2)) * s.x,
                (xy2 + wz2) * s.x,
                (xz2 - wy2) * s.x,
                0.0,
            ],
            [
                (xy2 - wz2) * s.y,
                (1.0 - (xx2 + zz2)) * s.y,
                (yz2 + wx2) * s.y,
                0.0,
            ],
            [
                (xz2 + wy2) * s.z,
                (yz2 - wx2) * s.z,
                (1.0 - (xx2 + yy2)) * s.z,
                0.0,
            ],
            [t.x, t.y, t.z, 1.0],
        ])
    }
}

/// Camera point of view (`FMinimalViewInfo` prefix)
///
/// `rotation` is `(pitch, yaw, roll)` in degrees. Read fresh every frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Camera {
    /// World position of the camera
    pub location: Vector3,
    /// Pitch, yaw, roll in degrees
    pub rotation: Vector3,
    /// Horizontal field of view in degrees
    pub field_of_view: f32,
    _pad: [u8; 4],
}

impl Camera {
    /// Construct from components
    pub const fn new(location: Vector3, rotation: Vector3, field_of_view: f32) -> Self {
        Self {
            location,
            rotation,
            field_of_view,
            _pad: [0; 4],
        }
    }
}

/// `TArray` header: data pointer, element count, allocated capacity
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct RawArray {
    /// Remote address of the first element
    pub data: u64,
    /// Live elements
    pub count: i32,
    /// Allocated slots
    pub capacity: i32,
}
