//! Spatial math primitives
//!
//! Vectors, rotators and quaternions in the target engine's conventions:
//! left-handed, Z-up, angles in degrees, double-precision world coordinates.

mod matrix;

pub use matrix::Matrix4;

use bytemuck::{Pod, Zeroable};
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// A 2D point in viewport pixel space
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector2 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
}

impl Vector2 {
    /// Construct from components
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance between two screen points
    pub fn distance(self, other: Self) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A 3D vector matching the target's `double[3]` layout
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Vector3 {
    /// X component
    pub x: f64,
    /// Y component
    pub y: f64,
    /// Z component
    pub z: f64,
}

impl Vector3 {
    /// The zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Construct from components
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Dot product
    #[inline]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Euclidean length
    #[inline]
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Euclidean distance to `other`
    pub fn distance(self, other: Self) -> f64 {
        (other - self).length()
    }

    /// Scale to unit length in place. A zero vector is left unchanged.
    pub fn normalize(&mut self) {
        let len = self.length();
        if len > 0.0 {
            self.x /= len;
            self.y /= len;
            self.z /= len;
        }
    }

    /// Unit-length copy; zero stays zero
    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// True when every component is exactly zero (the fail-soft "absent" value)
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }
}

impl Add for Vector3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vector3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vector3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for Vector3 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul<f64> for Vector3 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vector3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// Pitch/yaw/roll in degrees
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rotator {
    /// Degrees, positive looks up
    pub pitch: f64,
    /// Degrees around the vertical axis
    pub yaw: f64,
    /// Degrees around the forward axis
    pub roll: f64,
}

impl Rotator {
    /// Construct from components
    pub const fn new(pitch: f64, yaw: f64, roll: f64) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Orientation looking along `direction`
    ///
    /// Yaw comes from the horizontal plane, pitch from the vertical component
    /// over the horizontal magnitude. Roll cannot be recovered from a
    /// direction and is zero.
    pub fn from_direction(direction: Vector3) -> Self {
        let yaw = direction.y.atan2(direction.x).to_degrees();
        let pitch = direction
            .z
            .atan2(direction.x.hypot(direction.y))
            .to_degrees();

        Self::new(pitch, yaw, 0.0)
    }

    /// Pack as `(pitch, yaw, roll)`, the layout the camera stores
    pub fn to_vector(self) -> Vector3 {
        Vector3::new(self.pitch, self.yaw, self.roll)
    }
}

/// Rotation quaternion as stored by the target
///
/// Taken verbatim from memory; never normalized or validated here.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Quat {
    /// X component
    pub x: f64,
    /// Y component
    pub y: f64,
    /// Z component
    pub z: f64,
    /// Scalar part
    pub w: f64,
}

impl Quat {
    /// Identity
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Construct from components
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation of `degrees` around the Z (up) axis
    pub fn from_yaw(degrees: f64) -> Self {
        let (s, c) = (degrees.to_radians() / 2.0).sin_cos();
        Self::new(0.0, 0.0, s, c)
    }
}
