//! Three-component vector used throughout the force model and integrators.
//!
//! Every operation returns a new value except [`Vector3::accumulate`], which
//! adds in place and exists for the hot accumulation loops of the force passes.

use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// A 3D vector of `f64` components, in metres or m/s depending on context.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    /// Build a vector from its components.
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The zero vector.
    #[inline]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Dot product with another vector.
    #[inline]
    pub fn dot(&self, other: Vector3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product with another vector.
    #[inline]
    pub fn cross(&self, other: Vector3) -> Vector3 {
        Vector3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Squared Euclidean norm.
    #[inline]
    pub fn norm_squared(&self) -> f64 {
        self.dot(*self)
    }

    /// Euclidean norm.
    #[inline]
    pub fn norm(&self) -> f64 {
        self.norm_squared().sqrt()
    }

    /// Squared Euclidean distance to another point.
    #[inline]
    pub fn distance_squared(&self, other: Vector3) -> f64 {
        (other - *self).norm_squared()
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(&self, other: Vector3) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Unit vector in the direction of `self`.
    ///
    /// Returns the zero vector when the magnitude is exactly zero; callers that
    /// need a genuine unit vector near coincident points must guard themselves.
    pub fn normalize(&self) -> Vector3 {
        let magnitude = self.norm();
        if magnitude == 0.0 {
            Vector3::zero()
        } else {
            *self * (1.0 / magnitude)
        }
    }

    /// Unit vector pointing from `self` toward `to`.
    #[inline]
    pub fn direction_to(&self, to: Vector3) -> Vector3 {
        (to - *self).normalize()
    }

    /// Add another vector in place.
    #[inline]
    pub fn accumulate(&mut self, other: Vector3) {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
    }

    /// Rotate about the x-axis by an angle in radians.
    pub fn rotate_x_rad(&self, angle_rad: f64) -> Vector3 {
        let (sin, cos) = angle_rad.sin_cos();
        Vector3::new(
            self.x,
            self.y * cos - self.z * sin,
            self.y * sin + self.z * cos,
        )
    }

    /// Rotate about the y-axis by an angle in radians.
    pub fn rotate_y_rad(&self, angle_rad: f64) -> Vector3 {
        let (sin, cos) = angle_rad.sin_cos();
        Vector3::new(
            self.x * cos + self.z * sin,
            self.y,
            self.z * cos - self.x * sin,
        )
    }

    /// Rotate about the z-axis by an angle in radians.
    pub fn rotate_z_rad(&self, angle_rad: f64) -> Vector3 {
        let (sin, cos) = angle_rad.sin_cos();
        Vector3::new(
            self.x * cos - self.y * sin,
            self.x * sin + self.y * cos,
            self.z,
        )
    }

    /// Rotate about the x-axis by an angle in degrees.
    #[inline]
    pub fn rotate_x_deg(&self, angle_deg: f64) -> Vector3 {
        self.rotate_x_rad(angle_deg.to_radians())
    }

    /// Rotate about the y-axis by an angle in degrees.
    #[inline]
    pub fn rotate_y_deg(&self, angle_deg: f64) -> Vector3 {
        self.rotate_y_rad(angle_deg.to_radians())
    }

    /// Rotate about the z-axis by an angle in degrees.
    #[inline]
    pub fn rotate_z_deg(&self, angle_deg: f64) -> Vector3 {
        self.rotate_z_rad(angle_deg.to_radians())
    }

    /// Express this vector in the basis spanned by `vx`, `vy`, `vz`.
    ///
    /// The components of `self` weight the supplied basis vectors, so passing
    /// the standard basis returns the vector unchanged.
    pub fn rotate_basis(&self, vx: Vector3, vy: Vector3, vz: Vector3) -> Vector3 {
        vx * self.x + vy * self.y + vz * self.z
    }
}

impl Add for Vector3 {
    type Output = Vector3;

    #[inline]
    fn add(self, other: Vector3) -> Vector3 {
        Vector3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Vector3 {
    type Output = Vector3;

    #[inline]
    fn sub(self, other: Vector3) -> Vector3 {
        Vector3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Neg for Vector3 {
    type Output = Vector3;

    #[inline]
    fn neg(self) -> Vector3 {
        Vector3::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Vector3;

    #[inline]
    fn mul(self, scalar: f64) -> Vector3 {
        Vector3::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

impl Mul<Vector3> for f64 {
    type Output = Vector3;

    #[inline]
    fn mul(self, vector: Vector3) -> Vector3 {
        vector * self
    }
}
