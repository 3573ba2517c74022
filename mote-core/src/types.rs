//! Core value types for the particle kernel.
//!
//! All units are SI:
//! - Position: meters (m)
//! - Velocity: meters per second (m/s)
//! - Force: Newtons (N)
//! - Mass: kilograms (kg)

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::error::PhysicsError;

/// Scalar precision used throughout the kernel.
pub type Real = f64;

// =============================================================================
// Vec3 - 3D Vector
// =============================================================================

/// A 3D vector used for positions, velocities, accelerations, and forces.
///
/// Coordinate convention: Y is the vertical axis (positive upward), which is
/// what the buoyancy generator assumes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: Real,
    pub y: Real,
    pub z: Real,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: Real, y: Real, z: Real) -> Self {
        Self { x, y, z }
    }

    /// Squared magnitude (avoids sqrt for comparisons)
    pub fn magnitude_squared(&self) -> Real {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Magnitude (length) of the vector
    pub fn magnitude(&self) -> Real {
        self.magnitude_squared().sqrt()
    }

    /// Scales this vector to unit length in place.
    ///
    /// The zero vector has no direction and is left unchanged.
    pub fn normalize(&mut self) {
        let mag = self.magnitude();
        if mag > 0.0 {
            *self /= mag;
        }
    }

    /// Returns a unit vector in the same direction, or zero if magnitude is zero
    pub fn normalized(&self) -> Self {
        let mut out = *self;
        out.normalize();
        out
    }

    /// Dot product
    pub fn dot(&self, other: &Self) -> Real {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product
    pub fn cross(&self, other: &Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Component-wise multiplication
    pub fn component_mul(&self, other: &Self) -> Self {
        Self {
            x: self.x * other.x,
            y: self.y * other.y,
            z: self.z * other.z,
        }
    }

    /// Flips the sign of every component in place.
    pub fn invert(&mut self) {
        self.x = -self.x;
        self.y = -self.y;
        self.z = -self.z;
    }

    /// Adds `other * scale` into this vector (fused accumulate).
    ///
    /// Equivalent to `*self += *other * scale`.
    pub fn add_scaled(&mut self, other: &Self, scale: Real) {
        self.x += other.x * scale;
        self.y += other.y * scale;
        self.z += other.z * scale;
    }

    /// Resets every component to zero.
    pub fn clear(&mut self) {
        *self = Self::ZERO;
    }
}

/// Builds a right-handed orthonormal basis from two vectors.
///
/// The first output is `a` normalized, the third is perpendicular to both
/// inputs, and the second is recomputed to be perpendicular to the other two.
///
/// # Errors
///
/// Returns [`PhysicsError::DegenerateBasis`] when `a` and `b` are parallel
/// (their cross product vanishes), since no unique basis exists.
pub fn make_orthonormal_basis(a: &Vec3, b: &Vec3) -> Result<(Vec3, Vec3, Vec3), PhysicsError> {
    let e1 = a.normalized();
    let mut e3 = e1.cross(b);
    if e3.magnitude_squared() == 0.0 {
        return Err(PhysicsError::DegenerateBasis);
    }
    e3.normalize();
    let e2 = e3.cross(&e1);
    Ok((e1, e2, e3))
}

// Operator overloads for Vec3
impl Add for Vec3 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl SubAssign for Vec3 {
    fn sub_assign(&mut self, other: Self) {
        self.x -= other.x;
        self.y -= other.y;
        self.z -= other.z;
    }
}

impl Mul<Real> for Vec3 {
    type Output = Self;
    fn mul(self, scalar: Real) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }
}

impl MulAssign<Real> for Vec3 {
    fn mul_assign(&mut self, scalar: Real) {
        self.x *= scalar;
        self.y *= scalar;
        self.z *= scalar;
    }
}

impl Div<Real> for Vec3 {
    type Output = Self;
    fn div(self, scalar: Real) -> Self {
        Self {
            x: self.x / scalar,
            y: self.y / scalar,
            z: self.z / scalar,
        }
    }
}

impl DivAssign<Real> for Vec3 {
    fn div_assign(&mut self, scalar: Real) {
        self.x /= scalar;
        self.y /= scalar;
        self.z /= scalar;
    }
}

impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Self::ZERO
    }
}

// =============================================================================
// Physical Constants
// =============================================================================

/// Physical constants and kernel-wide defaults.
pub mod constants {
    use super::Real;

    /// Gravitational acceleration (m/s²)
    pub const GRAVITY: Real = 9.81;

    /// Fraction of velocity a particle retains per second when no explicit
    /// damping is configured. Slightly below 1 to bleed off integration drift.
    pub const DEFAULT_DAMPING: Real = 0.999;

    /// Small value for floating-point comparisons
    pub const EPSILON: Real = 1e-10;
}

// =============================================================================
// Tests
// =============================================================================
