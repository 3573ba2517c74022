//! Error types for kernel operations.
//!
//! Two failure classes exist. Programmer-contract violations (non-positive
//! time step, zero mass through the mass setter, a degenerate basis request)
//! surface as errors from the call that hit them. Degenerate-but-meaningful
//! inputs (zero requested inverse mass, out-of-range damping, a fake spring
//! with a non-positive discriminant) are normalized to documented sentinels
//! instead and never reach this enum.

use thiserror::Error;

/// Errors that can occur during kernel operations.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PhysicsError {
    /// Mass must be nonzero and finite; immovable objects are expressed
    /// through inverse mass instead.
    #[error("mass must be nonzero and finite")]
    InvalidMass,

    /// The particle has zero inverse mass, so its mass is unrepresentable.
    #[error("particle has infinite mass (inverse mass is zero)")]
    InfiniteMass,

    /// Integration and force application require a positive time step.
    #[error("time step must be positive, got {dt}")]
    InvalidTimeStep { dt: f64 },

    /// Orthonormal basis construction from parallel vectors.
    #[error("cannot build an orthonormal basis from parallel vectors")]
    DegenerateBasis,

    /// A handle referred to a particle not present in the set.
    #[error("particle index {index} out of bounds (count: {count})")]
    UnknownParticle { index: usize, count: usize },
}
