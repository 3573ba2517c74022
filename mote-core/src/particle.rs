//! Point-mass particles and their semi-implicit integrator.
//!
//! A [`Particle`] stores kinematics plus a per-step force accumulator. Force
//! generators sum forces into the accumulator during a step; [`Particle::integrate`]
//! turns the accumulated force into motion and clears the accumulator.
//!
//! Mass is stored inverted. This keeps the hot path free of divisions and
//! lets an immovable object be represented exactly as `inverse_mass == 0`
//! instead of an infinity.
//!
//! Particles live in a [`ParticleSet`] arena and are referred to by
//! [`ParticleHandle`]. Handles are plain indices: they stay valid for the
//! lifetime of the set and carry no ownership.

use serde::{Deserialize, Serialize};

use crate::error::PhysicsError;
use crate::types::{constants, Real, Vec3};

// =============================================================================
// Particle
// =============================================================================

/// A point mass with position, velocity, and a per-step force accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    position: Vec3,
    velocity: Vec3,
    acceleration: Vec3,

    /// Reciprocal of mass; exactly `0` means immovable.
    inverse_mass: Real,

    /// Fraction of velocity retained per second, in `(0, 1)`.
    damping: Real,

    /// Sum of forces applied since the last integration.
    force_accum: Vec3,
}

impl Default for Particle {
    /// Zero kinematics, unit inverse mass, default damping.
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            inverse_mass: 1.0,
            damping: constants::DEFAULT_DAMPING,
            force_accum: Vec3::ZERO,
        }
    }
}

impl Particle {
    /// Creates a particle at rest at `position` with unit mass.
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Creates a particle with full initial kinematics.
    ///
    /// A zero `mass` is substituted with the smallest positive inverse mass
    /// (practically infinite mass) rather than rejected, keeping the
    /// particle on the finite-mass code paths. Damping outside `(0, 1)`
    /// falls back to [`constants::DEFAULT_DAMPING`].
    pub fn with_state(position: Vec3, velocity: Vec3, mass: Real, damping: Real) -> Self {
        let mut p = Self::new(position);
        p.velocity = velocity;
        p.inverse_mass = if mass == 0.0 {
            Real::MIN_POSITIVE
        } else {
            1.0 / mass
        };
        p.set_damping(damping);
        p
    }

    // position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    // velocity
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    // acceleration
    pub fn acceleration(&self) -> Vec3 {
        self.acceleration
    }

    pub fn set_acceleration(&mut self, acceleration: Vec3) {
        self.acceleration = acceleration;
    }

    /// Mass derived from the stored inverse.
    ///
    /// # Errors
    ///
    /// [`PhysicsError::InfiniteMass`] when the particle is immovable.
    pub fn mass(&self) -> Result<Real, PhysicsError> {
        if self.inverse_mass == 0.0 {
            Err(PhysicsError::InfiniteMass)
        } else {
            Ok(1.0 / self.inverse_mass)
        }
    }

    /// Sets the mass.
    ///
    /// # Errors
    ///
    /// [`PhysicsError::InvalidMass`] for zero or non-finite mass. Infinite
    /// mass is expressed through [`Particle::make_immovable`], never through
    /// this setter.
    pub fn set_mass(&mut self, mass: Real) -> Result<(), PhysicsError> {
        if mass == 0.0 || !mass.is_finite() {
            return Err(PhysicsError::InvalidMass);
        }
        self.inverse_mass = 1.0 / mass;
        Ok(())
    }

    pub fn inverse_mass(&self) -> Real {
        self.inverse_mass
    }

    /// Sets the inverse mass directly.
    ///
    /// A zero or negative request denotes "practically infinite mass" and is
    /// coerced to the smallest positive value, keeping finite-mass code paths
    /// alive. True immovability goes through [`Particle::make_immovable`].
    pub fn set_inverse_mass(&mut self, inverse_mass: Real) {
        self.inverse_mass = if inverse_mass <= 0.0 {
            Real::MIN_POSITIVE
        } else {
            inverse_mass
        };
    }

    /// Marks the particle as immovable (`inverse_mass == 0`). Integration
    /// ignores accumulated force and contacts treat it as infinite mass.
    pub fn make_immovable(&mut self) {
        self.inverse_mass = 0.0;
    }

    /// Whether the particle has finite mass.
    pub fn has_finite_mass(&self) -> bool {
        self.inverse_mass > 0.0
    }

    // damping
    pub fn damping(&self) -> Real {
        self.damping
    }

    /// Sets the per-second velocity retention factor.
    ///
    /// Values outside `(0, 1)` are substituted with
    /// [`constants::DEFAULT_DAMPING`]; damping of exactly 1 or 0 would either
    /// never bleed energy or freeze the particle.
    pub fn set_damping(&mut self, damping: Real) {
        self.damping = if damping > 0.0 && damping < 1.0 {
            damping
        } else {
            constants::DEFAULT_DAMPING
        };
    }

    /// Accumulates a force for the next integration step.
    ///
    /// Has no immediate effect on motion.
    pub fn add_force(&mut self, force: Vec3) {
        self.force_accum += force;
    }

    /// The force accumulated so far this step.
    pub fn force_accum(&self) -> Vec3 {
        self.force_accum
    }

    /// Drops all accumulated force.
    pub fn clear_accumulator(&mut self) {
        self.force_accum.clear();
    }

    /// Advances the particle by `dt` seconds and returns the new position.
    ///
    /// For a finite-mass particle, acceleration is recomputed from the force
    /// accumulator, position advances by the second-order Taylor expansion
    /// `v·dt + a·dt²/2`, and velocity by `a·dt`. An immovable particle keeps
    /// zero acceleration and drifts by `v·dt` only.
    ///
    /// Damping applies as `damping^dt`, a continuous-time decay, so splitting
    /// a step into substeps yields the same retention as one large step.
    /// The accumulator is cleared unconditionally.
    ///
    /// # Errors
    ///
    /// [`PhysicsError::InvalidTimeStep`] for `dt <= 0`; callers must supply a
    /// positive step.
    pub fn integrate(&mut self, dt: Real) -> Result<Vec3, PhysicsError> {
        if dt <= 0.0 {
            return Err(PhysicsError::InvalidTimeStep { dt });
        }

        if self.inverse_mass > 0.0 {
            self.acceleration = self.force_accum * self.inverse_mass;
            self.position += self.velocity * dt + self.acceleration * (dt * dt / 2.0);
            self.velocity += self.acceleration * dt;
        } else {
            self.acceleration = Vec3::ZERO;
            self.position += self.velocity * dt;
        }

        self.velocity *= self.damping.powf(dt);

        self.clear_accumulator();

        Ok(self.position)
    }
}

// =============================================================================
// ParticleSet
// =============================================================================

/// Non-owning reference to a particle in a [`ParticleSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticleHandle(usize);

impl ParticleHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Arena holding every particle of a simulation.
///
/// The registry and contact code refer to particles by [`ParticleHandle`]
/// instead of references, which keeps associations non-owning and lets two
/// particles be mutated within one operation.
#[derive(Debug, Default, Clone)]
pub struct ParticleSet {
    particles: Vec<Particle>,
}

impl ParticleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a particle and returns its handle. Handles are never invalidated;
    /// the set only grows.
    pub fn insert(&mut self, particle: Particle) -> ParticleHandle {
        let handle = ParticleHandle(self.particles.len());
        self.particles.push(particle);
        handle
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn get(&self, handle: ParticleHandle) -> Result<&Particle, PhysicsError> {
        self.particles
            .get(handle.0)
            .ok_or(PhysicsError::UnknownParticle {
                index: handle.0,
                count: self.particles.len(),
            })
    }

    pub fn get_mut(&mut self, handle: ParticleHandle) -> Result<&mut Particle, PhysicsError> {
        let count = self.particles.len();
        self.particles
            .get_mut(handle.0)
            .ok_or(PhysicsError::UnknownParticle {
                index: handle.0,
                count,
            })
    }

    /// Mutable access to two distinct particles at once.
    ///
    /// # Errors
    ///
    /// [`PhysicsError::UnknownParticle`] if either handle is out of bounds or
    /// the handles alias the same slot.
    pub fn get_disjoint_mut(
        &mut self,
        a: ParticleHandle,
        b: ParticleHandle,
    ) -> Result<(&mut Particle, &mut Particle), PhysicsError> {
        let count = self.particles.len();
        let oob = |index: usize| PhysicsError::UnknownParticle { index, count };
        if a.0 >= count {
            return Err(oob(a.0));
        }
        if b.0 >= count || a.0 == b.0 {
            return Err(oob(b.0));
        }

        if a.0 < b.0 {
            let (lo, hi) = self.particles.split_at_mut(b.0);
            Ok((&mut lo[a.0], &mut hi[0]))
        } else {
            let (lo, hi) = self.particles.split_at_mut(a.0);
            Ok((&mut hi[0], &mut lo[b.0]))
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Particle> {
        self.particles.iter_mut()
    }

    pub fn handles(&self) -> impl Iterator<Item = ParticleHandle> {
        (0..self.particles.len()).map(ParticleHandle)
    }

    /// Integrates every particle by `dt`.
    ///
    /// # Errors
    ///
    /// [`PhysicsError::InvalidTimeStep`] for `dt <= 0`; no particle is
    /// touched in that case.
    pub fn integrate_all(&mut self, dt: Real) -> Result<(), PhysicsError> {
        if dt <= 0.0 {
            return Err(PhysicsError::InvalidTimeStep { dt });
        }
        for particle in &mut self.particles {
            particle.integrate(dt)?;
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
