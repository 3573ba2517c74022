//! Pairwise particle contacts and their iterative resolution.
//!
//! A [`ParticleContact`] describes a potential conflict between two particles
//! (or one particle and the immovable environment): who is involved, the
//! contact normal, how bouncy the collision is, and how deep any overlap is.
//! Contact generation — deciding *which* pairs are in contact — is the host's
//! job; this module only resolves the contacts it is handed.
//!
//! Resolution is split in two:
//! - **Velocity**: an impulse along the normal removes closing velocity,
//!   restoring a share of it according to restitution.
//! - **Interpenetration**: a direct positional correction separates the
//!   particles, split by inverse mass so heavier particles move less.
//!
//! The [`ParticleContactResolver`](resolver::ParticleContactResolver) applies
//! these one contact at a time, always the most urgent first, because
//! resolving one contact changes the separating velocity of every contact
//! sharing a particle.

pub mod resolver;

pub use resolver::ParticleContactResolver;

use crate::error::PhysicsError;
use crate::particle::{ParticleHandle, ParticleSet};
use crate::types::{Real, Vec3};

/// A contact between one or two particles.
///
/// `second == None` means a contact with the immovable environment (floor,
/// wall); the environment contributes zero velocity and zero inverse mass and
/// is never written to. It is deliberately not modeled as a zero-inverse-mass
/// particle so that "no second body" stays distinguishable from "a very heavy
/// second body".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleContact {
    pub first: ParticleHandle,
    pub second: Option<ParticleHandle>,

    /// Energy retained along the normal, in `[0, 1]` (1 = perfectly elastic).
    pub restitution: Real,

    /// Unit normal, pointing from the second particle (or the environment)
    /// toward the first.
    pub normal: Vec3,

    /// Overlap depth along the normal; `<= 0` means no interpenetration.
    pub penetration: Real,
}

impl ParticleContact {
    /// Relative velocity of the pair projected onto the contact normal.
    ///
    /// Positive means the particles are separating and the contact needs no
    /// velocity resolution; the more negative, the more urgent the contact.
    pub fn separating_velocity(&self, particles: &ParticleSet) -> Result<Real, PhysicsError> {
        let mut relative = particles.get(self.first)?.velocity();
        if let Some(second) = self.second {
            relative -= particles.get(second)?.velocity();
        }
        Ok(relative.dot(&self.normal))
    }

    /// Resolves this contact: velocity first, then interpenetration.
    pub fn resolve(&mut self, particles: &mut ParticleSet, dt: Real) -> Result<(), PhysicsError> {
        self.resolve_velocity(particles, dt)?;
        self.resolve_interpenetration(particles)
    }

    /// Combined inverse mass of the pair; the absent environment counts as 0.
    fn total_inverse_mass(&self, particles: &ParticleSet) -> Result<Real, PhysicsError> {
        let mut total = particles.get(self.first)?.inverse_mass();
        if let Some(second) = self.second {
            total += particles.get(second)?.inverse_mass();
        }
        Ok(total)
    }

    fn resolve_velocity(&self, particles: &mut ParticleSet, dt: Real) -> Result<(), PhysicsError> {
        let separating = self.separating_velocity(particles)?;
        if separating >= 0.0 {
            // Already separating or resting; no impulse needed.
            return Ok(());
        }

        let total_inverse_mass = self.total_inverse_mass(particles)?;
        if total_inverse_mass <= 0.0 {
            // Two immovable bodies; an impulse would have no effect.
            return Ok(());
        }

        let mut new_separating = -separating * self.restitution;

        // Velocity built up from this frame's acceleration alone. Without
        // this correction a resting contact re-bounces every frame off the
        // closing velocity gravity just added.
        let mut acc_velocity = particles.get(self.first)?.acceleration();
        if let Some(second) = self.second {
            acc_velocity -= particles.get(second)?.acceleration();
        }
        let acc_separating = acc_velocity.dot(&self.normal) * dt;
        if acc_separating < 0.0 {
            new_separating += self.restitution * acc_separating;
            if new_separating < 0.0 {
                new_separating = 0.0;
            }
        }

        let delta_velocity = new_separating - separating;

        // One impulse along the normal, shared in proportion to inverse
        // mass: heavier particles change velocity less.
        let impulse = delta_velocity / total_inverse_mass;
        let impulse_per_inverse_mass = self.normal * impulse;

        let first = particles.get_mut(self.first)?;
        let v = first.velocity() + impulse_per_inverse_mass * first.inverse_mass();
        first.set_velocity(v);

        if let Some(second) = self.second {
            let second = particles.get_mut(second)?;
            let v = second.velocity() - impulse_per_inverse_mass * second.inverse_mass();
            second.set_velocity(v);
        }

        Ok(())
    }

    fn resolve_interpenetration(&mut self, particles: &mut ParticleSet) -> Result<(), PhysicsError> {
        if self.penetration <= 0.0 {
            return Ok(());
        }

        let total_inverse_mass = self.total_inverse_mass(particles)?;
        if total_inverse_mass <= 0.0 {
            return Ok(());
        }

        // Positional correction only, no velocity change: the displacements
        // sum to the full penetration, split by inverse mass.
        let move_per_inverse_mass = self.normal * (self.penetration / total_inverse_mass);

        let first = particles.get_mut(self.first)?;
        let p = first.position() + move_per_inverse_mass * first.inverse_mass();
        first.set_position(p);

        if let Some(second) = self.second {
            let second = particles.get_mut(second)?;
            let p = second.position() - move_per_inverse_mass * second.inverse_mass();
            second.set_position(p);
        }

        // The overlap is gone; record that so the resolver stops treating
        // this contact as urgent.
        self.penetration = 0.0;

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
