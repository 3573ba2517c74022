//! Iterative worst-first contact resolver.

use crate::error::PhysicsError;
use crate::particle::ParticleSet;
use crate::types::Real;

use super::ParticleContact;

/// Resolves a batch of contacts one at a time, worst first.
///
/// Each iteration re-scans every contact, because resolving one contact can
/// change the separating velocity of any other contact sharing a particle
/// (stacked objects are the classic case). The iteration budget is a soft
/// bound on convergence, not a guarantee that every contact ends satisfied.
#[derive(Debug, Clone)]
pub struct ParticleContactResolver {
    iterations: usize,
    iterations_used: usize,
}

impl ParticleContactResolver {
    /// Creates a resolver with a fixed iteration budget.
    ///
    /// A common choice is twice the expected number of contacts per frame.
    pub fn new(iterations: usize) -> Self {
        Self {
            iterations,
            iterations_used: 0,
        }
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn set_iterations(&mut self, iterations: usize) {
        self.iterations = iterations;
    }

    /// Iterations consumed by the most recent [`resolve_contacts`] call.
    ///
    /// [`resolve_contacts`]: ParticleContactResolver::resolve_contacts
    pub fn iterations_used(&self) -> usize {
        self.iterations_used
    }

    /// Resolves `contacts` in place against the particle set.
    ///
    /// Each pass selects the most urgent contact: the lowest separating
    /// velocity among contacts that are either closing (`separating < 0`) or
    /// still interpenetrating. That one contact is resolved and the scan
    /// restarts. Returns once nothing qualifies or the budget is spent.
    ///
    /// # Errors
    ///
    /// [`PhysicsError::InvalidTimeStep`] for `dt <= 0`, or
    /// [`PhysicsError::UnknownParticle`] from a stale handle; contacts
    /// already resolved in earlier iterations keep their effects.
    pub fn resolve_contacts(
        &mut self,
        contacts: &mut [ParticleContact],
        particles: &mut ParticleSet,
        dt: Real,
    ) -> Result<(), PhysicsError> {
        if dt <= 0.0 {
            return Err(PhysicsError::InvalidTimeStep { dt });
        }

        self.iterations_used = 0;
        while self.iterations_used < self.iterations {
            // Find the contact with the most negative separating velocity;
            // a contact that is still interpenetrating qualifies even when
            // its velocities already separate.
            let mut worst_separating = Real::MAX;
            let mut worst: Option<usize> = None;
            for (index, contact) in contacts.iter().enumerate() {
                let separating = contact.separating_velocity(particles)?;
                if separating < worst_separating
                    && (separating < 0.0 || contact.penetration > 0.0)
                {
                    worst_separating = separating;
                    worst = Some(index);
                }
            }

            let Some(worst) = worst else {
                break;
            };

            contacts[worst].resolve(particles, dt)?;
            self.iterations_used += 1;
        }

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
