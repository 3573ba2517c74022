//! Force generators and the registry that applies them.
//!
//! A [`ForceGenerator`] is a capability: given a target particle and a time
//! step, add to that particle's force accumulator. Generators are plain
//! parameter sets (a closed tagged variant rather than trait objects), so
//! they copy freely, compare for equality, and round-trip through serde.
//!
//! The [`ForceRegistry`] pairs generators with particles and drives per-frame
//! force application in registration order. It holds handles only; particles
//! are owned by the [`ParticleSet`] and generators by value in the registry
//! entries, so nothing here manages lifetimes.

use serde::{Deserialize, Serialize};

use crate::error::PhysicsError;
use crate::particle::{ParticleHandle, ParticleSet};
use crate::types::{Real, Vec3};

// =============================================================================
// ForceGenerator
// =============================================================================

/// A single force law acting on one particle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ForceGenerator {
    /// Constant gravitational field: `F = g * m`.
    ///
    /// Immovable particles are skipped entirely; scaling the field by an
    /// infinite mass is meaningless.
    Gravity { gravity: Vec3 },

    /// Velocity drag: `F = -v̂ * (k1*|v| + k2*|v|²)`.
    Drag { k1: Real, k2: Real },

    /// Hooke spring to another particle's current position.
    ///
    /// `F = -k * (|d| - rest_length) * d̂` with `d` from the other particle
    /// to the target: extension pulls the pair together, compression pushes
    /// it apart.
    Spring {
        other: ParticleHandle,
        spring_constant: Real,
        rest_length: Real,
    },

    /// Hooke spring to a fixed anchor point.
    AnchoredSpring {
        anchor: Vec3,
        spring_constant: Real,
        rest_length: Real,
    },

    /// One-sided spring: pulls only when stretched beyond `rest_length`,
    /// never pushes when slack.
    Bungee {
        other: ParticleHandle,
        spring_constant: Real,
        rest_length: Real,
    },

    /// Buoyancy in a liquid surface at `water_height`, acting along +y only.
    ///
    /// Zero force fully above the surface, `liquid_density * volume` when
    /// submerged past `max_depth`, linear in between.
    Buoyancy {
        max_depth: Real,
        volume: Real,
        water_height: Real,
        liquid_density: Real,
    },

    /// Stiff spring faked through its closed-form damped-harmonic solution,
    /// so it stays stable at time steps where explicit Hooke forces explode.
    ///
    /// Applies no force when `4k <= damping²` (the oscillator is not
    /// underdamped and the closed form does not apply) or when the particle
    /// is immovable.
    FakeSpring {
        anchor: Vec3,
        spring_constant: Real,
        damping: Real,
    },
}

impl ForceGenerator {
    /// Accumulates this generator's force into the target particle.
    ///
    /// The only observable effect is `add_force` on the target; generators
    /// never integrate, never clear accumulators, and never touch the other
    /// end of a spring.
    ///
    /// # Errors
    ///
    /// [`PhysicsError::UnknownParticle`] when `target` (or a spring's far
    /// end) is not in the set.
    pub fn update_force(
        &self,
        target: ParticleHandle,
        particles: &mut ParticleSet,
        dt: Real,
    ) -> Result<(), PhysicsError> {
        match *self {
            ForceGenerator::Gravity { gravity } => {
                let particle = particles.get_mut(target)?;
                let Ok(mass) = particle.mass() else {
                    return Ok(());
                };
                particle.add_force(gravity * mass);
            }

            ForceGenerator::Drag { k1, k2 } => {
                let particle = particles.get_mut(target)?;
                let velocity = particle.velocity();
                let speed = velocity.magnitude();
                if speed > 0.0 {
                    let drag = k1 * speed + k2 * speed * speed;
                    particle.add_force(velocity.normalized() * -drag);
                }
            }

            ForceGenerator::Spring {
                other,
                spring_constant,
                rest_length,
            } => {
                let other_position = particles.get(other)?.position();
                let particle = particles.get_mut(target)?;
                particle.add_force(spring_force(
                    particle.position(),
                    other_position,
                    spring_constant,
                    rest_length,
                ));
            }

            ForceGenerator::AnchoredSpring {
                anchor,
                spring_constant,
                rest_length,
            } => {
                let particle = particles.get_mut(target)?;
                particle.add_force(spring_force(
                    particle.position(),
                    anchor,
                    spring_constant,
                    rest_length,
                ));
            }

            ForceGenerator::Bungee {
                other,
                spring_constant,
                rest_length,
            } => {
                let other_position = particles.get(other)?.position();
                let particle = particles.get_mut(target)?;
                let d = particle.position() - other_position;
                if d.magnitude() > rest_length {
                    particle.add_force(spring_force(
                        particle.position(),
                        other_position,
                        spring_constant,
                        rest_length,
                    ));
                }
            }

            ForceGenerator::Buoyancy {
                max_depth,
                volume,
                water_height,
                liquid_density,
            } => {
                let particle = particles.get_mut(target)?;
                let depth = particle.position().y;

                // Fully out of the liquid.
                if depth >= water_height + max_depth {
                    return Ok(());
                }

                let full_force = liquid_density * volume;
                let force_y = if depth <= water_height - max_depth {
                    full_force
                } else {
                    // Partially submerged: linear in the submerged fraction.
                    full_force * (water_height + max_depth - depth) / (2.0 * max_depth)
                };
                particle.add_force(Vec3::new(0.0, force_y, 0.0));
            }

            ForceGenerator::FakeSpring {
                anchor,
                spring_constant,
                damping,
            } => {
                let particle = particles.get_mut(target)?;
                let Ok(mass) = particle.mass() else {
                    return Ok(());
                };

                let discriminant = 4.0 * spring_constant - damping * damping;
                if discriminant <= 0.0 {
                    return Ok(());
                }
                let gamma = 0.5 * discriminant.sqrt();

                let position = particle.position() - anchor;
                let c = position * (damping / (2.0 * gamma))
                    + particle.velocity() * (1.0 / gamma);

                // Where the closed-form solution puts the particle after dt.
                let target_pos = (position * (gamma * dt).cos() + c * (gamma * dt).sin())
                    * (-0.5 * dt * damping).exp();

                let accel =
                    (target_pos - position) * (1.0 / (dt * dt)) - particle.velocity() * dt;
                particle.add_force(accel * mass);
            }
        }
        Ok(())
    }
}

/// Hooke's law force on a particle at `position` attached toward `attachment`.
fn spring_force(position: Vec3, attachment: Vec3, spring_constant: Real, rest_length: Real) -> Vec3 {
    let d = position - attachment;
    let length = d.magnitude();
    if length == 0.0 {
        // Coincident endpoints have no direction to act along.
        return Vec3::ZERO;
    }
    let magnitude = spring_constant * (length - rest_length);
    d.normalized() * -magnitude
}

// =============================================================================
// ForceRegistry
// =============================================================================

/// One (particle, generator) association.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Registration {
    particle: ParticleHandle,
    generator: ForceGenerator,
}

/// Ordered collection of (particle, generator) associations.
///
/// Insertion order is application order; the registry never reorders its
/// entries.
#[derive(Debug, Default, Clone)]
pub struct ForceRegistry {
    registrations: Vec<Registration>,
}

impl ForceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a generator to act on a particle.
    pub fn add(&mut self, particle: ParticleHandle, generator: ForceGenerator) {
        self.registrations.push(Registration {
            particle,
            generator,
        });
    }

    /// Removes the first association matching the pair exactly.
    ///
    /// A pair that was never registered is a silent no-op; the remaining
    /// entries are untouched either way.
    pub fn remove(&mut self, particle: ParticleHandle, generator: &ForceGenerator) {
        if let Some(pos) = self
            .registrations
            .iter()
            .position(|r| r.particle == particle && r.generator == *generator)
        {
            self.registrations.remove(pos);
        }
    }

    /// Drops all associations.
    pub fn clear(&mut self) {
        self.registrations.clear();
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Invokes every generator on its particle, in registration order.
    ///
    /// Accumulators are not cleared and nothing is integrated here; that is
    /// the particle's (and the host loop's) job.
    ///
    /// # Errors
    ///
    /// [`PhysicsError::InvalidTimeStep`] for `dt <= 0`, or
    /// [`PhysicsError::UnknownParticle`] from a stale handle.
    pub fn update_forces(
        &self,
        particles: &mut ParticleSet,
        dt: Real,
    ) -> Result<(), PhysicsError> {
        if dt <= 0.0 {
            return Err(PhysicsError::InvalidTimeStep { dt });
        }
        for registration in &self.registrations {
            registration
                .generator
                .update_force(registration.particle, particles, dt)?;
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::Particle;
    use crate::types::constants;

    fn set_with_one(position: Vec3) -> (ParticleSet, ParticleHandle) {
        let mut set = ParticleSet::new();
        let h = set.insert(Particle::new(position));
        (set, h)
    }

    #[test]
    fn test_gravity_scales_with_mass() {
        let (mut set, h) = set_with_one(Vec3::ZERO);
        set.get_mut(h).unwrap().set_mass(2.0).unwrap();

        let g = ForceGenerator::Gravity {
            gravity: Vec3::new(0.0, -10.0, 0.0),
        };
        g.update_force(h, &mut set, 0.01).unwrap();

        assert_eq!(set.get(h).unwrap().force_accum(), Vec3::new(0.0, -20.0, 0.0));
    }

    #[test]
    fn test_gravity_skips_immovable() {
        let (mut set, h) = set_with_one(Vec3::ZERO);
        set.get_mut(h).unwrap().make_immovable();

        let g = ForceGenerator::Gravity {
            gravity: Vec3::new(0.0, -10.0, 0.0),
        };
        g.update_force(h, &mut set, 0.01).unwrap();

        assert_eq!(set.get(h).unwrap().force_accum(), Vec3::ZERO);
    }

    #[test]
    fn test_drag_opposes_motion_and_grows_with_speed() {
        let drag = ForceGenerator::Drag { k1: 0.5, k2: 0.1 };

        let (mut set, h) = set_with_one(Vec3::ZERO);
        set.get_mut(h).unwrap().set_velocity(Vec3::new(2.0, 0.0, 0.0));
        drag.update_force(h, &mut set, 0.01).unwrap();
        let slow = set.get(h).unwrap().force_accum();

        // k1*2 + k2*4 = 1.4, along -x
        assert!((slow.x + 1.4).abs() < constants::EPSILON);
        assert_eq!(slow.y, 0.0);

        let (mut set, h) = set_with_one(Vec3::ZERO);
        set.get_mut(h).unwrap().set_velocity(Vec3::new(8.0, 0.0, 0.0));
        drag.update_force(h, &mut set, 0.01).unwrap();
        let fast = set.get(h).unwrap().force_accum();

        // Quadratic term dominates: 4x speed gives more than 4x drag.
        assert!(fast.x.abs() > slow.x.abs() * 4.0);
    }

    #[test]
    fn test_drag_zero_velocity_no_force() {
        let (mut set, h) = set_with_one(Vec3::ZERO);
        let drag = ForceGenerator::Drag { k1: 1.0, k2: 1.0 };
        drag.update_force(h, &mut set, 0.01).unwrap();
        assert_eq!(set.get(h).unwrap().force_accum(), Vec3::ZERO);
    }

    #[test]
    fn test_spring_pulls_when_stretched_pushes_when_compressed() {
        let mut set = ParticleSet::new();
        let a = set.insert(Particle::new(Vec3::new(3.0, 0.0, 0.0)));
        let b = set.insert(Particle::new(Vec3::ZERO));

        let spring = ForceGenerator::Spring {
            other: b,
            spring_constant: 10.0,
            rest_length: 1.0,
        };

        // Stretched by 2: |F| = 20 pulling a toward b (-x).
        spring.update_force(a, &mut set, 0.01).unwrap();
        let f = set.get(a).unwrap().force_accum();
        assert!((f.x + 20.0).abs() < constants::EPSILON);

        // Compressed: distance 0.5, |F| = 5 pushing a away from b (+x).
        set.get_mut(a).unwrap().clear_accumulator();
        set.get_mut(a)
            .unwrap()
            .set_position(Vec3::new(0.5, 0.0, 0.0));
        spring.update_force(a, &mut set, 0.01).unwrap();
        let f = set.get(a).unwrap().force_accum();
        assert!((f.x - 5.0).abs() < constants::EPSILON);

        // The other end is never touched.
        assert_eq!(set.get(b).unwrap().force_accum(), Vec3::ZERO);
    }

    #[test]
    fn test_anchored_spring() {
        let (mut set, h) = set_with_one(Vec3::new(0.0, 2.0, 0.0));
        let spring = ForceGenerator::AnchoredSpring {
            anchor: Vec3::ZERO,
            spring_constant: 4.0,
            rest_length: 1.0,
        };
        spring.update_force(h, &mut set, 0.01).unwrap();
        let f = set.get(h).unwrap().force_accum();
        // Stretched by 1, k=4: pulled down toward the anchor.
        assert!((f.y + 4.0).abs() < constants::EPSILON);
    }

    #[test]
    fn test_bungee_slack_is_zero_taut_scales_linearly() {
        let mut set = ParticleSet::new();
        let a = set.insert(Particle::new(Vec3::new(0.5, 0.0, 0.0)));
        let b = set.insert(Particle::new(Vec3::ZERO));

        let bungee = ForceGenerator::Bungee {
            other: b,
            spring_constant: 10.0,
            rest_length: 1.0,
        };

        // Slack: closer than rest length, no force at all.
        bungee.update_force(a, &mut set, 0.01).unwrap();
        assert_eq!(set.get(a).unwrap().force_accum(), Vec3::ZERO);

        // Stretch of 1 then 2: pull doubles.
        set.get_mut(a).unwrap().set_position(Vec3::new(2.0, 0.0, 0.0));
        bungee.update_force(a, &mut set, 0.01).unwrap();
        let once = set.get(a).unwrap().force_accum();
        assert!((once.x + 10.0).abs() < constants::EPSILON);

        set.get_mut(a).unwrap().clear_accumulator();
        set.get_mut(a).unwrap().set_position(Vec3::new(3.0, 0.0, 0.0));
        bungee.update_force(a, &mut set, 0.01).unwrap();
        let twice = set.get(a).unwrap().force_accum();
        assert!((twice.x + 20.0).abs() < constants::EPSILON);
    }

    #[test]
    fn test_buoyancy_piecewise_in_depth() {
        let buoyancy = ForceGenerator::Buoyancy {
            max_depth: 0.5,
            volume: 2.0,
            water_height: 0.0,
            liquid_density: 1000.0,
        };

        // Fully above the surface.
        let (mut set, h) = set_with_one(Vec3::new(0.0, 1.0, 0.0));
        buoyancy.update_force(h, &mut set, 0.01).unwrap();
        assert_eq!(set.get(h).unwrap().force_accum(), Vec3::ZERO);

        // Fully submerged: full ρV along +y.
        let (mut set, h) = set_with_one(Vec3::new(0.0, -1.0, 0.0));
        buoyancy.update_force(h, &mut set, 0.01).unwrap();
        assert_eq!(set.get(h).unwrap().force_accum(), Vec3::new(0.0, 2000.0, 0.0));

        // Exactly at the surface: half submerged.
        let (mut set, h) = set_with_one(Vec3::ZERO);
        buoyancy.update_force(h, &mut set, 0.01).unwrap();
        let f = set.get(h).unwrap().force_accum();
        assert!((f.y - 1000.0).abs() < constants::EPSILON);
        assert_eq!(f.x, 0.0);
        assert_eq!(f.z, 0.0);
    }

    #[test]
    fn test_fake_spring_pulls_toward_anchor() {
        let (mut set, h) = set_with_one(Vec3::new(1.0, 0.0, 0.0));
        let spring = ForceGenerator::FakeSpring {
            anchor: Vec3::ZERO,
            spring_constant: 100.0,
            damping: 2.0,
        };
        spring.update_force(h, &mut set, 0.01).unwrap();
        let f = set.get(h).unwrap().force_accum();
        assert!(f.x < 0.0, "expected pull toward anchor, got {:?}", f);
    }

    #[test]
    fn test_fake_spring_not_underdamped_emits_nothing() {
        // 4k <= damping²: closed form is inapplicable, force must be zero.
        let (mut set, h) = set_with_one(Vec3::new(1.0, 0.0, 0.0));
        let spring = ForceGenerator::FakeSpring {
            anchor: Vec3::ZERO,
            spring_constant: 1.0,
            damping: 2.0,
        };
        spring.update_force(h, &mut set, 0.01).unwrap();
        assert_eq!(set.get(h).unwrap().force_accum(), Vec3::ZERO);

        let spring = ForceGenerator::FakeSpring {
            anchor: Vec3::ZERO,
            spring_constant: 1.0,
            damping: 3.0,
        };
        spring.update_force(h, &mut set, 0.01).unwrap();
        assert_eq!(set.get(h).unwrap().force_accum(), Vec3::ZERO);
    }

    #[test]
    fn test_fake_spring_skips_immovable() {
        let (mut set, h) = set_with_one(Vec3::new(1.0, 0.0, 0.0));
        set.get_mut(h).unwrap().make_immovable();
        let spring = ForceGenerator::FakeSpring {
            anchor: Vec3::ZERO,
            spring_constant: 100.0,
            damping: 2.0,
        };
        spring.update_force(h, &mut set, 0.01).unwrap();
        assert_eq!(set.get(h).unwrap().force_accum(), Vec3::ZERO);
    }

    #[test]
    fn test_registry_applies_in_insertion_order() {
        let mut set = ParticleSet::new();
        let h = set.insert(Particle::new(Vec3::ZERO));
        set.get_mut(h).unwrap().set_mass(1.0).unwrap();
        set.get_mut(h).unwrap().set_velocity(Vec3::new(1.0, 0.0, 0.0));

        let mut registry = ForceRegistry::new();
        registry.add(
            h,
            ForceGenerator::Gravity {
                gravity: Vec3::new(0.0, -10.0, 0.0),
            },
        );
        registry.add(h, ForceGenerator::Drag { k1: 1.0, k2: 0.0 });

        registry.update_forces(&mut set, 0.01).unwrap();

        // Both generators contributed; accumulator untouched otherwise.
        let f = set.get(h).unwrap().force_accum();
        assert!((f.y + 10.0).abs() < constants::EPSILON);
        assert!((f.x + 1.0).abs() < constants::EPSILON);

        // update_forces never integrates.
        assert_eq!(set.get(h).unwrap().position(), Vec3::ZERO);
    }

    #[test]
    fn test_registry_remove_exactly_one_match() {
        let mut set = ParticleSet::new();
        let a = set.insert(Particle::default());
        let b = set.insert(Particle::default());

        let g = ForceGenerator::Drag { k1: 1.0, k2: 0.0 };
        let mut registry = ForceRegistry::new();
        registry.add(a, g);
        registry.add(b, g);
        registry.add(a, g);
        assert_eq!(registry.len(), 3);

        // Removes only the first (a, g); the duplicate stays.
        registry.remove(a, &g);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_registry_remove_missing_is_noop() {
        let mut set = ParticleSet::new();
        let a = set.insert(Particle::default());
        let b = set.insert(Particle::default());

        let mut registry = ForceRegistry::new();
        registry.add(
            a,
            ForceGenerator::Gravity {
                gravity: Vec3::new(0.0, -10.0, 0.0),
            },
        );

        // Same generator, different particle: nothing happens.
        registry.remove(
            b,
            &ForceGenerator::Gravity {
                gravity: Vec3::new(0.0, -10.0, 0.0),
            },
        );
        // Same particle, different generator parameters: nothing happens.
        registry.remove(
            a,
            &ForceGenerator::Gravity {
                gravity: Vec3::new(0.0, -9.81, 0.0),
            },
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_clear() {
        let mut set = ParticleSet::new();
        let a = set.insert(Particle::default());
        let mut registry = ForceRegistry::new();
        registry.add(a, ForceGenerator::Drag { k1: 1.0, k2: 1.0 });
        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_registry_rejects_bad_time_step() {
        let mut set = ParticleSet::new();
        let registry = ForceRegistry::new();
        assert_eq!(
            registry.update_forces(&mut set, 0.0),
            Err(PhysicsError::InvalidTimeStep { dt: 0.0 })
        );
    }
}
