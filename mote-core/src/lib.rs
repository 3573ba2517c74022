//! # Mote Core
//!
//! A real-time point-mass dynamics kernel: particles advance under
//! accumulated forces and pairwise contacts are resolved iteratively.
//! Rendering, windowing, input, and contact generation live in the host;
//! this crate owns only the physics.
//!
//! ## Architecture
//!
//! - `types`: 3D vector arithmetic, scalar precision, constants
//! - `particle`: point-mass state, the semi-implicit integrator, and the
//!   `ParticleSet` arena that hands out non-owning handles
//! - `forces`: force-generator variants (gravity, drag, springs, buoyancy)
//!   and the registry that applies them per frame
//! - `contact`: two-body contact model and the worst-first iterative resolver
//! - `config`: YAML-based world parameter loader
//!
//! ## Step sequence
//!
//! The host drives one fixed sequence per frame with its own `dt`:
//!
//! ```no_run
//! use mote_core::{ForceRegistry, ParticleContactResolver, ParticleSet};
//!
//! # fn step(
//! #     particles: &mut ParticleSet,
//! #     registry: &ForceRegistry,
//! #     resolver: &mut ParticleContactResolver,
//! #     contacts: &mut [mote_core::ParticleContact],
//! #     dt: f64,
//! # ) -> Result<(), mote_core::PhysicsError> {
//! registry.update_forces(particles, dt)?;
//! particles.integrate_all(dt)?;
//! resolver.resolve_contacts(contacts, particles, dt)?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod contact;
pub mod error;
pub mod forces;
pub mod particle;
pub mod types;

// Re-export primary API
pub use config::{ConfigError, ConfigLoader, WorldConfig};
pub use contact::{ParticleContact, ParticleContactResolver};
pub use error::PhysicsError;
pub use forces::{ForceGenerator, ForceRegistry};
pub use particle::{Particle, ParticleHandle, ParticleSet};
pub use types::{make_orthonormal_basis, Real, Vec3};
