//! # Species Module
//!
//! A species groups particles that share physical constants (mass,
//! diameter, elasticity) without requiring per-particle storage of those
//! constants. `spec.md` §3 calls this out as a "species reference" field on
//! `Particle`; the registry itself lives on the simulation context.

use serde::{Deserialize, Serialize};

/// Index into `SimContext::species`.
pub type SpeciesId = u16;

/// Physical constants shared by every particle of a given species.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Species {
    pub name_id: SpeciesId,
    pub mass: f64,
    pub diameter: f64,
    /// Restitution coefficient `e` in `[0, 1]` used by collision response.
    pub elasticity: f64,
}

impl Species {
    pub fn new(name_id: SpeciesId, mass: f64, diameter: f64, elasticity: f64) -> Self {
        Species {
            name_id,
            mass,
            diameter,
            elasticity,
        }
    }
}

impl Default for Species {
    /// Unit-mass, unit-diameter, perfectly elastic species — the common case
    /// for the hard-sphere test scenarios in `spec.md` §8.
    fn default() -> Self {
        Species {
            name_id: 0,
            mass: 1.0,
            diameter: 1.0,
            elasticity: 1.0,
        }
    }
}
