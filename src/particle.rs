//! # Particle Module
//!
//! The `Particle` is the unit of state the rest of the core operates on:
//! dense ID, Cartesian position/velocity, a species reference, state flags,
//! and the bookkeeping the scheduler needs for lazy invalidation
//! (`spec.md` §4.5) and delayed streaming (§4.2).

use crate::species::SpeciesId;
use crate::vector::Vec3;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Per-particle state flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ParticleFlags: u8 {
        /// The particle may move; a particle without this flag is frozen
        /// (used by lattice decorations and `SOCells`).
        const DYNAMIC = 0b0000_0001;
    }
}

/// A single particle: dense ID (0..N-1), position, velocity, species, flags.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Particle {
    pub id: u32,
    pub position: Vec3,
    pub velocity: Vec3,
    pub species: SpeciesId,
    pub flags: ParticleFlags,
    /// Orientation vector for anisotropic species (lines, orientation-carrying
    /// Liouvilleans). `None` for plain spheres.
    pub orientation: Option<Vec3>,
    /// Monotonically increasing counter, bumped on every `full_update`.
    /// Events record the counter of their participants at enqueue time;
    /// a mismatch at pop time means the event is stale (`spec.md` §4.5).
    pub counter: u64,
    /// Simulation time this particle's position/velocity were last advanced
    /// to. `Liouvillean::get_particle_delay` subtracts `now - last_update`
    /// from freshly computed event times rather than forcing an eager stream.
    pub last_update: f64,
}

impl Particle {
    pub fn new(id: u32, position: Vec3, velocity: Vec3, species: SpeciesId) -> Self {
        Particle {
            id,
            position,
            velocity,
            species,
            flags: ParticleFlags::DYNAMIC,
            orientation: None,
            counter: 0,
            last_update: 0.0,
        }
    }

    pub fn frozen(mut self) -> Self {
        self.flags.remove(ParticleFlags::DYNAMIC);
        self
    }

    pub fn is_dynamic(&self) -> bool {
        self.flags.contains(ParticleFlags::DYNAMIC)
    }

    /// Delay between `now` and this particle's `last_update`. The
    /// Liouvillean subtracts this from event times it computes so callers
    /// don't have to stream every particle before every query.
    pub fn delay(&self, now: f64) -> f64 {
        now - self.last_update
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_particle_is_dynamic_by_default() {
        let p = Particle::new(0, Vec3::zero(), Vec3::zero(), 0);
        assert!(p.is_dynamic());
        assert_eq!(p.counter, 0);
    }

    #[test]
    fn frozen_particle_is_not_dynamic() {
        let p = Particle::new(0, Vec3::zero(), Vec3::zero(), 0).frozen();
        assert!(!p.is_dynamic());
    }

    #[test]
    fn delay_is_now_minus_last_update() {
        let mut p = Particle::new(1, Vec3::zero(), Vec3::zero(), 0);
        p.last_update = 2.5;
        assert!((p.delay(5.0) - 2.5).abs() < 1e-12);
    }
}
