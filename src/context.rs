//! # Context Module
//!
//! `spec.md` §9's design note: rather than every component (cells,
//! scheduler, liouvillean) holding a back-pointer into a shared owner the
//! way the original's `SimData*` member does, `SimContext` is the single
//! owning struct and every operation borrows through it. Nothing in this
//! crate stores a cyclic reference.
//!
//! Grounded on the teacher's `Scene`/`SceneContext` ownership shape
//! (`examples/MichaelZalla-cairo/src/scene/`), where one struct holds every
//! mutable subsystem (entities, lights, cameras) and free functions operate
//! on `&mut Self` rather than subsystems holding back-pointers to each
//! other, generalized here from a render scene graph to the event-driven
//! core's particles/cells/sorter/observers.

use crate::boundary::Boundary;
use crate::cells::CellGrid;
use crate::error::{ConfigError, Error};
use crate::liouvillean::Liouvillean;
use crate::observer::Observers;
use crate::particle::Particle;
use crate::sorter::{CalendarSorter, CbtSorter, Sorter};
use crate::species::{Species, SpeciesId};
use crate::vector::Vec3;
use serde::{Deserialize, Serialize};

/// A flat (non-mesh) wall: particles bounce elastically off the plane
/// through `origin` with the given particle-side `normal`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Wall {
    pub id: u32,
    pub origin: Vec3,
    pub normal: Vec3,
    pub elasticity: f64,
}

/// Which sorter strategy backs a given run. A closed enum rather than
/// `Box<dyn Sorter>`, per `spec.md` §9's note against virtual dispatch on
/// the hot path — every call site already knows which sorter a context
/// uses for its whole lifetime.
#[derive(Debug, Clone)]
pub enum SorterStrategy {
    Cbt(CbtSorter),
    Calendar(CalendarSorter),
}

impl Sorter for SorterStrategy {
    fn resize(&mut self, n: usize) {
        match self {
            SorterStrategy::Cbt(s) => s.resize(n),
            SorterStrategy::Calendar(s) => s.resize(n),
        }
    }
    fn clear(&mut self) {
        match self {
            SorterStrategy::Cbt(s) => s.clear(),
            SorterStrategy::Calendar(s) => s.clear(),
        }
    }
    fn is_empty(&self) -> bool {
        match self {
            SorterStrategy::Cbt(s) => s.is_empty(),
            SorterStrategy::Calendar(s) => s.is_empty(),
        }
    }
    fn len(&self) -> usize {
        match self {
            SorterStrategy::Cbt(s) => s.len(),
            SorterStrategy::Calendar(s) => s.len(),
        }
    }
    fn push(&mut self, owner: usize, event: crate::event::Event) {
        match self {
            SorterStrategy::Cbt(s) => s.push(owner, event),
            SorterStrategy::Calendar(s) => s.push(owner, event),
        }
    }
    fn update(&mut self, owner: usize) {
        match self {
            SorterStrategy::Cbt(s) => s.update(owner),
            SorterStrategy::Calendar(s) => s.update(owner),
        }
    }
    fn next_id(&self) -> Option<usize> {
        match self {
            SorterStrategy::Cbt(s) => s.next_id(),
            SorterStrategy::Calendar(s) => s.next_id(),
        }
    }
    fn next_event(&self) -> Option<&crate::event::Event> {
        match self {
            SorterStrategy::Cbt(s) => s.next_event(),
            SorterStrategy::Calendar(s) => s.next_event(),
        }
    }
    fn stream(&mut self, dt: f64) {
        match self {
            SorterStrategy::Cbt(s) => s.stream(dt),
            SorterStrategy::Calendar(s) => s.stream(dt),
        }
    }
    fn rescale_times(&mut self, shift: f64) {
        match self {
            SorterStrategy::Cbt(s) => s.rescale_times(shift),
            SorterStrategy::Calendar(s) => s.rescale_times(shift),
        }
    }
}

/// Everything a running simulation needs: particle state, the species
/// table, the boundary condition, the equation of motion, the cell index,
/// the event sorter, the flat walls, and the observer lists notified as
/// events execute.
pub struct SimContext {
    pub particles: Vec<Particle>,
    pub species: Vec<Species>,
    pub boundary: Boundary,
    pub liouvillean: Liouvillean,
    pub cells: CellGrid,
    pub walls: Vec<Wall>,
    pub sorter: SorterStrategy,
    pub observers: Observers,
    /// Extra margin (beyond one cell width) the neighbour search scans, for
    /// interaction ranges wider than a single cell.
    pub overlink: i64,
    /// Current simulation time, advanced by every `sorter.stream`.
    pub time: f64,
}

impl SimContext {
    /// Diameter of the largest species present, used as the cell grid's
    /// `min_cell_size` so every interaction range fits within `overlink`
    /// cells of its owner.
    fn max_diameter(species: &[Species]) -> f64 {
        species
            .iter()
            .map(|s| s.diameter)
            .fold(f64::MIN_POSITIVE, f64::max)
    }

    pub fn new(
        particles: Vec<Particle>,
        species: Vec<Species>,
        boundary: Boundary,
        liouvillean: Liouvillean,
        walls: Vec<Wall>,
        origin: Vec3,
        dim: Vec3,
        oversize: f64,
        sorter: SorterStrategy,
    ) -> Result<Self, Error> {
        if matches!(liouvillean, Liouvillean::NewtonianGravity { .. })
            && matches!(boundary, Boundary::LeesEdwards { .. })
        {
            return Err(ConfigError::ShearingGravityUnsupported.into());
        }

        let min_cell_size = Self::max_diameter(&species);
        let cells = CellGrid::new(origin, dim, min_cell_size, oversize, particles.len())?;

        let mut sorter = sorter;
        sorter.resize(particles.len());

        let mut ctx = SimContext {
            particles,
            species,
            boundary,
            liouvillean,
            cells,
            walls,
            sorter,
            observers: Observers::new(),
            overlink: 1,
            time: 0.0,
        };

        for i in 0..ctx.particles.len() {
            let coords = ctx.cells.coords_of_position(ctx.particles[i].position);
            ctx.cells.insert(i as u32, coords);
        }

        ctx.observers.sig_reinit();
        Ok(ctx)
    }

    pub fn species_of(&self, id: SpeciesId) -> &Species {
        &self.species[id as usize]
    }
}
