//! Single-occupancy cell list: each cell holds at most one particle, used
//! for lattice-decorated systems (one particle seeded per lattice site)
//! where the ordinary `CellGrid`'s linked lists are unnecessary overhead.
//!
//! Grounded on `original_source/.../socells.cpp`'s requirement that the
//! particle count be a perfect cube (cells map 1:1 onto lattice sites along
//! each axis) and its direct array indexing instead of linked lists.

use crate::error::{ConfigError, Error};
use crate::vector::Vec3;
use serde::{Deserialize, Serialize};

use super::CellCoord;

/// A cell grid where every cell holds exactly zero or one particle,
/// indexed directly by cell ID rather than through a linked list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoCells {
    origin: Vec3,
    side: usize,
    cell_size: Vec3,
    /// Occupant of each cell, or `u32::MAX` if empty.
    occupants: Vec<u32>,
    /// Cell currently occupied by each particle, or `usize::MAX`.
    locations: Vec<usize>,
}

const EMPTY: u32 = u32::MAX;
const NOWHERE: usize = usize::MAX;

impl SoCells {
    /// Builds a `side x side x side` grid, where `side = n_particles^(1/3)`.
    /// Rejects particle counts that aren't a perfect cube, matching
    /// `original_source`'s `socells.cpp` initialisation check.
    pub fn new(origin: Vec3, dim: Vec3, n_particles: usize) -> Result<Self, Error> {
        let side = (n_particles as f64).cbrt().round() as usize;
        if side * side * side != n_particles {
            return Err(ConfigError::NotAPerfectCube(n_particles).into());
        }

        let cell_size = Vec3::new(dim.x / side as f64, dim.y / side as f64, dim.z / side as f64);

        Ok(SoCells {
            origin,
            side,
            cell_size,
            occupants: vec![EMPTY; n_particles],
            locations: vec![NOWHERE; n_particles],
        })
    }

    fn wrap(&self, v: i64) -> usize {
        v.rem_euclid(self.side as i64) as usize
    }

    fn cell_id(&self, coords: CellCoord) -> usize {
        let x = self.wrap(coords.x);
        let y = self.wrap(coords.y);
        let z = self.wrap(coords.z);
        x + self.side * (y + self.side * z)
    }

    pub fn coords_of_position(&self, pos: Vec3) -> CellCoord {
        let rel = pos - self.origin;
        CellCoord {
            x: (rel.x / self.cell_size.x).floor() as i64,
            y: (rel.y / self.cell_size.y).floor() as i64,
            z: (rel.z / self.cell_size.z).floor() as i64,
        }
    }

    /// Places `particle` into the cell at `coords`. Panics if that cell is
    /// already occupied: single-occupancy is a loaded invariant here, not
    /// something callers can opt out of.
    pub fn insert(&mut self, particle: u32, coords: CellCoord) {
        let cell_id = self.cell_id(coords);
        assert_eq!(
            self.occupants[cell_id], EMPTY,
            "single-occupancy cell {cell_id} already holds a particle"
        );
        if self.locations[particle as usize] != NOWHERE {
            self.occupants[self.locations[particle as usize]] = EMPTY;
        }
        self.occupants[cell_id] = particle;
        self.locations[particle as usize] = cell_id;
    }

    pub fn remove(&mut self, particle: u32) {
        let loc = self.locations[particle as usize];
        if loc != NOWHERE {
            self.occupants[loc] = EMPTY;
            self.locations[particle as usize] = NOWHERE;
        }
    }

    pub fn occupant(&self, coords: CellCoord) -> Option<u32> {
        let occ = self.occupants[self.cell_id(coords)];
        if occ == EMPTY { None } else { Some(occ) }
    }

    pub fn side(&self) -> usize {
        self.side
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_cube_particle_count_is_rejected() {
        let err = SoCells::new(Vec3::zero(), Vec3::new(10.0, 10.0, 10.0), 10);
        assert!(matches!(
            err,
            Err(Error::Config(ConfigError::NotAPerfectCube(10)))
        ));
    }

    #[test]
    fn perfect_cube_count_is_accepted_and_indexes_by_side() {
        let grid = SoCells::new(Vec3::zero(), Vec3::new(9.0, 9.0, 9.0), 27).unwrap();
        assert_eq!(grid.side(), 3);
    }

    #[test]
    fn insert_then_remove_clears_occupant() {
        let mut grid = SoCells::new(Vec3::zero(), Vec3::new(9.0, 9.0, 9.0), 27).unwrap();
        let coords = grid.coords_of_position(Vec3::new(1.0, 1.0, 1.0));
        grid.insert(0, coords);
        assert_eq!(grid.occupant(coords), Some(0));
        grid.remove(0);
        assert_eq!(grid.occupant(coords), None);
    }

    #[test]
    #[should_panic(expected = "already holds a particle")]
    fn double_insert_into_same_cell_panics() {
        let mut grid = SoCells::new(Vec3::zero(), Vec3::new(9.0, 9.0, 9.0), 27).unwrap();
        let coords = grid.coords_of_position(Vec3::new(1.0, 1.0, 1.0));
        grid.insert(0, coords);
        grid.insert(1, coords);
    }
}
