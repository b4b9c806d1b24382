//! # Observer Module
//!
//! `spec.md` §4.6 replaces the original's signal/slot wiring with plain
//! append-only callback lists, one per signal kind, since every subscriber
//! in this crate is known at construction time and there is no need for
//! dynamic connect/disconnect.

use crate::event::ParticleEventData;

/// A cell-crossing notification: `particle` moved from `old_cell` to
/// `new_cell` (both row-major or Morton IDs, depending on which cell index
/// is in use).
#[derive(Debug, Clone, Copy)]
pub struct CellChanged {
    pub particle: u32,
    pub old_cell: usize,
    pub new_cell: usize,
}

/// One append-only list per signal kind `spec.md` §4.6 names. Callbacks are
/// boxed closures registered once at setup and never removed.
#[derive(Default)]
pub struct Observers {
    particle_update: Vec<Box<dyn FnMut(&ParticleEventData)>>,
    new_neighbour: Vec<Box<dyn FnMut(u32, u32)>>,
    new_local: Vec<Box<dyn FnMut(u32, u32)>>,
    cell_changed: Vec<Box<dyn FnMut(&CellChanged)>>,
    reinit: Vec<Box<dyn FnMut()>>,
}

impl Observers {
    pub fn new() -> Self {
        Observers::default()
    }

    pub fn on_particle_update(&mut self, f: impl FnMut(&ParticleEventData) + 'static) {
        self.particle_update.push(Box::new(f));
    }

    pub fn on_new_neighbour(&mut self, f: impl FnMut(u32, u32) + 'static) {
        self.new_neighbour.push(Box::new(f));
    }

    pub fn on_new_local(&mut self, f: impl FnMut(u32, u32) + 'static) {
        self.new_local.push(Box::new(f));
    }

    pub fn on_cell_changed(&mut self, f: impl FnMut(&CellChanged) + 'static) {
        self.cell_changed.push(Box::new(f));
    }

    pub fn on_reinit(&mut self, f: impl FnMut() + 'static) {
        self.reinit.push(Box::new(f));
    }

    pub fn sig_particle_update(&mut self, data: &ParticleEventData) {
        for f in self.particle_update.iter_mut() {
            f(data);
        }
    }

    pub fn sig_new_neighbour(&mut self, a: u32, b: u32) {
        for f in self.new_neighbour.iter_mut() {
            f(a, b);
        }
    }

    pub fn sig_new_local(&mut self, particle: u32, local: u32) {
        for f in self.new_local.iter_mut() {
            f(particle, local);
        }
    }

    pub fn sig_cell_changed(&mut self, event: &CellChanged) {
        for f in self.cell_changed.iter_mut() {
            f(event);
        }
    }

    pub fn sig_reinit(&mut self) {
        for f in self.reinit.iter_mut() {
            f();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventType;
    use crate::vector::Vec3;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn particle_update_observers_all_fire() {
        let count = Rc::new(RefCell::new(0));
        let mut obs = Observers::new();
        for _ in 0..3 {
            let count = Rc::clone(&count);
            obs.on_particle_update(move |_| *count.borrow_mut() += 1);
        }
        obs.sig_particle_update(&ParticleEventData {
            particle: 0,
            kind: EventType::Core,
            delta_momentum: Vec3::zero(),
            delta_kinetic_energy: 0.0,
        });
        assert_eq!(*count.borrow(), 3);
    }

    #[test]
    fn cell_changed_observer_receives_the_event() {
        let seen = Rc::new(RefCell::new(None));
        let mut obs = Observers::new();
        let seen_clone = Rc::clone(&seen);
        obs.on_cell_changed(move |e| *seen_clone.borrow_mut() = Some(*e));
        obs.sig_cell_changed(&CellChanged {
            particle: 7,
            old_cell: 1,
            new_cell: 2,
        });
        assert_eq!(seen.borrow().unwrap().particle, 7);
    }
}
