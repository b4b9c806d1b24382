//! # Liouvillean Module
//!
//! The dynamics law: how a particle's position/velocity evolve between
//! events (`stream`), and how collisions change them (`run_*`). `spec.md`
//! §4.2 lists this as a small closed set of variants rather than a trait
//! object, since every call site already knows which law the whole
//! simulation uses — there is no per-particle polymorphism to support.
//!
//! Grounded on `original_source/src/dynamics/liouvillean/liouvillean.cpp`'s
//! dispatch table and `NewtonianGravityL.hpp`'s parabola-specific overrides.

mod gravity;
mod newtonian;
mod triangle;

pub use triangle::TriangleContact;

use crate::event::ParticleEventData;
use crate::event::EventType;
use crate::particle::Particle;
use crate::vector::Vec3;
use serde::{Deserialize, Serialize};

/// The equation of motion shared by every particle in a simulation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Liouvillean {
    /// Straight-line motion between events.
    Newtonian,
    /// Straight-line motion plus a constant body acceleration, with the
    /// periodic re-evaluation the parabola sentinel enforces.
    NewtonianGravity { g: Vec3 },
    /// Newtonian motion plus the SLLOD velocity-gradient term used to drive
    /// homogeneous shear flow under a `Boundary::LeesEdwards` box.
    Sllod { shear_rate: f64 },
}

impl Liouvillean {
    /// Advances `particle`'s position and velocity by `dt`, in place, and
    /// bumps neither `counter` nor `last_update` — callers that want the
    /// bookkeeping updated too should go through `update_particle`.
    pub fn stream(&self, particle: &mut Particle, dt: f64) {
        match self {
            Liouvillean::Newtonian => {
                particle.position = particle.position + particle.velocity * dt;
            }
            Liouvillean::NewtonianGravity { g } => {
                let (pos, vel) = gravity::stream(particle.position, particle.velocity, *g, dt);
                particle.position = pos;
                particle.velocity = vel;
            }
            Liouvillean::Sllod { shear_rate } => {
                // Homogeneous shear: the box-frame velocity gradient adds
                // shear_rate * y to vx, so position and velocity are
                // updated with that coupling rather than treated as two
                // independent ballistic axes.
                let vx = particle.velocity.x + shear_rate * particle.position.y * dt;
                particle.position = particle.position
                    + Vec3::new(vx, particle.velocity.y, particle.velocity.z) * dt;
                particle.velocity.x = vx;
            }
        }
    }

    /// Streams `particle` up to `now` and marks it current, resetting the
    /// delay `get_particle_delay` would otherwise report. `spec.md` §4.2's
    /// `updateParticle`.
    pub fn update_particle(&self, particle: &mut Particle, now: f64) {
        let dt = particle.delay(now);
        if dt > 0.0 {
            self.stream(particle, dt);
        }
        particle.last_update = now;
    }

    /// How long ago `particle` was last streamed, relative to `now`.
    pub fn get_particle_delay(&self, particle: &Particle, now: f64) -> f64 {
        particle.delay(now)
    }

    /// Earliest `t >= 0` and signed exit face at which `particle` (streamed
    /// from its *current* stored state, not from `now`) leaves the
    /// axis-aligned cell `[origin, origin + dim)`.
    pub fn get_square_cell_collision_time(
        &self,
        particle: &Particle,
        origin: Vec3,
        dim: Vec3,
    ) -> (f64, i32) {
        match self {
            Liouvillean::Newtonian | Liouvillean::Sllod { .. } => {
                newtonian::square_cell_exit(particle.position, particle.velocity, origin, dim)
            }
            Liouvillean::NewtonianGravity { g } => gravity::square_cell_exit(
                particle.position,
                particle.velocity,
                *g,
                origin,
                dim,
            ),
        }
    }

    /// Earliest `t >= 0` at which two particles separated by `r12` with
    /// relative velocity `v12` reach squared separation `d_sq`.
    pub fn get_sphere_sphere_root(&self, r12: Vec3, v12: Vec3, d_sq: f64) -> Option<f64> {
        match self {
            Liouvillean::Newtonian
            | Liouvillean::Sllod { .. }
            | Liouvillean::NewtonianGravity { .. } => {
                // Gravity is common-mode to both particles and cancels out
                // of the relative trajectory; SLLOD's shear term is a
                // boundary-crossing effect, not a per-step body force, so
                // the relative motion used for root-finding stays ballistic
                // in both cases.
                newtonian::sphere_sphere_root(r12, v12, d_sq)
            }
        }
    }

    /// Earliest `t >= 0` at which `particle` reaches the plane through
    /// `origin` with the given (particle-side) `normal`.
    pub fn get_wall_collision(
        &self,
        particle: &Particle,
        origin: Vec3,
        normal: Vec3,
    ) -> Option<f64> {
        newtonian::wall_collision(particle.position, particle.velocity, origin, normal)
    }

    /// Earliest `t >= 0` at which `particle` (treated as a sphere of
    /// `radius`) first touches the triangular mesh face `(a, b, c)`, tagged
    /// by which region (face/edge/corner) it touches.
    pub fn get_sphere_triangle_event(
        &self,
        particle: &Particle,
        radius: f64,
        a: Vec3,
        b: Vec3,
        c: Vec3,
    ) -> Option<(f64, TriangleContact)> {
        triangle::sphere_triangle_event(particle.position, particle.velocity, radius, a, b, c)
    }

    /// The bound beyond which a predicted event time for `particle` can no
    /// longer be trusted without re-evaluation, per the parabola sentinel.
    /// `None` under Newtonian/Sllod, which have no curved trajectories.
    pub fn sentinel_time(&self, particle: &Particle) -> Option<f64> {
        match self {
            Liouvillean::NewtonianGravity { g } => {
                Some(gravity::sentinel_time(particle.velocity, *g))
            }
            _ => None,
        }
    }

    /// Executes an elastic hard-sphere collision between `p1` and `p2` of
    /// the given masses, diameter, and coefficient of restitution, mutating
    /// both particles' velocities in place and returning the per-particle
    /// deltas observers are notified with.
    ///
    /// Grounded on `original_source/.../liouvillean.cpp`'s
    /// `runSphereCollision` impulse formula:
    /// `j = -(1+e) * mu * (v12 . n)`, `mu` the reduced mass, `n` the unit
    /// line of centers.
    pub fn run_smooth_sphere_collision(
        &self,
        p1: &mut Particle,
        p2: &mut Particle,
        m1: f64,
        m2: f64,
        elasticity: f64,
    ) -> (ParticleEventData, ParticleEventData) {
        let r12 = p1.position - p2.position;
        let n = r12.normalize();
        let v12 = p1.velocity - p2.velocity;
        let vn = v12.dot(&n);

        let ke_before = 0.5 * m1 * p1.velocity.norm_squared() + 0.5 * m2 * p2.velocity.norm_squared();

        let reduced_mass = (m1 * m2) / (m1 + m2);
        let j = -(1.0 + elasticity) * reduced_mass * vn;
        let impulse = n * j;

        p1.velocity = p1.velocity + impulse / m1;
        p2.velocity = p2.velocity - impulse / m2;

        p1.counter += 1;
        p2.counter += 1;

        let ke_after = 0.5 * m1 * p1.velocity.norm_squared() + 0.5 * m2 * p2.velocity.norm_squared();
        let delta_ke = ke_after - ke_before;

        (
            ParticleEventData {
                particle: p1.id,
                kind: EventType::Core,
                delta_momentum: impulse,
                delta_kinetic_energy: delta_ke * 0.5,
            },
            ParticleEventData {
                particle: p2.id,
                kind: EventType::Core,
                delta_momentum: -impulse,
                delta_kinetic_energy: delta_ke * 0.5,
            },
        )
    }

    /// Executes an elastic wall collision: reflects the velocity component
    /// along `normal`, scaled by `elasticity`.
    pub fn run_wall_collision(
        &self,
        particle: &mut Particle,
        mass: f64,
        normal: Vec3,
        elasticity: f64,
    ) -> ParticleEventData {
        let vn = particle.velocity.dot(&normal);
        let ke_before = 0.5 * mass * particle.velocity.norm_squared();

        let impulse = normal * (-(1.0 + elasticity) * vn);
        particle.velocity = particle.velocity + impulse;
        particle.counter += 1;

        let ke_after = 0.5 * mass * particle.velocity.norm_squared();

        ParticleEventData {
            particle: particle.id,
            kind: EventType::Wall,
            delta_momentum: impulse * mass,
            delta_kinetic_energy: ke_after - ke_before,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::Particle;

    #[test]
    fn newtonian_stream_is_straight_line() {
        let lv = Liouvillean::Newtonian;
        let mut p = Particle::new(0, Vec3::zero(), Vec3::new(1.0, 2.0, 3.0), 0);
        lv.stream(&mut p, 2.0);
        assert_eq!(p.position, Vec3::new(2.0, 4.0, 6.0));
    }

    #[test]
    fn update_particle_resets_delay() {
        let lv = Liouvillean::Newtonian;
        let mut p = Particle::new(0, Vec3::zero(), Vec3::new(1.0, 0.0, 0.0), 0);
        lv.update_particle(&mut p, 5.0);
        assert_eq!(p.last_update, 5.0);
        assert_eq!(p.position, Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(lv.get_particle_delay(&p, 5.0), 0.0);
    }

    #[test]
    fn elastic_head_on_collision_reverses_equal_masses() {
        let lv = Liouvillean::Newtonian;
        let mut p1 = Particle::new(0, Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), 0);
        let mut p2 = Particle::new(1, Vec3::new(1.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0), 0);
        lv.run_smooth_sphere_collision(&mut p1, &mut p2, 1.0, 1.0, 1.0);
        assert!((p1.velocity.x - (-1.0)).abs() < 1e-9);
        assert!((p2.velocity.x - 1.0).abs() < 1e-9);
    }

    #[test]
    fn gravity_sentinel_time_is_some_only_under_gravity() {
        let p = Particle::new(0, Vec3::zero(), Vec3::new(1.0, 0.0, 0.0), 0);
        assert!(Liouvillean::Newtonian.sentinel_time(&p).is_none());
        let g_lv = Liouvillean::NewtonianGravity {
            g: Vec3::new(-1.0, 0.0, 0.0),
        };
        assert!(g_lv.sentinel_time(&p).is_some());
    }
}
