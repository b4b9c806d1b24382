//! Constant-acceleration ("parabola") trajectory math for
//! `Liouvillean::NewtonianGravity`, grounded on
//! `original_source/.../NewtonianGravityL.hpp`'s per-axis quadratic root
//! solves and its periodic re-evaluation sentinel.

use crate::vector::Vec3;

/// Position and velocity of a particle under constant acceleration `g`
/// after streaming for `dt`, per `spec.md` §4.2's parabola stream rule.
pub fn stream(pos: Vec3, vel: Vec3, g: Vec3, dt: f64) -> (Vec3, Vec3) {
    let new_pos = pos + vel * dt + g * (0.5 * dt * dt);
    let new_vel = vel + g * dt;
    (new_pos, new_vel)
}

/// Smallest positive real root of `0.5*a*t^2 + b*t + c == 0`, or `None` if
/// there is no positive real root. Used per-axis by `square_cell_exit`.
fn smallest_positive_root(a: f64, b: f64, c: f64) -> Option<f64> {
    if a.abs() < f64::EPSILON {
        // Degenerate to the linear (ballistic) case on this axis.
        if b.abs() < f64::EPSILON {
            return None;
        }
        let t = -c / b;
        return if t > 0.0 { Some(t) } else { None };
    }

    let disc = b * b - 2.0 * a * c;
    if disc < 0.0 {
        return None;
    }
    let sqrt_disc = disc.sqrt();
    let t1 = (-b - sqrt_disc) / a;
    let t2 = (-b + sqrt_disc) / a;

    match (t1 > 0.0, t2 > 0.0) {
        (true, true) => Some(t1.min(t2)),
        (true, false) => Some(t1),
        (false, true) => Some(t2),
        (false, false) => None,
    }
}

/// Earliest `t > 0` at which a particle under constant acceleration `g`
/// exits the axis-aligned box `[origin, origin + dim)`, plus the signed
/// face index of the first face hit. Falls back to the ballistic solve per
/// axis where `g`'s component is zero.
///
/// `original_source/.../NewtonianGravityL.hpp`'s `getSquareCellCollision2`:
/// each axis is checked against both its low and high face as a quadratic in
/// `t`, and the smallest positive root across all six half-planes wins.
pub fn square_cell_exit(pos: Vec3, vel: Vec3, g: Vec3, origin: Vec3, dim: Vec3) -> (f64, i32) {
    let mut best_t = f64::INFINITY;
    let mut best_dir = 0i32;

    for axis in 0..3 {
        let p = pos.component(axis);
        let v = vel.component(axis);
        let a = g.component(axis);
        let lo = origin.component(axis);
        let hi = lo + dim.component(axis);

        if let Some(t) = smallest_positive_root(a, v, p - hi) {
            if t < best_t {
                best_t = t;
                best_dir = axis as i32 + 1;
            }
        }
        if let Some(t) = smallest_positive_root(a, v, p - lo) {
            if t < best_t {
                best_t = t;
                best_dir = -(axis as i32 + 1);
            }
        }
    }

    (best_t, best_dir)
}

/// Earliest `t > 0` at which two particles under the same constant
/// acceleration (so `g` cancels from the relative motion) reach squared
/// separation `d_sq` while approaching.
///
/// Gravity is common to both particles, so the relative trajectory is still
/// ballistic in `r12`/`v12` — this simply re-exports the Newtonian root
/// solve under the gravity Liouvillean for that reason.
pub fn sphere_sphere_root(r12: Vec3, v12: Vec3, d_sq: f64) -> Option<f64> {
    super::newtonian::sphere_sphere_root(r12, v12, d_sq)
}

/// The interval after which the parabola sentinel must re-fire: gravity
/// bends what would otherwise be straight-line predictions, so any event
/// whose predicted `dt` exceeds this bound is untrustworthy and must be
/// recomputed rather than trusted as-is.
///
/// `original_source/.../ParabolaSentinel.cpp` picks this as the time for
/// the particle's velocity (plus `g`) to change direction on any axis,
/// i.e. the smallest `|v_i / g_i|` across axes with nonzero `g_i`.
pub fn sentinel_time(vel: Vec3, g: Vec3) -> f64 {
    let mut best = f64::INFINITY;
    for axis in 0..3 {
        let a = g.component(axis);
        if a.abs() < f64::EPSILON {
            continue;
        }
        let t = (vel.component(axis) / a).abs();
        if t < best {
            best = t;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_matches_kinematics() {
        let pos = Vec3::zero();
        let vel = Vec3::new(1.0, 0.0, 0.0);
        let g = Vec3::new(0.0, 0.0, -1.0);
        let (new_pos, new_vel) = stream(pos, vel, g, 2.0);
        assert!((new_pos.x - 2.0).abs() < 1e-12);
        assert!((new_pos.z - (-2.0)).abs() < 1e-12);
        assert!((new_vel.z - (-2.0)).abs() < 1e-12);
    }

    #[test]
    fn square_cell_exit_falls_back_to_ballistic_without_gravity() {
        let pos = Vec3::new(0.9, 0.0, 0.0);
        let vel = Vec3::new(0.2, 0.0, 0.0);
        let g = Vec3::zero();
        let origin = Vec3::zero();
        let dim = Vec3::new(1.0, 1.0, 1.0);
        let (t, dir) = square_cell_exit(pos, vel, g, origin, dim);
        assert!((t - 0.5).abs() < 1e-9);
        assert_eq!(dir, 1);
    }

    #[test]
    fn square_cell_exit_with_downward_gravity_hits_floor() {
        // particle at rest in the middle of a unit cell, g pulls it to -z
        let pos = Vec3::new(0.5, 0.5, 0.5);
        let vel = Vec3::zero();
        let g = Vec3::new(0.0, 0.0, -2.0);
        let origin = Vec3::zero();
        let dim = Vec3::new(1.0, 1.0, 1.0);
        let (t, dir) = square_cell_exit(pos, vel, g, origin, dim);
        // 0.5 = 0.5 * 2.0 * t^2 => t = sqrt(0.5)
        assert!((t - 0.5f64.sqrt()).abs() < 1e-9);
        assert_eq!(dir, -3);
    }

    #[test]
    fn sentinel_time_is_smallest_axis_turnaround() {
        let vel = Vec3::new(4.0, 1.0, 0.0);
        let g = Vec3::new(-2.0, -1.0, 0.0);
        // axis 0: 4/2 = 2.0, axis 1: 1/1 = 1.0 -> smallest is 1.0
        assert!((sentinel_time(vel, g) - 1.0).abs() < 1e-12);
    }
}
