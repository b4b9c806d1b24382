//! Ballistic (constant-velocity) trajectory math shared by every
//! Liouvillean variant's "no external field" fast path, and used directly
//! by `Liouvillean::Newtonian` and `Liouvillean::Sllod`.

use crate::vector::Vec3;

/// Smallest `t > 0` at which a particle moving at constant `vel` from `pos`
/// exits the axis-aligned box `[origin, origin + dim)`, plus the signed
/// face index (`±1..=±3`) of the first face hit.
///
/// `spec.md` §4.2 `getSquareCellCollisionTime`/`getSquareCellCollisionDir`.
pub fn square_cell_exit(pos: Vec3, vel: Vec3, origin: Vec3, dim: Vec3) -> (f64, i32) {
    let mut best_t = f64::INFINITY;
    let mut best_dir = 0i32;

    for axis in 0..3 {
        let v = vel.component(axis);
        if v.abs() < f64::EPSILON {
            continue;
        }
        let p = pos.component(axis);
        let lo = origin.component(axis);
        let hi = lo + dim.component(axis);

        let (t, dir) = if v > 0.0 {
            ((hi - p) / v, (axis as i32 + 1))
        } else {
            ((lo - p) / v, -(axis as i32 + 1))
        };

        if t >= 0.0 && t < best_t {
            best_t = t;
            best_dir = dir;
        }
    }

    (best_t, best_dir)
}

/// Earliest `t >= 0` at which two constant-velocity particles separated by
/// `r12 = pos1 - pos2` with relative velocity `v12 = vel1 - vel2` reach
/// squared separation `d_sq` while approaching. `None` if they never reach
/// that separation while approaching (already receding, or the closest
/// approach is farther than `d_sq`).
///
/// `spec.md` §4.2 `getSphereSphereRoot`.
pub fn sphere_sphere_root(r12: Vec3, v12: Vec3, d_sq: f64) -> Option<f64> {
    let b = r12.dot(&v12);
    if b >= 0.0 {
        // Separation is non-decreasing: particles are not approaching.
        return None;
    }

    let a = v12.norm_squared();
    if a < f64::EPSILON {
        return None;
    }

    let c = r12.norm_squared() - d_sq;
    let disc = b * b - a * c;
    if disc < 0.0 {
        return None;
    }

    let t = (-b - disc.sqrt()) / a;
    if t < 0.0 { None } else { Some(t) }
}

/// Earliest `t >= 0` at which `(pos + vel*t - origin) . normal == 0`, given
/// the particle is currently approaching the plane. `normal` points from the
/// wall into the half-space the particle occupies, so a shrinking distance
/// (`vn < 0`) means approach. `spec.md` §4.2 `getWallCollision`.
pub fn wall_collision(pos: Vec3, vel: Vec3, origin: Vec3, normal: Vec3) -> Option<f64> {
    let d0 = (pos - origin).dot(&normal);
    let vn = vel.dot(&normal);
    if vn >= 0.0 {
        return None;
    }
    let t = -d0 / vn;
    if t < 0.0 { None } else { Some(t) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_cell_exit_picks_earliest_positive_face() {
        // particle in a unit cell at origin moving toward +x face
        let pos = Vec3::new(0.9, 0.0, 0.0);
        let vel = Vec3::new(0.2, 0.0, 0.0);
        let origin = Vec3::zero();
        let dim = Vec3::new(1.0, 1.0, 1.0);
        let (t, dir) = square_cell_exit(pos, vel, origin, dim);
        assert!((t - 0.5).abs() < 1e-9);
        assert_eq!(dir, 1);
    }

    #[test]
    fn head_on_spheres_collide_at_half_distance() {
        // particles at -1 and +1 approaching at speed 1 each, diameter 1
        let r12 = Vec3::new(-2.0, 0.0, 0.0);
        let v12 = Vec3::new(2.0, 0.0, 0.0);
        let t = sphere_sphere_root(r12, v12, 1.0).unwrap();
        assert!((t - 0.5).abs() < 1e-9);
    }

    #[test]
    fn receding_spheres_never_collide() {
        let r12 = Vec3::new(-2.0, 0.0, 0.0);
        let v12 = Vec3::new(-2.0, 0.0, 0.0);
        assert!(sphere_sphere_root(r12, v12, 1.0).is_none());
    }

    #[test]
    fn wall_collision_on_approach() {
        // particle at the origin moving toward a wall at z = 1; normal
        // points from the wall back into the particle's half-space.
        let pos = Vec3::zero();
        let vel = Vec3::new(0.0, 0.0, 0.7);
        let origin = Vec3::new(0.0, 0.0, 1.0);
        let normal = Vec3::new(0.0, 0.0, -1.0);
        let t = wall_collision(pos, vel, origin, normal).unwrap();
        assert!((t - (1.0 / 0.7)).abs() < 1e-9);
    }

    #[test]
    fn wall_collision_receding_is_none() {
        let pos = Vec3::new(0.0, 0.0, 0.7);
        let vel = Vec3::new(0.0, 0.0, -0.7);
        let origin = Vec3::new(0.0, 0.0, 1.0);
        let normal = Vec3::new(0.0, 0.0, -1.0);
        assert!(wall_collision(pos, vel, origin, normal).is_none());
    }
}
