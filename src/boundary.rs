//! # Boundary Conditions Module
//!
//! `spec.md` §4.1: a small capability set (`apply_position`,
//! `apply_position_velocity`, `apply_position_dt`, `update`) polymorphic
//! over None / Periodic / Lees-Edwards. Modelled as a closed enum rather
//! than a trait object, per `spec.md` §9's "avoid virtual dispatch on the
//! hot path" note — `applyBC` is called once per particle per event.

use crate::vector::Vec3;
use serde::{Deserialize, Serialize};

/// Boundary condition applied to particle positions (and, for the shearing
/// variant, velocities) as they cross the primary image.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Boundary {
    /// No wrapping; positions grow without bound. Useful for isolated
    /// clusters, per `original_source`'s `BCNone`.
    None,
    /// Periodic rectangular box: wraps each axis into `[-L_i/2, L_i/2)`.
    Periodic { size: Vec3 },
    /// Periodic box sheared in the `x` direction as a function of `y`,
    /// Lees-Edwards style: wrapping in `y` translates the image by
    /// `shear_rate * shear_offset_time * size.y` and kicks `vx` by
    /// `shear_rate * size.y`.
    LeesEdwards {
        size: Vec3,
        shear_rate: f64,
        /// Accumulated time since the shear offset was last reset;
        /// advanced by `update(dt)`.
        shear_offset_time: f64,
    },
}

impl Boundary {
    /// Wraps `pos` into the primary image. Never fails.
    pub fn apply_position(&self, pos: &mut Vec3) {
        match self {
            Boundary::None => {}
            Boundary::Periodic { size } => wrap_periodic(pos, size),
            Boundary::LeesEdwards {
                size,
                shear_rate,
                shear_offset_time,
            } => wrap_shearing(pos, None, size, *shear_rate, *shear_offset_time),
        }
    }

    /// Wraps `pos` and applies the matching velocity kick where the
    /// boundary condition is velocity-dependent (Lees-Edwards).
    pub fn apply_position_velocity(&self, pos: &mut Vec3, vel: &mut Vec3) {
        match self {
            Boundary::None => {}
            Boundary::Periodic { size } => wrap_periodic(pos, size),
            Boundary::LeesEdwards {
                size,
                shear_rate,
                shear_offset_time,
            } => wrap_shearing(pos, Some(vel), size, *shear_rate, *shear_offset_time),
        }
    }

    /// Wraps the position a particle would have after streaming by `dt`,
    /// without mutating velocity. Used by collision predictors that need a
    /// wrapped trial position without committing to the move.
    pub fn apply_position_dt(&self, pos: &mut Vec3, _dt: f64) {
        self.apply_position(pos);
    }

    /// Advances any time-dependent boundary state (the Lees-Edwards shear
    /// offset). A no-op for `None`/`Periodic`.
    pub fn update(&mut self, dt: f64) {
        if let Boundary::LeesEdwards {
            shear_offset_time, ..
        } = self
        {
            *shear_offset_time += dt;
        }
    }

    /// Rounds `pos` the way a write-out snapshot does: apply the boundary
    /// condition without any velocity side effect.
    pub fn rounding(&self, pos: &mut Vec3) {
        self.apply_position(pos);
    }
}

fn wrap_axis(value: f64, length: f64) -> (f64, i64) {
    let half = length / 2.0;
    let shifted = value + half;
    let wraps = (shifted / length).floor();
    (shifted - wraps * length - half, wraps as i64)
}

fn wrap_periodic(pos: &mut Vec3, size: &Vec3) {
    let (x, _) = wrap_axis(pos.x, size.x);
    let (y, _) = wrap_axis(pos.y, size.y);
    let (z, _) = wrap_axis(pos.z, size.z);
    *pos = Vec3::new(x, y, z);
}

fn wrap_shearing(
    pos: &mut Vec3,
    vel: Option<&mut Vec3>,
    size: &Vec3,
    shear_rate: f64,
    shear_offset_time: f64,
) {
    let (y, y_wraps) = wrap_axis(pos.y, size.y);
    let shear_image_shift = shear_rate * shear_offset_time * size.y;

    // Each y-wrap drags the x image by one shear-image-shift, alternating
    // sign with the wrap direction.
    let x_shift = (y_wraps as f64) * shear_image_shift;
    let (x, _) = wrap_axis(pos.x - x_shift, size.x);
    let (z, _) = wrap_axis(pos.z, size.z);

    *pos = Vec3::new(x, y, z);

    if let Some(vel) = vel {
        if y_wraps != 0 {
            vel.x -= (y_wraps as f64) * shear_rate * size.y;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_boundary_is_identity() {
        let bc = Boundary::None;
        let mut pos = Vec3::new(100.0, -50.0, 3.0);
        let before = pos;
        bc.apply_position(&mut pos);
        assert_eq!(pos, before);
    }

    #[test]
    fn periodic_wraps_into_half_open_interval() {
        let bc = Boundary::Periodic {
            size: Vec3::new(10.0, 10.0, 10.0),
        };
        let mut pos = Vec3::new(6.0, 0.0, 0.0);
        bc.apply_position(&mut pos);
        assert!((pos.x - (-4.0)).abs() < 1e-12);
    }

    #[test]
    fn periodic_already_inside_is_unchanged() {
        let bc = Boundary::Periodic {
            size: Vec3::new(10.0, 10.0, 10.0),
        };
        let mut pos = Vec3::new(1.9, 0.0, 0.0);
        bc.apply_position(&mut pos);
        assert!((pos.x - 1.9).abs() < 1e-12);
    }

    #[test]
    fn lees_edwards_kicks_velocity_on_y_wrap() {
        let bc = Boundary::LeesEdwards {
            size: Vec3::new(10.0, 10.0, 10.0),
            shear_rate: 0.5,
            shear_offset_time: 2.0,
        };
        let mut pos = Vec3::new(0.0, 6.0, 0.0);
        let mut vel = Vec3::new(1.0, 0.0, 0.0);
        bc.apply_position_velocity(&mut pos, &mut vel);
        assert!((pos.y - (-4.0)).abs() < 1e-12);
        // one wrap in -y direction: vx -= 1 * 0.5 * 10.0
        assert!((vel.x - (1.0 - 5.0)).abs() < 1e-9);
    }

    #[test]
    fn update_advances_shear_offset_time() {
        let mut bc = Boundary::LeesEdwards {
            size: Vec3::new(10.0, 10.0, 10.0),
            shear_rate: 0.5,
            shear_offset_time: 0.0,
        };
        bc.update(3.0);
        if let Boundary::LeesEdwards {
            shear_offset_time, ..
        } = bc
        {
            assert!((shear_offset_time - 3.0).abs() < 1e-12);
        } else {
            panic!("expected LeesEdwards");
        }
    }
}
