//! # Scheduler Module
//!
//! The event loop: pop the next due event, advance the clock, dispatch by
//! event type, and re-predict whatever it invalidated. `spec.md` §4.5's
//! lazy-invalidation invariant — an event carries the counters its
//! participants had when it was enqueued, and a mismatch at pop time means
//! it's stale and gets silently dropped rather than executed — is the
//! central correctness property this module has to uphold.
//!
//! Grounded on `original_source/src/dynamo/dynamo/schedulers/dumbsched.cpp`'s
//! `addEvents`/`runNextEvent` shape, narrowed from its O(N) global scan to a
//! neighbourhood-bounded one using `SimContext::cells`.

use crate::cells::CellCoord;
use crate::context::SimContext;
use crate::event::{Event, EventType};
use crate::observer::CellChanged;
use crate::sorter::Sorter;

/// Recomputes and re-enqueues `owner`'s single pending event from scratch:
/// its own cell-exit time, every wall, and every particle in its
/// neighbourhood, keeping the earliest. `original_source`'s `fullUpdate`.
pub fn full_update(ctx: &mut SimContext, owner: u32) {
    let particle = ctx.particles[owner as usize];
    if !particle.is_dynamic() {
        ctx.sorter.push(owner as usize, Event::none(owner, particle.counter));
        return;
    }

    let mut best = Event::none(owner, particle.counter);

    // Cell-exit event: always present for a dynamic particle, serves as
    // the upper bound on every other candidate's relevance radius.
    let coords = ctx.cells.coords_of_position(particle.position);
    let cell_origin = ctx.cells.cell_origin(coords);
    let cell_dim = ctx.cells.cell_dimensions();
    let (cell_dt, cell_dir) =
        ctx.liouvillean
            .get_square_cell_collision_time(&particle, cell_origin, cell_dim);
    if cell_dt < best.dt {
        best = Event {
            dt: cell_dt,
            kind: EventType::Cell,
            owner,
            partner: None,
            collaborator: None,
            extra: cell_dir as i64,
            owner_counter: particle.counter,
            partner_counter: None,
        };
    }

    // Wall events.
    for wall in &ctx.walls {
        if let Some(dt) = ctx
            .liouvillean
            .get_wall_collision(&particle, wall.origin, wall.normal)
        {
            if dt < best.dt {
                best = Event {
                    dt,
                    kind: EventType::Wall,
                    owner,
                    partner: None,
                    collaborator: Some(wall.id),
                    extra: 0,
                    owner_counter: particle.counter,
                    partner_counter: None,
                };
            }
        }
    }

    // Core events against every particle in the local neighbourhood.
    let neighbourhood = ctx.cells.neighbourhood(coords, ctx.overlink);
    for other_id in neighbourhood {
        if other_id == owner {
            continue;
        }
        let other = ctx.particles[other_id as usize];
        let r12 = particle.position - other.position;
        let v12 = particle.velocity - other.velocity;
        let d = ctx.species_of(particle.species).diameter / 2.0
            + ctx.species_of(other.species).diameter / 2.0;
        if let Some(dt) = ctx.liouvillean.get_sphere_sphere_root(r12, v12, d * d) {
            if dt < best.dt {
                best = Event {
                    dt,
                    kind: EventType::Core,
                    owner,
                    partner: Some(other_id),
                    collaborator: None,
                    extra: 0,
                    owner_counter: particle.counter,
                    partner_counter: Some(other.counter),
                };
            }
        }
    }

    ctx.sorter.push(owner as usize, best);
}

/// Recomputes every dynamic particle's pending event from scratch.
/// `original_source`'s `initialise`/`rebuildList`.
pub fn rebuild_system_events(ctx: &mut SimContext) {
    let ids: Vec<u32> = (0..ctx.particles.len() as u32).collect();
    for id in ids {
        full_update(ctx, id);
    }
}

/// Executes exactly one event: pops the earliest pending event, advances
/// the clock and every particle's free-flight state by its `dt`, and
/// dispatches by event type. Returns `false` once nothing is left to
/// schedule (every dynamic particle has gone to sleep or the system is
/// empty).
pub fn advance(ctx: &mut SimContext) -> bool {
    let Some(owner) = ctx.sorter.next_id() else {
        return false;
    };
    let event = *ctx.sorter.next_event().unwrap();
    if event.is_none() {
        return false;
    }

    // Every dynamic particle is streamed up to the new clock value here,
    // rather than lazily on next touch: `Particle::last_update`/`counter`
    // still give `get_particle_delay` something honest to report, but nothing
    // downstream depends on a particle being behind `ctx.time`.
    let dt = event.dt;
    ctx.sorter.stream(dt);
    ctx.time += dt;
    ctx.boundary.update(dt);

    for particle in ctx.particles.iter_mut() {
        if particle.is_dynamic() {
            ctx.liouvillean.update_particle(particle, ctx.time);
            ctx.boundary
                .apply_position_velocity(&mut particle.position, &mut particle.velocity);
        }
    }

    // Lazy invalidation: if either participant moved on since this event
    // was enqueued, it's stale — drop it and re-predict just the owner.
    let owner_stale = ctx.particles[owner].counter != event.owner_counter;
    let partner_stale = match (event.partner, event.partner_counter) {
        (Some(p), Some(c)) => ctx.particles[p as usize].counter != c,
        _ => false,
    };
    if owner_stale || partner_stale {
        tracing::trace!(owner, ?event.kind, "dropping stale event, re-predicting owner");
        full_update(ctx, owner as u32);
        return true;
    }

    match event.kind {
        EventType::Core => run_core_event(ctx, owner as u32, event),
        EventType::Wall => run_wall_event(ctx, owner as u32, event),
        EventType::Cell => run_cell_event(ctx, owner as u32, event),
        EventType::Virtual => full_update(ctx, owner as u32),
        EventType::Sleep => {
            ctx.particles[owner] = ctx.particles[owner].frozen();
            full_update(ctx, owner as u32);
        }
        EventType::WellIn | EventType::WellOut | EventType::None => {
            full_update(ctx, owner as u32);
        }
    }

    true
}

fn run_core_event(ctx: &mut SimContext, owner: u32, event: Event) {
    let partner = event.partner.expect("Core event always has a partner");
    let m1 = ctx.species_of(ctx.particles[owner as usize].species).mass;
    let m2 = ctx.species_of(ctx.particles[partner as usize].species).mass;
    let elasticity = ctx
        .species_of(ctx.particles[owner as usize].species)
        .elasticity
        .min(ctx.species_of(ctx.particles[partner as usize].species).elasticity);

    let (mut p1, mut p2) = take_two(&mut ctx.particles, owner as usize, partner as usize);
    let (d1, d2) = ctx
        .liouvillean
        .run_smooth_sphere_collision(&mut p1, &mut p2, m1, m2, elasticity);
    ctx.particles[owner as usize] = p1;
    ctx.particles[partner as usize] = p2;

    ctx.observers.sig_particle_update(&d1);
    ctx.observers.sig_particle_update(&d2);

    full_update(ctx, owner);
    full_update(ctx, partner);
}

fn run_wall_event(ctx: &mut SimContext, owner: u32, event: Event) {
    let wall_id = event.collaborator.expect("Wall event always names a wall");
    let wall = *ctx.walls.iter().find(|w| w.id == wall_id).expect("wall not found");
    let mass = ctx.species_of(ctx.particles[owner as usize].species).mass;

    let data = ctx.liouvillean.run_wall_collision(
        &mut ctx.particles[owner as usize],
        mass,
        wall.normal,
        wall.elasticity,
    );
    ctx.observers.sig_particle_update(&data);
    full_update(ctx, owner);
}

fn run_cell_event(ctx: &mut SimContext, owner: u32, event: Event) {
    let new_coords = exit_coords(ctx, owner, event.extra as i32);
    if let Some(old_cell) = ctx.cells.relocate(owner, new_coords) {
        let new_cell = ctx.cells.cell_of(owner).expect("just relocated");
        ctx.observers.sig_cell_changed(&CellChanged {
            particle: owner,
            old_cell,
            new_cell,
        });
    }

    full_update(ctx, owner);
}

/// Translates a signed exit-face code (`spec.md` §4.2's `±axis` convention)
/// into the coordinates of the cell on the far side of that face.
fn exit_coords(ctx: &SimContext, owner: u32, dir: i32) -> CellCoord {
    let particle = ctx.particles[owner as usize];
    let coords = ctx.cells.coords_of_position(particle.position);
    if dir == 0 {
        return coords;
    }
    let axis = (dir.unsigned_abs() - 1) as usize;
    let delta = if dir > 0 { 1 } else { -1 };
    let mut out = coords;
    match axis {
        0 => out.x += delta as i64,
        1 => out.y += delta as i64,
        2 => out.z += delta as i64,
        _ => unreachable!(),
    }
    out
}

/// Safe simultaneous mutable access to two distinct particle slots.
fn take_two(
    particles: &mut [crate::particle::Particle],
    a: usize,
    b: usize,
) -> (crate::particle::Particle, crate::particle::Particle) {
    assert_ne!(a, b, "a particle cannot collide with itself");
    (particles[a], particles[b])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::Boundary;
    use crate::context::{SimContext, SorterStrategy};
    use crate::liouvillean::Liouvillean;
    use crate::particle::Particle;
    use crate::sorter::CbtSorter;
    use crate::species::Species;
    use crate::vector::Vec3;

    fn two_particle_context(p1: Particle, p2: Particle) -> SimContext {
        SimContext::new(
            vec![p1, p2],
            vec![Species::new(0, 1.0, 1.0, 1.0)],
            Boundary::None,
            Liouvillean::Newtonian,
            Vec::new(),
            Vec3::new(-50.0, -50.0, -50.0),
            Vec3::new(100.0, 100.0, 100.0),
            1.0,
            SorterStrategy::Cbt(CbtSorter::new(2)),
        )
        .unwrap()
    }

    #[test]
    fn head_on_spheres_collide_at_expected_time() {
        let p1 = Particle::new(0, Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), 0);
        let p2 = Particle::new(1, Vec3::new(1.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0), 0);
        let mut ctx = two_particle_context(p1, p2);
        rebuild_system_events(&mut ctx);

        assert!(advance(&mut ctx));
        assert!((ctx.time - 0.5).abs() < 1e-6);
        assert!(ctx.particles[0].velocity.x < 0.0);
        assert!(ctx.particles[1].velocity.x > 0.0);
    }

    #[test]
    fn full_update_on_frozen_particle_produces_none_event() {
        let p1 = Particle::new(0, Vec3::zero(), Vec3::zero(), 0).frozen();
        let p2 = Particle::new(1, Vec3::new(10.0, 10.0, 10.0), Vec3::zero(), 0);
        let mut ctx = two_particle_context(p1, p2);
        full_update(&mut ctx, 0);
        assert!(ctx.sorter.next_event().is_some());
    }
}
