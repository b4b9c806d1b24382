//! # Event Module
//!
//! The discriminated event record `spec.md` §3 describes: a relative time
//! (`dt`), a type tag, collaborator identifiers, and an opaque `extra` slot
//! for index-within-mesh / face-of-triangle data.

use serde::{Deserialize, Serialize};

/// Tag drawn from the set `spec.md` §3 names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventType {
    /// Hard collision between two particles.
    Core,
    /// Step-potential well, entering.
    WellIn,
    /// Step-potential well, leaving.
    WellOut,
    /// Cell-boundary crossing (virtual — no physics, just re-indexing).
    Cell,
    /// Particle/wall or particle/mesh-face collision.
    Wall,
    /// No physics; forces a recomputation (e.g. the parabola sentinel).
    Virtual,
    /// Removes a particle from active dynamics.
    Sleep,
    /// Sentinel: no event currently scheduled (`dt == +inf`).
    None,
}

/// A single pending or executed event.
///
/// `dt` is always relative to the simulation's current reference moment
/// (the last bulk-stream). `Sorter::stream` subtracts the advanced time from
/// every pending event's `dt` in O(1) by shifting a time origin rather than
/// touching each key — see `sorter` module docs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Event {
    pub dt: f64,
    pub kind: EventType,
    /// Owning particle.
    pub owner: u32,
    /// Partner particle ID for binary (Core/Well) events; unused otherwise.
    pub partner: Option<u32>,
    /// ID of the global/local/system object this event belongs to, for
    /// Cell/Wall/Virtual/Sleep events.
    pub collaborator: Option<u32>,
    /// Opaque extra data: mesh index, triangle face, cell exit axis, etc.
    pub extra: i64,
    /// `owner`'s counter at the time this event was enqueued. A mismatch at
    /// pop time means the event is stale and must be discarded
    /// (`spec.md` §4.5 lazy-invalidation invariant).
    pub owner_counter: u64,
    /// `partner`'s counter at enqueue time, if this is a binary event.
    pub partner_counter: Option<u64>,
}

impl Event {
    /// The "no event currently scheduled" sentinel: `dt == +inf` compares
    /// greater than any finite key, per `spec.md` §4.4.
    pub fn none(owner: u32, owner_counter: u64) -> Self {
        Event {
            dt: f64::INFINITY,
            kind: EventType::None,
            owner,
            partner: None,
            collaborator: None,
            extra: 0,
            owner_counter,
            partner_counter: None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self.kind, EventType::None) || !self.dt.is_finite()
    }

    /// Deterministic tie-break key for events sharing an identical `dt`:
    /// (particle ID, partner ID, event-type tag), per `spec.md` §5.
    pub fn tie_break_key(&self) -> (u32, u32, EventType) {
        (self.owner, self.partner.unwrap_or(u32::MAX), self.kind)
    }
}

/// Per-particle delta produced by executing an event, handed to observers
/// via `particle_update` (`spec.md` §4.6).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ParticleEventData {
    pub particle: u32,
    pub kind: EventType,
    pub delta_momentum: crate::vector::Vec3,
    pub delta_kinetic_energy: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_event_is_none() {
        let e = Event::none(0, 0);
        assert!(e.is_none());
        assert_eq!(e.dt, f64::INFINITY);
    }

    #[test]
    fn tie_break_key_orders_by_owner_then_partner_then_kind() {
        let a = Event {
            partner: Some(3),
            kind: EventType::Core,
            ..Event::none(1, 0)
        };
        let b = Event {
            partner: Some(5),
            kind: EventType::Core,
            ..Event::none(1, 0)
        };
        assert!(a.tie_break_key() < b.tie_break_key());
    }
}
