//! Projectile and area-effect components.
//!
//! Every in-flight shot and active field is an entity with a [`Projectile`]
//! component; the four behaviors are a closed set of tagged variants
//! dispatched by a single match in the projectile system, not an open
//! trait hierarchy.

use std::collections::HashSet;

use hecs::Entity;

use duskcrawl_logic::geometry::Vec2;

/// Common projectile state. The kind payload carries everything specific
/// to one behavior.
#[derive(Debug, Clone)]
pub struct Projectile {
    /// Displacement applied per tick while flying.
    pub velocity: Vec2,
    /// Damage dealt on a direct hit.
    pub damage: i32,
    /// Spawning entity. A non-owning handle: the owner may die while the
    /// projectile is in flight.
    pub owner: Entity,
    pub kind: ProjectileKind,
}

/// The closed set of projectile behaviors.
#[derive(Debug, Clone)]
pub enum ProjectileKind {
    /// Flies straight, despawns on the first wall, bound, or enemy hit.
    Linear,
    /// Linear flight; every impact additionally triggers an area burst.
    Explosive {
        burst_radius: f32,
        burst_damage: i32,
    },
    /// Travels to a clamped target point, then anchors as an area-denial
    /// field that pulls and periodically damages enemies.
    VoidHole(VoidHole),
    /// On hit: damage + stun, then arcs to the nearest enemy not yet
    /// struck in this chain.
    ChainArc(ChainArc),
}

/// Area-denial field state.
#[derive(Debug, Clone)]
pub struct VoidHole {
    pub phase: VoidHolePhase,
    /// Pixels left before the travel phase ends.
    pub travel_remaining: f32,
    pub pull_radius: f32,
    pub damage_radius: f32,
    /// Damage per periodic application while active.
    pub tick_damage: i32,
    /// Constant-magnitude pull step per tick, in pixels.
    pub pull_step: f32,
    pub lifetime_ms: u64,
    pub damage_interval_ms: u64,
}

/// Travel-then-anchor lifecycle of the void hole. Timestamps come from the
/// injected clock, never a global read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoidHolePhase {
    Traveling,
    Active {
        activated_at_ms: u64,
        last_damage_ms: u64,
    },
}

/// Chain-lightning bolt state.
#[derive(Debug, Clone)]
pub struct ChainArc {
    /// Stun applied to each struck enemy, in ticks.
    pub stun_ticks: u32,
    /// Maximum arc-to-next-target distance in pixels.
    pub arc_range: f32,
    /// Successor bolts allowed after the initial one.
    pub max_arcs: u32,
    /// Position of this bolt in the chain (0 = initial cast).
    pub arc_index: u32,
    /// Enemies already struck anywhere in this chain. Copied by value into
    /// each successor so branches would diverge independently.
    pub hit_chain: HashSet<Entity>,
}
