//! Cooldown-gated abilities.
//!
//! Abilities are a closed set of tagged variants resolved in one match:
//! activation mutates the caster or spawns projectile entities, then starts
//! the caster's cooldown. A request with missing target data is a silent
//! no-op (no cooldown); an unknown ability name is rejected to the caller.

use std::collections::HashSet;

use hecs::{Entity, World};
use log::debug;

use duskcrawl_logic::geometry::Vec2;

use crate::components::{
    Body, ChainArc, Cooldowns, Health, Name, Projectile, ProjectileKind, VoidHole, VoidHolePhase,
};
use crate::events::SimEvent;

// ── Fireball ────────────────────────────────────────────────────────────
pub const FIREBALL_COOLDOWN_TICKS: u32 = 900;
pub const FIREBALL_DAMAGE: i32 = 30;
pub const FIREBALL_SPEED: f32 = 5.0;
pub const FIREBALL_SIZE: f32 = 20.0;
pub const FIREBALL_BURST_RADIUS: f32 = 200.0;
pub const FIREBALL_BURST_FACTOR: f32 = 0.5;

// ── Heal ────────────────────────────────────────────────────────────────
pub const HEAL_COOLDOWN_TICKS: u32 = 1800;
pub const HEAL_AMOUNT: i32 = 20;

// ── Void hole ───────────────────────────────────────────────────────────
pub const VOID_HOLE_COOLDOWN_TICKS: u32 = 1800;
pub const VOID_HOLE_TRAVEL_SPEED: f32 = 4.0;
pub const VOID_HOLE_MAX_TRAVEL_RANGE: f32 = 700.0;
pub const VOID_HOLE_LIFETIME_MS: u64 = 10_000;
pub const VOID_HOLE_PULL_RADIUS: f32 = 800.0;
pub const VOID_HOLE_DAMAGE_RADIUS: f32 = 60.0;
pub const VOID_HOLE_TICK_DAMAGE: i32 = 20;
pub const VOID_HOLE_PULL_STEP: f32 = 1.5;
pub const VOID_HOLE_DAMAGE_INTERVAL_MS: u64 = 1000;
pub const VOID_HOLE_TRAVEL_SIZE: f32 = 20.0;

// ── Chain lightning ─────────────────────────────────────────────────────
pub const CHAIN_LIGHTNING_COOLDOWN_TICKS: u32 = 600;
pub const CHAIN_LIGHTNING_DAMAGE: i32 = 15;
pub const CHAIN_LIGHTNING_SPEED: f32 = 7.0;
pub const CHAIN_LIGHTNING_STUN_TICKS: u32 = 90;
pub const CHAIN_LIGHTNING_ARC_RANGE: f32 = 250.0;
pub const CHAIN_LIGHTNING_MAX_ARCS: u32 = 3;
pub const CHAIN_LIGHTNING_LENGTH: f32 = 15.0;
pub const CHAIN_LIGHTNING_WIDTH: f32 = 8.0;

/// The closed set of abilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbilityKind {
    Fireball,
    Heal,
    VoidHole,
    ChainLightning,
}

/// Immutable definition shared by every cast of one ability.
#[derive(Debug, Clone, Copy)]
pub struct AbilityDef {
    /// Unique cooldown-map key.
    pub key: &'static str,
    pub cooldown_ticks: u32,
    /// Reserved: no mana pool exists yet, all abilities cost 0.
    pub mana_cost: i32,
}

impl AbilityKind {
    /// Look up an ability by its request name. `None` marks the request
    /// invalid (reported to the caller, no state change).
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "fireball" => Some(Self::Fireball),
            "heal" => Some(Self::Heal),
            "void_hole" => Some(Self::VoidHole),
            "chain_lightning" => Some(Self::ChainLightning),
            _ => None,
        }
    }

    pub fn def(&self) -> AbilityDef {
        match self {
            Self::Fireball => AbilityDef {
                key: "fireball",
                cooldown_ticks: FIREBALL_COOLDOWN_TICKS,
                mana_cost: 0,
            },
            Self::Heal => AbilityDef {
                key: "heal",
                cooldown_ticks: HEAL_COOLDOWN_TICKS,
                mana_cost: 0,
            },
            Self::VoidHole => AbilityDef {
                key: "void_hole",
                cooldown_ticks: VOID_HOLE_COOLDOWN_TICKS,
                mana_cost: 0,
            },
            Self::ChainLightning => AbilityDef {
                key: "chain_lightning",
                cooldown_ticks: CHAIN_LIGHTNING_COOLDOWN_TICKS,
                mana_cost: 0,
            },
        }
    }

    /// Whether the caster could activate this ability right now.
    pub fn is_usable(&self, cooldowns: &Cooldowns) -> bool {
        !cooldowns.is_on(self.def().key)
    }
}

/// Activate one ability for `caster`. Returns `true` when the ability
/// fired (and its cooldown started). Missing target data and an active
/// cooldown both reject silently.
pub fn cast_ability(
    world: &mut World,
    caster: Entity,
    kind: AbilityKind,
    target: Option<Vec2>,
    events: &mut Vec<SimEvent>,
) -> bool {
    let def = kind.def();

    let ready = world
        .get::<&Cooldowns>(caster)
        .map(|cd| !cd.is_on(def.key))
        .unwrap_or(false);
    if !ready {
        debug!("{} rejected: on cooldown", def.key);
        return false;
    }

    let caster_center = match world.get::<&Body>(caster) {
        Ok(body) => body.center(),
        Err(_) => return false,
    };

    let fired = match kind {
        AbilityKind::Fireball => {
            let Some(target) = target else { return false };
            spawn_fireball(world, caster, caster_center, target);
            true
        }
        AbilityKind::Heal => {
            // A heal at full health is still a valid cast and still
            // consumes the cooldown.
            if let Ok(mut health) = world.get::<&mut Health>(caster) {
                health.heal(HEAL_AMOUNT);
            }
            true
        }
        AbilityKind::VoidHole => {
            let Some(target) = target else { return false };
            spawn_void_hole(world, caster, caster_center, target);
            true
        }
        AbilityKind::ChainLightning => {
            let Some(target) = target else { return false };
            if (target - caster_center).length_squared() == 0.0 {
                // No direction to fire in
                return false;
            }
            spawn_chain_bolt(
                world,
                caster,
                caster_center,
                target,
                0,
                HashSet::new(),
            );
            true
        }
    };

    if fired {
        if let Ok(mut cd) = world.get::<&mut Cooldowns>(caster) {
            cd.start(def.key, def.cooldown_ticks);
        }
        let caster_name = world
            .get::<&Name>(caster)
            .map(|n| n.label.clone())
            .unwrap_or_else(|_| "caster".to_owned());
        debug!("{} casts {}", caster_name, def.key);
        events.push(SimEvent::AbilityCast {
            caster_name,
            ability: def.key.to_owned(),
        });
    }
    fired
}

fn spawn_fireball(world: &mut World, owner: Entity, from: Vec2, target: Vec2) {
    let velocity = (target - from).normalize() * FIREBALL_SPEED;
    world.spawn((
        Body::centered_at(from, FIREBALL_SIZE, FIREBALL_SIZE),
        Projectile {
            velocity,
            damage: FIREBALL_DAMAGE,
            owner,
            kind: ProjectileKind::Explosive {
                burst_radius: FIREBALL_BURST_RADIUS,
                burst_damage: (FIREBALL_DAMAGE as f32 * FIREBALL_BURST_FACTOR) as i32,
            },
        },
    ));
}

fn spawn_void_hole(world: &mut World, owner: Entity, from: Vec2, target: Vec2) {
    let to_target = target - from;
    let distance = to_target.length();
    // Travel distance is capped; aiming past the max range plants the
    // hole at the range limit along the aim line.
    let travel = distance.min(VOID_HOLE_MAX_TRAVEL_RANGE);
    let velocity = if distance > 0.0 {
        to_target.normalize() * VOID_HOLE_TRAVEL_SPEED
    } else {
        Vec2::ZERO
    };

    world.spawn((
        Body::centered_at(from, VOID_HOLE_TRAVEL_SIZE, VOID_HOLE_TRAVEL_SIZE),
        Projectile {
            velocity,
            damage: 0,
            owner,
            kind: ProjectileKind::VoidHole(VoidHole {
                phase: VoidHolePhase::Traveling,
                travel_remaining: travel,
                pull_radius: VOID_HOLE_PULL_RADIUS,
                damage_radius: VOID_HOLE_DAMAGE_RADIUS,
                tick_damage: VOID_HOLE_TICK_DAMAGE,
                pull_step: VOID_HOLE_PULL_STEP,
                lifetime_ms: VOID_HOLE_LIFETIME_MS,
                damage_interval_ms: VOID_HOLE_DAMAGE_INTERVAL_MS,
            }),
        },
    ));
}

/// Spawn one bolt of a lightning chain. Successor bolts re-enter here from
/// the projectile system with the accumulated hit-set.
pub(crate) fn spawn_chain_bolt(
    world: &mut World,
    owner: Entity,
    from: Vec2,
    target: Vec2,
    arc_index: u32,
    hit_chain: HashSet<Entity>,
) {
    let velocity = (target - from).normalize() * CHAIN_LIGHTNING_SPEED;
    world.spawn((
        Body::centered_at(from, CHAIN_LIGHTNING_LENGTH, CHAIN_LIGHTNING_WIDTH),
        Projectile {
            velocity,
            damage: CHAIN_LIGHTNING_DAMAGE,
            owner,
            kind: ProjectileKind::ChainArc(ChainArc {
                stun_ticks: CHAIN_LIGHTNING_STUN_TICKS,
                arc_range: CHAIN_LIGHTNING_ARC_RANGE,
                max_arcs: CHAIN_LIGHTNING_MAX_ARCS,
                arc_index,
                hit_chain,
            }),
        },
    ));
}
