//! Damage application, player-enemy contact damage, cooldown ticking, and
//! dead-entity cleanup.

use hecs::{Entity, World};
use log::debug;

use crate::components::{Body, Cooldowns, EnemyAgent, Health, Name, Player};
use crate::events::SimEvent;

/// Damage dealt when a live enemy overlaps the player.
pub const CONTACT_DAMAGE: i32 = 5;
/// Ticks between contact-damage applications. The cooldown is shared: one
/// application per window no matter how many enemies are touching.
pub const CONTACT_COOLDOWN_TICKS: u32 = 60;
/// Cooldown-map key for contact damage.
pub const CONTACT_COOLDOWN_KEY: &str = "enemy_contact";

/// Apply damage to one entity, emitting a single death event when health
/// crosses to zero. Safe against dead and already-despawned targets.
pub fn damage_entity(world: &mut World, target: Entity, amount: i32, events: &mut Vec<SimEvent>) {
    let died = match world.get::<&mut Health>(target) {
        Ok(mut health) => health.damage(amount),
        Err(_) => return,
    };

    if died {
        let name = world
            .get::<&Name>(target)
            .map(|n| n.label.clone())
            .unwrap_or_else(|_| "entity".to_owned());
        debug!("{} died", name);
        events.push(SimEvent::Died {
            entity: target,
            name,
        });
    }
}

/// Resolve player-enemy contact. The first overlapping live enemy damages
/// the player and starts the shared contact cooldown.
pub fn contact_damage_system(world: &mut World, player: Entity, events: &mut Vec<SimEvent>) {
    let player_rect = match world.get::<&Body>(player) {
        Ok(body) => body.rect,
        Err(_) => return,
    };

    let on_cooldown = world
        .get::<&Cooldowns>(player)
        .map(|cd| cd.is_on(CONTACT_COOLDOWN_KEY))
        .unwrap_or(true);
    if on_cooldown {
        return;
    }

    let touching = world
        .query::<(&EnemyAgent, &Body, &Health)>()
        .iter()
        .any(|(_, (_, body, health))| health.alive && body.rect.overlaps(&player_rect));
    if !touching {
        return;
    }

    damage_entity(world, player, CONTACT_DAMAGE, events);
    if let Ok(mut cd) = world.get::<&mut Cooldowns>(player) {
        cd.start(CONTACT_COOLDOWN_KEY, CONTACT_COOLDOWN_TICKS);
    }
}

/// Decrement every entity's cooldowns by one tick.
pub fn tick_cooldowns_system(world: &mut World) {
    for (_, cd) in world.query_mut::<&mut Cooldowns>() {
        cd.tick();
    }
}

/// Despawn every entity whose health has run out. Runs at the end of the
/// tick so nothing later in the same pass sees a dead entity.
pub fn purge_dead(world: &mut World) -> usize {
    let dead: Vec<Entity> = world
        .query::<&Health>()
        .iter()
        .filter(|(_, health)| !health.alive)
        .map(|(entity, _)| entity)
        .collect();

    let count = dead.len();
    for entity in dead {
        let _ = world.despawn(entity);
    }
    count
}
