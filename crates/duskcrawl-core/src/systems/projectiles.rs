//! Projectile and area-effect state machines.
//!
//! One pass advances every projectile by one tick. Enemy positions are
//! snapshotted up front; damage, stuns, pulls, chain successors, and
//! despawns are collected during iteration and applied afterwards, so the
//! pass never mutates what it is iterating.

use hecs::{Entity, World};
use log::debug;

use duskcrawl_logic::geometry::{Rect, Vec2};
use duskcrawl_logic::grid::TileGrid;

use crate::components::{
    Body, EnemyAgent, Health, Projectile, ProjectileKind, VoidHolePhase,
};
use crate::events::SimEvent;
use crate::systems::abilities::spawn_chain_bolt;
use crate::systems::combat::damage_entity;

/// Pixel size of the anchored void-hole field (the traveling form is
/// smaller; the body grows on activation).
pub const VOID_HOLE_ACTIVE_SIZE: f32 = 40.0;

struct EnemySnapshot {
    entity: Entity,
    rect: Rect,
}

/// Advance every projectile's state machine by one tick.
///
/// `now_ms` is the injected wall-clock used by void-hole activation and
/// lifetime timestamps; everything else is tick-counted.
pub fn projectile_update_system(
    world: &mut World,
    grid: &TileGrid,
    now_ms: u64,
    events: &mut Vec<SimEvent>,
) {
    let enemies: Vec<EnemySnapshot> = world
        .query::<(&EnemyAgent, &Body, &Health)>()
        .iter()
        .filter(|(_, (_, _, health))| health.alive)
        .map(|(entity, (_, body, _))| EnemySnapshot {
            entity,
            rect: body.rect,
        })
        .collect();

    let mut hits: Vec<(Entity, i32)> = Vec::new();
    let mut stuns: Vec<(Entity, u32)> = Vec::new();
    let mut pulls: Vec<(Entity, Vec2)> = Vec::new();
    let mut successors: Vec<ChainSuccessor> = Vec::new();
    let mut despawns: Vec<Entity> = Vec::new();

    for (entity, (body, proj)) in world.query_mut::<(&mut Body, &mut Projectile)>() {
        let velocity = proj.velocity;
        match &mut proj.kind {
            ProjectileKind::Linear => {
                body.translate(velocity.x, velocity.y);
                let center = body.center();
                let (tx, ty) = grid.tile_of_point(center);

                if grid.is_wall(tx, ty) || !grid.point_in_bounds(center) {
                    despawns.push(entity);
                } else if let Some(enemy) = first_overlap(&enemies, &body.rect) {
                    hits.push((enemy.entity, proj.damage));
                    despawns.push(entity);
                }
            }
            ProjectileKind::Explosive {
                burst_radius,
                burst_damage,
            } => {
                body.translate(velocity.x, velocity.y);
                let center = body.center();
                let (tx, ty) = grid.tile_of_point(center);

                if !grid.point_in_bounds(center) {
                    // Flying off the map does not detonate
                    despawns.push(entity);
                } else if grid.is_wall(tx, ty) {
                    burst(&enemies, center, *burst_radius, *burst_damage, &mut hits);
                    despawns.push(entity);
                } else if let Some(enemy) = first_overlap(&enemies, &body.rect) {
                    hits.push((enemy.entity, proj.damage));
                    burst(&enemies, center, *burst_radius, *burst_damage, &mut hits);
                    despawns.push(entity);
                }
            }
            ProjectileKind::VoidHole(hole) => match hole.phase {
                VoidHolePhase::Traveling => {
                    body.translate(velocity.x, velocity.y);
                    hole.travel_remaining -= velocity.length();

                    if hole.travel_remaining <= 0.0 || grid.rect_hits_wall(&body.rect) {
                        let center = body.center();
                        body.rect =
                            Rect::centered_at(center, VOID_HOLE_ACTIVE_SIZE, VOID_HOLE_ACTIVE_SIZE);
                        proj.velocity = Vec2::ZERO;
                        hole.phase = VoidHolePhase::Active {
                            activated_at_ms: now_ms,
                            last_damage_ms: now_ms,
                        };
                        debug!("void hole anchored at ({:.0}, {:.0})", center.x, center.y);
                    }
                }
                VoidHolePhase::Active {
                    activated_at_ms,
                    last_damage_ms,
                } => {
                    if now_ms.saturating_sub(activated_at_ms) >= hole.lifetime_ms {
                        events.push(SimEvent::EffectExpired { at: body.center() });
                        despawns.push(entity);
                        continue;
                    }

                    let center = body.center();
                    for enemy in &enemies {
                        let toward = center - enemy.rect.center();
                        let distance = toward.length();
                        if distance > 0.0 && distance < hole.pull_radius {
                            pulls.push((enemy.entity, toward.normalize() * hole.pull_step));
                        }
                    }

                    if now_ms.saturating_sub(last_damage_ms) >= hole.damage_interval_ms {
                        hole.phase = VoidHolePhase::Active {
                            activated_at_ms,
                            last_damage_ms: now_ms,
                        };
                        for enemy in &enemies {
                            if center.distance(enemy.rect.center()) < hole.damage_radius {
                                hits.push((enemy.entity, hole.tick_damage));
                            }
                        }
                    }
                }
            },
            ProjectileKind::ChainArc(arc) => {
                body.translate(velocity.x, velocity.y);
                let center = body.center();
                let (tx, ty) = grid.tile_of_point(center);

                if grid.is_wall(tx, ty) || !grid.point_in_bounds(center) {
                    despawns.push(entity);
                    continue;
                }

                let struck = enemies
                    .iter()
                    .find(|e| !arc.hit_chain.contains(&e.entity) && e.rect.overlaps(&body.rect));
                if let Some(struck) = struck {
                    hits.push((struck.entity, proj.damage));
                    stuns.push((struck.entity, arc.stun_ticks));

                    let mut chain = arc.hit_chain.clone();
                    chain.insert(struck.entity);

                    if arc.arc_index < arc.max_arcs {
                        let from = struck.rect.center();
                        if let Some(next) = nearest_arc_target(&enemies, &chain, from, arc.arc_range)
                        {
                            successors.push(ChainSuccessor {
                                owner: proj.owner,
                                from,
                                to: next,
                                arc_index: arc.arc_index + 1,
                                hit_chain: chain,
                            });
                        }
                    }
                    despawns.push(entity);
                }
            }
        }
    }

    // Pull moves use the same per-axis wall rollback as walking
    for (enemy, delta) in pulls {
        if let Ok(body) = world.query_one_mut::<&mut Body>(enemy) {
            let before = body.rect;
            body.translate(delta.x, 0.0);
            if grid.rect_hits_wall(&body.rect) {
                body.rect.x = before.x;
            }
            body.translate(0.0, delta.y);
            if grid.rect_hits_wall(&body.rect) {
                body.rect.y = before.y;
            }
        }
    }

    for (target, damage) in hits {
        damage_entity(world, target, damage, events);
    }
    for (target, ticks) in stuns {
        if let Ok(mut agent) = world.get::<&mut EnemyAgent>(target) {
            agent.apply_stun(ticks, true);
        }
    }
    for s in successors {
        spawn_chain_bolt(world, s.owner, s.from, s.to, s.arc_index, s.hit_chain);
    }
    for entity in despawns {
        let _ = world.despawn(entity);
    }
}

struct ChainSuccessor {
    owner: Entity,
    from: Vec2,
    to: Vec2,
    arc_index: u32,
    hit_chain: std::collections::HashSet<Entity>,
}

fn first_overlap<'a>(enemies: &'a [EnemySnapshot], rect: &Rect) -> Option<&'a EnemySnapshot> {
    enemies.iter().find(|e| e.rect.overlaps(rect))
}

/// Area burst: every live enemy strictly inside the radius takes the
/// burst damage, the directly struck target included.
fn burst(
    enemies: &[EnemySnapshot],
    at: Vec2,
    radius: f32,
    damage: i32,
    hits: &mut Vec<(Entity, i32)>,
) {
    for enemy in enemies {
        if at.distance(enemy.rect.center()) < radius {
            hits.push((enemy.entity, damage));
        }
    }
}

/// Nearest (squared distance) live enemy within arc range that the chain
/// has not struck yet.
fn nearest_arc_target(
    enemies: &[EnemySnapshot],
    chain: &std::collections::HashSet<Entity>,
    from: Vec2,
    arc_range: f32,
) -> Option<Vec2> {
    let mut best: Option<(Vec2, f32)> = None;
    let range_sq = arc_range * arc_range;

    for enemy in enemies {
        if chain.contains(&enemy.entity) {
            continue;
        }
        let center = enemy.rect.center();
        let d_sq = from.distance_squared(center);
        if d_sq < range_sq && best.map_or(true, |(_, bd)| d_sq < bd) {
            best = Some((center, d_sq));
        }
    }
    best.map(|(center, _)| center)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{ChainArc, Cooldowns, Mobility, Name, VoidHole};
    use crate::systems::abilities::{
        CHAIN_LIGHTNING_DAMAGE, VOID_HOLE_DAMAGE_INTERVAL_MS, VOID_HOLE_LIFETIME_MS,
    };
    use std::collections::HashSet;

    const TILE: f32 = 32.0;

    fn open_grid() -> TileGrid {
        duskcrawl_logic::grid::TileGrid::bordered(40, 40, TILE as u32).unwrap()
    }

    fn spawn_enemy(world: &mut World, center: Vec2) -> Entity {
        world.spawn((
            Name::new("Enemy"),
            Body::centered_at(center, 32.0, 32.0),
            Health::new(100),
            Mobility::new(1.0),
            EnemyAgent::new(),
            Cooldowns::new(),
        ))
    }

    fn spawn_linear(world: &mut World, owner: Entity, from: Vec2, velocity: Vec2) -> Entity {
        world.spawn((
            Body::centered_at(from, 10.0, 10.0),
            Projectile {
                velocity,
                damage: 30,
                owner,
                kind: ProjectileKind::Linear,
            },
        ))
    }

    fn dummy_owner(world: &mut World) -> Entity {
        world.spawn((Name::new("Player"),))
    }

    #[test]
    fn test_linear_despawns_on_wall() {
        let grid = open_grid();
        let mut world = World::new();
        let mut events = Vec::new();
        let owner = dummy_owner(&mut world);

        // Fired straight at the left border wall
        let bolt = spawn_linear(&mut world, owner, Vec2::new(80.0, 80.0), Vec2::new(-10.0, 0.0));

        for _ in 0..10 {
            projectile_update_system(&mut world, &grid, 0, &mut events);
        }
        assert!(!world.contains(bolt));
    }

    #[test]
    fn test_linear_hits_enemy() {
        let grid = open_grid();
        let mut world = World::new();
        let mut events = Vec::new();
        let owner = dummy_owner(&mut world);
        let enemy = spawn_enemy(&mut world, Vec2::new(200.0, 80.0));
        let bolt = spawn_linear(&mut world, owner, Vec2::new(100.0, 80.0), Vec2::new(10.0, 0.0));

        for _ in 0..20 {
            projectile_update_system(&mut world, &grid, 0, &mut events);
        }

        assert!(!world.contains(bolt));
        assert_eq!(world.get::<&Health>(enemy).unwrap().current, 70);
    }

    #[test]
    fn test_explosive_bursts_on_wall() {
        let grid = open_grid();
        let mut world = World::new();
        let mut events = Vec::new();
        let owner = dummy_owner(&mut world);
        // Enemy sits near the left wall, off the flight line
        let bystander = spawn_enemy(&mut world, Vec2::new(80.0, 140.0));

        world.spawn((
            Body::centered_at(Vec2::new(100.0, 80.0), 20.0, 20.0),
            Projectile {
                velocity: Vec2::new(-10.0, 0.0),
                damage: 30,
                owner,
                kind: ProjectileKind::Explosive {
                    burst_radius: 200.0,
                    burst_damage: 15,
                },
            },
        ));

        for _ in 0..12 {
            projectile_update_system(&mut world, &grid, 0, &mut events);
        }

        // Wall impact still detonates the area burst
        assert_eq!(world.get::<&Health>(bystander).unwrap().current, 85);
    }

    #[test]
    fn test_explosive_direct_hit_also_bursts() {
        let grid = open_grid();
        let mut world = World::new();
        let mut events = Vec::new();
        let owner = dummy_owner(&mut world);
        let target = spawn_enemy(&mut world, Vec2::new(300.0, 300.0));
        let bystander = spawn_enemy(&mut world, Vec2::new(380.0, 300.0));

        world.spawn((
            Body::centered_at(Vec2::new(200.0, 300.0), 20.0, 20.0),
            Projectile {
                velocity: Vec2::new(10.0, 0.0),
                damage: 30,
                owner,
                kind: ProjectileKind::Explosive {
                    burst_radius: 200.0,
                    burst_damage: 15,
                },
            },
        ));

        for _ in 0..20 {
            projectile_update_system(&mut world, &grid, 0, &mut events);
        }

        // Direct target takes primary + burst, bystander burst only
        assert_eq!(world.get::<&Health>(target).unwrap().current, 100 - 30 - 15);
        assert_eq!(world.get::<&Health>(bystander).unwrap().current, 85);
    }

    fn spawn_active_hole(world: &mut World, owner: Entity, center: Vec2) -> Entity {
        world.spawn((
            Body::centered_at(center, VOID_HOLE_ACTIVE_SIZE, VOID_HOLE_ACTIVE_SIZE),
            Projectile {
                velocity: Vec2::ZERO,
                damage: 0,
                owner,
                kind: ProjectileKind::VoidHole(VoidHole {
                    phase: VoidHolePhase::Active {
                        activated_at_ms: 0,
                        last_damage_ms: 0,
                    },
                    travel_remaining: 0.0,
                    pull_radius: 800.0,
                    damage_radius: 60.0,
                    tick_damage: 20,
                    pull_step: 1.5,
                    lifetime_ms: VOID_HOLE_LIFETIME_MS,
                    damage_interval_ms: VOID_HOLE_DAMAGE_INTERVAL_MS,
                }),
            },
        ))
    }

    #[test]
    fn test_void_hole_travel_then_anchor() {
        let grid = open_grid();
        let mut world = World::new();
        let mut events = Vec::new();
        let owner = dummy_owner(&mut world);

        let hole = world.spawn((
            Body::centered_at(Vec2::new(100.0, 100.0), 20.0, 20.0),
            Projectile {
                velocity: Vec2::new(4.0, 0.0),
                damage: 0,
                owner,
                kind: ProjectileKind::VoidHole(VoidHole {
                    phase: VoidHolePhase::Traveling,
                    travel_remaining: 40.0,
                    pull_radius: 800.0,
                    damage_radius: 60.0,
                    tick_damage: 20,
                    pull_step: 1.5,
                    lifetime_ms: VOID_HOLE_LIFETIME_MS,
                    damage_interval_ms: VOID_HOLE_DAMAGE_INTERVAL_MS,
                }),
            },
        ));

        // 10 ticks at speed 4 covers the 40px travel distance
        for _ in 0..10 {
            projectile_update_system(&mut world, &grid, 5, &mut events);
        }

        let proj = world.get::<&Projectile>(hole).unwrap();
        let ProjectileKind::VoidHole(h) = &proj.kind else {
            panic!("expected void hole");
        };
        assert!(matches!(h.phase, VoidHolePhase::Active { .. }));
        drop(proj);
        // Body grows to the anchored size
        let body = world.get::<&Body>(hole).unwrap();
        assert_eq!(body.rect.w, VOID_HOLE_ACTIVE_SIZE);
    }

    #[test]
    fn test_void_hole_pulls_without_damage_outside_damage_radius() {
        let grid = open_grid();
        let mut world = World::new();
        let mut events = Vec::new();
        let owner = dummy_owner(&mut world);

        let center = Vec2::new(640.0, 300.0);
        spawn_active_hole(&mut world, owner, center);
        // Inside pull radius, well outside damage radius
        let enemy = spawn_enemy(&mut world, Vec2::new(640.0 + 200.0, 300.0));

        let mut now = 0;
        for _ in 0..40 {
            now += VOID_HOLE_DAMAGE_INTERVAL_MS; // damage window open every tick
            projectile_update_system(&mut world, &grid, now, &mut events);
        }

        let body = world.get::<&Body>(enemy).unwrap();
        let pulled = body.rect.center();
        // Dragged toward the hole, but took no damage yet
        assert!(pulled.x < 840.0 - 40.0);
        drop(body);
        assert_eq!(world.get::<&Health>(enemy).unwrap().current, 100);
    }

    #[test]
    fn test_void_hole_periodic_damage_inside_radius() {
        let grid = open_grid();
        let mut world = World::new();
        let mut events = Vec::new();
        let owner = dummy_owner(&mut world);

        let center = Vec2::new(640.0, 300.0);
        spawn_active_hole(&mut world, owner, center);
        let enemy = spawn_enemy(&mut world, Vec2::new(640.0 + 30.0, 300.0));

        // Two ticks inside one damage window: only one application
        projectile_update_system(&mut world, &grid, VOID_HOLE_DAMAGE_INTERVAL_MS, &mut events);
        projectile_update_system(
            &mut world,
            &grid,
            VOID_HOLE_DAMAGE_INTERVAL_MS + 16,
            &mut events,
        );
        assert_eq!(world.get::<&Health>(enemy).unwrap().current, 80);

        // Next window: second application
        projectile_update_system(
            &mut world,
            &grid,
            2 * VOID_HOLE_DAMAGE_INTERVAL_MS,
            &mut events,
        );
        assert_eq!(world.get::<&Health>(enemy).unwrap().current, 60);
    }

    #[test]
    fn test_void_hole_expires_after_lifetime() {
        let grid = open_grid();
        let mut world = World::new();
        let mut events = Vec::new();
        let owner = dummy_owner(&mut world);
        let hole = spawn_active_hole(&mut world, owner, Vec2::new(640.0, 300.0));

        projectile_update_system(&mut world, &grid, VOID_HOLE_LIFETIME_MS, &mut events);

        assert!(!world.contains(hole));
        assert!(events
            .iter()
            .any(|e| matches!(e, SimEvent::EffectExpired { .. })));
    }

    #[test]
    fn test_chain_lightning_scenario() {
        let grid = open_grid();
        let mut world = World::new();
        let mut events = Vec::new();
        let owner = dummy_owner(&mut world);

        // Three enemies in a line, each within arc range of the previous
        let e1 = spawn_enemy(&mut world, Vec2::new(300.0, 300.0));
        let e2 = spawn_enemy(&mut world, Vec2::new(420.0, 300.0));
        let e3 = spawn_enemy(&mut world, Vec2::new(540.0, 300.0));

        // Initial bolt with max_arcs = 2
        world.spawn((
            Body::centered_at(Vec2::new(200.0, 300.0), 15.0, 8.0),
            Projectile {
                velocity: Vec2::new(7.0, 0.0),
                damage: CHAIN_LIGHTNING_DAMAGE,
                owner,
                kind: ProjectileKind::ChainArc(ChainArc {
                    stun_ticks: 90,
                    arc_range: 250.0,
                    max_arcs: 2,
                    arc_index: 0,
                    hit_chain: HashSet::new(),
                }),
            },
        ));

        let mut arc_indices_seen = HashSet::new();
        for _ in 0..120 {
            for (_, proj) in world.query::<&Projectile>().iter() {
                if let ProjectileKind::ChainArc(arc) = &proj.kind {
                    arc_indices_seen.insert(arc.arc_index);
                }
            }
            projectile_update_system(&mut world, &grid, 0, &mut events);
        }

        // Exactly one damage application per enemy
        for enemy in [e1, e2, e3] {
            assert_eq!(
                world.get::<&Health>(enemy).unwrap().current,
                100 - CHAIN_LIGHTNING_DAMAGE
            );
            assert!(world.get::<&EnemyAgent>(enemy).unwrap().is_stunned());
        }
        // Two successor bolts were spawned after the initial one
        assert_eq!(arc_indices_seen, HashSet::from([0, 1, 2]));
        // Chain is spent
        assert_eq!(world.query::<&Projectile>().iter().count(), 0);
    }

    #[test]
    fn test_chain_stops_when_no_target_in_range() {
        let grid = open_grid();
        let mut world = World::new();
        let mut events = Vec::new();
        let owner = dummy_owner(&mut world);

        let e1 = spawn_enemy(&mut world, Vec2::new(300.0, 300.0));
        // Far beyond arc range
        let e2 = spawn_enemy(&mut world, Vec2::new(1200.0, 300.0));

        world.spawn((
            Body::centered_at(Vec2::new(200.0, 300.0), 15.0, 8.0),
            Projectile {
                velocity: Vec2::new(7.0, 0.0),
                damage: CHAIN_LIGHTNING_DAMAGE,
                owner,
                kind: ProjectileKind::ChainArc(ChainArc {
                    stun_ticks: 90,
                    arc_range: 250.0,
                    max_arcs: 2,
                    arc_index: 0,
                    hit_chain: HashSet::new(),
                }),
            },
        ));

        for _ in 0..60 {
            projectile_update_system(&mut world, &grid, 0, &mut events);
        }

        assert_eq!(world.get::<&Health>(e1).unwrap().current, 85);
        assert_eq!(world.get::<&Health>(e2).unwrap().current, 100);
        assert_eq!(world.query::<&Projectile>().iter().count(), 0);
    }
}
