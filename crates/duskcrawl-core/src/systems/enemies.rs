//! Enemy AI: stun handling, path recomputation, waypoint following, and
//! collision-aware movement with stuck recovery.

use hecs::{Entity, World};
use log::debug;

use duskcrawl_logic::geometry::{Rect, Vec2};
use duskcrawl_logic::grid::TileGrid;
use duskcrawl_logic::pathfinding::find_path;

use crate::components::{Body, EnemyAgent, Health, Mobility};

pub const ENEMY_SPEED: f32 = 1.0;
pub const ENEMY_SIZE: f32 = 32.0;
pub const ENEMY_MAX_HEALTH: i32 = 100;
/// Ticks between forced path recomputations while seeking.
pub const REPATH_INTERVAL_TICKS: u32 = 30;
/// Consecutive blocked ticks before the current path is abandoned.
pub const STUCK_TICK_LIMIT: u32 = 8;
/// Displacement below this fraction of one speed-step counts as blocked.
pub const STUCK_EPSILON: f32 = 0.1;
/// Distance within which an enemy with an exhausted path closes directly.
pub const MELEE_RANGE: f32 = 48.0;

enum Intent {
    /// Within one speed-step of the waypoint: land on it exactly.
    Snap(Vec2),
    /// Normal speed-limited movement, resolved per axis.
    Step(Vec2),
    Hold,
}

/// Advance every live enemy by one tick. Enemies are processed one at a
/// time against the live positions of the others, so two agents never
/// resolve into the same space within a tick.
pub fn enemy_update_system(world: &mut World, grid: &TileGrid, player: Entity) {
    let player_center = match world.get::<&Body>(player) {
        Ok(body) => body.center(),
        Err(_) => return,
    };
    let player_tile = {
        let (tx, ty) = grid.tile_of_point(player_center);
        (tx >= 0 && ty >= 0 && grid.tile(tx as u32, ty as u32).is_some())
            .then_some((tx as u32, ty as u32))
    };

    let ids: Vec<Entity> = world
        .query::<(&EnemyAgent, &Health)>()
        .iter()
        .filter(|(_, (_, health))| health.alive)
        .map(|(entity, _)| entity)
        .collect();

    for id in ids {
        // Live rects of the other enemies for mutual collision
        let others: Vec<Rect> = world
            .query::<(&EnemyAgent, &Body, &Health)>()
            .iter()
            .filter(|(entity, (_, _, health))| *entity != id && health.alive)
            .map(|(_, (_, body, _))| body.rect)
            .collect();

        let Ok((agent, body, mobility)) =
            world.query_one_mut::<(&mut EnemyAgent, &mut Body, &Mobility)>(id)
        else {
            continue;
        };

        // Stunned: no movement, no pathing
        if agent.stun_ticks > 0 {
            agent.stun_ticks -= 1;
            if agent.stun_ticks == 0 {
                agent.stun_visual = false;
            }
            continue;
        }

        agent.ticks_since_repath += 1;

        let needs_repath = agent.path.is_empty()
            || agent.target_tile.is_none()
            || agent.target_tile != player_tile
            || agent.ticks_since_repath >= REPATH_INTERVAL_TICKS;
        if needs_repath {
            match find_path(grid, body.center(), player_center) {
                Some(path) => {
                    // The first tile is the one the agent stands on
                    agent.next_waypoint = if path.len() > 1 { 1 } else { path.len() };
                    agent.path = path;
                    agent.target_tile = player_tile;
                }
                None => agent.clear_path(),
            }
            agent.ticks_since_repath = 0;
        }

        let center = body.center();
        let speed = mobility.speed;

        let intent = if let Some(&(tx, ty)) = agent.path.get(agent.next_waypoint) {
            let waypoint = grid.tile_center(tx, ty);
            let to_waypoint = waypoint - center;
            if to_waypoint.length() <= speed {
                Intent::Snap(waypoint)
            } else {
                Intent::Step(to_waypoint.normalize() * speed)
            }
        } else if agent.path.is_empty() {
            // No route to the player: fall back to a direct approach
            Intent::Step((player_center - center).normalize() * speed)
        } else if center.distance(player_center) <= MELEE_RANGE {
            // Path consumed; close the final gap
            Intent::Step((player_center - center).normalize() * speed)
        } else {
            Intent::Hold
        };

        match intent {
            Intent::Snap(waypoint) => {
                body.rect.set_center(waypoint);
                agent.next_waypoint += 1;
                agent.stuck_ticks = 0;
            }
            Intent::Step(step) => {
                let before = body.rect;

                body.translate(step.x, 0.0);
                if grid.rect_hits_wall(&body.rect) || overlaps_any(&body.rect, &others) {
                    body.rect.x = before.x;
                }
                body.translate(0.0, step.y);
                if grid.rect_hits_wall(&body.rect) || overlaps_any(&body.rect, &others) {
                    body.rect.y = before.y;
                }

                let moved = (body.center() - center).length();
                if moved < speed * STUCK_EPSILON {
                    agent.stuck_ticks += 1;
                    if agent.stuck_ticks > STUCK_TICK_LIMIT {
                        debug!("enemy stuck for {} ticks, abandoning path", agent.stuck_ticks);
                        agent.clear_path();
                        agent.stuck_ticks = 0;
                    }
                } else {
                    agent.stuck_ticks = 0;
                }
            }
            Intent::Hold => {}
        }
    }
}

fn overlaps_any(rect: &Rect, others: &[Rect]) -> bool {
    others.iter().any(|other| rect.overlaps(other))
}
