//! Player movement with axis-separated wall collision.

use hecs::{Entity, World};

use duskcrawl_logic::geometry::Vec2;
use duskcrawl_logic::grid::TileGrid;

use crate::components::{Body, Health, Mobility};

/// Move the player by one tick of input intent. Each axis component is in
/// {-1, 0, 1}; diagonals are normalized to unit length before scaling by
/// speed so diagonal movement is not faster.
///
/// Movement resolves per axis: the x step and y step are applied and
/// rolled back independently, which lets the player slide along walls.
pub fn player_move_system(world: &mut World, grid: &TileGrid, player: Entity, dx: i8, dy: i8) {
    if dx == 0 && dy == 0 {
        return;
    }

    let Ok((body, health, mobility)) =
        world.query_one_mut::<(&mut Body, &Health, &Mobility)>(player)
    else {
        return;
    };
    if !health.alive {
        return;
    }

    let step = Vec2::new(dx as f32, dy as f32).normalize() * mobility.speed;
    let before = body.rect;

    body.translate(step.x, 0.0);
    if grid.rect_hits_wall(&body.rect) {
        body.rect.x = before.x;
    }

    body.translate(0.0, step.y);
    if grid.rect_hits_wall(&body.rect) {
        body.rect.y = before.y;
    }
}
