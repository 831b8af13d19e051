//! A* pathfinding over the tile grid.
//!
//! 8-directional expansion with uniform step cost (diagonals are not
//! inflated), Manhattan heuristic, and corner-cut prevention: a diagonal is
//! rejected when both orthogonal cells beside it are walls.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::geometry::Vec2;
use crate::grid::{Tile, TileGrid};

/// Neighbor offsets in row-major order. Iteration order is part of the
/// deterministic tie-breaking contract.
const NEIGHBORS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Shortest path between two pixel positions, as tile coordinates in
/// start→goal order. Returns `None` when the goal is unreachable or either
/// endpoint falls outside the grid. A start already on the goal tile yields
/// a single-tile path.
pub fn find_path(grid: &TileGrid, start: Vec2, goal: Vec2) -> Option<Vec<(u32, u32)>> {
    let (sx, sy) = grid.tile_of_point(start);
    let (gx, gy) = grid.tile_of_point(goal);

    if !tile_exists(grid, sx, sy) || !tile_exists(grid, gx, gy) {
        return None;
    }
    let start_tile = (sx as u32, sy as u32);
    let goal_tile = (gx as u32, gy as u32);
    if start_tile == goal_tile {
        return Some(vec![start_tile]);
    }

    // Heap entries are Reverse((f, h, sequence, tile)): f ascending, ties
    // by h ascending, remaining ties by insertion order.
    let mut open: BinaryHeap<Reverse<(u32, u32, u64, (u32, u32))>> = BinaryHeap::new();
    let mut g_score: HashMap<(u32, u32), u32> = HashMap::new();
    let mut came_from: HashMap<(u32, u32), (u32, u32)> = HashMap::new();
    let mut closed: HashSet<(u32, u32)> = HashSet::new();
    let mut sequence: u64 = 0;

    g_score.insert(start_tile, 0);
    open.push(Reverse((
        manhattan(start_tile, goal_tile),
        manhattan(start_tile, goal_tile),
        sequence,
        start_tile,
    )));

    while let Some(Reverse((_, _, _, current))) = open.pop() {
        // Stale heap entries for already-expanded nodes are skipped; a
        // closed node is never reopened.
        if !closed.insert(current) {
            continue;
        }

        if current == goal_tile {
            let mut path = vec![current];
            let mut node = current;
            while let Some(&prev) = came_from.get(&node) {
                path.push(prev);
                node = prev;
            }
            path.reverse();
            return Some(path);
        }

        let g_here = *g_score.get(&current).unwrap_or(&u32::MAX);

        for (dx, dy) in NEIGHBORS {
            let nx = current.0 as i64 + dx;
            let ny = current.1 as i64 + dy;
            if !walkable(grid, nx, ny) {
                continue;
            }
            // Diagonal between two blocked orthogonals would cut the corner
            if dx != 0
                && dy != 0
                && grid.is_wall(current.0 as i64 + dx, current.1 as i64)
                && grid.is_wall(current.0 as i64, current.1 as i64 + dy)
            {
                continue;
            }

            let next = (nx as u32, ny as u32);
            if closed.contains(&next) {
                continue;
            }

            let g_next = g_here.saturating_add(1);
            if g_next < *g_score.get(&next).unwrap_or(&u32::MAX) {
                g_score.insert(next, g_next);
                came_from.insert(next, current);
                sequence += 1;
                let h = manhattan(next, goal_tile);
                open.push(Reverse((g_next + h, h, sequence, next)));
            }
        }
    }

    None
}

fn manhattan(a: (u32, u32), b: (u32, u32)) -> u32 {
    a.0.abs_diff(b.0) + a.1.abs_diff(b.1)
}

fn tile_exists(grid: &TileGrid, tx: i64, ty: i64) -> bool {
    tx >= 0 && ty >= 0 && grid.tile(tx as u32, ty as u32).is_some()
}

fn walkable(grid: &TileGrid, tx: i64, ty: i64) -> bool {
    tx >= 0 && ty >= 0 && grid.tile(tx as u32, ty as u32) == Some(Tile::Floor)
}
