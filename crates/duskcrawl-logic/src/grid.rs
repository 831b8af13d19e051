//! Tile grid: wall collision queries and spawn-location search.
//!
//! The grid is immutable after construction and read-shared by movement,
//! collision, and pathfinding. Layouts are supplied externally (the core
//! does not generate dungeons).

use serde::{Deserialize, Serialize};

use crate::geometry::{Rect, Vec2};

/// A single dungeon tile. Wall-ness is explicit rather than a numeric code
/// so every query site reads unambiguously.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tile {
    Floor,
    Wall,
}

/// Errors detected while building a grid. These are fatal at initialization
/// time; a constructed grid never fails a query.
#[derive(Debug)]
pub enum GridError {
    /// No rows, or rows with no columns.
    Empty,
    /// A row whose length differs from the first row's.
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// Tile size of zero would make every pixel→tile conversion divide by zero.
    ZeroTileSize,
}

impl std::fmt::Display for GridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GridError::Empty => write!(f, "grid has no tiles"),
            GridError::Ragged {
                row,
                expected,
                found,
            } => write!(
                f,
                "grid row {} has {} tiles, expected {}",
                row, found, expected
            ),
            GridError::ZeroTileSize => write!(f, "tile size must be non-zero"),
        }
    }
}

/// Fixed dungeon layout: a 2D array of tiles plus the pixel size of one tile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileGrid {
    width: u32,
    height: u32,
    tile_size: u32,
    /// Row-major, `height * width` entries.
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// Build a grid from externally supplied rows. Validates shape up front
    /// so a corrupt layout fails fast instead of mid-simulation.
    pub fn from_rows(rows: Vec<Vec<Tile>>, tile_size: u32) -> Result<Self, GridError> {
        if tile_size == 0 {
            return Err(GridError::ZeroTileSize);
        }
        let height = rows.len();
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(GridError::Empty);
        }

        let mut tiles = Vec::with_capacity(width * height);
        for (row_index, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(GridError::Ragged {
                    row: row_index,
                    expected: width,
                    found: row.len(),
                });
            }
            tiles.extend(row);
        }

        Ok(Self {
            width: width as u32,
            height: height as u32,
            tile_size,
            tiles,
        })
    }

    /// The bordered test arena: walls around the edge plus a partial wall
    /// across the middle row, floors everywhere else.
    pub fn bordered(width: u32, height: u32, tile_size: u32) -> Result<Self, GridError> {
        let mut rows = Vec::with_capacity(height as usize);
        for y in 0..height {
            let mut row = Vec::with_capacity(width as usize);
            for x in 0..width {
                let edge = x == 0 || x == width - 1 || y == 0 || y == height - 1;
                let mid_wall = x > width / 4 && x < 3 * width / 4 && y == height / 2;
                row.push(if edge || mid_wall {
                    Tile::Wall
                } else {
                    Tile::Floor
                });
            }
            rows.push(row);
        }
        Self::from_rows(rows, tile_size)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn pixel_width(&self) -> f32 {
        (self.width * self.tile_size) as f32
    }

    pub fn pixel_height(&self) -> f32 {
        (self.height * self.tile_size) as f32
    }

    /// Tile at the given coordinates, or `None` outside the grid.
    pub fn tile(&self, tx: u32, ty: u32) -> Option<Tile> {
        if tx >= self.width || ty >= self.height {
            return None;
        }
        self.tiles
            .get(ty as usize * self.width as usize + tx as usize)
            .copied()
    }

    /// Whether the tile at (tx, ty) is a wall. Cells outside the grid do
    /// not block; callers that care about leaving the grid use
    /// [`TileGrid::point_in_bounds`] instead.
    pub fn is_wall(&self, tx: i64, ty: i64) -> bool {
        if tx < 0 || ty < 0 {
            return false;
        }
        matches!(self.tile(tx as u32, ty as u32), Some(Tile::Wall))
    }

    /// Tile coordinates containing a pixel point (floor division, so
    /// negative pixels land on negative tiles).
    pub fn tile_of_point(&self, p: Vec2) -> (i64, i64) {
        let ts = self.tile_size as f32;
        ((p.x / ts).floor() as i64, (p.y / ts).floor() as i64)
    }

    /// Pixel center of a tile.
    pub fn tile_center(&self, tx: u32, ty: u32) -> Vec2 {
        let ts = self.tile_size as f32;
        Vec2::new(tx as f32 * ts + ts / 2.0, ty as f32 * ts + ts / 2.0)
    }

    /// Whether a pixel point lies inside the grid's pixel area.
    pub fn point_in_bounds(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x < self.pixel_width() && p.y < self.pixel_height()
    }

    /// Test a pixel rect against every tile cell it overlaps, inclusive
    /// from `floor(left/tile)` through the cell containing the far edge.
    /// The rect occupies the half-open interval [left, right): a body
    /// flush against a wall is touching, not colliding.
    pub fn rect_hits_wall(&self, rect: &Rect) -> bool {
        const EDGE: f32 = 1e-3;
        let ts = self.tile_size as f32;
        let tx0 = (rect.left() / ts).floor() as i64;
        let tx1 = ((rect.right() - EDGE).max(rect.left()) / ts).floor() as i64;
        let ty0 = (rect.top() / ts).floor() as i64;
        let ty1 = ((rect.bottom() - EDGE).max(rect.top()) / ts).floor() as i64;

        for ty in ty0..=ty1 {
            for tx in tx0..=tx1 {
                if self.is_wall(tx, ty) {
                    return true;
                }
            }
        }
        false
    }

    /// First walkable tile found by expanding-ring search from the grid
    /// center. Returns `None` once the whole grid has been scanned; the
    /// caller supplies a deterministic fallback position.
    pub fn spawn_tile(&self) -> Option<(u32, u32)> {
        let cx = (self.width / 2) as i64;
        let cy = (self.height / 2) as i64;
        let max_radius = self.width.max(self.height) as i64;

        for radius in 0..=max_radius {
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    // Ring perimeter only; inner cells were covered already
                    if dx.abs() != radius && dy.abs() != radius {
                        continue;
                    }
                    let tx = cx + dx;
                    let ty = cy + dy;
                    if tx < 0 || ty < 0 {
                        continue;
                    }
                    if self.tile(tx as u32, ty as u32) == Some(Tile::Floor) {
                        return Some((tx as u32, ty as u32));
                    }
                }
            }
        }
        None
    }
}
