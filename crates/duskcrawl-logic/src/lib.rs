//! Pure simulation logic for Duskcrawl.
//!
//! This crate contains all dungeon logic that is independent of the ECS
//! engine and any runtime. Functions take plain data and return results,
//! making them unit-testable and portable across the simulation core, the
//! headless harness, and any future embedder.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`geometry`] | 2D vectors and axis-aligned rects used everywhere |
//! | [`grid`] | Tile grid, wall collision queries, spawn-location search |
//! | [`pathfinding`] | A* over the tile grid with corner-cut prevention |

pub mod geometry;
pub mod grid;
pub mod pathfinding;
