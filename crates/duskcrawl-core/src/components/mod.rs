//! Component definitions for the ECS simulation.
//!
//! Components are pure data structs attached to entities.
//! They have no behavior beyond local state transitions - anything that
//! touches the grid or other entities lives in systems.

mod actors;
mod common;
mod projectiles;

pub use actors::*;
pub use common::*;
pub use projectiles::*;
