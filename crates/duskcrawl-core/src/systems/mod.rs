//! Systems - logic that operates on components

mod abilities;
mod combat;
mod enemies;
mod player;
mod projectiles;

pub use abilities::*;
pub use combat::*;
pub use enemies::*;
pub use player::*;
pub use projectiles::*;
