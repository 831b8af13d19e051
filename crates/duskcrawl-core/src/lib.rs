//! Duskcrawl Core - Dungeon Combat Simulation Engine
//!
//! An ECS-based real-time simulation core for a top-down action roguelike:
//! tile-collision movement, cooldown-gated abilities, a projectile/effect
//! subsystem, and A* pursuit for enemies. Rendering, input polling, and
//! asset loading are external collaborators - the core consumes abstracted
//! input frames and emits draw-intent snapshots.
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: The player, enemies, projectiles, and area effects
//! - **Components**: Pure data attached to entities (Body, Health, Cooldowns, etc.)
//! - **Systems**: Logic that queries and updates components
//!
//! One call to [`engine::Simulation::update`] advances exactly one discrete
//! tick: player movement, ability resolution, projectile updates, enemy AI,
//! contact damage, cooldown decrement, and dead-entity cleanup, in that
//! order. All timers are tick-counted except the area-denial effect, whose
//! wall-clock timestamps are injected by the caller to keep the core
//! deterministic.
//!
//! # Example
//!
//! ```rust,no_run
//! use duskcrawl_core::prelude::*;
//! use duskcrawl_logic::grid::TileGrid;
//!
//! let grid = TileGrid::bordered(40, 30, 32).unwrap();
//! let mut sim = Simulation::new(grid, SimConfig::default());
//!
//! // Run simulation
//! let mut now_ms = 0u64;
//! loop {
//!     sim.update(&InputFrame::default(), now_ms);
//!     now_ms += 16; // ~60 ticks per second
//!     for intent in sim.render_view() {
//!         // hand draw-intent to the external renderer
//!         let _ = intent;
//!     }
//! }
//! ```

pub mod components;
pub mod engine;
pub mod events;
pub mod render;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::{AbilityRequest, InputFrame, SimConfig, Simulation};
    pub use crate::events::SimEvent;
    pub use crate::render::{DrawIntent, Visual};
}
