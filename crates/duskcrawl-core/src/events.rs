//! Gameplay events emitted by the simulation for the embedder.
//!
//! Events are the structured side-channel that replaces in-simulation
//! printing: systems push them onto the engine's queue and the embedder
//! drains them once per tick. Diagnostic detail goes through the `log`
//! facade instead and never gates simulation logic.

use hecs::Entity;
use serde::Serialize;

use duskcrawl_logic::geometry::Vec2;

/// One gameplay occurrence within a tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SimEvent {
    /// An entity's health crossed to zero. Emitted exactly once per entity.
    Died {
        #[serde(skip)]
        entity: Entity,
        name: String,
    },
    /// An ability activated and started its cooldown.
    AbilityCast { caster_name: String, ability: String },
    /// An activation request named an ability that does not exist.
    AbilityRejected { name: String },
    /// An area-denial effect reached the end of its lifetime.
    EffectExpired { at: Vec2 },
}
