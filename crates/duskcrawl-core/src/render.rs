//! Draw-intent snapshot for the external renderer.
//!
//! The renderer owns sprites, surfaces, and the window; the simulation only
//! reports where things are and what state they are in. Snapshots are
//! serde-serializable so an out-of-process renderer works too.

use hecs::World;
use serde::Serialize;

use duskcrawl_logic::geometry::Rect;

use crate::components::{
    Body, EnemyAgent, Health, Player, Projectile, ProjectileKind, VoidHolePhase,
};

/// Visual-state tag: enough for the renderer to pick a sprite and overlay
/// without touching simulation internals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Visual {
    Player { health: f32 },
    Enemy { health: f32, stunned: bool },
    Bolt,
    Fireball,
    VoidHole { active: bool },
    Lightning,
}

/// One thing to draw this tick.
#[derive(Debug, Clone, Serialize)]
pub struct DrawIntent {
    pub rect: Rect,
    pub visual: Visual,
}

/// Snapshot every live entity and projectile.
pub fn build_view(world: &World) -> Vec<DrawIntent> {
    let mut view = Vec::new();

    for (_, (_, body, health)) in world.query::<(&Player, &Body, &Health)>().iter() {
        if health.alive {
            view.push(DrawIntent {
                rect: body.rect,
                visual: Visual::Player {
                    health: health.fraction(),
                },
            });
        }
    }

    for (_, (agent, body, health)) in world.query::<(&EnemyAgent, &Body, &Health)>().iter() {
        if health.alive {
            view.push(DrawIntent {
                rect: body.rect,
                visual: Visual::Enemy {
                    health: health.fraction(),
                    stunned: agent.is_stunned(),
                },
            });
        }
    }

    for (_, (body, proj)) in world.query::<(&Body, &Projectile)>().iter() {
        let visual = match &proj.kind {
            ProjectileKind::Linear => Visual::Bolt,
            ProjectileKind::Explosive { .. } => Visual::Fireball,
            ProjectileKind::VoidHole(hole) => Visual::VoidHole {
                active: matches!(hole.phase, VoidHolePhase::Active { .. }),
            },
            ProjectileKind::ChainArc(_) => Visual::Lightning,
        };
        view.push(DrawIntent {
            rect: body.rect,
            visual,
        });
    }

    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Cooldowns, Mobility, Name};
    use duskcrawl_logic::geometry::Vec2;

    #[test]
    fn test_view_tags_entities() {
        let mut world = World::new();
        world.spawn((
            Player,
            Name::new("Player"),
            Body::new(0.0, 0.0, 32.0, 32.0),
            Health::new(100),
            Mobility::new(3.0),
            Cooldowns::new(),
        ));
        let enemy = world.spawn((
            Name::new("Enemy"),
            Body::new(100.0, 0.0, 32.0, 32.0),
            Health::new(100),
            Mobility::new(1.0),
            EnemyAgent::new(),
            Cooldowns::new(),
        ));
        world
            .get::<&mut EnemyAgent>(enemy)
            .unwrap()
            .apply_stun(10, true);
        world.get::<&mut Health>(enemy).unwrap().damage(50);

        let view = build_view(&world);
        assert_eq!(view.len(), 2);
        assert!(view
            .iter()
            .any(|d| matches!(d.visual, Visual::Player { health } if health == 1.0)));
        assert!(view.iter().any(
            |d| matches!(d.visual, Visual::Enemy { health, stunned } if stunned && health == 0.5)
        ));
    }

    #[test]
    fn test_dead_entities_are_not_drawn() {
        let mut world = World::new();
        let enemy = world.spawn((
            Name::new("Enemy"),
            Body::new(0.0, 0.0, 32.0, 32.0),
            Health::new(100),
            Mobility::new(1.0),
            EnemyAgent::new(),
            Cooldowns::new(),
        ));
        world.get::<&mut Health>(enemy).unwrap().damage(100);

        assert!(build_view(&world).is_empty());
    }

    #[test]
    fn test_view_serializes() {
        let mut world = World::new();
        let owner = world.spawn((Name::new("Player"),));
        world.spawn((
            Body::new(10.0, 10.0, 10.0, 10.0),
            Projectile {
                velocity: Vec2::new(5.0, 0.0),
                damage: 30,
                owner,
                kind: ProjectileKind::Linear,
            },
        ));

        let json = serde_json::to_string(&build_view(&world)).unwrap();
        assert!(json.contains("Bolt"));
    }
}
