//! Components shared by the player, enemies, and projectiles.

use std::collections::HashMap;

use duskcrawl_logic::geometry::{Rect, Vec2};

/// Physical extent: the entity's axis-aligned bounding box in pixel space.
#[derive(Debug, Clone, Copy)]
pub struct Body {
    pub rect: Rect,
}

impl Body {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            rect: Rect::new(x, y, w, h),
        }
    }

    pub fn centered_at(center: Vec2, w: f32, h: f32) -> Self {
        Self {
            rect: Rect::centered_at(center, w, h),
        }
    }

    pub fn center(&self) -> Vec2 {
        self.rect.center()
    }

    /// Apply a raw position delta. No collision check - collision is the
    /// caller's responsibility so this stays composable with axis-separated
    /// resolution.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.rect.translate(dx, dy);
    }
}

/// Display label used in events and logging.
#[derive(Debug, Clone)]
pub struct Name {
    pub label: String,
}

impl Name {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

/// Hit points with a one-shot death latch.
#[derive(Debug, Clone, Copy)]
pub struct Health {
    pub current: i32,
    pub max: i32,
    pub alive: bool,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Self {
            current: max,
            max,
            alive: true,
        }
    }

    /// Apply damage, clamping at zero. Returns `true` only on the call
    /// that crosses to death; a dead entity takes no further damage.
    pub fn damage(&mut self, amount: i32) -> bool {
        if !self.alive {
            return false;
        }
        self.current = (self.current - amount).max(0);
        if self.current == 0 {
            self.alive = false;
            return true;
        }
        false
    }

    /// Restore health, never above max.
    pub fn heal(&mut self, amount: i32) {
        if !self.alive {
            return;
        }
        self.current = (self.current + amount).min(self.max);
    }

    pub fn fraction(&self) -> f32 {
        if self.max == 0 {
            0.0
        } else {
            self.current as f32 / self.max as f32
        }
    }
}

/// Movement speed in pixels per tick.
#[derive(Debug, Clone, Copy)]
pub struct Mobility {
    pub speed: f32,
}

impl Mobility {
    pub fn new(speed: f32) -> Self {
        Self { speed }
    }
}

/// Remaining cooldown ticks keyed by ability (or action) name. Absence of
/// a key means ready.
#[derive(Debug, Clone, Default)]
pub struct Cooldowns {
    remaining: HashMap<String, u32>,
}

impl Cooldowns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, name: &str, ticks: u32) {
        self.remaining.insert(name.to_owned(), ticks);
    }

    pub fn is_on(&self, name: &str) -> bool {
        self.remaining.get(name).is_some_and(|t| *t > 0)
    }

    pub fn remaining(&self, name: &str) -> u32 {
        self.remaining.get(name).copied().unwrap_or(0)
    }

    /// Decrement every active cooldown by one tick, dropping entries that
    /// reach zero.
    pub fn tick(&mut self) {
        self.remaining.retain(|_, t| {
            *t = t.saturating_sub(1);
            *t > 0
        });
    }
}
