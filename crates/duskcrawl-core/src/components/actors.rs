//! Player and enemy-specific components.

/// Marker component identifying the player entity.
#[derive(Debug, Clone, Copy, Default)]
pub struct Player;

/// Per-enemy AI state: the current path, recompute bookkeeping, stuck
/// detection, and stun handling.
#[derive(Debug, Clone, Default)]
pub struct EnemyAgent {
    /// Tile path toward the player, start→goal order.
    pub path: Vec<(u32, u32)>,
    /// Index of the next waypoint in `path`.
    pub next_waypoint: usize,
    /// Player tile the current path was computed toward. `None` forces a
    /// recompute.
    pub target_tile: Option<(u32, u32)>,
    /// Ticks since the path was last computed.
    pub ticks_since_repath: u32,
    /// Consecutive ticks of intended-but-failed movement.
    pub stuck_ticks: u32,
    /// Remaining stun duration in ticks. Movement and pathing are
    /// suspended while non-zero.
    pub stun_ticks: u32,
    /// Whether the renderer should show the stun effect.
    pub stun_visual: bool,
}

impl EnemyAgent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_stunned(&self) -> bool {
        self.stun_ticks > 0
    }

    /// Stun for `ticks`. Overlapping stuns keep the longer remainder; they
    /// never stack additively.
    pub fn apply_stun(&mut self, ticks: u32, visual: bool) {
        self.stun_ticks = self.stun_ticks.max(ticks);
        if visual {
            self.stun_visual = true;
        }
    }

    /// Drop the current path so the next update recomputes it.
    pub fn clear_path(&mut self) {
        self.path.clear();
        self.next_waypoint = 0;
        self.target_tile = None;
    }

    /// Whether the path has been fully consumed.
    pub fn path_exhausted(&self) -> bool {
        self.next_waypoint >= self.path.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stun_takes_maximum() {
        let mut agent = EnemyAgent::new();

        agent.apply_stun(60, true);
        assert_eq!(agent.stun_ticks, 60);

        // A shorter stun does not cut the current one short
        agent.apply_stun(20, false);
        assert_eq!(agent.stun_ticks, 60);

        // A longer stun extends it, but never adds
        agent.apply_stun(90, true);
        assert_eq!(agent.stun_ticks, 90);
        assert!(agent.stun_visual);
    }

    #[test]
    fn test_clear_path_forces_recompute() {
        let mut agent = EnemyAgent {
            path: vec![(1, 1), (2, 2)],
            next_waypoint: 1,
            target_tile: Some((2, 2)),
            ..Default::default()
        };

        agent.clear_path();
        assert!(agent.path.is_empty());
        assert!(agent.path_exhausted());
        assert_eq!(agent.target_tile, None);
    }
}
