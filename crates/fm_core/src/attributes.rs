//! Player attributes: speed, dribbling, kick.
//!
//! Assigned once at kickoff from the player's own random source and
//! immutable afterwards. The triple always sums to `attr_total` with
//! every component inside `[attr_min, attr_max]`.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::pitch::PitchConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerAttributes {
    pub speed: i32,
    pub dribbling: i32,
    pub kick: i32,
}

impl PlayerAttributes {
    /// Draw a random triple. Speed is drawn first, then dribbling
    /// from the range that keeps the kick remainder inside bounds,
    /// so the sum and per-component invariants hold by construction.
    pub fn generate<R: Rng>(rng: &mut R, cfg: &PitchConfig) -> Self {
        let speed_max = cfg.attr_max.min(cfg.attr_total - 2 * cfg.attr_min);
        let speed = rng.gen_range(cfg.attr_min..=speed_max);
        let drib_min = cfg.attr_min.max(cfg.attr_total - speed - cfg.attr_max);
        let drib_max = cfg.attr_max.min(cfg.attr_total - speed - cfg.attr_min);
        let dribbling = rng.gen_range(drib_min..=drib_max);
        let kick = cfg.attr_total - speed - dribbling;
        Self { speed, dribbling, kick }
    }

    /// Farthest a player can run in one round: twice the speed,
    /// capped by the per-round step limit.
    pub fn max_chasable_distance(&self, cfg: &PitchConfig) -> i32 {
        (2 * self.speed).min(cfg.max_step)
    }
}
