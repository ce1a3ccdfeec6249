//! Pitch geometry: integer positions, Manhattan distance and the
//! static match configuration.
//!
//! The pitch is a `length x width` integer lattice. X runs along the
//! length (goal line to goal line), Y across the width. All movement
//! rules measure distance in the Manhattan metric.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// A point on the pitch. Valid positions satisfy
/// `0 <= x < length`, `0 <= y < width`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another position.
    pub fn distance(&self, other: Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Static match configuration. All values are fixed before kickoff
/// and identical on every agent; `validate` must pass before any
/// agent is spawned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchConfig {
    /// Field length in steps (x axis, goal line to goal line).
    pub length: i32,
    /// Field width in steps (y axis, touchline to touchline).
    pub width: i32,
    /// Inclusive y band of both goal mouths.
    pub goal_low_y: i32,
    pub goal_high_y: i32,
    /// Side of one square patch.
    pub patch_size: i32,
    /// Patch grid dimensions; `grid_cols * patch_size == length` and
    /// `grid_rows * patch_size == width` must hold exactly.
    pub grid_rows: i32,
    pub grid_cols: i32,
    pub players_per_team: usize,
    /// Attribute triple constraints: each of speed/dribbling/kick is
    /// in `[attr_min, attr_max]` and the three sum to `attr_total`.
    pub attr_total: i32,
    pub attr_min: i32,
    pub attr_max: i32,
    /// Hard cap on steps run per round, regardless of speed.
    pub max_step: i32,
    pub rounds_per_half: u32,
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            length: 128,
            width: 96,
            goal_low_y: 43,
            goal_high_y: 51,
            patch_size: 32,
            grid_rows: 3,
            grid_cols: 4,
            players_per_team: 11,
            attr_total: 15,
            attr_min: 1,
            attr_max: 10,
            max_step: 10,
            rounds_per_half: 2700,
        }
    }
}

impl PitchConfig {
    /// Number of patch agents (one per grid cell).
    pub fn num_patches(&self) -> usize {
        (self.grid_rows * self.grid_cols) as usize
    }

    /// Number of player agents across both teams.
    pub fn num_players(&self) -> usize {
        self.players_per_team * 2
    }

    /// Total agent count; also the size of the rank space.
    pub fn num_agents(&self) -> usize {
        self.num_patches() + self.num_players()
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.length && pos.y >= 0 && pos.y < self.width
    }

    /// Check the invariants every rule relies on. Violations are
    /// fatal at startup and never recovered.
    pub fn validate(&self) -> Result<()> {
        if self.length <= 0 || self.width <= 0 || self.patch_size <= 0 {
            return Err(SimError::Config(format!(
                "non-positive field dimensions: {}x{} patch {}",
                self.length, self.width, self.patch_size
            )));
        }
        if self.grid_cols * self.patch_size != self.length {
            return Err(SimError::Config(format!(
                "patch grid does not tile the length: {} cols * {} != {}",
                self.grid_cols, self.patch_size, self.length
            )));
        }
        if self.grid_rows * self.patch_size != self.width {
            return Err(SimError::Config(format!(
                "patch grid does not tile the width: {} rows * {} != {}",
                self.grid_rows, self.patch_size, self.width
            )));
        }
        if self.goal_low_y < 0 || self.goal_high_y >= self.width || self.goal_low_y > self.goal_high_y {
            return Err(SimError::Config(format!(
                "goal band [{}, {}] outside field width {}",
                self.goal_low_y, self.goal_high_y, self.width
            )));
        }
        if self.players_per_team == 0 {
            return Err(SimError::Config("empty roster".into()));
        }
        if self.attr_min < 1 || self.attr_min > self.attr_max {
            return Err(SimError::Config(format!(
                "bad attribute bounds [{}, {}]",
                self.attr_min, self.attr_max
            )));
        }
        // A valid triple must exist: three minimums must fit under the
        // total and three maximums must cover it.
        if 3 * self.attr_min > self.attr_total || 3 * self.attr_max < self.attr_total {
            return Err(SimError::Config(format!(
                "no attribute triple in [{}, {}] sums to {}",
                self.attr_min, self.attr_max, self.attr_total
            )));
        }
        if self.max_step < 2 * self.attr_min {
            return Err(SimError::Config(format!(
                "max_step {} below the slowest player's stride",
                self.max_step
            )));
        }
        if self.rounds_per_half == 0 {
            return Err(SimError::Config("rounds_per_half must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        PitchConfig::default().validate().expect("canonical constants must validate");
    }

    #[test]
    fn manhattan_distance() {
        let a = Position::new(3, 4);
        let b = Position::new(0, 0);
        assert_eq!(a.distance(b), 7);
        assert_eq!(b.distance(a), 7, "distance must be symmetric");
        assert_eq!(a.distance(a), 0);
    }

    #[test]
    fn rejects_untiled_grid() {
        let cfg = PitchConfig { patch_size: 30, ..Default::default() };
        assert!(cfg.validate().is_err(), "30 does not tile 128x96");
    }

    #[test]
    fn rejects_goal_band_outside_field() {
        let cfg = PitchConfig { goal_high_y: 96, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_infeasible_attribute_bounds() {
        let cfg = PitchConfig { attr_min: 6, ..Default::default() };
        assert!(cfg.validate().is_err(), "3*6 > 15 leaves no valid triple");
    }

    #[test]
    fn bounds_check_is_half_open() {
        let cfg = PitchConfig::default();
        assert!(cfg.in_bounds(Position::new(0, 0)));
        assert!(cfg.in_bounds(Position::new(127, 95)));
        assert!(!cfg.in_bounds(Position::new(128, 0)));
        assert!(!cfg.in_bounds(Position::new(0, 96)));
        assert!(!cfg.in_bounds(Position::new(-1, 0)));
    }
}
