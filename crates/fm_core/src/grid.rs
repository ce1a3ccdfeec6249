//! Spatial partition of the pitch into fixed-size square patches.
//!
//! Every position belongs to exactly one patch and every patch is
//! owned by one patch agent. `patch_of` is a pure function of the
//! position and the static configuration, so every agent can evaluate
//! it locally and all agents agree without any communication. Dynamic
//! regrouping keys off this function each round.

use serde::{Deserialize, Serialize};

use crate::pitch::{PitchConfig, Position};

/// Identifier of one grid cell, `row` counted across the width and
/// `col` along the length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatchId {
    pub row: i32,
    pub col: i32,
}

impl PatchId {
    /// Rank of the agent owning this patch. Patch agents occupy the
    /// low end of the rank space, in row-major order.
    pub fn index(&self, cfg: &PitchConfig) -> usize {
        (self.row * cfg.grid_cols + self.col) as usize
    }

    pub fn from_index(idx: usize, cfg: &PitchConfig) -> Self {
        let idx = idx as i32;
        Self { row: idx / cfg.grid_cols, col: idx % cfg.grid_cols }
    }
}

/// Map a position to the patch containing it. Total and disjoint over
/// the whole field: the patches are half-open squares, so no position
/// lands in two patches and none is left out.
pub fn patch_of(pos: Position, cfg: &PitchConfig) -> PatchId {
    PatchId { row: pos.y / cfg.patch_size, col: pos.x / cfg.patch_size }
}
