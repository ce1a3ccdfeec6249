//! Agent identities and the rank space.
//!
//! Every process in the match is either a patch agent (one per grid
//! cell) or a player agent (one per roster slot). Roles are explicit
//! tagged variants resolved once at startup; nothing downstream
//! derives a role from raw rank arithmetic. Patch agents occupy ranks
//! `0 .. num_patches`, player agents follow, home team first.

use serde::{Deserialize, Serialize};

use crate::grid::PatchId;
use crate::pitch::PitchConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamSide {
    Home,
    Away,
}

impl TeamSide {
    pub fn index(&self) -> usize {
        match self {
            TeamSide::Home => 0,
            TeamSide::Away => 1,
        }
    }

    pub fn from_index(idx: usize) -> Self {
        if idx == 0 {
            TeamSide::Home
        } else {
            TeamSide::Away
        }
    }

    pub fn opponent(&self) -> Self {
        match self {
            TeamSide::Home => TeamSide::Away,
            TeamSide::Away => TeamSide::Home,
        }
    }
}

impl std::fmt::Display for TeamSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeamSide::Home => write!(f, "A"),
            TeamSide::Away => write!(f, "B"),
        }
    }
}

/// Match half. Attack directions swap at half-time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Half {
    First,
    Second,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentId {
    /// Owns one grid cell and leads that cell's location group.
    Patch { row: i32, col: i32 },
    /// One roster slot; owns its own position and attributes.
    Player { team: TeamSide, slot: usize },
}

impl AgentId {
    /// The coordinator is the patch agent of cell (0, 0). It owns the
    /// authoritative ball, the score and all reporting.
    pub fn is_coordinator(&self) -> bool {
        matches!(self, AgentId::Patch { row: 0, col: 0 })
    }

    pub fn patch(&self) -> Option<PatchId> {
        match self {
            AgentId::Patch { row, col } => Some(PatchId { row: *row, col: *col }),
            AgentId::Player { .. } => None,
        }
    }

    /// Unique rank in `0 .. cfg.num_agents()`. Patch agents first in
    /// row-major order, then home players, then away players.
    pub fn rank(&self, cfg: &PitchConfig) -> usize {
        match self {
            AgentId::Patch { row, col } => (row * cfg.grid_cols + col) as usize,
            AgentId::Player { team, slot } => {
                cfg.num_patches() + team.index() * cfg.players_per_team + slot
            }
        }
    }

    pub fn from_rank(rank: usize, cfg: &PitchConfig) -> Self {
        if rank < cfg.num_patches() {
            let patch = PatchId::from_index(rank, cfg);
            AgentId::Patch { row: patch.row, col: patch.col }
        } else {
            let offset = rank - cfg.num_patches();
            AgentId::Player {
                team: TeamSide::from_index(offset / cfg.players_per_team),
                slot: offset % cfg.players_per_team,
            }
        }
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentId::Patch { row, col } => write!(f, "patch({},{})", row, col),
            AgentId::Player { team, slot } => write!(f, "{}#{}", team, slot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_roundtrip_covers_all_agents() {
        let cfg = PitchConfig::default();
        for rank in 0..cfg.num_agents() {
            let id = AgentId::from_rank(rank, &cfg);
            assert_eq!(id.rank(&cfg), rank, "rank mapping must be a bijection: {:?}", id);
        }
    }

    #[test]
    fn coordinator_is_rank_zero() {
        let cfg = PitchConfig::default();
        let id = AgentId::from_rank(0, &cfg);
        assert!(id.is_coordinator());
        assert!(!AgentId::from_rank(1, &cfg).is_coordinator());
    }

    #[test]
    fn player_ranks_follow_patches() {
        let cfg = PitchConfig::default();
        let first_player = AgentId::Player { team: TeamSide::Home, slot: 0 };
        assert_eq!(first_player.rank(&cfg), cfg.num_patches());
        let last_player = AgentId::Player { team: TeamSide::Away, slot: 10 };
        assert_eq!(last_player.rank(&cfg), cfg.num_agents() - 1);
    }
}
