//! Coordinator-owned match state.
//!
//! Exactly one agent (the coordinator) holds the authoritative score,
//! half index and round counter; every other agent only ever sees the
//! ball position it receives by broadcast. State is mutated at round
//! boundaries only.

use serde::{Deserialize, Serialize};

use crate::identity::{Half, TeamSide};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchState {
    pub round: u32,
    pub rounds_per_half: u32,
    pub score: [u32; 2],
}

impl MatchState {
    pub fn new(rounds_per_half: u32) -> Self {
        Self { round: 0, rounds_per_half, score: [0, 0] }
    }

    /// Half the given round belongs to. Purely a counter threshold,
    /// not a distinct protocol mode.
    pub fn half_of(&self, round: u32) -> Half {
        if round < self.rounds_per_half {
            Half::First
        } else {
            Half::Second
        }
    }

    pub fn current_half(&self) -> Half {
        self.half_of(self.round)
    }

    pub fn total_rounds(&self) -> u32 {
        self.rounds_per_half * 2
    }

    pub fn record_goal(&mut self, team: TeamSide) {
        self.score[team.index()] += 1;
    }
}
