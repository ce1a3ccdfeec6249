//! Per-round coordinator report.
//!
//! Emitted once per round by the coordinator after scoring. The
//! `Display` form follows the original console layout; the serde form
//! exists so regression tests can compare whole matches byte for
//! byte.

use serde::{Deserialize, Serialize};

use crate::identity::{AgentId, Half, TeamSide};
use crate::pitch::Position;

/// One roster line of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerLine {
    pub team: TeamSide,
    pub slot: usize,
    pub old_position: Position,
    pub new_position: Position,
    /// Player finished the round standing on the ball position that
    /// was broadcast at the start of it.
    pub reached: bool,
    /// Player won the contest and kicked the ball.
    pub kicked: bool,
    /// Challenge value carried into the contest, if any.
    pub challenge: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundReport {
    pub round: u32,
    pub half: Half,
    /// Ball position after this round's shot (and before any respawn).
    pub ball: Position,
    pub winner: Option<AgentId>,
    pub lines: Vec<PlayerLine>,
    pub goal: Option<TeamSide>,
    /// Cumulative score after this round, home first.
    pub score: [u32; 2],
}

impl std::fmt::Display for RoundReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Round {}", self.round)?;
        writeln!(f, "Ball is in {} {}", self.ball.x, self.ball.y)?;
        match self.winner {
            Some(id) => writeln!(f, "{} win the ball", id)?,
            None => writeln!(f, "no one win the ball")?,
        }
        for team in [TeamSide::Home, TeamSide::Away] {
            writeln!(f, "Team {}:", team)?;
            for line in self.lines.iter().filter(|l| l.team == team) {
                writeln!(
                    f,
                    "{:2}, old x: {:3}, old y: {:2}, final x: {:3}, final y: {:2}, reached {}, kicked {}, bc {:4}",
                    line.slot,
                    line.old_position.x,
                    line.old_position.y,
                    line.new_position.x,
                    line.new_position.y,
                    line.reached as u8,
                    line.kicked as u8,
                    line.challenge.unwrap_or(-1),
                )?;
            }
        }
        if let Some(team) = self.goal {
            writeln!(f, "GOAL GOAL GOAL GOAL GOAL GOAL GOAL Team {} score!!!", team)?;
        }
        writeln!(f, "Score: {} - {}", self.score[0], self.score[1])
    }
}
