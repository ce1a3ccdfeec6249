//! Shooting after winning possession.
//!
//! The winner always aims at the goal mouth it attacks this half,
//! with the target y clamped into the goal band. A kick covers at
//! most `2 * kick` Manhattan steps: a shot that covers the full
//! distance lands exactly on target, otherwise the budget is spent
//! horizontally first with any remainder applied vertically, the same
//! axis priority the move rule uses.

use crate::identity::{Half, TeamSide};
use crate::pitch::{PitchConfig, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShotOutcome {
    pub ball: Position,
    /// True when the kick covered the whole distance to the target.
    pub completed: bool,
}

/// X column of the goal line `team` attacks in `half`. Home attacks
/// the low goal in the first half and the high goal in the second;
/// Away mirrors.
pub fn attacked_goal_x(half: Half, team: TeamSide, cfg: &PitchConfig) -> i32 {
    match (half, team) {
        (Half::First, TeamSide::Home) | (Half::Second, TeamSide::Away) => 0,
        _ => cfg.length - 1,
    }
}

pub fn shoot(half: Half, team: TeamSide, from: Position, kick: i32, cfg: &PitchConfig) -> ShotOutcome {
    let target_x = attacked_goal_x(half, team, cfg);
    let target_y = from.y.clamp(cfg.goal_low_y, cfg.goal_high_y);
    let target = Position::new(target_x, target_y);

    let max_kick = 2 * kick;
    let dist = from.distance(target);
    if max_kick >= dist {
        return ShotOutcome { ball: target, completed: true };
    }

    let x_dist = (target.x - from.x).abs();
    if x_dist > max_kick {
        let x = if target.x > from.x { from.x + max_kick } else { from.x - max_kick };
        ShotOutcome { ball: Position::new(x, from.y), completed: false }
    } else {
        let leftover = max_kick - x_dist;
        let y = if target.y > from.y { from.y + leftover } else { from.y - leftover };
        ShotOutcome { ball: Position::new(target.x, y), completed: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attack_direction_swaps_at_half_time() {
        let cfg = PitchConfig::default();
        assert_eq!(attacked_goal_x(Half::First, TeamSide::Home, &cfg), 0);
        assert_eq!(attacked_goal_x(Half::Second, TeamSide::Home, &cfg), 127);
        assert_eq!(attacked_goal_x(Half::First, TeamSide::Away, &cfg), 127);
        assert_eq!(attacked_goal_x(Half::Second, TeamSide::Away, &cfg), 0);
    }

    #[test]
    fn full_budget_lands_on_target() {
        let cfg = PitchConfig::default();
        // kick 5 -> budget 10; from (6, 45) the low goal is 6 away.
        let out = shoot(Half::First, TeamSide::Home, Position::new(6, 45), 5, &cfg);
        assert!(out.completed);
        assert_eq!(out.ball, Position::new(0, 45));
    }

    #[test]
    fn short_budget_closes_horizontal_first() {
        let cfg = PitchConfig::default();
        // From (8, 36): target (0, 43), distance 15, budget 10.
        // 8 horizontal steps, 2 left for the vertical gap.
        let from = Position::new(8, 36);
        let out = shoot(Half::First, TeamSide::Home, from, 5, &cfg);
        assert!(!out.completed);
        assert_eq!(out.ball, Position::new(0, 38));
        assert_eq!(from.distance(out.ball), 10, "whole budget must be spent");
    }

    #[test]
    fn long_horizontal_gap_leaves_y_untouched() {
        let cfg = PitchConfig::default();
        let from = Position::new(50, 20);
        let out = shoot(Half::First, TeamSide::Home, from, 4, &cfg);
        assert!(!out.completed);
        assert_eq!(out.ball, Position::new(42, 20));
    }

    #[test]
    fn target_y_clamps_into_goal_band() {
        let cfg = PitchConfig::default();
        // Inside the band the shooter keeps its own line.
        let out = shoot(Half::First, TeamSide::Home, Position::new(3, 47), 9, &cfg);
        assert_eq!(out.ball.y, 47);
        // Below the band it aims at the low edge.
        let out = shoot(Half::First, TeamSide::Home, Position::new(3, 10), 9, &cfg);
        assert_eq!(out.ball.y, 10 + (18 - 3), "budget 18 spends 3 on x, 15 toward y=43");
    }
}
