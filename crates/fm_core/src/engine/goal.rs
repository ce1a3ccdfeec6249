//! Goal detection and ball respawn.
//!
//! A goal stands only when the ball sits exactly on a goal-line
//! column with its y inside the goal band. Which boundary scores for
//! which team follows the attack direction of the current half.

use rand::Rng;

use crate::identity::{Half, TeamSide};
use crate::pitch::{PitchConfig, Position};

/// Team credited with a goal for this ball position, if any.
pub fn scoring_team(half: Half, ball: Position, cfg: &PitchConfig) -> Option<TeamSide> {
    if ball.y < cfg.goal_low_y || ball.y > cfg.goal_high_y {
        return None;
    }
    let last = cfg.length - 1;
    match (ball.x, half) {
        (0, Half::First) => Some(TeamSide::Home),
        (x, Half::Second) if x == last => Some(TeamSide::Home),
        (0, Half::Second) => Some(TeamSide::Away),
        (x, Half::First) if x == last => Some(TeamSide::Away),
        _ => None,
    }
}

/// Fresh in-bounds ball position with both goal columns excluded.
/// Used at kickoff and after every goal.
pub fn respawn_ball<R: Rng>(rng: &mut R, cfg: &PitchConfig) -> Position {
    Position::new(rng.gen_range(1..cfg.length - 1), rng.gen_range(0..cfg.width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn outside_band_never_scores() {
        let cfg = PitchConfig::default();
        for half in [Half::First, Half::Second] {
            assert_eq!(scoring_team(half, Position::new(0, 42), &cfg), None);
            assert_eq!(scoring_team(half, Position::new(127, 52), &cfg), None);
            assert_eq!(scoring_team(half, Position::new(0, 0), &cfg), None);
        }
    }

    #[test]
    fn boundary_and_half_select_the_scorer() {
        let cfg = PitchConfig::default();
        let low = Position::new(0, 47);
        let high = Position::new(127, 47);
        assert_eq!(scoring_team(Half::First, low, &cfg), Some(TeamSide::Home));
        assert_eq!(scoring_team(Half::First, high, &cfg), Some(TeamSide::Away));
        assert_eq!(scoring_team(Half::Second, low, &cfg), Some(TeamSide::Away));
        assert_eq!(scoring_team(Half::Second, high, &cfg), Some(TeamSide::Home));
    }

    #[test]
    fn midfield_ball_never_scores() {
        let cfg = PitchConfig::default();
        assert_eq!(scoring_team(Half::First, Position::new(64, 47), &cfg), None);
    }

    #[test]
    fn respawn_avoids_goal_columns() {
        let cfg = PitchConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..500 {
            let ball = respawn_ball(&mut rng, &cfg);
            assert!(cfg.in_bounds(ball));
            assert!(ball.x != 0 && ball.x != cfg.length - 1, "goal columns are excluded");
        }
    }
}
