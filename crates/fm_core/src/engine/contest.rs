//! Possession contest at the ball's patch.
//!
//! The patch agent owning the ball's cell evaluates the contest over
//! the values gathered from its location group. Only agents standing
//! exactly on the ball take part; the winner is drawn uniformly among
//! those with the maximal challenge value.

use rand::Rng;

use crate::pitch::Position;

/// One gathered entry from the location group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contender {
    pub rank: usize,
    pub position: Position,
    /// `None` when the agent did not reach the ball this round. A
    /// co-located agent with no challenge still contests (valued
    /// below any real challenge), so a player already standing on the
    /// ball keeps it when nobody challenges.
    pub challenge: Option<i32>,
}

/// Challenge value for a player that reached the ball: a uniform
/// factor in 1..=9 weighted by dribbling skill.
pub fn ball_challenge<R: Rng>(rng: &mut R, dribbling: i32) -> i32 {
    rng.gen_range(1..=9) * dribbling
}

/// Pick the contest winner, or `None` when nobody stands on the ball
/// (the ball then stays where it is this round).
pub fn resolve<R: Rng>(rng: &mut R, contenders: &[Contender], ball: Position) -> Option<usize> {
    let mut best = i32::MIN;
    let mut tied: Vec<usize> = Vec::new();
    for c in contenders {
        if c.position != ball {
            continue;
        }
        let value = c.challenge.unwrap_or(-1);
        if value > best {
            best = value;
            tied.clear();
            tied.push(c.rank);
        } else if value == best {
            tied.push(c.rank);
        }
    }
    if tied.is_empty() {
        return None;
    }
    Some(tied[rng.gen_range(0..tied.len())])
}
