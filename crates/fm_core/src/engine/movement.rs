//! Ball-chasing movement.
//!
//! A chaser within reach snaps exactly onto the ball. Otherwise it
//! spends its whole stride, splitting it between the axes: the x
//! share is drawn uniformly from the feasible range and the rest
//! goes to y, each axis stepping toward the ball.

use rand::Rng;

use crate::pitch::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub position: Position,
    pub reached: bool,
}

/// Advance a chaser toward the ball by at most `max_chasable` steps.
///
/// The feasible x share is `[min_x, max_x)` where
/// `max_x = min(max_chasable, |dx|)` and
/// `min_x = max_chasable - min(max_chasable, |dy|)`; the range is
/// half-open (degenerate range yields `min_x`), matching the original
/// engine's draw. The outcome never overshoots the ball on either
/// axis, and when not snapping it moves exactly `max_chasable` steps.
pub fn chase_ball<R: Rng>(rng: &mut R, from: Position, ball: Position, max_chasable: i32) -> MoveOutcome {
    if from.distance(ball) <= max_chasable {
        return MoveOutcome { position: ball, reached: true };
    }

    let dx = (from.x - ball.x).abs();
    let dy = (from.y - ball.y).abs();
    let max_x = max_chasable.min(dx);
    let min_x = max_chasable - max_chasable.min(dy);
    let x_steps = if max_x > min_x { rng.gen_range(min_x..max_x) } else { min_x };
    let y_steps = max_chasable - x_steps;

    let x = if ball.x > from.x { from.x + x_steps } else { from.x - x_steps };
    let y = if ball.y > from.y { from.y + y_steps } else { from.y - y_steps };
    MoveOutcome { position: Position::new(x, y), reached: false }
}

/// Rounds a player expects to need before standing on the ball, used
/// for the intra-team chaser election.
pub fn expected_rounds(dist: i32, max_chasable: i32) -> u32 {
    let mut rounds = dist / max_chasable;
    if dist % max_chasable != 0 {
        rounds += 1;
    }
    rounds as u32
}
