//! Intra-team chaser election.
//!
//! After the all-to-all exchange each teammate holds the same vector
//! of expected rounds-to-ball, indexed by roster slot. The election
//! is a deterministic scan (strictly lower wins, first slot wins
//! ties), so every teammate independently elects the same chaser.

/// Slot of the teammate elected to chase the ball this round.
pub fn elect_chaser(expected_rounds: &[u32]) -> usize {
    let mut best = 0;
    for (slot, &rounds) in expected_rounds.iter().enumerate() {
        if rounds < expected_rounds[best] {
            best = slot;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_the_fastest_arrival() {
        assert_eq!(elect_chaser(&[5, 3, 7, 2, 9]), 3);
    }

    #[test]
    fn first_slot_wins_ties() {
        assert_eq!(elect_chaser(&[4, 2, 2, 2]), 1);
        assert_eq!(elect_chaser(&[3, 3, 3]), 0);
    }

    #[test]
    fn player_on_the_ball_wins_outright() {
        assert_eq!(elect_chaser(&[2, 0, 1]), 1);
    }
}
