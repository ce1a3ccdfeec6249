//! Synchronization groups.
//!
//! Static groups (all patch agents, one per team) are pure functions
//! of the configuration, formed once at startup. Dynamic groups are
//! recomputed each round by a `split`: every agent contributes a
//! locally computed color through a world allgather, then filters and
//! sorts identically. Membership is therefore a deterministic
//! function of barrier-synchronized state; two agents disagreeing on
//! it would deadlock the round, which is a contract violation rather
//! than a recoverable condition.

use fm_core::{AgentId, PitchConfig, Result, SimError, TeamSide};

use crate::fabric::{Endpoint, Payload, Tag};

/// A transient set of agents sharing one color. Valid for a single
/// round phase; never reuse across rounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncGroup {
    pub color: usize,
    /// Member ranks in ascending order.
    pub members: Vec<usize>,
}

impl SyncGroup {
    /// Designated leader: the lowest rank. For location groups this
    /// is always the owning patch agent, since patch ranks precede
    /// player ranks.
    pub fn leader(&self) -> usize {
        self.members[0]
    }

    pub fn contains(&self, rank: usize) -> bool {
        self.members.contains(&rank)
    }
}

/// Static group of all patch agents.
pub fn patch_group(cfg: &PitchConfig) -> Vec<usize> {
    (0..cfg.num_patches()).collect()
}

/// Static group of one team's player agents.
pub fn team_group(cfg: &PitchConfig, team: TeamSide) -> Vec<usize> {
    (0..cfg.players_per_team)
        .map(|slot| AgentId::Player { team, slot }.rank(cfg))
        .collect()
}

/// Form the dynamic group for `color` out of the whole world. Every
/// agent calls this with its own color and gets back exactly the
/// members that chose the same one.
pub fn split(ep: &mut Endpoint, world: &[usize], color: usize, tag: Tag) -> Result<SyncGroup> {
    let entries = ep.all_exchange(world, tag, Payload::Color(color))?;
    let mut members = Vec::new();
    for (rank, payload) in entries {
        match payload {
            Payload::Color(c) => {
                if c == color {
                    members.push(rank);
                }
            }
            other => {
                return Err(SimError::ProtocolDivergence {
                    round: tag.round,
                    step: tag.step,
                    detail: format!("expected color from rank {}, got {:?}", rank, other),
                })
            }
        }
    }
    // all_exchange walks `world` in order, so members are already
    // sorted; keep the sort as a guard against a reordered world.
    members.sort_unstable();
    Ok(SyncGroup { color, members })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fabric::Fabric;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn static_groups_tile_the_rank_space() {
        let cfg = PitchConfig::default();
        let patches = patch_group(&cfg);
        let home = team_group(&cfg, TeamSide::Home);
        let away = team_group(&cfg, TeamSide::Away);
        assert_eq!(patches.len(), 12);
        assert_eq!(home.len(), 11);
        assert_eq!(away.len(), 11);
        let mut all: Vec<usize> = patches.into_iter().chain(home).chain(away).collect();
        all.sort_unstable();
        assert_eq!(all, (0..cfg.num_agents()).collect::<Vec<_>>());
    }

    #[test]
    fn split_agrees_across_all_participants() {
        let world: Vec<usize> = (0..5).collect();
        let colors = [0usize, 1, 0, 1, 0];
        let (fabric, receivers) = Fabric::new(5);
        let handles: Vec<_> = receivers
            .into_iter()
            .enumerate()
            .map(|(rank, rx)| {
                let fabric = Arc::clone(&fabric);
                let world = world.clone();
                thread::spawn(move || {
                    let mut ep = Endpoint::new(rank, fabric, rx);
                    split(&mut ep, &world, colors[rank], Tag::new(0, 2)).expect("split")
                })
            })
            .collect();
        let groups: Vec<SyncGroup> = handles.into_iter().map(|h| h.join().expect("thread")).collect();
        assert_eq!(groups[0].members, vec![0, 2, 4]);
        assert_eq!(groups[2], groups[0], "co-colored agents must agree on membership");
        assert_eq!(groups[4], groups[0]);
        assert_eq!(groups[1].members, vec![1, 3]);
        assert_eq!(groups[1].leader(), 1);
    }
}
