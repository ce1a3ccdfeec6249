//! The per-agent round state machine.
//!
//! Every agent, patch or player, walks the identical schedule of
//! collectives each round, with a world barrier after every step:
//!
//! 0. ball broadcast from the coordinator
//! 1. intra-team all-to-all of expected rounds-to-ball
//! 2. chaser movement (local) + dynamic regroup by location
//! 3. patch-local gather of positions and challenges
//! 4. contest resolution + winner broadcast from the ball patch owner
//! 5. shot by the winner + ball rebroadcast (skipped when no winner)
//! 6. reporting regroup (coordinator + players vs. remaining patches)
//! 7. player state gather to the coordinator
//!
//! After step 7 the coordinator alone updates score and ball and
//! emits the round report; no collective is involved. Correctness
//! rests on every agent computing identical group memberships from
//! the same broadcast state.

use crossbeam_channel::Sender;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use fm_core::engine::{chase, contest, goal, movement, shoot};
use fm_core::grid::{self, PatchId};
use fm_core::{
    AgentId, Half, MatchState, PitchConfig, PlayerAttributes, PlayerLine, Position, Result,
    RoundReport, SimError, TeamSide,
};

use crate::fabric::{Endpoint, Payload, Tag};
use crate::groups;

/// Step numbers of the fixed round schedule. Shared by both roles so
/// frame tags always line up.
mod step {
    pub const BALL: u8 = 0;
    pub const ETA: u8 = 1;
    pub const LOCATE_SPLIT: u8 = 2;
    pub const LOCATE_GATHER: u8 = 3;
    pub const WINNER: u8 = 4;
    pub const BALL_RELAY: u8 = 5;
    pub const REPORT_SPLIT: u8 = 6;
    pub const REPORT_GATHER: u8 = 7;
}

/// Rank of the coordinator (patch agent of cell (0, 0)).
pub const COORDINATOR: usize = 0;

/// Reporting-split colors: the coordinator and all players form the
/// active group, the remaining patch agents sit the phase out.
const REPORT_ACTIVE: usize = 0;
const REPORT_IDLE: usize = 1;

fn expect_ball(payload: Payload, tag: Tag) -> Result<Position> {
    match payload {
        Payload::Ball(pos) => Ok(pos),
        other => Err(divergence(tag, format!("expected ball, got {:?}", other))),
    }
}

fn expect_winner(payload: Payload, tag: Tag) -> Result<Option<usize>> {
    match payload {
        Payload::Winner(w) => Ok(w),
        other => Err(divergence(tag, format!("expected winner, got {:?}", other))),
    }
}

fn divergence(tag: Tag, detail: String) -> SimError {
    SimError::ProtocolDivergence { round: tag.round, step: tag.step, detail }
}

fn half_of(round: u32, cfg: &PitchConfig) -> Half {
    if round < cfg.rounds_per_half {
        Half::First
    } else {
        Half::Second
    }
}

// ---------------------------------------------------------------------------
// Player agent
// ---------------------------------------------------------------------------

pub struct PlayerAgent {
    cfg: PitchConfig,
    team: TeamSide,
    slot: usize,
    rank: usize,
    rng: ChaCha8Rng,
    attrs: PlayerAttributes,
    max_chasable: i32,
    position: Position,
    teammates: Vec<usize>,
    world: Vec<usize>,
    ep: Endpoint,
}

impl PlayerAgent {
    pub fn new(team: TeamSide, slot: usize, cfg: PitchConfig, seed: u64, ep: Endpoint) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let attrs = PlayerAttributes::generate(&mut rng, &cfg);
        let position =
            Position::new(rng.gen_range(0..cfg.length), rng.gen_range(0..cfg.width));
        let max_chasable = attrs.max_chasable_distance(&cfg);
        let rank = AgentId::Player { team, slot }.rank(&cfg);
        let teammates = groups::team_group(&cfg, team);
        let world = (0..cfg.num_agents()).collect();
        trace!(rank, ?team, slot, ?attrs, "player agent ready");
        Self { cfg, team, slot, rank, rng, attrs, max_chasable, position, teammates, world, ep }
    }

    pub fn run(mut self, total_rounds: u32) -> Result<()> {
        for round in 0..total_rounds {
            self.play_round(round)?;
        }
        Ok(())
    }

    fn play_round(&mut self, round: u32) -> Result<()> {
        let half = half_of(round, &self.cfg);

        // Step 0: refresh the cached ball from the coordinator.
        let tag = Tag::new(round, step::BALL);
        let ball = expect_ball(self.ep.broadcast(COORDINATOR, tag, None)?, tag)?;
        self.ep.barrier();

        // Step 1: share expected rounds-to-ball with the team.
        let tag = Tag::new(round, step::ETA);
        let eta = movement::expected_rounds(self.position.distance(ball), self.max_chasable);
        let entries = self.ep.all_exchange(&self.teammates, tag, Payload::Eta(eta))?;
        let mut etas = Vec::with_capacity(entries.len());
        for (rank, payload) in entries {
            match payload {
                Payload::Eta(e) => etas.push(e),
                other => {
                    return Err(divergence(
                        tag,
                        format!("expected eta from rank {}, got {:?}", rank, other),
                    ))
                }
            }
        }

        // Step 2: the elected chaser moves; everyone regroups by the
        // patch containing its (possibly unchanged) position.
        let mut challenge = None;
        if chase::elect_chaser(&etas) == self.slot {
            let outcome = movement::chase_ball(&mut self.rng, self.position, ball, self.max_chasable);
            if !self.cfg.in_bounds(outcome.position) {
                return Err(SimError::OutOfBounds {
                    x: outcome.position.x,
                    y: outcome.position.y,
                });
            }
            self.position = outcome.position;
            if outcome.reached {
                challenge = Some(contest::ball_challenge(&mut self.rng, self.attrs.dribbling));
            }
        }
        let color = grid::patch_of(self.position, &self.cfg).index(&self.cfg);
        let tag = Tag::new(round, step::LOCATE_SPLIT);
        let group = groups::split(&mut self.ep, &self.world, color, tag)?;
        self.ep.barrier();

        // Step 3: report position and challenge to the patch owner.
        let tag = Tag::new(round, step::LOCATE_GATHER);
        self.ep.gather(
            group.leader(),
            &group.members,
            tag,
            Payload::Located { position: self.position, challenge },
        )?;
        self.ep.barrier();

        // Step 4: learn the contest winner from the ball patch owner.
        let tag = Tag::new(round, step::WINNER);
        let ball_patch = grid::patch_of(ball, &self.cfg).index(&self.cfg);
        let winner = expect_winner(self.ep.broadcast(ball_patch, tag, None)?, tag)?;
        self.ep.barrier();

        // Step 5: the winner shoots and relays the new ball position.
        if let Some(w) = winner {
            let tag = Tag::new(round, step::BALL_RELAY);
            let shot = (w == self.rank).then(|| {
                let out = shoot::shoot(half, self.team, ball, self.attrs.kick, &self.cfg);
                Payload::Ball(out.ball)
            });
            let new_ball = expect_ball(self.ep.broadcast(w, tag, shot)?, tag)?;
            if !self.cfg.in_bounds(new_ball) {
                return Err(SimError::OutOfBounds { x: new_ball.x, y: new_ball.y });
            }
        }
        self.ep.barrier();

        // Step 6: reporting regroup. Players are always active.
        let tag = Tag::new(round, step::REPORT_SPLIT);
        let report_group = groups::split(&mut self.ep, &self.world, REPORT_ACTIVE, tag)?;
        self.ep.barrier();

        // Step 7: fan end-of-round state back to the coordinator.
        let tag = Tag::new(round, step::REPORT_GATHER);
        self.ep.gather(
            COORDINATOR,
            &report_group.members,
            tag,
            Payload::PlayerState { position: self.position, challenge },
        )?;
        self.ep.barrier();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Patch agent (coordinator included)
// ---------------------------------------------------------------------------

/// Coordinator-only bookkeeping carried by the rank-0 patch agent.
struct Coordinator {
    ball: Position,
    state: MatchState,
    /// Last reported positions, indexed by player offset. `None`
    /// before the first report, in which case old == new.
    prev_positions: Vec<Option<Position>>,
    report_tx: Sender<RoundReport>,
}

pub struct PatchAgent {
    cfg: PitchConfig,
    patch: PatchId,
    rank: usize,
    rng: ChaCha8Rng,
    world: Vec<usize>,
    ep: Endpoint,
    coordinator: Option<Coordinator>,
}

impl PatchAgent {
    /// `report_tx` must be given exactly for the (0, 0) patch agent.
    pub fn new(
        patch: PatchId,
        cfg: PitchConfig,
        seed: u64,
        ep: Endpoint,
        report_tx: Option<Sender<RoundReport>>,
    ) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let rank = patch.index(&cfg);
        let coordinator = report_tx.map(|tx| Coordinator {
            ball: goal::respawn_ball(&mut rng, &cfg),
            state: MatchState::new(cfg.rounds_per_half),
            prev_positions: vec![None; cfg.num_players()],
            report_tx: tx,
        });
        let world = (0..cfg.num_agents()).collect();
        Self { cfg, patch, rank, rng, world, ep, coordinator }
    }

    pub fn run(mut self, total_rounds: u32) -> Result<()> {
        for round in 0..total_rounds {
            self.play_round(round)?;
        }
        Ok(())
    }

    fn play_round(&mut self, round: u32) -> Result<()> {
        let half = half_of(round, &self.cfg);

        // Step 0: the coordinator publishes the authoritative ball.
        let tag = Tag::new(round, step::BALL);
        let own = self.coordinator.as_ref().map(|c| Payload::Ball(c.ball));
        let ball = expect_ball(self.ep.broadcast(COORDINATOR, tag, own)?, tag)?;
        self.ep.barrier();

        // Step 1: team-internal exchange; patch agents sit it out.

        // Step 2: location regroup. A patch agent's color is its own
        // rank, so it always leads the group of players in its cell.
        let tag = Tag::new(round, step::LOCATE_SPLIT);
        let group = groups::split(&mut self.ep, &self.world, self.rank, tag)?;
        self.ep.barrier();

        // Step 3: collect positions and challenges from this cell.
        let tag = Tag::new(round, step::LOCATE_GATHER);
        let gathered = self
            .ep
            .gather(self.rank, &group.members, tag, Payload::Color(self.rank))?
            .ok_or_else(|| divergence(tag, "patch agent must lead its own cell".into()))?;
        let mut contenders = Vec::with_capacity(gathered.len());
        for (rank, payload) in gathered {
            match payload {
                Payload::Located { position, challenge } => {
                    contenders.push(contest::Contender { rank, position, challenge });
                }
                other => {
                    return Err(divergence(
                        tag,
                        format!("expected location report from rank {}, got {:?}", rank, other),
                    ))
                }
            }
        }
        self.ep.barrier();

        // Step 4: the owner of the ball's patch resolves the contest.
        let tag = Tag::new(round, step::WINNER);
        let ball_patch = grid::patch_of(ball, &self.cfg).index(&self.cfg);
        let own = (self.rank == ball_patch)
            .then(|| Payload::Winner(contest::resolve(&mut self.rng, &contenders, ball)));
        let winner = expect_winner(self.ep.broadcast(ball_patch, tag, own)?, tag)?;
        self.ep.barrier();

        // Step 5: receive the post-shot ball from the winner.
        let mut new_ball = ball;
        if let Some(w) = winner {
            let tag = Tag::new(round, step::BALL_RELAY);
            new_ball = expect_ball(self.ep.broadcast(w, tag, None)?, tag)?;
        }
        self.ep.barrier();

        // Step 6: reporting regroup; only the coordinator is active.
        let tag = Tag::new(round, step::REPORT_SPLIT);
        let color = if self.coordinator.is_some() { REPORT_ACTIVE } else { REPORT_IDLE };
        let report_group = groups::split(&mut self.ep, &self.world, color, tag)?;
        self.ep.barrier();

        // Step 7 + bookkeeping: coordinator only.
        if self.coordinator.is_some() {
            let tag = Tag::new(round, step::REPORT_GATHER);
            let gathered = self
                .ep
                .gather(COORDINATOR, &report_group.members, tag, Payload::Color(0))?
                .ok_or_else(|| divergence(tag, "coordinator must lead the report group".into()))?;
            self.close_round(round, half, ball, new_ball, winner, tag, gathered)?;
        }
        self.ep.barrier();
        Ok(())
    }

    /// End-of-round scoring and reporting. `round_ball` is the value
    /// broadcast at step 0, `new_ball` the post-shot position.
    fn close_round(
        &mut self,
        round: u32,
        half: Half,
        round_ball: Position,
        new_ball: Position,
        winner: Option<usize>,
        tag: Tag,
        gathered: Vec<(usize, Payload)>,
    ) -> Result<()> {
        let cfg = self.cfg.clone();
        let coord = self.coordinator.as_mut().expect("close_round is coordinator-only");

        let mut lines = Vec::with_capacity(gathered.len());
        for (rank, payload) in gathered {
            let (position, challenge) = match payload {
                Payload::PlayerState { position, challenge } => (position, challenge),
                other => {
                    return Err(divergence(
                        tag,
                        format!("expected player state from rank {}, got {:?}", rank, other),
                    ))
                }
            };
            let (team, slot) = match AgentId::from_rank(rank, &cfg) {
                AgentId::Player { team, slot } => (team, slot),
                AgentId::Patch { .. } => {
                    return Err(divergence(tag, format!("patch agent {} reported as player", rank)))
                }
            };
            let offset = rank - cfg.num_patches();
            let old_position = coord.prev_positions[offset].unwrap_or(position);
            coord.prev_positions[offset] = Some(position);
            lines.push(PlayerLine {
                team,
                slot,
                old_position,
                new_position: position,
                reached: position == round_ball,
                kicked: winner == Some(rank),
                challenge,
            });
        }

        coord.ball = new_ball;
        let scored = goal::scoring_team(half, new_ball, &cfg);
        if let Some(team) = scored {
            coord.state.record_goal(team);
            coord.ball = goal::respawn_ball(&mut self.rng, &cfg);
            debug!(round, %team, score = ?coord.state.score, "goal");
        }

        let report = RoundReport {
            round,
            half,
            ball: new_ball,
            winner: winner.map(|r| AgentId::from_rank(r, &cfg)),
            lines,
            goal: scored,
            score: coord.state.score,
        };
        coord.state.round = round + 1;
        coord
            .report_tx
            .send(report)
            .map_err(|_| SimError::ChannelClosed { rank: COORDINATOR })?;
        Ok(())
    }

    pub fn patch(&self) -> PatchId {
        self.patch
    }
}
