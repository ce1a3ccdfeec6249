//! Message fabric: the collective-operation substrate the round
//! protocol runs on.
//!
//! Each agent owns one unbounded inbox; a shared sender table gives
//! every agent a reliable in-order channel to every other. Frames
//! carry a `(round, step)` tag so a peer racing ahead into the next
//! collective never has its frame misdelivered: tags that don't match
//! the current receive are parked in a pending buffer.
//!
//! Phase barriers are a single world barrier shared by all agents.
//! There is no supervision and no timeout anywhere: a crashed or
//! missing agent blocks the barrier permanently, which is the
//! documented failure model of this protocol.

use std::collections::VecDeque;
use std::sync::{Arc, Barrier};

use crossbeam_channel::{unbounded, Receiver, Sender};
use fm_core::{Position, Result, SimError};

/// Identifies one collective within the whole match schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    pub round: u32,
    pub step: u8,
}

impl Tag {
    pub fn new(round: u32, step: u8) -> Self {
        Self { round, step }
    }
}

/// Everything that travels between agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// Authoritative or rebroadcast ball position.
    Ball(Position),
    /// Expected rounds-to-ball, exchanged within a team.
    Eta(u32),
    /// Dynamic-group color for a split.
    Color(usize),
    /// Position and challenge collected by a location-group leader.
    Located { position: Position, challenge: Option<i32> },
    /// Contest result, broadcast by the ball patch's owner.
    Winner(Option<usize>),
    /// End-of-round state reported to the coordinator.
    PlayerState { position: Position, challenge: Option<i32> },
    /// Training drill: one player's round outcome and running totals.
    Drill {
        old_position: Position,
        new_position: Position,
        total_steps: u32,
        times_reached: u32,
        times_kicked: u32,
    },
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Frame {
    src: usize,
    tag: Tag,
    payload: Payload,
}

/// Shared side of the fabric: one sender per agent plus the world
/// barrier.
pub struct Fabric {
    senders: Vec<Sender<Frame>>,
    barrier: Barrier,
}

impl Fabric {
    /// Build the fabric for `n` agents, returning the shared half and
    /// the per-agent inboxes (index = rank).
    pub fn new(n: usize) -> (Arc<Fabric>, Vec<Receiver<Frame>>) {
        let mut senders = Vec::with_capacity(n);
        let mut receivers = Vec::with_capacity(n);
        for _ in 0..n {
            let (tx, rx) = unbounded();
            senders.push(tx);
            receivers.push(rx);
        }
        (Arc::new(Fabric { senders, barrier: Barrier::new(n) }), receivers)
    }
}

/// One agent's handle on the fabric.
pub struct Endpoint {
    rank: usize,
    fabric: Arc<Fabric>,
    inbox: Receiver<Frame>,
    pending: VecDeque<Frame>,
}

impl Endpoint {
    pub fn new(rank: usize, fabric: Arc<Fabric>, inbox: Receiver<Frame>) -> Self {
        Self { rank, fabric, inbox, pending: VecDeque::new() }
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    /// World phase barrier. Blocks until every agent arrives; blocks
    /// forever if one never does.
    pub fn barrier(&self) {
        self.fabric.barrier.wait();
    }

    fn send(&self, dst: usize, tag: Tag, payload: Payload) -> Result<()> {
        self.fabric.senders[dst]
            .send(Frame { src: self.rank, tag, payload })
            .map_err(|_| SimError::ChannelClosed { rank: dst })
    }

    /// Receive the frame `src` sent for `tag`, parking any frame that
    /// belongs to a different collective.
    fn recv_from(&mut self, src: usize, tag: Tag) -> Result<Payload> {
        if let Some(idx) = self.pending.iter().position(|f| f.src == src && f.tag == tag) {
            let frame = self.pending.remove(idx).expect("index just found");
            return Ok(frame.payload);
        }
        loop {
            let frame = self
                .inbox
                .recv()
                .map_err(|_| SimError::ChannelClosed { rank: self.rank })?;
            if frame.src == src && frame.tag == tag {
                return Ok(frame.payload);
            }
            self.pending.push_back(frame);
        }
    }

    /// One-to-all broadcast. The root passes `Some(payload)` and gets
    /// it back; everyone else passes `None` and receives the root's
    /// value.
    pub fn broadcast(&mut self, root: usize, tag: Tag, payload: Option<Payload>) -> Result<Payload> {
        if self.rank == root {
            let payload = payload.ok_or_else(|| SimError::ProtocolDivergence {
                round: tag.round,
                step: tag.step,
                detail: "broadcast root carries no payload".into(),
            })?;
            for dst in 0..self.fabric.senders.len() {
                if dst != root {
                    self.send(dst, tag, payload)?;
                }
            }
            Ok(payload)
        } else {
            self.recv_from(root, tag)
        }
    }

    /// All-to-all gather to one leader within a group. Non-leaders
    /// send and get `None`; the leader receives one entry per other
    /// member, ordered by rank.
    pub fn gather(
        &mut self,
        leader: usize,
        members: &[usize],
        tag: Tag,
        payload: Payload,
    ) -> Result<Option<Vec<(usize, Payload)>>> {
        if self.rank == leader {
            let mut entries = Vec::with_capacity(members.len().saturating_sub(1));
            for &m in members {
                if m != leader {
                    entries.push((m, self.recv_from(m, tag)?));
                }
            }
            Ok(Some(entries))
        } else {
            self.send(leader, tag, payload)?;
            Ok(None)
        }
    }

    /// All-to-all exchange within a group. Every member ends up with
    /// the same vector of `(rank, payload)` entries in member order,
    /// its own included.
    pub fn all_exchange(
        &mut self,
        members: &[usize],
        tag: Tag,
        payload: Payload,
    ) -> Result<Vec<(usize, Payload)>> {
        for &m in members {
            if m != self.rank {
                self.send(m, tag, payload)?;
            }
        }
        let mut entries = Vec::with_capacity(members.len());
        for &m in members {
            if m == self.rank {
                entries.push((m, payload));
            } else {
                entries.push((m, self.recv_from(m, tag)?));
            }
        }
        Ok(entries)
    }

    /// Point-to-point send with the same tagging discipline, used by
    /// the two-tier training drill.
    pub fn send_to(&self, dst: usize, tag: Tag, payload: Payload) -> Result<()> {
        self.send(dst, tag, payload)
    }

    /// Point-to-point receive counterpart of [`Endpoint::send_to`].
    pub fn recv_one(&mut self, src: usize, tag: Tag) -> Result<Payload> {
        self.recv_from(src, tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn broadcast_reaches_every_rank() {
        let (fabric, receivers) = Fabric::new(4);
        let ball = Position::new(7, 9);
        let handles: Vec<_> = receivers
            .into_iter()
            .enumerate()
            .map(|(rank, rx)| {
                let fabric = Arc::clone(&fabric);
                thread::spawn(move || {
                    let mut ep = Endpoint::new(rank, fabric, rx);
                    let sent = (rank == 0).then_some(Payload::Ball(ball));
                    ep.broadcast(0, Tag::new(0, 0), sent).expect("broadcast")
                })
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().expect("thread"), Payload::Ball(ball));
        }
    }

    #[test]
    fn gather_orders_entries_by_rank() {
        let (fabric, receivers) = Fabric::new(3);
        let handles: Vec<_> = receivers
            .into_iter()
            .enumerate()
            .map(|(rank, rx)| {
                let fabric = Arc::clone(&fabric);
                thread::spawn(move || {
                    let mut ep = Endpoint::new(rank, fabric, rx);
                    ep.gather(0, &[0, 1, 2], Tag::new(0, 3), Payload::Eta(rank as u32))
                        .expect("gather")
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().expect("thread")).collect();
        assert_eq!(
            results[0],
            Some(vec![(1, Payload::Eta(1)), (2, Payload::Eta(2))]),
            "leader sees members in rank order, itself excluded"
        );
        assert_eq!(results[1], None);
        assert_eq!(results[2], None);
    }

    #[test]
    fn mismatched_tags_are_parked_not_lost() {
        let (fabric, mut receivers) = Fabric::new(2);
        let rx1 = receivers.pop().expect("rank 1 inbox");
        let rx0 = receivers.pop().expect("rank 0 inbox");

        let fabric1 = Arc::clone(&fabric);
        let sender = thread::spawn(move || {
            let ep = Endpoint::new(1, fabric1, rx1);
            // Later collective first, then the earlier one.
            ep.send_to(0, Tag::new(0, 5), Payload::Winner(None)).expect("send");
            ep.send_to(0, Tag::new(0, 4), Payload::Eta(3)).expect("send");
        });

        let mut ep = Endpoint::new(0, fabric, rx0);
        assert_eq!(ep.recv_one(1, Tag::new(0, 4)).expect("recv"), Payload::Eta(3));
        assert_eq!(ep.recv_one(1, Tag::new(0, 5)).expect("recv"), Payload::Winner(None));
        sender.join().expect("sender thread");
    }

    #[test]
    fn all_exchange_is_symmetric() {
        let (fabric, receivers) = Fabric::new(3);
        let handles: Vec<_> = receivers
            .into_iter()
            .enumerate()
            .map(|(rank, rx)| {
                let fabric = Arc::clone(&fabric);
                thread::spawn(move || {
                    let mut ep = Endpoint::new(rank, fabric, rx);
                    ep.all_exchange(&[0, 1, 2], Tag::new(2, 1), Payload::Eta(10 + rank as u32))
                        .expect("exchange")
                })
            })
            .collect();
        let expected = vec![(0, Payload::Eta(10)), (1, Payload::Eta(11)), (2, Payload::Eta(12))];
        for h in handles {
            assert_eq!(h.join().expect("thread"), expected);
        }
    }
}
