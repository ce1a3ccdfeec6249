//! # fm_sim - Lock-step Agent Runtime
//!
//! Runs the `fm_core` match rules as a fixed set of cooperating
//! agents: one patch agent per grid cell (the (0, 0) agent doubling
//! as coordinator) and one player agent per roster slot. Agents only
//! ever interact through the broadcast/gather collectives of the
//! message fabric, separated by world barriers, so every round is a
//! deterministic function of the seed.
//!
//! A crashed or missing agent blocks a barrier forever; the protocol
//! deliberately carries no supervision, retry or timeout.

pub mod agent;
pub mod fabric;
pub mod groups;
pub mod runner;
pub mod training;

pub use runner::{agent_seed, MatchRunner, MatchSummary};
pub use training::{run_drill, DrillConfig, DrillReport};
