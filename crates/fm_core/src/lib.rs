//! # fm_core - Deterministic Football Match Rules
//!
//! Pure rules and data model for a lock-step, agent-based football
//! match simulation. Everything in this crate is a deterministic
//! function of its explicit inputs plus an injected random source;
//! there are no threads, no channels and no global state here.
//!
//! The companion crate `fm_sim` runs these rules inside a set of
//! cooperating agents (one per field patch, one per player) that
//! synchronize round by round through broadcast/gather collectives.

pub mod attributes;
pub mod engine;
pub mod error;
pub mod grid;
pub mod identity;
pub mod pitch;
pub mod report;
pub mod state;

pub use attributes::PlayerAttributes;
pub use error::{Result, SimError};
pub use grid::PatchId;
pub use identity::{AgentId, Half, TeamSide};
pub use pitch::{PitchConfig, Position};
pub use report::{PlayerLine, RoundReport};
pub use state::MatchState;
