use thiserror::Error;

/// Failures in this system are fatal by design: the round protocol
/// has no partial-failure semantics, so nothing here is retried.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Protocol divergence at round {round} step {step}: {detail}")]
    ProtocolDivergence {
        round: u32,
        step: u8,
        detail: String,
    },

    #[error("Position out of bounds: ({x}, {y})")]
    OutOfBounds { x: i32, y: i32 },

    #[error("Channel closed: peer agent {rank} is gone")]
    ChannelClosed { rank: usize },
}

pub type Result<T> = std::result::Result<T, SimError>;
