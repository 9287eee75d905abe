//! Error types for configuration and engine consistency failures

use thiserror::Error;

/// Invalid tournament configuration. Raised before any match runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Roster must contain at least one strategy")]
    EmptyRoster,

    #[error("Strategy {0} appears more than once in the roster")]
    DuplicateStrategy(String),

    #[error("Unknown strategy identifier: {0}")]
    UnknownStrategy(String),

    #[error("Strategy {0} has a population weight of zero")]
    ZeroWeight(String),

    #[error("Match count must be positive")]
    ZeroMatches,

    #[error("Rounds per match must be positive")]
    ZeroRounds,

    #[error("Malformed configuration: {0}")]
    Malformed(String),
}

/// Engine invariant broken. Indicates a bug, never a data-dependent condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InternalError {
    #[error("Weighted draw {draw} is outside every partition range (bound {bound})")]
    PartitionMiss { draw: u64, bound: u64 },

    #[error("Opponent selector has no strategies to draw from")]
    NoCandidates,
}

/// Top-level error returned by a tournament run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DilemmaError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Internal consistency error: {0}")]
    Internal(#[from] InternalError),
}

impl DilemmaError {
    /// True for failures that point at an engine bug rather than bad input
    pub fn is_internal(&self) -> bool {
        matches!(self, DilemmaError::Internal(_))
    }
}
