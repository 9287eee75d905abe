//! Configuration types for tournament runs

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::roster::Roster;
use crate::strategy::StrategyKind;

/// Matches in a run when none are configured
pub const DEFAULT_MATCHES: u32 = 10_000;

/// Rounds in every match when none are configured
pub const DEFAULT_ROUNDS_PER_MATCH: u32 = 20;

/// How each role in a match is filled from the roster
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Every roster entry equally likely, weights ignored
    #[default]
    Uniform,
    /// Entries drawn in proportion to their population weight
    Weighted,
}

/// Tournament configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentConfig {
    /// Opponent selection regime
    #[serde(default)]
    pub selection_mode: SelectionMode,
    /// Number of independent matches
    #[serde(default = "default_matches")]
    pub matches: u32,
    /// Rounds played in every match
    #[serde(default = "default_rounds_per_match")]
    pub rounds_per_match: u32,
    /// Participating strategies and their weights
    pub roster: Roster,
    /// Random seed for reproducibility (None = fresh entropy each run)
    #[serde(default)]
    pub seed: Option<u64>,
    /// Whether to spread matches over the rayon thread pool
    #[serde(default)]
    pub parallel: bool,
}

fn default_matches() -> u32 {
    DEFAULT_MATCHES
}

fn default_rounds_per_match() -> u32 {
    DEFAULT_ROUNDS_PER_MATCH
}

impl TournamentConfig {
    /// Uniform run over `roster` with default sizes
    pub fn new(roster: Roster) -> Self {
        Self {
            selection_mode: SelectionMode::Uniform,
            matches: DEFAULT_MATCHES,
            rounds_per_match: DEFAULT_ROUNDS_PER_MATCH,
            roster,
            seed: None,
            parallel: false,
        }
    }

    /// The classic population with default sizes
    pub fn classic() -> Self {
        Self::new(Roster::classic())
    }

    pub fn with_selection_mode(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = mode;
        self
    }

    pub fn with_matches(mut self, matches: u32) -> Self {
        self.matches = matches;
        self
    }

    pub fn with_rounds_per_match(mut self, rounds: u32) -> Self {
        self.rounds_per_match = rounds;
        self
    }

    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Reject anything that would make a run meaningless
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.matches == 0 {
            return Err(ConfigError::ZeroMatches);
        }
        if self.rounds_per_match == 0 {
            return Err(ConfigError::ZeroRounds);
        }
        self.roster.validate()
    }

    /// Parse and validate a JSON configuration document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            unknown_strategy(json).unwrap_or_else(|| ConfigError::Malformed(e.to_string()))
        })?;
        config.validate()?;
        Ok(config)
    }
}

// Name the offending roster key instead of reporting a generic parse failure
fn unknown_strategy(json: &str) -> Option<ConfigError> {
    let value: serde_json::Value = serde_json::from_str(json).ok()?;
    value
        .get("roster")?
        .as_object()?
        .keys()
        .find(|id| StrategyKind::from_id(id).is_none())
        .map(|id| ConfigError::UnknownStrategy(id.clone()))
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self::classic()
    }
}
