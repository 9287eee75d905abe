//! Dilemma Engine
//!
//! Population tournament engine for the Iterated Prisoner's Dilemma.
//! Strategies are paired by uniform or population-weighted selection, play
//! fixed-length matches, and are ranked by average points per match.
//! This crate is compiled to:
//! - Native (for library consumers and reporting tools)
//! - WASM (for browser front ends, behind the `wasm` feature)

mod config;
mod error;
mod game;
mod random;
mod roster;
mod selector;
mod strategy;
mod tournament;

#[cfg(feature = "wasm")]
mod wasm;

pub use config::{SelectionMode, TournamentConfig, DEFAULT_MATCHES, DEFAULT_ROUNDS_PER_MATCH};
pub use error::{ConfigError, DilemmaError, InternalError};
pub use game::{replay_match, run_match, MatchResult, RoundResult};
pub use random::{entropy_seed, SeededRng};
pub use roster::{Roster, RosterEntry};
pub use selector::OpponentSelector;
pub use strategy::{Disposition, History, Move, Player, RoundOutcome, StrategyKind};
pub use tournament::{run, Average, ResultSummary, RunningTotals, Standing};

/// Payoff matrix for the Prisoner's Dilemma
/// Returns the points earned by the player who played `own`
pub fn payoff(own: Move, opponent: Move) -> u32 {
    match (own, opponent) {
        (Move::Cooperate, Move::Cooperate) => 3,
        (Move::Cooperate, Move::Defect) => 1,
        (Move::Defect, Move::Cooperate) => 4,
        (Move::Defect, Move::Defect) => 1,
    }
}

/// Score one round for both players from the same table
/// Returns (score_a, score_b)
pub fn score_pair(a: Move, b: Move) -> (u32, u32) {
    (payoff(a, b), payoff(b, a))
}
