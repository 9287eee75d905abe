//! Strategy definitions and execution

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::random::SeededRng;

/// A move in the Prisoner's Dilemma
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    Cooperate,
    Defect,
}

impl Move {
    fn from_coin(heads: bool) -> Self {
        if heads {
            Move::Cooperate
        } else {
            Move::Defect
        }
    }
}

/// Every strategy the engine knows, keyed by its roster identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Copy opponent's last move. Start with cooperate.
    #[serde(rename = "Tit_for_tat")]
    TitForTat,
    /// Tit-for-Tat but start with defect.
    #[serde(rename = "Tit_for_tat_suspicious")]
    TitForTatSuspicious,
    /// Tit-for-Tat, one in four moves replaced by a coin flip.
    #[serde(rename = "Tit_for_tat_and_random")]
    TitForTatAndRandom,
    /// Defect only if opponent defected twice in a row.
    #[serde(rename = "Tit_for_two_tats")]
    TitForTwoTats,
    /// Tit-for-Two-Tats, one in four moves replaced by a coin flip.
    #[serde(rename = "Tit_for_two_tats_and_random")]
    TitForTwoTatsAndRandom,
    /// Always cooperate, never defect.
    #[serde(rename = "Always_cooperate")]
    AlwaysCooperate,
    /// Always defect, never cooperate.
    #[serde(rename = "Always_defect")]
    AlwaysDefect,
    /// Coin flip each round.
    #[serde(rename = "Random")]
    Random,
    /// Cooperate until opponent defects once, then always defect.
    #[serde(rename = "Grudger")]
    Grudger,
    /// Punish each defection with a fixed burst of defections.
    #[serde(rename = "Grudger_soft")]
    GrudgerSoft,
    /// Scripted opening, then the move with the best average payoff so far.
    #[serde(rename = "Adaptive")]
    Adaptive,
    /// Tit-for-Tat that sometimes probes with a defection.
    #[serde(rename = "Naive_prober")]
    NaiveProber,
    /// Naive prober that backs off when a probe gets punished.
    #[serde(rename = "Remorseful_prober")]
    RemorsefulProber,
    /// Alternate defect and cooperate.
    #[serde(rename = "Jekyll_and_hyde")]
    JekyllAndHyde,
    /// Tit-for-Tat that sometimes forgives a defection.
    #[serde(rename = "Naive_peace_maker")]
    NaivePeaceMaker,
    /// Tit-for-Two-Tats that retaliates once and sometimes forgives.
    #[serde(rename = "True_peace_maker")]
    TruePeaceMaker,
    /// Cooperate when both last moves matched, defect otherwise.
    #[serde(rename = "Pavlov")]
    Pavlov,
}

/// Broad behavioral class of a strategy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Disposition {
    Nice,
    Neutral,
    Mean,
}

impl StrategyKind {
    pub const COUNT: usize = 17;

    /// All strategies, in the order of the classic population
    pub const ALL: [StrategyKind; StrategyKind::COUNT] = [
        StrategyKind::TitForTat,
        StrategyKind::TitForTatSuspicious,
        StrategyKind::TitForTwoTats,
        StrategyKind::TitForTatAndRandom,
        StrategyKind::TitForTwoTatsAndRandom,
        StrategyKind::AlwaysCooperate,
        StrategyKind::NaivePeaceMaker,
        StrategyKind::TruePeaceMaker,
        StrategyKind::Pavlov,
        StrategyKind::Random,
        StrategyKind::Adaptive,
        StrategyKind::AlwaysDefect,
        StrategyKind::Grudger,
        StrategyKind::GrudgerSoft,
        StrategyKind::NaiveProber,
        StrategyKind::RemorsefulProber,
        StrategyKind::JekyllAndHyde,
    ];

    /// Roster identifier
    pub fn id(self) -> &'static str {
        match self {
            StrategyKind::TitForTat => "Tit_for_tat",
            StrategyKind::TitForTatSuspicious => "Tit_for_tat_suspicious",
            StrategyKind::TitForTatAndRandom => "Tit_for_tat_and_random",
            StrategyKind::TitForTwoTats => "Tit_for_two_tats",
            StrategyKind::TitForTwoTatsAndRandom => "Tit_for_two_tats_and_random",
            StrategyKind::AlwaysCooperate => "Always_cooperate",
            StrategyKind::AlwaysDefect => "Always_defect",
            StrategyKind::Random => "Random",
            StrategyKind::Grudger => "Grudger",
            StrategyKind::GrudgerSoft => "Grudger_soft",
            StrategyKind::Adaptive => "Adaptive",
            StrategyKind::NaiveProber => "Naive_prober",
            StrategyKind::RemorsefulProber => "Remorseful_prober",
            StrategyKind::JekyllAndHyde => "Jekyll_and_hyde",
            StrategyKind::NaivePeaceMaker => "Naive_peace_maker",
            StrategyKind::TruePeaceMaker => "True_peace_maker",
            StrategyKind::Pavlov => "Pavlov",
        }
    }

    /// Dense slot in [0, COUNT), used to index per-strategy tables
    pub fn index(self) -> usize {
        self as usize
    }

    /// Look up a strategy by roster identifier
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.id() == id)
    }

    pub fn disposition(self) -> Disposition {
        match self {
            StrategyKind::TitForTat
            | StrategyKind::TitForTatSuspicious
            | StrategyKind::TitForTatAndRandom
            | StrategyKind::TitForTwoTats
            | StrategyKind::TitForTwoTatsAndRandom
            | StrategyKind::AlwaysCooperate
            | StrategyKind::NaivePeaceMaker
            | StrategyKind::TruePeaceMaker
            | StrategyKind::Pavlov => Disposition::Nice,
            StrategyKind::Random | StrategyKind::Adaptive => Disposition::Neutral,
            StrategyKind::AlwaysDefect
            | StrategyKind::Grudger
            | StrategyKind::GrudgerSoft
            | StrategyKind::NaiveProber
            | StrategyKind::RemorsefulProber
            | StrategyKind::JekyllAndHyde => Disposition::Mean,
        }
    }

    /// Human-readable description of a strategy
    pub fn description(self) -> &'static str {
        match self {
            StrategyKind::TitForTat => "Copies opponent's last move. Starts by cooperating.",
            StrategyKind::TitForTatSuspicious => "Like Tit for Tat, but starts by defecting.",
            StrategyKind::TitForTatAndRandom => {
                "Tit for Tat, but one move in four is a coin flip."
            }
            StrategyKind::TitForTwoTats => "Only retaliates after two consecutive defections.",
            StrategyKind::TitForTwoTatsAndRandom => {
                "Tit for Two Tats, but one move in four is a coin flip."
            }
            StrategyKind::AlwaysCooperate => "Never defects. Always cooperates.",
            StrategyKind::AlwaysDefect => "Never cooperates. Always defects.",
            StrategyKind::Random => "Randomly cooperates or defects each round.",
            StrategyKind::Grudger => "Cooperates until betrayed, then always defects.",
            StrategyKind::GrudgerSoft => {
                "Answers a defection with five defections in a row, then cooperates again."
            }
            StrategyKind::Adaptive => {
                "Opens with six cooperations and five defections, then plays whichever move has paid best on average."
            }
            StrategyKind::NaiveProber => {
                "Copies opponent's last move, but sometimes probes with a defection."
            }
            StrategyKind::RemorsefulProber => {
                "Naive Prober that cooperates once if a probe was punished."
            }
            StrategyKind::JekyllAndHyde => "Alternates defect and cooperate, starting with defect.",
            StrategyKind::NaivePeaceMaker => {
                "Copies opponent's last move, but sometimes forgives a defection."
            }
            StrategyKind::TruePeaceMaker => {
                "Defects once after two consecutive defections, sometimes forgiving instead."
            }
            StrategyKind::Pavlov => "Cooperates when both last moves matched, defects otherwise.",
        }
    }

    /// Create a fresh instance of this strategy for one match
    pub fn instantiate(self) -> Player {
        Player::new(self)
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for StrategyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s).ok_or_else(|| ConfigError::UnknownStrategy(s.to_string()))
    }
}

/// One completed round from a single player's perspective
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub opponent_move: Move,
    pub opponent_score: u32,
    pub own_move: Move,
    pub own_score: u32,
}

/// Everything a player has seen during the current match
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct History {
    opponent_moves: Vec<Move>,
    opponent_scores: Vec<u32>,
    own_moves: Vec<Move>,
    own_scores: Vec<u32>,
}

impl History {
    pub fn opponent_moves(&self) -> &[Move] {
        &self.opponent_moves
    }

    pub fn opponent_scores(&self) -> &[u32] {
        &self.opponent_scores
    }

    pub fn own_moves(&self) -> &[Move] {
        &self.own_moves
    }

    pub fn own_scores(&self) -> &[u32] {
        &self.own_scores
    }

    /// Number of rounds observed
    pub fn len(&self) -> usize {
        self.own_moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.own_moves.is_empty()
    }

    fn opponent_last(&self) -> Option<Move> {
        self.opponent_moves.last().copied()
    }

    fn own_last(&self) -> Option<Move> {
        self.own_moves.last().copied()
    }

    /// Opponent's last two moves were both defect
    fn opponent_defected_twice(&self) -> bool {
        matches!(
            self.opponent_moves.as_slice(),
            [.., Move::Defect, Move::Defect]
        )
    }

    /// Mean own score over rounds where we played `choice`
    fn average_score_for(&self, choice: Move) -> Option<f64> {
        let (total, count) = self
            .own_moves
            .iter()
            .zip(&self.own_scores)
            .filter(|(m, _)| **m == choice)
            .fold((0u64, 0u64), |(total, count), (_, score)| {
                (total + u64::from(*score), count + 1)
            });

        if count == 0 {
            None
        } else {
            Some(total as f64 / count as f64)
        }
    }

    fn record(&mut self, outcome: &RoundOutcome) {
        self.opponent_moves.push(outcome.opponent_move);
        self.opponent_scores.push(outcome.opponent_score);
        self.own_moves.push(outcome.own_move);
        self.own_scores.push(outcome.own_score);
    }
}

/// Strategy-private state beyond the shared history
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Memory {
    Stateless,
    Grudge { held: bool },
    Punishment { remaining: u8 },
    Probe { probed_last: bool },
}

/// "One in four" chance used by every randomized rule
const ONE_IN_X: u32 = 4;

/// Defections queued after the triggering one by Grudger-soft
const SOFT_GRUDGE_ROUNDS: u8 = 4;

/// Adaptive's scripted opening, indexed by round
const ADAPTIVE_OPENING: [Move; 11] = [
    Move::Cooperate,
    Move::Cooperate,
    Move::Cooperate,
    Move::Cooperate,
    Move::Cooperate,
    Move::Cooperate,
    Move::Defect,
    Move::Defect,
    Move::Defect,
    Move::Defect,
    Move::Defect,
];

/// A strategy instance bound to one role in one match
#[derive(Clone, Debug)]
pub struct Player {
    kind: StrategyKind,
    history: History,
    memory: Memory,
}

impl Player {
    pub fn new(kind: StrategyKind) -> Self {
        let memory = match kind {
            StrategyKind::Grudger => Memory::Grudge { held: false },
            StrategyKind::GrudgerSoft => Memory::Punishment { remaining: 0 },
            StrategyKind::RemorsefulProber => Memory::Probe { probed_last: false },
            _ => Memory::Stateless,
        };
        Self {
            kind,
            history: History::default(),
            memory,
        }
    }

    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Choose this round's move from the history seen so far
    pub fn decide(&mut self, rng: &mut SeededRng) -> Move {
        let history = &self.history;

        match self.kind {
            StrategyKind::TitForTat => tit_for_tat(history, Move::Cooperate),
            StrategyKind::TitForTatSuspicious => tit_for_tat(history, Move::Defect),
            StrategyKind::TitForTatAndRandom => {
                if rng.one_in(ONE_IN_X) {
                    Move::from_coin(rng.coin_flip())
                } else {
                    tit_for_tat(history, Move::Cooperate)
                }
            }
            StrategyKind::TitForTwoTats => tit_for_two_tats(history),
            StrategyKind::TitForTwoTatsAndRandom => {
                if rng.one_in(ONE_IN_X) {
                    Move::from_coin(rng.coin_flip())
                } else {
                    tit_for_two_tats(history)
                }
            }
            StrategyKind::AlwaysCooperate => Move::Cooperate,
            StrategyKind::AlwaysDefect => Move::Defect,
            StrategyKind::Random => Move::from_coin(rng.coin_flip()),
            StrategyKind::Grudger => grudger(history, &mut self.memory),
            StrategyKind::GrudgerSoft => grudger_soft(history, &mut self.memory),
            StrategyKind::Adaptive => adaptive(history),
            StrategyKind::NaiveProber => naive_prober(history, rng),
            StrategyKind::RemorsefulProber => remorseful_prober(history, &mut self.memory, rng),
            StrategyKind::JekyllAndHyde => jekyll_and_hyde(history),
            StrategyKind::NaivePeaceMaker => naive_peace_maker(history, rng),
            StrategyKind::TruePeaceMaker => true_peace_maker(history, rng),
            StrategyKind::Pavlov => pavlov(history),
        }
    }

    /// Remember a completed round
    pub fn observe(&mut self, outcome: &RoundOutcome) {
        self.history.record(outcome);
    }
}

/// Tit-for-Tat: Copy opponent's last move, open with `opening`
fn tit_for_tat(history: &History, opening: Move) -> Move {
    history.opponent_last().unwrap_or(opening)
}

/// Tit-for-Two-Tats: Only defect if opponent defected twice in a row
fn tit_for_two_tats(history: &History) -> Move {
    if history.opponent_defected_twice() {
        Move::Defect
    } else {
        Move::Cooperate
    }
}

fn grudger(history: &History, memory: &mut Memory) -> Move {
    let Memory::Grudge { held } = memory else {
        return Move::Cooperate;
    };

    if *held || history.opponent_moves().contains(&Move::Defect) {
        *held = true;
        Move::Defect
    } else {
        Move::Cooperate
    }
}

/// Grudger-soft: a defection buys the opponent five defections in a row
fn grudger_soft(history: &History, memory: &mut Memory) -> Move {
    let Memory::Punishment { remaining } = memory else {
        return Move::Cooperate;
    };

    if *remaining > 0 {
        *remaining -= 1;
        Move::Defect
    } else if history.opponent_last() == Some(Move::Defect) {
        *remaining = SOFT_GRUDGE_ROUNDS;
        Move::Defect
    } else {
        Move::Cooperate
    }
}

/// Adaptive: scripted opening, then the move with the higher average score.
/// A move never played has no average and is never preferred.
fn adaptive(history: &History) -> Move {
    if let Some(scripted) = ADAPTIVE_OPENING.get(history.len()) {
        return *scripted;
    }

    let cooperate = history.average_score_for(Move::Cooperate);
    let defect = history.average_score_for(Move::Defect);

    match (cooperate, defect) {
        (Some(c), Some(d)) if c > d => Move::Cooperate,
        (Some(_), None) => Move::Cooperate,
        _ => Move::Defect,
    }
}

fn naive_prober(history: &History, rng: &mut SeededRng) -> Move {
    match history.opponent_last() {
        None => Move::Cooperate,
        Some(Move::Cooperate) if rng.one_in(ONE_IN_X) => Move::Defect,
        Some(last) => last,
    }
}

/// Remorseful prober: a probe answered by a defection earns one cooperation
fn remorseful_prober(history: &History, memory: &mut Memory, rng: &mut SeededRng) -> Move {
    let Memory::Probe { probed_last } = memory else {
        return Move::Cooperate;
    };
    let Some(last) = history.opponent_last() else {
        return Move::Cooperate;
    };

    // The flag only ever describes the round just played.
    let probed = std::mem::take(probed_last);
    if probed && last == Move::Defect {
        return Move::Cooperate;
    }

    if last == Move::Cooperate && rng.one_in(ONE_IN_X) {
        *probed_last = true;
        return Move::Defect;
    }

    last
}

fn jekyll_and_hyde(history: &History) -> Move {
    if history.own_moves().len() % 2 == 0 {
        Move::Defect
    } else {
        Move::Cooperate
    }
}

fn naive_peace_maker(history: &History, rng: &mut SeededRng) -> Move {
    match history.opponent_last() {
        None => Move::Cooperate,
        Some(Move::Defect) if rng.one_in(ONE_IN_X) => Move::Cooperate,
        Some(last) => last,
    }
}

fn true_peace_maker(history: &History, rng: &mut SeededRng) -> Move {
    if history.own_last() == Some(Move::Defect) {
        return Move::Cooperate;
    }

    if history.opponent_defected_twice() && !rng.one_in(ONE_IN_X) {
        Move::Defect
    } else {
        Move::Cooperate
    }
}

fn pavlov(history: &History) -> Move {
    match (history.own_last(), history.opponent_last()) {
        (Some(own), Some(opponent)) if own != opponent => Move::Defect,
        _ => Move::Cooperate,
    }
}
