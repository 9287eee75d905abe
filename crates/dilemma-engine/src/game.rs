//! Match execution engine

use serde::{Deserialize, Serialize};

use crate::random::SeededRng;
use crate::score_pair;
use crate::strategy::{Move, Player, RoundOutcome, StrategyKind};
use crate::tournament::RunningTotals;

/// Result of a single round
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub round: u32,
    pub move_a: Move,
    pub move_b: Move,
    pub score_a: u32,
    pub score_b: u32,
    pub cumulative_a: u64,
    pub cumulative_b: u64,
}

/// Result of a complete match
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub strategy_a: StrategyKind,
    pub strategy_b: StrategyKind,
    pub rounds: Vec<RoundResult>,
    pub total_score_a: u64,
    pub total_score_b: u64,
    pub round_count: u32,
}

/// Run a match between two strategies, crediting every round to `totals`
///
/// # Arguments
/// * `strategy_a` - First role's strategy
/// * `strategy_b` - Second role's strategy (may equal the first)
/// * `rounds` - Number of rounds to play
/// * `rng` - This match's random stream
/// * `totals` - Running totals to credit with each round's points
///
/// # Returns
/// Points scored by (a, b) over the match
pub fn run_match(
    strategy_a: StrategyKind,
    strategy_b: StrategyKind,
    rounds: u32,
    rng: &mut SeededRng,
    totals: &mut RunningTotals,
) -> (u64, u64) {
    play(strategy_a, strategy_b, rounds, rng, |round| {
        totals.add_points(strategy_a, round.score_a);
        totals.add_points(strategy_b, round.score_b);
    })
}

/// Replay a match with full round-by-round details
pub fn replay_match(
    strategy_a: StrategyKind,
    strategy_b: StrategyKind,
    rounds: u32,
    seed: u64,
) -> MatchResult {
    let mut rng = SeededRng::new(seed, 0);
    let mut records = Vec::with_capacity(rounds as usize);

    let (total_a, total_b) = play(strategy_a, strategy_b, rounds, &mut rng, |round| {
        records.push(round.clone());
    });

    MatchResult {
        strategy_a,
        strategy_b,
        rounds: records,
        total_score_a: total_a,
        total_score_b: total_b,
        round_count: rounds,
    }
}

fn play(
    strategy_a: StrategyKind,
    strategy_b: StrategyKind,
    rounds: u32,
    rng: &mut SeededRng,
    mut on_round: impl FnMut(&RoundResult),
) -> (u64, u64) {
    // Fresh instances per match; self-play gets two independent players
    let mut player_a = Player::new(strategy_a);
    let mut player_b = Player::new(strategy_b);
    let mut rng_a = rng.fork();
    let mut rng_b = rng.fork();

    let mut total_a = 0u64;
    let mut total_b = 0u64;

    for round in 0..rounds {
        // Both decide from last round's state before either move is revealed
        let move_a = player_a.decide(&mut rng_a);
        let move_b = player_b.decide(&mut rng_b);

        let (score_a, score_b) = score_pair(move_a, move_b);
        total_a += u64::from(score_a);
        total_b += u64::from(score_b);

        on_round(&RoundResult {
            round,
            move_a,
            move_b,
            score_a,
            score_b,
            cumulative_a: total_a,
            cumulative_b: total_b,
        });

        player_a.observe(&RoundOutcome {
            opponent_move: move_b,
            opponent_score: score_b,
            own_move: move_a,
            own_score: score_a,
        });
        player_b.observe(&RoundOutcome {
            opponent_move: move_a,
            opponent_score: score_a,
            own_move: move_b,
            own_score: score_b,
        });
    }

    (total_a, total_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: u64 = 42;

    #[test]
    fn test_cooperate_vs_cooperate() {
        let result = replay_match(
            StrategyKind::AlwaysCooperate,
            StrategyKind::AlwaysCooperate,
            20,
            SEED,
        );

        for round in &result.rounds {
            assert_eq!(round.move_a, Move::Cooperate);
            assert_eq!(round.move_b, Move::Cooperate);
            assert_eq!(round.score_a, 3);
            assert_eq!(round.score_b, 3);
        }

        assert_eq!(result.round_count, 20);
        assert_eq!(result.total_score_a, 60);
        assert_eq!(result.total_score_b, 60);
    }

    #[test]
    fn test_cooperate_vs_defect() {
        let result = replay_match(
            StrategyKind::AlwaysCooperate,
            StrategyKind::AlwaysDefect,
            20,
            SEED,
        );

        for round in &result.rounds {
            assert_eq!(round.score_a, 1);
            assert_eq!(round.score_b, 4);
        }

        assert_eq!(result.total_score_a, 20);
        assert_eq!(result.total_score_b, 80);
    }

    #[test]
    fn test_run_match_credits_totals() {
        let mut rng = SeededRng::new(SEED, 0);
        let mut totals = RunningTotals::default();

        let (a, b) = run_match(
            StrategyKind::AlwaysCooperate,
            StrategyKind::AlwaysDefect,
            15,
            &mut rng,
            &mut totals,
        );

        assert_eq!((a, b), (15, 60));
        assert_eq!(totals.points(StrategyKind::AlwaysCooperate), 15);
        assert_eq!(totals.points(StrategyKind::AlwaysDefect), 60);
        // Selection does the match counting, not the runner
        assert_eq!(totals.matches(StrategyKind::AlwaysCooperate), 0);
    }

    #[test]
    fn test_self_play_credits_both_roles() {
        let mut rng = SeededRng::new(SEED, 0);
        let mut totals = RunningTotals::default();

        run_match(
            StrategyKind::TitForTat,
            StrategyKind::TitForTat,
            10,
            &mut rng,
            &mut totals,
        );

        assert_eq!(totals.points(StrategyKind::TitForTat), 60);
    }

    #[test]
    fn test_tft_vs_always_defect() {
        let result = replay_match(StrategyKind::TitForTat, StrategyKind::AlwaysDefect, 10, SEED);

        // Round 0: TFT cooperates, AD defects
        assert_eq!(result.rounds[0].move_a, Move::Cooperate);
        assert_eq!(result.rounds[0].move_b, Move::Defect);

        // Round 1+: TFT retaliates, both defect
        for round in result.rounds.iter().skip(1) {
            assert_eq!(round.move_a, Move::Defect);
            assert_eq!(round.move_b, Move::Defect);
        }
    }

    #[test]
    fn test_decisions_are_simultaneous() {
        // Suspicious TFT vs TFT: moves echo one round late in both directions
        let result = replay_match(
            StrategyKind::TitForTatSuspicious,
            StrategyKind::TitForTat,
            6,
            SEED,
        );
        let moves: Vec<_> = result.rounds.iter().map(|r| (r.move_a, r.move_b)).collect();

        use Move::{Cooperate as C, Defect as D};
        assert_eq!(
            moves,
            vec![(D, C), (C, D), (D, C), (C, D), (D, C), (C, D)]
        );
    }

    #[test]
    fn test_round_scores_are_swapped_lookups() {
        let result = replay_match(StrategyKind::Random, StrategyKind::JekyllAndHyde, 50, SEED);
        for round in &result.rounds {
            assert_eq!(
                (round.score_a, round.score_b),
                (crate::payoff(round.move_a, round.move_b), crate::payoff(round.move_b, round.move_a))
            );
        }
    }

    #[test]
    fn test_cumulative_scores() {
        let result = replay_match(StrategyKind::Random, StrategyKind::Pavlov, 30, SEED);

        let mut expected_a = 0u64;
        let mut expected_b = 0u64;

        for round in &result.rounds {
            expected_a += round.score_a as u64;
            expected_b += round.score_b as u64;
            assert_eq!(round.cumulative_a, expected_a);
            assert_eq!(round.cumulative_b, expected_b);
        }
        assert_eq!(result.total_score_a, expected_a);
        assert_eq!(result.total_score_b, expected_b);
    }

    #[test]
    fn test_match_determinism() {
        let result1 = replay_match(StrategyKind::TitForTatAndRandom, StrategyKind::Random, 40, SEED);
        let result2 = replay_match(StrategyKind::TitForTatAndRandom, StrategyKind::Random, 40, SEED);
        assert_eq!(result1, result2);
    }

    #[test]
    fn test_different_seeds_differ() {
        let result1 = replay_match(StrategyKind::Random, StrategyKind::Random, 40, 1);
        let result2 = replay_match(StrategyKind::Random, StrategyKind::Random, 40, 2);

        let moves1: Vec<_> = result1.rounds.iter().map(|r| (r.move_a, r.move_b)).collect();
        let moves2: Vec<_> = result2.rounds.iter().map(|r| (r.move_a, r.move_b)).collect();

        assert_ne!(moves1, moves2, "Different seeds should have different move sequences");
    }
}
