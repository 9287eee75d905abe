//! Tournament execution and result aggregation
//!
//! A run draws both roles of every match from the roster, plays the match,
//! and folds the points into per-strategy running totals. Each match gets
//! its own random stream derived from the run seed and the match index, so a
//! seeded run gives the same totals whether it runs sequentially or on the
//! rayon pool.

use std::cmp::Ordering;
use std::fmt;

use rayon::prelude::*;
use serde::{Serialize, Serializer};

use crate::config::{SelectionMode, TournamentConfig};
use crate::error::DilemmaError;
use crate::game::run_match;
use crate::random::{entropy_seed, SeededRng};
use crate::selector::OpponentSelector;
use crate::strategy::StrategyKind;

/// Points and match counts per strategy
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunningTotals {
    points: [u64; StrategyKind::COUNT],
    matches: [u64; StrategyKind::COUNT],
}

impl Default for RunningTotals {
    fn default() -> Self {
        Self {
            points: [0; StrategyKind::COUNT],
            matches: [0; StrategyKind::COUNT],
        }
    }
}

impl RunningTotals {
    pub fn points(&self, strategy: StrategyKind) -> u64 {
        self.points[strategy.index()]
    }

    pub fn matches(&self, strategy: StrategyKind) -> u64 {
        self.matches[strategy.index()]
    }

    /// Count one match role against `strategy`
    pub fn record_selection(&mut self, strategy: StrategyKind) {
        self.matches[strategy.index()] += 1;
    }

    pub fn add_points(&mut self, strategy: StrategyKind, points: u32) {
        self.points[strategy.index()] += u64::from(points);
    }

    /// Fold another tally into this one
    pub fn merge(&mut self, other: &RunningTotals) {
        for (mine, theirs) in self.points.iter_mut().zip(other.points) {
            *mine += theirs;
        }
        for (mine, theirs) in self.matches.iter_mut().zip(other.matches) {
            *mine += theirs;
        }
    }

    /// Average points per match, or `NoData` if never selected
    pub fn average(&self, strategy: StrategyKind) -> Average {
        match self.matches(strategy) {
            0 => Average::NoData,
            matches => Average::Points(self.points(strategy) as f64 / matches as f64),
        }
    }
}

/// Average points per match
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Average {
    /// Strategy never took part in a match
    NoData,
    Points(f64),
}

impl Average {
    pub fn value(self) -> Option<f64> {
        match self {
            Average::NoData => None,
            Average::Points(points) => Some(points),
        }
    }

    /// Descending order; `NoData` sorts after every number
    fn cmp_desc(&self, other: &Average) -> Ordering {
        match (self, other) {
            (Average::Points(a), Average::Points(b)) => b.total_cmp(a),
            (Average::Points(_), Average::NoData) => Ordering::Less,
            (Average::NoData, Average::Points(_)) => Ordering::Greater,
            (Average::NoData, Average::NoData) => Ordering::Equal,
        }
    }
}

impl fmt::Display for Average {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Average::NoData => f.write_str("no data"),
            Average::Points(points) => write!(f, "{:.3}", points),
        }
    }
}

// Numbers serialize as numbers, `NoData` as null
impl Serialize for Average {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value().serialize(serializer)
    }
}

/// Final statistics for one strategy
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Standing {
    pub strategy: StrategyKind,
    pub average: Average,
    pub total_points: u64,
    pub total_matches: u64,
}

/// Outcome of a run: three rankings over the same standings
///
/// Each view is sorted descending by its own metric. Equal values keep
/// roster order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResultSummary {
    pub by_average: Vec<Standing>,
    pub by_matches: Vec<Standing>,
    pub by_points: Vec<Standing>,
    pub matches: u32,
    pub rounds_per_match: u32,
    pub selection_mode: SelectionMode,
    /// Seed that reproduces this run
    pub seed: u64,
}

impl ResultSummary {
    fn from_totals(config: &TournamentConfig, seed: u64, totals: &RunningTotals) -> Self {
        let standings: Vec<Standing> = config
            .roster
            .strategies()
            .map(|strategy| Standing {
                strategy,
                average: totals.average(strategy),
                total_points: totals.points(strategy),
                total_matches: totals.matches(strategy),
            })
            .collect();

        let mut by_average = standings.clone();
        by_average.sort_by(|a, b| a.average.cmp_desc(&b.average));

        let mut by_matches = standings.clone();
        by_matches.sort_by(|a, b| b.total_matches.cmp(&a.total_matches));

        let mut by_points = standings;
        by_points.sort_by(|a, b| b.total_points.cmp(&a.total_points));

        Self {
            by_average,
            by_matches,
            by_points,
            matches: config.matches,
            rounds_per_match: config.rounds_per_match,
            selection_mode: config.selection_mode,
            seed,
        }
    }

    /// Get the standing for a specific strategy
    pub fn standing(&self, strategy: StrategyKind) -> Option<&Standing> {
        self.by_average.iter().find(|s| s.strategy == strategy)
    }

    /// Best average points per match
    pub fn leader(&self) -> Option<&Standing> {
        self.by_average.first()
    }
}

/// Run a tournament
///
/// Validates `config`, plays every match and ranks the roster. Each call
/// starts from empty totals.
pub fn run(config: &TournamentConfig) -> Result<ResultSummary, DilemmaError> {
    config.validate()?;

    let seed = config.seed.unwrap_or_else(entropy_seed);
    tracing::info!(
        mode = ?config.selection_mode,
        matches = config.matches,
        rounds_per_match = config.rounds_per_match,
        strategies = config.roster.len(),
        seed,
        parallel = config.parallel,
        "starting tournament"
    );

    let selector = OpponentSelector::new(&config.roster, config.selection_mode);
    selector.prepare()?;

    let totals = if config.parallel {
        (0..config.matches)
            .into_par_iter()
            .try_fold(RunningTotals::default, |mut totals, index| {
                play_one(&selector, seed, index, config.rounds_per_match, &mut totals)?;
                Ok::<_, DilemmaError>(totals)
            })
            .try_reduce(RunningTotals::default, |mut left, right| {
                left.merge(&right);
                Ok(left)
            })?
    } else {
        let mut totals = RunningTotals::default();
        for index in 0..config.matches {
            play_one(&selector, seed, index, config.rounds_per_match, &mut totals)?;
        }
        totals
    };

    let summary = ResultSummary::from_totals(config, seed, &totals);
    if let Some(leader) = summary.leader() {
        tracing::info!(
            leader = %leader.strategy,
            average = %leader.average,
            "tournament complete"
        );
    }
    Ok(summary)
}

/// Select both roles and play one match
fn play_one(
    selector: &OpponentSelector,
    seed: u64,
    index: u32,
    rounds: u32,
    totals: &mut RunningTotals,
) -> Result<(), DilemmaError> {
    let mut rng = SeededRng::new(seed, u64::from(index));
    let strategy_a = selector.select(&mut rng, totals)?;
    let strategy_b = selector.select(&mut rng, totals)?;

    let (points_a, points_b) = run_match(strategy_a, strategy_b, rounds, &mut rng, totals);
    tracing::trace!(
        index,
        a = %strategy_a,
        b = %strategy_b,
        points_a,
        points_b,
        "match played"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Roster;

    fn pair_config(a: StrategyKind, b: StrategyKind) -> TournamentConfig {
        TournamentConfig::new(Roster::with_equal_weights([a, b]))
            .with_matches(200)
            .with_rounds_per_match(20)
            .with_seed(42)
    }

    #[test]
    fn test_average_no_data() {
        let totals = RunningTotals::default();
        assert_eq!(totals.average(StrategyKind::Pavlov), Average::NoData);
        assert_eq!(Average::NoData.to_string(), "no data");
        assert_eq!(Average::Points(2.5).to_string(), "2.500");
    }

    #[test]
    fn test_merge() {
        let mut left = RunningTotals::default();
        left.record_selection(StrategyKind::Grudger);
        left.add_points(StrategyKind::Grudger, 10);

        let mut right = RunningTotals::default();
        right.record_selection(StrategyKind::Grudger);
        right.record_selection(StrategyKind::Random);
        right.add_points(StrategyKind::Grudger, 5);

        left.merge(&right);
        assert_eq!(left.matches(StrategyKind::Grudger), 2);
        assert_eq!(left.points(StrategyKind::Grudger), 15);
        assert_eq!(left.matches(StrategyKind::Random), 1);
        assert_eq!(left.average(StrategyKind::Grudger), Average::Points(7.5));
    }

    #[test]
    fn test_single_match_cooperators() {
        let config = TournamentConfig::new(Roster::with_equal_weights([StrategyKind::AlwaysCooperate]))
            .with_matches(1)
            .with_rounds_per_match(12)
            .with_seed(1);

        let summary = run(&config).unwrap();
        let standing = summary.standing(StrategyKind::AlwaysCooperate).unwrap();

        // Self-play: both roles credit the same strategy
        assert_eq!(standing.total_points, 2 * 3 * 12);
        assert_eq!(standing.total_matches, 2);
        assert_eq!(standing.average, Average::Points(36.0));
    }

    #[test]
    fn test_views_are_sorted() {
        let config = TournamentConfig::classic()
            .with_matches(500)
            .with_rounds_per_match(10)
            .with_seed(3);
        let summary = run(&config).unwrap();

        assert_eq!(summary.by_average.len(), StrategyKind::COUNT);
        for pair in summary.by_average.windows(2) {
            assert_ne!(pair[0].average.cmp_desc(&pair[1].average), Ordering::Greater);
        }
        for pair in summary.by_matches.windows(2) {
            assert!(pair[0].total_matches >= pair[1].total_matches);
        }
        for pair in summary.by_points.windows(2) {
            assert!(pair[0].total_points >= pair[1].total_points);
        }

        let total_roles: u64 = summary.by_matches.iter().map(|s| s.total_matches).sum();
        assert_eq!(total_roles, 1000);
    }

    #[test]
    fn test_ties_keep_roster_order() {
        let roster = Roster::with_equal_weights([
            StrategyKind::Grudger,
            StrategyKind::AlwaysCooperate,
            StrategyKind::TitForTat,
        ]);
        // All three always cooperate with each other
        let config = TournamentConfig::new(roster)
            .with_matches(1)
            .with_rounds_per_match(5)
            .with_seed(11);
        let summary = run(&config).unwrap();

        let unplayed: Vec<_> = summary
            .by_average
            .iter()
            .filter(|s| s.average == Average::NoData)
            .map(|s| s.strategy)
            .collect();
        let expected: Vec<_> = [
            StrategyKind::Grudger,
            StrategyKind::AlwaysCooperate,
            StrategyKind::TitForTat,
        ]
        .into_iter()
        .filter(|k| unplayed.contains(k))
        .collect();
        assert_eq!(unplayed, expected);

        // Played strategies all average the same 15 points and lead the view
        let played = summary.by_average.len() - unplayed.len();
        for standing in &summary.by_average[..played] {
            assert_eq!(standing.average, Average::Points(15.0));
        }
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let config = TournamentConfig::classic()
            .with_matches(300)
            .with_rounds_per_match(15)
            .with_seed(99);
        assert_eq!(run(&config).unwrap(), run(&config).unwrap());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let config = TournamentConfig::classic()
            .with_selection_mode(SelectionMode::Weighted)
            .with_matches(400)
            .with_rounds_per_match(20)
            .with_seed(5);

        let sequential = run(&config).unwrap();
        let parallel = run(&config.clone().with_parallel(true)).unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_unseeded_run_reports_its_seed() {
        let config = pair_config(StrategyKind::Random, StrategyKind::Pavlov);
        let mut unseeded = config.clone();
        unseeded.seed = None;

        let first = run(&unseeded).unwrap();
        let replay = run(&config.with_seed(first.seed)).unwrap();
        assert_eq!(first, replay);
    }

    #[test]
    fn test_invalid_config_fails_before_running() {
        let config = pair_config(StrategyKind::Pavlov, StrategyKind::Pavlov);
        let err = run(&config).unwrap_err();
        assert!(!err.is_internal());
        assert!(matches!(
            err,
            DilemmaError::Config(crate::error::ConfigError::DuplicateStrategy(_))
        ));
    }

    #[test]
    fn test_summary_serializes_ids() {
        let summary = run(&pair_config(StrategyKind::AlwaysCooperate, StrategyKind::AlwaysDefect)).unwrap();
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["matches"].as_u64(), Some(200));
        assert_eq!(json["rounds_per_match"].as_u64(), Some(20));
        assert_eq!(json["selection_mode"], "uniform");
        assert_eq!(json["seed"].as_u64(), Some(42));
        assert_eq!(json["by_average"][0]["strategy"], "Always_defect");
    }
}
