//! Opponent selection: uniform or population-weighted draws from the roster
//!
//! Weighted mode partitions the integers [1, W], W = 10 x total weight, into
//! one contiguous range per roster entry (size 10 x weight, roster order) and
//! maps a uniform draw back to the entry owning it. The partition is built on
//! the first weighted draw and shared by every later one.

use std::sync::OnceLock;

use crate::config::SelectionMode;
use crate::error::InternalError;
use crate::random::SeededRng;
use crate::roster::Roster;
use crate::strategy::StrategyKind;
use crate::tournament::RunningTotals;

/// Integers owned per unit of population weight
const SLOTS_PER_WEIGHT: u64 = 10;

/// Cumulative ranges over [1, bound)
#[derive(Clone, Debug, PartialEq, Eq)]
struct Partition {
    /// Inclusive (first, last) per roster entry
    ranges: Vec<(u64, u64)>,
    /// First value past the last range; never owned by any entry
    bound: u64,
}

impl Partition {
    fn build(weights: &[u32]) -> Self {
        let mut next = 1u64;
        let ranges = weights
            .iter()
            .map(|&weight| {
                let span = u64::from(weight) * SLOTS_PER_WEIGHT;
                let range = (next, next + span - 1);
                next += span;
                range
            })
            .collect();

        Self {
            ranges,
            bound: next,
        }
    }

    /// Roster position whose range holds `draw`
    fn locate(&self, draw: u64) -> Result<usize, InternalError> {
        let slot = self.ranges.partition_point(|&(_, last)| last < draw);
        match self.ranges.get(slot) {
            Some(&(first, last)) if first <= draw && draw <= last => Ok(slot),
            _ => Err(InternalError::PartitionMiss {
                draw,
                bound: self.bound,
            }),
        }
    }
}

/// Picks the strategy for one role of a match
#[derive(Debug)]
pub struct OpponentSelector {
    mode: SelectionMode,
    strategies: Vec<StrategyKind>,
    weights: Vec<u32>,
    partition: OnceLock<Partition>,
}

impl OpponentSelector {
    /// Roster is expected to be validated
    pub fn new(roster: &Roster, mode: SelectionMode) -> Self {
        Self {
            mode,
            strategies: roster.strategies().collect(),
            weights: roster.entries().iter().map(|e| e.weight).collect(),
            partition: OnceLock::new(),
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Pick a strategy and count the match against it in `totals`
    pub fn select(
        &self,
        rng: &mut SeededRng,
        totals: &mut RunningTotals,
    ) -> Result<StrategyKind, InternalError> {
        let slot = match self.mode {
            SelectionMode::Uniform => rng.next_index(self.strategies.len()),
            SelectionMode::Weighted => {
                let partition = self.partition()?;
                let draw = rng.next_inclusive(1, partition.bound - 1);
                partition.locate(draw).inspect_err(|e| {
                    tracing::error!(error = %e, "weighted selection missed the partition");
                })?
            }
        };

        let strategy = self
            .strategies
            .get(slot)
            .copied()
            .ok_or(InternalError::NoCandidates)?;
        totals.record_selection(strategy);
        Ok(strategy)
    }

    /// Build the weighted partition now instead of on the first draw
    pub fn prepare(&self) -> Result<(), InternalError> {
        match self.mode {
            SelectionMode::Uniform => Ok(()),
            SelectionMode::Weighted => self.partition().map(|_| ()),
        }
    }

    fn partition(&self) -> Result<&Partition, InternalError> {
        let partition = self.partition.get_or_init(|| {
            let partition = Partition::build(&self.weights);
            tracing::debug!(
                entries = partition.ranges.len(),
                bound = partition.bound,
                "built weighted selection partition"
            );
            partition
        });

        if partition.ranges.is_empty() {
            return Err(InternalError::NoCandidates);
        }
        Ok(partition)
    }
}
