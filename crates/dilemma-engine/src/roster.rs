//! Strategy roster: which strategies take part and their population weights

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ConfigError;
use crate::strategy::StrategyKind;

/// One roster slot
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RosterEntry {
    pub strategy: StrategyKind,
    /// Relative share of the population
    pub weight: u32,
}

/// Ordered strategy -> weight mapping, fixed for the whole run
///
/// Serialized as a JSON object in roster order:
/// `{"Tit_for_tat": 6, "Always_defect": 6}`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    pub fn new(entries: impl IntoIterator<Item = (StrategyKind, u32)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(strategy, weight)| RosterEntry { strategy, weight })
                .collect(),
        }
    }

    /// Every strategy with the same weight
    pub fn with_equal_weights(strategies: impl IntoIterator<Item = StrategyKind>) -> Self {
        Self::new(strategies.into_iter().map(|strategy| (strategy, 1)))
    }

    /// The reference population: nice strategies hold 48%, neutral 16%, mean 36%
    pub fn classic() -> Self {
        Self::new([
            // Nice
            (StrategyKind::TitForTat, 6),
            (StrategyKind::TitForTatSuspicious, 6),
            (StrategyKind::TitForTwoTats, 6),
            (StrategyKind::TitForTatAndRandom, 6),
            (StrategyKind::TitForTwoTatsAndRandom, 6),
            (StrategyKind::AlwaysCooperate, 6),
            (StrategyKind::NaivePeaceMaker, 4),
            (StrategyKind::TruePeaceMaker, 4),
            (StrategyKind::Pavlov, 4),
            // Neutral
            (StrategyKind::Random, 8),
            (StrategyKind::Adaptive, 8),
            // Mean
            (StrategyKind::AlwaysDefect, 6),
            (StrategyKind::Grudger, 6),
            (StrategyKind::GrudgerSoft, 6),
            (StrategyKind::NaiveProber, 6),
            (StrategyKind::RemorsefulProber, 6),
            (StrategyKind::JekyllAndHyde, 6),
        ])
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn strategies(&self) -> impl Iterator<Item = StrategyKind> + '_ {
        self.entries.iter().map(|e| e.strategy)
    }

    pub fn contains(&self, strategy: StrategyKind) -> bool {
        self.strategies().any(|s| s == strategy)
    }

    pub fn total_weight(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.weight)).sum()
    }

    /// Check the roster can drive a run
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entries.is_empty() {
            return Err(ConfigError::EmptyRoster);
        }

        let mut seen = [false; StrategyKind::COUNT];
        for entry in &self.entries {
            let slot = &mut seen[entry.strategy.index()];
            if *slot {
                return Err(ConfigError::DuplicateStrategy(entry.strategy.id().to_string()));
            }
            *slot = true;

            if entry.weight == 0 {
                return Err(ConfigError::ZeroWeight(entry.strategy.id().to_string()));
            }
        }

        Ok(())
    }
}

impl Serialize for Roster {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(entry.strategy.id(), &entry.weight)?;
        }
        map.end()
    }
}

struct RosterVisitor;

impl<'de> Visitor<'de> for RosterVisitor {
    type Value = Roster;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of strategy identifier to population weight")
    }

    // Keeps document order and duplicate keys; `Roster::validate` rejects duplicates.
    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Roster, A::Error> {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((id, weight)) = access.next_entry::<String, u32>()? {
            let strategy = id
                .parse::<StrategyKind>()
                .map_err(serde::de::Error::custom)?;
            entries.push(RosterEntry { strategy, weight });
        }
        Ok(Roster { entries })
    }
}

impl<'de> Deserialize<'de> for Roster {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RosterVisitor)
    }
}
