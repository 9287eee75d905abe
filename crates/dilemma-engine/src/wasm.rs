//! WASM bindings for browser front ends

#![cfg(feature = "wasm")]

use wasm_bindgen::prelude::*;

use crate::{replay_match as replay, run, StrategyKind, TournamentConfig};

fn parse_strategy(id: &str) -> Result<StrategyKind, JsError> {
    id.parse::<StrategyKind>()
        .map_err(|e| JsError::new(&e.to_string()))
}

/// Run a full tournament
///
/// # Arguments
/// * `config_json` - JSON serialized TournamentConfig
///
/// # Returns
/// JSON serialized ResultSummary
#[wasm_bindgen]
pub fn run_tournament(config_json: &str) -> Result<JsValue, JsError> {
    let config = TournamentConfig::from_json(config_json)
        .map_err(|e| JsError::new(&e.to_string()))?;

    let summary = run(&config).map_err(|e| JsError::new(&e.to_string()))?;

    serde_wasm_bindgen::to_value(&summary)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// Replay a match with full round-by-round details
///
/// # Arguments
/// * `strategy_a` - Roster identifier for player A, e.g. `Tit_for_tat`
/// * `strategy_b` - Roster identifier for player B
/// * `rounds` - Number of rounds to play
/// * `seed` - Random seed; the same seed replays the same match
///
/// # Returns
/// JSON serialized MatchResult
#[wasm_bindgen]
pub fn replay_match(
    strategy_a: &str,
    strategy_b: &str,
    rounds: u32,
    seed: u64,
) -> Result<JsValue, JsError> {
    let a = parse_strategy(strategy_a)
        .map_err(|_| JsError::new(&format!("Invalid strategy A: {}", strategy_a)))?;
    let b = parse_strategy(strategy_b)
        .map_err(|_| JsError::new(&format!("Invalid strategy B: {}", strategy_b)))?;

    let result = replay(a, b, rounds, seed);

    serde_wasm_bindgen::to_value(&result)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

#[derive(serde::Serialize)]
struct StrategyInfo {
    id: &'static str,
    disposition: crate::Disposition,
    description: &'static str,
    classic_weight: u32,
}

/// Get all available strategies with their classic population weight
#[wasm_bindgen]
pub fn get_strategy_types() -> Result<JsValue, JsError> {
    let types: Vec<StrategyInfo> = crate::Roster::classic()
        .entries()
        .iter()
        .map(|entry| StrategyInfo {
            id: entry.strategy.id(),
            disposition: entry.strategy.disposition(),
            description: entry.strategy.description(),
            classic_weight: entry.weight,
        })
        .collect();

    serde_wasm_bindgen::to_value(&types)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// Default configuration as JSON, for front ends to edit and send back
#[wasm_bindgen]
pub fn get_default_config() -> Result<String, JsError> {
    serde_json::to_string(&TournamentConfig::classic())
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// Reject a configuration without running it
#[wasm_bindgen]
pub fn validate_config(config_json: &str) -> Result<(), JsError> {
    TournamentConfig::from_json(config_json)
        .map(|_| ())
        .map_err(|e| JsError::new(&e.to_string()))
}

/// Seed taken from the JS millisecond clock, for callers without their own
#[wasm_bindgen]
pub fn clock_seed() -> u64 {
    js_sys::Date::now() as u64
}
