pub mod damage;
pub mod eval;
pub mod model;
pub mod options;
pub mod resolve;
pub mod search;
pub mod state;
pub mod tree;
pub mod turn;
pub mod types;

pub use crate::eval::{feature_columns, feature_row, Evaluator, LogisticModel, FEATURE_COUNT};
pub use crate::model::{Combatant, Move};
pub use crate::options::Action;
pub use crate::search::{decide, RankedOption};
pub use crate::state::{BattleState, Side};
pub use crate::tree::{OutcomeNode, OutcomeTree};
pub use crate::turn::simulate_turn;

use crate::options::random_action;
use anyhow::Context;
use rand::Rng;
use std::path::Path;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("cannot switch into team slot {slot}")]
    IllegalSwitch { slot: usize },
    #[error("feature row has {got} columns, expected {expected}")]
    FeatureShape { got: usize, expected: usize },
    #[error("evaluation oracle failed: {0}")]
    Oracle(String),
}

/// Accepts a chosen action for the current turn. `false` means the
/// simulator rejected it and the next candidate should be tried.
pub trait ActionSink {
    fn submit(&mut self, action: &Action) -> bool;
}

/// Receives the post-battle record. Never consulted during a battle.
pub trait ResultSink {
    fn record(&mut self, record: &MatchRecord);
}

#[derive(Debug, Clone)]
pub struct MatchRecord {
    pub model: String,
    pub opponent: String,
    pub elo: f32,
    pub won: bool,
}

const RANDOM_FALLBACK_ATTEMPTS: usize = 8;

/// Loads an observed battle state from a JSON snapshot.
pub fn load_state(path: &Path) -> anyhow::Result<BattleState> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read battle state at {}", path.display()))?;
    let parsed: BattleState = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse JSON from {}", path.display()))?;
    Ok(parsed)
}

/// Boundary entry point: my actions for this turn, best first. A search
/// failure never crosses this boundary; it is logged and degrades to a
/// single random legal action.
pub fn advise<R: Rng>(
    state: &BattleState,
    depth: u32,
    oracle: &dyn Evaluator,
    rng: &mut R,
) -> Vec<Action> {
    let mut tree = OutcomeTree::new(state.clone());
    let root = tree.root();
    match decide(&mut tree, root, depth, oracle) {
        Ok(ranked) if !ranked.is_empty() => ranked.into_iter().map(|r| r.action).collect(),
        Ok(_) => random_action(state, rng).into_iter().collect(),
        Err(err) => {
            error!(%err, "decision search failed, falling back to a random action");
            random_action(state, rng).into_iter().collect()
        }
    }
}

/// Plays out one turn against a sink: ranked actions first, then random
/// legal actions while the sink keeps rejecting. `None` means nothing was
/// accepted.
pub fn drive_turn<S: ActionSink, R: Rng>(
    state: &BattleState,
    depth: u32,
    oracle: &dyn Evaluator,
    sink: &mut S,
    rng: &mut R,
) -> Option<Action> {
    for action in advise(state, depth, oracle, rng) {
        if sink.submit(&action) {
            return Some(action);
        }
        warn!(action = %action.label(state, Side::Mine), "action rejected by sink");
    }
    for _ in 0..RANDOM_FALLBACK_ATTEMPTS {
        let Some(action) = random_action(state, rng) else {
            break;
        };
        if sink.submit(&action) {
            return Some(action);
        }
    }
    None
}
