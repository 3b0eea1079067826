//! Self-play game generation.
//!
//! Each game runs a full search per ply, records the visit distribution
//! as its policy target, and back-assigns the final outcome to every
//! recorded position once the game ends.

use crate::record::{GameRecord, TrainingExample};
use gambit_core::{Color, Game, Outcome, Result};
use gambit_mcts::{Evaluator, Mcts, MctsConfig, SearchResult};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Parameters for a batch of self-play games.
#[derive(Clone, Debug)]
pub struct SelfPlayConfig {
    /// Search settings used for every move.
    pub mcts: MctsConfig,

    /// Plies sampled at temperature 1.0 before play turns greedy.
    pub exploration_plies: u32,

    /// Games longer than this are scored as draws.
    pub move_cap: u32,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        Self {
            mcts: MctsConfig::default(),
            exploration_plies: 15,
            move_cap: 500,
        }
    }
}

/// Visit distribution of a search as a sparse map keyed by policy index.
///
/// Moves that share an index have their probabilities summed, so the
/// map still sums to 1.
pub fn sparse_policy(result: &SearchResult) -> HashMap<u16, f32> {
    let mut policy = HashMap::new();
    for (mv, probability) in result.visit_distribution() {
        if probability > 0.0 {
            *policy.entry(mv.policy_index() as u16).or_insert(0.0) += probability;
        }
    }
    policy
}

fn cancelled(flag: &Option<Arc<AtomicBool>>) -> bool {
    flag.as_ref().is_some_and(|f| f.load(Ordering::Relaxed))
}

/// Play one self-play game to completion.
///
/// Returns `Ok(None)` when the cancel flag tripped before the game
/// finished; an unfinished game yields no training data.
pub fn play_game<G, E>(
    game: &G,
    evaluator: E,
    config: &SelfPlayConfig,
    seed: u64,
    cancel: Option<Arc<AtomicBool>>,
) -> Result<Option<GameRecord>>
where
    G: Game,
    E: Evaluator,
{
    let mut mcts = Mcts::new(
        config.mcts.clone(),
        evaluator,
        ChaCha8Rng::seed_from_u64(seed),
    );
    if let Some(flag) = &cancel {
        mcts.set_cancel_flag(Arc::clone(flag));
    }

    let mut position = game.initial_position();
    // (encoding, policy, side to move) per ply, scored once the game ends.
    let mut pending = Vec::new();
    let mut ply: u32 = 0;

    let outcome = loop {
        if let Some(outcome) = game.outcome(&position) {
            break outcome;
        }
        if ply >= config.move_cap {
            debug!(ply, "move cap reached, scoring draw");
            break Outcome::Draw;
        }
        if cancelled(&cancel) {
            return Ok(None);
        }

        let temperature = if ply < config.exploration_plies { 1.0 } else { 0.0 };
        let result = mcts.search(game, &position, temperature)?;

        pending.push((game.encode(&position), sparse_policy(&result), game.side_to_move(&position)));
        position = game.apply(&position, result.mv)?;
        ply += 1;
    };

    let examples = pending
        .into_iter()
        .enumerate()
        .map(|(i, (encoding, policy, mover))| TrainingExample {
            encoding,
            policy,
            value: outcome.score_for(mover),
            ply: i as u32,
        })
        .collect();

    let mut metadata = HashMap::new();
    metadata.insert("seed".to_string(), json!(seed));
    metadata.insert("plies".to_string(), json!(ply));

    Ok(Some(GameRecord {
        examples,
        outcome: outcome.score_for(Color::White),
        metadata,
    }))
}

/// Play `num_games` self-play games in parallel.
///
/// Games that fail are logged and skipped, and a tripped cancel flag
/// stops the batch, so the result may hold fewer than `num_games`
/// records.
pub fn generate_games<G, E>(
    game: &G,
    evaluator: &E,
    config: &SelfPlayConfig,
    num_games: usize,
    base_seed: u64,
    cancel: Option<Arc<AtomicBool>>,
) -> Vec<GameRecord>
where
    G: Game,
    E: Evaluator + Sync,
{
    (0..num_games)
        .into_par_iter()
        .filter_map(|i| {
            if cancelled(&cancel) {
                return None;
            }
            let seed = base_seed.wrapping_add(i as u64 * 1000);
            match play_game(game, evaluator, config, seed, cancel.clone()) {
                Ok(Some(record)) => {
                    debug!(game = i, plies = record.len(), outcome = record.outcome, "self-play game complete");
                    Some(record)
                }
                Ok(None) => None,
                Err(error) => {
                    warn!(game = i, %error, "self-play game failed, skipping");
                    None
                }
            }
        })
        .collect()
}
