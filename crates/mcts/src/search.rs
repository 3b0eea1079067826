//! PUCT-guided Monte Carlo tree search.
//!
//! One engine owns its tree, inference cache, and RNG. The tree is rebuilt
//! on every `search` call; the cache persists across calls so repeated
//! positions skip the evaluator.

use crate::{
    cache::{CacheStats, InferenceCache},
    config::MctsConfig,
    evaluator::{renormalized_priors, validate_evaluation, Evaluation, Evaluator},
    node::{Node, NodeId},
    tree::Tree,
};
use gambit_core::{Color, GambitError, Game, Move, Outcome, Result};
use rand::Rng;
use rand_distr::{Dirichlet, Distribution};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::trace;

/// Result of one search call.
#[derive(Clone, Debug)]
pub struct SearchResult {
    /// Move chosen at the temperature the search was run with.
    pub mv: Move,

    /// Move with the highest visit count, first-encountered on ties.
    pub best_move: Move,

    /// Visit count per root child, in legal-move order.
    pub visit_counts: Vec<(Move, u32)>,

    /// Mean value accumulated at the root across all simulations.
    pub root_value: f32,
}

impl SearchResult {
    /// Select a move by temperature.
    ///
    /// - temperature = 0: the highest-visit move (greedy)
    /// - temperature = 1: sample proportional to visit counts
    /// - other values: sample proportional to count^(1/temperature)
    pub fn select_move<R: Rng>(&self, temperature: f32, rng: &mut R) -> Move {
        if temperature <= 0.0 || self.visit_counts.len() <= 1 {
            return self.best_move;
        }

        let inv_temp = 1.0 / temperature as f64;
        let weights: Vec<f64> = self
            .visit_counts
            .iter()
            .map(|(_, count)| (*count as f64).powf(inv_temp))
            .collect();

        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            // No child was visited; fall back to a uniform draw.
            let idx = rng.gen_range(0..self.visit_counts.len());
            return self.visit_counts[idx].0;
        }

        let threshold: f64 = rng.gen::<f64>() * total;
        let mut cumulative = 0.0;
        for (i, weight) in weights.iter().enumerate() {
            cumulative += weight;
            if cumulative >= threshold {
                return self.visit_counts[i].0;
            }
        }

        // Floating point edge case
        self.visit_counts[self.visit_counts.len() - 1].0
    }

    /// Visit counts normalized to a probability distribution.
    ///
    /// This is the policy target recorded during self-play. Falls back to
    /// uniform when no child was visited (a search cancelled after one
    /// simulation).
    pub fn visit_distribution(&self) -> Vec<(Move, f32)> {
        let total: u32 = self.visit_counts.iter().map(|(_, count)| *count).sum();
        if total == 0 {
            let uniform = 1.0 / self.visit_counts.len() as f32;
            return self.visit_counts.iter().map(|&(mv, _)| (mv, uniform)).collect();
        }
        self.visit_counts
            .iter()
            .map(|&(mv, count)| (mv, count as f32 / total as f32))
            .collect()
    }
}

/// Terminal leaf value from the perspective of the player who just moved.
///
/// The winner at a terminal position is never the side to move, so a
/// decisive outcome scores +1 for the mover who produced it.
fn terminal_value(outcome: Outcome, to_move: Color) -> f32 {
    outcome.score_for(to_move.opponent())
}

/// PUCT search engine.
///
/// Generic over the game, the evaluator, and the RNG. The RNG drives root
/// noise and temperature sampling only; with `exploration_fraction = 0` and
/// `temperature = 0` a search is fully deterministic.
pub struct Mcts<G: Game, E: Evaluator, R: Rng> {
    config: MctsConfig,
    evaluator: E,
    rng: R,
    tree: Tree<G::Position>,
    cache: InferenceCache,
    cancel: Option<Arc<AtomicBool>>,
}

impl<G, E, R> Mcts<G, E, R>
where
    G: Game,
    E: Evaluator,
    R: Rng,
{
    /// Create an engine with its own tree and cache.
    pub fn new(config: MctsConfig, evaluator: E, rng: R) -> Self {
        let cache = InferenceCache::new(config.cache_capacity);
        Self {
            config,
            evaluator,
            rng,
            tree: Tree::new(),
            cache,
            cancel: None,
        }
    }

    /// Install a cooperative cancellation flag, checked between simulations.
    ///
    /// A cancelled search returns the result of the simulations already run.
    pub fn set_cancel_flag(&mut self, flag: Arc<AtomicBool>) {
        self.cancel = Some(flag);
    }

    /// Run a full search from `root` and pick a move at `temperature`.
    ///
    /// The first simulation expands the root itself, so the root ends with
    /// `num_simulations` visits and its children share `num_simulations - 1`.
    /// Searching a position with no legal moves is an error.
    pub fn search(&mut self, game: &G, root: &G::Position, temperature: f32) -> Result<SearchResult> {
        if game.outcome(root).is_some() || game.legal_moves(root).is_empty() {
            return Err(GambitError::NoLegalMoves);
        }

        self.tree.reset(root.clone());

        let mut completed = 0;
        for i in 0..self.config.num_simulations {
            if i > 0 && self.cancelled() {
                break;
            }
            if i == 1 && self.config.exploration_fraction > 0.0 {
                self.add_root_noise();
            }
            self.simulate(game)?;
            completed += 1;
        }

        let result = self.extract_result(temperature);
        trace!(
            simulations = completed,
            nodes = self.tree.len(),
            root_value = result.root_value,
            "search finished"
        );
        Ok(result)
    }

    /// Search greedily and return the best move with the root value.
    pub fn best_move(&mut self, game: &G, root: &G::Position) -> Result<(Move, f32)> {
        let result = self.search(game, root, 0.0)?;
        Ok((result.best_move, result.root_value))
    }

    /// Counters for the engine's inference cache.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drop cached evaluations and reset the cache counters.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|flag| flag.load(Ordering::Relaxed))
            .unwrap_or(false)
    }

    /// One simulation: select to a leaf, evaluate or score it, backpropagate.
    fn simulate(&mut self, game: &G) -> Result<()> {
        let mut path: Vec<NodeId> = vec![NodeId::ROOT];
        let mut current = NodeId::ROOT;

        // SELECT: descend by PUCT until an unexpanded node.
        loop {
            let node = self.tree.get(current);
            if node.is_leaf() || node.children.is_empty() {
                break;
            }
            let (_, child_id) = self.select_child(current);
            current = child_id;
            path.push(current);
        }

        let position = self.tree.get(current).position.clone();
        let value = match game.outcome(&position) {
            // Terminal leaves are scored analytically and never expanded,
            // so every revisit lands here again.
            Some(outcome) => terminal_value(outcome, game.side_to_move(&position)),
            None => {
                let evaluation = self.evaluate_cached(game, &position)?;
                self.expand_node(game, current, &position, &evaluation)?;
                evaluation.value
            }
        };

        self.backpropagate(&path, value);
        Ok(())
    }

    /// Evaluate through the cache, keyed by position fingerprint.
    fn evaluate_cached(&mut self, game: &G, position: &G::Position) -> Result<Arc<Evaluation>> {
        let key = game.fingerprint(position);
        if let Some(cached) = self.cache.lookup(&key) {
            return Ok(cached);
        }

        let encoding = game.encode(position);
        let evaluation = self.evaluator.evaluate(&encoding)?;
        validate_evaluation(&evaluation)?;

        let evaluation = Arc::new(evaluation);
        self.cache.insert(key, Arc::clone(&evaluation));
        Ok(evaluation)
    }

    /// Add one child per legal move, priors renormalized over the legal set.
    ///
    /// Idempotent: a node that already expanded is left untouched.
    fn expand_node(
        &mut self,
        game: &G,
        node_id: NodeId,
        position: &G::Position,
        evaluation: &Evaluation,
    ) -> Result<()> {
        if self.tree.get(node_id).expanded {
            return Ok(());
        }

        let moves = game.legal_moves(position);
        let priors = renormalized_priors(&evaluation.policy, &moves);

        for (mv, prior) in moves.into_iter().zip(priors) {
            let child_position = game.apply(position, mv)?;
            let child_id = self.tree.add(Node::new_child(child_position, mv, prior));
            self.tree.get_mut(node_id).children.push((mv, child_id));
        }

        self.tree.get_mut(node_id).expanded = true;
        Ok(())
    }

    /// Pick the child maximizing `Q + c_puct * prior * sqrt(N) / (1 + n)`.
    ///
    /// Q is the child's mean value as stored, which is already from the
    /// selecting player's perspective. Ties keep the first child in
    /// insertion order.
    fn select_child(&self, node_id: NodeId) -> (Move, NodeId) {
        let node = self.tree.get(node_id);
        let sqrt_parent = (node.stats.visit_count as f32).sqrt();

        let mut best_score = f32::NEG_INFINITY;
        let mut best: Option<(Move, NodeId)> = None;

        for &(mv, child_id) in &node.children {
            let child = self.tree.get(child_id);
            let q = child.stats.mean_value();
            let exploration = self.config.c_puct * child.stats.prior * sqrt_parent
                / (1.0 + child.stats.visit_count as f32);
            let score = q + exploration;

            if score > best_score {
                best_score = score;
                best = Some((mv, child_id));
            }
        }

        // Only called on expanded nodes with children.
        best.expect("select_child called on node without children")
    }

    /// Walk leaf to root, adding one visit per node and negating the value
    /// at each step.
    fn backpropagate(&mut self, path: &[NodeId], leaf_value: f32) {
        let mut value = leaf_value;
        for &node_id in path.iter().rev() {
            let node = self.tree.get_mut(node_id);
            node.stats.visit_count += 1;
            node.stats.value_sum += value;
            value = -value;
        }
    }

    /// Mix Dirichlet noise into the root priors.
    ///
    /// Runs once per search, right after the first simulation expands the
    /// root. Skipped when the root has fewer than two children.
    fn add_root_noise(&mut self) {
        let num_children = self.tree.root().children.len();
        if num_children < 2 {
            return;
        }

        let alpha = vec![self.config.dirichlet_alpha; num_children];
        let dirichlet = Dirichlet::new(&alpha).expect("dirichlet alpha is positive");
        let noise: Vec<f32> = dirichlet.sample(&mut self.rng);

        let fraction = self.config.exploration_fraction;
        let child_ids: Vec<NodeId> = self
            .tree
            .root()
            .children
            .iter()
            .map(|&(_, id)| id)
            .collect();

        for (child_id, noise_value) in child_ids.into_iter().zip(noise) {
            let child = self.tree.get_mut(child_id);
            child.stats.prior = (1.0 - fraction) * child.stats.prior + fraction * noise_value;
        }
    }

    /// Read visit counts off the root and select the result move.
    fn extract_result(&mut self, temperature: f32) -> SearchResult {
        let visit_counts: Vec<(Move, u32)> = self
            .tree
            .root()
            .children
            .iter()
            .map(|&(mv, id)| (mv, self.tree.get(id).stats.visit_count))
            .collect();

        // Root was expanded by the first simulation.
        let (mut best_move, mut best_visits) = visit_counts[0];
        for &(mv, visits) in &visit_counts[1..] {
            if visits > best_visits {
                best_visits = visits;
                best_move = mv;
            }
        }

        let root_value = self.tree.root().stats.mean_value();

        let mut result = SearchResult {
            mv: best_move,
            best_move,
            visit_counts,
            root_value,
        };
        if temperature > 0.0 {
            result.mv = result.select_move(temperature, &mut self.rng);
        }
        result
    }
}
