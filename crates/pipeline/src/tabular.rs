//! Tabular reference model: per-position averages of what search saw.
//!
//! Keyed by a hash of the exact encoding bits, so it only ever answers
//! for positions it has been trained on and falls back to uniform
//! otherwise. Exists so the full pipeline loop runs and is testable
//! without a neural network behind the evaluator seam.

use crate::trainer::{EvaluatorFactory, Trainer};
use gambit_core::{GambitError, Result, POLICY_SIZE};
use gambit_mcts::{Evaluation, Evaluator, UniformEvaluator};
use gambit_selfplay::TrainingExample;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use tracing::info;

/// Hash an encoded position by its exact bit pattern.
pub fn hash_encoding(encoding: &[f32]) -> u64 {
    let mut hasher = DefaultHasher::new();
    for &feature in encoding {
        feature.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
struct PositionStat {
    policy_sum: HashMap<u16, f32>,
    value_sum: f32,
    count: u32,
}

/// Lookup table from encoding hash to averaged search targets.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct TabularModel {
    positions: HashMap<u64, PositionStat>,
}

impl TabularModel {
    /// Fold one training example into the running averages.
    pub fn observe(&mut self, example: &TrainingExample) {
        let stat = self
            .positions
            .entry(hash_encoding(&example.encoding))
            .or_default();
        for (&index, &probability) in &example.policy {
            *stat.policy_sum.entry(index).or_insert(0.0) += probability;
        }
        stat.value_sum += example.value;
        stat.count += 1;
    }

    /// Distinct positions seen so far.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    fn evaluation_for(&self, encoding: &[f32]) -> Option<Evaluation> {
        let stat = self.positions.get(&hash_encoding(encoding))?;
        let mut policy = vec![0.0; POLICY_SIZE];
        for (&index, &sum) in &stat.policy_sum {
            policy[index as usize] = sum / stat.count as f32;
        }
        Some(Evaluation {
            policy,
            value: stat.value_sum / stat.count as f32,
        })
    }
}

/// Serves the table's averages, uniform for anything unseen.
pub struct TabularEvaluator {
    model: TabularModel,
    fallback: UniformEvaluator,
}

impl TabularEvaluator {
    pub fn new(model: TabularModel) -> Self {
        Self {
            model,
            fallback: UniformEvaluator,
        }
    }

    pub fn known_positions(&self) -> usize {
        self.model.len()
    }
}

impl Evaluator for TabularEvaluator {
    fn evaluate(&self, encoding: &[f32]) -> Result<Evaluation> {
        match self.model.evaluation_for(encoding) {
            Some(evaluation) => Ok(evaluation),
            None => self.fallback.evaluate(encoding),
        }
    }
}

/// Builds a fresh table from each batch of examples.
#[derive(Default)]
pub struct TabularTrainer;

impl Trainer for TabularTrainer {
    fn train(&self, examples: &[TrainingExample]) -> Result<Vec<u8>> {
        let mut model = TabularModel::default();
        for example in examples {
            model.observe(example);
        }
        info!(
            examples = examples.len(),
            positions = model.len(),
            "tabular model fitted"
        );
        rmp_serde::to_vec_named(&model).map_err(|e| GambitError::Serialization(e.to_string()))
    }
}

/// Revives [`TabularTrainer`] blobs; uniform before the first model.
#[derive(Default)]
pub struct TabularFactory;

impl EvaluatorFactory for TabularFactory {
    fn initial(&self) -> Box<dyn Evaluator + Send + Sync> {
        Box::new(UniformEvaluator)
    }

    fn build(&self, bytes: &[u8]) -> Result<Box<dyn Evaluator + Send + Sync>> {
        let model: TabularModel =
            rmp_serde::from_slice(bytes).map_err(|e| GambitError::Serialization(e.to_string()))?;
        Ok(Box::new(TabularEvaluator::new(model)))
    }
}
