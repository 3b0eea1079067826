//! Position evaluation contract.
//!
//! The search engine never sees positions directly during inference; it
//! hands the evaluator a `Game::encode` tensor and gets back a policy over
//! the fixed move-index space plus a scalar value. Real evaluators wrap a
//! trained model; the ones in this module back tests and cold starts.

use gambit_core::{GambitError, Move, Result, POLICY_SIZE};

/// Evaluator output: move priors plus a value estimate.
#[derive(Clone, Debug)]
pub struct Evaluation {
    /// Prior probability per move index. Length must be `POLICY_SIZE`;
    /// the engine rejects anything else.
    pub policy: Vec<f32>,

    /// Value estimate for the position, in [-1, 1], where +1 is winning
    /// for the side to move.
    pub value: f32,
}

/// A position evaluator.
///
/// Object safe, so stores can hand back `Box<dyn Evaluator + Send + Sync>`
/// without the caller knowing the model type. Implementations that are
/// `Sync` may serve several search threads through a shared reference.
pub trait Evaluator {
    /// Evaluate an encoded position.
    fn evaluate(&self, encoding: &[f32]) -> Result<Evaluation>;
}

impl<E: Evaluator + ?Sized> Evaluator for &E {
    fn evaluate(&self, encoding: &[f32]) -> Result<Evaluation> {
        (**self).evaluate(encoding)
    }
}

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
    fn evaluate(&self, encoding: &[f32]) -> Result<Evaluation> {
        (**self).evaluate(encoding)
    }
}

/// Uniform priors and a neutral value. The cold-start evaluator.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformEvaluator;

impl Evaluator for UniformEvaluator {
    fn evaluate(&self, _encoding: &[f32]) -> Result<Evaluation> {
        Ok(Evaluation {
            policy: vec![1.0 / POLICY_SIZE as f32; POLICY_SIZE],
            value: 0.0,
        })
    }
}

/// Returns the same evaluation for every position. Test instrument.
#[derive(Clone, Debug)]
pub struct FixedEvaluator {
    policy: Vec<f32>,
    value: f32,
}

impl FixedEvaluator {
    /// Uniform policy with a fixed value.
    pub fn new(value: f32) -> Self {
        Self {
            policy: vec![1.0 / POLICY_SIZE as f32; POLICY_SIZE],
            value,
        }
    }

    /// Fixed policy and value.
    pub fn with_policy(policy: Vec<f32>, value: f32) -> Self {
        Self { policy, value }
    }
}

impl Evaluator for FixedEvaluator {
    fn evaluate(&self, _encoding: &[f32]) -> Result<Evaluation> {
        Ok(Evaluation {
            policy: self.policy.clone(),
            value: self.value,
        })
    }
}

/// Check an evaluation against the fixed policy shape.
pub fn validate_evaluation(eval: &Evaluation) -> Result<()> {
    if eval.policy.len() != POLICY_SIZE {
        return Err(GambitError::Evaluator(format!(
            "policy length {} does not match move space {}",
            eval.policy.len(),
            POLICY_SIZE
        )));
    }
    Ok(())
}

/// Project a raw policy onto the legal move set and renormalize.
///
/// Returns one prior per move, in move order. When the legal entries carry
/// no mass the priors fall back to uniform, so an untrained or mismatched
/// policy still lets the search run on value signal alone. Moves that share
/// a policy index (the promotion collision) read the same entry and end up
/// with equal priors.
pub fn renormalized_priors(policy: &[f32], moves: &[Move]) -> Vec<f32> {
    if moves.is_empty() {
        return Vec::new();
    }
    let raw: Vec<f32> = moves
        .iter()
        .map(|mv| policy.get(mv.policy_index()).copied().unwrap_or(0.0))
        .collect();
    let mass: f32 = raw.iter().sum();
    if mass > 0.0 {
        raw.into_iter().map(|p| p / mass).collect()
    } else {
        vec![1.0 / moves.len() as f32; moves.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gambit_core::{Promotion, Square};

    fn mv(from: u8, to: u8) -> Move {
        Move::new(Square::new(from).unwrap(), Square::new(to).unwrap())
    }

    #[test]
    fn test_uniform_evaluator() {
        let eval = UniformEvaluator.evaluate(&[]).unwrap();
        assert_eq!(eval.policy.len(), POLICY_SIZE);
        assert_eq!(eval.value, 0.0);

        let sum: f32 = eval.policy.iter().sum();
        assert!((sum - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_validate_rejects_short_policy() {
        let eval = Evaluation {
            policy: vec![1.0; 10],
            value: 0.0,
        };
        assert!(matches!(
            validate_evaluation(&eval),
            Err(GambitError::Evaluator(_))
        ));
        assert!(validate_evaluation(&UniformEvaluator.evaluate(&[]).unwrap()).is_ok());
    }

    #[test]
    fn test_renormalize_over_legal_moves() {
        let mut policy = vec![0.0; POLICY_SIZE];
        let a = mv(0, 1);
        let b = mv(0, 2);
        policy[a.policy_index()] = 0.6;
        policy[b.policy_index()] = 0.2;

        let priors = renormalized_priors(&policy, &[a, b]);
        assert!((priors[0] - 0.75).abs() < 1e-5);
        assert!((priors[1] - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_renormalize_uniform_fallback() {
        let policy = vec![0.0; POLICY_SIZE];
        let moves = [mv(0, 1), mv(0, 2), mv(0, 3)];

        let priors = renormalized_priors(&policy, &moves);
        for prior in priors {
            assert!((prior - 1.0 / 3.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_renormalize_empty_moves() {
        let policy = vec![0.0; POLICY_SIZE];
        assert!(renormalized_priors(&policy, &[]).is_empty());
    }

    #[test]
    fn test_promotion_collision_gets_equal_priors() {
        let from = Square::from_coords(0, 6).unwrap();
        let to = Square::from_coords(0, 7).unwrap();
        let moves: Vec<Move> = Promotion::ALL
            .iter()
            .map(|&p| Move::promotion(from, to, p))
            .collect();

        let mut policy = vec![0.0; POLICY_SIZE];
        policy[moves[0].policy_index()] = 0.8;

        let priors = renormalized_priors(&policy, &moves);
        for prior in &priors {
            assert!((prior - 0.25).abs() < 1e-5);
        }
    }

    #[test]
    fn test_trait_object_dispatch() {
        let boxed: Box<dyn Evaluator + Send + Sync> = Box::new(FixedEvaluator::new(0.5));
        let eval = boxed.evaluate(&[]).unwrap();
        assert!((eval.value - 0.5).abs() < 1e-6);

        let by_ref: &dyn Evaluator = &UniformEvaluator;
        assert!(by_ref.evaluate(&[]).is_ok());
    }
}
