//! Head-to-head evaluation between a challenger and a champion.
//!
//! The challenger takes White in even-numbered games so neither side
//! banks a first-move advantage across the match. Both sides play
//! greedily, temperature 0.

use gambit_core::{Color, Game, Outcome, Result};
use gambit_mcts::{Evaluator, Mcts, MctsConfig};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Win-rate a challenger must reach (inclusive) to replace the champion.
pub const DEFAULT_PROMOTION_THRESHOLD: f32 = 0.55;

/// Parameters for an arbiter match.
#[derive(Clone, Debug)]
pub struct MatchConfig {
    /// Games per match.
    pub num_games: usize,

    /// Search settings shared by both sides.
    pub mcts: MctsConfig,

    /// Games longer than this are scored as draws.
    pub move_cap: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            num_games: 20,
            mcts: MctsConfig::with_simulations(400),
            move_cap: 500,
        }
    }
}

/// Challenger-centric match counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvaluationTally {
    pub challenger_wins: usize,
    pub champion_wins: usize,
    pub draws: usize,
    /// Completed games; cancelled games are not counted.
    pub games_played: usize,
    pub challenger_white_games: usize,
    pub challenger_white_wins: usize,
    pub challenger_black_wins: usize,
}

impl EvaluationTally {
    /// Challenger wins over completed games, 0 when nothing finished.
    pub fn win_rate(&self) -> f32 {
        if self.games_played == 0 {
            0.0
        } else {
            self.challenger_wins as f32 / self.games_played as f32
        }
    }

    /// Whether the challenger earned promotion. The threshold is
    /// inclusive: hitting it exactly promotes.
    pub fn should_promote(&self, threshold: f32) -> bool {
        self.win_rate() >= threshold
    }

    fn record(&mut self, outcome: Outcome, challenger_is_white: bool) {
        self.games_played += 1;
        if challenger_is_white {
            self.challenger_white_games += 1;
        }
        let challenger_color = if challenger_is_white { Color::White } else { Color::Black };
        match outcome.winner() {
            None => self.draws += 1,
            Some(color) if color == challenger_color => {
                self.challenger_wins += 1;
                if challenger_is_white {
                    self.challenger_white_wins += 1;
                } else {
                    self.challenger_black_wins += 1;
                }
            }
            Some(_) => self.champion_wins += 1,
        }
    }
}

fn cancelled(flag: &Option<Arc<AtomicBool>>) -> bool {
    flag.as_ref().is_some_and(|f| f.load(Ordering::Relaxed))
}

/// Play a match between two evaluators.
///
/// A game that fails mid-play is scored as a draw so one bad inference
/// cannot void the match. Cancellation stops the match between games.
pub fn play_match<G, C, M>(
    game: &G,
    challenger: &C,
    champion: &M,
    config: &MatchConfig,
    base_seed: u64,
    cancel: Option<Arc<AtomicBool>>,
) -> EvaluationTally
where
    G: Game,
    C: Evaluator,
    M: Evaluator,
{
    let mut tally = EvaluationTally::default();

    for i in 0..config.num_games {
        if cancelled(&cancel) {
            break;
        }
        let challenger_is_white = i % 2 == 0;
        let seed = base_seed.wrapping_add(i as u64 * 1000);

        match play_single_game(game, challenger, champion, config, challenger_is_white, seed, &cancel) {
            Ok(Some(outcome)) => {
                debug!(game = i, challenger_is_white, ?outcome, "match game complete");
                tally.record(outcome, challenger_is_white);
            }
            Ok(None) => break,
            Err(error) => {
                warn!(game = i, %error, "match game failed, scoring draw");
                tally.record(Outcome::Draw, challenger_is_white);
            }
        }
    }

    tally
}

/// Returns `Ok(None)` when the cancel flag tripped before the game ended.
fn play_single_game<G, C, M>(
    game: &G,
    challenger: &C,
    champion: &M,
    config: &MatchConfig,
    challenger_is_white: bool,
    seed: u64,
    cancel: &Option<Arc<AtomicBool>>,
) -> Result<Option<Outcome>>
where
    G: Game,
    C: Evaluator,
    M: Evaluator,
{
    let mut challenger_engine = Mcts::new(
        config.mcts.clone(),
        challenger,
        ChaCha8Rng::seed_from_u64(seed),
    );
    let mut champion_engine = Mcts::new(
        config.mcts.clone(),
        champion,
        ChaCha8Rng::seed_from_u64(seed.wrapping_add(1)),
    );
    if let Some(flag) = cancel {
        challenger_engine.set_cancel_flag(Arc::clone(flag));
        champion_engine.set_cancel_flag(Arc::clone(flag));
    }

    let challenger_color = if challenger_is_white { Color::White } else { Color::Black };
    let mut position = game.initial_position();
    let mut plies: u32 = 0;

    loop {
        if let Some(outcome) = game.outcome(&position) {
            return Ok(Some(outcome));
        }
        if plies >= config.move_cap {
            return Ok(Some(Outcome::Draw));
        }
        if cancelled(cancel) {
            return Ok(None);
        }

        let (mv, _) = if game.side_to_move(&position) == challenger_color {
            challenger_engine.best_move(game, &position)?
        } else {
            champion_engine.best_move(game, &position)?
        };
        position = game.apply(&position, mv)?;
        plies += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gambit_core::GambitError;
    use gambit_mcts::games::{Race, TicTacToe};
    use gambit_mcts::{Evaluation, UniformEvaluator};

    struct FailingEvaluator;

    impl Evaluator for FailingEvaluator {
        fn evaluate(&self, _encoding: &[f32]) -> Result<Evaluation> {
            Err(GambitError::Evaluator("network offline".to_string()))
        }
    }

    fn quick_config(num_games: usize, simulations: usize) -> MatchConfig {
        MatchConfig {
            num_games,
            mcts: MctsConfig::with_simulations(simulations),
            ..MatchConfig::default()
        }
    }

    #[test]
    fn test_challenger_takes_white_in_even_games() {
        // 5 games: challenger is White in games 0, 2, 4.
        let game = Race::new(2);
        let tally = play_match(
            &game,
            &UniformEvaluator,
            &UniformEvaluator,
            &quick_config(5, 8),
            0,
            None,
        );
        assert_eq!(tally.games_played, 5);
        assert_eq!(tally.challenger_white_games, 3);
    }

    #[test]
    fn test_self_match_on_a_drawless_game_splits_evenly() {
        // Race cannot draw and greedy play is deterministic, so every
        // game repeats the same moves and the same color wins each time.
        // Alternation then hands the challenger exactly half the games.
        let game = Race::new(5);
        let tally = play_match(
            &game,
            &UniformEvaluator,
            &UniformEvaluator,
            &quick_config(20, 32),
            7,
            None,
        );
        assert_eq!(tally.games_played, 20);
        assert_eq!(tally.draws, 0);
        assert_eq!(tally.challenger_wins, 10);
        assert_eq!(tally.champion_wins, 10);
        assert_eq!(tally.win_rate(), 0.5);
        assert!(!tally.should_promote(DEFAULT_PROMOTION_THRESHOLD));
    }

    #[test]
    fn test_promotion_threshold_is_inclusive() {
        let tally = EvaluationTally {
            challenger_wins: 11,
            champion_wins: 9,
            games_played: 20,
            ..EvaluationTally::default()
        };
        assert!(tally.should_promote(0.55));

        let short = EvaluationTally {
            challenger_wins: 10,
            champion_wins: 10,
            games_played: 20,
            ..EvaluationTally::default()
        };
        assert!(!short.should_promote(0.55));
    }

    #[test]
    fn test_win_rate_of_an_empty_match_is_zero() {
        assert_eq!(EvaluationTally::default().win_rate(), 0.0);
    }

    #[test]
    fn test_failed_games_score_as_draws() {
        let game = TicTacToe;
        let tally = play_match(
            &game,
            &FailingEvaluator,
            &UniformEvaluator,
            &quick_config(2, 16),
            0,
            None,
        );
        assert_eq!(tally.games_played, 2);
        assert_eq!(tally.draws, 2);
        assert_eq!(tally.win_rate(), 0.0);
    }

    #[test]
    fn test_move_cap_scores_a_draw() {
        // Race to 100 cannot finish under a 6-ply cap.
        let game = Race::new(100);
        let config = MatchConfig {
            num_games: 2,
            mcts: MctsConfig::with_simulations(8),
            move_cap: 6,
        };
        let tally = play_match(&game, &UniformEvaluator, &UniformEvaluator, &config, 0, None);
        assert_eq!(tally.draws, 2);
    }

    #[test]
    fn test_cancel_stops_the_match() {
        let game = TicTacToe;
        let flag = Arc::new(AtomicBool::new(true));
        let tally = play_match(
            &game,
            &UniformEvaluator,
            &UniformEvaluator,
            &quick_config(6, 16),
            0,
            Some(flag),
        );
        assert_eq!(tally.games_played, 0);
    }
}
