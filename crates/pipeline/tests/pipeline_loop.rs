//! End-to-end pipeline iterations on the bundled tic-tac-toe oracle.

use gambit_core::{Game, POLICY_SIZE};
use gambit_mcts::games::TicTacToe;
use gambit_mcts::{Evaluator, MctsConfig};
use gambit_pipeline::{
    EvaluatorFactory, FileModelStore, InMemoryModelStore, ModelStore, Orchestrator, Phase,
    PipelineConfig, TabularFactory, TabularTrainer,
};
use gambit_selfplay::{MatchConfig, SelfPlayConfig};
use std::sync::Arc;
use std::time::Duration;

fn small_config(seed: u64) -> PipelineConfig {
    PipelineConfig {
        selfplay: SelfPlayConfig {
            mcts: MctsConfig::with_simulations(16),
            ..SelfPlayConfig::default()
        },
        num_selfplay_games: 4,
        evaluation: MatchConfig {
            num_games: 4,
            mcts: MctsConfig::with_simulations(16),
            ..MatchConfig::default()
        },
        seed,
        ..PipelineConfig::default()
    }
}

#[test]
fn test_two_iterations_against_a_file_store() {
    let root = std::env::temp_dir().join(format!("gambit-pipeline-loop-{}", std::process::id()));
    let store: Arc<dyn ModelStore> = Arc::new(FileModelStore::new(&root).unwrap());

    let orchestrator = Orchestrator::new(
        TicTacToe,
        small_config(3),
        Arc::clone(&store),
        Arc::new(TabularTrainer),
        Arc::new(TabularFactory),
    );

    // Iteration 1: cold start, the first model is promoted unopposed.
    orchestrator.start().unwrap();
    orchestrator.wait();
    let status = orchestrator.status();
    assert_eq!(status.phase, Phase::Promoted);
    assert_eq!(store.champion().unwrap(), Some("model-0001".to_string()));

    // Iteration 2: the challenger must now beat the sitting champion.
    orchestrator.start().unwrap();
    orchestrator.wait();
    let status = orchestrator.status();
    assert!(
        matches!(status.phase, Phase::Promoted | Phase::Rejected),
        "unexpected phase {:?}",
        status.phase
    );
    assert_eq!(status.percent, 100);
    assert_eq!(store.list().unwrap().len(), 2);

    // The champion pointer matches the verdict.
    let champion = store.champion().unwrap().unwrap();
    match status.phase {
        Phase::Promoted => assert_eq!(champion, "model-0002"),
        Phase::Rejected => assert_eq!(champion, "model-0001"),
        _ => unreachable!(),
    }

    // Every stored blob revives into a working evaluator.
    let game = TicTacToe;
    let encoding = game.encode(&game.initial_position());
    for id in store.list().unwrap() {
        let evaluator = TabularFactory.build(&store.load(&id).unwrap()).unwrap();
        let evaluation = evaluator.evaluate(&encoding).unwrap();
        assert_eq!(evaluation.policy.len(), POLICY_SIZE);
    }

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn test_progress_never_moves_backwards_on_success() {
    let orchestrator = Orchestrator::new(
        TicTacToe,
        small_config(9),
        Arc::new(InMemoryModelStore::new()),
        Arc::new(TabularTrainer),
        Arc::new(TabularFactory),
    );

    orchestrator.start().unwrap();
    let mut observed = Vec::new();
    while orchestrator.is_active() {
        observed.push(orchestrator.status().percent);
        std::thread::sleep(Duration::from_millis(5));
    }
    orchestrator.wait();
    observed.push(orchestrator.status().percent);

    assert!(
        observed.windows(2).all(|pair| pair[0] <= pair[1]),
        "progress went backwards: {observed:?}"
    );
    assert_eq!(*observed.last().unwrap(), 100);
    assert!(orchestrator.status().phase.is_terminal());
}
