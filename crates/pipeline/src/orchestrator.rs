//! The self-play → train → evaluate → promote loop.
//!
//! One run at a time, executed on a dedicated worker thread. The worker
//! is the only writer of the shared [`PipelineRun`]; `status()` clones
//! it out, so readers may see a slightly stale snapshot.

use crate::status::{Phase, PipelineRun};
use crate::store::ModelStore;
use crate::trainer::{EvaluatorFactory, Trainer};
use gambit_core::{GambitError, Game, Result};
use gambit_mcts::Evaluator;
use gambit_selfplay::{
    generate_games, play_match, MatchConfig, SelfPlayConfig, TrainingExample,
    DEFAULT_PROMOTION_THRESHOLD,
};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use tracing::{info, warn};

/// Offset between the self-play seed stream and the arbiter's.
const ARBITER_SEED_OFFSET: u64 = 1_000_000;

/// Everything one pipeline run needs to know.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Search and game settings for the self-play stage.
    pub selfplay: SelfPlayConfig,

    /// Self-play games per run.
    pub num_selfplay_games: usize,

    /// Match settings for the evaluation stage.
    pub evaluation: MatchConfig,

    /// Challenger win rate required for promotion, inclusive.
    pub promotion_threshold: f32,

    /// Base seed; per-game seeds are derived from it.
    pub seed: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            selfplay: SelfPlayConfig::default(),
            num_selfplay_games: 10,
            evaluation: MatchConfig::default(),
            promotion_threshold: DEFAULT_PROMOTION_THRESHOLD,
            seed: 0,
        }
    }
}

/// Owns the worker thread and the run snapshot.
pub struct Orchestrator<G: Game + 'static> {
    game: G,
    config: PipelineConfig,
    store: Arc<dyn ModelStore>,
    trainer: Arc<dyn Trainer>,
    factory: Arc<dyn EvaluatorFactory>,
    run: Arc<Mutex<PipelineRun>>,
    active: Arc<AtomicBool>,
    cancel: Arc<AtomicBool>,
    next_run_id: AtomicU64,
    worker: Mutex<Option<JoinHandle<()>>>,
}

fn lock_run(run: &Mutex<PipelineRun>) -> MutexGuard<'_, PipelineRun> {
    run.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears the active flag when the worker exits, panics included.
struct ActiveGuard(Arc<AtomicBool>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<G: Game + 'static> Orchestrator<G> {
    pub fn new(
        game: G,
        config: PipelineConfig,
        store: Arc<dyn ModelStore>,
        trainer: Arc<dyn Trainer>,
        factory: Arc<dyn EvaluatorFactory>,
    ) -> Self {
        Self {
            game,
            config,
            store,
            trainer,
            factory,
            run: Arc::new(Mutex::new(PipelineRun::new(0))),
            active: Arc::new(AtomicBool::new(false)),
            cancel: Arc::new(AtomicBool::new(false)),
            next_run_id: AtomicU64::new(1),
            worker: Mutex::new(None),
        }
    }

    /// Launch a run, returning its id.
    ///
    /// Fails with [`GambitError::AlreadyRunning`] while a run is in
    /// flight; the in-flight run and its snapshot are untouched.
    pub fn start(&self) -> Result<u64> {
        if self.active.swap(true, Ordering::SeqCst) {
            return Err(GambitError::AlreadyRunning);
        }
        self.cancel.store(false, Ordering::SeqCst);
        let run_id = self.next_run_id.fetch_add(1, Ordering::SeqCst);

        {
            let mut run = lock_run(&self.run);
            *run = PipelineRun::new(run_id);
            run.phase = Phase::SelfPlay;
            run.percent = 5;
            run.message = "initializing evaluator".to_string();
        }
        info!(run_id, "pipeline run started");

        let game = self.game.clone();
        let config = self.config.clone();
        let store = Arc::clone(&self.store);
        let trainer = Arc::clone(&self.trainer);
        let factory = Arc::clone(&self.factory);
        let run = Arc::clone(&self.run);
        let cancel = Arc::clone(&self.cancel);
        let guard = ActiveGuard(Arc::clone(&self.active));

        let handle = thread::spawn(move || {
            let _guard = guard;
            let result = run_pipeline(
                &game,
                &config,
                store.as_ref(),
                trainer.as_ref(),
                factory.as_ref(),
                &run,
                &cancel,
            );
            if let Err(error) = result {
                warn!(run_id, %error, "pipeline run failed");
                let mut run = lock_run(&run);
                run.phase = Phase::Idle;
                run.percent = 0;
                run.message = format!("error: {error}");
            }
            info!(run_id, "pipeline worker finished");
        });
        *self.worker.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);

        Ok(run_id)
    }

    /// Snapshot of the current (or most recent) run.
    pub fn status(&self) -> PipelineRun {
        lock_run(&self.run).clone()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Ask the in-flight run to stop. Observed between simulations,
    /// plies, games, and stages, so the run winds down rather than
    /// halting instantly.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
        info!("pipeline cancellation requested");
    }

    /// Block until the in-flight run (if any) has finished.
    pub fn wait(&self) {
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!("pipeline worker panicked");
            }
        }
    }
}

fn run_pipeline<G: Game>(
    game: &G,
    config: &PipelineConfig,
    store: &dyn ModelStore,
    trainer: &dyn Trainer,
    factory: &dyn EvaluatorFactory,
    run: &Mutex<PipelineRun>,
    cancel: &Arc<AtomicBool>,
) -> Result<()> {
    let run_id = lock_run(run).run_id;
    let update = |phase: Phase, percent: u8, message: String| {
        let mut run = lock_run(run);
        run.phase = phase;
        run.percent = percent;
        run.message = message;
    };
    let cancelled = || cancel.load(Ordering::Relaxed);
    let finish_cancelled = || {
        let mut run = lock_run(run);
        run.phase = Phase::Cancelled;
        run.message = "run cancelled".to_string();
        info!(run_id, "pipeline run cancelled");
    };

    // Stage 0: revive the champion, or start cold.
    let champion_id = store.champion()?;
    let champion: Box<dyn Evaluator + Send + Sync> = match &champion_id {
        Some(id) => factory.build(&store.load(id)?)?,
        None => factory.initial(),
    };

    // Stage 1: self-play.
    update(
        Phase::SelfPlay,
        10,
        format!("generating {} self-play games", config.num_selfplay_games),
    );
    let records = generate_games(
        game,
        &champion,
        &config.selfplay,
        config.num_selfplay_games,
        config.seed,
        Some(Arc::clone(cancel)),
    );
    if cancelled() {
        finish_cancelled();
        return Ok(());
    }
    let examples: Vec<TrainingExample> =
        records.into_iter().flat_map(|record| record.examples).collect();
    if examples.is_empty() {
        return Err(GambitError::Evaluator(
            "self-play produced no training examples".to_string(),
        ));
    }
    update(
        Phase::SelfPlay,
        40,
        format!("self-play complete: {} examples", examples.len()),
    );

    // Stage 2: training.
    update(
        Phase::Training,
        50,
        format!("training on {} examples", examples.len()),
    );
    let blob = trainer.train(&examples)?;
    let challenger_id = format!("model-{run_id:04}");
    store.save(&challenger_id, &blob)?;
    update(Phase::Training, 75, format!("model saved: {challenger_id}"));
    if cancelled() {
        finish_cancelled();
        return Ok(());
    }

    // Stage 3: evaluation, skipped for the very first model.
    let Some(champion_id) = champion_id else {
        store.set_champion(&challenger_id)?;
        update(
            Phase::Promoted,
            100,
            format!("{challenger_id} promoted as first champion"),
        );
        info!(run_id, challenger = %challenger_id, "first model promoted");
        return Ok(());
    };

    update(
        Phase::Evaluating,
        90,
        format!("evaluating {challenger_id} against {champion_id}"),
    );
    let challenger = factory.build(&store.load(&challenger_id)?)?;
    let tally = play_match(
        game,
        &challenger,
        &champion,
        &config.evaluation,
        config.seed.wrapping_add(ARBITER_SEED_OFFSET),
        Some(Arc::clone(cancel)),
    );
    if cancelled() {
        finish_cancelled();
        return Ok(());
    }

    let win_rate = tally.win_rate();
    info!(
        run_id,
        challenger_wins = tally.challenger_wins,
        champion_wins = tally.champion_wins,
        draws = tally.draws,
        win_rate,
        "evaluation complete"
    );
    if tally.should_promote(config.promotion_threshold) {
        store.set_champion(&challenger_id)?;
        update(
            Phase::Promoted,
            100,
            format!("{challenger_id} promoted, win rate {:.1}%", win_rate * 100.0),
        );
    } else {
        update(
            Phase::Rejected,
            100,
            format!("{challenger_id} rejected, win rate {:.1}%", win_rate * 100.0),
        );
    }
    Ok(())
}
