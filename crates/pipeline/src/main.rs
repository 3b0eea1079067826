//! `gambit` command-line interface.
//!
//! Drives the pipeline on the bundled tic-tac-toe oracle with the
//! tabular trainer, which keeps every subcommand runnable on a laptop
//! with no model weights checked in.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gambit_mcts::games::TicTacToe;
use gambit_mcts::{Evaluator, MctsConfig};
use gambit_pipeline::{
    EvaluatorFactory, FileModelStore, ModelStore, Orchestrator, PipelineConfig, TabularFactory,
    TabularTrainer,
};
use gambit_selfplay::{
    generate_games, play_match, write_record, MatchConfig, SelfPlayConfig,
    DEFAULT_PROMOTION_THRESHOLD,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gambit", about = "Self-play training pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate self-play games and write them as MessagePack records.
    Selfplay {
        /// Number of games to generate.
        #[arg(short, long, default_value = "10")]
        games: usize,

        /// Number of MCTS simulations per move.
        #[arg(short, long, default_value = "800")]
        simulations: usize,

        /// Base RNG seed (random when omitted).
        #[arg(long)]
        seed: Option<u64>,

        /// Output directory for game records.
        #[arg(short, long, default_value = "data/games")]
        output: PathBuf,

        /// Model directory; the champion plays if one exists.
        #[arg(short, long, default_value = "data/models")]
        models: PathBuf,
    },

    /// Play two stored models against each other.
    Match {
        /// Challenger model id.
        #[arg(long)]
        challenger: String,

        /// Champion model id.
        #[arg(long)]
        champion: String,

        /// Number of games to play.
        #[arg(short, long, default_value = "20")]
        games: usize,

        /// Number of MCTS simulations per move.
        #[arg(short, long, default_value = "400")]
        simulations: usize,

        /// Win rate the challenger must reach.
        #[arg(long, default_value_t = DEFAULT_PROMOTION_THRESHOLD)]
        threshold: f32,

        /// Base RNG seed (random when omitted).
        #[arg(long)]
        seed: Option<u64>,

        /// Model directory.
        #[arg(short, long, default_value = "data/models")]
        models: PathBuf,
    },

    /// Run full pipeline iterations: self-play, train, evaluate, promote.
    Run {
        /// Number of pipeline iterations.
        #[arg(short, long, default_value = "1")]
        iterations: u32,

        /// Self-play games per iteration.
        #[arg(short, long, default_value = "10")]
        games: usize,

        /// Number of MCTS simulations per self-play move.
        #[arg(short, long, default_value = "800")]
        simulations: usize,

        /// Evaluation games per iteration.
        #[arg(long, default_value = "20")]
        eval_games: usize,

        /// Number of MCTS simulations per evaluation move.
        #[arg(long, default_value = "400")]
        eval_simulations: usize,

        /// Win rate the challenger must reach.
        #[arg(long, default_value_t = DEFAULT_PROMOTION_THRESHOLD)]
        threshold: f32,

        /// Base RNG seed (random when omitted).
        #[arg(long)]
        seed: Option<u64>,

        /// Model directory.
        #[arg(short, long, default_value = "data/models")]
        models: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Selfplay {
            games,
            simulations,
            seed,
            output,
            models,
        } => cmd_selfplay(games, simulations, seed, output, models),
        Commands::Match {
            challenger,
            champion,
            games,
            simulations,
            threshold,
            seed,
            models,
        } => cmd_match(challenger, champion, games, simulations, threshold, seed, models),
        Commands::Run {
            iterations,
            games,
            simulations,
            eval_games,
            eval_simulations,
            threshold,
            seed,
            models,
        } => cmd_run(
            iterations,
            games,
            simulations,
            eval_games,
            eval_simulations,
            threshold,
            seed,
            models,
        ),
    }
}

/// Tabular champion from the store, or uniform before any promotion.
fn champion_evaluator(models: &Path) -> Result<Box<dyn Evaluator + Send + Sync>> {
    let store = FileModelStore::new(models).context("opening model store")?;
    let factory = TabularFactory;
    match store.champion()? {
        Some(id) => {
            println!("Using champion '{id}'");
            let blob = store.load(&id).with_context(|| format!("loading model '{id}'"))?;
            Ok(factory.build(&blob)?)
        }
        None => {
            println!("No champion found, using uniform evaluator");
            Ok(factory.initial())
        }
    }
}

fn cmd_selfplay(
    games: usize,
    simulations: usize,
    seed: Option<u64>,
    output: PathBuf,
    models: PathBuf,
) -> Result<()> {
    let seed = seed.unwrap_or_else(rand::random);
    std::fs::create_dir_all(&output)
        .with_context(|| format!("creating output dir {}", output.display()))?;

    let evaluator = champion_evaluator(&models)?;
    let config = SelfPlayConfig {
        mcts: MctsConfig::with_simulations(simulations),
        ..SelfPlayConfig::default()
    };

    println!("Generating {games} self-play games ({simulations} simulations/move, seed {seed})");
    let start = Instant::now();
    let records = generate_games(&TicTacToe, &evaluator, &config, games, seed, None);
    let elapsed = start.elapsed().as_secs_f64();

    let mut total_examples = 0;
    let (mut white_wins, mut black_wins, mut draws) = (0, 0, 0);
    for (i, record) in records.iter().enumerate() {
        let path = output.join(format!("game-{i:04}.msgpack"));
        write_record(&path, record).with_context(|| format!("writing {}", path.display()))?;
        total_examples += record.len();
        if record.outcome > 0.5 {
            white_wins += 1;
        } else if record.outcome < -0.5 {
            black_wins += 1;
        } else {
            draws += 1;
        }
    }

    println!(
        "Wrote {} games ({} examples) to {} in {:.1}s ({:.1} games/s)",
        records.len(),
        total_examples,
        output.display(),
        elapsed,
        records.len() as f64 / elapsed.max(1e-9),
    );
    println!("Outcomes: {white_wins} white, {black_wins} black, {draws} draws");
    Ok(())
}

fn cmd_match(
    challenger: String,
    champion: String,
    games: usize,
    simulations: usize,
    threshold: f32,
    seed: Option<u64>,
    models: PathBuf,
) -> Result<()> {
    let seed = seed.unwrap_or_else(rand::random);
    let store = FileModelStore::new(&models).context("opening model store")?;
    let factory = TabularFactory;

    let challenger_eval = factory
        .build(&store.load(&challenger)?)
        .with_context(|| format!("loading challenger '{challenger}'"))?;
    let champion_eval = factory
        .build(&store.load(&champion)?)
        .with_context(|| format!("loading champion '{champion}'"))?;

    let config = MatchConfig {
        num_games: games,
        mcts: MctsConfig::with_simulations(simulations),
        ..MatchConfig::default()
    };

    println!("Match: '{challenger}' vs '{champion}' ({games} games, {simulations} simulations/move, seed {seed})");
    let start = Instant::now();
    let tally = play_match(&TicTacToe, &challenger_eval, &champion_eval, &config, seed, None);
    let elapsed = start.elapsed().as_secs_f64();

    println!(
        "Result: {} challenger wins, {} champion wins, {} draws in {:.1}s",
        tally.challenger_wins, tally.champion_wins, tally.draws, elapsed,
    );
    println!(
        "  as White: {}/{} wins, as Black: {}/{} wins",
        tally.challenger_white_wins,
        tally.challenger_white_games,
        tally.challenger_black_wins,
        tally.games_played - tally.challenger_white_games,
    );
    println!(
        "Win rate {:.1}% against threshold {:.1}%: {}",
        tally.win_rate() * 100.0,
        threshold * 100.0,
        if tally.should_promote(threshold) {
            "would promote"
        } else {
            "would not promote"
        },
    );
    Ok(())
}

fn cmd_run(
    iterations: u32,
    games: usize,
    simulations: usize,
    eval_games: usize,
    eval_simulations: usize,
    threshold: f32,
    seed: Option<u64>,
    models: PathBuf,
) -> Result<()> {
    let base_seed = seed.unwrap_or_else(rand::random);
    let store: Arc<dyn ModelStore> =
        Arc::new(FileModelStore::new(&models).context("opening model store")?);

    let config = PipelineConfig {
        selfplay: SelfPlayConfig {
            mcts: MctsConfig::with_simulations(simulations),
            ..SelfPlayConfig::default()
        },
        num_selfplay_games: games,
        evaluation: MatchConfig {
            num_games: eval_games,
            mcts: MctsConfig::with_simulations(eval_simulations),
            ..MatchConfig::default()
        },
        promotion_threshold: threshold,
        seed: base_seed,
    };

    let orchestrator = Orchestrator::new(
        TicTacToe,
        config,
        Arc::clone(&store),
        Arc::new(TabularTrainer),
        Arc::new(TabularFactory),
    );

    for iteration in 1..=iterations {
        println!("=== Iteration {iteration}/{iterations} (seed {base_seed}) ===");
        let start = Instant::now();
        orchestrator.start()?;

        let mut last_message = String::new();
        loop {
            let status = orchestrator.status();
            if status.message != last_message {
                println!("  [{:>3}%] {}", status.percent, status.message);
                last_message = status.message;
            }
            if !orchestrator.is_active() {
                break;
            }
            std::thread::sleep(Duration::from_millis(50));
        }
        orchestrator.wait();

        let status = orchestrator.status();
        if status.message != last_message {
            println!("  [{:>3}%] {}", status.percent, status.message);
        }
        println!(
            "Run {} finished: {} in {:.1}s",
            status.run_id,
            status.phase,
            start.elapsed().as_secs_f64(),
        );
    }

    match store.champion()? {
        Some(id) => println!("Champion: '{id}' ({} models stored)", store.list()?.len()),
        None => println!("No champion promoted"),
    }
    Ok(())
}
