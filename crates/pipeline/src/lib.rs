//! Orchestration of the self-improvement loop.
//!
//! A run flows self-play → training → evaluation → promotion, driven by
//! [`Orchestrator`] on a worker thread and observed through
//! [`PipelineRun`] snapshots. Model persistence sits behind
//! [`ModelStore`], training behind [`Trainer`] + [`EvaluatorFactory`];
//! [`tabular`] provides in-repo implementations of both seams.

pub mod orchestrator;
pub mod status;
pub mod store;
pub mod tabular;
pub mod trainer;

pub use orchestrator::{Orchestrator, PipelineConfig};
pub use status::{Phase, PipelineRun};
pub use store::{FileModelStore, InMemoryModelStore, ModelStore};
pub use tabular::{TabularEvaluator, TabularFactory, TabularModel, TabularTrainer};
pub use trainer::{EvaluatorFactory, Trainer};
