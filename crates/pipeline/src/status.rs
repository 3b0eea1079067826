//! Pipeline run state as seen from outside the worker thread.

use std::fmt;
use std::time::Instant;

/// Stage the pipeline is currently in, or how the last run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No run in flight. Also the landing state after a stage failure.
    Idle,
    SelfPlay,
    Training,
    Evaluating,
    /// Run finished and the challenger replaced the champion.
    Promoted,
    /// Run finished but the challenger fell short of the threshold.
    Rejected,
    Cancelled,
}

impl Phase {
    /// Whether a run in this phase has come to rest.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Phase::Idle | Phase::Promoted | Phase::Rejected | Phase::Cancelled
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::SelfPlay => "self-play",
            Phase::Training => "training",
            Phase::Evaluating => "evaluating",
            Phase::Promoted => "promoted",
            Phase::Rejected => "rejected",
            Phase::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Snapshot of one pipeline run.
///
/// The worker thread is the only writer; `Orchestrator::status` hands out
/// clones, so readers may see a snapshot that is a few milliseconds stale.
#[derive(Clone, Debug)]
pub struct PipelineRun {
    /// Issued per run, monotonically increasing per orchestrator.
    pub run_id: u64,
    pub phase: Phase,
    /// Coarse progress, 0 to 100. Reset to 0 on failure.
    pub percent: u8,
    /// Human-readable stage description or last error.
    pub message: String,
    pub started_at: Instant,
}

impl PipelineRun {
    pub fn new(run_id: u64) -> Self {
        Self {
            run_id,
            phase: Phase::Idle,
            percent: 0,
            message: String::new(),
            started_at: Instant::now(),
        }
    }

    /// Wall-clock time since the run started.
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }
}
