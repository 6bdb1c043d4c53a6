use serde::{Serialize, Deserialize};

/// Why a `train_loop` run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// No examples were available, nothing ran.
    NoExamples,
    /// Cost change across the convergence window fell below the threshold,
    /// or the cost reached zero.
    Converged,
    /// `iteration_max` iterations elapsed.
    IterationLimit,
    /// Cost became non-finite; weights were restored to their pre-call values.
    Diverged,
}

/// Summary returned by every training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainReport {
    /// Gradient-descent iterations applied in this run.
    pub iterations: u64,
    /// Cost over the whole training set before the first update.
    pub initial_loss: Option<f64>,
    /// Cost after the last update (or before, if nothing ran).
    pub final_loss: Option<f64>,
    pub stop_reason: StopReason,
    /// Wall-clock duration of the run in milliseconds.
    pub elapsed_ms: u64,
}

impl TrainReport {
    pub fn converged(&self) -> bool {
        self.stop_reason == StopReason::Converged
    }

    pub fn diverged(&self) -> bool {
        self.stop_reason == StopReason::Diverged
    }
}
