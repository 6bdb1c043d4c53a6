use crate::params::hyper_parameters::HyperParameters;

/// Iterations over which the cost change is measured for convergence.
pub const CONVERGENCE_WINDOW: u64 = 100;

/// Iterations between trace-level progress events.
pub const LOG_EVERY: u64 = 1000;

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `max_iterations`        — hard cap on full-batch gradient-descent steps
/// - `convergence_threshold` — stop once the cost moves less than this
///                             across `window` iterations
/// - `learning_rate`         — step size for the gradient-descent update
/// - `window`                — iterations between the two costs compared,
///                             `CONVERGENCE_WINDOW` capped at `max_iterations`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainConfig {
    pub max_iterations: u64,
    pub convergence_threshold: f64,
    pub learning_rate: f64,
    pub window: u64,
}

impl TrainConfig {
    /// The window never exceeds `max_iterations`, so short runs can still
    /// converge before hitting the limit.
    pub fn new(max_iterations: u64, convergence_threshold: f64, learning_rate: f64) -> Self {
        TrainConfig {
            max_iterations,
            convergence_threshold,
            learning_rate,
            window: CONVERGENCE_WINDOW.min(max_iterations).max(1),
        }
    }
}

impl From<&HyperParameters> for TrainConfig {
    fn from(params: &HyperParameters) -> Self {
        TrainConfig::new(params.iteration_max, params.convergence_threshold, params.learning_rate)
    }
}
