use std::collections::VecDeque;
use std::time::Instant;

use tracing::{debug, trace, warn};

use crate::layers::dense::{Layer, LayerTrace};
use crate::loss::sse::SseLoss;
use crate::math::matrix::Matrix;
use crate::optim::sgd::Sgd;
use crate::train::report::{StopReason, TrainReport};
use crate::train::train_config::{TrainConfig, LOG_EVERY};
use crate::train::training_set::TrainingSet;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Full-batch gradient descent over every example in `set`.
///
/// Each iteration forwards the whole batch, measures the cost and, unless a
/// stopping condition holds, backpropagates and updates every layer. The run
/// ends when
/// - the cost differs from the cost `config.window` iterations earlier by
///   less than `config.convergence_threshold` (or is exactly zero),
/// - `config.max_iterations` updates have been applied, or
/// - the cost becomes non-finite, in which case `layers` is restored to the
///   state it had on entry.
///
/// An empty `set` leaves `layers` untouched.
pub fn train_loop(
    layers: &mut [Layer],
    set: &TrainingSet,
    optimizer: &Sgd,
    config: &TrainConfig,
) -> TrainReport {
    let t_start = Instant::now();

    if set.is_empty() || layers.is_empty() {
        return TrainReport {
            iterations: 0,
            initial_loss: None,
            final_loss: None,
            stop_reason: StopReason::NoExamples,
            elapsed_ms: 0,
        };
    }

    let inputs = set.input_matrix();
    let targets = set.output_matrix();
    let snapshot = layers.to_vec();

    debug!(
        examples = set.len(),
        max_iterations = config.max_iterations,
        learning_rate = optimizer.learning_rate,
        "training started"
    );

    let mut history: VecDeque<f64> = VecDeque::with_capacity(config.window as usize + 1);
    let mut iterations = 0u64;
    let mut initial_loss = None;
    let mut final_loss;
    let stop_reason;

    loop {
        let traces = forward_all(layers, &inputs);
        let output = &traces[traces.len() - 1].activation;
        let cost = SseLoss::loss(output, &targets);

        if !cost.is_finite() {
            warn!(iterations, "cost became non-finite, restoring weights");
            layers.clone_from_slice(&snapshot);
            final_loss = initial_loss;
            stop_reason = StopReason::Diverged;
            break;
        }

        initial_loss.get_or_insert(cost);
        final_loss = Some(cost);

        history.push_back(cost);
        if history.len() > config.window as usize + 1 {
            history.pop_front();
        }
        if cost == 0.0 || has_converged(&history, config) {
            stop_reason = StopReason::Converged;
            break;
        }
        if iterations >= config.max_iterations {
            stop_reason = StopReason::IterationLimit;
            break;
        }

        let error = SseLoss::derivative(output, &targets);
        backpropagate(layers, &inputs, &traces, error, optimizer);
        iterations += 1;

        if iterations % LOG_EVERY == 0 {
            trace!(iterations, loss = cost, "training progress");
        }
    }

    let elapsed_ms = t_start.elapsed().as_millis() as u64;
    debug!(
        iterations,
        loss = final_loss,
        reason = ?stop_reason,
        elapsed_ms,
        "training finished"
    );

    TrainReport {
        iterations,
        initial_loss,
        final_loss,
        stop_reason,
        elapsed_ms,
    }
}

/// Forward pass through every layer, keeping each layer's trace.
pub fn forward_all(layers: &[Layer], input: &Matrix) -> Vec<LayerTrace> {
    let mut traces: Vec<LayerTrace> = Vec::with_capacity(layers.len());
    for layer in layers {
        let trace = match traces.last() {
            Some(prev) => layer.forward(&prev.activation),
            None => layer.forward(input),
        };
        traces.push(trace);
    }
    traces
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn has_converged(history: &VecDeque<f64>, config: &TrainConfig) -> bool {
    if history.len() <= config.window as usize {
        return false;
    }
    match (history.front(), history.back()) {
        (Some(oldest), Some(newest)) => (oldest - newest).abs() < config.convergence_threshold,
        _ => false,
    }
}

/// Walks the layers output → input, updating each with the batch gradient.
fn backpropagate(
    layers: &mut [Layer],
    inputs: &Matrix,
    traces: &[LayerTrace],
    error: Matrix,
    optimizer: &Sgd,
) {
    let mut delta = error;
    for i in (0..layers.len()).rev() {
        let input_for_layer = if i == 0 { inputs } else { &traces[i - 1].activation };

        // Gradients (and the delta for layer i - 1) use the weights before the step.
        let (w_grad, b_grad, input_delta) =
            layers[i].compute_gradients(&delta, input_for_layer, &traces[i]);
        optimizer.step(&mut layers[i], &w_grad, &b_grad);
        delta = input_delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::ActivationFunction;
    use rand::{rngs::StdRng, SeedableRng};

    fn layers(seed: u64, sizes: &[usize], activation: ActivationFunction) -> Vec<Layer> {
        let mut rng = StdRng::seed_from_u64(seed);
        sizes
            .windows(2)
            .map(|w| Layer::new(w[1], w[0], activation, &mut rng))
            .collect()
    }

    #[test]
    fn empty_set_is_a_no_op() {
        let mut net = layers(1, &[2, 2, 1], ActivationFunction::Sigmoid);
        let before = net.clone();
        let report = train_loop(&mut net, &TrainingSet::new(2, 1), &Sgd::new(1.0), &TrainConfig::new(10, 0.0, 1.0));
        assert_eq!(report.stop_reason, StopReason::NoExamples);
        assert_eq!(report.iterations, 0);
        assert_eq!(net, before);
    }

    #[test]
    fn stops_at_iteration_limit() {
        let mut net = layers(2, &[2, 2, 1], ActivationFunction::Sigmoid);
        let mut set = TrainingSet::new(2, 1);
        set.push_flat(2, &[0.0, 1.0, 1.0, 0.0], &[1.0, 0.0]).unwrap();
        let report = train_loop(&mut net, &set, &Sgd::new(0.5), &TrainConfig::new(25, 0.0, 0.5));
        assert_eq!(report.stop_reason, StopReason::IterationLimit);
        assert_eq!(report.iterations, 25);
        assert!(report.final_loss.unwrap() < report.initial_loss.unwrap());
    }

    #[test]
    fn zero_learning_rate_converges_after_one_window() {
        let mut net = layers(3, &[1, 1], ActivationFunction::Sigmoid);
        let mut set = TrainingSet::new(1, 1);
        set.push_flat(1, &[1.0], &[1.0]).unwrap();
        let config = TrainConfig::new(1000, 1e-9, 0.0);
        let report = train_loop(&mut net, &set, &Sgd::new(0.0), &config);
        assert_eq!(report.stop_reason, StopReason::Converged);
        assert_eq!(report.iterations, config.window);
    }

    #[test]
    fn short_runs_can_converge_before_the_limit() {
        let mut net = layers(3, &[1, 1], ActivationFunction::Sigmoid);
        let mut set = TrainingSet::new(1, 1);
        set.push_flat(1, &[1.0], &[1.0]).unwrap();
        let report = train_loop(&mut net, &set, &Sgd::new(0.1), &TrainConfig::new(1, 1e9, 0.1));
        assert_eq!(report.stop_reason, StopReason::Converged);
        assert_eq!(report.iterations, 1);
    }

    #[test]
    fn divergence_restores_weights() {
        // Leaky units never go flat, so an absurd step size overshoots further every iteration.
        let mut net = layers(4, &[1, 1], ActivationFunction::LeakyReLU);
        let mut set = TrainingSet::new(1, 1);
        set.push_flat(1, &[1.0], &[1.0]).unwrap();
        let before = net.clone();
        let report = train_loop(&mut net, &set, &Sgd::new(1e6), &TrainConfig::new(500, 0.0, 1e6));
        assert_eq!(report.stop_reason, StopReason::Diverged);
        assert!(report.diverged());
        assert_eq!(net, before);
    }
}
