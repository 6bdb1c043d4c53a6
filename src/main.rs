// Activation-function benchmark: trains the XOR gate once per activation
// function and reports time taken, final cost and predictions.
//
//   cargo run --release -- [hyperparameters.json]
//
// Set RUST_LOG=escalator_net=trace to watch training progress.
use std::time::Instant;

use escalator_net::{ActivationFunction, Engine, HyperParameters, NetworkOptions};
use tracing_subscriber::EnvFilter;

const XOR_INPUTS: [f64; 8] = [0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0];
const XOR_OUTPUTS: [f64; 4] = [0.0, 1.0, 1.0, 0.0];

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,escalator_net=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

fn run() -> escalator_net::Result<()> {
    let params = match std::env::args().nth(1) {
        Some(path) => HyperParameters::load_json(path)?,
        None => HyperParameters {
            convergence_threshold: 1e-6,
            iteration_max: 20_000,
            learning_rate: 0.5,
        },
    };

    let engine = Engine::new();
    println!("escalator-net {}", escalator_net::version());
    println!(
        "XOR on 2-3-1, learning_rate={} iteration_max={} convergence_threshold={}",
        params.learning_rate, params.iteration_max, params.convergence_threshold
    );

    for activation in ActivationFunction::ALL {
        let options = NetworkOptions::new().seed(42).hyper_parameters(params);
        let handle = engine.create_with(&[2, 3, 1], activation, options)?;
        engine.add_examples(handle, 4, &XOR_INPUTS, &XOR_OUTPUTS)?;

        let started = Instant::now();
        let report = engine.train(handle)?;
        let seconds = started.elapsed().as_secs_f64();

        let predictions = engine.predict_batch(handle, 4, &XOR_INPUTS)?;
        println!();
        println!("{activation}:");
        println!(
            "  {:?} after {} iterations in {:.3}s, cost {:.6}",
            report.stop_reason,
            report.iterations,
            seconds,
            report.final_loss.unwrap_or(f64::NAN),
        );
        for (input, output) in XOR_INPUTS.chunks(2).zip(predictions.iter()) {
            println!("  {input:?} -> {output:.4}");
        }

        engine.delete(handle)?;
    }
    Ok(())
}

fn main() {
    init_logging();
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
