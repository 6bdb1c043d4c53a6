use serde::{Serialize, Deserialize};
use std::fmt;

use crate::activation::activation::ActivationFunction;
use crate::error::Result;
use crate::params::hyper_parameters::HyperParameters;

/// Weights and biases of one layer as plain vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerState {
    pub input_size: usize,
    pub size: usize,
    /// `input_size` rows of `size` weights.
    pub weights: Vec<Vec<f64>>,
    pub biases: Vec<f64>,
}

/// Debug snapshot of a network, as returned by `get_state`.
///
/// Meant for people and logs; it is not a persistence format and there is no
/// way to rebuild a network from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkState {
    /// Engine version that produced the snapshot.
    pub version: String,
    pub topology: Vec<usize>,
    pub activation: ActivationFunction,
    pub hyper_parameters: HyperParameters,
    /// Examples accumulated so far.
    pub example_count: usize,
    /// Gradient-descent iterations applied across every `train` call.
    pub iterations_trained: u64,
    /// Cost reported by the most recent successful training run.
    pub last_loss: Option<f64>,
    pub seed: Option<u64>,
    pub layers: Vec<LayerState>,
}

impl NetworkState {
    /// Serializes the snapshot to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for NetworkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let topology: Vec<String> = self.topology.iter().map(|s| s.to_string()).collect();
        writeln!(f, "escalator-net {}", self.version)?;
        writeln!(f, "  topology:   {} ({})", topology.join("-"), self.activation)?;
        writeln!(
            f,
            "  params:     learning_rate={} iteration_max={} convergence_threshold={}",
            self.hyper_parameters.learning_rate,
            self.hyper_parameters.iteration_max,
            self.hyper_parameters.convergence_threshold,
        )?;
        writeln!(f, "  examples:   {}", self.example_count)?;
        match self.last_loss {
            Some(loss) => writeln!(f, "  trained:    {} iterations, loss {:.6}", self.iterations_trained, loss)?,
            None => writeln!(f, "  trained:    {} iterations", self.iterations_trained)?,
        }
        for (i, layer) in self.layers.iter().enumerate() {
            writeln!(f, "  layer {} ({} -> {}):", i, layer.input_size, layer.size)?;
            for row in &layer.weights {
                writeln!(f, "    w {}", format_row(row))?;
            }
            writeln!(f, "    b {}", format_row(&layer.biases))?;
        }
        Ok(())
    }
}

fn format_row(values: &[f64]) -> String {
    let cells: Vec<String> = values.iter().map(|v| format!("{v:>9.4}")).collect();
    format!("[{}]", cells.join(" "))
}
