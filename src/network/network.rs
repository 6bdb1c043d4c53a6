use rand::{rngs::StdRng, SeedableRng};

use crate::activation::activation::ActivationFunction;
use crate::error::{EngineError, Result};
use crate::layers::dense::Layer;
use crate::math::matrix::Matrix;
use crate::network::state::{LayerState, NetworkState};
use crate::network::topology::Topology;
use crate::optim::sgd::Sgd;
use crate::params::hyper_parameters::{HyperParameters, Parameter};
use crate::train::loop_fn::{forward_all, train_loop};
use crate::train::report::TrainReport;
use crate::train::train_config::TrainConfig;
use crate::train::training_set::{check_finite, check_shape, TrainingSet};

/// Optional settings applied when a network is created.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkOptions {
    /// Seed for weight initialisation; `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Starting hyperparameters; `None` uses the defaults.
    pub hyper_parameters: Option<HyperParameters>,
    /// Initial learning rate, applied on top of `hyper_parameters`.
    pub learning_rate: Option<f64>,
}

impl NetworkOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn hyper_parameters(mut self, params: HyperParameters) -> Self {
        self.hyper_parameters = Some(params);
        self
    }

    pub fn learning_rate(mut self, rate: f64) -> Self {
        self.learning_rate = Some(rate);
        self
    }
}

/// One feedforward multilayer perceptron together with its training data.
///
/// The same activation function is applied by every layer, output included.
#[derive(Debug, Clone)]
pub struct Network {
    topology: Topology,
    activation: ActivationFunction,
    layers: Vec<Layer>,
    hyper_parameters: HyperParameters,
    training_set: TrainingSet,
    seed: Option<u64>,
    iterations_trained: u64,
    last_loss: Option<f64>,
}

impl Network {
    pub fn new(layer_sizes: &[usize], activation: ActivationFunction) -> Result<Network> {
        Network::with_options(layer_sizes, activation, NetworkOptions::default())
    }

    pub fn with_options(
        layer_sizes: &[usize],
        activation: ActivationFunction,
        options: NetworkOptions,
    ) -> Result<Network> {
        let topology = Topology::new(layer_sizes)?;

        let mut hyper_parameters = options.hyper_parameters.unwrap_or_default();
        hyper_parameters.validate()?;
        if let Some(rate) = options.learning_rate {
            hyper_parameters.set(Parameter::LearningRate, rate)?;
        }

        let mut rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let layers = topology
            .layer_shapes()
            .map(|(input_size, size)| Layer::new(size, input_size, activation, &mut rng))
            .collect();

        let training_set = TrainingSet::new(topology.input_width(), topology.output_width());

        Ok(Network {
            topology,
            activation,
            layers,
            hyper_parameters,
            training_set,
            seed: options.seed,
            iterations_trained: 0,
            last_loss: None,
        })
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn activation(&self) -> ActivationFunction {
        self.activation
    }

    pub fn input_width(&self) -> usize {
        self.topology.input_width()
    }

    pub fn output_width(&self) -> usize {
        self.topology.output_width()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn hyper_parameters(&self) -> &HyperParameters {
        &self.hyper_parameters
    }

    pub fn hyperparameter(&self, key: Parameter) -> f64 {
        self.hyper_parameters.get(key)
    }

    pub fn set_hyperparameter(&mut self, key: Parameter, value: f64) -> Result<()> {
        self.hyper_parameters.set(key, value)
    }

    pub fn set_hyperparameter_named(&mut self, key: &str, value: f64) -> Result<()> {
        self.hyper_parameters.set_named(key, value)
    }

    pub fn example_count(&self) -> usize {
        self.training_set.len()
    }

    /// Appends `count` examples from flat row-major buffers.
    pub fn add_examples(&mut self, count: usize, inputs: &[f64], outputs: &[f64]) -> Result<()> {
        self.training_set.push_flat(count, inputs, outputs)
    }

    pub fn add_example(&mut self, input: &[f64], output: &[f64]) -> Result<()> {
        self.add_examples(1, input, output)
    }

    /// Runs gradient descent over every example added so far.
    ///
    /// Examples are kept, so a later call continues from the current weights
    /// over the same (possibly grown) set.
    pub fn train(&mut self) -> TrainReport {
        let config = TrainConfig::from(&self.hyper_parameters);
        let optimizer = Sgd::new(config.learning_rate);
        let report = train_loop(&mut self.layers, &self.training_set, &optimizer, &config);

        if !report.diverged() {
            self.iterations_trained += report.iterations;
            if report.final_loss.is_some() {
                self.last_loss = report.final_loss;
            }
        }
        report
    }

    /// Forward pass of a single row.
    pub fn predict_one(&self, input: &[f64]) -> Result<Vec<f64>> {
        self.predict_batch(1, input)
    }

    /// Forward pass of `count` rows; returns `count * output_width` values, row-major.
    pub fn predict_batch(&self, count: usize, inputs: &[f64]) -> Result<Vec<f64>> {
        check_shape("inputs", count, self.input_width(), inputs.len())?;
        check_finite("inputs", inputs)?;

        let batch = Matrix::from_flat(count, self.input_width(), inputs);
        let traces = forward_all(&self.layers, &batch);
        traces
            .last()
            .map(|trace| trace.activation.to_flat())
            .ok_or_else(|| EngineError::InvalidTopology {
                sizes: self.topology.sizes().to_vec(),
                reason: "network has no layers".to_string(),
            })
    }

    /// Read-only snapshot of everything the network holds.
    pub fn state(&self) -> NetworkState {
        NetworkState {
            version: crate::VERSION.to_string(),
            topology: self.topology.sizes().to_vec(),
            activation: self.activation,
            hyper_parameters: self.hyper_parameters,
            example_count: self.training_set.len(),
            iterations_trained: self.iterations_trained,
            last_loss: self.last_loss,
            seed: self.seed,
            layers: self
                .layers
                .iter()
                .map(|layer| LayerState {
                    input_size: layer.input_size,
                    size: layer.size,
                    weights: layer.weights.data.clone(),
                    biases: layer.biases.to_flat(),
                })
                .collect(),
        }
    }
}
