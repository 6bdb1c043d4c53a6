use serde::{Serialize, Deserialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;

/// Negative-side slope used by `LeakyReLU`.
pub const LEAKY_RELU_ALPHA: f64 = 0.01;

/// Activation applied element-wise by every layer of a network.
///
/// The serialized names match the symbolic keys callers pass in
/// (`"sigmoid"`, `"ReLU"`, `"LeakyReLU"`, `"softplus"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivationFunction {
    #[serde(rename = "sigmoid")]
    Sigmoid,
    #[serde(rename = "ReLU")]
    ReLU,
    #[serde(rename = "LeakyReLU")]
    LeakyReLU,
    #[serde(rename = "softplus")]
    Softplus,
}

impl ActivationFunction {
    pub const ALL: [ActivationFunction; 4] = [
        ActivationFunction::Sigmoid,
        ActivationFunction::ReLU,
        ActivationFunction::LeakyReLU,
        ActivationFunction::Softplus,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ActivationFunction::Sigmoid => "sigmoid",
            ActivationFunction::ReLU => "ReLU",
            ActivationFunction::LeakyReLU => "LeakyReLU",
            ActivationFunction::Softplus => "softplus",
        }
    }

    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => sigmoid(x),
            ActivationFunction::ReLU => if x > 0.0 { x } else { 0.0 },
            ActivationFunction::LeakyReLU => if x > 0.0 { x } else { LEAKY_RELU_ALPHA * x },
            // ln(1 + e^x), rearranged so large |x| neither overflows nor loses precision.
            ActivationFunction::Softplus => x.max(0.0) + (-x.abs()).exp().ln_1p(),
        }
    }

    /// Derivative with respect to the pre-activation `x`.
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => {
                let fx = sigmoid(x);
                fx * (1.0 - fx)
            }
            ActivationFunction::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
            ActivationFunction::LeakyReLU => if x > 0.0 { 1.0 } else { LEAKY_RELU_ALPHA },
            ActivationFunction::Softplus => sigmoid(x),
        }
    }

    /// Half-width of the zero-mean uniform distribution used to initialise
    /// weights feeding a layer with this activation.
    ///
    /// Rectifiers get He scaling (`sqrt(6 / fan_in)`); the saturating
    /// functions get Glorot scaling (`sqrt(6 / (fan_in + fan_out))`).
    pub fn init_limit(&self, fan_in: usize, fan_out: usize) -> f64 {
        match self {
            ActivationFunction::ReLU | ActivationFunction::LeakyReLU => {
                (6.0 / fan_in.max(1) as f64).sqrt()
            }
            ActivationFunction::Sigmoid | ActivationFunction::Softplus => {
                (6.0 / (fan_in + fan_out).max(1) as f64).sqrt()
            }
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl fmt::Display for ActivationFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ActivationFunction {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActivationFunction::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| EngineError::UnknownActivation(s.to_string()))
    }
}
