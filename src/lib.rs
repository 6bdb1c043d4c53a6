pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod params;
pub mod train;
pub mod engine;
pub mod error;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use layers::dense::Layer;
pub use network::{Network, NetworkOptions, NetworkState, Topology};
pub use params::{HyperParameters, Parameter};
pub use train::{StopReason, TrainReport};
pub use engine::{Engine, NetworkHandle};
pub use error::{EngineError, Result};

/// Engine build version, fixed at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn version() -> &'static str {
    VERSION
}
