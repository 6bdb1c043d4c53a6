pub mod hyper_parameters;

pub use hyper_parameters::{HyperParameters, Parameter};
