use serde::{Serialize, Deserialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{EngineError, Result};

/// The fixed set of training-control keys.
///
/// Parses from, and displays as, the symbolic names callers use
/// (`"convergence_threshold"`, `"iteration_max"`, `"learning_rate"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    ConvergenceThreshold,
    IterationMax,
    LearningRate,
}

impl Parameter {
    pub const ALL: [Parameter; 3] = [
        Parameter::ConvergenceThreshold,
        Parameter::IterationMax,
        Parameter::LearningRate,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Parameter::ConvergenceThreshold => "convergence_threshold",
            Parameter::IterationMax => "iteration_max",
            Parameter::LearningRate => "learning_rate",
        }
    }

    /// Checks `value` against this key's domain.
    pub fn validate(&self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(EngineError::invalid_value(self.name(), value, "must be finite"));
        }
        if value < 0.0 {
            return Err(EngineError::invalid_value(self.name(), value, "must be non-negative"));
        }
        if *self == Parameter::IterationMax {
            if value.fract() != 0.0 {
                return Err(EngineError::invalid_value(self.name(), value, "must be a whole number"));
            }
            // 2^64 and above would saturate in the `u64` field.
            if value >= u64::MAX as f64 {
                return Err(EngineError::invalid_value(self.name(), value, "must be below 2^64"));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Parameter {
    type Err = EngineError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Parameter::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| EngineError::UnknownParameter(s.to_string()))
    }
}

/// Training hyperparameters for one network.
///
/// Any key missing from a JSON document falls back to its default, so
/// `{"learning_rate": 0.5}` is a complete configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HyperParameters {
    /// Training stops once the cost moves less than this across the
    /// convergence window (100 iterations, or `iteration_max` if smaller).
    pub convergence_threshold: f64,
    /// Upper bound on gradient-descent iterations per `train` call.
    pub iteration_max: u64,
    pub learning_rate: f64,
}

impl Default for HyperParameters {
    fn default() -> Self {
        HyperParameters {
            convergence_threshold: 0.01,
            iteration_max: 3_000_000,
            learning_rate: 1.0,
        }
    }
}

impl HyperParameters {
    pub fn get(&self, key: Parameter) -> f64 {
        match key {
            Parameter::ConvergenceThreshold => self.convergence_threshold,
            Parameter::IterationMax => self.iteration_max as f64,
            Parameter::LearningRate => self.learning_rate,
        }
    }

    /// Validates and stores `value`. On error the current value is untouched.
    pub fn set(&mut self, key: Parameter, value: f64) -> Result<()> {
        key.validate(value)?;
        match key {
            Parameter::ConvergenceThreshold => self.convergence_threshold = value,
            Parameter::IterationMax => self.iteration_max = value as u64,
            Parameter::LearningRate => self.learning_rate = value,
        }
        Ok(())
    }

    /// Same as `set`, with the key given by its symbolic name.
    pub fn set_named(&mut self, key: &str, value: f64) -> Result<()> {
        self.set(key.parse()?, value)
    }

    /// Re-checks every value, for instances built from outside input.
    ///
    /// `iteration_max` is valid by construction as a `u64`.
    pub fn validate(&self) -> Result<()> {
        for key in [Parameter::ConvergenceThreshold, Parameter::LearningRate] {
            key.validate(self.get(key))?;
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<HyperParameters> {
        let params: HyperParameters = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    /// Loads hyperparameters from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<HyperParameters> {
        let json = std::fs::read_to_string(path)?;
        HyperParameters::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_key() {
        let params = HyperParameters::default();
        assert_eq!(params.get(Parameter::ConvergenceThreshold), 0.01);
        assert_eq!(params.get(Parameter::IterationMax), 3_000_000.0);
        assert_eq!(params.get(Parameter::LearningRate), 1.0);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn set_named_parses_symbolic_keys() {
        let mut params = HyperParameters::default();
        params.set_named("iteration_max", 5000.0).unwrap();
        params.set_named("learning_rate", 0.5).unwrap();
        assert_eq!(params.iteration_max, 5000);
        assert_eq!(params.learning_rate, 0.5);

        let err = params.set_named("momentum", 0.9).unwrap_err();
        assert!(matches!(err, EngineError::UnknownParameter(ref k) if k == "momentum"));
    }

    #[test]
    fn out_of_domain_values_leave_state_untouched() {
        let mut params = HyperParameters::default();
        for (key, value) in [
            (Parameter::LearningRate, -0.1),
            (Parameter::ConvergenceThreshold, -1e-3),
            (Parameter::IterationMax, 10.5),
            (Parameter::IterationMax, -1.0),
            (Parameter::LearningRate, f64::NAN),
            (Parameter::ConvergenceThreshold, f64::INFINITY),
            (Parameter::IterationMax, u64::MAX as f64),
            (Parameter::IterationMax, 1e30),
        ] {
            assert!(matches!(params.set(key, value), Err(EngineError::InvalidValue { .. })));
        }
        assert_eq!(params, HyperParameters::default());
    }

    #[test]
    fn large_iteration_limits_read_back_unchanged() {
        let mut params = HyperParameters::default();
        let value = (1u64 << 63) as f64;
        params.set(Parameter::IterationMax, value).unwrap();
        assert_eq!(params.iteration_max, 1u64 << 63);
        assert_eq!(params.get(Parameter::IterationMax), value);
    }

    #[test]
    fn json_fills_missing_keys_with_defaults() {
        let params = HyperParameters::from_json_str(r#"{"learning_rate": 0.25}"#).unwrap();
        assert_eq!(params.learning_rate, 0.25);
        assert_eq!(params.iteration_max, 3_000_000);

        assert!(matches!(
            HyperParameters::from_json_str(r#"{"learning_rate": -2.0}"#),
            Err(EngineError::InvalidValue { .. })
        ));
        assert!(matches!(
            HyperParameters::from_json_str(r#"{"momentum": 0.9}"#),
            Err(EngineError::Json(_))
        ));
    }
}
