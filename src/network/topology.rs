use serde::{Serialize, Deserialize};
use std::fmt;

use crate::error::{EngineError, Result};

/// Ordered layer sizes, input width first and output width last.
///
/// Always holds at least two entries, none of them zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct Topology {
    sizes: Vec<usize>,
}

impl Topology {
    pub fn new(sizes: &[usize]) -> Result<Topology> {
        if sizes.len() < 2 {
            return Err(EngineError::InvalidTopology {
                sizes: sizes.to_vec(),
                reason: "at least an input and an output layer are required".to_string(),
            });
        }
        if let Some(pos) = sizes.iter().position(|&s| s == 0) {
            return Err(EngineError::InvalidTopology {
                sizes: sizes.to_vec(),
                reason: format!("layer {pos} has no nodes"),
            });
        }
        Ok(Topology { sizes: sizes.to_vec() })
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    pub fn input_width(&self) -> usize {
        self.sizes[0]
    }

    pub fn output_width(&self) -> usize {
        self.sizes[self.sizes.len() - 1]
    }

    /// `(input_size, size)` for every weight layer, input side first.
    pub fn layer_shapes(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.sizes.windows(2).map(|w| (w[0], w[1]))
    }
}

impl TryFrom<Vec<usize>> for Topology {
    type Error = EngineError;

    fn try_from(sizes: Vec<usize>) -> Result<Topology> {
        Topology::new(&sizes)
    }
}

impl From<Topology> for Vec<usize> {
    fn from(topology: Topology) -> Vec<usize> {
        topology.sizes
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.sizes.iter().map(|s| s.to_string()).collect();
        f.write_str(&parts.join("-"))
    }
}
