//! Observation and action spaces.
use serde::{Deserialize, Serialize};

/// Descriptor of the observations or actions of an environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Space {
    /// `n` discrete choices `0..n`.
    Discrete(usize),

    /// A box of real values of the given shape, bounded elementwise.
    Box {
        /// Lower bound of every element.
        low: f32,
        /// Upper bound of every element.
        high: f32,
        /// Shape of the array.
        shape: Vec<usize>,
    },
}

impl Space {
    /// Returns the shape of an element of the space.
    pub fn shape(&self) -> Vec<usize> {
        match self {
            Space::Discrete(_) => vec![],
            Space::Box { shape, .. } => shape.clone(),
        }
    }

    /// Number of scalar values in an element, `1` for discrete spaces.
    pub fn flat_dim(&self) -> usize {
        match self {
            Space::Discrete(_) => 1,
            Space::Box { shape, .. } => shape.iter().product(),
        }
    }
}
