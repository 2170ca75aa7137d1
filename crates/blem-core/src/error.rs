//! Error types for the expression network.

use std::fmt;

use thiserror::Error;

/// A tensor or input vector did not have the dimensions the network expects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("shape mismatch for {tensor}: expected {}, got {}", Dims(.expected), Dims(.actual))]
pub struct ShapeError {
    /// Name of the offending tensor (`fc1.weight`, `features`, ...).
    pub tensor: String,
    /// Dimensions the network requires.
    pub expected: Vec<usize>,
    /// Dimensions that were supplied.
    pub actual: Vec<usize>,
}

impl ShapeError {
    /// Creates a new shape error.
    #[must_use]
    pub fn new(tensor: impl Into<String>, expected: &[usize], actual: &[usize]) -> Self {
        Self {
            tensor: tensor.into(),
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }
}

/// Errors raised while building or running the expression network.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Input or weight dimensions do not match the fixed architecture.
    #[error(transparent)]
    Shape(#[from] ShapeError),
    /// A weight file lacks one of the required tensors.
    #[error("missing tensor '{0}'")]
    MissingTensor(String),
    /// The tensor backend failed.
    #[error("tensor operation failed: {0}")]
    Tensor(#[from] candle_core::Error),
}

impl ModelError {
    /// Returns the shape error, if this is one.
    #[must_use]
    pub const fn as_shape(&self) -> Option<&ShapeError> {
        match self {
            Self::Shape(e) => Some(e),
            _ => None,
        }
    }
}

/// Formats dimensions as `[32 x 51]`.
struct Dims<'a>(&'a [usize]);

impl fmt::Display for Dims<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" x ")?;
            }
            write!(f, "{d}")?;
        }
        f.write_str("]")
    }
}
