//! Error types for edgewise

use crate::dtype::DType;
use thiserror::Error;

/// Result type alias using edgewise's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur before or during an SDDMM dispatch
///
/// Every variant is raised on the host before any parallel work is issued.
/// Kernels themselves have no failure path.
#[derive(Error, Debug)]
pub enum Error {
    /// Shape mismatch in an operation
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape
        got: Vec<usize>,
    },

    /// Feature shapes cannot be broadcast together
    #[error("Cannot broadcast feature shapes {lhs:?} and {rhs:?}")]
    BroadcastError {
        /// Left-hand side feature shape
        lhs: Vec<usize>,
        /// Right-hand side feature shape
        rhs: Vec<usize>,
    },

    /// Unsupported dtype for an operation
    #[error("Unsupported dtype {dtype:?} for operation '{op}'")]
    UnsupportedDType {
        /// The unsupported dtype
        dtype: DType,
        /// The operation name
        op: &'static str,
    },

    /// DType mismatch between operands
    #[error("DType mismatch: {lhs:?} vs {rhs:?}")]
    DTypeMismatch {
        /// Left-hand side dtype
        lhs: DType,
        /// Right-hand side dtype
        rhs: DType,
    },

    /// DType is valid but its cargo feature is disabled
    #[error("DType {dtype:?} requires the '{feature}' feature")]
    FeatureRequired {
        /// The dtype that needs the feature
        dtype: DType,
        /// The missing cargo feature
        feature: &'static str,
    },

    /// Index out of bounds
    #[error("Index {index} out of bounds for dimension of size {size}")]
    IndexOutOfBounds {
        /// The invalid index
        index: usize,
        /// Size of the dimension
        size: usize,
    },

    /// Invalid argument provided to an operation
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Malformed sparse structure (row pointers, edge map)
    #[error("Invalid {format} structure: {reason}")]
    InvalidStructure {
        /// Sparse format name
        format: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// Launch rejected by the execution queue
    #[error("Launch rejected: {reason}")]
    Launch {
        /// Why the geometry was rejected
        reason: String,
    },

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a shape mismatch error
    pub fn shape_mismatch(expected: &[usize], got: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }

    /// Create a broadcast error
    pub fn broadcast(lhs: &[usize], rhs: &[usize]) -> Self {
        Self::BroadcastError {
            lhs: lhs.to_vec(),
            rhs: rhs.to_vec(),
        }
    }

    /// Create an unsupported dtype error
    pub fn unsupported_dtype(dtype: DType, op: &'static str) -> Self {
        Self::UnsupportedDType { dtype, op }
    }

    /// Create an invalid structure error
    pub fn invalid_structure(format: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidStructure {
            format,
            reason: reason.into(),
        }
    }

    /// Create a launch error
    pub fn launch(reason: impl Into<String>) -> Self {
        Self::Launch {
            reason: reason.into(),
        }
    }
}
