//! # edgewise
//!
//! **Parallel sampled dense-dense matrix multiplication (SDDMM) over sparse graphs.**
//!
//! For every edge `(src, dst)` of a sparse relation between `N` source and
//! `M` destination entities, edgewise combines a source feature vector and a
//! destination feature vector with a binary operator and writes one output
//! feature vector per edge. This is the edge-wise message computation at the
//! heart of graph neural network layers (attention scores, edge messages).
//!
//! ## Features
//!
//! - **Both encodings**: COO and CSR relations, bit-identical results
//! - **Operators**: add, sub, mul, div, dot, copy_lhs, copy_rhs
//! - **Broadcasting**: feature shapes broadcast NumPy-style per edge
//! - **Edge maps**: write each edge to a caller-chosen output row
//! - **Grid execution**: bounded 2-D launch geometry with strided coverage,
//!   groups run in parallel on rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use edgewise::prelude::*;
//!
//! let client = CpuClient::default();
//! let graph = SparseGraph::from_coo_slices(&[0i64, 0, 1], &[0i64, 1, 1], [2, 2])?;
//! let src = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[2, 2])?;
//! let dst = Tensor::from_slice(&[10.0f32, 20.0, 30.0, 40.0], &[2, 2])?;
//!
//! // one attention logit per edge
//! let scores = client.sddmm(SddmmOp::Dot, &graph, &src, &dst)?;
//! assert_eq!(scores.to_vec::<f32>()?, vec![50.0, 110.0, 250.0]);
//! # Ok::<(), edgewise::error::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `rayon` (default): Multi-threaded execution of launch groups
//! - `f16`: Half-precision floats (F16, BF16)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dtype;
pub mod error;
pub mod ops;
pub mod runtime;
pub mod sparse;
pub mod tensor;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::dtype::DType;
    pub use crate::error::{Error, Result};
    pub use crate::ops::{BroadcastDesc, SddmmOp, SddmmOps, SddmmTarget, SddmmTargets};
    pub use crate::runtime::Device;
    pub use crate::runtime::cpu::{CpuClient, CpuDevice, LaunchEvent, ParallelismConfig};
    pub use crate::sparse::{CooGraph, CsrGraph, SparseFormat, SparseGraph, SparseStorage};
    pub use crate::tensor::Tensor;
}
