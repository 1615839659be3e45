//! Sparse relation support for edgewise
//!
//! A sparse relation (graph) connects N source entities to M destination
//! entities through E edges. SDDMM reads it to find, for every edge, which
//! source and destination feature rows to combine.
//!
//! # Sparse Formats
//!
//! - **COO** (Coordinate): explicit `(row[e], col[e])` per edge. Endpoint
//!   lookup is a direct read.
//!
//! - **CSR** (Compressed Sparse Row): `row_ptrs[N + 1]` plus `indices[E]`,
//!   edges grouped by source. The source of an edge is recovered by binary
//!   search over the row pointers.
//!
//! Both formats accept an optional edge map: a permutation giving the output
//! row of every logical edge.
//!
//! # Usage
//!
//! ```
//! use edgewise::sparse::{CooGraph, SparseGraph, SparseStorage};
//!
//! let coo = CooGraph::from_slices(&[0i64, 0, 1], &[0i64, 1, 1], [2, 2])?;
//! let csr = coo.to_csr()?;
//! assert_eq!(csr.nnz(), 3);
//!
//! let graph = SparseGraph::from(csr);
//! assert_eq!(graph.shape(), [2, 2]);
//! # Ok::<(), edgewise::error::Error>(())
//! ```
//!
//! Index arrays are `I32` or `I64`; all arrays of one graph share a dtype.
//! Construction validates structure up front so kernels never have to.

mod coo;
mod csr;
mod format;
mod graph;
pub(crate) mod validate;

pub use coo::CooGraph;
pub use csr::CsrGraph;
pub use format::{SparseFormat, SparseStorage};
pub use graph::SparseGraph;
