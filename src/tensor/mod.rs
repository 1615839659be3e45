//! Dense feature buffers
//!
//! `Tensor` is a contiguous, row-major, host-resident buffer tagged with a
//! runtime [`DType`](crate::dtype::DType). It is the minimal dense container
//! the SDDMM dispatch entry points read features from and write edge
//! features into.

mod core;
mod shape;

pub use core::Tensor;
pub use shape::Shape;
