//! CPU runtime
//!
//! The CPU backend executes launches described in the grid/group model of
//! [`launch`]: groups run in parallel on a rayon pool (sequentially without
//! the `rayon` feature), units within a group run in order. All launches of
//! one client go through a single ordered queue and complete before
//! `launch` returns.

mod client;
mod device;
pub(crate) mod kernels;
pub mod launch;

pub use client::{CpuClient, LaunchEvent, ParallelismConfig};
pub use device::CpuDevice;
pub use kernels::binary_search_src;
pub use launch::{Dim2, ExecUnit, LaunchConfig, LaunchLimits};
