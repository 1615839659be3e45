//! SDDMM operations
//!
//! ```text
//! CpuClient
//!   └── implements SddmmOps
//!         ├── sddmm_coo / sddmm_csr  (caller-allocated output)
//!         └── sddmm / sddmm_with_targets (allocating)
//! ```
//!
//! Helper types:
//! - [`SddmmOp`], [`SddmmTarget`], [`SddmmTargets`] select the operator and
//!   how each operand is indexed
//! - [`BroadcastDesc`] aligns output positions with input positions
//! - [`broadcast_shape`] computes the broadcast of two feature shapes

pub mod broadcast;
pub(crate) mod cpu;
pub mod dispatch;
pub mod sddmm;
pub mod traits;

pub use broadcast::{BroadcastDesc, OffsetTables, broadcast_shape};
pub use sddmm::{SddmmFunctor, SddmmOp, SddmmTarget, SddmmTargets};
pub use traits::SddmmOps;
