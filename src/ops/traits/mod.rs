//! Operation traits.
//!
//! Implementations live in the backend-specific modules (`ops/cpu`).

mod sddmm;

pub use sddmm::SddmmOps;
