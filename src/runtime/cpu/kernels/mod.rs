//! Low-level CPU kernels
//!
//! Kernels take raw pointers and trust their caller: every shape, bound and
//! structure check happens in the dispatch layer before a launch.

pub(crate) mod sddmm;
pub(crate) mod search;

pub use search::binary_search_src;
