//! Execution runtimes
//!
//! Only the host CPU is provided. The kernels are written against the
//! grid/group execution model in [`cpu::launch`], so the same geometry and
//! strided loops map directly onto accelerator launches.

pub mod cpu;

/// Compute device a client submits work to
pub trait Device: Clone + Send + Sync + 'static {
    /// Device ordinal
    fn id(&self) -> usize;

    /// Human-readable device name
    fn name(&self) -> String;
}
