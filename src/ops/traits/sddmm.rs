//! SDDMM operations trait.

use crate::error::Result;
use crate::ops::{BroadcastDesc, SddmmOp, SddmmTargets};
use crate::runtime::cpu::LaunchEvent;
use crate::sparse::{CooGraph, CsrGraph, SparseGraph};
use crate::tensor::Tensor;

/// Sampled dense-dense matrix multiplication over a sparse relation.
///
/// For every edge `e = (src, dst)` of an `[N, M]` relation, combines one
/// row of `lhs` with one row of `rhs` through `op` and writes the result to
/// row `eid` of the output, where `eid` is `edge_map[e]` when the relation
/// carries an edge map and `e` otherwise.
///
/// Feature tensors are `[rows, feature_shape...]`. With the default
/// [`SddmmTargets`], `lhs` has `N` rows indexed by source and `rhs` has `M`
/// rows indexed by destination.
///
/// # Example
///
/// ```
/// use edgewise::prelude::*;
///
/// let client = CpuClient::default();
/// let graph = SparseGraph::from_coo_slices(&[0i32, 0, 1], &[0i32, 1, 1], [2, 2])?;
/// let src = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[2, 2])?;
/// let dst = Tensor::from_slice(&[10.0f32, 20.0, 30.0, 40.0], &[2, 2])?;
///
/// let out = client.sddmm(SddmmOp::Mul, &graph, &src, &dst)?;
/// assert_eq!(out.shape(), &[3, 2]);
/// assert_eq!(out.to_vec::<f32>()?, vec![10.0, 40.0, 30.0, 80.0, 90.0, 160.0]);
/// # Ok::<(), edgewise::error::Error>(())
/// ```
pub trait SddmmOps {
    /// SDDMM over a COO relation into a caller-allocated output.
    ///
    /// # Arguments
    /// * `op` - Operator applied per edge and output position
    /// * `graph` - Sparse relation
    /// * `lhs`, `rhs` - Feature tensors. An operand `op` does not read is
    ///   never touched and may be empty.
    /// * `out` - Output with `E * desc.out_len()` elements, fully overwritten
    /// * `desc` - Broadcast descriptor built for `op` and the feature shapes
    /// * `targets` - Entity indexing each operand
    ///
    /// # Errors
    /// Shape, dtype and geometry problems are reported before any work runs.
    #[allow(clippy::too_many_arguments)]
    fn sddmm_coo(
        &self,
        op: SddmmOp,
        graph: &CooGraph,
        lhs: &Tensor,
        rhs: &Tensor,
        out: &mut Tensor,
        desc: &BroadcastDesc,
        targets: SddmmTargets,
    ) -> Result<LaunchEvent>;

    /// SDDMM over a CSR relation into a caller-allocated output.
    ///
    /// Same contract as [`sddmm_coo`](Self::sddmm_coo). Sources are
    /// recovered from the row pointers, so output for the same edge set is
    /// bit-identical to the COO path.
    #[allow(clippy::too_many_arguments)]
    fn sddmm_csr(
        &self,
        op: SddmmOp,
        graph: &CsrGraph,
        lhs: &Tensor,
        rhs: &Tensor,
        out: &mut Tensor,
        desc: &BroadcastDesc,
        targets: SddmmTargets,
    ) -> Result<LaunchEvent>;

    /// SDDMM with explicit operand targets, allocating the output.
    ///
    /// The output has shape `[E, out_shape...]`, where `out_shape` is the
    /// broadcast feature shape (with a trailing `1` for `Dot`).
    fn sddmm_with_targets(
        &self,
        op: SddmmOp,
        graph: &SparseGraph,
        lhs: &Tensor,
        rhs: &Tensor,
        targets: SddmmTargets,
    ) -> Result<Tensor>;

    /// SDDMM of source features against destination features.
    fn sddmm(&self, op: SddmmOp, graph: &SparseGraph, lhs: &Tensor, rhs: &Tensor) -> Result<Tensor> {
        self.sddmm_with_targets(op, graph, lhs, rhs, SddmmTargets::default())
    }
}
