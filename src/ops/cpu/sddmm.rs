//! CPU implementation of SDDMM operations.

use std::ptr;

use crate::dtype::{DType, Element, Index};
use crate::error::{Error, Result};
use crate::ops::{BroadcastDesc, SddmmFunctor, SddmmOp, SddmmOps, SddmmTargets};
use crate::runtime::cpu::kernels::sddmm::{
    SddmmArgs, SddmmKernel, sddmm_coo_kernel, sddmm_csr_kernel,
};
use crate::runtime::cpu::launch::sddmm_launch_config;
use crate::runtime::cpu::{CpuClient, LaunchEvent};
use crate::sparse::{CooGraph, CsrGraph, SparseFormat, SparseGraph, SparseStorage};
use crate::tensor::Tensor;

/// Index arrays of either encoding, as the kernels consume them
struct GraphArrays<'a> {
    format: SparseFormat,
    shape: [usize; 2],
    nnz: usize,
    index_dtype: DType,
    /// COO sources or CSR row pointers
    row: &'a Tensor,
    col: &'a Tensor,
    edge_map: Option<&'a Tensor>,
}

impl<'a> GraphArrays<'a> {
    fn coo(graph: &'a CooGraph) -> Self {
        Self {
            format: SparseFormat::Coo,
            shape: graph.shape(),
            nnz: graph.nnz(),
            index_dtype: graph.index_dtype(),
            row: graph.row(),
            col: graph.col(),
            edge_map: graph.edge_map(),
        }
    }

    fn csr(graph: &'a CsrGraph) -> Self {
        Self {
            format: SparseFormat::Csr,
            shape: graph.shape(),
            nnz: graph.nnz(),
            index_dtype: graph.index_dtype(),
            row: graph.row_ptrs(),
            col: graph.indices(),
            edge_map: graph.edge_map(),
        }
    }
}

impl SddmmOps for CpuClient {
    fn sddmm_coo(
        &self,
        op: SddmmOp,
        graph: &CooGraph,
        lhs: &Tensor,
        rhs: &Tensor,
        out: &mut Tensor,
        desc: &BroadcastDesc,
        targets: SddmmTargets,
    ) -> Result<LaunchEvent> {
        sddmm_impl(self, op, GraphArrays::coo(graph), lhs, rhs, out, desc, targets)
    }

    fn sddmm_csr(
        &self,
        op: SddmmOp,
        graph: &CsrGraph,
        lhs: &Tensor,
        rhs: &Tensor,
        out: &mut Tensor,
        desc: &BroadcastDesc,
        targets: SddmmTargets,
    ) -> Result<LaunchEvent> {
        sddmm_impl(self, op, GraphArrays::csr(graph), lhs, rhs, out, desc, targets)
    }

    fn sddmm_with_targets(
        &self,
        op: SddmmOp,
        graph: &SparseGraph,
        lhs: &Tensor,
        rhs: &Tensor,
        targets: SddmmTargets,
    ) -> Result<Tensor> {
        let dtype = feature_dtype(op, lhs, rhs)?;
        let lhs_feat: &[usize] = if op.uses_lhs() { lhs.feature_shape() } else { &[] };
        let rhs_feat: &[usize] = if op.uses_rhs() { rhs.feature_shape() } else { &[] };
        let desc = BroadcastDesc::new(op, lhs_feat, rhs_feat)?;

        let mut out_shape = Vec::with_capacity(desc.out_shape().len() + 1);
        out_shape.push(graph.nnz());
        out_shape.extend_from_slice(desc.out_shape());
        let mut out = Tensor::zeros(&out_shape, dtype);

        match graph {
            SparseGraph::Coo(g) => self.sddmm_coo(op, g, lhs, rhs, &mut out, &desc, targets)?,
            SparseGraph::Csr(g) => self.sddmm_csr(op, g, lhs, rhs, &mut out, &desc, targets)?,
        };
        Ok(out)
    }
}

/// Element type of the output: the dtype shared by every operand `op` reads
fn feature_dtype(op: SddmmOp, lhs: &Tensor, rhs: &Tensor) -> Result<DType> {
    match (op.uses_lhs(), op.uses_rhs()) {
        (true, true) if lhs.dtype() != rhs.dtype() => Err(Error::DTypeMismatch {
            lhs: lhs.dtype(),
            rhs: rhs.dtype(),
        }),
        (false, _) => Ok(rhs.dtype()),
        _ => Ok(lhs.dtype()),
    }
}

/// Check one operand against its descriptor length and target row count
fn validate_operand(
    name: &'static str,
    t: &Tensor,
    dtype: DType,
    row_len: usize,
    rows: usize,
) -> Result<()> {
    if t.dtype() != dtype {
        return Err(Error::DTypeMismatch {
            lhs: t.dtype(),
            rhs: dtype,
        });
    }
    if t.ndim() == 0 || t.leading_dim() != rows || t.row_len() != row_len {
        let mut expected = vec![rows];
        if row_len != 1 {
            expected.push(row_len);
        }
        return Err(Error::InvalidArgument {
            arg: name,
            reason: format!(
                "shape {:?} does not match {:?} (rows x features)",
                t.shape(),
                expected
            ),
        });
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn sddmm_impl(
    client: &CpuClient,
    op: SddmmOp,
    graph: GraphArrays<'_>,
    lhs: &Tensor,
    rhs: &Tensor,
    out: &mut Tensor,
    desc: &BroadcastDesc,
    targets: SddmmTargets,
) -> Result<LaunchEvent> {
    let dtype = out.dtype();
    let nnz = graph.nnz;

    if op.uses_lhs() {
        let rows = targets.lhs.num_rows(graph.shape, nnz);
        validate_operand("lhs", lhs, dtype, desc.lhs_len(), rows)?;
    }
    if op.uses_rhs() {
        let rows = targets.rhs.num_rows(graph.shape, nnz);
        validate_operand("rhs", rhs, dtype, desc.rhs_len(), rows)?;
    }
    if !desc.use_bcast() {
        let window = desc.out_len() * desc.reduce_size();
        if (op.uses_lhs() && window > desc.lhs_len()) || (op.uses_rhs() && window > desc.rhs_len())
        {
            return Err(Error::InvalidArgument {
                arg: "desc",
                reason: format!(
                    "{} positions of width {} do not fit operands of {} and {} elements",
                    desc.out_len(),
                    desc.reduce_size(),
                    desc.lhs_len(),
                    desc.rhs_len()
                ),
            });
        }
    }
    let expected = nnz * desc.out_len();
    if out.numel() != expected {
        return Err(Error::shape_mismatch(&[nnz, desc.out_len()], out.shape()));
    }

    if expected == 0 {
        log::debug!("sddmm {op}: empty problem (E={nnz}, out_len={})", desc.out_len());
        return Ok(client.record_event());
    }

    crate::dispatch_dtype!(dtype, T => {
        crate::dispatch_index!(graph.index_dtype, I => {
            crate::dispatch_sddmm_op!(op, Op => {
                launch_typed::<T, I, Op>(client, op, &graph, lhs, rhs, out, desc, targets)
            })
        }, "sddmm")
    }, "sddmm")
}

#[allow(clippy::too_many_arguments)]
fn launch_typed<T: Element, I: Index, Op: SddmmFunctor<T>>(
    client: &CpuClient,
    op: SddmmOp,
    graph: &GraphArrays<'_>,
    lhs: &Tensor,
    rhs: &Tensor,
    out: &mut Tensor,
    desc: &BroadcastDesc,
    targets: SddmmTargets,
) -> Result<LaunchEvent> {
    // Offset tables live until the launch below has completed.
    let tables = desc.use_bcast().then(|| desc.offset_tables());
    let (lhs_off, rhs_off) = match &tables {
        Some(t) => (t.lhs.as_ptr(), t.rhs.as_ptr()),
        None => (ptr::null(), ptr::null()),
    };

    let args = SddmmArgs::<T, I> {
        lhs: if Op::USE_LHS {
            lhs.as_slice::<T>()?.as_ptr()
        } else {
            ptr::null()
        },
        rhs: if Op::USE_RHS {
            rhs.as_slice::<T>()?.as_ptr()
        } else {
            ptr::null()
        },
        out: out.as_mut_slice::<T>()?.as_mut_ptr(),
        row: graph.row.as_slice::<I>()?.as_ptr(),
        col: graph.col.as_slice::<I>()?.as_ptr(),
        edge_map: match graph.edge_map {
            Some(map) => map.as_slice::<I>()?.as_ptr(),
            None => ptr::null(),
        },
        lhs_off,
        rhs_off,
        num_rows: graph.shape[0],
        nnz: graph.nnz,
        lhs_len: desc.lhs_len(),
        rhs_len: desc.rhs_len(),
        out_len: desc.out_len(),
        reduce_size: desc.reduce_size(),
        lhs_target: targets.lhs,
        rhs_target: targets.rhs,
    };

    let kernel = select_kernel::<T, I, Op>(graph.format, tables.is_some(), graph.edge_map.is_some());
    let cfg = sddmm_launch_config(desc.out_len(), graph.nnz, client.limits());
    log::debug!(
        "sddmm {} on {}: {}, E={}, out_len={}, reduce={}, bcast={}, edge_map={}, grid {}x{}, group {}x{}",
        op,
        graph.format,
        T::DTYPE,
        graph.nnz,
        desc.out_len(),
        desc.reduce_size(),
        tables.is_some(),
        graph.edge_map.is_some(),
        cfg.grid.x,
        cfg.grid.y,
        cfg.group.x,
        cfg.group.y
    );

    let event = client.launch(&cfg, |unit| unsafe { kernel(&args, unit) })?;
    drop(tables);
    Ok(event)
}

/// Pick the specialization for (encoding, broadcast, edge map)
fn select_kernel<T: Element, I: Index, Op: SddmmFunctor<T>>(
    format: SparseFormat,
    bcast: bool,
    edge_map: bool,
) -> SddmmKernel<T, I> {
    match (format, bcast, edge_map) {
        (SparseFormat::Coo, false, false) => sddmm_coo_kernel::<T, I, Op, false, false>,
        (SparseFormat::Coo, false, true) => sddmm_coo_kernel::<T, I, Op, false, true>,
        (SparseFormat::Coo, true, false) => sddmm_coo_kernel::<T, I, Op, true, false>,
        (SparseFormat::Coo, true, true) => sddmm_coo_kernel::<T, I, Op, true, true>,
        (SparseFormat::Csr, false, false) => sddmm_csr_kernel::<T, I, Op, false, false>,
        (SparseFormat::Csr, false, true) => sddmm_csr_kernel::<T, I, Op, false, true>,
        (SparseFormat::Csr, true, false) => sddmm_csr_kernel::<T, I, Op, true, false>,
        (SparseFormat::Csr, true, true) => sddmm_csr_kernel::<T, I, Op, true, true>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::SddmmTarget;

    fn features() -> (Tensor, Tensor) {
        (
            Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[2, 2]).unwrap(),
            Tensor::from_slice(&[10.0f32, 20.0, 30.0, 40.0], &[2, 2]).unwrap(),
        )
    }

    #[test]
    fn test_rejects_wrong_output_size() {
        let client = CpuClient::default();
        let graph = CooGraph::from_slices(&[0i32, 0, 1], &[0i32, 1, 1], [2, 2]).unwrap();
        let (lhs, rhs) = features();
        let desc = BroadcastDesc::new(SddmmOp::Mul, &[2], &[2]).unwrap();
        let mut out = Tensor::zeros(&[2, 2], DType::F32);
        let err = client
            .sddmm_coo(SddmmOp::Mul, &graph, &lhs, &rhs, &mut out, &desc, SddmmTargets::default())
            .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_rejects_wrong_row_count() {
        let client = CpuClient::default();
        let graph = CooGraph::from_slices(&[0i32, 0, 1], &[0i32, 1, 2], [2, 3]).unwrap();
        let (lhs, rhs) = features();
        let err = client
            .sddmm(SddmmOp::Add, &SparseGraph::from(graph), &lhs, &rhs)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { arg: "rhs", .. }));
    }

    #[test]
    fn test_rejects_mixed_dtypes() {
        let client = CpuClient::default();
        let graph = SparseGraph::from_coo_slices(&[0i32], &[0i32], [1, 1]).unwrap();
        let lhs = Tensor::from_slice(&[1.0f32], &[1, 1]).unwrap();
        let rhs = Tensor::from_slice(&[1.0f64], &[1, 1]).unwrap();
        let err = client.sddmm(SddmmOp::Mul, &graph, &lhs, &rhs).unwrap_err();
        assert!(matches!(err, Error::DTypeMismatch { .. }));
    }

    #[test]
    fn test_rejects_descriptor_for_other_op() {
        let client = CpuClient::default();
        let graph = CooGraph::from_slices(&[0i32], &[0i32], [1, 1]).unwrap();
        let lhs = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[1, 4]).unwrap();
        let rhs = Tensor::from_slice(&[1.0f32, 2.0], &[1, 2]).unwrap();
        let desc = BroadcastDesc::new(SddmmOp::CopyLhs, &[4], &[2]).unwrap();
        let mut out = Tensor::zeros(&[1, 4], DType::F32);
        let err = client
            .sddmm_coo(SddmmOp::Mul, &graph, &lhs, &rhs, &mut out, &desc, SddmmTargets::default())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { arg: "desc", .. }));
    }

    #[test]
    fn test_empty_graph_skips_launch() {
        let client = CpuClient::default();
        let graph = SparseGraph::empty([2, 2], DType::I64, SparseFormat::Csr);
        let (lhs, rhs) = features();
        let out = client.sddmm(SddmmOp::Dot, &graph, &lhs, &rhs).unwrap();
        assert_eq!(out.shape(), &[0, 1]);
        assert_eq!(client.record_event().seq(), 0);
    }

    #[test]
    fn test_select_kernel_covers_table() {
        type Op = crate::ops::sddmm::functor::Add;
        for format in [SparseFormat::Coo, SparseFormat::Csr] {
            for bcast in [false, true] {
                for map in [false, true] {
                    let _ = select_kernel::<f32, i64, Op>(format, bcast, map);
                }
            }
        }
    }

    #[test]
    fn test_copy_lhs_edge_target() {
        let client = CpuClient::default();
        let graph = SparseGraph::from_coo_slices(&[1i32, 0], &[0i32, 0], [2, 1]).unwrap();
        let edge_feat = Tensor::from_slice(&[7.0f64, 8.0], &[2, 1]).unwrap();
        let targets = SddmmTargets::new(SddmmTarget::Edge, SddmmTarget::Dst);
        let unused = Tensor::zeros(&[0], DType::F64);
        let out = client
            .sddmm_with_targets(SddmmOp::CopyLhs, &graph, &edge_feat, &unused, targets)
            .unwrap();
        assert_eq!(out.to_vec::<f64>().unwrap(), vec![7.0, 8.0]);
    }
}
