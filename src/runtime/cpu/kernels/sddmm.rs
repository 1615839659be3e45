//! SDDMM kernels
//!
//! One call handles one execution unit of a launch. Units walk edges along
//! the grid's y axis and output positions along its x axis with strided
//! loops, so every (edge, position) pair of the problem is written by
//! exactly one unit.
//!
//! The kernels are generic over the element type, the index type, the
//! operator functor, and two const flags:
//! - `BCAST`: read input positions from the offset tables instead of using
//!   the output position directly
//! - `EDGE_MAP`: route each edge to the output row named by the edge map

use std::ptr;

use super::search::binary_search_src;
use crate::dtype::{Element, Index};
use crate::ops::{SddmmFunctor, SddmmTarget};
use crate::runtime::cpu::launch::ExecUnit;

/// Raw operands of one SDDMM launch
///
/// For COO, `row` holds one source per edge. For CSR, `row` holds the
/// `num_rows + 1` row pointers. Pointers for an operand the operator does
/// not read, for an absent edge map, and for offset tables outside the
/// broadcast path may be null.
pub(crate) struct SddmmArgs<T, I> {
    pub lhs: *const T,
    pub rhs: *const T,
    pub out: *mut T,
    pub row: *const I,
    pub col: *const I,
    pub edge_map: *const I,
    pub lhs_off: *const usize,
    pub rhs_off: *const usize,
    pub num_rows: usize,
    pub nnz: usize,
    pub lhs_len: usize,
    pub rhs_len: usize,
    pub out_len: usize,
    pub reduce_size: usize,
    pub lhs_target: SddmmTarget,
    pub rhs_target: SddmmTarget,
}

// SAFETY: units of one launch write disjoint output elements and only read
// the remaining buffers, which outlive the launch.
unsafe impl<T, I> Send for SddmmArgs<T, I> {}
unsafe impl<T, I> Sync for SddmmArgs<T, I> {}

/// Kernel entry point shared by the dispatch table
pub(crate) type SddmmKernel<T, I> = unsafe fn(&SddmmArgs<T, I>, ExecUnit);

/// SDDMM over a COO graph: endpoints are read directly.
///
/// # Safety
///
/// `args` must describe a validated problem: index arrays hold `nnz`
/// in-bounds entries, feature buffers hold enough rows for their target,
/// `out` holds `E * out_len` elements, and offset tables hold `out_len`
/// entries when `BCAST`.
pub(crate) unsafe fn sddmm_coo_kernel<
    T: Element,
    I: Index,
    Op: SddmmFunctor<T>,
    const BCAST: bool,
    const EDGE_MAP: bool,
>(
    args: &SddmmArgs<T, I>,
    unit: ExecUnit,
) {
    let mut e = unit.global_y();
    let stride = unit.stride_y();
    while e < args.nnz {
        let src = (*args.row.add(e)).as_usize();
        let dst = (*args.col.add(e)).as_usize();
        edge::<T, I, Op, BCAST, EDGE_MAP>(args, &unit, e, src, dst);
        e += stride;
    }
}

/// SDDMM over a CSR graph: the source is recovered by binary search.
///
/// # Safety
///
/// Same contract as [`sddmm_coo_kernel`], with `row` holding
/// `num_rows + 1` valid row pointers.
pub(crate) unsafe fn sddmm_csr_kernel<
    T: Element,
    I: Index,
    Op: SddmmFunctor<T>,
    const BCAST: bool,
    const EDGE_MAP: bool,
>(
    args: &SddmmArgs<T, I>,
    unit: ExecUnit,
) {
    let row_ptrs = std::slice::from_raw_parts(args.row, args.num_rows + 1);
    let mut e = unit.global_y();
    let stride = unit.stride_y();
    while e < args.nnz {
        let src = binary_search_src(row_ptrs, e);
        let dst = (*args.col.add(e)).as_usize();
        edge::<T, I, Op, BCAST, EDGE_MAP>(args, &unit, e, src, dst);
        e += stride;
    }
}

#[inline(always)]
unsafe fn edge<T: Element, I: Index, Op: SddmmFunctor<T>, const BCAST: bool, const EDGE_MAP: bool>(
    args: &SddmmArgs<T, I>,
    unit: &ExecUnit,
    e: usize,
    src: usize,
    dst: usize,
) {
    let eid = if EDGE_MAP {
        (*args.edge_map.add(e)).as_usize()
    } else {
        e
    };

    let lhs_base = if Op::USE_LHS {
        args.lhs
            .add(args.lhs_target.select(src, eid, dst) * args.lhs_len)
    } else {
        ptr::null()
    };
    let rhs_base = if Op::USE_RHS {
        args.rhs
            .add(args.rhs_target.select(src, eid, dst) * args.rhs_len)
    } else {
        ptr::null()
    };
    let out_row = args.out.add(eid * args.out_len);

    let mut p = unit.global_x();
    let stride = unit.stride_x();
    while p < args.out_len {
        let (lhs_pos, rhs_pos) = if BCAST {
            (*args.lhs_off.add(p), *args.rhs_off.add(p))
        } else {
            (p, p)
        };
        let lhs = if Op::USE_LHS {
            lhs_base.add(lhs_pos * args.reduce_size)
        } else {
            lhs_base
        };
        let rhs = if Op::USE_RHS {
            rhs_base.add(rhs_pos * args.reduce_size)
        } else {
            rhs_base
        };
        *out_row.add(p) = Op::call(lhs, rhs, args.reduce_size);
        p += stride;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::sddmm::functor;
    use crate::runtime::cpu::launch::{Dim2, LaunchConfig};

    fn run(kernel: SddmmKernel<f32, i32>, args: &SddmmArgs<f32, i32>, cfg: LaunchConfig) {
        for gy in 0..cfg.grid.y {
            for gx in 0..cfg.grid.x {
                for ty in 0..cfg.group.y {
                    for tx in 0..cfg.group.x {
                        let unit = ExecUnit {
                            group: Dim2::new(gx, gy),
                            thread: Dim2::new(tx, ty),
                            group_dim: cfg.group,
                            grid_dim: cfg.grid,
                        };
                        unsafe { kernel(args, unit) };
                    }
                }
            }
        }
    }

    fn args<'a>(
        lhs: &'a [f32],
        rhs: &'a [f32],
        out: &'a mut [f32],
        row: &'a [i32],
        col: &'a [i32],
        num_rows: usize,
    ) -> SddmmArgs<f32, i32> {
        SddmmArgs {
            lhs: lhs.as_ptr(),
            rhs: rhs.as_ptr(),
            out: out.as_mut_ptr(),
            row: row.as_ptr(),
            col: col.as_ptr(),
            edge_map: ptr::null(),
            lhs_off: ptr::null(),
            rhs_off: ptr::null(),
            num_rows,
            nnz: col.len(),
            lhs_len: 2,
            rhs_len: 2,
            out_len: 2,
            reduce_size: 1,
            lhs_target: SddmmTarget::Src,
            rhs_target: SddmmTarget::Dst,
        }
    }

    const LHS: [f32; 4] = [1.0, 2.0, 3.0, 4.0];
    const RHS: [f32; 4] = [10.0, 20.0, 30.0, 40.0];
    const EXPECTED: [f32; 6] = [10.0, 40.0, 30.0, 80.0, 90.0, 160.0];

    #[test]
    fn test_coo_kernel_mul() {
        let mut out = [0.0f32; 6];
        let a = args(&LHS, &RHS, &mut out, &[0, 0, 1], &[0, 1, 1], 2);
        // one unit per group forces the strided loops to do all the work
        let cfg = LaunchConfig::new(Dim2::new(1, 1), Dim2::new(1, 1));
        run(
            sddmm_coo_kernel::<f32, i32, functor::Mul, false, false>,
            &a,
            cfg,
        );
        assert_eq!(out, EXPECTED);
    }

    #[test]
    fn test_csr_kernel_mul() {
        let mut out = [0.0f32; 6];
        let a = args(&LHS, &RHS, &mut out, &[0, 2, 3], &[0, 1, 1], 2);
        let cfg = LaunchConfig::new(Dim2::new(1, 2), Dim2::new(2, 1));
        run(
            sddmm_csr_kernel::<f32, i32, functor::Mul, false, false>,
            &a,
            cfg,
        );
        assert_eq!(out, EXPECTED);
    }

    #[test]
    fn test_kernel_edge_map_routes_rows() {
        let mut out = [0.0f32; 6];
        let map = [2i32, 0, 1];
        let mut a = args(&LHS, &RHS, &mut out, &[0, 0, 1], &[0, 1, 1], 2);
        a.edge_map = map.as_ptr();
        let cfg = LaunchConfig::new(Dim2::new(1, 1), Dim2::new(2, 2));
        run(
            sddmm_coo_kernel::<f32, i32, functor::Mul, false, true>,
            &a,
            cfg,
        );
        assert_eq!(out, [30.0, 80.0, 90.0, 160.0, 10.0, 40.0]);
    }

    #[test]
    fn test_kernel_copy_rhs_with_null_lhs() {
        let mut out = [0.0f32; 6];
        let mut a = args(&[], &RHS, &mut out, &[0, 0, 1], &[0, 1, 1], 2);
        a.lhs = ptr::null();
        let cfg = LaunchConfig::new(Dim2::new(1, 1), Dim2::new(2, 4));
        run(
            sddmm_coo_kernel::<f32, i32, functor::CopyRhs, false, false>,
            &a,
            cfg,
        );
        assert_eq!(out, [10.0, 20.0, 30.0, 40.0, 30.0, 40.0]);
    }
}
