//! Structural validation shared by the sparse formats
//!
//! Everything here runs once, at construction time. Kernels assume a graph
//! that passed these checks and never re-validate per edge.

use crate::dtype::{DType, Index};
use crate::error::{Error, Result};
use crate::tensor::Tensor;

/// Check that `t` is a 1D index tensor of `len` elements with dtype `dtype`
pub(crate) fn check_index_array(
    t: &Tensor,
    len: usize,
    dtype: DType,
    arg: &'static str,
) -> Result<()> {
    if t.dtype() != dtype {
        return Err(Error::DTypeMismatch {
            lhs: dtype,
            rhs: t.dtype(),
        });
    }
    if t.ndim() != 1 {
        return Err(Error::InvalidArgument {
            arg,
            reason: format!("expected a 1D tensor, got {}D", t.ndim()),
        });
    }
    if t.numel() != len {
        return Err(Error::shape_mismatch(&[len], t.shape()));
    }
    Ok(())
}

/// Check that every index lies in `[0, bound)`
pub(crate) fn check_bounds<I: Index>(indices: &[I], bound: usize) -> Result<()> {
    let zero = I::from_usize(0);
    for &idx in indices {
        if idx < zero {
            return Err(Error::InvalidArgument {
                arg: "indices",
                reason: format!("negative index {idx:?}"),
            });
        }
        if idx.as_usize() >= bound {
            return Err(Error::IndexOutOfBounds {
                index: idx.as_usize(),
                size: bound,
            });
        }
    }
    Ok(())
}

/// Check that the edge map is a permutation of `[0, nnz)`
///
/// Each logical edge must own a distinct output row; a repeated target would
/// make two edges write the same memory concurrently.
pub(crate) fn check_edge_map<I: Index>(
    edge_map: &[I],
    nnz: usize,
    format: &'static str,
) -> Result<()> {
    check_bounds(edge_map, nnz)?;
    let mut seen = vec![false; nnz];
    for &eid in edge_map {
        let slot = &mut seen[eid.as_usize()];
        if *slot {
            return Err(Error::invalid_structure(
                format,
                format!("edge map is not a permutation: id {eid:?} appears twice"),
            ));
        }
        *slot = true;
    }
    Ok(())
}

/// Check CSR row pointers: `row_ptrs[0] == 0`, non-decreasing, `row_ptrs[N] == nnz`
pub(crate) fn check_row_ptrs<I: Index>(row_ptrs: &[I], nnz: usize) -> Result<()> {
    let Some((&first, _)) = row_ptrs.split_first() else {
        return Err(Error::invalid_structure("CSR", "row pointers are empty"));
    };
    if first != I::from_usize(0) {
        return Err(Error::invalid_structure(
            "CSR",
            format!("row_ptrs[0] must be 0, got {first:?}"),
        ));
    }
    for (row, pair) in row_ptrs.windows(2).enumerate() {
        if pair[1] < pair[0] {
            return Err(Error::invalid_structure(
                "CSR",
                format!(
                    "row pointers decrease at row {row}: {:?} -> {:?}",
                    pair[0], pair[1]
                ),
            ));
        }
    }
    let last = row_ptrs[row_ptrs.len() - 1];
    if last.as_usize() != nnz {
        return Err(Error::invalid_structure(
            "CSR",
            format!("row_ptrs[N] must equal nnz {nnz}, got {last:?}"),
        ));
    }
    Ok(())
}

/// Check that the index type can address every edge and entity
pub(crate) fn check_index_capacity<I: Index>(counts: &[usize]) -> Result<()> {
    for &n in counts {
        if n > I::max_usize() {
            return Err(Error::InvalidArgument {
                arg: "shape",
                reason: format!("{n} does not fit the {} index type", I::DTYPE),
            });
        }
    }
    Ok(())
}
