//! Broadcast descriptor for SDDMM feature alignment
//!
//! Given the per-entity feature shapes of the two operands, the descriptor
//! records how wide each feature row is, how many output positions an edge
//! produces, and (when the shapes differ) which lhs/rhs block every output
//! position reads.
//!
//! Broadcasting follows the usual right-aligned rules: dimensions are matched
//! from the back, and a size-1 (or missing) dimension is stretched. For
//! [`SddmmOp::Dot`] the last axis is the reduction window and must match on
//! both sides; it is excluded from broadcasting and offsets are counted in
//! units of that window.

use super::sddmm::SddmmOp;
use crate::error::{Error, Result};
use crate::tensor::Shape;

/// Right-aligned broadcast of two shapes, `None` when incompatible
pub fn broadcast_shape(a: &[usize], b: &[usize]) -> Option<Shape> {
    let max_ndim = a.len().max(b.len());
    let mut result = Shape::with_capacity(max_ndim);

    // Iterate from right to left
    for i in 0..max_ndim {
        let a_dim = if i < a.len() { a[a.len() - 1 - i] } else { 1 };
        let b_dim = if i < b.len() { b[b.len() - 1 - i] } else { 1 };

        if a_dim == b_dim || b_dim == 1 {
            result.push(a_dim);
        } else if a_dim == 1 {
            result.push(b_dim);
        } else {
            return None;
        }
    }

    result.reverse();
    Some(result)
}

/// Per-position block offsets into the lhs and rhs feature rows
///
/// Entry `p` is the block index (in units of `reduce_size`) that output
/// position `p` reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetTables {
    /// lhs block offset per output position
    pub lhs: Vec<usize>,
    /// rhs block offset per output position
    pub rhs: Vec<usize>,
}

/// Alignment metadata for one SDDMM call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastDesc {
    use_bcast: bool,
    reduced: bool,
    copy: bool,
    out_len: usize,
    lhs_len: usize,
    rhs_len: usize,
    reduce_size: usize,
    lhs_shape: Shape,
    rhs_shape: Shape,
    out_shape: Shape,
}

impl BroadcastDesc {
    /// Build the descriptor for `op` over the given per-entity feature shapes
    ///
    /// # Errors
    ///
    /// - `BroadcastError` if the shapes cannot be broadcast, or if `Dot`
    ///   operands disagree on (or lack) the last axis
    pub fn new(op: SddmmOp, lhs_shape: &[usize], rhs_shape: &[usize]) -> Result<Self> {
        let lhs_len: usize = lhs_shape.iter().product();
        let rhs_len: usize = rhs_shape.iter().product();

        if op.is_copy() {
            let (out_len, out_shape) = match op {
                SddmmOp::CopyRhs => (rhs_len, Shape::from(rhs_shape)),
                _ => (lhs_len, Shape::from(lhs_shape)),
            };
            return Ok(Self {
                use_bcast: false,
                reduced: false,
                copy: true,
                out_len,
                lhs_len,
                rhs_len,
                reduce_size: 1,
                lhs_shape: Shape::from(lhs_shape),
                rhs_shape: Shape::from(rhs_shape),
                out_shape,
            });
        }

        let (lhs_outer, rhs_outer, reduce_size) = if op.is_reduction() {
            match (lhs_shape.split_last(), rhs_shape.split_last()) {
                (Some((&l, lo)), Some((&r, ro))) if l == r => (lo, ro, l),
                _ => return Err(Error::broadcast(lhs_shape, rhs_shape)),
            }
        } else {
            (lhs_shape, rhs_shape, 1)
        };

        let mut out_shape = broadcast_shape(lhs_outer, rhs_outer)
            .ok_or_else(|| Error::broadcast(lhs_shape, rhs_shape))?;
        let out_len = out_shape.elem_count();
        if op.is_reduction() {
            out_shape.push(1);
        }

        Ok(Self {
            use_bcast: lhs_shape != rhs_shape,
            reduced: op.is_reduction(),
            copy: false,
            out_len,
            lhs_len,
            rhs_len,
            reduce_size,
            lhs_shape: Shape::from(lhs_shape),
            rhs_shape: Shape::from(rhs_shape),
            out_shape,
        })
    }

    /// Descriptor for two operands that both have `len` features per row
    pub fn identity(len: usize) -> Self {
        Self {
            use_bcast: false,
            reduced: false,
            copy: false,
            out_len: len,
            lhs_len: len,
            rhs_len: len,
            reduce_size: 1,
            lhs_shape: Shape::from([len]),
            rhs_shape: Shape::from([len]),
            out_shape: Shape::from([len]),
        }
    }

    /// Force the offset-table path even when the shapes match
    ///
    /// Results are unchanged; only the kernel specialization differs.
    pub fn with_explicit_offsets(mut self) -> Self {
        self.use_bcast = true;
        self
    }

    /// Whether kernels must read the offset tables
    #[inline]
    pub fn use_bcast(&self) -> bool {
        self.use_bcast
    }

    /// Output elements per edge
    #[inline]
    pub fn out_len(&self) -> usize {
        self.out_len
    }

    /// Elements per lhs feature row
    #[inline]
    pub fn lhs_len(&self) -> usize {
        self.lhs_len
    }

    /// Elements per rhs feature row
    #[inline]
    pub fn rhs_len(&self) -> usize {
        self.rhs_len
    }

    /// Width of the window the operator consumes per output element
    #[inline]
    pub fn reduce_size(&self) -> usize {
        self.reduce_size
    }

    /// Per-edge output feature shape
    pub fn out_shape(&self) -> &[usize] {
        self.out_shape.as_slice()
    }

    /// Materialize the per-position offset tables
    ///
    /// Positions are enumerated in row-major order over the broadcast output
    /// shape. A stride of 0 on a side means that axis is broadcast there.
    /// When no broadcasting is needed both tables are the identity.
    pub fn offset_tables(&self) -> OffsetTables {
        if self.copy {
            // Copy operators read one side position-for-position
            let identity: Vec<usize> = (0..self.out_len).collect();
            return OffsetTables {
                lhs: identity.clone(),
                rhs: identity,
            };
        }

        let lhs = outer_dims(&self.lhs_shape, self.reduced);
        let rhs = outer_dims(&self.rhs_shape, self.reduced);
        let out = outer_dims(&self.out_shape, self.reduced);

        let ndim = out.len();
        let lhs_strides = broadcast_strides(lhs, ndim);
        let rhs_strides = broadcast_strides(rhs, ndim);

        let mut tables = OffsetTables {
            lhs: Vec::with_capacity(self.out_len),
            rhs: Vec::with_capacity(self.out_len),
        };

        // Incremental multi-dimensional index, last axis fastest
        let mut index = vec![0usize; ndim];
        let mut lhs_off = 0usize;
        let mut rhs_off = 0usize;
        for _ in 0..self.out_len {
            tables.lhs.push(lhs_off);
            tables.rhs.push(rhs_off);

            for dim in (0..ndim).rev() {
                index[dim] += 1;
                lhs_off += lhs_strides[dim];
                rhs_off += rhs_strides[dim];
                if index[dim] < out[dim] {
                    break;
                }
                index[dim] = 0;
                lhs_off -= out[dim] * lhs_strides[dim];
                rhs_off -= out[dim] * rhs_strides[dim];
            }
        }
        tables
    }
}

/// Dimensions excluding the reduction axis
fn outer_dims(shape: &[usize], drop_last: bool) -> &[usize] {
    match shape.split_last() {
        Some((_, rest)) if drop_last => rest,
        _ => shape,
    }
}

/// Row-major strides of `shape` right-aligned to `ndim` axes, 0 where broadcast
fn broadcast_strides(shape: &[usize], ndim: usize) -> Vec<usize> {
    let mut strides = vec![0usize; ndim];
    let mut stride = 1usize;
    for i in 0..shape.len().min(ndim) {
        let dim = shape[shape.len() - 1 - i];
        let axis = ndim - 1 - i;
        strides[axis] = if dim == 1 { 0 } else { stride };
        stride *= dim;
    }
    strides
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_shape() {
        assert_eq!(broadcast_shape(&[2, 1], &[1, 3]).unwrap().as_slice(), &[2, 3]);
        assert_eq!(broadcast_shape(&[4], &[2, 4]).unwrap().as_slice(), &[2, 4]);
        assert!(broadcast_shape(&[2], &[3]).is_none());
    }

    #[test]
    fn test_matching_shapes_are_identity() {
        let desc = BroadcastDesc::new(SddmmOp::Mul, &[2], &[2]).unwrap();
        assert!(!desc.use_bcast());
        assert_eq!(desc.out_len(), 2);
        assert_eq!(desc.reduce_size(), 1);
        assert_eq!(desc, BroadcastDesc::identity(2));

        let tables = desc.offset_tables();
        assert_eq!(tables.lhs, vec![0, 1]);
        assert_eq!(tables.rhs, vec![0, 1]);
    }

    #[test]
    fn test_outer_product_offsets() {
        let desc = BroadcastDesc::new(SddmmOp::Add, &[2, 1], &[1, 3]).unwrap();
        assert!(desc.use_bcast());
        assert_eq!(desc.out_len(), 6);
        assert_eq!(desc.out_shape(), &[2, 3]);

        let tables = desc.offset_tables();
        assert_eq!(tables.lhs, vec![0, 0, 0, 1, 1, 1]);
        assert_eq!(tables.rhs, vec![0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn test_missing_leading_axis_broadcasts() {
        let desc = BroadcastDesc::new(SddmmOp::Sub, &[3], &[2, 3]).unwrap();
        assert!(desc.use_bcast());
        assert_eq!(desc.lhs_len(), 3);
        assert_eq!(desc.rhs_len(), 6);

        let tables = desc.offset_tables();
        assert_eq!(tables.lhs, vec![0, 1, 2, 0, 1, 2]);
        assert_eq!(tables.rhs, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_dot_reduces_last_axis() {
        let desc = BroadcastDesc::new(SddmmOp::Dot, &[4, 8], &[4, 8]).unwrap();
        assert!(!desc.use_bcast());
        assert_eq!(desc.reduce_size(), 8);
        assert_eq!(desc.out_len(), 4);
        assert_eq!(desc.lhs_len(), 32);
        assert_eq!(desc.out_shape(), &[4, 1]);
    }

    #[test]
    fn test_dot_broadcast_heads() {
        let desc = BroadcastDesc::new(SddmmOp::Dot, &[1, 5], &[3, 5]).unwrap();
        assert!(desc.use_bcast());
        assert_eq!(desc.out_len(), 3);
        assert_eq!(desc.out_shape(), &[3, 1]);

        let tables = desc.offset_tables();
        assert_eq!(tables.lhs, vec![0, 0, 0]);
        assert_eq!(tables.rhs, vec![0, 1, 2]);
    }

    #[test]
    fn test_dot_mismatched_window() {
        let result = BroadcastDesc::new(SddmmOp::Dot, &[4], &[5]);
        assert!(matches!(result, Err(Error::BroadcastError { .. })));
        assert!(BroadcastDesc::new(SddmmOp::Dot, &[], &[]).is_err());
    }

    #[test]
    fn test_incompatible_shapes() {
        let result = BroadcastDesc::new(SddmmOp::Mul, &[2, 3], &[4, 3]);
        assert!(matches!(result, Err(Error::BroadcastError { .. })));
    }

    #[test]
    fn test_copy_ops_follow_their_side() {
        let desc = BroadcastDesc::new(SddmmOp::CopyRhs, &[7], &[2, 2]).unwrap();
        assert!(!desc.use_bcast());
        assert_eq!(desc.out_len(), 4);
        assert_eq!(desc.out_shape(), &[2, 2]);

        let desc = BroadcastDesc::new(SddmmOp::CopyLhs, &[3], &[9]).unwrap();
        assert_eq!(desc.out_len(), 3);
        let tables = desc.with_explicit_offsets().offset_tables();
        assert_eq!(tables.lhs, vec![0, 1, 2]);
    }

    #[test]
    fn test_explicit_offsets_on_matching_shapes() {
        let desc = BroadcastDesc::new(SddmmOp::Dot, &[2, 3], &[2, 3])
            .unwrap()
            .with_explicit_offsets();
        assert!(desc.use_bcast());
        let tables = desc.offset_tables();
        assert_eq!(tables.lhs, vec![0, 1]);
        assert_eq!(tables.rhs, vec![0, 1]);
    }
}
