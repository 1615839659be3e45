//! Core CSR implementation: struct, creation, getters

use crate::dtype::{DType, Index};
use crate::error::Result;
use crate::sparse::validate::{
    check_bounds, check_edge_map, check_index_array, check_index_capacity, check_row_ptrs,
};
use crate::tensor::Tensor;

use super::super::format::{SparseFormat, SparseStorage};

/// CSR (Compressed Sparse Row) sparse relation
///
/// Edges of source `i` occupy positions `row_ptrs[i]..row_ptrs[i + 1]`, and
/// `indices[e]` is the destination of edge `e`. The source of an edge is not
/// stored; kernels recover it by binary search over `row_ptrs`.
#[derive(Debug, Clone)]
pub struct CsrGraph {
    pub(crate) row_ptrs: Tensor,
    pub(crate) indices: Tensor,
    pub(crate) edge_map: Option<Tensor>,
    pub(crate) shape: [usize; 2],
}

impl CsrGraph {
    /// Create a new CSR relation from index tensors
    ///
    /// # Arguments
    ///
    /// * `row_ptrs` - Row pointers (length: num_src + 1)
    /// * `indices` - Destination id of each edge
    /// * `edge_map` - Optional permutation of `[0, nnz)`
    /// * `shape` - `[num_src, num_dst]`
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - row_ptrs length != num_src + 1
    /// - row_ptrs does not start at 0, decreases, or does not end at nnz
    /// - any destination id is out of bounds
    /// - index tensors disagree on dtype, or the edge map is not a permutation
    pub fn new(
        row_ptrs: Tensor,
        indices: Tensor,
        edge_map: Option<Tensor>,
        shape: [usize; 2],
    ) -> Result<Self> {
        let [num_src, num_dst] = shape;
        let dtype = row_ptrs.dtype();
        let nnz = indices.numel();

        check_index_array(&row_ptrs, num_src + 1, dtype, "row_ptrs")?;
        check_index_array(&indices, nnz, dtype, "indices")?;
        if let Some(map) = &edge_map {
            check_index_array(map, nnz, dtype, "edge_map")?;
        }

        crate::dispatch_index!(dtype, I => {
            check_index_capacity::<I>(&[num_src + 1, num_dst, nnz])?;
            check_row_ptrs(row_ptrs.as_slice::<I>()?, nnz)?;
            check_bounds(indices.as_slice::<I>()?, num_dst)?;
            if let Some(map) = &edge_map {
                check_edge_map(map.as_slice::<I>()?, nnz, "CSR")?;
            }
        }, "CsrGraph::new");

        Ok(Self {
            row_ptrs,
            indices,
            edge_map,
            shape,
        })
    }

    /// Create a CSR relation from host slices
    pub fn from_slices<I: Index>(row_ptrs: &[I], indices: &[I], shape: [usize; 2]) -> Result<Self> {
        let row_ptrs = Tensor::from_slice(row_ptrs, &[row_ptrs.len()])?;
        let indices = Tensor::from_slice(indices, &[indices.len()])?;
        Self::new(row_ptrs, indices, None, shape)
    }

    /// Create an empty relation with no edges
    pub fn empty(shape: [usize; 2], index_dtype: DType) -> Self {
        // Row pointers are all zeros for an empty relation
        Self {
            row_ptrs: Tensor::zeros(&[shape[0] + 1], index_dtype),
            indices: Tensor::zeros(&[0], index_dtype),
            edge_map: None,
            shape,
        }
    }

    /// Attach an edge map (logical edge -> output row)
    pub fn with_edge_map<I: Index>(self, edge_map: &[I]) -> Result<Self> {
        let map = Tensor::from_slice(edge_map, &[edge_map.len()])?;
        Self::new(self.row_ptrs, self.indices, Some(map), self.shape)
    }

    /// Returns the row pointers tensor
    pub fn row_ptrs(&self) -> &Tensor {
        &self.row_ptrs
    }

    /// Returns the destination id tensor
    pub fn indices(&self) -> &Tensor {
        &self.indices
    }

    /// Returns the edge map tensor, if any
    pub fn edge_map(&self) -> Option<&Tensor> {
        self.edge_map.as_ref()
    }

    /// Returns the number of edges leaving source `row`
    pub fn row_nnz(&self, row: usize) -> Result<usize> {
        crate::dispatch_index!(self.index_dtype(), I => {
            let ptrs = self.row_ptrs.as_slice::<I>()?;
            match (ptrs.get(row), ptrs.get(row + 1)) {
                (Some(start), Some(end)) => Ok(end.as_usize() - start.as_usize()),
                _ => Err(crate::error::Error::IndexOutOfBounds {
                    index: row,
                    size: self.num_src(),
                }),
            }
        }, "CsrGraph::row_nnz")
    }
}

impl SparseStorage for CsrGraph {
    fn format(&self) -> SparseFormat {
        SparseFormat::Csr
    }

    fn shape(&self) -> [usize; 2] {
        self.shape
    }

    fn nnz(&self) -> usize {
        self.indices.numel()
    }

    fn index_dtype(&self) -> DType {
        self.row_ptrs.dtype()
    }

    fn has_edge_map(&self) -> bool {
        self.edge_map.is_some()
    }

    fn memory_usage(&self) -> usize {
        let per_edge = if self.has_edge_map() { 2 } else { 1 };
        let index_size = self.index_dtype().size_in_bytes();
        (self.num_src() + 1) * index_size + self.nnz() * index_size * per_edge
    }
}
