//! SparseGraph: runtime-selected sparse format

use crate::dtype::{DType, Index};
use crate::error::Result;

use super::coo::CooGraph;
use super::csr::CsrGraph;
use super::format::{SparseFormat, SparseStorage};

/// Sparse relation with runtime-selected storage format
///
/// SDDMM accepts either encoding; both produce bit-identical output for the
/// same edge set and edge map.
#[derive(Debug, Clone)]
pub enum SparseGraph {
    /// COO (Coordinate) format: O(1) endpoint lookup per edge.
    Coo(CooGraph),

    /// CSR (Compressed Sparse Row) format: compact, sources recovered by
    /// binary search.
    Csr(CsrGraph),
}

impl SparseGraph {
    /// Create a COO graph from edge list slices
    pub fn from_coo_slices<I: Index>(row: &[I], col: &[I], shape: [usize; 2]) -> Result<Self> {
        Ok(SparseGraph::Coo(CooGraph::from_slices(row, col, shape)?))
    }

    /// Create a CSR graph from component slices
    pub fn from_csr_slices<I: Index>(
        row_ptrs: &[I],
        indices: &[I],
        shape: [usize; 2],
    ) -> Result<Self> {
        Ok(SparseGraph::Csr(CsrGraph::from_slices(
            row_ptrs, indices, shape,
        )?))
    }

    /// Create an empty graph in the given format
    pub fn empty(shape: [usize; 2], index_dtype: DType, format: SparseFormat) -> Self {
        match format {
            SparseFormat::Coo => SparseGraph::Coo(CooGraph::empty(shape, index_dtype)),
            SparseFormat::Csr => SparseGraph::Csr(CsrGraph::empty(shape, index_dtype)),
        }
    }

    /// Convert to COO, cloning if already COO
    pub fn to_coo(&self) -> Result<CooGraph> {
        match self {
            SparseGraph::Coo(coo) => Ok(coo.clone()),
            SparseGraph::Csr(csr) => csr.to_coo(),
        }
    }

    /// Convert to CSR, cloning if already CSR
    pub fn to_csr(&self) -> Result<CsrGraph> {
        match self {
            SparseGraph::Coo(coo) => coo.to_csr(),
            SparseGraph::Csr(csr) => Ok(csr.clone()),
        }
    }
}

impl From<CooGraph> for SparseGraph {
    fn from(coo: CooGraph) -> Self {
        SparseGraph::Coo(coo)
    }
}

impl From<CsrGraph> for SparseGraph {
    fn from(csr: CsrGraph) -> Self {
        SparseGraph::Csr(csr)
    }
}

impl SparseStorage for SparseGraph {
    fn format(&self) -> SparseFormat {
        match self {
            SparseGraph::Coo(g) => g.format(),
            SparseGraph::Csr(g) => g.format(),
        }
    }

    fn shape(&self) -> [usize; 2] {
        match self {
            SparseGraph::Coo(g) => g.shape(),
            SparseGraph::Csr(g) => g.shape(),
        }
    }

    fn nnz(&self) -> usize {
        match self {
            SparseGraph::Coo(g) => g.nnz(),
            SparseGraph::Csr(g) => g.nnz(),
        }
    }

    fn index_dtype(&self) -> DType {
        match self {
            SparseGraph::Coo(g) => g.index_dtype(),
            SparseGraph::Csr(g) => g.index_dtype(),
        }
    }

    fn has_edge_map(&self) -> bool {
        match self {
            SparseGraph::Coo(g) => g.has_edge_map(),
            SparseGraph::Csr(g) => g.has_edge_map(),
        }
    }

    fn memory_usage(&self) -> usize {
        match self {
            SparseGraph::Coo(g) => g.memory_usage(),
            SparseGraph::Csr(g) => g.memory_usage(),
        }
    }
}
