//! Sparse format definitions and traits

use crate::dtype::DType;

/// Sparse relation storage format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SparseFormat {
    /// Coordinate format (COO)
    ///
    /// Stores explicit (source, destination) pairs, one per edge.
    /// Endpoint lookup: O(1) per edge
    /// Storage: O(2 * nnz)
    Coo,

    /// Compressed Sparse Row (CSR)
    ///
    /// Row pointers + destination indices, edges grouped by source.
    /// Endpoint lookup: O(log nrows) per edge (binary search over row pointers)
    /// Storage: O(nnz + nrows + 1)
    Csr,
}

impl SparseFormat {
    /// Returns true if edges are grouped by source
    #[inline]
    pub fn is_row_major(&self) -> bool {
        matches!(self, SparseFormat::Csr)
    }

    /// Returns the format name as a string
    pub fn name(&self) -> &'static str {
        match self {
            SparseFormat::Coo => "COO",
            SparseFormat::Csr => "CSR",
        }
    }
}

impl std::fmt::Display for SparseFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Trait for sparse relation storage
///
/// A relation connects `num_src` source entities to `num_dst` destination
/// entities through `nnz` edges. Implemented by every format.
pub trait SparseStorage: Sized {
    /// Returns the sparse format type
    fn format(&self) -> SparseFormat;

    /// Returns the shape as [num_src, num_dst]
    fn shape(&self) -> [usize; 2];

    /// Number of source entities (N)
    #[inline]
    fn num_src(&self) -> usize {
        self.shape()[0]
    }

    /// Number of destination entities (M)
    #[inline]
    fn num_dst(&self) -> usize {
        self.shape()[1]
    }

    /// Returns the number of edges (E)
    fn nnz(&self) -> usize;

    /// Returns the dtype shared by all index arrays
    fn index_dtype(&self) -> DType;

    /// Whether a logical-edge to output-row permutation is attached
    fn has_edge_map(&self) -> bool;

    /// Returns the density ratio (fraction of possible edges present)
    #[inline]
    fn density(&self) -> f64 {
        let total = (self.num_src() * self.num_dst()) as f64;
        if total == 0.0 {
            0.0
        } else {
            self.nnz() as f64 / total
        }
    }

    /// Returns true if the relation has no edges
    #[inline]
    fn is_empty(&self) -> bool {
        self.nnz() == 0
    }

    /// Returns the memory usage in bytes (approximate)
    fn memory_usage(&self) -> usize;
}
