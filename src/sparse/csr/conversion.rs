//! CSR format conversion: to_coo

use super::CsrGraph;
use crate::dtype::Index;
use crate::error::Result;
use crate::sparse::{CooGraph, SparseStorage};
use crate::tensor::Tensor;

impl CsrGraph {
    /// Convert to COO format
    ///
    /// Expands the compressed row pointers into explicit source ids. Edge
    /// order and the edge map are preserved, so SDDMM over the result writes
    /// exactly the same output rows.
    pub fn to_coo(&self) -> Result<CooGraph> {
        crate::dispatch_index!(self.index_dtype(), I => {
            let row_ptrs = self.row_ptrs.as_slice::<I>()?;
            let row = expand_row_ptrs(row_ptrs, self.nnz());
            let row = Tensor::from_slice(&row, &[row.len()])?;
            CooGraph::new(row, self.indices.clone(), self.edge_map.clone(), self.shape)
        }, "CSR to COO conversion")
    }
}

/// Expand row pointers into one source id per edge
fn expand_row_ptrs<I: Index>(row_ptrs: &[I], nnz: usize) -> Vec<I> {
    let mut row = Vec::with_capacity(nnz);
    for (src, pair) in row_ptrs.windows(2).enumerate() {
        let count = pair[1].as_usize() - pair[0].as_usize();
        row.extend(std::iter::repeat(I::from_usize(src)).take(count));
    }
    row
}
