//! COO format conversion: to_csr

use super::CooGraph;
use crate::dtype::Index;
use crate::error::Result;
use crate::sparse::{CsrGraph, SparseStorage};
use crate::tensor::Tensor;

impl CooGraph {
    /// Convert to CSR format
    ///
    /// Edges are grouped by source with a stable counting sort, so edges of
    /// one source keep their relative COO order. Each CSR edge carries the
    /// output row of the COO edge it came from: the resulting edge map is
    /// `coo_edge_map[perm[k]]` (or `perm[k]` when the COO has none), and is
    /// dropped when it is the identity.
    pub fn to_csr(&self) -> Result<CsrGraph> {
        crate::dispatch_index!(self.index_dtype(), I => {
            let row = self.row.as_slice::<I>()?;
            let col = self.col.as_slice::<I>()?;
            let edge_map = match &self.edge_map {
                Some(map) => Some(map.as_slice::<I>()?),
                None => None,
            };

            let parts = group_by_source(row, col, edge_map, self.shape[0]);
            let nnz = self.nnz();
            let row_ptrs = Tensor::from_slice(&parts.row_ptrs, &[parts.row_ptrs.len()])?;
            let indices = Tensor::from_slice(&parts.indices, &[nnz])?;
            let edge_map = if parts.is_identity {
                None
            } else {
                Some(Tensor::from_slice(&parts.edge_map, &[nnz])?)
            };
            CsrGraph::new(row_ptrs, indices, edge_map, self.shape)
        }, "COO to CSR conversion")
    }
}

struct CsrParts<I> {
    row_ptrs: Vec<I>,
    indices: Vec<I>,
    edge_map: Vec<I>,
    is_identity: bool,
}

fn group_by_source<I: Index>(
    row: &[I],
    col: &[I],
    edge_map: Option<&[I]>,
    num_src: usize,
) -> CsrParts<I> {
    let nnz = row.len();

    let mut counts = vec![0usize; num_src + 1];
    for &r in row {
        counts[r.as_usize() + 1] += 1;
    }
    for i in 0..num_src {
        counts[i + 1] += counts[i];
    }
    let row_ptrs: Vec<I> = counts.iter().map(|&c| I::from_usize(c)).collect();

    let mut next = counts;
    let mut indices = vec![I::from_usize(0); nnz];
    let mut out_map = vec![I::from_usize(0); nnz];
    let mut is_identity = true;
    for e in 0..nnz {
        let slot = &mut next[row[e].as_usize()];
        let k = *slot;
        *slot += 1;

        let eid = edge_map.map_or(e, |m| m[e].as_usize());
        indices[k] = col[e];
        out_map[k] = I::from_usize(eid);
        is_identity &= eid == k;
    }

    CsrParts {
        row_ptrs,
        indices,
        edge_map: out_map,
        is_identity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coo_to_csr_sorted_input() {
        let coo = CooGraph::from_slices(&[0i64, 0, 2, 2, 2], &[0i64, 1, 0, 1, 2], [3, 3]).unwrap();
        let csr = coo.to_csr().unwrap();
        assert_eq!(csr.row_ptrs().to_vec::<i64>().unwrap(), vec![0, 2, 2, 5]);
        assert_eq!(csr.indices().to_vec::<i64>().unwrap(), vec![0, 1, 0, 1, 2]);
        assert!(!csr.has_edge_map());
    }

    #[test]
    fn test_coo_to_csr_unsorted_input_records_edge_ids() {
        // edge 0: (1, 0), edge 1: (0, 1), edge 2: (1, 1)
        let coo = CooGraph::from_slices(&[1i32, 0, 1], &[0i32, 1, 1], [2, 2]).unwrap();
        let csr = coo.to_csr().unwrap();
        assert_eq!(csr.row_ptrs().to_vec::<i32>().unwrap(), vec![0, 1, 3]);
        assert_eq!(csr.indices().to_vec::<i32>().unwrap(), vec![1, 0, 1]);
        assert_eq!(
            csr.edge_map().unwrap().to_vec::<i32>().unwrap(),
            vec![1, 0, 2]
        );
    }

    #[test]
    fn test_coo_to_csr_composes_edge_map() {
        let coo = CooGraph::from_slices(&[1i32, 0], &[0i32, 0], [2, 1])
            .unwrap()
            .with_edge_map(&[0i32, 1])
            .unwrap();
        let csr = coo.to_csr().unwrap();
        assert_eq!(csr.edge_map().unwrap().to_vec::<i32>().unwrap(), vec![1, 0]);
    }
}
