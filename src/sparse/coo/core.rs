//! Core COO implementation: struct, creation, getters

use crate::dtype::{DType, Index};
use crate::error::{Error, Result};
use crate::sparse::validate::{
    check_bounds, check_edge_map, check_index_array, check_index_capacity,
};
use crate::tensor::Tensor;

use super::super::format::{SparseFormat, SparseStorage};

/// COO (Coordinate) sparse relation
///
/// Edge `e` connects source `row[e]` to destination `col[e]`. When an edge
/// map is present, edge `e`'s output lands in row `edge_map[e]`; otherwise in
/// row `e`.
#[derive(Debug, Clone)]
pub struct CooGraph {
    pub(crate) row: Tensor,
    pub(crate) col: Tensor,
    pub(crate) edge_map: Option<Tensor>,
    pub(crate) shape: [usize; 2],
}

impl CooGraph {
    /// Create a new COO relation from index tensors
    ///
    /// # Arguments
    ///
    /// * `row` - 1D tensor of source ids (I32 or I64)
    /// * `col` - 1D tensor of destination ids, same dtype and length as `row`
    /// * `edge_map` - Optional permutation of `[0, nnz)`
    /// * `shape` - `[num_src, num_dst]`
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Arrays have different lengths or dtypes
    /// - Any index is negative or out of bounds
    /// - The edge map is not a permutation
    pub fn new(
        row: Tensor,
        col: Tensor,
        edge_map: Option<Tensor>,
        shape: [usize; 2],
    ) -> Result<Self> {
        let dtype = row.dtype();
        let nnz = row.numel();

        check_index_array(&row, nnz, dtype, "row")?;
        check_index_array(&col, nnz, dtype, "col")?;
        if let Some(map) = &edge_map {
            check_index_array(map, nnz, dtype, "edge_map")?;
        }

        crate::dispatch_index!(dtype, I => {
            check_index_capacity::<I>(&[shape[0], shape[1], nnz])?;
            check_bounds(row.as_slice::<I>()?, shape[0])?;
            check_bounds(col.as_slice::<I>()?, shape[1])?;
            if let Some(map) = &edge_map {
                check_edge_map(map.as_slice::<I>()?, nnz, "COO")?;
            }
        }, "CooGraph::new");

        Ok(Self {
            row,
            col,
            edge_map,
            shape,
        })
    }

    /// Create a COO relation from host slices
    ///
    /// # Arguments
    ///
    /// * `row` - Source ids
    /// * `col` - Destination ids
    /// * `shape` - `[num_src, num_dst]`
    pub fn from_slices<I: Index>(row: &[I], col: &[I], shape: [usize; 2]) -> Result<Self> {
        if row.len() != col.len() {
            return Err(Error::ShapeMismatch {
                expected: vec![row.len()],
                got: vec![col.len()],
            });
        }
        let row = Tensor::from_slice(row, &[row.len()])?;
        let col = Tensor::from_slice(col, &[col.len()])?;
        Self::new(row, col, None, shape)
    }

    /// Create an empty relation with no edges
    pub fn empty(shape: [usize; 2], index_dtype: DType) -> Self {
        Self {
            row: Tensor::zeros(&[0], index_dtype),
            col: Tensor::zeros(&[0], index_dtype),
            edge_map: None,
            shape,
        }
    }

    /// Attach an edge map (logical edge -> output row)
    pub fn with_edge_map<I: Index>(self, edge_map: &[I]) -> Result<Self> {
        let map = Tensor::from_slice(edge_map, &[edge_map.len()])?;
        Self::new(self.row, self.col, Some(map), self.shape)
    }

    /// Returns the source id tensor
    pub fn row(&self) -> &Tensor {
        &self.row
    }

    /// Returns the destination id tensor
    pub fn col(&self) -> &Tensor {
        &self.col
    }

    /// Returns the edge map tensor, if any
    pub fn edge_map(&self) -> Option<&Tensor> {
        self.edge_map.as_ref()
    }
}

impl SparseStorage for CooGraph {
    fn format(&self) -> SparseFormat {
        SparseFormat::Coo
    }

    fn shape(&self) -> [usize; 2] {
        self.shape
    }

    fn nnz(&self) -> usize {
        self.row.numel()
    }

    fn index_dtype(&self) -> DType {
        self.row.dtype()
    }

    fn has_edge_map(&self) -> bool {
        self.edge_map.is_some()
    }

    fn memory_usage(&self) -> usize {
        let arrays = if self.has_edge_map() { 3 } else { 2 };
        self.nnz() * self.index_dtype().size_in_bytes() * arrays
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coo_creation() {
        let coo = CooGraph::from_slices(&[0i64, 0, 1], &[0i64, 1, 1], [2, 2]).unwrap();
        assert_eq!(coo.nnz(), 3);
        assert_eq!(coo.shape(), [2, 2]);
        assert_eq!(coo.index_dtype(), DType::I64);
        assert!(!coo.has_edge_map());
        assert!((coo.density() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_coo_empty() {
        let coo = CooGraph::empty([100, 50], DType::I32);
        assert_eq!(coo.nnz(), 0);
        assert_eq!(coo.num_src(), 100);
        assert_eq!(coo.num_dst(), 50);
        assert!(coo.is_empty());
    }

    #[test]
    fn test_coo_invalid_indices() {
        let result = CooGraph::from_slices(&[0i64, 5], &[0i64, 0], [3, 3]);
        assert!(matches!(
            result,
            Err(Error::IndexOutOfBounds { index: 5, size: 3 })
        ));

        let result = CooGraph::from_slices(&[0i32, 1], &[0i32, 3], [3, 3]);
        assert!(result.is_err());
    }

    #[test]
    fn test_coo_mixed_index_dtypes() {
        let row = Tensor::from_slice(&[0i32, 1], &[2]).unwrap();
        let col = Tensor::from_slice(&[0i64, 1], &[2]).unwrap();
        assert!(matches!(
            CooGraph::new(row, col, None, [2, 2]),
            Err(Error::DTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_coo_edge_map() {
        let coo = CooGraph::from_slices(&[0i32, 0, 1], &[0i32, 1, 1], [2, 2])
            .unwrap()
            .with_edge_map(&[2i32, 0, 1])
            .unwrap();
        assert!(coo.has_edge_map());
        assert_eq!(coo.memory_usage(), 3 * 4 * 3);

        let dup = CooGraph::from_slices(&[0i32, 0, 1], &[0i32, 1, 1], [2, 2])
            .unwrap()
            .with_edge_map(&[1i32, 1, 0]);
        assert!(matches!(dup, Err(Error::InvalidStructure { .. })));
    }

    #[test]
    fn test_coo_float_indices_rejected() {
        let row = Tensor::from_slice(&[0.0f32], &[1]).unwrap();
        let col = Tensor::from_slice(&[0.0f32], &[1]).unwrap();
        assert!(matches!(
            CooGraph::new(row, col, None, [1, 1]),
            Err(Error::UnsupportedDType { .. })
        ));
    }
}
