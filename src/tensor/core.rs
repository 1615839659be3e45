//! Core Tensor type

use super::Shape;
use crate::dtype::{DType, Element, Scalar};
use crate::error::{Error, Result};
use std::fmt;

/// Word type backing tensor storage.
///
/// Using `u64` words keeps the buffer 8-byte aligned, which is enough for
/// every dtype the crate supports, so typed views never need to copy.
type Word = u64;
const WORD_BYTES: usize = std::mem::size_of::<Word>();

/// Contiguous, row-major, host-resident n-dimensional buffer
///
/// The element type is erased and tracked by a runtime [`DType`]; typed
/// access goes through [`as_slice`](Self::as_slice) /
/// [`as_mut_slice`](Self::as_mut_slice), which fail with `DTypeMismatch`
/// when the requested type does not match.
///
/// # Example
///
/// ```
/// use edgewise::tensor::Tensor;
///
/// let t = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[2, 2])?;
/// assert_eq!(t.shape(), &[2, 2]);
/// assert_eq!(t.to_vec::<f32>()?, vec![1.0, 2.0, 3.0, 4.0]);
/// # Ok::<(), edgewise::error::Error>(())
/// ```
#[derive(Clone)]
pub struct Tensor {
    words: Vec<Word>,
    shape: Shape,
    dtype: DType,
}

impl Tensor {
    /// Create a tensor from a slice of data
    ///
    /// Returns an error if `data.len()` does not equal the product of the
    /// `shape` dimensions.
    pub fn from_slice<T: Scalar>(data: &[T], shape: &[usize]) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(Error::ShapeMismatch {
                expected: shape.to_vec(),
                got: vec![data.len()],
            });
        }

        let mut tensor = Self::zeros(shape, T::DTYPE);
        tensor.as_mut_slice::<T>()?.copy_from_slice(data);
        Ok(tensor)
    }

    /// Create a zero-filled tensor
    ///
    /// All-zero bytes are a valid zero for every supported dtype.
    pub fn zeros(shape: &[usize], dtype: DType) -> Self {
        let numel: usize = shape.iter().product();
        let bytes = numel * dtype.size_in_bytes();
        Self {
            words: vec![0; bytes.div_ceil(WORD_BYTES)],
            shape: Shape::from(shape),
            dtype,
        }
    }

    /// Create a tensor filled with a single value
    pub fn full<T: Element>(shape: &[usize], value: T) -> Self {
        let mut tensor = Self::zeros(shape, <T as Scalar>::DTYPE);
        if let Ok(view) = tensor.as_mut_slice::<T>() {
            view.fill(value);
        }
        tensor
    }

    /// Get the shape
    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.shape.as_slice()
    }

    /// Get the number of dimensions (rank)
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.ndim()
    }

    /// Get the total number of elements
    #[inline]
    pub fn numel(&self) -> usize {
        self.shape.elem_count()
    }

    /// Get the element type
    #[inline]
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Per-entity feature shape: every dimension after the leading one
    #[inline]
    pub fn feature_shape(&self) -> &[usize] {
        self.shape.trailing()
    }

    /// Number of elements per leading-axis row
    #[inline]
    pub fn row_len(&self) -> usize {
        self.shape.trailing().iter().product()
    }

    /// Size of the leading axis (0 for a scalar tensor)
    #[inline]
    pub fn leading_dim(&self) -> usize {
        self.shape.first().copied().unwrap_or(0)
    }

    /// Borrow the contents as a typed slice
    pub fn as_slice<T: Scalar>(&self) -> Result<&[T]> {
        self.check_dtype::<T>()?;
        let bytes = self.numel() * std::mem::size_of::<T>();
        let raw: &[u8] = bytemuck::cast_slice(&self.words);
        bytemuck::try_cast_slice(&raw[..bytes])
            .map_err(|e| Error::Internal(format!("tensor view failed: {e}")))
    }

    /// Borrow the contents as a mutable typed slice
    pub fn as_mut_slice<T: Scalar>(&mut self) -> Result<&mut [T]> {
        self.check_dtype::<T>()?;
        let bytes = self.numel() * std::mem::size_of::<T>();
        let raw: &mut [u8] = bytemuck::cast_slice_mut(&mut self.words);
        bytemuck::try_cast_slice_mut(&mut raw[..bytes])
            .map_err(|e| Error::Internal(format!("tensor view failed: {e}")))
    }

    /// Copy the contents out into a `Vec`
    pub fn to_vec<T: Scalar>(&self) -> Result<Vec<T>> {
        Ok(self.as_slice::<T>()?.to_vec())
    }

    /// Return a tensor with the same data and a new shape
    pub fn reshape(mut self, shape: &[usize]) -> Result<Self> {
        let numel: usize = shape.iter().product();
        if numel != self.numel() {
            return Err(Error::shape_mismatch(self.shape(), shape));
        }
        self.shape = Shape::from(shape);
        Ok(self)
    }

    /// Reset every element to zero without reallocating
    pub fn fill_zero(&mut self) {
        self.words.fill(0);
    }

    fn check_dtype<T: Scalar>(&self) -> Result<()> {
        if T::DTYPE != self.dtype {
            return Err(Error::DTypeMismatch {
                lhs: self.dtype,
                rhs: T::DTYPE,
            });
        }
        Ok(())
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape)
            .field("dtype", &self.dtype)
            .finish()
    }
}
