//! Traits mapping Rust types to DType

use super::DType;
use bytemuck::Pod;
use std::ops::{Add, Div, Mul, Sub};

/// Any type that can live in a [`Tensor`](crate::tensor::Tensor)
///
/// Both feature elements and sparse indices implement this; it only fixes the
/// runtime dtype tag and guarantees safe byte reinterpretation via bytemuck.
pub trait Scalar: Copy + Send + Sync + Pod + 'static {
    /// The corresponding DType for this Rust type
    const DTYPE: DType;
}

/// Trait for feature element types consumed by SDDMM operators
///
/// # Bounds
/// - `Pod` - Safe memory transmutation (bytemuck)
/// - `Add + Sub + Mul + Div` - Operator arithmetic (Output = Self)
/// - `PartialOrd` - Comparisons in tests and reference implementations
pub trait Element:
    Scalar
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + PartialOrd
    + std::fmt::Debug
{
    /// Additive identity, the starting value of windowed reductions
    fn zero() -> Self;
}

/// Trait for sparse index types (row pointers, indices, edge maps)
///
/// Values stored in a validated graph are always non-negative, so the
/// conversions below are plain casts.
pub trait Index: Scalar + Ord + std::fmt::Debug {
    /// Widen to a host offset
    fn as_usize(self) -> usize;

    /// Narrow a host offset to this index type
    fn from_usize(v: usize) -> Self;

    /// Largest representable value as a host offset
    fn max_usize() -> usize;
}

impl Scalar for f64 {
    const DTYPE: DType = DType::F64;
}

impl Scalar for f32 {
    const DTYPE: DType = DType::F32;
}

impl Scalar for i64 {
    const DTYPE: DType = DType::I64;
}

impl Scalar for i32 {
    const DTYPE: DType = DType::I32;
}

impl Element for f64 {
    #[inline]
    fn zero() -> Self {
        0.0
    }
}

impl Element for f32 {
    #[inline]
    fn zero() -> Self {
        0.0
    }
}

// ============================================================================
// 16-bit floating point types (requires "f16" feature)
// ============================================================================

#[cfg(feature = "f16")]
impl Scalar for half::f16 {
    const DTYPE: DType = DType::F16;
}

#[cfg(feature = "f16")]
impl Scalar for half::bf16 {
    const DTYPE: DType = DType::BF16;
}

#[cfg(feature = "f16")]
impl Element for half::f16 {
    #[inline]
    fn zero() -> Self {
        half::f16::ZERO
    }
}

#[cfg(feature = "f16")]
impl Element for half::bf16 {
    #[inline]
    fn zero() -> Self {
        half::bf16::ZERO
    }
}

// ============================================================================
// Index types
// ============================================================================

impl Index for i64 {
    #[inline]
    fn as_usize(self) -> usize {
        self as usize
    }

    #[inline]
    fn from_usize(v: usize) -> Self {
        v as i64
    }

    #[inline]
    fn max_usize() -> usize {
        i64::MAX as usize
    }
}

impl Index for i32 {
    #[inline]
    fn as_usize(self) -> usize {
        self as usize
    }

    #[inline]
    fn from_usize(v: usize) -> Self {
        v as i32
    }

    #[inline]
    fn max_usize() -> usize {
        i32::MAX as usize
    }
}
