//! Data type system for edgewise buffers
//!
//! `DType` is the runtime tag carried by every [`Tensor`](crate::tensor::Tensor).
//! Feature buffers use the floating point variants; sparse index arrays use
//! `I32` or `I64`. The [`Element`] and [`Index`] traits connect these tags to
//! concrete Rust types, and the `dispatch_dtype!` / `dispatch_index!` macros
//! go the other way at dispatch time.

mod element;

pub use element::{Element, Index, Scalar};

use std::fmt;

/// Element type of a buffer
///
/// # Discriminant Values
///
/// - Floats: 0-9 (F64=0, F32=1, F16=2, BF16=3)
/// - Signed ints: 10-19 (I64=10, I32=11)
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DType {
    /// 64-bit floating point
    F64 = 0,
    /// 32-bit floating point (most common)
    F32 = 1,
    /// 16-bit floating point (IEEE 754)
    F16 = 2,
    /// 16-bit brain floating point
    BF16 = 3,
    /// 64-bit signed integer
    I64 = 10,
    /// 32-bit signed integer
    I32 = 11,
}

impl DType {
    /// Size of one element in bytes
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            Self::F64 | Self::I64 => 8,
            Self::F32 | Self::I32 => 4,
            Self::F16 | Self::BF16 => 2,
        }
    }

    /// Returns true if this is a floating point type
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F64 | Self::F32 | Self::F16 | Self::BF16)
    }

    /// Returns true if this dtype can be used for sparse index arrays
    #[inline]
    pub const fn is_index(self) -> bool {
        matches!(self, Self::I64 | Self::I32)
    }

    /// Short name for display (e.g., "f32", "i64")
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::F64 => "f64",
            Self::F32 => "f32",
            Self::F16 => "f16",
            Self::BF16 => "bf16",
            Self::I64 => "i64",
            Self::I32 => "i32",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtype_sizes() {
        assert_eq!(DType::F64.size_in_bytes(), 8);
        assert_eq!(DType::F32.size_in_bytes(), 4);
        assert_eq!(DType::BF16.size_in_bytes(), 2);
        assert_eq!(DType::I32.size_in_bytes(), 4);
    }

    #[test]
    fn test_dtype_classes() {
        assert!(DType::F16.is_float());
        assert!(!DType::F16.is_index());
        assert!(DType::I32.is_index());
        assert!(!DType::I64.is_float());
        assert_eq!(DType::BF16.to_string(), "bf16");
    }
}
