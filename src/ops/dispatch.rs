//! DType dispatch utilities
//!
//! This module provides the `dispatch_dtype!` and `dispatch_index!` macros for
//! runtime type dispatch. Dispatch entry points receive dtype-erased tensors
//! and use these macros to pick the monomorphized kernel once per call.
//!
//! # Usage
//!
//! ```ignore
//! fn my_operation(dtype: DType) -> Result<()> {
//!     dispatch_dtype!(dtype, T => {
//!         // T is now a concrete element type (f32, f64, ...)
//!         let size = std::mem::size_of::<T>();
//!         Ok(())
//!     }, "my_operation")
//! }
//! ```
//!
//! ## Supported Types
//!
//! `dispatch_dtype!` (feature elements):
//! - `F64` -> `f64`
//! - `F32` -> `f32`
//! - `F16` -> `half::f16` (requires "f16" feature)
//! - `BF16` -> `half::bf16` (requires "f16" feature)
//! - integer dtypes -> `UnsupportedDType` error
//!
//! `dispatch_index!` (sparse indices):
//! - `I64` -> `i64`
//! - `I32` -> `i32`
//! - float dtypes -> `UnsupportedDType` error

/// Internal helper macro to dispatch types requiring the "f16" feature.
/// Parameterized by type to avoid duplicating macro for F16 vs BF16.
#[macro_export]
#[doc(hidden)]
macro_rules! dispatch_f16_type {
    ($T:ident, $body:block, $dtype:expr, $error_op:expr, $type:ty) => {{
        #[cfg(feature = "f16")]
        {
            type $T = $type;
            $body
        }
        #[cfg(not(feature = "f16"))]
        {
            return Err($crate::error::Error::FeatureRequired {
                dtype: $dtype,
                feature: "f16",
            });
        }
    }};
}

/// Macro for runtime dtype dispatch to typed feature operations.
///
/// Takes a `DType` value and executes a code block with `T` bound to the
/// corresponding element type.
#[macro_export]
macro_rules! dispatch_dtype {
    ($dtype:expr, $T:ident => $body:block, $error_op:expr) => {
        match $dtype {
            $crate::dtype::DType::F64 => {
                type $T = f64;
                $body
            }
            $crate::dtype::DType::F32 => {
                type $T = f32;
                $body
            }
            $crate::dtype::DType::F16 => {
                $crate::dispatch_f16_type!($T, $body, $dtype, $error_op, half::f16)
            }
            $crate::dtype::DType::BF16 => {
                $crate::dispatch_f16_type!($T, $body, $dtype, $error_op, half::bf16)
            }
            $crate::dtype::DType::I64 | $crate::dtype::DType::I32 => {
                return Err($crate::error::Error::UnsupportedDType {
                    dtype: $dtype,
                    op: $error_op,
                })
            }
        }
    };
}

/// Macro for runtime dispatch over sparse index types.
///
/// Takes a `DType` value and executes a code block with `I` bound to `i32`
/// or `i64`.
#[macro_export]
macro_rules! dispatch_index {
    ($dtype:expr, $I:ident => $body:block, $error_op:expr) => {
        match $dtype {
            $crate::dtype::DType::I64 => {
                type $I = i64;
                $body
            }
            $crate::dtype::DType::I32 => {
                type $I = i32;
                $body
            }
            _ => {
                return Err($crate::error::Error::UnsupportedDType {
                    dtype: $dtype,
                    op: $error_op,
                })
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::dtype::DType;
    use crate::error::{Error, Result};

    fn element_size(dtype: DType) -> Result<usize> {
        dispatch_dtype!(dtype, T => {
            Ok(std::mem::size_of::<T>())
        }, "element_size")
    }

    fn index_size(dtype: DType) -> Result<usize> {
        dispatch_index!(dtype, I => {
            Ok(std::mem::size_of::<I>())
        }, "index_size")
    }

    #[test]
    fn test_dispatch_dtype() {
        assert_eq!(element_size(DType::F32).unwrap(), 4);
        assert_eq!(element_size(DType::F64).unwrap(), 8);
        assert!(matches!(
            element_size(DType::I64),
            Err(Error::UnsupportedDType { .. })
        ));
    }

    #[cfg(not(feature = "f16"))]
    #[test]
    fn test_dispatch_dtype_feature_gated() {
        assert!(matches!(
            element_size(DType::F16),
            Err(Error::FeatureRequired { feature: "f16", .. })
        ));
    }

    #[test]
    fn test_dispatch_index() {
        assert_eq!(index_size(DType::I32).unwrap(), 4);
        assert_eq!(index_size(DType::I64).unwrap(), 8);
        assert!(index_size(DType::F32).is_err());
    }
}
