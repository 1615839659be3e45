//! SDDMM operator catalog
//!
//! [`SddmmOp`] is the closed set of binary operators an SDDMM dispatch can
//! run. Each variant resolves, once per dispatch, to a zero-sized functor type
//! implementing [`SddmmFunctor`], so the hot loop is monomorphized over the
//! operator and never branches on it.

use crate::dtype::Element;
use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Binary operator applied per edge and output position
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SddmmOp {
    /// lhs + rhs
    Add,
    /// lhs - rhs
    Sub,
    /// lhs * rhs
    Mul,
    /// lhs / rhs
    Div,
    /// Inner product over the last feature axis
    Dot,
    /// lhs, rhs is ignored
    CopyLhs,
    /// rhs, lhs is ignored
    CopyRhs,
}

impl SddmmOp {
    /// All operators, in catalog order
    pub const ALL: [SddmmOp; 7] = [
        SddmmOp::Add,
        SddmmOp::Sub,
        SddmmOp::Mul,
        SddmmOp::Div,
        SddmmOp::Dot,
        SddmmOp::CopyLhs,
        SddmmOp::CopyRhs,
    ];

    /// Whether the operator reads the lhs operand
    #[inline]
    pub const fn uses_lhs(self) -> bool {
        !matches!(self, SddmmOp::CopyRhs)
    }

    /// Whether the operator reads the rhs operand
    #[inline]
    pub const fn uses_rhs(self) -> bool {
        !matches!(self, SddmmOp::CopyLhs)
    }

    /// Whether the operator reduces over the last feature axis
    #[inline]
    pub const fn is_reduction(self) -> bool {
        matches!(self, SddmmOp::Dot)
    }

    /// Whether the operator copies one side through unchanged
    #[inline]
    pub const fn is_copy(self) -> bool {
        matches!(self, SddmmOp::CopyLhs | SddmmOp::CopyRhs)
    }

    /// Operator name as accepted by [`FromStr`]
    pub const fn name(self) -> &'static str {
        match self {
            SddmmOp::Add => "add",
            SddmmOp::Sub => "sub",
            SddmmOp::Mul => "mul",
            SddmmOp::Div => "div",
            SddmmOp::Dot => "dot",
            SddmmOp::CopyLhs => "copy_lhs",
            SddmmOp::CopyRhs => "copy_rhs",
        }
    }
}

impl fmt::Display for SddmmOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SddmmOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        SddmmOp::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| Error::InvalidArgument {
                arg: "op",
                reason: format!("unknown SDDMM operator '{s}'"),
            })
    }
}

/// Which entity indexes an operand's feature buffer
///
/// The default pairing is lhs = `Src`, rhs = `Dst`: per-source features
/// combined with per-destination features.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SddmmTarget {
    /// Indexed by source entity (leading dim N)
    Src,
    /// Indexed by output edge id (leading dim E)
    Edge,
    /// Indexed by destination entity (leading dim M)
    Dst,
}

impl SddmmTarget {
    /// Pick the row id this target reads for one edge
    #[inline(always)]
    pub fn select(self, src: usize, eid: usize, dst: usize) -> usize {
        match self {
            SddmmTarget::Src => src,
            SddmmTarget::Edge => eid,
            SddmmTarget::Dst => dst,
        }
    }

    /// Number of rows the operand must have, given `[N, M]` and `E`
    #[inline]
    pub fn num_rows(self, shape: [usize; 2], nnz: usize) -> usize {
        match self {
            SddmmTarget::Src => shape[0],
            SddmmTarget::Edge => nnz,
            SddmmTarget::Dst => shape[1],
        }
    }
}

/// Operand placement for one SDDMM call
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SddmmTargets {
    /// Entity the lhs features are indexed by
    pub lhs: SddmmTarget,
    /// Entity the rhs features are indexed by
    pub rhs: SddmmTarget,
}

impl SddmmTargets {
    /// Create a target pair
    pub const fn new(lhs: SddmmTarget, rhs: SddmmTarget) -> Self {
        Self { lhs, rhs }
    }
}

impl Default for SddmmTargets {
    fn default() -> Self {
        Self::new(SddmmTarget::Src, SddmmTarget::Dst)
    }
}

/// Compiled form of an operator
///
/// `call` consumes a window of `len` contiguous elements from each side
/// (`len == 1` for elementwise operators).
pub trait SddmmFunctor<T: Element>: Send + Sync + 'static {
    /// Whether `call` dereferences `lhs`
    const USE_LHS: bool;
    /// Whether `call` dereferences `rhs`
    const USE_RHS: bool;

    /// Compute one output element.
    ///
    /// # Safety
    ///
    /// - If `USE_LHS`, `lhs` must be valid for reads of `len` elements
    /// - If `USE_RHS`, `rhs` must be valid for reads of `len` elements
    /// - An unused side may be null and is never read
    unsafe fn call(lhs: *const T, rhs: *const T, len: usize) -> T;
}

/// Zero-sized functor types, one per [`SddmmOp`] variant
pub mod functor {
    use super::SddmmFunctor;
    use crate::dtype::Element;

    macro_rules! elementwise_functor {
        ($name:ident, $op:tt) => {
            #[doc = concat!("Elementwise `lhs ", stringify!($op), " rhs`")]
            #[derive(Copy, Clone, Debug, Default)]
            pub struct $name;

            impl<T: Element> SddmmFunctor<T> for $name {
                const USE_LHS: bool = true;
                const USE_RHS: bool = true;

                #[inline(always)]
                unsafe fn call(lhs: *const T, rhs: *const T, _len: usize) -> T {
                    *lhs $op *rhs
                }
            }
        };
    }

    elementwise_functor!(Add, +);
    elementwise_functor!(Sub, -);
    elementwise_functor!(Mul, *);
    elementwise_functor!(Div, /);

    /// Windowed inner product
    #[derive(Copy, Clone, Debug, Default)]
    pub struct Dot;

    impl<T: Element> SddmmFunctor<T> for Dot {
        const USE_LHS: bool = true;
        const USE_RHS: bool = true;

        #[inline(always)]
        unsafe fn call(lhs: *const T, rhs: *const T, len: usize) -> T {
            let mut acc = T::zero();
            for i in 0..len {
                acc = acc + *lhs.add(i) * *rhs.add(i);
            }
            acc
        }
    }

    /// Pass the lhs element through
    #[derive(Copy, Clone, Debug, Default)]
    pub struct CopyLhs;

    impl<T: Element> SddmmFunctor<T> for CopyLhs {
        const USE_LHS: bool = true;
        const USE_RHS: bool = false;

        #[inline(always)]
        unsafe fn call(lhs: *const T, _rhs: *const T, _len: usize) -> T {
            *lhs
        }
    }

    /// Pass the rhs element through
    #[derive(Copy, Clone, Debug, Default)]
    pub struct CopyRhs;

    impl<T: Element> SddmmFunctor<T> for CopyRhs {
        const USE_LHS: bool = false;
        const USE_RHS: bool = true;

        #[inline(always)]
        unsafe fn call(_lhs: *const T, rhs: *const T, _len: usize) -> T {
            *rhs
        }
    }
}

/// Resolve an [`SddmmOp`] to its functor type.
///
/// Executes the body with `$Op` bound to the matching type from
/// [`functor`](crate::ops::sddmm::functor).
#[macro_export]
macro_rules! dispatch_sddmm_op {
    ($op:expr, $Op:ident => $body:block) => {
        match $op {
            $crate::ops::SddmmOp::Add => {
                type $Op = $crate::ops::sddmm::functor::Add;
                $body
            }
            $crate::ops::SddmmOp::Sub => {
                type $Op = $crate::ops::sddmm::functor::Sub;
                $body
            }
            $crate::ops::SddmmOp::Mul => {
                type $Op = $crate::ops::sddmm::functor::Mul;
                $body
            }
            $crate::ops::SddmmOp::Div => {
                type $Op = $crate::ops::sddmm::functor::Div;
                $body
            }
            $crate::ops::SddmmOp::Dot => {
                type $Op = $crate::ops::sddmm::functor::Dot;
                $body
            }
            $crate::ops::SddmmOp::CopyLhs => {
                type $Op = $crate::ops::sddmm::functor::CopyLhs;
                $body
            }
            $crate::ops::SddmmOp::CopyRhs => {
                type $Op = $crate::ops::sddmm::functor::CopyRhs;
                $body
            }
        }
    };
}
