//! Mukai: truncated cohomology arithmetic on polarized surfaces
//!
//! This crate models the part of the rational cohomology ring of a surface
//! that sheaf invariants live in, truncated to three components
//! `(rank, c1, ch2)`, on a surface whose polarization has self-intersection
//! `d`.
//!
//! # Architecture
//!
//! - [`Scalar`]: exact rational numbers with a float fallback
//! - [`CohomologyClass`]: the ring itself (cup product, inverse, powers)
//! - [`StabilityCondition`]: Mumford and Bridgeland central charges and slopes
//! - [`Sheaf`]: line bundles, ideal sheaves and skyscrapers, with [`chi`] and
//!   [`hom`] built on top of the ring
//! - [`notation`]: text forms such as `O(2)`, `I(1,3)` or `(1,0,-1/2)`

mod class;
pub mod notation;
mod scalar;
mod sheaf;
mod stability;

pub use class::CohomologyClass;
pub use notation::{parse_class, parse_object, parse_sheaf, Object};
pub use scalar::Scalar;
pub use sheaf::{chi, hom, line_bundle_sections, Sheaf};
pub use stability::{ChargeMode, StabilityCondition};

/// Error type for cohomology ring operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CohomologyError {
    #[error("component index {0} out of range (expected 0, 1 or 2)")]
    InvalidIndex(usize),

    #[error("Chern character degree {0} out of range (expected 0, 1 or 2)")]
    InvalidChernDegree(usize),

    #[error("class with rank {0} is not invertible (rank must be 1 or -1)")]
    NotInvertible(Scalar),

    #[error("division by zero: class has rank 0")]
    DivisionByZero,

    #[error("exponent {0} is not an integer")]
    NonIntegerExponent(Scalar),

    #[error("surface degrees differ: {left} vs {right}")]
    DegreeMismatch { left: Scalar, right: Scalar },

    #[error("surface degree must be positive, got {0}")]
    InvalidDegree(Scalar),

    #[error("numeric overflow: {0}")]
    NumericOverflow(String),

    #[error("unsupported operand kind: {0}")]
    UnsupportedOperandKind(String),

    #[error("not implemented: {0}")]
    UnimplementedCase(String),

    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, CohomologyError>;
