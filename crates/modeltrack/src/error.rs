//! Data Model invariant violations.

use thiserror::Error;

/// A value or container failed construction because it would violate one
/// of the Data Model invariants.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{kind} name must not be empty")]
    EmptyName { kind: &'static str },
    #[error("invalid color code {code:?}")]
    InvalidColorCode { code: String },
    #[error("color mix must contain at least one color")]
    EmptyMix,
    #[error("color mix proportion #{index} must be positive, got {value}")]
    NonPositiveProportion { index: usize, value: i64 },
    #[error("color mix proportion exceeds {}", i32::MAX)]
    ProportionOverflow,
    #[error("paint must reference either a color or a color mix, not both")]
    PaintBothDetails,
    #[error("paint must reference a color or a color mix")]
    PaintMissingDetail,
    #[error("decal placement coordinates must be finite")]
    NonFiniteCoordinate,
    #[error("part {part:?} lists the same {what} more than once")]
    DuplicateDetail { part: String, what: &'static str },
    #[error("step must contain at least one part")]
    EmptyStep,
}
