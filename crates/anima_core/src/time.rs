//! Time domain abstraction
//!
//! Every node is generic over a single time type used for sampled positions,
//! boundaries, offsets and scale factors alike.

use std::fmt::Debug;
use std::ops::{Add, Mul, Sub};

/// Numeric type usable as a timeline position
///
/// Blanket-implemented for every type with the required operators, so
/// `f32`, `f64` and the signed integers work out of the box.
///
/// Ordering is only required to be partial. For values that compare as
/// unordered (a `NaN` sample) every gate evaluates to false: level-gated
/// nodes stay closed and events never fire.
///
/// Unsigned integers satisfy the bound but overflow whenever a node
/// subtracts a boundary larger than a sampled position, so prefer signed or
/// floating point types.
pub trait TimeValue:
    Copy + PartialOrd + Add<Output = Self> + Sub<Output = Self> + Mul<Output = Self> + Debug + 'static
{
}

impl<T> TimeValue for T where
    T: Copy
        + PartialOrd
        + Add<Output = T>
        + Sub<Output = T>
        + Mul<Output = T>
        + Debug
        + 'static
{
}
