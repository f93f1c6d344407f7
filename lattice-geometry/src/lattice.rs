//! # Lattice points and deltas
//!
//! All codec inputs live on an unsigned integer lattice bounded by an inclusive maximum point.
//! Deltas are the signed, component-wise difference between two lattice points.

use geo::{Coord, coord};
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// A point on the unsigned 32-bit lattice.
pub type LatticePoint = Coord<u32>;

/// A signed difference between two lattice points.
///
/// The difference of two `u32` values needs 33 bits, so this is backed by `i64`.
pub type Delta = Coord<i64>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidBoundsError {
    #[error("Base x ({base}) is larger than max x ({max}).")]
    X { base: u32, max: u32 },
    #[error("Base y ({base}) is larger than max y ({max}).")]
    Y { base: u32, max: u32 },
}

/// The base and max points parameterizing every codec call.
///
/// The base point is the origin the first point of a sequence is differenced against.
/// The max point is the inclusive upper bound of the lattice;
/// all predictions are clamped into `[0, max]`.
///
/// Construction guarantees `base <= max` component-wise,
/// so codec functions never need to check it again.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct CodecBounds {
    base: LatticePoint,
    max: LatticePoint,
}

impl CodecBounds {
    /// Tries to construct codec bounds from a base and max point.
    ///
    /// # Errors
    ///
    /// Fails if either component of `base` is larger than the same component of `max`.
    pub const fn try_new(base: LatticePoint, max: LatticePoint) -> Result<Self, InvalidBoundsError> {
        if base.x > max.x {
            Err(InvalidBoundsError::X {
                base: base.x,
                max: max.x,
            })
        } else if base.y > max.y {
            Err(InvalidBoundsError::Y {
                base: base.y,
                max: max.y,
            })
        } else {
            Ok(Self { base, max })
        }
    }

    /// Constructs codec bounds from a base and max point.
    ///
    /// # Panics
    ///
    /// Panics if `base` is not component-wise less than or equal to `max`.
    /// Use [`CodecBounds::try_new`] when the bounds come from untrusted input.
    pub fn new(base: LatticePoint, max: LatticePoint) -> Self {
        match Self::try_new(base, max) {
            Ok(bounds) => bounds,
            Err(err) => panic!("Invalid codec bounds: {err}"),
        }
    }

    /// Bounds with the base point at the lattice origin.
    pub const fn from_max(max: LatticePoint) -> Self {
        Self {
            base: coord! { x: 0, y: 0 },
            max,
        }
    }

    #[inline]
    pub const fn base(&self) -> LatticePoint {
        self.base
    }

    #[inline]
    pub const fn max(&self) -> LatticePoint {
        self.max
    }
}

impl Display for CodecBounds {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "base ({}, {}) max ({}, {})",
            self.base.x, self.base.y, self.max.x, self.max.y
        )
    }
}

/// Computes `point - reference` component-wise.
#[inline]
pub fn encode_delta(point: LatticePoint, reference: LatticePoint) -> Delta {
    coord! {
        x: i64::from(point.x) - i64::from(reference.x),
        y: i64::from(point.y) - i64::from(reference.y),
    }
}

/// Computes `reference + delta` component-wise,
/// returning `None` if the result falls outside the `u32` lattice.
#[inline]
pub fn checked_decode_delta(delta: Delta, reference: LatticePoint) -> Option<LatticePoint> {
    let x = i64::from(reference.x).checked_add(delta.x)?;
    let y = i64::from(reference.y).checked_add(delta.y)?;
    Some(coord! {
        x: u32::try_from(x).ok()?,
        y: u32::try_from(y).ok()?,
    })
}

/// Computes `reference + delta` component-wise.
///
/// # Panics
///
/// Panics if the result does not fit on the lattice.
/// This cannot happen for deltas produced by [`encode_delta`] against the same reference.
#[inline]
pub fn decode_delta(delta: Delta, reference: LatticePoint) -> LatticePoint {
    checked_decode_delta(delta, reference).unwrap_or_else(|| {
        panic!(
            "Delta ({}, {}) applied to ({}, {}) leaves the lattice",
            delta.x, delta.y, reference.x, reference.y
        )
    })
}

/// Converts a floating point prediction back onto the lattice.
///
/// Each component is truncated toward zero, negative values (and NaN) saturate to 0,
/// and the result is clamped to `max`.
#[inline]
pub(crate) fn clamp_planar(max: LatticePoint, point: Coord<f64>) -> LatticePoint {
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "float to int casts saturate, which is exactly the clamp we want at 0"
    )]
    let (x, y) = (point.x as u32, point.y as u32);
    coord! {
        x: x.min(max.x),
        y: y.min(max.y),
    }
}

/// Clamps a signed prediction into `[0, max]`.
#[inline]
pub(crate) fn clamp_signed(max: LatticePoint, point: Coord<i64>) -> LatticePoint {
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "values are clamped into [0, u32::MAX] first"
    )]
    let clamp = |value: i64, max: u32| value.clamp(0, i64::from(max)) as u32;
    coord! {
        x: clamp(point.x, max.x),
        y: clamp(point.y, max.y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_base_above_max_x() {
        assert_eq!(
            CodecBounds::try_new(coord! { x: 11, y: 0 }, coord! { x: 10, y: 10 }),
            Err(InvalidBoundsError::X { base: 11, max: 10 })
        );
    }

    #[test]
    fn test_bounds_base_above_max_y() {
        assert_eq!(
            CodecBounds::try_new(coord! { x: 0, y: 11 }, coord! { x: 10, y: 10 }),
            Err(InvalidBoundsError::Y { base: 11, max: 10 })
        );
    }

    #[test]
    fn test_bounds_base_equal_to_max() {
        let Ok(bounds) = CodecBounds::try_new(coord! { x: 10, y: 10 }, coord! { x: 10, y: 10 })
        else {
            panic!("Expected base == max to be accepted.")
        };

        assert_eq!(bounds.base(), bounds.max());
    }

    #[test]
    #[should_panic(expected = "Invalid codec bounds")]
    fn test_bounds_new_panics() {
        let _ = CodecBounds::new(coord! { x: 5, y: 5 }, coord! { x: 4, y: 5 });
    }

    #[test]
    fn test_delta_spans_full_lattice() {
        let low = coord! { x: 0, y: u32::MAX };
        let high = coord! { x: u32::MAX, y: 0 };
        let delta = encode_delta(high, low);

        assert_eq!(delta, coord! { x: i64::from(u32::MAX), y: -i64::from(u32::MAX) });
        assert_eq!(decode_delta(delta, low), high);
    }

    #[test]
    fn test_checked_decode_delta_out_of_lattice() {
        assert_eq!(checked_decode_delta(coord! { x: -1, y: 0 }, coord! { x: 0, y: 0 }), None);
        assert_eq!(
            checked_decode_delta(coord! { x: 0, y: 1 }, coord! { x: 0, y: u32::MAX }),
            None
        );
        assert_eq!(
            checked_decode_delta(coord! { x: i64::MAX, y: 0 }, coord! { x: 1, y: 0 }),
            None
        );
    }

    #[test]
    fn test_clamp_planar() {
        let max = coord! { x: 100, y: 100 };

        assert_eq!(clamp_planar(max, coord! { x: 10.9, y: 0.2 }), coord! { x: 10, y: 0 });
        assert_eq!(clamp_planar(max, coord! { x: -3.7, y: 250.0 }), coord! { x: 0, y: 100 });
        assert_eq!(clamp_planar(max, coord! { x: f64::NAN, y: 1.0 }), coord! { x: 0, y: 1 });
    }

    #[test]
    fn test_clamp_signed() {
        let max = coord! { x: 10, y: u32::MAX };

        assert_eq!(clamp_signed(max, coord! { x: -1, y: -1 }), coord! { x: 0, y: 0 });
        assert_eq!(
            clamp_signed(max, coord! { x: 11, y: i64::from(u32::MAX) + 7 }),
            coord! { x: 10, y: u32::MAX }
        );
    }
}
