//! # Point prediction
//!
//! Given the most recently reconstructed points of a sequence,
//! each predictor guesses where the next point will be.
//! The codec only stores the difference between the guess and the actual point,
//! so better guesses mean smaller deltas for the downstream varint coder.
//!
//! All predictions are clamped into `[0, max]`.
//! Argument order is always most recent first: `p1` is the last point, `p2` the one before, etc.

use crate::lattice::{LatticePoint, clamp_planar, clamp_signed};
use geo::{Coord, coord};

/// Predicts the next polyline point from the previous two
/// by extrapolating half a step along the tangent `p1 - p2`.
///
/// The arithmetic is done in `f64` and truncated back onto the lattice.
pub fn predict_linear(max: LatticePoint, p1: LatticePoint, p2: LatticePoint) -> LatticePoint {
    let (c1, c2) = (planar(p1), planar(p2));
    clamp_planar(max, c1 + (c1 - c2) / 2.0)
}

/// Predicts the next polyline point from the previous three
/// by continuing along the arc they describe.
///
/// Treating points as complex numbers, the turn between the last two chords is
/// `d = (p1 - p2) / (p2 - p3)`.
/// The prediction continues from `p1` by half the last chord, rotated by half the turn angle.
///
/// # Panics
///
/// Panics if `p2 == p3`, as the turn angle is undefined.
/// See [`try_predict_circular`] for a non-panicking version.
pub fn predict_circular(
    max: LatticePoint,
    p1: LatticePoint,
    p2: LatticePoint,
    p3: LatticePoint,
) -> LatticePoint {
    try_predict_circular(max, p1, p2, p3).unwrap_or_else(|| {
        panic!(
            "Circular prediction requires distinct p2 and p3; both were ({}, {})",
            p2.x, p2.y
        )
    })
}

/// Same as [`predict_circular`], but returns `None` instead of panicking when `p2 == p3`.
pub fn try_predict_circular(
    max: LatticePoint,
    p1: LatticePoint,
    p2: LatticePoint,
    p3: LatticePoint,
) -> Option<LatticePoint> {
    if p2 == p3 {
        return None;
    }

    let (c1, c2, c3) = (planar(p1), planar(p2), planar(p3));
    let chord = c1 - c2;
    let turn = complex_div(chord, c2 - c3);
    let half_angle = 0.5 * turn.y.atan2(turn.x);
    let rotation = coord! { x: 0.5 * half_angle.cos(), y: 0.5 * half_angle.sin() };

    Some(clamp_planar(max, c1 + complex_mul(chord, rotation)))
}

/// Predicts the next triangle strip vertex by completing the parallelogram
/// spanned by the previous triangle: `p2 + p3 - p1`.
pub fn predict_parallelogram(
    max: LatticePoint,
    p1: LatticePoint,
    p2: LatticePoint,
    p3: LatticePoint,
) -> LatticePoint {
    clamp_signed(
        max,
        coord! {
            x: i64::from(p2.x) + i64::from(p3.x) - i64::from(p1.x),
            y: i64::from(p2.y) + i64::from(p3.y) - i64::from(p1.y),
        },
    )
}

#[inline]
fn planar(point: LatticePoint) -> Coord<f64> {
    coord! { x: f64::from(point.x), y: f64::from(point.y) }
}

#[inline]
fn complex_mul(a: Coord<f64>, b: Coord<f64>) -> Coord<f64> {
    coord! {
        x: a.x * b.x - a.y * b.y,
        y: a.x * b.y + a.y * b.x,
    }
}

/// Smith's complex division, with the same operation order as libgcc's `__divdc3`.
///
/// The naive `a * conj(b) / |b|²` form rounds differently. When the chords are exactly
/// anti-parallel the imaginary part is a signed zero, and its sign picks the side of the
/// branch cut `atan2` lands on, so the two forms predict points on opposite sides of the chord.
/// Lattice coordinates never make `ratio` subnormal, so libgcc's rescaling paths are not needed.
#[inline]
fn complex_div(a: Coord<f64>, b: Coord<f64>) -> Coord<f64> {
    if b.x.abs() < b.y.abs() {
        let ratio = b.x / b.y;
        let denom = b.x * ratio + b.y;
        coord! {
            x: (a.x * ratio + a.y) / denom,
            y: (a.y * ratio - a.x) / denom,
        }
    } else {
        let ratio = b.y / b.x;
        let denom = b.y * ratio + b.x;
        coord! {
            x: (a.y * ratio + a.x) / denom,
            y: (a.y - a.x * ratio) / denom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::{prop_assert, proptest};

    const MAX: LatticePoint = Coord { x: 1000, y: 1000 };

    #[test]
    fn test_linear_half_step() {
        let prediction = predict_linear(MAX, coord! { x: 10, y: 0 }, coord! { x: 0, y: 0 });
        assert_eq!(prediction, coord! { x: 15, y: 0 });
    }

    #[test]
    fn test_linear_truncates() {
        // 3 + 3 / 2 = 4.5
        let prediction = predict_linear(MAX, coord! { x: 3, y: 3 }, coord! { x: 0, y: 0 });
        assert_eq!(prediction, coord! { x: 4, y: 4 });
    }

    #[test]
    fn test_linear_clamps_at_both_ends() {
        let prediction = predict_linear(MAX, coord! { x: 1, y: 1000 }, coord! { x: 10, y: 900 });
        assert_eq!(prediction, coord! { x: 0, y: 1000 });
    }

    #[test]
    fn test_circular_straight_line() {
        let prediction = predict_circular(
            MAX,
            coord! { x: 20, y: 0 },
            coord! { x: 10, y: 0 },
            coord! { x: 0, y: 0 },
        );
        assert_eq!(prediction, coord! { x: 25, y: 0 });
    }

    #[test]
    fn test_circular_right_angle_turn() {
        // A quarter turn between chords; we continue with an eighth turn.
        // (10, 10) + 5 * e^(i * 3pi/4) = (6.46, 13.54)
        let prediction = predict_circular(
            MAX,
            coord! { x: 10, y: 10 },
            coord! { x: 10, y: 0 },
            coord! { x: 0, y: 0 },
        );
        assert_eq!(prediction, coord! { x: 6, y: 13 });
    }

    #[test]
    fn test_complex_div_signed_zero() {
        // (77 + 385i) / (-180 - 900i) is exactly real and negative.
        // The imaginary part must come out as -0, not +0.
        let turn = complex_div(coord! { x: 77.0, y: 385.0 }, coord! { x: -180.0, y: -900.0 });
        assert!(turn.x < 0.0);
        assert!(turn.y.abs() < f64::EPSILON);
        assert!(turn.y.is_sign_negative());

        let turn = complex_div(coord! { x: 385.0, y: 77.0 }, coord! { x: -900.0, y: -180.0 });
        assert!(turn.x < 0.0);
        assert!(turn.y.is_sign_negative());
    }

    #[test]
    fn test_circular_u_turn() {
        // The last chord (77, 385) doubles back along (-180, -900).
        // The turn sits on the branch cut at -pi, so we rotate clockwise by a quarter turn.
        let prediction = predict_circular(
            MAX,
            coord! { x: 779, y: 430 },
            coord! { x: 702, y: 45 },
            coord! { x: 882, y: 945 },
        );
        assert_eq!(prediction, coord! { x: 971, y: 391 });

        // Mirrored across the diagonal (|dx| > |dy|), which takes the other division branch.
        // (435, 97) + (38.5, -192.5) clamps at y = 0.
        let prediction = predict_circular(
            MAX,
            coord! { x: 435, y: 97 },
            coord! { x: 50, y: 20 },
            coord! { x: 950, y: 200 },
        );
        assert_eq!(prediction, coord! { x: 473, y: 0 });
    }

    #[test]
    fn test_circular_degenerate() {
        let p = coord! { x: 4, y: 4 };
        assert_eq!(try_predict_circular(MAX, coord! { x: 8, y: 8 }, p, p), None);
    }

    #[test]
    #[should_panic(expected = "distinct p2 and p3")]
    fn test_circular_degenerate_panics() {
        let p = coord! { x: 4, y: 4 };
        predict_circular(MAX, coord! { x: 8, y: 8 }, p, p);
    }

    #[test]
    fn test_parallelogram() {
        let prediction = predict_parallelogram(
            MAX,
            coord! { x: 0, y: 0 },
            coord! { x: 1, y: 0 },
            coord! { x: 0, y: 1 },
        );
        assert_eq!(prediction, coord! { x: 1, y: 1 });
    }

    #[test]
    fn test_parallelogram_negative_clamps_to_zero() {
        let prediction = predict_parallelogram(
            MAX,
            coord! { x: 0, y: 1 },
            coord! { x: 1, y: 0 },
            coord! { x: 0, y: 0 },
        );
        assert_eq!(prediction, coord! { x: 1, y: 0 });
    }

    fn within(max: LatticePoint, point: LatticePoint) -> bool {
        point.x <= max.x && point.y <= max.y
    }

    proptest! {
        #[test]
        fn prop_predictions_stay_on_lattice(
            max_x in 0u32.., max_y in 0u32..,
            xs in proptest::array::uniform3(0u32..), ys in proptest::array::uniform3(0u32..),
        ) {
            let max = coord! { x: max_x, y: max_y };
            let [p1, p2, p3] = [0, 1, 2].map(|i| coord! { x: xs[i].min(max_x), y: ys[i].min(max_y) });

            prop_assert!(within(max, predict_linear(max, p1, p2)));
            prop_assert!(within(max, predict_parallelogram(max, p1, p2, p3)));
            if let Some(prediction) = try_predict_circular(max, p1, p2, p3) {
                prop_assert!(within(max, prediction));
            }
        }
    }
}
