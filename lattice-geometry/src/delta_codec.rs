//! # Predictive delta coding
//!
//! Polylines and triangle strips are stored as a sequence of signed deltas.
//! The i-th delta encodes the i-th point relative to a prediction made only from the points
//! before it, so decoding is a single forward pass with no look-ahead.
//!
//! | Variant           | `delta[0]`     | `delta[1]` | `delta[2]`                 | `delta[i >= 3]`                                  |
//! |-------------------|----------------|------------|----------------------------|--------------------------------------------------|
//! | [`Prev1`]         | `p0 - base`    | `p1 - p0`  | `p2 - p1`                  | `p[i] - p[i-1]`                                  |
//! | [`Prev2`]         | `p0 - base`    | `p1 - p0`  | `p2 - linear(p1, p0)`      | `p[i] - linear(p[i-1], p[i-2])`                  |
//! | [`Prev3`]         | `p0 - base`    | `p1 - p0`  | `p2 - linear(p1, p0)`      | `p[i] - circular(p[i-1], p[i-2], p[i-3])`        |
//! | [`TriangleStrip`] | `p0 - base`    | `p1 - p0`  | `p2 - p1`                  | `p[i] - parallelogram(p[i-1], p[i-2], p[i-3])`   |
//!
//! The variant is not recorded in the delta stream.
//! Callers are expected to store it in their own framing;
//! [`PolylineVariant`] converts to and from a `u8` for that purpose.
//!
//! [`Prev1`]: PolylineVariant::Prev1
//! [`Prev2`]: PolylineVariant::Prev2
//! [`Prev3`]: PolylineVariant::Prev3
//! [`TriangleStrip`]: PolylineVariant::TriangleStrip

use crate::lattice::{CodecBounds, Delta, LatticePoint, checked_decode_delta, encode_delta};
use crate::predictor::{predict_linear, predict_parallelogram, try_predict_circular};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use thiserror::Error;
use tracing::trace;

/// The shape of a point sequence, which determines the predictor used for each point.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, IntoPrimitive, TryFromPrimitive)]
pub enum PolylineVariant {
    /// Each point is predicted to be the previous point.
    Prev1 = 0,
    /// Linear extrapolation from the previous two points.
    Prev2 = 1,
    /// Circular extrapolation from the previous three points.
    Prev3 = 2,
    /// Parallelogram completion for triangle strip vertices.
    ///
    /// Triangle strips must contain zero or at least three points.
    TriangleStrip = 3,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("A triangle strip needs 0 or at least 3 points; the stream has {0} deltas.")]
    TriangleStripLength(usize),
    #[error("Point {index} decodes to a position outside the lattice.")]
    OutOfLattice { index: usize },
    #[error("Point {index} cannot be predicted: the two points before its predecessor coincide.")]
    DegeneratePrediction { index: usize },
}

/// Predicts the point following `previous`, which must be the already reconstructed prefix.
///
/// Encoder and decoder share this function so that both sides always agree.
fn predict_next(
    variant: PolylineVariant,
    bounds: &CodecBounds,
    previous: &[LatticePoint],
) -> Result<LatticePoint, DecodeError> {
    let max = bounds.max();
    match (variant, previous) {
        (_, []) => Ok(bounds.base()),
        (_, [p0]) => Ok(*p0),
        (PolylineVariant::Prev1, [.., p1]) => Ok(*p1),
        (PolylineVariant::Prev2 | PolylineVariant::Prev3, [p2, p1]) => {
            Ok(predict_linear(max, *p1, *p2))
        }
        (PolylineVariant::Prev2, [.., p2, p1]) => Ok(predict_linear(max, *p1, *p2)),
        (PolylineVariant::Prev3, [.., p3, p2, p1]) => try_predict_circular(max, *p1, *p2, *p3)
            .ok_or(DecodeError::DegeneratePrediction {
                index: previous.len(),
            }),
        (PolylineVariant::TriangleStrip, [_, p1]) => Ok(*p1),
        (PolylineVariant::TriangleStrip, [.., p3, p2, p1]) => {
            Ok(predict_parallelogram(max, *p1, *p2, *p3))
        }
    }
}

/// Encodes `points`, appending one delta per point to `deltas`.
///
/// Before returning, the new deltas are decoded again and compared against the input.
///
/// # Panics
///
/// Panics on contract violations, which indicate a bug upstream rather than bad data:
///
/// - a [`PolylineVariant::TriangleStrip`] input of length 1 or 2
/// - a [`PolylineVariant::Prev3`] input where the circular predictor is fed two equal points
///   (`p[i-2] == p[i-3]`)
/// - the decoded deltas not reproducing the input
pub fn encode(
    variant: PolylineVariant,
    points: &[LatticePoint],
    bounds: &CodecBounds,
    deltas: &mut Vec<Delta>,
) {
    if variant == PolylineVariant::TriangleStrip {
        assert!(
            points.is_empty() || points.len() > 2,
            "A triangle strip needs 0 or at least 3 points; got {}",
            points.len()
        );
    }

    let start = deltas.len();
    deltas.reserve(points.len());
    for (i, &point) in points.iter().enumerate() {
        let prediction = predict_next(variant, bounds, &points[..i])
            .unwrap_or_else(|err| panic!("Unable to encode {variant:?} sequence: {err}"));
        deltas.push(encode_delta(point, prediction));
    }

    let mut decoded = Vec::with_capacity(points.len());
    decode(variant, &deltas[start..], bounds, &mut decoded);
    assert_eq!(
        decoded, points,
        "{variant:?} deltas do not round trip with {bounds}"
    );

    trace!(?variant, count = points.len(), "Encoded point sequence");
}

/// Decodes `deltas`, appending one point per delta to `points`.
///
/// # Panics
///
/// Panics if the stream could not have been produced by [`encode`] with the same variant
/// and bounds. Use [`try_decode`] for streams of unknown provenance.
pub fn decode(
    variant: PolylineVariant,
    deltas: &[Delta],
    bounds: &CodecBounds,
    points: &mut Vec<LatticePoint>,
) {
    if let Err(err) = try_decode(variant, deltas, bounds, points) {
        panic!("Unable to decode {variant:?} sequence with {bounds}: {err}");
    }
}

/// Decodes `deltas`, appending one point per delta to `points`.
///
/// # Errors
///
/// Fails if the stream is not a valid encoding for the variant:
/// a triangle strip with 1 or 2 deltas, a point that falls off the `u32` lattice,
/// or a [`PolylineVariant::Prev3`] stream that reconstructs two equal points
/// where the circular predictor needs distinct ones.
/// On failure, `points` is left as it was before the call.
pub fn try_decode(
    variant: PolylineVariant,
    deltas: &[Delta],
    bounds: &CodecBounds,
    points: &mut Vec<LatticePoint>,
) -> Result<(), DecodeError> {
    if variant == PolylineVariant::TriangleStrip && matches!(deltas.len(), 1 | 2) {
        return Err(DecodeError::TriangleStripLength(deltas.len()));
    }

    let start = points.len();
    points.reserve(deltas.len());
    for (index, &delta) in deltas.iter().enumerate() {
        let point = predict_next(variant, bounds, &points[start..]).and_then(|prediction| {
            checked_decode_delta(delta, prediction).ok_or(DecodeError::OutOfLattice { index })
        });
        match point {
            Ok(point) => points.push(point),
            Err(err) => {
                points.truncate(start);
                return Err(err);
            }
        }
    }

    Ok(())
}

/// Encodes a polyline where each point is predicted by its predecessor.
///
/// See [`encode`] for details.
pub fn encode_polyline_prev1(
    points: &[LatticePoint],
    bounds: &CodecBounds,
    deltas: &mut Vec<Delta>,
) {
    encode(PolylineVariant::Prev1, points, bounds, deltas);
}

/// Inverse of [`encode_polyline_prev1`].
pub fn decode_polyline_prev1(
    deltas: &[Delta],
    bounds: &CodecBounds,
    points: &mut Vec<LatticePoint>,
) {
    decode(PolylineVariant::Prev1, deltas, bounds, points);
}

/// Encodes a polyline using linear prediction from the previous two points.
///
/// See [`encode`] for details.
pub fn encode_polyline_prev2(
    points: &[LatticePoint],
    bounds: &CodecBounds,
    deltas: &mut Vec<Delta>,
) {
    encode(PolylineVariant::Prev2, points, bounds, deltas);
}

/// Inverse of [`encode_polyline_prev2`].
pub fn decode_polyline_prev2(
    deltas: &[Delta],
    bounds: &CodecBounds,
    points: &mut Vec<LatticePoint>,
) {
    decode(PolylineVariant::Prev2, deltas, bounds, points);
}

/// Encodes a polyline using circular prediction from the previous three points.
///
/// See [`encode`] for details, including the requirement on repeated points.
pub fn encode_polyline_prev3(
    points: &[LatticePoint],
    bounds: &CodecBounds,
    deltas: &mut Vec<Delta>,
) {
    encode(PolylineVariant::Prev3, points, bounds, deltas);
}

/// Inverse of [`encode_polyline_prev3`].
pub fn decode_polyline_prev3(
    deltas: &[Delta],
    bounds: &CodecBounds,
    points: &mut Vec<LatticePoint>,
) {
    decode(PolylineVariant::Prev3, deltas, bounds, points);
}

/// Encodes triangle strip vertices using parallelogram prediction.
///
/// See [`encode`] for details, including the length requirement.
pub fn encode_triangle_strip(
    points: &[LatticePoint],
    bounds: &CodecBounds,
    deltas: &mut Vec<Delta>,
) {
    encode(PolylineVariant::TriangleStrip, points, bounds, deltas);
}

/// Inverse of [`encode_triangle_strip`].
pub fn decode_triangle_strip(
    deltas: &[Delta],
    bounds: &CodecBounds,
    points: &mut Vec<LatticePoint>,
) {
    decode(PolylineVariant::TriangleStrip, deltas, bounds, points);
}
