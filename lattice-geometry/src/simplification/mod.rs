//! # Polyline simplification
//!
//! Reduces the number of points in a polyline before it is delta coded,
//! keeping every dropped point within a distance tolerance (ε) of the simplified shape.
//!
//! Two algorithms are available:
//!
//! - [`simplify_douglas_peucker`]: the classic recursive split (run iteratively here).
//!   Average O(n log n), worst case O(n²).
//! - [`simplify_near_optimal`]: dynamic programming with a bounded look-ahead.
//!   Worst case O(n³), average O(n·k²).
//!
//! **Neither algorithm emits the last input point.**
//! They are composed into chunked streams where the last point of one chunk
//! is the first point of the next, so the caller appends it.
//! [`simplify_polyline`] takes care of this for the common case of a single polyline.
//!
//! Output goes to a [`PointSink`].
//! Wrapping the real output in [`SkipSmallTriangles`] drops the nearly collinear triples
//! Douglas-Peucker tends to leave behind.

use crate::lattice::LatticePoint;
use geo::{Coord, Distance, Euclidean, Line, Point, coord};
use std::num::NonZeroUsize;
use tracing::debug;

mod douglas_peucker;
mod near_optimal;
mod small_triangles;

pub use douglas_peucker::simplify_douglas_peucker;
pub use near_optimal::simplify_near_optimal;
pub use small_triangles::SkipSmallTriangles;

/// Receives simplified points one at a time, in forward order.
pub trait PointSink<P> {
    fn push(&mut self, point: P);
}

impl<P> PointSink<P> for Vec<P> {
    #[inline]
    fn push(&mut self, point: P) {
        Vec::push(self, point);
    }
}

impl<P, S: PointSink<P> + ?Sized> PointSink<P> for &mut S {
    #[inline]
    fn push(&mut self, point: P) {
        (**self).push(point);
    }
}

/// Distance from a probe point to one fixed segment.
pub trait SegmentDistance<P> {
    /// Returns a non-negative distance, in the same unit as ε.
    fn distance(&self, probe: P) -> f64;
}

impl<P, F: Fn(P) -> f64> SegmentDistance<P> for F {
    #[inline]
    fn distance(&self, probe: P) -> f64 {
        self(probe)
    }
}

/// A factory for [`SegmentDistance`]s: given the endpoints of a segment,
/// produces something that measures how far points are from it.
///
/// Any `Fn(P, P) -> impl Fn(P) -> f64` closure is a metric.
pub trait DistanceMetric<P> {
    type Segment: SegmentDistance<P>;

    fn segment(&self, start: P, end: P) -> Self::Segment;
}

impl<P, F, S> DistanceMetric<P> for F
where
    F: Fn(P, P) -> S,
    S: SegmentDistance<P>,
{
    type Segment = S;

    #[inline]
    fn segment(&self, start: P, end: P) -> S {
        self(start, end)
    }
}

/// Points which can be measured in the plane.
pub trait PlanarPoint: Copy {
    fn to_planar(self) -> Coord<f64>;
}

impl PlanarPoint for Coord<f64> {
    #[inline]
    fn to_planar(self) -> Coord<f64> {
        self
    }
}

impl PlanarPoint for LatticePoint {
    #[inline]
    fn to_planar(self) -> Coord<f64> {
        coord! { x: f64::from(self.x), y: f64::from(self.y) }
    }
}

/// Euclidean distance from the probe to the closest point of the (closed) segment.
#[derive(Copy, Clone, Debug, Default)]
pub struct SegmentDistanceMetric;

/// The square of [`SegmentDistanceMetric`].
///
/// Use this with a squared ε to skip the square root.
#[derive(Copy, Clone, Debug, Default)]
pub struct SquaredSegmentDistanceMetric;

/// A segment produced by [`SegmentDistanceMetric`] or [`SquaredSegmentDistanceMetric`].
#[derive(Copy, Clone, Debug)]
pub struct EuclideanSegment {
    line: Line<f64>,
    squared: bool,
}

impl<P: PlanarPoint> SegmentDistance<P> for EuclideanSegment {
    #[inline]
    fn distance(&self, probe: P) -> f64 {
        let distance = Euclidean.distance(&Point::from(probe.to_planar()), &self.line);
        if self.squared {
            distance * distance
        } else {
            distance
        }
    }
}

impl<P: PlanarPoint> DistanceMetric<P> for SegmentDistanceMetric {
    type Segment = EuclideanSegment;

    #[inline]
    fn segment(&self, start: P, end: P) -> EuclideanSegment {
        EuclideanSegment {
            line: Line::new(start.to_planar(), end.to_planar()),
            squared: false,
        }
    }
}

impl<P: PlanarPoint> DistanceMetric<P> for SquaredSegmentDistanceMetric {
    type Segment = EuclideanSegment;

    #[inline]
    fn segment(&self, start: P, end: P) -> EuclideanSegment {
        EuclideanSegment {
            line: Line::new(start.to_planar(), end.to_planar()),
            squared: true,
        }
    }
}

/// Finds the point strictly between `first` and `last` (both inclusive indices)
/// furthest from the segment joining them.
///
/// Returns `(0.0, last)` when there is no interior point, or when every interior point
/// lies on the segment. Ties go to the earliest index.
pub(crate) fn max_distance<P: Copy, M: DistanceMetric<P>>(
    points: &[P],
    first: usize,
    last: usize,
    metric: &M,
) -> (f64, usize) {
    let mut result = (0.0, last);
    if last - first <= 1 {
        return result;
    }

    let segment = metric.segment(points[first], points[last]);
    for (i, &point) in points.iter().enumerate().take(last).skip(first + 1) {
        let distance = segment.distance(point);
        if distance > result.0 {
            result = (distance, i);
        }
    }
    result
}

#[inline]
pub(crate) fn assert_valid_epsilon(epsilon: f64) {
    assert!(
        epsilon.is_finite() && epsilon > 0.0,
        "Simplification tolerance must be finite and positive; got {epsilon}"
    );
}

/// Which simplification algorithm [`simplify_polyline`] should run.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SimplificationAlgorithm {
    DouglasPeucker,
    /// Dynamic programming which gives up on a start point after
    /// `max_false_look_ahead` candidates exceeded ε.
    /// Values around 20 - 200 are reasonable.
    NearOptimal { max_false_look_ahead: NonZeroUsize },
}

/// Simplifies a complete polyline.
///
/// Runs the algorithm through [`SkipSmallTriangles`] and then appends the last input point,
/// so the result always starts and ends with the input's endpoints.
/// Polylines with fewer than two points are returned unchanged.
///
/// # Panics
///
/// Panics if `epsilon` is not finite and positive.
pub fn simplify_polyline<P: Copy, M: DistanceMetric<P>>(
    points: &[P],
    algorithm: SimplificationAlgorithm,
    metric: &M,
    epsilon: f64,
) -> Vec<P> {
    assert_valid_epsilon(epsilon);
    let [.., last] = points else {
        return Vec::new();
    };
    if points.len() < 2 {
        return points.to_vec();
    }

    let mut simplified = Vec::new();
    let mut filter = SkipSmallTriangles::new(&mut simplified, metric, epsilon);
    match algorithm {
        SimplificationAlgorithm::DouglasPeucker => {
            simplify_douglas_peucker(points, metric, epsilon, &mut filter);
        }
        SimplificationAlgorithm::NearOptimal {
            max_false_look_ahead,
        } => simplify_near_optimal(max_false_look_ahead, points, metric, epsilon, &mut filter),
    }
    filter.push(*last);

    debug!(
        ?algorithm,
        input = points.len(),
        output = simplified.len(),
        "Simplified polyline"
    );
    simplified
}
