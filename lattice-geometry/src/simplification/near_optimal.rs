use super::{DistanceMetric, PointSink, assert_valid_epsilon, max_distance};
use std::num::NonZeroUsize;
use tracing::trace;

/// The best known simplification of the suffix starting at some point.
#[derive(Copy, Clone, Debug)]
struct Link {
    /// Index of the successor point.
    next: usize,
    /// Number of points used from here to the end, inclusive.
    point_count: usize,
}

const UNREACHED: Link = Link {
    next: usize::MAX,
    point_count: usize::MAX,
};

/// Simplifies `points` by dynamic programming, approximating the simplification
/// with the fewest points such that every dropped point is within `epsilon`
/// of the segment that replaces it.
///
/// For each start point (right to left), candidate successors are scanned in order.
/// A candidate is only checked if it would improve the current best,
/// and the scan stops once `max_false_look_ahead` checked candidates have failed.
/// Larger values get closer to optimal at superlinear cost; values around 20 - 200 are reasonable.
///
/// Uses O(n) additional memory.
/// Worst case O(n³), average O(n·k²) where k is `max_false_look_ahead`.
///
/// Like the other simplifiers, the last input point is **not** emitted.
/// Inputs of two or fewer points emit only the first point.
///
/// # Panics
///
/// Panics if `epsilon` is not finite and positive.
pub fn simplify_near_optimal<P, M, S>(
    max_false_look_ahead: NonZeroUsize,
    points: &[P],
    metric: &M,
    epsilon: f64,
    mut sink: S,
) where
    P: Copy,
    M: DistanceMetric<P>,
    S: PointSink<P>,
{
    assert_valid_epsilon(epsilon);
    let n = points.len();
    if n <= 2 {
        if let Some(&first) = points.first() {
            sink.push(first);
        }
        return;
    }

    let mut links = vec![UNREACHED; n];
    links[n - 1] = Link {
        next: n,
        point_count: 1,
    };

    let mut checks = 0usize;
    for i in (0..n - 1).rev() {
        let mut false_count = 0;
        let mut j = i + 1;
        // j = i + 1 has no interior points, so every start point gets a successor.
        while j < n && false_count < max_false_look_ahead.get() {
            let point_count = links[j].point_count + 1;
            if point_count < links[i].point_count {
                checks += 1;
                if max_distance(points, i, j, metric).0 < epsilon {
                    links[i] = Link { next: j, point_count };
                } else {
                    false_count += 1;
                }
            }
            j += 1;
        }
    }

    let mut i = 0;
    while i < n - 1 {
        sink.push(points[i]);
        i = links[i].next;
    }

    trace!(
        input = n,
        output = links[0].point_count,
        checks,
        "Near-optimal simplification"
    );
}
