use super::{DistanceMetric, PointSink, assert_valid_epsilon, max_distance};

/// Simplifies `points` with the Douglas-Peucker algorithm.
///
/// Emits the first point, then every point that splits a span whose interior strays
/// at least `epsilon` from the chord. The last input point is **not** emitted.
///
/// The split recursion is driven by an explicit stack, so adversarial input
/// (which can recurse `n` levels deep) cannot overflow the call stack.
/// Output order and tie-breaking (earliest index wins) match the recursive formulation.
///
/// # Panics
///
/// Panics if `epsilon` is not finite and positive.
pub fn simplify_douglas_peucker<P, M, S>(points: &[P], metric: &M, epsilon: f64, mut sink: S)
where
    P: Copy,
    M: DistanceMetric<P>,
    S: PointSink<P>,
{
    assert_valid_epsilon(epsilon);
    let Some(&first) = points.first() else {
        return;
    };
    sink.push(first);

    let final_index = points.len() - 1;
    // Inclusive spans still to be examined; the top of the stack is always the leftmost.
    let mut pending = vec![(0, final_index)];
    while let Some((start, end)) = pending.pop() {
        let (distance, split) = max_distance(points, start, end, metric);
        if split == end || distance < epsilon {
            if end != final_index {
                sink.push(points[end]);
            }
        } else {
            pending.push((split, end));
            pending.push((start, split));
        }
    }
}
