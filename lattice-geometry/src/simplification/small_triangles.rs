use super::{DistanceMetric, PointSink, SegmentDistance};

/// A [`PointSink`] that drops points forming a nearly degenerate triangle with their neighbors.
///
/// When a point arrives, the previously accepted point is removed for as long as it lies
/// within `epsilon` of the segment from the point before it to the new point.
/// Then the new point is appended.
/// No three consecutive output points `(a, b, c)` where `c` went through the filter
/// have `b` within `epsilon` of `a`-`c`.
/// Points already in the vector when the filter is created are not checked against each other.
pub struct SkipSmallTriangles<'a, P, M> {
    points: &'a mut Vec<P>,
    metric: &'a M,
    epsilon: f64,
}

impl<'a, P, M> SkipSmallTriangles<'a, P, M> {
    /// Appends filtered points to `points`, which may already contain some.
    pub fn new(points: &'a mut Vec<P>, metric: &'a M, epsilon: f64) -> Self {
        Self {
            points,
            metric,
            epsilon,
        }
    }
}

impl<P: Copy, M: DistanceMetric<P>> PointSink<P> for SkipSmallTriangles<'_, P, M> {
    fn push(&mut self, point: P) {
        while let &[.., before, last] = self.points.as_slice() {
            if self.metric.segment(before, point).distance(last) < self.epsilon {
                self.points.pop();
            } else {
                break;
            }
        }

        self.points.push(point);
    }
}
