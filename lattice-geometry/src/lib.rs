//! # Lattice polyline geometry coding
//!
//! The algorithmic core of a map data serialization pipeline:
//!
//! - [`simplification`] reduces polylines to fewer points within a distance tolerance.
//! - [`predictor`] guesses the next point of a sequence from the previous one to three points.
//! - [`delta_codec`] turns point sequences on an unsigned integer lattice into
//!   small signed deltas against those predictions (and back again, exactly).
//!
//! Everything here is synchronous and stateless.
//! Packing the deltas into bytes (varints, etc.), file framing,
//! and projecting geographic coordinates onto the lattice are left to the caller.

mod lattice;

pub mod delta_codec;
pub mod predictor;
pub mod simplification;

// Flatten the most commonly used definitions for better ergonomics.
pub use delta_codec::{DecodeError, PolylineVariant, decode, encode, try_decode};
pub use lattice::{
    CodecBounds, Delta, InvalidBoundsError, LatticePoint, checked_decode_delta, decode_delta,
    encode_delta,
};
pub use simplification::{
    DistanceMetric, PointSink, SegmentDistance, SegmentDistanceMetric, SimplificationAlgorithm,
    SkipSmallTriangles, SquaredSegmentDistanceMetric, simplify_polyline,
};
