//! Curve segments and filled shapes for planar boolean geometry.
//!
//! [`Segment`] covers lines, cubic Béziers, circular arcs and elliptical
//! arcs, each parameterized over `t ∈ [0, 1]`.  [`Shape`] is a list of
//! [`Subpath`]s filled under the nonzero rule.

pub mod segment;
pub mod shape;

mod bezier;
mod conic;
mod intersect;
mod math;

pub use geo::{Coord, Rect};
pub use math::{expand_rect, merge_rects, rect_from_points, rects_intersect, CoordExt};
pub use segment::{Overlap, Ray, RayIntersection, Segment, SegmentIntersection, SelfIntersection};
pub use shape::{Shape, Subpath};
