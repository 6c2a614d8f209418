#![doc = "Planar boolean geometry over curved shapes"]
pub mod constants;
mod graph;
mod io;
mod ops;

#[doc(inline)]
pub use curvegeom::{Coord, Rect, Segment, Shape, Subpath};

#[doc(inline)]
pub use graph::{
    AddOptions, Boundary, BoundaryId, Edge, EdgeKey, Face, FaceId, Graph, HalfData, HalfEdgeId, Loop, ShapeId,
    Vertex, VertexKey, WindingMap, UNBOUNDED_FACE,
};

#[doc(inline)]
pub use ops::{
    binary_result, clip_shape, fill_shapes, intersection_non_zero, is_inside, simplify_non_zero, union_non_zero,
    xor_non_zero, BinaryOp, ClipOptions,
};

#[doc(inline)]
pub use io::{read_shape, svg_string, write_shape, write_svg, SvgOptions};
