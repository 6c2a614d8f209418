//! Records owned by a [`Graph`](super::Graph): vertices, edges and their two
//! half-edges, input loops, traced boundaries and faces.
//!
//! # Indexing
//!
//! Vertices and edges are created and destroyed throughout simplification,
//! so they live in `SlotMap`s addressed by stable keys.  Boundaries and faces
//! are produced in one pass by face extraction and stored in flat `Vec`s
//! addressed by typed index wrappers.  Index `0` is reserved for the
//! unbounded face.

use std::collections::BTreeMap;
use std::fmt;

use curvegeom::{Coord, Rect, Segment};
use slotmap::new_key_type;
use smallvec::SmallVec;

new_key_type! {
    pub struct VertexKey;
    pub struct EdgeKey;
}

macro_rules! idx {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub usize);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

idx!(BoundaryId);
idx!(FaceId);

/// The unbounded face, always `FaceId(0)`.
pub const UNBOUNDED_FACE: FaceId = FaceId(0);

/// Identifies which input shape a loop came from.
pub type ShapeId = u32;

/// Winding number of a face with respect to each input shape.
pub type WindingMap = BTreeMap<ShapeId, i32>;

// ---------------------------------------------------------------------------
// Half-edges
// ---------------------------------------------------------------------------

/// One directed traversal of an edge.  The forward half runs from the edge's
/// start vertex to its end vertex; the reversed half runs back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HalfEdgeId {
    pub edge:     EdgeKey,
    pub reversed: bool,
}

impl HalfEdgeId {
    #[inline] pub fn forward(edge: EdgeKey) -> Self { Self { edge, reversed: false } }

    #[inline] pub fn backward(edge: EdgeKey) -> Self { Self { edge, reversed: true } }

    /// The other half of the same edge.
    #[inline] pub fn twin(self) -> Self { Self { edge: self.edge, reversed: !self.reversed } }

    /// `+1` for a forward traversal, `-1` for a reversed one.
    #[inline] pub fn sign(self) -> i32 { if self.reversed { -1 } else { 1 } }
}

/// Per-half state filled in by face extraction.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HalfData {
    pub face:     Option<FaceId>,
    pub boundary: Option<BoundaryId>,
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct Vertex {
    pub point:    Coord<f64>,
    /// Half-edges ending at this vertex.  Angularly ordered (by the direction
    /// of their twin leaving the vertex) once `order_vertex_edges` has run.
    pub incident: SmallVec<[HalfEdgeId; 4]>,
}

impl Vertex {
    pub(crate) fn new(point: Coord<f64>) -> Self { Self { point, incident: SmallVec::new() } }

    #[inline] pub fn degree(&self) -> usize { self.incident.len() }
}

#[derive(Clone, Debug)]
pub struct Edge {
    pub segment:  Segment,
    pub start:    VertexKey,
    pub end:      VertexKey,
    pub signed_area_fragment: f64,
    pub forward:  HalfData,
    pub reversed: HalfData,
    /// Set on edges belonging to the clip region while clipping.
    pub clip:     bool,
}

impl Edge {
    pub(crate) fn new(segment: Segment, start: VertexKey, end: VertexKey) -> Self {
        Self {
            signed_area_fragment: segment.signed_area_fragment(),
            segment,
            start,
            end,
            forward: HalfData::default(),
            reversed: HalfData::default(),
            clip: false,
        }
    }

    #[inline] pub fn is_self_loop(&self) -> bool { self.start == self.end }

    #[inline]
    pub fn half(&self, reversed: bool) -> &HalfData {
        if reversed { &self.reversed } else { &self.forward }
    }

    #[inline]
    pub(crate) fn half_mut(&mut self, reversed: bool) -> &mut HalfData {
        if reversed { &mut self.reversed } else { &mut self.forward }
    }
}

/// The half-edges traced from one input subpath.
#[derive(Clone, Debug)]
pub struct Loop {
    pub shape_id:   ShapeId,
    pub closed:     bool,
    pub half_edges: Vec<HalfEdgeId>,
}

/// A closed half-edge cycle found by face extraction.
///
/// Positive signed area marks an inner boundary (traced counter-clockwise
/// around the face it bounds); anything else is the outer boundary of a
/// connected component and ends up as a hole.
#[derive(Clone, Debug)]
pub struct Boundary {
    pub half_edges:  Vec<HalfEdgeId>,
    pub signed_area: f64,
    pub bounds:      Rect<f64>,
    pub children:    Vec<BoundaryId>,
    pub face:        Option<FaceId>,
}

impl Boundary {
    #[inline] pub fn is_inner(&self) -> bool { self.signed_area > 0.0 }
}

#[derive(Clone, Debug, Default)]
pub struct Face {
    /// `None` only for the unbounded face.
    pub boundary:    Option<BoundaryId>,
    pub holes:       Vec<BoundaryId>,
    pub winding_map: Option<WindingMap>,
    pub filled:      bool,
}

impl Face {
    pub(crate) fn bounded(boundary: BoundaryId) -> Self {
        Self { boundary: Some(boundary), ..Self::default() }
    }

    #[inline] pub fn is_unbounded(&self) -> bool { self.boundary.is_none() }

    /// Winding number for `shape_id`, treating missing entries as zero.
    pub fn winding(&self, shape_id: ShapeId) -> i32 {
        self.winding_map.as_ref().and_then(|map| map.get(&shape_id).copied()).unwrap_or(0)
    }
}
