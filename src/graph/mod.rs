//! The planar arrangement ("graph") behind every boolean operation.
//!
//! Shapes are added as loops of half-edges tagged by a [`ShapeId`].
//! [`Graph::compute_simplified_faces`] then removes every degeneracy
//! (overlaps, self-intersections, crossings, near-coincident vertices,
//! bridges, dangling edges), traces faces, nests holes and propagates
//! winding numbers.  A caller predicate over each face's [`WindingMap`]
//! selects the filled faces, from which the output shape is rebuilt.

mod bridge;
mod collapse;
mod entity;
mod face;
mod fill;
mod intersect;
mod overlap;
mod sweep;

use std::collections::BTreeSet;

use anyhow::{bail, ensure, Result};
use curvegeom::{Coord, Segment, Shape, Subpath};
use slotmap::SlotMap;
use tracing::debug;

pub use entity::{
    Boundary, BoundaryId, Edge, EdgeKey, Face, FaceId, HalfData, HalfEdgeId, Loop, ShapeId, Vertex,
    VertexKey, WindingMap, UNBOUNDED_FACE,
};

/// How a subpath is turned into a loop.
#[derive(Clone, Copy, Debug)]
pub struct AddOptions {
    /// Close every subpath (adding a closing line where needed), as filling
    /// requires.  Clipping adds the clipped shape's open subpaths as-is.
    pub ensure_closed: bool,
}

impl Default for AddOptions {
    fn default() -> Self { Self { ensure_closed: true } }
}

#[derive(Clone, Debug)]
pub struct Graph {
    pub(crate) vertices:   SlotMap<VertexKey, Vertex>,
    pub(crate) edges:      SlotMap<EdgeKey, Edge>,
    pub(crate) loops:      Vec<Loop>,
    pub(crate) boundaries: Vec<Boundary>,
    pub(crate) faces:      Vec<Face>,
    pub(crate) shape_ids:  BTreeSet<ShapeId>,
}

impl Default for Graph {
    fn default() -> Self { Self::new() }
}

impl Graph {
    /// Create an empty graph.  The unbounded face is pre-inserted.
    pub fn new() -> Self {
        Self {
            vertices:   SlotMap::with_key(),
            edges:      SlotMap::with_key(),
            loops:      Vec::new(),
            boundaries: Vec::new(),
            faces:      vec![Face::default()],
            shape_ids:  BTreeSet::new(),
        }
    }

    /// Release every entity.  The graph is left empty but usable.
    pub fn dispose(&mut self) {
        self.vertices.clear();
        self.edges.clear();
        self.loops.clear();
        self.boundaries.clear();
        self.faces.clear();
        self.faces.push(Face::default());
        self.shape_ids.clear();
    }

    // -----------------------------------------------------------------------
    // Counts and accessors
    // -----------------------------------------------------------------------

    pub fn vertex_count(&self)   -> usize { self.vertices.len() }
    pub fn edge_count(&self)     -> usize { self.edges.len() }
    pub fn loop_count(&self)     -> usize { self.loops.len() }
    pub fn boundary_count(&self) -> usize { self.boundaries.len() }
    /// Number of faces including the unbounded face.
    pub fn face_count(&self)     -> usize { self.faces.len() }
    pub fn bounded_face_count(&self) -> usize { self.faces.len().saturating_sub(1) }

    #[inline] pub fn vertex(&self, key: VertexKey) -> &Vertex { &self.vertices[key] }
    #[inline] pub fn edge(&self, key: EdgeKey) -> &Edge { &self.edges[key] }
    #[inline] pub fn boundary(&self, id: BoundaryId) -> &Boundary { &self.boundaries[id.0] }
    #[inline] pub fn face(&self, id: FaceId) -> &Face { &self.faces[id.0] }

    pub fn vertices(&self) -> impl Iterator<Item = (VertexKey, &Vertex)> + '_ { self.vertices.iter() }
    pub fn edges(&self) -> impl Iterator<Item = (EdgeKey, &Edge)> + '_ { self.edges.iter() }
    pub fn loops(&self) -> &[Loop] { &self.loops }
    pub fn boundaries(&self) -> impl Iterator<Item = (BoundaryId, &Boundary)> + '_ {
        self.boundaries.iter().enumerate().map(|(i, b)| (BoundaryId(i), b))
    }
    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &Face)> + '_ {
        self.faces.iter().enumerate().map(|(i, f)| (FaceId(i), f))
    }
    pub fn shape_ids(&self) -> impl Iterator<Item = ShapeId> + '_ { self.shape_ids.iter().copied() }

    // -----------------------------------------------------------------------
    // Half-edge helpers
    // -----------------------------------------------------------------------

    #[inline]
    pub fn half_start(&self, half: HalfEdgeId) -> VertexKey {
        let edge = &self.edges[half.edge];
        if half.reversed { edge.end } else { edge.start }
    }

    #[inline]
    pub fn half_end(&self, half: HalfEdgeId) -> VertexKey {
        let edge = &self.edges[half.edge];
        if half.reversed { edge.start } else { edge.end }
    }

    /// The half-edge's curve in its direction of travel.
    pub fn half_segment(&self, half: HalfEdgeId) -> Segment {
        let segment = self.edges[half.edge].segment;
        if half.reversed { segment.reversed() } else { segment }
    }

    #[inline]
    pub fn half_data(&self, half: HalfEdgeId) -> &HalfData { self.edges[half.edge].half(half.reversed) }

    #[inline]
    pub(crate) fn half_data_mut(&mut self, half: HalfEdgeId) -> &mut HalfData {
        self.edges[half.edge].half_mut(half.reversed)
    }

    /// Face to the left of a half-edge, once faces are extracted.
    #[inline] pub fn half_face(&self, half: HalfEdgeId) -> Option<FaceId> { self.half_data(half).face }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    pub fn add_vertex(&mut self, point: Coord<f64>) -> VertexKey { self.vertices.insert(Vertex::new(point)) }

    /// Remove a vertex.  Its incident edges must already be gone.
    pub fn remove_vertex(&mut self, key: VertexKey) {
        debug_assert!(
            self.vertices.get(key).is_none_or(|v| v.incident.is_empty()),
            "removing vertex {key:?} with incident edges"
        );
        self.vertices.remove(key);
    }

    /// Add an edge between two vertices.  Lines and cubics are snapped onto
    /// the vertex positions.  The reversed half is recorded at `start` and
    /// the forward half at `end`, since incident half-edges end at their
    /// vertex.
    pub fn add_edge(&mut self, segment: Segment, start: VertexKey, end: VertexKey) -> EdgeKey {
        debug_assert!(
            self.vertices.contains_key(start) && self.vertices.contains_key(end),
            "edge between missing vertices {start:?} -> {end:?}"
        );
        let segment = segment.with_endpoints(self.vertices[start].point, self.vertices[end].point);
        let key = self.edges.insert(Edge::new(segment, start, end));
        self.vertices[start].incident.push(HalfEdgeId::backward(key));
        self.vertices[end].incident.push(HalfEdgeId::forward(key));
        key
    }

    /// Remove an edge and its incidence records.  Loops are not touched; see
    /// [`Graph::replace_edge_in_loops`].
    pub fn remove_edge(&mut self, key: EdgeKey) -> Option<Edge> {
        let edge = self.edges.remove(key)?;
        for vertex in [edge.start, edge.end] {
            if let Some(vertex) = self.vertices.get_mut(vertex) {
                let before = vertex.incident.len();
                vertex.incident.retain(|half| half.edge != key);
                // A self-loop loses both halves on its first visit.
                debug_assert!(
                    vertex.incident.len() < before || edge.start == edge.end,
                    "edge {key:?} missing from its vertex's incidence"
                );
            }
        }
        Some(edge)
    }

    /// Substitute `forward` (the ordered half-edges replacing the forward
    /// traversal of `edge`) wherever a loop uses `edge`.  Reversed uses get
    /// the twins in reverse order; an empty list deletes the edge from loops.
    pub fn replace_edge_in_loops(&mut self, edge: EdgeKey, forward: &[HalfEdgeId]) {
        let backward: Vec<HalfEdgeId> = forward.iter().rev().map(|h| h.twin()).collect();
        for lp in &mut self.loops {
            if !lp.half_edges.iter().any(|h| h.edge == edge) { continue; }
            lp.half_edges = lp.half_edges.iter()
                .flat_map(|&h| match (h.edge == edge, h.reversed) {
                    (false, _)    => vec![h],
                    (true, false) => forward.to_vec(),
                    (true, true)  => backward.clone(),
                })
                .collect();
        }
    }

    /// Add every subpath of `shape` as a loop tagged `shape_id`.
    pub fn add_shape(&mut self, shape_id: ShapeId, shape: &Shape, options: AddOptions) {
        for subpath in &shape.subpaths {
            self.add_subpath(shape_id, subpath, options);
        }
    }

    /// Add one subpath as a loop.  A vertex is created at the start of every
    /// segment (plus the final end point of an open subpath); zero-size
    /// segments are skipped.
    pub fn add_subpath(&mut self, shape_id: ShapeId, subpath: &Subpath, options: AddOptions) {
        self.shape_ids.insert(shape_id);

        let closed = options.ensure_closed || subpath.closed;
        let segments: Vec<Segment> = if closed { subpath.fill_segments() } else { subpath.segments.clone() }
            .into_iter()
            .filter(|segment| {
                let bounds = segment.bounds();
                bounds.width() > 0.0 || bounds.height() > 0.0
            })
            .collect();
        if segments.is_empty() { return; }

        let mut vertices: Vec<VertexKey> = segments.iter().map(|s| self.add_vertex(s.start())).collect();
        if !closed {
            let end = segments[segments.len() - 1].end();
            vertices.push(self.add_vertex(end));
        }

        let count = segments.len();
        let half_edges = segments.into_iter().enumerate()
            .map(|(i, segment)| {
                let end = if closed { vertices[(i + 1) % count] } else { vertices[i + 1] };
                HalfEdgeId::forward(self.add_edge(segment, vertices[i], end))
            })
            .collect();

        self.loops.push(Loop { shape_id, closed, half_edges });
    }

    // -----------------------------------------------------------------------
    // Pipeline
    // -----------------------------------------------------------------------

    /// Run the full simplification: every step is a precondition of the next.
    pub fn compute_simplified_faces(&mut self) {
        debug!("simplify: START ({} vertices, {} edges, {} loops)", self.vertex_count(), self.edge_count(), self.loop_count());
        self.eliminate_overlap();
        self.eliminate_self_intersection();
        self.eliminate_intersection();
        self.collapse_vertices();
        self.remove_bridges();
        self.remove_low_order_vertices();
        self.order_vertex_edges();
        self.extract_faces();
        self.compute_boundary_tree();
        self.compute_winding_map();
        debug!(
            "simplify: DONE ({} vertices, {} edges, {} boundaries, {} faces)",
            self.vertex_count(), self.edge_count(), self.boundary_count(), self.face_count()
        );
    }

    // -----------------------------------------------------------------------
    // Measures
    // -----------------------------------------------------------------------

    /// Enclosed area of a face: its boundary minus its holes.  Zero for the
    /// unbounded face.
    pub fn face_area(&self, id: FaceId) -> f64 {
        let face = &self.faces[id.0];
        let Some(boundary) = face.boundary else { return 0.0 };
        self.boundaries[boundary.0].signed_area
            + face.holes.iter().map(|h| self.boundaries[h.0].signed_area).sum::<f64>()
    }

    /// Total area of the filled bounded faces.
    pub fn filled_area(&self) -> f64 {
        self.faces()
            .filter(|(_, face)| face.filled && !face.is_unbounded())
            .map(|(id, _)| self.face_area(id))
            .sum()
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    /// Check the structural invariants that hold after simplification:
    /// incidence records match edge endpoints, every vertex has at least two
    /// incident half-edges, every half-edge lies on exactly one boundary and
    /// face, and winding numbers differ across every edge by its
    /// differential.  Checks for passes that have not run yet are skipped.
    pub fn check_invariants(&self) -> Result<()> {
        for (key, vertex) in &self.vertices {
            for &half in &vertex.incident {
                ensure!(self.edges.contains_key(half.edge), "[graph] vertex {key:?} lists missing edge {:?}", half.edge);
                ensure!(self.half_end(half) == key, "[graph] vertex {key:?} lists {half:?}, which ends elsewhere");
            }
        }
        for (key, edge) in &self.edges {
            for (vertex, half) in [(edge.start, HalfEdgeId::backward(key)), (edge.end, HalfEdgeId::forward(key))] {
                let Some(record) = self.vertices.get(vertex) else {
                    bail!("[graph] edge {key:?} references missing vertex {vertex:?}");
                };
                let count = record.incident.iter().filter(|&&h| h == half).count();
                ensure!(count == 1, "[graph] {half:?} recorded {count} times at {vertex:?}");
            }
        }
        for (i, lp) in self.loops.iter().enumerate() {
            for half in &lp.half_edges {
                ensure!(self.edges.contains_key(half.edge), "[graph] loop {i} references missing edge {:?}", half.edge);
            }
        }

        if self.boundaries.is_empty() { return Ok(()) }

        for (key, vertex) in &self.vertices {
            ensure!(vertex.degree() >= 2, "[graph] vertex {key:?} has degree {}", vertex.degree());
        }

        let mut seen = ahash::AHashSet::new();
        for (id, boundary) in self.boundaries() {
            for &half in &boundary.half_edges {
                ensure!(seen.insert(half), "[graph] {half:?} appears on more than one boundary");
                ensure!(self.half_data(half).boundary == Some(id), "[graph] {half:?} is not tagged with {id}");
                ensure!(self.half_face(half).is_some(), "[graph] {half:?} has no face");
            }
        }
        ensure!(seen.len() == 2 * self.edges.len(), "[graph] {} of {} half-edges lie on a boundary", seen.len(), 2 * self.edges.len());

        if self.faces.iter().all(|face| face.winding_map.is_some()) {
            let differentials = self.edge_differentials();
            for (key, edge) in &self.edges {
                let (Some(forward), Some(reversed)) = (edge.forward.face, edge.reversed.face) else { continue };
                for &shape_id in &self.shape_ids {
                    let expected = differentials.get(&key).and_then(|d| d.get(&shape_id)).copied().unwrap_or(0);
                    let actual = self.faces[forward.0].winding(shape_id) - self.faces[reversed.0].winding(shape_id);
                    ensure!(
                        actual == expected,
                        "[graph] winding across {key:?} for shape {shape_id} is {actual}, expected {expected}"
                    );
                }
            }
        }
        Ok(())
    }
}
