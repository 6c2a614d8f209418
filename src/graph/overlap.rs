use curvegeom::{Overlap, Segment};
use tracing::{debug, trace};

use crate::constants::{OVERLAP_THRESHOLD, SWEEP_EXPANSION};
use crate::graph::sweep::sweep;
use crate::graph::{EdgeKey, Graph, HalfEdgeId, VertexKey};

/// Snap parameters within `OVERLAP_THRESHOLD` of an endpoint onto it so no
/// sliver edges are produced.
fn snap(t: f64) -> f64 {
    if t < OVERLAP_THRESHOLD { 0.0 } else if t > 1.0 - OVERLAP_THRESHOLD { 1.0 } else { t }
}

fn is_sizable(overlap: &Overlap) -> bool {
    overlap.t1 - overlap.t0 > OVERLAP_THRESHOLD && overlap.qt1 - overlap.qt0 > OVERLAP_THRESHOLD
}

impl Graph {
    /// Replace every pair of coincident edge stretches by one shared edge.
    /// Returns the number of overlaps split.
    pub fn eliminate_overlap(&mut self) -> usize {
        let keys: Vec<EdgeKey> = self.edges.keys().collect();
        let splits = sweep(self, keys, SWEEP_EXPANSION, |graph, a, b| {
            let overlap = graph.edges[a].segment.overlaps(&graph.edges[b].segment)
                .into_iter()
                .find(is_sizable)?;
            Some(graph.split_overlap(a, b, overlap))
        });
        debug!("overlap: {splits} split(s), {} edges", self.edge_count());
        splits
    }

    /// Split edges `a` and `b` around their shared stretch.  The stretch
    /// becomes one middle edge following `a`'s direction; whatever is left of
    /// either edge before or after it becomes its own edge.  Returns the new
    /// edges.
    pub(crate) fn split_overlap(&mut self, a: EdgeKey, b: EdgeKey, overlap: Overlap) -> Vec<EdgeKey> {
        let a_edge = self.edges[a].clone();
        let b_edge = self.edges[b].clone();

        let (t0, t1) = (snap(overlap.t0), snap(overlap.t1));
        let (qt0, qt1) = (snap(overlap.qt0), snap(overlap.qt1));
        let same_direction = overlap.a > 0.0;
        let (q_at_t0, q_at_t1) = if same_direction { (qt0, qt1) } else { (qt1, qt0) };

        trace!("overlap: {a:?} [{t0}, {t1}] with {b:?} [{qt0}, {qt1}]");

        let shared_vertex = |graph: &mut Graph, t: f64, q: f64, a_end: VertexKey, a_at: f64| {
            if t == a_at { a_end }
            else if q == 0.0 { b_edge.start }
            else if q == 1.0 { b_edge.end }
            else { graph.add_vertex(a_edge.segment.position_at(t)) }
        };
        let v0 = shared_vertex(self, t0, q_at_t0, a_edge.start, 0.0);
        let v1 = shared_vertex(self, t1, q_at_t1, a_edge.end, 1.0);

        let middle = self.add_edge(a_edge.segment.slice(t0, t1), v0, v1);
        let mut added = vec![middle];

        let mut piece = |graph: &mut Graph, segment: Segment, start: VertexKey, end: VertexKey| {
            let key = graph.add_edge(segment, start, end);
            added.push(key);
            HalfEdgeId::forward(key)
        };

        let mut a_halves = Vec::with_capacity(3);
        if t0 > 0.0 { a_halves.push(piece(self, a_edge.segment.slice(0.0, t0), a_edge.start, v0)); }
        a_halves.push(HalfEdgeId::forward(middle));
        if t1 < 1.0 { a_halves.push(piece(self, a_edge.segment.slice(t1, 1.0), v1, a_edge.end)); }

        let (b_first, b_last) = if same_direction { (v0, v1) } else { (v1, v0) };
        let mut b_halves = Vec::with_capacity(3);
        if qt0 > 0.0 { b_halves.push(piece(self, b_edge.segment.slice(0.0, qt0), b_edge.start, b_first)); }
        b_halves.push(if same_direction { HalfEdgeId::forward(middle) } else { HalfEdgeId::backward(middle) });
        if qt1 < 1.0 { b_halves.push(piece(self, b_edge.segment.slice(qt1, 1.0), b_last, b_edge.end)); }

        self.remove_edge(a);
        self.remove_edge(b);
        self.replace_edge_in_loops(a, &a_halves);
        self.replace_edge_in_loops(b, &b_halves);
        added
    }
}
