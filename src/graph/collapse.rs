use curvegeom::{CoordExt, Segment};
use tracing::{debug, trace};

use crate::constants::{COLLINEAR_THRESHOLD, SELF_LOOP_MIN_SIZE, VERTEX_COLLAPSE_THRESHOLD_DISTANCE};
use crate::graph::sweep::sweep;
use crate::graph::{EdgeKey, Graph, HalfEdgeId, VertexKey};

impl Graph {
    /// Merge vertices closer than `VERTEX_COLLAPSE_THRESHOLD_DISTANCE`.
    /// Returns the number of merges.
    pub fn collapse_vertices(&mut self) -> usize {
        let keys: Vec<VertexKey> = self.vertices.keys().collect();
        let merges = sweep(self, keys, 10.0 * VERTEX_COLLAPSE_THRESHOLD_DISTANCE, |graph, a, b| {
            let distance = graph.vertices[a].point.distance(graph.vertices[b].point);
            (distance < VERTEX_COLLAPSE_THRESHOLD_DISTANCE).then(|| vec![graph.merge_vertices(a, b)])
        });
        debug!("collapse: {merges} merge(s), {} vertices", self.vertex_count());
        merges
    }

    /// Replace `a` and `b` by one vertex at their midpoint, re-pointing every
    /// edge that touched either.  An edge running between the two becomes a
    /// self-loop if it is a visible curve and is dropped otherwise.
    fn merge_vertices(&mut self, a: VertexKey, b: VertexKey) -> VertexKey {
        let (pa, pb) = (self.vertices[a].point, self.vertices[b].point);
        let merged = self.add_vertex(if pa == pb { pa } else { pa.average(pb) });
        trace!("collapse: {a:?} + {b:?} -> {merged:?}");

        let mut touching: Vec<EdgeKey> = self.vertices[a].incident.iter()
            .chain(self.vertices[b].incident.iter())
            .map(|half| half.edge)
            .collect();
        touching.sort();
        touching.dedup();

        let remap = |v: VertexKey| if v == a || v == b { merged } else { v };
        for key in touching {
            let Some(edge) = self.remove_edge(key) else { continue };
            let joins_pair = (edge.start == a && edge.end == b) || (edge.start == b && edge.end == a);
            if joins_pair {
                let bounds = edge.segment.bounds();
                let visible = bounds.width() > SELF_LOOP_MIN_SIZE || bounds.height() > SELF_LOOP_MIN_SIZE;
                if !(edge.segment.is_curved() && visible) {
                    self.replace_edge_in_loops(key, &[]);
                    continue;
                }
            }
            let replacement = self.add_edge(edge.segment, remap(edge.start), remap(edge.end));
            self.replace_edge_in_loops(key, &[HalfEdgeId::forward(replacement)]);
        }

        self.remove_vertex(a);
        self.remove_vertex(b);
        merged
    }

    /// Join pairs of collinear lines meeting at a vertex of degree two.
    /// Returns the number of vertices removed.
    pub fn collapse_adjacent_edges(&mut self) -> usize {
        let keys: Vec<VertexKey> = self.vertices.keys().collect();
        let mut joins = 0;
        for key in keys {
            let Some(vertex) = self.vertices.get(key) else { continue };
            let &[first, second] = vertex.incident.as_slice() else { continue };
            if first.edge == second.edge { continue; }
            if !self.edges[first.edge].segment.is_line() || !self.edges[second.edge].segment.is_line() { continue; }

            // Path runs from the far end of `first`, through `key`, to the far
            // end of `second`.
            let (from, to) = (self.half_start(first), self.half_start(second));
            if from == to { continue; }
            let (p_from, p_mid, p_to) = (self.vertices[from].point, vertex.point, self.vertices[to].point);
            let incoming = (p_mid - p_from).normalized();
            let outgoing = (p_to - p_mid).normalized();
            if (incoming - outgoing).magnitude() >= COLLINEAR_THRESHOLD { continue; }

            let joined = self.add_edge(Segment::line(p_from, p_to), from, to);
            self.remove_edge(first.edge);
            self.remove_edge(second.edge);
            self.replace_edge_in_loops(first.edge, &[HalfEdgeId { edge: joined, reversed: first.reversed }]);
            self.replace_edge_in_loops(second.edge, &[]);
            self.remove_vertex(key);
            joins += 1;
        }
        debug!("collapse: {joins} collinear join(s)");
        joins
    }
}

#[cfg(test)]
mod tests {
    use curvegeom::{Coord, Shape, Subpath};

    use super::*;
    use crate::graph::AddOptions;

    fn c(x: f64, y: f64) -> Coord<f64> { Coord { x, y } }

    #[test]
    fn near_vertices_merge_and_edges_follow() {
        let mut graph = Graph::new();
        let a = graph.add_vertex(c(0.0, 0.0));
        let b = graph.add_vertex(c(1.0, 0.0));
        let b2 = graph.add_vertex(c(1.0, 4e-6));
        let d = graph.add_vertex(c(2.0, 0.0));
        graph.add_edge(Segment::line(c(0.0, 0.0), c(1.0, 0.0)), a, b);
        graph.add_edge(Segment::line(c(1.0, 4e-6), c(2.0, 0.0)), b2, d);

        assert_eq!(graph.collapse_vertices(), 1);
        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        let middle = graph.vertices().find(|(_, v)| v.degree() == 2).map(|(_, v)| v.point);
        assert_eq!(middle, Some(c(1.0, 2e-6)));
        assert!(graph.check_invariants().is_ok());
    }

    #[test]
    fn short_edge_between_merged_vertices_is_dropped() {
        let mut graph = Graph::new();
        let path = Subpath::from_points(&[c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1e-6), c(0.0, 1.0)], true);
        graph.add_subpath(0, &path, AddOptions::default());

        assert_eq!(graph.collapse_vertices(), 1);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.loops()[0].half_edges.len(), 3);
    }

    #[test]
    fn curved_edge_between_merged_vertices_survives() {
        let mut graph = Graph::new();
        let a = graph.add_vertex(c(0.0, 0.0));
        let b = graph.add_vertex(c(1e-6, 0.0));
        graph.add_edge(Segment::cubic(c(0.0, 0.0), c(-1.0, 1.0), c(1.0, 1.0), c(1e-6, 0.0)), a, b);

        assert_eq!(graph.collapse_vertices(), 1);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.edges().all(|(_, e)| e.is_self_loop()));
    }

    #[test]
    fn collinear_lines_join() {
        let mut graph = Graph::new();
        let path = Subpath::from_points(&[c(0.0, 0.0), c(1.0, 0.0), c(2.0, 0.0), c(2.0, 2.0), c(0.0, 2.0)], true);
        graph.add_subpath(0, &path, AddOptions::default());

        assert_eq!(graph.collapse_adjacent_edges(), 1);
        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.loops()[0].half_edges.len(), 4);
        assert!((graph.loops()[0].half_edges.iter()
            .map(|&h| graph.half_segment(h).signed_area_fragment())
            .sum::<f64>() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn corners_are_kept() {
        let mut graph = Graph::new();
        graph.add_shape(0, &Shape::rectangle(0.0, 0.0, 1.0, 1.0), AddOptions::default());
        assert_eq!(graph.collapse_adjacent_edges(), 0);
    }
}
