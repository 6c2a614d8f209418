use curvegeom::{CoordExt, Coord, Segment, SegmentIntersection};
use tracing::{debug, trace};

use crate::constants::{INTERSECTION_ENDPOINT_THRESHOLD_DISTANCE, SPLIT_ENDPOINT_THRESHOLD_DISTANCE, SWEEP_EXPANSION, T_THRESHOLD};
use crate::graph::sweep::sweep;
use crate::graph::{EdgeKey, Graph, HalfEdgeId, VertexKey};

/// Whether `point` (at parameter `t`) lies strictly inside `segment`: away
/// from both ends in parameter and farther than `threshold` from both
/// endpoints.
fn is_internal(segment: &Segment, t: f64, point: Coord<f64>, threshold: f64) -> bool {
    t > T_THRESHOLD && t < 1.0 - T_THRESHOLD
        && point.distance(segment.start()) > threshold
        && point.distance(segment.end()) > threshold
}

impl Graph {
    /// Split every cubic that crosses itself into three edges; the middle one
    /// is a self-loop at the crossing.  Returns the number of edges split.
    pub fn eliminate_self_intersection(&mut self) -> usize {
        let keys: Vec<EdgeKey> = self.edges.keys().collect();
        let mut splits = 0;
        for key in keys {
            let edge = &self.edges[key];
            let Some(crossing) = edge.segment.self_intersection() else { continue };
            let pieces = edge.segment.subdivisions(&[crossing.a_t, crossing.b_t]);
            let [head, knot, tail] = pieces.as_slice() else { continue };
            let (start, end) = (edge.start, edge.end);
            let (head, knot, tail) = (*head, *knot, *tail);

            trace!("self-intersection: {key:?} at t = {} / {}", crossing.a_t, crossing.b_t);
            let vertex = self.add_vertex(crossing.point);
            let chain = [
                self.add_edge(head, start, vertex),
                self.add_edge(knot, vertex, vertex),
                self.add_edge(tail, vertex, end),
            ];
            self.remove_edge(key);
            self.replace_edge_in_loops(key, &chain.map(HalfEdgeId::forward));
            splits += 1;
        }
        debug!("self-intersection: {splits} edge(s) split");
        splits
    }

    /// Split edges at their mutual crossings until no two edges cross away
    /// from their endpoints.  Returns the number of crossings resolved.
    pub fn eliminate_intersection(&mut self) -> usize {
        let keys: Vec<EdgeKey> = self.edges.keys().collect();
        let splits = sweep(self, keys, SWEEP_EXPANSION, |graph, a, b| {
            let (sa, sb) = (graph.edges[a].segment, graph.edges[b].segment);
            let hit = sa.intersect(&sb).into_iter().find(|hit| {
                is_internal(&sa, hit.a_t, hit.point, INTERSECTION_ENDPOINT_THRESHOLD_DISTANCE)
                    || is_internal(&sb, hit.b_t, hit.point, INTERSECTION_ENDPOINT_THRESHOLD_DISTANCE)
            })?;
            graph.simple_split(a, b, hit)
        });
        debug!("intersection: {splits} crossing(s) split, {} edges", self.edge_count());
        splits
    }

    /// Split `a` and `b` at one crossing.  A side whose crossing is at (or
    /// within `SPLIT_ENDPOINT_THRESHOLD_DISTANCE` of) one of its endpoints is
    /// left whole and lends the nearer endpoint as the split vertex.  Returns
    /// the new edges, or `None` if neither side needed splitting.
    pub(crate) fn simple_split(&mut self, a: EdgeKey, b: EdgeKey, hit: SegmentIntersection) -> Option<Vec<EdgeKey>> {
        let (sa, sb) = (self.edges[a].segment, self.edges[b].segment);
        let a_internal = is_internal(&sa, hit.a_t, hit.point, SPLIT_ENDPOINT_THRESHOLD_DISTANCE);
        let b_internal = is_internal(&sb, hit.b_t, hit.point, SPLIT_ENDPOINT_THRESHOLD_DISTANCE);

        let vertex = match (a_internal, b_internal) {
            (false, false) => return None,
            (true, true) => self.add_vertex(hit.point),
            (true, false) => self.nearer_endpoint(b, hit.point),
            (false, true) => self.nearer_endpoint(a, hit.point),
        };
        trace!("intersection: {a:?} at {} / {b:?} at {} -> {vertex:?}", hit.a_t, hit.b_t);

        let mut added = Vec::with_capacity(4);
        if a_internal { added.extend(self.split_edge(a, hit.a_t, vertex)); }
        if b_internal { added.extend(self.split_edge(b, hit.b_t, vertex)); }
        Some(added)
    }

    fn nearer_endpoint(&self, edge: EdgeKey, point: Coord<f64>) -> VertexKey {
        let edge = &self.edges[edge];
        let start = self.vertices[edge.start].point.distance(point);
        let end = self.vertices[edge.end].point.distance(point);
        if start <= end { edge.start } else { edge.end }
    }

    /// Replace `edge` by its two pieces on either side of `t`, meeting at
    /// `vertex`.
    pub(crate) fn split_edge(&mut self, edge: EdgeKey, t: f64, vertex: VertexKey) -> [EdgeKey; 2] {
        let (segment, start, end) = {
            let e = &self.edges[edge];
            (e.segment, e.start, e.end)
        };
        let (head, tail) = segment.subdivided(t);
        let pieces = [self.add_edge(head, start, vertex), self.add_edge(tail, vertex, end)];
        self.remove_edge(edge);
        self.replace_edge_in_loops(edge, &pieces.map(HalfEdgeId::forward));
        pieces
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: f64, y: f64) -> Coord<f64> { Coord { x, y } }

    fn add_line(graph: &mut Graph, p: Coord<f64>, q: Coord<f64>) -> EdgeKey {
        let a = graph.add_vertex(p);
        let b = graph.add_vertex(q);
        graph.add_edge(Segment::line(p, q), a, b)
    }

    #[test]
    fn crossing_lines_share_new_vertex() {
        let mut graph = Graph::new();
        add_line(&mut graph, c(0.0, 0.0), c(2.0, 2.0));
        add_line(&mut graph, c(0.0, 2.0), c(2.0, 0.0));

        assert_eq!(graph.eliminate_intersection(), 1);
        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.vertex_count(), 5);

        let center = graph.vertices().find(|(_, v)| v.degree() == 4).map(|(_, v)| v.point);
        let center = center.expect("no shared crossing vertex");
        assert!(center.distance(c(1.0, 1.0)) < 1e-12);
    }

    #[test]
    fn t_junction_reuses_endpoint() {
        let mut graph = Graph::new();
        add_line(&mut graph, c(0.0, 0.0), c(2.0, 0.0));
        let stem = add_line(&mut graph, c(1.0, 0.0), c(1.0, 1.0));

        assert_eq!(graph.eliminate_intersection(), 1);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.vertex_count(), 4);
        assert_eq!(graph.vertex(graph.edge(stem).start).degree(), 3);
    }

    #[test]
    fn endpoint_contacts_are_ignored() {
        let mut graph = Graph::new();
        add_line(&mut graph, c(0.0, 0.0), c(1.0, 0.0));
        add_line(&mut graph, c(1.0, 0.0), c(1.0, 1.0));
        assert_eq!(graph.eliminate_intersection(), 0);
    }

    #[test]
    fn many_crossings_are_all_split() {
        let mut graph = Graph::new();
        // A 3x3 grid of segments crossing at 9 points.
        for i in 1..=3 {
            let x = i as f64;
            add_line(&mut graph, c(x, 0.0), c(x, 4.0));
            add_line(&mut graph, c(0.0, x), c(4.0, x));
        }
        assert_eq!(graph.eliminate_intersection(), 9);
        assert_eq!(graph.edge_count(), 24);
        assert_eq!(graph.vertices().filter(|(_, v)| v.degree() == 4).count(), 9);
    }

    #[test]
    fn looping_cubic_gets_self_loop() {
        let mut graph = Graph::new();
        let p0 = c(0.0, 0.0);
        let p3 = c(1.0, 0.0);
        let a = graph.add_vertex(p0);
        let b = graph.add_vertex(p3);
        graph.add_edge(Segment::cubic(p0, c(2.0, 1.0), c(-1.0, 1.0), p3), a, b);

        assert_eq!(graph.eliminate_self_intersection(), 1);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.edges().filter(|(_, e)| e.is_self_loop()).count(), 1);
    }
}
