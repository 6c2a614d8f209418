use curvegeom::{Shape, Subpath};
use slotmap::SecondaryMap;
use tracing::{debug, warn};

use crate::graph::{BoundaryId, FaceId, Graph, VertexKey, WindingMap, UNBOUNDED_FACE};

impl Graph {
    /// Mark each face filled according to `filter` applied to its winding
    /// map.  Faces without a winding map are left unfilled.
    pub fn compute_face_inclusion(&mut self, filter: impl Fn(&WindingMap) -> bool) {
        for face in &mut self.faces {
            face.filled = face.winding_map.as_ref().is_some_and(&filter);
        }
        debug!("fill: {} face(s) filled", self.faces.iter().filter(|f| f.filled).count());
    }

    /// A new graph holding only the edges that separate a filled face from
    /// an unfilled one, each oriented with the filled side on its left.
    /// Collinear lines are joined and faces are re-extracted and two-colored.
    pub fn create_filled_sub_graph(&self) -> Graph {
        let mut sub = Graph::new();
        let mut vertex_map: SecondaryMap<VertexKey, VertexKey> = SecondaryMap::new();
        let filled = |face: Option<FaceId>| face.is_some_and(|id| self.faces[id.0].filled);

        for edge in self.edges.values() {
            let (forward_filled, reversed_filled) = (filled(edge.forward.face), filled(edge.reversed.face));
            if forward_filled == reversed_filled { continue; }

            let mut copy = |vertex: VertexKey| match vertex_map.get(vertex) {
                Some(&copied) => copied,
                None => {
                    let copied = sub.add_vertex(self.vertices[vertex].point);
                    vertex_map.insert(vertex, copied);
                    copied
                }
            };
            let (start, end) = (copy(edge.start), copy(edge.end));
            if forward_filled {
                sub.add_edge(edge.segment, start, end);
            } else {
                sub.add_edge(edge.segment.reversed(), end, start);
            }
        }
        sub.shape_ids = self.shape_ids.clone();

        sub.collapse_adjacent_edges();
        sub.order_vertex_edges();
        sub.extract_faces();
        sub.compute_boundary_tree();
        sub.fill_alternating_faces();
        debug!("fill: sub-graph with {} edges, {} bounded faces", sub.edge_count(), sub.bounded_face_count());
        sub
    }

    /// Two-color the faces: the unbounded face is unfilled and every edge
    /// separates a filled face from an unfilled one.
    pub fn fill_alternating_faces(&mut self) {
        let mut colors: Vec<Option<bool>> = vec![None; self.faces.len()];
        colors[UNBOUNDED_FACE.0] = Some(false);

        loop {
            let mut progress = false;
            let mut pending = false;
            for edge in self.edges.values() {
                let (Some(forward), Some(reversed)) = (edge.forward.face, edge.reversed.face) else { continue };
                match (colors[forward.0], colors[reversed.0]) {
                    (Some(filled), None) => { colors[reversed.0] = Some(!filled); progress = true; }
                    (None, Some(filled)) => { colors[forward.0] = Some(!filled); progress = true; }
                    (None, None) => pending = true,
                    (Some(_), Some(_)) => {}
                }
            }
            if !pending { break; }
            if !progress {
                warn!("fill: some faces are unreachable from the unbounded face");
                break;
            }
        }

        for (face, color) in self.faces.iter_mut().zip(colors) {
            face.filled = color.unwrap_or(false);
        }
    }

    /// Rebuild the filled faces as a shape: each face's boundary and holes
    /// become closed subpaths.
    pub fn faces_to_shape(&self) -> Shape {
        let mut subpaths = Vec::new();
        for face in self.faces.iter().filter(|face| face.filled) {
            let Some(boundary) = face.boundary else { continue };
            subpaths.push(self.boundary_subpath(boundary));
            subpaths.extend(face.holes.iter().map(|&hole| self.boundary_subpath(hole)));
        }
        Shape::new(subpaths)
    }

    fn boundary_subpath(&self, id: BoundaryId) -> Subpath {
        let segments = self.boundaries[id.0].half_edges.iter().map(|&half| self.half_segment(half)).collect();
        Subpath::new(segments, true)
    }
}

#[cfg(test)]
mod tests {
    use curvegeom::Coord;

    use super::*;
    use crate::graph::AddOptions;

    fn nonzero(map: &WindingMap) -> bool { map.values().any(|&w| w != 0) }

    #[test]
    fn inclusion_follows_filter() {
        let mut graph = Graph::new();
        graph.add_shape(0, &Shape::rectangle(0.0, 0.0, 1.0, 1.0), AddOptions::default());
        graph.compute_simplified_faces();
        graph.compute_face_inclusion(nonzero);
        assert!(!graph.face(UNBOUNDED_FACE).filled);
        assert_eq!(graph.faces().filter(|(_, f)| f.filled).count(), 1);

        graph.compute_face_inclusion(|_| false);
        assert!((graph.filled_area()).abs() < 1e-12);
    }

    #[test]
    fn sub_graph_drops_interior_edges() {
        // Two squares sharing a side: the shared side has filled faces on
        // both sides and disappears.
        let mut graph = Graph::new();
        graph.add_shape(0, &Shape::rectangle(0.0, 0.0, 1.0, 1.0), AddOptions::default());
        graph.add_shape(1, &Shape::rectangle(1.0, 0.0, 1.0, 1.0), AddOptions::default());
        graph.compute_simplified_faces();
        graph.compute_face_inclusion(nonzero);

        let sub = graph.create_filled_sub_graph();
        assert_eq!(sub.edge_count(), 4);
        assert_eq!(sub.bounded_face_count(), 1);
        assert!((sub.filled_area() - 2.0).abs() < 1e-12);

        let shape = sub.faces_to_shape();
        assert_eq!(shape.subpaths.len(), 1);
        assert_eq!(shape.segment_count(), 4);
        assert!((shape.signed_area() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn alternating_fill_colors_nested_rings() {
        let mut graph = Graph::new();
        for (i, size) in [4.0, 3.0, 2.0, 1.0].into_iter().enumerate() {
            let offset = (4.0 - size) / 2.0;
            graph.add_shape(i as u32, &Shape::rectangle(offset, offset, size, size), AddOptions::default());
        }
        graph.order_vertex_edges();
        graph.extract_faces();
        graph.compute_boundary_tree();
        graph.fill_alternating_faces();

        // Rings alternate filled, empty, filled, empty from the outside in.
        let point_filled = |p: Coord<f64>| graph.faces_to_shape().contains_point(p);
        assert!(point_filled(Coord { x: 0.25, y: 2.0 }));
        assert!(!point_filled(Coord { x: 0.75, y: 2.0 }));
        assert!(point_filled(Coord { x: 1.25, y: 2.0 }));
        assert!(!point_filled(Coord { x: 2.0, y: 2.0 }));
    }
}
