use slotmap::SecondaryMap;
use tracing::{debug, trace};

use crate::graph::{EdgeKey, Graph, VertexKey};

/// One level of the explicit DFS stack.
struct Frame {
    vertex: VertexKey,
    /// Edge used to reach `vertex`; `None` at a root.
    parent: Option<EdgeKey>,
    /// Next incident half-edge to explore.
    next:   usize,
}

impl Graph {
    /// Edges whose removal disconnects their component.
    ///
    /// Tarjan's low-link DFS, run iteratively.  Only the exact edge a vertex
    /// was reached through is skipped, so a second edge parallel to it still
    /// counts as a back edge.
    pub fn find_bridges(&self) -> Vec<EdgeKey> {
        let mut visit: SecondaryMap<VertexKey, usize> = SecondaryMap::new();
        let mut low: SecondaryMap<VertexKey, usize> = SecondaryMap::new();
        let mut counter = 0;
        let mut bridges = Vec::new();

        for root in self.vertices.keys() {
            if visit.contains_key(root) { continue; }
            visit.insert(root, counter);
            low.insert(root, counter);
            counter += 1;

            let mut stack = vec![Frame { vertex: root, parent: None, next: 0 }];
            while let Some(frame) = stack.last_mut() {
                let (vertex, parent) = (frame.vertex, frame.parent);
                let incident = &self.vertices[vertex].incident;

                if let Some(&half) = incident.get(frame.next) {
                    frame.next += 1;
                    if Some(half.edge) == parent { continue; }
                    let neighbor = self.half_start(half);
                    if let Some(&order) = visit.get(neighbor) {
                        low[vertex] = low[vertex].min(order);
                    } else {
                        visit.insert(neighbor, counter);
                        low.insert(neighbor, counter);
                        counter += 1;
                        stack.push(Frame { vertex: neighbor, parent: Some(half.edge), next: 0 });
                    }
                    continue;
                }

                stack.pop();
                if let (Some(edge), Some(up)) = (parent, stack.last()) {
                    let child_low = low[vertex];
                    low[up.vertex] = low[up.vertex].min(child_low);
                    if child_low > visit[up.vertex] {
                        bridges.push(edge);
                    }
                }
            }
        }
        bridges
    }

    /// Remove every bridge from the graph and from all loops.  A bridge has
    /// the same face on both sides, so no enclosed area changes.
    pub fn remove_bridges(&mut self) -> usize {
        let bridges = self.find_bridges();
        for &edge in &bridges {
            trace!("bridge: removing {edge:?}");
            self.remove_edge(edge);
            self.replace_edge_in_loops(edge, &[]);
        }
        debug!("bridge: {} removed", bridges.len());
        bridges.len()
    }

    /// Repeatedly remove vertices with fewer than two incident half-edges,
    /// along with their dangling edges.  Returns the number of vertices
    /// removed.
    pub fn remove_low_order_vertices(&mut self) -> usize {
        let mut removed = 0;
        loop {
            let low_order: Vec<VertexKey> = self.vertices.iter()
                .filter(|(_, vertex)| vertex.degree() < 2)
                .map(|(key, _)| key)
                .collect();
            if low_order.is_empty() { break; }

            for key in low_order {
                let edges: Vec<EdgeKey> = self.vertices[key].incident.iter().map(|half| half.edge).collect();
                for edge in edges {
                    if self.remove_edge(edge).is_some() {
                        self.replace_edge_in_loops(edge, &[]);
                    }
                }
                self.remove_vertex(key);
                removed += 1;
            }
        }
        debug!("low-order: {removed} vertices removed, {} remain", self.vertex_count());
        removed
    }
}
