//! Sweep line used by overlap elimination, intersection elimination and
//! vertex collapse.
//!
//! Items are swept along y by their (expanded) bounding boxes.  A min-heap
//! holds pending start/end events; an R-tree holds the items whose range is
//! currently open and answers candidate queries.  When a pair handler
//! changes the graph, the replacement items are enqueued and the removed
//! ones are dropped lazily: an event or active entry whose key no longer
//! exists in its arena is skipped.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt::Debug;
use std::hash::Hash;

use ahash::AHashMap;
use curvegeom::{expand_rect, Rect};
use rstar::{RTree, RTreeObject, AABB};

use crate::graph::{EdgeKey, Graph, VertexKey};

/// Something the sweep can order and pair up.
pub(crate) trait SweepItem: Copy + Ord + Hash + Debug {
    fn is_alive(self, graph: &Graph) -> bool;
    fn bounds(self, graph: &Graph) -> Rect<f64>;
}

impl SweepItem for EdgeKey {
    #[inline] fn is_alive(self, graph: &Graph) -> bool { graph.edges.contains_key(self) }

    #[inline] fn bounds(self, graph: &Graph) -> Rect<f64> { graph.edges[self].segment.bounds() }
}

impl SweepItem for VertexKey {
    #[inline] fn is_alive(self, graph: &Graph) -> bool { graph.vertices.contains_key(self) }

    #[inline]
    fn bounds(self, graph: &Graph) -> Rect<f64> {
        let point = graph.vertices[self].point;
        Rect::new(point, point)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum EventKind { Start, End }

#[derive(Clone, Copy, Debug)]
struct Event<K> {
    y:    f64,
    kind: EventKind,
    seq:  u64,
    key:  K,
}

impl<K> PartialEq for Event<K> {
    fn eq(&self, other: &Self) -> bool { self.cmp(other) == Ordering::Equal }
}

impl<K> Eq for Event<K> {}

impl<K> Ord for Event<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse so the lowest y pops first; starts before ends so touching
        // ranges still meet.
        other.y.total_cmp(&self.y)
            .then_with(|| other.kind.cmp(&self.kind))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<K> PartialOrd for Event<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

/// An open item in the active structure.
#[derive(Clone, Debug, PartialEq)]
struct Active<K> {
    key:      K,
    envelope: AABB<[f64; 2]>,
}

impl<K: PartialEq> RTreeObject for Active<K> {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope { self.envelope }
}

struct Sweep<K: SweepItem> {
    expansion: f64,
    queue:     BinaryHeap<Event<K>>,
    active:    RTree<Active<K>>,
    open:      AHashMap<K, Active<K>>,
    envelopes: AHashMap<K, Rect<f64>>,
    seq:       u64,
}

impl<K: SweepItem> Sweep<K> {
    fn new(expansion: f64) -> Self {
        Self {
            expansion,
            queue: BinaryHeap::new(),
            active: RTree::new(),
            open: AHashMap::new(),
            envelopes: AHashMap::new(),
            seq: 0,
        }
    }

    fn enqueue(&mut self, graph: &Graph, key: K) {
        let rect = expand_rect(key.bounds(graph), self.expansion);
        self.envelopes.insert(key, rect);
        for (y, kind) in [(rect.min().y, EventKind::Start), (rect.max().y, EventKind::End)] {
            self.queue.push(Event { y, kind, seq: self.seq, key });
            self.seq += 1;
        }
    }

    fn close(&mut self, key: K) {
        if let Some(entry) = self.open.remove(&key) {
            self.active.remove(&entry);
        }
        self.envelopes.remove(&key);
    }

    fn open(&mut self, key: K, rect: Rect<f64>) {
        let entry = Active { key, envelope: AABB::from_corners(rect.min().into(), rect.max().into()) };
        self.active.insert(entry.clone());
        self.open.insert(key, entry);
    }
}

/// Run a sweep over `items`, calling `handle` for every pair whose expanded
/// bounds meet.
///
/// `handle` returns `Some(new_items)` when it changed the graph.  The new
/// items are swept as well; either input that no longer exists afterwards is
/// dropped from the sweep.  Returns the number of pairs that changed the
/// graph.
pub(crate) fn sweep<K, F>(graph: &mut Graph, items: impl IntoIterator<Item = K>, expansion: f64, mut handle: F) -> usize
where
    K: SweepItem,
    F: FnMut(&mut Graph, K, K) -> Option<Vec<K>>,
{
    let mut sweep = Sweep::new(expansion);
    for key in items {
        sweep.enqueue(graph, key);
    }

    let mut changes = 0;
    while let Some(Event { kind, key, .. }) = sweep.queue.pop() {
        if !key.is_alive(graph) {
            sweep.close(key);
            continue;
        }
        let Some(&rect) = sweep.envelopes.get(&key) else { continue };

        match kind {
            EventKind::End => sweep.close(key),
            EventKind::Start => {
                let envelope = AABB::from_corners(rect.min().into(), rect.max().into());
                let mut candidates: Vec<K> = sweep.active
                    .locate_in_envelope_intersecting(&envelope)
                    .map(|entry| entry.key)
                    .collect();
                candidates.sort();

                for other in candidates {
                    if !other.is_alive(graph) {
                        sweep.close(other);
                        continue;
                    }
                    let Some(added) = handle(graph, key, other) else { continue };
                    changes += 1;
                    for new_key in added {
                        sweep.enqueue(graph, new_key);
                    }
                    if !other.is_alive(graph) { sweep.close(other); }
                    if !key.is_alive(graph) { break; }
                }

                if key.is_alive(graph) {
                    sweep.open(key, rect);
                } else {
                    sweep.close(key);
                }
            }
        }
    }
    changes
}

#[cfg(test)]
mod tests {
    use curvegeom::{Coord, Segment};

    use super::*;

    fn c(x: f64, y: f64) -> Coord<f64> { Coord { x, y } }

    #[test]
    fn pairs_only_nearby_items() {
        let mut graph = Graph::new();
        let a = graph.add_vertex(c(0.0, 0.0));
        let b = graph.add_vertex(c(1.0, 0.0));
        let _far = graph.add_vertex(c(0.0, 10.0));
        let _near = graph.add_vertex(c(1.0, 0.5));
        graph.add_edge(Segment::line(c(0.0, 0.0), c(1.0, 0.0)), a, b);

        let keys: Vec<VertexKey> = graph.vertices.keys().collect();
        let mut pairs = Vec::new();
        sweep(&mut graph, keys, 0.6, |_, x, y| { pairs.push((x.min(y), x.max(y))); None });

        // a, b and near are pairwise within range; the far vertex meets nothing.
        assert_eq!(pairs.len(), 3);
    }

    #[test]
    fn removed_items_are_skipped() {
        let mut graph = Graph::new();
        let keys: Vec<VertexKey> = (0..4).map(|_| graph.add_vertex(c(0.0, 0.0))).collect();

        let mut calls = 0;
        let changes = sweep(&mut graph, keys, 0.1, |graph, x, y| {
            calls += 1;
            // Merge every pair into a fresh vertex.
            let point = graph.vertices[x].point;
            graph.remove_vertex(x);
            graph.remove_vertex(y);
            Some(vec![graph.add_vertex(point)])
        });

        assert_eq!(changes, 3);
        assert_eq!(calls, 3);
        assert_eq!(graph.vertex_count(), 1);
    }
}
