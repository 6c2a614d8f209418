//! Boolean operations on shapes, each a short composition of the graph
//! pipeline: add tagged shapes, simplify, select faces, rebuild.

use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};
use curvegeom::{Segment, Shape, Subpath};
use tracing::debug;

use crate::graph::{AddOptions, Graph, ShapeId, WindingMap};

/// Whether `shape_id` winds around a face under the nonzero rule.
#[inline]
pub fn is_inside(map: &WindingMap, shape_id: ShapeId) -> bool {
    map.get(&shape_id).is_some_and(|&w| w != 0)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Union,
    Intersection,
    Difference,
    Xor,
}

impl BinaryOp {
    /// Whether a point inside `a`/`b` (as flagged) belongs to the result.
    pub fn combine(self, a: bool, b: bool) -> bool {
        match self {
            BinaryOp::Union        => a || b,
            BinaryOp::Intersection => a && b,
            BinaryOp::Difference   => a && !b,
            BinaryOp::Xor          => a != b,
        }
    }

    /// Nonzero winding filter over shape ids `0` (first operand) and `1`.
    pub fn filter(self) -> impl Fn(&WindingMap) -> bool {
        move |map| self.combine(is_inside(map, 0), is_inside(map, 1))
    }

    pub fn apply(self, a: &Shape, b: &Shape) -> Shape {
        binary_result(a, b, self.filter())
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinaryOp::Union        => "union",
            BinaryOp::Intersection => "intersection",
            BinaryOp::Difference   => "difference",
            BinaryOp::Xor          => "xor",
        })
    }
}

impl FromStr for BinaryOp {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "union"        => BinaryOp::Union,
            "intersection" => BinaryOp::Intersection,
            "difference"   => BinaryOp::Difference,
            "xor"          => BinaryOp::Xor,
            _ => bail!("[ops] unknown operation {s:?}"),
        })
    }
}

/// Run the whole pipeline over `shapes` (tagged `0..n` in order) and
/// rebuild the faces selected by `filter`.
pub fn fill_shapes(shapes: &[Shape], filter: impl Fn(&WindingMap) -> bool) -> Shape {
    let mut graph = Graph::new();
    for (id, shape) in shapes.iter().enumerate() {
        graph.add_shape(id as ShapeId, shape, AddOptions::default());
    }
    graph.compute_simplified_faces();
    graph.compute_face_inclusion(filter);

    let filled = graph.create_filled_sub_graph();
    let result = filled.faces_to_shape();
    debug!("ops: {} input shape(s) -> {} subpath(s)", shapes.len(), result.subpaths.len());
    result
}

/// Combine `a` (shape id `0`) and `b` (shape id `1`) under `filter`.
pub fn binary_result(a: &Shape, b: &Shape, filter: impl Fn(&WindingMap) -> bool) -> Shape {
    fill_shapes(&[a.clone(), b.clone()], filter)
}

pub fn union_non_zero(shapes: &[Shape]) -> Shape {
    fill_shapes(shapes, |map| map.values().any(|&w| w != 0))
}

pub fn intersection_non_zero(shapes: &[Shape]) -> Shape {
    if shapes.is_empty() { return Shape::empty(); }
    let count = shapes.len() as ShapeId;
    fill_shapes(shapes, move |map| (0..count).all(|id| is_inside(map, id)))
}

/// Points covered by an odd number of the shapes.
pub fn xor_non_zero(shapes: &[Shape]) -> Shape {
    fill_shapes(shapes, |map| map.values().filter(|&&w| w != 0).count() % 2 == 1)
}

/// Resolve self-intersections and overlaps under the nonzero rule.
pub fn simplify_non_zero(shape: &Shape) -> Shape {
    fill_shapes(std::slice::from_ref(shape), |map| is_inside(map, 0))
}

// ---------------------------------------------------------------------------
// Clipping
// ---------------------------------------------------------------------------

/// Which parts of the clipped shape to keep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClipOptions {
    pub include_exterior: bool,
    pub include_boundary: bool,
    pub include_interior: bool,
}

impl Default for ClipOptions {
    fn default() -> Self {
        Self { include_exterior: false, include_boundary: true, include_interior: true }
    }
}

const CLIPPED: ShapeId = 0;
const CLIP_REGION: ShapeId = 1;

/// Cut `shape`'s outline (open or closed) against the filled region `clip`,
/// keeping the pieces inside, outside or along the region's boundary as
/// `options` asks.  Pieces of a closed subpath that survive whole stay
/// closed; otherwise each run of kept pieces becomes an open subpath.
pub fn clip_shape(clip: &Shape, shape: &Shape, options: ClipOptions) -> Shape {
    let clip = simplify_non_zero(clip);

    let mut graph = Graph::new();
    graph.add_shape(CLIPPED, shape, AddOptions { ensure_closed: false });
    graph.add_shape(CLIP_REGION, &clip, AddOptions::default());
    graph.eliminate_overlap();
    graph.eliminate_self_intersection();
    graph.eliminate_intersection();
    graph.collapse_vertices();

    let clip_edges: Vec<_> = graph.loops().iter()
        .filter(|lp| lp.shape_id == CLIP_REGION)
        .flat_map(|lp| lp.half_edges.iter().map(|h| h.edge))
        .collect();
    for edge in clip_edges {
        graph.edges[edge].clip = true;
    }

    let mut subpaths = Vec::new();
    for lp in graph.loops().iter().filter(|lp| lp.shape_id == CLIPPED && !lp.half_edges.is_empty()) {
        let pieces: Vec<(Segment, bool)> = lp.half_edges.iter()
            .map(|&half| {
                let segment = graph.half_segment(half);
                let keep = if graph.edge(half.edge).clip {
                    options.include_boundary
                } else if clip.contains_point(segment.position_at(0.5)) {
                    options.include_interior
                } else {
                    options.include_exterior
                };
                (segment, keep)
            })
            .collect();

        let has_gap = pieces.iter().any(|&(_, keep)| !keep);
        let mut runs: Vec<Vec<Segment>> = Vec::new();
        let mut run = Vec::new();
        for &(segment, keep) in &pieces {
            if keep {
                run.push(segment);
            } else if !run.is_empty() {
                runs.push(std::mem::take(&mut run));
            }
        }
        if !run.is_empty() { runs.push(run); }

        // A closed loop cut open: its last run continues into its first.
        let wraps = lp.closed && has_gap && pieces[0].1 && pieces[pieces.len() - 1].1 && runs.len() > 1;
        if wraps {
            if let Some(mut last) = runs.pop() {
                last.append(&mut runs[0]);
                runs[0] = last;
            }
        }
        subpaths.extend(runs.into_iter().map(|segments| Subpath::new(segments, lp.closed && !has_gap)));
    }
    debug!("clip: {} subpath(s) kept", subpaths.len());
    Shape::new(subpaths)
}
