use std::f64::consts::{PI, TAU};
use std::ops::Range;

use ahash::{AHashMap, AHashSet};
use curvegeom::{merge_rects, CoordExt, Coord, Ray, Rect};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};
use tracing::{debug, warn};

use crate::constants::{ANGLE_TIE_THRESHOLD, BOUNDARY_RAY_ANGLES, CURVATURE_TIE_THRESHOLD, T_THRESHOLD};
use crate::graph::{
    Boundary, BoundaryId, EdgeKey, Face, FaceId, Graph, HalfEdgeId, ShapeId, VertexKey, WindingMap, UNBOUNDED_FACE,
};

/// Hits closer than this to the ray origin are contacts with the boundary
/// being nested, not with a neighbour.
const MIN_RAY_DISTANCE: f64 = 1e-10;

/// A ray crossing an edge at less than this sine of the angle between them
/// is treated as grazing.
const GRAZING_THRESHOLD: f64 = 1e-6;

type EdgeBox = GeomWithData<Rectangle<[f64; 2]>, EdgeKey>;

#[derive(Clone, Copy, Debug)]
struct RayHit {
    edge:  EdgeKey,
    t:     f64,
    /// Cross product of the ray direction with the edge tangent at the hit.
    cross: f64,
}

impl RayHit {
    fn is_degenerate(&self) -> bool {
        self.t < T_THRESHOLD || self.t > 1.0 - T_THRESHOLD || self.cross.abs() < GRAZING_THRESHOLD
    }

    /// The half-edge whose left side faces the ray origin.
    fn facing_half(&self) -> HalfEdgeId {
        HalfEdgeId { edge: self.edge, reversed: self.cross <= 0.0 }
    }
}

/// Parameter distance used to look a short way along a leaving edge.
const AHEAD_T: f64 = 1e-3;

/// An incident half-edge seen from its vertex.
#[derive(Clone, Copy, Debug)]
struct Leaving {
    half:      HalfEdgeId,
    angle:     f64,
    /// Signed curvature along the leaving direction.
    curvature: f64,
    /// Angle from the vertex to a point a short way along the edge.
    ahead:     f64,
}

fn sort_leaving(leaving: &mut [Leaving]) {
    leaving.sort_by(|a, b| a.angle.total_cmp(&b.angle));
    let Some(first) = leaving.first().map(|l| l.angle) else { return };

    // Directions just below +π tie with those just above −π.
    let mut wrapped = false;
    for l in leaving.iter_mut() {
        if l.angle - TAU > first - ANGLE_TIE_THRESHOLD {
            l.angle -= TAU;
            wrapped = true;
        }
    }
    if wrapped { leaving.sort_by(|a, b| a.angle.total_cmp(&b.angle)); }

    for run in tied_runs(leaving, |a, b| b.angle - a.angle < ANGLE_TIE_THRESHOLD) {
        let base = leaving[run.start].angle;
        let tied = &mut leaving[run];
        tied.sort_by(|a, b| a.curvature.total_cmp(&b.curvature));
        for inner in tied_runs(tied, |a, b| b.curvature - a.curvature < CURVATURE_TIE_THRESHOLD) {
            tied[inner].sort_by(|a, b| {
                wrap_angle(a.ahead - base).total_cmp(&wrap_angle(b.ahead - base)).then(a.half.cmp(&b.half))
            });
        }
    }
}

/// Maximal runs of two or more sorted entries whose neighbours are `close`.
fn tied_runs(items: &[Leaving], close: impl Fn(&Leaving, &Leaving) -> bool) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut start = 0;
    for i in 1..=items.len() {
        if i == items.len() || !close(&items[i - 1], &items[i]) {
            if i - start > 1 { runs.push(start..i); }
            start = i;
        }
    }
    runs
}

/// `angle` folded into `(-π, π]`.
fn wrap_angle(angle: f64) -> f64 {
    let folded = angle.rem_euclid(TAU);
    if folded > PI { folded - TAU } else { folded }
}

impl Graph {
    // -----------------------------------------------------------------------
    // Angular order
    // -----------------------------------------------------------------------

    /// Sort each vertex's incident half-edges counter-clockwise by the
    /// direction in which their edge leaves the vertex.  Edges leaving in the
    /// same direction are ordered by curvature (the sharper left turn comes
    /// later), then by where they lead a short way out.
    pub fn order_vertex_edges(&mut self) {
        let keys: Vec<VertexKey> = self.vertices.keys().collect();
        for key in keys {
            let point = self.vertices[key].point;
            let mut leaving: Vec<Leaving> = self.vertices[key].incident.iter()
                .map(|&half| self.leaving(half, point))
                .collect();
            sort_leaving(&mut leaving);
            self.vertices[key].incident = leaving.into_iter().map(|l| l.half).collect();
        }
    }

    /// How `half`'s edge leaves the vertex that `half` ends at.
    fn leaving(&self, half: HalfEdgeId, vertex: Coord<f64>) -> Leaving {
        let segment = &self.edges[half.edge].segment;
        let (direction, curvature, ahead) = if half.reversed {
            (segment.start_tangent(), segment.curvature_at(0.0), segment.position_at(AHEAD_T))
        } else {
            (segment.end_tangent() * -1.0, -segment.curvature_at(1.0), segment.position_at(1.0 - AHEAD_T))
        };
        Leaving { half, angle: direction.angle(), curvature, ahead: (ahead - vertex).angle() }
    }

    /// The half-edge that follows `half` around the face to its left: at the
    /// vertex `half` ends at, the leftmost turn.
    pub fn get_next(&self, half: HalfEdgeId) -> Option<HalfEdgeId> {
        let incident = &self.vertices[self.half_end(half)].incident;
        let k = incident.iter().position(|&h| h == half)?;
        let len = incident.len();
        Some(incident[(k + len - 1) % len].twin())
    }

    // -----------------------------------------------------------------------
    // Faces
    // -----------------------------------------------------------------------

    /// Trace every half-edge cycle into a boundary.  Boundaries with positive
    /// signed area bound a new face.
    pub fn extract_faces(&mut self) {
        self.boundaries.clear();
        self.faces.clear();
        self.faces.push(Face::default());
        for edge in self.edges.values_mut() {
            edge.forward = Default::default();
            edge.reversed = Default::default();
        }

        let halves: Vec<HalfEdgeId> = self.edges.keys()
            .flat_map(|key| [HalfEdgeId::forward(key), HalfEdgeId::backward(key)])
            .collect();
        for start in halves {
            if self.half_data(start).boundary.is_some() { continue; }
            let id = BoundaryId(self.boundaries.len());

            let mut half_edges = Vec::new();
            let mut signed_area = 0.0;
            let mut current = start;
            loop {
                self.half_data_mut(current).boundary = Some(id);
                half_edges.push(current);
                signed_area += self.edges[current.edge].signed_area_fragment * current.sign() as f64;

                let next = self.get_next(current);
                debug_assert!(next.is_some(), "faces: {current:?} missing from its end vertex");
                let Some(next) = next else {
                    warn!("faces: {current:?} missing from its end vertex; boundary {id} left open");
                    break;
                };
                if next == start { break; }
                let traced = self.half_data(next).boundary.is_some();
                debug_assert!(!traced, "faces: {next:?} already traced by another boundary");
                if traced {
                    warn!("faces: {next:?} already traced; boundary {id} left open");
                    break;
                }
                current = next;
            }

            let bounds = half_edges.iter()
                .map(|h| self.edges[h.edge].segment.bounds())
                .reduce(merge_rects)
                .unwrap_or_else(|| Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 0.0 }));
            let mut boundary = Boundary { half_edges, signed_area, bounds, children: Vec::new(), face: None };

            if boundary.is_inner() {
                let face = FaceId(self.faces.len());
                self.faces.push(Face::bounded(id));
                boundary.face = Some(face);
                for &half in &boundary.half_edges {
                    self.half_data_mut(half).face = Some(face);
                }
            }
            self.boundaries.push(boundary);
        }
        debug!("faces: {} boundaries, {} bounded faces", self.boundary_count(), self.bounded_face_count());
    }

    // -----------------------------------------------------------------------
    // Hole nesting
    // -----------------------------------------------------------------------

    /// Attach every outer boundary to the face that contains it.
    ///
    /// A ray from the boundary's extreme point finds the nearest edge outside
    /// it; the boundary on the near side of that edge is its parent.  Casts
    /// that hit a vertex or graze an edge are retried at the next angle.
    pub fn compute_boundary_tree(&mut self) {
        let tree: RTree<EdgeBox> = RTree::bulk_load(
            self.edges.iter()
                .map(|(key, edge)| {
                    let bounds = edge.segment.bounds();
                    GeomWithData::new(Rectangle::from_corners(bounds.min().into(), bounds.max().into()), key)
                })
                .collect(),
        );
        let reach = self.boundaries.iter()
            .map(|b| b.bounds)
            .reduce(merge_rects)
            .map_or(1.0, |r| 2.0 * r.width().hypot(r.height()) + 1.0);

        for boundary in &mut self.boundaries {
            boundary.children.clear();
        }

        let outer: Vec<BoundaryId> = self.boundaries().filter(|(_, b)| !b.is_inner()).map(|(id, _)| id).collect();
        let mut roots = Vec::new();
        for id in outer {
            let parent = self.nest_ray_hit(id, &tree, reach)
                .and_then(|hit| self.half_data(hit.facing_half()).boundary);
            match parent {
                Some(parent) => self.boundaries[parent.0].children.push(id),
                None => roots.push(id),
            }
        }

        // Each face absorbs the outer boundaries reachable from its own
        // boundary; outer boundaries nested against another outer boundary
        // sit in the same face as it.
        let mut visited = AHashSet::new();
        for face_index in 0..self.faces.len() {
            let mut stack: Vec<BoundaryId> = match self.faces[face_index].boundary {
                Some(boundary) => self.boundaries[boundary.0].children.clone(),
                None => roots.clone(),
            };
            let mut holes = Vec::new();
            while let Some(hole) = stack.pop() {
                if !visited.insert(hole) { continue; }
                holes.push(hole);
                stack.extend(self.boundaries[hole.0].children.iter().copied());
            }
            let face = FaceId(face_index);
            for &hole in &holes {
                self.boundaries[hole.0].face = Some(face);
                let halves = self.boundaries[hole.0].half_edges.clone();
                for half in halves {
                    self.half_data_mut(half).face = Some(face);
                }
            }
            self.faces[face_index].holes = holes;
        }
        debug!("boundary tree: {} root hole(s)", self.faces[UNBOUNDED_FACE.0].holes.len());
    }

    /// Nearest non-degenerate ray hit from boundary `id`, trying each angle
    /// in turn.  Falls back to the first angle's hit when all are degenerate.
    fn nest_ray_hit(&self, id: BoundaryId, tree: &RTree<EdgeBox>, reach: f64) -> Option<RayHit> {
        let boundary = &self.boundaries[id.0];
        let own: AHashSet<EdgeKey> = boundary.half_edges.iter().map(|h| h.edge).collect();

        let mut first = None;
        for (attempt, &angle) in BOUNDARY_RAY_ANGLES.iter().enumerate() {
            let direction = Coord { x: angle.cos(), y: angle.sin() };
            let origin = self.extreme_point(boundary, direction);
            let hit = self.cast(&Ray::new(origin, direction), tree, &own, reach);
            match hit {
                Some(hit) if hit.is_degenerate() => {
                    if attempt == 0 { first = Some(hit); }
                }
                _ => return hit,
            }
        }
        warn!("boundary tree: every ray from {id} is degenerate; nesting may be wrong");
        first
    }

    fn extreme_point(&self, boundary: &Boundary, direction: Coord<f64>) -> Coord<f64> {
        let mut best = self.vertices[self.half_start(boundary.half_edges[0])].point;
        for half in &boundary.half_edges {
            let segment = &self.edges[half.edge].segment;
            let candidates = [segment.start(), segment.end()].into_iter()
                .chain(segment.extrema_ts(direction).into_iter().map(|t| segment.position_at(t)));
            for point in candidates {
                if point.dot(direction) > best.dot(direction) { best = point; }
            }
        }
        best
    }

    fn cast(&self, ray: &Ray, tree: &RTree<EdgeBox>, own: &AHashSet<EdgeKey>, reach: f64) -> Option<RayHit> {
        let far = ray.at(reach);
        let envelope = AABB::from_corners(ray.origin.into(), far.into());
        tree.locate_in_envelope_intersecting(&envelope)
            .map(|entry| entry.data)
            .filter(|edge| !own.contains(edge))
            .flat_map(|edge| {
                self.edges[edge].segment.ray_intersections(ray, reach).into_iter().map(move |hit| (edge, hit))
            })
            .filter(|(_, hit)| hit.distance > MIN_RAY_DISTANCE)
            .min_by(|a, b| a.1.distance.total_cmp(&b.1.distance))
            .map(|(edge, hit)| RayHit {
                edge,
                t: hit.t,
                cross: ray.direction.cross(self.edges[edge].segment.tangent_at(hit.t)),
            })
    }

    // -----------------------------------------------------------------------
    // Winding numbers
    // -----------------------------------------------------------------------

    /// Net number of times loops of `shape_id` traverse `edge` forward.
    pub fn compute_differential(&self, edge: EdgeKey, shape_id: ShapeId) -> i32 {
        self.loops.iter()
            .filter(|lp| lp.shape_id == shape_id)
            .flat_map(|lp| lp.half_edges.iter())
            .filter(|h| h.edge == edge)
            .map(|h| h.sign())
            .sum()
    }

    /// Differentials of every edge that some loop uses, per shape.
    pub(crate) fn edge_differentials(&self) -> AHashMap<EdgeKey, WindingMap> {
        let mut differentials: AHashMap<EdgeKey, WindingMap> = AHashMap::new();
        for lp in &self.loops {
            for half in &lp.half_edges {
                *differentials.entry(half.edge).or_default().entry(lp.shape_id).or_insert(0) += half.sign();
            }
        }
        differentials
    }

    /// Propagate winding numbers outward from the unbounded face (all zero):
    /// crossing an edge from its right to its left adds its differential.
    pub fn compute_winding_map(&mut self) {
        let differentials = self.edge_differentials();
        let empty = WindingMap::new();
        for face in &mut self.faces {
            face.winding_map = None;
        }
        self.faces[UNBOUNDED_FACE.0].winding_map = Some(self.shape_ids.iter().map(|&id| (id, 0)).collect());

        loop {
            let mut progress = false;
            let mut pending = false;
            for (key, edge) in &self.edges {
                let (Some(forward), Some(reversed)) = (edge.forward.face, edge.reversed.face) else { continue };
                let diff = differentials.get(&key).unwrap_or(&empty);
                let known = (&self.faces[forward.0].winding_map, &self.faces[reversed.0].winding_map);
                let (target, map) = match known {
                    (Some(_), Some(_)) => continue,
                    (None, None) => { pending = true; continue; }
                    (Some(map), None) => (reversed, self.offset_map(map, diff, -1)),
                    (None, Some(map)) => (forward, self.offset_map(map, diff, 1)),
                };
                self.faces[target.0].winding_map = Some(map);
                progress = true;
            }
            if !pending { break; }
            if !progress {
                warn!("winding: some faces are unreachable from the unbounded face");
                break;
            }
        }
        debug!("winding: {} face(s) resolved", self.faces.iter().filter(|f| f.winding_map.is_some()).count());
    }

    fn offset_map(&self, map: &WindingMap, diff: &WindingMap, sign: i32) -> WindingMap {
        self.shape_ids.iter()
            .map(|&id| (id, map.get(&id).copied().unwrap_or(0) + sign * diff.get(&id).copied().unwrap_or(0)))
            .collect()
    }
}
