//! Segment/segment intersection and overlap detection.
//!
//! Any pair involving a line is solved exactly (linear, cubic or quadratic
//! roots).  Curve/curve pairs use recursive bounding-box subdivision with a
//! depth cap and a work budget.

use std::f64::consts::TAU;

use geo::{Coord, Rect};
use smallvec::SmallVec;

use crate::bezier;
use crate::math::{expand_rect, rect_diagonal, rects_intersect, solve_quadratic, CoordExt};
use crate::segment::{Overlap, Segment, SegmentIntersection};

/// Parameter slack accepted at segment ends before clamping.
const PARAM_SLACK: f64 = 1e-10;

/// Subdivision stops once both pieces are smaller than this.
const SUBDIVISION_SIZE: f64 = 1e-10;
const MAX_SUBDIVISION_DEPTH: u32 = 48;
const SUBDIVISION_BUDGET: usize = 1 << 14;

/// Intersections closer than this (in space) are reported once.
const DUPLICATE_DISTANCE: f64 = 1e-7;

/// Distance within which an endpoint counts as lying on the other segment.
const OVERLAP_ENDPOINT_DISTANCE: f64 = 1e-6;
/// Allowed deviation between the two segments across an overlap.
const OVERLAP_VERIFY_DISTANCE: f64 = 1e-6;

pub(crate) fn intersect(a: &Segment, b: &Segment) -> Vec<SegmentIntersection> {
    let mut hits = match (a, b) {
        (Segment::Line { start: a0, end: a1 }, Segment::Line { start: b0, end: b1 }) =>
            line_line(*a0, *a1, *b0, *b1).into_iter().collect(),
        (Segment::Line { start, end }, curve) => line_curve(*start, *end, curve),
        (curve, Segment::Line { start, end }) => line_curve(*start, *end, curve).into_iter()
            .map(|hit| SegmentIntersection { point: hit.point, a_t: hit.b_t, b_t: hit.a_t })
            .collect(),
        _ => curve_curve(a, b),
    };

    hits.sort_by(|x, y| x.a_t.total_cmp(&y.a_t));
    let mut unique: Vec<SegmentIntersection> = Vec::with_capacity(hits.len());
    for hit in hits {
        if !unique.iter().any(|u| u.point.distance(hit.point) < DUPLICATE_DISTANCE) {
            unique.push(hit);
        }
    }
    unique
}

#[inline]
fn in_unit(t: f64) -> Option<f64> {
    (-PARAM_SLACK..=1.0 + PARAM_SLACK).contains(&t).then(|| t.clamp(0.0, 1.0))
}

// ---------------------------------------------------------------------------
// Exact cases
// ---------------------------------------------------------------------------

fn line_line(a0: Coord<f64>, a1: Coord<f64>, b0: Coord<f64>, b1: Coord<f64>) -> Option<SegmentIntersection> {
    let da = a1 - a0;
    let db = b1 - b0;
    let denominator = da.cross(db);
    // Parallel (or degenerate) lines: coincidence is an overlap, not a crossing.
    if denominator.abs() <= 1e-12 * da.magnitude() * db.magnitude() || denominator == 0.0 {
        return None;
    }
    let offset = b0 - a0;
    let a_t = in_unit(offset.cross(db) / denominator)?;
    let b_t = in_unit(offset.cross(da) / denominator)?;
    Some(SegmentIntersection { point: a0.lerp(a1, a_t), a_t, b_t })
}

/// Crossings of the line `start → end` with a curved segment; `a_t` refers
/// to the line.
fn line_curve(start: Coord<f64>, end: Coord<f64>, curve: &Segment) -> Vec<SegmentIntersection> {
    let direction = end - start;
    let length_squared = direction.dot(direction);
    if length_squared == 0.0 { return Vec::new(); }
    let line_t = |point: Coord<f64>| (point - start).dot(direction) / length_squared;

    let mut hits = Vec::new();
    if let Some(p) = curve.controls() {
        for b_t in bezier::line_roots(&p, start, direction.perpendicular()) {
            let point = bezier::point(&p, b_t);
            if let Some(a_t) = in_unit(line_t(point)) {
                hits.push(SegmentIntersection { point, a_t, b_t });
            }
        }
    } else if let Some(conic) = curve.conic() {
        // In the conic's unit-circle frame the line stays a line.
        let p0 = conic.to_unit_frame(start);
        let d = conic.to_unit_frame(end) - p0;
        for a_t in solve_quadratic(d.dot(d), 2.0 * p0.dot(d), p0.dot(p0) - 1.0) {
            let Some(a_t) = in_unit(a_t) else { continue };
            let angle = (p0 + d * a_t).angle();
            for b_t in conic.ts_for_angle(angle, TAU, false) {
                hits.push(SegmentIntersection { point: conic.position_at(b_t), a_t, b_t });
            }
        }
    }
    hits
}

// ---------------------------------------------------------------------------
// Curve / curve subdivision
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
struct Piece {
    segment: Segment,
    bounds:  Rect<f64>,
    t0:      f64,
    t1:      f64,
}

impl Piece {
    fn whole(segment: &Segment) -> Self {
        Self { segment: *segment, bounds: segment.bounds(), t0: 0.0, t1: 1.0 }
    }

    fn halves(&self) -> [Piece; 2] {
        let (left, right) = self.segment.subdivided(0.5);
        let mid = 0.5 * (self.t0 + self.t1);
        [
            Piece { segment: left,  bounds: left.bounds(),  t0: self.t0, t1: mid },
            Piece { segment: right, bounds: right.bounds(), t0: mid,     t1: self.t1 },
        ]
    }

    #[inline] fn size(&self) -> f64 { rect_diagonal(self.bounds) }
}

fn curve_curve(a: &Segment, b: &Segment) -> Vec<SegmentIntersection> {
    let mut hits = Vec::new();
    let mut budget = SUBDIVISION_BUDGET;
    subdivide(Piece::whole(a), Piece::whole(b), 0, &mut budget, &mut hits);
    hits
}

fn subdivide(a: Piece, b: Piece, depth: u32, budget: &mut usize, hits: &mut Vec<SegmentIntersection>) {
    if *budget == 0 { return; }
    *budget -= 1;
    if !rects_intersect(expand_rect(a.bounds, 1e-12), expand_rect(b.bounds, 1e-12)) { return; }

    if depth >= MAX_SUBDIVISION_DEPTH || (a.size() < SUBDIVISION_SIZE && b.size() < SUBDIVISION_SIZE) {
        // Chords are indistinguishable from the curves at this size.  Pieces
        // whose chords miss each other only touch at a neighbouring leaf.
        let chord_a = (a.segment.start(), a.segment.end());
        let chord_b = (b.segment.start(), b.segment.end());
        if let Some(hit) = line_line(chord_a.0, chord_a.1, chord_b.0, chord_b.1) {
            hits.push(SegmentIntersection {
                point: hit.point,
                a_t: a.t0 + hit.a_t * (a.t1 - a.t0),
                b_t: b.t0 + hit.b_t * (b.t1 - b.t0),
            });
        }
        return;
    }

    // Split the larger piece first so both shrink at a similar rate.
    if a.size() >= b.size() {
        for half in a.halves() {
            subdivide(half, b, depth + 1, budget, hits);
        }
    } else {
        for half in b.halves() {
            subdivide(a, half, depth + 1, budget, hits);
        }
    }
}

// ---------------------------------------------------------------------------
// Overlaps
// ---------------------------------------------------------------------------

fn same_kind(a: &Segment, b: &Segment) -> bool {
    match (a, b) {
        (Segment::Line { .. }, Segment::Line { .. }) | (Segment::Cubic { .. }, Segment::Cubic { .. }) => true,
        _ => match (a.conic(), b.conic()) {
            (Some(ca), Some(cb)) => ca.same_ellipse(&cb, OVERLAP_ENDPOINT_DISTANCE),
            _ => false,
        },
    }
}

/// Coincident ranges between two segments of the same kind.
///
/// Endpoints of either segment lying on the other give `(t, qt)` pairs; the
/// two pairs farthest apart in `t` fix the linear parameter map, which is
/// then verified at interior samples.
pub(crate) fn overlaps(a: &Segment, b: &Segment) -> Vec<Overlap> {
    if !same_kind(a, b) { return Vec::new(); }
    if !rects_intersect(expand_rect(a.bounds(), OVERLAP_ENDPOINT_DISTANCE), b.bounds()) { return Vec::new(); }

    let mut pairs: SmallVec<[(f64, f64); 4]> = SmallVec::new();
    for (t, point) in [(0.0, a.start()), (1.0, a.end())] {
        let (qt, distance) = b.closest_t(point);
        if distance < OVERLAP_ENDPOINT_DISTANCE { pairs.push((t, qt)); }
    }
    for (qt, point) in [(0.0, b.start()), (1.0, b.end())] {
        let (t, distance) = a.closest_t(point);
        if distance < OVERLAP_ENDPOINT_DISTANCE { pairs.push((t, qt)); }
    }

    let mut best: Option<((f64, f64), (f64, f64))> = None;
    for i in 0..pairs.len() {
        for j in i + 1..pairs.len() {
            let spread = (pairs[i].0 - pairs[j].0).abs();
            if best.is_none_or(|(p, q)| spread > (p.0 - q.0).abs()) {
                best = Some((pairs[i], pairs[j]));
            }
        }
    }
    let Some(((ta, qa), (tb, qb))) = best else { return Vec::new() };
    if (tb - ta).abs() < 1e-9 || (qb - qa).abs() < 1e-9 { return Vec::new(); }

    let slope = (qb - qa) / (tb - ta);
    let offset = qa - slope * ta;

    // Restrict to where both parameters stay within [0, 1].
    let (lo, hi) = {
        let x = -offset / slope;
        let y = (1.0 - offset) / slope;
        (x.min(y), x.max(y))
    };
    let t0 = lo.max(0.0);
    let t1 = hi.min(1.0);
    if t1 - t0 <= 1e-12 { return Vec::new(); }

    for fraction in [0.1, 0.25, 0.5, 0.75, 0.9] {
        let t = t0 + fraction * (t1 - t0);
        let qt = slope * t + offset;
        if a.position_at(t).distance(b.position_at(qt)) > OVERLAP_VERIFY_DISTANCE {
            return Vec::new();
        }
    }

    let (q0, q1) = (slope * t0 + offset, slope * t1 + offset);
    vec![Overlap {
        a: slope,
        b: offset,
        t0,
        t1,
        qt0: q0.min(q1).clamp(0.0, 1.0),
        qt1: q0.max(q1).clamp(0.0, 1.0),
    }]
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::*;

    fn c(x: f64, y: f64) -> Coord<f64> { Coord { x, y } }

    #[test]
    fn crossing_lines() {
        let a = Segment::line(c(0.0, 0.0), c(2.0, 2.0));
        let b = Segment::line(c(0.0, 2.0), c(2.0, 0.0));
        let hits = intersect(&a, &b);
        assert_eq!(hits.len(), 1);
        assert!(hits[0].point.distance(c(1.0, 1.0)) < 1e-12);
        assert!((hits[0].a_t - 0.5).abs() < 1e-12);
    }

    #[test]
    fn parallel_lines_do_not_intersect() {
        let a = Segment::line(c(0.0, 0.0), c(2.0, 0.0));
        let b = Segment::line(c(1.0, 0.0), c(3.0, 0.0));
        assert!(intersect(&a, &b).is_empty());
    }

    #[test]
    fn line_through_circle() {
        let circle = Segment::arc(c(0.0, 0.0), 1.0, 0.0, 2.0 * PI);
        let line = Segment::line(c(-2.0, 0.5), c(2.0, 0.5));
        let hits = intersect(&line, &circle);
        assert_eq!(hits.len(), 2);
        for hit in &hits {
            assert!((hit.point.magnitude() - 1.0).abs() < 1e-12);
            assert!(circle.position_at(hit.b_t).distance(hit.point) < 1e-12);
        }
        // Argument order is respected.
        let swapped = intersect(&circle, &line);
        assert_eq!(swapped.len(), 2);
        assert!(line.position_at(swapped[0].b_t).distance(swapped[0].point) < 1e-12);
    }

    #[test]
    fn cubic_cubic_crossing() {
        let a = Segment::cubic(c(0.0, 0.0), c(1.0, 2.0), c(2.0, 2.0), c(3.0, 0.0));
        let b = Segment::cubic(c(0.0, 1.0), c(1.0, 0.5), c(2.0, 0.5), c(3.0, 1.0));
        let hits = intersect(&a, &b);
        assert_eq!(hits.len(), 2);
        for hit in &hits {
            assert!(a.position_at(hit.a_t).distance(b.position_at(hit.b_t)) < 1e-7);
        }
    }

    #[test]
    fn collinear_lines_overlap() {
        let a = Segment::line(c(0.0, 0.0), c(2.0, 0.0));
        let b = Segment::line(c(3.0, 0.0), c(1.0, 0.0));
        let found = overlaps(&a, &b);
        assert_eq!(found.len(), 1);
        let overlap = found[0];
        assert!((overlap.t0 - 0.5).abs() < 1e-12);
        assert!((overlap.t1 - 1.0).abs() < 1e-12);
        assert!(overlap.a < 0.0);
        assert!((overlap.qt0 - 0.5).abs() < 1e-12);
        assert!((overlap.qt1 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn subdivided_cubic_overlaps_parent() {
        let cubic = Segment::cubic(c(0.0, 0.0), c(1.0, 2.0), c(2.0, -1.0), c(3.0, 1.0));
        let piece = cubic.slice(0.25, 0.6);
        let found = overlaps(&cubic, &piece);
        assert_eq!(found.len(), 1);
        assert!((found[0].t0 - 0.25).abs() < 1e-6);
        assert!((found[0].t1 - 0.6).abs() < 1e-6);
    }

    #[test]
    fn arcs_on_different_circles_do_not_overlap() {
        let a = Segment::arc(c(0.0, 0.0), 1.0, 0.0, PI);
        let b = Segment::arc(c(0.0, 0.0), 2.0, 0.0, PI);
        assert!(overlaps(&a, &b).is_empty());
    }
}
