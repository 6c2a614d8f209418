//! Curve segments: lines, cubic Béziers, circular and elliptical arcs.
//!
//! Every segment is parameterized over `t ∈ [0, 1]`.  Arcs map `t` linearly
//! onto `[start_angle, end_angle]`, so `end_angle < start_angle` describes a
//! clockwise sweep (in a y-up frame).

use geo::{Coord, Rect};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::bezier::{self, Controls};
use crate::conic::Conic;
use crate::intersect;
use crate::math::{rect_from_points, CoordExt};

// ---------------------------------------------------------------------------
// Result records
// ---------------------------------------------------------------------------

/// A parameter range over which two segments coincide.
///
/// On `[t0, t1]` of the first segment, the second segment traces the same
/// points at `qt = a·t + b`.  Both ranges are sorted (`t0 < t1`,
/// `qt0 < qt1`); a negative `a` means the segments run in opposite directions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Overlap {
    pub a:   f64,
    pub b:   f64,
    pub t0:  f64,
    pub t1:  f64,
    pub qt0: f64,
    pub qt1: f64,
}

impl Overlap {
    /// Parameter on the second segment corresponding to `t` on the first.
    #[inline] pub fn map(&self, t: f64) -> f64 { self.a * t + self.b }
}

/// A transversal crossing between two segments.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentIntersection {
    pub point: Coord<f64>,
    /// Parameter on the segment `intersect` was called on.
    pub a_t:   f64,
    /// Parameter on the argument segment.
    pub b_t:   f64,
}

/// The crossing point of a cubic with itself, `a_t < b_t`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelfIntersection {
    pub a_t:   f64,
    pub b_t:   f64,
    pub point: Coord<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin:    Coord<f64>,
    pub direction: Coord<f64>,
}

impl Ray {
    pub fn new(origin: Coord<f64>, direction: Coord<f64>) -> Self {
        Self { origin, direction: direction.normalized() }
    }

    /// Ray leaving `origin` at `angle` radians from the +x axis.
    pub fn from_angle(origin: Coord<f64>, angle: f64) -> Self {
        Self { origin, direction: Coord { x: angle.cos(), y: angle.sin() } }
    }

    #[inline] pub fn at(&self, distance: f64) -> Coord<f64> { self.origin + self.direction * distance }
}

/// A hit of a ray against a segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayIntersection {
    pub distance: f64,
    pub point:    Coord<f64>,
    /// Parameter on the segment.
    pub t:        f64,
    /// +1 if the segment crosses the ray right-to-left (counter-clockwise
    /// around the ray origin), −1 for left-to-right, 0 when tangent.
    pub wind:     i32,
}

// ---------------------------------------------------------------------------
// Segment
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    Line {
        start: Coord<f64>,
        end:   Coord<f64>,
    },
    Cubic {
        start:    Coord<f64>,
        control1: Coord<f64>,
        control2: Coord<f64>,
        end:      Coord<f64>,
    },
    Arc {
        center:      Coord<f64>,
        radius:      f64,
        start_angle: f64,
        end_angle:   f64,
    },
    EllipticalArc {
        center:      Coord<f64>,
        radius_x:    f64,
        radius_y:    f64,
        rotation:    f64,
        start_angle: f64,
        end_angle:   f64,
    },
}

impl Segment {
    pub fn line(start: Coord<f64>, end: Coord<f64>) -> Self { Self::Line { start, end } }

    pub fn cubic(start: Coord<f64>, control1: Coord<f64>, control2: Coord<f64>, end: Coord<f64>) -> Self {
        Self::Cubic { start, control1, control2, end }
    }

    pub fn arc(center: Coord<f64>, radius: f64, start_angle: f64, end_angle: f64) -> Self {
        Self::Arc { center, radius, start_angle, end_angle }
    }

    pub fn elliptical_arc(
        center: Coord<f64>,
        radius_x: f64,
        radius_y: f64,
        rotation: f64,
        start_angle: f64,
        end_angle: f64,
    ) -> Self {
        Self::EllipticalArc { center, radius_x, radius_y, rotation, start_angle, end_angle }
    }

    // -----------------------------------------------------------------------
    // Representation helpers
    // -----------------------------------------------------------------------

    pub(crate) fn controls(&self) -> Option<Controls> {
        match *self {
            Self::Cubic { start, control1, control2, end } => Some([start, control1, control2, end]),
            _ => None,
        }
    }

    pub(crate) fn conic(&self) -> Option<Conic> {
        match *self {
            Self::Arc { center, radius, start_angle, end_angle } => Some(Conic {
                center, radius_x: radius, radius_y: radius, rotation: 0.0, start_angle, end_angle,
            }),
            Self::EllipticalArc { center, radius_x, radius_y, rotation, start_angle, end_angle } => Some(Conic {
                center, radius_x, radius_y, rotation, start_angle, end_angle,
            }),
            _ => None,
        }
    }

    /// Rebuild an arc of the same kind as `self` over a new angle range.
    fn with_angles(&self, start_angle: f64, end_angle: f64) -> Self {
        match *self {
            Self::Arc { center, radius, .. } => Self::Arc { center, radius, start_angle, end_angle },
            Self::EllipticalArc { center, radius_x, radius_y, rotation, .. } =>
                Self::EllipticalArc { center, radius_x, radius_y, rotation, start_angle, end_angle },
            other => other,
        }
    }

    #[inline] pub fn is_line(&self) -> bool { matches!(self, Self::Line { .. }) }

    /// Whether the segment can bend (cubics and arcs).
    #[inline] pub fn is_curved(&self) -> bool { !self.is_line() }

    // -----------------------------------------------------------------------
    // Evaluation
    // -----------------------------------------------------------------------

    pub fn start(&self) -> Coord<f64> {
        match *self {
            Self::Line { start, .. } | Self::Cubic { start, .. } => start,
            _ => self.position_at(0.0),
        }
    }

    pub fn end(&self) -> Coord<f64> {
        match *self {
            Self::Line { end, .. } | Self::Cubic { end, .. } => end,
            _ => self.position_at(1.0),
        }
    }

    pub fn position_at(&self, t: f64) -> Coord<f64> {
        match *self {
            Self::Line { start, end } => start.lerp(end, t),
            Self::Cubic { start, control1, control2, end } => bezier::point(&[start, control1, control2, end], t),
            _ => self.conic().map_or(Coord { x: 0.0, y: 0.0 }, |conic| conic.position_at(t)),
        }
    }

    /// Derivative of the position with respect to `t`.
    pub fn derivative_at(&self, t: f64) -> Coord<f64> {
        match *self {
            Self::Line { start, end } => end - start,
            Self::Cubic { start, control1, control2, end } => bezier::derivative(&[start, control1, control2, end], t),
            _ => self.conic().map_or(Coord { x: 0.0, y: 0.0 }, |conic| conic.derivative_at(t)),
        }
    }

    pub fn second_derivative_at(&self, t: f64) -> Coord<f64> {
        match *self {
            Self::Line { .. } => Coord { x: 0.0, y: 0.0 },
            Self::Cubic { start, control1, control2, end } =>
                bezier::second_derivative(&[start, control1, control2, end], t),
            _ => self.conic().map_or(Coord { x: 0.0, y: 0.0 }, |conic| conic.second_derivative_at(t)),
        }
    }

    /// Signed curvature at `t`: positive where the segment turns left.
    /// Zero for lines and wherever the derivative vanishes.
    pub fn curvature_at(&self, t: f64) -> f64 {
        let d1 = self.derivative_at(t);
        let speed = d1.magnitude();
        if speed < 1e-12 { return 0.0; }
        d1.cross(self.second_derivative_at(t)) / (speed * speed * speed)
    }

    /// Unit tangent at `t`.  Cubic endpoints with coincident control points
    /// fall back to the next distinct control point.
    pub fn tangent_at(&self, t: f64) -> Coord<f64> {
        if let Some(p) = self.controls() {
            if t <= 0.0 { return bezier::start_direction(&p).normalized(); }
            if t >= 1.0 { return bezier::end_direction(&p).normalized(); }
        }
        self.derivative_at(t).normalized()
    }

    #[inline] pub fn start_tangent(&self) -> Coord<f64> { self.tangent_at(0.0) }

    #[inline] pub fn end_tangent(&self) -> Coord<f64> { self.tangent_at(1.0) }

    /// Interior parameters where the segment is extremal along `direction`.
    pub fn extrema_ts(&self, direction: Coord<f64>) -> SmallVec<[f64; 4]> {
        match self {
            Self::Line { .. } => SmallVec::new(),
            Self::Cubic { .. } => self.controls().map(|p| bezier::extrema_ts(&p, direction)).unwrap_or_default(),
            _ => self.conic().map(|c| c.extrema_ts(direction)).unwrap_or_default(),
        }
    }

    /// Exact axis-aligned bounds.
    pub fn bounds(&self) -> Rect<f64> {
        let x_hat = Coord { x: 1.0, y: 0.0 };
        let y_hat = Coord { x: 0.0, y: 1.0 };
        let interior = self.extrema_ts(x_hat).into_iter()
            .chain(self.extrema_ts(y_hat))
            .map(|t| self.position_at(t));
        rect_from_points(self.start(), std::iter::once(self.end()).chain(interior))
    }

    // -----------------------------------------------------------------------
    // Subdivision
    // -----------------------------------------------------------------------

    /// Split at `t` into the pieces covering `[0, t]` and `[t, 1]`.
    pub fn subdivided(&self, t: f64) -> (Segment, Segment) {
        match *self {
            Self::Line { start, end } => {
                let mid = start.lerp(end, t);
                (Self::Line { start, end: mid }, Self::Line { start: mid, end })
            }
            Self::Cubic { start, control1, control2, end } => {
                let (left, right) = bezier::split(&[start, control1, control2, end], t);
                (Self::from_controls(left), Self::from_controls(right))
            }
            Self::Arc { start_angle, end_angle, .. } | Self::EllipticalArc { start_angle, end_angle, .. } => {
                let mid = start_angle + t * (end_angle - start_angle);
                (self.with_angles(start_angle, mid), self.with_angles(mid, end_angle))
            }
        }
    }

    /// Split at every parameter in `ts` (in any order), returning the pieces
    /// from start to end.
    pub fn subdivisions(&self, ts: &[f64]) -> Vec<Segment> {
        let mut cuts: Vec<f64> = ts.iter().copied().filter(|&t| t > 0.0 && t < 1.0).collect();
        cuts.sort_by(f64::total_cmp);
        cuts.dedup();

        let mut pieces = Vec::with_capacity(cuts.len() + 1);
        let mut previous = 0.0;
        for &t in cuts.iter().chain(std::iter::once(&1.0)) {
            pieces.push(self.slice(previous, t));
            previous = t;
        }
        pieces
    }

    /// The piece between `t0` and `t1`; reversed when `t1 < t0`.
    pub fn slice(&self, t0: f64, t1: f64) -> Segment {
        if t1 < t0 { return self.slice(t1, t0).reversed(); }
        match *self {
            Self::Line { start, end } => Self::Line { start: start.lerp(end, t0), end: start.lerp(end, t1) },
            Self::Cubic { start, control1, control2, end } => {
                let p = [start, control1, control2, end];
                let head = if t1 < 1.0 { bezier::split(&p, t1).0 } else { p };
                if t0 <= 0.0 { return Self::from_controls(head); }
                let local = if t1 > 0.0 { t0 / t1 } else { 0.0 };
                Self::from_controls(bezier::split(&head, local).1)
            }
            Self::Arc { start_angle, end_angle, .. } | Self::EllipticalArc { start_angle, end_angle, .. } => {
                let sweep = end_angle - start_angle;
                self.with_angles(start_angle + t0 * sweep, start_angle + t1 * sweep)
            }
        }
    }

    pub fn reversed(&self) -> Segment {
        match *self {
            Self::Line { start, end } => Self::Line { start: end, end: start },
            Self::Cubic { start, control1, control2, end } =>
                Self::Cubic { start: end, control1: control2, control2: control1, end: start },
            Self::Arc { start_angle, end_angle, .. } | Self::EllipticalArc { start_angle, end_angle, .. } =>
                self.with_angles(end_angle, start_angle),
        }
    }

    /// Move the endpoints of a line or cubic onto `start` and `end`; a cubic's
    /// inner controls shift with their endpoints so the end tangents are
    /// kept.  Arcs are returned unchanged since their endpoints are implied
    /// by the angle range.
    pub fn with_endpoints(&self, start: Coord<f64>, end: Coord<f64>) -> Segment {
        match *self {
            Self::Line { .. } => Self::Line { start, end },
            Self::Cubic { start: s, control1, control2, end: e } => Self::Cubic {
                start,
                control1: control1 + (start - s),
                control2: control2 + (end - e),
                end,
            },
            arc => arc,
        }
    }

    fn from_controls(p: Controls) -> Segment {
        Self::Cubic { start: p[0], control1: p[1], control2: p[2], end: p[3] }
    }

    // -----------------------------------------------------------------------
    // Measures
    // -----------------------------------------------------------------------

    /// ∫ (x dy − y dx) / 2 along the segment.  Summed over a closed loop this
    /// is the enclosed signed area (positive for counter-clockwise).
    pub fn signed_area_fragment(&self) -> f64 {
        match *self {
            Self::Line { start, end } => 0.5 * start.cross(end),
            Self::Cubic { start, control1, control2, end } =>
                bezier::signed_area_fragment(&[start, control1, control2, end]),
            _ => self.conic().map_or(0.0, |conic| conic.signed_area_fragment()),
        }
    }

    /// Parameter of the closest point on the segment and its distance.
    pub fn closest_t(&self, point: Coord<f64>) -> (f64, f64) {
        match *self {
            Self::Line { start, end } => {
                let d = end - start;
                let length_squared = d.dot(d);
                let t = if length_squared > 0.0 { ((point - start).dot(d) / length_squared).clamp(0.0, 1.0) } else { 0.0 };
                (t, start.lerp(end, t).distance(point))
            }
            Self::Cubic { start, control1, control2, end } =>
                bezier::closest_t(&[start, control1, control2, end], point),
            _ => self.conic().map_or((0.0, f64::INFINITY), |conic| conic.closest_t(point)),
        }
    }

    // -----------------------------------------------------------------------
    // Intersections
    // -----------------------------------------------------------------------

    /// Transversal intersections with `other`, sorted by `a_t`.
    /// Coincident stretches are reported by [`Segment::overlaps`] instead.
    pub fn intersect(&self, other: &Segment) -> Vec<SegmentIntersection> {
        intersect::intersect(self, other)
    }

    /// Coincident parameter ranges shared with `other`.
    pub fn overlaps(&self, other: &Segment) -> Vec<Overlap> {
        intersect::overlaps(self, other)
    }

    /// Where a cubic crosses itself.  Lines and arcs never do.
    pub fn self_intersection(&self) -> Option<SelfIntersection> {
        let p = self.controls()?;
        let (a_t, b_t) = bezier::self_intersection(&p)?;
        Some(SelfIntersection { a_t, b_t, point: bezier::point(&p, a_t).average(bezier::point(&p, b_t)) })
    }

    /// Hits of `ray` against this segment within `reach` of its origin,
    /// nearest first.
    pub fn ray_intersections(&self, ray: &Ray, reach: f64) -> Vec<RayIntersection> {
        let cast = Segment::line(ray.origin, ray.at(reach));
        let mut hits: Vec<RayIntersection> = intersect::intersect(&cast, self).into_iter()
            .map(|hit| {
                let turn = ray.direction.cross(self.tangent_at(hit.b_t));
                let wind = if turn > 1e-12 { 1 } else if turn < -1e-12 { -1 } else { 0 };
                RayIntersection { distance: hit.a_t * reach, point: hit.point, t: hit.b_t, wind }
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}
