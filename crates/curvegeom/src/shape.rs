//! Filled shapes: a list of subpaths, each an ordered run of segments.

use std::f64::consts::{PI, TAU};
use std::fmt::Write as _;

use geo::{Coord, Rect};
use serde::{Deserialize, Serialize};

use crate::math::{merge_rects, CoordExt};
use crate::segment::{Ray, Segment};

/// Ray angles tried in turn for winding numbers, chosen to avoid the
/// axis-aligned directions shapes tend to share.
const WINDING_RAY_ANGLES: [f64; 4] = [0.618_033_988_7, 2.399_963_229_7, 4.181_892_470_7, 5.963_821_711_7];

/// Hits this close to a segment end are treated as passing through a joint.
const JOINT_T: f64 = 1e-6;

// ---------------------------------------------------------------------------
// Subpath
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Subpath {
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub closed:   bool,
}

impl Subpath {
    pub fn new(segments: Vec<Segment>, closed: bool) -> Self { Self { segments, closed } }

    /// Polyline through `points`.
    pub fn from_points(points: &[Coord<f64>], closed: bool) -> Self {
        let segments = points.windows(2).map(|w| Segment::line(w[0], w[1])).collect();
        Self { segments, closed }
    }

    #[inline] pub fn is_empty(&self) -> bool { self.segments.is_empty() }

    pub fn first_point(&self) -> Option<Coord<f64>> { self.segments.first().map(Segment::start) }

    pub fn last_point(&self) -> Option<Coord<f64>> { self.segments.last().map(Segment::end) }

    /// Segments with a closing line appended when the subpath does not end
    /// where it starts.  This is the outline used for filling.
    pub fn fill_segments(&self) -> Vec<Segment> {
        let mut segments = self.segments.clone();
        if let (Some(first), Some(last)) = (self.first_point(), self.last_point()) {
            if first != last { segments.push(Segment::line(last, first)); }
        }
        segments
    }

    pub fn signed_area(&self) -> f64 {
        self.fill_segments().iter().map(Segment::signed_area_fragment).sum()
    }

    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.segments.iter().map(Segment::bounds).reduce(merge_rects)
    }

    pub fn reversed(&self) -> Subpath {
        Subpath {
            segments: self.segments.iter().rev().map(Segment::reversed).collect(),
            closed: self.closed,
        }
    }
}

// ---------------------------------------------------------------------------
// Shape
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub subpaths: Vec<Subpath>,
}

impl Shape {
    pub fn new(subpaths: Vec<Subpath>) -> Self { Self { subpaths } }

    pub fn empty() -> Self { Self::default() }

    /// Axis-aligned rectangle traced counter-clockwise (y-up).
    pub fn rectangle(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::polygon(&[
            Coord { x, y },
            Coord { x: x + width, y },
            Coord { x: x + width, y: y + height },
            Coord { x, y: y + height },
        ])
    }

    /// Closed polygon through `points`.
    pub fn polygon(points: &[Coord<f64>]) -> Self {
        let mut subpath = Subpath::from_points(points, true);
        if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
            if points.len() > 2 && first != last { subpath.segments.push(Segment::line(last, first)); }
        }
        Self { subpaths: vec![subpath] }
    }

    /// Full circle as two half arcs, counter-clockwise.
    pub fn circle(center: Coord<f64>, radius: f64) -> Self {
        Self::new(vec![Subpath::new(vec![
            Segment::arc(center, radius, 0.0, PI),
            Segment::arc(center, radius, PI, TAU),
        ], true)])
    }

    /// Full ellipse as two half arcs, counter-clockwise.
    pub fn ellipse(center: Coord<f64>, radius_x: f64, radius_y: f64, rotation: f64) -> Self {
        Self::new(vec![Subpath::new(vec![
            Segment::elliptical_arc(center, radius_x, radius_y, rotation, 0.0, PI),
            Segment::elliptical_arc(center, radius_x, radius_y, rotation, PI, TAU),
        ], true)])
    }

    pub fn is_empty(&self) -> bool { self.subpaths.iter().all(Subpath::is_empty) }

    pub fn segment_count(&self) -> usize { self.subpaths.iter().map(|s| s.segments.len()).sum() }

    pub fn signed_area(&self) -> f64 { self.subpaths.iter().map(Subpath::signed_area).sum() }

    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.subpaths.iter().filter_map(Subpath::bounds).reduce(merge_rects)
    }

    /// Winding number of the filled outline around `point`.
    pub fn winding_number(&self, point: Coord<f64>) -> i32 {
        let Some(bounds) = self.bounds() else { return 0 };
        let reach = 2.0 * (bounds.width() + bounds.height())
            + point.distance(bounds.center()) + 1.0;
        let segments: Vec<Segment> = self.subpaths.iter().flat_map(Subpath::fill_segments).collect();

        // Rays through a joint or along a tangent are retried at another
        // angle; if every angle is degenerate the first count stands.
        let mut fallback = None;
        for angle in WINDING_RAY_ANGLES {
            let ray = Ray::from_angle(point, angle);
            let hits: Vec<_> = segments.iter().flat_map(|segment| segment.ray_intersections(&ray, reach)).collect();
            let winding = hits.iter()
                // A hit at a joint belongs to the segment that starts there.
                .filter(|hit| hit.t < 1.0 - 1e-9)
                .map(|hit| hit.wind)
                .sum();
            if hits.iter().all(|hit| hit.wind != 0 && hit.t > JOINT_T && hit.t < 1.0 - JOINT_T) {
                return winding;
            }
            fallback.get_or_insert(winding);
        }
        fallback.unwrap_or(0)
    }

    /// Nonzero-rule containment.
    pub fn contains_point(&self, point: Coord<f64>) -> bool { self.winding_number(point) != 0 }

    pub fn translated(&self, offset: Coord<f64>) -> Shape {
        let shift = |segment: &Segment| match *segment {
            Segment::Line { start, end } => Segment::line(start + offset, end + offset),
            Segment::Cubic { start, control1, control2, end } =>
                Segment::cubic(start + offset, control1 + offset, control2 + offset, end + offset),
            Segment::Arc { center, radius, start_angle, end_angle } =>
                Segment::arc(center + offset, radius, start_angle, end_angle),
            Segment::EllipticalArc { center, radius_x, radius_y, rotation, start_angle, end_angle } =>
                Segment::elliptical_arc(center + offset, radius_x, radius_y, rotation, start_angle, end_angle),
        };
        Shape::new(self.subpaths.iter()
            .map(|s| Subpath::new(s.segments.iter().map(shift).collect(), s.closed))
            .collect())
    }

    /// SVG path `d` attribute.
    pub fn to_svg_path_data(&self) -> String {
        let mut out = String::new();
        for subpath in &self.subpaths {
            let Some(first) = subpath.first_point() else { continue };
            if !out.is_empty() { out.push(' '); }
            let _ = write!(out, "M {} {}", first.x, first.y);
            for segment in &subpath.segments {
                write_svg_segment(&mut out, segment);
            }
            if subpath.closed { out.push_str(" Z"); }
        }
        out
    }
}

fn write_svg_segment(out: &mut String, segment: &Segment) {
    match *segment {
        Segment::Line { end, .. } => { let _ = write!(out, " L {} {}", end.x, end.y); }
        Segment::Cubic { control1, control2, end, .. } => {
            let _ = write!(out, " C {} {} {} {} {} {}", control1.x, control1.y, control2.x, control2.y, end.x, end.y);
        }
        Segment::Arc { .. } | Segment::EllipticalArc { .. } => {
            let Some(conic) = segment.conic() else { return };
            let (radius_x, radius_y, rotation) = (conic.radius_x, conic.radius_y, conic.rotation);
            // A single arc command cannot express a sweep of a full turn.
            let sweep = conic.sweep();
            let pieces = (sweep.abs() / PI).ceil().max(1.0) as usize;
            for i in 1..=pieces {
                let t0 = (i - 1) as f64 / pieces as f64;
                let t1 = i as f64 / pieces as f64;
                let piece_sweep = (t1 - t0) * sweep;
                let end = segment.position_at(t1);
                let _ = write!(
                    out,
                    " A {} {} {} {} {} {} {}",
                    radius_x,
                    radius_y,
                    rotation.to_degrees(),
                    u8::from(piece_sweep.abs() > PI),
                    u8::from(sweep > 0.0),
                    end.x,
                    end.y,
                );
            }
        }
    }
}
