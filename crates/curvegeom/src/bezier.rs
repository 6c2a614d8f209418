//! Cubic Bézier helpers over control-point arrays `[p0, p1, p2, p3]`.

use geo::Coord;
use smallvec::SmallVec;

use crate::math::{integrate_unit, solve_cubic, solve_quadratic, CoordExt};

pub(crate) type Controls = [Coord<f64>; 4];

pub(crate) fn point(p: &Controls, t: f64) -> Coord<f64> {
    let mt = 1.0 - t;
    p[0] * (mt * mt * mt) + p[1] * (3.0 * mt * mt * t) + p[2] * (3.0 * mt * t * t) + p[3] * (t * t * t)
}

pub(crate) fn derivative(p: &Controls, t: f64) -> Coord<f64> {
    let mt = 1.0 - t;
    (p[1] - p[0]) * (3.0 * mt * mt) + (p[2] - p[1]) * (6.0 * mt * t) + (p[3] - p[2]) * (3.0 * t * t)
}

pub(crate) fn second_derivative(p: &Controls, t: f64) -> Coord<f64> {
    ((p[2] - p[1] * 2.0 + p[0]) * (1.0 - t) + (p[3] - p[2] * 2.0 + p[1]) * t) * 6.0
}

/// De Casteljau split at `t`.
pub(crate) fn split(p: &Controls, t: f64) -> (Controls, Controls) {
    let q0 = p[0].lerp(p[1], t);
    let q1 = p[1].lerp(p[2], t);
    let q2 = p[2].lerp(p[3], t);
    let r0 = q0.lerp(q1, t);
    let r1 = q1.lerp(q2, t);
    let s = r0.lerp(r1, t);
    ([p[0], q0, r0, s], [s, r1, q2, p[3]])
}

/// Power-basis coefficients `[a, b, c, d]` with `B(t) = a·t³ + b·t² + c·t + d`.
pub(crate) fn power_basis(p: &Controls) -> Controls {
    let a = p[3] - p[0] + (p[1] - p[2]) * 3.0;
    let b = (p[0] + p[2]) * 3.0 - p[1] * 6.0;
    let c = (p[1] - p[0]) * 3.0;
    [a, b, c, p[0]]
}

/// Tangent direction at the start, skipping coincident control points.
pub(crate) fn start_direction(p: &Controls) -> Coord<f64> {
    [p[1], p[2], p[3]].into_iter()
        .map(|q| q - p[0])
        .find(|v| v.magnitude() > 1e-12)
        .unwrap_or(Coord { x: 0.0, y: 0.0 })
}

/// Tangent direction at the end, skipping coincident control points.
pub(crate) fn end_direction(p: &Controls) -> Coord<f64> {
    [p[2], p[1], p[0]].into_iter()
        .map(|q| p[3] - q)
        .find(|v| v.magnitude() > 1e-12)
        .unwrap_or(Coord { x: 0.0, y: 0.0 })
}

/// Interior parameters where the curve is extremal along `direction`.
pub(crate) fn extrema_ts(p: &Controls, direction: Coord<f64>) -> SmallVec<[f64; 4]> {
    let [a, b, c, _] = power_basis(p);
    solve_quadratic(3.0 * a.dot(direction), 2.0 * b.dot(direction), c.dot(direction))
        .into_iter()
        .filter(|&t| t > 0.0 && t < 1.0)
        .collect()
}

/// Parameters in [0, 1] where the curve crosses the line through `origin`
/// perpendicular to `normal`.
pub(crate) fn line_roots(p: &Controls, origin: Coord<f64>, normal: Coord<f64>) -> SmallVec<[f64; 3]> {
    let [a, b, c, d] = power_basis(p);
    solve_cubic(a.dot(normal), b.dot(normal), c.dot(normal), (d - origin).dot(normal))
        .into_iter()
        .filter(|&t| (-1e-10..=1.0 + 1e-10).contains(&t))
        .map(|t| t.clamp(0.0, 1.0))
        .collect()
}

/// Parameter of the nearest point on the curve and its distance: coarse
/// sampling followed by Newton iterations on `(B(t) − P)·B'(t) = 0`.
pub(crate) fn closest_t(p: &Controls, target: Coord<f64>) -> (f64, f64) {
    const SAMPLES: usize = 16;

    let mut best = (0.0, point(p, 0.0).distance(target));
    for i in 1..=SAMPLES {
        let t = i as f64 / SAMPLES as f64;
        let d = point(p, t).distance(target);
        if d < best.1 { best = (t, d); }
    }

    let mut t = best.0;
    for _ in 0..8 {
        let offset = point(p, t) - target;
        let d1 = derivative(p, t);
        let numerator = offset.dot(d1);
        let denominator = d1.dot(d1) + offset.dot(second_derivative(p, t));
        if denominator.abs() < 1e-14 { break; }
        let next = (t - numerator / denominator).clamp(0.0, 1.0);
        if (next - t).abs() < 1e-14 { t = next; break; }
        t = next;
    }

    let d = point(p, t).distance(target);
    if d < best.1 { (t, d) } else { best }
}

/// ∫ (x dy − y dx) / 2 over the whole curve (the integrand is a degree-5
/// polynomial, so the quadrature is exact).
pub(crate) fn signed_area_fragment(p: &Controls) -> f64 {
    integrate_unit(|t| point(p, t).cross(derivative(p, t))) * 0.5
}

/// Parameters `(t1, t2)` with `t1 < t2` where the curve crosses itself.
///
/// Solves `B(t1) = B(t2)` in power basis: with `s = t1 + t2` and `q = t1·t2`,
/// dividing out `(t1 − t2)` leaves `a(s² − q) + b·s + c = 0` per axis.
pub(crate) fn self_intersection(p: &Controls) -> Option<(f64, f64)> {
    let [a, b, c, _] = power_basis(p);

    let denominator = a.y * b.x - a.x * b.y;
    if denominator.abs() < 1e-12 { return None; }
    let s = (a.x * c.y - a.y * c.x) / denominator;

    let square_minus_q = if a.x.abs() >= a.y.abs() {
        if a.x.abs() < 1e-12 { return None; }
        -(b.x * s + c.x) / a.x
    } else {
        -(b.y * s + c.y) / a.y
    };
    let q = s * s - square_minus_q;

    let discriminant = s * s - 4.0 * q;
    if discriminant <= 0.0 { return None; }
    let root = discriminant.sqrt();
    let (t1, t2) = ((s - root) / 2.0, (s + root) / 2.0);
    if t1 <= 0.0 || t2 >= 1.0 { return None; }

    // Reject solutions produced by a nearly-degenerate system.
    let scale = p[0].distance(p[3]).max(p[0].distance(p[1])).max(p[2].distance(p[3])).max(1.0);
    if point(p, t1).distance(point(p, t2)) > 1e-7 * scale { return None; }
    Some((t1, t2))
}
