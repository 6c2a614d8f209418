//! Small numeric helpers shared by the segment types: vector algebra on
//! `geo::Coord`, polynomial root finding, and rectangle utilities.

use geo::{Coord, Rect};
use smallvec::SmallVec;

/// Vector algebra on `Coord<f64>`, treating coordinates as 2D vectors.
pub trait CoordExt {
    fn dot(self, other: Self) -> f64;
    /// z-component of the 3D cross product.
    fn cross(self, other: Self) -> f64;
    fn magnitude(self) -> f64;
    fn distance(self, other: Self) -> f64;
    /// Unit vector in the same direction, or zero for the zero vector.
    fn normalized(self) -> Self;
    /// Counter-clockwise perpendicular.
    fn perpendicular(self) -> Self;
    fn lerp(self, other: Self, t: f64) -> Self;
    fn average(self, other: Self) -> Self;
    /// Rotate counter-clockwise by `angle` radians about the origin.
    fn rotated(self, angle: f64) -> Self;
    fn angle(self) -> f64;
}

impl CoordExt for Coord<f64> {
    #[inline] fn dot(self, other: Self) -> f64 { self.x * other.x + self.y * other.y }

    #[inline] fn cross(self, other: Self) -> f64 { self.x * other.y - self.y * other.x }

    #[inline] fn magnitude(self) -> f64 { self.x.hypot(self.y) }

    #[inline] fn distance(self, other: Self) -> f64 { (self - other).magnitude() }

    #[inline]
    fn normalized(self) -> Self {
        let m = self.magnitude();
        if m > 0.0 { self / m } else { self }
    }

    #[inline] fn perpendicular(self) -> Self { Coord { x: -self.y, y: self.x } }

    #[inline] fn lerp(self, other: Self, t: f64) -> Self { self + (other - self) * t }

    #[inline] fn average(self, other: Self) -> Self { (self + other) * 0.5 }

    #[inline]
    fn rotated(self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Coord { x: cos * self.x - sin * self.y, y: sin * self.x + cos * self.y }
    }

    #[inline] fn angle(self) -> f64 { self.y.atan2(self.x) }
}

// ---------------------------------------------------------------------------
// Root finding
// ---------------------------------------------------------------------------

/// Coefficients smaller than this (relative to the largest) are treated as zero.
const COEFFICIENT_EPSILON: f64 = 1e-12;

/// Real roots of `a·x + b = 0`.
pub(crate) fn solve_linear(a: f64, b: f64) -> SmallVec<[f64; 3]> {
    let mut roots = SmallVec::new();
    if a != 0.0 { roots.push(-b / a); }
    roots
}

/// Real roots of `a·x² + b·x + c = 0`, degrading to the linear case.
pub(crate) fn solve_quadratic(a: f64, b: f64, c: f64) -> SmallVec<[f64; 3]> {
    let scale = a.abs().max(b.abs()).max(c.abs());
    if scale == 0.0 { return SmallVec::new(); }
    if a.abs() <= COEFFICIENT_EPSILON * scale { return solve_linear(b, c); }

    let discriminant = b * b - 4.0 * a * c;
    let mut roots = SmallVec::new();
    if discriminant < 0.0 {
        return roots;
    }
    if discriminant == 0.0 {
        roots.push(-b / (2.0 * a));
        return roots;
    }

    // Numerically stable form (avoids cancellation between b and sqrt(disc)).
    let q = -0.5 * (b + b.signum() * discriminant.sqrt());
    if q != 0.0 {
        roots.push(q / a);
        roots.push(c / q);
    } else {
        roots.push(0.0);
    }
    roots
}

/// Real roots of `a·x³ + b·x² + c·x + d = 0`, degrading to lower degrees.
pub(crate) fn solve_cubic(a: f64, b: f64, c: f64, d: f64) -> SmallVec<[f64; 3]> {
    let scale = a.abs().max(b.abs()).max(c.abs()).max(d.abs());
    if scale == 0.0 { return SmallVec::new(); }
    if a.abs() <= COEFFICIENT_EPSILON * scale { return solve_quadratic(b, c, d); }

    let (b, c, d) = (b / a, c / a, d / a);
    let p = (3.0 * c - b * b) / 3.0;
    let q = (2.0 * b * b * b - 9.0 * b * c + 27.0 * d) / 27.0;
    let offset = -b / 3.0;
    let discriminant = (q / 2.0).powi(2) + (p / 3.0).powi(3);

    let mut roots: SmallVec<[f64; 3]> = SmallVec::new();
    if discriminant.abs() < 1e-14 {
        if p.abs() < 1e-14 {
            roots.push(offset);
        } else {
            roots.push(3.0 * q / p + offset);
            roots.push(-3.0 * q / (2.0 * p) + offset);
        }
    } else if discriminant > 0.0 {
        let sqrt = discriminant.sqrt();
        roots.push((-q / 2.0 + sqrt).cbrt() + (-q / 2.0 - sqrt).cbrt() + offset);
    } else {
        let r = (-p / 3.0).sqrt();
        let phi = (-q / (2.0 * r * r * r)).clamp(-1.0, 1.0).acos();
        for k in 0..3 {
            roots.push(2.0 * r * ((phi + 2.0 * std::f64::consts::PI * k as f64) / 3.0).cos() + offset);
        }
    }

    // Newton polish against the normalized polynomial.
    for root in roots.iter_mut() {
        for _ in 0..2 {
            let x = *root;
            let f = ((x + b) * x + c) * x + d;
            let df = (3.0 * x + 2.0 * b) * x + c;
            if df.abs() > 1e-14 { *root = x - f / df; }
        }
    }
    roots
}

// ---------------------------------------------------------------------------
// Quadrature
// ---------------------------------------------------------------------------

/// 5-point Gauss-Legendre nodes and weights on [-1, 1]; exact for degree ≤ 9.
const GAUSS_LEGENDRE: [(f64, f64); 5] = [
    (-0.906_179_845_938_664, 0.236_926_885_056_189_1),
    (-0.538_469_310_105_683_1, 0.478_628_670_499_366_5),
    (0.0, 0.568_888_888_888_888_9),
    (0.538_469_310_105_683_1, 0.478_628_670_499_366_5),
    (0.906_179_845_938_664, 0.236_926_885_056_189_1),
];

/// Integrate `f` over [0, 1].
pub(crate) fn integrate_unit(f: impl Fn(f64) -> f64) -> f64 {
    GAUSS_LEGENDRE.iter()
        .map(|&(x, w)| 0.5 * w * f(0.5 * (x + 1.0)))
        .sum()
}

// ---------------------------------------------------------------------------
// Rectangles
// ---------------------------------------------------------------------------

/// Smallest rectangle containing `first` and every point of `rest`.
pub fn rect_from_points(first: Coord<f64>, rest: impl IntoIterator<Item = Coord<f64>>) -> Rect<f64> {
    let (min, max) = rest.into_iter().fold((first, first), |(min, max), p| (
        Coord { x: min.x.min(p.x), y: min.y.min(p.y) },
        Coord { x: max.x.max(p.x), y: max.y.max(p.y) },
    ));
    Rect::new(min, max)
}

/// Smallest rectangle containing both rectangles.
pub fn merge_rects(a: Rect<f64>, b: Rect<f64>) -> Rect<f64> {
    Rect::new(
        Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
        Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
    )
}

/// Grow a rectangle by `amount` on every side.
pub fn expand_rect(rect: Rect<f64>, amount: f64) -> Rect<f64> {
    Rect::new(
        Coord { x: rect.min().x - amount, y: rect.min().y - amount },
        Coord { x: rect.max().x + amount, y: rect.max().y + amount },
    )
}

/// Closed-interval overlap test (touching rectangles intersect).
pub fn rects_intersect(a: Rect<f64>, b: Rect<f64>) -> bool {
    a.min().x <= b.max().x && b.min().x <= a.max().x
        && a.min().y <= b.max().y && b.min().y <= a.max().y
}

/// Length of the rectangle's diagonal.
#[inline]
pub(crate) fn rect_diagonal(rect: Rect<f64>) -> f64 { rect.width().hypot(rect.height()) }
