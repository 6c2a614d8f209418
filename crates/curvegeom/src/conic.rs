//! Shared evaluation for circular and elliptical arcs.
//!
//! A circular arc is handled as an ellipse with equal radii and no rotation.
//! The parameter `t ∈ [0, 1]` maps linearly onto `[start_angle, end_angle]`.

use std::f64::consts::{PI, TAU};

use geo::Coord;
use smallvec::SmallVec;

use crate::math::CoordExt;

#[derive(Clone, Copy, Debug)]
pub(crate) struct Conic {
    pub(crate) center:      Coord<f64>,
    pub(crate) radius_x:    f64,
    pub(crate) radius_y:    f64,
    pub(crate) rotation:    f64,
    pub(crate) start_angle: f64,
    pub(crate) end_angle:   f64,
}

impl Conic {
    #[inline] pub(crate) fn sweep(&self) -> f64 { self.end_angle - self.start_angle }

    #[inline] pub(crate) fn angle_at(&self, t: f64) -> f64 { self.start_angle + t * self.sweep() }

    pub(crate) fn point_at_angle(&self, angle: f64) -> Coord<f64> {
        let local = Coord { x: self.radius_x * angle.cos(), y: self.radius_y * angle.sin() };
        self.center + local.rotated(self.rotation)
    }

    #[inline] pub(crate) fn position_at(&self, t: f64) -> Coord<f64> { self.point_at_angle(self.angle_at(t)) }

    /// Derivative with respect to `t`.
    pub(crate) fn derivative_at(&self, t: f64) -> Coord<f64> {
        let angle = self.angle_at(t);
        let local = Coord { x: -self.radius_x * angle.sin(), y: self.radius_y * angle.cos() };
        local.rotated(self.rotation) * self.sweep()
    }

    /// Second derivative with respect to `t`.
    pub(crate) fn second_derivative_at(&self, t: f64) -> Coord<f64> {
        let angle = self.angle_at(t);
        let local = Coord { x: -self.radius_x * angle.cos(), y: -self.radius_y * angle.sin() };
        local.rotated(self.rotation) * (self.sweep() * self.sweep())
    }

    /// Map a point into the frame where the ellipse is the unit circle.
    pub(crate) fn to_unit_frame(&self, point: Coord<f64>) -> Coord<f64> {
        let local = (point - self.center).rotated(-self.rotation);
        Coord { x: local.x / self.radius_x, y: local.y / self.radius_y }
    }

    /// Every parameter whose angle is congruent to `angle` modulo `period`,
    /// restricted to `[0, 1]` (or `(0, 1)` when `open`).
    pub(crate) fn ts_for_angle(&self, angle: f64, period: f64, open: bool) -> SmallVec<[f64; 4]> {
        let sweep = self.sweep();
        let mut ts = SmallVec::new();
        if sweep == 0.0 { return ts; }

        let lo = self.start_angle.min(self.end_angle);
        let hi = self.start_angle.max(self.end_angle);
        let k_min = ((lo - angle) / period).ceil() as i64 - 1;
        let k_max = ((hi - angle) / period).floor() as i64 + 1;
        for k in k_min..=k_max {
            let t = (angle + k as f64 * period - self.start_angle) / sweep;
            let inside = if open { t > 0.0 && t < 1.0 } else { (-1e-12..=1.0 + 1e-12).contains(&t) };
            if inside { ts.push(t.clamp(0.0, 1.0)); }
        }
        ts.sort_by(f64::total_cmp);
        ts
    }

    /// Interior parameters where the arc is extremal along `direction`.
    pub(crate) fn extrema_ts(&self, direction: Coord<f64>) -> SmallVec<[f64; 4]> {
        let u = direction.rotated(-self.rotation);
        let angle = (self.radius_y * u.y).atan2(self.radius_x * u.x);
        self.ts_for_angle(angle, PI, true)
    }

    /// ∫ (x dy − y dx) / 2 in closed form.
    pub(crate) fn signed_area_fragment(&self) -> f64 {
        let start = self.point_at_angle(self.start_angle) - self.center;
        let end = self.point_at_angle(self.end_angle) - self.center;
        let delta = end - start;
        0.5 * (self.center.x * delta.y - self.center.y * delta.x
            + self.radius_x * self.radius_y * self.sweep())
    }

    /// Parameter of the point on the arc nearest to `point`'s angular
    /// position; exact for points lying on the ellipse.
    pub(crate) fn closest_t(&self, point: Coord<f64>) -> (f64, f64) {
        let angle = self.to_unit_frame(point).angle();
        let mut candidates = self.ts_for_angle(angle, TAU, false);
        candidates.extend([0.0, 1.0]);
        candidates.into_iter()
            .map(|t| (t, self.position_at(t).distance(point)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap_or((0.0, f64::INFINITY))
    }

    /// Whether two conics trace the same underlying ellipse.
    pub(crate) fn same_ellipse(&self, other: &Conic, tolerance: f64) -> bool {
        if self.center.distance(other.center) > tolerance { return false; }
        let circular = (self.radius_x - self.radius_y).abs() <= tolerance
            && (other.radius_x - other.radius_y).abs() <= tolerance;
        if circular {
            return (self.radius_x - other.radius_x).abs() <= tolerance;
        }
        // Rotation is only meaningful modulo π; swapping radii adds π/2.
        let same_axes = (self.radius_x - other.radius_x).abs() <= tolerance
            && (self.radius_y - other.radius_y).abs() <= tolerance
            && angle_congruent(self.rotation, other.rotation, PI);
        let swapped_axes = (self.radius_x - other.radius_y).abs() <= tolerance
            && (self.radius_y - other.radius_x).abs() <= tolerance
            && angle_congruent(self.rotation + PI / 2.0, other.rotation, PI);
        same_axes || swapped_axes
    }
}

fn angle_congruent(a: f64, b: f64, period: f64) -> bool {
    let diff = (a - b).rem_euclid(period);
    diff < 1e-9 || period - diff < 1e-9
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_quarter() -> Conic {
        Conic {
            center: Coord { x: 0.0, y: 0.0 },
            radius_x: 1.0,
            radius_y: 1.0,
            rotation: 0.0,
            start_angle: 0.0,
            end_angle: PI / 2.0,
        }
    }

    #[test]
    fn quarter_circle_area_fragment() {
        // Closing the quarter arc with two radii gives area π/4; the radii
        // through the origin contribute nothing.
        let area = unit_quarter().signed_area_fragment();
        assert!((area - PI / 4.0).abs() < 1e-12);
    }

    #[test]
    fn ts_for_angle_wraps() {
        let conic = Conic { start_angle: 3.0 * PI / 2.0, end_angle: 5.0 * PI / 2.0, ..unit_quarter() };
        let ts = conic.ts_for_angle(0.0, TAU, false);
        assert_eq!(ts.len(), 1);
        assert!((ts[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn closest_t_on_arc() {
        let conic = unit_quarter();
        let p = conic.position_at(0.3);
        let (t, d) = conic.closest_t(p);
        assert!((t - 0.3).abs() < 1e-12);
        assert!(d < 1e-12);
    }

    #[test]
    fn rotated_ellipse_equivalence() {
        let a = Conic { radius_x: 2.0, radius_y: 1.0, ..unit_quarter() };
        let b = Conic { radius_x: 1.0, radius_y: 2.0, rotation: PI / 2.0, ..unit_quarter() };
        assert!(a.same_ellipse(&b, 1e-9));
    }
}
