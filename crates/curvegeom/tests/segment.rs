use std::f64::consts::PI;

use curvegeom::{Coord, CoordExt, Ray, Segment};

fn c(x: f64, y: f64) -> Coord<f64> { Coord { x, y } }

fn all_kinds() -> Vec<Segment> {
    vec![
        Segment::line(c(0.0, 0.0), c(3.0, 1.0)),
        Segment::cubic(c(0.0, 0.0), c(1.0, 2.0), c(2.0, -2.0), c(3.0, 0.0)),
        Segment::arc(c(1.0, 1.0), 2.0, 0.25, 2.5),
        Segment::elliptical_arc(c(-1.0, 0.5), 3.0, 1.0, 0.4, 3.0, -0.5),
    ]
}

#[test]
fn bounds_contain_sampled_points() {
    for segment in all_kinds() {
        let bounds = segment.bounds();
        for i in 0..=100 {
            let p = segment.position_at(i as f64 / 100.0);
            assert!(p.x >= bounds.min().x - 1e-9 && p.x <= bounds.max().x + 1e-9, "{segment:?}");
            assert!(p.y >= bounds.min().y - 1e-9 && p.y <= bounds.max().y + 1e-9, "{segment:?}");
        }
    }
}

#[test]
fn subdivided_pieces_meet() {
    for segment in all_kinds() {
        let (left, right) = segment.subdivided(0.4);
        assert!(left.start().distance(segment.start()) < 1e-12);
        assert!(left.end().distance(right.start()) < 1e-12);
        assert!(right.end().distance(segment.end()) < 1e-12);
        assert!(left.end().distance(segment.position_at(0.4)) < 1e-12);
    }
}

#[test]
fn area_fragments_add_up_across_subdivision() {
    for segment in all_kinds() {
        let pieces = segment.subdivisions(&[0.2, 0.55, 0.8]);
        let sum: f64 = pieces.iter().map(Segment::signed_area_fragment).sum();
        assert!((sum - segment.signed_area_fragment()).abs() < 1e-9, "{segment:?}");
    }
}

#[test]
fn reversed_tangents_flip() {
    for segment in all_kinds() {
        let reversed = segment.reversed();
        assert!(reversed.start_tangent().distance(segment.end_tangent() * -1.0) < 1e-9);
        assert!(reversed.end_tangent().distance(segment.start_tangent() * -1.0) < 1e-9);
    }
}

#[test]
fn line_crosses_elliptical_arc() {
    let arc = Segment::elliptical_arc(c(0.0, 0.0), 2.0, 1.0, PI / 6.0, 0.0, PI);
    // Parallel to the major axis, on the arc's side of it.
    let line = Segment::line(c(-3.0, 0.3).rotated(PI / 6.0), c(3.0, 0.3).rotated(PI / 6.0));
    let hits = line.intersect(&arc);
    assert_eq!(hits.len(), 2);
    for hit in hits {
        assert!(line.position_at(hit.a_t).distance(hit.point) < 1e-9);
        assert!(arc.position_at(hit.b_t).distance(hit.point) < 1e-9);
    }
}

#[test]
fn line_crosses_cubic() {
    let cubic = Segment::cubic(c(0.0, 0.0), c(1.0, 3.0), c(2.0, -3.0), c(3.0, 0.0));
    let line = Segment::line(c(-1.0, 0.0), c(4.0, 0.0));
    let hits = cubic.intersect(&line);
    // Endpoints and the inflection crossing in the middle.
    assert_eq!(hits.len(), 3);
    assert!((hits[1].a_t - 0.5).abs() < 1e-9);
    assert!(hits.windows(2).all(|w| w[0].a_t <= w[1].a_t));
}

#[test]
fn arc_and_cubic_intersect_by_subdivision() {
    let arc = Segment::arc(c(0.0, 0.0), 1.0, 0.0, PI);
    let cubic = Segment::cubic(c(-2.0, 0.5), c(-0.5, 0.5), c(0.5, 0.5), c(2.0, 0.5));
    let hits = arc.intersect(&cubic);
    assert_eq!(hits.len(), 2);
    for hit in hits {
        assert!((hit.point.magnitude() - 1.0).abs() < 1e-7);
        assert!((hit.point.y - 0.5).abs() < 1e-7);
    }
}

#[test]
fn concentric_arcs_overlap_in_opposite_directions() {
    let a = Segment::arc(c(0.0, 0.0), 1.0, 0.0, PI);
    let b = Segment::arc(c(0.0, 0.0), 1.0, 3.0 * PI / 2.0, PI / 2.0);
    let overlaps = a.overlaps(&b);
    assert_eq!(overlaps.len(), 1);
    let overlap = overlaps[0];
    assert!(overlap.a < 0.0);
    assert!((overlap.t0 - 0.5).abs() < 1e-9);
    assert!((overlap.t1 - 1.0).abs() < 1e-9);
    assert!((overlap.qt0 - 0.5).abs() < 1e-9);
    assert!((overlap.qt1 - 1.0).abs() < 1e-9);
    for t in [overlap.t0, 0.75, overlap.t1] {
        assert!(a.position_at(t).distance(b.position_at(overlap.map(t))) < 1e-9);
    }
}

#[test]
fn touching_lines_do_not_overlap() {
    let a = Segment::line(c(0.0, 0.0), c(1.0, 0.0));
    let b = Segment::line(c(1.0, 0.0), c(2.0, 0.0));
    assert!(a.overlaps(&b).is_empty());
}

#[test]
fn self_intersection_only_for_looping_cubics() {
    let looping = Segment::cubic(c(0.0, 0.0), c(3.0, 2.0), c(-1.0, 2.0), c(2.0, 0.0));
    let hit = looping.self_intersection().expect("loop");
    assert!(hit.a_t < hit.b_t);
    assert!(looping.position_at(hit.a_t).distance(hit.point) < 1e-7);
    assert!(Segment::arc(c(0.0, 0.0), 1.0, 0.0, 2.0 * PI).self_intersection().is_none());
}

#[test]
fn ray_hits_are_sorted() {
    let circle = Segment::arc(c(5.0, 0.0), 1.0, 0.0, 2.0 * PI);
    let ray = Ray::new(c(0.0, 0.0), c(1.0, 0.0));
    let hits = circle.ray_intersections(&ray, 100.0);
    assert_eq!(hits.len(), 2);
    assert!((hits[0].distance - 4.0).abs() < 1e-9);
    assert!((hits[1].distance - 6.0).abs() < 1e-9);
    assert_eq!(hits[0].wind + hits[1].wind, 0);
}

#[test]
fn curvature_sign_follows_turn_direction() {
    let ccw = Segment::arc(c(0.0, 0.0), 2.0, 0.0, PI);
    assert!((ccw.curvature_at(0.0) - 0.5).abs() < 1e-12);
    assert!((ccw.curvature_at(0.7) - 0.5).abs() < 1e-12);
    assert!((ccw.reversed().curvature_at(0.0) + 0.5).abs() < 1e-12);
    assert_eq!(Segment::line(c(0.0, 0.0), c(1.0, 1.0)).curvature_at(0.5), 0.0);

    // An ellipse is flattest at the ends of its major axis.
    let ellipse = Segment::elliptical_arc(c(0.0, 0.0), 2.0, 1.0, 0.0, 0.0, PI);
    assert!((ellipse.curvature_at(0.0) - 2.0).abs() < 1e-9);
    assert!((ellipse.curvature_at(0.5) - 0.25).abs() < 1e-9);
}

#[test]
fn cubic_curvature_matches_osculating_circle() {
    // Control points of the standard quarter-circle approximation.
    let k = 0.552_284_749_8;
    let quarter = Segment::cubic(c(1.0, 0.0), c(1.0, k), c(k, 1.0), c(0.0, 1.0));
    assert!((quarter.curvature_at(0.5) - 1.0).abs() < 1e-2);
    assert!(quarter.curvature_at(0.0) > 0.0);
}
