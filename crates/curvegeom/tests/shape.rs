use std::f64::consts::PI;

use curvegeom::{Coord, Segment, Shape, Subpath};

fn c(x: f64, y: f64) -> Coord<f64> { Coord { x, y } }

#[test]
fn ellipse_area_and_containment() {
    let ellipse = Shape::ellipse(c(0.0, 0.0), 3.0, 1.0, PI / 4.0);
    assert!((ellipse.signed_area() - 3.0 * PI).abs() < 1e-9);
    assert!(ellipse.contains_point(c(1.5, 1.5)));
    assert!(!ellipse.contains_point(c(1.5, -1.5)));
}

#[test]
fn nested_rectangles_wind_twice() {
    let mut shape = Shape::rectangle(0.0, 0.0, 4.0, 4.0);
    shape.subpaths.extend(Shape::rectangle(1.0, 1.0, 2.0, 2.0).subpaths);
    assert_eq!(shape.winding_number(c(2.0, 2.0)), 2);
    assert_eq!(shape.winding_number(c(0.5, 0.5)), 1);
    assert_eq!(shape.winding_number(c(5.0, 5.0)), 0);
}

#[test]
fn json_round_trip() {
    let shape = Shape::new(vec![Subpath::new(vec![
        Segment::line(c(0.0, 0.0), c(1.0, 0.0)),
        Segment::cubic(c(1.0, 0.0), c(1.5, 0.5), c(1.5, 1.0), c(1.0, 1.0)),
        Segment::arc(c(0.5, 1.0), 0.5, 0.0, PI),
    ], true)]);
    let json = serde_json::to_string(&shape).unwrap();
    let back: Shape = serde_json::from_str(&json).unwrap();
    assert_eq!(back, shape);
}

#[test]
fn missing_closed_flag_defaults_to_open() {
    let json = r#"{"subpaths":[{"segments":[{"type":"line","start":{"x":0,"y":0},"end":{"x":1,"y":0}}]}]}"#;
    let shape: Shape = serde_json::from_str(json).unwrap();
    assert!(!shape.subpaths[0].closed);
    assert_eq!(shape.segment_count(), 1);
}

#[test]
fn translated_preserves_area() {
    let circle = Shape::circle(c(0.0, 0.0), 1.0);
    let moved = circle.translated(c(10.0, -3.0));
    assert!((moved.signed_area() - circle.signed_area()).abs() < 1e-9);
    assert!(moved.contains_point(c(10.0, -3.0)));
}

#[test]
fn empty_shape() {
    let shape = Shape::empty();
    assert!(shape.is_empty());
    assert!(shape.bounds().is_none());
    assert_eq!(shape.winding_number(c(0.0, 0.0)), 0);
    assert_eq!(shape.to_svg_path_data(), "");
}
