// End-to-end boolean operations on small hand-checked inputs.

use std::f64::consts::PI;

use cagraph::{
    clip_shape, simplify_non_zero, union_non_zero, AddOptions, BinaryOp, ClipOptions, Coord, Graph, Shape,
};

fn c(x: f64, y: f64) -> Coord<f64> { Coord { x, y } }

fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 1e-9, "expected {expected}, got {actual}");
}

/// (0,0) → (2,2) → (2,0) → (0,2) → back: two triangular lobes meeting at
/// (1,1), the left one counter-clockwise and the right one clockwise.
fn figure_eight() -> Shape {
    Shape::polygon(&[c(0.0, 0.0), c(2.0, 2.0), c(2.0, 0.0), c(0.0, 2.0)])
}

#[test]
fn union_of_offset_squares_is_one_octagon() {
    let a = Shape::rectangle(0.0, 0.0, 1.0, 1.0);
    let b = Shape::rectangle(0.5, 0.5, 1.0, 1.0);
    let union = BinaryOp::Union.apply(&a, &b);

    assert_eq!(union.subpaths.len(), 1);
    assert_eq!(union.segment_count(), 8);
    assert!(union.subpaths[0].closed);
    assert_close(union.signed_area(), 1.75);
}

#[test]
fn union_of_offset_squares_has_one_filled_face() {
    let mut graph = Graph::new();
    graph.add_shape(0, &Shape::rectangle(0.0, 0.0, 1.0, 1.0), AddOptions::default());
    graph.add_shape(1, &Shape::rectangle(0.5, 0.5, 1.0, 1.0), AddOptions::default());
    graph.compute_simplified_faces();
    graph.compute_face_inclusion(BinaryOp::Union.filter());

    let filled = graph.create_filled_sub_graph();
    assert_eq!(filled.faces().filter(|(_, f)| f.filled).count(), 1);
    assert_close(filled.filled_area(), 1.75);
}

#[test]
fn union_of_disjoint_squares_keeps_both() {
    let union = union_non_zero(&[Shape::rectangle(0.0, 0.0, 1.0, 1.0), Shape::rectangle(3.0, 0.0, 1.0, 1.0)]);
    assert_eq!(union.subpaths.len(), 2);
    assert_close(union.signed_area(), 2.0);
    assert!(union.subpaths.iter().all(|s| (s.signed_area() - 1.0).abs() < 1e-9));
}

#[test]
fn difference_leaves_square_with_hole() {
    let outer = Shape::rectangle(0.0, 0.0, 1.0, 1.0);
    let inner = Shape::rectangle(0.25, 0.25, 0.5, 0.5);
    let result = BinaryOp::Difference.apply(&outer, &inner);

    assert_eq!(result.subpaths.len(), 2);
    assert_close(result.signed_area(), 0.75);
    assert!(result.contains_point(c(0.1, 0.5)));
    assert!(!result.contains_point(c(0.5, 0.5)));

    let mut graph = Graph::new();
    graph.add_shape(0, &result, AddOptions::default());
    graph.compute_simplified_faces();
    let faces: Vec<_> = graph.faces().filter(|(_, f)| !f.is_unbounded() && f.winding(0) != 0).collect();
    assert_eq!(faces.len(), 1);
    assert_eq!(faces[0].1.holes.len(), 1);
}

#[test]
fn figure_eight_crossing_becomes_shared_vertex() {
    let mut graph = Graph::new();
    graph.add_shape(0, &figure_eight(), AddOptions::default());
    graph.compute_simplified_faces();

    assert_eq!(graph.vertex_count(), 5);
    assert_eq!(graph.vertices().filter(|(_, v)| v.degree() == 4).count(), 1);

    let mut windings: Vec<i32> = graph.faces()
        .filter(|(_, f)| !f.is_unbounded())
        .map(|(_, f)| f.winding(0))
        .collect();
    windings.sort();
    assert_eq!(windings, vec![-1, 1]);
}

#[test]
fn figure_eight_under_nonzero_keeps_both_lobes() {
    let simplified = simplify_non_zero(&figure_eight());
    assert_eq!(simplified.subpaths.len(), 2);
    // Both lobes come back counter-clockwise.
    assert_close(simplified.signed_area(), 2.0);
}

#[test]
fn figure_eight_positive_filter_keeps_left_lobe() {
    let result = cagraph::fill_shapes(&[figure_eight()], |map| map.get(&0).is_some_and(|&w| w > 0));
    assert_eq!(result.subpaths.len(), 1);
    assert_close(result.signed_area(), 1.0);
    assert!(result.contains_point(c(0.5, 1.0)));
    assert!(!result.contains_point(c(1.5, 1.0)));
}

#[test]
fn clip_against_disjoint_region_is_empty() {
    let clip = Shape::rectangle(5.0, 5.0, 1.0, 1.0);
    let shape = Shape::rectangle(0.0, 0.0, 1.0, 1.0);
    let result = clip_shape(&clip, &shape, ClipOptions { include_exterior: false, ..Default::default() });
    assert!(result.is_empty());
    assert!(result.subpaths.is_empty());
}

#[test]
fn intersection_and_xor_of_offset_squares() {
    let a = Shape::rectangle(0.0, 0.0, 1.0, 1.0);
    let b = Shape::rectangle(0.5, 0.5, 1.0, 1.0);

    let both = BinaryOp::Intersection.apply(&a, &b);
    assert_eq!(both.segment_count(), 4);
    assert_close(both.signed_area(), 0.25);

    let either = BinaryOp::Xor.apply(&a, &b);
    assert_eq!(either.subpaths.len(), 2);
    assert_close(either.signed_area(), 1.5);
}

#[test]
fn circle_minus_square_keeps_arcs() {
    let circle = Shape::circle(c(0.0, 0.0), 1.0);
    let square = Shape::rectangle(0.0, -2.0, 2.0, 4.0);
    let half = BinaryOp::Difference.apply(&circle, &square);

    assert_eq!(half.subpaths.len(), 1);
    assert!(half.subpaths[0].segments.iter().any(|s| s.is_curved()));
    assert!((half.signed_area() - (PI / 2.0)).abs() < 1e-6);
}

#[test]
fn shared_edge_squares_merge_into_rectangle() {
    let union = union_non_zero(&[Shape::rectangle(0.0, 0.0, 1.0, 1.0), Shape::rectangle(1.0, 0.0, 1.0, 1.0)]);
    assert_eq!(union.subpaths.len(), 1);
    assert_eq!(union.segment_count(), 4);
    assert_close(union.signed_area(), 2.0);
}

#[test]
fn externally_tangent_circles_union() {
    let (a, b) = (Shape::circle(c(0.0, 0.0), 1.0), Shape::circle(c(2.0, 0.0), 1.0));
    let mut graph = Graph::new();
    graph.add_shape(0, &a, AddOptions::default());
    graph.add_shape(1, &b, AddOptions::default());
    graph.compute_simplified_faces();
    graph.check_invariants().expect("invariants at the tangent point");
    assert_eq!(graph.bounded_face_count(), 2);

    let union = BinaryOp::Union.apply(&a, &b);
    assert!((union.signed_area() - 2.0 * PI).abs() < 1e-6);
    assert!(union.contains_point(c(0.0, 0.0)));
    assert!(union.contains_point(c(2.0, 0.0)));
    assert!(!union.contains_point(c(1.0, 0.5)));
}

#[test]
fn internally_tangent_circle_difference_is_crescent() {
    let (outer, inner) = (Shape::circle(c(0.0, 0.0), 2.0), Shape::circle(c(1.0, 0.0), 1.0));
    let crescent = BinaryOp::Difference.apply(&outer, &inner);
    assert!((crescent.signed_area() - 3.0 * PI).abs() < 1e-6);
    assert!(crescent.contains_point(c(-1.0, 0.0)));
    assert!(!crescent.contains_point(c(1.0, 0.0)));

    let core = BinaryOp::Intersection.apply(&outer, &inner);
    assert!((core.signed_area() - PI).abs() < 1e-6);
}
