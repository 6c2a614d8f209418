// File formats: shape JSON, SVG export and the graph snapshot.

use cagraph::{
    read_shape, write_shape, write_svg, AddOptions, BinaryOp, Coord, Graph, Segment, Shape, Subpath, SvgOptions,
};
use tempfile::tempdir;

fn c(x: f64, y: f64) -> Coord<f64> { Coord { x, y } }

fn mixed_shape() -> Shape {
    Shape::new(vec![
        Subpath::new(vec![
            Segment::line(c(0.0, 0.0), c(2.0, 0.0)),
            Segment::cubic(c(2.0, 0.0), c(2.5, 1.0), c(1.5, 2.0), c(1.0, 2.0)),
            Segment::arc(c(0.5, 2.0), 0.5, 0.0, std::f64::consts::PI),
            Segment::line(c(0.0, 2.0), c(0.0, 0.0)),
        ], true),
        Subpath::from_points(&[c(3.0, 0.0), c(4.0, 1.0)], false),
    ])
}

#[test]
fn shape_file_round_trips() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("shape.json");
    let shape = mixed_shape();

    write_shape(&path, &shape).expect("write shape");
    let back = read_shape(&path).expect("read shape");
    assert_eq!(back.subpaths.len(), shape.subpaths.len());
    for (read, written) in back.subpaths.iter().zip(&shape.subpaths) {
        assert_eq!(read.closed, written.closed);
        assert_eq!(read.segments.len(), written.segments.len());
        for (a, b) in read.segments.iter().zip(&written.segments) {
            assert_eq!(a.is_line(), b.is_line());
            for t in [0.0, 0.3, 1.0] {
                let (p, q) = (a.position_at(t), b.position_at(t));
                assert!((p.x - q.x).abs() < 1e-12 && (p.y - q.y).abs() < 1e-12);
            }
        }
    }
}

#[test]
fn missing_shape_file_names_the_path() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("absent.json");
    let error = read_shape(&path).expect_err("missing file");
    assert!(format!("{error:#}").contains("absent.json"));
}

#[test]
fn malformed_shape_file_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "{\"subpaths\": 3}").expect("write");
    let error = read_shape(&path).expect_err("malformed");
    assert!(format!("{error:#}").contains("[io::json]"));
}

#[test]
fn svg_file_is_written() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("out.svg");
    let shape = BinaryOp::Union.apply(&Shape::rectangle(0.0, 0.0, 1.0, 1.0), &Shape::circle(c(1.0, 1.0), 0.5));

    write_svg(&path, &shape, SvgOptions::default()).expect("write svg");
    let text = std::fs::read_to_string(&path).expect("read svg");
    assert!(text.contains("<svg"));
    assert!(text.contains("<path"));
    assert!(text.trim_end().ends_with("</svg>"));
}

#[test]
fn graph_snapshot_round_trips() {
    let mut graph = Graph::new();
    graph.add_shape(0, &Shape::rectangle(0.0, 0.0, 2.0, 2.0), AddOptions::default());
    graph.add_shape(1, &Shape::circle(c(2.0, 2.0), 1.0), AddOptions::default());
    graph.compute_simplified_faces();
    graph.compute_face_inclusion(BinaryOp::Difference.filter());

    let value = graph.serialize().expect("serialize");
    let restored = Graph::deserialize(&value).expect("deserialize");

    assert_eq!(restored.vertex_count(), graph.vertex_count());
    assert_eq!(restored.edge_count(), graph.edge_count());
    assert_eq!(restored.face_count(), graph.face_count());
    assert_eq!(restored.serialize().expect("serialize again"), value);
    restored.check_invariants().expect("restored invariants");

    let original = graph.create_filled_sub_graph().faces_to_shape();
    let again = restored.create_filled_sub_graph().faces_to_shape();
    assert!((original.signed_area() - again.signed_area()).abs() < 1e-12);
}

#[test]
fn truncated_snapshot_is_rejected() {
    let mut value = {
        let mut graph = Graph::new();
        graph.add_shape(0, &Shape::rectangle(0.0, 0.0, 1.0, 1.0), AddOptions::default());
        graph.compute_simplified_faces();
        graph.serialize().expect("serialize")
    };
    value["faces"] = serde_json::json!([]);
    assert!(Graph::deserialize(&value).is_err());
}
