//! JSON form of a [`Graph`], with integer ids in place of arena keys.

use anyhow::{bail, ensure, Context, Result};
use curvegeom::{Coord, Rect, Segment};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use slotmap::SecondaryMap;

use crate::graph::{
    Boundary, BoundaryId, Edge, EdgeKey, Face, FaceId, Graph, HalfData, HalfEdgeId, Loop, ShapeId, Vertex,
    VertexKey, WindingMap,
};

#[derive(Serialize, Deserialize)]
struct GraphRecord {
    shape_ids:  Vec<ShapeId>,
    vertices:   Vec<VertexRecord>,
    edges:      Vec<EdgeRecord>,
    loops:      Vec<LoopRecord>,
    boundaries: Vec<BoundaryRecord>,
    faces:      Vec<FaceRecord>,
}

#[derive(Serialize, Deserialize)]
struct VertexRecord {
    point:    Coord<f64>,
    incident: Vec<HalfRecord>,
}

#[derive(Clone, Copy, Serialize, Deserialize)]
struct HalfRecord {
    edge:     usize,
    reversed: bool,
}

#[derive(Serialize, Deserialize)]
struct HalfDataRecord {
    face:     Option<usize>,
    boundary: Option<usize>,
}

#[derive(Serialize, Deserialize)]
struct EdgeRecord {
    segment:  Segment,
    start:    usize,
    end:      usize,
    forward:  HalfDataRecord,
    reversed: HalfDataRecord,
    #[serde(default)]
    clip:     bool,
}

#[derive(Serialize, Deserialize)]
struct LoopRecord {
    shape_id:   ShapeId,
    closed:     bool,
    half_edges: Vec<HalfRecord>,
}

#[derive(Serialize, Deserialize)]
struct BoundaryRecord {
    half_edges:  Vec<HalfRecord>,
    signed_area: f64,
    bounds:      Rect<f64>,
    children:    Vec<usize>,
    face:        Option<usize>,
}

#[derive(Serialize, Deserialize)]
struct FaceRecord {
    boundary:    Option<usize>,
    holes:       Vec<usize>,
    winding_map: Option<WindingMap>,
    filled:      bool,
}

impl Graph {
    /// Snapshot the whole arrangement as JSON.
    pub fn serialize(&self) -> Result<Value> {
        let mut vertex_ids: SecondaryMap<VertexKey, usize> = SecondaryMap::new();
        for (i, key) in self.vertices.keys().enumerate() {
            vertex_ids.insert(key, i);
        }
        let mut edge_ids: SecondaryMap<EdgeKey, usize> = SecondaryMap::new();
        for (i, key) in self.edges.keys().enumerate() {
            edge_ids.insert(key, i);
        }

        let half = |h: &HalfEdgeId| HalfRecord { edge: edge_ids[h.edge], reversed: h.reversed };
        let half_data = |d: &HalfData| HalfDataRecord { face: d.face.map(|f| f.0), boundary: d.boundary.map(|b| b.0) };

        let record = GraphRecord {
            shape_ids: self.shape_ids.iter().copied().collect(),
            vertices: self.vertices.values()
                .map(|v| VertexRecord { point: v.point, incident: v.incident.iter().map(half).collect() })
                .collect(),
            edges: self.edges.values()
                .map(|e| EdgeRecord {
                    segment:  e.segment,
                    start:    vertex_ids[e.start],
                    end:      vertex_ids[e.end],
                    forward:  half_data(&e.forward),
                    reversed: half_data(&e.reversed),
                    clip:     e.clip,
                })
                .collect(),
            loops: self.loops.iter()
                .map(|lp| LoopRecord { shape_id: lp.shape_id, closed: lp.closed, half_edges: lp.half_edges.iter().map(half).collect() })
                .collect(),
            boundaries: self.boundaries.iter()
                .map(|b| BoundaryRecord {
                    half_edges:  b.half_edges.iter().map(half).collect(),
                    signed_area: b.signed_area,
                    bounds:      b.bounds,
                    children:    b.children.iter().map(|c| c.0).collect(),
                    face:        b.face.map(|f| f.0),
                })
                .collect(),
            faces: self.faces.iter()
                .map(|f| FaceRecord {
                    boundary:    f.boundary.map(|b| b.0),
                    holes:       f.holes.iter().map(|h| h.0).collect(),
                    winding_map: f.winding_map.clone(),
                    filled:      f.filled,
                })
                .collect(),
        };
        serde_json::to_value(record).context("[io::graph] Failed to serialize graph")
    }

    /// Rebuild a graph from [`Graph::serialize`] output.  Every id is checked
    /// against the arena it refers to.
    pub fn deserialize(value: &Value) -> Result<Graph> {
        let record = GraphRecord::deserialize(value).context("[io::graph] Malformed graph JSON")?;
        let (vertex_count, edge_count) = (record.vertices.len(), record.edges.len());
        let (boundary_count, face_count) = (record.boundaries.len(), record.faces.len());
        ensure!(face_count > 0, "[io::graph] Graph has no unbounded face");
        ensure!(record.faces[0].boundary.is_none(), "[io::graph] Face 0 must be the unbounded face");

        let face_id = |id: usize| -> Result<FaceId> {
            ensure!(id < face_count, "[io::graph] Face id {id} out of range ({face_count} faces)");
            Ok(FaceId(id))
        };
        let boundary_id = |id: usize| -> Result<BoundaryId> {
            ensure!(id < boundary_count, "[io::graph] Boundary id {id} out of range ({boundary_count} boundaries)");
            Ok(BoundaryId(id))
        };
        let half_data = |d: &HalfDataRecord| -> Result<HalfData> {
            Ok(HalfData { face: d.face.map(face_id).transpose()?, boundary: d.boundary.map(boundary_id).transpose()? })
        };

        let mut graph = Graph::new();
        graph.shape_ids = record.shape_ids.iter().copied().collect();

        let vertex_keys: Vec<VertexKey> = record.vertices.iter()
            .map(|v| graph.vertices.insert(Vertex::new(v.point)))
            .collect();

        let mut edge_keys: Vec<EdgeKey> = Vec::with_capacity(edge_count);
        for (i, e) in record.edges.iter().enumerate() {
            let (Some(&start), Some(&end)) = (vertex_keys.get(e.start), vertex_keys.get(e.end)) else {
                bail!("[io::graph] Edge {i} references a missing vertex ({} or {} of {vertex_count})", e.start, e.end);
            };
            let mut edge = Edge::new(e.segment, start, end);
            edge.forward = half_data(&e.forward).with_context(|| format!("[io::graph] Edge {i} forward half"))?;
            edge.reversed = half_data(&e.reversed).with_context(|| format!("[io::graph] Edge {i} reversed half"))?;
            edge.clip = e.clip;
            edge_keys.push(graph.edges.insert(edge));
        }

        let to_half = |h: &HalfRecord| -> Result<HalfEdgeId> {
            let Some(&edge) = edge_keys.get(h.edge) else {
                bail!("[io::graph] Half-edge references missing edge {} of {edge_count}", h.edge);
            };
            Ok(HalfEdgeId { edge, reversed: h.reversed })
        };

        for (i, (v, &key)) in record.vertices.iter().zip(&vertex_keys).enumerate() {
            for h in &v.incident {
                let half = to_half(h).with_context(|| format!("[io::graph] Vertex {i} incidence"))?;
                ensure!(graph.half_end(half) == key, "[io::graph] Vertex {i} lists a half-edge ending elsewhere");
                graph.vertices[key].incident.push(half);
            }
        }
        for (i, key) in edge_keys.iter().enumerate() {
            let edge = &graph.edges[*key];
            let recorded = graph.vertices[edge.start].incident.contains(&HalfEdgeId::backward(*key))
                && graph.vertices[edge.end].incident.contains(&HalfEdgeId::forward(*key));
            ensure!(recorded, "[io::graph] Edge {i} is missing from its vertices' incidence lists");
        }

        for (i, lp) in record.loops.iter().enumerate() {
            let half_edges = lp.half_edges.iter().map(to_half).collect::<Result<_>>()
                .with_context(|| format!("[io::graph] Loop {i}"))?;
            graph.loops.push(Loop { shape_id: lp.shape_id, closed: lp.closed, half_edges });
        }

        for (i, b) in record.boundaries.iter().enumerate() {
            let context = || format!("[io::graph] Boundary {i}");
            graph.boundaries.push(Boundary {
                half_edges:  b.half_edges.iter().map(to_half).collect::<Result<_>>().with_context(context)?,
                signed_area: b.signed_area,
                bounds:      b.bounds,
                children:    b.children.iter().map(|&c| boundary_id(c)).collect::<Result<_>>().with_context(context)?,
                face:        b.face.map(face_id).transpose().with_context(context)?,
            });
        }

        graph.faces.clear();
        for (i, f) in record.faces.iter().enumerate() {
            let context = || format!("[io::graph] Face {i}");
            graph.faces.push(Face {
                boundary:    f.boundary.map(boundary_id).transpose().with_context(context)?,
                holes:       f.holes.iter().map(|&h| boundary_id(h)).collect::<Result<_>>().with_context(context)?,
                winding_map: f.winding_map.clone(),
                filled:      f.filled,
            });
        }
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use curvegeom::Shape;
    use serde_json::json;

    use super::*;
    use crate::graph::AddOptions;

    fn simplified_square() -> Graph {
        let mut graph = Graph::new();
        graph.add_shape(0, &Shape::rectangle(0.0, 0.0, 1.0, 1.0), AddOptions::default());
        graph.compute_simplified_faces();
        graph
    }

    #[test]
    fn serialize_uses_dense_ids() {
        let value = simplified_square().serialize().expect("serialize");
        assert_eq!(value["vertices"].as_array().map(Vec::len), Some(4));
        assert_eq!(value["edges"].as_array().map(Vec::len), Some(4));
        assert_eq!(value["faces"].as_array().map(Vec::len), Some(2));
        assert_eq!(value["faces"][0]["boundary"], Value::Null);
        assert_eq!(value["faces"][1]["winding_map"]["0"], json!(1));
    }

    #[test]
    fn dangling_edge_reference_is_rejected() {
        let mut value = simplified_square().serialize().expect("serialize");
        value["loops"][0]["half_edges"][0]["edge"] = json!(99);
        let error = Graph::deserialize(&value).expect_err("dangling edge id");
        assert!(format!("{error:#}").contains("missing edge 99"));
    }

    #[test]
    fn dangling_face_reference_is_rejected() {
        let mut value = simplified_square().serialize().expect("serialize");
        value["edges"][0]["forward"]["face"] = json!(7);
        assert!(Graph::deserialize(&value).is_err());
    }

    #[test]
    fn wrong_incidence_is_rejected() {
        let mut value = simplified_square().serialize().expect("serialize");
        let first = value["vertices"][0]["incident"].clone();
        value["vertices"][0]["incident"] = value["vertices"][1]["incident"].clone();
        value["vertices"][1]["incident"] = first;
        assert!(Graph::deserialize(&value).is_err());
    }
}
