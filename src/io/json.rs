use std::io::{Read, Write};

use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::io::IoError;
use crate::sketch::{
    Classification, EndPointId, Point, ShapeFlags, ShapeId, ShapeType, Sketch, Violation,
};

#[derive(Debug, Serialize, Deserialize)]
struct SketchFile {
    shapes: Vec<ShapeRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ShapeRecord {
    #[serde(rename = "type")]
    shape_type: String,
    #[serde(default)]
    probability: f64,
    #[serde(default)]
    orientation: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sub_circuit: Option<usize>,
    #[serde(default)]
    flags: ShapeFlags,
    substrokes: Vec<SubstrokeRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SubstrokeRecord {
    points: Vec<Point>,
    #[serde(default)]
    classification: Classification,
    /// Shapes touched by the first and last point, as indices in the shape list
    #[serde(default)]
    connections: [Option<usize>; 2],
}

/// Read a sketch in JSON format
///
/// Shapes are created in file order. Connections are checked: they must be mutual
/// and backed by endpoints on both sides. Connected wires are accepted, and are
/// merged by the connectivity engine.
pub fn read_sketch<R: Read>(r: R) -> Result<Sketch, IoError> {
    let file: SketchFile = serde_json::from_reader(r)?;
    let mut ret = Sketch::new();
    let mut links = Vec::new();
    for (i, record) in file.shapes.iter().enumerate() {
        let shape_type = ShapeType::from_name(&record.shape_type)
            .ok_or_else(|| IoError::UnknownType(record.shape_type.clone()))?;
        if record.substrokes.is_empty() {
            return Err(IoError::EmptyShape(i));
        }
        if record.substrokes.iter().any(|ss| ss.points.is_empty()) {
            return Err(IoError::EmptySubstroke(i));
        }
        let id = ret.add_shape(
            shape_type,
            record.substrokes.iter().map(|ss| ss.points.clone()).collect(),
        );
        ret.relabel(id, shape_type, record.probability, record.orientation);
        let shape = ret.shape_mut(id);
        shape.flags = record.flags;
        shape.set_name(record.name.clone());
        shape.set_sub_circuit(record.sub_circuit);
        for (ss, ss_record) in ret.shape(id).substrokes().to_vec().into_iter().zip(&record.substrokes) {
            ret.set_classification(ss, ss_record.classification);
            for (e, target) in ss.endpoints().into_iter().zip(ss_record.connections) {
                if let Some(t) = target {
                    if t >= file.shapes.len() {
                        return Err(IoError::InvalidReference { shape: i, target: t });
                    }
                    links.push((e, ShapeId::from_index(t)));
                }
            }
        }
    }

    for (e, target) in links {
        let owner = ret.owner(e);
        ret.substrokes[e.substroke.index()].endpoints[e.end.index()].connected_shape = Some(target);
        ret.shapes[owner.index()].connected.insert(target);
    }

    let violations: Vec<Violation> = ret
        .consistency_violations()
        .into_iter()
        .filter(|v| !matches!(v, Violation::UnmergedWires(..)))
        .collect();
    if !violations.is_empty() {
        return Err(IoError::Inconsistent(violations));
    }
    Ok(ret)
}

/// Write a sketch in JSON format
///
/// Removed shapes and substrokes are not written, so handles are renumbered.
pub fn write_sketch<W: Write>(w: W, sketch: &Sketch) -> Result<(), IoError> {
    let index: FxHashMap<ShapeId, usize> = sketch
        .shape_ids()
        .enumerate()
        .map(|(i, s)| (s, i))
        .collect();
    let link = |e: EndPointId| sketch.endpoint(e).connected_shape().map(|t| index[&t]);
    let shapes = sketch
        .shape_ids()
        .map(|s| {
            let shape = sketch.shape(s);
            ShapeRecord {
                shape_type: shape.shape_type().name().to_string(),
                probability: shape.probability(),
                orientation: shape.orientation(),
                name: shape.name().map(|n| n.to_string()),
                sub_circuit: shape.sub_circuit(),
                flags: shape.flags,
                substrokes: shape
                    .substrokes()
                    .iter()
                    .map(|ss| SubstrokeRecord {
                        points: sketch.substroke(*ss).points().to_vec(),
                        classification: sketch.substroke(*ss).classification(),
                        connections: [link(ss.start()), link(ss.stop())],
                    })
                    .collect(),
            }
        })
        .collect();
    serde_json::to_writer_pretty(w, &SketchFile { shapes })?;
    Ok(())
}
