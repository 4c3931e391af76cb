use std::collections::BTreeSet;

use crate::ops::Aspects;
use crate::sketch::{Classification, ShapeFlags, ShapeId, ShapeType, Sketch, SubstrokeId};

/// Substroke membership of shapes
#[derive(Debug, Clone)]
struct GeometryState {
    members: Vec<(Vec<SubstrokeId>, bool)>,
    owners: Vec<Option<ShapeId>>,
}

/// Types and attributes of shapes and substrokes
#[derive(Debug, Clone)]
struct TypeState {
    shapes: Vec<(ShapeType, f64, f64, ShapeFlags, Option<String>, Option<usize>)>,
    classifications: Vec<Classification>,
}

/// Connections of shapes and endpoints
#[derive(Debug, Clone)]
struct ConnectionState {
    connected: Vec<BTreeSet<ShapeId>>,
    endpoints: Vec<[Option<ShapeId>; 2]>,
}

/// Copy of the aspects of a sketch an operation may modify
#[derive(Debug, Clone)]
pub(crate) struct Snapshot {
    nb_shapes: usize,
    nb_substrokes: usize,
    geometry: Option<GeometryState>,
    types: Option<TypeState>,
    connections: Option<ConnectionState>,
}

impl Snapshot {
    /// Record the given aspects of the sketch
    pub fn take(sketch: &Sketch, aspects: Aspects) -> Snapshot {
        let geometry = aspects.geometry.then(|| GeometryState {
            members: sketch
                .shapes
                .iter()
                .map(|s| (s.substrokes.clone(), s.removed))
                .collect(),
            owners: sketch.substrokes.iter().map(|s| s.shape).collect(),
        });
        let types = aspects.types.then(|| TypeState {
            shapes: sketch
                .shapes
                .iter()
                .map(|s| {
                    (
                        s.shape_type,
                        s.probability,
                        s.orientation,
                        s.flags,
                        s.name.clone(),
                        s.sub_circuit,
                    )
                })
                .collect(),
            classifications: sketch.substrokes.iter().map(|s| s.classification).collect(),
        });
        let connections = aspects.connections.then(|| ConnectionState {
            connected: sketch.shapes.iter().map(|s| s.connected.clone()).collect(),
            endpoints: sketch
                .substrokes
                .iter()
                .map(|s| [s.endpoints[0].connected_shape, s.endpoints[1].connected_shape])
                .collect(),
        });
        Snapshot {
            nb_shapes: sketch.shapes.len(),
            nb_substrokes: sketch.substrokes.len(),
            geometry,
            types,
            connections,
        }
    }

    /// Restore the recorded aspects
    ///
    /// Shapes and substrokes created since the snapshot are discarded when geometry
    /// was recorded.
    pub fn restore(self, sketch: &mut Sketch) {
        if let Some(g) = self.geometry {
            sketch.shapes.truncate(self.nb_shapes);
            sketch.substrokes.truncate(self.nb_substrokes);
            for (shape, (members, removed)) in sketch.shapes.iter_mut().zip(g.members) {
                shape.substrokes = members;
                shape.removed = removed;
            }
            for (ss, owner) in sketch.substrokes.iter_mut().zip(g.owners) {
                ss.shape = owner;
            }
        }
        if let Some(t) = self.types {
            for (shape, (shape_type, probability, orientation, flags, name, sub_circuit)) in
                sketch.shapes.iter_mut().zip(t.shapes)
            {
                shape.shape_type = shape_type;
                shape.probability = probability;
                shape.orientation = orientation;
                shape.flags = flags;
                shape.name = name;
                shape.sub_circuit = sub_circuit;
            }
            for (ss, c) in sketch.substrokes.iter_mut().zip(t.classifications) {
                ss.classification = c;
            }
        }
        if let Some(c) = self.connections {
            for (shape, connected) in sketch.shapes.iter_mut().zip(c.connected) {
                shape.connected = connected;
            }
            for (ss, [start, stop]) in sketch.substrokes.iter_mut().zip(c.endpoints) {
                ss.endpoints[0].connected_shape = start;
                ss.endpoints[1].connected_shape = stop;
            }
        }
    }
}
