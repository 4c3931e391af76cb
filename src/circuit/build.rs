use fxhash::FxHashMap;
use log::debug;

use crate::circuit::{Circuit, CircuitError, Driver, GateKind};
use crate::sketch::{Classification, Point, ShapeId, Sketch};

/// A wire touching a gate, positioned in the frame of the gate
struct Terminal {
    shape: ShapeId,
    /// Distance along the gate orientation; positive on the output side
    along: f64,
    /// Distance across the gate orientation, used to order the inputs
    across: f64,
}

/// Position of the ends of `wire` that touch `shape`
fn contact_point(sketch: &Sketch, wire: ShapeId, shape: ShapeId) -> Option<Point> {
    let points: Vec<Point> = sketch
        .endpoints(wire)
        .into_iter()
        .filter(|e| sketch.endpoint(*e).connected_shape() == Some(shape))
        .map(|e| sketch.endpoint(e).position())
        .collect();
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    Some(Point::new(
        points.iter().map(|p| p.x).sum::<f64>() / n,
        points.iter().map(|p| p.y).sum::<f64>() / n,
    ))
}

/// Wires touching a gate, in the frame given by its orientation
fn terminals(sketch: &Sketch, gate: ShapeId) -> Vec<Terminal> {
    let shape = sketch.shape(gate);
    let center = sketch.bounding_box(gate).center();
    let (sin, cos) = shape.orientation().sin_cos();
    shape
        .connected_shapes()
        .iter()
        .copied()
        .filter(|w| sketch.shape(*w).is_wire())
        .filter_map(|w| {
            let p = contact_point(sketch, w, gate)?;
            let (dx, dy) = (p.x - center.x, p.y - center.y);
            Some(Terminal {
                shape: w,
                along: dx * cos + dy * sin,
                across: -dx * sin + dy * cos,
            })
        })
        .collect()
}

impl Circuit {
    /// Build the circuit drawn in a connected sketch
    ///
    /// Every live shape must be typed: wires become meshes, gates become components
    /// and labels become primary inputs or outputs. A wire touching a gate on the side
    /// its orientation points to is driven by the gate; the other wires feed its inputs,
    /// ordered across the orientation. A label on a wire driven by a gate is an output,
    /// otherwise an input. Primary inputs and outputs are ordered by name.
    pub fn from_sketch(sketch: &Sketch) -> Result<Circuit, CircuitError> {
        let mut ret = Circuit::new();
        let mut meshes: FxHashMap<ShapeId, usize> = FxHashMap::default();
        let mut gates = Vec::new();
        let mut labels = Vec::new();
        for s in sketch.shape_ids() {
            let shape = sketch.shape(s);
            match shape.shape_type().classification() {
                Classification::Wire => {
                    meshes.insert(s, ret.add_mesh(Some(s)));
                }
                Classification::Gate => {
                    let kind = GateKind::from_shape_type(shape.shape_type()).ok_or_else(|| {
                        CircuitError::UnknownGate {
                            shape: s,
                            shape_type: shape.shape_type().name().to_string(),
                        }
                    })?;
                    gates.push((s, ret.add_gate(kind)));
                }
                Classification::Text => labels.push(s),
                Classification::Unknown => return Err(CircuitError::UnrecognizedShape(s)),
            }
        }

        for (s, g) in gates {
            let (outputs, mut inputs): (Vec<Terminal>, Vec<Terminal>) =
                terminals(sketch, s).into_iter().partition(|t| t.along > 0.0);
            for t in outputs {
                let m = meshes[&t.shape];
                if ret.meshes[m].source.is_some() {
                    return Err(CircuitError::MultipleDrivers(t.shape));
                }
                ret.connect_source(m, Driver::new(g))?;
            }
            inputs.sort_by(|a, b| a.across.total_cmp(&b.across));
            for (i, t) in inputs.iter().enumerate() {
                ret.connect_dependent(meshes[&t.shape], g, i)?;
            }
            debug!("Gate {s} has {} inputs", inputs.len());
        }

        let mut primary_inputs = Vec::new();
        let mut primary_outputs = Vec::new();
        for s in labels {
            let shape = sketch.shape(s);
            let name = shape.name().ok_or(CircuitError::UnnamedLabel(s))?;
            let wires: Vec<ShapeId> = shape
                .connected_shapes()
                .iter()
                .copied()
                .filter(|w| sketch.shape(*w).is_wire())
                .collect();
            let [w] = wires[..] else {
                return Err(CircuitError::DetachedLabel(s));
            };
            let m = meshes[&w];
            if ret.meshes[m].source.is_some() {
                primary_outputs.push((name, m));
            } else {
                primary_inputs.push((name, m, w));
            }
        }
        primary_inputs.sort();
        primary_outputs.sort();
        for (name, m, w) in primary_inputs {
            if ret.meshes[m].source.is_some() {
                return Err(CircuitError::MultipleDrivers(w));
            }
            let i = ret.add_input(name);
            ret.connect_source(m, Driver::new(i))?;
        }
        for (name, m) in primary_outputs {
            let o = ret.add_output(name);
            ret.connect_dependent(m, o, 0)?;
        }
        Ok(ret)
    }
}

#[cfg(test)]
mod tests {
    use crate::circuit::{Circuit, CircuitError, Component, Driver, GateKind};
    use crate::connect::{ConnectivityEngine, ProximityDomain};
    use crate::sketch::generators::testcases;
    use crate::sketch::{ShapeId, ShapeType, Sketch};

    fn connected(mut sketch: Sketch) -> Sketch {
        let domain = ProximityDomain::new(testcases::RADIUS);
        ConnectivityEngine::new(&domain).connect_all(&mut sketch);
        sketch
    }

    #[test]
    fn test_and_gate() {
        let sketch = connected(testcases::and_gate());
        let circuit = Circuit::from_sketch(&sketch).unwrap();
        assert_eq!(circuit.nb_gates(), 1);
        assert_eq!(circuit.nb_meshes(), 3);
        assert_eq!(circuit.input_names(), vec!["A", "B"]);
        assert_eq!(circuit.output_names(), vec!["Y"]);
        let a = circuit.inputs()[0];
        let b = circuit.inputs()[1];
        let Component::Gate(g) = circuit.component(0) else {
            panic!("Expected a gate");
        };
        assert_eq!(g.kind, GateKind::And);
        assert_eq!(
            circuit.component(0).inputs(),
            &[Some(Driver::new(a)), Some(Driver::new(b))]
        );
        let y = circuit.outputs()[0];
        assert_eq!(circuit.component(y).inputs(), &[Some(Driver::new(0))]);
        assert!(circuit.check().is_ok());
    }

    #[test]
    fn test_gate_chain() {
        let sketch = connected(testcases::nand_not_chain());
        let circuit = Circuit::from_sketch(&sketch).unwrap();
        assert_eq!(circuit.nb_gates(), 2);
        assert_eq!(circuit.nb_meshes(), 4);
        assert_eq!(circuit.input_names(), vec!["A", "B"]);
        assert_eq!(circuit.output_names(), vec!["Y"]);

        // The wire between the gates is driven by the Nand and read by the Not
        let Component::Gate(nand) = circuit.component(0) else {
            panic!("Expected a gate");
        };
        assert_eq!(nand.kind, GateKind::Nand);
        assert_eq!(circuit.component(1).inputs(), &[Some(Driver::new(0))]);
        let y = circuit.outputs()[0];
        assert_eq!(circuit.component(y).inputs(), &[Some(Driver::new(1))]);
        assert!(circuit.check().is_ok());
    }

    #[test]
    fn test_fan_out() {
        let sketch = connected(testcases::fan_out());
        let circuit = Circuit::from_sketch(&sketch).unwrap();
        assert_eq!(circuit.nb_gates(), 1);
        assert_eq!(circuit.nb_meshes(), 2);
        assert_eq!(circuit.input_names(), vec!["A"]);
        assert_eq!(circuit.output_names(), vec!["Y", "Z"]);
        for o in circuit.outputs() {
            assert_eq!(circuit.component(*o).inputs(), &[Some(Driver::new(0))]);
        }
        assert!(circuit.check().is_ok());
    }

    #[test]
    fn test_orientation() {
        // Pointing left: the roles of the wires are swapped
        let mut sketch = connected(testcases::and_gate());
        sketch.relabel(ShapeId::from_index(0), ShapeType::AND, 1.0, std::f64::consts::PI);
        let circuit = Circuit::from_sketch(&sketch).unwrap();
        assert_eq!(circuit.component(0).inputs().len(), 1);
        assert_eq!(circuit.mesh(0).source(), Some(Driver::new(0)));
        assert_eq!(circuit.mesh(1).source(), Some(Driver::new(0)));
        assert_eq!(circuit.input_names(), vec!["Y"]);
        assert_eq!(circuit.output_names(), vec!["A", "B"]);
    }

    #[test]
    fn test_errors() {
        let mut sketch = connected(testcases::and_gate());
        sketch.relabel(ShapeId::from_index(0), ShapeType::UNKNOWN, 0.0, 0.0);
        assert_eq!(
            Circuit::from_sketch(&sketch),
            Err(CircuitError::UnrecognizedShape(ShapeId::from_index(0)))
        );

        let mut sketch = connected(testcases::and_gate());
        sketch.shape_mut(ShapeId::from_index(6)).set_name(None);
        assert_eq!(
            Circuit::from_sketch(&sketch),
            Err(CircuitError::UnnamedLabel(ShapeId::from_index(6)))
        );

        // Labels are not attached before connecting
        assert_eq!(
            Circuit::from_sketch(&testcases::and_gate()),
            Err(CircuitError::DetachedLabel(ShapeId::from_index(4)))
        );
    }
}
