//! Sketch generators and templates

/// Small hand-drawn circuits, with shapes already typed but not connected
///
/// All templates are drawn with gates pointing to the right, inputs on the left, and
/// are meant to be connected with a [`ProximityDomain`](crate::ProximityDomain)
/// of radius [`RADIUS`](testcases::RADIUS).
pub mod testcases {
    use crate::connect::ProximityDomain;
    use crate::sketch::{Point, ShapeId, ShapeType, Sketch};

    /// Connection radius the templates are drawn for
    pub const RADIUS: f64 = ProximityDomain::DEFAULT_RADIUS;

    fn pts(v: &[(f64, f64)]) -> Vec<Point> {
        v.iter().map(|(x, y)| Point::new(*x, *y)).collect()
    }

    /// Add a fully recognized shape, with matching substroke classification
    pub(crate) fn add_typed(
        sketch: &mut Sketch,
        shape_type: ShapeType,
        strokes: &[&[(f64, f64)]],
        name: Option<&str>,
    ) -> ShapeId {
        let id = sketch.add_shape(shape_type, strokes.iter().map(|s| pts(s)).collect());
        sketch.relabel(id, shape_type, 1.0, 0.0);
        sketch
            .shape_mut(id)
            .set_name(name.map(|n| n.to_string()));
        for ss in sketch.shape(id).substrokes().to_vec() {
            sketch.set_classification(ss, shape_type.classification());
        }
        id
    }

    /// Add a label drawn as a small caret, touching a wire end at (x, y) from the left
    fn label_left(sketch: &mut Sketch, name: &str, x: f64, y: f64) -> ShapeId {
        add_typed(
            sketch,
            ShapeType::LABEL,
            &[&[(x - 7.0, y + 2.0), (x - 5.0, y - 2.0), (x - 3.0, y + 2.0)]],
            Some(name),
        )
    }

    /// Add a label drawn as a small caret, touching a wire end at (x, y) from the right
    fn label_right(sketch: &mut Sketch, name: &str, x: f64, y: f64) -> ShapeId {
        add_typed(
            sketch,
            ShapeType::LABEL,
            &[&[(x + 3.0, y - 2.0), (x + 5.0, y + 2.0), (x + 7.0, y - 2.0)]],
            Some(name),
        )
    }

    /// A 2-input gate of the given type, with inputs A and B and output Y
    ///
    /// Shapes are created in order: gate, wire A, wire B, output wire, labels A, B, Y.
    pub fn two_input_gate(gate: ShapeType) -> Sketch {
        let mut sketch = Sketch::new();
        add_typed(
            &mut sketch,
            gate,
            &[
                &[(40.0, 40.0), (40.0, 60.0)],
                &[(40.0, 40.0), (50.0, 40.0), (58.0, 45.0), (60.0, 50.0)],
                &[(40.0, 60.0), (50.0, 60.0), (58.0, 55.0), (60.0, 50.0)],
            ],
            None,
        );
        add_typed(&mut sketch, ShapeType::WIRE, &[&[(10.0, 45.0), (40.0, 45.0)]], None);
        add_typed(&mut sketch, ShapeType::WIRE, &[&[(10.0, 55.0), (40.0, 55.0)]], None);
        add_typed(&mut sketch, ShapeType::WIRE, &[&[(60.0, 50.0), (90.0, 50.0)]], None);
        label_left(&mut sketch, "A", 10.0, 45.0);
        label_left(&mut sketch, "B", 10.0, 55.0);
        label_right(&mut sketch, "Y", 90.0, 50.0);
        sketch.check();
        sketch
    }

    /// A 2-input And gate, with inputs A and B and output Y
    pub fn and_gate() -> Sketch {
        two_input_gate(ShapeType::AND)
    }

    /// An inverter with input A and output Y
    ///
    /// Shapes are created in order: gate, input wire, output wire, labels A, Y.
    pub fn inverter() -> Sketch {
        let mut sketch = Sketch::new();
        not_gate(&mut sketch, 40.0);
        add_typed(&mut sketch, ShapeType::WIRE, &[&[(10.0, 50.0), (40.0, 50.0)]], None);
        add_typed(&mut sketch, ShapeType::WIRE, &[&[(60.0, 50.0), (90.0, 50.0)]], None);
        label_left(&mut sketch, "A", 10.0, 50.0);
        label_right(&mut sketch, "Y", 90.0, 50.0);
        sketch.check();
        sketch
    }

    /// Add an inverter pointing right, with its input side at x and its output at x + 20
    fn not_gate(sketch: &mut Sketch, x: f64) -> ShapeId {
        add_typed(
            sketch,
            ShapeType::NOT,
            &[
                &[(x, 40.0), (x, 60.0)],
                &[(x, 40.0), (x + 20.0, 50.0)],
                &[(x, 60.0), (x + 20.0, 50.0)],
            ],
            None,
        )
    }

    /// An inverter with input A, whose output wire branches to outputs Y and Z
    ///
    /// The branch starts in the middle of the output wire. Shapes are created in order:
    /// gate, input wire, output wire, branch, labels A, Y, Z.
    pub fn fan_out() -> Sketch {
        let mut sketch = Sketch::new();
        not_gate(&mut sketch, 40.0);
        add_typed(&mut sketch, ShapeType::WIRE, &[&[(10.0, 50.0), (40.0, 50.0)]], None);
        add_typed(&mut sketch, ShapeType::WIRE, &[&[(60.0, 50.0), (90.0, 50.0)]], None);
        add_typed(&mut sketch, ShapeType::WIRE, &[&[(75.0, 50.0), (75.0, 80.0)]], None);
        label_left(&mut sketch, "A", 10.0, 50.0);
        label_right(&mut sketch, "Y", 90.0, 50.0);
        label_right(&mut sketch, "Z", 75.0, 80.0);
        sketch.check();
        sketch
    }

    /// A Nand gate with inputs A and B, followed by an inverter with output Y
    ///
    /// Shapes are created in order: Nand gate, Not gate, wires A, B, wire between the
    /// gates, output wire, labels A, B, Y.
    pub fn nand_not_chain() -> Sketch {
        let mut sketch = Sketch::new();
        add_typed(
            &mut sketch,
            ShapeType::NAND,
            &[
                &[(40.0, 40.0), (40.0, 60.0)],
                &[(40.0, 40.0), (50.0, 40.0), (58.0, 45.0), (60.0, 50.0)],
                &[(40.0, 60.0), (50.0, 60.0), (58.0, 55.0), (60.0, 50.0)],
            ],
            None,
        );
        not_gate(&mut sketch, 90.0);
        add_typed(&mut sketch, ShapeType::WIRE, &[&[(10.0, 45.0), (40.0, 45.0)]], None);
        add_typed(&mut sketch, ShapeType::WIRE, &[&[(10.0, 55.0), (40.0, 55.0)]], None);
        add_typed(&mut sketch, ShapeType::WIRE, &[&[(60.0, 50.0), (90.0, 50.0)]], None);
        add_typed(&mut sketch, ShapeType::WIRE, &[&[(110.0, 50.0), (140.0, 50.0)]], None);
        label_left(&mut sketch, "A", 10.0, 45.0);
        label_left(&mut sketch, "B", 10.0, 55.0);
        label_right(&mut sketch, "Y", 140.0, 50.0);
        sketch.check();
        sketch
    }

    /// A wire drawn as three separate fragments touching end to end, plus a dangling label
    ///
    /// Shapes are created in order: three wire fragments, label.
    pub fn broken_wire() -> Sketch {
        let mut sketch = Sketch::new();
        add_typed(&mut sketch, ShapeType::WIRE, &[&[(0.0, 0.0), (20.0, 0.0)]], None);
        add_typed(&mut sketch, ShapeType::WIRE, &[&[(21.0, 0.0), (40.0, 0.0)]], None);
        add_typed(&mut sketch, ShapeType::WIRE, &[&[(40.0, 1.0), (40.0, 30.0)]], None);
        label_right(&mut sketch, "Y", 40.0, 30.0);
        sketch.check();
        sketch
    }

    /// A single And gate whose strokes were split into one low-confidence shape per stroke
    ///
    /// Shapes are created in order: three gate fragments, wires A, B, Y, labels A, B, Y.
    pub fn fragmented_gate() -> Sketch {
        let mut sketch = Sketch::new();
        for stroke in [
            &[(40.0, 40.0), (40.0, 60.0)][..],
            &[(40.0, 40.0), (50.0, 40.0), (58.0, 45.0), (60.0, 50.0)][..],
            &[(40.0, 60.0), (50.0, 60.0), (58.0, 55.0), (60.0, 50.0)][..],
        ] {
            let id = add_typed(&mut sketch, ShapeType::AND, &[stroke], None);
            sketch.relabel(id, ShapeType::AND, 0.4, 0.0);
        }
        add_typed(&mut sketch, ShapeType::WIRE, &[&[(10.0, 45.0), (40.0, 45.0)]], None);
        add_typed(&mut sketch, ShapeType::WIRE, &[&[(10.0, 55.0), (40.0, 55.0)]], None);
        add_typed(&mut sketch, ShapeType::WIRE, &[&[(60.0, 50.0), (90.0, 50.0)]], None);
        label_left(&mut sketch, "A", 10.0, 45.0);
        label_left(&mut sketch, "B", 10.0, 55.0);
        label_right(&mut sketch, "Y", 90.0, 50.0);
        sketch.check();
        sketch
    }
}

/// Random sketches, for stress and property testing
pub mod random {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use crate::sketch::{Point, ShapeType, Sketch};

    use super::testcases::add_typed;

    /// Random straight wires and box-shaped gates in a 100x100 canvas
    ///
    /// Wires are single segments between 5 and 30 units long; gates are drawn with
    /// three strokes. Nothing is connected.
    pub fn wire_soup(nb_wires: usize, nb_gates: usize, seed: u64) -> Sketch {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut ret = Sketch::new();
        for _ in 0..nb_gates {
            let x: f64 = rng.gen_range(0.0..90.0);
            let y: f64 = rng.gen_range(0.0..90.0);
            add_typed(
                &mut ret,
                ShapeType::AND,
                &[
                    &[(x, y), (x, y + 10.0)],
                    &[(x, y), (x + 10.0, y + 5.0)],
                    &[(x, y + 10.0), (x + 10.0, y + 5.0)],
                ],
                None,
            );
        }
        for _ in 0..nb_wires {
            let x: f64 = rng.gen_range(0.0..100.0);
            let y: f64 = rng.gen_range(0.0..100.0);
            let angle: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
            let len: f64 = rng.gen_range(5.0..30.0);
            let end = Point::new(x + len * angle.cos(), y + len * angle.sin());
            add_typed(&mut ret, ShapeType::WIRE, &[&[(x, y), (end.x, end.y)]], None);
        }
        ret.check();
        ret
    }
}

#[cfg(test)]
mod tests {
    use super::{random, testcases};
    use crate::sketch::{Classification, ShapeType};

    #[test]
    fn test_templates() {
        let sketch = testcases::and_gate();
        assert_eq!(sketch.nb_shapes(), 7);
        let names: Vec<_> = sketch
            .shape_ids()
            .filter_map(|s| sketch.shape(s).name())
            .collect();
        assert_eq!(names, vec!["A", "B", "Y"]);
        for s in sketch.shape_ids() {
            assert_eq!(
                sketch.shape_classification(s),
                sketch.shape(s).shape_type().classification()
            );
        }
        assert_eq!(testcases::inverter().nb_shapes(), 5);
        assert_eq!(testcases::broken_wire().nb_shapes(), 4);
        assert_eq!(testcases::RADIUS, crate::ProximityDomain::DEFAULT_RADIUS);
        assert_eq!(testcases::fan_out().nb_shapes(), 7);
        assert_eq!(testcases::nand_not_chain().nb_shapes(), 9);
        let fragmented = testcases::fragmented_gate();
        assert_eq!(fragmented.nb_shapes(), 9);
        assert_eq!(
            fragmented
                .shape_ids()
                .filter(|s| fragmented.shape(*s).shape_type() == ShapeType::AND)
                .count(),
            3
        );
    }

    #[test]
    fn test_random_is_deterministic() {
        let a = random::wire_soup(10, 3, 42);
        let b = random::wire_soup(10, 3, 42);
        assert_eq!(a, b);
        assert_eq!(a.nb_shapes(), 13);
        assert_eq!(
            a.shape_ids()
                .filter(|s| a.shape_classification(*s) == Classification::Wire)
                .count(),
            10
        );
    }
}
