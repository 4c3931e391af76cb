use crate::ops::{Aspects, StandardOperation};
use crate::sketch::{EndPointId, ShapeId, ShapeType, Sketch, SubstrokeId};

/// Change the type, confidence and orientation of a shape
///
/// The orientation of a shape flagged as already oriented is kept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Relabel {
    /// Shape to relabel
    pub shape: ShapeId,
    /// New type
    pub shape_type: ShapeType,
    /// New confidence
    pub probability: f64,
    /// New orientation, in radians
    pub orientation: f64,
}

impl StandardOperation for Relabel {
    fn aspects(&self) -> Aspects {
        Aspects::TYPES
    }

    fn apply(&mut self, sketch: &mut Sketch) {
        let shape = sketch.shape(self.shape);
        let orientation = if shape.flags.already_oriented {
            shape.orientation()
        } else {
            self.orientation
        };
        sketch.relabel(self.shape, self.shape_type, self.probability, orientation);
    }

    fn describe(&self) -> String {
        format!(
            "relabel {} as {} ({:.2})",
            self.shape, self.shape_type, self.probability
        )
    }
}

/// Connect an endpoint to a shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectEndpoint {
    /// Endpoint to connect
    pub endpoint: EndPointId,
    /// Shape it should touch
    pub destination: ShapeId,
}

impl StandardOperation for ConnectEndpoint {
    fn aspects(&self) -> Aspects {
        Aspects::CONNECTIONS
    }

    fn apply(&mut self, sketch: &mut Sketch) {
        sketch.connect(self.endpoint, self.destination);
    }

    fn describe(&self) -> String {
        format!("connect {} to {}", self.endpoint, self.destination)
    }
}

/// Remove a substroke, and its shape if it becomes empty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveSubstroke {
    /// Substroke to remove
    pub substroke: SubstrokeId,
}

impl StandardOperation for RemoveSubstroke {
    fn aspects(&self) -> Aspects {
        Aspects::GEOMETRY.union(Aspects::CONNECTIONS)
    }

    fn apply(&mut self, sketch: &mut Sketch) {
        sketch.remove_substroke(self.substroke);
    }

    fn describe(&self) -> String {
        format!("remove {}", self.substroke)
    }
}

/// Merge a shape into another one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeShapes {
    /// Shape receiving the substrokes
    pub keep: ShapeId,
    /// Shape being removed
    pub absorb: ShapeId,
}

impl StandardOperation for MergeShapes {
    fn aspects(&self) -> Aspects {
        Aspects::GEOMETRY.union(Aspects::CONNECTIONS)
    }

    fn apply(&mut self, sketch: &mut Sketch) {
        sketch.merge_shapes(self.keep, self.absorb);
    }

    fn describe(&self) -> String {
        format!("merge {} into {}", self.absorb, self.keep)
    }
}

/// Move a substroke to another shape, or to a new shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveSubstroke {
    /// Substroke to move
    pub substroke: SubstrokeId,
    /// Destination shape; a new shape is created if None
    pub destination: Option<ShapeId>,
}

impl StandardOperation for MoveSubstroke {
    fn aspects(&self) -> Aspects {
        // A new shape copies the type of the original one
        Aspects::ALL
    }

    fn apply(&mut self, sketch: &mut Sketch) {
        sketch.move_substroke(self.substroke, self.destination);
    }

    fn describe(&self) -> String {
        match self.destination {
            Some(d) => format!("move {} to {}", self.substroke, d),
            None => format!("split {} into a new shape", self.substroke),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::ops::{self, Operation};
    use crate::sketch::generators::{random, testcases};
    use crate::sketch::{ShapeId, ShapeType, SubstrokeId, Violation};

    #[test]
    fn test_relabel_keeps_orientation() {
        let mut sketch = testcases::and_gate();
        let g = ShapeId::from_index(0);
        sketch.shape_mut(g).flags.already_oriented = true;
        let mut op = ops::relabel(g, ShapeType::NAND, 0.6, 1.5);
        op.perform(&mut sketch);
        assert_eq!(sketch.shape(g).shape_type(), ShapeType::NAND);
        assert_eq!(sketch.shape(g).orientation(), 0.0);
        assert!(op.describe().contains("NAND"));
    }

    #[test]
    fn test_split() {
        let mut sketch = testcases::and_gate();
        let before = sketch.clone();
        let g = ShapeId::from_index(0);
        let ss = sketch.shape(g).substrokes()[2];
        let mut op = ops::move_substroke(ss, None);
        op.perform(&mut sketch);
        assert_eq!(sketch.nb_shapes(), 8);
        assert_eq!(sketch.shape(g).substrokes().len(), 2);
        sketch.check();
        op.undo(&mut sketch);
        assert_eq!(sketch, before);
    }

    fn assert_consistent(sketch: &crate::sketch::Sketch) {
        let violations: Vec<_> = sketch
            .consistency_violations()
            .into_iter()
            .filter(|v| !matches!(v, Violation::UnmergedWires(..)))
            .collect();
        assert!(violations.is_empty(), "{violations:?}");
    }

    proptest! {
        #[test]
        fn prop_operations_are_reversible(seed in 0u64..1000, picks in proptest::collection::vec(0usize..1000, 1..6)) {
            let mut sketch = random::wire_soup(8, 2, seed);
            // Connect a few endpoints so that removals and merges have something to release
            let ids: Vec<ShapeId> = sketch.shape_ids().collect();
            for (i, p) in picks.iter().enumerate() {
                let a = ids[p % ids.len()];
                let b = ids[(p / 7 + i + 1) % ids.len()];
                if a != b {
                    let e = sketch.endpoints(a)[p % 2];
                    sketch.connect(e, b);
                }
            }
            assert_consistent(&sketch);
            let before = sketch.clone();

            let mut compound = ops::Compound::new();
            for (i, p) in picks.iter().enumerate() {
                let a = ids[(p + i) % ids.len()];
                let b = ids[(p * 3 + 1) % ids.len()];
                let ss = SubstrokeId::from_index(p % sketch.substrokes.len());
                let mut op = match p % 4 {
                    0 if sketch.contains(a) => ops::relabel(a, ShapeType::OR, 0.3, 0.5),
                    1 if a != b && sketch.contains(a) && sketch.contains(b) => {
                        ops::merge_shapes(a, b)
                    }
                    2 if sketch.substroke(ss).shape().is_some() => ops::move_substroke(ss, None),
                    3 if sketch.substroke(ss).shape().is_some() => ops::remove_substroke(ss),
                    _ => continue,
                };
                op.perform(&mut sketch);
                assert_consistent(&sketch);
                compound.push(Box::new(Done(op)));
            }
            compound.undo(&mut sketch);
            prop_assert_eq!(sketch, before);
        }
    }

    /// Operation that was already performed; only its undo is forwarded
    struct Done<'a>(Box<dyn Operation + 'a>);

    impl<'a> Operation for Done<'a> {
        fn perform(&mut self, _: &mut crate::sketch::Sketch) {}

        fn undo(&mut self, sketch: &mut crate::sketch::Sketch) {
            self.0.undo(sketch);
        }

        fn describe(&self) -> String {
            self.0.describe()
        }
    }
}
