use itertools::Itertools;

use crate::connect::ConnectivityEngine;
use crate::ops::{self, Compound, Operation};
use crate::search::{EnergyFunction, ModificationProducer, SketchModification};
use crate::sketch::{ShapeId, ShapeType, Sketch};

/// Proposes regroupings and relabelings of the shapes of a circuit sketch
///
/// Candidates are:
///   * relabeling a shape to another type of its class;
///   * merging two nearby shapes of the same class, then reconnecting them;
///   * splitting a substroke out of a shape, then reconnecting everything.
///
/// Shapes labeled by the user are never relabeled, and shapes grouped by the user are
/// never merged or split. Wires are not merged here: the connectivity engine does it.
pub struct CircuitEditProducer<'a> {
    engine: ConnectivityEngine<'a>,
    radius: f64,
    alternatives: Vec<ShapeType>,
}

impl<'a> CircuitEditProducer<'a> {
    /// Create a producer; shapes closer than the radius are candidates for merging
    pub fn new(engine: ConnectivityEngine<'a>, radius: f64) -> CircuitEditProducer<'a> {
        CircuitEditProducer {
            engine,
            radius,
            alternatives: ShapeType::ALL.to_vec(),
        }
    }

    /// Restrict the types proposed for relabeling
    pub fn with_alternatives(mut self, alternatives: Vec<ShapeType>) -> Self {
        self.alternatives = alternatives;
        self
    }

    fn relabels(&self, sketch: &Sketch) -> Vec<Box<dyn Operation + 'a>> {
        let mut ret = Vec::new();
        for s in sketch.shape_ids() {
            let shape = sketch.shape(s);
            if shape.flags.already_labeled {
                continue;
            }
            let class = sketch.shape_classification(s);
            for t in &self.alternatives {
                if *t != shape.shape_type() && t.classification() == class {
                    ret.push(ops::relabel(s, *t, shape.probability(), shape.orientation()));
                }
            }
        }
        ret
    }

    fn merges(&self, sketch: &Sketch) -> Vec<Box<dyn Operation + 'a>> {
        let candidates: Vec<ShapeId> = sketch
            .shape_ids()
            .filter(|s| {
                let shape = sketch.shape(*s);
                !shape.flags.already_grouped && !shape.is_wire()
            })
            .collect();
        let mut ret = Vec::new();
        for (a, b) in candidates.into_iter().tuple_combinations() {
            if sketch.shape_classification(a) != sketch.shape_classification(b) {
                continue;
            }
            if sketch.shape_distance(a, b) > self.radius {
                continue;
            }
            let op = Compound::new()
                .then(ops::merge_shapes(a, b))
                .then(self.engine.recompute(Some(vec![a])));
            ret.push(Box::new(op) as Box<dyn Operation + 'a>);
        }
        ret
    }

    fn splits(&self, sketch: &Sketch) -> Vec<Box<dyn Operation + 'a>> {
        let mut ret = Vec::new();
        for s in sketch.shape_ids() {
            let shape = sketch.shape(s);
            if shape.flags.already_grouped || shape.is_wire() {
                continue;
            }
            for ss in shape.substrokes().iter().skip(1) {
                let op = Compound::new()
                    .then(ops::move_substroke(*ss, None))
                    .then(self.engine.recompute(None));
                ret.push(Box::new(op) as Box<dyn Operation + 'a>);
            }
        }
        ret
    }
}

impl<'a> ModificationProducer<'a> for CircuitEditProducer<'a> {
    fn sketch_modifications(
        &mut self,
        sketch: &mut Sketch,
        energy: &dyn EnergyFunction,
    ) -> Vec<SketchModification<'a>> {
        let mut operations = self.relabels(sketch);
        operations.extend(self.merges(sketch));
        operations.extend(self.splits(sketch));
        operations
            .into_iter()
            .map(|op| SketchModification::evaluate(op, sketch, energy))
            .collect()
    }
}
