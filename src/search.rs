//! Local search over reversible edits of a sketch
//!
//! A [`ModificationProducer`] proposes candidate operations for the current sketch,
//! each evaluated against an [`EnergyFunction`] by performing it, measuring the change
//! and undoing it. The [`Refiner`] then applies the candidate chosen by a
//! [`SearchMethod`], and repeats until no candidate improves the sketch or the iteration
//! limit is reached.

mod energy;
mod producer;

use log::{debug, info};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::ops::Operation;
use crate::sketch::Sketch;

pub use energy::ConnectionEnergy;
pub use producer::CircuitEditProducer;

/// Default limit on the number of applied modifications
pub const DEFAULT_MAX_ITERATIONS: usize = 50;

/// Score of an interpretation of a sketch; higher is better
pub trait EnergyFunction {
    /// Score the sketch
    fn energy(&self, sketch: &Sketch) -> f64;
}

impl<F: Fn(&Sketch) -> f64> EnergyFunction for F {
    fn energy(&self, sketch: &Sketch) -> f64 {
        self(sketch)
    }
}

/// A candidate operation with its precomputed benefit
pub struct SketchModification<'a> {
    operation: Box<dyn Operation + 'a>,
    benefit: f64,
    description: String,
}

impl<'a> SketchModification<'a> {
    /// Evaluate an operation: perform it, measure the change in energy, and undo it
    pub fn evaluate(
        mut operation: Box<dyn Operation + 'a>,
        sketch: &mut Sketch,
        energy: &dyn EnergyFunction,
    ) -> SketchModification<'a> {
        let before = energy.energy(sketch);
        operation.perform(sketch);
        let after = energy.energy(sketch);
        operation.undo(sketch);
        let description = operation.describe();
        SketchModification {
            operation,
            benefit: after - before,
            description,
        }
    }

    /// Wrap an operation with a known benefit
    pub fn with_benefit(operation: Box<dyn Operation + 'a>, benefit: f64) -> SketchModification<'a> {
        let description = operation.describe();
        SketchModification {
            operation,
            benefit,
            description,
        }
    }

    /// Change in energy obtained by performing the operation
    pub fn benefit(&self) -> f64 {
        self.benefit
    }

    /// Description of the operation
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Perform the operation for real
    pub fn perform(mut self, sketch: &mut Sketch) -> Box<dyn Operation + 'a> {
        self.operation.perform(sketch);
        self.operation
    }
}

/// Source of candidate modifications
pub trait ModificationProducer<'a> {
    /// Called once before the search starts
    fn start(&mut self, _sketch: &Sketch) {}

    /// Candidate modifications for the current sketch, with their benefit
    ///
    /// The sketch must be left unchanged.
    fn sketch_modifications(
        &mut self,
        sketch: &mut Sketch,
        energy: &dyn EnergyFunction,
    ) -> Vec<SketchModification<'a>>;
}

/// Selection of the modification to apply
pub trait SearchMethod {
    /// Index of the candidate to apply, or None to stop
    fn choose(&self, candidates: &[SketchModification<'_>]) -> Option<usize>;
}

/// Pick the candidate with the greatest positive benefit; the first one on ties
#[derive(Debug, Clone, Copy, Default)]
pub struct HillClimb;

impl SearchMethod for HillClimb {
    fn choose(&self, candidates: &[SketchModification<'_>]) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, c) in candidates.iter().enumerate() {
            if c.benefit() > 0.0 && best.map_or(true, |b| c.benefit() > candidates[b].benefit()) {
                best = Some(i);
            }
        }
        best
    }
}

/// A modification applied by the refiner
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedModification {
    /// Description of the operation
    pub description: String,
    /// Benefit measured before applying it
    pub benefit: f64,
    /// Greatest benefit among the candidates of this step
    pub best_candidate: f64,
}

/// Summary of a search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReport {
    /// Modifications applied, in order
    pub applied: Vec<AppliedModification>,
    /// Energy before the search
    pub initial_energy: f64,
    /// Energy after the search
    pub final_energy: f64,
    /// Whether the search stopped for lack of improving candidates
    pub converged: bool,
}

impl SearchReport {
    /// Number of applied modifications
    pub fn nb_iterations(&self) -> usize {
        self.applied.len()
    }
}

/// Greedy refinement loop
pub struct Refiner<'p, 'a> {
    producer: &'p mut dyn ModificationProducer<'a>,
    energy: &'p dyn EnergyFunction,
    method: Box<dyn SearchMethod + 'p>,
    max_iterations: usize,
    nb_iterations: usize,
    started: bool,
    exhausted: bool,
    rng: Option<SmallRng>,
}

impl<'p, 'a> Refiner<'p, 'a> {
    /// Create a hill-climbing refiner
    pub fn new(
        producer: &'p mut dyn ModificationProducer<'a>,
        energy: &'p dyn EnergyFunction,
    ) -> Refiner<'p, 'a> {
        Refiner {
            producer,
            energy,
            method: Box::new(HillClimb),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            nb_iterations: 0,
            started: false,
            exhausted: false,
            rng: None,
        }
    }

    /// Use another search method
    pub fn with_method(mut self, method: Box<dyn SearchMethod + 'p>) -> Self {
        self.method = method;
        self
    }

    /// Limit the number of applied modifications
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Shuffle the candidates before each choice, so that ties are broken at random
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Some(SmallRng::seed_from_u64(seed));
        self
    }

    /// Limit on the number of applied modifications
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Number of modifications applied so far
    pub fn nb_iterations(&self) -> usize {
        self.nb_iterations
    }

    /// Returns whether the last step found no improving candidate
    pub fn is_converged(&self) -> bool {
        self.exhausted
    }

    /// Apply one modification; returns None when the search is over
    pub fn step(&mut self, sketch: &mut Sketch) -> Option<AppliedModification> {
        if self.exhausted || self.nb_iterations >= self.max_iterations {
            return None;
        }
        if !self.started {
            self.producer.start(sketch);
            self.started = true;
        }
        let mut candidates = self.producer.sketch_modifications(sketch, self.energy);
        if let Some(rng) = &mut self.rng {
            candidates.shuffle(rng);
        }
        let Some(index) = self.method.choose(&candidates) else {
            debug!("No improving modification among {} candidates", candidates.len());
            self.exhausted = true;
            return None;
        };
        let best_candidate = candidates
            .iter()
            .map(|c| c.benefit())
            .fold(f64::NEG_INFINITY, f64::max);
        let chosen = candidates.swap_remove(index);
        let applied = AppliedModification {
            description: chosen.description().to_string(),
            benefit: chosen.benefit(),
            best_candidate,
        };
        chosen.perform(sketch);
        self.nb_iterations += 1;
        debug!(
            "Step {}: {} (benefit {:.3})",
            self.nb_iterations, applied.description, applied.benefit
        );
        Some(applied)
    }

    /// Run until convergence or until the iteration limit
    pub fn run(&mut self, sketch: &mut Sketch) -> SearchReport {
        let initial_energy = self.energy.energy(sketch);
        let mut applied = Vec::new();
        while let Some(m) = self.step(sketch) {
            applied.push(m);
        }
        let final_energy = self.energy.energy(sketch);
        info!(
            "Search applied {} modifications, energy {:.3} -> {:.3}",
            applied.len(),
            initial_energy,
            final_energy
        );
        SearchReport {
            applied,
            initial_energy,
            final_energy,
            converged: self.exhausted,
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::ops;
    use crate::sketch::generators::testcases;
    use crate::sketch::{ShapeId, ShapeType};

    fn confidence(sketch: &Sketch) -> f64 {
        sketch.shape_ids().map(|s| sketch.shape(s).probability()).sum()
    }

    /// Proposes fixed confidence changes for the gate of the template
    struct Fixed(Vec<f64>);

    impl<'a> ModificationProducer<'a> for Fixed {
        fn sketch_modifications(
            &mut self,
            sketch: &mut Sketch,
            energy: &dyn EnergyFunction,
        ) -> Vec<SketchModification<'a>> {
            let g = ShapeId::from_index(0);
            let p = sketch.shape(g).probability();
            self.0
                .iter()
                .map(|d| {
                    let op = ops::relabel(g, ShapeType::AND, (p + d).clamp(0.0, 1.0), 0.0);
                    SketchModification::evaluate(op, sketch, energy)
                })
                .collect()
        }
    }

    /// Always finds an improvement
    struct Endless;

    impl<'a> ModificationProducer<'a> for Endless {
        fn sketch_modifications(
            &mut self,
            sketch: &mut Sketch,
            energy: &dyn EnergyFunction,
        ) -> Vec<SketchModification<'a>> {
            let name = sketch.shape(ShapeId::from_index(4)).name().unwrap_or("").to_string();
            let op: Box<dyn Operation + 'a> = Box::new(Rename(format!("{name}x"), None));
            vec![SketchModification::evaluate(op, sketch, energy)]
        }
    }

    /// Renames the first label
    struct Rename(String, Option<Option<String>>);

    impl Operation for Rename {
        fn perform(&mut self, sketch: &mut Sketch) {
            let s = sketch.shape_mut(ShapeId::from_index(4));
            self.1 = Some(s.name().map(|n| n.to_string()));
            s.set_name(Some(self.0.clone()));
        }

        fn undo(&mut self, sketch: &mut Sketch) {
            let previous = self.1.take().unwrap();
            sketch.shape_mut(ShapeId::from_index(4)).set_name(previous);
        }

        fn describe(&self) -> String {
            format!("rename to {}", self.0)
        }
    }

    #[test]
    fn test_evaluate_restores() {
        let mut sketch = testcases::and_gate();
        sketch.relabel(ShapeId::from_index(0), ShapeType::AND, 0.5, 0.0);
        let before = sketch.clone();
        let m = SketchModification::evaluate(
            ops::relabel(ShapeId::from_index(0), ShapeType::OR, 0.75, 0.0),
            &mut sketch,
            &confidence,
        );
        assert_eq!(m.benefit(), 0.25);
        assert_eq!(sketch, before);
    }

    #[test]
    fn test_max_choice() {
        let mut sketch = testcases::and_gate();
        sketch.relabel(ShapeId::from_index(0), ShapeType::AND, 0.0, 0.0);
        let mut producer = Fixed(vec![0.25, -0.5, 0.5, 0.5, 0.125]);
        let mut refiner = Refiner::new(&mut producer, &confidence);
        let m = refiner.step(&mut sketch).unwrap();
        assert_eq!(m.benefit, 0.5);
        assert_eq!(m.best_candidate, 0.5);
        assert_eq!(sketch.shape(ShapeId::from_index(0)).probability(), 0.5);
        let report = refiner.run(&mut sketch);
        // 0.5 more, then nothing improves
        assert_eq!(report.nb_iterations(), 1);
        assert!(report.converged);
        assert_eq!(sketch.shape(ShapeId::from_index(0)).probability(), 1.0);
        assert_eq!(refiner.nb_iterations(), 2);
    }

    #[test]
    fn test_iteration_limit() {
        let mut sketch = testcases::and_gate();
        let name_length = |s: &Sketch| {
            s.shape(ShapeId::from_index(4)).name().map_or(0, |n| n.len()) as f64
        };
        let mut producer = Endless;
        let report = Refiner::new(&mut producer, &name_length).run(&mut sketch);
        assert_eq!(report.nb_iterations(), DEFAULT_MAX_ITERATIONS);
        assert!(!report.converged);
        assert_eq!(report.final_energy - report.initial_energy, 50.0);

        let mut producer = Endless;
        let report = Refiner::new(&mut producer, &name_length)
            .with_max_iterations(3)
            .run(&mut sketch);
        assert_eq!(report.nb_iterations(), 3);
    }

    #[test]
    fn test_hill_climb() {
        let m = |b| SketchModification::with_benefit(ops::relabel(ShapeId::from_index(0), ShapeType::OR, 1.0, 0.0), b);
        assert_eq!(HillClimb.choose(&[]), None);
        assert_eq!(HillClimb.choose(&[m(0.0), m(-1.0)]), None);
        assert_eq!(HillClimb.choose(&[m(0.0), m(2.0), m(1.0), m(2.0)]), Some(1));
    }

    proptest! {
        #[test]
        fn prop_search_terminates(deltas in proptest::collection::vec(-1.0f64..1.0, 0..8), seed in 0u64..100) {
            let mut sketch = testcases::and_gate();
            sketch.relabel(ShapeId::from_index(0), ShapeType::AND, 0.0, 0.0);
            let mut producer = Fixed(deltas.clone());
            let report = Refiner::new(&mut producer, &confidence).with_seed(seed).run(&mut sketch);
            prop_assert!(report.nb_iterations() <= DEFAULT_MAX_ITERATIONS);
            for m in &report.applied {
                prop_assert!(m.benefit > 0.0);
                prop_assert_eq!(m.benefit, m.best_candidate);
            }
            prop_assert!(report.final_energy >= report.initial_energy);
        }
    }
}
