use std::collections::BTreeSet;

use log::{debug, info};

use crate::connect::{ConnectionDomain, ValidationPolicy};
use crate::ops::{Aspects, Operation, Standard, StandardOperation};
use crate::sketch::{ShapeId, Sketch};

/// Maintains connections and wire merges on a sketch
#[derive(Clone, Copy)]
pub struct ConnectivityEngine<'a> {
    domain: &'a dyn ConnectionDomain,
    policy: ValidationPolicy,
}

impl<'a> ConnectivityEngine<'a> {
    /// Create an engine with the default validation policy
    pub fn new(domain: &'a dyn ConnectionDomain) -> ConnectivityEngine<'a> {
        ConnectivityEngine {
            domain,
            policy: ValidationPolicy::default(),
        }
    }

    /// Use a given validation policy
    pub fn with_policy(self, policy: ValidationPolicy) -> ConnectivityEngine<'a> {
        ConnectivityEngine { policy, ..self }
    }

    /// Connection rules in use
    pub fn domain(&self) -> &'a dyn ConnectionDomain {
        self.domain
    }

    /// Validation policy in use
    pub fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    /// Returns whether a shape has the connections its type requires
    pub fn is_properly_connected(&self, shape: ShapeId, sketch: &Sketch) -> bool {
        self.domain.is_properly_connected(shape, sketch)
    }

    /// Recompute the connections of the given shapes and of their neighbours
    ///
    /// Connections of the input shapes and of the shapes touching them are cleared and
    /// rebuilt by the domain, then connected wires are merged until none remain. Merging
    /// frees the endpoints between the wires, and shapes that lost a connection on the
    /// way are connected again, until no more wires are merged. Returns the shapes whose
    /// connections may have changed and that still exist, for display refresh.
    pub fn recompute_connected_shapes(&self, sketch: &mut Sketch, shapes: &[ShapeId]) -> Vec<ShapeId> {
        let mut expanded = BTreeSet::new();
        for s in shapes {
            expanded.insert(*s);
            expanded.extend(sketch.shape(*s).connected_shapes().iter().copied());
        }

        // Shapes one hop further lose their links to the expanded set, and are reconnected too
        let mut affected = expanded.clone();
        for s in &expanded {
            affected.extend(sketch.shape(*s).connected_shapes().iter().copied());
        }

        for s in &expanded {
            sketch.clear_connections(*s);
        }
        loop {
            let mut lost = Vec::new();
            let live: Vec<ShapeId> = affected.iter().copied().filter(|s| sketch.contains(*s)).collect();
            for s in live {
                lost.extend(self.domain.connect_shape(s, sketch));
            }

            let mut merged = false;
            while let Some((keep, absorb)) = sketch.connected_wire_pair() {
                debug!("Merging wire {absorb} into {keep}");
                sketch.merge_shapes(keep, absorb);
                affected.insert(keep);
                merged = true;
            }

            let nb_affected = affected.len();
            affected.extend(lost);
            if !merged && affected.len() == nb_affected {
                break;
            }
        }

        self.policy.enforce(&sketch.consistency_violations());
        affected.into_iter().filter(|s| sketch.contains(*s)).collect()
    }

    /// Recompute the connections of every shape
    pub fn connect_all(&self, sketch: &mut Sketch) -> Vec<ShapeId> {
        let shapes: Vec<ShapeId> = sketch.shape_ids().collect();
        let nb_before = shapes.len();
        let ret = self.recompute_connected_shapes(sketch, &shapes);
        info!(
            "Connected {} shapes, {} after merging wires",
            nb_before,
            sketch.nb_shapes()
        );
        ret
    }

    /// Reversible operation recomputing connections; None means every shape
    pub fn recompute<'b>(&self, shapes: Option<Vec<ShapeId>>) -> Box<dyn Operation + 'b>
    where
        'a: 'b,
    {
        Box::new(Standard::new(RecomputeConnections {
            engine: *self,
            shapes,
        }))
    }
}

/// Recompute connections as a reversible operation
pub struct RecomputeConnections<'a> {
    /// Engine to run
    pub engine: ConnectivityEngine<'a>,
    /// Shapes to recompute; every shape if None
    pub shapes: Option<Vec<ShapeId>>,
}

impl<'a> StandardOperation for RecomputeConnections<'a> {
    fn aspects(&self) -> Aspects {
        Aspects::GEOMETRY.union(Aspects::CONNECTIONS)
    }

    fn apply(&mut self, sketch: &mut Sketch) {
        match &self.shapes {
            Some(shapes) => {
                // Shapes may have been merged away by earlier operations
                let live: Vec<ShapeId> = shapes.iter().copied().filter(|s| sketch.contains(*s)).collect();
                self.engine.recompute_connected_shapes(sketch, &live);
            }
            None => {
                self.engine.connect_all(sketch);
            }
        }
    }

    fn describe(&self) -> String {
        match &self.shapes {
            Some(shapes) => format!("reconnect {} shapes", shapes.len()),
            None => "reconnect all shapes".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use proptest::prelude::*;

    use crate::connect::{ConnectionDomain, ConnectivityEngine, ProximityDomain, ValidationPolicy};
    use crate::sketch::generators::{random, testcases};
    use crate::sketch::{ShapeId, Sketch, Violation};

    fn engine(domain: &ProximityDomain) -> ConnectivityEngine<'_> {
        ConnectivityEngine::new(domain).with_policy(ValidationPolicy::Strict)
    }

    #[test]
    fn test_merge_broken_wire() {
        let domain = ProximityDomain::new(testcases::RADIUS);
        let mut sketch = testcases::broken_wire();
        let refresh = engine(&domain).connect_all(&mut sketch);
        assert_eq!(sketch.nb_shapes(), 2);
        let w = ShapeId::from_index(0);
        let l = ShapeId::from_index(3);
        assert_eq!(refresh, vec![w, l]);
        assert_eq!(sketch.shape(w).substrokes().len(), 3);
        assert!(sketch.shape(w).connected_shapes().contains(&l));
        assert_eq!(sketch.connected_wire_pair(), None);
        sketch.check();
    }

    #[test]
    fn test_branching_wire() {
        let domain = ProximityDomain::new(testcases::RADIUS);
        let mut sketch = testcases::fan_out();
        engine(&domain).connect_all(&mut sketch);
        let ids = |v: &[usize]| v.iter().map(|i| ShapeId::from_index(*i)).collect::<BTreeSet<_>>();
        let gate = ShapeId::from_index(0);
        let output = ShapeId::from_index(2);

        // The branch is merged into the output wire, which stays connected to the gate
        assert_eq!(sketch.nb_shapes(), 6);
        assert!(!sketch.contains(ShapeId::from_index(3)));
        assert_eq!(sketch.shape(gate).connected_shapes(), &ids(&[1, 2]));
        assert_eq!(sketch.shape(output).connected_shapes(), &ids(&[0, 5, 6]));
        assert_eq!(sketch.shape(output).substrokes().len(), 2);
        for s in sketch.shape_ids() {
            assert!(domain.is_properly_connected(s, &sketch), "{s} is not properly connected");
        }
        sketch.check();

        // Recomputing the output wire alone gives the same result
        let connected = sketch.clone();
        engine(&domain).recompute_connected_shapes(&mut sketch, &[output]);
        for s in sketch.shape_ids() {
            assert_eq!(
                sketch.shape(s).connected_shapes(),
                connected.shape(s).connected_shapes()
            );
        }
    }

    #[test]
    fn test_local_recompute() {
        let domain = ProximityDomain::new(testcases::RADIUS);
        let e = engine(&domain);
        let mut sketch = testcases::and_gate();
        e.connect_all(&mut sketch);
        let connected = sketch.clone();

        // Recomputing a single shape touches its neighbours only, and is stable
        let refresh = e.recompute_connected_shapes(&mut sketch, &[ShapeId::from_index(1)]);
        assert_eq!(refresh, (0..5).map(ShapeId::from_index).collect::<Vec<_>>());
        for s in sketch.shape_ids() {
            assert_eq!(
                sketch.shape(s).connected_shapes(),
                connected.shape(s).connected_shapes()
            );
        }
        sketch.check();
    }

    #[test]
    fn test_recompute_operation() {
        let domain = ProximityDomain::new(testcases::RADIUS);
        let mut sketch = testcases::broken_wire();
        let before = sketch.clone();
        let mut op = engine(&domain).recompute(None);
        op.perform(&mut sketch);
        assert_eq!(sketch.nb_shapes(), 2);
        op.undo(&mut sketch);
        assert_eq!(sketch, before);
    }

    fn mutually_connected_wires(sketch: &Sketch) -> usize {
        sketch
            .shape_ids()
            .filter(|s| sketch.shape(*s).is_wire())
            .map(|s| {
                sketch
                    .shape(s)
                    .connected_shapes()
                    .iter()
                    .filter(|t| sketch.shape(**t).is_wire())
                    .count()
            })
            .sum()
    }

    proptest! {
        #[test]
        fn prop_connectivity_closure(seed in 0u64..10000, nb_wires in 1usize..30, nb_gates in 0usize..5) {
            let domain = ProximityDomain::new(5.0);
            let mut sketch = random::wire_soup(nb_wires, nb_gates, seed);
            engine(&domain).connect_all(&mut sketch);
            prop_assert_eq!(mutually_connected_wires(&sketch), 0);
            prop_assert!(!sketch
                .consistency_violations()
                .iter()
                .any(|v| matches!(v, Violation::UnmergedWires(..))));
        }

        #[test]
        fn prop_touching_shapes_are_linked(seed in 0u64..10000, nb_wires in 1usize..30, nb_gates in 0usize..5) {
            let domain = ProximityDomain::new(5.0);
            let mut sketch = random::wire_soup(nb_wires, nb_gates, seed);
            engine(&domain).connect_all(&mut sketch);
            for s in sketch.shape_ids() {
                let is_wire = sketch.shape(s).is_wire();
                for e in sketch.endpoints(s) {
                    if sketch.endpoint(e).connected_shape().is_some() {
                        continue;
                    }
                    let p = sketch.endpoint(e).position();
                    for t in sketch.shape_ids() {
                        if t == s || !(is_wire || sketch.shape(t).is_wire()) {
                            continue;
                        }
                        if sketch.distance_to_shape(p, t) > domain.radius() {
                            continue;
                        }
                        // A free endpoint only stays free next to a shape with no endpoint to spare
                        prop_assert!(!(is_wire && sketch.shape(t).is_wire()), "{} touches wire {}", e, t);
                        prop_assert!(!sketch.accepts_connection(t, s), "{} touches {}", e, t);
                    }
                }
            }
        }

        #[test]
        fn prop_bidirectional_consistency(seed in 0u64..10000, nb_wires in 1usize..30, pick in 0usize..30) {
            let domain = ProximityDomain::new(5.0);
            let e = engine(&domain);
            let mut sketch = random::wire_soup(nb_wires, 3, seed);
            e.connect_all(&mut sketch);
            let ids: Vec<ShapeId> = sketch.shape_ids().collect();
            let s = ids[pick % ids.len()];
            e.recompute_connected_shapes(&mut sketch, &[s]);
            for s in sketch.shape_ids() {
                for ep in sketch.endpoints(s) {
                    if let Some(t) = sketch.endpoint(ep).connected_shape() {
                        prop_assert!(sketch.shape(s).connected_shapes().contains(&t));
                    }
                }
                for t in sketch.shape(s).connected_shapes() {
                    prop_assert!(sketch
                        .endpoints(s)
                        .iter()
                        .any(|ep| sketch.endpoint(*ep).connected_shape() == Some(*t)));
                }
            }
        }
    }
}
