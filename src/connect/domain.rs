use itertools::Itertools;

use crate::connect::ConnectionDomain;
use crate::sketch::{Classification, ShapeId, ShapeType, Sketch};

/// Connection rules based on the distance between endpoints and ink
///
/// A free endpoint is linked to the closest other shape whose ink lies within the
/// radius and that has an endpoint to spare for the link back. Only links with a wire
/// on at least one side are made: gates and labels are connected through wires.
///
/// A wire touching another wire is always linked to it, even if it has to take over
/// an endpoint: the two wires are merged right after, which frees the endpoints
/// between them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityDomain {
    radius: f64,
}

impl ProximityDomain {
    /// Radius used when none is given, in canvas units
    pub const DEFAULT_RADIUS: f64 = 4.0;

    /// Create with the given connection radius
    pub fn new(radius: f64) -> ProximityDomain {
        assert!(radius >= 0.0, "Connection radius must be non-negative");
        ProximityDomain { radius }
    }

    /// Connection radius
    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl ConnectionDomain for ProximityDomain {
    fn connect_shape(&self, shape: ShapeId, sketch: &mut Sketch) -> Vec<ShapeId> {
        let is_wire = sketch.shape(shape).is_wire();
        let mut lost = Vec::new();
        for e in sketch.endpoints(shape) {
            if sketch.endpoint(e).connected_shape().is_some() {
                continue;
            }
            let position = sketch.endpoint(e).position();
            let target = sketch
                .shape_ids()
                .filter(|t| *t != shape && (is_wire || sketch.shape(*t).is_wire()))
                .map(|t| (t, sketch.distance_to_shape(position, t)))
                .filter(|(_, d)| *d <= self.radius)
                .sorted_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(t, _)| t)
                .find(|t| {
                    (is_wire && sketch.shape(*t).is_wire()) || sketch.accepts_connection(*t, shape)
                });
            if let Some(t) = target {
                lost.extend(sketch.connect(e, t));
            }
        }
        lost
    }

    fn is_properly_connected(&self, shape: ShapeId, sketch: &Sketch) -> bool {
        let s = sketch.shape(shape);
        let connected = s.connected_shapes();
        match s.shape_type().classification() {
            Classification::Wire => connected.len() >= 2,
            Classification::Gate if s.shape_type() == ShapeType::NOT => connected.len() == 2,
            Classification::Gate => connected.len() >= 3,
            Classification::Text => {
                connected.len() == 1 && connected.iter().all(|t| sketch.shape(*t).is_wire())
            }
            Classification::Unknown => false,
        }
    }
}
