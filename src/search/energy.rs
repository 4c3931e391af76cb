use crate::connect::ConnectionDomain;
use crate::search::EnergyFunction;
use crate::sketch::Sketch;

/// Rewards properly connected shapes, weighted by their confidence
///
/// A properly connected shape scores one plus its confidence, any other shape scores
/// minus one.
#[derive(Clone, Copy)]
pub struct ConnectionEnergy<'a> {
    domain: &'a dyn ConnectionDomain,
}

impl<'a> ConnectionEnergy<'a> {
    /// Score with the rules of a connection domain
    pub fn new(domain: &'a dyn ConnectionDomain) -> ConnectionEnergy<'a> {
        ConnectionEnergy { domain }
    }
}

impl<'a> EnergyFunction for ConnectionEnergy<'a> {
    fn energy(&self, sketch: &Sketch) -> f64 {
        sketch
            .shape_ids()
            .map(|s| {
                if self.domain.is_properly_connected(s, sketch) {
                    1.0 + sketch.shape(s).probability()
                } else {
                    -1.0
                }
            })
            .sum()
    }
}
