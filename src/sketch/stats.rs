//! Compute sketch statistics
//!
//! ```
//! # use inkcircuit::Sketch;
//! # let sketch = Sketch::new();
//! use inkcircuit::sketch::stats::stats;
//! let stats = stats(&sketch);
//!
//! // Check that there is no wire
//! assert_eq!(stats.nb_wires, 0);
//!
//! // Show the statistics
//! println!("{}", stats);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use crate::sketch::{Classification, Sketch};

/// Number of shapes of each kind in a sketch
#[derive(Clone, Debug)]
pub struct SketchStats {
    /// Number of live substrokes
    pub nb_substrokes: usize,
    /// Number of wires
    pub nb_wires: usize,
    /// Number of gates
    pub nb_gates: usize,
    /// Number of labels
    pub nb_labels: usize,
    /// Number of shapes of unknown type
    pub nb_unknown: usize,
    /// Number of connections between shapes, each counted once
    pub nb_connections: usize,
    /// Number of shapes of each type
    pub types: BTreeMap<&'static str, usize>,
}

impl SketchStats {
    /// Total number of shapes
    pub fn nb_shapes(&self) -> usize {
        self.nb_wires + self.nb_gates + self.nb_labels + self.nb_unknown
    }
}

impl fmt::Display for SketchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Stats:")?;
        writeln!(f, "  Substrokes: {}", self.nb_substrokes)?;
        writeln!(f, "  Shapes: {}", self.nb_shapes())?;
        writeln!(f, "  Connections: {}", self.nb_connections)?;
        if self.nb_wires != 0 {
            writeln!(f, "  Wires: {}", self.nb_wires)?;
        }
        if self.nb_gates != 0 {
            writeln!(f, "  Gates: {}", self.nb_gates)?;
            for (name, nb) in &self.types {
                if let Some(t) = crate::ShapeType::from_name(name) {
                    if t.is_gate() {
                        writeln!(f, "      {}: {}", name, nb)?;
                    }
                }
            }
        }
        if self.nb_labels != 0 {
            writeln!(f, "  Labels: {}", self.nb_labels)?;
        }
        if self.nb_unknown != 0 {
            writeln!(f, "  Unknown: {}", self.nb_unknown)?;
        }
        fmt::Result::Ok(())
    }
}

/// Compute the statistics of the sketch
pub fn stats(sketch: &Sketch) -> SketchStats {
    let mut ret = SketchStats {
        nb_substrokes: sketch.nb_substrokes(),
        nb_wires: 0,
        nb_gates: 0,
        nb_labels: 0,
        nb_unknown: 0,
        nb_connections: 0,
        types: BTreeMap::new(),
    };
    for s in sketch.shape_ids() {
        let shape = sketch.shape(s);
        match shape.shape_type().classification() {
            Classification::Wire => ret.nb_wires += 1,
            Classification::Gate => ret.nb_gates += 1,
            Classification::Text => ret.nb_labels += 1,
            Classification::Unknown => ret.nb_unknown += 1,
        }
        *ret.types.entry(shape.shape_type().name()).or_insert(0) += 1;
        ret.nb_connections += shape
            .connected_shapes()
            .iter()
            .filter(|t| **t > s)
            .count();
    }
    ret
}

#[cfg(test)]
mod tests {
    use super::stats;
    use crate::sketch::generators::testcases;

    #[test]
    fn test_and_gate() {
        let sketch = testcases::and_gate();
        let st = stats(&sketch);
        assert_eq!(st.nb_gates, 1);
        assert_eq!(st.nb_wires, 3);
        assert_eq!(st.nb_labels, 3);
        assert_eq!(st.nb_unknown, 0);
        assert_eq!(st.nb_shapes(), 7);
        assert_eq!(st.nb_connections, 0);
        assert_eq!(st.types["AND"], 1);
        let text = format!("{st}");
        assert!(text.contains("Gates: 1"));
        assert!(text.contains("AND: 1"));
    }
}
