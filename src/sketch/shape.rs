use std::collections::BTreeSet;
use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::sketch::{ShapeId, ShapeType, SubstrokeId};

/// Decisions that automatic passes must not overwrite
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeFlags {
    /// The type is final; classification and recognition skip the shape
    pub already_labeled: bool,
    /// The substroke grouping is final; the search does not regroup the shape,
    /// and classification and recognition skip it
    pub already_grouped: bool,
    /// The orientation is final; recognition keeps it
    pub already_oriented: bool,
    /// The type was chosen by the user
    pub user_labeled: bool,
}

/// A group of substrokes forming one circuit element
///
/// Shapes are owned by a [`Sketch`](crate::Sketch), which maintains the membership
/// and connection fields. Only the type and user-facing attributes are mutable from
/// outside.
#[derive(Debug, PartialEq, Clone)]
pub struct Shape {
    pub(crate) shape_type: ShapeType,
    pub(crate) probability: f64,
    pub(crate) orientation: f64,
    /// User decisions
    pub flags: ShapeFlags,
    pub(crate) name: Option<String>,
    pub(crate) sub_circuit: Option<usize>,
    pub(crate) substrokes: Vec<SubstrokeId>,
    pub(crate) connected: BTreeSet<ShapeId>,
    pub(crate) removed: bool,
}

/// Bring an angle into [0, 2π)
pub fn normalize_orientation(angle: f64) -> f64 {
    let ret = angle.rem_euclid(TAU);
    // rem_euclid may round up to TAU for tiny negative inputs
    if ret >= TAU {
        0.0
    } else {
        ret
    }
}

impl ShapeFlags {
    /// Returns whether the user finalized the shape, so that recognition leaves it alone
    pub fn is_finalized(&self) -> bool {
        self.already_labeled || self.already_grouped
    }
}

impl Shape {
    pub(crate) fn new(shape_type: ShapeType) -> Shape {
        Shape {
            shape_type,
            probability: 0.0,
            orientation: 0.0,
            flags: ShapeFlags::default(),
            name: None,
            sub_circuit: None,
            substrokes: Vec::new(),
            connected: BTreeSet::new(),
            removed: false,
        }
    }

    /// Type of the shape
    pub fn shape_type(&self) -> ShapeType {
        self.shape_type
    }

    /// Confidence in the type, in [0, 1]
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Orientation in radians, in [0, 2π)
    pub fn orientation(&self) -> f64 {
        self.orientation
    }

    /// Set the type, confidence and orientation at once
    pub fn set_type(&mut self, shape_type: ShapeType, probability: f64, orientation: f64) {
        self.shape_type = shape_type;
        self.probability = probability.clamp(0.0, 1.0);
        self.orientation = normalize_orientation(orientation);
    }

    /// Text of a label, if known
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Set the text of a label
    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    /// Nested circuit this shape stands for, if any
    pub fn sub_circuit(&self) -> Option<usize> {
        self.sub_circuit
    }

    /// Link the shape to a nested circuit
    pub fn set_sub_circuit(&mut self, sub_circuit: Option<usize>) {
        self.sub_circuit = sub_circuit;
    }

    /// Substrokes of the shape, in insertion order
    pub fn substrokes(&self) -> &[SubstrokeId] {
        &self.substrokes
    }

    /// Shapes this one touches
    pub fn connected_shapes(&self) -> &BTreeSet<ShapeId> {
        &self.connected
    }

    /// Returns whether the shape is a wire
    pub fn is_wire(&self) -> bool {
        self.shape_type.is_wire()
    }

    /// Returns whether the shape is a gate
    pub fn is_gate(&self) -> bool {
        self.shape_type.is_gate()
    }

    /// Returns whether the shape is a label
    pub fn is_text(&self) -> bool {
        self.shape_type.is_text()
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::*;

    #[test]
    fn test_orientation() {
        assert_eq!(normalize_orientation(0.0), 0.0);
        assert_eq!(normalize_orientation(TAU), 0.0);
        assert!((normalize_orientation(-PI / 2.0) - 1.5 * PI).abs() < 1e-12);
        assert!((normalize_orientation(5.0 * PI) - PI).abs() < 1e-12);
        let tiny = normalize_orientation(-1e-300);
        assert!((0.0..TAU).contains(&tiny));
    }

    #[test]
    fn test_set_type() {
        let mut s = Shape::new(ShapeType::UNKNOWN);
        s.set_type(ShapeType::AND, 1.5, -PI);
        assert_eq!(s.shape_type(), ShapeType::AND);
        assert_eq!(s.probability(), 1.0);
        assert!((s.orientation() - PI).abs() < 1e-12);
        assert!(s.is_gate());
    }
}
