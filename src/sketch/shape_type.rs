use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Coarse class of a substroke or a shape type
///
/// Text is the class of labels: the two words are used interchangeably.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Default, Serialize, Deserialize)]
pub enum Classification {
    /// Logic gate
    Gate,
    /// Wire
    Wire,
    /// Text label
    #[serde(alias = "Label")]
    Text,
    /// Not classified yet
    #[default]
    Unknown,
}

/// Display color, as RGB
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct Color(pub u8, pub u8, pub u8);

/// Kind of circuit element a shape represents
///
/// Types are identity values: two types are equal when their names are.
#[derive(Clone, Copy)]
pub struct ShapeType {
    name: &'static str,
    classification: Classification,
    color: Color,
}

impl ShapeType {
    /// Shape that has not been recognized
    pub const UNKNOWN: ShapeType = ShapeType::new("Unknown", Classification::Unknown, Color(128, 128, 128));
    /// Wire
    pub const WIRE: ShapeType = ShapeType::new("Wire", Classification::Wire, Color(0, 0, 255));
    /// Text label, naming a circuit input or output
    pub const LABEL: ShapeType = ShapeType::new("Label", Classification::Text, Color(255, 165, 0));
    /// And gate
    pub const AND: ShapeType = ShapeType::new("AND", Classification::Gate, Color(255, 0, 0));
    /// Or gate
    pub const OR: ShapeType = ShapeType::new("OR", Classification::Gate, Color(255, 0, 0));
    /// Nand gate
    pub const NAND: ShapeType = ShapeType::new("NAND", Classification::Gate, Color(255, 0, 0));
    /// Nor gate
    pub const NOR: ShapeType = ShapeType::new("NOR", Classification::Gate, Color(255, 0, 0));
    /// Xor gate
    pub const XOR: ShapeType = ShapeType::new("XOR", Classification::Gate, Color(255, 0, 0));
    /// Xnor gate
    pub const XNOR: ShapeType = ShapeType::new("XNOR", Classification::Gate, Color(255, 0, 0));
    /// Inverter
    pub const NOT: ShapeType = ShapeType::new("NOT", Classification::Gate, Color(255, 0, 0));

    /// All predefined types
    pub const ALL: [ShapeType; 10] = [
        ShapeType::UNKNOWN,
        ShapeType::WIRE,
        ShapeType::LABEL,
        ShapeType::AND,
        ShapeType::OR,
        ShapeType::NAND,
        ShapeType::NOR,
        ShapeType::XOR,
        ShapeType::XNOR,
        ShapeType::NOT,
    ];

    /// Define a new type
    pub const fn new(name: &'static str, classification: Classification, color: Color) -> ShapeType {
        ShapeType {
            name,
            classification,
            color,
        }
    }

    /// Look up a predefined type by name
    pub fn from_name(name: &str) -> Option<ShapeType> {
        ShapeType::ALL.iter().find(|t| t.name == name).copied()
    }

    /// All predefined gate types
    pub fn gates() -> impl Iterator<Item = ShapeType> {
        ShapeType::ALL
            .into_iter()
            .filter(|t| t.classification == Classification::Gate)
    }

    /// Name of the type
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Coarse class of the type
    pub fn classification(&self) -> Classification {
        self.classification
    }

    /// Display color
    pub fn color(&self) -> Color {
        self.color
    }

    /// Returns whether this is a wire type
    pub fn is_wire(&self) -> bool {
        self.classification == Classification::Wire
    }

    /// Returns whether this is a gate type
    pub fn is_gate(&self) -> bool {
        self.classification == Classification::Gate
    }

    /// Returns whether this is a text type
    pub fn is_text(&self) -> bool {
        self.classification == Classification::Text
    }
}

impl Default for ShapeType {
    fn default() -> Self {
        ShapeType::UNKNOWN
    }
}

impl PartialEq for ShapeType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ShapeType {}

impl Hash for ShapeType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl fmt::Debug for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", self.name, self.classification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let custom = ShapeType::new("AND", Classification::Text, Color(0, 0, 0));
        assert_eq!(custom, ShapeType::AND);
        assert_ne!(ShapeType::AND, ShapeType::NAND);
    }

    #[test]
    fn test_lookup() {
        for t in ShapeType::ALL {
            assert_eq!(ShapeType::from_name(t.name()), Some(t));
        }
        assert_eq!(ShapeType::from_name("Resistor"), None);
        assert_eq!(ShapeType::gates().count(), 7);
        assert!(ShapeType::WIRE.is_wire());
        assert!(ShapeType::LABEL.is_text());
        assert!(ShapeType::NOT.is_gate());
    }
}
