use std::fmt;

use itertools::Itertools;

use crate::circuit::CircuitError;
use crate::sketch::ShapeType;

/// Logic function of a gate
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum GateKind {
    /// N-input And gate
    And,
    /// N-input Or gate
    Or,
    /// N-input Nand gate
    Nand,
    /// N-input Nor gate
    Nor,
    /// N-input Xor gate
    Xor,
    /// N-input Xnor gate
    Xnor,
    /// Inverter
    Not,
}

impl GateKind {
    /// Gate function drawn by a shape type, if any
    pub fn from_shape_type(t: ShapeType) -> Option<GateKind> {
        use GateKind::*;
        let ret = if t == ShapeType::AND {
            And
        } else if t == ShapeType::OR {
            Or
        } else if t == ShapeType::NAND {
            Nand
        } else if t == ShapeType::NOR {
            Nor
        } else if t == ShapeType::XOR {
            Xor
        } else if t == ShapeType::XNOR {
            Xnor
        } else if t == ShapeType::NOT {
            Not
        } else {
            return None;
        };
        Some(ret)
    }

    /// Maximum number of inputs
    pub fn max_inputs(&self) -> usize {
        match self {
            GateKind::Not => 1,
            _ => usize::MAX,
        }
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GateKind::And => "And",
            GateKind::Or => "Or",
            GateKind::Nand => "Nand",
            GateKind::Nor => "Nor",
            GateKind::Xor => "Xor",
            GateKind::Xnor => "Xnor",
            GateKind::Not => "Not",
        };
        write!(f, "{s}")
    }
}

/// A component output feeding a wire
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord)]
pub struct Driver {
    /// Driving component
    pub component: usize,
    /// Output of the component
    pub output: usize,
}

impl Driver {
    /// Driver for the first output of a component
    pub fn new(component: usize) -> Driver {
        Driver {
            component,
            output: 0,
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.output == 0 {
            write!(f, "c{}", self.component)
        } else {
            write!(f, "c{}.{}", self.component, self.output)
        }
    }
}

/// Logic gate
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Gate {
    /// Logic function
    pub kind: GateKind,
    inputs: Vec<Option<Driver>>,
    outputs: Vec<usize>,
}

/// Primary input of the circuit
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct CircuitInput {
    /// Name, from the label
    pub name: String,
    outputs: Vec<usize>,
}

/// Primary output of the circuit
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct CircuitOutput {
    /// Name, from the label
    pub name: String,
    input: Option<Driver>,
}

/// Element of a circuit
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Component {
    /// Logic gate
    Gate(Gate),
    /// Primary input
    Input(CircuitInput),
    /// Primary output
    Output(CircuitOutput),
}

impl Component {
    /// Create a gate without connections
    pub fn gate(kind: GateKind) -> Component {
        Component::Gate(Gate {
            kind,
            inputs: Vec::new(),
            outputs: Vec::new(),
        })
    }

    /// Create a primary input
    pub fn input(name: &str) -> Component {
        Component::Input(CircuitInput {
            name: name.to_string(),
            outputs: Vec::new(),
        })
    }

    /// Create a primary output
    pub fn output(name: &str) -> Component {
        Component::Output(CircuitOutput {
            name: name.to_string(),
            input: None,
        })
    }

    /// Name of a primary input or output
    pub fn name(&self) -> Option<&str> {
        match self {
            Component::Gate(_) => None,
            Component::Input(i) => Some(&i.name),
            Component::Output(o) => Some(&o.name),
        }
    }

    /// Drivers of the inputs of the component
    pub fn inputs(&self) -> &[Option<Driver>] {
        match self {
            Component::Gate(g) => &g.inputs,
            Component::Input(_) => &[],
            Component::Output(o) => std::slice::from_ref(&o.input),
        }
    }

    /// Meshes driven by the component
    pub fn driven_meshes(&self) -> &[usize] {
        match self {
            Component::Gate(g) => &g.outputs,
            Component::Input(i) => &i.outputs,
            Component::Output(_) => &[],
        }
    }

    /// Returns whether the component has an output
    pub fn is_source(&self) -> bool {
        !matches!(self, Component::Output(_))
    }

    /// Set the driver of an input
    ///
    /// Gates grow their input list as needed.
    pub fn connect_input(&mut self, driver: Driver, index: usize) -> Result<(), CircuitError> {
        match self {
            Component::Gate(g) => {
                if index >= g.kind.max_inputs() {
                    return Err(CircuitError::TooManyGateInputs {
                        kind: g.kind,
                        index,
                    });
                }
                if g.inputs.len() <= index {
                    g.inputs.resize(index + 1, None);
                }
                g.inputs[index] = Some(driver);
                Ok(())
            }
            Component::Input(i) => Err(CircuitError::NotASink(i.name.clone())),
            Component::Output(o) => {
                if index != 0 {
                    return Err(CircuitError::NoSuchOutputInput {
                        name: o.name.clone(),
                        index,
                    });
                }
                o.input = Some(driver);
                Ok(())
            }
        }
    }

    /// Make room for an input that is not driven yet
    pub(crate) fn reserve_input(&mut self, index: usize) -> Result<(), CircuitError> {
        match self {
            Component::Gate(g) => {
                if index >= g.kind.max_inputs() {
                    return Err(CircuitError::TooManyGateInputs {
                        kind: g.kind,
                        index,
                    });
                }
                if g.inputs.len() <= index {
                    g.inputs.resize(index + 1, None);
                }
                Ok(())
            }
            Component::Input(i) => Err(CircuitError::NotASink(i.name.clone())),
            Component::Output(o) if index != 0 => Err(CircuitError::NoSuchOutputInput {
                name: o.name.clone(),
                index,
            }),
            Component::Output(_) => Ok(()),
        }
    }

    /// Stop driving a mesh
    pub(crate) fn disconnect_output(&mut self, mesh: usize) {
        match self {
            Component::Gate(g) => g.outputs.retain(|m| *m != mesh),
            Component::Input(i) => i.outputs.retain(|m| *m != mesh),
            Component::Output(_) => (),
        }
    }

    /// Register the component as the driver of a mesh
    pub fn connect_output(&mut self, mesh: usize) -> Result<(), CircuitError> {
        let outputs = match self {
            Component::Gate(g) => &mut g.outputs,
            Component::Input(i) => &mut i.outputs,
            Component::Output(o) => return Err(CircuitError::NotASource(o.name.clone())),
        };
        if !outputs.contains(&mesh) {
            outputs.push(mesh);
        }
        Ok(())
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |d: &Option<Driver>| match d {
            Some(d) => d.to_string(),
            None => "?".to_string(),
        };
        match self {
            Component::Gate(g) => write!(f, "{}({})", g.kind, g.inputs.iter().map(show).join(", ")),
            Component::Input(i) => write!(f, "input \"{}\"", i.name),
            Component::Output(o) => write!(f, "output \"{}\" = {}", o.name, show(&o.input)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect() {
        let mut g = Component::gate(GateKind::And);
        g.connect_input(Driver::new(3), 1).unwrap();
        assert_eq!(g.inputs(), &[None, Some(Driver::new(3))]);
        g.connect_input(Driver::new(2), 0).unwrap();
        assert_eq!(format!("{g}"), "And(c2, c3)");
        g.connect_output(5).unwrap();
        g.connect_output(5).unwrap();
        assert_eq!(g.driven_meshes(), &[5]);

        let mut n = Component::gate(GateKind::Not);
        assert!(n.connect_input(Driver::new(0), 0).is_ok());
        assert!(n.connect_input(Driver::new(1), 1).is_err());

        let mut i = Component::input("A");
        assert!(i.connect_input(Driver::new(0), 0).is_err());
        assert!(i.is_source());

        let mut o = Component::output("Y");
        assert!(o.connect_output(0).is_err());
        assert_eq!(o.inputs(), &[None]);
        assert_eq!(
            o.connect_input(Driver::new(4), 1),
            Err(CircuitError::NoSuchOutputInput {
                name: "Y".to_string(),
                index: 1
            })
        );
        o.connect_input(Driver::new(4), 0).unwrap();
        assert_eq!(o.name(), Some("Y"));
        assert_eq!(format!("{o}"), "output \"Y\" = c4");
    }

    #[test]
    fn test_kinds() {
        for t in ShapeType::gates() {
            assert!(GateKind::from_shape_type(t).is_some());
        }
        assert_eq!(GateKind::from_shape_type(ShapeType::WIRE), None);
        assert_eq!(GateKind::from_shape_type(ShapeType::XNOR), Some(GateKind::Xnor));
    }
}
