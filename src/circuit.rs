//! Circuit view of a connected sketch
//!
//! A [`Circuit`] holds components (gates, primary inputs and outputs) and one
//! [`WireMesh`] per wire. Meshes route the signal from their source to their
//! dependents: connecting a source pushes it to every dependent, and a dependent
//! connected later receives the current source immediately.

mod build;
mod component;
mod mesh;

use std::fmt;

use thiserror::Error;

use crate::sketch::ShapeId;

pub use component::{CircuitInput, CircuitOutput, Component, Driver, Gate, GateKind};
pub use mesh::WireMesh;

/// Error while building or evaluating a circuit
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CircuitError {
    /// A shape that was not recognized
    #[error("shape {0} has not been recognized")]
    UnrecognizedShape(ShapeId),
    /// A gate shape whose type has no logic function
    #[error("shape {shape} has gate type {shape_type}, which cannot be simulated")]
    UnknownGate {
        /// Gate shape
        shape: ShapeId,
        /// Name of its type
        shape_type: String,
    },
    /// A label without a name
    #[error("label {0} has no name")]
    UnnamedLabel(ShapeId),
    /// A label that is not attached to exactly one wire
    #[error("label {0} is not attached to exactly one wire")]
    DetachedLabel(ShapeId),
    /// A wire with two different sources
    #[error("wire {0} is driven by more than one component")]
    MultipleDrivers(ShapeId),
    /// An input connection on a component that has none
    #[error("circuit input \"{0}\" cannot be driven")]
    NotASink(String),
    /// An output connection on a component that has none
    #[error("circuit output \"{0}\" cannot drive a wire")]
    NotASource(String),
    /// Input index out of range for a gate
    #[error("{kind} gate has no input {index}")]
    TooManyGateInputs {
        /// Gate function
        kind: GateKind,
        /// Offending input index
        index: usize,
    },
    /// Input index other than 0 for a primary output
    #[error("circuit output \"{name}\" has no input {index}")]
    NoSuchOutputInput {
        /// Name of the output
        name: String,
        /// Offending input index
        index: usize,
    },
    /// Simulation with a wrong number of input values
    #[error("expected {expected} input values, got {actual}")]
    WrongInputCount {
        /// Number of primary inputs
        expected: usize,
        /// Number of values given
        actual: usize,
    },
    /// A component input without driver
    #[error("input {index} of component {component} is not driven")]
    UnconnectedInput {
        /// Component index
        component: usize,
        /// Input index
        index: usize,
    },
    /// A cycle through gates
    #[error("the circuit contains a combinational loop")]
    CombinationalLoop,
    /// Too many primary inputs to enumerate
    #[error("cannot enumerate {0} inputs")]
    TooManyInputs(usize),
}

/// Components and wire meshes of a logic circuit
///
/// Primary inputs and outputs are kept in declaration order, which defines the bit
/// order of truth tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Circuit {
    components: Vec<Component>,
    meshes: Vec<WireMesh>,
    inputs: Vec<usize>,
    outputs: Vec<usize>,
}

impl Circuit {
    /// Create an empty circuit
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the number of components
    pub fn nb_components(&self) -> usize {
        self.components.len()
    }

    /// Return the number of meshes
    pub fn nb_meshes(&self) -> usize {
        self.meshes.len()
    }

    /// Return the number of primary inputs
    pub fn nb_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Return the number of primary outputs
    pub fn nb_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// Return the number of gates
    pub fn nb_gates(&self) -> usize {
        self.components
            .iter()
            .filter(|c| matches!(c, Component::Gate(_)))
            .count()
    }

    /// Get a component
    pub fn component(&self, i: usize) -> &Component {
        &self.components[i]
    }

    /// Get a mesh
    pub fn mesh(&self, i: usize) -> &WireMesh {
        &self.meshes[i]
    }

    /// Components of the primary inputs, in order
    pub fn inputs(&self) -> &[usize] {
        &self.inputs
    }

    /// Components of the primary outputs, in order
    pub fn outputs(&self) -> &[usize] {
        &self.outputs
    }

    /// Names of the primary inputs, in order
    pub fn input_names(&self) -> Vec<&str> {
        self.inputs
            .iter()
            .filter_map(|i| self.components[*i].name())
            .collect()
    }

    /// Names of the primary outputs, in order
    pub fn output_names(&self) -> Vec<&str> {
        self.outputs
            .iter()
            .filter_map(|i| self.components[*i].name())
            .collect()
    }

    /// Add a primary input; return its component index
    pub fn add_input(&mut self, name: &str) -> usize {
        let id = self.add_component(Component::input(name));
        self.inputs.push(id);
        id
    }

    /// Add a primary output; return its component index
    pub fn add_output(&mut self, name: &str) -> usize {
        let id = self.add_component(Component::output(name));
        self.outputs.push(id);
        id
    }

    /// Add a gate; return its component index
    pub fn add_gate(&mut self, kind: GateKind) -> usize {
        self.add_component(Component::gate(kind))
    }

    fn add_component(&mut self, c: Component) -> usize {
        self.components.push(c);
        self.components.len() - 1
    }

    /// Add a mesh; return its index
    pub fn add_mesh(&mut self, shape: Option<ShapeId>) -> usize {
        self.meshes.push(WireMesh::new(shape));
        self.meshes.len() - 1
    }

    /// Set the source of a mesh and propagate it to every dependent
    ///
    /// Connecting the current source again changes nothing.
    pub fn connect_source(&mut self, mesh: usize, driver: Driver) -> Result<(), CircuitError> {
        if self.meshes[mesh].source == Some(driver) {
            return Ok(());
        }
        self.components[driver.component].connect_output(mesh)?;
        if let Some(previous) = self.meshes[mesh].source.replace(driver) {
            self.components[previous.component].disconnect_output(mesh);
        }
        for (c, i) in self.meshes[mesh].dependents.clone() {
            self.components[c].connect_input(driver, i)?;
        }
        Ok(())
    }

    /// Add a component input to the dependents of a mesh
    ///
    /// The input receives the current source of the mesh, if any. Connecting an
    /// existing dependent again changes nothing.
    pub fn connect_dependent(
        &mut self,
        mesh: usize,
        component: usize,
        index: usize,
    ) -> Result<(), CircuitError> {
        if self.meshes[mesh].dependents.contains(&(component, index)) {
            return Ok(());
        }
        match self.meshes[mesh].source {
            Some(d) => self.components[component].connect_input(d, index)?,
            None => self.components[component].reserve_input(index)?,
        }
        self.meshes[mesh].dependents.push((component, index));
        Ok(())
    }

    /// Check that every component input is driven
    pub fn check(&self) -> Result<(), CircuitError> {
        for (c, comp) in self.components.iter().enumerate() {
            if let Component::Gate(_) = comp {
                if comp.inputs().is_empty() {
                    return Err(CircuitError::UnconnectedInput {
                        component: c,
                        index: 0,
                    });
                }
            }
            for (index, d) in comp.inputs().iter().enumerate() {
                if d.is_none() {
                    return Err(CircuitError::UnconnectedInput { component: c, index });
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Circuit with {} inputs, {} outputs, {} gates:",
            self.nb_inputs(),
            self.nb_outputs(),
            self.nb_gates()
        )?;
        for (i, c) in self.components.iter().enumerate() {
            writeln!(f, "\tc{} = {}", i, c)?;
        }
        Ok(())
    }
}
