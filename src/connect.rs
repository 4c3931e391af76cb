//! Connectivity between shapes
//!
//! Geometric adjacency is established by a [`ConnectionDomain`], which decides which
//! shapes touch and which shapes are properly connected for their type.
//! The [`ConnectivityEngine`] drives it and enforces the structural rules: connections
//! are mutual and backed by endpoints on both sides, and wires that touch each other are
//! merged into a single shape.

mod domain;
mod engine;

use itertools::Itertools;
use log::warn;

use crate::sketch::{ShapeId, Sketch, Violation};

pub use domain::ProximityDomain;
pub use engine::{ConnectivityEngine, RecomputeConnections};

/// Rules deciding which shapes touch
pub trait ConnectionDomain {
    /// Connect the free endpoints of a shape to the shapes they touch
    ///
    /// Returns the shapes that lost a connection in the process, so that they can be
    /// connected again.
    fn connect_shape(&self, shape: ShapeId, sketch: &mut Sketch) -> Vec<ShapeId>;

    /// Returns whether the shape has the connections its type requires
    fn is_properly_connected(&self, shape: ShapeId, sketch: &Sketch) -> bool;
}

/// Behaviour on broken invariants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationPolicy {
    /// Panic, listing every violation
    Strict,
    /// Log every violation as a warning and continue
    Lenient,
}

impl Default for ValidationPolicy {
    /// Strict in debug builds, lenient in release builds
    fn default() -> Self {
        if cfg!(debug_assertions) {
            ValidationPolicy::Strict
        } else {
            ValidationPolicy::Lenient
        }
    }
}

impl ValidationPolicy {
    /// Apply the policy to a list of violations; returns whether the list was empty
    pub fn enforce(&self, violations: &[Violation]) -> bool {
        if violations.is_empty() {
            return true;
        }
        match self {
            ValidationPolicy::Strict => {
                panic!("Inconsistent sketch: {}", violations.iter().join("; "))
            }
            ValidationPolicy::Lenient => {
                for v in violations {
                    warn!("Inconsistent sketch: {v}");
                }
                false
            }
        }
    }
}
