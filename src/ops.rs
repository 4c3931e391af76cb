//! Reversible operations on a sketch
//!
//! Every structural change the search may try is expressed as an [`Operation`], which
//! can be performed and then undone, restoring the sketch exactly.
//!
//! Most operations are [`StandardOperation`]s: they declare which aspects of the sketch
//! they touch (substroke grouping, types, connections), and the [`Standard`] wrapper
//! records those aspects before performing the operation and restores them on undo.
//! Operations are combined with [`Compound`], which undoes its parts in reverse order.
//!
//! ```
//! # use inkcircuit::sketch::generators::testcases;
//! # use inkcircuit::{ShapeId, ShapeType};
//! use inkcircuit::ops::{self, Operation};
//! let mut sketch = testcases::and_gate();
//! let before = sketch.clone();
//! let mut op = ops::relabel(ShapeId::from_index(0), ShapeType::OR, 0.8, 0.0);
//! op.perform(&mut sketch);
//! assert_eq!(sketch.shape(ShapeId::from_index(0)).shape_type(), ShapeType::OR);
//! op.undo(&mut sketch);
//! assert_eq!(sketch, before);
//! ```

mod edits;
mod snapshot;

use itertools::Itertools;

use crate::sketch::{EndPointId, ShapeId, ShapeType, Sketch, SubstrokeId};

pub use edits::{ConnectEndpoint, MergeShapes, MoveSubstroke, Relabel, RemoveSubstroke};
pub(crate) use snapshot::Snapshot;

/// A change to a sketch that can be undone
pub trait Operation {
    /// Apply the change
    fn perform(&mut self, sketch: &mut Sketch);

    /// Revert the change
    ///
    /// Only valid right after `perform`, with no other change to the sketch in between.
    fn undo(&mut self, sketch: &mut Sketch);

    /// Short human-readable description
    fn describe(&self) -> String;
}

/// Aspects of a sketch an operation may modify
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct Aspects {
    /// Grouping of substrokes into shapes, and creation or removal of shapes
    pub geometry: bool,
    /// Types, confidences, orientations, flags and substroke classifications
    pub types: bool,
    /// Connected shapes and endpoint links
    pub connections: bool,
}

impl Aspects {
    /// Nothing
    pub const NONE: Aspects = Aspects {
        geometry: false,
        types: false,
        connections: false,
    };
    /// Everything
    pub const ALL: Aspects = Aspects {
        geometry: true,
        types: true,
        connections: true,
    };
    /// Grouping only
    pub const GEOMETRY: Aspects = Aspects {
        geometry: true,
        types: false,
        connections: false,
    };
    /// Types only
    pub const TYPES: Aspects = Aspects {
        geometry: false,
        types: true,
        connections: false,
    };
    /// Connections only
    pub const CONNECTIONS: Aspects = Aspects {
        geometry: false,
        types: false,
        connections: true,
    };

    /// Aspects touched by either
    pub fn union(self, other: Aspects) -> Aspects {
        Aspects {
            geometry: self.geometry || other.geometry,
            types: self.types || other.types,
            connections: self.connections || other.connections,
        }
    }
}

/// An operation whose undo is handled by snapshotting the aspects it declares
pub trait StandardOperation {
    /// Aspects of the sketch modified by `apply`
    fn aspects(&self) -> Aspects;

    /// Apply the change
    fn apply(&mut self, sketch: &mut Sketch);

    /// Short human-readable description
    fn describe(&self) -> String;
}

/// Reversible wrapper around a [`StandardOperation`]
pub struct Standard<O> {
    op: O,
    snapshot: Option<Snapshot>,
}

impl<O: StandardOperation> Standard<O> {
    /// Wrap an operation
    pub fn new(op: O) -> Standard<O> {
        Standard { op, snapshot: None }
    }

    /// Access the wrapped operation
    pub fn inner(&self) -> &O {
        &self.op
    }
}

impl<O: StandardOperation> Operation for Standard<O> {
    fn perform(&mut self, sketch: &mut Sketch) {
        self.snapshot = Some(Snapshot::take(sketch, self.op.aspects()));
        self.op.apply(sketch);
    }

    fn undo(&mut self, sketch: &mut Sketch) {
        match self.snapshot.take() {
            Some(s) => s.restore(sketch),
            None => panic!("Undo called before perform on {}", self.op.describe()),
        }
    }

    fn describe(&self) -> String {
        self.op.describe()
    }
}

/// Ordered sequence of operations, performed in order and undone in reverse order
#[derive(Default)]
pub struct Compound<'a> {
    ops: Vec<Box<dyn Operation + 'a>>,
}

impl<'a> Compound<'a> {
    /// Create an empty compound operation
    pub fn new() -> Compound<'a> {
        Compound { ops: Vec::new() }
    }

    /// Append an operation
    pub fn push(&mut self, op: Box<dyn Operation + 'a>) {
        self.ops.push(op);
    }

    /// Append an operation, builder-style
    pub fn then(mut self, op: Box<dyn Operation + 'a>) -> Compound<'a> {
        self.push(op);
        self
    }

    /// Number of operations
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns whether there is no operation
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl<'a> Operation for Compound<'a> {
    fn perform(&mut self, sketch: &mut Sketch) {
        for op in self.ops.iter_mut() {
            op.perform(sketch);
        }
    }

    fn undo(&mut self, sketch: &mut Sketch) {
        for op in self.ops.iter_mut().rev() {
            op.undo(sketch);
        }
    }

    fn describe(&self) -> String {
        self.ops.iter().map(|op| op.describe()).join(" then ")
    }
}

/// Change the type, confidence and orientation of a shape
pub fn relabel<'a>(
    shape: ShapeId,
    shape_type: ShapeType,
    probability: f64,
    orientation: f64,
) -> Box<dyn Operation + 'a> {
    Box::new(Standard::new(Relabel {
        shape,
        shape_type,
        probability,
        orientation,
    }))
}

/// Connect an endpoint to a shape
pub fn connect_endpoint<'a>(endpoint: EndPointId, destination: ShapeId) -> Box<dyn Operation + 'a> {
    Box::new(Standard::new(ConnectEndpoint {
        endpoint,
        destination,
    }))
}

/// Remove a substroke, and its shape if it becomes empty
pub fn remove_substroke<'a>(substroke: SubstrokeId) -> Box<dyn Operation + 'a> {
    Box::new(Standard::new(RemoveSubstroke { substroke }))
}

/// Merge a shape into another one
pub fn merge_shapes<'a>(keep: ShapeId, absorb: ShapeId) -> Box<dyn Operation + 'a> {
    Box::new(Standard::new(MergeShapes { keep, absorb }))
}

/// Move a substroke to another shape, or to a new one
pub fn move_substroke<'a>(
    substroke: SubstrokeId,
    destination: Option<ShapeId>,
) -> Box<dyn Operation + 'a> {
    Box::new(Standard::new(MoveSubstroke {
        substroke,
        destination,
    }))
}
