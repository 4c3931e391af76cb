//! Interpretation of hand-drawn logic circuits
//!
//! This crate turns freehand sketches of logic diagrams into connected, simulatable circuits.
//! Pen strokes are grouped into typed shapes (gates, wires and labels), connected to each
//! other by geometric proximity, repaired by a local search when the recognition made
//! mistakes, and finally extracted as a circuit whose truth table can be computed.
//!
//! # Usage
//!
//! Inkcircuit works on sketches stored as JSON files, and is available as a binary program.
//!
//! ```bash
//! # Show available commands
//! inkcircuit help
//! # Show the shapes of a sketch
//! inkcircuit show mysketch.json
//! # Compute the connections between shapes
//! inkcircuit connect mysketch.json -o connected.json
//! # Repair recognition mistakes
//! inkcircuit refine mysketch.json -o refined.json --seed 1
//! # Print the truth table
//! inkcircuit simulate refined.json
//! ```
//!
//! # Development
//!
//! ## Philosophy
//!
//! Recognition of hand-drawn diagrams is never certain: strokes of a gate may be split
//! between several shapes, or a gate may be mistaken for another one. Rather than trusting
//! a single recognition pass, every structural change to a sketch is a reversible
//! [`Operation`](ops::Operation). Candidate changes are evaluated by performing them,
//! scoring the result and undoing them, and the best one is kept. The same framework is
//! used for edits by the user.
//!
//! ## Datastructures
//!
//! A [`Sketch`] owns substrokes (pieces of pen strokes) and shapes (groups of substrokes
//! with a type). Both live in arenas and are referenced by [`ShapeId`] and [`SubstrokeId`].
//! Each substroke has two endpoints, which may touch another shape.
//!
//! Connections are mutual and always backed by a touching endpoint. Wires that touch each
//! other are a single electrical net, and the [`ConnectivityEngine`] merges them into a single
//! shape whenever it recomputes connections.
//!
//! For example, here is a 2-input And gate being connected and simulated:
//! ```
//! # use inkcircuit::{Circuit, ConnectivityEngine, ProximityDomain, TruthTable};
//! # use inkcircuit::sketch::generators::testcases;
//! let mut sketch = testcases::and_gate();
//! let domain = ProximityDomain::new(testcases::RADIUS);
//! ConnectivityEngine::new(&domain).connect_all(&mut sketch);
//! let circuit = Circuit::from_sketch(&sketch).unwrap();
//! let table = TruthTable::new(circuit);
//! let dict = table.truth_table_dictionary().unwrap();
//! assert_eq!(dict[&vec![true, true]], vec![true]);
//! assert_eq!(dict[&vec![true, false]], vec![false]);
//! ```

#![warn(missing_docs)]

pub mod circuit;
pub mod cmd;
pub mod connect;
pub mod io;
pub mod ops;
pub mod recognition;
pub mod search;
pub mod sim;
pub mod sketch;

pub use circuit::{Circuit, CircuitError};
pub use connect::{ConnectionDomain, ConnectivityEngine, ProximityDomain, ValidationPolicy};
pub use search::Refiner;
pub use sim::TruthTable;
pub use sketch::{
    stats, Classification, EndPointId, Shape, ShapeId, ShapeType, Sketch, SubstrokeId, Violation,
};
