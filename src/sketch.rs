//! Representation of a sketch: substrokes grouped into shapes, and their connections

pub mod generators;
mod geometry;
mod ids;
mod shape;
mod shape_type;
#[allow(clippy::module_inception)]
mod sketch;
pub mod stats;
mod substroke;

pub use geometry::{BoundingBox, Point};
pub use ids::{End, EndPointId, ShapeId, SubstrokeId};
pub use shape::{normalize_orientation, Shape, ShapeFlags};
pub use shape_type::{Classification, Color, ShapeType};
pub use sketch::{Sketch, Violation};
pub use substroke::{EndPoint, Substroke};
