use crate::sketch::{Classification, End, Point, ShapeId};

/// A connection point at one end of a substroke
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct EndPoint {
    pub(crate) position: Point,
    pub(crate) connected_shape: Option<ShapeId>,
}

/// An atomic fragment of pen input
///
/// A substroke always carries two endpoints, at its first and last point.
/// Its owning shape is None only once it has been removed from the sketch.
#[derive(Debug, PartialEq, Clone)]
pub struct Substroke {
    pub(crate) points: Vec<Point>,
    pub(crate) classification: Classification,
    pub(crate) shape: Option<ShapeId>,
    pub(crate) endpoints: [EndPoint; 2],
}

impl EndPoint {
    /// Location of the endpoint
    pub fn position(&self) -> Point {
        self.position
    }

    /// Shape this endpoint touches, if any
    pub fn connected_shape(&self) -> Option<ShapeId> {
        self.connected_shape
    }
}

impl Substroke {
    pub(crate) fn new(points: Vec<Point>, shape: ShapeId) -> Substroke {
        assert!(!points.is_empty(), "A substroke needs at least one point");
        let first = points[0];
        let last = points[points.len() - 1];
        Substroke {
            points,
            classification: Classification::Unknown,
            shape: Some(shape),
            endpoints: [
                EndPoint {
                    position: first,
                    connected_shape: None,
                },
                EndPoint {
                    position: last,
                    connected_shape: None,
                },
            ],
        }
    }

    /// Ink of the substroke
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Coarse class assigned by the classifier
    pub fn classification(&self) -> Classification {
        self.classification
    }

    /// Owning shape; None if the substroke was removed
    pub fn shape(&self) -> Option<ShapeId> {
        self.shape
    }

    /// Endpoint at one end
    pub fn endpoint(&self, end: End) -> &EndPoint {
        &self.endpoints[end.index()]
    }

    /// Total length of the ink
    pub fn length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| w[0].distance(w[1]))
            .sum()
    }
}
