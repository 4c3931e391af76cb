use std::fmt;

use serde::{Deserialize, Serialize};

/// Handle to a shape in a sketch
///
/// Handles are stable: removing a shape never renumbers the others.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub struct ShapeId(u32);

/// Handle to a substroke in a sketch
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub struct SubstrokeId(u32);

/// One of the two ends of a substroke
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub enum End {
    /// First point of the substroke
    Start,
    /// Last point of the substroke
    Stop,
}

/// Handle to an endpoint: a substroke and one of its ends
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct EndPointId {
    /// Substroke carrying the endpoint
    pub substroke: SubstrokeId,
    /// Which end of the substroke
    pub end: End,
}

impl ShapeId {
    /// Create a handle from an arena index
    pub fn from_index(i: usize) -> ShapeId {
        ShapeId(i as u32)
    }

    /// Arena index of the shape
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl SubstrokeId {
    /// Create a handle from an arena index
    pub fn from_index(i: usize) -> SubstrokeId {
        SubstrokeId(i as u32)
    }

    /// Arena index of the substroke
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// Endpoint at the start of the substroke
    pub fn start(&self) -> EndPointId {
        EndPointId {
            substroke: *self,
            end: End::Start,
        }
    }

    /// Endpoint at the end of the substroke
    pub fn stop(&self) -> EndPointId {
        EndPointId {
            substroke: *self,
            end: End::Stop,
        }
    }

    /// Both endpoints, start first
    pub fn endpoints(&self) -> [EndPointId; 2] {
        [self.start(), self.stop()]
    }
}

impl End {
    pub(crate) fn index(&self) -> usize {
        match self {
            End::Start => 0,
            End::Stop => 1,
        }
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

impl fmt::Debug for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for SubstrokeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

impl fmt::Debug for SubstrokeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for EndPointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            End::Start => write!(f, "{}.start", self.substroke),
            End::Stop => write!(f, "{}.stop", self.substroke),
        }
    }
}

impl fmt::Debug for EndPointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
