use crate::circuit::Driver;
use crate::sketch::ShapeId;

/// Signal view of a wire: one optional source and the component inputs it feeds
///
/// Meshes are owned by a [`Circuit`](crate::circuit::Circuit), which propagates the
/// source to every dependent as connections are made.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct WireMesh {
    shape: Option<ShapeId>,
    pub(crate) source: Option<Driver>,
    pub(crate) dependents: Vec<(usize, usize)>,
}

impl WireMesh {
    /// Create a mesh, optionally backed by a wire shape
    pub fn new(shape: Option<ShapeId>) -> WireMesh {
        WireMesh {
            shape,
            source: None,
            dependents: Vec::new(),
        }
    }

    /// Wire shape the mesh was built from
    pub fn shape(&self) -> Option<ShapeId> {
        self.shape
    }

    /// Component output driving the mesh
    pub fn source(&self) -> Option<Driver> {
        self.source
    }

    /// Component inputs fed by the mesh, as (component, input index), in connection order
    pub fn dependents(&self) -> &[(usize, usize)] {
        &self.dependents
    }

    /// Number of component inputs fed by the mesh
    pub fn nb_dependents(&self) -> usize {
        self.dependents.len()
    }
}
