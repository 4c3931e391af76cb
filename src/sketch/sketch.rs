use std::collections::BTreeSet;
use std::fmt;

use itertools::Itertools;
use thiserror::Error;

use crate::sketch::{
    BoundingBox, Classification, EndPoint, EndPointId, Point, Shape, ShapeId, ShapeType,
    Substroke, SubstrokeId,
};

/// Aggregate of all shapes and substrokes of a drawing
///
/// Shapes and substrokes live in arenas and are referenced by handle. Removed shapes
/// keep their slot, so that handles stay stable and removals can be undone.
///
/// The sketch maintains the following invariants after every mutation:
///   * every live substroke belongs to exactly one live shape, and no live shape is empty;
///   * an endpoint touching a shape implies that the owner lists it as connected,
///     and every connected shape is touched by at least one endpoint;
///   * connections are mutual.
///
/// A last invariant, that no two wires are connected without being merged, is
/// restored by the [`ConnectivityEngine`](crate::ConnectivityEngine).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sketch {
    pub(crate) substrokes: Vec<Substroke>,
    pub(crate) shapes: Vec<Shape>,
}

/// A broken structural invariant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    /// A live shape without substrokes
    #[error("shape {0} has no substroke")]
    EmptyShape(ShapeId),
    /// A substroke and a shape disagree on ownership
    #[error("substroke {substroke} and shape {shape} disagree on ownership")]
    OwnerMismatch {
        /// Substroke involved
        substroke: SubstrokeId,
        /// Shape involved
        shape: ShapeId,
    },
    /// An endpoint touches a shape that its owner does not list
    #[error("endpoint {endpoint} of {shape} touches {target}, which is not listed as connected")]
    EndpointNotListed {
        /// Owner of the endpoint
        shape: ShapeId,
        /// Endpoint involved
        endpoint: EndPointId,
        /// Touched shape
        target: ShapeId,
    },
    /// A connected shape that no endpoint touches
    #[error("{shape} lists {target} as connected, but no endpoint touches it")]
    ConnectionWithoutEndpoint {
        /// Shape listing the connection
        shape: ShapeId,
        /// Listed shape
        target: ShapeId,
    },
    /// A connection listed on one side only
    #[error("{shape} lists {target} as connected, but not the other way around")]
    OneSidedConnection {
        /// Shape listing the connection
        shape: ShapeId,
        /// Listed shape
        target: ShapeId,
    },
    /// A reference to a removed shape
    #[error("{shape} references removed shape {target}")]
    DanglingReference {
        /// Shape holding the reference
        shape: ShapeId,
        /// Removed shape
        target: ShapeId,
    },
    /// A shape connected to itself
    #[error("{0} is connected to itself")]
    SelfConnection(ShapeId),
    /// Two connected wires that should have been merged
    #[error("wires {0} and {1} are connected but not merged")]
    UnmergedWires(ShapeId, ShapeId),
}

impl Sketch {
    /// Create an empty sketch
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the number of live shapes
    pub fn nb_shapes(&self) -> usize {
        self.shapes.iter().filter(|s| !s.removed).count()
    }

    /// Return the number of live substrokes
    pub fn nb_substrokes(&self) -> usize {
        self.substrokes.iter().filter(|s| s.shape.is_some()).count()
    }

    /// Iterate over the live shapes, in creation order
    pub fn shape_ids(&self) -> impl Iterator<Item = ShapeId> + '_ {
        self.shapes
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.removed)
            .map(|(i, _)| ShapeId::from_index(i))
    }

    /// Iterate over the live substrokes, in creation order
    pub fn substroke_ids(&self) -> impl Iterator<Item = SubstrokeId> + '_ {
        self.substrokes
            .iter()
            .enumerate()
            .filter(|(_, s)| s.shape.is_some())
            .map(|(i, _)| SubstrokeId::from_index(i))
    }

    /// Returns whether the handle designates a live shape
    pub fn contains(&self, id: ShapeId) -> bool {
        id.index() < self.shapes.len() && !self.shapes[id.index()].removed
    }

    /// Get the shape with a given handle
    pub fn shape(&self, id: ShapeId) -> &Shape {
        assert!(self.contains(id), "Invalid shape {id}");
        &self.shapes[id.index()]
    }

    /// Get the shape with a given handle, for modification of its type and attributes
    pub fn shape_mut(&mut self, id: ShapeId) -> &mut Shape {
        assert!(self.contains(id), "Invalid shape {id}");
        &mut self.shapes[id.index()]
    }

    /// Get the substroke with a given handle
    pub fn substroke(&self, id: SubstrokeId) -> &Substroke {
        assert!(id.index() < self.substrokes.len(), "Invalid substroke {id}");
        &self.substrokes[id.index()]
    }

    /// Set the coarse class of a substroke
    pub fn set_classification(&mut self, id: SubstrokeId, classification: Classification) {
        assert!(id.index() < self.substrokes.len(), "Invalid substroke {id}");
        self.substrokes[id.index()].classification = classification;
    }

    /// Get an endpoint
    pub fn endpoint(&self, e: EndPointId) -> &EndPoint {
        self.substroke(e.substroke).endpoint(e.end)
    }

    /// Shape owning an endpoint
    pub fn owner(&self, e: EndPointId) -> ShapeId {
        match self.substroke(e.substroke).shape {
            Some(s) => s,
            None => panic!("Endpoint {e} belongs to a removed substroke"),
        }
    }

    /// All endpoints of a shape, in substroke order
    pub fn endpoints(&self, shape: ShapeId) -> Vec<EndPointId> {
        self.shapes[shape.index()]
            .substrokes
            .iter()
            .flat_map(|ss| ss.endpoints())
            .collect()
    }

    /// All ink points of a shape
    pub fn points(&self, shape: ShapeId) -> impl Iterator<Item = &Point> + '_ {
        self.shape(shape)
            .substrokes
            .iter()
            .flat_map(|ss| self.substrokes[ss.index()].points.iter())
    }

    /// Bounding box of the ink of a shape
    pub fn bounding_box(&self, shape: ShapeId) -> BoundingBox {
        match BoundingBox::from_points(self.points(shape)) {
            Some(bb) => bb,
            None => panic!("Shape {shape} has no ink"),
        }
    }

    /// Distance from a point to the ink of a shape
    pub fn distance_to_shape(&self, p: Point, shape: ShapeId) -> f64 {
        self.shape(shape)
            .substrokes
            .iter()
            .map(|ss| p.distance_to_polyline(&self.substrokes[ss.index()].points))
            .fold(f64::INFINITY, f64::min)
    }

    /// Smallest distance between the ink of two shapes
    pub fn shape_distance(&self, a: ShapeId, b: ShapeId) -> f64 {
        let d_ab = self
            .points(a)
            .map(|p| self.distance_to_shape(*p, b))
            .fold(f64::INFINITY, f64::min);
        let d_ba = self
            .points(b)
            .map(|p| self.distance_to_shape(*p, a))
            .fold(f64::INFINITY, f64::min);
        d_ab.min(d_ba)
    }

    /// Shape whose ink is closest to a point, if within the radius
    ///
    /// Ties go to the shape created first.
    pub fn shape_at(&self, p: Point, radius: f64) -> Option<ShapeId> {
        self.shape_ids()
            .map(|s| (s, self.distance_to_shape(p, s)))
            .filter(|(_, d)| *d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(s, _)| s)
    }

    /// Common class of the substrokes of a shape; Unknown if they disagree
    pub fn shape_classification(&self, shape: ShapeId) -> Classification {
        let classes: BTreeSet<Classification> = self
            .shape(shape)
            .substrokes
            .iter()
            .map(|ss| self.substrokes[ss.index()].classification)
            .collect();
        let mut it = classes.into_iter();
        match (it.next(), it.next()) {
            (Some(c), None) => c,
            _ => Classification::Unknown,
        }
    }

    /// Add a new shape made of the given strokes
    pub fn add_shape(&mut self, shape_type: ShapeType, strokes: Vec<Vec<Point>>) -> ShapeId {
        assert!(!strokes.is_empty(), "A shape needs at least one substroke");
        let id = ShapeId::from_index(self.shapes.len());
        self.shapes.push(Shape::new(shape_type));
        for points in strokes {
            self.add_substroke(id, points);
        }
        id
    }

    /// Add a new substroke to an existing shape
    pub fn add_substroke(&mut self, shape: ShapeId, points: Vec<Point>) -> SubstrokeId {
        assert!(self.contains(shape), "Invalid shape {shape}");
        let id = SubstrokeId::from_index(self.substrokes.len());
        self.substrokes.push(Substroke::new(points, shape));
        self.shapes[shape.index()].substrokes.push(id);
        id
    }

    /// Change the type, confidence and orientation of a shape
    pub fn relabel(
        &mut self,
        shape: ShapeId,
        shape_type: ShapeType,
        probability: f64,
        orientation: f64,
    ) {
        self.shape_mut(shape)
            .set_type(shape_type, probability, orientation);
    }

    /// Connect an endpoint to a shape
    ///
    /// The destination gets a matching endpoint pointing back, chosen among its free
    /// endpoints closest to the connection, so that the connection is mutual.
    /// A connection previously held by the endpoint is released.
    ///
    /// If the destination has no free endpoint, its closest endpoint is taken over.
    /// The shape that loses its connection to the destination this way is returned;
    /// use [`accepts_connection`](Sketch::accepts_connection) to avoid it.
    pub fn connect(&mut self, e: EndPointId, dest: ShapeId) -> Option<ShapeId> {
        let src = self.owner(e);
        assert!(self.contains(dest), "Invalid shape {dest}");
        assert_ne!(src, dest, "Cannot connect {src} to itself");
        let previous = self.endpoint(e).connected_shape;
        if previous == Some(dest) {
            return None;
        }
        self.set_endpoint(e, Some(dest));
        let mut lost = None;
        if !self.has_link(dest, src) {
            let back = self.closest_endpoint(dest, self.endpoint(e).position);
            let displaced = self.endpoint(back).connected_shape;
            self.set_endpoint(back, Some(src));
            if let Some(d) = displaced {
                self.sync_link(dest, d);
                if !self.shapes[dest.index()].connected.contains(&d) {
                    lost = Some(d);
                }
            }
        }
        self.shapes[src.index()].connected.insert(dest);
        self.shapes[dest.index()].connected.insert(src);
        if let Some(p) = previous {
            self.sync_link(src, p);
        }
        lost
    }

    /// Returns whether a shape has an endpoint that touches nothing
    pub fn has_free_endpoint(&self, shape: ShapeId) -> bool {
        self.endpoints(shape)
            .into_iter()
            .any(|e| self.endpoint(e).connected_shape.is_none())
    }

    /// Returns whether `dest` can be connected to `src` without releasing another connection
    pub fn accepts_connection(&self, dest: ShapeId, src: ShapeId) -> bool {
        self.has_free_endpoint(dest) || self.has_link(dest, src)
    }

    /// Release the connection held by an endpoint
    pub fn disconnect(&mut self, e: EndPointId) {
        let src = self.owner(e);
        if let Some(p) = self.endpoint(e).connected_shape {
            self.set_endpoint(e, None);
            self.sync_link(src, p);
        }
    }

    /// Remove every connection to and from a shape
    pub fn clear_connections(&mut self, shape: ShapeId) {
        let mut neighbours = self.shape(shape).connected.clone();
        neighbours.extend(
            self.endpoints(shape)
                .into_iter()
                .filter_map(|e| self.endpoint(e).connected_shape),
        );
        for n in neighbours {
            self.unlink(shape, n);
        }
    }

    /// Merge a shape into another one
    ///
    /// All substrokes and connections of `absorb` are transferred to `keep`, and
    /// `absorb` is removed. Endpoints that linked the two shapes become free.
    pub fn merge_shapes(&mut self, keep: ShapeId, absorb: ShapeId) -> ShapeId {
        assert!(self.contains(keep), "Invalid shape {keep}");
        assert!(self.contains(absorb), "Invalid shape {absorb}");
        assert_ne!(keep, absorb, "Cannot merge {keep} with itself");

        // Transfer the substrokes
        let moved = std::mem::take(&mut self.shapes[absorb.index()].substrokes);
        for ss in moved {
            self.substrokes[ss.index()].shape = Some(keep);
            self.shapes[keep.index()].substrokes.push(ss);
        }

        // Redirect references to the absorbed shape
        for i in 0..self.shapes.len() {
            let x = ShapeId::from_index(i);
            if x == keep || x == absorb || self.shapes[i].removed {
                continue;
            }
            for e in self.endpoints(x) {
                if self.endpoint(e).connected_shape == Some(absorb) {
                    self.set_endpoint(e, Some(keep));
                }
            }
            if self.shapes[i].connected.remove(&absorb) {
                self.shapes[i].connected.insert(keep);
            }
        }

        // Links between the two halves are now internal
        for e in self.endpoints(keep) {
            let t = self.endpoint(e).connected_shape;
            if t == Some(keep) || t == Some(absorb) {
                self.set_endpoint(e, None);
            }
        }
        let absorbed = std::mem::take(&mut self.shapes[absorb.index()].connected);
        let kept = &mut self.shapes[keep.index()].connected;
        kept.extend(absorbed);
        kept.remove(&keep);
        kept.remove(&absorb);
        self.shapes[absorb.index()].removed = true;

        for n in self.shapes[keep.index()].connected.clone() {
            self.sync_link(keep, n);
        }
        keep
    }

    /// Move a substroke to another shape, or to a new shape if `dest` is None
    ///
    /// The new shape inherits the type of the original one. If the original shape
    /// becomes empty it is removed. Connections that are no longer backed by an
    /// endpoint on both sides are released. Returns the destination shape.
    pub fn move_substroke(&mut self, ss: SubstrokeId, dest: Option<ShapeId>) -> ShapeId {
        let src = match self.substroke(ss).shape {
            Some(s) => s,
            None => panic!("Substroke {ss} was removed"),
        };
        if dest == Some(src) {
            return src;
        }
        let dest = match dest {
            Some(d) => {
                assert!(self.contains(d), "Invalid shape {d}");
                d
            }
            None => {
                let id = ShapeId::from_index(self.shapes.len());
                let original = &self.shapes[src.index()];
                let mut shape = Shape::new(original.shape_type);
                shape.probability = original.probability;
                shape.orientation = original.orientation;
                self.shapes.push(shape);
                id
            }
        };
        self.shapes[src.index()].substrokes.retain(|s| *s != ss);
        self.shapes[dest.index()].substrokes.push(ss);
        self.substrokes[ss.index()].shape = Some(dest);
        if self.shapes[src.index()].substrokes.is_empty() {
            self.destroy_shape(src);
        } else {
            self.resync(src);
        }
        self.resync(dest);
        dest
    }

    /// Remove a substroke from the sketch
    ///
    /// Its shape is removed as well if it becomes empty. Returns the shape that held
    /// the substroke, or None if it was removed.
    pub fn remove_substroke(&mut self, ss: SubstrokeId) -> Option<ShapeId> {
        let src = match self.substroke(ss).shape {
            Some(s) => s,
            None => panic!("Substroke {ss} was already removed"),
        };
        for e in ss.endpoints() {
            self.set_endpoint(e, None);
        }
        self.shapes[src.index()].substrokes.retain(|s| *s != ss);
        self.substrokes[ss.index()].shape = None;
        if self.shapes[src.index()].substrokes.is_empty() {
            self.destroy_shape(src);
            None
        } else {
            self.resync(src);
            Some(src)
        }
    }

    /// Find two distinct wires that are connected to each other
    ///
    /// Shapes are scanned in order, then their endpoints, so the result is
    /// deterministic for a given sketch.
    pub fn connected_wire_pair(&self) -> Option<(ShapeId, ShapeId)> {
        for s in self.shape_ids() {
            if !self.shapes[s.index()].is_wire() {
                continue;
            }
            let is_mergeable = |t: ShapeId| {
                t != s
                    && self.contains(t)
                    && self.shapes[t.index()].is_wire()
                    && self.shapes[t.index()].connected.contains(&s)
            };
            for e in self.endpoints(s) {
                if let Some(t) = self.endpoint(e).connected_shape {
                    if is_mergeable(t) {
                        return Some((s, t));
                    }
                }
            }
            if let Some(t) = self.shapes[s.index()]
                .connected
                .iter()
                .copied()
                .find(|t| is_mergeable(*t))
            {
                return Some((s, t));
            }
        }
        None
    }

    /// List all broken invariants
    pub fn consistency_violations(&self) -> Vec<Violation> {
        let mut ret = Vec::new();
        for (i, ss) in self.substrokes.iter().enumerate() {
            if let Some(owner) = ss.shape {
                let id = SubstrokeId::from_index(i);
                if !self.contains(owner) || !self.shapes[owner.index()].substrokes.contains(&id) {
                    ret.push(Violation::OwnerMismatch {
                        substroke: id,
                        shape: owner,
                    });
                }
            }
        }
        for s in self.shape_ids() {
            let shape = &self.shapes[s.index()];
            if shape.substrokes.is_empty() {
                ret.push(Violation::EmptyShape(s));
            }
            for ss in &shape.substrokes {
                if self.substrokes[ss.index()].shape != Some(s) {
                    ret.push(Violation::OwnerMismatch {
                        substroke: *ss,
                        shape: s,
                    });
                }
            }
            for e in self.endpoints(s) {
                if let Some(t) = self.endpoint(e).connected_shape {
                    if t == s {
                        ret.push(Violation::SelfConnection(s));
                    } else if !self.contains(t) {
                        ret.push(Violation::DanglingReference {
                            shape: s,
                            target: t,
                        });
                    } else if !shape.connected.contains(&t) {
                        ret.push(Violation::EndpointNotListed {
                            shape: s,
                            endpoint: e,
                            target: t,
                        });
                    }
                }
            }
            for t in &shape.connected {
                let t = *t;
                if t == s {
                    ret.push(Violation::SelfConnection(s));
                } else if !self.contains(t) {
                    ret.push(Violation::DanglingReference {
                        shape: s,
                        target: t,
                    });
                } else {
                    if !self.has_link(s, t) {
                        ret.push(Violation::ConnectionWithoutEndpoint {
                            shape: s,
                            target: t,
                        });
                    }
                    if !self.shapes[t.index()].connected.contains(&s) {
                        ret.push(Violation::OneSidedConnection {
                            shape: s,
                            target: t,
                        });
                    }
                    if s < t && shape.is_wire() && self.shapes[t.index()].is_wire() {
                        ret.push(Violation::UnmergedWires(s, t));
                    }
                }
            }
        }
        ret
    }

    /// Check consistency of the datastructure
    pub fn check(&self) {
        let violations = self.consistency_violations();
        assert!(
            violations.is_empty(),
            "Inconsistent sketch: {}",
            violations.iter().join("; ")
        );
    }

    /// Returns whether an endpoint of `a` touches `b`
    fn has_link(&self, a: ShapeId, b: ShapeId) -> bool {
        self.endpoints(a)
            .into_iter()
            .any(|e| self.endpoint(e).connected_shape == Some(b))
    }

    fn set_endpoint(&mut self, e: EndPointId, target: Option<ShapeId>) {
        self.substrokes[e.substroke.index()].endpoints[e.end.index()].connected_shape = target;
    }

    /// Endpoint of a shape closest to a position, preferring free endpoints
    fn closest_endpoint(&self, shape: ShapeId, position: Point) -> EndPointId {
        let ret = self.endpoints(shape).into_iter().min_by(|a, b| {
            let ea = self.endpoint(*a);
            let eb = self.endpoint(*b);
            ea.connected_shape
                .is_some()
                .cmp(&eb.connected_shape.is_some())
                .then(
                    ea.position
                        .distance(position)
                        .total_cmp(&eb.position.distance(position)),
                )
        });
        match ret {
            Some(e) => e,
            None => panic!("Shape {shape} has no endpoint"),
        }
    }

    /// Keep a connection only if it is backed by endpoints on both sides
    fn sync_link(&mut self, a: ShapeId, b: ShapeId) {
        if a == b {
            return;
        }
        if self.contains(a) && self.contains(b) && self.has_link(a, b) && self.has_link(b, a) {
            self.shapes[a.index()].connected.insert(b);
            self.shapes[b.index()].connected.insert(a);
        } else {
            self.unlink(a, b);
        }
    }

    /// Remove any connection between two shapes
    fn unlink(&mut self, a: ShapeId, b: ShapeId) {
        for (x, y) in [(a, b), (b, a)] {
            for e in self.endpoints(x) {
                if self.endpoint(e).connected_shape == Some(y) {
                    self.set_endpoint(e, None);
                }
            }
            self.shapes[x.index()].connected.remove(&y);
        }
    }

    /// Drop invalid endpoint links of a shape and resynchronize its connections
    fn resync(&mut self, shape: ShapeId) {
        let mut candidates = self.shapes[shape.index()].connected.clone();
        for e in self.endpoints(shape) {
            if let Some(t) = self.endpoint(e).connected_shape {
                if t == shape || !self.contains(t) {
                    self.set_endpoint(e, None);
                } else {
                    candidates.insert(t);
                }
            }
        }
        for c in candidates {
            self.sync_link(shape, c);
        }
    }

    /// Remove an empty shape and every reference to it
    fn destroy_shape(&mut self, shape: ShapeId) {
        debug_assert!(self.shapes[shape.index()].substrokes.is_empty());
        for i in 0..self.shapes.len() {
            if self.shapes[i].removed || i == shape.index() {
                continue;
            }
            for e in self.endpoints(ShapeId::from_index(i)) {
                if self.endpoint(e).connected_shape == Some(shape) {
                    self.set_endpoint(e, None);
                }
            }
            self.shapes[i].connected.remove(&shape);
        }
        let s = &mut self.shapes[shape.index()];
        s.connected.clear();
        s.removed = true;
    }
}

impl fmt::Display for Sketch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Sketch with {} shapes, {} substrokes:",
            self.nb_shapes(),
            self.nb_substrokes()
        )?;
        for s in self.shape_ids() {
            let shape = self.shape(s);
            write!(f, "\t{} = {}", s, shape.shape_type())?;
            if let Some(name) = shape.name() {
                write!(f, " \"{name}\"")?;
            }
            write!(f, " [{}]", shape.substrokes().iter().join(", "))?;
            if !shape.connected_shapes().is_empty() {
                write!(f, " -> {}", shape.connected_shapes().iter().join(", "))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::sketch::{Point, ShapeType, Sketch, Violation};

    fn line(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Point> {
        vec![Point::new(x0, y0), Point::new(x1, y1)]
    }

    #[test]
    fn test_basic() {
        let mut sketch = Sketch::new();
        let a = sketch.add_shape(ShapeType::WIRE, vec![line(0.0, 0.0, 10.0, 0.0)]);
        let g = sketch.add_shape(
            ShapeType::AND,
            vec![line(10.0, -5.0, 10.0, 5.0), line(10.0, -5.0, 20.0, 0.0)],
        );
        assert_eq!(sketch.nb_shapes(), 2);
        assert_eq!(sketch.nb_substrokes(), 3);
        assert_eq!(sketch.endpoints(g).len(), 4);
        assert!(sketch.shape(a).is_wire());
        assert!(sketch.shape(g).is_gate());
        assert_eq!(sketch.distance_to_shape(Point::new(10.0, 0.0), g), 0.0);
        assert_eq!(sketch.shape_distance(a, g), 0.0);
        assert_eq!(sketch.shape_at(Point::new(3.0, 1.0), 2.0), Some(a));
        assert_eq!(sketch.shape_at(Point::new(3.0, 8.0), 2.0), None);
        sketch.check();
    }

    #[test]
    fn test_connect_is_mutual() {
        let mut sketch = Sketch::new();
        let a = sketch.add_shape(ShapeType::WIRE, vec![line(0.0, 0.0, 10.0, 0.0)]);
        let g = sketch.add_shape(ShapeType::NOT, vec![line(11.0, -5.0, 11.0, 5.0)]);
        let ss = sketch.shape(a).substrokes()[0];
        sketch.connect(ss.stop(), g);
        assert!(sketch.shape(a).connected_shapes().contains(&g));
        assert!(sketch.shape(g).connected_shapes().contains(&a));
        sketch.check();

        // Connecting twice changes nothing
        let before = sketch.clone();
        sketch.connect(ss.stop(), g);
        assert_eq!(sketch, before);

        sketch.disconnect(ss.stop());
        assert!(sketch.shape(a).connected_shapes().is_empty());
        assert!(sketch.shape(g).connected_shapes().is_empty());
        sketch.check();
    }

    #[test]
    fn test_connect_to_full_shape() {
        let mut sketch = Sketch::new();
        let w = sketch.add_shape(ShapeType::WIRE, vec![line(0.0, 0.0, 20.0, 0.0)]);
        let g0 = sketch.add_shape(ShapeType::NOT, vec![line(-1.0, -5.0, -1.0, 5.0)]);
        let g1 = sketch.add_shape(ShapeType::NOT, vec![line(21.0, -5.0, 21.0, 5.0)]);
        let l = sketch.add_shape(ShapeType::LABEL, vec![line(12.0, 1.0, 14.0, 5.0)]);
        let ss = sketch.shape(w).substrokes()[0];
        assert_eq!(sketch.connect(ss.start(), g0), None);
        assert_eq!(sketch.connect(ss.stop(), g1), None);
        assert!(!sketch.has_free_endpoint(w));
        assert!(sketch.accepts_connection(w, g0));
        assert!(!sketch.accepts_connection(w, l));
        assert!(sketch.accepts_connection(l, w));

        // Both ends of the wire are in use: the closest one is taken over
        let e = sketch.shape(l).substrokes()[0].start();
        assert_eq!(sketch.connect(e, w), Some(g1));
        assert!(sketch.shape(w).connected_shapes().contains(&l));
        assert!(sketch.shape(g1).connected_shapes().is_empty());
        sketch.check();
    }

    #[test]
    fn test_reconnect_releases_previous() {
        let mut sketch = Sketch::new();
        let w = sketch.add_shape(ShapeType::WIRE, vec![line(0.0, 0.0, 10.0, 0.0)]);
        let g0 = sketch.add_shape(ShapeType::NOT, vec![line(11.0, -5.0, 11.0, 5.0)]);
        let g1 = sketch.add_shape(ShapeType::NOT, vec![line(11.0, 10.0, 11.0, 15.0)]);
        let ss = sketch.shape(w).substrokes()[0];
        sketch.connect(ss.stop(), g0);
        sketch.connect(ss.stop(), g1);
        assert!(!sketch.shape(w).connected_shapes().contains(&g0));
        assert!(sketch.shape(g0).connected_shapes().is_empty());
        assert!(sketch.shape(w).connected_shapes().contains(&g1));
        sketch.check();
    }

    #[test]
    fn test_merge() {
        let mut sketch = Sketch::new();
        let w0 = sketch.add_shape(ShapeType::WIRE, vec![line(0.0, 0.0, 10.0, 0.0)]);
        let w1 = sketch.add_shape(ShapeType::WIRE, vec![line(10.0, 0.0, 20.0, 0.0)]);
        let g = sketch.add_shape(ShapeType::NOT, vec![line(21.0, -5.0, 21.0, 5.0)]);
        let s0 = sketch.shape(w0).substrokes()[0];
        let s1 = sketch.shape(w1).substrokes()[0];
        sketch.connect(s0.stop(), w1);
        sketch.connect(s1.stop(), g);
        assert_eq!(sketch.connected_wire_pair(), Some((w0, w1)));
        assert!(sketch
            .consistency_violations()
            .contains(&Violation::UnmergedWires(w0, w1)));

        sketch.merge_shapes(w0, w1);
        assert!(!sketch.contains(w1));
        assert_eq!(sketch.nb_shapes(), 2);
        assert_eq!(sketch.shape(w0).substrokes(), &[s0, s1]);
        assert!(sketch.shape(w0).connected_shapes().contains(&g));
        assert!(sketch.shape(g).connected_shapes().contains(&w0));
        assert_eq!(sketch.connected_wire_pair(), None);
        sketch.check();
    }

    #[test]
    fn test_move_and_remove() {
        let mut sketch = Sketch::new();
        let g = sketch.add_shape(
            ShapeType::AND,
            vec![line(0.0, 0.0, 0.0, 10.0), line(0.0, 0.0, 10.0, 5.0)],
        );
        let ss = sketch.shape(g).substrokes().to_vec();
        let n = sketch.move_substroke(ss[1], None);
        assert_ne!(n, g);
        assert_eq!(sketch.shape(n).shape_type(), ShapeType::AND);
        assert_eq!(sketch.shape(g).substrokes(), &ss[..1]);
        sketch.check();

        // Moving the last substroke back removes the new shape
        assert_eq!(sketch.move_substroke(ss[1], Some(g)), g);
        assert!(!sketch.contains(n));
        sketch.check();

        assert_eq!(sketch.remove_substroke(ss[0]), Some(g));
        assert_eq!(sketch.remove_substroke(ss[1]), None);
        assert!(!sketch.contains(g));
        assert_eq!(sketch.nb_shapes(), 0);
        assert_eq!(sketch.nb_substrokes(), 0);
        sketch.check();
    }

    #[test]
    fn test_remove_clears_references() {
        let mut sketch = Sketch::new();
        let w = sketch.add_shape(ShapeType::WIRE, vec![line(0.0, 0.0, 10.0, 0.0)]);
        let l = sketch.add_shape(ShapeType::LABEL, vec![line(11.0, 0.0, 12.0, 2.0)]);
        let ss = sketch.shape(w).substrokes()[0];
        sketch.connect(ss.stop(), l);
        let label_stroke = sketch.shape(l).substrokes()[0];
        sketch.remove_substroke(label_stroke);
        assert!(!sketch.contains(l));
        assert!(sketch.shape(w).connected_shapes().is_empty());
        assert_eq!(sketch.endpoint(ss.stop()).connected_shape(), None);
        sketch.check();
    }

    #[test]
    #[should_panic]
    fn test_self_connection() {
        let mut sketch = Sketch::new();
        let w = sketch.add_shape(ShapeType::WIRE, vec![line(0.0, 0.0, 10.0, 0.0)]);
        let ss = sketch.shape(w).substrokes()[0];
        sketch.connect(ss.stop(), w);
    }
}
