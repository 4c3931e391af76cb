//! Classification and recognition of shapes
//!
//! Recognition runs in two stages. A [`StrokeClassifier`] assigns a coarse class to each
//! substroke, then a [`Recognizer`] assigns a concrete type, confidence and orientation to
//! each shape whose substrokes agree on a class. Both stages leave alone the shapes the
//! user has labeled or grouped.

mod template;

use log::info;

use crate::sketch::{Classification, ShapeId, ShapeType, Sketch, SubstrokeId};

pub use template::{ShapeFeatures, TemplateRecognizer};

/// Assigns a coarse class to a substroke
pub trait StrokeClassifier {
    /// Class of a substroke, in the context of the sketch
    fn classify(&self, substroke: SubstrokeId, sketch: &Sketch) -> Classification;
}

impl<F: Fn(SubstrokeId, &Sketch) -> Classification> StrokeClassifier for F {
    fn classify(&self, substroke: SubstrokeId, sketch: &Sketch) -> Classification {
        self(substroke, sketch)
    }
}

/// Type, confidence and orientation proposed for a shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecognitionResult {
    /// Recognized type
    pub shape_type: ShapeType,
    /// Confidence, in [0, 1]
    pub confidence: f64,
    /// Orientation, in radians
    pub orientation: f64,
}

impl RecognitionResult {
    /// Create a result
    pub fn new(shape_type: ShapeType, confidence: f64, orientation: f64) -> RecognitionResult {
        RecognitionResult {
            shape_type,
            confidence,
            orientation,
        }
    }

    /// Write the type, confidence and orientation to a shape
    ///
    /// The orientation of a shape flagged as already oriented is kept.
    pub fn apply(&self, shape: ShapeId, sketch: &mut Sketch) {
        let s = sketch.shape(shape);
        let orientation = if s.flags.already_oriented {
            s.orientation()
        } else {
            self.orientation
        };
        sketch.relabel(shape, self.shape_type, self.confidence, orientation);
    }
}

/// Assigns a concrete type to a shape whose substrokes are classified
pub trait Recognizer {
    /// Returns whether this recognizer handles shapes of the given class
    fn can_recognize(&self, _classification: Classification) -> bool {
        true
    }

    /// Recognize a shape
    fn recognize(&self, shape: ShapeId, sketch: &Sketch) -> RecognitionResult;

    /// Learn from a confirmed example
    fn learn(&mut self, _shape: ShapeId, _sketch: &Sketch, _shape_type: ShapeType) {}

    /// Forget everything learnt
    fn reset(&mut self);
}

/// Classify every substroke of the shapes that are not finalized by the user
///
/// Returns the number of substrokes whose class changed.
pub fn classify_sketch(classifier: &dyn StrokeClassifier, sketch: &mut Sketch) -> usize {
    let substrokes: Vec<SubstrokeId> = sketch
        .shape_ids()
        .filter(|s| !sketch.shape(*s).flags.is_finalized())
        .flat_map(|s| sketch.shape(s).substrokes().to_vec())
        .collect();
    let mut nb_changed = 0;
    for ss in substrokes {
        let c = classifier.classify(ss, sketch);
        if c != sketch.substroke(ss).classification() {
            sketch.set_classification(ss, c);
            nb_changed += 1;
        }
    }
    info!("Classified substrokes, {nb_changed} changed");
    nb_changed
}

/// Recognize every classified shape that is not finalized by the user
///
/// Returns the shapes whose type, confidence or orientation changed.
pub fn recognize_sketch(recognizer: &dyn Recognizer, sketch: &mut Sketch) -> Vec<ShapeId> {
    let shapes: Vec<ShapeId> = sketch
        .shape_ids()
        .filter(|s| !sketch.shape(*s).flags.is_finalized())
        .filter(|s| {
            let c = sketch.shape_classification(*s);
            c != Classification::Unknown && recognizer.can_recognize(c)
        })
        .collect();
    let mut ret = Vec::new();
    for s in shapes {
        let before = sketch.shape(s).clone();
        recognizer.recognize(s, sketch).apply(s, sketch);
        if *sketch.shape(s) != before {
            ret.push(s);
        }
    }
    info!("Recognized shapes, {} changed", ret.len());
    ret
}
