use crate::recognition::{RecognitionResult, Recognizer};
use crate::sketch::{Classification, ShapeId, ShapeType, Sketch};

/// Simple descriptors of the ink of a shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeFeatures {
    /// Number of substrokes
    pub nb_substrokes: usize,
    /// Width over height of the bounding box
    pub aspect_ratio: f64,
    /// Total ink length over the bounding box perimeter
    pub ink_ratio: f64,
}

impl ShapeFeatures {
    /// Compute the features of a shape
    pub fn of(shape: ShapeId, sketch: &Sketch) -> ShapeFeatures {
        let bb = sketch.bounding_box(shape);
        let (w, h) = (bb.width().max(1e-6), bb.height().max(1e-6));
        let length: f64 = sketch
            .shape(shape)
            .substrokes()
            .iter()
            .map(|ss| sketch.substroke(*ss).length())
            .sum();
        ShapeFeatures {
            nb_substrokes: sketch.shape(shape).substrokes().len(),
            aspect_ratio: w / h,
            ink_ratio: length / (2.0 * (w + h)),
        }
    }

    /// Dissimilarity between two feature vectors
    pub fn distance(&self, other: &ShapeFeatures) -> f64 {
        (self.nb_substrokes as f64 - other.nb_substrokes as f64).abs()
            + (self.aspect_ratio.ln() - other.aspect_ratio.ln()).abs()
            + (self.ink_ratio - other.ink_ratio).abs()
    }
}

/// Nearest-neighbour gate recognizer, trained online from confirmed examples
///
/// Wires and labels are recognized from their class alone. Gates get the type of the
/// closest learnt example, with a confidence decreasing with the distance; without
/// examples they stay unknown.
#[derive(Debug, Clone, Default)]
pub struct TemplateRecognizer {
    templates: Vec<(ShapeFeatures, ShapeType)>,
}

impl TemplateRecognizer {
    /// Create an untrained recognizer
    pub fn new() -> TemplateRecognizer {
        TemplateRecognizer::default()
    }

    /// Number of learnt examples
    pub fn nb_templates(&self) -> usize {
        self.templates.len()
    }
}

impl Recognizer for TemplateRecognizer {
    fn can_recognize(&self, classification: Classification) -> bool {
        classification != Classification::Unknown
    }

    fn recognize(&self, shape: ShapeId, sketch: &Sketch) -> RecognitionResult {
        match sketch.shape_classification(shape) {
            Classification::Wire => RecognitionResult::new(ShapeType::WIRE, 1.0, 0.0),
            Classification::Text => RecognitionResult::new(ShapeType::LABEL, 1.0, 0.0),
            Classification::Unknown => RecognitionResult::new(ShapeType::UNKNOWN, 0.0, 0.0),
            Classification::Gate => {
                let features = ShapeFeatures::of(shape, sketch);
                let best = self
                    .templates
                    .iter()
                    .map(|(f, t)| (features.distance(f), *t))
                    .min_by(|a, b| a.0.total_cmp(&b.0));
                match best {
                    Some((d, t)) => RecognitionResult::new(t, 1.0 / (1.0 + d), 0.0),
                    None => RecognitionResult::new(ShapeType::UNKNOWN, 0.0, 0.0),
                }
            }
        }
    }

    fn learn(&mut self, shape: ShapeId, sketch: &Sketch, shape_type: ShapeType) {
        if shape_type.is_gate() {
            self.templates.push((ShapeFeatures::of(shape, sketch), shape_type));
        }
    }

    fn reset(&mut self) {
        self.templates.clear();
    }
}
