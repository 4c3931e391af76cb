//! Read and write sketches to files

mod json;

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use itertools::Itertools;
use thiserror::Error;

pub use json::{read_sketch, write_sketch};

use crate::sketch::{Sketch, Violation};

/// Error while reading or writing a sketch
#[derive(Debug, Error)]
pub enum IoError {
    /// File access failed
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Malformed JSON
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// File extension not supported
    #[error("unsupported file extension \"{0}\"; expected .json")]
    UnknownExtension(String),
    /// Shape type name not known
    #[error("unknown shape type \"{0}\"")]
    UnknownType(String),
    /// Shape record without substroke
    #[error("shape {0} has no substroke")]
    EmptyShape(usize),
    /// Substroke without point
    #[error("a substroke of shape {0} has no point")]
    EmptySubstroke(usize),
    /// Connection to a shape that is not in the file
    #[error("shape {shape} is connected to shape {target}, which does not exist")]
    InvalidReference {
        /// Shape holding the connection
        shape: usize,
        /// Referenced shape
        target: usize,
    },
    /// Connections that break the sketch invariants
    #[error("inconsistent sketch: {}", .0.iter().join("; "))]
    Inconsistent(Vec<Violation>),
}

fn check_extension(path: &Path) -> Result<(), IoError> {
    match path.extension() {
        Some(ext) if ext == "json" => Ok(()),
        Some(ext) => Err(IoError::UnknownExtension(ext.to_string_lossy().to_string())),
        None => Err(IoError::UnknownExtension(String::new())),
    }
}

/// Read a sketch from a file
///
/// Following extensions are supported: .json
pub fn read_sketch_file(path: &Path) -> Result<Sketch, IoError> {
    check_extension(path)?;
    let f = File::open(path)?;
    read_sketch(BufReader::new(f))
}

/// Write a sketch to a file
///
/// Following extensions are supported: .json
pub fn write_sketch_file(path: &Path, sketch: &Sketch) -> Result<(), IoError> {
    check_extension(path)?;
    let f = File::create(path)?;
    write_sketch(BufWriter::new(f), sketch)
}
