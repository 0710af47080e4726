//! # Bimsplit Reader
//!
//! IFC/STEP model reader for the bimsplit discipline splitter. This crate
//! provides the reading pipeline from a STEP physical file to the semantic
//! model view consumed by the engine.
//!
//! The reader is deliberately schema-less: it understands the STEP instance
//! syntax and the stable attribute layout of rooted IFC entities, which is
//! all the splitter needs (identifiers, names, class tags, predefined
//! subtypes, and approximate placements for proxy geometry).
//!
//! ## Usage
//!
//! ```
//! # use bimsplit_reader::parse;
//! # use bimsplit_core::model::ModelSession;
//! let source = r#"
//! DATA;
//! #1 = IFCWALL('2O2Fr$t4X7Zf8NOew3FLOH', $, 'Basic Wall', $, $, $, $, $);
//! ENDSEC;
//! "#;
//!
//! let model = parse(source, "model.ifc").expect("readable file");
//! assert_eq!(model.all_elements().len(), 1);
//! ```

pub mod error;

mod model;
mod parser;
mod span;

pub use model::StepModel;
pub use span::Span;

use std::{fs, io, path::Path};

use log::info;
use thiserror::Error;

use error::{DiagnosticCollector, ParseError};

/// Error type for [`open`]: the file was unreadable or unparseable.
///
/// Both conditions are fatal per the run's error taxonomy — they surface
/// before any classification work begins.
#[derive(Debug, Error)]
pub enum OpenError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Parse(#[from] ParseError),
}

/// Parse STEP source text into a model view.
///
/// This is the main entry point for in-memory parsing. It orchestrates the
/// reading pipeline:
///
/// 1. **Scan** - Locate the DATA section and parse entity statements
/// 2. **Build** - Extract product elements and placement origins
///
/// Malformed statements are skipped with warnings (available via
/// [`StepModel::warnings`]); only structural problems fail the read.
///
/// # Arguments
///
/// * `source` - STEP file content
/// * `file_name` - Base name recorded in run statistics
///
/// # Errors
///
/// Returns [`ParseError`] when the source has no parseable DATA section.
pub fn parse(source: &str, file_name: &str) -> Result<StepModel, ParseError> {
    let mut collector = DiagnosticCollector::new();
    let entities = parser::parse_data(source, &mut collector);

    if collector.has_errors() {
        return Err(collector.into_error());
    }

    info!(file = file_name, entities = entities.len(); "Parsed DATA section");
    Ok(StepModel::build(file_name, entities, collector))
}

/// Open and parse a STEP file from disk.
///
/// # Errors
///
/// Returns [`OpenError::Io`] when the file cannot be read and
/// [`OpenError::Parse`] when it cannot be parsed.
pub fn open(path: impl AsRef<Path>) -> Result<StepModel, OpenError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    Ok(parse(&source, &file_name)?)
}
