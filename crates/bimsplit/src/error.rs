//! Error types for split operations.
//!
//! This module provides the main error type [`SplitError`] which wraps
//! the error conditions that can abort a run.
//!
//! Note that most failures during a run are *not* represented here:
//! element-, node- and category-level problems are logged and skipped at
//! their own granularity. `SplitError` covers the fatal surface only, an
//! unreadable input and output-directory I/O.

use std::io;

use thiserror::Error;

use bimsplit_core::scene::SceneError;
use bimsplit_reader::error::ParseError;

/// The main error type for split operations.
///
/// # Diagnostic Variants
///
/// The `Read` variant carries structured reader diagnostics together with
/// the source text, enabling rich error reporting with source snippets.
#[derive(Debug, Error)]
pub enum SplitError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Read { err: ParseError, src: String },

    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error>),
}

impl SplitError {
    /// Create a new `Read` error with the associated source text.
    pub fn new_read_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Read {
            err,
            src: src.into(),
        }
    }
}

impl From<crate::export::ExportError> for SplitError {
    fn from(error: crate::export::ExportError) -> Self {
        Self::Export(Box::new(error))
    }
}
