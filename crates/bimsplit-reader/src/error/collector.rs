//! Accumulator for diagnostics produced during a read.

use log::warn;

use super::{Diagnostic, ParseError};

/// Collects diagnostics across the read so that a single malformed
/// statement does not abort an otherwise readable file.
#[derive(Debug, Default)]
pub(crate) struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records a diagnostic. Warnings are also logged immediately.
    pub(crate) fn push(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity().is_warning() {
            warn!(code:? = diagnostic.code(); "{}", diagnostic.message());
        }
        self.diagnostics.push(diagnostic);
    }

    /// Returns whether any error-severity diagnostic was recorded.
    pub(crate) fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity().is_error())
    }

    /// Consumes the collector into a [`ParseError`] holding the
    /// error-severity diagnostics.
    pub(crate) fn into_error(self) -> ParseError {
        ParseError::new(
            self.diagnostics
                .into_iter()
                .filter(|d| d.severity().is_error())
                .collect(),
        )
    }

    /// Consumes the collector into the warning-severity diagnostics.
    pub(crate) fn into_warnings(self) -> Vec<Diagnostic> {
        self.diagnostics
            .into_iter()
            .filter(|d| d.severity().is_warning())
            .collect()
    }
}
