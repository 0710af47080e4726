//! Labeled source spans for diagnostics.

use crate::span::Span;

/// A message attached to a span of the source file.
#[derive(Debug, Clone)]
pub struct Label {
    span: Span,
    message: String,
    primary: bool,
}

impl Label {
    /// Creates a primary label.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            primary: true,
        }
    }

    /// Creates a secondary label.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            primary: false,
        }
    }

    /// Returns the labeled span.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Returns the label message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns whether this is the primary label of its diagnostic.
    pub fn is_primary(&self) -> bool {
        self.primary
    }
}
