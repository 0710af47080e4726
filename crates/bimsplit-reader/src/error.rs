//! Error and diagnostic system for the STEP reader.
//!
//! This module provides an error handling system with:
//! - Error codes for documentation and searchability
//! - Labeled spans for rich error context
//! - Severity levels
//! - Diagnostic collector for accumulating multiple findings
//!
//! # Overview
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single error or warning with optional error code, source locations, and
//! help text. Error-severity diagnostics are wrapped in [`ParseError`] and
//! abort the read; warning-severity diagnostics are carried alongside the
//! parsed model, because a single malformed statement must not discard an
//! otherwise readable file.
//!
//! # Example
//!
//! ```
//! # use bimsplit_reader::error::{Diagnostic, ErrorCode};
//! # use bimsplit_reader::Span;
//!
//! let span = Span::new(100..120);
//!
//! let diag = Diagnostic::warning("malformed entity statement")
//!     .with_code(ErrorCode::E101)
//!     .with_label(span, "statement skipped")
//!     .with_help("check the argument list for unbalanced parentheses");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
