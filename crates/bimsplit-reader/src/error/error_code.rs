//! Error codes for the reader diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - File structure errors
//! - `E1xx` - Statement errors
//! - `E2xx` - Reference resolution errors

use std::fmt;

/// Error codes for categorizing diagnostic findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // File structure errors (E0xx)
    // =========================================================================
    /// Missing DATA section.
    ///
    /// A STEP file must contain a `DATA; ... ENDSEC;` section holding the
    /// entity instances. Without it there is nothing to read.
    E001,

    /// Unterminated DATA section.
    ///
    /// The `DATA;` keyword was found but no matching `ENDSEC;` follows.
    E002,

    // =========================================================================
    // Statement errors (E1xx)
    // =========================================================================
    /// Unterminated string literal.
    ///
    /// A STEP string was opened with `'` but never closed. Note that a
    /// literal quote inside a string is written as `''`.
    E100,

    /// Malformed entity statement.
    ///
    /// The statement does not match `#id = ENTITY(args);`. The statement is
    /// skipped and reading continues at the next `;`.
    E101,

    /// Duplicate entity identifier.
    ///
    /// Two statements define the same `#id`. The later definition wins.
    E102,

    // =========================================================================
    // Reference resolution errors (E2xx)
    // =========================================================================
    /// Dangling entity reference.
    ///
    /// A placement chain refers to an instance id that is not defined in the
    /// file. The chain is truncated at that point.
    E200,

    /// Cyclic placement chain.
    ///
    /// Relative placements form a cycle; traversal stops where the cycle
    /// closes.
    E201,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
