//! Discipline category labels.
//!
//! A [`Category`] is one bucket of the discipline partition ("ducts",
//! "pipes", "walls", ...). The label set is configuration data, not a fixed
//! enum: deployments disagree on taxonomy (doors and windows may be merged,
//! "others" may be suppressed), so labels are interned strings and the rules
//! engine receives the full table from configuration.

use std::fmt;

use string_interner::DefaultSymbol;

use crate::identifier::{intern, resolve};

/// An interned discipline label.
///
/// Cheap to copy and compare; the same label string always yields the same
/// `Category` value within a process.
///
/// # Examples
///
/// ```
/// use bimsplit_core::category::Category;
///
/// let ducts = Category::new("ducts");
/// assert_eq!(ducts, Category::new("ducts"));
/// assert_eq!(ducts.as_string(), "ducts");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Category(DefaultSymbol);

impl Category {
    /// Creates a `Category` from a label string.
    pub fn new(label: &str) -> Self {
        Self(intern(label))
    }

    /// The conventional fallback label for unmatched elements.
    pub fn others() -> Self {
        Self::new("others")
    }

    /// Returns the label as an owned string.
    pub fn as_string(&self) -> String {
        resolve(self.0)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

impl From<&str> for Category {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_label_same_category() {
        assert_eq!(Category::new("pipes"), Category::new("pipes"));
        assert_ne!(Category::new("pipes"), Category::new("ducts"));
        assert_eq!(Category::others().as_string(), "others");
    }
}
