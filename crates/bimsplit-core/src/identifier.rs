//! Identifier types for model elements.
//!
//! A building model carries two unrelated identifier schemes and this module
//! keeps them apart at the type level:
//!
//! - [`GlobalId`] — the stable string identifier assigned by the authoring
//!   tool, unique within a model and stable across reloads.
//! - [`LocalId`] — the numeric identifier of one entity instance inside a
//!   single loaded session. It is *not* stable across reloads and must never
//!   be persisted as a key.
//!
//! Entity-class tags ([`EntityClass`]) are interned: models repeat the same
//! few dozen tags across thousands of elements, so tags are stored once and
//! compared as symbols.

use std::{
    fmt,
    sync::{Mutex, OnceLock},
};

use serde::{Deserialize, Serialize};
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner shared by [`EntityClass`] and
/// [`crate::category::Category`].
///
/// # Thread Safety
///
/// Uses `Mutex` for thread-safe access to the interner.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

/// Intern a string and return its symbol.
pub(crate) fn intern(name: &str) -> DefaultSymbol {
    let mut interner = INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock");
    interner.get_or_intern(name)
}

/// Resolve a symbol back to its string form.
pub(crate) fn resolve(symbol: DefaultSymbol) -> String {
    let interner = INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock");
    interner
        .resolve(symbol)
        .expect("Symbol was interned by this process")
        .to_string()
}

/// Stable global identifier of a model element.
///
/// Globally unique within one model file and stable across reloads of that
/// file. Used as the manifest key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GlobalId(String);

impl GlobalId {
    /// Creates a `GlobalId` from its string form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for GlobalId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Local numeric identifier of an entity within one loaded session.
///
/// Valid only for the lifetime of the session that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocalId(u64);

impl LocalId {
    /// Creates a `LocalId` from its numeric value.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the numeric value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for LocalId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Interned entity-class tag, e.g. `IfcWall` or `IfcPipeSegment`.
///
/// Tags are normalized to uppercase on creation so that the STEP file
/// spelling (`IFCWALL`) and the conventional mixed-case spelling (`IfcWall`)
/// compare equal.
///
/// # Examples
///
/// ```
/// use bimsplit_core::identifier::EntityClass;
///
/// let a = EntityClass::new("IfcWall");
/// let b = EntityClass::new("IFCWALL");
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityClass(DefaultSymbol);

impl EntityClass {
    /// Creates an `EntityClass` from a tag string.
    ///
    /// # Arguments
    ///
    /// * `tag` - The entity-class tag in any casing
    pub fn new(tag: &str) -> Self {
        Self(intern(&tag.to_ascii_uppercase()))
    }

    /// Returns the normalized (uppercase) tag.
    pub fn as_string(&self) -> String {
        resolve(self.0)
    }
}

impl fmt::Display for EntityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

impl From<&str> for EntityClass {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}
