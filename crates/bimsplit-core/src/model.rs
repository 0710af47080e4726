//! Model element types and the session abstraction.
//!
//! A [`ModelElement`] is the read-only semantic view of one entity parsed
//! from the source building-model file. A [`ModelSession`] is the boundary
//! trait behind which the concrete reader lives; the engine only ever
//! enumerates elements and looks them up by local identifier.
//!
//! # Pipeline Position
//!
//! ```text
//! Source file
//!     ↓ reader
//! ModelSession / ModelElement (these types) - read-only semantic view
//!     ↓ classify
//! Category assignment
//!     ↓ partition + resolve
//! Node groups per category
//!     ↓ export
//! Per-category GLB + manifests + statistics
//! ```

use crate::identifier::{EntityClass, GlobalId, LocalId};

/// One semantic entity of the loaded building model.
///
/// Elements are created by the reader and never mutated afterwards. Optional
/// attributes are genuinely optional in real models: unnamed elements and
/// untyped elements are common.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelElement {
    /// Session-local numeric identifier.
    local_id: LocalId,

    /// Stable global identifier.
    global_id: GlobalId,

    /// Entity-class tag, e.g. `IfcWall`.
    entity_class: EntityClass,

    /// Display name, when the authoring tool recorded one.
    name: Option<String>,

    /// Object-type / family name.
    object_type: Option<String>,

    /// Predefined subtype, only meaningful for generic flow segments.
    predefined_type: Option<String>,
}

impl ModelElement {
    /// Creates an element with the mandatory attributes.
    pub fn new(local_id: LocalId, global_id: GlobalId, entity_class: EntityClass) -> Self {
        Self {
            local_id,
            global_id,
            entity_class,
            name: None,
            object_type: None,
            predefined_type: None,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the object-type / family name.
    pub fn with_object_type(mut self, object_type: impl Into<String>) -> Self {
        self.object_type = Some(object_type.into());
        self
    }

    /// Sets the predefined subtype.
    pub fn with_predefined_type(mut self, predefined_type: impl Into<String>) -> Self {
        self.predefined_type = Some(predefined_type.into());
        self
    }

    /// Returns the session-local identifier.
    pub fn local_id(&self) -> LocalId {
        self.local_id
    }

    /// Returns the stable global identifier.
    pub fn global_id(&self) -> &GlobalId {
        &self.global_id
    }

    /// Returns the entity-class tag.
    pub fn entity_class(&self) -> EntityClass {
        self.entity_class
    }

    /// Returns the display name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the object-type name, if any.
    pub fn object_type(&self) -> Option<&str> {
        self.object_type.as_deref()
    }

    /// Returns the predefined subtype, if any.
    pub fn predefined_type(&self) -> Option<&str> {
        self.predefined_type.as_deref()
    }
}

/// Read access to one loaded model.
///
/// Implemented by the bundled STEP reader and by in-memory fixtures in
/// tests. The engine treats a session as immutable for the duration of a
/// run.
pub trait ModelSession {
    /// The base name of the source file, used in run statistics.
    fn file_name(&self) -> &str;

    /// All product elements of the model, in file order.
    fn all_elements(&self) -> &[ModelElement];

    /// Looks up one element by its session-local identifier.
    fn element_by_id(&self, id: LocalId) -> Option<&ModelElement>;
}

/// A trivial in-memory session, useful for tests and for callers that build
/// elements from another source.
#[derive(Debug, Default)]
pub struct MemorySession {
    file_name: String,
    elements: Vec<ModelElement>,
}

impl MemorySession {
    /// Creates a session from a file name and element list.
    pub fn new(file_name: impl Into<String>, elements: Vec<ModelElement>) -> Self {
        Self {
            file_name: file_name.into(),
            elements,
        }
    }
}

impl ModelSession for MemorySession {
    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn all_elements(&self) -> &[ModelElement] {
        &self.elements
    }

    fn element_by_id(&self, id: LocalId) -> Option<&ModelElement> {
        self.elements.iter().find(|e| e.local_id() == id)
    }
}
