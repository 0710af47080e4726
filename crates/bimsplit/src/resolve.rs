//! The identity resolver.
//!
//! Scene hosts attach the model element identifier to nodes in several
//! inconsistent places, depending on importer version and import mode. This
//! module reconciles them: [`resolve_node`] returns the local identifier a
//! node represents, or `None` when the node is unresolved.
//!
//! The strategies form an ordered chain of pure lookups, each tried only
//! when the previous one yields nothing:
//!
//! 1. Typed identifier field on the node itself
//! 2. Typed identifier field on the parent
//! 3. Loose `ifc_definition_id` attribute on the node
//! 4. Loose `ifc_definition_id` attribute on the parent
//! 5. Trailing numeric name suffix (`...:1054501` or `.../1054501`), on the
//!    node's own name and then on the parent's name
//!
//! Resolution is idempotent and side-effect-free; strategies never write to
//! the document.

use bimsplit_core::{
    identifier::LocalId,
    scene::{NodeId, SceneDocument},
};

/// Attribute key under which importers stash the identifier loosely.
pub const ID_ATTRIBUTE: &str = "ifc_definition_id";

/// One lookup strategy of the resolution chain.
type Strategy = fn(&SceneDocument, NodeId) -> Option<LocalId>;

/// The resolution chain, in priority order.
const STRATEGIES: &[Strategy] = &[
    typed_on_node,
    typed_on_parent,
    attribute_on_node,
    attribute_on_parent,
    name_suffix_on_node_or_parent,
];

/// Resolves the local identifier a scene node represents.
///
/// Tries each strategy in chain order; the first success wins. Returns
/// `None` when every strategy fails, in which case the node belongs to no
/// category.
pub fn resolve_node(doc: &SceneDocument, id: NodeId) -> Option<LocalId> {
    STRATEGIES.iter().find_map(|strategy| strategy(doc, id))
}

/// Picks the node that stands in for `id` at export time.
///
/// An identified container usually carries no geometry itself; the
/// exportable representative is the first mesh-bearing node in its
/// subtree. Returns `None` when the subtree holds no geometry at all.
pub fn exportable_representative(doc: &SceneDocument, id: NodeId) -> Option<NodeId> {
    doc.mesh_descendant(id)
}

fn typed_on_node(doc: &SceneDocument, id: NodeId) -> Option<LocalId> {
    doc.node(id)?.element_id()
}

fn typed_on_parent(doc: &SceneDocument, id: NodeId) -> Option<LocalId> {
    let parent = doc.node(id)?.parent()?;
    doc.node(parent)?.element_id()
}

fn attribute_on_node(doc: &SceneDocument, id: NodeId) -> Option<LocalId> {
    doc.node(id)?.attribute(ID_ATTRIBUTE)?.as_local_id()
}

fn attribute_on_parent(doc: &SceneDocument, id: NodeId) -> Option<LocalId> {
    let parent = doc.node(id)?.parent()?;
    doc.node(parent)?.attribute(ID_ATTRIBUTE)?.as_local_id()
}

fn name_suffix_on_node_or_parent(doc: &SceneDocument, id: NodeId) -> Option<LocalId> {
    let node = doc.node(id)?;
    if let Some(found) = name_suffix_id(node.name()) {
        return Some(found);
    }
    let parent = node.parent()?;
    name_suffix_id(doc.node(parent)?.name())
}

/// Parses a trailing numeric identifier out of a node name.
///
/// The identifier must be preceded by `:` or `/` and run to the very end
/// of the string, e.g. `IfcPipeSegment/ColdWater:1054501`.
fn name_suffix_id(name: &str) -> Option<LocalId> {
    let delimiter = name.rfind([':', '/'])?;
    let suffix = &name[delimiter + 1..];
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse::<u64>().ok().map(LocalId::new)
}
