//! The renderable scene document.
//!
//! This module models the concerns the engine needs from a scene host:
//! a flat node store with parent/child links, loosely-typed per-node
//! attributes, a selection set, named collections, and a transient modifier
//! stack per mesh node.
//!
//! The document deliberately mirrors how authoring tools behave rather than
//! how the semantic model is shaped:
//!
//! - node names are neither unique nor informative,
//! - the element identifier may sit on a node, on its parent, in a typed
//!   field or in a loose attribute, or only inside the name string,
//! - renderable geometry may live on a descendant of the identified node.
//!
//! Modifiers are working-state only: [`SceneDocument::effective_mesh`]
//! applies them at read time and stored meshes are never rewritten, so a
//! modifier pushed for one export can be popped afterwards without loss.

use indexmap::{IndexMap, IndexSet};
use log::trace;
use thiserror::Error;

use crate::identifier::LocalId;

/// Errors for scene document operations.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("unknown scene node: {0:?}")]
    UnknownNode(NodeId),

    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    #[error("node {0:?} does not carry a mesh")]
    NotAMeshNode(NodeId),
}

/// Index of a node within its [`SceneDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Returns the raw index value.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Whether a node is a pure container or carries renderable geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Container/empty node without geometry.
    Group,
    /// Mesh-bearing node.
    Mesh,
}

/// A loosely-typed attribute value attached to a node.
///
/// Scene hosts store custom properties as untyped key-value pairs; the
/// identifier may arrive as either an integer or a string.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Int(i64),
    Text(String),
}

impl AttrValue {
    /// Interprets the value as a local identifier, if possible.
    ///
    /// Integer values must be positive; text values must parse as an
    /// unsigned number.
    pub fn as_local_id(&self) -> Option<LocalId> {
        match self {
            AttrValue::Int(value) if *value > 0 => Some(LocalId::new(*value as u64)),
            AttrValue::Int(_) => None,
            AttrValue::Text(text) => text.trim().parse::<u64>().ok().map(LocalId::new),
        }
    }
}

/// Indexed triangle mesh.
///
/// Positions are mandatory; normals are either empty or parallel to the
/// positions array.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    indices: Vec<u32>,
}

impl Mesh {
    /// Creates a mesh from raw arrays.
    pub fn new(positions: Vec<[f32; 3]>, normals: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        debug_assert!(indices.len() % 3 == 0, "index count must be a multiple of 3");
        debug_assert!(normals.is_empty() || normals.len() == positions.len());
        Self {
            positions,
            normals,
            indices,
        }
    }

    /// Returns the vertex positions.
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    /// Returns the vertex normals. Empty when the mesh carries none.
    pub fn normals(&self) -> &[[f32; 3]] {
        &self.normals
    }

    /// Returns the triangle index buffer.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Returns the number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Returns the number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns a copy of the mesh translated by `offset`.
    pub fn translated(&self, offset: [f32; 3]) -> Mesh {
        let positions = self
            .positions
            .iter()
            .map(|p| [p[0] + offset[0], p[1] + offset[1], p[2] + offset[2]])
            .collect();
        Mesh {
            positions,
            normals: self.normals.clone(),
            indices: self.indices.clone(),
        }
    }

    /// Returns a decimated copy keeping roughly `ratio` of the triangles.
    ///
    /// The reduction keeps the leading triangles and compacts the vertex
    /// arrays to the vertices still referenced. `ratio >= 1.0` returns the
    /// mesh unchanged.
    pub fn decimated(&self, ratio: f32) -> Mesh {
        if ratio >= 1.0 || self.indices.is_empty() {
            return self.clone();
        }
        let ratio = ratio.max(f32::MIN_POSITIVE);

        let triangles = self.triangle_count();
        let kept = ((triangles as f32) * ratio).ceil() as usize;
        let kept = kept.clamp(1, triangles);

        let kept_indices = &self.indices[..kept * 3];
        trace!(triangles, kept; "Decimating mesh");

        // Compact vertices to those still referenced.
        let mut remap: IndexMap<u32, u32> = IndexMap::new();
        let mut indices = Vec::with_capacity(kept_indices.len());
        for &old in kept_indices {
            let next = remap.len() as u32;
            let new = *remap.entry(old).or_insert(next);
            indices.push(new);
        }

        let positions = remap
            .keys()
            .map(|&old| self.positions[old as usize])
            .collect();
        let normals = if self.normals.is_empty() {
            Vec::new()
        } else {
            remap.keys().map(|&old| self.normals[old as usize]).collect()
        };

        Mesh {
            positions,
            normals,
            indices,
        }
    }
}

/// A transient, removable modification of a mesh node's working state.
#[derive(Debug, Clone, PartialEq)]
pub enum Modifier {
    /// Lossy triangle reduction by ratio (`0 < ratio <= 1`).
    Decimate { ratio: f32 },
}

/// One node of the scene hierarchy.
#[derive(Debug, Clone)]
pub struct SceneNode {
    name: String,
    kind: NodeKind,
    mesh: Option<Mesh>,
    element_id: Option<LocalId>,
    attributes: IndexMap<String, AttrValue>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    modifiers: Vec<Modifier>,
}

impl SceneNode {
    fn new(name: String, kind: NodeKind, mesh: Option<Mesh>) -> Self {
        Self {
            name,
            kind,
            mesh,
            element_id: None,
            attributes: IndexMap::new(),
            parent: None,
            children: Vec::new(),
            modifiers: Vec::new(),
        }
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns whether the node is a group or a mesh node.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Returns the typed element identifier, if one is attached.
    pub fn element_id(&self) -> Option<LocalId> {
        self.element_id
    }

    /// Returns the parent node, if any.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Returns the child nodes.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Looks up a loosely-typed attribute by key.
    pub fn attribute(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.get(key)
    }

    /// Returns the currently attached modifiers.
    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }
}

/// In-memory scene document: node store, selection state, collections.
///
/// # Examples
///
/// ```
/// use bimsplit_core::scene::{Mesh, SceneDocument};
///
/// let mut doc = SceneDocument::new();
/// let group = doc.add_group("Duct assembly");
/// let mesh = doc.add_mesh(
///     "Duct assembly.001",
///     Mesh::new(vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], vec![], vec![0, 1, 2]),
/// );
/// doc.set_parent(mesh, group).unwrap();
/// assert_eq!(doc.node(group).unwrap().children(), &[mesh]);
/// ```
#[derive(Debug, Default)]
pub struct SceneDocument {
    nodes: Vec<SceneNode>,
    selection: IndexSet<NodeId>,
    collections: IndexMap<String, IndexSet<NodeId>>,
}

impl SceneDocument {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a group (container) node and returns its id.
    pub fn add_group(&mut self, name: impl Into<String>) -> NodeId {
        self.push_node(SceneNode::new(name.into(), NodeKind::Group, None))
    }

    /// Adds a mesh-bearing node and returns its id.
    pub fn add_mesh(&mut self, name: impl Into<String>, mesh: Mesh) -> NodeId {
        self.push_node(SceneNode::new(name.into(), NodeKind::Mesh, Some(mesh)))
    }

    fn push_node(&mut self, node: SceneNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Returns the number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns whether the document holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Looks up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut SceneNode, SceneError> {
        self.nodes.get_mut(id.0).ok_or(SceneError::UnknownNode(id))
    }

    /// Iterates over all nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Links `child` under `parent`.
    pub fn set_parent(&mut self, child: NodeId, parent: NodeId) -> Result<(), SceneError> {
        if self.node(parent).is_none() {
            return Err(SceneError::UnknownNode(parent));
        }
        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Attaches the typed element identifier to a node.
    pub fn set_element_id(&mut self, id: NodeId, element_id: LocalId) -> Result<(), SceneError> {
        self.node_mut(id)?.element_id = Some(element_id);
        Ok(())
    }

    /// Sets a loosely-typed attribute on a node.
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        key: impl Into<String>,
        value: AttrValue,
    ) -> Result<(), SceneError> {
        self.node_mut(id)?.attributes.insert(key.into(), value);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Selection state
    // ------------------------------------------------------------------

    /// Adds a node to the selection.
    pub fn select(&mut self, id: NodeId) -> Result<(), SceneError> {
        if self.node(id).is_none() {
            return Err(SceneError::UnknownNode(id));
        }
        self.selection.insert(id);
        Ok(())
    }

    /// Clears the selection.
    pub fn deselect_all(&mut self) {
        self.selection.clear();
    }

    /// Returns the selected nodes in selection order.
    pub fn selected(&self) -> Vec<NodeId> {
        self.selection.iter().copied().collect()
    }

    /// Returns whether a node is currently selected.
    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selection.contains(&id)
    }

    // ------------------------------------------------------------------
    // Named collections
    // ------------------------------------------------------------------

    /// Creates an empty collection. Existing collections are kept as-is.
    pub fn create_collection(&mut self, name: impl Into<String>) {
        self.collections.entry(name.into()).or_default();
    }

    /// Moves a node into a collection, unlinking it from any other
    /// collection first. A node belongs to at most one collection.
    pub fn link_to_collection(&mut self, name: &str, id: NodeId) -> Result<(), SceneError> {
        if self.node(id).is_none() {
            return Err(SceneError::UnknownNode(id));
        }
        if !self.collections.contains_key(name) {
            return Err(SceneError::UnknownCollection(name.to_string()));
        }
        for members in self.collections.values_mut() {
            members.shift_remove(&id);
        }
        self.collections
            .get_mut(name)
            .expect("presence checked above")
            .insert(id);
        Ok(())
    }

    /// Returns the members of a collection in link order.
    pub fn collection_members(&self, name: &str) -> Result<Vec<NodeId>, SceneError> {
        self.collections
            .get(name)
            .map(|members| members.iter().copied().collect())
            .ok_or_else(|| SceneError::UnknownCollection(name.to_string()))
    }

    /// Returns the names of all collections in creation order.
    pub fn collection_names(&self) -> Vec<String> {
        self.collections.keys().cloned().collect()
    }

    // ------------------------------------------------------------------
    // Transient modifiers
    // ------------------------------------------------------------------

    /// Pushes a modifier onto a mesh node's working state.
    pub fn push_modifier(&mut self, id: NodeId, modifier: Modifier) -> Result<(), SceneError> {
        let node = self.node_mut(id)?;
        if node.kind != NodeKind::Mesh {
            return Err(SceneError::NotAMeshNode(id));
        }
        node.modifiers.push(modifier);
        Ok(())
    }

    /// Removes the most recently pushed modifier, if any.
    pub fn pop_modifier(&mut self, id: NodeId) -> Result<Option<Modifier>, SceneError> {
        Ok(self.node_mut(id)?.modifiers.pop())
    }

    /// Removes all modifiers from a node.
    pub fn clear_modifiers(&mut self, id: NodeId) -> Result<(), SceneError> {
        self.node_mut(id)?.modifiers.clear();
        Ok(())
    }

    /// Returns the node's mesh with all attached modifiers applied.
    ///
    /// Group nodes yield `None`. The stored mesh is never mutated; each
    /// call evaluates the modifier stack fresh.
    pub fn effective_mesh(&self, id: NodeId) -> Result<Option<Mesh>, SceneError> {
        let node = self.node(id).ok_or(SceneError::UnknownNode(id))?;
        let Some(mesh) = &node.mesh else {
            return Ok(None);
        };
        let mut mesh = mesh.clone();
        for modifier in &node.modifiers {
            match modifier {
                Modifier::Decimate { ratio } => mesh = mesh.decimated(*ratio),
            }
        }
        Ok(Some(mesh))
    }

    /// Finds the first mesh-bearing node in the subtree rooted at `id`,
    /// including `id` itself, in depth-first order.
    pub fn mesh_descendant(&self, id: NodeId) -> Option<NodeId> {
        let node = self.node(id)?;
        if node.kind == NodeKind::Mesh {
            return Some(id);
        }
        for &child in &node.children {
            if let Some(found) = self.mesh_descendant(child) {
                return Some(found);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Mesh {
        Mesh::new(
            vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vec![],
            vec![0, 1, 2],
        )
    }

    fn quad() -> Mesh {
        Mesh::new(
            vec![
                [0.0; 3],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            vec![],
            vec![0, 1, 2, 0, 2, 3],
        )
    }

    #[test]
    fn selection_is_isolated_per_clear() {
        let mut doc = SceneDocument::new();
        let a = doc.add_mesh("a", triangle());
        let b = doc.add_mesh("b", triangle());

        doc.select(a).unwrap();
        doc.select(b).unwrap();
        assert_eq!(doc.selected(), vec![a, b]);

        doc.deselect_all();
        assert!(doc.selected().is_empty());
        assert!(!doc.is_selected(a));
    }

    #[test]
    fn linking_moves_between_collections() {
        let mut doc = SceneDocument::new();
        let node = doc.add_mesh("n", triangle());
        doc.create_collection("ducts");
        doc.create_collection("pipes");

        doc.link_to_collection("ducts", node).unwrap();
        doc.link_to_collection("pipes", node).unwrap();

        assert!(doc.collection_members("ducts").unwrap().is_empty());
        assert_eq!(doc.collection_members("pipes").unwrap(), vec![node]);
    }

    #[test]
    fn link_to_missing_collection_fails() {
        let mut doc = SceneDocument::new();
        let node = doc.add_mesh("n", triangle());
        assert!(matches!(
            doc.link_to_collection("nope", node),
            Err(SceneError::UnknownCollection(_))
        ));
    }

    #[test]
    fn decimate_modifier_is_transient() {
        let mut doc = SceneDocument::new();
        let node = doc.add_mesh("n", quad());

        let full = doc.effective_mesh(node).unwrap().unwrap();
        assert_eq!(full.triangle_count(), 2);
        assert_eq!(full.vertex_count(), 4);

        doc.push_modifier(node, Modifier::Decimate { ratio: 0.5 }).unwrap();
        let reduced = doc.effective_mesh(node).unwrap().unwrap();
        assert_eq!(reduced.triangle_count(), 1);
        assert_eq!(reduced.vertex_count(), 3);

        doc.pop_modifier(node).unwrap();
        let restored = doc.effective_mesh(node).unwrap().unwrap();
        assert_eq!(restored.triangle_count(), 2);
        assert_eq!(restored.vertex_count(), 4);
    }

    #[test]
    fn modifiers_rejected_on_group_nodes() {
        let mut doc = SceneDocument::new();
        let group = doc.add_group("g");
        assert!(matches!(
            doc.push_modifier(group, Modifier::Decimate { ratio: 0.5 }),
            Err(SceneError::NotAMeshNode(_))
        ));
    }

    #[test]
    fn mesh_descendant_walks_depth_first() {
        let mut doc = SceneDocument::new();
        let root = doc.add_group("root");
        let middle = doc.add_group("middle");
        let leaf = doc.add_mesh("leaf", triangle());
        doc.set_parent(middle, root).unwrap();
        doc.set_parent(leaf, middle).unwrap();

        assert_eq!(doc.mesh_descendant(root), Some(leaf));
        assert_eq!(doc.mesh_descendant(leaf), Some(leaf));

        let empty = doc.add_group("empty");
        assert_eq!(doc.mesh_descendant(empty), None);
    }

    #[test]
    fn attr_value_id_parsing() {
        assert_eq!(
            AttrValue::Int(42).as_local_id(),
            Some(LocalId::new(42))
        );
        assert_eq!(AttrValue::Int(-1).as_local_id(), None);
        assert_eq!(
            AttrValue::Text("1054501".to_string()).as_local_id(),
            Some(LocalId::new(1054501))
        );
        assert_eq!(AttrValue::Text("wall".to_string()).as_local_id(), None);
    }
}
