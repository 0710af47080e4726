//! The partition builder.
//!
//! [`partition`] walks the two representations of the model and produces the
//! consistent triple the exporter consumes:
//!
//! - `assignment` — local id → category, total over non-excluded elements,
//! - `manifests` — per category, global id → display metadata,
//! - `node_groups` — per category, the exportable scene nodes.
//!
//! The builder reads both the session and the scene document; it mutates
//! neither. All scene-side bookkeeping (collections, selection) is the
//! export coordinator's business.

use indexmap::{IndexMap, IndexSet};
use log::{debug, warn};
use serde::Serialize;

use bimsplit_core::{
    category::Category,
    identifier::{EntityClass, GlobalId, LocalId},
    model::{ModelElement, ModelSession},
    scene::{NodeId, SceneDocument},
};

use crate::{classify::Classifier, resolve};

/// Display metadata of one element inside a manifest bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManifestEntry {
    /// Display name, `null` when the element is unnamed.
    pub name: Option<String>,
    /// Entity-class tag.
    #[serde(rename = "type")]
    pub entity_type: String,
    /// The bucket's own label, repeated per entry for self-contained files.
    pub category: String,
}

/// One line of the statistics breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownEntry {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub count: usize,
    pub category: String,
}

/// The run-level statistics record, written once after all exports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunStatistics {
    pub filename: String,
    pub total_elements: usize,
    pub breakdown: Vec<BreakdownEntry>,
}

/// The consistent output of one partitioning pass.
#[derive(Debug, Default)]
pub struct Partition {
    assignment: IndexMap<LocalId, Category>,
    manifests: IndexMap<Category, IndexMap<GlobalId, ManifestEntry>>,
    node_groups: IndexMap<Category, Vec<NodeId>>,
    /// Per (entity class, category): elements classified into the pair and
    /// elements of the pair that also resolved to at least one scene node.
    counts: IndexMap<(EntityClass, Category), usize>,
    resolved_elements: usize,
}

impl Partition {
    /// Returns the category assigned to a local identifier.
    pub fn category_of(&self, id: LocalId) -> Option<Category> {
        self.assignment.get(&id).copied()
    }

    /// Returns the full id → category assignment.
    pub fn assignment(&self) -> &IndexMap<LocalId, Category> {
        &self.assignment
    }

    /// Returns the per-category manifests.
    pub fn manifests(&self) -> &IndexMap<Category, IndexMap<GlobalId, ManifestEntry>> {
        &self.manifests
    }

    /// Returns the exportable scene nodes per category.
    pub fn node_groups(&self) -> &IndexMap<Category, Vec<NodeId>> {
        &self.node_groups
    }

    /// Builds the run statistics record.
    ///
    /// Counts cover classified-and-resolved elements: a bucket whose
    /// elements never resolved to scene nodes reports zero, not its
    /// classified size.
    pub fn statistics(&self, filename: &str) -> RunStatistics {
        RunStatistics {
            filename: filename.to_string(),
            total_elements: self.resolved_elements,
            breakdown: self
                .counts
                .iter()
                .map(|((class, category), count)| BreakdownEntry {
                    entity_type: class.as_string(),
                    count: *count,
                    category: category.as_string(),
                })
                .collect(),
        }
    }
}

/// Partitions model elements and scene nodes into category buckets.
///
/// Classifies every non-excluded element, extracts its manifest metadata,
/// then resolves every scene node and groups the exportable representatives
/// by the category of the element they resolve to.
///
/// Per-element and per-node problems are logged and skipped; this function
/// itself cannot fail.
pub fn partition(
    classifier: &Classifier,
    session: &dyn ModelSession,
    doc: &SceneDocument,
) -> Partition {
    let mut result = Partition::default();

    for element in session.all_elements() {
        if classifier.is_excluded(element) {
            continue;
        }
        let category = classifier.classify(element);
        let local_id = element.local_id();
        result.assignment.insert(local_id, category);
        result
            .counts
            .entry((element.entity_class(), category))
            .or_insert(0);

        match extract_metadata(element, category) {
            Some((global_id, entry)) => {
                result
                    .manifests
                    .entry(category)
                    .or_default()
                    .insert(global_id, entry);
            }
            None => {
                warn!(
                    local_id = local_id.value();
                    "Metadata extraction failed; element kept in assignment but omitted from manifest"
                );
            }
        }
    }

    debug!(elements = result.assignment.len(); "Elements classified");

    // Scene side: resolve nodes to identifiers and group the exportable
    // representatives. Sets are used so that an identified container and
    // its mesh child collapse into one representative.
    let mut groups: IndexMap<Category, IndexSet<NodeId>> = IndexMap::new();
    let mut resolved_ids: IndexSet<LocalId> = IndexSet::new();

    for (node_id, _) in doc.iter() {
        let Some(local_id) = resolve::resolve_node(doc, node_id) else {
            debug!(node = node_id.index(); "Node unresolved; excluded from all groups");
            continue;
        };
        let Some(category) = result.assignment.get(&local_id).copied() else {
            continue;
        };
        resolved_ids.insert(local_id);

        match resolve::exportable_representative(doc, node_id) {
            Some(representative) => {
                groups.entry(category).or_default().insert(representative);
            }
            None => {
                debug!(
                    node = node_id.index(),
                    local_id = local_id.value();
                    "Resolved node carries no exportable geometry; skipped for export"
                );
            }
        }
    }

    for (category, members) in groups {
        result
            .node_groups
            .insert(category, members.into_iter().collect());
    }

    // Resolved counts per (class, category) pair.
    result.resolved_elements = resolved_ids.len();
    for local_id in &resolved_ids {
        if let Some(element) = session.element_by_id(*local_id) {
            let category = result.assignment[local_id];
            if let Some(count) = result.counts.get_mut(&(element.entity_class(), category)) {
                *count += 1;
            }
        }
    }

    debug!(
        groups = result.node_groups.len(),
        resolved = result.resolved_elements;
        "Scene nodes grouped"
    );

    result
}

/// Extracts the manifest metadata of one element.
///
/// Fails (returning `None`) when the element has no usable global
/// identifier; the caller logs and continues.
fn extract_metadata(
    element: &ModelElement,
    category: Category,
) -> Option<(GlobalId, ManifestEntry)> {
    let global_id = element.global_id();
    if global_id.as_str().trim().is_empty() {
        return None;
    }
    Some((
        global_id.clone(),
        ManifestEntry {
            name: element.name().map(str::to_string),
            entity_type: element.entity_class().as_string(),
            category: category.as_string(),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    use bimsplit_core::{
        identifier::EntityClass,
        model::{MemorySession, ModelElement},
        scene::Mesh,
    };

    use crate::config::RulesConfig;

    fn mesh() -> Mesh {
        Mesh::new(
            vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vec![],
            vec![0, 1, 2],
        )
    }

    fn element(id: u64, guid: &str, class: &str, name: &str) -> ModelElement {
        let mut e = ModelElement::new(
            LocalId::new(id),
            GlobalId::new(guid),
            EntityClass::new(class),
        );
        if !name.is_empty() {
            e = e.with_name(name);
        }
        e
    }

    fn classifier() -> Classifier {
        Classifier::new(&RulesConfig::default())
    }

    /// A session and scene with a pipe (group + mesh child), a wall (mesh
    /// only, loose name id), and an unresolvable mesh.
    fn fixture() -> (MemorySession, SceneDocument) {
        let session = MemorySession::new(
            "clinic.ifc",
            vec![
                element(1, "2O2Fr$t4X7Zf8NOew3FLO1", "IfcPipeSegment", "Cold Water Pipe"),
                element(2, "2O2Fr$t4X7Zf8NOew3FLO2", "IfcWall", "Basic Wall"),
                element(3, "2O2Fr$t4X7Zf8NOew3FLO3", "IfcSpace", "Room 101"),
            ],
        );

        let mut doc = SceneDocument::new();
        let pipe_group = doc.add_group("IfcPipeSegment/ColdWater");
        let pipe_mesh = doc.add_mesh("IfcPipeSegment/ColdWater.mesh", mesh());
        doc.set_parent(pipe_mesh, pipe_group).unwrap();
        doc.set_element_id(pipe_group, LocalId::new(1)).unwrap();

        let _wall_mesh = doc.add_mesh("IfcWall/Basic:2", mesh());
        let _stray = doc.add_mesh("Cube.001", mesh());

        (session, doc)
    }

    #[test]
    fn manifests_never_disagree_with_assignment() {
        let (session, doc) = fixture();
        let p = partition(&classifier(), &session, &doc);

        for (category, bucket) in p.manifests() {
            for entry in bucket.values() {
                assert_eq!(entry.category, category.as_string());
            }
        }
        // Every manifest id's element maps back to the same bucket.
        for (category, bucket) in p.manifests() {
            for global_id in bucket.keys() {
                let element = session
                    .all_elements()
                    .iter()
                    .find(|e| e.global_id() == global_id)
                    .unwrap();
                assert_eq!(p.category_of(element.local_id()), Some(*category));
            }
        }
    }

    #[test]
    fn containers_are_excluded_entirely() {
        let (session, doc) = fixture();
        let p = partition(&classifier(), &session, &doc);

        assert_eq!(p.category_of(LocalId::new(3)), None);
        for bucket in p.manifests().values() {
            assert!(!bucket.keys().any(|g| g.as_str().ends_with("FLO3")));
        }
    }

    #[test]
    fn container_and_mesh_child_collapse_to_one_representative() {
        let (session, doc) = fixture();
        let p = partition(&classifier(), &session, &doc);

        let pipes = p.node_groups().get(&Category::new("pipes")).unwrap();
        assert_eq!(pipes.len(), 1, "group and child must share one representative");
    }

    #[test]
    fn unresolved_nodes_join_no_group() {
        let (session, doc) = fixture();
        let p = partition(&classifier(), &session, &doc);

        let grouped: usize = p.node_groups().values().map(Vec::len).sum();
        assert_eq!(grouped, 2); // pipe representative + wall mesh
    }

    #[test]
    fn partitioning_twice_is_byte_identical() {
        let (session, doc) = fixture();
        let first = partition(&classifier(), &session, &doc);
        let second = partition(&classifier(), &session, &doc);

        assert_eq!(first.assignment(), second.assignment());
        assert_eq!(
            serde_json::to_vec(first.manifests().values().collect::<Vec<_>>().as_slice()).unwrap(),
            serde_json::to_vec(second.manifests().values().collect::<Vec<_>>().as_slice()).unwrap(),
        );
        assert_eq!(
            serde_json::to_vec(&first.statistics("clinic.ifc")).unwrap(),
            serde_json::to_vec(&second.statistics("clinic.ifc")).unwrap(),
        );
    }

    #[test]
    fn blank_global_id_keeps_assignment_slot_but_no_manifest_entry() {
        let session = MemorySession::new(
            "m.ifc",
            vec![element(9, "  ", "IfcWall", "Ghost Wall")],
        );
        let doc = SceneDocument::new();
        let p = partition(&classifier(), &session, &doc);

        assert_eq!(p.category_of(LocalId::new(9)), Some(Category::new("walls")));
        assert!(p.manifests().get(&Category::new("walls")).is_none_or(|b| b.is_empty()));
    }

    #[test]
    fn statistics_count_resolved_elements_only() {
        let (session, doc) = fixture();
        let p = partition(&classifier(), &session, &doc);
        let stats = p.statistics(session.file_name());

        assert_eq!(stats.filename, "clinic.ifc");
        assert_eq!(stats.total_elements, 2);

        let pipe_line = stats
            .breakdown
            .iter()
            .find(|b| b.entity_type == "IFCPIPESEGMENT")
            .unwrap();
        assert_eq!(pipe_line.count, 1);
        assert_eq!(pipe_line.category, "pipes");
    }

    #[test]
    fn zero_node_category_reports_zero_count() {
        // A duct element exists in the model but no scene node resolves to it.
        let session = MemorySession::new(
            "m.ifc",
            vec![element(5, "2O2Fr$t4X7Zf8NOew3FLO5", "IfcDuctSegment", "Supply Duct")],
        );
        let doc = SceneDocument::new();
        let p = partition(&classifier(), &session, &doc);

        assert!(p.node_groups().is_empty());
        let stats = p.statistics("m.ifc");
        assert_eq!(stats.total_elements, 0);
        let duct_line = stats
            .breakdown
            .iter()
            .find(|b| b.category == "ducts")
            .unwrap();
        assert_eq!(duct_line.count, 0);
    }

    #[test]
    fn resolved_group_without_geometry_is_counted_but_not_exported() {
        let session = MemorySession::new(
            "m.ifc",
            vec![element(4, "2O2Fr$t4X7Zf8NOew3FLO4", "IfcWall", "Logical Wall")],
        );
        let mut doc = SceneDocument::new();
        let group = doc.add_group("logical");
        doc.set_element_id(group, LocalId::new(4)).unwrap();

        let p = partition(&classifier(), &session, &doc);
        assert!(p.node_groups().get(&Category::new("walls")).is_none_or(Vec::is_empty));
        assert_eq!(p.statistics("m.ifc").total_elements, 1);
    }
}
