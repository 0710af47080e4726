//! The export coordinator.
//!
//! [`export_partition`] turns a finished [`Partition`] into files on disk:
//! one GLB per non-empty category, optionally one JSON manifest per
//! exported category, and a single `statistics.json` at the end of the run.
//!
//! This is the only module that mutates scene state. Per category it
//! builds a collection, tags and selects the member nodes, pushes transient
//! decimation modifiers where policy allows, hands the selection to the
//! [`GeometryExporter`], and removes the modifiers again whether or not the
//! export succeeded. A failed category is logged and skipped; the run
//! continues and still writes statistics.

use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

use log::{info, warn};
use thiserror::Error;

use bimsplit_core::{
    category::Category,
    model::ModelSession,
    scene::{AttrValue, Modifier, NodeId, SceneDocument, SceneError},
};

use crate::{config::ExportConfig, partition::Partition};

pub mod glb;

/// Errors raised while exporting a selection or writing run outputs.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Per-call knobs of a geometry exporter.
///
/// Derived from [`ExportConfig`]; the coordinator passes the same settings
/// to every category of a run.
#[derive(Debug, Clone)]
pub struct ExportSettings {
    /// Bake node transforms into the exported vertex data.
    pub apply_transforms: bool,
    /// Emit vertex normals when the mesh carries them.
    pub include_normals: bool,
    /// Emit texture coordinates when the mesh carries them.
    pub include_tex_coords: bool,
    /// Convert geometry from Z-up to Y-up on the way out.
    pub y_up: bool,
    /// Emit per-node extras (the category tag).
    pub include_extras: bool,
    /// Requested compression level; `None` disables compression.
    pub compression: Option<u32>,
}

impl ExportSettings {
    /// Derives exporter settings from the export policy.
    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            apply_transforms: config.apply_transforms(),
            include_normals: config.include_normals(),
            include_tex_coords: config.include_tex_coords(),
            y_up: config.y_up(),
            include_extras: config.include_extras(),
            compression: (config.compression_level() > 0).then(|| config.compression_level()),
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self::from_config(&ExportConfig::default())
    }
}

/// Writes the current selection of a scene document to one output file.
///
/// The bundled implementation is [`glb::GlbExporter`]; tests substitute
/// their own.
pub trait GeometryExporter {
    /// Exports every selected mesh-bearing node to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] when the output cannot be written.
    fn export_selection(
        &mut self,
        doc: &SceneDocument,
        path: &Path,
        settings: &ExportSettings,
    ) -> Result<(), ExportError>;
}

/// Outcome of one export run.
#[derive(Debug, Default)]
pub struct ExportSummary {
    exported: Vec<(Category, PathBuf)>,
    failed: Vec<Category>,
    statistics_path: Option<PathBuf>,
}

impl ExportSummary {
    /// Returns the categories written to disk, with their file paths.
    pub fn exported(&self) -> &[(Category, PathBuf)] {
        &self.exported
    }

    /// Returns the categories whose export failed and was skipped.
    pub fn failed(&self) -> &[Category] {
        &self.failed
    }

    /// Returns the path of the statistics file.
    pub fn statistics_path(&self) -> Option<&Path> {
        self.statistics_path.as_deref()
    }
}

/// Exports a partition: per-category GLB files, manifests and statistics.
///
/// Categories without exportable nodes produce no files. A category whose
/// geometry export fails is logged and skipped, and never aborts the run.
/// `statistics.json` is written exactly once, after the last category,
/// regardless of per-category failures.
///
/// # Errors
///
/// Returns [`ExportError`] only for run-fatal conditions: an unusable
/// output directory or an unwritable statistics file.
pub fn export_partition(
    doc: &mut SceneDocument,
    partition: &Partition,
    session: &dyn ModelSession,
    config: &ExportConfig,
    exporter: &mut dyn GeometryExporter,
    output_dir: &Path,
) -> Result<ExportSummary, ExportError> {
    fs::create_dir_all(output_dir)?;

    let settings = ExportSettings::from_config(config);
    let mut summary = ExportSummary::default();

    for (category, members) in partition.node_groups() {
        if members.is_empty() {
            continue;
        }
        let label = category.as_string();

        doc.create_collection(&label);
        doc.deselect_all();
        let mut staged = Vec::with_capacity(members.len());
        for &node in members {
            if let Err(error) = stage_node(doc, &label, node, &settings) {
                warn!(
                    node = node.index(),
                    error:display = error;
                    "Node could not be staged; excluded from this export"
                );
                continue;
            }
            staged.push(node);
        }

        let decimated = apply_decimation(doc, &staged, *category, config);
        let path = output_dir.join(format!("{label}.glb"));
        let result = exporter.export_selection(doc, &path, &settings);
        remove_decimation(doc, &decimated);
        doc.deselect_all();

        match result {
            Ok(()) => {
                info!(category = label.as_str(), nodes = staged.len(); "Category exported");
                summary.exported.push((*category, path));

                if config.write_manifests() {
                    if let Err(error) = write_manifest(partition, *category, output_dir) {
                        warn!(category = label.as_str(), error:display = error; "Manifest write failed; continuing");
                    }
                }
            }
            Err(error) => {
                warn!(category = label.as_str(), error:display = error; "Category export failed; skipped");
                summary.failed.push(*category);
            }
        }
    }

    let statistics = partition.statistics(session.file_name());
    let statistics_path = output_dir.join("statistics.json");
    fs::write(&statistics_path, serde_json::to_vec_pretty(&statistics)?)?;
    info!(
        path:display = statistics_path.display(),
        total = statistics.total_elements;
        "Run statistics written"
    );
    summary.statistics_path = Some(statistics_path);

    Ok(summary)
}

/// Links one node into the category collection, tags it and selects it.
fn stage_node(
    doc: &mut SceneDocument,
    label: &str,
    node: NodeId,
    settings: &ExportSettings,
) -> Result<(), SceneError> {
    doc.link_to_collection(label, node)?;
    if settings.include_extras {
        doc.set_attribute(node, "category", AttrValue::Text(label.to_string()))?;
    }
    doc.select(node)
}

/// Pushes decimation modifiers on the nodes of one category, when policy
/// allows, and returns the nodes touched so the caller can undo them.
///
/// Precision-critical categories and a ratio of `1.0` (or more) disable
/// decimation entirely. A node that rejects the modifier is logged and
/// exported at full resolution.
fn apply_decimation(
    doc: &mut SceneDocument,
    members: &[NodeId],
    category: Category,
    config: &ExportConfig,
) -> Vec<NodeId> {
    let ratio = config.decimation_ratio();
    let label = category.as_string();
    if ratio >= 1.0 || config.precision_critical().iter().any(|c| *c == label) {
        return Vec::new();
    }

    let mut touched = Vec::with_capacity(members.len());
    for &node in members {
        match doc.push_modifier(node, Modifier::Decimate { ratio }) {
            Ok(()) => touched.push(node),
            Err(error) => {
                warn!(
                    node = node.index(),
                    error:display = error;
                    "Decimation not applicable; node exported at full resolution"
                );
            }
        }
    }
    touched
}

/// Pops the decimation modifiers pushed by [`apply_decimation`].
fn remove_decimation(doc: &mut SceneDocument, touched: &[NodeId]) {
    for &node in touched {
        // Nodes in `touched` accepted a modifier moments ago.
        let _ = doc.pop_modifier(node);
    }
}

/// Writes the `<category>.json` manifest next to the category's GLB.
fn write_manifest(
    partition: &Partition,
    category: Category,
    output_dir: &Path,
) -> Result<(), ExportError> {
    let Some(bucket) = partition.manifests().get(&category) else {
        return Ok(());
    };
    if bucket.is_empty() {
        return Ok(());
    }
    let path = output_dir.join(format!("{}.json", category.as_string()));
    fs::write(&path, serde_json::to_vec_pretty(bucket)?)?;
    Ok(())
}
