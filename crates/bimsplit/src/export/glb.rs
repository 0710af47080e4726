//! Bundled binary glTF (GLB) writer.
//!
//! Writes the current selection of a [`SceneDocument`] as a single
//! `.glb` container: one glTF node and mesh per selected mesh-bearing
//! scene node, positions and optional normals in the binary chunk, and the
//! category tag in node extras when requested.
//!
//! The writer emits uncompressed geometry only. A requested compression
//! level is logged and ignored; downstream tooling can recompress the
//! output without loss of information.

use std::{fs, path::Path};

use log::{debug, warn};
use serde_json::json;

use bimsplit_core::scene::{Mesh, SceneDocument};

use crate::export::{ExportError, ExportSettings, GeometryExporter};

const GLB_MAGIC: u32 = 0x4654_6C67; // "glTF"
const GLB_VERSION: u32 = 2;
const CHUNK_JSON: u32 = 0x4E4F_534A; // "JSON"
const CHUNK_BIN: u32 = 0x004E_4942; // "BIN\0"

const COMPONENT_F32: u32 = 5126;
const COMPONENT_U32: u32 = 5125;
const TARGET_ARRAY_BUFFER: u32 = 34962;
const TARGET_ELEMENT_ARRAY_BUFFER: u32 = 34963;

/// The default geometry exporter.
#[derive(Debug, Default)]
pub struct GlbExporter;

impl GlbExporter {
    /// Creates a GLB exporter.
    pub fn new() -> Self {
        Self
    }
}

impl GeometryExporter for GlbExporter {
    fn export_selection(
        &mut self,
        doc: &SceneDocument,
        path: &Path,
        settings: &ExportSettings,
    ) -> Result<(), ExportError> {
        if let Some(level) = settings.compression {
            warn!(level; "Compression is not supported by the bundled GLB writer; emitting uncompressed geometry");
        }

        let mut bin: Vec<u8> = Vec::new();
        let mut buffer_views = Vec::new();
        let mut accessors = Vec::new();
        let mut meshes = Vec::new();
        let mut nodes = Vec::new();

        for id in doc.selected() {
            let Some(mesh) = doc.effective_mesh(id)? else {
                continue;
            };
            let node = doc.node(id).expect("selected nodes exist");
            let mesh = orient(&mesh, settings);

            let index_accessor = {
                let view = push_view(
                    &mut bin,
                    &mut buffer_views,
                    index_bytes(mesh.indices()),
                    TARGET_ELEMENT_ARRAY_BUFFER,
                );
                accessors.push(json!({
                    "bufferView": view,
                    "componentType": COMPONENT_U32,
                    "count": mesh.indices().len(),
                    "type": "SCALAR",
                }));
                accessors.len() - 1
            };

            let position_accessor = {
                let view = push_view(
                    &mut bin,
                    &mut buffer_views,
                    vec3_bytes(mesh.positions()),
                    TARGET_ARRAY_BUFFER,
                );
                let (min, max) = bounds(mesh.positions());
                accessors.push(json!({
                    "bufferView": view,
                    "componentType": COMPONENT_F32,
                    "count": mesh.positions().len(),
                    "type": "VEC3",
                    "min": min,
                    "max": max,
                }));
                accessors.len() - 1
            };

            let mut attributes = json!({ "POSITION": position_accessor });
            if settings.include_normals && !mesh.normals().is_empty() {
                let view = push_view(
                    &mut bin,
                    &mut buffer_views,
                    vec3_bytes(mesh.normals()),
                    TARGET_ARRAY_BUFFER,
                );
                accessors.push(json!({
                    "bufferView": view,
                    "componentType": COMPONENT_F32,
                    "count": mesh.normals().len(),
                    "type": "VEC3",
                }));
                attributes["NORMAL"] = json!(accessors.len() - 1);
            }

            meshes.push(json!({
                "name": node.name(),
                "primitives": [{
                    "attributes": attributes,
                    "indices": index_accessor,
                }],
            }));

            let mut gltf_node = json!({
                "name": node.name(),
                "mesh": meshes.len() - 1,
            });
            if settings.include_extras {
                if let Some(category) = node.attribute("category") {
                    if let bimsplit_core::scene::AttrValue::Text(label) = category {
                        gltf_node["extras"] = json!({ "category": label });
                    }
                }
            }
            nodes.push(gltf_node);
        }

        let scene_nodes: Vec<usize> = (0..nodes.len()).collect();
        let document = json!({
            "asset": { "version": "2.0", "generator": "bimsplit" },
            "scene": 0,
            "scenes": [{ "nodes": scene_nodes }],
            "nodes": nodes,
            "meshes": meshes,
            "accessors": accessors,
            "bufferViews": buffer_views,
            "buffers": [{ "byteLength": bin.len() }],
        });

        let container = assemble(&document, bin)?;
        debug!(
            path:display = path.display(),
            bytes = container.len();
            "GLB container assembled"
        );
        fs::write(path, container)?;
        Ok(())
    }
}

/// Applies the coordinate-system policy to a mesh.
///
/// The source data is Z-up; glTF viewers expect Y-up. The conversion maps
/// `(x, y, z)` to `(x, z, -y)` for positions and normals alike.
fn orient(mesh: &Mesh, settings: &ExportSettings) -> Mesh {
    if !settings.y_up {
        return mesh.clone();
    }
    let flip = |v: &[[f32; 3]]| v.iter().map(|p| [p[0], p[2], -p[1]]).collect();
    Mesh::new(
        flip(mesh.positions()),
        flip(mesh.normals()),
        mesh.indices().to_vec(),
    )
}

/// Appends a data block to the binary chunk and records its buffer view.
/// Returns the view index.
fn push_view(
    bin: &mut Vec<u8>,
    views: &mut Vec<serde_json::Value>,
    data: Vec<u8>,
    target: u32,
) -> usize {
    // Accessor alignment: every component type used here is 4 bytes wide.
    while bin.len() % 4 != 0 {
        bin.push(0);
    }
    let offset = bin.len();
    let length = data.len();
    bin.extend_from_slice(&data);
    views.push(json!({
        "buffer": 0,
        "byteOffset": offset,
        "byteLength": length,
        "target": target,
    }));
    views.len() - 1
}

fn index_bytes(indices: &[u32]) -> Vec<u8> {
    indices.iter().flat_map(|i| i.to_le_bytes()).collect()
}

fn vec3_bytes(vectors: &[[f32; 3]]) -> Vec<u8> {
    vectors
        .iter()
        .flat_map(|v| v.iter().flat_map(|c| c.to_le_bytes()))
        .collect()
}

/// Componentwise bounds of a position array, required on position
/// accessors.
fn bounds(positions: &[[f32; 3]]) -> (Vec<f32>, Vec<f32>) {
    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];
    for p in positions {
        for axis in 0..3 {
            min[axis] = min[axis].min(p[axis]);
            max[axis] = max[axis].max(p[axis]);
        }
    }
    if positions.is_empty() {
        return (vec![0.0; 3], vec![0.0; 3]);
    }
    (min.to_vec(), max.to_vec())
}

/// Assembles the two-chunk GLB container.
///
/// The JSON chunk is padded with spaces, the binary chunk with zeroes,
/// both to four-byte boundaries.
fn assemble(document: &serde_json::Value, mut bin: Vec<u8>) -> Result<Vec<u8>, ExportError> {
    let mut json_bytes = serde_json::to_vec(document)?;
    while json_bytes.len() % 4 != 0 {
        json_bytes.push(b' ');
    }
    while bin.len() % 4 != 0 {
        bin.push(0);
    }

    let total = 12 + 8 + json_bytes.len() + 8 + bin.len();
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    out.extend_from_slice(&GLB_VERSION.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(json_bytes.len() as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    out.extend_from_slice(&json_bytes);
    out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_BIN.to_le_bytes());
    out.extend_from_slice(&bin);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    use bimsplit_core::scene::AttrValue;
    use tempfile::TempDir;

    fn triangle() -> Mesh {
        Mesh::new(
            vec![[0.0; 3], [2.0, 0.0, 0.0], [0.0, 3.0, 0.0]],
            vec![[0.0, 0.0, 1.0]; 3],
            vec![0, 1, 2],
        )
    }

    fn export(doc: &SceneDocument, settings: &ExportSettings) -> Vec<u8> {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.glb");
        GlbExporter::new()
            .export_selection(doc, &path, settings)
            .unwrap();
        fs::read(&path).unwrap()
    }

    /// Splits a GLB byte stream into its JSON document and binary chunk.
    fn chunks(bytes: &[u8]) -> (serde_json::Value, Vec<u8>) {
        assert_eq!(&bytes[0..4], b"glTF");
        assert_eq!(u32::from_le_bytes(bytes[4..8].try_into().unwrap()), 2);
        let total = u32::from_le_bytes(bytes[8..12].try_into().unwrap()) as usize;
        assert_eq!(total, bytes.len());

        let json_len = u32::from_le_bytes(bytes[12..16].try_into().unwrap()) as usize;
        assert_eq!(&bytes[16..20], b"JSON");
        assert_eq!(json_len % 4, 0);
        let document = serde_json::from_slice(&bytes[20..20 + json_len]).unwrap();

        let bin_start = 20 + json_len;
        let bin_len =
            u32::from_le_bytes(bytes[bin_start..bin_start + 4].try_into().unwrap()) as usize;
        assert_eq!(&bytes[bin_start + 4..bin_start + 8], b"BIN\0");
        let bin = bytes[bin_start + 8..bin_start + 8 + bin_len].to_vec();
        (document, bin)
    }

    fn settings() -> ExportSettings {
        ExportSettings {
            compression: None,
            ..ExportSettings::default()
        }
    }

    #[test]
    fn container_layout_is_valid() {
        let mut doc = SceneDocument::new();
        let node = doc.add_mesh("tri", triangle());
        doc.select(node).unwrap();

        let bytes = export(&doc, &settings());
        let (document, bin) = chunks(&bytes);

        assert_eq!(document["asset"]["version"], "2.0");
        assert_eq!(document["meshes"].as_array().unwrap().len(), 1);
        assert_eq!(document["buffers"][0]["byteLength"], bin.len());
    }

    #[test]
    fn position_bounds_reflect_the_y_up_conversion() {
        let mut doc = SceneDocument::new();
        let node = doc.add_mesh("tri", triangle());
        doc.select(node).unwrap();

        let bytes = export(&doc, &settings());
        let (document, _) = chunks(&bytes);

        // (0,3,0) becomes (0,0,-3); the position accessor is index 1.
        let position = &document["accessors"][1];
        assert_eq!(position["type"], "VEC3");
        assert_eq!(position["max"][0], 2.0);
        assert_eq!(position["min"][2], -3.0);
    }

    #[test]
    fn z_up_passthrough_when_conversion_is_disabled() {
        let mut doc = SceneDocument::new();
        let node = doc.add_mesh("tri", triangle());
        doc.select(node).unwrap();

        let bytes = export(
            &doc,
            &ExportSettings {
                y_up: false,
                ..settings()
            },
        );
        let (document, _) = chunks(&bytes);
        assert_eq!(document["accessors"][1]["max"][1], 3.0);
    }

    #[test]
    fn normals_can_be_omitted() {
        let mut doc = SceneDocument::new();
        let node = doc.add_mesh("tri", triangle());
        doc.select(node).unwrap();

        let with = chunks(&export(&doc, &settings())).0;
        assert!(with["meshes"][0]["primitives"][0]["attributes"]["NORMAL"].is_number());

        let without = chunks(&export(
            &doc,
            &ExportSettings {
                include_normals: false,
                ..settings()
            },
        ))
        .0;
        assert!(without["meshes"][0]["primitives"][0]["attributes"]["NORMAL"].is_null());
    }

    #[test]
    fn category_tag_lands_in_node_extras() {
        let mut doc = SceneDocument::new();
        let node = doc.add_mesh("duct run", triangle());
        doc.set_attribute(node, "category", AttrValue::Text("ducts".into()))
            .unwrap();
        doc.select(node).unwrap();

        let (document, _) = chunks(&export(&doc, &settings()));
        assert_eq!(document["nodes"][0]["extras"]["category"], "ducts");

        let plain = chunks(&export(
            &doc,
            &ExportSettings {
                include_extras: false,
                ..settings()
            },
        ))
        .0;
        assert!(plain["nodes"][0]["extras"].is_null());
    }

    #[test]
    fn only_selected_nodes_are_exported() {
        let mut doc = SceneDocument::new();
        let a = doc.add_mesh("a", triangle());
        let _b = doc.add_mesh("b", triangle());
        doc.select(a).unwrap();

        let (document, _) = chunks(&export(&doc, &settings()));
        assert_eq!(document["nodes"].as_array().unwrap().len(), 1);
        assert_eq!(document["nodes"][0]["name"], "a");
    }
}
