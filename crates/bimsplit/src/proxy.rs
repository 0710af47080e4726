//! Proxy scene construction.
//!
//! The reader recovers element placements but no tessellated geometry, so
//! [`proxy_scene`] stands in for an authoring tool's import: one group node
//! per product element, carrying the typed element identifier, with a
//! unit-cube mesh child translated to the element's resolved origin.
//!
//! Proxy cubes are placeholders, not faithful shapes. They give every
//! element an exportable footprint at the right location so that
//! partitioning, decimation policy and GLB layout all run on real data.

use bimsplit_core::{
    model::ModelSession as _,
    scene::{Mesh, SceneDocument},
};
use bimsplit_reader::StepModel;

/// Builds the proxy scene for a loaded model.
///
/// Every product element yields a group node named `{Class}/{name}` holding
/// its identifier, plus a mesh child. Elements without a recoverable
/// placement sit at the world origin.
pub fn proxy_scene(model: &StepModel) -> SceneDocument {
    let mut doc = SceneDocument::new();
    for element in model.all_elements() {
        let id = element.local_id();
        let label = format!(
            "{}/{}",
            element.entity_class(),
            element.name().unwrap_or("Unnamed")
        );

        let group = doc.add_group(label.clone());
        // Identifier on the container, not the mesh: resolution has to
        // walk up one level, exactly as with imported scenes.
        doc.set_element_id(group, id)
            .expect("freshly added node exists");

        let origin = model.origin(id).unwrap_or([0.0; 3]);
        let mesh = doc.add_mesh(format!("{label}.mesh"), unit_cube().translated(origin));
        doc.set_parent(mesh, group).expect("freshly added nodes exist");
    }
    doc
}

/// An axis-aligned unit cube centered on the origin, with per-face normals.
fn unit_cube() -> Mesh {
    const H: f32 = 0.5;
    // Six faces, four vertices each, so normals stay flat per face.
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        // (normal, tangent u, tangent v)
        ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]),
    ];

    let mut positions = Vec::with_capacity(24);
    let mut normals = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, u, v) in faces {
        let base = positions.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            positions.push([
                H * (normal[0] + su * u[0] + sv * v[0]),
                H * (normal[1] + su * u[1] + sv * v[1]),
                H * (normal[2] + su * u[2] + sv * v[2]),
            ]);
            normals.push(normal);
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Mesh::new(positions, normals, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    use bimsplit_core::scene::NodeKind;

    use crate::resolve;

    const FIXTURE: &str = "\
ISO-10303-21;
HEADER;
ENDSEC;
DATA;
#1=IFCCARTESIANPOINT((4.,5.,6.));
#2=IFCAXIS2PLACEMENT3D(#1,$,$);
#3=IFCLOCALPLACEMENT($,#2);
#10=IFCWALL('2O2Fr$t4X7Zf8NOew3FLOH',$,'South Wall',$,$,#3,$,$);
ENDSEC;
END-ISO-10303-21;
";

    fn model() -> StepModel {
        bimsplit_reader::parse(FIXTURE, "fixture.ifc").unwrap()
    }

    #[test]
    fn every_element_gets_a_group_and_mesh_pair() {
        let doc = proxy_scene(&model());
        assert_eq!(doc.len(), 2);

        let (group_id, group) = doc.iter().next().unwrap();
        assert_eq!(group.kind(), NodeKind::Group);
        assert_eq!(group.name(), "IFCWALL/South Wall");
        assert!(group.element_id().is_some());
        assert_eq!(doc.mesh_descendant(group_id), doc.iter().nth(1).map(|(id, _)| id));
    }

    #[test]
    fn mesh_children_resolve_through_their_parent() {
        let doc = proxy_scene(&model());
        let (mesh_id, mesh_node) = doc.iter().nth(1).unwrap();
        assert_eq!(mesh_node.kind(), NodeKind::Mesh);
        assert_eq!(
            resolve::resolve_node(&doc, mesh_id),
            doc.iter().next().unwrap().1.element_id()
        );
    }

    #[test]
    fn cubes_sit_at_the_resolved_placement() {
        let doc = proxy_scene(&model());
        let (mesh_id, _) = doc.iter().nth(1).unwrap();
        let mesh = doc.effective_mesh(mesh_id).unwrap().unwrap();

        let center = mesh
            .positions()
            .iter()
            .fold([0.0f32; 3], |acc, p| [acc[0] + p[0], acc[1] + p[1], acc[2] + p[2]]);
        let n = mesh.positions().len() as f32;
        let center = [center[0] / n, center[1] / n, center[2] / n];
        assert_eq!(center, [4.0, 5.0, 6.0]);
    }

    #[test]
    fn cube_geometry_is_well_formed() {
        let cube = unit_cube();
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.triangle_count(), 12);
        assert_eq!(cube.normals().len(), 24);
    }
}
