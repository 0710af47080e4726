//! Building the semantic model view from raw STEP entities.
//!
//! The raw entity store is schema-less: the reader does not ship an EXPRESS
//! schema, so product detection and attribute extraction rely on the stable
//! attribute layout all rooted IFC entities share
//! (`GlobalId, OwnerHistory, Name, Description, ...`; products add
//! `ObjectType, ObjectPlacement, Representation` at positions 4-6).
//!
//! Placement chains (`IfcLocalPlacement` → `IfcAxis2Placement3D` →
//! `IfcCartesianPoint`) are followed for their translation component only,
//! summed across relative placements. Rotation is ignored: the origin feeds
//! proxy geometry, not precise geometry reconstruction.

use indexmap::IndexMap;
use log::debug;

use bimsplit_core::{
    identifier::{EntityClass, GlobalId, LocalId},
    model::{ModelElement, ModelSession},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    parser::{RawEntity, StepValue},
};

/// Class-name prefixes of rooted entities that are not products.
const NON_PRODUCT_PREFIXES: &[&str] = &["IFCREL", "IFCPROPERTY", "IFCELEMENTQUANTITY"];

/// Exact class names of rooted entities that are not products.
const NON_PRODUCT_CLASSES: &[&str] = &["IFCPROJECT"];

/// A loaded model: the product elements plus per-product origins.
///
/// Implements [`ModelSession`] for consumption by the engine.
#[derive(Debug)]
pub struct StepModel {
    file_name: String,
    elements: Vec<ModelElement>,
    index: IndexMap<LocalId, usize>,
    origins: IndexMap<LocalId, [f32; 3]>,
    warnings: Vec<Diagnostic>,
}

impl StepModel {
    /// Builds the model from parsed raw entities.
    pub(crate) fn build(
        file_name: &str,
        raw: Vec<RawEntity>,
        mut collector: DiagnosticCollector,
    ) -> Self {
        let mut store: IndexMap<u64, RawEntity> = IndexMap::with_capacity(raw.len());
        for entity in raw {
            if let Some(previous) = store.insert(entity.id, entity) {
                collector.push(
                    Diagnostic::warning(format!(
                        "duplicate definition of #{}; keeping the later one",
                        previous.id
                    ))
                    .with_code(ErrorCode::E102)
                    .with_secondary_label(previous.span.clone(), "first defined here"),
                );
            }
        }

        let mut elements = Vec::new();
        let mut index = IndexMap::new();
        let mut origins = IndexMap::new();

        for entity in store.values() {
            if !is_product(entity) {
                continue;
            }
            let element = to_element(entity);
            let local_id = element.local_id();

            if let Some(placement_ref) = entity.attrs.get(5).and_then(StepValue::as_ref_id) {
                if let Some(origin) = chase_placement(placement_ref, &store, &mut collector) {
                    origins.insert(local_id, origin);
                }
            }

            index.insert(local_id, elements.len());
            elements.push(element);
        }

        debug!(
            products = elements.len(),
            instances = store.len();
            "Model view built"
        );

        Self {
            file_name: file_name.to_string(),
            elements,
            index,
            origins,
            warnings: collector.into_warnings(),
        }
    }

    /// Returns the approximate world origin of a product, when its
    /// placement chain could be resolved.
    pub fn origin(&self, id: LocalId) -> Option<[f32; 3]> {
        self.origins.get(&id).copied()
    }

    /// Returns the non-fatal findings recorded while reading.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }
}

impl ModelSession for StepModel {
    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn all_elements(&self) -> &[ModelElement] {
        &self.elements
    }

    fn element_by_id(&self, id: LocalId) -> Option<&ModelElement> {
        self.index.get(&id).map(|&i| &self.elements[i])
    }
}

/// Heuristic product test for a schema-less reader.
///
/// Rooted entities carry a 22-character GlobalId as their first attribute.
/// Relationships, property sets, quantity sets, type objects and the
/// project root are rooted but not renderable products.
fn is_product(entity: &RawEntity) -> bool {
    let Some(first) = entity.attrs.first().and_then(StepValue::as_str) else {
        return false;
    };
    if first.len() != 22 {
        return false;
    }
    if NON_PRODUCT_CLASSES.contains(&entity.class.as_str()) || entity.class.ends_with("TYPE") {
        return false;
    }
    !NON_PRODUCT_PREFIXES
        .iter()
        .any(|prefix| entity.class.starts_with(prefix))
}

fn to_element(entity: &RawEntity) -> ModelElement {
    let global_id = entity
        .attrs
        .first()
        .and_then(StepValue::as_str)
        .expect("checked by is_product");

    let mut element = ModelElement::new(
        LocalId::new(entity.id),
        GlobalId::new(global_id),
        EntityClass::new(&entity.class),
    );

    if let Some(name) = entity.attrs.get(2).and_then(StepValue::as_str) {
        element = element.with_name(name);
    }
    if let Some(object_type) = entity.attrs.get(4).and_then(StepValue::as_str) {
        element = element.with_object_type(object_type);
    }
    // PredefinedType, where a class has one, is the trailing enum attribute.
    if let Some(predefined) = entity.attrs.iter().rev().find_map(StepValue::as_enum) {
        element = element.with_predefined_type(predefined);
    }

    element
}

/// Sums translation components along a relative placement chain.
fn chase_placement(
    start: u64,
    store: &IndexMap<u64, RawEntity>,
    collector: &mut DiagnosticCollector,
) -> Option<[f32; 3]> {
    let mut origin = [0.0f32; 3];
    let mut visited = Vec::new();
    let mut current = Some(start);
    let mut resolved_any = false;

    while let Some(id) = current {
        if visited.contains(&id) {
            collector.push(
                Diagnostic::warning(format!("cyclic placement chain at #{id}"))
                    .with_code(ErrorCode::E201),
            );
            break;
        }
        visited.push(id);

        let Some(placement) = store.get(&id) else {
            collector.push(
                Diagnostic::warning(format!("placement refers to undefined instance #{id}"))
                    .with_code(ErrorCode::E200),
            );
            break;
        };
        if placement.class != "IFCLOCALPLACEMENT" {
            break;
        }

        if let Some(point) = local_origin(placement, store) {
            origin[0] += point[0];
            origin[1] += point[1];
            origin[2] += point[2];
            resolved_any = true;
        }

        current = placement.attrs.first().and_then(StepValue::as_ref_id);
    }

    resolved_any.then_some(origin)
}

/// Extracts the translation of one `IfcLocalPlacement`.
fn local_origin(placement: &RawEntity, store: &IndexMap<u64, RawEntity>) -> Option<[f32; 3]> {
    let axis_ref = placement.attrs.get(1).and_then(StepValue::as_ref_id)?;
    let axis = store.get(&axis_ref)?;
    if !axis.class.starts_with("IFCAXIS2PLACEMENT") {
        return None;
    }
    let point_ref = axis.attrs.first().and_then(StepValue::as_ref_id)?;
    let point = store.get(&point_ref)?;
    if point.class != "IFCCARTESIANPOINT" {
        return None;
    }
    let StepValue::List(coords) = point.attrs.first()? else {
        return None;
    };

    let mut origin = [0.0f32; 3];
    for (slot, coord) in origin.iter_mut().zip(coords) {
        *slot = coord.as_number()? as f32;
    }
    Some(origin)
}
