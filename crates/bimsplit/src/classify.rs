//! The category rules engine.
//!
//! [`Classifier::classify`] maps one model element to exactly one category.
//! It is a pure function of the element and the configured rule tables:
//! same input, same output, no hidden state.
//!
//! Rule tiers, first match wins:
//!
//! 1. A generic flow segment with a predefined subtype is refined by running
//!    the keyword tiers over the subtype text (duct-segment vs pipe-segment
//!    discrimination).
//! 2. Keyword tiers over the lowercased display name and object-type text,
//!    in configured priority order.
//! 3. Structural tiers matching the entity class exactly.
//! 4. The fallback label.
//!
//! Spatial containers and openings are excluded from classification
//! entirely ([`Classifier::is_excluded`]); callers must filter them out
//! before asking for a category.

use bimsplit_core::{category::Category, identifier::EntityClass, model::ModelElement};

use crate::config::RulesConfig;

/// Entity classes that never enter any bucket: pure spatial containers and
/// openings/voids.
const EXCLUDED_CLASSES: &[&str] = &[
    "IfcSite",
    "IfcBuilding",
    "IfcBuildingStorey",
    "IfcSpace",
    "IfcOpeningElement",
    "IfcOpeningStandardCase",
];

/// The generic placeholder class refined via its predefined subtype.
const FLOW_SEGMENT: &str = "IfcFlowSegment";

/// The compiled rules engine.
///
/// Built once from [`RulesConfig`]; classification never mutates it.
///
/// # Examples
///
/// ```
/// use bimsplit::classify::Classifier;
/// use bimsplit::config::RulesConfig;
/// use bimsplit_core::{
///     identifier::{EntityClass, GlobalId, LocalId},
///     model::ModelElement,
/// };
///
/// let classifier = Classifier::new(&RulesConfig::default());
/// let element = ModelElement::new(
///     LocalId::new(1),
///     GlobalId::new("2O2Fr$t4X7Zf8NOew3FLOH"),
///     EntityClass::new("IfcPipeSegment"),
/// )
/// .with_name("Cold Water Pipe Segment");
///
/// assert_eq!(classifier.classify(&element).as_string(), "pipes");
/// ```
#[derive(Debug, Clone)]
pub struct Classifier {
    keyword_rules: Vec<(Category, Vec<String>)>,
    structural_rules: Vec<(Category, Vec<EntityClass>)>,
    excluded: Vec<EntityClass>,
    flow_segment: EntityClass,
    fallback: Category,
}

impl Classifier {
    /// Compiles the rule tables into a classifier.
    ///
    /// Keywords are lowercased once here so that classification is a plain
    /// substring scan.
    pub fn new(rules: &RulesConfig) -> Self {
        let keyword_rules = rules
            .keywords()
            .iter()
            .map(|tier| {
                (
                    Category::new(tier.category()),
                    tier.keywords()
                        .iter()
                        .map(|word| word.to_lowercase())
                        .collect(),
                )
            })
            .collect();

        let structural_rules = rules
            .structural()
            .iter()
            .map(|tier| {
                (
                    Category::new(tier.category()),
                    tier.classes().iter().map(|c| EntityClass::new(c)).collect(),
                )
            })
            .collect();

        Self {
            keyword_rules,
            structural_rules,
            excluded: EXCLUDED_CLASSES.iter().map(|c| EntityClass::new(c)).collect(),
            flow_segment: EntityClass::new(FLOW_SEGMENT),
            fallback: Category::new(rules.fallback()),
        }
    }

    /// Returns whether an element is outside the partition altogether.
    pub fn is_excluded(&self, element: &ModelElement) -> bool {
        self.excluded.contains(&element.entity_class())
    }

    /// Returns all category labels the rule tables can produce, in tier
    /// order, fallback last.
    pub fn categories(&self) -> Vec<Category> {
        let mut labels: Vec<Category> = self
            .keyword_rules
            .iter()
            .map(|(category, _)| *category)
            .chain(self.structural_rules.iter().map(|(category, _)| *category))
            .collect();
        labels.push(self.fallback);
        labels.dedup();
        labels
    }

    /// Maps an element to its category. Total and deterministic.
    pub fn classify(&self, element: &ModelElement) -> Category {
        // Generic flow segments: the predefined subtype is more telling
        // than the (often empty) name, so it is consulted first.
        if element.entity_class() == self.flow_segment {
            if let Some(predefined) = element.predefined_type() {
                if let Some(category) = self.keyword_match(&predefined.to_lowercase()) {
                    return category;
                }
            }
        }

        let text = format!(
            "{} {}",
            element.name().unwrap_or_default(),
            element.object_type().unwrap_or_default()
        )
        .to_lowercase();

        if let Some(category) = self.keyword_match(&text) {
            return category;
        }

        for (category, classes) in &self.structural_rules {
            if classes.contains(&element.entity_class()) {
                return *category;
            }
        }

        self.fallback
    }

    fn keyword_match(&self, text: &str) -> Option<Category> {
        for (category, keywords) in &self.keyword_rules {
            if keywords.iter().any(|word| text.contains(word.as_str())) {
                return Some(*category);
            }
        }
        None
    }
}
