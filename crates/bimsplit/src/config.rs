//! Configuration types for the discipline splitter.
//!
//! This module provides configuration structures that control how elements
//! are classified and how category exports are post-processed. All types
//! implement [`serde::Deserialize`] for flexible loading from external
//! sources.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining rules and export settings.
//! - [`RulesConfig`] - The keyword and structural classification tables.
//! - [`ExportConfig`] - Decimation, compression and output policy.
//!
//! The defaults reproduce the conventional MEP taxonomy: keyword tiers for
//! ducts, pipes and electrical in that priority order, structural fallbacks
//! for walls, slabs, doors and windows, and `others` for everything else.
//!
//! # Example
//!
//! ```
//! # use bimsplit::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.rules().fallback(), "others");
//! assert!(config.export().precision_critical().contains(&"pipes".to_string()));
//! ```

use serde::Deserialize;

/// Top-level configuration combining classification rules and export policy.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Classification rule tables.
    #[serde(default)]
    rules: RulesConfig,

    /// Export policy section.
    #[serde(default)]
    export: ExportConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(rules: RulesConfig, export: ExportConfig) -> Self {
        Self { rules, export }
    }

    /// Returns the classification rule tables.
    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    /// Returns the export policy.
    pub fn export(&self) -> &ExportConfig {
        &self.export
    }
}

/// One keyword tier: a category label plus its keyword list.
///
/// The order of tiers in [`RulesConfig::keywords`] is the tie-break when an
/// element's text matches several tiers; keyword order inside a tier does
/// not matter.
#[derive(Debug, Clone, Deserialize)]
pub struct KeywordRule {
    category: String,
    keywords: Vec<String>,
}

impl KeywordRule {
    /// Creates a keyword tier.
    pub fn new(category: impl Into<String>, keywords: Vec<String>) -> Self {
        Self {
            category: category.into(),
            keywords,
        }
    }

    /// Returns the category label.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Returns the keyword list.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

/// One structural tier: a category label plus exact entity-class matches.
#[derive(Debug, Clone, Deserialize)]
pub struct StructuralRule {
    category: String,
    classes: Vec<String>,
}

impl StructuralRule {
    /// Creates a structural tier.
    pub fn new(category: impl Into<String>, classes: Vec<String>) -> Self {
        Self {
            category: category.into(),
            classes,
        }
    }

    /// Returns the category label.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Returns the entity-class list.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

/// Classification rule tables.
///
/// Immutable configuration data passed into the rules engine; the engine
/// itself holds no mutable state, so one table set can drive any number of
/// runs.
#[derive(Debug, Clone, Deserialize)]
pub struct RulesConfig {
    /// Keyword tiers in priority order.
    #[serde(default = "default_keywords")]
    keywords: Vec<KeywordRule>,

    /// Structural tiers, tried after all keyword tiers.
    #[serde(default = "default_structural")]
    structural: Vec<StructuralRule>,

    /// Label assigned when nothing matches.
    #[serde(default = "default_fallback")]
    fallback: String,
}

impl RulesConfig {
    /// Creates rule tables from explicit tiers.
    pub fn new(
        keywords: Vec<KeywordRule>,
        structural: Vec<StructuralRule>,
        fallback: impl Into<String>,
    ) -> Self {
        Self {
            keywords,
            structural,
            fallback: fallback.into(),
        }
    }

    /// Returns the keyword tiers in priority order.
    pub fn keywords(&self) -> &[KeywordRule] {
        &self.keywords
    }

    /// Returns the structural tiers.
    pub fn structural(&self) -> &[StructuralRule] {
        &self.structural
    }

    /// Returns the fallback label.
    pub fn fallback(&self) -> &str {
        &self.fallback
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
            structural: default_structural(),
            fallback: default_fallback(),
        }
    }
}

fn default_keywords() -> Vec<KeywordRule> {
    let strings = |words: &[&str]| words.iter().map(|w| w.to_string()).collect();
    vec![
        KeywordRule::new(
            "ducts",
            strings(&[
                "duct", "grille", "diffuser", "exhaust", "supply", "return", "damper", "fcu",
                "fan", "air terminal",
            ]),
        ),
        KeywordRule::new(
            "pipes",
            strings(&[
                "pipe", "water", "sanitary", "sewer", "drain", "waste", "valve", "faucet", "sink",
                "sprinkler", "pump",
            ]),
        ),
        KeywordRule::new(
            "electrical",
            strings(&[
                "cable", "tray", "wire", "conduit", "switch", "socket", "panel", "lighting",
                "detector",
            ]),
        ),
    ]
}

fn default_structural() -> Vec<StructuralRule> {
    let strings = |classes: &[&str]| classes.iter().map(|c| c.to_string()).collect();
    vec![
        StructuralRule::new(
            "walls",
            strings(&["IfcWall", "IfcWallStandardCase", "IfcCurtainWall"]),
        ),
        StructuralRule::new("slabs", strings(&["IfcSlab", "IfcRoof", "IfcFooting"])),
        StructuralRule::new("doors", strings(&["IfcDoor"])),
        StructuralRule::new("windows", strings(&["IfcWindow"])),
    ]
}

fn default_fallback() -> String {
    "others".to_string()
}

/// Export policy: post-processing applied per category and output layout.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// Decimation ratio in `(0, 1]`; `1.0` disables decimation.
    #[serde(default = "default_decimation_ratio")]
    decimation_ratio: f32,

    /// Compression level; `0` disables compression.
    #[serde(default = "default_compression_level")]
    compression_level: u32,

    /// Categories never decimated, regardless of ratio.
    #[serde(default = "default_precision_critical")]
    precision_critical: Vec<String>,

    /// Whether to write one `<category>.json` manifest per bucket.
    #[serde(default = "default_true")]
    write_manifests: bool,

    /// Whether node transforms are baked into exported geometry.
    #[serde(default = "default_true")]
    apply_transforms: bool,

    /// Whether vertex normals are exported.
    #[serde(default = "default_true")]
    include_normals: bool,

    /// Whether texture coordinates are exported.
    #[serde(default)]
    include_tex_coords: bool,

    /// Whether geometry is converted to a Y-up coordinate system.
    #[serde(default = "default_true")]
    y_up: bool,

    /// Whether per-node extras (category attributes) are exported.
    #[serde(default = "default_true")]
    include_extras: bool,
}

impl ExportConfig {
    /// Returns the decimation ratio.
    pub fn decimation_ratio(&self) -> f32 {
        self.decimation_ratio
    }

    /// Returns the compression level.
    pub fn compression_level(&self) -> u32 {
        self.compression_level
    }

    /// Returns the labels of categories exempt from decimation.
    pub fn precision_critical(&self) -> &[String] {
        &self.precision_critical
    }

    /// Returns whether per-category manifests are written.
    pub fn write_manifests(&self) -> bool {
        self.write_manifests
    }

    /// Returns whether transforms are baked into exported geometry.
    pub fn apply_transforms(&self) -> bool {
        self.apply_transforms
    }

    /// Returns whether vertex normals are exported.
    pub fn include_normals(&self) -> bool {
        self.include_normals
    }

    /// Returns whether texture coordinates are exported.
    pub fn include_tex_coords(&self) -> bool {
        self.include_tex_coords
    }

    /// Returns whether geometry is converted to Y-up.
    pub fn y_up(&self) -> bool {
        self.y_up
    }

    /// Returns whether per-node extras are exported.
    pub fn include_extras(&self) -> bool {
        self.include_extras
    }

    /// Overrides the decimation ratio, e.g. from a command-line flag.
    pub fn with_decimation_ratio(mut self, ratio: f32) -> Self {
        self.decimation_ratio = ratio;
        self
    }

    /// Overrides the compression level, e.g. from a command-line flag.
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = level;
        self
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            decimation_ratio: default_decimation_ratio(),
            compression_level: default_compression_level(),
            precision_critical: default_precision_critical(),
            write_manifests: true,
            apply_transforms: true,
            include_normals: true,
            include_tex_coords: false,
            y_up: true,
            include_extras: true,
        }
    }
}

fn default_decimation_ratio() -> f32 {
    0.5
}

fn default_compression_level() -> u32 {
    6
}

fn default_precision_critical() -> Vec<String> {
    vec![
        "ducts".to_string(),
        "pipes".to_string(),
        "electrical".to_string(),
    ]
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tables_match_the_conventional_taxonomy() {
        let config = AppConfig::default();
        let labels: Vec<&str> = config
            .rules()
            .keywords()
            .iter()
            .map(KeywordRule::category)
            .collect();
        assert_eq!(labels, vec!["ducts", "pipes", "electrical"]);
        assert_eq!(config.rules().fallback(), "others");
        assert_eq!(config.export().decimation_ratio(), 0.5);
        assert_eq!(config.export().compression_level(), 6);
    }
}
