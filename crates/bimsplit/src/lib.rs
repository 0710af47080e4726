//! Bimsplit - splits building models into per-discipline scene exports.
//!
//! Reading, classification, identity resolution, partitioning and export
//! for STEP-encoded building models. One input model becomes one GLB file
//! per discipline category, with JSON manifests and run statistics
//! alongside.

pub mod classify;
pub mod config;
pub mod export;
pub mod partition;
pub mod proxy;
pub mod resolve;

mod error;

pub use bimsplit_core::{category, identifier, model, scene};
pub use bimsplit_reader::StepModel;

pub use error::SplitError;

use std::{fs, path::Path};

use log::{debug, info};

use bimsplit_core::scene::SceneDocument;

use classify::Classifier;
use config::AppConfig;
use export::{ExportSummary, glb::GlbExporter};
use partition::Partition;

/// Facade for running the split pipeline.
///
/// Wraps the configured stages behind one API: load a model, build its
/// scene, partition it into categories and export the results.
///
/// # Examples
///
/// ```rust,no_run
/// use std::path::Path;
///
/// use bimsplit::{Splitter, config::AppConfig};
///
/// let splitter = Splitter::new(AppConfig::default());
/// let summary = splitter
///     .run(Path::new("clinic.ifc"), Path::new("out"))
///     .expect("Failed to split model");
///
/// for (category, path) in summary.exported() {
///     println!("{category} -> {}", path.display());
/// }
/// ```
#[derive(Default)]
pub struct Splitter {
    config: AppConfig,
}

impl Splitter {
    /// Create a new splitter with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration including rule tables and
    ///   export policy
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Load a model file into a session.
    ///
    /// # Errors
    ///
    /// Returns `SplitError` when the file cannot be read or its content
    /// has fatal structural errors.
    pub fn load(&self, path: &Path) -> Result<StepModel, SplitError> {
        info!(path:display = path.display(); "Loading model");

        let source = fs::read_to_string(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        let model = bimsplit_reader::parse(&source, &file_name)
            .map_err(|err| SplitError::new_read_error(err, source))?;

        debug!(
            elements = model::ModelSession::all_elements(&model).len(),
            warnings = model.warnings().len();
            "Model loaded"
        );
        Ok(model)
    }

    /// Build the proxy scene for a loaded model.
    pub fn build_scene(&self, model: &StepModel) -> SceneDocument {
        proxy::proxy_scene(model)
    }

    /// Partition the model and scene into category buckets.
    ///
    /// Pure with respect to both inputs; all scene mutation happens in
    /// [`Splitter::export`].
    pub fn partition(
        &self,
        session: &dyn model::ModelSession,
        doc: &SceneDocument,
    ) -> Partition {
        let classifier = Classifier::new(self.config.rules());
        partition::partition(&classifier, session, doc)
    }

    /// Export a partition to per-category files under `output_dir`.
    ///
    /// # Errors
    ///
    /// Returns `SplitError` for run-fatal output problems; per-category
    /// failures are logged and reported through the summary instead.
    pub fn export(
        &self,
        doc: &mut SceneDocument,
        partition: &Partition,
        session: &dyn model::ModelSession,
        output_dir: &Path,
    ) -> Result<ExportSummary, SplitError> {
        let mut exporter = GlbExporter::new();
        let summary = export::export_partition(
            doc,
            partition,
            session,
            self.config.export(),
            &mut exporter,
            output_dir,
        )?;
        Ok(summary)
    }

    /// Run the whole pipeline: load, build scene, partition, export.
    ///
    /// # Errors
    ///
    /// Returns `SplitError` when loading fails or the output directory is
    /// unusable.
    pub fn run(&self, input: &Path, output_dir: &Path) -> Result<ExportSummary, SplitError> {
        let model = self.load(input)?;
        let mut doc = self.build_scene(&model);
        let partition = self.partition(&model, &doc);
        info!(
            categories = partition.node_groups().len(),
            elements = partition.assignment().len();
            "Model partitioned"
        );
        self.export(&mut doc, &partition, &model, output_dir)
    }
}
