//! CLI logic for the bimsplit tool.
//!
//! This module contains the core CLI logic for the bimsplit tool.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::path::Path;

use log::{info, warn};

use bimsplit::{SplitError, Splitter, config::AppConfig};

/// Run the bimsplit CLI application
///
/// This function processes the input model through the split pipeline and
/// writes per-category GLB files, manifests and run statistics into the
/// output directory.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `SplitError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Model read errors
/// - Output directory errors
pub fn run(args: &Args) -> Result<(), SplitError> {
    info!(
        input_path = args.input,
        output_dir = args.output_dir;
        "Processing model"
    );

    // Load configuration and apply command-line overrides
    let app_config = config::load_config(args.config.as_ref())?;
    let app_config = apply_overrides(app_config, args);

    // Process the model using the Splitter API
    let splitter = Splitter::new(app_config);
    let summary = splitter.run(Path::new(&args.input), Path::new(&args.output_dir))?;

    for category in summary.failed() {
        warn!(category = category.as_string().as_str(); "Category was skipped");
    }
    info!(
        categories = summary.exported().len(),
        output_dir = args.output_dir;
        "Model split successfully"
    );

    Ok(())
}

/// Folds command-line export overrides into the loaded configuration.
fn apply_overrides(config: AppConfig, args: &Args) -> AppConfig {
    let mut export = config.export().clone();
    if let Some(ratio) = args.decimation_ratio {
        export = export.with_decimation_ratio(ratio);
    }
    if let Some(level) = args.compression_level {
        export = export.with_compression_level(level);
    }
    AppConfig::new(config.rules().clone(), export)
}

#[cfg(test)]
mod tests {
    use clap::Parser as _;

    use super::*;

    #[test]
    fn overrides_replace_only_the_given_fields() {
        let args = Args::parse_from(["bimsplit", "in.ifc", "--decimation-ratio", "0.9"]);
        let config = apply_overrides(AppConfig::default(), &args);
        assert_eq!(config.export().decimation_ratio(), 0.9);
        assert_eq!(config.export().compression_level(), 6);

        let args = Args::parse_from(["bimsplit", "in.ifc", "--compression-level", "0"]);
        let config = apply_overrides(AppConfig::default(), &args);
        assert_eq!(config.export().decimation_ratio(), 0.5);
        assert_eq!(config.export().compression_level(), 0);
    }
}
