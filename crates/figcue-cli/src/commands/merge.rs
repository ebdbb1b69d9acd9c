use figcue_core::clipzone::{EligibilityPolicy, OverlapPolicy};
use figcue_core::error::FigcueError;
use figcue_core::layout::AssetLayout;
use std::path::{Path, PathBuf};

use crate::commands::effective_config;
use crate::output;

pub fn run(
    config_file: Option<&Path>,
    asset_dir: PathBuf,
    overlap: Option<&str>,
    eligibility: Option<&str>,
    output_format: &str,
) -> Result<(), FigcueError> {
    let config = effective_config(config_file)?;
    let mut options = config.merge_options();

    if let Some(name) = overlap {
        options.overlap = OverlapPolicy::from_name(name).ok_or_else(|| {
            FigcueError::ConfigInvalid(format!(
                "unknown overlap policy '{name}' (expected always, intersect or contains)"
            ))
        })?;
    }
    if let Some(name) = eligibility {
        options.eligibility = EligibilityPolicy::from_name(name).ok_or_else(|| {
            FigcueError::ConfigInvalid(format!(
                "unknown eligibility policy '{name}' (expected singletons or group)"
            ))
        })?;
    }

    let layout = AssetLayout::new(asset_dir);
    let report = figcue_core::separate_figures(&layout, &options)?;

    match output_format {
        "json" => output::json::print(&report)?,
        _ => output::table::print_separation(&report, &options),
    }

    Ok(())
}
