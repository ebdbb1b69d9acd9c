use figcue_core::config::validate_config;
use figcue_core::error::FigcueError;
use figcue_core::layout::AssetLayout;
use figcue_core::rasterize::{rasterize_figures, CommandRasterizer};
use figcue_core::tools::ToolCommand;
use std::path::{Path, PathBuf};

use crate::commands::effective_config;

pub fn run(
    config_file: Option<&Path>,
    asset_dir: PathBuf,
    program: Option<String>,
    args: Vec<String>,
) -> Result<(), FigcueError> {
    let mut config = effective_config(config_file)?;

    if let Some(program) = program {
        config.rasterizer = Some(ToolCommand { program, args });
    } else if !args.is_empty() {
        return Err(FigcueError::ConfigInvalid(
            "--arg needs --program".into(),
        ));
    }
    validate_config(&config)?;

    let command = config.rasterizer.ok_or_else(|| {
        FigcueError::ConfigInvalid(
            "no rasterizer configured. Pass --program/--arg or set \"rasterizer\" in the config file"
                .into(),
        )
    })?;

    let layout = AssetLayout::new(asset_dir);
    let rasterizer = CommandRasterizer::new(command);
    let rendered = rasterize_figures(&layout, &rasterizer)?;

    for path in &rendered {
        println!("{}", path.display());
    }
    eprintln!(
        "Rendered {} zone file(s) into {}",
        rendered.len(),
        layout.svg_dir().display()
    );

    Ok(())
}
