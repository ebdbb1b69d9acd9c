use crate::error::FigcueError;
use crate::layout::AssetLayout;
use crate::tools::ToolCommand;
use std::path::{Path, PathBuf};

/// Converts one merged zone file into a rendered image file.
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, source: &Path, destination: &Path) -> Result<(), FigcueError>;

    /// Name of this backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// Rasterizer backed by an external program, e.g.
/// `python vec2svg.py -i {input} -o {output}`.
pub struct CommandRasterizer {
    command: ToolCommand,
}

impl CommandRasterizer {
    pub fn new(command: ToolCommand) -> Self {
        CommandRasterizer { command }
    }
}

impl Rasterizer for CommandRasterizer {
    fn rasterize(&self, source: &Path, destination: &Path) -> Result<(), FigcueError> {
        let input = source.to_string_lossy().to_string();
        let output = destination.to_string_lossy().to_string();
        let result = self.command.run(
            "rasterizer",
            &[("input", input.as_str()), ("output", output.as_str())],
        )?;

        for line in String::from_utf8_lossy(&result.stdout).lines() {
            tracing::debug!(target: "figcue::rasterizer", "{line}");
        }
        Ok(())
    }

    fn backend_name(&self) -> &str {
        &self.command.program
    }
}

/// Render every merged zone file of `layout` into `figureSVGs/`.
///
/// Stops at the first failure. A backend that reports success without
/// producing its output file is treated as failed.
pub fn rasterize_figures(
    layout: &AssetLayout,
    rasterizer: &dyn Rasterizer,
) -> Result<Vec<PathBuf>, FigcueError> {
    let sources = layout.merged_vec_files()?;
    if sources.is_empty() {
        return Ok(Vec::new());
    }
    std::fs::create_dir_all(layout.svg_dir())?;

    let mut rendered = Vec::with_capacity(sources.len());
    for source in &sources {
        let destination = layout.svg_path_for(source);
        rasterizer.rasterize(source, &destination)?;
        if !destination.is_file() {
            return Err(FigcueError::ToolFailed {
                tool: format!("rasterizer ({})", rasterizer.backend_name()),
                code: 0,
                stderr: format!("no output written to {}", destination.display()),
            });
        }
        tracing::debug!(source = %source.display(), "rendered zone");
        rendered.push(destination);
    }

    Ok(rendered)
}
