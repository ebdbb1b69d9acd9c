use figcue_core::error::FigcueError;
use std::path::Path;

use crate::commands::effective_config;
use crate::output;

pub fn show(config_file: Option<&Path>) -> Result<(), FigcueError> {
    let config = effective_config(config_file)?;
    output::json::print(&config)
}

pub fn validate(file: &Path) -> Result<(), FigcueError> {
    let config = figcue_core::config::load_config(file)?;

    println!("Config '{}' is valid.", file.display());
    println!("  Overlap policy:     {}", config.overlap_policy);
    println!("  Eligibility policy: {}", config.eligibility_policy);
    match config.rasterizer {
        Some(ref r) => println!("  Rasterizer:         {} {}", r.program, r.args.join(" ")),
        None => println!("  Rasterizer:         (none)"),
    }
    match config.labeler {
        Some(ref l) => println!(
            "  Labeler:            {} {} (model {})",
            l.command.program,
            l.command.args.join(" "),
            l.model.display()
        ),
        None => println!("  Labeler:            (none)"),
    }

    Ok(())
}
