use figcue_core::config::{validate_config, LabelerConfig};
use figcue_core::error::FigcueError;
use figcue_core::labels::{caption_segments, group_segments};
use figcue_core::oracle::CommandLabeler;
use figcue_core::tools::ToolCommand;
use std::path::{Path, PathBuf};

use crate::commands::{effective_config, EncodeRequest};
use crate::output;

/// Labeler used when the config file names none: CRF++ with the model
/// passed via `--model`.
fn default_labeler(model: PathBuf) -> LabelerConfig {
    LabelerConfig {
        command: ToolCommand::new("crf_test", &["-m", "{model}", "{input}"]),
        model,
    }
}

pub fn run(
    config_file: Option<&Path>,
    input_file: PathBuf,
    model: Option<PathBuf>,
    show_all: bool,
    output_format: &str,
) -> Result<(), FigcueError> {
    let mut config = effective_config(config_file)?;

    config.labeler = match (config.labeler.take(), model) {
        (Some(mut labeler), Some(model)) => {
            labeler.model = model;
            Some(labeler)
        }
        (Some(labeler), None) => Some(labeler),
        (None, Some(model)) => Some(default_labeler(model)),
        (None, None) => None,
    };
    validate_config(&config)?;

    let labeler_config = config.labeler.ok_or_else(|| {
        FigcueError::ConfigInvalid(
            "no labeler configured. Pass --model or set \"labeler\" in the config file".into(),
        )
    })?;
    let labeler = CommandLabeler::new(labeler_config.command, labeler_config.model);

    let request = EncodeRequest::load(&input_file)?;
    let tokens = figcue_core::label_document(&request.document, &request.body, &labeler)?;
    let segments = if show_all {
        group_segments(&tokens)
    } else {
        caption_segments(&tokens)
    };

    match output_format {
        "json" => output::json::print(&segments)?,
        _ => output::table::print_segments(&segments),
    }

    Ok(())
}
