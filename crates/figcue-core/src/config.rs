use crate::clipzone::{EligibilityPolicy, MergeOptions, OverlapPolicy};
use crate::error::FigcueError;
use crate::tools::ToolCommand;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Pipeline settings, read from a JSON file. Every field is optional.
///
/// ```json
/// {
///   "overlap_policy": "rect_intersect",
///   "rasterizer": { "program": "python", "args": ["vec2svg.py", "-i", "{input}", "-o", "{output}"] },
///   "labeler": { "program": "crf_test", "args": ["-m", "{model}", "{input}"], "model": "models/figure.crf" }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    #[serde(default)]
    pub overlap_policy: OverlapPolicy,
    #[serde(default)]
    pub eligibility_policy: EligibilityPolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rasterizer: Option<ToolCommand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labeler: Option<LabelerConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelerConfig {
    #[serde(flatten)]
    pub command: ToolCommand,
    pub model: PathBuf,
}

impl PipelineConfig {
    pub fn merge_options(&self) -> MergeOptions {
        MergeOptions {
            overlap: self.overlap_policy,
            eligibility: self.eligibility_policy,
        }
    }
}

/// Load and validate a config file.
pub fn load_config(path: &Path) -> Result<PipelineConfig, FigcueError> {
    let content = std::fs::read_to_string(path).map_err(|e| FigcueError::ConfigLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let config: PipelineConfig =
        serde_json::from_str(&content).map_err(|e| FigcueError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_config(&config)?;
    Ok(config)
}

/// Parse and validate config JSON from a string.
pub fn parse_config_str(json: &str) -> Result<PipelineConfig, FigcueError> {
    let config: PipelineConfig = serde_json::from_str(json)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &PipelineConfig) -> Result<(), FigcueError> {
    if let Some(ref rasterizer) = config.rasterizer {
        require_program("rasterizer", rasterizer)?;
        for placeholder in ["input", "output"] {
            if !rasterizer.uses(placeholder) {
                return Err(FigcueError::ConfigInvalid(format!(
                    "rasterizer args must contain '{{{placeholder}}}'"
                )));
            }
        }
    }

    if let Some(ref labeler) = config.labeler {
        require_program("labeler", &labeler.command)?;
        if !labeler.command.uses("input") {
            return Err(FigcueError::ConfigInvalid(
                "labeler args must contain '{input}'".into(),
            ));
        }
        if labeler.model.as_os_str().is_empty() {
            return Err(FigcueError::ConfigInvalid(
                "labeler model path is empty".into(),
            ));
        }
    }

    Ok(())
}

fn require_program(tool: &str, command: &ToolCommand) -> Result<(), FigcueError> {
    if command.program.trim().is_empty() {
        return Err(FigcueError::ConfigInvalid(format!(
            "{tool} program is empty"
        )));
    }
    Ok(())
}
